//! # Algorithms
//!
//! Burn receipt decoding.

pub mod message_log;

pub use message_log::{
    burn_id, decode_message_sent, encode_message_sent, extract_message, message_sent_topic,
};
