//! # Domain Layer
//!
//! Namespaces, derivation limits and errors.

pub mod errors;
pub mod value_objects;

pub use errors::DerivationError;
pub use value_objects::{
    DerivedAddress, Namespace, DEFAULT_PROGRAM_ID, MAX_SEEDS, MAX_SEED_LEN, PDA_MARKER,
};
