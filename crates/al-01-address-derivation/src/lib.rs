//! # AL-01 Address Derivation
//!
//! Deterministic `(namespace, natural key) -> account address` mapping.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Pure domain + algorithms (no I/O)
//!
//! ## Purpose
//!
//! Every pool, NGO record and the global configuration lives at an address
//! anyone can recompute offline from its natural key:
//!
//! | Record | Seeds |
//! |--------|-------|
//! | Pool | `b"pool"`, `id.to_le_bytes()` |
//! | NGO | `b"ngo"`, wallet bytes |
//! | Config | `b"config"` |
//!
//! Addresses are program-derived: SHA-256 over the seeds, a bump byte, the
//! program id and a fixed marker, with the bump walked down from 255 until
//! the digest is not a valid Ed25519 point (so no private key can sign for
//! it).
//!
//! ## Module Structure
//!
//! ```text
//! al-01-address-derivation/
//! ├── domain/          # Namespace, DerivedAddress, limits, errors
//! ├── algorithms/      # create/find program address
//! └── service.rs       # AddressDeriver bound to one program id
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod domain;
pub mod service;

// Re-exports
pub use algorithms::{create_program_address, find_program_address, is_on_curve};
pub use domain::{
    DerivationError, DerivedAddress, Namespace, DEFAULT_PROGRAM_ID, MAX_SEEDS, MAX_SEED_LEN,
    PDA_MARKER,
};
pub use service::{derive_config_address, derive_ngo_address, derive_pool_address, AddressDeriver};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
