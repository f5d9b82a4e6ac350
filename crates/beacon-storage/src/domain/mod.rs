//! # Domain Layer
//!
//! Pure logic for the beacon storage core. Nothing in here talks to the store.
//!
//! ## Modules
//!
//! - `errors` - Domain and port error types
//! - `keys` - Deterministic key names (KeySchema)
//! - `codec` - Entity <-> hash field encoding (EntityCodec)
//! - `geo` - Great-circle distance and coordinate validation
//! - `secret` - Auth secret generation and comparison
//! - `types` - Configuration and small value types

pub mod codec;
pub mod errors;
pub mod geo;
pub mod keys;
pub mod secret;
pub mod types;
