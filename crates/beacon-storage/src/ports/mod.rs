//! # Ports Layer
//!
//! Defines the port traits for the beacon storage core.
//!
//! ## Hexagonal Architecture
//!
//! - `inbound.rs` - Driving port (the facade consumed by HTTP handlers)
//! - `outbound.rs` - Driven ports (the keyed store and the clock)

pub mod inbound;
pub mod outbound;
