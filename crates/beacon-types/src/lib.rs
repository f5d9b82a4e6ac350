//! # Beacon Types Crate
//!
//! Domain entities and wire message shapes shared by the storage core and
//! the HTTP layer.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Entities are defined once, here.
//! - **Composition over embedding**: Response messages are built from named
//!   sub-messages rather than by re-declaring their fields.
//! - **Derived, not stored**: `Beacon::comments` is populated at read time
//!   from the comment index, never persisted with the beacon itself.

pub mod entities;
pub mod messages;

pub use entities::*;
pub use messages::*;
