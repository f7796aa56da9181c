//! hr-core: shared types, errors, configuration, and event system.
//!
//! This crate is the foundational dependency for the other hr-* crates,
//! providing the unified error type, a typed recording session identifier,
//! segment and timing-report types, recorder configuration, and a broadcast
//! event bus.

pub mod config;
pub mod error;
pub mod events;
pub mod ids;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::*;
pub use media::*;
