//! Review surface.
//!
//! Payload types for the review front end and the batch progress log.

pub mod logs;
pub mod types;

pub use logs::*;
pub use types::*;
