//! gallery-core: shared types, IDs, errors and picture categories.
//!
//! This crate is the foundational dependency for the other gallery crates,
//! providing integer-backed identifiers, a unified error type and the closed
//! [`PictureCategory`] enumeration together with its slot policies.

pub mod category;
pub mod error;
pub mod ids;

// Re-export the most commonly used items at the crate root.
pub use category::{PictureCategory, SlotPolicy};
pub use error::{Error, Result};
pub use ids::*;
