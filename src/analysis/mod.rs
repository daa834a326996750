//! Analysis result types
//!
//! The read-only snapshot handed back to the caller:
//! - Result types and estimate statuses
//! - Metadata

pub mod metadata;
pub mod result;
