//! Result types and their export formats
//!
//! - Result types
//! - JAMS annotation export
//! - Human-readable tempo/key descriptors

pub mod annotation;
pub mod descriptors;
pub mod result;
