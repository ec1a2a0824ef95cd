//! Core types, document model, and errors for rendering server-authored experiences.
//!
//! This crate provides the foundational types used by the layout crate:
//! - Geometry primitives (rectangles, lengths, insets, offsets)
//! - Value types (identifiers, colors, alignments, fonts)
//! - The immutable Experience → Screen → Row → Block document tree
//! - Document validation and error types

pub mod document;
pub mod errors;
pub mod geometry;
pub mod types;

pub use document::*;
pub use errors::*;
pub use geometry::*;
pub use types::*;
