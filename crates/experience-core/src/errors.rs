//! Error types for experience documents.

use crate::types::Id;
use thiserror::Error;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum ExperienceError {
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// A document whose shape would make layout or event routing ambiguous.
///
/// These are reported when layout units are constructed, before any layout
/// pass runs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DocumentError {
    #[error("Duplicate screen id {screen}")]
    DuplicateScreenId { screen: Id },

    #[error("Duplicate row id {row} in screen {screen}")]
    DuplicateRowId { screen: Id, row: Id },

    #[error("Duplicate block id {block} in screen {screen}")]
    DuplicateBlockId { screen: Id, block: Id },

    #[error("Home screen {screen} is not part of the experience")]
    MissingHomeScreen { screen: Id },

    #[error("Opacity {opacity} of block {block} is outside [0, 1]")]
    OpacityOutOfRange { block: Id, opacity: f64 },
}
