//! The output of a layout pass.

use experience_core::{Id, Rect};

/// The document node a [`DisplayItem`] renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DisplaySource {
    Row { row: Id },
    Block { row: Id, block: Id },
}

impl DisplaySource {
    pub fn row_id(&self) -> &Id {
        match self {
            DisplaySource::Row { row } | DisplaySource::Block { row, .. } => row,
        }
    }

    pub fn block_id(&self) -> Option<&Id> {
        match self {
            DisplaySource::Row { .. } => None,
            DisplaySource::Block { block, .. } => Some(block),
        }
    }
}

/// One positioned, optionally clipped, renderable unit.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayItem {
    /// Frame in screen coordinates
    pub position: Rect,
    /// Visible region in the item's own coordinates, or `None` when the
    /// whole frame is visible
    pub clip: Option<Rect>,
    pub source: DisplaySource,
}

impl DisplayItem {
    /// Whether nothing of the item is visible.
    pub fn is_hidden(&self) -> bool {
        self.clip.map_or(false, |clip| clip.is_empty())
    }
}

/// A complete layout of one screen at one width.
///
/// Items are in paint order: later items are drawn over earlier ones.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    pub items: Vec<DisplayItem>,
    pub total_height: f64,
    pub total_width: f64,
}

impl Layout {
    /// Index of the item rendering `source`.
    pub fn position_of(&self, source: &DisplaySource) -> Option<usize> {
        self.items.iter().position(|item| &item.source == source)
    }

    pub fn item(&self, source: &DisplaySource) -> Option<&DisplayItem> {
        self.items.iter().find(|item| &item.source == source)
    }
}
