//! Row layout: stacking and clipping a row's blocks.

use std::sync::Arc;

use log::{debug, trace};

use experience_core::{Background, Id, Length, Rect, Row};

use crate::block::{BlockEvent, BlockLayout};
use crate::display::{DisplayItem, DisplaySource};
use crate::events::{EventEmitter, NavigateTo, Subscription};
use crate::measure::MeasurementService;

/// A click inside a row, relabeled by the row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowEvent {
    pub block_id: Id,
    pub navigate_to: NavigateTo,
}

/// Layout unit for a row and the blocks it owns.
pub struct RowLayout {
    id: Id,
    auto_height: bool,
    height: Length,
    background: Background,
    blocks: Vec<BlockLayout>,
    events: EventEmitter<RowEvent>,
    _block_subscriptions: Vec<Subscription>,
}

impl RowLayout {
    pub fn new(row: &Row, service: &Arc<dyn MeasurementService>) -> Self {
        let blocks = row
            .blocks
            .iter()
            .map(|block| BlockLayout::new(block.clone(), service))
            .collect();
        Self::with_blocks(row, blocks)
    }

    /// Build a row around already constructed block layouts. The blocks in
    /// `row` itself are ignored.
    pub fn with_blocks(row: &Row, blocks: Vec<BlockLayout>) -> Self {
        let events = EventEmitter::new();
        let block_subscriptions = blocks
            .iter()
            .map(|block| {
                let events = events.clone();
                block.subscribe(move |event| {
                    if let BlockEvent::Clicked { block_id, navigate_to } = event {
                        events.emit(&RowEvent {
                            block_id: block_id.clone(),
                            navigate_to: navigate_to.clone(),
                        });
                    }
                })
            })
            .collect();

        Self {
            id: row.id.clone(),
            auto_height: row.auto_height,
            height: row.height,
            background: row.background.clone(),
            blocks,
            events,
            _block_subscriptions: block_subscriptions,
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn blocks(&self) -> &[BlockLayout] {
        &self.blocks
    }

    pub fn block(&self, id: &Id) -> Option<&BlockLayout> {
        self.blocks.iter().find(|block| block.id() == id)
    }

    /// The row's frame: full width of `bounds`, starting at its top.
    pub fn frame(&self, bounds: Rect) -> Rect {
        Rect::new(bounds.x, bounds.y, bounds.width, self.height(bounds))
    }

    pub fn height(&self, bounds: Rect) -> f64 {
        if self.auto_height {
            self.blocks
                .iter()
                .map(|block| block.stacked_height(bounds))
                .sum()
        } else {
            self.height.resolve(bounds.height)
        }
    }

    /// Lay out every block inside `row_frame`.
    ///
    /// Items come back in reverse declaration order. Each clip is relative
    /// to its block's frame; blocks entirely inside the row get no clip.
    pub fn layout_blocks(&self, row_frame: Rect) -> Vec<DisplayItem> {
        let mut items = Vec::with_capacity(self.blocks.len());
        let mut stack_offset = 0.0;

        for block in &self.blocks {
            let bounds = if block.is_stacked() {
                row_frame.offset(0.0, stack_offset)
            } else {
                row_frame
            };
            let frame = block.frame(bounds);
            let clip = self.clip(block, frame, row_frame);
            stack_offset += block.stacked_height(bounds);

            items.push(DisplayItem {
                position: frame,
                clip,
                source: DisplaySource::Block {
                    row: self.id.clone(),
                    block: block.id().clone(),
                },
            });
        }

        trace!(
            "Row {} laid out {} blocks, stacked to {}",
            self.id,
            items.len(),
            stack_offset
        );
        items.reverse();
        items
    }

    fn clip(&self, block: &BlockLayout, frame: Rect, row_frame: Rect) -> Option<Rect> {
        if row_frame.contains(&frame) {
            return None;
        }
        match row_frame.intersect(&frame) {
            Some(visible) => Some(visible.relative_to(frame.origin())),
            None => {
                debug!("Block {} lies outside row {}, hiding it", block.id(), self.id);
                Some(Rect::point(frame.left(), frame.top()))
            }
        }
    }

    /// Whether any block shows content a scanner has to read.
    pub fn needs_bright_backlight(&self) -> bool {
        self.blocks.iter().any(|block| block.block().is_scannable())
    }

    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&RowEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(handler)
    }
}

impl std::fmt::Debug for RowLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowLayout")
            .field("id", &self.id)
            .field("blocks", &self.blocks)
            .finish()
    }
}
