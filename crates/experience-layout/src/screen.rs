//! Screen layout: rows top to bottom, producing the final display list.

use std::sync::Arc;

use indexmap::IndexMap;
use log::trace;

use experience_core::{Background, BlockPosition, DocumentError, Id, Rect, Screen};

use crate::block::BlockLayout;
use crate::display::{DisplayItem, DisplaySource, Layout};
use crate::events::{EventEmitter, NavigateTo, Subscription};
use crate::measure::MeasurementService;
use crate::row::{RowEvent, RowLayout};
use crate::toolbar::ToolbarConfiguration;

/// A click anywhere on a screen, labeled with the row and block it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenEvent {
    pub row_id: Id,
    pub block_id: Id,
    pub navigate_to: NavigateTo,
}

/// Layout unit for a whole screen.
///
/// Built once per screen document. [`render`](ScreenLayout::render) can then
/// be called any number of times, from any thread, for whatever width the
/// host currently has.
pub struct ScreenLayout {
    id: Id,
    background: Background,
    toolbar: ToolbarConfiguration,
    stretchy_header: bool,
    rows: Vec<RowLayout>,
    row_index: IndexMap<Id, usize>,
    block_index: IndexMap<Id, BlockPosition>,
    events: EventEmitter<ScreenEvent>,
    _row_subscriptions: Vec<Subscription>,
}

impl ScreenLayout {
    /// Validate `screen` and build layout units for every row and block.
    ///
    /// Fails if row or block ids repeat, since events and lookups are keyed
    /// by id.
    pub fn new(
        screen: &Screen,
        service: Arc<dyn MeasurementService>,
    ) -> Result<Self, DocumentError> {
        let row_index = screen.row_index()?;
        let block_index = screen.block_index()?;

        let rows: Vec<RowLayout> = screen
            .rows
            .iter()
            .map(|row| RowLayout::new(row, &service))
            .collect();

        let events = EventEmitter::new();
        let row_subscriptions = rows
            .iter()
            .map(|row| {
                let events = events.clone();
                let row_id = row.id().clone();
                row.subscribe(move |event: &RowEvent| {
                    events.emit(&ScreenEvent {
                        row_id: row_id.clone(),
                        block_id: event.block_id.clone(),
                        navigate_to: event.navigate_to.clone(),
                    });
                })
            })
            .collect();

        Ok(Self {
            id: screen.id.clone(),
            background: screen.background.clone(),
            toolbar: ToolbarConfiguration::from_screen(screen),
            stretchy_header: screen.stretchy_header,
            rows,
            row_index,
            block_index,
            events,
            _row_subscriptions: row_subscriptions,
        })
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn toolbar(&self) -> &ToolbarConfiguration {
        &self.toolbar
    }

    pub fn stretchy_header(&self) -> bool {
        self.stretchy_header
    }

    pub fn rows(&self) -> &[RowLayout] {
        &self.rows
    }

    pub fn row(&self, id: &Id) -> Option<&RowLayout> {
        self.row_index.get(id).and_then(|&index| self.rows.get(index))
    }

    pub fn block(&self, id: &Id) -> Option<&BlockLayout> {
        let &(row, block) = self.block_index.get(id)?;
        self.rows.get(row)?.blocks().get(block)
    }

    /// Lay the screen out at `available_width`.
    ///
    /// Rows are given bounds of zero height: they size themselves, so a
    /// proportional row height resolves to zero. Each row contributes its
    /// own item first, then its blocks in declaration order, which puts
    /// later blocks over earlier ones.
    pub fn render(&self, available_width: f64) -> Layout {
        let mut items = Vec::with_capacity(self.block_index.len() + self.rows.len());
        let mut height = 0.0;

        for row in &self.rows {
            let row_bounds = Rect::new(0.0, height, available_width, 0.0);
            let row_frame = row.frame(row_bounds);

            items.push(DisplayItem {
                position: row_frame,
                clip: None,
                source: DisplaySource::Row {
                    row: row.id().clone(),
                },
            });
            items.extend(row.layout_blocks(row_frame).into_iter().rev());

            height += row_frame.height;
        }

        trace!(
            "Screen {} rendered {} items at width {}, height {}",
            self.id,
            items.len(),
            available_width,
            height
        );

        Layout {
            items,
            total_height: height,
            total_width: available_width,
        }
    }

    /// Every row and block [`render`](ScreenLayout::render) would produce,
    /// without computing any geometry: each row followed by its blocks in
    /// reverse declaration order.
    pub fn gather(&self) -> Vec<DisplaySource> {
        let mut sources = Vec::with_capacity(self.block_index.len() + self.rows.len());
        for row in &self.rows {
            sources.push(DisplaySource::Row {
                row: row.id().clone(),
            });
            sources.extend(row.blocks().iter().rev().map(|block| DisplaySource::Block {
                row: row.id().clone(),
                block: block.id().clone(),
            }));
        }
        sources
    }

    pub fn needs_bright_backlight(&self) -> bool {
        self.rows.iter().any(RowLayout::needs_bright_backlight)
    }

    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&ScreenEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(handler)
    }
}

impl std::fmt::Debug for ScreenLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenLayout")
            .field("id", &self.id)
            .field("rows", &self.rows)
            .finish()
    }
}
