//! Layout computation for server-authored experiences.
//!
//! This crate turns an experience document into an ordered list of
//! positioned, clipped display items, and carries user interaction back up
//! the tree as navigation events.
//!
//! # Architecture
//!
//! 1. **Block layout**: one block's frame against a bounding rectangle
//! 2. **Row layout**: stacks blocks top-down and clips them to the row
//! 3. **Screen layout**: sequences rows and accumulates the total height
//! 4. **Events**: block clicks are relabeled by their row, then their screen
//!
//! Content measurement is injected through [`MeasurementService`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use experience_layout::{EstimatingMeasurementService, ScreenLayout};
//!
//! let service = Arc::new(EstimatingMeasurementService::default());
//! let screen = ScreenLayout::new(&document, service)?;
//!
//! for item in screen.render(375.0).items {
//!     println!("{:?}: {:?}", item.source, item.position);
//! }
//! ```

mod block;
mod button;
mod display;
mod events;
mod experience;
mod measure;
mod row;
mod screen;
mod toolbar;

pub use block::{BlockEvent, BlockLayout};
pub use button::{ButtonStateMachine, DisplayState, StateOfButton};
pub use display::{DisplayItem, DisplaySource, Layout};
pub use events::{EventEmitter, NavigateTo, Subscription};
pub use experience::ExperienceLayout;
pub use measure::{
    BarcodeMeasurable, EstimatingMeasurementService, ImageMeasurable, Measurable, MeasureOptions,
    MeasurementService, TextMeasurable,
};
pub use row::{RowEvent, RowLayout};
pub use screen::{ScreenEvent, ScreenLayout};
pub use toolbar::ToolbarConfiguration;
