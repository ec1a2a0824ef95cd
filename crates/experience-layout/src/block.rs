//! Block layout: one block's frame against a bounding rectangle.

use std::sync::Arc;

use log::warn;
use smallvec::SmallVec;

use experience_core::{
    Block, BlockKind, HorizontalAlignment, Id, Insets, Position, Rect, VerticalAlignment,
};

use crate::events::{EventEmitter, NavigateTo, Subscription};
use crate::measure::{
    BarcodeMeasurable, ImageMeasurable, Measurable, MeasurementService, TextMeasurable,
};

/// Interaction signals raised by a block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockEvent {
    Touched { block_id: Id },
    Released { block_id: Id },
    Clicked { block_id: Id, navigate_to: NavigateTo },
}

impl BlockEvent {
    pub fn block_id(&self) -> &Id {
        match self {
            BlockEvent::Touched { block_id }
            | BlockEvent::Released { block_id }
            | BlockEvent::Clicked { block_id, .. } => block_id,
        }
    }
}

/// Layout unit for a single block.
///
/// Geometry methods are pure functions of the bounds they are given. Event
/// methods notify whoever is subscribed at the time of the call.
pub struct BlockLayout {
    block: Block,
    padding_deflections: SmallVec<[Insets; 2]>,
    measurable: Option<Box<dyn Measurable>>,
    events: EventEmitter<BlockEvent>,
}

impl BlockLayout {
    /// Build a layout unit, deriving the measurable facet and the padding
    /// deflections from the block's kind.
    pub fn new(block: Block, service: &Arc<dyn MeasurementService>) -> Self {
        let measurable: Option<Box<dyn Measurable>> = match &block.kind {
            BlockKind::Text { text, .. } => {
                Some(Box::new(TextMeasurable::new(text.clone(), Arc::clone(service))))
            }
            BlockKind::Barcode { barcode, .. } => Some(Box::new(BarcodeMeasurable::new(
                barcode.clone(),
                Arc::clone(service),
            ))),
            BlockKind::Image { image, .. } => Some(Box::new(ImageMeasurable::new(image.clone()))),
            _ => None,
        };
        let deflections = block.padding_deflections();
        Self::with_measurable(block, deflections, measurable)
    }

    /// Build a layout unit with explicit collaborators.
    pub fn with_measurable(
        block: Block,
        padding_deflections: SmallVec<[Insets; 2]>,
        measurable: Option<Box<dyn Measurable>>,
    ) -> Self {
        Self {
            block,
            padding_deflections,
            measurable,
            events: EventEmitter::new(),
        }
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn id(&self) -> &Id {
        &self.block.id
    }

    pub fn padding_deflections(&self) -> &[Insets] {
        &self.padding_deflections
    }

    pub fn is_stacked(&self) -> bool {
        self.block.position == Position::Stacked
    }

    pub fn is_clickable(&self) -> bool {
        self.block.is_clickable()
    }

    pub fn opacity(&self) -> f64 {
        self.block.opacity
    }

    /// The block's position and size within `bounds`.
    pub fn frame(&self, bounds: Rect) -> Rect {
        let width = self.width(bounds);
        let height = self.height(bounds);
        let x = self.x(bounds, width);
        let y = self.y(bounds, height);
        Rect::new(x, y, width, height)
    }

    /// Resolved width, never negative.
    pub fn width(&self, bounds: Rect) -> f64 {
        let offsets = &self.block.offsets;
        let width = match self.block.horizontal_alignment {
            HorizontalAlignment::Fill => {
                bounds.width
                    - offsets.left.resolve(bounds.width)
                    - offsets.right.resolve(bounds.width)
            }
            _ => self.block.width.resolve(bounds.width),
        };
        width.max(0.0)
    }

    /// Resolved height, never negative.
    pub fn height(&self, bounds: Rect) -> f64 {
        let offsets = &self.block.offsets;
        let height = if self.block.vertical_alignment == VerticalAlignment::Fill {
            bounds.height
                - offsets.top.resolve(bounds.height)
                - offsets.bottom.resolve(bounds.height)
        } else if self.block.auto_height {
            self.measured_height(bounds)
        } else {
            self.block.height.resolve(bounds.height)
        };
        height.max(0.0)
    }

    /// Vertical space this block takes in its row's stacking flow.
    pub fn stacked_height(&self, bounds: Rect) -> f64 {
        match self.block.position {
            Position::Floating => 0.0,
            Position::Stacked => {
                let offsets = &self.block.offsets;
                self.height(bounds)
                    + offsets.top.resolve(bounds.height)
                    + offsets.bottom.resolve(bounds.height)
            }
        }
    }

    /// The area handed to the measurable: the block's resolved width within
    /// `bounds`, less insets and padding deflections.
    pub fn content_bounds(&self, bounds: Rect) -> Rect {
        let deflection = self.total_deflection();
        let insets = &self.block.insets;
        let width = self.width(bounds);

        let left = bounds.left() + insets.left + deflection.left;
        let right = bounds.left() + width - insets.right - deflection.right;
        if right < left {
            warn!(
                "Block {} has insets and padding wider than its {} point width",
                self.block.id, width
            );
        }
        Rect::new(left, bounds.top(), (right - left).max(0.0), bounds.height)
    }

    fn measured_height(&self, bounds: Rect) -> f64 {
        let Some(measurable) = &self.measurable else {
            warn!(
                "Block {} is set to auto-height but has no measurable content, using 0",
                self.block.id
            );
            return 0.0;
        };
        let deflection = self.total_deflection();
        measurable.intrinsic_height(self.content_bounds(bounds))
            + self.block.insets.vertical()
            + deflection.vertical()
    }

    fn total_deflection(&self) -> Insets {
        self.padding_deflections.iter().copied().sum()
    }

    fn x(&self, bounds: Rect, width: f64) -> f64 {
        let offsets = &self.block.offsets;
        match self.block.horizontal_alignment {
            HorizontalAlignment::Center => {
                bounds.left()
                    + (bounds.width - width) / 2.0
                    + offsets.center.resolve(bounds.width)
            }
            HorizontalAlignment::Fill | HorizontalAlignment::Left => {
                bounds.left() + offsets.left.resolve(bounds.width)
            }
            HorizontalAlignment::Right => {
                bounds.right() - width - offsets.right.resolve(bounds.width)
            }
        }
    }

    fn y(&self, bounds: Rect, height: f64) -> f64 {
        let offsets = &self.block.offsets;
        // stacked blocks flow top-down regardless of their alignment
        let alignment = match self.block.position {
            Position::Stacked => VerticalAlignment::Top,
            Position::Floating => self.block.vertical_alignment,
        };
        match alignment {
            VerticalAlignment::Bottom => {
                bounds.bottom() - height - offsets.bottom.resolve(bounds.height)
            }
            VerticalAlignment::Fill | VerticalAlignment::Top => {
                bounds.top() + offsets.top.resolve(bounds.height)
            }
            VerticalAlignment::Middle => {
                bounds.top()
                    + (bounds.height - height) / 2.0
                    + offsets.middle.resolve(bounds.height)
            }
        }
    }

    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&BlockEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(handler)
    }

    pub fn touched(&self) {
        self.events.emit(&BlockEvent::Touched {
            block_id: self.block.id.clone(),
        });
    }

    pub fn released(&self) {
        self.events.emit(&BlockEvent::Released {
            block_id: self.block.id.clone(),
        });
    }

    /// Emit a click carrying the block's navigation target. Does nothing
    /// when the block has no action.
    pub fn click(&self) {
        if let Some(action) = &self.block.action {
            self.events.emit(&BlockEvent::Clicked {
                block_id: self.block.id.clone(),
                navigate_to: NavigateTo::from(action),
            });
        }
    }
}

impl std::fmt::Debug for BlockLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockLayout")
            .field("block", &self.block.id)
            .field("measurable", &self.measurable.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::EstimatingMeasurementService;
    use experience_core::{
        Action, Barcode, BarcodeFormat, Border, Image, Length, Offsets, Text,
    };
    use parking_lot::Mutex;
    use proptest::prelude::*;

    struct FixedHeight(f64);

    impl Measurable for FixedHeight {
        fn intrinsic_height(&self, _bounds: Rect) -> f64 {
            self.0
        }
    }

    /// Reports the width it was asked to measure at.
    struct EchoWidth;

    impl Measurable for EchoWidth {
        fn intrinsic_height(&self, bounds: Rect) -> f64 {
            bounds.width
        }
    }

    fn layout(block: Block) -> BlockLayout {
        BlockLayout::with_measurable(block, SmallVec::new(), None)
    }

    fn sized(id: &str, width: f64, height: f64) -> Block {
        Block::rectangle(id)
            .with_width(Length::points(width))
            .with_height(Length::points(height))
    }

    fn bounds() -> Rect {
        Rect::new(10.0, 20.0, 200.0, 100.0)
    }

    #[test]
    fn test_left_top_frame() {
        let block = sized("a", 50.0, 30.0).with_offsets(
            Offsets::default()
                .with_left(Length::points(5.0))
                .with_top(Length::points(7.0)),
        );
        assert_eq!(layout(block).frame(bounds()), Rect::new(15.0, 27.0, 50.0, 30.0));
    }

    #[test]
    fn test_percentage_size() {
        let block = Block::rectangle("a")
            .with_width(Length::percentage(0.5))
            .with_height(Length::percentage(0.25));
        let frame = layout(block).frame(bounds());
        assert!((frame.width - 100.0).abs() < 0.001);
        assert!((frame.height - 25.0).abs() < 0.001);
    }

    #[test]
    fn test_horizontal_alignments() {
        let center = sized("c", 50.0, 10.0)
            .with_alignment(HorizontalAlignment::Center, VerticalAlignment::Top)
            .with_offsets(Offsets::default().with_center(Length::points(3.0)));
        assert!((layout(center).frame(bounds()).x - (10.0 + 75.0 + 3.0)).abs() < 0.001);

        let right = sized("r", 50.0, 10.0)
            .with_alignment(HorizontalAlignment::Right, VerticalAlignment::Top)
            .with_offsets(Offsets::default().with_right(Length::points(4.0)));
        assert!((layout(right).frame(bounds()).x - (210.0 - 50.0 - 4.0)).abs() < 0.001);

        let fill = Block::rectangle("f")
            .with_alignment(HorizontalAlignment::Fill, VerticalAlignment::Top)
            .with_offsets(
                Offsets::default()
                    .with_left(Length::points(10.0))
                    .with_right(Length::percentage(0.1)),
            );
        let frame = layout(fill).frame(bounds());
        assert!((frame.x - 20.0).abs() < 0.001);
        assert!((frame.width - 170.0).abs() < 0.001);
    }

    #[test]
    fn test_floating_vertical_alignments() {
        let floating = |v| {
            sized("f", 10.0, 20.0)
                .with_position(Position::Floating)
                .with_alignment(HorizontalAlignment::Left, v)
                .with_offsets(
                    Offsets::default()
                        .with_bottom(Length::points(5.0))
                        .with_middle(Length::points(2.0)),
                )
        };
        let bottom = layout(floating(VerticalAlignment::Bottom)).frame(bounds());
        assert!((bottom.y - (120.0 - 20.0 - 5.0)).abs() < 0.001);

        let middle = layout(floating(VerticalAlignment::Middle)).frame(bounds());
        assert!((middle.y - (20.0 + 40.0 + 2.0)).abs() < 0.001);

        let fill = layout(floating(VerticalAlignment::Fill)).frame(bounds());
        assert!((fill.y - 20.0).abs() < 0.001);
        assert!((fill.height - 95.0).abs() < 0.001);
    }

    #[test]
    fn test_stacked_block_ignores_vertical_alignment() {
        let block = sized("s", 10.0, 20.0)
            .with_alignment(HorizontalAlignment::Left, VerticalAlignment::Bottom);
        assert!((layout(block).frame(bounds()).y - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_negative_sizes_clamp_to_zero() {
        let block = Block::rectangle("n")
            .with_alignment(HorizontalAlignment::Fill, VerticalAlignment::Fill)
            .with_offsets(
                Offsets::default()
                    .with_left(Length::points(150.0))
                    .with_right(Length::points(150.0))
                    .with_top(Length::points(80.0))
                    .with_bottom(Length::points(80.0)),
            );
        let frame = layout(block).frame(bounds());
        assert_eq!(frame.width, 0.0);
        assert_eq!(frame.height, 0.0);
    }

    #[test]
    fn test_stacked_height() {
        let block = sized("s", 10.0, 20.0).with_offsets(
            Offsets::default()
                .with_top(Length::points(3.0))
                .with_bottom(Length::percentage(0.1)),
        );
        assert!((layout(block.clone()).stacked_height(bounds()) - 33.0).abs() < 0.001);

        let floating = block.with_position(Position::Floating);
        assert_eq!(layout(floating).stacked_height(bounds()), 0.0);
    }

    #[test]
    fn test_auto_height_adds_insets_and_deflections() {
        let block = Block::rectangle("t")
            .with_width(Length::points(100.0))
            .with_auto_height(true)
            .with_insets(Insets::new(4.0, 0.0, 6.0, 0.0));
        let unit = BlockLayout::with_measurable(
            block,
            SmallVec::from_vec(vec![Insets::uniform(2.0), Insets::uniform(1.0)]),
            Some(Box::new(FixedHeight(40.0))),
        );
        // 40 measured + 10 insets + 6 deflection
        assert!((unit.height(bounds()) - 56.0).abs() < 0.001);
    }

    #[test]
    fn test_auto_height_measures_content_width() {
        let block = Block::rectangle("t")
            .with_width(Length::points(100.0))
            .with_auto_height(true)
            .with_insets(Insets::new(0.0, 8.0, 0.0, 12.0));
        let unit = BlockLayout::with_measurable(
            block,
            SmallVec::from_vec(vec![Insets::uniform(5.0)]),
            Some(Box::new(EchoWidth)),
        );
        let content = unit.content_bounds(bounds());
        assert!((content.x - (10.0 + 8.0 + 5.0)).abs() < 0.001);
        assert!((content.width - 70.0).abs() < 0.001);
        // echoed width 70 + vertical deflection 10
        assert!((unit.height(bounds()) - 80.0).abs() < 0.001);
    }

    #[test]
    fn test_content_bounds_never_negative() {
        let block = Block::rectangle("t")
            .with_width(Length::points(10.0))
            .with_insets(Insets::uniform(20.0));
        assert_eq!(layout(block).content_bounds(bounds()).width, 0.0);
    }

    #[test]
    fn test_auto_height_without_measurable_is_zero() {
        let _ = env_logger::builder().is_test(true).try_init();
        let block = sized("r", 10.0, 50.0).with_auto_height(true);
        assert_eq!(layout(block).height(bounds()), 0.0);
    }

    #[test]
    fn test_fill_wins_over_auto_height() {
        let block = Block::rectangle("f")
            .with_auto_height(true)
            .with_alignment(HorizontalAlignment::Left, VerticalAlignment::Fill);
        assert!((layout(block).height(bounds()) - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_new_derives_measurable_from_kind() {
        let service: Arc<dyn MeasurementService> =
            Arc::new(EstimatingMeasurementService::default());

        let text = Block::text("t", Text::new("Hello"))
            .with_width(Length::points(200.0))
            .with_auto_height(true)
            .with_border(Border {
                width: 2.0,
                ..Default::default()
            });
        let unit = BlockLayout::new(text, &service);
        assert_eq!(unit.padding_deflections(), &[Insets::uniform(2.0)]);
        // one 16pt line plus a 2pt border top and bottom
        assert!((unit.height(bounds()) - (16.0 * 1.2 + 4.0)).abs() < 0.001);

        let qr = Block::barcode(
            "qr",
            Barcode {
                text: "abc".into(),
                format: BarcodeFormat::QrCode,
                scale: 1,
            },
        )
        .with_width(Length::points(140.0))
        .with_auto_height(true);
        // 140 wide less a 20pt quiet zone each side measures 100, plus 40
        assert!((BlockLayout::new(qr, &service).height(bounds()) - 140.0).abs() < 0.001);

        let rect = Block::rectangle("r").with_auto_height(true);
        assert_eq!(BlockLayout::new(rect, &service).height(bounds()), 0.0);
    }

    #[test]
    fn test_auto_height_image_follows_aspect_ratio() {
        let service: Arc<dyn MeasurementService> =
            Arc::new(EstimatingMeasurementService::default());
        let hero = Image {
            url: "https://example.com/hero.png".into(),
            name: "hero.png".into(),
            width: 200,
            height: 100,
            size: 48_000,
            url_optimization_enabled: false,
        };

        let plain = Block::image("img", Some(hero.clone()))
            .with_width(Length::points(300.0))
            .with_auto_height(true);
        let unit = BlockLayout::new(plain, &service);
        assert!((unit.height(Rect::new(0.0, 0.0, 320.0, 0.0)) - 150.0).abs() < 0.001);

        // a 10pt border narrows the content to 280 and adds 20 of height
        let bordered = Block::image("img", Some(hero))
            .with_width(Length::points(300.0))
            .with_auto_height(true)
            .with_border(Border {
                width: 10.0,
                ..Default::default()
            });
        let unit = BlockLayout::new(bordered, &service);
        assert!((unit.height(Rect::new(0.0, 0.0, 320.0, 0.0)) - (140.0 + 20.0)).abs() < 0.001);

        let missing = Block::image("img", None)
            .with_width(Length::points(300.0))
            .with_auto_height(true);
        assert_eq!(BlockLayout::new(missing, &service).height(bounds()), 0.0);
    }

    #[test]
    fn test_events() {
        let block = Block::rectangle("b").with_action(Action::OpenUrl {
            url: "https://example.com".into(),
        });
        let unit = layout(block);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = unit.subscribe(move |e| sink.lock().push(e.clone()));

        unit.touched();
        unit.released();
        unit.click();

        let seen = seen.lock();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], BlockEvent::Touched { block_id: "b".into() });
        assert_eq!(seen[1], BlockEvent::Released { block_id: "b".into() });
        assert_eq!(
            seen[2],
            BlockEvent::Clicked {
                block_id: "b".into(),
                navigate_to: NavigateTo::OpenUrl {
                    url: "https://example.com".into()
                },
            }
        );
    }

    #[test]
    fn test_click_without_action_is_silent() {
        let unit = layout(Block::rectangle("b"));
        let seen = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&seen);
        let _sub = unit.subscribe(move |_| *sink.lock() += 1);
        unit.click();
        assert_eq!(*seen.lock(), 0);
        assert!(!unit.is_clickable());
    }

    proptest! {
        #[test]
        fn fill_width_subtracts_offsets(
            width in 0f64..2000.0,
            left in 0f64..500.0,
            right in 0f64..1.0,
        ) {
            let block = Block::rectangle("f")
                .with_alignment(HorizontalAlignment::Fill, VerticalAlignment::Top)
                .with_offsets(
                    Offsets::default()
                        .with_left(Length::points(left))
                        .with_right(Length::percentage(right)),
                );
            let bounds = Rect::new(0.0, 0.0, width, 100.0);
            let expected = (width - left - right * width).max(0.0);
            prop_assert_eq!(layout(block).frame(bounds).width, expected);
        }

        #[test]
        fn frame_is_deterministic(x in -500f64..500.0, w in 0f64..1000.0, h in 0f64..1000.0) {
            let unit = layout(sized("d", 40.0, 30.0)
                .with_alignment(HorizontalAlignment::Center, VerticalAlignment::Middle)
                .with_position(Position::Floating));
            let bounds = Rect::new(x, 0.0, w, h);
            prop_assert_eq!(unit.frame(bounds), unit.frame(bounds));
        }
    }
}
