//! The experience document tree: Experience → Screen → Row → Block.
//!
//! Documents are loaded once per activation and never mutated afterwards.
//! Layout results are derived from them and recomputed on demand.

use indexmap::IndexMap;
use smallvec::{smallvec, SmallVec};

use crate::errors::DocumentError;
use crate::geometry::{Insets, Length, Offsets};
use crate::types::{
    BackgroundContentMode, BackgroundScale, BarcodeFormat, Color, Font, HorizontalAlignment, Id,
    Position, StatusBarStyle, TextAlignment, TitleBarButtons, VerticalAlignment,
};

/// What a block does when clicked.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    OpenUrl { url: String },
    GoToScreen { experience_id: Id, screen_id: Id },
}

/// A remote image reference.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Image {
    pub url: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Size in bytes
    pub size: u64,
    pub url_optimization_enabled: bool,
}

/// Background facet: fill color and optional image.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Background {
    pub color: Color,
    pub content_mode: BackgroundContentMode,
    pub image: Option<Image>,
    pub scale: BackgroundScale,
}

impl Background {
    pub fn solid(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }
}

/// Border facet.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Border {
    pub color: Color,
    pub radius: f64,
    pub width: f64,
}

impl Border {
    /// Padding the border takes away from the content on every edge.
    pub fn padding_deflection(&self) -> Insets {
        Insets::uniform(self.width)
    }
}

/// Text facet. `text` may carry simple inline markup (`<b>`, `<i>`, `<u>`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Text {
    pub text: String,
    pub alignment: TextAlignment,
    pub color: Color,
    pub font: Font,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Color::BLACK,
            ..Default::default()
        }
    }
}

/// Barcode content.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Barcode {
    pub text: String,
    pub format: BarcodeFormat,
    pub scale: u32,
}

impl Barcode {
    /// Quiet zone the barcode needs around it to stay scannable.
    pub fn padding_deflection(&self) -> Insets {
        match self.format {
            BarcodeFormat::Pdf417 => Insets::uniform(5.0),
            _ => Insets::uniform(20.0),
        }
    }
}

/// Appearance of a button in one of its states.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ButtonState {
    pub background: Background,
    pub border: Border,
    pub text: Text,
}

/// Button content: one appearance per interaction state.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Button {
    pub normal: ButtonState,
    pub highlighted: ButtonState,
    pub selected: ButtonState,
    pub disabled: ButtonState,
    pub enabled: bool,
}

impl Default for Button {
    fn default() -> Self {
        Self {
            normal: ButtonState::default(),
            highlighted: ButtonState::default(),
            selected: ButtonState::default(),
            disabled: ButtonState::default(),
            enabled: true,
        }
    }
}

/// Embedded web content.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WebView {
    pub url: String,
    pub scrolling_enabled: bool,
}

/// The content a block displays, carrying only the facets that kind supports.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockKind {
    Rectangle {
        background: Background,
        border: Border,
    },
    Text {
        background: Background,
        border: Border,
        text: Text,
    },
    Image {
        background: Background,
        border: Border,
        image: Option<Image>,
    },
    Button(Button),
    Web {
        background: Background,
        border: Border,
        web: WebView,
    },
    Barcode {
        background: Background,
        border: Border,
        barcode: Barcode,
    },
}

impl Default for BlockKind {
    fn default() -> Self {
        BlockKind::Rectangle {
            background: Background::default(),
            border: Border::default(),
        }
    }
}

/// The atomic layout unit. A block never owns other blocks.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    pub id: Id,
    pub width: Length,
    pub height: Length,
    pub auto_height: bool,
    pub insets: Insets,
    pub offsets: Offsets,
    pub horizontal_alignment: HorizontalAlignment,
    pub vertical_alignment: VerticalAlignment,
    pub position: Position,
    /// Between 0 (transparent) and 1 (fully opaque)
    pub opacity: f64,
    pub action: Option<Action>,
    pub kind: BlockKind,
}

impl Block {
    /// Create a block of the given kind with zero size, no insets or offsets,
    /// top-left alignment, stacked position, and full opacity.
    pub fn new(id: impl Into<Id>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            width: Length::ZERO,
            height: Length::ZERO,
            auto_height: false,
            insets: Insets::ZERO,
            offsets: Offsets::default(),
            horizontal_alignment: HorizontalAlignment::Left,
            vertical_alignment: VerticalAlignment::Top,
            position: Position::Stacked,
            opacity: 1.0,
            action: None,
            kind,
        }
    }

    /// Create an empty rectangle block.
    pub fn rectangle(id: impl Into<Id>) -> Self {
        Self::new(id, BlockKind::default())
    }

    /// Create a text block.
    pub fn text(id: impl Into<Id>, text: Text) -> Self {
        Self::new(
            id,
            BlockKind::Text {
                background: Background::default(),
                border: Border::default(),
                text,
            },
        )
    }

    /// Create a barcode block.
    pub fn barcode(id: impl Into<Id>, barcode: Barcode) -> Self {
        Self::new(
            id,
            BlockKind::Barcode {
                background: Background::default(),
                border: Border::default(),
                barcode,
            },
        )
    }

    /// Create an image block.
    pub fn image(id: impl Into<Id>, image: Option<Image>) -> Self {
        Self::new(
            id,
            BlockKind::Image {
                background: Background::default(),
                border: Border::default(),
                image,
            },
        )
    }

    /// Create a button block.
    pub fn button(id: impl Into<Id>, button: Button) -> Self {
        Self::new(id, BlockKind::Button(button))
    }

    pub fn with_width(mut self, width: Length) -> Self {
        self.width = width;
        self
    }

    pub fn with_height(mut self, height: Length) -> Self {
        self.height = height;
        self
    }

    pub fn with_auto_height(mut self, auto_height: bool) -> Self {
        self.auto_height = auto_height;
        self
    }

    pub fn with_insets(mut self, insets: Insets) -> Self {
        self.insets = insets;
        self
    }

    pub fn with_offsets(mut self, offsets: Offsets) -> Self {
        self.offsets = offsets;
        self
    }

    pub fn with_alignment(
        mut self,
        horizontal: HorizontalAlignment,
        vertical: VerticalAlignment,
    ) -> Self {
        self.horizontal_alignment = horizontal;
        self.vertical_alignment = vertical;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Replace the border facet, if this kind of block has one.
    pub fn with_border(mut self, new_border: Border) -> Self {
        match &mut self.kind {
            BlockKind::Rectangle { border, .. }
            | BlockKind::Text { border, .. }
            | BlockKind::Image { border, .. }
            | BlockKind::Web { border, .. }
            | BlockKind::Barcode { border, .. } => *border = new_border,
            BlockKind::Button(_) => {}
        }
        self
    }

    pub fn is_stacked(&self) -> bool {
        self.position == Position::Stacked
    }

    pub fn is_clickable(&self) -> bool {
        self.action.is_some()
    }

    pub fn background(&self) -> Option<&Background> {
        match &self.kind {
            BlockKind::Rectangle { background, .. }
            | BlockKind::Text { background, .. }
            | BlockKind::Image { background, .. }
            | BlockKind::Web { background, .. }
            | BlockKind::Barcode { background, .. } => Some(background),
            BlockKind::Button(_) => None,
        }
    }

    pub fn border(&self) -> Option<&Border> {
        match &self.kind {
            BlockKind::Rectangle { border, .. }
            | BlockKind::Text { border, .. }
            | BlockKind::Image { border, .. }
            | BlockKind::Web { border, .. }
            | BlockKind::Barcode { border, .. } => Some(border),
            BlockKind::Button(_) => None,
        }
    }

    pub fn text_content(&self) -> Option<&Text> {
        match &self.kind {
            BlockKind::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn barcode_content(&self) -> Option<&Barcode> {
        match &self.kind {
            BlockKind::Barcode { barcode, .. } => Some(barcode),
            _ => None,
        }
    }

    pub fn button_content(&self) -> Option<&Button> {
        match &self.kind {
            BlockKind::Button(button) => Some(button),
            _ => None,
        }
    }

    /// A block displaying something a scanner must be able to read.
    pub fn is_scannable(&self) -> bool {
        matches!(self.kind, BlockKind::Barcode { .. })
    }

    /// Padding contributed by facets that sit between the block's insets and
    /// its measured content.
    pub fn padding_deflections(&self) -> SmallVec<[Insets; 2]> {
        match &self.kind {
            BlockKind::Text { border, .. } | BlockKind::Image { border, .. } => {
                smallvec![border.padding_deflection()]
            }
            BlockKind::Barcode { border, barcode, .. } => {
                smallvec![border.padding_deflection(), barcode.padding_deflection()]
            }
            BlockKind::Rectangle { .. } | BlockKind::Button(_) | BlockKind::Web { .. } => {
                SmallVec::new()
            }
        }
    }
}

/// A horizontal band containing an ordered list of blocks.
///
/// Block order defines both document order and z-order: later blocks are
/// drawn over earlier ones.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Row {
    pub id: Id,
    pub auto_height: bool,
    pub height: Length,
    pub background: Background,
    pub blocks: Vec<Block>,
}

impl Row {
    /// Create a fixed-height row.
    pub fn new(id: impl Into<Id>, height: Length) -> Self {
        Self {
            id: id.into(),
            auto_height: false,
            height,
            background: Background::default(),
            blocks: Vec::new(),
        }
    }

    /// Create a row that grows to fit its stacked blocks.
    pub fn auto_height(id: impl Into<Id>) -> Self {
        Self {
            auto_height: true,
            ..Self::new(id, Length::ZERO)
        }
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn with_blocks(mut self, blocks: impl IntoIterator<Item = Block>) -> Self {
        self.blocks.extend(blocks);
        self
    }
}

/// Title bar settings of a screen.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TitleBar {
    pub text: String,
    pub background_color: Color,
    pub text_color: Color,
    pub button_color: Color,
    pub buttons: TitleBarButtons,
    pub use_default_style: bool,
}

/// Status bar settings of a screen.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusBar {
    pub style: StatusBarStyle,
    pub color: Color,
    pub auto_color: bool,
}

/// A full page: an ordered list of rows.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Screen {
    pub id: Id,
    pub background: Background,
    pub rows: Vec<Row>,
    pub title_bar: TitleBar,
    pub status_bar: StatusBar,
    pub stretchy_header: bool,
}

/// Location of a block within a screen: `(row index, block index)`.
pub type BlockPosition = (usize, usize);

impl Screen {
    pub fn new(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            background: Background::default(),
            rows: Vec::new(),
            title_bar: TitleBar {
                use_default_style: true,
                ..Default::default()
            },
            status_bar: StatusBar::default(),
            stretchy_header: false,
        }
    }

    pub fn with_row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    pub fn with_rows(mut self, rows: impl IntoIterator<Item = Row>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn with_title_bar(mut self, title_bar: TitleBar) -> Self {
        self.title_bar = title_bar;
        self
    }

    pub fn with_status_bar(mut self, status_bar: StatusBar) -> Self {
        self.status_bar = status_bar;
        self
    }

    /// Validate the screen and index its rows by id, in declaration order.
    pub fn row_index(&self) -> Result<IndexMap<Id, usize>, DocumentError> {
        let mut index = IndexMap::with_capacity(self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            if index.insert(row.id.clone(), i).is_some() {
                return Err(DocumentError::DuplicateRowId {
                    screen: self.id.clone(),
                    row: row.id.clone(),
                });
            }
        }
        Ok(index)
    }

    /// Validate the screen's blocks and index them by id, in declaration order.
    pub fn block_index(&self) -> Result<IndexMap<Id, BlockPosition>, DocumentError> {
        let mut index = IndexMap::new();
        for (row_index, row) in self.rows.iter().enumerate() {
            for (block_index, block) in row.blocks.iter().enumerate() {
                if !(0.0..=1.0).contains(&block.opacity) {
                    return Err(DocumentError::OpacityOutOfRange {
                        block: block.id.clone(),
                        opacity: block.opacity,
                    });
                }
                if index
                    .insert(block.id.clone(), (row_index, block_index))
                    .is_some()
                {
                    return Err(DocumentError::DuplicateBlockId {
                        screen: self.id.clone(),
                        block: block.id.clone(),
                    });
                }
            }
        }
        Ok(index)
    }

    /// Check every shape constraint layout relies on.
    pub fn validate(&self) -> Result<(), DocumentError> {
        self.row_index()?;
        self.block_index()?;
        Ok(())
    }
}

/// A complete server-authored document.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Experience {
    pub id: Id,
    pub home_screen_id: Id,
    pub screens: Vec<Screen>,
}

impl Experience {
    /// Validate the experience and every screen, indexing screens by id.
    pub fn screen_index(&self) -> Result<IndexMap<Id, usize>, DocumentError> {
        let mut index = IndexMap::with_capacity(self.screens.len());
        for (i, screen) in self.screens.iter().enumerate() {
            screen.validate()?;
            if index.insert(screen.id.clone(), i).is_some() {
                return Err(DocumentError::DuplicateScreenId {
                    screen: screen.id.clone(),
                });
            }
        }
        if !index.contains_key(&self.home_screen_id) {
            return Err(DocumentError::MissingHomeScreen {
                screen: self.home_screen_id.clone(),
            });
        }
        Ok(index)
    }

    pub fn screen(&self, id: &Id) -> Option<&Screen> {
        self.screens.iter().find(|s| &s.id == id)
    }

    pub fn home_screen(&self) -> Option<&Screen> {
        self.screen(&self.home_screen_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen_with_blocks(rows: Vec<(&str, Vec<&str>)>) -> Screen {
        Screen::new("screen").with_rows(rows.into_iter().map(|(row, blocks)| {
            Row::auto_height(row).with_blocks(blocks.into_iter().map(Block::rectangle))
        }))
    }

    #[test]
    fn test_facets_by_kind() {
        let rect = Block::rectangle("r");
        assert!(rect.background().is_some());
        assert!(rect.border().is_some());
        assert!(rect.text_content().is_none());

        let button = Block::button("b", Button::default());
        assert!(button.background().is_none());
        assert!(button.button_content().is_some());

        let text = Block::text("t", Text::new("Hello"));
        assert_eq!(text.text_content().map(|t| t.text.as_str()), Some("Hello"));
    }

    #[test]
    fn test_padding_deflections() {
        let text = Block::text("t", Text::new("x")).with_border(Border {
            width: 3.0,
            ..Default::default()
        });
        assert_eq!(text.padding_deflections().as_slice(), &[Insets::uniform(3.0)]);

        let qr = Block::barcode(
            "qr",
            Barcode {
                text: "abc".into(),
                format: BarcodeFormat::QrCode,
                scale: 1,
            },
        );
        let total: Insets = qr.padding_deflections().into_iter().sum();
        assert_eq!(total, Insets::uniform(20.0));

        let pdf = Barcode {
            text: "abc".into(),
            format: BarcodeFormat::Pdf417,
            scale: 1,
        };
        assert_eq!(pdf.padding_deflection(), Insets::uniform(5.0));

        assert!(Block::rectangle("r").padding_deflections().is_empty());
    }

    #[test]
    fn test_block_index_preserves_order() {
        let screen = screen_with_blocks(vec![("r1", vec!["a", "b"]), ("r2", vec!["c"])]);
        let index = screen.block_index().unwrap();
        let ids: Vec<&str> = index.keys().map(Id::as_str).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(index[&Id::from("c")], (1, 0));
    }

    #[test]
    fn test_duplicate_row_id() {
        let screen = screen_with_blocks(vec![("r1", vec![]), ("r1", vec![])]);
        assert_eq!(
            screen.validate(),
            Err(DocumentError::DuplicateRowId {
                screen: "screen".into(),
                row: "r1".into(),
            })
        );
    }

    #[test]
    fn test_duplicate_block_id_across_rows() {
        let screen = screen_with_blocks(vec![("r1", vec!["a"]), ("r2", vec!["a"])]);
        assert!(matches!(
            screen.validate(),
            Err(DocumentError::DuplicateBlockId { .. })
        ));
    }

    #[test]
    fn test_opacity_out_of_range() {
        let screen = Screen::new("s")
            .with_row(Row::auto_height("r").with_block(Block::rectangle("a").with_opacity(1.5)));
        assert!(matches!(
            screen.validate(),
            Err(DocumentError::OpacityOutOfRange { .. })
        ));
    }

    #[test]
    fn test_experience_home_screen() {
        let experience = Experience {
            id: "exp".into(),
            home_screen_id: "home".into(),
            screens: vec![Screen::new("home"), Screen::new("detail")],
        };
        let index = experience.screen_index().unwrap();
        assert_eq!(index.get(&Id::from("detail")), Some(&1));
        assert_eq!(experience.home_screen().map(|s| s.id.as_str()), Some("home"));

        let missing = Experience {
            home_screen_id: "nowhere".into(),
            ..experience.clone()
        };
        assert_eq!(
            missing.screen_index(),
            Err(DocumentError::MissingHomeScreen {
                screen: "nowhere".into()
            })
        );

        let duplicated = Experience {
            screens: vec![Screen::new("home"), Screen::new("home")],
            ..experience
        };
        assert!(matches!(
            duplicated.screen_index(),
            Err(DocumentError::DuplicateScreenId { .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip_screen() {
        let screen = screen_with_blocks(vec![("r1", vec!["a"])]);
        let json = serde_json::to_string(&screen).unwrap();
        let back: Screen = serde_json::from_str(&json).unwrap();
        assert_eq!(screen, back);
    }
}
