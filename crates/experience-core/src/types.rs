//! Core value types for experience documents.

use std::fmt;

/// An identifier for a screen, row, or block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Id(pub String);

impl Id {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id(s.to_string())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id(s)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An RGBA color. Channels are 8-bit, alpha is a fraction in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: f64,
}

impl Color {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue, alpha: 1.0 }
    }

    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: f64) -> Self {
        Self { red, green, blue, alpha }
    }

    /// Create from hex string (e.g., "#FF5733" or "FF5733CC").
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 && hex.len() != 8 {
            return None;
        }
        let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
        let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
        let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
        let a = match hex.get(6..8) {
            Some(a) => u8::from_str_radix(a, 16).ok()? as f64 / 255.0,
            None => 1.0,
        };
        Some(Self::rgba(r, g, b, a))
    }

    /// Pack into a 32-bit ARGB integer, the layout most platform view
    /// toolkits accept.
    pub fn to_argb(&self) -> u32 {
        let a = (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u32;
        (a << 24) | ((self.red as u32) << 16) | ((self.green as u32) << 8) | self.blue as u32
    }

    // Common colors
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

/// Horizontal placement of a block within its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HorizontalAlignment {
    Center,
    #[default]
    Left,
    Right,
    /// Stretch between the left and right offsets
    Fill,
}

/// Vertical placement of a block within its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VerticalAlignment {
    #[default]
    Top,
    Middle,
    Bottom,
    /// Stretch between the top and bottom offsets
    Fill,
}

/// A block's participation in the vertical flow of its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Position {
    /// Placed below the preceding stacked blocks and grows an auto-height row
    #[default]
    Stacked,
    /// Placed against the row bounds independently of other blocks
    Floating,
}

/// Font weights, lightest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FontWeight {
    UltraLight,
    Thin,
    Light,
    #[default]
    Regular,
    Medium,
    SemiBold,
    Bold,
    Heavy,
    Black,
}

impl FontWeight {
    const ALL: [FontWeight; 9] = [
        FontWeight::UltraLight,
        FontWeight::Thin,
        FontWeight::Light,
        FontWeight::Regular,
        FontWeight::Medium,
        FontWeight::SemiBold,
        FontWeight::Bold,
        FontWeight::Heavy,
        FontWeight::Black,
    ];

    /// The weight used for `<b>`/`<strong>` spans inside text of this weight:
    /// three steps heavier, saturating at `Black`.
    pub fn emboldened(self) -> FontWeight {
        let index = Self::ALL.iter().position(|w| *w == self).unwrap_or(3);
        Self::ALL[(index + 3).min(Self::ALL.len() - 1)]
    }

    /// The CSS-style numeric weight (100-900).
    pub fn numeric(self) -> u16 {
        match self {
            FontWeight::UltraLight => 100,
            FontWeight::Thin => 200,
            FontWeight::Light => 300,
            FontWeight::Regular => 400,
            FontWeight::Medium => 500,
            FontWeight::SemiBold => 600,
            FontWeight::Bold => 700,
            FontWeight::Heavy => 800,
            FontWeight::Black => 900,
        }
    }
}

/// A font size and weight.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Font {
    pub size: f64,
    pub weight: FontWeight,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            size: 16.0,
            weight: FontWeight::Regular,
        }
    }
}

/// Text alignment for multi-line text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Barcode symbologies a barcode block can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BarcodeFormat {
    QrCode,
    AztecCode,
    Pdf417,
    Code128,
}

/// How a background image is fitted to its view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BackgroundContentMode {
    #[default]
    Original,
    Stretch,
    Tile,
    Fill,
    Fit,
}

/// Display density the background image was authored for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BackgroundScale {
    #[default]
    X1,
    X2,
    X3,
}

/// Which navigation buttons a screen's title bar shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TitleBarButtons {
    Close,
    Back,
    #[default]
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusBarStyle {
    #[default]
    Dark,
    Light,
}
