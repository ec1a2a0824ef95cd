//! Content measurement for auto-height blocks.
//!
//! Layout never shapes text or renders barcodes itself. A host supplies a
//! [`MeasurementService`] backed by the platform's text and barcode
//! renderers; [`TextMeasurable`] and [`BarcodeMeasurable`] adapt it to the
//! [`Measurable`] facet a block consults when it is set to auto-height.
//! Images need no service: [`ImageMeasurable`] scales by aspect ratio.

use std::sync::Arc;

use experience_core::{Barcode, BarcodeFormat, Font, Image, Rect, Text};

/// Something that can report how tall it needs to be at a given width.
pub trait Measurable: Send + Sync {
    /// Height required to display the content within `bounds.width`.
    ///
    /// `bounds.height` is not a constraint. Callers pass a non-negative width.
    fn intrinsic_height(&self, bounds: Rect) -> f64;
}

/// Platform text and barcode measurement.
pub trait MeasurementService: Send + Sync {
    /// Height of `text` (which may carry `<b>`, `<i>`, `<u>` markup) when
    /// wrapped to `width`.
    fn measure_rich_text_height(&self, text: &str, font: &Font, width: f64) -> f64;

    /// Height of a rendered barcode scaled to fill `width`.
    fn measure_barcode_height(&self, text: &str, format: BarcodeFormat, width: f64) -> f64;
}

/// Measures a text facet.
pub struct TextMeasurable {
    text: Text,
    service: Arc<dyn MeasurementService>,
}

impl TextMeasurable {
    pub fn new(text: Text, service: Arc<dyn MeasurementService>) -> Self {
        Self { text, service }
    }
}

impl Measurable for TextMeasurable {
    fn intrinsic_height(&self, bounds: Rect) -> f64 {
        self.service
            .measure_rich_text_height(&self.text.text, &self.text.font, bounds.width)
    }
}

/// Measures a barcode facet.
pub struct BarcodeMeasurable {
    barcode: Barcode,
    service: Arc<dyn MeasurementService>,
}

impl BarcodeMeasurable {
    pub fn new(barcode: Barcode, service: Arc<dyn MeasurementService>) -> Self {
        Self { barcode, service }
    }
}

impl Measurable for BarcodeMeasurable {
    fn intrinsic_height(&self, bounds: Rect) -> f64 {
        self.service
            .measure_barcode_height(&self.barcode.text, self.barcode.format, bounds.width)
    }
}

/// Measures an image facet by its pixel aspect ratio.
pub struct ImageMeasurable {
    image: Option<Image>,
}

impl ImageMeasurable {
    pub fn new(image: Option<Image>) -> Self {
        Self { image }
    }
}

impl Measurable for ImageMeasurable {
    fn intrinsic_height(&self, bounds: Rect) -> f64 {
        match &self.image {
            Some(image) if image.width > 0 => {
                bounds.width * f64::from(image.height) / f64::from(image.width)
            }
            _ => 0.0,
        }
    }
}

/// Tuning for [`EstimatingMeasurementService`].
#[derive(Debug, Clone)]
pub struct MeasureOptions {
    /// Average glyph advance as a multiple of the font size
    pub char_width_factor: f64,
    /// Line height as a multiplier (e.g., 1.2 = 120%)
    pub line_height: f64,
    /// Extra height added once per measured text
    pub vertical_padding: f64,
    /// Width-to-height ratio of a Code 128 symbol
    pub code128_aspect: f64,
    /// Width-to-height ratio of a PDF417 symbol
    pub pdf417_aspect: f64,
}

impl Default for MeasureOptions {
    fn default() -> Self {
        Self {
            char_width_factor: 0.55,
            line_height: 1.2,
            vertical_padding: 0.0,
            code128_aspect: 2.2609,
            pdf417_aspect: 3.0,
        }
    }
}

impl MeasureOptions {
    pub fn with_char_width_factor(mut self, factor: f64) -> Self {
        self.char_width_factor = factor;
        self
    }

    pub fn with_line_height(mut self, line_height: f64) -> Self {
        self.line_height = line_height;
        self
    }

    pub fn with_vertical_padding(mut self, padding: f64) -> Self {
        self.vertical_padding = padding;
        self
    }

    pub fn with_code128_aspect(mut self, aspect: f64) -> Self {
        self.code128_aspect = aspect;
        self
    }

    pub fn with_pdf417_aspect(mut self, aspect: f64) -> Self {
        self.pdf417_aspect = aspect;
        self
    }
}

/// A deterministic measurement service that estimates glyph widths instead
/// of shaping text.
///
/// Useful for tests and for hosts without a text engine. Bold spans are
/// measured with the same advance as regular text.
#[derive(Debug, Clone, Default)]
pub struct EstimatingMeasurementService {
    options: MeasureOptions,
}

impl EstimatingMeasurementService {
    pub fn new(options: MeasureOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MeasureOptions {
        &self.options
    }

    /// Number of lines `text` occupies when wrapped to `width`.
    ///
    /// Explicit newlines and `<br>` always break. A non-positive width
    /// disables wrapping.
    pub fn line_count(&self, text: &str, font: &Font, width: f64) -> usize {
        let plain = strip_markup(text);
        let char_width = font.size * self.options.char_width_factor;
        plain
            .split('\n')
            .map(|paragraph| wrapped_lines(paragraph, char_width, width))
            .sum()
    }
}

impl MeasurementService for EstimatingMeasurementService {
    fn measure_rich_text_height(&self, text: &str, font: &Font, width: f64) -> f64 {
        if strip_markup(text).trim().is_empty() {
            return 0.0;
        }
        let lines = self.line_count(text, font, width);
        lines as f64 * font.size * self.options.line_height + self.options.vertical_padding
    }

    fn measure_barcode_height(&self, _text: &str, format: BarcodeFormat, width: f64) -> f64 {
        if width <= 0.0 {
            return 0.0;
        }
        let aspect = match format {
            BarcodeFormat::QrCode | BarcodeFormat::AztecCode => 1.0,
            BarcodeFormat::Code128 => self.options.code128_aspect,
            BarcodeFormat::Pdf417 => self.options.pdf417_aspect,
        };
        width / aspect
    }
}

/// Greedy word wrap; a word wider than the line still takes a line of its own.
fn wrapped_lines(paragraph: &str, char_width: f64, max_width: f64) -> usize {
    if max_width <= 0.0 {
        return 1;
    }

    let mut lines = 0;
    let mut current_line_width = 0.0;

    for word in paragraph.split_whitespace() {
        let word_width = word.chars().count() as f64 * char_width;

        if current_line_width == 0.0 {
            current_line_width = word_width;
            lines += 1;
        } else if current_line_width + char_width + word_width <= max_width {
            current_line_width += char_width + word_width;
        } else {
            current_line_width = word_width;
            lines += 1;
        }
    }

    // a blank paragraph still occupies a line
    lines.max(1)
}

/// Drop inline tags, turning `<br>` variants into newlines and decoding the
/// handful of entities the markup uses.
fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '<' {
            out.push(c);
            continue;
        }
        let mut tag = String::new();
        for t in chars.by_ref() {
            if t == '>' {
                break;
            }
            tag.push(t);
        }
        let name = tag.trim().trim_end_matches('/').trim().to_ascii_lowercase();
        if name == "br" {
            out.push('\n');
        }
    }

    out.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
