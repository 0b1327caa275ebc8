//! Font identities and the measurement/coverage seams used by the fitter.

use std::sync::Arc;

use crate::error::ConfigurationError;

/// Name of a loadable font face (a registered family name or file stem).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontResource(Arc<str>);

impl FontResource {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FontResource {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl core::fmt::Display for FontResource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A font resource at one pixel size.
///
/// Immutable: fitting builds a new value per candidate size instead of
/// resizing a shared font object.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResolvedFont {
    pub resource: FontResource,
    pub size_px: u32,
}

impl ResolvedFont {
    pub fn new(resource: FontResource, size_px: u32) -> Self {
        Self { resource, size_px }
    }
}

/// Primary/fallback face pair plus descending candidate sizes for one text role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontSpec {
    primary: FontResource,
    fallback: FontResource,
    candidate_sizes: Vec<u32>,
}

impl FontSpec {
    /// Validate and build a spec. Sizes must be non-empty, positive and
    /// strictly descending.
    pub fn new(
        primary: FontResource,
        fallback: FontResource,
        candidate_sizes: Vec<u32>,
    ) -> Result<Self, ConfigurationError> {
        if candidate_sizes.is_empty() {
            return Err(ConfigurationError::EmptyCandidateSizes);
        }
        if let Some(&zero) = candidate_sizes.iter().find(|size| **size == 0) {
            return Err(ConfigurationError::InvalidCandidateSize(zero));
        }
        if let Some(pair) = candidate_sizes.windows(2).find(|pair| pair[0] <= pair[1]) {
            return Err(ConfigurationError::CandidateSizesNotDescending {
                previous: pair[0],
                next: pair[1],
            });
        }
        Ok(Self {
            primary,
            fallback,
            candidate_sizes,
        })
    }

    /// Spec with a single fixed size.
    pub fn fixed(
        primary: FontResource,
        fallback: FontResource,
        size_px: u32,
    ) -> Result<Self, ConfigurationError> {
        Self::new(primary, fallback, vec![size_px])
    }

    pub fn primary(&self) -> &FontResource {
        &self.primary
    }

    pub fn fallback(&self) -> &FontResource {
        &self.fallback
    }

    /// Candidate sizes, largest first. Never empty.
    pub fn candidate_sizes(&self) -> &[u32] {
        &self.candidate_sizes
    }

    /// Largest candidate size.
    pub fn largest(&self) -> u32 {
        self.candidate_sizes[0]
    }

    /// Smallest candidate size.
    pub fn smallest(&self) -> u32 {
        self.candidate_sizes[self.candidate_sizes.len() - 1]
    }

    /// Both resources, primary first.
    pub fn resources(&self) -> [&FontResource; 2] {
        [&self.primary, &self.fallback]
    }
}

/// Vertical metrics of a resolved font, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineMetrics {
    /// Distance from the top of the line box to the baseline.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the line box (positive).
    pub descent: f32,
    /// Extra spacing between consecutive lines.
    pub line_gap: f32,
}

impl LineMetrics {
    /// Height of one line box, without the gap.
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }

    /// Baseline-to-baseline advance between lines.
    pub fn advance(&self) -> f32 {
        self.height() + self.line_gap
    }
}

/// Measured extent of a (possibly multi-line) text block.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextSize {
    pub width: f32,
    pub height: f32,
}

/// Width and height queries for text in a resolved font.
///
/// Backends that also draw must answer through the same glyph layout they
/// rasterize with; fitting decisions are only valid if measurement and
/// drawing agree.
pub trait TextMeasurer {
    /// Advance width of a single line of text.
    fn text_width(&self, text: &str, font: &ResolvedFont) -> f32;

    /// Vertical metrics of the font.
    fn line_metrics(&self, font: &ResolvedFont) -> LineMetrics;

    /// Extent of a block whose lines are separated by `\n`.
    fn text_size(&self, text: &str, font: &ResolvedFont) -> TextSize {
        let metrics = self.line_metrics(font);
        let mut width = 0.0f32;
        let mut lines = 0usize;
        for line in text.split('\n') {
            width = width.max(self.text_width(line, font));
            lines += 1;
        }
        let height = if lines == 0 {
            0.0
        } else {
            metrics.height() + (lines - 1) as f32 * metrics.advance()
        };
        TextSize { width, height }
    }
}

/// Whether a font resource has a glyph for every character of a string.
pub trait GlyphCoverage {
    fn supports(&self, resource: &FontResource, text: &str) -> bool;
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn text_width(&self, text: &str, font: &ResolvedFont) -> f32 {
        (**self).text_width(text, font)
    }

    fn line_metrics(&self, font: &ResolvedFont) -> LineMetrics {
        (**self).line_metrics(font)
    }

    fn text_size(&self, text: &str, font: &ResolvedFont) -> TextSize {
        (**self).text_size(text, font)
    }
}

impl<T: GlyphCoverage + ?Sized> GlyphCoverage for &T {
    fn supports(&self, resource: &FontResource, text: &str) -> bool {
        (**self).supports(resource, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(name: &str) -> FontResource {
        FontResource::new(name)
    }

    #[test]
    fn spec_requires_sizes() {
        assert_eq!(
            FontSpec::new(res("a"), res("b"), vec![]),
            Err(ConfigurationError::EmptyCandidateSizes)
        );
    }

    #[test]
    fn spec_requires_descending_sizes() {
        assert_eq!(
            FontSpec::new(res("a"), res("b"), vec![40, 50]),
            Err(ConfigurationError::CandidateSizesNotDescending {
                previous: 40,
                next: 50
            })
        );
        assert!(FontSpec::new(res("a"), res("b"), vec![40, 40]).is_err());
    }

    #[test]
    fn spec_rejects_zero_size() {
        assert_eq!(
            FontSpec::new(res("a"), res("b"), vec![20, 0]),
            Err(ConfigurationError::InvalidCandidateSize(0))
        );
    }

    #[test]
    fn spec_exposes_extremes() {
        let spec = FontSpec::new(res("a"), res("b"), vec![70, 60, 50, 40]).unwrap();
        assert_eq!(spec.largest(), 70);
        assert_eq!(spec.smallest(), 40);
    }

    struct Fixed;

    impl TextMeasurer for Fixed {
        fn text_width(&self, text: &str, _font: &ResolvedFont) -> f32 {
            text.chars().count() as f32 * 10.0
        }

        fn line_metrics(&self, _font: &ResolvedFont) -> LineMetrics {
            LineMetrics {
                ascent: 8.0,
                descent: 2.0,
                line_gap: 2.0,
            }
        }
    }

    #[test]
    fn text_size_uses_widest_line_and_line_advance() {
        let font = ResolvedFont::new(res("a"), 10);
        let size = Fixed.text_size("abc\nabcdef", &font);
        assert_eq!(size.width, 60.0);
        assert_eq!(size.height, 22.0);
    }
}
