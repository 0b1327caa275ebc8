//! Shrink-to-fit font selection, truncation and greedy word wrapping.
//!
//! Everything here is pure given a [`TextMeasurer`] and a [`GlyphCoverage`];
//! no drawing surface is involved.

use crate::font::{FontResource, FontSpec, GlyphCoverage, ResolvedFont, TextMeasurer, TextSize};

/// Marker appended to shortened text.
pub const ELLIPSIS: &str = "...";

/// Text after fitting, with the font it was fitted for.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedText {
    /// Possibly truncated or line-wrapped text.
    pub text: String,
    pub font: ResolvedFont,
    /// Extent of `text` in `font`.
    pub measured: TextSize,
    /// The text did not fit even at the smallest candidate size.
    pub degraded: bool,
}

/// Fitting operations over a measurer and a coverage oracle.
///
/// Usually both are the same font backend; tests can pair a fake measurer
/// with a coverage stub to force fallback paths.
pub struct TextFitter<'a, M: ?Sized, C: ?Sized = M> {
    measurer: &'a M,
    coverage: &'a C,
}

impl<'a, B> TextFitter<'a, B, B>
where
    B: TextMeasurer + GlyphCoverage + ?Sized,
{
    pub fn new(backend: &'a B) -> Self {
        Self {
            measurer: backend,
            coverage: backend,
        }
    }
}

impl<'a, M, C> TextFitter<'a, M, C>
where
    M: TextMeasurer + ?Sized,
    C: GlyphCoverage + ?Sized,
{
    pub fn with_coverage(measurer: &'a M, coverage: &'a C) -> Self {
        Self { measurer, coverage }
    }

    /// Primary resource when it covers every character, the fallback otherwise.
    pub fn resource_for<'s>(&self, spec: &'s FontSpec, text: &str) -> &'s FontResource {
        if self.coverage.supports(spec.primary(), text) {
            spec.primary()
        } else {
            log::debug!(
                "font '{}' lacks glyphs for {:?}; using '{}'",
                spec.primary(),
                text,
                spec.fallback()
            );
            spec.fallback()
        }
    }

    /// Shorten `text` so it fits `max_width`, appending [`ELLIPSIS`].
    ///
    /// Text that already fits is returned unchanged. The cut point is a
    /// linear estimate from the width of `text + "..."`, so the result can
    /// overshoot or undershoot by a few characters with proportional fonts.
    /// Every space left at the cut is dropped, not just the last one, so the
    /// ellipsis never follows a space.
    pub fn truncate_to_width(&self, max_width: f32, font: &ResolvedFont, text: &str) -> String {
        if self.measurer.text_width(text, font) <= max_width {
            return text.to_string();
        }

        let chars: Vec<char> = text.chars().collect();
        let with_ellipsis = format!("{}{}", text, ELLIPSIS);
        let full_width = self.measurer.text_width(&with_ellipsis, font);
        let ratio = if full_width > 0.0 {
            max_width / full_width
        } else {
            0.0
        };
        let estimate = (chars.len() as f32 * ratio).floor();
        let mut cut = if estimate.is_finite() && estimate > 0.0 {
            (estimate as usize).min(chars.len())
        } else {
            0
        };
        while cut > 0 && chars[cut - 1] == ' ' {
            cut -= 1;
        }

        if cut == 0 || self.measurer.text_width(ELLIPSIS, font) > max_width {
            log::warn!(
                "degraded fit: {:?} cannot be shown in {:.1}px at {}px '{}'",
                text,
                max_width,
                font.size_px,
                font.resource
            );
        }

        let mut out: String = chars[..cut].iter().collect();
        out.push_str(ELLIPSIS);
        out
    }

    /// Greedy word wrap; lines are joined with `\n`.
    ///
    /// A line is broken when appending the next word would reach or exceed
    /// `max_width`. A single word wider than `max_width` is truncated on its
    /// own line.
    pub fn wrap_to_width(&self, max_width: f32, font: &ResolvedFont, text: &str) -> String {
        if self.measurer.text_width(text, font) <= max_width {
            return text.to_string();
        }

        let mut lines: Vec<String> = Vec::new();
        let mut line = String::new();
        for word in text.split_whitespace() {
            let word_too_wide = self.measurer.text_width(word, font) > max_width;
            if line.is_empty() {
                line = self.start_line(max_width, font, word, word_too_wide);
                continue;
            }
            let candidate = format!("{} {}", line, word);
            if word_too_wide || self.measurer.text_width(&candidate, font) >= max_width {
                lines.push(core::mem::take(&mut line));
                line = self.start_line(max_width, font, word, word_too_wide);
            } else {
                line = candidate;
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
        lines.join("\n")
    }

    fn start_line(&self, max_width: f32, font: &ResolvedFont, word: &str, too_wide: bool) -> String {
        if too_wide {
            self.truncate_to_width(max_width, font, word)
        } else {
            word.to_string()
        }
    }

    /// Largest candidate size at which `text` needs no truncation, or the
    /// smallest candidate when none qualifies.
    pub fn select_fitting_font(&self, max_width: f32, spec: &FontSpec, text: &str) -> ResolvedFont {
        let resource = self.resource_for(spec, text);
        for &size in spec.candidate_sizes() {
            let font = ResolvedFont::new(resource.clone(), size);
            if self.truncate_to_width(max_width, &font, text) == text {
                log::debug!("fitted {:?} at {}px '{}'", text, size, resource);
                return font;
            }
        }
        log::warn!(
            "degraded fit: {:?} exceeds {:.1}px even at {}px '{}'",
            text,
            max_width,
            spec.smallest(),
            resource
        );
        ResolvedFont::new(resource.clone(), spec.smallest())
    }

    /// Select a size, then truncate at that size if still needed.
    pub fn fit_text(&self, max_width: f32, spec: &FontSpec, text: &str) -> FittedText {
        let font = self.select_fitting_font(max_width, spec, text);
        let fitted = self.truncate_to_width(max_width, &font, text);
        let degraded = fitted != text;
        let measured = self.measurer.text_size(&fitted, &font);
        FittedText {
            text: fitted,
            font,
            measured,
            degraded,
        }
    }

    /// Wrap `text` into a `max_width` column, shrinking until the block is
    /// no taller than `max_height`.
    pub fn fit_wrapped_text(
        &self,
        max_width: f32,
        max_height: f32,
        spec: &FontSpec,
        text: &str,
    ) -> FittedText {
        let resource = self.resource_for(spec, text);
        for &size in spec.candidate_sizes() {
            let font = ResolvedFont::new(resource.clone(), size);
            let wrapped = self.wrap_to_width(max_width, &font, text);
            let measured = self.measurer.text_size(&wrapped, &font);
            if measured.height <= max_height {
                return FittedText {
                    text: wrapped,
                    font,
                    measured,
                    degraded: false,
                };
            }
        }

        let font = ResolvedFont::new(resource.clone(), spec.smallest());
        let wrapped = self.wrap_to_width(max_width, &font, text);
        let measured = self.measurer.text_size(&wrapped, &font);
        log::warn!(
            "degraded fit: wrapped {:?} is {:.1}px tall, region allows {:.1}px",
            text,
            measured.height,
            max_height
        );
        FittedText {
            text: wrapped,
            font,
            measured,
            degraded: true,
        }
    }
}
