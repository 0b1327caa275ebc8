//! Built-in bitmap font backend backed by embedded-graphics mono fonts.

use std::borrow::Cow;

use embedded_graphics::{
    mono_font::{
        iso_8859_1::{
            FONT_10X20, FONT_4X6, FONT_5X7, FONT_5X8, FONT_6X10, FONT_6X12, FONT_6X9, FONT_7X13,
            FONT_7X14, FONT_9X15, FONT_9X18,
        },
        MonoFont, MonoTextStyle,
    },
    pixelcolor::BinaryColor,
    prelude::*,
    text::{renderer::TextRenderer, Baseline, Text},
};
use nowplaying_card::{
    CardFonts, ConfigurationError, FontResource, FontSpec, GlyphCoverage, LineMetrics,
    ResolvedFont, TextMeasurer,
};

use crate::FontBackend;

/// Smallest first; selection walks this by cell height.
const FONTS: [&MonoFont<'static>; 11] = [
    &FONT_4X6, &FONT_5X7, &FONT_5X8, &FONT_6X9, &FONT_6X10, &FONT_6X12, &FONT_7X13, &FONT_7X14,
    &FONT_9X15, &FONT_9X18, &FONT_10X20,
];

const LINE_GAP: f32 = 2.0;

/// Fixed-cell Latin-1 fonts from 6 to 20 px tall, available without any
/// font files.
///
/// A resolved size maps to the tallest face no taller than `size_px`, so
/// large candidate sizes all collapse to 10x20. Useful for previews, tests
/// and panels without storage for TTF data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonoFontBackend;

impl MonoFontBackend {
    /// The only resource name this backend answers to.
    pub const RESOURCE: &'static str = "mono";

    pub fn resource() -> FontResource {
        FontResource::new(Self::RESOURCE)
    }

    /// Card fonts using the built-in faces for every role.
    pub fn card_fonts() -> Result<CardFonts, ConfigurationError> {
        let spec = |sizes: Vec<u32>| FontSpec::new(Self::resource(), Self::resource(), sizes);
        Ok(CardFonts {
            title: spec(vec![20, 18, 15, 13, 10])?,
            album: spec(vec![18, 15, 13, 10])?,
            artist: spec(vec![18, 15, 13, 10, 8])?,
        })
    }

    fn font_for(size_px: u32) -> &'static MonoFont<'static> {
        FONTS
            .iter()
            .rev()
            .find(|font| font.character_size.height <= size_px)
            .copied()
            .unwrap_or(FONTS[0])
    }

    fn style_for(font: &ResolvedFont, color: BinaryColor) -> MonoTextStyle<'static, BinaryColor> {
        MonoTextStyle::new(Self::font_for(font.size_px), color)
    }

    fn is_latin1_printable(ch: char) -> bool {
        matches!(ch as u32, 0x20..=0x7E | 0xA0..=0xFF)
    }
}

impl TextMeasurer for MonoFontBackend {
    fn text_width(&self, text: &str, font: &ResolvedFont) -> f32 {
        let style = Self::style_for(font, BinaryColor::On);
        let normalized = normalize_text_for_mono(text);
        let metrics = style.measure_string(normalized.as_ref(), Point::zero(), Baseline::Top);
        metrics.next_position.x as f32
    }

    fn line_metrics(&self, font: &ResolvedFont) -> LineMetrics {
        let face = Self::font_for(font.size_px);
        let height = face.character_size.height as f32;
        let ascent = face.baseline as f32;
        LineMetrics {
            ascent,
            descent: height - ascent,
            line_gap: LINE_GAP,
        }
    }
}

impl GlyphCoverage for MonoFontBackend {
    fn supports(&self, resource: &FontResource, text: &str) -> bool {
        resource.name() == Self::RESOURCE
            && normalize_text_for_mono(text)
                .chars()
                .filter(|ch| !ch.is_control())
                .all(Self::is_latin1_printable)
    }
}

impl FontBackend for MonoFontBackend {
    fn has_resource(&self, resource: &FontResource) -> bool {
        resource.name() == Self::RESOURCE
    }

    fn draw_text_run<D>(
        &self,
        display: &mut D,
        font: &ResolvedFont,
        text: &str,
        origin: Point,
        color: BinaryColor,
    ) -> Result<i32, D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let style = Self::style_for(font, color);
        let normalized = normalize_text_for_mono(text);
        let next = Text::with_baseline(normalized.as_ref(), origin, style, Baseline::Top)
            .draw(display)?;
        Ok(next.x - origin.x)
    }
}

/// Map typographic punctuation onto the ASCII the mono faces carry.
pub(crate) fn normalize_text_for_mono(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|ch| {
        matches!(
            ch,
            '\u{00A0}' // nbsp
                | '\u{2013}' // en dash
                | '\u{2014}' // em dash
                | '\u{2018}' // left single quote
                | '\u{2019}' // right single quote
                | '\u{201C}' // left double quote
                | '\u{201D}' // right double quote
                | '\u{2026}' // ellipsis
        )
    }) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{00A0}' => out.push(' '),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2026}' => out.push_str("..."),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}
