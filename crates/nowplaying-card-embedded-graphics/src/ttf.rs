//! Outline font backend for TTF/OTF faces, rasterized with hard 1-bit edges.

use std::collections::BTreeMap;
use std::path::Path;

use ab_glyph::{point, Font, FontArc, Glyph, GlyphId, PxScale, ScaleFont};
use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};
use nowplaying_card::{
    ConfigurationError, FontResource, GlyphCoverage, LineMetrics, ResolvedFont, TextMeasurer,
};

use crate::FontBackend;

/// Coverage at or above this is drawn; e-ink has no gray levels to spend on
/// anti-aliasing.
const COVERAGE_THRESHOLD: f32 = 0.5;

/// Named outline faces. Resource names are whatever the caller registers
/// them under and are matched exactly.
#[derive(Clone, Default)]
pub struct TtfFontBackend {
    faces: BTreeMap<FontResource, FontArc>,
}

impl core::fmt::Debug for TtfFontBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TtfFontBackend")
            .field("faces", &self.faces.keys().collect::<Vec<_>>())
            .finish()
    }
}

struct LaidOutRun {
    glyphs: Vec<Glyph>,
    width: f32,
}

impl TtfFontBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a face from raw font bytes, replacing any face of the same name.
    pub fn register_face(
        &mut self,
        resource: FontResource,
        data: Vec<u8>,
    ) -> Result<(), ConfigurationError> {
        let face = FontArc::try_from_vec(data)
            .map_err(|_| ConfigurationError::InvalidFontData(resource.name().to_string()))?;
        log::debug!("registered font face '{}'", resource);
        self.faces.insert(resource, face);
        Ok(())
    }

    /// Read and register a face file.
    pub fn load_face_file(
        &mut self,
        resource: FontResource,
        path: impl AsRef<Path>,
    ) -> Result<(), ConfigurationError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|err| ConfigurationError::UnreadableFontResource {
            name: resource.name().to_string(),
            reason: format!("{}: {}", path.display(), err),
        })?;
        self.register_face(resource, data)
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn face(&self, resource: &FontResource) -> Option<&FontArc> {
        let face = self.faces.get(resource);
        if face.is_none() {
            log::debug!("font face '{}' is not registered", resource);
        }
        face
    }

    /// Glyph positions for one line, caret starting at x = 0 on the baseline.
    ///
    /// Measuring and drawing both go through here so their widths agree.
    fn lay_out(face: &FontArc, size_px: u32, text: &str) -> LaidOutRun {
        let scale = PxScale::from(size_px as f32);
        let scaled = face.as_scaled(scale);
        let mut glyphs = Vec::with_capacity(text.len());
        let mut caret = 0.0f32;
        let mut previous: Option<GlyphId> = None;
        for ch in text.chars().filter(|ch| !ch.is_control()) {
            let id = face.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            glyphs.push(id.with_scale_and_position(scale, point(caret, 0.0)));
            caret += scaled.h_advance(id);
            previous = Some(id);
        }
        LaidOutRun {
            glyphs,
            width: caret,
        }
    }
}

impl TextMeasurer for TtfFontBackend {
    fn text_width(&self, text: &str, font: &ResolvedFont) -> f32 {
        match self.face(&font.resource) {
            Some(face) => Self::lay_out(face, font.size_px, text).width,
            None => 0.0,
        }
    }

    fn line_metrics(&self, font: &ResolvedFont) -> LineMetrics {
        let size = font.size_px as f32;
        match self.face(&font.resource) {
            Some(face) => {
                let scaled = face.as_scaled(PxScale::from(size));
                LineMetrics {
                    ascent: scaled.ascent(),
                    descent: -scaled.descent(),
                    line_gap: scaled.line_gap(),
                }
            }
            None => LineMetrics {
                ascent: size * 0.8,
                descent: size * 0.2,
                line_gap: 0.0,
            },
        }
    }
}

impl GlyphCoverage for TtfFontBackend {
    fn supports(&self, resource: &FontResource, text: &str) -> bool {
        let Some(face) = self.face(resource) else {
            return false;
        };
        text.chars()
            .filter(|ch| !ch.is_control())
            .all(|ch| face.glyph_id(ch).0 != 0)
    }
}

impl FontBackend for TtfFontBackend {
    fn has_resource(&self, resource: &FontResource) -> bool {
        self.faces.contains_key(resource)
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
        let Some(face) = self.face(&font.resource) else {
            return Ok(0);
        };
        let ascent = face.as_scaled(PxScale::from(font.size_px as f32)).ascent();
        let baseline = origin.y as f32 + ascent;
        let run = Self::lay_out(face, font.size_px, text);

        let mut pixels = Vec::new();
        for mut glyph in run.glyphs {
            glyph.position = point(origin.x as f32 + glyph.position.x, baseline);
            let Some(outlined) = face.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                if coverage >= COVERAGE_THRESHOLD {
                    pixels.push(Pixel(
                        Point::new(bounds.min.x as i32 + gx as i32, bounds.min.y as i32 + gy as i32),
                        color,
                    ));
                }
            });
        }
        display.draw_iter(pixels)?;
        Ok(run.width.round() as i32)
    }
}
