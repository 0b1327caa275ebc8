//! Drawing surface made of an ink plane and an accent plane.
//!
//! Every primitive names the plane(s) it writes to. Composition order is
//! the caller's job: later draws overwrite earlier ones on the same plane.

use core::convert::Infallible;

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Ellipse, PrimitiveStyleBuilder, Rectangle},
};
use image::RgbImage;
use nowplaying_card::{
    CanvasSize, HAlign, HighlightBar, Position, Rect, ResolvedFont, TextAnchor,
};

use crate::art::{TriTone, TriTonePalette};
use crate::plane::{CardPlanes, Plane};
use crate::FontBackend;

/// Which plane(s) a primitive targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaneSelect {
    Ink,
    Accent,
    Both,
}

fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

fn shadow_offsets(shadow: i32) -> [(i32, i32); 2] {
    [(shadow, shadow), (-shadow, -shadow)]
}

fn to_point(p: Position) -> Point {
    Point::new(p.x, p.y)
}

fn to_rectangle(rect: Rect) -> Rectangle {
    Rectangle::new(Point::new(rect.x, rect.y), Size::new(rect.width, rect.height))
}

/// Two same-sized planes, both starting as background.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DualPlaneCanvas {
    ink: Plane,
    accent: Plane,
}

impl DualPlaneCanvas {
    pub fn new(size: CanvasSize) -> Self {
        Self {
            ink: Plane::new(size),
            accent: Plane::new(size),
        }
    }

    pub fn size(&self) -> CanvasSize {
        self.ink.canvas_size()
    }

    pub fn ink(&self) -> &Plane {
        &self.ink
    }

    pub fn accent(&self) -> &Plane {
        &self.accent
    }

    fn planes_mut(&mut self, select: PlaneSelect) -> impl Iterator<Item = &mut Plane> {
        let (ink, accent) = match select {
            PlaneSelect::Ink => (Some(&mut self.ink), None),
            PlaneSelect::Accent => (None, Some(&mut self.accent)),
            PlaneSelect::Both => (Some(&mut self.ink), Some(&mut self.accent)),
        };
        ink.into_iter().chain(accent)
    }

    /// Fill `rect` with `color` (`On` marks, `Off` clears).
    pub fn fill_rect(&mut self, select: PlaneSelect, rect: Rect, color: BinaryColor) {
        let shape = to_rectangle(rect);
        for plane in self.planes_mut(select) {
            infallible(plane.fill_solid(&shape, color));
        }
    }

    /// Ellipse inscribed in `bounds`, with optional fill and 1px outline.
    pub fn fill_ellipse(
        &mut self,
        select: PlaneSelect,
        bounds: Rect,
        fill: Option<BinaryColor>,
        outline: Option<BinaryColor>,
    ) {
        let mut style = PrimitiveStyleBuilder::new();
        if let Some(color) = fill {
            style = style.fill_color(color);
        }
        if let Some(color) = outline {
            style = style.stroke_color(color).stroke_width(1);
        }
        let shape = Ellipse::new(
            Point::new(bounds.x, bounds.y),
            Size::new(bounds.width, bounds.height),
        )
        .into_styled(style.build());
        for plane in self.planes_mut(select) {
            infallible(shape.draw(plane));
        }
    }

    /// Single-line text positioned by `anchor` relative to `at`.
    pub fn draw_text<B: FontBackend>(
        &mut self,
        select: PlaneSelect,
        backend: &B,
        font: &ResolvedFont,
        text: &str,
        at: Position,
        anchor: TextAnchor,
        color: BinaryColor,
    ) {
        let size = backend.text_size(text, font);
        let top_left = anchor.top_left(at, size, backend.line_metrics(font));
        for plane in self.planes_mut(select) {
            infallible(backend.draw_text_run(plane, font, text, to_point(top_left), color));
        }
    }

    /// Multi-line block; lines split on `\n` and aligned within the block
    /// by the anchor's horizontal alignment.
    pub fn draw_multiline_text<B: FontBackend>(
        &mut self,
        select: PlaneSelect,
        backend: &B,
        font: &ResolvedFont,
        text: &str,
        at: Position,
        anchor: TextAnchor,
        color: BinaryColor,
    ) {
        let block = backend.text_size(text, font);
        let metrics = backend.line_metrics(font);
        let top_left = anchor.top_left(at, block, metrics);
        let advance = metrics.advance();

        for (i, line) in text.split('\n').enumerate() {
            let line_w = backend.text_width(line, font);
            let x = match anchor.horizontal {
                HAlign::Left => top_left.x as f32,
                HAlign::Center => top_left.x as f32 + (block.width - line_w) / 2.0,
                HAlign::Right => top_left.x as f32 + block.width - line_w,
            };
            let y = top_left.y as f32 + i as f32 * advance;
            let origin = Point::new(x.round() as i32, y.round() as i32);
            for plane in self.planes_mut(select) {
                infallible(backend.draw_text_run(plane, font, line, origin, color));
            }
        }
    }

    /// Faux-bold text on one plane: the text in `background` at `at + shadow`
    /// and `at - shadow` along the diagonal, then in the inverse color on top.
    pub fn draw_shadowed_text<B: FontBackend>(
        &mut self,
        select: PlaneSelect,
        backend: &B,
        font: &ResolvedFont,
        text: &str,
        at: Position,
        anchor: TextAnchor,
        background: BinaryColor,
        shadow: i32,
    ) {
        for (dx, dy) in shadow_offsets(shadow) {
            self.draw_text(
                select,
                backend,
                font,
                text,
                Position::new(at.x + dx, at.y + dy),
                anchor,
                background,
            );
        }
        self.draw_text(select, backend, font, text, at, anchor, background.invert());
    }

    /// Text on a solid accent bar.
    ///
    /// The bar is accent-only: it is cleared on the ink plane before the
    /// shadowed title goes on top, and the same title strokes are cut out
    /// of the accent bar so no pixel is marked on both planes.
    pub fn draw_highlighted_text<B: FontBackend>(
        &mut self,
        backend: &B,
        font: &ResolvedFont,
        text: &str,
        highlight: &HighlightBar,
        shadow: i32,
    ) {
        self.fill_rect(PlaneSelect::Accent, highlight.bar, BinaryColor::On);
        self.fill_rect(PlaneSelect::Ink, highlight.bar, BinaryColor::Off);

        // Shadow strokes stay background on both planes; the text proper is
        // ink on the ink plane and cut out of the accent bar.
        self.draw_shadowed_text(
            PlaneSelect::Ink,
            backend,
            font,
            text,
            highlight.text_at,
            highlight.anchor,
            BinaryColor::Off,
            shadow,
        );
        let [first, second] = shadow_offsets(shadow);
        for (dx, dy) in [first, second, (0, 0)] {
            self.draw_text(
                PlaneSelect::Accent,
                backend,
                font,
                text,
                Position::new(highlight.text_at.x + dx, highlight.text_at.y + dy),
                highlight.anchor,
                BinaryColor::Off,
            );
        }
    }

    /// Copy a tri-tone image onto both planes with its top-left at `origin`.
    ///
    /// Each pixel is classified by `palette`: ink marks only the ink plane,
    /// accent only the accent plane, background clears both.
    pub fn blit_tritone(&mut self, image: &RgbImage, origin: Position, palette: &TriTonePalette) {
        for (x, y, pixel) in image.enumerate_pixels() {
            let px = origin.x + x as i32;
            let py = origin.y + y as i32;
            let (ink, accent) = match palette.classify(*pixel) {
                TriTone::Ink => (true, false),
                TriTone::Accent => (false, true),
                TriTone::Background => (false, false),
            };
            self.ink.set(px, py, ink);
            self.accent.set(px, py, accent);
        }
    }

    pub fn into_planes(self) -> CardPlanes {
        CardPlanes {
            ink: self.ink,
            accent: self.accent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mono::MonoFontBackend;
    use image::Rgb;
    use nowplaying_card::{TextMeasurer, VAlign};

    fn canvas() -> DualPlaneCanvas {
        DualPlaneCanvas::new(CanvasSize::new(120, 60).unwrap())
    }

    fn mono(size: u32) -> ResolvedFont {
        ResolvedFont::new(MonoFontBackend::resource(), size)
    }

    #[test]
    fn fill_rect_targets_selected_planes() {
        let mut canvas = canvas();
        let rect = Rect::new(10, 10, 5, 5);
        canvas.fill_rect(PlaneSelect::Accent, rect, BinaryColor::On);
        assert_eq!(canvas.accent().marked_in(rect), 25);
        assert_eq!(canvas.ink().marked_count(), 0);

        canvas.fill_rect(PlaneSelect::Both, rect, BinaryColor::On);
        canvas.fill_rect(PlaneSelect::Both, Rect::new(10, 10, 2, 5), BinaryColor::Off);
        assert_eq!(canvas.ink().marked_in(rect), 15);
        assert_eq!(canvas.accent().marked_in(rect), 15);
    }

    #[test]
    fn hollow_ellipse_leaves_centre_clear() {
        let mut canvas = canvas();
        let bounds = Rect::new(20, 20, 11, 11);
        canvas.fill_ellipse(PlaneSelect::Ink, bounds, None, Some(BinaryColor::On));
        assert!(!canvas.ink().is_marked(25, 25));
        assert!(canvas.ink().marked_in(bounds) > 0);

        canvas.fill_ellipse(PlaneSelect::Ink, bounds, Some(BinaryColor::On), None);
        assert!(canvas.ink().is_marked(25, 25));
    }

    #[test]
    fn text_stays_inside_anchored_box() {
        let backend = MonoFontBackend;
        let mut canvas = canvas();
        let font = mono(10);
        let size = backend.text_size("Hello", &font);
        canvas.draw_text(
            PlaneSelect::Ink,
            &backend,
            &font,
            "Hello",
            Position::new(60, 30),
            TextAnchor::CENTER,
            BinaryColor::On,
        );
        let block = Rect::new(
            60 - (size.width / 2.0).round() as i32,
            30 - (size.height / 2.0).round() as i32,
            size.width as u32,
            size.height as u32,
        );
        assert!(canvas.ink().marked_count() > 0);
        assert_eq!(canvas.ink().marked_in(block), canvas.ink().marked_count());
    }

    #[test]
    fn multiline_right_alignment_shares_right_edge() {
        let backend = MonoFontBackend;
        let mut canvas = canvas();
        let font = mono(10);
        canvas.draw_multiline_text(
            PlaneSelect::Ink,
            &backend,
            &font,
            "ab\nabcdef",
            Position::new(100, 0),
            TextAnchor::new(HAlign::Right, VAlign::Top),
            BinaryColor::On,
        );
        // 6px cells: the short line starts at 100 - 12, the long at 100 - 36.
        assert_eq!(canvas.ink().marked_in(Rect::new(0, 0, 88, 10)), 0);
        assert!(canvas.ink().marked_in(Rect::new(64, 12, 36, 10)) > 0);
        assert_eq!(canvas.ink().marked_in(Rect::new(100, 0, 20, 60)), 0);
    }

    #[test]
    fn highlight_never_marks_both_planes() {
        let backend = MonoFontBackend;
        let mut canvas = canvas();
        canvas.fill_rect(PlaneSelect::Ink, Rect::new(0, 0, 120, 60), BinaryColor::On);
        let bar = HighlightBar {
            bar: Rect::new(20, 15, 80, 30),
            text_at: Position::new(60, 30),
            anchor: TextAnchor::CENTER,
        };
        canvas.draw_highlighted_text(&backend, &mono(20), "Hey", &bar, 1);
        let planes = canvas.into_planes();
        assert_eq!(planes.double_inked_in(bar.bar), 0);
        assert!(planes.ink.marked_in(bar.bar) > 0);
        assert!(planes.accent.marked_in(bar.bar) > 0);
        // Outside the bar the ink fill is untouched.
        assert!(planes.ink.is_marked(5, 5));
    }

    #[test]
    fn blit_splits_tones_across_planes() {
        let palette = TriTonePalette::default();
        let image = RgbImage::from_fn(3, 1, |x, _| match x {
            0 => palette.ink,
            1 => palette.accent,
            _ => Rgb([250, 250, 250]),
        });
        let mut canvas = canvas();
        canvas.fill_rect(PlaneSelect::Both, Rect::new(0, 0, 3, 1), BinaryColor::On);
        canvas.blit_tritone(&image, Position::new(0, 0), &palette);
        assert!(canvas.ink().is_marked(0, 0) && !canvas.accent().is_marked(0, 0));
        assert!(!canvas.ink().is_marked(1, 0) && canvas.accent().is_marked(1, 0));
        assert!(!canvas.ink().is_marked(2, 0) && !canvas.accent().is_marked(2, 0));
    }
}
