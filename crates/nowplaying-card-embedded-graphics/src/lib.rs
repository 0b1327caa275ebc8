//! embedded-graphics rasterizer for `nowplaying-card` layouts.
//!
//! Renders a card onto two packed 1-bit planes, one per panel color, ready
//! to hand to a tri-color e-ink driver.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};
use nowplaying_card::{FontResource, GlyphCoverage, ResolvedFont, TextMeasurer};

pub mod art;
pub mod canvas;
pub mod mono;
pub mod plane;
pub mod renderer;
#[cfg(feature = "ttf-backend")]
pub mod ttf;

pub use art::{
    mirror_tile, resize_art, Dither, FloydSteinbergDither, NoDither, TriTone, TriTonePalette,
};
pub use canvas::{DualPlaneCanvas, PlaneSelect};
pub use mono::MonoFontBackend;
pub use plane::{CardPlanes, Plane, PlaneError};
pub use renderer::{
    AnyCardRenderer, CardRenderer, CardVariant, PosterCard, RawArtCard, StandardCard,
};
#[cfg(feature = "ttf-backend")]
pub use ttf::TtfFontBackend;

/// Font abstraction used by the canvas text paths.
///
/// Measurement and drawing must agree: a run drawn at `origin` covers
/// `text_width` pixels to its right and one line box below.
pub trait FontBackend: TextMeasurer + GlyphCoverage {
    /// Whether `resource` is loaded and can be drawn.
    fn has_resource(&self, resource: &FontResource) -> bool;

    /// Draw a single line with `origin` at the top-left of its line box.
    /// Only glyph pixels are written, in `color`. Returns the advance in pixels.
    fn draw_text_run<D>(
        &self,
        display: &mut D,
        font: &ResolvedFont,
        text: &str,
        origin: Point,
        color: BinaryColor,
    ) -> Result<i32, D::Error>
    where
        D: DrawTarget<Color = BinaryColor>;
}

impl<T: FontBackend + ?Sized> FontBackend for &T {
    fn has_resource(&self, resource: &FontResource) -> bool {
        (**self).has_resource(resource)
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
        (**self).draw_text_run(display, font, text, origin, color)
    }
}
