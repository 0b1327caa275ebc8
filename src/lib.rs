//! Caption layout and text fitting for tri-color e-ink "now playing" cards.
//!
//! This crate is backend-agnostic: it decides which font, which size and
//! which (possibly shortened) text goes where on the card. Rasterizing the
//! result onto ink/accent planes lives in `nowplaying-card-embedded-graphics`.

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

pub mod error;
pub mod fit;
pub mod font;
pub mod layout;
pub mod metadata;

pub use error::{CardError, ConfigurationError, InputValidationError};
pub use fit::{FittedText, TextFitter, ELLIPSIS};
pub use font::{
    FontResource, FontSpec, GlyphCoverage, LineMetrics, ResolvedFont, TextMeasurer, TextSize,
};
pub use layout::{
    center_full_height, fit_inside, scale_to_height, CanvasSize, HAlign, HighlightBar,
    PosterLayout, PosterLayoutConfig, Position, Rect, StandardLayout, StandardLayoutConfig,
    TextAnchor, TrackDot, VAlign,
};
pub use metadata::TrackMetadata;

/// Font specs for each text role on a card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardFonts {
    pub title: FontSpec,
    pub album: FontSpec,
    pub artist: FontSpec,
}

impl CardFonts {
    /// Every resource referenced by any role, primary before fallback.
    pub fn resources(&self) -> impl Iterator<Item = &FontResource> {
        [&self.title, &self.album, &self.artist]
            .into_iter()
            .flat_map(|spec| spec.resources())
    }
}
