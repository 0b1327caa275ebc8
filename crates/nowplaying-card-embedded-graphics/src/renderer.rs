//! Card renderers: layout, fitting and canvas wired together per variant.

use core::fmt;
use core::str::FromStr;

use embedded_graphics::pixelcolor::BinaryColor;
use image::RgbImage;
use nowplaying_card::{
    center_full_height, CanvasSize, CardError, CardFonts, ConfigurationError, FontSpec,
    InputValidationError, PosterLayout, PosterLayoutConfig, Position, Rect, ResolvedFont,
    StandardLayout, StandardLayoutConfig, TextAnchor, TextFitter, TrackMetadata,
};

use crate::art::{mirror_tile, resize_art, Dither, TriTonePalette};
use crate::canvas::{DualPlaneCanvas, PlaneSelect};
use crate::plane::CardPlanes;
use crate::FontBackend;

/// Produces both planes of a card from album art and track metadata.
///
/// Rendering is synchronous and owns its canvas; a renderer can be reused
/// for any number of calls.
pub trait CardRenderer {
    fn canvas_size(&self) -> CanvasSize;

    fn render(&self, art: &RgbImage, metadata: &TrackMetadata) -> Result<CardPlanes, CardError>;
}

fn validate_inputs(art: &RgbImage, metadata: &TrackMetadata) -> Result<(), InputValidationError> {
    metadata.validate()?;
    let (width, height) = art.dimensions();
    if width == 0 || height == 0 {
        return Err(InputValidationError::InvalidArtDimensions { width, height });
    }
    Ok(())
}

fn ensure_fonts_loaded<B: FontBackend>(
    backend: &B,
    fonts: &CardFonts,
) -> Result<(), ConfigurationError> {
    match fonts.resources().find(|resource| !backend.has_resource(resource)) {
        Some(missing) => Err(ConfigurationError::MissingFontResource(
            missing.name().to_string(),
        )),
        None => Ok(()),
    }
}

/// Mirrored full-canvas background, dithered and split onto both planes.
fn draw_mirrored_background<D: Dither>(
    canvas: &mut DualPlaneCanvas,
    art: &RgbImage,
    dither: &D,
    palette: &TriTonePalette,
) {
    let size = canvas.size();
    let (art_w, art_h) = art.dimensions();
    let art_rect = center_full_height(size, art_w, art_h);
    let background = mirror_tile(art, size.width, size.height, art_rect, palette.background);
    canvas.blit_tritone(&dither.dither(&background), Position::new(0, 0), palette);
}

/// Art column on the left, title bar on the right, album/year band below.
#[derive(Clone, Debug)]
pub struct StandardCard<B, D> {
    backend: B,
    fonts: CardFonts,
    layout: StandardLayout,
    dither: D,
    palette: TriTonePalette,
}

impl<B: FontBackend, D: Dither> StandardCard<B, D> {
    /// Fails when any font in `fonts` is not loaded in `backend`, or the
    /// canvas cannot hold the layout.
    pub fn new(
        backend: B,
        fonts: CardFonts,
        canvas: CanvasSize,
        config: StandardLayoutConfig,
        dither: D,
    ) -> Result<Self, ConfigurationError> {
        ensure_fonts_loaded(&backend, &fonts)?;
        let layout = StandardLayout::new(canvas, config)?;
        Ok(Self {
            backend,
            fonts,
            layout,
            dither,
            palette: TriTonePalette::default(),
        })
    }

    /// Palette used to split dithered art onto the planes.
    pub fn with_palette(mut self, palette: TriTonePalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn layout(&self) -> &StandardLayout {
        &self.layout
    }

    pub fn fonts(&self) -> &CardFonts {
        &self.fonts
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Album left and year right on a shared baseline.
    ///
    /// The album size is picked against the year measured at the largest
    /// candidate, then truncated against the year at the picked size.
    fn draw_band(
        &self,
        canvas: &mut DualPlaneCanvas,
        fitter: &TextFitter<'_, B>,
        metadata: &TrackMetadata,
    ) {
        let spec = &self.fonts.album;
        let year = &metadata.release_year;
        let year_resource = fitter.resource_for(spec, year).clone();

        let probe = ResolvedFont::new(year_resource.clone(), spec.largest());
        let budget = self.layout.album_max_width(self.backend.text_width(year, &probe));
        let album_font = fitter.select_fitting_font(budget, spec, &metadata.album);

        let year_font = ResolvedFont::new(year_resource, album_font.size_px);
        let budget = self.layout.album_max_width(self.backend.text_width(year, &year_font));
        let album = fitter.truncate_to_width(budget, &album_font, &metadata.album);

        let metrics = self.backend.line_metrics(&album_font);
        canvas.draw_text(
            PlaneSelect::Ink,
            &self.backend,
            &album_font,
            &album,
            self.layout.album_at(metrics),
            TextAnchor::LEFT_BASELINE,
            BinaryColor::On,
        );
        canvas.draw_text(
            PlaneSelect::Ink,
            &self.backend,
            &year_font,
            year,
            self.layout.year_at(metrics),
            TextAnchor::RIGHT_BASELINE,
            BinaryColor::On,
        );
    }
}

impl<B: FontBackend, D: Dither> CardRenderer for StandardCard<B, D> {
    fn canvas_size(&self) -> CanvasSize {
        self.layout.canvas()
    }

    fn render(&self, art: &RgbImage, metadata: &TrackMetadata) -> Result<CardPlanes, CardError> {
        validate_inputs(art, metadata)?;
        log::debug!("rendering standard card for {:?}", metadata.song);

        let layout = &self.layout;
        let config = layout.config();
        let fitter = TextFitter::new(&self.backend);
        let mut canvas = DualPlaneCanvas::new(layout.canvas());

        let (art_w, art_h) = art.dimensions();
        let art_rect = layout.art_rect(art_w, art_h);
        let placed = self
            .dither
            .dither(&resize_art(art, art_rect.width, art_rect.height));
        canvas.blit_tritone(&placed, Position::new(art_rect.x, art_rect.y), &self.palette);

        self.draw_band(&mut canvas, &fitter, metadata);

        let title = fitter.fit_text(layout.title_max_width(), &self.fonts.title, &metadata.song);
        let highlight = layout.title_bar(art_rect, title.measured);
        canvas.draw_highlighted_text(
            &self.backend,
            &title.font,
            &title.text,
            &highlight,
            config.shadow_offset,
        );

        let region = layout.artist_region(art_rect, highlight.bar);
        let artist = fitter.fit_wrapped_text(
            region.width as f32,
            region.height as f32,
            &self.fonts.artist,
            &metadata.artist,
        );
        canvas.draw_multiline_text(
            PlaneSelect::Ink,
            &self.backend,
            &artist.font,
            &artist.text,
            Position::new(region.x, region.y),
            TextAnchor::TOP_LEFT,
            BinaryColor::On,
        );

        let dots = layout.track_dots(
            art_rect,
            highlight.bar,
            metadata.track_number,
            metadata.total_tracks,
        );
        for dot in dots {
            canvas.fill_ellipse(
                PlaneSelect::Ink,
                dot.bounds(),
                dot.filled.then_some(BinaryColor::On),
                Some(BinaryColor::On),
            );
        }

        Ok(canvas.into_planes())
    }
}

/// Mirrored art background with the title on an accent band.
#[derive(Clone, Debug)]
pub struct PosterCard<B, D> {
    backend: B,
    fonts: CardFonts,
    layout: PosterLayout,
    dither: D,
    palette: TriTonePalette,
}

impl<B: FontBackend, D: Dither> PosterCard<B, D> {
    pub fn new(
        backend: B,
        fonts: CardFonts,
        canvas: CanvasSize,
        config: PosterLayoutConfig,
        dither: D,
    ) -> Result<Self, ConfigurationError> {
        ensure_fonts_loaded(&backend, &fonts)?;
        let layout = PosterLayout::new(canvas, config)?;
        Ok(Self {
            backend,
            fonts,
            layout,
            dither,
            palette: TriTonePalette::default(),
        })
    }

    pub fn with_palette(mut self, palette: TriTonePalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn layout(&self) -> &PosterLayout {
        &self.layout
    }

    /// Centered single line on a background box cleared on both planes.
    fn draw_backed_text(
        &self,
        canvas: &mut DualPlaneCanvas,
        fitter: &TextFitter<'_, B>,
        region: Rect,
        spec: &FontSpec,
        text: &str,
    ) {
        let padding = self.layout.config().backing_padding as f32;
        let fitted = fitter.fit_text(region.width as f32 - 2.0 * padding, spec, text);
        let backing = self.layout.backing_rect(region, fitted.measured);
        canvas.fill_rect(PlaneSelect::Both, backing, BinaryColor::Off);
        canvas.draw_text(
            PlaneSelect::Ink,
            &self.backend,
            &fitted.font,
            &fitted.text,
            region.center(),
            TextAnchor::CENTER,
            BinaryColor::On,
        );
    }
}

impl<B: FontBackend, D: Dither> CardRenderer for PosterCard<B, D> {
    fn canvas_size(&self) -> CanvasSize {
        self.layout.canvas()
    }

    fn render(&self, art: &RgbImage, metadata: &TrackMetadata) -> Result<CardPlanes, CardError> {
        validate_inputs(art, metadata)?;
        log::debug!("rendering mirrored poster card for {:?}", metadata.song);

        let layout = &self.layout;
        let fitter = TextFitter::new(&self.backend);
        let mut canvas = DualPlaneCanvas::new(layout.canvas());

        draw_mirrored_background(&mut canvas, art, &self.dither, &self.palette);

        let band = layout.accent_band();
        canvas.fill_rect(PlaneSelect::Accent, band, BinaryColor::On);
        canvas.fill_rect(PlaneSelect::Ink, band, BinaryColor::Off);

        let title = fitter.fit_text(layout.title_max_width(), &self.fonts.title, &metadata.song);
        let highlight = layout.title_bar(title.measured);
        canvas.draw_highlighted_text(
            &self.backend,
            &title.font,
            &title.text,
            &highlight,
            layout.config().shadow_offset,
        );

        self.draw_backed_text(
            &mut canvas,
            &fitter,
            layout.album_region(),
            &self.fonts.album,
            &metadata.album_with_year(),
        );
        self.draw_backed_text(
            &mut canvas,
            &fitter,
            layout.artist_region(),
            &self.fonts.artist,
            &metadata.artist,
        );

        Ok(canvas.into_planes())
    }
}

/// No text: the mirrored background alone, split by tri-tone classification.
#[derive(Clone, Debug)]
pub struct RawArtCard<D> {
    canvas: CanvasSize,
    dither: D,
    palette: TriTonePalette,
}

impl<D: Dither> RawArtCard<D> {
    pub fn new(canvas: CanvasSize, dither: D) -> Result<Self, ConfigurationError> {
        Ok(Self {
            canvas: CanvasSize::new(canvas.width, canvas.height)?,
            dither,
            palette: TriTonePalette::default(),
        })
    }

    pub fn with_palette(mut self, palette: TriTonePalette) -> Self {
        self.palette = palette;
        self
    }
}

impl<D: Dither> CardRenderer for RawArtCard<D> {
    fn canvas_size(&self) -> CanvasSize {
        self.canvas
    }

    fn render(&self, art: &RgbImage, metadata: &TrackMetadata) -> Result<CardPlanes, CardError> {
        validate_inputs(art, metadata)?;
        log::debug!("rendering raw art card for {:?}", metadata.album);

        let mut canvas = DualPlaneCanvas::new(self.canvas);
        draw_mirrored_background(&mut canvas, art, &self.dither, &self.palette);
        Ok(canvas.into_planes())
    }
}

/// Card variant names accepted on the command line and in config.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CardVariant {
    #[default]
    Standard,
    MirroredPoster,
    RawArt,
}

impl CardVariant {
    pub const ALL: [Self; 3] = [Self::Standard, Self::MirroredPoster, Self::RawArt];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::MirroredPoster => "mirrored-poster",
            Self::RawArt => "raw-art",
        }
    }
}

impl fmt::Display for CardVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CardVariant {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "mirrored-poster" | "poster" => Ok(Self::MirroredPoster),
            "raw-art" | "raw" => Ok(Self::RawArt),
            _ => Err(ConfigurationError::UnknownVariant(s.to_string())),
        }
    }
}

/// Any of the card variants behind one type, chosen at runtime.
#[derive(Clone, Debug)]
pub enum AnyCardRenderer<B, D> {
    Standard(StandardCard<B, D>),
    MirroredPoster(PosterCard<B, D>),
    RawArt(RawArtCard<D>),
}

impl<B: FontBackend, D: Dither> AnyCardRenderer<B, D> {
    /// Build `variant` with default layout constants.
    pub fn new(
        variant: CardVariant,
        backend: B,
        fonts: CardFonts,
        canvas: CanvasSize,
        dither: D,
    ) -> Result<Self, ConfigurationError> {
        Ok(match variant {
            CardVariant::Standard => Self::Standard(StandardCard::new(
                backend,
                fonts,
                canvas,
                StandardLayoutConfig::default(),
                dither,
            )?),
            CardVariant::MirroredPoster => Self::MirroredPoster(PosterCard::new(
                backend,
                fonts,
                canvas,
                PosterLayoutConfig::default(),
                dither,
            )?),
            CardVariant::RawArt => Self::RawArt(RawArtCard::new(canvas, dither)?),
        })
    }

    pub fn variant(&self) -> CardVariant {
        match self {
            Self::Standard(_) => CardVariant::Standard,
            Self::MirroredPoster(_) => CardVariant::MirroredPoster,
            Self::RawArt(_) => CardVariant::RawArt,
        }
    }

    pub fn with_palette(self, palette: TriTonePalette) -> Self {
        match self {
            Self::Standard(card) => Self::Standard(card.with_palette(palette)),
            Self::MirroredPoster(card) => Self::MirroredPoster(card.with_palette(palette)),
            Self::RawArt(card) => Self::RawArt(card.with_palette(palette)),
        }
    }
}

impl<B: FontBackend, D: Dither> CardRenderer for AnyCardRenderer<B, D> {
    fn canvas_size(&self) -> CanvasSize {
        match self {
            Self::Standard(card) => card.canvas_size(),
            Self::MirroredPoster(card) => card.canvas_size(),
            Self::RawArt(card) => card.canvas_size(),
        }
    }

    fn render(&self, art: &RgbImage, metadata: &TrackMetadata) -> Result<CardPlanes, CardError> {
        match self {
            Self::Standard(card) => card.render(art, metadata),
            Self::MirroredPoster(card) => card.render(art, metadata),
            Self::RawArt(card) => card.render(art, metadata),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::art::NoDither;
    use crate::mono::MonoFontBackend;
    use image::Rgb;
    use nowplaying_card::FontResource;

    fn metadata() -> TrackMetadata {
        TrackMetadata::new("Paranoid Android", "OK Computer", "Radiohead", "1997", 2, 12).unwrap()
    }

    fn art() -> RgbImage {
        RgbImage::from_pixel(8, 8, Rgb([0, 0, 0]))
    }

    #[test]
    fn variant_names_parse() {
        for variant in CardVariant::ALL {
            assert_eq!(variant.name().parse::<CardVariant>().unwrap(), variant);
        }
        assert_eq!(" Poster ".parse::<CardVariant>().unwrap(), CardVariant::MirroredPoster);
        assert_eq!(
            "polaroid".parse::<CardVariant>(),
            Err(ConfigurationError::UnknownVariant("polaroid".to_string()))
        );
    }

    #[test]
    fn missing_font_is_a_configuration_error() {
        let fonts = CardFonts {
            title: FontSpec::new(
                MonoFontBackend::resource(),
                FontResource::new("NotoSansJP"),
                vec![20, 10],
            )
            .unwrap(),
            ..MonoFontBackend::card_fonts().unwrap()
        };
        let err = StandardCard::new(
            MonoFontBackend,
            fonts,
            CanvasSize::DEFAULT,
            StandardLayoutConfig::default(),
            NoDither,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::MissingFontResource("NotoSansJP".to_string())
        );
    }

    #[test]
    fn invalid_metadata_produces_no_card() {
        let card = AnyCardRenderer::new(
            CardVariant::Standard,
            MonoFontBackend,
            MonoFontBackend::card_fonts().unwrap(),
            CanvasSize::DEFAULT,
            NoDither,
        )
        .unwrap();
        let mut bad = metadata();
        bad.track_number = 13;
        assert_eq!(
            card.render(&art(), &bad),
            Err(CardError::Input(InputValidationError::TrackNumberExceedsTotal {
                track_number: 13,
                total_tracks: 12,
            }))
        );
    }

    #[test]
    fn empty_art_is_rejected() {
        let card = RawArtCard::new(CanvasSize::DEFAULT, NoDither).unwrap();
        assert_eq!(
            card.render(&RgbImage::new(0, 4), &metadata()),
            Err(CardError::Input(InputValidationError::InvalidArtDimensions {
                width: 0,
                height: 4,
            }))
        );
    }

    #[test]
    fn dispatch_keeps_variant_and_canvas() {
        let canvas = CanvasSize::new(400, 300).unwrap();
        for variant in CardVariant::ALL {
            let card = AnyCardRenderer::new(
                variant,
                MonoFontBackend,
                MonoFontBackend::card_fonts().unwrap(),
                canvas,
                NoDither,
            )
            .unwrap();
            assert_eq!(card.variant(), variant);
            assert_eq!(card.canvas_size(), canvas);
            let planes = card.render(&art(), &metadata()).unwrap();
            assert_eq!(planes.ink.canvas_size(), canvas);
            assert_eq!(planes.accent.canvas_size(), canvas);
        }
    }

    #[test]
    fn raw_art_splits_black_art_onto_ink_plane() {
        let card = RawArtCard::new(CanvasSize::new(60, 40).unwrap(), NoDither).unwrap();
        let planes = card.render(&art(), &metadata()).unwrap();
        assert_eq!(planes.ink.marked_count(), 60 * 40);
        assert_eq!(planes.accent.marked_count(), 0);
    }
}
