use std::cell::RefCell;
use std::rc::Rc;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};
use image::{Rgb, RgbImage};
use nowplaying_card::{
    CanvasSize, CardError, CardFonts, FontResource, FontSpec, GlyphCoverage, LineMetrics,
    PosterLayout, PosterLayoutConfig, Rect, ResolvedFont, StandardLayout, StandardLayoutConfig,
    TextFitter, TextMeasurer, TrackMetadata,
};
use nowplaying_card_embedded_graphics::{
    AnyCardRenderer, CardRenderer, CardVariant, FloydSteinbergDither, FontBackend,
    MonoFontBackend, NoDither, PosterCard, StandardCard, TriTone, TriTonePalette,
};

fn metadata(song: &str, track: u32, total: u32) -> TrackMetadata {
    TrackMetadata::new(song, "Kid A", "Radiohead", "2000", track, total).unwrap()
}

fn gradient_art(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 64])
    })
}

fn standard_card() -> StandardCard<MonoFontBackend, NoDither> {
    StandardCard::new(
        MonoFontBackend,
        MonoFontBackend::card_fonts().unwrap(),
        CanvasSize::DEFAULT,
        StandardLayoutConfig::default(),
        NoDither,
    )
    .unwrap()
}

fn full(size: CanvasSize) -> Rect {
    Rect::new(0, 0, size.width, size.height)
}

#[test]
fn third_of_twelve_tracks_fills_exactly_one_dot() {
    let card = standard_card();
    let meta = metadata("Idioteque", 3, 12);
    let art = RgbImage::from_pixel(640, 640, Rgb([255, 255, 255]));
    let planes = card.render(&art, &meta).unwrap();

    // Rebuild the geometry the renderer used.
    let layout = card.layout();
    let fitter = TextFitter::new(card.backend());
    let art_rect = layout.art_rect(640, 640);
    let title = fitter.fit_text(layout.title_max_width(), &card.fonts().title, &meta.song);
    let bar = layout.title_bar(art_rect, title.measured);
    let dots = layout.track_dots(art_rect, bar.bar, 3, 12);

    assert_eq!(dots.len(), 12);
    let filled: Vec<_> = dots
        .iter()
        .filter(|dot| planes.ink.is_marked(dot.center.x, dot.center.y))
        .collect();
    assert_eq!(filled.len(), 1);
    assert_eq!(filled[0].center, dots[2].center);
    for dot in &dots {
        assert!(planes.ink.marked_in(dot.bounds()) > 0, "dot at {:?}", dot.center);
        assert_eq!(planes.accent.marked_in(dot.bounds()), 0);
    }
}

#[test]
fn title_bar_over_dark_art_never_double_inks() {
    let card = standard_card();
    // Long enough for the bar to reach back over the art column.
    let meta = metadata(
        "Everything In Its Right Place (Live From The Astoria)",
        1,
        10,
    );
    let art = RgbImage::from_pixel(500, 500, Rgb([0, 0, 0]));
    let planes = card.render(&art, &meta).unwrap();

    let layout = card.layout();
    let fitter = TextFitter::new(card.backend());
    let art_rect = layout.art_rect(500, 500);
    let title = fitter.fit_text(layout.title_max_width(), &card.fonts().title, &meta.song);
    let bar = layout.title_bar(art_rect, title.measured).bar;
    assert!(bar.x < art_rect.right());

    assert_eq!(planes.double_inked_in(full(CanvasSize::DEFAULT)), 0);
    assert!(planes.accent.marked_in(bar) > 0);
    assert!(planes.ink.marked_in(bar) > 0);
    // Art outside the bar keeps its ink.
    assert!(planes.ink.is_marked(2, 2));
}

#[test]
fn every_variant_emits_matching_planes_without_double_ink() {
    let canvas = CanvasSize::DEFAULT;
    let meta = metadata("Motion Picture Soundtrack", 10, 10);
    for variant in CardVariant::ALL {
        let card = AnyCardRenderer::new(
            variant,
            MonoFontBackend,
            MonoFontBackend::card_fonts().unwrap(),
            canvas,
            FloydSteinbergDither::default(),
        )
        .unwrap();
        let planes = card.render(&gradient_art(300, 200), &meta).unwrap();
        assert_eq!(planes.ink.canvas_size(), canvas, "{}", variant);
        assert_eq!(planes.accent.canvas_size(), canvas, "{}", variant);
        assert_eq!(planes.double_inked_in(full(canvas)), 0, "{}", variant);
    }
}

#[test]
fn poster_band_is_accent_with_ink_title() {
    let card = PosterCard::new(
        MonoFontBackend,
        MonoFontBackend::card_fonts().unwrap(),
        CanvasSize::DEFAULT,
        PosterLayoutConfig::default(),
        NoDither,
    )
    .unwrap();
    let planes = card
        .render(&RgbImage::from_pixel(64, 64, Rgb([255, 255, 255])), &metadata("Optimistic", 4, 10))
        .unwrap();
    let band = PosterLayout::new(CanvasSize::DEFAULT, PosterLayoutConfig::default())
        .unwrap()
        .accent_band();

    assert_eq!(planes.tone_at(band.x + 1, band.y + 1), TriTone::Accent);
    assert!(planes.ink.marked_in(band) > 0);
    assert_eq!(planes.double_inked_in(band), 0);
}

#[test]
fn poster_secondary_text_sits_on_cleared_backing() {
    let layout = PosterLayout::new(CanvasSize::DEFAULT, PosterLayoutConfig::default()).unwrap();
    let card = PosterCard::new(
        MonoFontBackend,
        MonoFontBackend::card_fonts().unwrap(),
        CanvasSize::DEFAULT,
        PosterLayoutConfig::default(),
        NoDither,
    )
    .unwrap();
    // Pure accent art: anything not accent inside the regions is the backing or text.
    let art = RgbImage::from_pixel(64, 64, Rgb([255, 0, 0]));
    let planes = card.render(&art, &metadata("Idioteque", 8, 10)).unwrap();

    let region = layout.artist_region();
    let center = region.center();
    assert_eq!(planes.accent.marked_in(Rect::new(center.x - 2, center.y - 2, 4, 4)), 0);
    assert!(planes.ink.marked_in(region) > 0);
    // Corners of the region are outside the backing and keep the art.
    assert_eq!(planes.tone_at(region.x, region.y), TriTone::Accent);
}

#[test]
fn raw_art_uses_palette_classification() {
    let palette = TriTonePalette::default();
    let card = AnyCardRenderer::new(
        CardVariant::RawArt,
        MonoFontBackend,
        MonoFontBackend::card_fonts().unwrap(),
        CanvasSize::new(90, 30).unwrap(),
        NoDither,
    )
    .unwrap();
    // Left third ink, middle accent, right background; scaled up 10x.
    let art = RgbImage::from_fn(3, 1, |x, _| match x {
        0 => palette.ink,
        1 => palette.accent,
        _ => palette.background,
    });
    let planes = card.render(&art, &metadata("Kid A", 3, 10)).unwrap();
    // Art is 90x30 after scaling, so it fills the canvas without mirroring.
    assert_eq!(planes.tone_at(5, 15), TriTone::Ink);
    assert_eq!(planes.tone_at(45, 15), TriTone::Accent);
    assert_eq!(planes.tone_at(85, 15), TriTone::Background);
}

#[test]
fn invalid_year_is_rejected_before_drawing() {
    let card = standard_card();
    let mut meta = metadata("Idioteque", 1, 10);
    meta.release_year = "20".to_string();
    assert!(matches!(
        card.render(&gradient_art(10, 10), &meta),
        Err(CardError::Input(_))
    ));
}

/// Mono metrics and drawing, but glyph coverage decided by a script check so
/// a second resource can stand in for a CJK face.
#[derive(Clone, Default)]
struct TwoFaceBackend {
    drawn_with: Rc<RefCell<Vec<String>>>,
}

impl TextMeasurer for TwoFaceBackend {
    fn text_width(&self, text: &str, font: &ResolvedFont) -> f32 {
        MonoFontBackend.text_width(&"x".repeat(text.chars().count()), font)
    }

    fn line_metrics(&self, font: &ResolvedFont) -> LineMetrics {
        MonoFontBackend.line_metrics(font)
    }
}

impl GlyphCoverage for TwoFaceBackend {
    fn supports(&self, resource: &FontResource, text: &str) -> bool {
        resource.name() == "cjk" || text.is_ascii()
    }
}

impl FontBackend for TwoFaceBackend {
    fn has_resource(&self, resource: &FontResource) -> bool {
        matches!(resource.name(), "latin" | "cjk")
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
        self.drawn_with
            .borrow_mut()
            .push(format!("{}:{}", font.resource.name(), text));
        let stand_in = "x".repeat(text.chars().count());
        MonoFontBackend.draw_text_run(display, font, &stand_in, origin, color)
    }
}

#[test]
fn non_latin_fields_switch_whole_string_to_fallback() {
    let spec = |sizes: Vec<u32>| {
        FontSpec::new(FontResource::new("latin"), FontResource::new("cjk"), sizes).unwrap()
    };
    let fonts = CardFonts {
        title: spec(vec![20, 14]),
        album: spec(vec![18, 13]),
        artist: spec(vec![18, 13]),
    };
    let backend = TwoFaceBackend::default();
    let card = StandardCard::new(
        backend.clone(),
        fonts,
        CanvasSize::DEFAULT,
        StandardLayoutConfig::default(),
        NoDither,
    )
    .unwrap();
    let meta = TrackMetadata::new("夜に駆ける", "The Book", "YOASOBI", "2021", 1, 8).unwrap();
    card.render(&gradient_art(32, 32), &meta).unwrap();

    let drawn = backend.drawn_with.borrow();
    assert!(drawn.iter().any(|d| d == "cjk:夜に駆ける"));
    assert!(drawn.iter().any(|d| d == "latin:YOASOBI"));
    assert!(drawn.iter().any(|d| d == "latin:The Book"));
    assert!(!drawn.iter().any(|d| d.starts_with("latin:夜")));
}

#[test]
fn standard_layout_rejects_too_small_canvas() {
    let err = StandardCard::new(
        MonoFontBackend,
        MonoFontBackend::card_fonts().unwrap(),
        CanvasSize::new(100, 40).unwrap(),
        StandardLayoutConfig::default(),
        NoDither,
    )
    .unwrap_err();
    assert!(matches!(err, nowplaying_card::ConfigurationError::InvalidCanvas { .. }));
    assert!(StandardLayout::new(CanvasSize::DEFAULT, StandardLayoutConfig::default()).is_ok());
}

#[test]
fn narrow_poster_canvas_fails_at_construction_not_render() {
    let build = |width, height| {
        PosterCard::new(
            MonoFontBackend,
            MonoFontBackend::card_fonts().unwrap(),
            CanvasSize::new(width, height).unwrap(),
            PosterLayoutConfig::default(),
            NoDither,
        )
    };
    assert!(matches!(
        build(45, 200),
        Err(nowplaying_card::ConfigurationError::InvalidCanvas { width: 45, height: 200 })
    ));

    // Smallest width the default margins allow still renders.
    let card = build(50, 200).unwrap();
    let planes = card
        .render(&gradient_art(64, 64), &metadata("Morning Bell", 6, 10))
        .unwrap();
    assert_eq!(planes.ink.canvas_size(), CanvasSize::new(50, 200).unwrap());
    assert_eq!(planes.double_inked_in(Rect::new(0, 0, 50, 200)), 0);
}

#[test]
fn huge_track_count_renders_only_visible_dots() {
    let card = standard_card();
    let meta = metadata("Idioteque", 1, u32::MAX);
    let art = RgbImage::from_pixel(640, 640, Rgb([255, 255, 255]));
    let planes = card.render(&art, &meta).unwrap();

    let layout = card.layout();
    let fitter = TextFitter::new(card.backend());
    let art_rect = layout.art_rect(640, 640);
    let title = fitter.fit_text(layout.title_max_width(), &card.fonts().title, &meta.song);
    let bar = layout.title_bar(art_rect, title.measured);
    let dots = layout.track_dots(art_rect, bar.bar, 1, u32::MAX);
    assert!(!dots.is_empty());
    assert!(dots.iter().all(|dot| dot.bounds().x < 600));
    assert!(planes.ink.is_marked(dots[0].center.x, dots[0].center.y));
}
