use std::env;
use std::path::Path;
use std::process::ExitCode;

use image::{DynamicImage, RgbImage};
use nowplaying_card::{CanvasSize, CardFonts, FontResource, FontSpec, TrackMetadata};
use nowplaying_card_embedded_graphics::{
    AnyCardRenderer, CardPlanes, CardRenderer, CardVariant, Dither, FloydSteinbergDither,
    FontBackend, MonoFontBackend, NoDither, TriTonePalette, TtfFontBackend,
};

const DEFAULT_OUT_DIR: &str = "target/card-preview";

#[derive(Clone, Debug)]
struct Args {
    art_path: String,
    metadata_path: Option<String>,
    song: Option<String>,
    album: Option<String>,
    artist: Option<String>,
    release_date: Option<String>,
    track_number: u32,
    total_tracks: u32,
    variant: CardVariant,
    out_dir: String,
    width: u32,
    height: u32,
    font_path: Option<String>,
    fallback_font_path: Option<String>,
    dither: bool,
}

/// Dither selected on the command line.
enum PreviewDither {
    None(NoDither),
    FloydSteinberg(FloydSteinbergDither),
}

impl Dither for PreviewDither {
    fn dither(&self, art: &RgbImage) -> RgbImage {
        match self {
            Self::None(d) => d.dither(art),
            Self::FloydSteinberg(d) => d.dither(art),
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("{}", help_text());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let cli = parse_args(args)?;
    let metadata = load_metadata(&cli)?;
    let art = image::open(&cli.art_path)
        .map_err(|e| format!("failed to read art '{}': {}", cli.art_path, e))?
        .to_rgb8();
    let canvas = CanvasSize::new(cli.width, cli.height).map_err(|e| e.to_string())?;
    let palette = TriTonePalette::default();
    let dither = if cli.dither {
        PreviewDither::FloydSteinberg(FloydSteinbergDither::new(palette))
    } else {
        PreviewDither::None(NoDither)
    };

    let planes = match &cli.font_path {
        Some(font_path) => {
            let fallback = cli.fallback_font_path.as_deref().unwrap_or(font_path);
            let mut backend = TtfFontBackend::new();
            backend
                .load_face_file(FontResource::new("primary"), font_path)
                .map_err(|e| e.to_string())?;
            backend
                .load_face_file(FontResource::new("fallback"), fallback)
                .map_err(|e| e.to_string())?;
            let fonts = ttf_card_fonts().map_err(|e| e.to_string())?;
            render(&cli, backend, fonts, canvas, dither, &art, &metadata)?
        }
        None => {
            let fonts = MonoFontBackend::card_fonts().map_err(|e| e.to_string())?;
            render(&cli, MonoFontBackend, fonts, canvas, dither, &art, &metadata)?
        }
    };

    write_outputs(Path::new(&cli.out_dir), &planes, &palette)
}

fn render<B: FontBackend>(
    cli: &Args,
    backend: B,
    fonts: CardFonts,
    canvas: CanvasSize,
    dither: PreviewDither,
    art: &RgbImage,
    metadata: &TrackMetadata,
) -> Result<CardPlanes, String> {
    let card = AnyCardRenderer::new(cli.variant, backend, fonts, canvas, dither)
        .map_err(|e| e.to_string())?;
    log::info!(
        "rendering {} card {}x{} for '{}'",
        card.variant(),
        canvas.width,
        canvas.height,
        metadata.song
    );
    card.render(art, metadata).map_err(|e| e.to_string())
}

/// Size ladders for outline faces registered as `primary` / `fallback`.
fn ttf_card_fonts() -> Result<CardFonts, nowplaying_card::ConfigurationError> {
    let spec = |sizes: Vec<u32>| {
        FontSpec::new(
            FontResource::new("primary"),
            FontResource::new("fallback"),
            sizes,
        )
    };
    Ok(CardFonts {
        title: spec(vec![70, 60, 50, 40])?,
        album: spec(vec![34, 30, 26, 22])?,
        artist: spec(vec![34, 30, 26, 22, 18])?,
    })
}

fn load_metadata(cli: &Args) -> Result<TrackMetadata, String> {
    if let Some(path) = &cli.metadata_path {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read metadata '{}': {}", path, e))?;
        let metadata: TrackMetadata = serde_json::from_str(&raw)
            .map_err(|e| format!("invalid metadata JSON '{}': {}", path, e))?;
        metadata.validate().map_err(|e| e.to_string())?;
        return Ok(metadata);
    }

    let field = |value: &Option<String>, flag: &str| {
        value
            .clone()
            .ok_or_else(|| format!("{} is required without --metadata", flag))
    };
    TrackMetadata::from_release_date(
        field(&cli.song, "--song")?,
        field(&cli.album, "--album")?,
        field(&cli.artist, "--artist")?,
        &field(&cli.release_date, "--release-date")?,
        cli.track_number,
        cli.total_tracks,
    )
    .map_err(|e| e.to_string())
}

fn write_outputs(out_dir: &Path, planes: &CardPlanes, palette: &TriTonePalette) -> Result<(), String> {
    std::fs::create_dir_all(out_dir).map_err(|e| e.to_string())?;
    let images = [
        ("ink.png", DynamicImage::ImageLuma8(planes.ink.to_gray_image())),
        ("accent.png", DynamicImage::ImageLuma8(planes.accent.to_gray_image())),
        ("composite.png", DynamicImage::ImageRgb8(planes.to_rgb_image(palette))),
    ];
    for (name, image) in images {
        let path = out_dir.join(name);
        image
            .save(&path)
            .map_err(|e| format!("failed to write '{}': {}", path.display(), e))?;
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h") {
        return Err("help requested".to_string());
    }

    let mut cfg = Args {
        art_path: String::new(),
        metadata_path: None,
        song: None,
        album: None,
        artist: None,
        release_date: None,
        track_number: 1,
        total_tracks: 1,
        variant: CardVariant::Standard,
        out_dir: DEFAULT_OUT_DIR.to_string(),
        width: CanvasSize::DEFAULT.width,
        height: CanvasSize::DEFAULT.height,
        font_path: None,
        fallback_font_path: None,
        dither: true,
    };

    let mut i = 1usize;
    while i < args.len() {
        let flag = args[i].as_str();
        if flag == "--no-dither" {
            cfg.dither = false;
            i += 1;
            continue;
        }
        let v = args
            .get(i + 1)
            .ok_or_else(|| format!("{} requires a value", flag))?;
        match flag {
            "--art" => cfg.art_path = v.clone(),
            "--metadata" => cfg.metadata_path = Some(v.clone()),
            "--song" => cfg.song = Some(v.clone()),
            "--album" => cfg.album = Some(v.clone()),
            "--artist" => cfg.artist = Some(v.clone()),
            "--release-date" => cfg.release_date = Some(v.clone()),
            "--track" => {
                cfg.track_number = v
                    .parse::<u32>()
                    .map_err(|_| format!("invalid --track value '{}'", v))?;
            }
            "--total" => {
                cfg.total_tracks = v
                    .parse::<u32>()
                    .map_err(|_| format!("invalid --total value '{}'", v))?;
            }
            "--variant" => cfg.variant = v.parse::<CardVariant>().map_err(|e| e.to_string())?,
            "--out" => cfg.out_dir = v.clone(),
            "--width" => {
                cfg.width = v
                    .parse::<u32>()
                    .map_err(|_| format!("invalid --width value '{}'", v))?;
            }
            "--height" => {
                cfg.height = v
                    .parse::<u32>()
                    .map_err(|_| format!("invalid --height value '{}'", v))?;
            }
            "--font" => cfg.font_path = Some(v.clone()),
            "--fallback-font" => cfg.fallback_font_path = Some(v.clone()),
            other => return Err(format!("unknown argument '{}'", other)),
        }
        i += 2;
    }

    if cfg.art_path.is_empty() {
        return Err("--art is required".to_string());
    }
    if cfg.out_dir.is_empty() {
        return Err("--out must not be empty".to_string());
    }
    Ok(cfg)
}

fn help_text() -> &'static str {
    r#"card-preview - render a now-playing card to PNG planes

USAGE:
  cargo run -p nowplaying-card-preview --bin card-preview -- --art <image> [options]

INPUT:
  --art <file>                album art (PNG or JPEG)
  --metadata <file>           track metadata as JSON (song, album, artist,
                              release_year, track_number, total_tracks)
  --song <text>               song title (without --metadata)
  --album <text>              album name (without --metadata)
  --artist <text>             artist name (without --metadata)
  --release-date <date>       release date; the first 4 characters are kept
  --track <n>                 track number (default: 1)
  --total <n>                 total tracks (default: 1)

OPTIONS:
  --variant <name>            standard|mirrored-poster|raw-art (default: standard)
  --out <dir>                 output directory (default: target/card-preview)
  --width <px>                canvas width (default: 600)
  --height <px>               canvas height (default: 448)
  --font <file>               TTF/OTF primary face (default: built-in mono)
  --fallback-font <file>      face for text the primary cannot show
  --no-dither                 classify art pixels directly instead of dithering

OUTPUT:
  ink.png, accent.png         one plane each, marks black
  composite.png               panel preview in the default palette

Set RUST_LOG=debug to see font fitting decisions."#
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("card-preview")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn parses_variant_and_canvas() {
        let cfg = parse_args(args(&[
            "--art",
            "cover.jpg",
            "--variant",
            "poster",
            "--width",
            "400",
            "--height",
            "300",
            "--no-dither",
        ]))
        .unwrap();
        assert_eq!(cfg.variant, CardVariant::MirroredPoster);
        assert_eq!((cfg.width, cfg.height), (400, 300));
        assert!(!cfg.dither);
        assert_eq!(cfg.out_dir, DEFAULT_OUT_DIR);
    }

    #[test]
    fn art_is_required() {
        assert_eq!(
            parse_args(args(&["--variant", "standard"])).unwrap_err(),
            "--art is required"
        );
    }

    #[test]
    fn rejects_unknown_flags_and_values() {
        assert!(parse_args(args(&["--art", "a.png", "--bogus", "1"])).is_err());
        assert!(parse_args(args(&["--art", "a.png", "--track", "x"])).is_err());
        assert!(parse_args(args(&["--art", "a.png", "--variant", "polaroid"])).is_err());
        assert!(parse_args(args(&["--art"])).is_err());
    }

    #[test]
    fn inline_metadata_truncates_release_date() {
        let cfg = parse_args(args(&[
            "--art",
            "a.png",
            "--song",
            "Pyramid Song",
            "--album",
            "Amnesiac",
            "--artist",
            "Radiohead",
            "--release-date",
            "2001-06-05",
            "--track",
            "1",
            "--total",
            "11",
        ]))
        .unwrap();
        let metadata = load_metadata(&cfg).unwrap();
        assert_eq!(metadata.release_year, "2001");
        assert_eq!(metadata.total_tracks, 11);
    }

    #[test]
    fn inline_metadata_reports_missing_field() {
        let cfg = parse_args(args(&["--art", "a.png", "--song", "Pyramid Song"])).unwrap();
        assert_eq!(
            load_metadata(&cfg).unwrap_err(),
            "--album is required without --metadata"
        );
    }
}
