//! Album-art preparation: resize, mirror tiling, tri-tone dithering.

use image::{imageops, imageops::FilterType, Rgb, RgbImage};
use nowplaying_card::Rect;
use oklab::{linear_srgb_to_oklab, srgb_to_oklab, Oklab, RGB};

/// The three colors the panel can show.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriTone {
    Background,
    Ink,
    Accent,
}

/// RGB value of each panel color, used to classify dithered art and to
/// build composite previews.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriTonePalette {
    pub background: Rgb<u8>,
    pub ink: Rgb<u8>,
    pub accent: Rgb<u8>,
}

impl Default for TriTonePalette {
    fn default() -> Self {
        Self {
            background: Rgb([255, 255, 255]),
            ink: Rgb([0, 0, 0]),
            accent: Rgb([255, 0, 0]),
        }
    }
}

impl TriTonePalette {
    pub fn color(&self, tone: TriTone) -> Rgb<u8> {
        match tone {
            TriTone::Background => self.background,
            TriTone::Ink => self.ink,
            TriTone::Accent => self.accent,
        }
    }

    /// Nearest palette entry by squared RGB distance; ties go to
    /// background, then ink, then accent.
    pub fn classify(&self, pixel: Rgb<u8>) -> TriTone {
        let mut best = TriTone::Background;
        let mut best_distance = squared_distance(pixel, self.background);
        for tone in [TriTone::Ink, TriTone::Accent] {
            let distance = squared_distance(pixel, self.color(tone));
            if distance < best_distance {
                best = tone;
                best_distance = distance;
            }
        }
        best
    }

    fn entries(&self) -> [Rgb<u8>; 3] {
        [self.background, self.ink, self.accent]
    }
}

fn squared_distance(a: Rgb<u8>, b: Rgb<u8>) -> u32 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&x, &y)| {
            let d = x as i32 - y as i32;
            (d * d) as u32
        })
        .sum()
}

/// Reduces art to colors the palette can classify.
///
/// Implementations must keep the image dimensions.
pub trait Dither {
    fn dither(&self, art: &RgbImage) -> RgbImage;
}

impl<F> Dither for F
where
    F: Fn(&RgbImage) -> RgbImage,
{
    fn dither(&self, art: &RgbImage) -> RgbImage {
        self(art)
    }
}

/// Leaves art untouched; classification then snaps each pixel to the
/// nearest palette color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoDither;

impl Dither for NoDither {
    fn dither(&self, art: &RgbImage) -> RgbImage {
        art.clone()
    }
}

/// Floyd-Steinberg error diffusion in linear light.
///
/// Each pixel takes the perceptually nearest palette entry (Oklab distance);
/// the remaining error is spread in linear RGB.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FloydSteinbergDither {
    pub palette: TriTonePalette,
}

impl FloydSteinbergDither {
    pub fn new(palette: TriTonePalette) -> Self {
        Self { palette }
    }
}

// (dx, dy, weight)
const FLOYD_STEINBERG: [(i32, i32, f32); 4] = [
    (1, 0, 7.0 / 16.0),
    (-1, 1, 3.0 / 16.0),
    (0, 1, 5.0 / 16.0),
    (1, 1, 1.0 / 16.0),
];

impl Dither for FloydSteinbergDither {
    fn dither(&self, art: &RgbImage) -> RgbImage {
        let (w, h) = art.dimensions();
        let mut linear: Vec<[f32; 3]> = art
            .pixels()
            .map(|p| p.0.map(|c| srgb_to_linear(c as f32 / 255.0)))
            .collect();
        let entries = self.palette.entries();
        let linear_entries = entries.map(|e| e.0.map(|c| srgb_to_linear(c as f32 / 255.0)));
        let lab_entries = entries.map(|Rgb([r, g, b])| srgb_to_oklab(RGB::new(r, g, b)));

        let mut out = RgbImage::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let idx = (y * w + x) as usize;
                let current = linear[idx];
                let nearest = nearest_entry(current, &lab_entries);
                let chosen = linear_entries[nearest];
                out.put_pixel(x, y, entries[nearest]);

                let error = [
                    current[0] - chosen[0],
                    current[1] - chosen[1],
                    current[2] - chosen[2],
                ];
                for (dx, dy, weight) in FLOYD_STEINBERG {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx < 0 || nx >= w as i32 || ny >= h as i32 {
                        continue;
                    }
                    let n = &mut linear[ny as usize * w as usize + nx as usize];
                    for c in 0..3 {
                        n[c] += error[c] * weight;
                    }
                }
            }
        }
        out
    }
}

/// Index of the entry closest to a linear-light color; ties keep the earlier entry.
fn nearest_entry(color: [f32; 3], entries: &[Oklab; 3]) -> usize {
    let lab = linear_srgb_to_oklab(RGB::new(color[0], color[1], color[2]));
    let mut best = 0;
    let mut best_distance = f32::INFINITY;
    for (i, entry) in entries.iter().enumerate() {
        let distance =
            (lab.l - entry.l).powi(2) + (lab.a - entry.a).powi(2) + (lab.b - entry.b).powi(2);
        if distance < best_distance {
            best = i;
            best_distance = distance;
        }
    }
    best
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Resample art to exactly `width` x `height`.
pub fn resize_art(art: &RgbImage, width: u32, height: u32) -> RgbImage {
    if art.dimensions() == (width, height) {
        return art.clone();
    }
    imageops::resize(art, width.max(1), height.max(1), FilterType::CatmullRom)
}

/// Full-canvas image with the art resized into `art_rect` and mirrored
/// copies tiled outward to both edges.
///
/// Tiles alternate flipped and original so every seam is a reflection.
/// Rows outside the art's vertical span stay `background`.
pub fn mirror_tile(
    art: &RgbImage,
    canvas_width: u32,
    canvas_height: u32,
    art_rect: Rect,
    background: Rgb<u8>,
) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(canvas_width, canvas_height, background);
    let centre = resize_art(art, art_rect.width, art_rect.height);
    let flipped = imageops::flip_horizontal(&centre);
    let step = art_rect.width.max(1) as i64;

    imageops::overlay(&mut canvas, &centre, art_rect.x as i64, art_rect.y as i64);

    let mut tile = 1i64;
    loop {
        let left = art_rect.x as i64 - tile * step;
        let right = art_rect.x as i64 + tile * step;
        if left + step <= 0 && right >= canvas_width as i64 {
            break;
        }
        let image = if tile % 2 == 1 { &flipped } else { &centre };
        imageops::overlay(&mut canvas, image, left, art_rect.y as i64);
        imageops::overlay(&mut canvas, image, right, art_rect.y as i64);
        tile += 1;
    }
    canvas
}
