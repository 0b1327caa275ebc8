//! Card geometry: where every element of each card variant goes.
//!
//! Layouts are pure. They take measured text sizes from the caller and hand
//! back rectangles and anchor points; nothing here touches pixels.

use crate::error::ConfigurationError;
use crate::font::{LineMetrics, TextSize};

/// Canvas dimensions in pixels, origin top-left, y down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    /// Panel size of the 5.83" tri-color display the card was designed for.
    pub const DEFAULT: Self = Self {
        width: 600,
        height: 448,
    };

    /// Both sides must be positive and the pixel count must fit in a `u32`.
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigurationError> {
        if width == 0 || height == 0 || width.checked_mul(height).is_none() {
            return Err(ConfigurationError::InvalidCanvas { width, height });
        }
        Ok(Self { width, height })
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Whether `inset` taken from both ends leaves nothing of `length`.
fn consumes(inset: u32, length: u32) -> bool {
    2 * u64::from(inset) >= u64::from(length)
}

/// A pixel position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn center(&self) -> Position {
        Position::new(
            self.x + self.width as i32 / 2,
            self.y + self.height as i32 / 2,
        )
    }

    pub fn contains(&self, p: Position) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Grow on every side by `by` pixels.
    pub fn inflate(&self, by: u32) -> Self {
        Self::new(
            self.x - by as i32,
            self.y - by as i32,
            self.width + 2 * by,
            self.height + 2 * by,
        )
    }
}

/// Horizontal text anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical text anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VAlign {
    #[default]
    Top,
    Middle,
    Baseline,
    Bottom,
}

/// Which point of a text block a draw position refers to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextAnchor {
    pub horizontal: HAlign,
    pub vertical: VAlign,
}

impl TextAnchor {
    pub const TOP_LEFT: Self = Self::new(HAlign::Left, VAlign::Top);
    pub const CENTER: Self = Self::new(HAlign::Center, VAlign::Middle);
    pub const RIGHT_MIDDLE: Self = Self::new(HAlign::Right, VAlign::Middle);
    pub const LEFT_BASELINE: Self = Self::new(HAlign::Left, VAlign::Baseline);
    pub const RIGHT_BASELINE: Self = Self::new(HAlign::Right, VAlign::Baseline);

    pub const fn new(horizontal: HAlign, vertical: VAlign) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Top-left corner of a `size` block anchored at `at`.
    ///
    /// `Baseline` refers to the first line's baseline, so `metrics` must be
    /// those of the font the block is drawn in.
    pub fn top_left(&self, at: Position, size: TextSize, metrics: LineMetrics) -> Position {
        let x = match self.horizontal {
            HAlign::Left => at.x,
            HAlign::Center => at.x - (size.width / 2.0).round() as i32,
            HAlign::Right => at.x - size.width.round() as i32,
        };
        let y = match self.vertical {
            VAlign::Top => at.y,
            VAlign::Middle => at.y - (size.height / 2.0).round() as i32,
            VAlign::Baseline => at.y - metrics.ascent.round() as i32,
            VAlign::Bottom => at.y - size.height.round() as i32,
        };
        Position::new(x, y)
    }
}

/// Largest `(w, h)` with the source aspect ratio that fits inside the target.
pub fn fit_inside(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> (u32, u32) {
    let src_w = src_w.max(1);
    let src_h = src_h.max(1);
    let target_w = target_w.max(1);
    let target_h = target_h.max(1);

    let width_limited = (target_w as u64 * src_h as u64) <= (target_h as u64 * src_w as u64);
    if width_limited {
        let scaled_h = ((target_w as u64 * src_h as u64) / src_w as u64).max(1) as u32;
        (target_w, scaled_h.min(target_h))
    } else {
        let scaled_w = ((target_h as u64 * src_w as u64) / src_h as u64).max(1) as u32;
        (scaled_w.min(target_w), target_h)
    }
}

/// Scale to `target_h` keeping the aspect ratio.
pub fn scale_to_height(src_w: u32, src_h: u32, target_h: u32) -> (u32, u32) {
    let src_w = src_w.max(1);
    let src_h = src_h.max(1);
    let scaled_w = ((target_h as u64 * src_w as u64) / src_h as u64).max(1) as u32;
    (scaled_w, target_h.max(1))
}

/// Art scaled to the full canvas height and centred; art wider than the
/// canvas is fitted inside and centred vertically instead.
pub fn center_full_height(canvas: CanvasSize, art_w: u32, art_h: u32) -> Rect {
    let (w, h) = scale_to_height(art_w, art_h, canvas.height);
    let (w, h) = if w > canvas.width {
        fit_inside(art_w, art_h, canvas.width, canvas.height)
    } else {
        (w, h)
    };
    Rect::new(
        (canvas.width as i32 - w as i32) / 2,
        (canvas.height as i32 - h as i32) / 2,
        w,
        h,
    )
}

/// A solid accent bar and where its text goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HighlightBar {
    pub bar: Rect,
    pub text_at: Position,
    pub anchor: TextAnchor,
}

/// One track-position marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackDot {
    pub center: Position,
    pub radius: u32,
    /// The current track; drawn solid, all others hollow.
    pub filled: bool,
}

impl TrackDot {
    pub fn bounds(&self) -> Rect {
        let d = self.radius * 2;
        Rect::new(
            self.center.x - self.radius as i32,
            self.center.y - self.radius as i32,
            d,
            d,
        )
    }
}

/// Geometry constants of the standard card.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StandardLayoutConfig {
    /// Height of the album/year band along the bottom edge.
    pub band_height: u32,
    /// Outer margin for band text and the artist column.
    pub margin: u32,
    /// Space between the art and the column to its right.
    pub gutter: u32,
    /// Minimum width kept free to the right of very wide art.
    pub min_column_width: u32,
    /// Gap between the album name and the year.
    pub year_padding: u32,
    /// The title may use the canvas width minus this on each side.
    pub title_side_margin: u32,
    /// Horizontal padding between title text and bar edges.
    pub bar_padding: u32,
    /// Bar height as a multiple of the title height.
    pub bar_height_ratio: f32,
    /// Vertical centre of the title bar as a fraction of the art height.
    pub title_center_ratio: f32,
    /// Gap between the bar and the artist block.
    pub artist_gap: u32,
    pub dot_radius: u32,
    pub dot_spacing: u32,
    /// Faux-bold shadow offset for the title.
    pub shadow_offset: i32,
}

impl Default for StandardLayoutConfig {
    fn default() -> Self {
        Self {
            band_height: 52,
            margin: 15,
            gutter: 12,
            min_column_width: 120,
            year_padding: 20,
            title_side_margin: 30,
            bar_padding: 12,
            bar_height_ratio: 1.3,
            title_center_ratio: 0.62,
            artist_gap: 8,
            dot_radius: 5,
            dot_spacing: 4,
            shadow_offset: 2,
        }
    }
}

/// Art in a left column, title bar across the right, album/year band at the bottom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StandardLayout {
    canvas: CanvasSize,
    config: StandardLayoutConfig,
}

impl StandardLayout {
    pub fn new(canvas: CanvasSize, config: StandardLayoutConfig) -> Result<Self, ConfigurationError> {
        let canvas = CanvasSize::new(canvas.width, canvas.height)?;
        if config.band_height >= canvas.height
            || config.min_column_width >= canvas.width
            || consumes(config.margin, canvas.width)
            || consumes(config.title_side_margin, canvas.width)
            || consumes(config.bar_padding, canvas.width)
        {
            return Err(ConfigurationError::InvalidCanvas {
                width: canvas.width,
                height: canvas.height,
            });
        }
        Ok(Self { canvas, config })
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn config(&self) -> &StandardLayoutConfig {
        &self.config
    }

    /// Art placement: scaled to the height above the band, narrowed only when
    /// the art is too wide to leave a text column.
    pub fn art_rect(&self, art_w: u32, art_h: u32) -> Rect {
        let max_w = self.canvas.width - self.config.min_column_width;
        let max_h = self.canvas.height - self.config.band_height;
        let (w, h) = fit_inside(art_w, art_h, max_w, max_h);
        Rect::new(0, 0, w, h)
    }

    /// Bottom band holding album and year.
    pub fn band_rect(&self) -> Rect {
        let top = self.canvas.height - self.config.band_height;
        Rect::new(0, top as i32, self.canvas.width, self.config.band_height)
    }

    /// Shared baseline of album and year, centring the line box in the band.
    pub fn band_baseline(&self, metrics: LineMetrics) -> i32 {
        let band = self.band_rect();
        let center = band.y as f32 + band.height as f32 / 2.0;
        (center - metrics.height() / 2.0 + metrics.ascent).round() as i32
    }

    /// Left-baseline anchor of the album name.
    pub fn album_at(&self, metrics: LineMetrics) -> Position {
        Position::new(self.config.margin as i32, self.band_baseline(metrics))
    }

    /// Right-baseline anchor of the release year.
    pub fn year_at(&self, metrics: LineMetrics) -> Position {
        Position::new(
            (self.canvas.width - self.config.margin) as i32,
            self.band_baseline(metrics),
        )
    }

    /// Width left for the album once the year and padding are placed.
    pub fn album_max_width(&self, year_width: f32) -> f32 {
        self.canvas.width as f32
            - 2.0 * self.config.margin as f32
            - year_width
            - self.config.year_padding as f32
    }

    /// Width budget for the song title.
    pub fn title_max_width(&self) -> f32 {
        (self.canvas.width - 2 * self.config.title_side_margin) as f32
    }

    /// Highlight bar flush with the right edge, sized to the title.
    pub fn title_bar(&self, art: Rect, title: TextSize) -> HighlightBar {
        let bar_w = (title.width.ceil() as u32 + 2 * self.config.bar_padding).min(self.canvas.width);
        let bar_h = (title.height * self.config.bar_height_ratio).ceil().max(1.0) as u32;
        let center_y = (art.height as f32 * self.config.title_center_ratio).round() as i32;
        let bar = Rect::new(
            (self.canvas.width - bar_w) as i32,
            center_y - bar_h as i32 / 2,
            bar_w,
            bar_h,
        );
        HighlightBar {
            bar,
            text_at: Position::new(
                (self.canvas.width - self.config.bar_padding) as i32,
                bar.center().y,
            ),
            anchor: TextAnchor::RIGHT_MIDDLE,
        }
    }

    /// Region for the wrapped artist name: right of the art, below the bar,
    /// above the band.
    pub fn artist_region(&self, art: Rect, bar: Rect) -> Rect {
        let x = art.right() + self.config.gutter as i32;
        let y = bar.bottom() + self.config.artist_gap as i32;
        let right = (self.canvas.width - self.config.margin) as i32;
        let bottom = self.band_rect().y - self.config.artist_gap as i32;
        Rect::new(
            x,
            y,
            (right - x).max(0) as u32,
            (bottom - y).max(0) as u32,
        )
    }

    /// One dot per track, in columns right of the art, above the title bar.
    ///
    /// Columns that would start past the right edge are not produced, so
    /// very long albums yield only the dots that fit on the canvas.
    pub fn track_dots(&self, art: Rect, bar: Rect, track_number: u32, total_tracks: u32) -> Vec<TrackDot> {
        let r = self.config.dot_radius;
        let step = (2 * r + self.config.dot_spacing).max(1) as i32;
        let first_x = art.right() + self.config.gutter as i32 + r as i32;
        let first_y = self.config.margin as i32 + r as i32;
        let limit = bar.y - self.config.dot_spacing as i32;
        let right_edge = self.canvas.width as i32;

        let mut dots = Vec::new();
        let mut x = first_x;
        let mut y = first_y;
        for track in 1..=total_tracks {
            if y != first_y && y + r as i32 > limit {
                x += step;
                y = first_y;
            }
            if x - r as i32 >= right_edge {
                break;
            }
            dots.push(TrackDot {
                center: Position::new(x, y),
                radius: r,
                filled: track == track_number,
            });
            y += step;
        }
        dots
    }
}

/// Geometry constants of the mirrored poster card.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PosterLayoutConfig {
    /// Height of the accent band across the middle.
    pub accent_band_height: u32,
    /// The title may use the canvas width minus this on each side.
    pub title_side_margin: u32,
    pub bar_padding: u32,
    pub bar_height_ratio: f32,
    /// Height of the album and artist bands.
    pub secondary_band_height: u32,
    /// Gap between the accent band and the secondary bands.
    pub secondary_gap: u32,
    /// Side margin of the secondary bands.
    pub margin: u32,
    /// Padding of the background boxes behind secondary text.
    pub backing_padding: u32,
    pub shadow_offset: i32,
}

impl Default for PosterLayoutConfig {
    fn default() -> Self {
        Self {
            accent_band_height: 96,
            title_side_margin: 24,
            bar_padding: 12,
            bar_height_ratio: 1.3,
            secondary_band_height: 40,
            secondary_gap: 12,
            margin: 20,
            backing_padding: 6,
            shadow_offset: 2,
        }
    }
}

/// Centred art flanked by mirrored copies, with an accent band across the middle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PosterLayout {
    canvas: CanvasSize,
    config: PosterLayoutConfig,
}

impl PosterLayout {
    pub fn new(canvas: CanvasSize, config: PosterLayoutConfig) -> Result<Self, ConfigurationError> {
        let canvas = CanvasSize::new(canvas.width, canvas.height)?;
        let needed = u64::from(config.accent_band_height)
            + 2 * (u64::from(config.secondary_band_height) + u64::from(config.secondary_gap));
        if needed > u64::from(canvas.height)
            || consumes(config.margin, canvas.width)
            || consumes(config.title_side_margin, canvas.width)
            || consumes(config.bar_padding, canvas.width)
        {
            return Err(ConfigurationError::InvalidCanvas {
                width: canvas.width,
                height: canvas.height,
            });
        }
        Ok(Self { canvas, config })
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn config(&self) -> &PosterLayoutConfig {
        &self.config
    }

    pub fn art_rect(&self, art_w: u32, art_h: u32) -> Rect {
        center_full_height(self.canvas, art_w, art_h)
    }

    pub fn accent_band(&self) -> Rect {
        let h = self.config.accent_band_height;
        Rect::new(
            0,
            (self.canvas.height as i32 - h as i32) / 2,
            self.canvas.width,
            h,
        )
    }

    pub fn title_max_width(&self) -> f32 {
        (self.canvas.width - 2 * self.config.title_side_margin) as f32
    }

    /// Highlight bar centred in the accent band.
    pub fn title_bar(&self, title: TextSize) -> HighlightBar {
        let band = self.accent_band();
        let center = band.center();
        let bar_w = (title.width.ceil() as u32 + 2 * self.config.bar_padding).min(self.canvas.width);
        let bar_h = (title.height * self.config.bar_height_ratio).ceil().max(1.0) as u32;
        HighlightBar {
            bar: Rect::new(
                center.x - bar_w as i32 / 2,
                center.y - bar_h as i32 / 2,
                bar_w,
                bar_h,
            ),
            text_at: center,
            anchor: TextAnchor::CENTER,
        }
    }

    /// Band above the accent band for album and year.
    pub fn album_region(&self) -> Rect {
        let band = self.accent_band();
        let h = self.config.secondary_band_height;
        Rect::new(
            self.config.margin as i32,
            band.y - (self.config.secondary_gap + h) as i32,
            self.canvas.width - 2 * self.config.margin,
            h,
        )
    }

    /// Band below the accent band for the artist.
    pub fn artist_region(&self) -> Rect {
        let band = self.accent_band();
        Rect::new(
            self.config.margin as i32,
            band.bottom() + self.config.secondary_gap as i32,
            self.canvas.width - 2 * self.config.margin,
            self.config.secondary_band_height,
        )
    }

    /// Background box behind a text block centred in `region`.
    pub fn backing_rect(&self, region: Rect, text: TextSize) -> Rect {
        let w = text.width.ceil() as u32;
        let h = text.height.ceil() as u32;
        let center = region.center();
        Rect::new(center.x - w as i32 / 2, center.y - h as i32 / 2, w, h)
            .inflate(self.config.backing_padding)
    }
}
