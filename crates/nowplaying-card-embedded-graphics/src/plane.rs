//! Packed 1-bit raster planes.

use core::convert::Infallible;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};
use image::{GrayImage, Luma, Rgb, RgbImage};
use nowplaying_card::{CanvasSize, Rect};

use crate::art::{TriTone, TriTonePalette};

/// Error returned when a plane is rebuilt from raw bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaneError {
    InvalidDimensions,
    InvalidPixelData,
}

impl core::fmt::Display for PlaneError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidDimensions => write!(f, "plane dimensions must be positive"),
            Self::InvalidPixelData => write!(f, "plane pixel data has the wrong length"),
        }
    }
}

impl std::error::Error for PlaneError {}

/// One monochrome plane stored in packed row-major bits, MSB first.
///
/// A set bit is a mark: ink color on the ink plane, accent color on the
/// accent plane. Draws outside the plane are dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plane {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Plane {
    /// A plane of background pixels.
    pub fn new(size: CanvasSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
            pixels: vec![0; Self::packed_len(size.width, size.height)],
        }
    }

    /// Construct a plane from packed row-major bits.
    pub fn from_packed_bits(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, PlaneError> {
        if width == 0 || height == 0 {
            return Err(PlaneError::InvalidDimensions);
        }
        if pixels.len() != Self::packed_len(width, height) {
            return Err(PlaneError::InvalidPixelData);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn canvas_size(&self) -> CanvasSize {
        CanvasSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Packed bits, one row after another without row padding.
    pub fn as_packed_bits(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_packed_bits(self) -> Vec<u8> {
        self.pixels
    }

    fn packed_len(width: u32, height: u32) -> usize {
        (width as usize * height as usize).div_ceil(8)
    }

    fn bit_position(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let bit_index = y as usize * self.width as usize + x as usize;
        Some((bit_index / 8, 7 - (bit_index % 8) as u8))
    }

    /// Whether the pixel carries a mark. Out-of-range pixels never do.
    pub fn is_marked(&self, x: i32, y: i32) -> bool {
        match self.bit_position(x, y) {
            Some((byte, bit)) => self
                .pixels
                .get(byte)
                .is_some_and(|b| (*b >> bit) & 0x01 == 1),
            None => false,
        }
    }

    pub fn set(&mut self, x: i32, y: i32, marked: bool) {
        let Some((index, bit)) = self.bit_position(x, y) else {
            return;
        };
        if let Some(byte) = self.pixels.get_mut(index) {
            if marked {
                *byte |= 1 << bit;
            } else {
                *byte &= !(1 << bit);
            }
        }
    }

    /// Number of marked pixels.
    pub fn marked_count(&self) -> usize {
        self.pixels.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Number of marked pixels inside `rect`.
    pub fn marked_in(&self, rect: Rect) -> usize {
        let mut count = 0;
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                if self.is_marked(x, y) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Grayscale view with marks black and background white, the polarity
    /// panel drivers expect for their frame buffers.
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            if self.is_marked(x as i32, y as i32) {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }
}

impl OriginDimensions for Plane {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Plane {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set(point.x, point.y, color.is_on());
        }
        Ok(())
    }
}

/// The finished ink and accent planes of one card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardPlanes {
    pub ink: Plane,
    pub accent: Plane,
}

impl CardPlanes {
    pub fn canvas_size(&self) -> CanvasSize {
        self.ink.canvas_size()
    }

    /// Composite color of a pixel: ink over accent over background.
    pub fn tone_at(&self, x: i32, y: i32) -> TriTone {
        if self.ink.is_marked(x, y) {
            TriTone::Ink
        } else if self.accent.is_marked(x, y) {
            TriTone::Accent
        } else {
            TriTone::Background
        }
    }

    /// Pixels inside `rect` marked on both planes at once.
    pub fn double_inked_in(&self, rect: Rect) -> usize {
        let mut count = 0;
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                if self.ink.is_marked(x, y) && self.accent.is_marked(x, y) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Full-color preview of what the panel will show.
    pub fn to_rgb_image(&self, palette: &TriTonePalette) -> RgbImage {
        let size = self.canvas_size();
        RgbImage::from_fn(size.width, size.height, |x, y| -> Rgb<u8> {
            palette.color(self.tone_at(x as i32, y as i32))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn new_plane_is_background() {
        let plane = Plane::new(CanvasSize::new(13, 5).unwrap());
        assert_eq!(plane.as_packed_bits().len(), 9);
        assert_eq!(plane.marked_count(), 0);
    }

    #[test]
    fn packed_length_does_not_wrap_for_large_planes() {
        // 65536 * 65537 pixels overflows u32.
        assert_eq!(Plane::packed_len(65536, 65537), 536_879_104);
        assert_eq!(Plane::packed_len(13, 5), 9);
    }

    #[test]
    fn short_pixel_buffer_never_panics() {
        let mut plane = Plane {
            width: 16,
            height: 16,
            pixels: vec![0; 2],
        };
        plane.set(15, 15, true);
        assert!(!plane.is_marked(15, 15));
        plane.set(0, 0, true);
        assert!(plane.is_marked(0, 0));
    }

    #[test]
    fn set_and_clear_single_pixel() {
        let mut plane = Plane::new(CanvasSize::new(10, 10).unwrap());
        plane.set(9, 9, true);
        assert!(plane.is_marked(9, 9));
        plane.set(9, 9, false);
        assert!(!plane.is_marked(9, 9));
    }

    #[test]
    fn out_of_range_draws_are_dropped() {
        let mut plane = Plane::new(CanvasSize::new(4, 4).unwrap());
        plane.set(-1, 0, true);
        plane.set(4, 0, true);
        assert_eq!(plane.marked_count(), 0);
        assert!(!plane.is_marked(100, 100));
    }

    #[test]
    fn rectangle_primitive_marks_exact_area() {
        let mut plane = Plane::new(CanvasSize::new(20, 20).unwrap());
        let Ok(()) = Rectangle::new(Point::new(2, 3), Size::new(5, 4))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut plane);
        assert_eq!(plane.marked_count(), 20);
        assert_eq!(plane.marked_in(Rect::new(2, 3, 5, 4)), 20);
    }

    #[test]
    fn packed_bits_rebuild_same_plane() {
        let mut plane = Plane::new(CanvasSize::new(9, 3).unwrap());
        plane.set(8, 2, true);
        let rebuilt = Plane::from_packed_bits(9, 3, plane.as_packed_bits().to_vec()).unwrap();
        assert_eq!(rebuilt, plane);
        assert_eq!(
            Plane::from_packed_bits(9, 3, vec![0; 2]),
            Err(PlaneError::InvalidPixelData)
        );
        assert_eq!(
            Plane::from_packed_bits(0, 3, vec![]),
            Err(PlaneError::InvalidDimensions)
        );
    }

    #[test]
    fn gray_image_uses_black_marks() {
        let mut plane = Plane::new(CanvasSize::new(2, 1).unwrap());
        plane.set(0, 0, true);
        let gray = plane.to_gray_image();
        assert_eq!(gray.get_pixel(0, 0), &Luma([0]));
        assert_eq!(gray.get_pixel(1, 0), &Luma([255]));
    }

    #[test]
    fn composite_prefers_ink_over_accent() {
        let size = CanvasSize::new(3, 1).unwrap();
        let mut planes = CardPlanes {
            ink: Plane::new(size),
            accent: Plane::new(size),
        };
        planes.ink.set(0, 0, true);
        planes.accent.set(0, 0, true);
        planes.accent.set(1, 0, true);
        assert_eq!(planes.tone_at(0, 0), TriTone::Ink);
        assert_eq!(planes.tone_at(1, 0), TriTone::Accent);
        assert_eq!(planes.tone_at(2, 0), TriTone::Background);
        assert_eq!(planes.double_inked_in(Rect::new(0, 0, 3, 1)), 1);
    }
}
