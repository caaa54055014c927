//! RGBA framebuffer
//!
//! A `Surface` owns one contiguous block of `width * height * 4` bytes,
//! row-major, channel order R,G,B,A. The same memory is reachable two ways:
//!
//! - random access by coordinate (`set_pixel`, `get_pixel`, blocks)
//! - a streaming cursor (`set_address`, `read_byte`, `write_word`, ...) that
//!   lets inner loops walk the buffer without recomputing `y * width + x`
//!
//! Bounds policy: random access, the cursor and block transfer are checked and
//! report a `SurfaceError`. The rasterizers (`line`, `hline`, `vline`,
//! `circle`, `fill_rect`) clip instead, silently skipping off-surface pixels.

use thiserror::Error;

use crate::geometry::{Point, Rect};

/// Bytes per pixel
pub const BPP: usize = 4;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("invalid surface dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("could not allocate {bytes} bytes for surface")]
    Allocation { bytes: usize },

    #[error("raw image is {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("pixel ({x}, {y}) outside {width}x{height} surface")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },

    #[error("address {offset} past end of {len}-pixel surface")]
    AddressOutOfRange { offset: usize, len: usize },

    #[error("cursor {cursor} cannot access {wanted} bytes of {len}")]
    CursorOverrun {
        cursor: usize,
        wanted: usize,
        len: usize,
    },

    #[error("word access at unaligned cursor {cursor}")]
    Misaligned { cursor: usize },

    #[error("block {rect:?} does not fit a {width}x{height} surface")]
    BlockOutOfBounds { rect: Rect, width: u32, height: u32 },
}

// ============================================================================
// Color
// ============================================================================

/// One packed pixel.
///
/// The word is the little-endian reading of the pixel's bytes, so the
/// in-memory order is always R,G,B,A regardless of host endianness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Self = Self(0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(u32::from_le_bytes([r, g, b, a]))
    }

    /// Opaque color
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    #[inline]
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(bytes))
    }

    #[inline]
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub const fn r(self) -> u8 {
        self.to_bytes()[0]
    }

    #[inline]
    pub const fn g(self) -> u8 {
        self.to_bytes()[1]
    }

    #[inline]
    pub const fn b(self) -> u8 {
        self.to_bytes()[2]
    }

    #[inline]
    pub const fn a(self) -> u8 {
        self.to_bytes()[3]
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::rgb(r, g, b)
    }
}

// ============================================================================
// Surface
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    /// Byte offset of the streaming cursor, `0..=pixels.len()`
    cursor: usize,
}

impl Surface {
    /// Allocate a zero-filled surface
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let bytes = Self::byte_len(width, height)?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(bytes)
            .map_err(|_| SurfaceError::Allocation { bytes })?;
        pixels.resize(bytes, 0);
        Ok(Self {
            pixels,
            width,
            height,
            cursor: 0,
        })
    }

    /// Wrap raw RGBA bytes (row-major, 4 bytes per pixel)
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, SurfaceError> {
        let expected = Self::byte_len(width, height)?;
        if data.len() != expected {
            return Err(SurfaceError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            pixels: data,
            width,
            height,
            cursor: 0,
        })
    }

    /// Validated byte size for a `width` x `height` surface
    fn byte_len(width: u32, height: u32) -> Result<usize, SurfaceError> {
        let invalid = SurfaceError::InvalidDimensions { width, height };
        // Coordinates are i32 throughout the drawing API
        if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(invalid);
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(BPP))
            .filter(|&n| n <= isize::MAX as usize)
            .ok_or(invalid)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::of_size(self.width, self.height)
    }

    /// Number of pixels
    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len() / BPP
    }

    /// Always false, surfaces are never zero-sized
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Byte offset of (x, y). The single place coordinates become offsets.
    #[inline]
    fn offset(&self, x: i32, y: i32) -> Result<usize, SurfaceError> {
        if self.in_bounds(x, y) {
            Ok((y as usize * self.width as usize + x as usize) * BPP)
        } else {
            Err(SurfaceError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    #[inline]
    fn load(&self, idx: usize) -> Color {
        Color::from_bytes([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ])
    }

    #[inline]
    fn store(&mut self, idx: usize, color: Color) {
        self.pixels[idx..idx + BPP].copy_from_slice(&color.to_bytes());
    }

    /// Write the pixel at (x, y) if it is on the surface. Rasterizers use this
    /// with widened coordinates so their arithmetic cannot overflow.
    #[inline]
    fn plot(&mut self, x: i64, y: i64, color: Color) {
        if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
            if let Ok(idx) = self.offset(x, y) {
                self.store(idx, color);
            }
        }
    }

    // ========================================================================
    // Random access
    // ========================================================================

    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) -> Result<(), SurfaceError> {
        let idx = self.offset(x, y)?;
        self.store(idx, color);
        Ok(())
    }

    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Result<Color, SurfaceError> {
        let idx = self.offset(x, y)?;
        Ok(self.load(idx))
    }

    // ========================================================================
    // Streaming cursor
    // ========================================================================

    /// Move the cursor to a pixel offset (`y * width + x`).
    /// `len()` is allowed and means "at end".
    pub fn set_address(&mut self, pixel_offset: usize) -> Result<(), SurfaceError> {
        if pixel_offset > self.len() {
            return Err(SurfaceError::AddressOutOfRange {
                offset: pixel_offset,
                len: self.len(),
            });
        }
        self.cursor = pixel_offset * BPP;
        Ok(())
    }

    /// Cursor position in pixels, rounded down
    #[inline]
    pub fn address(&self) -> usize {
        self.cursor / BPP
    }

    /// Cursor position in bytes
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Round the cursor up to the next pixel boundary.
    /// Needed before word access after an odd number of byte accesses.
    pub fn align(&mut self) {
        self.cursor = self.cursor.next_multiple_of(BPP).min(self.pixels.len());
    }

    #[inline]
    fn check_stream(&self, wanted: usize) -> Result<usize, SurfaceError> {
        if wanted == BPP && self.cursor % BPP != 0 {
            return Err(SurfaceError::Misaligned {
                cursor: self.cursor,
            });
        }
        if self.cursor + wanted > self.pixels.len() {
            return Err(SurfaceError::CursorOverrun {
                cursor: self.cursor,
                wanted,
                len: self.pixels.len(),
            });
        }
        Ok(self.cursor)
    }

    #[inline]
    pub fn read_byte(&mut self) -> Result<u8, SurfaceError> {
        let idx = self.check_stream(1)?;
        self.cursor += 1;
        Ok(self.pixels[idx])
    }

    #[inline]
    pub fn write_byte(&mut self, value: u8) -> Result<(), SurfaceError> {
        let idx = self.check_stream(1)?;
        self.pixels[idx] = value;
        self.cursor += 1;
        Ok(())
    }

    /// Read the pixel under the cursor without advancing
    #[inline]
    pub fn peek_word(&self) -> Result<Color, SurfaceError> {
        let idx = self.check_stream(BPP)?;
        Ok(self.load(idx))
    }

    #[inline]
    pub fn read_word(&mut self) -> Result<Color, SurfaceError> {
        let color = self.peek_word()?;
        self.cursor += BPP;
        Ok(color)
    }

    #[inline]
    pub fn write_word(&mut self, color: Color) -> Result<(), SurfaceError> {
        let idx = self.check_stream(BPP)?;
        self.store(idx, color);
        self.cursor += BPP;
        Ok(())
    }

    // ========================================================================
    // Whole-buffer operations
    // ========================================================================

    /// Zero every byte (transparent black)
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Fill with a solid color
    pub fn fill(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for chunk in self.pixels.chunks_exact_mut(BPP) {
            chunk.copy_from_slice(&bytes);
        }
    }

    /// Become a copy of `other`, taking on its dimensions
    pub fn copy_from(&mut self, other: &Surface) -> Result<(), SurfaceError> {
        if self.pixels.len() != other.pixels.len() {
            let mut pixels = Vec::new();
            pixels
                .try_reserve_exact(other.pixels.len())
                .map_err(|_| SurfaceError::Allocation {
                    bytes: other.pixels.len(),
                })?;
            pixels.extend_from_slice(&other.pixels);
            self.pixels = pixels;
        } else {
            self.pixels.copy_from_slice(&other.pixels);
        }
        self.width = other.width;
        self.height = other.height;
        self.cursor = 0;
        Ok(())
    }

    // ========================================================================
    // Block transfer
    // ========================================================================

    /// Copy a rectangle out into a new surface. The rectangle must lie
    /// entirely on this surface.
    pub fn get_block(&self, rect: Rect) -> Result<Surface, SurfaceError> {
        if !self.bounds().contains_rect(&rect) {
            return Err(SurfaceError::BlockOutOfBounds {
                rect,
                width: self.width,
                height: self.height,
            });
        }

        let mut block = Surface::new(rect.w as u32, rect.h as u32)?;
        let row_bytes = rect.w as usize * BPP;
        for row in 0..rect.h {
            let src = self.offset(rect.x, rect.y + row)?;
            let dst = row as usize * row_bytes;
            block.pixels[dst..dst + row_bytes].copy_from_slice(&self.pixels[src..src + row_bytes]);
        }
        Ok(block)
    }

    /// Write a block back with its top-left at (x, y). Nothing is written
    /// unless the whole block fits.
    pub fn put_block(&mut self, block: &Surface, x: i32, y: i32) -> Result<(), SurfaceError> {
        let rect = Rect::new(x, y, block.width as i32, block.height as i32);
        if !self.bounds().contains_rect(&rect) {
            return Err(SurfaceError::BlockOutOfBounds {
                rect,
                width: self.width,
                height: self.height,
            });
        }

        let row_bytes = block.width as usize * BPP;
        for row in 0..rect.h {
            let dst = self.offset(x, y + row)?;
            let src = row as usize * row_bytes;
            self.pixels[dst..dst + row_bytes].copy_from_slice(&block.pixels[src..src + row_bytes]);
        }
        Ok(())
    }

    // ========================================================================
    // Rasterization
    // ========================================================================

    /// Bresenham line. Walks the dominant axis one pixel at a time; the error
    /// term steps the minor axis whenever it reaches the dominant delta.
    ///
    /// Endpoints may be anywhere in `i32`. Only the steps whose dominant
    /// coordinate falls on the surface are walked; the minor position and
    /// error term are recovered in closed form at the first of them.
    pub fn line(&mut self, p1: Point, p2: Point, color: Color) {
        let (x1, y1) = (i64::from(p1.x), i64::from(p1.y));
        let (x2, y2) = (i64::from(p2.x), i64::from(p2.y));
        let dx = (x2 - x1).abs();
        let dy = (y2 - y1).abs();
        let sx = if x1 < x2 { 1 } else { -1 };
        let sy = if y1 < y2 { 1 } else { -1 };

        if dx >= dy {
            // x-major; also covers p1 == p2
            let Some((first, last)) = steps_on_axis(x1, sx, dx, i64::from(self.width)) else {
                return;
            };
            let (mut y, mut delta) = minor_at(y1, sy, dy, dx, first);
            for k in first..=last {
                self.plot(x1 + sx * k, y, color);
                delta += 2 * dy;
                if delta >= dx && dy != 0 {
                    y += sy;
                    delta -= 2 * dx;
                }
            }
        } else {
            let Some((first, last)) = steps_on_axis(y1, sy, dy, i64::from(self.height)) else {
                return;
            };
            let (mut x, mut delta) = minor_at(x1, sx, dx, dy, first);
            for k in first..=last {
                self.plot(x, y1 + sy * k, color);
                delta += 2 * dx;
                if delta >= dy {
                    x += sx;
                    delta -= 2 * dy;
                }
            }
        }
    }

    /// Horizontal run on row `p1.y` between the two x coordinates
    pub fn hline(&mut self, p1: Point, p2: Point, color: Color) {
        let y = p1.y;
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (x1, x2) = if p1.x <= p2.x { (p1.x, p2.x) } else { (p2.x, p1.x) };
        let start = x1.max(0);
        let end = x2.min(self.width as i32 - 1);
        if start > end {
            return;
        }

        let begin = (y as usize * self.width as usize + start as usize) * BPP;
        let count = (end - start + 1) as usize;
        let bytes = color.to_bytes();
        for chunk in self.pixels[begin..begin + count * BPP].chunks_exact_mut(BPP) {
            chunk.copy_from_slice(&bytes);
        }
    }

    /// Vertical run on column `p1.x` between the two y coordinates
    pub fn vline(&mut self, p1: Point, p2: Point, color: Color) {
        let x = p1.x;
        if x < 0 || x >= self.width as i32 {
            return;
        }
        let (y1, y2) = if p1.y <= p2.y { (p1.y, p2.y) } else { (p2.y, p1.y) };
        let start = y1.max(0);
        let end = y2.min(self.height as i32 - 1);
        if start > end {
            return;
        }

        let stride = self.width as usize * BPP;
        let mut idx = (start as usize * self.width as usize + x as usize) * BPP;
        for _ in start..=end {
            self.store(idx, color);
            idx += stride;
        }
    }

    /// Midpoint circle outline using 8-way symmetry
    ///
    /// Only octant columns whose offset can land on the surface are walked.
    /// Everything before the first of them is skipped by recomputing the
    /// octant state directly.
    pub fn circle(&mut self, center: Point, radius: i32, color: Color) {
        if radius < 0 {
            return;
        }

        let (w, h) = (i64::from(self.width), i64::from(self.height));
        let (cx, cy, r) = (i64::from(center.x), i64::from(center.y), i64::from(radius));
        if cx + r < 0 || cx - r >= w || cy + r < 0 || cy - r >= h {
            return;
        }

        let mut spans = [reach(cx, w), reach(cy, h)];
        spans.sort_unstable();

        let (mut x, mut y, mut d) = (0, r, 3 - 2 * r);
        for (first, last) in spans {
            if x < first {
                let jump = octant_at(first, r);
                if jump.0 > x {
                    (x, y, d) = jump;
                }
            }

            while y >= x && x <= last {
                self.plot(cx + x, cy + y, color);
                self.plot(cx - x, cy + y, color);
                self.plot(cx + x, cy - y, color);
                self.plot(cx - x, cy - y, color);
                self.plot(cx + y, cy + x, color);
                self.plot(cx - y, cy + x, color);
                self.plot(cx + y, cy - x, color);
                self.plot(cx - y, cy - x, color);

                if d > 0 {
                    d += 4 * (x - y) + 10;
                    y -= 1;
                } else {
                    d += 4 * x + 6;
                }
                x += 1;
            }
        }
    }

    /// Solid rectangle, clipped to the surface
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(clip) = self.bounds().intersect(&rect) else {
            return;
        };
        for y in clip.y..clip.bottom() {
            self.hline(Point::new(clip.x, y), Point::new(clip.right() - 1, y), color);
        }
    }

    /// Scale RGB of every pixel by `factor` (0.0 = black, 1.0 = unchanged).
    /// Alpha is left alone.
    pub fn fade(&mut self, factor: f32) {
        let factor_u16 = (factor.clamp(0.0, 1.0) * 256.0) as u16;
        for chunk in self.pixels.chunks_exact_mut(BPP) {
            chunk[0] = ((chunk[0] as u16 * factor_u16) >> 8) as u8;
            chunk[1] = ((chunk[1] as u16 * factor_u16) >> 8) as u8;
            chunk[2] = ((chunk[2] as u16 * factor_u16) >> 8) as u8;
        }
    }
}

// ============================================================================
// Rasterizer helpers
// ============================================================================

/// Range of steps `k` in `0..=len` for which `start + step * k` lies in
/// `0..limit`
fn steps_on_axis(start: i64, step: i64, len: i64, limit: i64) -> Option<(i64, i64)> {
    let (first, last) = if step > 0 {
        ((-start).max(0), len.min(limit - 1 - start))
    } else {
        ((start - limit + 1).max(0), len.min(start))
    };
    (first <= last).then_some((first, last))
}

/// Minor-axis position and error term of a Bresenham walk after `k` major
/// steps. Every step adds `2 * minor` and each minor move subtracts
/// `2 * major`, with the term kept in `-major..major`.
fn minor_at(start: i64, step: i64, minor: i64, major: i64, k: i64) -> (i64, i64) {
    if major == 0 {
        return (start, 0);
    }
    let acc = 2 * i128::from(minor) * i128::from(k);
    let moves = (acc + i128::from(major)) / (2 * i128::from(major));
    let delta = acc - 2 * i128::from(major) * moves;
    (start + step * moves as i64, delta as i64)
}

/// Nearest and farthest distance from `center` to the pixels `0..len` of
/// one axis
fn reach(center: i64, len: i64) -> (i64, i64) {
    let near = if center < 0 {
        -center
    } else if center >= len {
        center - (len - 1)
    } else {
        0
    };
    (near, center.abs().max((len - 1 - center).abs()))
}

/// Octant row for column `x`: the smallest `y` with
/// `2x² + y² + (y + 1)² > 2r²`
fn octant_y(x: i64, r: i64) -> i64 {
    let (x2, r2) = (i128::from(x) * i128::from(x), i128::from(r) * i128::from(r));
    let above = |y: i64| {
        let y = i128::from(y);
        2 * x2 + y * y + (y + 1) * (y + 1) > 2 * r2
    };
    let mut y = ((r2 - x2).max(0) as f64).sqrt() as i64;
    while y > 0 && above(y - 1) {
        y -= 1;
    }
    while !above(y) {
        y += 1;
    }
    y
}

/// Midpoint state `(x, y, d)` at column `target`, or at the last column
/// before it where the walk still moves at most one row per column. Past
/// that point the row drifts from the closed form near the diagonal.
fn octant_at(target: i64, r: i64) -> (i64, i64, i64) {
    let mut x = target.min((r as f64 * std::f64::consts::FRAC_1_SQRT_2) as i64).max(0);
    loop {
        let y = octant_y(x, r);
        if y >= x + 2 || x == 0 {
            let (cx, cy, cr) = (i128::from(x + 1), i128::from(y), i128::from(r));
            let d = 2 * cx * cx + cy * cy + (cy - 1) * (cy - 1) - 2 * cr * cr;
            return (x, y, d as i64);
        }
        x -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drawn(surface: &Surface) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for y in 0..surface.height() as i32 {
            for x in 0..surface.width() as i32 {
                if surface.get_pixel(x, y).unwrap() != Color::TRANSPARENT {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn test_color_byte_order() {
        let c = Color::rgba(1, 2, 3, 4);
        assert_eq!(c.to_bytes(), [1, 2, 3, 4]);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (1, 2, 3, 4));
        assert_eq!(Color::from_bytes([1, 2, 3, 4]), c);
    }

    #[test]
    fn test_new_is_zeroed() {
        let s = Surface::new(3, 2).unwrap();
        assert_eq!(s.as_bytes().len(), 3 * 2 * 4);
        assert!(s.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.len(), 6);
    }

    #[test]
    fn test_new_rejects_degenerate_dimensions() {
        assert_eq!(
            Surface::new(0, 10),
            Err(SurfaceError::InvalidDimensions {
                width: 0,
                height: 10
            })
        );
        assert!(Surface::new(10, 0).is_err());
        assert!(Surface::new(u32::MAX, 1).is_err());
    }

    #[test]
    fn test_from_rgba_length_checked() {
        assert!(Surface::from_rgba(2, 2, vec![0; 16]).is_ok());
        assert_eq!(
            Surface::from_rgba(2, 2, vec![0; 15]),
            Err(SurfaceError::SizeMismatch {
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn test_pixel_roundtrip_and_layout() {
        let mut s = Surface::new(4, 4).unwrap();
        s.set_pixel(1, 2, Color::rgba(10, 20, 30, 40)).unwrap();
        assert_eq!(s.get_pixel(1, 2).unwrap(), Color::rgba(10, 20, 30, 40));
        let idx = (2 * 4 + 1) * 4;
        assert_eq!(&s.as_bytes()[idx..idx + 4], &[10, 20, 30, 40]);
    }

    #[test]
    fn test_pixel_bounds_fail() {
        let mut s = Surface::new(5, 3).unwrap();
        for (x, y) in [(-1, 0), (0, -1), (5, 0), (0, 3), (5, 3)] {
            assert!(matches!(
                s.set_pixel(x, y, Color::RED),
                Err(SurfaceError::OutOfBounds { .. })
            ));
            assert!(s.get_pixel(x, y).is_err());
        }
        // Nothing leaked into the buffer
        assert!(s.as_bytes().iter().all(|&b| b == 0));
        assert!(s.set_pixel(4, 2, Color::RED).is_ok());
    }

    #[test]
    fn test_streaming_words_match_random_access() {
        let mut s = Surface::new(4, 3).unwrap();
        s.set_address(4 + 1).unwrap();
        s.write_word(Color::RED).unwrap();
        s.write_word(Color::GREEN).unwrap();
        assert_eq!(s.address(), 7);
        assert_eq!(s.get_pixel(1, 1).unwrap(), Color::RED);
        assert_eq!(s.get_pixel(2, 1).unwrap(), Color::GREEN);

        s.set_address(5).unwrap();
        assert_eq!(s.peek_word().unwrap(), Color::RED);
        assert_eq!(s.cursor(), 20);
        assert_eq!(s.read_word().unwrap(), Color::RED);
        assert_eq!(s.read_word().unwrap(), Color::GREEN);
    }

    #[test]
    fn test_streaming_bytes_and_align() {
        let mut s = Surface::new(2, 1).unwrap();
        s.write_byte(7).unwrap();
        s.write_byte(8).unwrap();
        s.write_byte(9).unwrap();
        assert_eq!(s.cursor(), 3);
        assert_eq!(
            s.write_word(Color::WHITE),
            Err(SurfaceError::Misaligned { cursor: 3 })
        );
        s.align();
        assert_eq!(s.cursor(), 4);
        s.write_word(Color::WHITE).unwrap();
        assert_eq!(s.get_pixel(0, 0).unwrap(), Color::rgba(7, 8, 9, 0));
        assert_eq!(s.get_pixel(1, 0).unwrap(), Color::WHITE);

        // Aligned cursor stays put
        s.set_address(1).unwrap();
        s.align();
        assert_eq!(s.cursor(), 4);
        s.set_address(0).unwrap();
        assert_eq!(s.read_byte().unwrap(), 7);
    }

    #[test]
    fn test_streaming_overrun() {
        let mut s = Surface::new(2, 2).unwrap();
        assert!(s.set_address(4).is_ok());
        assert!(matches!(
            s.write_word(Color::RED),
            Err(SurfaceError::CursorOverrun { .. })
        ));
        assert!(s.read_byte().is_err());
        assert_eq!(
            s.set_address(5),
            Err(SurfaceError::AddressOutOfRange { offset: 5, len: 4 })
        );
        // Failed accesses don't move the cursor
        assert_eq!(s.cursor(), 16);
    }

    #[test]
    fn test_clear_and_fill() {
        let mut s = Surface::new(3, 3).unwrap();
        s.fill(Color::BLUE);
        assert_eq!(s.get_pixel(2, 2).unwrap(), Color::BLUE);
        s.clear();
        assert!(s.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_copy_from_reallocates() {
        let mut src = Surface::new(3, 5).unwrap();
        for y in 0..5 {
            for x in 0..3 {
                src.set_pixel(x, y, Color::rgba(x as u8, y as u8, 7, 255)).unwrap();
            }
        }
        let mut dst = Surface::new(1, 1).unwrap();
        dst.set_address(1).unwrap();
        dst.copy_from(&src).unwrap();

        assert_eq!((dst.width(), dst.height()), (3, 5));
        assert_eq!(dst.cursor(), 0);
        for y in 0..5 {
            for x in 0..3 {
                assert_eq!(dst.get_pixel(x, y).unwrap(), src.get_pixel(x, y).unwrap());
            }
        }
    }

    #[test]
    fn test_block_roundtrip() {
        let mut s = Surface::new(6, 6).unwrap();
        s.set_pixel(2, 3, Color::RED).unwrap();
        s.set_pixel(4, 4, Color::GREEN).unwrap();

        let block = s.get_block(Rect::new(2, 3, 3, 2)).unwrap();
        assert_eq!((block.width(), block.height()), (3, 2));
        assert_eq!(block.get_pixel(0, 0).unwrap(), Color::RED);
        assert_eq!(block.get_pixel(2, 1).unwrap(), Color::GREEN);

        let mut other = Surface::new(6, 6).unwrap();
        other.put_block(&block, 0, 0).unwrap();
        assert_eq!(other.get_pixel(0, 0).unwrap(), Color::RED);
        assert_eq!(other.get_pixel(2, 1).unwrap(), Color::GREEN);
        assert_eq!(other.get_pixel(3, 0).unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn test_block_out_of_range_fails_without_writing() {
        let mut s = Surface::new(4, 4).unwrap();
        assert!(s.get_block(Rect::new(3, 3, 2, 2)).is_err());
        assert!(s.get_block(Rect::new(-1, 0, 2, 2)).is_err());
        assert!(s.get_block(Rect::new(0, 0, 0, 2)).is_err());

        let mut block = Surface::new(2, 2).unwrap();
        block.fill(Color::WHITE);
        assert!(matches!(
            s.put_block(&block, 3, 0),
            Err(SurfaceError::BlockOutOfBounds { .. })
        ));
        assert!(s.as_bytes().iter().all(|&b| b == 0));
        assert!(s.put_block(&block, 2, 2).is_ok());
    }

    #[test]
    fn test_hline_scenario() {
        let mut s = Surface::new(4, 4).unwrap();
        let before = s.get_pixel(2, 0).unwrap();
        s.hline(Point::new(0, 1), Point::new(3, 1), Color::RED);
        assert_eq!(s.get_pixel(2, 1).unwrap(), Color::RED);
        assert_eq!(s.get_pixel(2, 0).unwrap(), before);
    }

    #[test]
    fn test_hline_vline_reversed_and_clipped() {
        let mut s = Surface::new(5, 5).unwrap();
        s.hline(Point::new(10, 2), Point::new(-3, 2), Color::RED);
        for x in 0..5 {
            assert_eq!(s.get_pixel(x, 2).unwrap(), Color::RED);
        }
        s.vline(Point::new(1, 4), Point::new(1, 3), Color::BLUE);
        assert_eq!(s.get_pixel(1, 3).unwrap(), Color::BLUE);
        assert_eq!(s.get_pixel(1, 4).unwrap(), Color::BLUE);
        assert_eq!(s.get_pixel(1, 1).unwrap(), Color::TRANSPARENT);

        // Entirely off-surface rows/columns are ignored
        s.hline(Point::new(0, -1), Point::new(4, -1), Color::GREEN);
        s.vline(Point::new(5, 0), Point::new(5, 4), Color::GREEN);
        assert!(drawn(&s).iter().all(|&(x, y)| y == 2 || x == 1));
    }

    #[test]
    fn test_line_single_point() {
        let mut s = Surface::new(5, 5).unwrap();
        s.line(Point::new(2, 2), Point::new(2, 2), Color::RED);
        assert_eq!(drawn(&s), vec![(2, 2)]);
    }

    #[test]
    fn test_line_endpoints_and_continuity() {
        let cases = [
            ((0, 0), (15, 4)),
            ((15, 4), (0, 0)),
            ((3, 15), (5, 0)),
            ((0, 15), (15, 0)),
            ((7, 1), (7, 12)),
            ((1, 9), (14, 9)),
            ((2, 2), (12, 12)),
        ];
        for (a, b) in cases {
            let mut s = Surface::new(16, 16).unwrap();
            let (p1, p2) = (Point::from(a), Point::from(b));
            s.line(p1, p2, Color::RED);

            assert_eq!(s.get_pixel(p1.x, p1.y).unwrap(), Color::RED, "{:?}", (a, b));
            assert_eq!(s.get_pixel(p2.x, p2.y).unwrap(), Color::RED, "{:?}", (a, b));

            let dx = (p2.x - p1.x).abs();
            let dy = (p2.y - p1.y).abs();
            let pixels = drawn(&s);
            assert_eq!(pixels.len() as i32, dx.max(dy) + 1, "{:?}", (a, b));

            // One pixel per step along the dominant axis, no gaps
            if dx >= dy {
                let (lo, hi) = (p1.x.min(p2.x), p1.x.max(p2.x));
                for x in lo..=hi {
                    assert_eq!(pixels.iter().filter(|p| p.0 == x).count(), 1);
                }
            } else {
                let (lo, hi) = (p1.y.min(p2.y), p1.y.max(p2.y));
                for y in lo..=hi {
                    assert_eq!(pixels.iter().filter(|p| p.1 == y).count(), 1);
                }
            }

            // Every pixel stays close to the ideal segment
            let len = ((dx * dx + dy * dy) as f32).sqrt();
            for &(x, y) in &pixels {
                let cross = ((p2.x - p1.x) * (y - p1.y) - (p2.y - p1.y) * (x - p1.x)) as f32;
                assert!((cross / len).abs() <= 1.0, "{:?} strays at {:?}", (a, b), (x, y));
            }
        }
    }

    #[test]
    fn test_line_clips_off_surface() {
        let mut s = Surface::new(4, 4).unwrap();
        s.line(Point::new(-5, 1), Point::new(10, 1), Color::RED);
        assert_eq!(drawn(&s).len(), 4);
    }

    /// Unclipped Bresenham walk, kept off the surface for comparison
    fn walked_line(p1: Point, p2: Point, width: i32, height: i32) -> Vec<(i32, i32)> {
        let dx = (p2.x - p1.x).abs();
        let dy = (p2.y - p1.y).abs();
        let sx = if p1.x < p2.x { 1 } else { -1 };
        let sy = if p1.y < p2.y { 1 } else { -1 };
        let (mut x, mut y, mut delta) = (p1.x, p1.y, 0);
        let mut out = Vec::new();
        let (major, minor) = (dx.max(dy), dx.min(dy));
        for _ in 0..=major {
            out.push((x, y));
            delta += 2 * minor;
            if dx >= dy {
                x += sx;
                if delta >= dx && dy != 0 {
                    y += sy;
                    delta -= 2 * dx;
                }
            } else {
                y += sy;
                if delta >= dy {
                    x += sx;
                    delta -= 2 * dy;
                }
            }
        }
        out.retain(|&(x, y)| x >= 0 && x < width && y >= 0 && y < height);
        out.sort_by_key(|&(x, y)| (y, x));
        out
    }

    #[test]
    fn test_clipped_line_matches_full_walk() {
        let coords = [-90, -33, -7, -1, 0, 5, 11, 15, 16, 23, 70];
        for &x1 in &coords {
            for &y1 in &coords {
                for (x2, y2) in [(13, -40), (-60, 9), (4, 77), (88, 51), (2, 3), (x1, y1)] {
                    let (p1, p2) = (Point::new(x1, y1), Point::new(x2, y2));
                    let mut s = Surface::new(16, 12).unwrap();
                    s.line(p1, p2, Color::RED);
                    assert_eq!(drawn(&s), walked_line(p1, p2, 16, 12), "{:?} -> {:?}", p1, p2);
                }
            }
        }
    }

    #[test]
    fn test_line_extreme_endpoints() {
        let mut s = Surface::new(8, 8).unwrap();
        s.line(Point::new(i32::MIN, 0), Point::new(i32::MAX, 0), Color::RED);
        assert_eq!(drawn(&s), (0..8).map(|x| (x, 0)).collect::<Vec<_>>());

        let mut s = Surface::new(8, 8).unwrap();
        s.line(
            Point::new(i32::MAX, i32::MAX),
            Point::new(i32::MIN, i32::MIN),
            Color::RED,
        );
        assert_eq!(drawn(&s), (0..8).map(|i| (i, i)).collect::<Vec<_>>());

        let mut s = Surface::new(8, 8).unwrap();
        s.line(Point::new(i32::MIN, i32::MIN), Point::new(i32::MIN, i32::MAX), Color::RED);
        s.line(Point::new(100, -3), Point::new(i32::MAX, 4), Color::RED);
        assert!(drawn(&s).is_empty());
    }

    #[test]
    fn test_circle_radius_zero() {
        let mut s = Surface::new(5, 5).unwrap();
        s.circle(Point::new(2, 2), 0, Color::RED);
        assert_eq!(drawn(&s), vec![(2, 2)]);
    }

    #[test]
    fn test_circle_eight_way_symmetry() {
        for r in 1..12 {
            let mut s = Surface::new(31, 31).unwrap();
            let c = 15;
            s.circle(Point::new(c, c), r, Color::RED);
            let pixels = drawn(&s);
            assert!(!pixels.is_empty());
            for &(x, y) in &pixels {
                let (dx, dy) = (x - c, y - c);
                for (mx, my) in [
                    (dx, dy),
                    (-dx, dy),
                    (dx, -dy),
                    (-dx, -dy),
                    (dy, dx),
                    (-dy, dx),
                    (dy, -dx),
                    (-dy, -dx),
                ] {
                    assert_eq!(
                        s.get_pixel(c + mx, c + my).unwrap(),
                        Color::RED,
                        "radius {} missing reflection of {:?}",
                        r,
                        (dx, dy)
                    );
                }
                // Stays on the ring
                let dist = ((dx * dx + dy * dy) as f32).sqrt();
                assert!((dist - r as f32).abs() < 1.0);
            }
            // Cardinal points are always hit
            assert_eq!(s.get_pixel(c + r, c).unwrap(), Color::RED);
            assert_eq!(s.get_pixel(c, c - r).unwrap(), Color::RED);
        }
    }

    #[test]
    fn test_circle_clips_at_edges() {
        let mut s = Surface::new(8, 8).unwrap();
        s.circle(Point::new(0, 0), 5, Color::RED);
        s.circle(Point::new(3, 3), -1, Color::GREEN);
        assert!(!drawn(&s).is_empty());
        assert_eq!(s.get_pixel(5, 0).unwrap(), Color::RED);
        assert_eq!(s.get_pixel(3, 3).unwrap(), Color::TRANSPARENT);
    }

    /// Full midpoint walk with every octant point kept
    fn walked_circle(c: Point, r: i32, width: i32, height: i32) -> Vec<(i32, i32)> {
        let (mut x, mut y, mut d) = (0, r, 3 - 2 * r);
        let mut out = Vec::new();
        while y >= x {
            for (ox, oy) in [(x, y), (-x, y), (x, -y), (-x, -y), (y, x), (-y, x), (y, -x), (-y, -x)] {
                out.push((c.x + ox, c.y + oy));
            }
            if d > 0 {
                d += 4 * (x - y) + 10;
                y -= 1;
            } else {
                d += 4 * x + 6;
            }
            x += 1;
        }
        out.retain(|&(x, y)| x >= 0 && x < width && y >= 0 && y < height);
        out.sort_by_key(|&(x, y)| (y, x));
        out.dedup();
        out
    }

    #[test]
    fn test_off_centre_circles_match_full_walk() {
        let centres = [-70, -40, -30, -12, -1, 0, 7, 15, 16, 30, 55];
        for &cx in &centres {
            for &cy in &centres {
                for r in [0, 1, 5, 17, 30, 45, 60, 99] {
                    let c = Point::new(cx, cy);
                    let mut s = Surface::new(16, 16).unwrap();
                    s.circle(c, r, Color::RED);
                    assert_eq!(drawn(&s), walked_circle(c, r, 16, 16), "{:?} r={}", c, r);
                }
            }
        }
    }

    #[test]
    fn test_circle_huge_radius() {
        let mut s = Surface::new(16, 16).unwrap();
        s.circle(Point::new(0, 0), i32::MAX / 2, Color::RED);
        assert!(drawn(&s).is_empty());

        // Only the leftmost arc reaches the surface, as column 0
        let r = i32::MAX / 2;
        s.circle(Point::new(-r, 3), r, Color::RED);
        assert_eq!(drawn(&s), (0..16).map(|y| (0, y)).collect::<Vec<_>>());

        let mut s = Surface::new(16, 16).unwrap();
        s.circle(Point::new(i32::MAX, i32::MIN), i32::MAX, Color::RED);
        s.circle(Point::new(i32::MIN, i32::MIN), i32::MAX, Color::RED);
        assert!(drawn(&s).is_empty());
    }

    #[test]
    fn test_fill_rect_clipped() {
        let mut s = Surface::new(4, 4).unwrap();
        s.fill_rect(Rect::new(2, 2, 10, 10), Color::GREEN);
        assert_eq!(drawn(&s).len(), 4);
        s.fill_rect(Rect::new(-8, -8, 4, 4), Color::RED);
        assert_eq!(drawn(&s).len(), 4);
    }

    #[test]
    fn test_fade_keeps_alpha() {
        let mut s = Surface::new(1, 1).unwrap();
        s.fill(Color::rgba(200, 100, 50, 255));
        s.fade(0.5);
        assert_eq!(s.get_pixel(0, 0).unwrap(), Color::rgba(100, 50, 25, 255));
    }
}
