//! Compositing one surface onto another
//!
//! Per-pixel rule, in order:
//! 1. source alpha byte == 0: skip
//! 2. source word == mask (chroma key): skip
//! 3. opacity < 1.0: each channel lerps from destination towards source
//! 4. otherwise the source word is written unchanged

use super::surface::{Color, Surface, SurfaceError, BPP};
use super::viewport::Viewport;
use crate::geometry::{Point, Rect};

/// Linear interpolation of one channel, rounded to nearest
#[inline]
fn lerp_channel(dst: u8, src: u8, t: f32) -> u8 {
    let d = dst as f32;
    (d + (src as f32 - d) * t).round().clamp(0.0, 255.0) as u8
}

/// Interpolate all four channels of two pixels
#[inline]
pub fn lerp_color(dst: Color, src: Color, t: f32) -> Color {
    let d = dst.to_bytes();
    let s = src.to_bytes();
    Color::from_bytes([
        lerp_channel(d[0], s[0], t),
        lerp_channel(d[1], s[1], t),
        lerp_channel(d[2], s[2], t),
        lerp_channel(d[3], s[3], t),
    ])
}

impl Surface {
    /// Composite `src_rect` of `src` onto this surface with its top-left at
    /// `dst`.
    ///
    /// `src_rect` must lie inside `src`. The destination is clipped to this
    /// surface; a fully off-surface destination is a no-op.
    pub fn blend(
        &mut self,
        dst: Point,
        src: &Surface,
        src_rect: Rect,
        opacity: f32,
        mask: Option<Color>,
    ) -> Result<(), SurfaceError> {
        if !src.bounds().contains_rect(&src_rect) {
            return Err(SurfaceError::BlockOutOfBounds {
                rect: src_rect,
                width: src.width(),
                height: src.height(),
            });
        }

        let placed = Rect::new(dst.x, dst.y, src_rect.w, src_rect.h);
        let Some(clip) = self.bounds().intersect(&placed) else {
            return Ok(());
        };

        let opacity = opacity.clamp(0.0, 1.0);
        let translucent = opacity < 1.0;

        let dst_stride = self.width() as usize * BPP;
        let src_stride = src.width() as usize * BPP;
        // Offset of the clipped region inside the source rect
        let sx0 = src_rect.x + (clip.x - placed.x);
        let sy0 = src_rect.y + (clip.y - placed.y);

        let src_bytes = src.as_bytes();
        let dst_bytes = self.as_bytes_mut();

        for row in 0..clip.h as usize {
            let mut si = (sy0 as usize + row) * src_stride + sx0 as usize * BPP;
            let mut di = (clip.y as usize + row) * dst_stride + clip.x as usize * BPP;

            for _ in 0..clip.w {
                let s = Color::from_bytes([
                    src_bytes[si],
                    src_bytes[si + 1],
                    src_bytes[si + 2],
                    src_bytes[si + 3],
                ]);

                if s.a() != 0 && mask != Some(s) {
                    let out = if translucent {
                        let d = Color::from_bytes([
                            dst_bytes[di],
                            dst_bytes[di + 1],
                            dst_bytes[di + 2],
                            dst_bytes[di + 3],
                        ]);
                        lerp_color(d, s, opacity)
                    } else {
                        s
                    };
                    dst_bytes[di..di + BPP].copy_from_slice(&out.to_bytes());
                }

                si += BPP;
                di += BPP;
            }
        }

        Ok(())
    }

    /// Blend the viewport's active region of `src` onto the same region of
    /// this surface. Both surfaces are expected to share dimensions.
    pub fn blend_viewport(
        &mut self,
        src: &Surface,
        viewport: &Viewport,
        opacity: f32,
        mask: Option<Color>,
    ) -> Result<(), SurfaceError> {
        let Some(region) = viewport.clipped(src.width(), src.height()) else {
            return Ok(());
        };
        self.blend(region.origin(), src, region, opacity, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterned(w: u32, h: u32) -> Surface {
        let mut s = Surface::new(w, h).unwrap();
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                let v = (x * 16 + y * 3) as u8;
                s.set_pixel(x, y, Color::rgba(v, v / 2, 255 - v, 255)).unwrap();
            }
        }
        s
    }

    #[test]
    fn test_lerp_color_endpoints() {
        let a = Color::rgba(0, 100, 200, 255);
        let b = Color::rgba(100, 0, 200, 55);
        assert_eq!(lerp_color(a, b, 0.0), a);
        assert_eq!(lerp_color(a, b, 1.0), b);
        assert_eq!(lerp_color(a, b, 0.5), Color::rgba(50, 50, 200, 155));
    }

    #[test]
    fn test_full_opacity_copies_region() {
        let src = patterned(8, 8);
        let mut dst = Surface::new(8, 8).unwrap();
        dst.fill(Color::rgb(9, 9, 9));
        let rect = Rect::new(2, 1, 4, 5);

        dst.blend(Point::new(3, 2), &src, rect, 1.0, None).unwrap();

        for y in 0..rect.h {
            for x in 0..rect.w {
                assert_eq!(
                    dst.get_pixel(3 + x, 2 + y).unwrap(),
                    src.get_pixel(rect.x + x, rect.y + y).unwrap()
                );
            }
        }
        // Outside the placed rect is untouched
        assert_eq!(dst.get_pixel(2, 2).unwrap(), Color::rgb(9, 9, 9));
        assert_eq!(dst.get_pixel(7, 7).unwrap(), Color::rgb(9, 9, 9));
    }

    #[test]
    fn test_transparent_source_never_written() {
        let mut src = patterned(4, 4);
        src.set_pixel(1, 1, Color::rgba(255, 255, 255, 0)).unwrap();
        src.set_pixel(2, 3, Color::TRANSPARENT).unwrap();

        for opacity in [0.0, 0.25, 0.5, 0.99, 1.0, 3.0] {
            let mut dst = Surface::new(4, 4).unwrap();
            dst.fill(Color::rgb(1, 2, 3));
            dst.blend(Point::new(0, 0), &src, src.bounds(), opacity, None)
                .unwrap();
            assert_eq!(dst.get_pixel(1, 1).unwrap(), Color::rgb(1, 2, 3));
            assert_eq!(dst.get_pixel(2, 3).unwrap(), Color::rgb(1, 2, 3));
        }
    }

    #[test]
    fn test_mask_is_chroma_key() {
        let key = Color::rgb(255, 0, 255);
        let mut src = Surface::new(2, 1).unwrap();
        src.set_pixel(0, 0, key).unwrap();
        src.set_pixel(1, 0, Color::GREEN).unwrap();

        let mut dst = Surface::new(2, 1).unwrap();
        dst.fill(Color::BLUE);
        dst.blend(Point::new(0, 0), &src, src.bounds(), 1.0, Some(key))
            .unwrap();

        assert_eq!(dst.get_pixel(0, 0).unwrap(), Color::BLUE);
        assert_eq!(dst.get_pixel(1, 0).unwrap(), Color::GREEN);
    }

    #[test]
    fn test_half_opacity_interpolates() {
        let mut src = Surface::new(1, 1).unwrap();
        src.fill(Color::rgba(200, 100, 0, 255));
        let mut dst = Surface::new(1, 1).unwrap();
        dst.fill(Color::rgba(0, 100, 200, 255));

        dst.blend(Point::new(0, 0), &src, src.bounds(), 0.5, None)
            .unwrap();
        assert_eq!(dst.get_pixel(0, 0).unwrap(), Color::rgba(100, 100, 100, 255));
    }

    #[test]
    fn test_destination_clipped() {
        let src = patterned(4, 4);
        let mut dst = Surface::new(4, 4).unwrap();

        dst.blend(Point::new(-2, 3), &src, src.bounds(), 1.0, None)
            .unwrap();
        // Only the 2x1 overlap lands: dst (0..2, 3) <- src (2..4, 0)
        assert_eq!(dst.get_pixel(0, 3).unwrap(), src.get_pixel(2, 0).unwrap());
        assert_eq!(dst.get_pixel(1, 3).unwrap(), src.get_pixel(3, 0).unwrap());
        assert_eq!(dst.get_pixel(2, 3).unwrap(), Color::TRANSPARENT);
        assert_eq!(dst.get_pixel(0, 2).unwrap(), Color::TRANSPARENT);

        // Fully outside is a silent no-op
        let before = dst.clone();
        dst.blend(Point::new(10, 10), &src, src.bounds(), 1.0, None)
            .unwrap();
        assert_eq!(dst, before);
    }

    #[test]
    fn test_destination_at_coordinate_limits() {
        let src = patterned(4, 4);
        let mut dst = Surface::new(4, 4).unwrap();
        dst.fill(Color::rgb(7, 7, 7));
        let before = dst.clone();

        for at in [
            Point::new(i32::MAX - 1, 0),
            Point::new(0, i32::MAX - 1),
            Point::new(i32::MAX, i32::MAX),
            Point::new(i32::MIN, 0),
            Point::new(0, i32::MIN),
        ] {
            dst.blend(at, &src, src.bounds(), 1.0, None).unwrap();
            dst.blend(at, &src, src.bounds(), 0.5, None).unwrap();
            assert_eq!(dst, before, "blend at {:?}", at);
        }
    }

    #[test]
    fn test_source_rect_must_fit() {
        let src = patterned(4, 4);
        let mut dst = Surface::new(8, 8).unwrap();
        assert!(matches!(
            dst.blend(Point::new(0, 0), &src, Rect::new(2, 2, 4, 4), 1.0, None),
            Err(SurfaceError::BlockOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_blend_viewport_region_only() {
        let src = patterned(6, 6);
        let mut dst = Surface::new(6, 6).unwrap();
        let mut vp = Viewport::new();
        vp.set(Rect::new(1, 1, 2, 2));

        dst.blend_viewport(&src, &vp, 1.0, None).unwrap();
        assert_eq!(dst.get_pixel(1, 1).unwrap(), src.get_pixel(1, 1).unwrap());
        assert_eq!(dst.get_pixel(2, 2).unwrap(), src.get_pixel(2, 2).unwrap());
        assert_eq!(dst.get_pixel(3, 3).unwrap(), Color::TRANSPARENT);

        // Disabled viewport means the whole surface
        vp.reset();
        dst.blend_viewport(&src, &vp, 1.0, None).unwrap();
        assert_eq!(dst, src);
    }
}
