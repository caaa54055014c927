//! Bouncing Lenses
//!
//! Magnifying glasses drift over a background, bounce off the screen edges
//! and off each other. Each frame a lens snapshots the pixels under it with
//! `get_block`, remaps them through a precomputed deformation table and writes
//! the result back with `put_block`.

use super::{color, Effect};
use crate::display::{Color, Surface, SurfaceError};
use crate::geometry::{bounce_in_box, collide_circles, Point, Rect};
use crate::util::{hsv_to_rgb, Rng};

const NUM_LENSES: usize = 4;
/// 0 = flat glass, towards 1 = strong bulge
const MAGNIFY: f32 = 0.55;

struct Lens {
    pos: (f32, f32),
    vel: (f32, f32),
    radius: i32,
    /// For every pixel of the (2r+1)^2 square: source offset inside the
    /// square, or `None` outside the glass
    map: Vec<Option<(i32, i32)>>,
    rim: Color,
}

impl Lens {
    fn new(pos: (f32, f32), vel: (f32, f32), radius: i32, rim: Color) -> Self {
        Self {
            pos,
            vel,
            radius,
            map: deformation_map(radius),
            rim,
        }
    }

    fn side(&self) -> i32 {
        self.radius * 2 + 1
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.pos.0 as i32 - self.radius,
            self.pos.1 as i32 - self.radius,
            self.side(),
            self.side(),
        )
    }
}

/// Spherical-cap style magnification: points near the centre sample from
/// closer to the centre, so the middle of the lens looks enlarged
fn deformation_map(radius: i32) -> Vec<Option<(i32, i32)>> {
    let side = radius * 2 + 1;
    let r = radius as f32;
    let mut map = Vec::with_capacity((side * side) as usize);

    for y in -radius..=radius {
        for x in -radius..=radius {
            let d2 = (x * x + y * y) as f32;
            if d2 >= r * r {
                map.push(None);
                continue;
            }
            let k = 1.0 - MAGNIFY * (1.0 - d2 / (r * r));
            let sx = (x as f32 * k).round() as i32 + radius;
            let sy = (y as f32 * k).round() as i32 + radius;
            map.push(Some((sx, sy)));
        }
    }
    map
}

pub struct Lenses {
    lenses: Vec<Lens>,
    background: Surface,
}

impl Lenses {
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let mut rng = Rng::new(0x1E45);
        let min_dim = width.min(height) as f32;
        let mut lenses = Vec::with_capacity(NUM_LENSES);

        for i in 0..NUM_LENSES {
            let radius = (min_dim * rng.range_f32(0.10, 0.18)).max(2.0) as i32;
            let r = radius as f32;
            let pos = (
                rng.range_f32(r, (width as f32 - r).max(r + 1.0)),
                rng.range_f32(r, (height as f32 - r).max(r + 1.0)),
            );
            let speed = min_dim * rng.range_f32(0.2, 0.4);
            let angle = rng.range_f32(0.0, std::f32::consts::TAU);
            let rim = hsv_to_rgb(i as f32 * 360.0 / NUM_LENSES as f32, 0.6, 1.0);
            lenses.push(Lens::new(
                pos,
                (angle.cos() * speed, angle.sin() * speed),
                radius,
                rim,
            ));
        }

        Ok(Self {
            lenses,
            background: build_background(width, height)?,
        })
    }

    /// Apply one lens's deformation in place
    fn apply_lens(lens: &Lens, surface: &mut Surface) -> Result<(), SurfaceError> {
        // Lenses hugging an edge only deform the visible part
        let full = lens.bounds();
        let Some(clip) = surface.bounds().intersect(&full) else {
            return Ok(());
        };

        let snapshot = surface.get_block(clip)?;
        let mut warped = snapshot.clone();
        let side = lens.side();

        for y in 0..clip.h {
            for x in 0..clip.w {
                // Position in the full lens square
                let lx = x + clip.x - full.x;
                let ly = y + clip.y - full.y;
                let Some((sx, sy)) = lens.map[(ly * side + lx) as usize] else {
                    continue;
                };
                // Back to snapshot space; samples outside the clip stay put
                let bx = sx + full.x - clip.x;
                let by = sy + full.y - clip.y;
                if snapshot.in_bounds(bx, by) {
                    warped.set_pixel(x, y, snapshot.get_pixel(bx, by)?)?;
                }
            }
        }

        surface.put_block(&warped, clip.x, clip.y)?;
        let centre = Point::new(full.x + lens.radius, full.y + lens.radius);
        surface.circle(centre, lens.radius, lens.rim);
        Ok(())
    }
}

fn build_background(width: u32, height: u32) -> Result<Surface, SurfaceError> {
    let mut bg = Surface::new(width, height)?;
    let a = Color::rgb(230, 230, 220);
    let b = Color::rgb(30, 30, 40);
    bg.set_address(0)?;
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            bg.write_word(color::checker(x, y, 16, a, b))?;
        }
    }
    Ok(bg)
}

impl Effect for Lenses {
    fn update(&mut self, dt: f32, width: u32, height: u32) {
        let (w, h) = (width as f32, height as f32);

        for lens in &mut self.lenses {
            lens.pos.0 += lens.vel.0 * dt;
            lens.pos.1 += lens.vel.1 * dt;
            bounce_in_box(&mut lens.pos, &mut lens.vel, lens.radius as f32, w, h);
        }

        for i in 0..self.lenses.len() {
            let (head, tail) = self.lenses.split_at_mut(i + 1);
            let a = &mut head[i];
            for b in tail {
                collide_circles(
                    &mut a.pos,
                    &mut a.vel,
                    a.radius as f32,
                    &mut b.pos,
                    &mut b.vel,
                    b.radius as f32,
                );
            }
        }
    }

    fn render(&self, surface: &mut Surface) -> Result<(), SurfaceError> {
        if surface.width() == self.background.width()
            && surface.height() == self.background.height()
        {
            surface.put_block(&self.background, 0, 0)?;
        } else {
            surface.fill(Color::rgb(30, 30, 40));
        }

        for lens in &self.lenses {
            Self::apply_lens(lens, surface)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "lenses"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_identity_at_rim_and_centre() {
        let radius = 10;
        let map = deformation_map(radius);
        let side = radius * 2 + 1;
        assert_eq!(map.len(), (side * side) as usize);
        // Centre maps to itself
        assert_eq!(map[(radius * side + radius) as usize], Some((radius, radius)));
        // Corners are outside the glass
        assert_eq!(map[0], None);
        // Every sample stays inside the square
        for (sx, sy) in map.iter().flatten() {
            assert!((0..side).contains(sx) && (0..side).contains(sy));
        }
    }

    #[test]
    fn test_lenses_stay_on_screen() {
        let mut fx = Lenses::new(160, 120).unwrap();
        for _ in 0..2000 {
            fx.update(1.0 / 60.0, 160, 120);
        }
        for lens in &fx.lenses {
            let r = lens.radius as f32;
            assert!(lens.pos.0 >= r - 0.5 && lens.pos.0 <= 160.0 - r + 0.5);
            assert!(lens.pos.1 >= r - 0.5 && lens.pos.1 <= 120.0 - r + 0.5);
        }
    }

    #[test]
    fn test_lens_at_edge_renders() {
        let mut fx = Lenses::new(64, 48).unwrap();
        fx.lenses[0].pos = (0.0, 0.0);
        fx.lenses[1].pos = (64.0, 48.0);
        let mut surface = Surface::new(64, 48).unwrap();
        fx.render(&mut surface).unwrap();
    }

    #[test]
    fn test_rim_is_drawn() {
        let mut fx = Lenses::new(64, 48).unwrap();
        fx.lenses.truncate(1);
        fx.lenses[0].pos = (32.0, 24.0);
        let (rim, radius) = (fx.lenses[0].rim, fx.lenses[0].radius);
        let mut surface = Surface::new(64, 48).unwrap();
        fx.render(&mut surface).unwrap();
        assert_eq!(surface.get_pixel(32 + radius, 24).unwrap(), rim);
        // Outside the lens the background is untouched
        assert_eq!(surface.get_pixel(0, 47).unwrap(), fx.background.get_pixel(0, 47).unwrap());
    }
}
