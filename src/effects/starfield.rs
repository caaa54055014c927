use super::Effect;
use crate::display::{Color, Surface, SurfaceError};
use crate::geometry::Point;
use crate::util::{hsv_to_rgb, shade, Rng};

const NUM_STARS: usize = 300;
const MAX_TRAIL_LEN: f32 = 40.0;
const FAR_Z: f32 = 600.0;

struct Star {
    x: f32,
    y: f32,
    z: f32,
    hue: f32,
}

/// Classic 3D starfield with motion trails
pub struct Starfield {
    stars: Vec<Star>,
    center_x: f32,
    center_y: f32,
    speed: f32,
    rng: Rng,
}

impl Starfield {
    pub fn new() -> Self {
        let mut rng = Rng::new(12345);
        let stars = (0..NUM_STARS).map(|_| Self::random_star(&mut rng)).collect();

        Self {
            stars,
            center_x: 320.0,
            center_y: 240.0,
            speed: 200.0,
            rng,
        }
    }

    fn random_star(rng: &mut Rng) -> Star {
        Star {
            x: (rng.next_f32() - 0.5) * 1000.0,
            y: (rng.next_f32() - 0.5) * 1000.0,
            z: rng.range_f32(100.0, FAR_Z),
            hue: rng.range_f32(0.0, 360.0),
        }
    }
}

impl Default for Starfield {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for Starfield {
    fn update(&mut self, dt: f32, width: u32, height: u32) {
        self.center_x = width as f32 / 2.0;
        self.center_y = height as f32 / 2.0;

        for star in &mut self.stars {
            star.z -= self.speed * dt;
            star.hue = (star.hue + dt * 720.0).rem_euclid(360.0);

            // Reset stars that pass the camera
            if star.z <= 1.0 {
                *star = Self::random_star(&mut self.rng);
                star.z = 500.0;
            }
        }
    }

    fn render(&self, surface: &mut Surface) -> Result<(), SurfaceError> {
        surface.fill(Color::BLACK);

        // Scale projection and trails proportionally to the screen
        let vp_scale = surface.width().min(surface.height()) as f32 / 480.0;
        let fov = 256.0 * vp_scale;
        let max_trail = MAX_TRAIL_LEN * vp_scale;

        for star in &self.stars {
            let sx = (star.x / star.z) * fov + self.center_x;
            let sy = (star.y / star.z) * fov + self.center_y;
            let head = Point::new(sx as i32, sy as i32);
            if !surface.in_bounds(head.x, head.y) {
                continue;
            }

            let nearness = (1.0 - star.z / FAR_Z).clamp(0.0, 1.0);
            let color = hsv_to_rgb(star.hue, 1.0, nearness);
            let trail_len = (nearness * max_trail).ceil();

            if trail_len >= 1.0 {
                // Trail points back towards the vanishing point
                let dx = (sx - self.center_x) / star.z;
                let dy = (sy - self.center_y) / star.z;
                let tail = Point::new(
                    (sx - dx * trail_len) as i32,
                    (sy - dy * trail_len) as i32,
                );
                surface.line(tail, head, shade(color, 0.4));
            }

            if star.z < 100.0 {
                // Near stars get a small cross
                surface.hline(
                    Point::new(head.x - 1, head.y),
                    Point::new(head.x + 1, head.y),
                    color,
                );
                surface.vline(
                    Point::new(head.x, head.y - 1),
                    Point::new(head.x, head.y + 1),
                    color,
                );
                surface.set_pixel(head.x, head.y, Color::WHITE)?;
            } else {
                surface.set_pixel(head.x, head.y, color)?;
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "starfield"
    }
}
