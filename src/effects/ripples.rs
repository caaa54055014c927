//! Water Ripples
//!
//! Classic two-buffer height field: every step each cell becomes half the sum
//! of its neighbours minus its own previous value, then loses a little energy.
//! The slope of the field refracts a background picture and lights the crests.

use tracing::warn;

use super::{color, Effect};
use crate::display::{Color, Surface, SurfaceError};
use crate::util::{shade, Rng};

/// One grid cell covers GRID_SCALE x GRID_SCALE pixels
const GRID_SCALE: u32 = 2;
/// Each step keeps (2^DAMPING_SHIFT - 1) / 2^DAMPING_SHIFT of the height
const DAMPING_SHIFT: i32 = 5;
const SIM_STEP: f32 = 1.0 / 60.0;
const MAX_STEPS: u32 = 4;
const DROP_STRENGTH: i16 = 600;
const DROP_RADIUS: i32 = 2;
const DROP_MIN_INTERVAL: f32 = 0.2;
const DROP_MAX_INTERVAL: f32 = 0.9;

pub struct Ripples {
    current: Vec<i16>,
    previous: Vec<i16>,
    grid_w: usize,
    grid_h: usize,
    background: Surface,
    rng: Rng,
    sim_accum: f32,
    next_drop: f32,
}

impl Ripples {
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let mut ripples = Self {
            current: Vec::new(),
            previous: Vec::new(),
            grid_w: 0,
            grid_h: 0,
            background: build_background(width, height)?,
            rng: Rng::new(0xD20F),
            sim_accum: 0.0,
            next_drop: 0.0,
        };
        ripples.resize_grid(width, height);
        Ok(ripples)
    }

    fn resize_grid(&mut self, width: u32, height: u32) {
        self.grid_w = width.div_ceil(GRID_SCALE).max(3) as usize;
        self.grid_h = height.div_ceil(GRID_SCALE).max(3) as usize;
        let cells = self.grid_w * self.grid_h;
        self.current = vec![0; cells];
        self.previous = vec![0; cells];
    }

    /// Drop a stone at a grid position
    fn drop_stone(&mut self, gx: i32, gy: i32) {
        for dy in -DROP_RADIUS..=DROP_RADIUS {
            for dx in -DROP_RADIUS..=DROP_RADIUS {
                if dx * dx + dy * dy > DROP_RADIUS * DROP_RADIUS {
                    continue;
                }
                let x = gx + dx;
                let y = gy + dy;
                if x > 0 && y > 0 && x < self.grid_w as i32 - 1 && y < self.grid_h as i32 - 1 {
                    self.previous[y as usize * self.grid_w + x as usize] = DROP_STRENGTH;
                }
            }
        }
    }

    fn step(&mut self) {
        let w = self.grid_w;
        // Border cells stay at rest
        for y in 1..self.grid_h - 1 {
            for x in 1..w - 1 {
                let i = y * w + x;
                let sum = self.previous[i - 1] as i32
                    + self.previous[i + 1] as i32
                    + self.previous[i - w] as i32
                    + self.previous[i + w] as i32;
                let h = (sum >> 1) - self.current[i] as i32;
                // Truncating division pulls small values all the way to rest
                let h = h * ((1 << DAMPING_SHIFT) - 1) / (1 << DAMPING_SHIFT);
                self.current[i] = h.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
            }
        }
        std::mem::swap(&mut self.current, &mut self.previous);
    }

    #[inline]
    fn height_at(&self, gx: i32, gy: i32) -> i32 {
        let x = gx.clamp(0, self.grid_w as i32 - 1) as usize;
        let y = gy.clamp(0, self.grid_h as i32 - 1) as usize;
        self.previous[y * self.grid_w + x] as i32
    }

    /// Total absolute height, for tests
    #[cfg(test)]
    fn energy(&self) -> i64 {
        self.previous.iter().map(|&h| (h as i64).abs()).sum()
    }
}

fn build_background(width: u32, height: u32) -> Result<Surface, SurfaceError> {
    let mut bg = Surface::new(width, height)?;
    let light = Color::rgb(40, 140, 190);
    let dark = Color::rgb(10, 60, 110);

    bg.set_address(0)?;
    for y in 0..height as i32 {
        // Pool gets deeper towards the bottom
        let depth = 1.0 - 0.5 * y as f32 / height as f32;
        for x in 0..width as i32 {
            bg.write_word(shade(color::checker(x, y, 24, light, dark), depth))?;
        }
    }
    Ok(bg)
}

impl Effect for Ripples {
    fn update(&mut self, dt: f32, width: u32, height: u32) {
        if self.background.width() != width || self.background.height() != height {
            match build_background(width, height) {
                Ok(bg) => {
                    self.background = bg;
                    self.resize_grid(width, height);
                },
                Err(e) => warn!(error = %e, "ripples: keeping previous background"),
            }
        }

        self.next_drop -= dt;
        if self.next_drop <= 0.0 {
            let gx = self.rng.range_i32(1, self.grid_w as i32 - 2);
            let gy = self.rng.range_i32(1, self.grid_h as i32 - 2);
            self.drop_stone(gx, gy);
            self.next_drop = self.rng.range_f32(DROP_MIN_INTERVAL, DROP_MAX_INTERVAL);
        }

        self.sim_accum += dt;
        let mut steps = 0;
        while self.sim_accum >= SIM_STEP && steps < MAX_STEPS {
            self.sim_accum -= SIM_STEP;
            steps += 1;
            self.step();
        }
        if steps >= MAX_STEPS {
            self.sim_accum = 0.0;
        }
    }

    fn render(&self, surface: &mut Surface) -> Result<(), SurfaceError> {
        let width = surface.width() as i32;
        let height = surface.height() as i32;
        let bg_w = self.background.width() as i32;
        let bg_h = self.background.height() as i32;
        let scale = GRID_SCALE as i32;

        surface.set_address(0)?;
        for y in 0..height {
            let gy = y / scale;
            for x in 0..width {
                let gx = x / scale;
                let slope_x = self.height_at(gx - 1, gy) - self.height_at(gx + 1, gy);
                let slope_y = self.height_at(gx, gy - 1) - self.height_at(gx, gy + 1);

                // Refract: look up the background a little way along the slope
                let sx = (x + (slope_x >> 3)).clamp(0, bg_w - 1);
                let sy = (y + (slope_y >> 3)).clamp(0, bg_h - 1);
                let texel = self.background.get_pixel(sx, sy)?;

                // Light from the top-left brightens facing slopes
                let light = (slope_x + slope_y).clamp(-128, 128);
                let out = if light > 0 {
                    let add = light as u8;
                    Color::rgb(
                        texel.r().saturating_add(add),
                        texel.g().saturating_add(add),
                        texel.b().saturating_add(add),
                    )
                } else {
                    shade(texel, 1.0 + light as f32 / 256.0)
                };
                surface.write_word(out)?;
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "ripples"
    }
}
