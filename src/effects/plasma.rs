//! Plasma
//!
//! Four summed sine waves looked up in a cycling palette. Column and row
//! terms are evaluated once per frame; the radial term reads a distance table
//! that is rebuilt only when the screen size changes.

use std::f32::consts::TAU;

use super::{color, Effect};
use crate::display::{Color, Surface, SurfaceError};

const TABLE_SIZE: usize = 256;
/// Table steps per radian
const STEPS_PER_RAD: f32 = TABLE_SIZE as f32 / TAU;
/// Palette entries the colours rotate by per second
const CYCLE_SPEED: f32 = 24.0;

pub struct Plasma {
    time: f32,
    palette: Vec<Color>,
    sines: Vec<f32>,
    /// Distance of each pixel from the top-left corner
    radius: Vec<f32>,
    size: (u32, u32),
}

impl Plasma {
    pub fn new() -> Self {
        Self {
            time: 0.0,
            palette: color::make_palette(TABLE_SIZE),
            sines: (0..TABLE_SIZE)
                .map(|i| (i as f32 / STEPS_PER_RAD).sin())
                .collect(),
            radius: Vec::new(),
            size: (0, 0),
        }
    }

    #[inline]
    fn wave(&self, phase: f32) -> f32 {
        self.sines[(phase * STEPS_PER_RAD) as i32 as usize & (TABLE_SIZE - 1)]
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.radius = (0..height)
            .flat_map(|y| (0..width).map(move |x| ((x * x + y * y) as f32).sqrt()))
            .collect();
        self.size = (width, height);
    }
}

impl Default for Plasma {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for Plasma {
    fn update(&mut self, dt: f32, width: u32, height: u32) {
        self.time += dt;
        if self.size != (width, height) {
            self.resize(width, height);
        }
    }

    fn render(&self, surface: &mut Surface) -> Result<(), SurfaceError> {
        let (width, height) = (surface.width(), surface.height());
        let t = self.time;

        let columns: Vec<f32> = (0..width).map(|x| self.wave(x as f32 * 0.02 + t)).collect();
        let rows: Vec<f32> = (0..height)
            .map(|y| self.wave(y as f32 * 0.03 + t * 0.5))
            .collect();
        let have_radius = self.size == (width, height);
        let cycle = (t * CYCLE_SPEED) as usize;

        surface.set_address(0)?;
        let mut i = 0;
        for (y, row) in rows.iter().enumerate() {
            let fy = y as f32;
            for (x, column) in columns.iter().enumerate() {
                let fx = x as f32;
                let r = if have_radius {
                    self.radius[i]
                } else {
                    (fx * fx + fy * fy).sqrt()
                };

                let diagonal = self.wave((fx + fy) * 0.02 + t * 0.7);
                let radial = self.wave(r * 0.03 + t);

                // Sum of four waves is in -4..=4
                let v = (column + row + diagonal + radial + 4.0) / 8.0;
                let idx = ((v * 255.0) as usize).min(255);
                surface.write_word(self.palette[(idx + cycle) & (TABLE_SIZE - 1)])?;
                i += 1;
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "plasma"
    }
}
