use super::color::fire_palette;
use super::Effect;
use crate::display::{Color, Surface, SurfaceError};
use crate::geometry::Rect;
use crate::util::Rng;

/// Target fire pixel size (keeps the chunky retro look)
const FIRE_SCALE: u32 = 4;
/// Fixed simulation rate (60 updates per second)
const SIM_STEP: f32 = 1.0 / 60.0;
/// Cap on simulation steps per frame after a stall
const MAX_STEPS: u32 = 4;

/// Classic demoscene-style fire: a heat field seeded along the bottom row,
/// averaged upwards and cooled a little each step
pub struct Fire {
    heat: Vec<u8>,
    palette: Vec<Color>,
    time: f32,
    sim_accum: f32,
    rng: Rng,
    fire_w: usize,
    fire_h: usize,
}

impl Fire {
    pub fn new() -> Self {
        // Start with defaults that will be resized on first update
        let fire_w = 160;
        let fire_h = 120;
        Self {
            heat: vec![0; fire_w * fire_h],
            palette: fire_palette(),
            time: 0.0,
            sim_accum: 0.0,
            rng: Rng::new(0x1234ABCD),
            fire_w,
            fire_h,
        }
    }

    /// Resize heat buffer for new screen dimensions
    fn resize(&mut self, width: u32, height: u32) {
        let new_w = ((width / FIRE_SCALE) as usize).max(1);
        let new_h = ((height / FIRE_SCALE) as usize).max(2);

        if new_w != self.fire_w || new_h != self.fire_h {
            self.fire_w = new_w;
            self.fire_h = new_h;
            self.heat = vec![0; new_w * new_h];
        }
    }

    fn step(&mut self) {
        let fire_w = self.fire_w;
        let fire_h = self.fire_h;

        // Seed the bottom row with heat
        for x in 0..fire_w {
            let flicker = self.rng.next_u8() % 80;
            let wave = ((self.time * 6.0 + x as f32 * 0.08).sin() * 40.0) as i32;
            let base = (180 + wave).clamp(120, 255) as u8;
            self.heat[(fire_h - 1) * fire_w + x] = base.saturating_add(flicker);
        }

        // Propagate heat upwards
        let wind = (self.time * 2.5).sin() * 2.0;
        for y in 1..fire_h {
            for x in 0..fire_w {
                let wind_x = (x as i32 + wind as i32).rem_euclid(fire_w as i32);
                let x0 = wind_x as usize;
                let x1 = (x0 + fire_w - 1) % fire_w;
                let x2 = (x0 + 1) % fire_w;

                let below = self.heat[y * fire_w + x0] as u16;
                let below_left = self.heat[y * fire_w + x1] as u16;
                let below_right = self.heat[y * fire_w + x2] as u16;
                let below2 = if y + 1 < fire_h {
                    self.heat[(y + 1) * fire_w + x0] as u16
                } else {
                    below
                };

                let heat = (below + below_left + below_right + below2) / 4;
                let cooling = 1 + (self.rng.next_u8() % 3) as u16;
                self.heat[(y - 1) * fire_w + x] = heat.saturating_sub(cooling) as u8;
            }
        }
    }

    /// Heat value at a cell, for tests
    #[cfg(test)]
    fn heat_at(&self, x: usize, y: usize) -> u8 {
        self.heat[y * self.fire_w + x]
    }
}

impl Default for Fire {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for Fire {
    fn update(&mut self, dt: f32, width: u32, height: u32) {
        self.resize(width, height);

        self.time += dt;
        self.sim_accum += dt;

        // Fixed timestep simulation - run at consistent rate regardless of framerate
        let mut steps = 0;
        while self.sim_accum >= SIM_STEP && steps < MAX_STEPS {
            self.sim_accum -= SIM_STEP;
            steps += 1;
            self.step();
        }

        // If we hit max steps, drain remaining accumulator to prevent buildup
        if steps >= MAX_STEPS {
            self.sim_accum = 0.0;
        }
    }

    fn render(&self, surface: &mut Surface) -> Result<(), SurfaceError> {
        surface.fill(Color::BLACK);

        let scale = FIRE_SCALE as i32;
        for y in 0..self.fire_h {
            let wave = (self.time * 3.0 + y as f32 * 0.1).sin() * 2.0;
            for x in 0..self.fire_w {
                let heat = self.heat[y * self.fire_w + x];
                if heat == 0 {
                    continue;
                }
                let px = x as i32 * scale + wave as i32;
                let py = y as i32 * scale;
                surface.fill_rect(Rect::new(px, py, scale, scale), self.palette[heat as usize]);
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "fire"
    }
}
