//! Tunnel Effect
//!
//! Flying down an endless textured tube.
//!
//! Techniques:
//! - Precomputed polar LUTs (atan2/sqrt once per resolution, lookup per frame)
//! - XOR texture addressed in tunnel space (angle=U, depth=V)
//! - Distance shade LUT so the far end fades into darkness

use super::Effect;
use crate::display::{Color, Surface, SurfaceError};
use crate::util::{hsv_to_rgb, shade};
use std::f32::consts::TAU;

const TEX_SIZE: usize = 256;
const TEX_MASK: i32 = TEX_SIZE as i32 - 1;
/// How far down the tube one texture repeat reaches
const DEPTH_SCALE: f32 = 32.0;

fn build_texture() -> Vec<Color> {
    let mut tex = Vec::with_capacity(TEX_SIZE * TEX_SIZE);
    for v in 0..TEX_SIZE {
        for u in 0..TEX_SIZE {
            let xor = (u ^ v) as u8;
            let hue = (u as f32 / TEX_SIZE as f32) * 360.0;
            tex.push(shade(hsv_to_rgb(hue, 0.6, 1.0), xor as f32 / 255.0 * 0.8 + 0.2));
        }
    }
    tex
}

pub struct Tunnel {
    time: f32,
    speed: f32,
    rotation: f32,
    lut_distance: Vec<i32>,
    lut_angle: Vec<i32>,
    lut_shade: Vec<u8>,
    screen_w: u32,
    screen_h: u32,
    texture: Vec<Color>,
}

impl Tunnel {
    pub fn new() -> Self {
        Self {
            time: 0.0,
            speed: 0.7,
            rotation: 0.12,
            lut_distance: Vec::new(),
            lut_angle: Vec::new(),
            lut_shade: Vec::new(),
            screen_w: 0,
            screen_h: 0,
            texture: build_texture(),
        }
    }

    fn build_luts(&mut self, width: u32, height: u32) {
        if self.screen_w == width && self.screen_h == height {
            return;
        }
        self.screen_w = width;
        self.screen_h = height;

        let size = (width * height) as usize;
        self.lut_distance = Vec::with_capacity(size);
        self.lut_angle = Vec::with_capacity(size);
        self.lut_shade = Vec::with_capacity(size);

        let cx = width as f32 / 2.0;
        let cy = height as f32 / 2.0;
        let max_r = (cx * cx + cy * cy).sqrt();
        let ratio = DEPTH_SCALE * TEX_SIZE as f32;

        for y in 0..height {
            for x in 0..width {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                let r = (dx * dx + dy * dy).sqrt().max(0.5);

                self.lut_distance.push((ratio / r) as i32 & TEX_MASK);
                self.lut_angle
                    .push(((dy.atan2(dx) / TAU + 0.5) * TEX_SIZE as f32) as i32 & TEX_MASK);
                // Brighter towards the screen edge, the near end of the tube
                self.lut_shade.push(((r / max_r).sqrt().min(1.0) * 255.0) as u8);
            }
        }
    }
}

impl Default for Tunnel {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for Tunnel {
    fn update(&mut self, dt: f32, width: u32, height: u32) {
        self.build_luts(width, height);
        self.time += dt;
    }

    fn render(&self, surface: &mut Surface) -> Result<(), SurfaceError> {
        if surface.width() != self.screen_w || surface.height() != self.screen_h {
            // LUTs are built in update; nothing to map until then
            surface.fill(Color::BLACK);
            return Ok(());
        }

        let shift_v = (self.time * self.speed * TEX_SIZE as f32) as i32;
        let shift_u = (self.time * self.rotation * TEX_SIZE as f32) as i32;

        surface.set_address(0)?;
        for i in 0..self.lut_distance.len() {
            let u = (self.lut_angle[i] + shift_u) & TEX_MASK;
            let v = (self.lut_distance[i] + shift_v) & TEX_MASK;
            let texel = self.texture[v as usize * TEX_SIZE + u as usize];
            surface.write_word(shade(texel, self.lut_shade[i] as f32 / 255.0))?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "tunnel"
    }
}
