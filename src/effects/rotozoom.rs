//! Rotozoomer Effect
//!
//! Rotating and zooming a tiled texture across the screen.
//! Invented by Chaos/Sanity on Amiga 500 in 1989.
//!
//! Uses incremental scanline stepping to avoid per-pixel multiplies.

use super::{color, Effect};
use crate::display::{Color, Surface, SurfaceError};

const TEX_SIZE: u32 = 256;
const TEX_MASK: i32 = TEX_SIZE as i32 - 1;

/// Classic rotozoomer over a procedural checkerboard
pub struct Rotozoom {
    time: f32,
    texture: Surface,
    rotation_speed: f32,
    zoom_speed: f32,
    zoom_base: f32,
    zoom_range: f32,
}

impl Rotozoom {
    pub fn new() -> Result<Self, SurfaceError> {
        let mut texture = Surface::new(TEX_SIZE, TEX_SIZE)?;
        let warm = Color::rgb(255, 100, 50);
        let cool = Color::rgb(50, 100, 255);

        texture.set_address(0)?;
        for y in 0..TEX_SIZE as i32 {
            for x in 0..TEX_SIZE as i32 {
                let base = color::checker(x, y, 32, warm, cool);
                // XOR grain on top of the checks
                let grain = ((x ^ y) & 0x3F) as u8;
                texture.write_word(Color::rgb(
                    base.r().saturating_sub(grain),
                    base.g().saturating_sub(grain),
                    base.b().saturating_sub(grain),
                ))?;
            }
        }

        Ok(Self {
            time: 0.0,
            texture,
            rotation_speed: 0.4,
            zoom_speed: 0.25,
            zoom_base: 2.0,
            zoom_range: 1.5,
        })
    }
}

impl Effect for Rotozoom {
    fn update(&mut self, dt: f32, _width: u32, _height: u32) {
        self.time += dt;
    }

    fn render(&self, surface: &mut Surface) -> Result<(), SurfaceError> {
        let width = surface.width();
        let height = surface.height();
        let cx = width as f32 / 2.0;
        let cy = height as f32 / 2.0;

        let angle = self.time * self.rotation_speed;
        let zoom = self.zoom_base + (self.time * self.zoom_speed).sin() * self.zoom_range;

        // Work in texel space (0..TEX_SIZE) instead of UV space (0..1)
        let tex_scale = TEX_SIZE as f32 * 0.01;
        let cos_a = angle.cos() / zoom * tex_scale;
        let sin_a = angle.sin() / zoom * tex_scale;

        // Texel step per screen pixel
        let du_dx = cos_a;
        let dv_dx = sin_a;
        let du_dy = -sin_a;
        let dv_dy = cos_a;

        // Texel coords at top-left corner
        let mut u_row = -cx * du_dx - cy * du_dy;
        let mut v_row = -cx * dv_dx - cy * dv_dy;

        surface.set_address(0)?;
        for _y in 0..height {
            let mut u = u_row;
            let mut v = v_row;

            for _x in 0..width {
                // Power-of-two wrap handles negatives via two's complement
                let texel = self
                    .texture
                    .get_pixel(u as i32 & TEX_MASK, v as i32 & TEX_MASK)?;
                surface.write_word(texel)?;

                u += du_dx;
                v += dv_dx;
            }

            u_row += du_dy;
            v_row += dv_dy;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "rotozoom"
    }
}
