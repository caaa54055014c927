mod fire;
mod lenses;
mod plasma;
mod ripples;
mod rotozoom;
mod starfield;
mod tunnel;

pub use fire::Fire;
pub use lenses::Lenses;
pub use plasma::Plasma;
pub use ripples::Ripples;
pub use rotozoom::Rotozoom;
pub use starfield::Starfield;
pub use tunnel::Tunnel;

use crate::display::{Surface, SurfaceError};
use crate::error::{GalleryError, GalleryResult};

/// Trait for all demoscene-style effects
pub trait Effect {
    /// Update effect state (called each frame)
    /// - dt: delta time in seconds
    /// - width/height: surface dimensions the next render will target
    fn update(&mut self, dt: f32, width: u32, height: u32);

    /// Render effect to the surface
    fn render(&self, surface: &mut Surface) -> Result<(), SurfaceError>;

    /// Effect name for UI/debugging
    fn name(&self) -> &str;
}

/// Registry names, in default playlist order
pub const NAMES: &[&str] = &[
    "plasma",
    "fire",
    "starfield",
    "tunnel",
    "rotozoom",
    "ripples",
    "lenses",
];

pub fn names() -> &'static [&'static str] {
    NAMES
}

pub fn exists(name: &str) -> bool {
    NAMES.contains(&name)
}

/// Build a fresh effect by registry name for a `width` x `height` screen
pub fn create(name: &str, width: u32, height: u32) -> GalleryResult<Box<dyn Effect>> {
    let effect: Box<dyn Effect> = match name {
        "plasma" => Box::new(Plasma::new()),
        "fire" => Box::new(Fire::new()),
        "starfield" => Box::new(Starfield::new()),
        "tunnel" => Box::new(Tunnel::new()),
        "rotozoom" => Box::new(Rotozoom::new()?),
        "ripples" => Box::new(Ripples::new(width, height)?),
        "lenses" => Box::new(Lenses::new(width, height)?),
        _ => return Err(GalleryError::UnknownEffect(name.to_string())),
    };
    Ok(effect)
}

/// Color utilities for effects
pub mod color {
    use crate::display::Color;
    use crate::util::hsv_to_rgb;

    /// Create a classic demoscene color palette
    pub fn make_palette(size: usize) -> Vec<Color> {
        (0..size)
            .map(|i| {
                let t = i as f32 / size as f32;
                hsv_to_rgb(t * 360.0, 0.8, 0.9)
            })
            .collect()
    }

    /// Fire palette (black -> red -> orange -> yellow -> white)
    pub fn fire_palette() -> Vec<Color> {
        (0..256)
            .map(|i| {
                let t = i as f32 / 255.0;
                let r = (t * 3.0).min(1.0);
                let g = ((t - 0.33) * 3.0).clamp(0.0, 1.0);
                let b = ((t - 0.66) * 3.0).clamp(0.0, 1.0);
                Color::rgb((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
            })
            .collect()
    }

    /// Checkerboard tile, used as a background by the distortion effects
    pub fn checker(x: i32, y: i32, cell: i32, a: Color, b: Color) -> Color {
        if (x.div_euclid(cell) + y.div_euclid(cell)) % 2 == 0 {
            a
        } else {
            b
        }
    }
}
