//! Framebuffer types plus the SDL2 window they are presented in

pub mod blend;
mod surface;
mod viewport;

pub use surface::{Color, Surface, SurfaceError, BPP};
pub use viewport::Viewport;

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;
use thiserror::Error;

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;

/// SDL reports failures as plain strings; this sorts them by stage
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("SDL init failed: {0}")]
    Init(String),

    #[error("cannot open {width}x{height} window: {reason}")]
    Window {
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("texture error: {0}")]
    Texture(String),

    #[error("surface {actual:?} does not match render target {expected:?}")]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Presentation settings
#[derive(Debug, Clone)]
pub struct WindowOptions<'t> {
    pub title: &'t str,
    pub width: u32,
    pub height: u32,
    /// Lock presents to the monitor refresh
    pub vsync: bool,
}

/// Window plus event pump; the "flip to visible surface" sink
pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    presented: u64,
}

/// Streaming texture the surface is uploaded into each frame
pub struct RenderTarget<'a> {
    texture: Texture<'a>,
    size: (u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
}

impl Display {
    pub fn open(
        options: &WindowOptions<'_>,
    ) -> Result<(Self, TextureCreator<WindowContext>), DisplayError> {
        let sdl_context = sdl2::init().map_err(DisplayError::Init)?;
        let video = sdl_context.video().map_err(DisplayError::Init)?;
        let window_error = |reason: String| DisplayError::Window {
            width: options.width,
            height: options.height,
            reason,
        };

        let window = video
            .window(options.title, options.width, options.height)
            .position_centered()
            .build()
            .map_err(|e| window_error(e.to_string()))?;

        let mut builder = window.into_canvas().accelerated();
        if options.vsync {
            builder = builder.present_vsync();
        }
        let canvas = builder.build().map_err(|e| window_error(e.to_string()))?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump().map_err(DisplayError::Init)?;

        Ok((
            Self {
                canvas,
                event_pump,
                presented: 0,
            },
            texture_creator,
        ))
    }

    /// Upload the surface and flip it to the window
    pub fn present(
        &mut self,
        target: &mut RenderTarget,
        surface: &Surface,
    ) -> Result<(), DisplayError> {
        let actual = (surface.width(), surface.height());
        if actual != target.size {
            return Err(DisplayError::SizeMismatch {
                expected: target.size,
                actual,
            });
        }

        target
            .texture
            .update(None, surface.as_bytes(), surface.width() as usize * BPP)
            .map_err(|e| DisplayError::Texture(e.to_string()))?;

        self.canvas
            .copy(&target.texture, None, None)
            .map_err(DisplayError::Texture)?;
        self.canvas.present();
        self.presented += 1;
        Ok(())
    }

    /// Show `title` in the window's title bar. Failures are cosmetic and logged.
    pub fn set_title(&mut self, title: &str) {
        if let Err(e) = self.canvas.window_mut().set_title(title) {
            tracing::debug!(error = %e, "cannot set window title");
        }
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        self.event_pump
            .poll_iter()
            .filter_map(|event| match event {
                Event::Quit { .. } => Some(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k),
                    repeat: false,
                    ..
                } => Some(InputEvent::KeyDown(k)),
                _ => None,
            })
            .collect()
    }
}

impl<'a> RenderTarget<'a> {
    /// `RGBA32` is the byte-order alias matching the surface's R,G,B,A layout
    pub fn with_size(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<Self, DisplayError> {
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGBA32, width, height)
            .map_err(|e| DisplayError::Texture(e.to_string()))?;
        Ok(Self {
            texture,
            size: (width, height),
        })
    }
}
