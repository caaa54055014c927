//! Shared helpers for effects and the main loop

use std::time::Instant;

use crate::display::Color;

/// xorshift64 generator. Seeded, so every run of an effect looks the same.
pub struct Rng {
    state: u64,
}

impl Rng {
    /// A zero seed would lock xorshift at zero, so it is bumped to one
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let mut s = self.state;
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        self.state = s;
        s
    }

    #[inline]
    pub fn next_u8(&mut self) -> u8 {
        (self.next_u64() >> 56) as u8
    }

    /// Uniform in [0, 1), from the top 24 bits
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u32 << 24) as f32
    }

    /// Uniform in [min, max)
    #[inline]
    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }

    /// Uniform in [min, max]; `min` when the range is empty
    #[inline]
    pub fn range_i32(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max as i64 - min as i64 + 1) as u64;
        (min as i64 + (self.next_u64() % span) as i64) as i32
    }
}

/// `h` in degrees (any value, wrapped), `s` and `v` in 0..=1
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Color {
    let sector = h.rem_euclid(360.0) / 60.0;
    let chroma = v * s;
    let second = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let base = v - chroma;

    let (r, g, b) = match sector as u32 {
        0 => (chroma, second, 0.0),
        1 => (second, chroma, 0.0),
        2 => (0.0, chroma, second),
        3 => (0.0, second, chroma),
        4 => (second, 0.0, chroma),
        _ => (chroma, 0.0, second),
    };
    let channel = |c: f32| ((c + base) * 255.0).round().clamp(0.0, 255.0) as u8;

    Color::rgb(channel(r), channel(g), channel(b))
}

/// Scale the RGB part of a color, keeping alpha
#[inline]
pub fn shade(color: Color, factor: f32) -> Color {
    let f = factor.clamp(0.0, 1.0);
    let scale = |c: u8| (c as f32 * f) as u8;
    Color::rgba(scale(color.r()), scale(color.g()), scale(color.b()), color.a())
}

/// Rolling frame-rate average over the last `N` frames
pub struct FpsCounter {
    samples: Vec<f32>,
    next: usize,
    filled: usize,
    sum: f32,
    last_frame: Instant,
}

impl FpsCounter {
    pub fn new(window: usize) -> Self {
        Self {
            samples: vec![0.0; window.max(1)],
            next: 0,
            filled: 0,
            sum: 0.0,
            last_frame: Instant::now(),
        }
    }

    /// Mark the end of a frame. Returns the average frames per second.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.record(dt)
    }

    fn record(&mut self, dt: f32) -> f32 {
        self.sum += dt - self.samples[self.next];
        self.samples[self.next] = dt;
        self.next = (self.next + 1) % self.samples.len();
        self.filled = (self.filled + 1).min(self.samples.len());

        let avg = self.avg_frame_time_ms() / 1000.0;
        if avg > 0.0 {
            1.0 / avg
        } else {
            0.0
        }
    }

    pub fn avg_frame_time_ms(&self) -> f32 {
        if self.filled == 0 {
            return 0.0;
        }
        self.sum.max(0.0) / self.filled as f32 * 1000.0
    }
}
