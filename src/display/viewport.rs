//! Optional clip region for effects and transitions

use crate::geometry::Rect;

/// Rectangle an effect is allowed to draw into.
///
/// Starts disabled. Assigning a region enables it; only `reset` disables it
/// again. While disabled the whole surface is the active region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    rect: Rect,
    enabled: bool,
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a region and enable the viewport
    pub fn set(&mut self, rect: Rect) {
        self.rect = rect;
        self.enabled = true;
    }

    pub fn reset(&mut self) {
        self.enabled = false;
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Stored region, regardless of the enabled flag
    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Region consumers should honour on a `width` x `height` surface
    pub fn active_rect(&self, width: u32, height: u32) -> Rect {
        if self.enabled {
            self.rect
        } else {
            Rect::of_size(width, height)
        }
    }

    /// Active region intersected with the surface, `None` if nothing is visible
    pub fn clipped(&self, width: u32, height: u32) -> Option<Rect> {
        self.active_rect(width, height)
            .intersect(&Rect::of_size(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_covers_whole_surface() {
        let vp = Viewport::new();
        assert!(!vp.is_enabled());
        assert_eq!(vp.active_rect(320, 200), Rect::new(0, 0, 320, 200));
    }

    #[test]
    fn test_set_enables_and_reset_disables() {
        let mut vp = Viewport::new();
        vp.set(Rect::new(10, 20, 30, 40));
        assert!(vp.is_enabled());
        assert_eq!(vp.active_rect(320, 200), Rect::new(10, 20, 30, 40));

        vp.reset();
        assert!(!vp.is_enabled());
        assert_eq!(vp.active_rect(320, 200), Rect::new(0, 0, 320, 200));
        // Region is remembered
        assert_eq!(vp.rect(), Rect::new(10, 20, 30, 40));
    }

    #[test]
    fn test_clipped() {
        let mut vp = Viewport::new();
        vp.set(Rect::new(-10, 150, 50, 100));
        assert_eq!(vp.clipped(320, 200), Some(Rect::new(0, 150, 40, 50)));
        vp.set(Rect::new(400, 0, 10, 10));
        assert_eq!(vp.clipped(320, 200), None);
    }
}
