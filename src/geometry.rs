//! Integer raster geometry and the small amount of collision math the effects need

/// A pixel coordinate. Either component may be negative or past the edge of a
/// surface; the drawing primitives decide what that means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in pixel units (`w`/`h` <= 0 means empty)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle covering a whole `width` x `height` surface
    #[inline]
    pub fn of_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Exclusive right edge, saturating at `i32::MAX`
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    /// Exclusive bottom edge, saturating at `i32::MAX`
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    #[inline]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// True when `other` lies entirely inside `self`
    pub fn contains_rect(&self, other: &Rect) -> bool {
        !other.is_empty()
            && other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Overlapping part of two rectangles, `None` when they don't touch
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some(Rect::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0)))
        }
    }
}

// ============================================================================
// Collision helpers
// ============================================================================

/// Bounce a moving circle off the inside of a `width` x `height` box.
/// Position is pushed back inside and the offending velocity component flipped.
/// Returns true when a wall was hit.
pub fn bounce_in_box(
    pos: &mut (f32, f32),
    vel: &mut (f32, f32),
    radius: f32,
    width: f32,
    height: f32,
) -> bool {
    let mut hit = false;

    if pos.0 - radius < 0.0 {
        pos.0 = radius;
        vel.0 = vel.0.abs();
        hit = true;
    } else if pos.0 + radius > width {
        pos.0 = width - radius;
        vel.0 = -vel.0.abs();
        hit = true;
    }

    if pos.1 - radius < 0.0 {
        pos.1 = radius;
        vel.1 = vel.1.abs();
        hit = true;
    } else if pos.1 + radius > height {
        pos.1 = height - radius;
        vel.1 = -vel.1.abs();
        hit = true;
    }

    hit
}

/// Elastic collision between two equal-mass circles.
/// Separates overlapping circles along the contact normal and exchanges the
/// normal components of their velocities. Returns true if they collided.
pub fn collide_circles(
    a_pos: &mut (f32, f32),
    a_vel: &mut (f32, f32),
    a_radius: f32,
    b_pos: &mut (f32, f32),
    b_vel: &mut (f32, f32),
    b_radius: f32,
) -> bool {
    let dx = b_pos.0 - a_pos.0;
    let dy = b_pos.1 - a_pos.1;
    let dist_sq = dx * dx + dy * dy;
    let min_dist = a_radius + b_radius;

    if dist_sq >= min_dist * min_dist || dist_sq < f32::EPSILON {
        return false;
    }

    let dist = dist_sq.sqrt();
    let nx = dx / dist;
    let ny = dy / dist;

    // Push apart so they no longer overlap
    let overlap = (min_dist - dist) * 0.5;
    a_pos.0 -= nx * overlap;
    a_pos.1 -= ny * overlap;
    b_pos.0 += nx * overlap;
    b_pos.1 += ny * overlap;

    // Only resolve if approaching
    let rel = (b_vel.0 - a_vel.0) * nx + (b_vel.1 - a_vel.1) * ny;
    if rel < 0.0 {
        a_vel.0 += rel * nx;
        a_vel.1 += rel * ny;
        b_vel.0 -= rel * nx;
        b_vel.1 -= rel * ny;
    }

    true
}
