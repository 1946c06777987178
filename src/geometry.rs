/// Plane geometry for the play-field: vectors, centre-aligned boxes, and the
/// two queries every entity relies on (`in_bounds`, `direction_to`).
///
/// Coordinates are logical field units with the origin at the top-left
/// corner and y growing downward.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use crate::constants::{FIELD_HEIGHT, FIELD_WIDTH};

// ── Vec2 ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const RIGHT: Vec2 = Vec2 { x: 1.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction, or `ZERO` for a zero vector.
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self::new(self.x / len, self.y / len)
        } else {
            Self::ZERO
        }
    }

    /// Component-wise product, used to offset by "one body length" along a
    /// direction.
    #[inline]
    pub fn scale(&self, other: Vec2) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    /// Rotate by `degrees`, counter-clockwise as seen on screen.
    pub fn rotated(&self, degrees: f32) -> Self {
        // Screen y points down, so a visual CCW turn is a CW turn in maths.
        let (sin, cos) = (-degrees.to_radians()).sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

impl Add for Vec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

// ── Rect ──────────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box stored by its centre, so moving an entity can
/// never leave the box out of sync with the position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub center: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    pub fn left(&self) -> f32 {
        self.center.x - self.size.x / 2.0
    }

    pub fn right(&self) -> f32 {
        self.center.x + self.size.x / 2.0
    }

    pub fn top(&self) -> f32 {
        self.center.y - self.size.y / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.center.y + self.size.y / 2.0
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.center += delta;
    }

    /// Strict overlap: boxes that only share an edge do not collide.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

// ── Field queries ─────────────────────────────────────────────────────────────

/// Returns `(horizontal_ok, vertical_ok)` for `rect` against the play-field.
pub fn in_bounds(rect: &Rect) -> (bool, bool) {
    let horizontal = !(rect.left() < 0.0 || FIELD_WIDTH < rect.right());
    let vertical = !(rect.top() < 0.0 || FIELD_HEIGHT < rect.bottom());
    (horizontal, vertical)
}

/// True when the box lies fully inside the field on both axes.
pub fn fully_inside(rect: &Rect) -> bool {
    in_bounds(rect) == (true, true)
}

/// Unit vector from `origin`'s centre toward `target`'s centre.
///
/// Coincident centres have no direction; `Vec2::RIGHT` is returned instead of
/// dividing by zero.
pub fn direction_to(origin: &Rect, target: &Rect) -> Vec2 {
    let diff = target.center - origin.center;
    if diff.length() <= f32::EPSILON {
        return Vec2::RIGHT;
    }
    diff.normalize()
}

/// Size of the axis-aligned box enclosing a `width`×`height` sprite whose
/// long axis has been rotated onto the unit vector `dir`.
pub fn rotated_bounds(width: f32, height: f32, dir: Vec2) -> Vec2 {
    let (cos, sin) = (dir.x.abs(), dir.y.abs());
    Vec2::new(width * cos + height * sin, width * sin + height * cos)
}
