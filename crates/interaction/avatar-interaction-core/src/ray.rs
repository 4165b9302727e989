//! Rays and the two primitive intersection tests used for hit-testing.
//!
//! Both tests are pure: they read immutable geometry and return an immutable
//! hit. UI regions are rectangles in a panel's local XY plane (panel normal
//! +Z); world objects are bounding spheres.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length, or zero for a degenerate ray that hits nothing.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.direction == Vec3::ZERO || !self.origin.is_finite()
    }
}

/// Distance along `ray` to the first surface point of the sphere, or to the
/// exit point when the origin is inside it.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32, max_distance: f32) -> Option<f32> {
    if ray.is_degenerate() || radius.is_nan() || radius <= 0.0 {
        return None;
    }
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let near = -b - root;
    let far = -b + root;
    let t = if near >= 0.0 {
        near
    } else if far >= 0.0 {
        far
    } else {
        return None;
    };
    (t <= max_distance).then_some(t)
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RectHit {
    pub distance: f32,
    pub point: Vec3,
    /// Hit point in the rectangle's plane coordinates.
    pub local: Vec2,
}

/// Intersect `ray` with the rectangle `center ± half_extents` lying in the XY
/// plane of the frame (`position`, `orientation`). Hits from either side count.
pub fn ray_rect(
    ray: &Ray,
    position: Vec3,
    orientation: Quat,
    center: Vec2,
    half_extents: Vec2,
    max_distance: f32,
) -> Option<RectHit> {
    if ray.is_degenerate() {
        return None;
    }
    let inv = orientation.inverse();
    let origin = inv * (ray.origin - position);
    let dir = inv * ray.direction;
    if dir.z.abs() < 1e-6 {
        return None;
    }
    let t = -origin.z / dir.z;
    if !(0.0..=max_distance).contains(&t) {
        return None;
    }
    let local = (origin + dir * t).truncate();
    let d = (local - center).abs();
    if d.x > half_extents.x || d.y > half_extents.y {
        return None;
    }
    Some(RectHit {
        distance: t,
        point: ray.at(t),
        local,
    })
}
