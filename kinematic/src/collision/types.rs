/*!
Core collision types and math aliases shared by the collision submodules.

This module intentionally contains no algorithms. It defines the data types
exchanged between:
- the collision world (bodies, ray queries)
- bounds sampling (ray origins and spacing)
- the character controller
- the moving platform driver

It also defines the two seams the movers depend on, [`RayCaster`] and [`BodySet`],
so they can run against [`CollisionWorld`](super::world::CollisionWorld) or any other
scene that can answer a ray query and move a box.
*/

use nalgebra as na;
use parry2d::bounding_volume::Aabb;

use crate::bitmask_flags::LayerMask;

/// Common math aliases for clarity and consistency.
pub type Vec2 = na::Vector2<f32>;
pub type Point2 = na::Point2<f32>;

/// Stable identifier of a body inside a [`BodySet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyHandle(pub u32);

/// How a body's surface reacts to probes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SurfaceKind {
    /// Blocks from every side.
    #[default]
    Solid,
    /// Blocks only things landing on it from above; can be dropped through on request.
    OneWay,
}

/// Nearest obstruction reported by a single ray.
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    /// Distance from the ray origin to the hit point. Zero when the origin is inside the body.
    pub distance: f32,
    /// Unit surface normal at the hit point. Undefined (zero) when `distance == 0`.
    pub normal: Vec2,
    /// Body that was hit.
    pub body: BodyHandle,
    /// Surface tag of the body that was hit.
    pub surface: SurfaceKind,
}

/// Scene ray query used by every mover.
pub trait RayCaster {
    /// Cast a ray from `origin` along the unit vector `dir`, up to `max_distance`,
    /// against bodies whose layers intersect `mask`. Returns the nearest hit.
    fn cast_ray(&self, origin: Point2, dir: Vec2, max_distance: f32, mask: LayerMask)
    -> Option<RayHit>;
}

/// Minimal body/transform access used by the movers.
pub trait BodySet {
    /// World-space bounds of `body`, or `None` if the handle is unknown.
    fn bounds(&self, body: BodyHandle) -> Option<Aabb>;
    /// World-space position (shape origin) of `body`.
    fn position(&self, body: BodyHandle) -> Option<Vec2>;
    /// Move `body` by `delta`. Unknown handles are ignored.
    fn translate(&mut self, body: BodyHandle, delta: Vec2);
}

/// Angle in degrees between a surface normal and world up, in [0, 180].
///
/// Walkable surfaces land in [0, 90). A zero normal (ray started inside a body) reads as flat.
#[inline]
pub fn slope_angle_deg(normal: &Vec2) -> f32 {
    if normal.norm_squared() == 0.0 {
        return 0.0;
    }
    normal.angle(&Vec2::y()).to_degrees()
}

/// `f32::signum` that maps zero to +1, matching the movers' "default to facing right" convention.
#[inline]
pub(crate) fn sign(value: f32) -> f32 {
    if value < 0.0 { -1.0 } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_ground_has_zero_slope() {
        assert!(slope_angle_deg(&Vec2::new(0.0, 1.0)).abs() < 1.0e-5);
    }

    #[test]
    fn wall_normals_are_ninety_degrees() {
        assert!((slope_angle_deg(&Vec2::new(-1.0, 0.0)) - 90.0).abs() < 1.0e-4);
        assert!((slope_angle_deg(&Vec2::new(1.0, 0.0)) - 90.0).abs() < 1.0e-4);
    }

    #[test]
    fn forty_five_degree_normal() {
        let n = Vec2::new(-1.0, 1.0).normalize();
        assert!((slope_angle_deg(&n) - 45.0).abs() < 1.0e-4);
    }

    #[test]
    fn zero_normal_reads_as_flat() {
        assert_eq!(slope_angle_deg(&Vec2::zeros()), 0.0);
    }

    #[test]
    fn sign_treats_zero_as_positive() {
        assert_eq!(sign(0.0), 1.0);
        assert_eq!(sign(-0.0), 1.0);
        assert_eq!(sign(-3.0), -1.0);
        assert_eq!(sign(2.0), 1.0);
    }
}
