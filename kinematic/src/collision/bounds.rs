//! Probe ray geometry shared by every mover.
//!
//! A body's box is shrunk by the skin width on every side; the shrunk box's corners
//! are the ray origins and its edges are divided evenly into ray fans. Both movers
//! compose these free functions instead of sharing a base type.

use parry2d::bounding_volume::Aabb;
use tracing::warn;

use crate::constants::MIN_RAY_COUNT;

use super::{settings::ProbeSettings, types::Point2};

/// Corners of a body's skin-shrunk box, recomputed every step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RayOrigins {
    pub top_left: Point2,
    pub top_right: Point2,
    pub bottom_left: Point2,
    pub bottom_right: Point2,
}

/// Ray counts and spacing along each edge. Derived once from the body's size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeGeometry {
    /// Rays cast sideways, stacked along the vertical edge.
    pub horizontal_ray_count: usize,
    /// Rays cast up or down, spread along the horizontal edge.
    pub vertical_ray_count: usize,
    pub horizontal_spacing: f32,
    pub vertical_spacing: f32,
}

/// Shrink `aabb` by `skin` on every side (size shrinks by `2 * skin`).
///
/// A box thinner than `2 * skin` collapses onto its center line instead of inverting.
pub fn shrink(aabb: &Aabb, skin: f32) -> Aabb {
    let center = aabb.center();
    let mut mins = aabb.mins;
    let mut maxs = aabb.maxs;
    for axis in 0..2 {
        mins[axis] = (mins[axis] + skin).min(center[axis]);
        maxs[axis] = (maxs[axis] - skin).max(center[axis]);
    }
    Aabb::new(mins, maxs)
}

pub fn compute_origins(aabb: &Aabb, skin: f32) -> RayOrigins {
    let inner = shrink(aabb, skin);
    RayOrigins {
        top_left: Point2::new(inner.mins.x, inner.maxs.y),
        top_right: Point2::new(inner.maxs.x, inner.maxs.y),
        bottom_left: Point2::new(inner.mins.x, inner.mins.y),
        bottom_right: Point2::new(inner.maxs.x, inner.mins.y),
    }
}

pub fn compute_probe_geometry(aabb: &Aabb, probes: &ProbeSettings) -> ProbeGeometry {
    let inner = shrink(aabb, probes.skin_width);
    let size = inner.extents();

    let horizontal_ray_count = ray_count(size.y, probes.ray_spacing);
    let vertical_ray_count = ray_count(size.x, probes.ray_spacing);

    ProbeGeometry {
        horizontal_ray_count,
        vertical_ray_count,
        horizontal_spacing: size.y / (horizontal_ray_count - 1) as f32,
        vertical_spacing: size.x / (vertical_ray_count - 1) as f32,
    }
}

/// Number of rays needed to cover `length` at roughly `spacing` apart, never fewer than two.
fn ray_count(length: f32, spacing: f32) -> usize {
    let raw = (length / spacing).round_ties_even();
    let count = if raw.is_finite() && raw > 0.0 { raw as usize } else { 0 };

    if count < MIN_RAY_COUNT {
        warn!(
            length,
            spacing, count, "probe edge too short for its ray spacing; using two rays"
        );
        return MIN_RAY_COUNT;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box(center_x: f32, center_y: f32, width: f32, height: f32) -> Aabb {
        Aabb::new(
            Point2::new(center_x - width / 2.0, center_y - height / 2.0),
            Point2::new(center_x + width / 2.0, center_y + height / 2.0),
        )
    }

    #[test]
    fn origins_sit_inside_by_skin() {
        let aabb = unit_box(0.0, 0.0, 1.0, 2.0);
        let origins = compute_origins(&aabb, 0.015);

        assert!((origins.bottom_left.x - (-0.485)).abs() < 1.0e-6);
        assert!((origins.bottom_left.y - (-0.985)).abs() < 1.0e-6);
        assert!((origins.top_right.x - 0.485).abs() < 1.0e-6);
        assert!((origins.top_right.y - 0.985).abs() < 1.0e-6);
        assert_eq!(origins.top_left.x, origins.bottom_left.x);
        assert_eq!(origins.top_left.y, origins.top_right.y);
        assert_eq!(origins.bottom_right.x, origins.top_right.x);
        assert_eq!(origins.bottom_right.y, origins.bottom_left.y);
    }

    #[test]
    fn probe_geometry_spans_the_shrunk_edges() {
        // 1 x 2 box, shrunk to 0.97 x 1.97.
        let aabb = unit_box(3.0, -1.0, 1.0, 2.0);
        let geometry = compute_probe_geometry(&aabb, &ProbeSettings::default());

        // round(1.97 / 0.25) = 8, round(0.97 / 0.25) = 4
        assert_eq!(geometry.horizontal_ray_count, 8);
        assert_eq!(geometry.vertical_ray_count, 4);
        assert!((geometry.horizontal_spacing - 1.97 / 7.0).abs() < 1.0e-5);
        assert!((geometry.vertical_spacing - 0.97 / 3.0).abs() < 1.0e-5);

        // First and last ray land on the corners.
        let span = geometry.horizontal_spacing * (geometry.horizontal_ray_count - 1) as f32;
        assert!((span - 1.97).abs() < 1.0e-5);
    }

    #[test]
    fn thin_bodies_keep_two_rays() {
        // Shrunk width 0.07 would round to zero rays.
        let aabb = unit_box(0.0, 0.0, 0.1, 1.0);
        let geometry = compute_probe_geometry(&aabb, &ProbeSettings::default());

        assert_eq!(geometry.vertical_ray_count, 2);
        assert!((geometry.vertical_spacing - 0.07).abs() < 1.0e-6);
        assert!(geometry.vertical_spacing.is_finite());
    }

    #[test]
    fn single_ray_rounding_is_raised_to_two() {
        // Shrunk height 0.27 / 0.25 rounds to 1.
        let aabb = unit_box(0.0, 0.0, 1.0, 0.3);
        let geometry = compute_probe_geometry(&aabb, &ProbeSettings::default());

        assert_eq!(geometry.horizontal_ray_count, 2);
        assert!((geometry.horizontal_spacing - 0.27).abs() < 1.0e-5);
    }

    #[test]
    fn degenerate_box_collapses_instead_of_inverting() {
        let aabb = unit_box(1.0, 1.0, 0.01, 0.01);
        let inner = shrink(&aabb, 0.015);

        assert!(inner.mins.x <= inner.maxs.x);
        assert!(inner.mins.y <= inner.maxs.y);
        assert!((inner.mins.x - 1.0).abs() < 1.0e-6);

        let geometry = compute_probe_geometry(&aabb, &ProbeSettings::default());
        assert_eq!(geometry.horizontal_ray_count, 2);
        assert_eq!(geometry.vertical_spacing, 0.0);
    }
}
