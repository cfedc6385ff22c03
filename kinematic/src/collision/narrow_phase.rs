use nalgebra as na;
use parry2d::{query::Ray, shape::Shape};

use super::types::{Point2, Vec2};

/// Cast a ray against a single shape placed at `position` and return `(distance, normal)`.
///
/// - `dir` must be unit length so the returned time of impact is a distance.
/// - The shape is treated as solid: an origin inside it yields distance `0`.
pub fn cast_ray_against_shape(
    shape: &dyn Shape,
    position: Vec2,
    origin: Point2,
    dir: Vec2,
    max_distance: f32,
) -> Option<(f32, Vec2)> {
    let iso = na::Isometry2::translation(position.x, position.y);
    let ray = Ray::new(origin, dir);

    shape
        .cast_ray_and_get_normal(&iso, &ray, max_distance, true)
        .map(|hit| (hit.time_of_impact, hit.normal))
}

/// Iterate over `(key, shape, position)` candidates and return the nearest hit (if any).
///
/// Ties keep the earliest candidate so results are stable for a fixed insertion order.
pub fn nearest_ray_hit<'a, K, I>(
    candidates: I,
    origin: Point2,
    dir: Vec2,
    max_distance: f32,
) -> Option<(K, f32, Vec2)>
where
    I: IntoIterator<Item = (K, &'a dyn Shape, Vec2)>,
{
    let mut best: Option<(K, f32, Vec2)> = None;
    for (key, shape, position) in candidates {
        if let Some((distance, normal)) =
            cast_ray_against_shape(shape, position, origin, dir, max_distance)
        {
            if best.as_ref().is_none_or(|b| distance < b.1) {
                best = Some((key, distance, normal));
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use parry2d::shape::{Cuboid, Triangle};

    #[test]
    fn hits_box_face_with_outward_normal() {
        let cuboid = Cuboid::new(Vec2::new(1.0, 1.0));
        let hit = cast_ray_against_shape(
            &cuboid,
            Vec2::new(5.0, 0.0),
            Point2::new(0.0, 0.0),
            Vec2::x(),
            10.0,
        );

        let (distance, normal) = hit.expect("ray should hit the box");
        assert!((distance - 4.0).abs() < 1.0e-5);
        assert!((normal - Vec2::new(-1.0, 0.0)).norm() < 1.0e-5);
    }

    #[test]
    fn misses_beyond_max_distance() {
        let cuboid = Cuboid::new(Vec2::new(1.0, 1.0));
        let hit = cast_ray_against_shape(
            &cuboid,
            Vec2::new(5.0, 0.0),
            Point2::new(0.0, 0.0),
            Vec2::x(),
            3.9,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn origin_inside_reports_zero_distance() {
        let cuboid = Cuboid::new(Vec2::new(1.0, 1.0));
        let hit = cast_ray_against_shape(
            &cuboid,
            Vec2::zeros(),
            Point2::new(0.5, 0.0),
            Vec2::x(),
            10.0,
        );
        assert_eq!(hit.map(|h| h.0), Some(0.0));
    }

    #[test]
    fn nearest_of_several_wins() {
        let near = Cuboid::new(Vec2::new(0.5, 0.5));
        let far = Triangle::new(
            Point2::new(0.0, -1.0),
            Point2::new(1.0, -1.0),
            Point2::new(0.0, 1.0),
        );
        let candidates: Vec<(u32, &dyn Shape, Vec2)> = vec![
            (7, &far as &dyn Shape, Vec2::new(10.0, 0.0)),
            (3, &near as &dyn Shape, Vec2::new(4.0, 0.0)),
        ];

        let (key, distance, _) =
            nearest_ray_hit(candidates, Point2::origin(), Vec2::x(), 100.0).expect("hit");
        assert_eq!(key, 3);
        assert!((distance - 3.5).abs() < 1.0e-5);
    }
}
