//! In-memory 2D collision world.
//!
//! Stores every body (static geometry, platforms, characters) as a parry2d shape at a
//! world position, tagged with layer membership and a surface kind. It answers the
//! ray queries the movers issue and applies their translations.
//!
//! Queries scan bodies linearly in insertion order. Levels driven by this crate are
//! small; a broad phase can slot in behind [`RayCaster`] without touching the movers.

use parry2d::{
    bounding_volume::Aabb,
    shape::{Shape, SharedShape},
};

use crate::{
    bitmask_flags::{Layer, LayerMask},
    constants::MAX_RAY_DISTANCE,
};

use super::{
    narrow_phase,
    settings::ConfigError,
    types::{BodyHandle, BodySet, Point2, RayCaster, RayHit, SurfaceKind, Vec2},
};

/// Description of a body to insert.
#[derive(Clone)]
pub struct BodyDef {
    pub shape: SharedShape,
    pub position: Vec2,
    pub layers: LayerMask,
    pub surface: SurfaceKind,
}

impl BodyDef {
    /// Axis-aligned box centered on its position.
    pub fn cuboid(half_width: f32, half_height: f32) -> Self {
        Self::from_shape(SharedShape::cuboid(half_width, half_height))
    }

    /// Triangle with vertices relative to the body position. Used for slopes.
    pub fn triangle(a: Point2, b: Point2, c: Point2) -> Self {
        Self::from_shape(SharedShape::triangle(a, b, c))
    }

    /// Convex hull of `points`, relative to the body position.
    pub fn convex_polygon(points: &[Point2]) -> Result<Self, ConfigError> {
        if points.len() < 3 {
            return Err(ConfigError::DegenerateShape(points.len()));
        }
        SharedShape::convex_hull(points)
            .map(Self::from_shape)
            .ok_or(ConfigError::DegenerateShape(points.len()))
    }

    fn from_shape(shape: SharedShape) -> Self {
        Self {
            shape,
            position: Vec2::zeros(),
            layers: Layer::Obstacles.into(),
            surface: SurfaceKind::Solid,
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = Vec2::new(x, y);
        self
    }

    pub fn layer(mut self, layer: Layer) -> Self {
        self.layers = layer.into();
        self
    }

    pub fn layers(mut self, layers: LayerMask) -> Self {
        self.layers = layers;
        self
    }

    pub fn one_way(mut self) -> Self {
        self.surface = SurfaceKind::OneWay;
        self
    }
}

struct Body {
    shape: SharedShape,
    position: Vec2,
    layers: LayerMask,
    surface: SurfaceKind,
}

/// Owner of every collidable body in a level.
#[derive(Default)]
pub struct CollisionWorld {
    bodies: Vec<Option<Body>>,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, def: BodyDef) -> BodyHandle {
        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(Some(Body {
            shape: def.shape,
            position: def.position,
            layers: def.layers,
            surface: def.surface,
        }));
        handle
    }

    /// Remove a body. Its handle is never reused.
    pub fn remove(&mut self, body: BodyHandle) -> bool {
        self.bodies
            .get_mut(body.0 as usize)
            .and_then(Option::take)
            .is_some()
    }

    /// Number of live bodies.
    pub fn len(&self) -> usize {
        self.bodies.iter().filter(|b| b.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_position(&mut self, body: BodyHandle, position: Vec2) {
        if let Some(b) = self.get_mut(body) {
            b.position = position;
        }
    }

    fn get(&self, body: BodyHandle) -> Option<&Body> {
        self.bodies.get(body.0 as usize).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, body: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(body.0 as usize).and_then(Option::as_mut)
    }
}

impl RayCaster for CollisionWorld {
    fn cast_ray(
        &self,
        origin: Point2,
        dir: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        let dir = dir.try_normalize(1.0e-12)?;
        let max_distance = max_distance.min(MAX_RAY_DISTANCE);
        if max_distance.is_nan() || max_distance < 0.0 {
            return None;
        }

        let candidates = self.bodies.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref()
                .filter(|b| b.layers.intersects(mask))
                .map(|b| (i, &*b.shape as &dyn Shape, b.position))
        });

        narrow_phase::nearest_ray_hit(candidates, origin, dir, max_distance).map(
            |(i, distance, normal)| RayHit {
                distance,
                normal,
                body: BodyHandle(i as u32),
                surface: self.bodies[i]
                    .as_ref()
                    .map_or(SurfaceKind::Solid, |b| b.surface),
            },
        )
    }
}

impl BodySet for CollisionWorld {
    fn bounds(&self, body: BodyHandle) -> Option<Aabb> {
        self.get(body).map(|b| {
            let iso = nalgebra::Isometry2::translation(b.position.x, b.position.y);
            b.shape.compute_aabb(&iso)
        })
    }

    fn position(&self, body: BodyHandle) -> Option<Vec2> {
        self.get(body).map(|b| b.position)
    }

    fn translate(&mut self, body: BodyHandle, delta: Vec2) {
        if let Some(b) = self.get_mut(body) {
            b.position += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_floor_and_ledge() -> (CollisionWorld, BodyHandle, BodyHandle) {
        let mut world = CollisionWorld::new();
        let floor = world.insert(BodyDef::cuboid(10.0, 0.5).at(0.0, -0.5));
        let ledge = world.insert(
            BodyDef::cuboid(1.0, 0.1)
                .at(0.0, 2.0)
                .layer(Layer::Platforms)
                .one_way(),
        );
        (world, floor, ledge)
    }

    #[test]
    fn ray_reports_nearest_body_and_its_surface() {
        let (world, _floor, ledge) = world_with_floor_and_ledge();

        let hit = world
            .cast_ray(Point2::new(0.0, 5.0), -Vec2::y(), 10.0, LayerMask::all())
            .expect("ray should hit the ledge first");

        assert_eq!(hit.body, ledge);
        assert_eq!(hit.surface, SurfaceKind::OneWay);
        assert!((hit.distance - 2.9).abs() < 1.0e-5);
        assert!((hit.normal - Vec2::y()).norm() < 1.0e-5);
    }

    #[test]
    fn mask_filters_layers() {
        let (world, floor, _ledge) = world_with_floor_and_ledge();

        let hit = world
            .cast_ray(
                Point2::new(0.0, 5.0),
                -Vec2::y(),
                10.0,
                Layer::Obstacles.into(),
            )
            .expect("ray should reach the floor");
        assert_eq!(hit.body, floor);
        assert!((hit.distance - 5.0).abs() < 1.0e-5);

        assert!(
            world
                .cast_ray(
                    Point2::new(0.0, 5.0),
                    -Vec2::y(),
                    10.0,
                    Layer::Characters.into()
                )
                .is_none()
        );
    }

    #[test]
    fn translate_moves_bounds() {
        let (mut world, floor, _) = world_with_floor_and_ledge();
        world.translate(floor, Vec2::new(1.0, 2.0));

        let aabb = world.bounds(floor).expect("floor exists");
        assert!((aabb.mins.x - (-9.0)).abs() < 1.0e-6);
        assert!((aabb.maxs.y - 2.0).abs() < 1.0e-6);
        assert_eq!(world.position(floor), Some(Vec2::new(1.0, 1.5)));
    }

    #[test]
    fn removed_bodies_stop_answering() {
        let (mut world, floor, ledge) = world_with_floor_and_ledge();
        assert_eq!(world.len(), 2);
        assert!(world.remove(ledge));
        assert!(!world.remove(ledge));
        assert_eq!(world.len(), 1);
        assert!(world.bounds(ledge).is_none());

        let hit = world
            .cast_ray(Point2::new(0.0, 5.0), -Vec2::y(), 10.0, LayerMask::all())
            .expect("floor remains");
        assert_eq!(hit.body, floor);
    }

    #[test]
    fn unbounded_probe_is_clipped() {
        let mut world = CollisionWorld::new();
        world.insert(BodyDef::cuboid(1.0, 1.0).at(0.0, -2.0 * MAX_RAY_DISTANCE));

        assert!(
            world
                .cast_ray(Point2::origin(), -Vec2::y(), f32::INFINITY, LayerMask::all())
                .is_none()
        );
    }

    #[test]
    fn degenerate_polygon_is_rejected() {
        let points = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert!(BodyDef::convex_polygon(&points).is_err());
    }
}
