use kinematic::{
    BodyDef, BodySet, CharacterController, CollisionWorld, ControllerSettings, Layer,
    MoveRequest, MovingPlatform, PlatformSettings, Vec2,
};

const EPS: f32 = 1.0e-4;

struct Scene {
    world: CollisionWorld,
    platform: MovingPlatform,
    riders: Vec<CharacterController>,
}

/// 2 x 0.5 platform at the origin (top face at y = 0.25) travelling `path`, with a
/// 1 x 1 character resting on its top face.
fn scene(path: &[Vec2]) -> Scene {
    let mut world = CollisionWorld::new();
    let platform_body = world.insert(BodyDef::cuboid(1.0, 0.25).layer(Layer::Platforms));
    let rider_body = world.insert(
        BodyDef::cuboid(0.5, 0.5)
            .at(0.0, 0.75)
            .layer(Layer::Characters),
    );

    let platform =
        MovingPlatform::new(&world, platform_body, path, PlatformSettings::default()).unwrap();
    let rider =
        CharacterController::new(&world, rider_body, ControllerSettings::default()).unwrap();

    Scene {
        world,
        platform,
        riders: vec![rider],
    }
}

fn rider_position(scene: &Scene) -> Vec2 {
    scene.world.position(scene.riders[0].body()).unwrap()
}

fn platform_position(scene: &Scene) -> Vec2 {
    scene.world.position(scene.platform.body()).unwrap()
}

#[test]
fn rider_tracks_sideways_platform() {
    let mut s = scene(&[Vec2::zeros(), Vec2::new(4.0, 0.0)]);

    let mut now = 0.0;
    for _ in 0..10 {
        s.platform.step(&mut s.world, &mut s.riders, 0.1, now);
        now += 0.1;
    }

    let offset = rider_position(&s) - platform_position(&s);
    assert!((offset - Vec2::new(0.0, 0.75)).norm() < EPS);
    assert!(s.riders[0].collisions().bottom);
}

#[test]
fn rider_lands_back_on_platform_after_a_carry() {
    let mut s = scene(&[Vec2::zeros(), Vec2::new(4.0, 0.0)]);
    s.platform.step(&mut s.world, &mut s.riders, 0.1, 0.0);

    // A small gravity step right after the carry ends on the platform again.
    let applied = s.riders[0].move_by(&mut s.world, MoveRequest::new(Vec2::new(0.0, -0.05), 0.1));

    assert!(applied.y.abs() < EPS);
    assert!(s.riders[0].collisions().bottom);
}

#[test]
fn rising_platform_lifts_rider_before_moving() {
    let mut s = scene(&[Vec2::zeros(), Vec2::new(0.0, 2.0)]);

    let d = s.platform.step(&mut s.world, &mut s.riders, 0.1, 0.0);

    assert!((d - Vec2::new(0.0, 0.1)).norm() < EPS);
    assert!((rider_position(&s) - Vec2::new(0.0, 0.85)).norm() < EPS);
    assert!(s.riders[0].collisions().bottom);
}

#[test]
fn sinking_platform_keeps_rider_on_top() {
    let mut s = scene(&[Vec2::zeros(), Vec2::new(0.0, -2.0)]);

    let mut now = 0.0;
    for _ in 0..5 {
        s.platform.step(&mut s.world, &mut s.riders, 0.1, now);
        now += 0.1;
    }

    let offset = rider_position(&s) - platform_position(&s);
    assert!((offset.y - 0.75).abs() < 1.0e-3);
    assert!(s.riders[0].collisions().bottom);
}

#[test]
fn platform_pushes_character_standing_in_its_path() {
    let mut world = CollisionWorld::new();
    let platform_body = world.insert(BodyDef::cuboid(1.0, 0.25).layer(Layer::Platforms));
    // Standing beside the platform, left face 0.05 from its right face.
    let body = world.insert(
        BodyDef::cuboid(0.5, 0.5)
            .at(1.55, 0.0)
            .layer(Layer::Characters),
    );
    let mut platform = MovingPlatform::new(
        &world,
        platform_body,
        &[Vec2::zeros(), Vec2::new(4.0, 0.0)],
        PlatformSettings::default(),
    )
    .unwrap();
    let mut riders =
        vec![CharacterController::new(&world, body, ControllerSettings::default()).unwrap()];

    for i in 0..5 {
        platform.step(&mut world, &mut riders, 0.1, i as f32 * 0.1);
    }

    // Never overlaps the platform's leading face.
    let platform_right = world.bounds(platform_body).unwrap().maxs.x;
    let rider_left = world.bounds(body).unwrap().mins.x;
    assert!(rider_left >= platform_right - EPS);
    assert!(!riders[0].collisions().bottom);
}
