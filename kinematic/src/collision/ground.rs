use crate::constants::{ANGLE_EPS_DEG, MAX_RAY_DISTANCE};

use super::{
    bounds::RayOrigins,
    controller::CollisionState,
    settings::ControllerSettings,
    types::{RayCaster, Vec2, sign, slope_angle_deg},
};

/// Keep a character glued to a downward slope while it walks down it.
///
/// - Probes straight down from the trailing bottom corner (the one still over the slope).
/// - Only slopes that fall away in the direction of travel, within `max_descend_angle`,
///   and close enough to be reached this step are followed.
/// - On success the horizontal step is projected onto the slope and the drop is added
///   to `displacement.y`.
pub(crate) fn descend_slope<W: RayCaster + ?Sized>(
    world: &W,
    origins: &RayOrigins,
    settings: &ControllerSettings,
    displacement: &mut Vec2,
    collisions: &mut CollisionState,
) {
    let direction_x = sign(displacement.x);
    let origin = if direction_x < 0.0 {
        origins.bottom_right
    } else {
        origins.bottom_left
    };

    let Some(hit) = world.cast_ray(
        origin,
        -Vec2::y(),
        MAX_RAY_DISTANCE,
        settings.collision_mask,
    ) else {
        return;
    };
    // Starting inside a body says nothing about the slope.
    if hit.distance == 0.0 {
        return;
    }

    let slope_angle = slope_angle_deg(&hit.normal);
    if slope_angle <= ANGLE_EPS_DEG || slope_angle > settings.max_descend_angle {
        return;
    }

    // The slope must fall away in the direction we are walking.
    if sign(hit.normal.x) != direction_x {
        return;
    }

    let move_distance = displacement.x.abs();
    let radians = slope_angle.to_radians();
    if hit.distance - settings.probes.skin_width > radians.tan() * move_distance {
        return;
    }

    displacement.x = radians.cos() * move_distance * direction_x;
    displacement.y -= radians.sin() * move_distance;

    collisions.slope_angle = slope_angle;
    collisions.descending_slope = true;
    collisions.bottom = true;
}
