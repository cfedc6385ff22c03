use tracing::{debug, warn};

use crate::constants::ANGLE_EPS_DEG;

use super::{
    bounds::{ProbeGeometry, RayOrigins, compute_origins, compute_probe_geometry},
    ground,
    platform::Passenger,
    settings::{ConfigError, ControllerSettings},
    types::{BodyHandle, BodySet, RayCaster, SurfaceKind, Vec2, sign, slope_angle_deg},
};

/// Contact report of the most recent move, plus the little state carried between moves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionState {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,

    pub climbing_slope: bool,
    pub descending_slope: bool,

    /// Slope under or ahead of the character this step (degrees).
    pub slope_angle: f32,
    /// `slope_angle` of the previous step.
    pub previous_slope_angle: f32,
    /// Displacement as requested this step, before any correction.
    pub previous_displacement: Vec2,

    /// +1 facing right, -1 facing left. Only changes on non-zero horizontal movement.
    pub face_direction: i8,

    /// One-way platforms are ignored while this is set.
    pub falling_through_platform: bool,
    /// Time at which `falling_through_platform` clears.
    pub fall_through_until: Option<f32>,
}

impl Default for CollisionState {
    fn default() -> Self {
        Self {
            top: false,
            bottom: false,
            left: false,
            right: false,
            climbing_slope: false,
            descending_slope: false,
            slope_angle: 0.0,
            previous_slope_angle: 0.0,
            previous_displacement: Vec2::zeros(),
            face_direction: 1,
            falling_through_platform: false,
            fall_through_until: None,
        }
    }
}

impl CollisionState {
    /// Clear per-step contacts. The slope angle rolls over into `previous_slope_angle`.
    pub fn reset(&mut self) {
        self.top = false;
        self.bottom = false;
        self.left = false;
        self.right = false;
        self.climbing_slope = false;
        self.descending_slope = false;

        self.previous_slope_angle = self.slope_angle;
        self.slope_angle = 0.0;
    }

    #[inline]
    pub fn face_sign(&self) -> f32 {
        f32::from(self.face_direction)
    }

    /// True when any side contact was reported.
    #[inline]
    pub fn touching_wall(&self) -> bool {
        self.left || self.right
    }

    /// Clear the one-way drop once its window has elapsed (`now >= until`).
    pub fn expire_fall_through(&mut self, now: f32) {
        if let Some(until) = self.fall_through_until {
            if now >= until {
                self.falling_through_platform = false;
                self.fall_through_until = None;
                debug!(now, "one-way platforms solid again");
            }
        }
    }

    fn start_fall_through(&mut self, until: f32) {
        self.falling_through_platform = true;
        self.fall_through_until = Some(until);
    }
}

/// Parameters for a single controller move.
#[derive(Clone, Copy, Debug)]
pub struct MoveRequest {
    /// Desired translation for this step.
    pub displacement: Vec2,
    /// Directional input; `input.y <= -1` asks to drop through one-way platforms.
    pub input: Vec2,
    /// Set by a platform carrying this character; forces `bottom`.
    pub standing_on_platform: bool,
    /// Current simulation time (seconds). Drives the one-way drop window.
    pub now: f32,
}

impl MoveRequest {
    #[inline]
    pub fn new(displacement: Vec2, now: f32) -> Self {
        Self {
            displacement,
            input: Vec2::zeros(),
            standing_on_platform: false,
            now,
        }
    }

    #[inline]
    pub fn with_input(mut self, input: Vec2) -> Self {
        self.input = input;
        self
    }

    #[inline]
    pub fn on_platform(mut self, standing_on_platform: bool) -> Self {
        self.standing_on_platform = standing_on_platform;
        self
    }
}

/// Ray-cast controller for one axis-aligned character box.
///
/// Every move:
/// - probes down for a slope to follow when falling while walking,
/// - resolves horizontal movement (walls, slope climbing),
/// - resolves vertical movement at the already-corrected column (floors, ceilings,
///   one-way platforms), re-checking the slope ahead while climbing,
/// - translates the body and publishes the contacts in [`CollisionState`].
#[derive(Clone, Debug)]
pub struct CharacterController {
    body: BodyHandle,
    settings: ControllerSettings,
    probes: ProbeGeometry,
    collisions: CollisionState,
    input: Vec2,
}

impl CharacterController {
    /// Build a controller for `body`. Probe geometry is derived from the body's current size.
    pub fn new<W: BodySet + ?Sized>(
        world: &W,
        body: BodyHandle,
        settings: ControllerSettings,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        let bounds = world.bounds(body).ok_or(ConfigError::UnknownBody(body))?;

        Ok(Self {
            body,
            settings,
            probes: compute_probe_geometry(&bounds, &settings.probes),
            collisions: CollisionState::default(),
            input: Vec2::zeros(),
        })
    }

    #[inline]
    pub fn body(&self) -> BodyHandle {
        self.body
    }

    #[inline]
    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    #[inline]
    pub fn probes(&self) -> &ProbeGeometry {
        &self.probes
    }

    #[inline]
    pub fn collisions(&self) -> &CollisionState {
        &self.collisions
    }

    /// Input passed with the most recent move.
    #[inline]
    pub fn input(&self) -> Vec2 {
        self.input
    }

    /// Resolve `request.displacement` against the world, move the body and return the
    /// displacement actually applied.
    pub fn move_by<W: RayCaster + BodySet + ?Sized>(
        &mut self,
        world: &mut W,
        request: MoveRequest,
    ) -> Vec2 {
        let Some(bounds) = world.bounds(self.body) else {
            warn!(body = ?self.body, "character body missing from world; move skipped");
            return Vec2::zeros();
        };
        let origins = compute_origins(&bounds, self.settings.probes.skin_width);

        self.collisions.expire_fall_through(request.now);
        self.collisions.reset();
        self.collisions.previous_displacement = request.displacement;
        self.input = request.input;

        let mut displacement = request.displacement;

        if displacement.x != 0.0 {
            self.collisions.face_direction = if displacement.x < 0.0 { -1 } else { 1 };
        }

        if displacement.y < 0.0 {
            ground::descend_slope(
                &*world,
                &origins,
                &self.settings,
                &mut displacement,
                &mut self.collisions,
            );
        }

        self.horizontal_collisions(&*world, &origins, &mut displacement);

        if displacement.y != 0.0 {
            self.vertical_collisions(&*world, &origins, &mut displacement, request.now);
        }

        world.translate(self.body, displacement);

        if request.standing_on_platform {
            self.collisions.bottom = true;
        }

        displacement
    }

    fn horizontal_collisions<W: RayCaster + ?Sized>(
        &mut self,
        world: &W,
        origins: &RayOrigins,
        displacement: &mut Vec2,
    ) {
        let skin = self.settings.probes.skin_width;
        let direction_x = self.collisions.face_sign();

        // Always reach past the skin so wall contact is reported even when standing still.
        let mut ray_length = displacement.x.abs() + skin;
        if displacement.x.abs() < skin {
            ray_length = 2.0 * skin;
        }

        for i in 0..self.probes.horizontal_ray_count {
            let corner = if direction_x < 0.0 {
                origins.bottom_left
            } else {
                origins.bottom_right
            };
            let origin = corner + Vec2::y() * (self.probes.horizontal_spacing * i as f32);

            let Some(hit) = world.cast_ray(
                origin,
                Vec2::x() * direction_x,
                ray_length,
                self.settings.collision_mask,
            ) else {
                continue;
            };

            // Already overlapping: moving away must stay possible.
            if hit.distance == 0.0 {
                continue;
            }

            let slope_angle = slope_angle_deg(&hit.normal);

            if i == 0 && slope_angle <= self.settings.max_climb_angle {
                if self.collisions.descending_slope {
                    self.collisions.descending_slope = false;
                    *displacement = self.collisions.previous_displacement;
                }

                // Walk up to the foot of a new slope before starting to climb it.
                let mut distance_to_slope = 0.0;
                if !same_angle(slope_angle, self.collisions.previous_slope_angle) {
                    distance_to_slope = hit.distance - skin;
                    displacement.x -= distance_to_slope * direction_x;
                }

                self.climb_slope(displacement, slope_angle);
                displacement.x += distance_to_slope * direction_x;
            }

            if !self.collisions.climbing_slope || slope_angle > self.settings.max_climb_angle {
                displacement.x = (hit.distance - skin) * direction_x;
                ray_length = hit.distance;

                // Blocked mid-climb: keep the shortened step on the slope surface.
                if self.collisions.climbing_slope {
                    displacement.y =
                        self.collisions.slope_angle.to_radians().tan() * displacement.x.abs();
                }

                self.collisions.left = direction_x < 0.0;
                self.collisions.right = direction_x > 0.0;
            }
        }
    }

    fn vertical_collisions<W: RayCaster + ?Sized>(
        &mut self,
        world: &W,
        origins: &RayOrigins,
        displacement: &mut Vec2,
        now: f32,
    ) {
        let skin = self.settings.probes.skin_width;
        let direction_y = sign(displacement.y);
        let mut ray_length = displacement.y.abs() + skin;

        for i in 0..self.probes.vertical_ray_count {
            let corner = if direction_y < 0.0 {
                origins.bottom_left
            } else {
                origins.top_left
            };
            // Probe from where the horizontal pass put us.
            let origin = corner
                + Vec2::x() * (self.probes.vertical_spacing * i as f32 + displacement.x);

            let Some(hit) = world.cast_ray(
                origin,
                Vec2::y() * direction_y,
                ray_length,
                self.settings.collision_mask,
            ) else {
                continue;
            };

            if hit.surface == SurfaceKind::OneWay {
                if direction_y > 0.0 || hit.distance == 0.0 {
                    continue;
                }
                if self.collisions.falling_through_platform {
                    continue;
                }
                if requests_drop(self.input) {
                    let until = now + self.settings.fall_through_delay;
                    self.collisions.start_fall_through(until);
                    debug!(
                        body = ?self.body,
                        platform = ?hit.body,
                        until,
                        "dropping through one-way platform"
                    );
                    continue;
                }
            }

            displacement.y = (hit.distance - skin) * direction_y;
            ray_length = hit.distance;

            if self.collisions.climbing_slope {
                let tan = self.collisions.slope_angle.to_radians().tan();
                if tan.abs() > f32::EPSILON {
                    displacement.x = displacement.y / tan * sign(displacement.x);
                }
            }

            self.collisions.bottom = direction_y < 0.0;
            self.collisions.top = direction_y > 0.0;
        }

        if self.collisions.climbing_slope {
            self.check_slope_change(world, origins, displacement);
        }
    }

    /// While climbing, look ahead at the raised position for a slope of a different angle.
    fn check_slope_change<W: RayCaster + ?Sized>(
        &mut self,
        world: &W,
        origins: &RayOrigins,
        displacement: &mut Vec2,
    ) {
        let skin = self.settings.probes.skin_width;
        let direction_x = sign(displacement.x);
        let ray_length = displacement.x.abs() + skin;

        let corner = if direction_x < 0.0 {
            origins.bottom_left
        } else {
            origins.bottom_right
        };
        let origin = corner + Vec2::y() * displacement.y;

        if let Some(hit) = world.cast_ray(
            origin,
            Vec2::x() * direction_x,
            ray_length,
            self.settings.collision_mask,
        ) {
            if hit.distance == 0.0 {
                return;
            }
            let slope_angle = slope_angle_deg(&hit.normal);
            if !same_angle(slope_angle, self.collisions.slope_angle) {
                displacement.x = (hit.distance - skin) * direction_x;
                self.collisions.slope_angle = slope_angle;
            }
        }
    }

    fn climb_slope(&mut self, displacement: &mut Vec2, slope_angle: f32) {
        let move_distance = displacement.x.abs();
        let radians = slope_angle.to_radians();
        let climb_y = radians.sin() * move_distance;

        // Jumping already moves us up faster than the slope would.
        if displacement.y <= climb_y {
            displacement.y = climb_y;
            displacement.x = radians.cos() * move_distance * sign(displacement.x);
        }

        self.collisions.bottom = true;
        self.collisions.climbing_slope = true;
        self.collisions.slope_angle = slope_angle;
    }
}

impl<W: RayCaster + BodySet> Passenger<W> for CharacterController {
    fn body(&self) -> BodyHandle {
        self.body
    }

    fn carry(&mut self, world: &mut W, displacement: Vec2, standing_on_platform: bool, now: f32) {
        self.move_by(
            world,
            MoveRequest::new(displacement, now).on_platform(standing_on_platform),
        );
    }
}

#[inline]
fn same_angle(a: f32, b: f32) -> bool {
    (a - b).abs() <= ANGLE_EPS_DEG
}

#[inline]
fn requests_drop(input: Vec2) -> bool {
    input.y <= -1.0
}
