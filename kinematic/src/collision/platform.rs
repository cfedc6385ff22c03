use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::constants::WAYPOINT_EPS;

use super::{
    bounds::{ProbeGeometry, RayOrigins, compute_origins, compute_probe_geometry},
    settings::{ConfigError, PlatformSettings},
    types::{BodyHandle, BodySet, RayCaster, Vec2, sign},
};

/// Anything a platform can carry or push.
///
/// `carry` moves the passenger by `displacement` using its own collision rules and
/// must not run platform detection of its own.
pub trait Passenger<W> {
    fn body(&self) -> BodyHandle;
    fn carry(&mut self, world: &mut W, displacement: Vec2, standing_on_platform: bool, now: f32);
}

/// Progress along the waypoint path.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlatformMotionState {
    pub from_waypoint_index: usize,
    /// Linear progress in [0, 1] between the current pair of waypoints.
    pub percent_between_waypoints: f32,
    /// The platform holds still until this time.
    pub next_move_time: f32,
}

/// One passenger's push for the current step.
#[derive(Clone, Copy, Debug, PartialEq)]
struct PassengerMovement {
    body: BodyHandle,
    displacement: Vec2,
    standing_on_platform: bool,
    move_before_platform: bool,
}

/// S-curve easing `x^a / (x^a + (1 - x)^a)` with `a = easing + 1`. Linear for `easing == 0`.
#[inline]
pub fn ease(x: f32, easing: f32) -> f32 {
    let a = easing + 1.0;
    let head = x.powf(a);
    head / (head + (1.0 - x).powf(a))
}

/// Moves a body along waypoints and transports whatever rides or stands in its way.
#[derive(Clone, Debug)]
pub struct MovingPlatform {
    body: BodyHandle,
    settings: PlatformSettings,
    probes: ProbeGeometry,
    /// World-space path. Reversed in place at each end of a non-cyclic path.
    waypoints: Vec<Vec2>,
    motion: PlatformMotionState,
    /// Passenger body to its slot in the passenger slice handed to `step`.
    passenger_slots: HashMap<BodyHandle, usize>,
}

impl MovingPlatform {
    /// `local_waypoints` are relative to the body's position at construction.
    pub fn new<W: BodySet + ?Sized>(
        world: &W,
        body: BodyHandle,
        local_waypoints: &[Vec2],
        settings: PlatformSettings,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        if local_waypoints.len() < 2 {
            return Err(ConfigError::TooFewWaypoints(local_waypoints.len()));
        }
        let bounds = world.bounds(body).ok_or(ConfigError::UnknownBody(body))?;
        let origin = world.position(body).ok_or(ConfigError::UnknownBody(body))?;

        Ok(Self {
            body,
            settings,
            probes: compute_probe_geometry(&bounds, &settings.probes),
            waypoints: local_waypoints.iter().map(|w| w + origin).collect(),
            motion: PlatformMotionState::default(),
            passenger_slots: HashMap::new(),
        })
    }

    #[inline]
    pub fn body(&self) -> BodyHandle {
        self.body
    }

    #[inline]
    pub fn settings(&self) -> &PlatformSettings {
        &self.settings
    }

    #[inline]
    pub fn probes(&self) -> &ProbeGeometry {
        &self.probes
    }

    #[inline]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    #[inline]
    pub fn motion(&self) -> &PlatformMotionState {
        &self.motion
    }

    /// Advance the platform one step and carry its passengers.
    ///
    /// Order: pushed passengers move first, then the platform, then riders on top.
    /// Returns the platform's own displacement.
    pub fn step<W, P>(&mut self, world: &mut W, passengers: &mut [P], dt: f32, now: f32) -> Vec2
    where
        W: RayCaster + BodySet,
        P: Passenger<W>,
    {
        let (Some(bounds), Some(position)) = (world.bounds(self.body), world.position(self.body))
        else {
            warn!(body = ?self.body, "platform body missing from world; step skipped");
            return Vec2::zeros();
        };
        let origins = compute_origins(&bounds, self.settings.probes.skin_width);

        let displacement = self.calculate_movement(position, dt, now);
        let movements = self.calculate_passenger_movement(&*world, &origins, displacement);

        self.move_passengers(world, passengers, &movements, true, now);
        world.translate(self.body, displacement);
        self.move_passengers(world, passengers, &movements, false, now);

        displacement
    }

    /// Displacement that takes the platform from `position` to its next point on the path.
    pub fn calculate_movement(&mut self, position: Vec2, dt: f32, now: f32) -> Vec2 {
        if now < self.motion.next_move_time {
            return Vec2::zeros();
        }

        let count = self.waypoints.len();
        let from = self.motion.from_waypoint_index % count;
        let to = (from + 1) % count;
        let start = self.waypoints[from];
        let end = self.waypoints[to];

        let segment = (end - start).norm();
        let motion = &mut self.motion;
        if segment <= WAYPOINT_EPS {
            motion.percent_between_waypoints = 1.0;
        } else {
            motion.percent_between_waypoints += dt * self.settings.speed / segment;
        }
        motion.percent_between_waypoints = motion.percent_between_waypoints.clamp(0.0, 1.0);

        let eased = ease(motion.percent_between_waypoints, self.settings.easing);
        let target = start.lerp(&end, eased);

        if motion.percent_between_waypoints >= 1.0 {
            motion.percent_between_waypoints = 0.0;
            motion.from_waypoint_index = from + 1;

            if self.settings.cyclic {
                motion.from_waypoint_index %= count;
            } else if motion.from_waypoint_index >= count - 1 {
                motion.from_waypoint_index = 0;
                self.waypoints.reverse();
                debug!(body = ?self.body, "platform path reversed");
            }

            motion.next_move_time = now + self.settings.wait_time;
            debug!(
                body = ?self.body,
                waypoint = to,
                next_move_time = motion.next_move_time,
                "platform reached waypoint"
            );
        }

        target - position
    }

    /// Probe for bodies pushed or carried by `displacement`, using pre-motion origins.
    fn calculate_passenger_movement<W: RayCaster + ?Sized>(
        &self,
        world: &W,
        origins: &RayOrigins,
        displacement: Vec2,
    ) -> Vec<PassengerMovement> {
        let skin = self.settings.probes.skin_width;
        let mask = self.settings.passenger_mask;
        let direction_x = sign(displacement.x);
        let direction_y = sign(displacement.y);

        let mut seen = HashSet::new();
        let mut movements = Vec::new();

        // Vertically moving platform: anything above (rising) or below (sinking).
        if displacement.y != 0.0 {
            let ray_length = displacement.y.abs() + skin;

            for i in 0..self.probes.vertical_ray_count {
                let corner = if direction_y < 0.0 {
                    origins.bottom_left
                } else {
                    origins.top_left
                };
                let origin = corner + Vec2::x() * (self.probes.vertical_spacing * i as f32);

                let Some(hit) = world.cast_ray(origin, Vec2::y() * direction_y, ray_length, mask)
                else {
                    continue;
                };
                if hit.distance == 0.0 || !seen.insert(hit.body) {
                    continue;
                }

                let push_x = if direction_y > 0.0 { displacement.x } else { 0.0 };
                let push_y = displacement.y - (hit.distance - skin) * direction_y;
                movements.push(PassengerMovement {
                    body: hit.body,
                    displacement: Vec2::new(push_x, push_y),
                    standing_on_platform: direction_y > 0.0,
                    move_before_platform: true,
                });
            }
        }

        // Horizontally moving platform: anything in front of it.
        if displacement.x != 0.0 {
            let ray_length = displacement.x.abs() + skin;

            for i in 0..self.probes.horizontal_ray_count {
                let corner = if direction_x < 0.0 {
                    origins.bottom_left
                } else {
                    origins.bottom_right
                };
                let origin = corner + Vec2::y() * (self.probes.horizontal_spacing * i as f32);

                let Some(hit) = world.cast_ray(origin, Vec2::x() * direction_x, ray_length, mask)
                else {
                    continue;
                };
                if hit.distance == 0.0 || !seen.insert(hit.body) {
                    continue;
                }

                let push_x = displacement.x - (hit.distance - skin) * direction_x;
                movements.push(PassengerMovement {
                    body: hit.body,
                    displacement: Vec2::new(push_x, -skin),
                    standing_on_platform: false,
                    move_before_platform: true,
                });
            }
        }

        // Riders on top of a sinking or sideways-moving platform.
        let sinking = displacement.y < 0.0;
        let sideways = displacement.y == 0.0 && displacement.x != 0.0;
        if sinking || sideways {
            let ray_length = 2.0 * skin;

            for i in 0..self.probes.vertical_ray_count {
                let origin =
                    origins.top_left + Vec2::x() * (self.probes.vertical_spacing * i as f32);

                let Some(hit) = world.cast_ray(origin, Vec2::y(), ray_length, mask) else {
                    continue;
                };
                if hit.distance == 0.0 || !seen.insert(hit.body) {
                    continue;
                }

                movements.push(PassengerMovement {
                    body: hit.body,
                    displacement,
                    standing_on_platform: true,
                    move_before_platform: false,
                });
            }
        }

        movements
    }

    fn move_passengers<W, P>(
        &mut self,
        world: &mut W,
        passengers: &mut [P],
        movements: &[PassengerMovement],
        before_platform: bool,
        now: f32,
    ) where
        P: Passenger<W>,
    {
        for movement in movements
            .iter()
            .filter(|m| m.move_before_platform == before_platform)
        {
            let Some(slot) = self.passenger_slot::<W, P>(passengers, movement.body) else {
                warn!(
                    platform = ?self.body,
                    passenger = ?movement.body,
                    "passenger has no movement handle; skipped"
                );
                continue;
            };
            passengers[slot].carry(
                world,
                movement.displacement,
                movement.standing_on_platform,
                now,
            );
        }
    }

    /// Cached lookup of `body` in `passengers`. A stale slot is looked up again.
    fn passenger_slot<W, P: Passenger<W>>(
        &mut self,
        passengers: &[P],
        body: BodyHandle,
    ) -> Option<usize> {
        if let Some(&slot) = self.passenger_slots.get(&body) {
            if passengers.get(slot).is_some_and(|p| p.body() == body) {
                return Some(slot);
            }
        }

        let slot = passengers.iter().position(|p| p.body() == body)?;
        self.passenger_slots.insert(body, slot);
        Some(slot)
    }
}
