//! Desired displacement for a player-driven character.
//!
//! This module turns directional input, jump presses and the previous step's contacts
//! into a displacement for
//! [`CharacterController::move_by`](crate::collision::CharacterController::move_by).
//! It applies no collision of its own. Per step:
//!
//! 1. [`MotionState::step`] smooths horizontal velocity, integrates gravity and handles
//!    wall sliding, then returns `velocity * dt`.
//! 2. The caller moves the character with that displacement.
//! 3. [`MotionState::after_move`] zeroes vertical velocity on a floor or ceiling contact.

use crate::collision::{
    CollisionState, ConfigError, Vec2,
    settings::{check_non_negative, check_positive},
};

/// Tuning for jumps, run speed and wall interaction.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionSettings {
    /// Horizontal run speed at full input (units per second).
    pub move_speed: f32,
    /// Apex height of a tapped jump.
    pub min_jump_height: f32,
    /// Apex height of a held jump.
    pub max_jump_height: f32,
    /// Seconds from take-off to the apex of a held jump.
    pub time_to_jump_apex: f32,
    /// Horizontal smoothing time while airborne (seconds).
    pub acceleration_time_airborne: f32,
    /// Horizontal smoothing time on the ground (seconds).
    pub acceleration_time_grounded: f32,
    /// Fastest fall while pressed against a wall.
    pub wall_slide_speed_max: f32,
    /// How long input away from a wall must be held before letting go (seconds).
    pub wall_stick_time: f32,
    /// Jump velocity when pushing toward the wall.
    pub wall_jump_climb: Vec2,
    /// Jump velocity with no horizontal input.
    pub wall_jump_off: Vec2,
    /// Jump velocity when pushing away from the wall.
    pub wall_jump_leap: Vec2,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            move_speed: 6.0,
            min_jump_height: 1.0,
            max_jump_height: 3.5,
            time_to_jump_apex: 0.4,
            acceleration_time_airborne: 0.2,
            acceleration_time_grounded: 0.1,
            wall_slide_speed_max: 3.0,
            wall_stick_time: 0.25,
            wall_jump_climb: Vec2::new(7.5, 16.0),
            wall_jump_off: Vec2::new(8.5, 7.0),
            wall_jump_leap: Vec2::new(18.0, 17.0),
        }
    }
}

impl MotionSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("time to jump apex", self.time_to_jump_apex)?;
        check_non_negative("move speed", self.move_speed)?;
        check_non_negative("min jump height", self.min_jump_height)?;
        check_non_negative("max jump height", self.max_jump_height)?;
        check_non_negative("airborne acceleration time", self.acceleration_time_airborne)?;
        check_non_negative("grounded acceleration time", self.acceleration_time_grounded)?;
        check_non_negative("wall slide speed", self.wall_slide_speed_max)?;
        check_non_negative("wall stick time", self.wall_stick_time)?;
        Ok(())
    }

    /// Constant vertical acceleration (negative) that peaks a held jump at `max_jump_height`.
    #[inline]
    pub fn gravity(&self) -> f32 {
        -(2.0 * self.max_jump_height) / self.time_to_jump_apex.powi(2)
    }

    #[inline]
    pub fn max_jump_velocity(&self) -> f32 {
        self.gravity().abs() * self.time_to_jump_apex
    }

    #[inline]
    pub fn min_jump_velocity(&self) -> f32 {
        (2.0 * self.gravity().abs() * self.min_jump_height).sqrt()
    }
}

/// Per-character velocity and wall state carried between steps.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionState {
    pub velocity: Vec2,
    /// Horizontal velocity of the smoothing spring.
    pub velocity_x_smoothing: f32,
    /// Directional input; components in [-1, 1].
    pub input: Vec2,
    pub wall_sliding: bool,
    /// -1 for a wall on the left, +1 otherwise.
    pub wall_direction_x: f32,
    pub time_to_wall_unstick: f32,
}

impl MotionState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn set_input(&mut self, input: Vec2) {
        self.input = input;
    }

    /// Update velocity from input, gravity and wall contact and return this step's displacement.
    ///
    /// `collisions` are the contacts left by the previous move.
    pub fn step(
        &mut self,
        settings: &MotionSettings,
        collisions: &CollisionState,
        dt: f32,
    ) -> Vec2 {
        self.calculate_velocity(settings, collisions, dt);
        self.handle_wall_sliding(settings, collisions, dt);
        self.velocity * dt
    }

    /// Jump: off a wall while sliding, and/or off the ground when standing.
    pub fn jump_pressed(&mut self, settings: &MotionSettings, collisions: &CollisionState) {
        if self.wall_sliding {
            let input_x = self.input.x;
            let wall_jump = if input_x == self.wall_direction_x {
                Some(settings.wall_jump_climb)
            } else if input_x == 0.0 {
                Some(settings.wall_jump_off)
            } else if input_x == -self.wall_direction_x {
                Some(settings.wall_jump_leap)
            } else {
                None
            };

            if let Some(jump) = wall_jump {
                self.velocity.x = -self.wall_direction_x * jump.x;
                self.velocity.y = jump.y;
            }
        }

        if collisions.bottom {
            self.velocity.y = settings.max_jump_velocity();
        }
    }

    /// Releasing jump early cuts the ascent down to a short hop.
    pub fn jump_released(&mut self, settings: &MotionSettings) {
        let min = settings.min_jump_velocity();
        if self.velocity.y > min {
            self.velocity.y = min;
        }
    }

    /// Stop vertical motion against a floor or ceiling.
    pub fn after_move(&mut self, collisions: &CollisionState) {
        if collisions.top || collisions.bottom {
            self.velocity.y = 0.0;
        }
    }

    fn calculate_velocity(
        &mut self,
        settings: &MotionSettings,
        collisions: &CollisionState,
        dt: f32,
    ) {
        let target_x = self.input.x * settings.move_speed;
        let smooth_time = if collisions.bottom {
            settings.acceleration_time_grounded
        } else {
            settings.acceleration_time_airborne
        };

        self.velocity.x = smooth_damp(
            self.velocity.x,
            target_x,
            &mut self.velocity_x_smoothing,
            smooth_time,
            dt,
        );
        self.velocity.y += settings.gravity() * dt;
    }

    fn handle_wall_sliding(
        &mut self,
        settings: &MotionSettings,
        collisions: &CollisionState,
        dt: f32,
    ) {
        self.wall_direction_x = if collisions.left { -1.0 } else { 1.0 };
        self.wall_sliding = false;

        if !collisions.touching_wall() || collisions.bottom || self.velocity.y >= 0.0 {
            return;
        }
        self.wall_sliding = true;

        if self.velocity.y < -settings.wall_slide_speed_max {
            self.velocity.y = -settings.wall_slide_speed_max;
        }

        if self.time_to_wall_unstick > 0.0 {
            self.velocity_x_smoothing = 0.0;
            self.velocity.x = 0.0;

            let pulling_away = self.input.x != self.wall_direction_x && self.input.x != 0.0;
            if pulling_away {
                self.time_to_wall_unstick -= dt;
            } else {
                self.time_to_wall_unstick = settings.wall_stick_time;
            }
        } else {
            self.time_to_wall_unstick = settings.wall_stick_time;
        }
    }
}

/// Critically damped spring from `current` toward `target`.
///
/// - `velocity` is the spring's state and must persist between calls.
/// - `smooth_time` is roughly the time to reach the target; clamped to a tiny positive value.
/// - Never overshoots the target.
pub fn smooth_damp(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    dt: f32,
) -> f32 {
    let smooth_time = smooth_time.max(1.0e-4);
    let omega = 2.0 / smooth_time;

    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;

    let mut output = target + (change + temp) * decay;

    // Snap when the step would carry us past the target.
    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = if dt > 0.0 { (output - target) / dt } else { 0.0 };
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() <= eps
    }

    fn grounded() -> CollisionState {
        CollisionState {
            bottom: true,
            ..Default::default()
        }
    }

    fn on_right_wall() -> CollisionState {
        CollisionState {
            right: true,
            ..Default::default()
        }
    }

    #[test]
    fn derived_jump_values() {
        let s = MotionSettings::default();
        assert!(approx(s.gravity(), -43.75, 1e-4));
        assert!(approx(s.max_jump_velocity(), 17.5, 1e-4));
        assert!(approx(s.min_jump_velocity(), (2.0_f32 * 43.75).sqrt(), 1e-4));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let s = MotionSettings {
            time_to_jump_apex: 0.0,
            ..Default::default()
        };
        assert_eq!(
            s.validate(),
            Err(ConfigError::NotPositive {
                name: "time to jump apex",
                value: 0.0
            })
        );

        let s = MotionSettings {
            wall_stick_time: -1.0,
            ..Default::default()
        };
        assert_eq!(
            s.validate(),
            Err(ConfigError::Negative {
                name: "wall stick time",
                value: -1.0
            })
        );
        assert!(MotionSettings::default().validate().is_ok());
    }

    #[test]
    fn smooth_damp_approaches_without_overshoot() {
        let mut v = 0.0;
        let mut x = 0.0;
        let mut last = x;
        for _ in 0..120 {
            x = smooth_damp(x, 6.0, &mut v, 0.1, 1.0 / 60.0);
            assert!(x <= 6.0);
            assert!(x >= last);
            last = x;
        }
        assert!(approx(x, 6.0, 1e-2));
    }

    #[test]
    fn smooth_damp_at_target_stays_put() {
        let mut v = 0.0;
        assert_eq!(smooth_damp(2.0, 2.0, &mut v, 0.2, 0.016), 2.0);
        assert_eq!(v, 0.0);
    }

    #[test]
    fn gravity_accumulates_while_airborne() {
        let s = MotionSettings::default();
        let mut m = MotionState::new();
        let dt = 0.1;

        let d = m.step(&s, &CollisionState::default(), dt);

        assert!(approx(m.velocity.y, s.gravity() * dt, 1e-5));
        assert!(approx(d.y, m.velocity.y * dt, 1e-6));
        assert_eq!(d.x, 0.0);
    }

    #[test]
    fn ground_jump_and_early_release() {
        let s = MotionSettings::default();
        let mut m = MotionState::new();

        m.jump_pressed(&s, &CollisionState::default());
        assert_eq!(m.velocity.y, 0.0);

        m.jump_pressed(&s, &grounded());
        assert!(approx(m.velocity.y, s.max_jump_velocity(), 1e-5));

        m.jump_released(&s);
        assert!(approx(m.velocity.y, s.min_jump_velocity(), 1e-5));

        // Releasing below the short-hop speed changes nothing.
        m.velocity.y = 1.0;
        m.jump_released(&s);
        assert_eq!(m.velocity.y, 1.0);
    }

    #[test]
    fn contacts_stop_vertical_velocity() {
        let mut m = MotionState::new();
        m.velocity = Vec2::new(2.0, -5.0);
        m.after_move(&grounded());
        assert_eq!(m.velocity, Vec2::new(2.0, 0.0));

        m.velocity.y = 3.0;
        m.after_move(&CollisionState {
            top: true,
            ..Default::default()
        });
        assert_eq!(m.velocity.y, 0.0);

        m.velocity.y = 3.0;
        m.after_move(&CollisionState::default());
        assert_eq!(m.velocity.y, 3.0);
    }

    #[test]
    fn wall_slide_caps_fall_speed() {
        let s = MotionSettings::default();
        let mut m = MotionState::new();
        m.velocity.y = -10.0;

        m.step(&s, &on_right_wall(), 0.016);

        assert!(m.wall_sliding);
        assert_eq!(m.wall_direction_x, 1.0);
        assert_eq!(m.velocity.y, -s.wall_slide_speed_max);
        assert_eq!(m.time_to_wall_unstick, s.wall_stick_time);
    }

    #[test]
    fn wall_stick_holds_until_timer_runs_out() {
        let s = MotionSettings::default();
        let mut m = MotionState::new();
        m.velocity.y = -1.0;
        m.step(&s, &on_right_wall(), 0.1);
        assert_eq!(m.time_to_wall_unstick, s.wall_stick_time);

        // Pulling away from a right wall: stuck for the stick time.
        m.set_input(Vec2::new(-1.0, 0.0));
        m.step(&s, &on_right_wall(), 0.1);
        assert_eq!(m.velocity.x, 0.0);
        assert!(approx(m.time_to_wall_unstick, s.wall_stick_time - 0.1, 1e-6));

        m.step(&s, &on_right_wall(), 0.1);
        m.step(&s, &on_right_wall(), 0.1);
        assert!(m.time_to_wall_unstick <= 0.0);

        // Timer spent: this step lets go and re-arms the timer.
        m.step(&s, &on_right_wall(), 0.1);
        assert!(m.velocity.x < 0.0);
        assert_eq!(m.time_to_wall_unstick, s.wall_stick_time);
    }

    #[test]
    fn wall_jumps_pick_vector_from_input() {
        let s = MotionSettings::default();
        let cases = [
            (1.0, s.wall_jump_climb),
            (0.0, s.wall_jump_off),
            (-1.0, s.wall_jump_leap),
        ];

        for (input_x, expected) in cases {
            let mut m = MotionState::new();
            m.velocity.y = -1.0;
            m.set_input(Vec2::new(input_x, 0.0));
            m.step(&s, &on_right_wall(), 0.016);
            assert!(m.wall_sliding);

            m.jump_pressed(&s, &on_right_wall());
            assert_eq!(m.velocity, Vec2::new(-expected.x, expected.y));
        }
    }
}
