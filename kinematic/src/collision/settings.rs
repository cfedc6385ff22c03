/*!
Mover settings and tolerances.

The constants in [`crate::constants`] are the defaults; these structs let a level or
an actor override them. Settings are fixed once a mover is constructed, and every
constructor validates its settings so the per-step code never has to.

Notes
- Distances are in world units, time in seconds, angles in degrees.
- The defaults reproduce the classic tuning: 0.015 skin, 0.25 ray spacing,
  80/75 degree climb/descend limits and a half-second one-way drop window.
*/

use thiserror::Error;

use crate::{
    bitmask_flags::{Layer, LayerMask},
    constants::{
        FALL_THROUGH_DELAY_SECS, MAX_CLIMB_ANGLE_DEG, MAX_DESCEND_ANGLE_DEG, RAY_SPACING,
        SKIN_WIDTH,
    },
};

use super::types::BodyHandle;

/// Errors raised when a mover is built from invalid settings.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("skin width {0} must be strictly positive")]
    InvalidSkinWidth(f32),
    #[error("ray spacing {0} must be strictly positive")]
    InvalidRaySpacing(f32),
    #[error("{name} angle {value} must be within [0, 90) degrees")]
    InvalidAngle { name: &'static str, value: f32 },
    #[error("easing exponent {0} must be within [0, 2]")]
    InvalidEasing(f32),
    #[error("{name} {value} must not be negative")]
    Negative { name: &'static str, value: f32 },
    #[error("{name} {value} must be strictly positive")]
    NotPositive { name: &'static str, value: f32 },
    #[error("a platform path needs at least two waypoints, got {0}")]
    TooFewWaypoints(usize),
    #[error("a convex polygon needs at least three non-collinear points, got {0}")]
    DegenerateShape(usize),
    #[error("body {0:?} is not present in the world")]
    UnknownBody(BodyHandle),
}

/// Probe sampling parameters shared by every mover.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProbeSettings {
    /// Inward margin between the body's edge and its ray origins.
    pub skin_width: f32,
    /// Target distance between adjacent rays of a fan.
    pub ray_spacing: f32,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            skin_width: SKIN_WIDTH,
            ray_spacing: RAY_SPACING,
        }
    }
}

impl ProbeSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.skin_width.is_nan() || self.skin_width <= 0.0 {
            return Err(ConfigError::InvalidSkinWidth(self.skin_width));
        }
        if self.ray_spacing.is_nan() || self.ray_spacing <= 0.0 {
            return Err(ConfigError::InvalidRaySpacing(self.ray_spacing));
        }
        Ok(())
    }
}

/// Character controller settings.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerSettings {
    pub probes: ProbeSettings,
    /// Steepest slope walked up instead of blocking.
    pub max_climb_angle: f32,
    /// Steepest slope followed while walking down.
    pub max_descend_angle: f32,
    /// How long one-way platforms are ignored after a drop request.
    pub fall_through_delay: f32,
    /// Layers the character collides with.
    pub collision_mask: LayerMask,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            probes: ProbeSettings::default(),
            max_climb_angle: MAX_CLIMB_ANGLE_DEG,
            max_descend_angle: MAX_DESCEND_ANGLE_DEG,
            fall_through_delay: FALL_THROUGH_DELAY_SECS,
            collision_mask: LayerMask::from_flags(&[Layer::Obstacles, Layer::Platforms]),
        }
    }
}

impl ControllerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.probes.validate()?;
        check_angle("max climb", self.max_climb_angle)?;
        check_angle("max descend", self.max_descend_angle)?;
        check_non_negative("fall-through delay", self.fall_through_delay)?;
        Ok(())
    }
}

/// Moving platform settings.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlatformSettings {
    pub probes: ProbeSettings,
    /// Travel speed along the path (units per second, before easing).
    pub speed: f32,
    /// Loop from the last waypoint back to the first instead of ping-ponging.
    pub cyclic: bool,
    /// Pause at each waypoint (seconds).
    pub wait_time: f32,
    /// Easing exponent in [0, 2]; 0 is linear.
    pub easing: f32,
    /// Layers scanned for passengers.
    pub passenger_mask: LayerMask,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            probes: ProbeSettings::default(),
            speed: 1.0,
            cyclic: false,
            wait_time: 0.0,
            easing: 0.0,
            passenger_mask: Layer::Characters.into(),
        }
    }
}

impl PlatformSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.probes.validate()?;
        check_non_negative("speed", self.speed)?;
        check_non_negative("wait time", self.wait_time)?;
        if !(0.0..=2.0).contains(&self.easing) {
            return Err(ConfigError::InvalidEasing(self.easing));
        }
        Ok(())
    }
}

fn check_angle(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..90.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidAngle { name, value })
    }
}

pub(crate) fn check_non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

pub(crate) fn check_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}
