//! Side-scrolling camera that follows a character.
//!
//! The camera tracks a focus area rather than the character itself: the area only moves
//! when the character pushes against one of its edges. Horizontal movement of the area
//! also pushes the view ahead in the direction of travel. Run it after the character has
//! moved for the step.

use parry2d::bounding_volume::Aabb;

use crate::{
    collision::{
        ConfigError, Vec2,
        settings::{check_non_negative, check_positive},
    },
    motion::smooth_damp,
};

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CameraSettings {
    /// Width and height of the box the target may move in without moving the camera.
    pub focus_area_size: Vec2,
    /// Camera height above the focus area's center.
    pub vertical_offset: f32,
    /// How far ahead of the focus area the camera looks while the target runs.
    pub look_ahead_distance: f32,
    pub look_smooth_time: f32,
    pub vertical_smooth_time: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            focus_area_size: Vec2::new(3.0, 5.0),
            vertical_offset: 1.0,
            look_ahead_distance: 4.0,
            look_smooth_time: 0.5,
            vertical_smooth_time: 0.2,
        }
    }
}

impl CameraSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("focus area width", self.focus_area_size.x)?;
        check_positive("focus area height", self.focus_area_size.y)?;
        check_non_negative("look-ahead distance", self.look_ahead_distance)?;
        check_non_negative("look-ahead smoothing time", self.look_smooth_time)?;
        check_non_negative("vertical smoothing time", self.vertical_smooth_time)?;
        Ok(())
    }
}

/// Box the target is kept inside. Moves only as far as needed to contain it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocusArea {
    pub center: Vec2,
    /// Shift applied by the last `update`.
    pub velocity: Vec2,
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
}

impl FocusArea {
    /// Centered horizontally on `target`, resting on its bottom edge.
    pub fn new(target: &Aabb, size: Vec2) -> Self {
        let center_x = (target.mins.x + target.maxs.x) * 0.5;
        let left = center_x - size.x * 0.5;
        let right = center_x + size.x * 0.5;
        let bottom = target.mins.y;
        let top = target.mins.y + size.y;

        Self {
            center: Vec2::new((left + right) * 0.5, (bottom + top) * 0.5),
            velocity: Vec2::zeros(),
            left,
            right,
            bottom,
            top,
        }
    }

    pub fn update(&mut self, target: &Aabb) {
        let shift_x = if target.mins.x < self.left {
            target.mins.x - self.left
        } else if target.maxs.x > self.right {
            target.maxs.x - self.right
        } else {
            0.0
        };
        self.left += shift_x;
        self.right += shift_x;

        let shift_y = if target.mins.y < self.bottom {
            target.mins.y - self.bottom
        } else if target.maxs.y > self.top {
            target.maxs.y - self.top
        } else {
            0.0
        };
        self.bottom += shift_y;
        self.top += shift_y;

        self.center = Vec2::new(
            (self.left + self.right) * 0.5,
            (self.bottom + self.top) * 0.5,
        );
        self.velocity = Vec2::new(shift_x, shift_y);
    }
}

#[derive(Clone, Debug)]
pub struct CameraFollow {
    settings: CameraSettings,
    focus_area: FocusArea,
    position: Vec2,

    current_look_ahead_x: f32,
    target_look_ahead_x: f32,
    look_ahead_direction_x: f32,
    look_ahead_stopped: bool,
    smooth_look_velocity_x: f32,
    smooth_velocity_y: f32,
}

impl CameraFollow {
    /// Start framing `target`. The camera begins at the focus position, with no look-ahead.
    pub fn new(settings: CameraSettings, target: &Aabb) -> Result<Self, ConfigError> {
        settings.validate()?;
        let focus_area = FocusArea::new(target, settings.focus_area_size);

        Ok(Self {
            settings,
            focus_area,
            position: focus_area.center + Vec2::y() * settings.vertical_offset,
            current_look_ahead_x: 0.0,
            target_look_ahead_x: 0.0,
            look_ahead_direction_x: 0.0,
            look_ahead_stopped: false,
            smooth_look_velocity_x: 0.0,
            smooth_velocity_y: 0.0,
        })
    }

    #[inline]
    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    #[inline]
    pub fn focus_area(&self) -> &FocusArea {
        &self.focus_area
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn look_ahead(&self) -> f32 {
        self.current_look_ahead_x
    }

    #[inline]
    pub fn look_ahead_target(&self) -> f32 {
        self.target_look_ahead_x
    }

    /// Follow `target` for one step. `input` is the target's directional input this step.
    pub fn update(&mut self, target: &Aabb, input: Vec2, dt: f32) -> Vec2 {
        self.focus_area.update(target);
        let focus = self.focus_area.center + Vec2::y() * self.settings.vertical_offset;

        let shift_x = self.focus_area.velocity.x;
        if shift_x != 0.0 {
            self.look_ahead_direction_x = shift_x.signum();
            let full = self.look_ahead_direction_x * self.settings.look_ahead_distance;

            if input.x != 0.0 && input.x.signum() == self.look_ahead_direction_x {
                self.look_ahead_stopped = false;
                self.target_look_ahead_x = full;
            } else if !self.look_ahead_stopped {
                // Let go of the input: settle a quarter of the way to full look-ahead.
                self.look_ahead_stopped = true;
                self.target_look_ahead_x =
                    self.current_look_ahead_x + (full - self.current_look_ahead_x) / 4.0;
            }
        }

        self.current_look_ahead_x = smooth_damp(
            self.current_look_ahead_x,
            self.target_look_ahead_x,
            &mut self.smooth_look_velocity_x,
            self.settings.look_smooth_time,
            dt,
        );

        let y = smooth_damp(
            self.position.y,
            focus.y,
            &mut self.smooth_velocity_y,
            self.settings.vertical_smooth_time,
            dt,
        );
        self.position = Vec2::new(focus.x + self.current_look_ahead_x, y);
        self.position
    }
}
