pub mod bitmask_flags;
pub mod camera;
pub mod collision;
pub mod constants;
pub mod motion;

pub use bitmask_flags::{BitmaskFlags, FlagBitmask, Layer, LayerMask};
pub use camera::{CameraFollow, CameraSettings, FocusArea};
pub use collision::{
    BodyDef, BodyHandle, BodySet, CharacterController, CollisionState, CollisionWorld,
    ConfigError, ControllerSettings, MoveRequest, MovingPlatform, Passenger, PlatformSettings,
    Point2, RayCaster, RayHit, SurfaceKind, Vec2,
};
pub use constants::{
    FALL_THROUGH_DELAY_SECS, MAX_CLIMB_ANGLE_DEG, MAX_DESCEND_ANGLE_DEG, RAY_SPACING, SKIN_WIDTH,
};
pub use motion::{MotionSettings, MotionState, smooth_damp};
