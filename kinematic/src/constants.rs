/// Inward margin kept between a body's edges and its probe ray origins (world units).
///
/// Rays start this far inside the box so they never report the body's own edge.
/// Must stay smaller than any displacement error you are willing to tolerate.
pub const SKIN_WIDTH: f32 = 0.015;

/// Target distance between two adjacent probe rays along one edge (world units).
///
/// The actual spacing is derived per body so rays land exactly on both corners.
pub const RAY_SPACING: f32 = 0.25;

/// Fewest rays a fan may contain. One ray would leave the spacing undefined.
pub const MIN_RAY_COUNT: usize = 2;

/// Steepest slope (degrees from flat) a character walks up instead of treating it as a wall.
pub const MAX_CLIMB_ANGLE_DEG: f32 = 80.0;

/// Steepest slope (degrees from flat) a character sticks to while walking down.
pub const MAX_DESCEND_ANGLE_DEG: f32 = 75.0;

/// How long a one-way platform stays passable after the drop input (seconds).
pub const FALL_THROUGH_DELAY_SECS: f32 = 0.5;

/// Length used for probes that are conceptually unbounded (world units).
///
/// Ray casts in `CollisionWorld` are also clipped to this.
pub const MAX_RAY_DISTANCE: f32 = 1000.0;

/// Two slope angles closer than this are treated as the same surface (degrees).
pub const ANGLE_EPS_DEG: f32 = 1.0e-3;

/// Segment lengths below this are treated as coincident waypoints (world units).
pub const WAYPOINT_EPS: f32 = 1.0e-6;
