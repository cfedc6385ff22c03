/*!
Collision root module.

Ray-cast kinematic movers for axis-aligned 2D bodies, plus a parry2d-backed world
to run them against. The code is split by concern:

- types:        math aliases, body handles, ray hits and the `RayCaster`/`BodySet` seams
- settings:     mover settings, defaults and construction-time validation
- bounds:       ray origins and probe fan geometry from a body's box
- narrow_phase: thin wrappers over parry2d ray casts
- world:        `CollisionWorld`, the concrete body store and ray query provider
- ground:       slope descent for the character controller
- controller:   character collision resolution (walls, slopes, one-way platforms)
- platform:     waypoint-driven moving platforms and passenger transport
*/

pub mod bounds;
pub mod controller;
pub mod ground;
pub mod narrow_phase;
pub mod platform;
pub mod settings;
pub mod types;
pub mod world;

// Re-export commonly used types and functions.
pub use bounds::{ProbeGeometry, RayOrigins, compute_origins, compute_probe_geometry};
pub use controller::{CharacterController, CollisionState, MoveRequest};
pub use platform::{MovingPlatform, Passenger, PlatformMotionState, ease};
pub use settings::{ConfigError, ControllerSettings, PlatformSettings, ProbeSettings};
pub use types::{BodyHandle, BodySet, Point2, RayCaster, RayHit, SurfaceKind, Vec2, slope_angle_deg};
pub use world::{BodyDef, CollisionWorld};
