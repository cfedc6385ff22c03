//! Fixed-step driver for a loaded level.

use anyhow::{Context, Result};
use kinematic::{
    BodySet, CameraFollow, CharacterController, CollisionWorld, MotionSettings, MotionState,
    MoveRequest, MovingPlatform, Vec2,
};
use tracing::{debug, info};

use crate::level::{InputKey, JumpEdge, Level};

struct Actor {
    name: String,
    settings: MotionSettings,
    motion: MotionState,
    script: Vec<InputKey>,
    /// Next script key to apply.
    cursor: usize,
    input: Vec2,
}

impl Actor {
    /// Apply every key that has become active by `now`. Returns the jump edges seen.
    fn advance_script(&mut self, now: f32) -> Vec<JumpEdge> {
        let mut edges = Vec::new();
        while let Some(key) = self.script.get(self.cursor).filter(|k| k.from <= now) {
            self.input = key.input;
            edges.extend(key.jump);
            self.cursor += 1;
        }
        edges
    }
}

struct NamedPlatform {
    name: String,
    platform: MovingPlatform,
}

/// Camera bound to one character slot.
struct TrackedCamera {
    target: usize,
    camera: CameraFollow,
}

pub struct Simulation {
    world: CollisionWorld,
    platforms: Vec<NamedPlatform>,
    /// Parallel to `actors`; kept in their own slice so platforms can carry them.
    controllers: Vec<CharacterController>,
    actors: Vec<Actor>,
    camera: Option<TrackedCamera>,
    dt: f32,
    tick: u64,
}

impl Simulation {
    pub fn new(level: Level, dt: f32) -> Result<Self> {
        let mut world = CollisionWorld::new();

        for (i, solid) in level.solids.iter().enumerate() {
            let def = solid.body_def().with_context(|| format!("solid #{i}"))?;
            world.insert(def);
        }

        let mut platforms = Vec::with_capacity(level.platforms.len());
        for (i, def) in level.platforms.into_iter().enumerate() {
            let body = world.insert(def.body_def());
            let platform = MovingPlatform::new(&world, body, &def.waypoints, def.settings)
                .with_context(|| format!("platform #{i} ({})", def.name))?;
            platforms.push(NamedPlatform {
                name: def.name,
                platform,
            });
        }

        let mut controllers = Vec::with_capacity(level.characters.len());
        let mut actors = Vec::with_capacity(level.characters.len());
        for def in level.characters {
            def.motion
                .validate()
                .with_context(|| format!("character {}", def.name))?;
            let body = world.insert(def.body_def());
            let controller = CharacterController::new(&world, body, def.controller)
                .with_context(|| format!("character {}", def.name))?;

            controllers.push(controller);
            actors.push(Actor {
                name: def.name,
                settings: def.motion,
                motion: MotionState::new(),
                script: def.script,
                cursor: 0,
                input: Vec2::zeros(),
            });
        }

        let camera = match level.camera {
            Some(def) => {
                let target = actors
                    .iter()
                    .position(|a| a.name == def.target)
                    .with_context(|| format!("camera target {} is not a character", def.target))?;
                let bounds = world
                    .bounds(controllers[target].body())
                    .context("camera target has no body")?;
                let camera = CameraFollow::new(def.settings, &bounds).context("camera")?;
                Some(TrackedCamera { target, camera })
            }
            None => None,
        };

        info!(
            bodies = world.len(),
            platforms = platforms.len(),
            characters = actors.len(),
            "level loaded"
        );

        Ok(Self {
            world,
            platforms,
            controllers,
            actors,
            camera,
            dt,
            tick: 0,
        })
    }

    /// Current simulation time (seconds).
    pub fn now(&self) -> f32 {
        self.tick as f32 * self.dt
    }

    /// One tick: every platform (carrying all characters), then every character.
    pub fn step(&mut self) {
        let now = self.now();
        let dt = self.dt;

        for entry in &mut self.platforms {
            entry
                .platform
                .step(&mut self.world, &mut self.controllers, dt, now);
        }

        for (controller, actor) in self.controllers.iter_mut().zip(&mut self.actors) {
            for edge in actor.advance_script(now) {
                match edge {
                    JumpEdge::Press => actor
                        .motion
                        .jump_pressed(&actor.settings, controller.collisions()),
                    JumpEdge::Release => actor.motion.jump_released(&actor.settings),
                }
                debug!(actor = %actor.name, ?edge, now, "jump input");
            }

            actor.motion.set_input(actor.input);
            let displacement = actor
                .motion
                .step(&actor.settings, controller.collisions(), dt);
            controller.move_by(
                &mut self.world,
                MoveRequest::new(displacement, now).with_input(actor.input),
            );
            actor.motion.after_move(controller.collisions());
        }

        if let Some(tracked) = &mut self.camera {
            let controller = &self.controllers[tracked.target];
            if let Some(bounds) = self.world.bounds(controller.body()) {
                let position = tracked.camera.update(&bounds, controller.input(), dt);
                debug!(x = position.x, y = position.y, "camera");
            }
        }

        self.tick += 1;
    }

    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    #[cfg(test)]
    pub fn character_position(&self, name: &str) -> Option<Vec2> {
        let index = self.actors.iter().position(|a| a.name == name)?;
        self.world.position(self.controllers[index].body())
    }

    #[cfg(test)]
    pub fn character_controller(&self, name: &str) -> Option<&CharacterController> {
        let index = self.actors.iter().position(|a| a.name == name)?;
        self.controllers.get(index)
    }

    pub fn log_summary(&self) {
        info!(ticks = self.tick, time = self.now(), "simulation finished");

        for (controller, actor) in self.controllers.iter().zip(&self.actors) {
            let Some(position) = self.world.position(controller.body()) else {
                continue;
            };
            let c = controller.collisions();
            info!(
                character = %actor.name,
                x = position.x,
                y = position.y,
                top = c.top,
                bottom = c.bottom,
                left = c.left,
                right = c.right,
                slope = c.slope_angle,
                "character"
            );
        }

        for entry in &self.platforms {
            if let Some(position) = self.world.position(entry.platform.body()) {
                info!(platform = %entry.name, x = position.x, y = position.y, "platform");
            }
        }

        if let Some(tracked) = &self.camera {
            let position = tracked.camera.position();
            info!(
                character = %self.actors[tracked.target].name,
                x = position.x,
                y = position.y,
                look_ahead = tracked.camera.look_ahead(),
                "camera"
            );
        }
    }
}
