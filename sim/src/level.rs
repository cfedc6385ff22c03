//! Level description loaded from JSON.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use kinematic::{
    BodyDef, CameraSettings, ControllerSettings, Layer, MotionSettings, PlatformSettings, Point2,
    Vec2,
};
use serde::Deserialize;

const DEMO_LEVEL: &str = include_str!("../levels/demo.json");

#[derive(Debug, Deserialize)]
pub struct Level {
    #[serde(default)]
    pub solids: Vec<SolidDef>,
    #[serde(default)]
    pub platforms: Vec<PlatformDef>,
    #[serde(default)]
    pub characters: Vec<CharacterDef>,
    #[serde(default)]
    pub camera: Option<CameraDef>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeDef {
    Box { half_extents: Vec2 },
    Triangle { points: [Point2; 3] },
    Polygon { points: Vec<Point2> },
}

#[derive(Debug, Deserialize)]
pub struct SolidDef {
    pub shape: ShapeDef,
    #[serde(default = "zero")]
    pub position: Vec2,
    #[serde(default)]
    pub one_way: bool,
}

#[derive(Debug, Deserialize)]
pub struct PlatformDef {
    #[serde(default)]
    pub name: String,
    pub half_extents: Vec2,
    pub position: Vec2,
    /// Relative to `position`.
    pub waypoints: Vec<Vec2>,
    #[serde(default)]
    pub settings: PlatformSettings,
}

#[derive(Debug, Deserialize)]
pub struct CharacterDef {
    pub name: String,
    pub half_extents: Vec2,
    pub spawn: Vec2,
    #[serde(default)]
    pub controller: ControllerSettings,
    #[serde(default)]
    pub motion: MotionSettings,
    #[serde(default)]
    pub script: Vec<InputKey>,
}

/// Camera following one character by name.
#[derive(Debug, Deserialize)]
pub struct CameraDef {
    pub target: String,
    #[serde(default)]
    pub settings: CameraSettings,
}

/// Input held from `from` seconds until the next key.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct InputKey {
    pub from: f32,
    #[serde(default = "zero")]
    pub input: Vec2,
    #[serde(default)]
    pub jump: Option<JumpEdge>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpEdge {
    Press,
    Release,
}

fn zero() -> Vec2 {
    Vec2::zeros()
}

impl Level {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read level {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid level {}", path.display()))
    }

    pub fn demo() -> Result<Self> {
        Self::parse(DEMO_LEVEL).context("built-in demo level")
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut level: Level = serde_json::from_str(text)?;
        for character in &mut level.characters {
            character.script.sort_by(|a, b| a.from.total_cmp(&b.from));
        }
        Ok(level)
    }
}

impl SolidDef {
    pub fn body_def(&self) -> Result<BodyDef> {
        let def = match &self.shape {
            ShapeDef::Box { half_extents } => BodyDef::cuboid(half_extents.x, half_extents.y),
            ShapeDef::Triangle { points } => BodyDef::triangle(points[0], points[1], points[2]),
            ShapeDef::Polygon { points } => BodyDef::convex_polygon(points)?,
        };
        let def = def.at(self.position.x, self.position.y);

        Ok(if self.one_way {
            def.layer(Layer::Platforms).one_way()
        } else {
            def
        })
    }
}

impl PlatformDef {
    pub fn body_def(&self) -> BodyDef {
        BodyDef::cuboid(self.half_extents.x, self.half_extents.y)
            .at(self.position.x, self.position.y)
            .layer(Layer::Platforms)
    }
}

impl CharacterDef {
    pub fn body_def(&self) -> BodyDef {
        BodyDef::cuboid(self.half_extents.x, self.half_extents.y)
            .at(self.spawn.x, self.spawn.y)
            .layer(Layer::Characters)
    }
}
