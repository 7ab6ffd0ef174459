// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::{Deserialize, Serialize};
use std::path::Path;
use vesper_core::error::ensure_finite;
use vesper_core::math::Vec2;
use vesper_core::physics::{ColliderShape, LayerMask};
use vesper_core::SetupError;

use super::{ControllerConfig, MotorConfig, PlatformConfig, ACTOR_LAYER, GROUND_LAYER};
use crate::components::BoxBody;
use crate::error::ConfigError;

/// Shape of a piece of static level geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeConfig {
    /// Axis-aligned box of the given full size.
    Box {
        /// Width and height.
        size: Vec2,
    },
    /// Convex polygon with vertices relative to the geometry position.
    Polygon {
        /// Vertices in either winding order.
        vertices: Vec<Vec2>,
    },
}

impl ShapeConfig {
    /// Builds and validates the collider shape.
    pub fn to_shape(&self) -> Result<ColliderShape, SetupError> {
        match self {
            Self::Box { size } => {
                let shape = ColliderShape::cuboid(*size);
                shape.validate()?;
                Ok(shape)
            }
            Self::Polygon { vertices } => ColliderShape::polygon(vertices.clone()),
        }
    }
}

/// A static collider: ground, walls, slopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticGeometryConfig {
    /// World position of the shape origin.
    pub position: Vec2,
    /// Collider shape.
    pub shape: ShapeConfig,
    /// Collision layer index.
    #[serde(default = "default_ground_layer")]
    pub layer: u32,
}

/// An actor driven by a kinematic controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Label used in logs.
    #[serde(default)]
    pub name: String,
    /// Starting position of the collider center.
    pub position: Vec2,
    /// Collider size.
    pub size: Vec2,
    /// Controller tuning.
    #[serde(default)]
    pub controller: ControllerConfig,
    /// Player motor; actors without one only move when carried.
    #[serde(default)]
    pub motor: Option<MotorConfig>,
    /// Collision layer index.
    #[serde(default = "default_actor_layer")]
    pub layer: u32,
}

impl ActorConfig {
    /// The actor's box body at its starting position.
    pub fn body(&self) -> BoxBody {
        BoxBody::new(self.position, self.size)
    }
}

/// A moving platform placed in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpawnConfig {
    /// Label used in logs.
    #[serde(default)]
    pub name: String,
    /// Starting position of the collider center.
    pub position: Vec2,
    /// Collider size.
    pub size: Vec2,
    /// Path and passenger settings.
    #[serde(default)]
    pub platform: PlatformConfig,
    /// Collision layer index.
    #[serde(default = "default_ground_layer")]
    pub layer: u32,
}

impl PlatformSpawnConfig {
    /// The platform's box body at its starting position.
    pub fn body(&self) -> BoxBody {
        BoxBody::new(self.position, self.size)
    }
}

/// Everything needed to build a world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Vertical gravity in units per second squared (negative is down).
    pub gravity: f32,
    /// Static colliders.
    pub geometry: Vec<StaticGeometryConfig>,
    /// Controller-driven actors.
    pub actors: Vec<ActorConfig>,
    /// Moving platforms.
    pub platforms: Vec<PlatformSpawnConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            gravity: -50.0,
            geometry: Vec::new(),
            actors: Vec::new(),
            platforms: Vec::new(),
        }
    }
}

fn default_ground_layer() -> u32 {
    GROUND_LAYER
}

fn default_actor_layer() -> u32 {
    ACTOR_LAYER
}

fn validate_layer(layer: u32) -> Result<(), SetupError> {
    if layer >= 32 {
        return Err(SetupError::InvalidLayer(layer));
    }
    Ok(())
}

impl SceneConfig {
    /// Load a scene from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a scene from a RON string.
    pub fn from_ron(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    /// Load a scene from a `.json` or `.ron` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("ron") => Self::from_ron(&content),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    /// Serialize the scene as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize the scene as pretty-printed RON.
    pub fn to_ron_pretty(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Save the scene to a JSON file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Checks the whole scene before anything is built from it.
    pub fn validate(&self) -> Result<(), SetupError> {
        ensure_finite("gravity", self.gravity)?;

        for geometry in &self.geometry {
            if !geometry.position.is_finite() {
                return Err(SetupError::NonFinite { field: "position" });
            }
            validate_layer(geometry.layer)?;
            geometry.shape.to_shape()?;
        }

        for actor in &self.actors {
            actor.body().validate()?;
            actor.controller.validate(actor.size)?;
            validate_layer(actor.layer)?;
            if actor.controller.collision_mask.intersects(LayerMask::layer(actor.layer)) {
                return Err(SetupError::SelfCollidingActor(actor.layer));
            }
            if let Some(motor) = &actor.motor {
                motor.validate()?;
            }
        }

        for platform in &self.platforms {
            platform.body().validate()?;
            platform.platform.validate(platform.size)?;
            validate_layer(platform.layer)?;
            if platform.platform.passenger_mask.intersects(LayerMask::layer(platform.layer)) {
                return Err(SetupError::SelfCarryingPlatform(platform.layer));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE_JSON: &str = r#"{
        "gravity": -30.0,
        "geometry": [
            { "position": { "x": 0.0, "y": -0.5 }, "shape": { "box": { "size": { "x": 40.0, "y": 1.0 } } } },
            {
                "position": { "x": 5.0, "y": 0.0 },
                "shape": { "polygon": { "vertices": [
                    { "x": 0.0, "y": 0.0 }, { "x": 4.0, "y": 0.0 }, { "x": 4.0, "y": 2.0 }
                ] } }
            }
        ],
        "actors": [
            { "name": "player", "position": { "x": 0.0, "y": 1.0 }, "size": { "x": 1.0, "y": 2.0 }, "motor": {} }
        ],
        "platforms": [
            {
                "position": { "x": -5.0, "y": 2.0 },
                "size": { "x": 3.0, "y": 0.5 },
                "platform": { "local_waypoints": [ { "x": 0.0, "y": 0.0 }, { "x": 0.0, "y": 4.0 } ], "speed": 3.0 }
            }
        ]
    }"#;

    #[test]
    fn test_scene_from_json_fills_defaults() {
        let scene = SceneConfig::from_json(SCENE_JSON).unwrap();
        assert_eq!(scene.gravity, -30.0);
        assert_eq!(scene.geometry.len(), 2);
        assert_eq!(scene.geometry[0].layer, GROUND_LAYER);

        let player = &scene.actors[0];
        assert_eq!(player.layer, ACTOR_LAYER);
        assert_eq!(player.controller, ControllerConfig::default());
        assert_eq!(player.motor, Some(MotorConfig::default()));

        let platform = &scene.platforms[0].platform;
        assert_eq!(platform.speed, 3.0);
        assert!(!platform.cyclic);
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn test_scene_json_round_trip() {
        let scene = SceneConfig::from_json(SCENE_JSON).unwrap();
        let json = scene.to_json_pretty().unwrap();
        assert_eq!(SceneConfig::from_json(&json).unwrap(), scene);
    }

    #[test]
    fn test_scene_from_ron() {
        let source = r#"(
            gravity: -20.0,
            geometry: [
                (position: (x: 0.0, y: 0.0), shape: box(size: (x: 10.0, y: 1.0))),
            ],
        )"#;
        let scene = SceneConfig::from_ron(source).unwrap();
        assert_eq!(scene.gravity, -20.0);
        assert_eq!(
            scene.geometry[0].shape,
            ShapeConfig::Box {
                size: Vec2::new(10.0, 1.0)
            }
        );
        assert!(scene.actors.is_empty());
    }

    #[test]
    fn test_validate_reports_first_problem() {
        let mut scene = SceneConfig::from_json(SCENE_JSON).unwrap();
        scene.platforms[0].platform.ease_amount = 5.0;
        assert_eq!(scene.validate(), Err(SetupError::EaseOutOfRange(5.0)));

        let mut scene = SceneConfig::from_json(SCENE_JSON).unwrap();
        scene.geometry[1].shape = ShapeConfig::Polygon {
            vertices: vec![Vec2::ZERO, Vec2::X],
        };
        assert!(matches!(
            scene.validate(),
            Err(SetupError::DegeneratePolygon { vertex_count: 2 })
        ));
    }

    #[test]
    fn test_validate_rejects_self_colliding_actor() {
        let mut scene = SceneConfig::from_json(SCENE_JSON).unwrap();
        scene.actors[0].controller.collision_mask = LayerMask::ALL;
        assert_eq!(
            scene.validate(),
            Err(SetupError::SelfCollidingActor(ACTOR_LAYER))
        );
    }

    #[test]
    fn test_validate_rejects_platform_carrying_its_own_layer() {
        let mut scene = SceneConfig::from_json(SCENE_JSON).unwrap();
        // Default passenger mask is the actor layer.
        scene.platforms[0].layer = ACTOR_LAYER;
        assert_eq!(
            scene.validate(),
            Err(SetupError::SelfCarryingPlatform(ACTOR_LAYER))
        );
    }

    #[test]
    fn test_from_file_rejects_unknown_extension() {
        let path = std::env::temp_dir().join("vesper_scene_test.yaml");
        std::fs::write(&path, "gravity: 1").unwrap();
        let result = SceneConfig::from_file(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"));
    }

    #[test]
    fn test_to_file_and_back() {
        let scene = SceneConfig::from_json(SCENE_JSON).unwrap();
        let path = std::env::temp_dir().join("vesper_scene_round_trip.json");
        scene.to_file(&path).unwrap();
        let loaded = SceneConfig::from_file(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.unwrap(), scene);
    }
}
