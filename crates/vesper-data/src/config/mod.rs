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

//! Serde configuration for controllers, platforms, motors and whole scenes.
//!
//! Every struct has a tuned `Default`, and every field may be omitted from a
//! config file.

mod controller;
mod motor;
mod platform;
mod scene;

pub use controller::{ControllerConfig, RaycastConfig};
pub use motor::{MotorConfig, SpeedLimit};
pub use platform::PlatformConfig;
pub use scene::{ActorConfig, PlatformSpawnConfig, SceneConfig, ShapeConfig, StaticGeometryConfig};

/// Layer used by level geometry and platforms.
pub const GROUND_LAYER: u32 = 0;
/// Layer used by actor colliders.
pub const ACTOR_LAYER: u32 = 1;
