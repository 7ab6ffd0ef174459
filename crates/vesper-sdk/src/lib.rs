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

//! The public-facing SDK for Vesper.
//!
//! [`GameWorld`] is the single entry point games use: build it from a
//! [`SceneConfig`](vesper_data::config::SceneConfig), feed it inputs and call
//! [`GameWorld::tick`] once per frame.

#![warn(missing_docs)]

mod game_world;

pub use game_world::{Actor, GameWorld, MovingPlatform, PlatformId};

/// Commonly used types, re-exported for convenience.
pub mod prelude {
    pub use crate::{Actor, GameWorld, MovingPlatform, PlatformId};
    pub use vesper_core::math::{Aabb, Vec2};
    pub use vesper_core::physics::{ActorId, ColliderShape, LayerMask};
    pub use vesper_core::SetupError;
    pub use vesper_data::components::CollisionInfo;
    pub use vesper_data::config::{
        ActorConfig, ControllerConfig, MotorConfig, PlatformConfig, PlatformSpawnConfig,
        RaycastConfig, SceneConfig, ShapeConfig, StaticGeometryConfig, ACTOR_LAYER, GROUND_LAYER,
    };
    pub use vesper_lanes::MotorInput;
}
