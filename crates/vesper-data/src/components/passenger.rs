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

use vesper_core::math::Vec2;
use vesper_core::physics::ActorId;

/// One actor a platform must carry this step.
///
/// Built fresh by every platform scan and discarded after the passengers have
/// been moved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassengerMovement {
    /// The actor to move.
    pub actor: ActorId,
    /// Displacement to hand to the actor's controller.
    pub velocity: Vec2,
    /// The actor rides on top and counts as grounded.
    pub standing_on_platform: bool,
    /// Move the actor before the platform translates instead of after.
    pub move_before_platform: bool,
}

impl PassengerMovement {
    /// Creates a passenger movement record.
    pub fn new(
        actor: ActorId,
        velocity: Vec2,
        standing_on_platform: bool,
        move_before_platform: bool,
    ) -> Self {
        Self {
            actor,
            velocity,
            standing_on_platform,
            move_before_platform,
        }
    }
}
