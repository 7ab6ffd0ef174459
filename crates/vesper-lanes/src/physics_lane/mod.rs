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

//! Physics Lane
//!
//! Raycast-driven kinematic movement. Nothing here integrates forces: every
//! step sweeps rays against a [`vesper_core::physics::SpatialQuery`] and
//! clamps the requested displacement to what is free.

mod controller;
mod platform_controller;
mod player_motor;
mod raycast_controller;

pub use controller::Controller2D;
pub use platform_controller::PlatformController2D;
pub use player_motor::{MotorInput, PlayerMotor};
pub use raycast_controller::RaycastController;
