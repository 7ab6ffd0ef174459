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
use vesper_core::error::{ensure_finite, ensure_non_negative};
use vesper_core::math::Vec2;
use vesper_core::physics::LayerMask;
use vesper_core::SetupError;

use super::{RaycastConfig, ACTOR_LAYER};

/// Path and passenger settings of a moving platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Ray layout used by the passenger scan.
    pub raycast: RaycastConfig,
    /// Layers whose colliders can ride the platform.
    pub passenger_mask: LayerMask,
    /// Waypoints relative to the platform's starting position.
    pub local_waypoints: Vec<Vec2>,
    /// Travel speed in units per second.
    pub speed: f32,
    /// Loop back to the first waypoint instead of ping-ponging.
    pub cyclic: bool,
    /// Pause, in seconds, after arriving at each waypoint.
    pub wait_time: f32,
    /// Easing exponent offset in `[0, 2]`; `0` is linear.
    pub ease_amount: f32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            raycast: RaycastConfig::default(),
            passenger_mask: LayerMask::layer(ACTOR_LAYER),
            local_waypoints: Vec::new(),
            speed: 2.0,
            cyclic: false,
            wait_time: 0.0,
            ease_amount: 0.0,
        }
    }
}

impl PlatformConfig {
    /// Checks the settings for a platform collider of `size`.
    pub fn validate(&self, size: Vec2) -> Result<(), SetupError> {
        self.raycast.validate(size)?;
        ensure_non_negative("speed", self.speed)?;
        ensure_non_negative("wait_time", self.wait_time)?;
        ensure_finite("ease_amount", self.ease_amount)?;
        if !(0.0..=2.0).contains(&self.ease_amount) {
            return Err(SetupError::EaseOutOfRange(self.ease_amount));
        }
        if self.local_waypoints.iter().any(|w| !w.is_finite()) {
            return Err(SetupError::NonFinite {
                field: "local_waypoints",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ranges() {
        let size = Vec2::new(3.0, 0.5);
        assert!(PlatformConfig::default().validate(size).is_ok());

        let config = PlatformConfig {
            ease_amount: 2.5,
            ..Default::default()
        };
        assert_eq!(config.validate(size), Err(SetupError::EaseOutOfRange(2.5)));

        let config = PlatformConfig {
            speed: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(size),
            Err(SetupError::Negative { field: "speed", .. })
        ));

        let config = PlatformConfig {
            local_waypoints: vec![Vec2::ZERO, Vec2::new(f32::INFINITY, 0.0)],
            ..Default::default()
        };
        assert!(config.validate(size).is_err());
    }
}
