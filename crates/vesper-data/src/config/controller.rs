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
use vesper_core::error::ensure_finite;
use vesper_core::math::Vec2;
use vesper_core::physics::LayerMask;
use vesper_core::SetupError;

use super::GROUND_LAYER;

/// Ray layout shared by actors and platforms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaycastConfig {
    /// How far inside the collider ray origins sit.
    pub skin_width: f32,
    /// Target gap between parallel rays.
    pub distance_between_rays: f32,
}

impl Default for RaycastConfig {
    fn default() -> Self {
        Self {
            skin_width: 0.015,
            distance_between_rays: 0.25,
        }
    }
}

impl RaycastConfig {
    /// Checks the layout against a collider of `size`.
    ///
    /// The inset box must keep a positive extent on both axes.
    pub fn validate(&self, size: Vec2) -> Result<(), SetupError> {
        ensure_finite("skin_width", self.skin_width)?;
        ensure_finite("distance_between_rays", self.distance_between_rays)?;

        if self.skin_width <= 0.0 || 2.0 * self.skin_width >= size.x.min(size.y) {
            return Err(SetupError::InvalidSkinWidth {
                skin_width: self.skin_width,
                width: size.x,
                height: size.y,
            });
        }
        if self.distance_between_rays <= 0.0 {
            return Err(SetupError::InvalidRaySpacing(self.distance_between_rays));
        }
        Ok(())
    }
}

/// Tuning of an actor's kinematic controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Ray layout.
    pub raycast: RaycastConfig,
    /// Steepest slope, in degrees, the actor can walk up.
    pub max_slope_angle: f32,
    /// Layers the actor collides with.
    pub collision_mask: LayerMask,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            raycast: RaycastConfig::default(),
            max_slope_angle: 80.0,
            collision_mask: LayerMask::layer(GROUND_LAYER),
        }
    }
}

impl ControllerConfig {
    /// Checks the tuning against an actor collider of `size`.
    pub fn validate(&self, size: Vec2) -> Result<(), SetupError> {
        self.raycast.validate(size)?;
        ensure_finite("max_slope_angle", self.max_slope_angle)?;
        if self.max_slope_angle <= 0.0 || self.max_slope_angle >= 90.0 {
            return Err(SetupError::InvalidSlopeAngle(self.max_slope_angle));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning() {
        let config = ControllerConfig::default();
        assert_eq!(config.raycast.skin_width, 0.015);
        assert_eq!(config.raycast.distance_between_rays, 0.25);
        assert_eq!(config.max_slope_angle, 80.0);
        assert!(config.validate(Vec2::new(1.0, 2.0)).is_ok());
    }

    #[test]
    fn test_skin_width_must_fit_collider() {
        let config = ControllerConfig {
            raycast: RaycastConfig {
                skin_width: 0.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(Vec2::new(1.0, 2.0)),
            Err(SetupError::InvalidSkinWidth { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_spacing_and_angle() {
        let mut config = ControllerConfig::default();
        config.raycast.distance_between_rays = 0.0;
        assert_eq!(
            config.validate(Vec2::ONE),
            Err(SetupError::InvalidRaySpacing(0.0))
        );

        let config = ControllerConfig {
            max_slope_angle: 90.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(Vec2::ONE),
            Err(SetupError::InvalidSlopeAngle(90.0))
        );
    }
}
