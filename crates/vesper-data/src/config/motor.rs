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
use vesper_core::error::ensure_non_negative;
use vesper_core::math::Vec2;
use vesper_core::SetupError;

/// Per-axis velocity caps. `None` leaves an axis unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedLimit {
    /// Largest horizontal speed, in units per second.
    pub max_x: Option<f32>,
    /// Largest vertical speed, in units per second.
    pub max_y: Option<f32>,
}

impl SpeedLimit {
    /// Clamps each limited component of `velocity` to `[-max, max]`.
    pub fn apply(&self, velocity: Vec2) -> Vec2 {
        let limit = |value: f32, max: Option<f32>| match max {
            Some(max) => value.clamp(-max, max),
            None => value,
        };
        Vec2::new(limit(velocity.x, self.max_x), limit(velocity.y, self.max_y))
    }
}

/// Tuning of the player motor that turns input into controller moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorConfig {
    /// Target horizontal speed at full input.
    pub move_speed: f32,
    /// Fastest fall while sliding down a wall.
    pub wall_slide_speed: f32,
    /// How long input away from a wall is ignored before letting go.
    pub wall_stick_time: f32,
    /// Wall jump impulse when pushing towards the wall.
    pub wall_jump_climb: Vec2,
    /// Wall jump impulse with no horizontal input.
    pub wall_jump_off: Vec2,
    /// Wall jump impulse when pushing away from the wall.
    pub wall_leap: Vec2,
    /// Horizontal smoothing time while airborne.
    pub acceleration_time_airborne: f32,
    /// Horizontal smoothing time while grounded.
    pub acceleration_time_grounded: f32,
    /// Apex height of a jump, in units.
    pub jump_height: f32,
    /// Gravity multiplier while falling.
    pub fall_gravity_scale: f32,
    /// Gravity multiplier otherwise.
    pub normal_gravity_scale: f32,
    /// Grace period after leaving the ground during which a jump still counts.
    pub coyote_time: f32,
    /// How long a mid-air jump press is remembered until landing.
    pub jump_buffer_time: f32,
    /// Optional velocity caps.
    pub speed_limit: SpeedLimit,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            move_speed: 10.0,
            wall_slide_speed: 2.0,
            wall_stick_time: 0.25,
            wall_jump_climb: Vec2::new(7.5, 16.0),
            wall_jump_off: Vec2::new(8.5, 7.0),
            wall_leap: Vec2::new(18.0, 17.0),
            acceleration_time_airborne: 0.1,
            acceleration_time_grounded: 0.05,
            jump_height: 4.0,
            fall_gravity_scale: 1.5,
            normal_gravity_scale: 1.0,
            coyote_time: 0.09,
            jump_buffer_time: 0.09,
            speed_limit: SpeedLimit::default(),
        }
    }
}

impl MotorConfig {
    /// Rejects negative or non-finite tuning values.
    pub fn validate(&self) -> Result<(), SetupError> {
        let scalars = [
            ("move_speed", self.move_speed),
            ("wall_slide_speed", self.wall_slide_speed),
            ("wall_stick_time", self.wall_stick_time),
            ("acceleration_time_airborne", self.acceleration_time_airborne),
            ("acceleration_time_grounded", self.acceleration_time_grounded),
            ("jump_height", self.jump_height),
            ("fall_gravity_scale", self.fall_gravity_scale),
            ("normal_gravity_scale", self.normal_gravity_scale),
            ("coyote_time", self.coyote_time),
            ("jump_buffer_time", self.jump_buffer_time),
        ];
        for (field, value) in scalars {
            ensure_non_negative(field, value)?;
        }
        for (field, impulse) in [
            ("wall_jump_climb", self.wall_jump_climb),
            ("wall_jump_off", self.wall_jump_off),
            ("wall_leap", self.wall_leap),
        ] {
            if !impulse.is_finite() {
                return Err(SetupError::NonFinite { field });
            }
        }
        if let Some(max) = self.speed_limit.max_x {
            ensure_non_negative("speed_limit.max_x", max)?;
        }
        if let Some(max) = self.speed_limit.max_y {
            ensure_non_negative("speed_limit.max_y", max)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_limit_clamps_limited_axes_only() {
        let limit = SpeedLimit {
            max_x: Some(5.0),
            max_y: None,
        };
        assert_eq!(limit.apply(Vec2::new(-9.0, -40.0)), Vec2::new(-5.0, -40.0));
        assert_eq!(limit.apply(Vec2::new(3.0, 1.0)), Vec2::new(3.0, 1.0));
    }

    #[test]
    fn test_validate_rejects_negative_values() {
        assert!(MotorConfig::default().validate().is_ok());
        let config = MotorConfig {
            jump_height: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SetupError::Negative { field: "jump_height", .. })
        ));
    }
}
