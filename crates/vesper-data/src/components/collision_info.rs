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
use vesper_core::math::Vec2;

/// Contact and slope state of an actor, rebuilt on every move.
///
/// Written only by the actor's own controller during a single `move_by` call
/// and read back by gameplay code afterwards (jump eligibility, wall slides).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionInfo {
    /// Touching something above.
    pub above: bool,
    /// Standing on something.
    pub below: bool,
    /// Touching a wall on the left.
    pub left: bool,
    /// Touching a wall on the right.
    pub right: bool,
    /// Walking up a slope this step.
    pub climbing_slope: bool,
    /// Walking down a slope this step.
    pub descending_slope: bool,
    /// Sliding down a slope steeper than the climb limit.
    pub sliding_down_max_slope: bool,
    /// Angle in degrees of the slope currently affecting the actor.
    pub slope_angle: f32,
    /// `slope_angle` as it was at the end of the previous step.
    pub slope_angle_old: f32,
    /// Normal of the slope currently affecting the actor.
    pub slope_normal: Vec2,
    /// Velocity requested for this step, before any slope correction.
    pub velocity_old: Vec2,
    /// Last non-zero horizontal direction, `1` or `-1`.
    pub face_direction: i8,
}

impl Default for CollisionInfo {
    fn default() -> Self {
        Self {
            above: false,
            below: false,
            left: false,
            right: false,
            climbing_slope: false,
            descending_slope: false,
            sliding_down_max_slope: false,
            slope_angle: 0.0,
            slope_angle_old: 0.0,
            slope_normal: Vec2::ZERO,
            velocity_old: Vec2::ZERO,
            face_direction: 1,
        }
    }
}

impl CollisionInfo {
    /// Clears every contact and slope flag.
    ///
    /// The current slope angle moves into `slope_angle_old` so the next
    /// horizontal sweep can tell a new slope from the one already being climbed.
    /// `face_direction` and `velocity_old` are left alone.
    pub fn reset(&mut self) {
        self.above = false;
        self.below = false;
        self.left = false;
        self.right = false;
        self.climbing_slope = false;
        self.descending_slope = false;
        self.sliding_down_max_slope = false;
        self.slope_angle_old = self.slope_angle;
        self.slope_normal = Vec2::ZERO;
        self.slope_angle = 0.0;
    }

    /// `true` when touching something above or below.
    #[inline]
    pub fn vertical_contact(&self) -> bool {
        self.above || self.below
    }

    /// Direction of the wall being touched: `-1` left, `1` right.
    #[inline]
    pub fn wall_direction(&self) -> Option<i8> {
        if self.left {
            Some(-1)
        } else if self.right {
            Some(1)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_faces_right() {
        let info = CollisionInfo::default();
        assert_eq!(info.face_direction, 1);
        assert!(!info.below);
        assert_eq!(info.wall_direction(), None);
    }

    #[test]
    fn test_reset_carries_slope_angle_forward() {
        let mut info = CollisionInfo {
            above: true,
            below: true,
            left: true,
            climbing_slope: true,
            descending_slope: true,
            sliding_down_max_slope: true,
            slope_angle: 30.0,
            slope_angle_old: 10.0,
            slope_normal: Vec2::new(0.5, 0.866),
            velocity_old: Vec2::new(1.0, 2.0),
            face_direction: -1,
            ..Default::default()
        };

        info.reset();

        assert!(!info.above && !info.below && !info.left && !info.right);
        assert!(!info.climbing_slope && !info.descending_slope && !info.sliding_down_max_slope);
        assert_eq!(info.slope_angle_old, 30.0);
        assert_eq!(info.slope_angle, 0.0);
        assert_eq!(info.slope_normal, Vec2::ZERO);
        assert_eq!(info.face_direction, -1);
        assert_eq!(info.velocity_old, Vec2::new(1.0, 2.0));

        info.reset();
        assert_eq!(info.slope_angle_old, 0.0);
    }

    #[test]
    fn test_wall_direction() {
        let info = CollisionInfo {
            right: true,
            ..Default::default()
        };
        assert_eq!(info.wall_direction(), Some(1));
        assert!(!info.vertical_contact());
    }
}
