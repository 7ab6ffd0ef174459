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
use vesper_core::math::{Aabb, Vec2};
use vesper_core::physics::Body;
use vesper_core::SetupError;

/// An actor represented by a single axis-aligned box collider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxBody {
    /// World position of the body's origin.
    pub position: Vec2,
    /// Full width and height of the collider.
    pub size: Vec2,
    /// Collider center relative to `position`.
    #[serde(default)]
    pub offset: Vec2,
}

impl BoxBody {
    /// Box of `size` centered on `position`.
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            offset: Vec2::ZERO,
        }
    }

    /// Returns the body with its collider shifted by `offset`.
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Rejects empty or non-finite boxes.
    pub fn validate(&self) -> Result<(), SetupError> {
        if !self.position.is_finite() || !self.offset.is_finite() {
            return Err(SetupError::NonFinite { field: "position" });
        }
        if !self.size.is_finite() || self.size.x <= 0.0 || self.size.y <= 0.0 {
            return Err(SetupError::DegenerateCollider {
                width: self.size.x,
                height: self.size.y,
            });
        }
        Ok(())
    }
}

impl Body for BoxBody {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(self.position + self.offset, self.size * 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_follow_position_and_offset() {
        let mut body = BoxBody::new(Vec2::new(1.0, 1.0), Vec2::new(2.0, 4.0));
        assert_eq!(body.bounds().min, Vec2::new(0.0, -1.0));

        body.translate(Vec2::new(1.0, 0.0));
        assert_eq!(body.position(), Vec2::new(2.0, 1.0));

        let shifted = body.with_offset(Vec2::new(0.0, 2.0));
        assert_eq!(shifted.bounds().min, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_validate() {
        assert!(BoxBody::new(Vec2::ZERO, Vec2::ONE).validate().is_ok());
        assert!(matches!(
            BoxBody::new(Vec2::ZERO, Vec2::new(1.0, 0.0)).validate(),
            Err(SetupError::DegenerateCollider { .. })
        ));
        assert!(BoxBody::new(Vec2::new(f32::NAN, 0.0), Vec2::ONE).validate().is_err());
    }
}
