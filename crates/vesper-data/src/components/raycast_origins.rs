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

/// Smallest number of parallel rays cast along any edge.
pub const MIN_RAY_COUNT: usize = 2;

/// The four corners rays are fired from, already inset by the skin width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RaycastOrigins {
    /// Top-left corner.
    pub top_left: Vec2,
    /// Top-right corner.
    pub top_right: Vec2,
    /// Bottom-left corner.
    pub bottom_left: Vec2,
    /// Bottom-right corner.
    pub bottom_right: Vec2,
}

impl RaycastOrigins {
    /// Corners of an already-inset box.
    pub fn from_inset_bounds(bounds: &Aabb) -> Self {
        Self {
            top_left: Vec2::new(bounds.min.x, bounds.max.y),
            top_right: bounds.max,
            bottom_left: bounds.min,
            bottom_right: Vec2::new(bounds.max.x, bounds.min.y),
        }
    }
}

/// How many parallel rays to cast along each edge and how far apart they are.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaySpacing {
    /// Rays fired sideways, stacked along the box height.
    pub horizontal_ray_count: usize,
    /// Rays fired up or down, spread along the box width.
    pub vertical_ray_count: usize,
    /// Vertical distance between horizontal rays.
    pub horizontal_ray_spacing: f32,
    /// Horizontal distance between vertical rays.
    pub vertical_ray_spacing: f32,
}

impl Default for RaySpacing {
    fn default() -> Self {
        Self {
            horizontal_ray_count: MIN_RAY_COUNT,
            vertical_ray_count: MIN_RAY_COUNT,
            horizontal_ray_spacing: 0.0,
            vertical_ray_spacing: 0.0,
        }
    }
}

impl RaySpacing {
    /// Derives counts and spacing from an inset box.
    ///
    /// Counts round half to even and never drop below [`MIN_RAY_COUNT`], so
    /// both edge rays always fire and the spacing never divides by zero.
    pub fn from_inset_bounds(bounds: &Aabb, distance_between_rays: f32) -> Self {
        let size = bounds.size();
        let horizontal_ray_count = ray_count(size.y, distance_between_rays);
        let vertical_ray_count = ray_count(size.x, distance_between_rays);

        Self {
            horizontal_ray_count,
            vertical_ray_count,
            horizontal_ray_spacing: size.y / (horizontal_ray_count - 1) as f32,
            vertical_ray_spacing: size.x / (vertical_ray_count - 1) as f32,
        }
    }
}

fn ray_count(extent: f32, distance_between_rays: f32) -> usize {
    let raw = (extent / distance_between_rays).round_ties_even();
    if !raw.is_finite() || raw < MIN_RAY_COUNT as f32 {
        if raw.is_finite() && raw >= 0.0 {
            log::warn!("Ray count {raw} for extent {extent} clamped to {MIN_RAY_COUNT}");
        }
        return MIN_RAY_COUNT;
    }
    raw as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_origins_from_bounds() {
        let bounds = Aabb::from_min_max(Vec2::new(-1.0, 0.0), Vec2::new(1.0, 2.0));
        let origins = RaycastOrigins::from_inset_bounds(&bounds);
        assert_eq!(origins.top_left, Vec2::new(-1.0, 2.0));
        assert_eq!(origins.top_right, Vec2::new(1.0, 2.0));
        assert_eq!(origins.bottom_left, Vec2::new(-1.0, 0.0));
        assert_eq!(origins.bottom_right, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_spacing_for_unit_box() {
        // A 1x2 actor inset by 0.015 on every side.
        let bounds = Aabb::from_min_max(Vec2::ZERO, Vec2::new(1.0, 2.0)).inflate(-0.015);
        let spacing = RaySpacing::from_inset_bounds(&bounds, 0.25);
        assert_eq!(spacing.vertical_ray_count, 4); // 0.97 / 0.25 = 3.88
        assert_eq!(spacing.horizontal_ray_count, 8); // 1.97 / 0.25 = 7.88
        assert_relative_eq!(spacing.vertical_ray_spacing, 0.97 / 3.0, epsilon = 1e-5);
        assert_relative_eq!(spacing.horizontal_ray_spacing, 1.97 / 7.0, epsilon = 1e-5);
    }

    #[test]
    fn test_tiny_box_clamps_to_two_rays() {
        let bounds = Aabb::from_min_max(Vec2::ZERO, Vec2::new(0.1, 0.1));
        let spacing = RaySpacing::from_inset_bounds(&bounds, 0.25);
        assert_eq!(spacing.horizontal_ray_count, 2);
        assert_eq!(spacing.vertical_ray_count, 2);
        assert_relative_eq!(spacing.vertical_ray_spacing, 0.1);
    }

    #[test]
    fn test_ray_count_rounds_half_to_even() {
        // 0.625 / 0.25 = 2.5 rounds down to 2, 0.875 / 0.25 = 3.5 rounds up to 4.
        assert_eq!(ray_count(0.625, 0.25), 2);
        assert_eq!(ray_count(0.875, 0.25), 4);
    }
}
