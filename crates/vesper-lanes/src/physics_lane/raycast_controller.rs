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

use vesper_core::math::{Aabb, Vec2, EPSILON};
use vesper_core::physics::LayerMask;
use vesper_core::SetupError;
use vesper_data::components::{RaySpacing, RaycastOrigins};
use vesper_data::config::RaycastConfig;

/// Ray layout for a box collider: inset corner origins plus ray spacing.
///
/// Shared by actor controllers and platforms. Origins are refreshed on every
/// step; spacing only when the collider's size changes.
#[derive(Debug, Clone)]
pub struct RaycastController {
    config: RaycastConfig,
    collision_mask: LayerMask,
    origins: RaycastOrigins,
    spacing: RaySpacing,
    spaced_size: Vec2,
}

impl RaycastController {
    /// Builds the layout for a collider currently covering `bounds`.
    pub fn new(
        config: RaycastConfig,
        collision_mask: LayerMask,
        bounds: &Aabb,
    ) -> Result<Self, SetupError> {
        config.validate(bounds.size())?;

        let mut controller = Self {
            config,
            collision_mask,
            origins: RaycastOrigins::default(),
            spacing: RaySpacing::default(),
            spaced_size: Vec2::ZERO,
        };
        controller.calculate_ray_spacing(bounds);
        controller.update_raycast_origins(bounds);
        Ok(controller)
    }

    /// The collider bounds shrunk by the skin width on every side.
    #[inline]
    pub fn inset_bounds(&self, bounds: &Aabb) -> Aabb {
        bounds.inflate(-self.config.skin_width)
    }

    /// Recomputes the four corner origins, and the spacing if the collider was resized.
    pub fn update_raycast_origins(&mut self, bounds: &Aabb) {
        let size = bounds.size();
        if (size.x - self.spaced_size.x).abs() > EPSILON
            || (size.y - self.spaced_size.y).abs() > EPSILON
        {
            self.calculate_ray_spacing(bounds);
        }
        self.origins = RaycastOrigins::from_inset_bounds(&self.inset_bounds(bounds));
    }

    /// Recomputes ray counts and spacing for `bounds`.
    pub fn calculate_ray_spacing(&mut self, bounds: &Aabb) {
        self.spacing =
            RaySpacing::from_inset_bounds(&self.inset_bounds(bounds), self.config.distance_between_rays);
        self.spaced_size = bounds.size();
        log::debug!(
            "Ray spacing for {}x{} collider: {} horizontal, {} vertical",
            self.spaced_size.x,
            self.spaced_size.y,
            self.spacing.horizontal_ray_count,
            self.spacing.vertical_ray_count
        );
    }

    /// Current corner origins.
    #[inline]
    pub fn origins(&self) -> &RaycastOrigins {
        &self.origins
    }

    /// Current ray counts and spacing.
    #[inline]
    pub fn spacing(&self) -> &RaySpacing {
        &self.spacing
    }

    /// Skin width.
    #[inline]
    pub fn skin_width(&self) -> f32 {
        self.config.skin_width
    }

    /// Layers the rays are tested against.
    #[inline]
    pub fn collision_mask(&self) -> LayerMask {
        self.collision_mask
    }

    /// The ray layout configuration.
    #[inline]
    pub fn config(&self) -> &RaycastConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bounds(size: Vec2) -> Aabb {
        Aabb::from_center_half_extents(Vec2::ZERO, size * 0.5)
    }

    #[test]
    fn test_origins_are_inset_by_skin() {
        let controller =
            RaycastController::new(RaycastConfig::default(), LayerMask::ALL, &bounds(Vec2::ONE))
                .unwrap();
        let origins = controller.origins();
        assert_relative_eq!(origins.bottom_left.x, -0.485, epsilon = 1e-6);
        assert_relative_eq!(origins.bottom_left.y, -0.485, epsilon = 1e-6);
        assert_relative_eq!(origins.top_right.x, 0.485, epsilon = 1e-6);
        assert_relative_eq!(origins.top_right.y, 0.485, epsilon = 1e-6);
    }

    #[test]
    fn test_resize_recomputes_spacing() {
        let mut controller =
            RaycastController::new(RaycastConfig::default(), LayerMask::ALL, &bounds(Vec2::ONE))
                .unwrap();
        assert_eq!(controller.spacing().horizontal_ray_count, 4);

        controller.update_raycast_origins(&bounds(Vec2::new(1.0, 3.0)));
        // 2.97 / 0.25 = 11.88
        assert_eq!(controller.spacing().horizontal_ray_count, 12);
        assert_eq!(controller.spacing().vertical_ray_count, 4);
    }

    #[test]
    fn test_rejects_skin_wider_than_collider() {
        let config = RaycastConfig {
            skin_width: 0.3,
            ..Default::default()
        };
        assert!(RaycastController::new(config, LayerMask::ALL, &bounds(Vec2::new(0.5, 2.0))).is_err());
    }
}
