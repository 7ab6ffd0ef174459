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

//! The raycast kinematic character controller.

use vesper_core::math::{degrees_to_radians, sign, Vec2};
use vesper_core::physics::{Body, RaycastHit, SpatialQuery};
use vesper_core::SetupError;
use vesper_data::components::{BoxBody, CollisionInfo};
use vesper_data::config::ControllerConfig;

use super::RaycastController;

/// Moves a box body through static geometry by sweeping rays from its edges.
///
/// Each call to [`move_by`](Self::move_by) takes the displacement the caller
/// wants for this step, shrinks it so the body never enters a collider, bends
/// it along climbable slopes, and applies it. The resulting contacts are kept
/// in [`collisions`](Self::collisions) until the next call.
#[derive(Debug, Clone)]
pub struct Controller2D<B: Body = BoxBody> {
    body: B,
    raycast: RaycastController,
    max_slope_angle: f32,
    collisions: CollisionInfo,
}

impl<B: Body> Controller2D<B> {
    /// Wraps `body` with the given tuning.
    pub fn new(body: B, config: ControllerConfig) -> Result<Self, SetupError> {
        let bounds = body.bounds();
        config.validate(bounds.size())?;
        let raycast = RaycastController::new(config.raycast, config.collision_mask, &bounds)?;

        Ok(Self {
            body,
            raycast,
            max_slope_angle: config.max_slope_angle,
            collisions: CollisionInfo::default(),
        })
    }

    /// The body being moved.
    #[inline]
    pub fn body(&self) -> &B {
        &self.body
    }

    /// Mutable access to the body, e.g. to teleport or resize it.
    #[inline]
    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    /// Contacts found by the last move.
    #[inline]
    pub fn collisions(&self) -> &CollisionInfo {
        &self.collisions
    }

    /// Steepest climbable slope in degrees.
    #[inline]
    pub fn max_slope_angle(&self) -> f32 {
        self.max_slope_angle
    }

    /// The ray layout used by this controller.
    #[inline]
    pub fn raycast(&self) -> &RaycastController {
        &self.raycast
    }

    /// Moves the body by at most `velocity` this step and returns the
    /// displacement actually applied.
    ///
    /// `standing_on_platform` is set by a platform carrying the body; it marks
    /// the body as grounded regardless of what the rays found.
    pub fn move_by<Q: SpatialQuery + ?Sized>(
        &mut self,
        world: &Q,
        velocity: Vec2,
        standing_on_platform: bool,
    ) -> Vec2 {
        let bounds = self.body.bounds();
        self.raycast.update_raycast_origins(&bounds);
        self.collisions.reset();
        self.collisions.velocity_old = velocity;

        let mut velocity = velocity;

        if velocity.y < 0.0 {
            self.descend_slope(world, &mut velocity);
        }

        if velocity.x != 0.0 {
            self.collisions.face_direction = if velocity.x > 0.0 { 1 } else { -1 };
        }

        self.horizontal_collisions(world, &mut velocity);

        if velocity.y != 0.0 {
            self.vertical_collisions(world, &mut velocity);
        } else {
            self.probe_ground(world, velocity);
        }

        self.body.translate(velocity);

        if standing_on_platform {
            self.collisions.below = true;
        }

        velocity
    }

    fn cast<Q: SpatialQuery + ?Sized>(
        &self,
        world: &Q,
        origin: Vec2,
        direction: Vec2,
        length: f32,
    ) -> Option<RaycastHit> {
        world.cast_ray(origin, direction, length, self.raycast.collision_mask())
    }

    fn horizontal_collisions<Q: SpatialQuery + ?Sized>(&mut self, world: &Q, velocity: &mut Vec2) {
        let direction_x = f32::from(self.collisions.face_direction);
        let skin_width = self.raycast.skin_width();
        let origins = *self.raycast.origins();
        let spacing = *self.raycast.spacing();

        let mut ray_length = velocity.x.abs() + skin_width;
        if velocity.x.abs() < skin_width {
            ray_length = 2.0 * skin_width;
        }

        for i in 0..spacing.horizontal_ray_count {
            let mut ray_origin = if direction_x == -1.0 {
                origins.bottom_left
            } else {
                origins.bottom_right
            };
            ray_origin.y += spacing.horizontal_ray_spacing * i as f32;

            let Some(hit) = self.cast(world, ray_origin, Vec2::X * direction_x, ray_length) else {
                continue;
            };
            // Starting inside a collider: leave it to the other rays.
            if hit.distance == 0.0 {
                continue;
            }

            let slope_angle = Vec2::angle_between(hit.normal, Vec2::Y);

            if i == 0 && slope_angle <= self.max_slope_angle {
                if self.collisions.descending_slope {
                    self.collisions.descending_slope = false;
                    *velocity = self.collisions.velocity_old;
                }

                let mut distance_to_slope_start = 0.0;
                if slope_angle != self.collisions.slope_angle_old {
                    log::debug!("Reached a {slope_angle:.1} degree slope");
                    distance_to_slope_start = hit.distance - skin_width;
                    velocity.x -= distance_to_slope_start * direction_x;
                }
                self.climb_slope(velocity, slope_angle, hit.normal);
                velocity.x += distance_to_slope_start * direction_x;
            }

            if !self.collisions.climbing_slope || slope_angle > self.max_slope_angle {
                if self.collisions.climbing_slope {
                    velocity.y =
                        degrees_to_radians(self.collisions.slope_angle).tan() * velocity.x.abs();
                }

                velocity.x = (hit.distance - skin_width) * direction_x;
                ray_length = hit.distance;

                self.collisions.left = direction_x == -1.0;
                self.collisions.right = direction_x == 1.0;
            }
        }
    }

    fn vertical_collisions<Q: SpatialQuery + ?Sized>(&mut self, world: &Q, velocity: &mut Vec2) {
        let direction_y = sign(velocity.y);
        let skin_width = self.raycast.skin_width();
        let origins = *self.raycast.origins();
        let spacing = *self.raycast.spacing();

        let mut ray_length = velocity.y.abs() + skin_width;

        for i in 0..spacing.vertical_ray_count {
            let mut ray_origin = if direction_y == -1.0 {
                origins.bottom_left
            } else {
                origins.top_left
            };
            ray_origin.x += spacing.vertical_ray_spacing * i as f32 + velocity.x;

            let Some(hit) = self.cast(world, ray_origin, Vec2::Y * direction_y, ray_length) else {
                continue;
            };

            velocity.y = (hit.distance - skin_width) * direction_y;
            ray_length = hit.distance;

            if self.collisions.climbing_slope {
                velocity.x = velocity.y / degrees_to_radians(self.collisions.slope_angle).tan()
                    * sign(velocity.x);
            }

            self.collisions.below = direction_y == -1.0;
            self.collisions.above = direction_y == 1.0;
        }

        if self.collisions.climbing_slope {
            // A second slope may start before the end of this step.
            let direction_x = sign(velocity.x);
            let ray_length = velocity.x.abs() + skin_width;
            let corner = if direction_x == -1.0 {
                origins.bottom_left
            } else {
                origins.bottom_right
            };
            let ray_origin = corner + Vec2::Y * velocity.y;

            if let Some(hit) = self.cast(world, ray_origin, Vec2::X * direction_x, ray_length) {
                let slope_angle = Vec2::angle_between(hit.normal, Vec2::Y);
                if slope_angle != self.collisions.slope_angle {
                    velocity.x = (hit.distance - skin_width) * direction_x;
                    self.collisions.slope_angle = slope_angle;
                    self.collisions.slope_normal = hit.normal;
                }
            }
        }
    }

    /// With no vertical motion the vertical sweep is skipped; short rays
    /// still refresh the grounded flag so a resting body stays grounded.
    fn probe_ground<Q: SpatialQuery + ?Sized>(&mut self, world: &Q, velocity: Vec2) {
        let skin_width = self.raycast.skin_width();
        let origins = *self.raycast.origins();
        let spacing = *self.raycast.spacing();

        let grounded = (0..spacing.vertical_ray_count).any(|i| {
            let mut ray_origin = origins.bottom_left;
            ray_origin.x += spacing.vertical_ray_spacing * i as f32 + velocity.x;
            self.cast(world, ray_origin, -Vec2::Y, 2.0 * skin_width)
                .is_some()
        });

        if grounded {
            self.collisions.below = true;
        }
    }

    fn climb_slope(&mut self, velocity: &mut Vec2, slope_angle: f32, slope_normal: Vec2) {
        let move_distance = velocity.x.abs();
        let radians = degrees_to_radians(slope_angle);
        let climb_velocity_y = radians.sin() * move_distance;

        // Left alone while rising faster than the slope would lift us.
        if velocity.y <= climb_velocity_y {
            velocity.y = climb_velocity_y;
            velocity.x = radians.cos() * move_distance * sign(velocity.x);
            self.collisions.below = true;
            self.collisions.climbing_slope = true;
            self.collisions.slope_angle = slope_angle;
            self.collisions.slope_normal = slope_normal;
        }
    }

    fn descend_slope<Q: SpatialQuery + ?Sized>(&mut self, world: &Q, velocity: &mut Vec2) {
        let skin_width = self.raycast.skin_width();
        let origins = *self.raycast.origins();

        let ray_length = velocity.y.abs() + skin_width;
        let hit_left = self.cast(world, origins.bottom_left, -Vec2::Y, ray_length);
        let hit_right = self.cast(world, origins.bottom_right, -Vec2::Y, ray_length);

        // Only one foot on the ground: may be hanging over a steep slope.
        if hit_left.is_some() != hit_right.is_some() {
            if let Some(hit) = hit_left {
                self.slide_down_max_slope(hit, velocity);
            }
            if let Some(hit) = hit_right {
                self.slide_down_max_slope(hit, velocity);
            }
        }

        if self.collisions.sliding_down_max_slope {
            return;
        }

        let direction_x = sign(velocity.x);
        let ray_origin = if direction_x == -1.0 {
            origins.bottom_right
        } else {
            origins.bottom_left
        };

        let Some(hit) = self.cast(world, ray_origin, -Vec2::Y, f32::INFINITY) else {
            return;
        };

        let slope_angle = Vec2::angle_between(hit.normal, Vec2::Y);
        if slope_angle == 0.0 || slope_angle > self.max_slope_angle {
            return;
        }
        // Only slopes falling away in the direction of travel.
        if sign(hit.normal.x) != direction_x {
            return;
        }

        let radians = degrees_to_radians(slope_angle);
        if hit.distance - skin_width <= radians.tan() * velocity.x.abs() {
            let move_distance = velocity.x.abs();
            let descend_velocity_y = radians.sin() * move_distance;
            velocity.x = radians.cos() * move_distance * sign(velocity.x);
            velocity.y -= descend_velocity_y;

            self.collisions.slope_angle = slope_angle;
            self.collisions.descending_slope = true;
            self.collisions.below = true;
            self.collisions.slope_normal = hit.normal;
        }
    }

    fn slide_down_max_slope(&mut self, hit: RaycastHit, velocity: &mut Vec2) {
        let slope_angle = Vec2::angle_between(hit.normal, Vec2::Y);
        if slope_angle > self.max_slope_angle {
            velocity.x = hit.normal.x * (velocity.y.abs() - hit.distance)
                / degrees_to_radians(slope_angle).tan();

            self.collisions.slope_angle = slope_angle;
            self.collisions.sliding_down_max_slope = true;
            self.collisions.slope_normal = hit.normal;
        }
    }
}
