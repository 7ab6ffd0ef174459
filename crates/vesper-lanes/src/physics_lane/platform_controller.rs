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

//! Waypoint-following platforms that carry and push actors.

use std::collections::HashSet;

use vesper_core::math::{sign, Aabb, Vec2, EPSILON};
use vesper_core::physics::{ActorId, Body, SpatialQuery};
use vesper_core::SetupError;
use vesper_data::components::{BoxBody, PassengerMovement};
use vesper_data::config::PlatformConfig;

use super::RaycastController;

/// A kinematic platform moving along a list of waypoints.
///
/// A step is split in phases so the owner of the actors can interleave them:
///
/// 1. [`calculate_platform_movement`](Self::calculate_platform_movement)
/// 2. [`calculate_passenger_movement`](Self::calculate_passenger_movement)
/// 3. move the passengers flagged `move_before_platform`
/// 4. [`translate`](Self::translate)
/// 5. move the remaining passengers
#[derive(Debug, Clone)]
pub struct PlatformController2D<B: Body = BoxBody> {
    body: B,
    raycast: RaycastController,
    global_waypoints: Vec<Vec2>,
    speed: f32,
    cyclic: bool,
    wait_time: f32,
    ease_amount: f32,
    from_waypoint_index: usize,
    percent_between_waypoints: f32,
    clock: f32,
    next_move_time: f32,
    passenger_movement: Vec<PassengerMovement>,
}

impl<B: Body> PlatformController2D<B> {
    /// Creates a platform; local waypoints are resolved against the body's
    /// starting position.
    pub fn new(body: B, config: &PlatformConfig) -> Result<Self, SetupError> {
        let bounds = body.bounds();
        config.validate(bounds.size())?;
        let raycast = RaycastController::new(config.raycast, config.passenger_mask, &bounds)?;

        let origin = body.position();
        let global_waypoints: Vec<Vec2> =
            config.local_waypoints.iter().map(|w| *w + origin).collect();

        if global_waypoints.len() <= 1 {
            log::warn!(
                "Platform at ({}, {}) has {} waypoint(s) and will not move",
                origin.x,
                origin.y,
                global_waypoints.len()
            );
        }

        Ok(Self {
            body,
            raycast,
            global_waypoints,
            speed: config.speed,
            cyclic: config.cyclic,
            wait_time: config.wait_time,
            ease_amount: config.ease_amount,
            from_waypoint_index: 0,
            percent_between_waypoints: 0.0,
            clock: 0.0,
            next_move_time: 0.0,
            passenger_movement: Vec::new(),
        })
    }

    /// The platform body.
    #[inline]
    pub fn body(&self) -> &B {
        &self.body
    }

    /// Current world-space bounds.
    #[inline]
    pub fn bounds(&self) -> Aabb {
        self.body.bounds()
    }

    /// Waypoints in world space, in travel order.
    ///
    /// Non-cyclic platforms reverse this list each time they reach its end.
    #[inline]
    pub fn global_waypoints(&self) -> &[Vec2] {
        &self.global_waypoints
    }

    /// Index of the waypoint the platform is travelling from.
    #[inline]
    pub fn from_waypoint_index(&self) -> usize {
        self.from_waypoint_index
    }

    /// Linear progress on the current leg, in `[0, 1]`.
    #[inline]
    pub fn percent_between_waypoints(&self) -> f32 {
        self.percent_between_waypoints
    }

    /// Passengers found by the last scan.
    #[inline]
    pub fn passenger_movement(&self) -> &[PassengerMovement] {
        &self.passenger_movement
    }

    /// Passengers to move before (`true`) or after (`false`) the platform.
    pub fn passengers(&self, before_platform: bool) -> impl Iterator<Item = &PassengerMovement> {
        self.passenger_movement
            .iter()
            .filter(move |p| p.move_before_platform == before_platform)
    }

    /// Eases a linear progress value. `ease_amount` 0 is linear; larger values
    /// slow the platform near both ends of a leg.
    pub fn ease(&self, x: f32) -> f32 {
        let a = self.ease_amount + 1.0;
        let x = x.clamp(0.0, 1.0);
        x.powf(a) / (x.powf(a) + (1.0 - x).powf(a))
    }

    /// Advances the platform clock by `dt` and returns the displacement the
    /// platform wants to make. Does not move the platform.
    pub fn calculate_platform_movement(&mut self, dt: f32) -> Vec2 {
        self.clock += dt;

        let waypoint_count = self.global_waypoints.len();
        if waypoint_count <= 1 || self.clock < self.next_move_time {
            return Vec2::ZERO;
        }

        self.from_waypoint_index %= waypoint_count;
        let to_waypoint_index = (self.from_waypoint_index + 1) % waypoint_count;
        let from = self.global_waypoints[self.from_waypoint_index];
        let to = self.global_waypoints[to_waypoint_index];

        let distance = from.distance(to);
        if distance <= EPSILON {
            self.percent_between_waypoints = 1.0;
        } else {
            self.percent_between_waypoints += dt * self.speed / distance;
        }
        self.percent_between_waypoints = self.percent_between_waypoints.clamp(0.0, 1.0);

        let eased = self.ease(self.percent_between_waypoints);
        let new_position = Vec2::lerp(from, to, eased);

        if self.percent_between_waypoints >= 1.0 {
            self.percent_between_waypoints = 0.0;
            self.from_waypoint_index += 1;
            log::debug!("Platform arrived at ({}, {})", to.x, to.y);

            if !self.cyclic && self.from_waypoint_index >= waypoint_count - 1 {
                self.from_waypoint_index = 0;
                self.global_waypoints.reverse();
                log::debug!("Platform reached the end of its path, reversing");
            }
            self.next_move_time = self.clock + self.wait_time;
        }

        new_position - self.body.position()
    }

    /// Finds every actor the platform will carry or push when moving by
    /// `velocity`, replacing the previous scan.
    ///
    /// Each actor appears at most once; the first sweep to find it wins, in
    /// the order vertical, horizontal, riders on top.
    pub fn calculate_passenger_movement<Q: SpatialQuery + ?Sized>(
        &mut self,
        world: &Q,
        velocity: Vec2,
    ) {
        let bounds = self.body.bounds();
        self.raycast.update_raycast_origins(&bounds);

        let origins = *self.raycast.origins();
        let spacing = *self.raycast.spacing();
        let skin_width = self.raycast.skin_width();
        let mask = self.raycast.collision_mask();

        let mut moved_passengers: HashSet<ActorId> = HashSet::new();
        self.passenger_movement.clear();

        let direction_x = sign(velocity.x);
        let direction_y = sign(velocity.y);

        // Vertically moving platform
        if velocity.y != 0.0 {
            let ray_length = velocity.y.abs() + skin_width;
            for i in 0..spacing.vertical_ray_count {
                let mut ray_origin = if direction_y == -1.0 {
                    origins.bottom_left
                } else {
                    origins.top_left
                };
                ray_origin.x += spacing.vertical_ray_spacing * i as f32;

                let Some(hit) = world.cast_ray(ray_origin, Vec2::Y * direction_y, ray_length, mask)
                else {
                    continue;
                };
                let Some(actor) = world.collider_owner(hit.collider) else {
                    continue;
                };
                if !moved_passengers.insert(actor) {
                    continue;
                }

                let push_x = if direction_y == 1.0 { velocity.x } else { 0.0 };
                let push_y = velocity.y - (hit.distance - skin_width) * direction_y;
                self.passenger_movement.push(PassengerMovement::new(
                    actor,
                    Vec2::new(push_x, push_y),
                    direction_y == 1.0,
                    true,
                ));
            }
        }

        // Horizontally moving platform
        if velocity.x != 0.0 {
            let ray_length = velocity.x.abs() + skin_width;
            for i in 0..spacing.horizontal_ray_count {
                let mut ray_origin = if direction_x == -1.0 {
                    origins.bottom_left
                } else {
                    origins.bottom_right
                };
                ray_origin.y += spacing.horizontal_ray_spacing * i as f32;

                let Some(hit) = world.cast_ray(ray_origin, Vec2::X * direction_x, ray_length, mask)
                else {
                    continue;
                };
                let Some(actor) = world.collider_owner(hit.collider) else {
                    continue;
                };
                if !moved_passengers.insert(actor) {
                    continue;
                }

                let push_x = velocity.x - (hit.distance - skin_width) * direction_x;
                let push_y = -skin_width;
                self.passenger_movement.push(PassengerMovement::new(
                    actor,
                    Vec2::new(push_x, push_y),
                    false,
                    true,
                ));
            }
        }

        // Passenger on top of a horizontally or downward moving platform
        if direction_y == -1.0 || (velocity.y == 0.0 && velocity.x != 0.0) {
            let ray_length = 2.0 * skin_width;
            for i in 0..spacing.vertical_ray_count {
                let mut ray_origin = origins.top_left;
                ray_origin.x += spacing.vertical_ray_spacing * i as f32;

                let Some(hit) = world.cast_ray(ray_origin, Vec2::Y, ray_length, mask) else {
                    continue;
                };
                let Some(actor) = world.collider_owner(hit.collider) else {
                    continue;
                };
                if !moved_passengers.insert(actor) {
                    continue;
                }

                self.passenger_movement
                    .push(PassengerMovement::new(actor, velocity, true, false));
            }
        }

        if !self.passenger_movement.is_empty() {
            log::trace!("Platform found {} passenger(s)", self.passenger_movement.len());
        }
    }

    /// Moves the platform body by `velocity`.
    pub fn translate(&mut self, velocity: Vec2) {
        self.body.translate(velocity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use vesper_data::config::{ACTOR_LAYER, GROUND_LAYER};
    use vesper_infra::CollisionWorld;

    fn platform(waypoints: Vec<Vec2>, speed: f32, cyclic: bool) -> PlatformController2D {
        let config = PlatformConfig {
            local_waypoints: waypoints,
            speed,
            cyclic,
            ..Default::default()
        };
        PlatformController2D::new(BoxBody::new(Vec2::ZERO, Vec2::new(2.0, 0.5)), &config).unwrap()
    }

    /// Steps the platform and records its position each time it reaches a waypoint.
    fn arrivals(platform: &mut PlatformController2D, dt: f32, steps: usize) -> Vec<Vec2> {
        let mut reached = Vec::new();
        for _ in 0..steps {
            let velocity = platform.calculate_platform_movement(dt);
            platform.translate(velocity);
            if velocity != Vec2::ZERO && platform.percent_between_waypoints() == 0.0 {
                reached.push(platform.body().position);
            }
        }
        reached
    }

    fn assert_path(actual: &[Vec2], expected: &[Vec2]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert_relative_eq!(a.x, e.x, epsilon = 1e-4);
            assert_relative_eq!(a.y, e.y, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_ease_endpoints_and_midpoint() {
        for ease_amount in [0.0, 1.0, 2.0] {
            let config = PlatformConfig {
                ease_amount,
                ..Default::default()
            };
            let platform =
                PlatformController2D::new(BoxBody::new(Vec2::ZERO, Vec2::ONE), &config).unwrap();
            assert_eq!(platform.ease(0.0), 0.0);
            assert_eq!(platform.ease(1.0), 1.0);
            assert_relative_eq!(platform.ease(0.5), 0.5, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_reaches_end_then_reverses() {
        let mut platform = platform(vec![Vec2::ZERO, Vec2::new(5.0, 0.0)], 5.0, false);

        for _ in 0..4 {
            let velocity = platform.calculate_platform_movement(0.25);
            platform.translate(velocity);
        }

        assert_relative_eq!(platform.body().position.x, 5.0, epsilon = 1e-5);
        assert_eq!(platform.global_waypoints(), &[Vec2::new(5.0, 0.0), Vec2::ZERO]);
        assert_eq!(platform.from_waypoint_index(), 0);

        let velocity = platform.calculate_platform_movement(0.25);
        assert!(velocity.x < 0.0);
    }

    #[test]
    fn test_non_cyclic_path_ping_pongs() {
        let a = Vec2::ZERO;
        let b = Vec2::new(2.0, 0.0);
        let c = Vec2::new(2.0, 2.0);
        let mut platform = platform(vec![a, b, c], 2.0, false);

        let reached = arrivals(&mut platform, 0.25, 24);

        assert_path(&reached, &[b, c, b, a, b, c]);
    }

    #[test]
    fn test_cyclic_path_wraps_around() {
        let a = Vec2::ZERO;
        let b = Vec2::new(2.0, 0.0);
        let c = Vec2::new(2.0, 2.0);
        let mut platform = platform(vec![a, b, c], 2.0, true);

        // The closing leg c -> a is longer than the others.
        let reached = arrivals(&mut platform, 0.25, 4 + 4 + 6 + 4);

        assert_path(&reached, &[b, c, a, b]);
    }

    #[test]
    fn test_wait_time_holds_platform() {
        let config = PlatformConfig {
            local_waypoints: vec![Vec2::ZERO, Vec2::new(1.0, 0.0)],
            speed: 4.0,
            wait_time: 1.0,
            ..Default::default()
        };
        let mut platform =
            PlatformController2D::new(BoxBody::new(Vec2::ZERO, Vec2::ONE), &config).unwrap();

        let velocity = platform.calculate_platform_movement(0.25);
        platform.translate(velocity);
        assert_relative_eq!(platform.body().position.x, 1.0, epsilon = 1e-5);

        for _ in 0..3 {
            assert_eq!(platform.calculate_platform_movement(0.25), Vec2::ZERO);
        }
        assert!(platform.calculate_platform_movement(0.25).x < 0.0);
    }

    #[test]
    fn test_single_waypoint_never_moves() {
        let mut platform = platform(vec![Vec2::new(3.0, 3.0)], 5.0, false);
        for _ in 0..10 {
            assert_eq!(platform.calculate_platform_movement(0.1), Vec2::ZERO);
        }
    }

    #[test]
    fn test_coincident_waypoints_complete_leg_at_once() {
        let mut platform = platform(vec![Vec2::ZERO, Vec2::ZERO, Vec2::new(1.0, 0.0)], 1.0, false);
        let velocity = platform.calculate_platform_movement(0.1);
        assert_eq!(velocity, Vec2::ZERO);
        assert_eq!(platform.from_waypoint_index(), 1);
    }

    fn actor_collider(world: &mut CollisionWorld, id: u32, center: Vec2, size: Vec2) {
        world
            .add_body_collider(
                ActorId(id),
                Aabb::from_center_half_extents(center, size * 0.5),
                ACTOR_LAYER,
            )
            .unwrap();
    }

    #[test]
    fn test_rider_on_rising_platform_moves_before_platform() {
        let mut world = CollisionWorld::new();
        // Platform top at y = 0.25; rider standing on it.
        actor_collider(&mut world, 7, Vec2::new(0.0, 0.75), Vec2::ONE);
        let mut platform = platform(vec![], 0.0, false);

        platform.calculate_passenger_movement(&world, Vec2::new(0.0, 0.1));

        let passengers = platform.passenger_movement();
        assert_eq!(passengers.len(), 1, "one entry per actor, however many rays hit");
        let rider = passengers[0];
        assert_eq!(rider.actor, ActorId(7));
        assert!(rider.standing_on_platform);
        assert!(rider.move_before_platform);
        assert_relative_eq!(rider.velocity.x, 0.0);
        assert_relative_eq!(rider.velocity.y, 0.1, epsilon = 1e-5);
    }

    #[test]
    fn test_rider_on_sideways_platform_moves_after_platform() {
        let mut world = CollisionWorld::new();
        actor_collider(&mut world, 1, Vec2::new(0.0, 0.75), Vec2::ONE);
        let mut platform = platform(vec![], 0.0, false);

        platform.calculate_passenger_movement(&world, Vec2::new(0.5, 0.0));

        let passengers = platform.passenger_movement();
        assert_eq!(passengers.len(), 1);
        assert_eq!(passengers[0].velocity, Vec2::new(0.5, 0.0));
        assert!(passengers[0].standing_on_platform);
        assert!(!passengers[0].move_before_platform);
        assert_eq!(platform.passengers(false).count(), 1);
        assert_eq!(platform.passengers(true).count(), 0);
    }

    #[test]
    fn test_pushes_actor_in_the_way() {
        let mut world = CollisionWorld::new();
        // Actor left edge 0.2 to the right of the platform.
        actor_collider(&mut world, 2, Vec2::new(1.7, 0.0), Vec2::ONE);
        let mut platform = platform(vec![], 0.0, false);

        platform.calculate_passenger_movement(&world, Vec2::new(0.5, 0.0));

        let passengers = platform.passenger_movement();
        assert_eq!(passengers.len(), 1);
        let pushed = passengers[0];
        assert!(!pushed.standing_on_platform);
        assert!(pushed.move_before_platform);
        // Gap of 0.2 is closed for free; the rest is pushed.
        assert_relative_eq!(pushed.velocity.x, 0.3, epsilon = 1e-4);
        assert_relative_eq!(pushed.velocity.y, -0.015, epsilon = 1e-6);
    }

    #[test]
    fn test_actor_found_by_two_sweeps_is_listed_once() {
        let mut world = CollisionWorld::new();
        // Overhangs the platform's top-right corner.
        actor_collider(&mut world, 3, Vec2::new(1.4, 0.73), Vec2::ONE);
        let mut platform = platform(vec![], 0.0, false);

        platform.calculate_passenger_movement(&world, Vec2::new(0.1, 0.0));

        let passengers = platform.passenger_movement();
        assert_eq!(passengers.len(), 1);
        // The horizontal sweep got there first.
        assert!(!passengers[0].standing_on_platform);
        assert!(passengers[0].move_before_platform);
    }

    #[test]
    fn test_static_geometry_is_never_a_passenger() {
        let mut world = CollisionWorld::new();
        world
            .add_static(
                vesper_core::physics::ColliderShape::cuboid(Vec2::ONE),
                Vec2::new(0.0, 0.75),
                ACTOR_LAYER,
            )
            .unwrap();
        world
            .add_static(
                vesper_core::physics::ColliderShape::cuboid(Vec2::ONE),
                Vec2::new(0.0, -0.75),
                GROUND_LAYER,
            )
            .unwrap();
        let mut platform = platform(vec![], 0.0, false);

        platform.calculate_passenger_movement(&world, Vec2::new(0.0, 0.1));
        assert!(platform.passenger_movement().is_empty());
    }
}
