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

//! Turns player input into per-step controller moves.

use vesper_core::error::ensure_finite;
use vesper_core::math::{sign, smooth_damp, Vec2};
use vesper_core::physics::{Body, SpatialQuery};
use vesper_core::SetupError;
use vesper_data::components::CollisionInfo;
use vesper_data::config::MotorConfig;

use super::Controller2D;

/// Stick deflection below which horizontal input counts as neutral for wall jumps.
const WALL_JUMP_DEADZONE: f32 = 0.1;

/// Player intent for one step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotorInput {
    /// Horizontal axis in `[-1, 1]`.
    pub horizontal: f32,
    /// Jump was pressed this step.
    pub jump_pressed: bool,
}

impl MotorInput {
    /// Input with only a horizontal component.
    pub fn horizontal(horizontal: f32) -> Self {
        Self {
            horizontal,
            jump_pressed: false,
        }
    }

    /// Returns the input with the jump button pressed.
    pub fn with_jump(mut self) -> Self {
        self.jump_pressed = true;
        self
    }
}

/// Velocity integration, jumping and wall sliding for a player actor.
///
/// The motor keeps a velocity in units per second and hands
/// `velocity * dt` to its [`Controller2D`] each step. Gravity, coyote time
/// and the jump buffer are measured on the motor's own clock.
#[derive(Debug, Clone)]
pub struct PlayerMotor {
    config: MotorConfig,
    gravity: f32,
    velocity: Vec2,
    velocity_x_smoothing: f32,
    clock: f32,
    last_grounded_time: f32,
    last_jump_time: Option<f32>,
    wall_sliding: bool,
    wall_direction: i8,
    time_to_wall_unstick: f32,
}

impl PlayerMotor {
    /// Creates a motor for a world with the given vertical gravity.
    pub fn new(config: MotorConfig, gravity: f32) -> Result<Self, SetupError> {
        config.validate()?;
        ensure_finite("gravity", gravity)?;

        Ok(Self {
            config,
            gravity,
            velocity: Vec2::ZERO,
            velocity_x_smoothing: 0.0,
            clock: 0.0,
            last_grounded_time: f32::NEG_INFINITY,
            last_jump_time: None,
            wall_sliding: false,
            wall_direction: 0,
            time_to_wall_unstick: 0.0,
        })
    }

    /// Current velocity in units per second.
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Whether the player slid down a wall during the last step.
    #[inline]
    pub fn is_wall_sliding(&self) -> bool {
        self.wall_sliding
    }

    /// Side of the wall last touched, `-1` or `1`; `0` before any step.
    #[inline]
    pub fn wall_direction(&self) -> i8 {
        self.wall_direction
    }

    /// The motor tuning.
    #[inline]
    pub fn config(&self) -> &MotorConfig {
        &self.config
    }

    /// Initial upward speed that reaches `jump_height` under this gravity.
    pub fn jump_velocity(&self) -> f32 {
        (2.0 * self.gravity.abs() * self.config.jump_height).sqrt()
    }

    /// Plans this step's velocity and moves `controller` with it.
    ///
    /// Returns the displacement applied by the controller.
    pub fn update<B: Body, Q: SpatialQuery + ?Sized>(
        &mut self,
        controller: &mut Controller2D<B>,
        world: &Q,
        input: MotorInput,
        dt: f32,
    ) -> Vec2 {
        let velocity = self.plan(controller.collisions(), input, dt);
        controller.move_by(world, velocity * dt, false)
    }

    /// Computes the velocity for this step from the contacts of the previous
    /// one, without moving anything.
    pub fn plan(&mut self, collisions: &CollisionInfo, input: MotorInput, dt: f32) -> Vec2 {
        self.clock += dt;

        if collisions.vertical_contact() {
            if collisions.sliding_down_max_slope {
                self.velocity.y += collisions.slope_normal.y * self.gravity * dt;
            } else {
                self.velocity.y = 0.0;
            }
        }

        self.calculate_velocity(collisions, input, dt);
        self.handle_wall_sliding(collisions, input, dt);
        self.handle_jumping(collisions, input);

        self.velocity = self.config.speed_limit.apply(self.velocity);
        self.velocity
    }

    fn calculate_velocity(&mut self, collisions: &CollisionInfo, input: MotorInput, dt: f32) {
        let target_velocity_x = input.horizontal.clamp(-1.0, 1.0) * self.config.move_speed;
        let smooth_time = if collisions.below {
            self.config.acceleration_time_grounded
        } else {
            self.config.acceleration_time_airborne
        };
        self.velocity.x = smooth_damp(
            self.velocity.x,
            target_velocity_x,
            &mut self.velocity_x_smoothing,
            smooth_time,
            dt,
        );

        let falling = self.velocity.y < 0.0 && !collisions.below;
        let gravity_scale = if falling {
            self.config.fall_gravity_scale
        } else {
            self.config.normal_gravity_scale
        };
        self.velocity.y += self.gravity * gravity_scale * dt;
    }

    fn handle_wall_sliding(&mut self, collisions: &CollisionInfo, input: MotorInput, dt: f32) {
        self.wall_sliding = false;
        if collisions.sliding_down_max_slope {
            return;
        }

        let Some(wall_direction) = collisions.wall_direction() else {
            return;
        };
        self.wall_direction = wall_direction;

        if collisions.below || self.velocity.y >= 0.0 {
            return;
        }
        self.wall_sliding = true;

        if self.velocity.y < -self.config.wall_slide_speed {
            self.velocity.y = -self.config.wall_slide_speed;
        }

        if self.time_to_wall_unstick > 0.0 {
            self.velocity_x_smoothing = 0.0;
            self.velocity.x = 0.0;

            let pulling_away =
                input.horizontal != 0.0 && sign(input.horizontal) != f32::from(wall_direction);
            if pulling_away {
                self.time_to_wall_unstick -= dt;
            } else {
                self.time_to_wall_unstick = self.config.wall_stick_time;
            }
        } else {
            self.time_to_wall_unstick = self.config.wall_stick_time;
        }
    }

    fn handle_jumping(&mut self, collisions: &CollisionInfo, input: MotorInput) {
        let grounded = collisions.below;
        if grounded {
            self.last_grounded_time = self.clock;

            // Jump pressed shortly before landing.
            if let Some(last_jump_time) = self.last_jump_time {
                if self.clock - last_jump_time < self.config.jump_buffer_time {
                    self.last_jump_time = None;
                    self.velocity.y = self.jump_velocity();
                }
            }
        }

        if !input.jump_pressed {
            return;
        }

        if self.wall_sliding {
            let wall_direction = f32::from(self.wall_direction);
            // Neutral input is checked before the climb, so releasing the stick
            // always jumps off, whichever side the wall is on.
            let impulse = if input.horizontal.abs() <= WALL_JUMP_DEADZONE {
                self.config.wall_jump_off
            } else if sign(input.horizontal) == wall_direction {
                self.config.wall_jump_climb
            } else {
                self.config.wall_leap
            };
            self.velocity.x = -wall_direction * impulse.x;
            self.velocity.y = impulse.y;
            self.last_jump_time = None;
            log::trace!("Wall jump off the {wall_direction} wall");
        } else if grounded || self.clock - self.last_grounded_time <= self.config.coyote_time {
            if collisions.sliding_down_max_slope {
                return;
            }
            self.last_jump_time = None;
            self.velocity.y = self.jump_velocity();
        } else {
            self.last_jump_time = Some(self.clock);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const GRAVITY: f32 = -50.0;
    const DT: f32 = 1.0 / 60.0;

    fn motor() -> PlayerMotor {
        PlayerMotor::new(MotorConfig::default(), GRAVITY).unwrap()
    }

    fn grounded() -> CollisionInfo {
        CollisionInfo {
            below: true,
            ..Default::default()
        }
    }

    fn wall(right: bool) -> CollisionInfo {
        CollisionInfo {
            left: !right,
            right,
            ..Default::default()
        }
    }

    #[test]
    fn test_jump_velocity_reaches_jump_height() {
        // sqrt(2 * 50 * 4)
        assert_relative_eq!(motor().jump_velocity(), 20.0, epsilon = 1e-5);
    }

    #[test]
    fn test_grounded_jump() {
        let mut motor = motor();
        let velocity = motor.plan(&grounded(), MotorInput::default().with_jump(), DT);
        assert_relative_eq!(velocity.y, 20.0, epsilon = 1e-5);
    }

    #[test]
    fn test_falling_uses_fall_gravity_scale() {
        let mut motor = motor();
        let airborne = CollisionInfo::default();

        let first = motor.plan(&airborne, MotorInput::default(), DT).y;
        assert_relative_eq!(first, GRAVITY * DT, epsilon = 1e-6);

        let second = motor.plan(&airborne, MotorInput::default(), DT).y;
        assert_relative_eq!(second - first, GRAVITY * 1.5 * DT, epsilon = 1e-5);
    }

    #[test]
    fn test_landing_clears_vertical_velocity() {
        let mut motor = motor();
        let airborne = CollisionInfo::default();
        for _ in 0..10 {
            motor.plan(&airborne, MotorInput::default(), DT);
        }
        let velocity = motor.plan(&grounded(), MotorInput::default(), DT);
        assert_relative_eq!(velocity.y, GRAVITY * DT, epsilon = 1e-6);
    }

    #[test]
    fn test_coyote_time_allows_late_jump() {
        let mut motor = motor();
        motor.plan(&grounded(), MotorInput::default(), DT);

        let velocity = motor.plan(&CollisionInfo::default(), MotorInput::default().with_jump(), DT);
        assert_relative_eq!(velocity.y, 20.0, epsilon = 1e-5);
    }

    #[test]
    fn test_jump_buffer_fires_on_landing() {
        let mut motor = motor();
        let airborne = CollisionInfo::default();
        motor.plan(&grounded(), MotorInput::default(), DT);
        for _ in 0..12 {
            motor.plan(&airborne, MotorInput::default(), DT);
        }

        // Too late for coyote time: remembered instead.
        let velocity = motor.plan(&airborne, MotorInput::default().with_jump(), DT);
        assert!(velocity.y < 0.0);

        let velocity = motor.plan(&grounded(), MotorInput::default(), DT);
        assert_relative_eq!(velocity.y, 20.0, epsilon = 1e-5);
    }

    #[test]
    fn test_stale_jump_press_is_ignored() {
        let mut motor = motor();
        let airborne = CollisionInfo::default();
        motor.plan(&airborne, MotorInput::default().with_jump(), DT);
        for _ in 0..20 {
            motor.plan(&airborne, MotorInput::default(), DT);
        }
        let velocity = motor.plan(&grounded(), MotorInput::default(), DT);
        assert!(velocity.y <= 0.0);
    }

    #[test]
    fn test_no_jump_while_sliding_off_steep_slope() {
        let mut motor = motor();
        let sliding = CollisionInfo {
            below: true,
            sliding_down_max_slope: true,
            slope_normal: Vec2::new(0.866, 0.5),
            ..Default::default()
        };
        let velocity = motor.plan(&sliding, MotorInput::default().with_jump(), DT);
        assert!(velocity.y < 0.0);
        assert!(!motor.is_wall_sliding());
    }

    #[test]
    fn test_wall_slide_caps_fall_speed() {
        let mut motor = motor();
        motor.plan(&CollisionInfo::default(), MotorInput::default(), 0.1);

        let velocity = motor.plan(&wall(true), MotorInput::default(), 0.1);

        assert!(motor.is_wall_sliding());
        assert_eq!(motor.wall_direction(), 1);
        assert_relative_eq!(velocity.y, -2.0);
    }

    #[test]
    fn test_wall_jump_variants() {
        let cases = [
            (0.0, Vec2::new(-8.5, 7.0)),
            (1.0, Vec2::new(-7.5, 16.0)),
            (-1.0, Vec2::new(-18.0, 17.0)),
        ];
        for (horizontal, expected) in cases {
            let mut motor = motor();
            let input = MotorInput::horizontal(horizontal).with_jump();
            let velocity = motor.plan(&wall(true), input, 0.1);
            assert_eq!(velocity, expected, "input {horizontal}");
        }
    }

    #[test]
    fn test_neutral_wall_jump_leaves_either_wall() {
        for (right, expected_x) in [(true, -8.5), (false, 8.5)] {
            let mut motor = motor();
            let input = MotorInput::default().with_jump();
            let velocity = motor.plan(&wall(right), input, 0.1);
            assert_eq!(velocity, Vec2::new(expected_x, 7.0), "right wall {right}");
        }
    }

    #[test]
    fn test_wall_stick_delays_letting_go() {
        let mut motor = motor();
        let away = MotorInput::horizontal(1.0);
        let on_left_wall = wall(false);

        motor.plan(&on_left_wall, away, 0.1);
        for _ in 0..3 {
            let velocity = motor.plan(&on_left_wall, away, 0.1);
            assert_eq!(velocity.x, 0.0);
        }
        let velocity = motor.plan(&on_left_wall, away, 0.1);
        assert!(velocity.x > 0.0);
    }

    #[test]
    fn test_speed_limit_applies() {
        let mut config = MotorConfig::default();
        config.speed_limit.max_x = Some(3.0);
        let mut motor = PlayerMotor::new(config, GRAVITY).unwrap();
        for _ in 0..60 {
            let velocity = motor.plan(&grounded(), MotorInput::horizontal(1.0), DT);
            assert!(velocity.x <= 3.0);
        }
        assert_relative_eq!(motor.velocity().x, 3.0, epsilon = 1e-4);
    }

    #[test]
    fn test_rejects_non_finite_gravity() {
        assert_eq!(
            PlayerMotor::new(MotorConfig::default(), f32::NAN).err(),
            Some(SetupError::NonFinite { field: "gravity" })
        );
    }
}
