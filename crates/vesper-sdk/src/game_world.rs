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

//! The `GameWorld` facade: one owner for colliders, actors and platforms,
//! and the fixed order in which they move each tick.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use vesper_core::math::{Aabb, Vec2};
use vesper_core::physics::{ActorId, Body, ColliderHandle, ColliderShape, LayerMask};
use vesper_core::SetupError;
use vesper_data::components::{CollisionInfo, PassengerMovement};
use vesper_data::config::{ActorConfig, PlatformSpawnConfig, SceneConfig, StaticGeometryConfig};
use vesper_infra::CollisionWorld;
use vesper_lanes::{Controller2D, MotorInput, PlatformController2D, PlayerMotor};

/// Index of a moving platform inside a [`GameWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlatformId(pub u32);

/// A controller-driven actor.
#[derive(Debug)]
pub struct Actor {
    name: String,
    controller: Controller2D,
    motor: Option<PlayerMotor>,
    collider: ColliderHandle,
}

impl Actor {
    /// Label from the scene config.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The actor's kinematic controller.
    pub fn controller(&self) -> &Controller2D {
        &self.controller
    }

    /// The player motor, for actors that have one.
    pub fn motor(&self) -> Option<&PlayerMotor> {
        self.motor.as_ref()
    }

    /// Contacts from the actor's last move.
    pub fn collisions(&self) -> &CollisionInfo {
        self.controller.collisions()
    }

    /// Body position.
    pub fn position(&self) -> Vec2 {
        self.controller.body().position()
    }

    /// World-space bounds of the actor's collider.
    pub fn bounds(&self) -> Aabb {
        self.controller.body().bounds()
    }

    /// The actor's collider in the collision world.
    pub fn collider(&self) -> ColliderHandle {
        self.collider
    }
}

/// A platform following its waypoints and carrying actors.
#[derive(Debug)]
pub struct MovingPlatform {
    name: String,
    controller: PlatformController2D,
    collider: ColliderHandle,
}

impl MovingPlatform {
    /// Label from the scene config.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The platform controller.
    pub fn controller(&self) -> &PlatformController2D {
        &self.controller
    }

    /// Body position.
    pub fn position(&self) -> Vec2 {
        self.controller.body().position()
    }

    /// The platform's collider in the collision world.
    pub fn collider(&self) -> ColliderHandle {
        self.collider
    }
}

/// Owns the collision world, every actor and every platform of a scene.
///
/// A tick moves every platform first (with the actors it carries or pushes),
/// then every actor. Each collider is re-synced right after its body moves,
/// so later rays in the same tick see up-to-date positions.
///
/// # Examples
///
/// ```rust,ignore
/// let mut world = GameWorld::load("scenes/level.json")?;
/// let mut inputs = HashMap::new();
/// inputs.insert(player, MotorInput::horizontal(1.0));
/// world.tick(1.0 / 60.0, &inputs);
/// ```
#[derive(Debug)]
pub struct GameWorld {
    gravity: f32,
    collision: CollisionWorld,
    actors: Vec<Option<Actor>>,
    platforms: Vec<MovingPlatform>,
    paused: bool,
    tick_count: u64,
}

impl GameWorld {
    /// Creates an empty world with the given vertical gravity.
    pub fn new(gravity: f32) -> Self {
        Self {
            gravity,
            collision: CollisionWorld::new(),
            actors: Vec::new(),
            platforms: Vec::new(),
            paused: false,
            tick_count: 0,
        }
    }

    /// Builds a world from a scene, validating the whole scene first.
    pub fn from_config(scene: &SceneConfig) -> Result<Self, SetupError> {
        scene.validate()?;

        let mut world = Self::new(scene.gravity);
        for geometry in &scene.geometry {
            world.add_geometry(geometry)?;
        }
        for platform in &scene.platforms {
            world.spawn_platform(platform)?;
        }
        for actor in &scene.actors {
            world.spawn_actor(actor)?;
        }

        log::info!(
            "Scene ready: {} static collider(s), {} platform(s), {} actor(s)",
            scene.geometry.len(),
            world.platforms.len(),
            world.actor_count()
        );
        Ok(world)
    }

    /// Loads a `.json` or `.ron` scene file and builds a world from it.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let scene = SceneConfig::from_file(path)
            .with_context(|| format!("failed to read scene '{}'", path.display()))?;
        let world = Self::from_config(&scene)
            .with_context(|| format!("invalid scene '{}'", path.display()))?;
        Ok(world)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Scene construction
    // ─────────────────────────────────────────────────────────────────────

    /// Adds a piece of static geometry.
    pub fn add_geometry(
        &mut self,
        geometry: &StaticGeometryConfig,
    ) -> Result<ColliderHandle, SetupError> {
        let shape = geometry.shape.to_shape()?;
        self.collision
            .add_static(shape, geometry.position, geometry.layer)
    }

    /// Spawns an actor and registers its collider.
    pub fn spawn_actor(&mut self, config: &ActorConfig) -> Result<ActorId, SetupError> {
        let body = config.body();
        body.validate()?;
        if config
            .controller
            .collision_mask
            .intersects(LayerMask::layer(config.layer))
        {
            return Err(SetupError::SelfCollidingActor(config.layer));
        }

        let controller = Controller2D::new(body, config.controller)?;
        let motor = config
            .motor
            .map(|motor| PlayerMotor::new(motor, self.gravity))
            .transpose()?;

        let id = ActorId(self.actors.len() as u32);
        let bounds = body.bounds();
        let collider = self
            .collision
            .add_body_collider(id, bounds, config.layer)?;

        let inset = controller.raycast().inset_bounds(&bounds);
        let overlapping = self
            .collision
            .overlapping(&inset, config.controller.collision_mask);
        if !overlapping.is_empty() {
            log::warn!(
                "Actor '{}' spawns overlapping {} collider(s); its rays will ignore them until it gets out",
                config.name,
                overlapping.len()
            );
        }

        log::info!(
            "Spawned actor '{}' ({:?}) at ({}, {}){}",
            config.name,
            id,
            body.position.x,
            body.position.y,
            if motor.is_some() { " with player motor" } else { "" }
        );

        self.actors.push(Some(Actor {
            name: config.name.clone(),
            controller,
            motor,
            collider,
        }));
        Ok(id)
    }

    /// Spawns a moving platform and registers its collider.
    pub fn spawn_platform(
        &mut self,
        config: &PlatformSpawnConfig,
    ) -> Result<PlatformId, SetupError> {
        let body = config.body();
        body.validate()?;
        if config
            .platform
            .passenger_mask
            .intersects(LayerMask::layer(config.layer))
        {
            return Err(SetupError::SelfCarryingPlatform(config.layer));
        }

        let controller = PlatformController2D::new(body, &config.platform)?;
        let bounds = body.bounds();
        let collider = self.collision.add_static(
            ColliderShape::cuboid(bounds.size()),
            bounds.center(),
            config.layer,
        )?;

        let id = PlatformId(self.platforms.len() as u32);
        log::info!(
            "Spawned platform '{}' ({:?}) with {} waypoint(s)",
            config.name,
            id,
            controller.global_waypoints().len()
        );

        self.platforms.push(MovingPlatform {
            name: config.name.clone(),
            controller,
            collider,
        });
        Ok(id)
    }

    /// Removes an actor and its collider.
    pub fn despawn_actor(&mut self, id: ActorId) -> Result<(), SetupError> {
        let actor = self
            .actors
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .ok_or(SetupError::UnknownActor(id.0))?;
        self.collision.remove(actor.collider);
        log::info!("Despawned actor '{}' ({:?})", actor.name, id);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Access
    // ─────────────────────────────────────────────────────────────────────

    /// Vertical gravity used by player motors.
    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    /// The collision world, for ad-hoc queries.
    pub fn collision_world(&self) -> &CollisionWorld {
        &self.collision
    }

    /// An actor by id, if it is still alive.
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Every live actor with its id.
    pub fn actors(&self) -> impl Iterator<Item = (ActorId, &Actor)> {
        self.actors
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|actor| (ActorId(index as u32), actor)))
    }

    /// Number of live actors.
    pub fn actor_count(&self) -> usize {
        self.actors.iter().flatten().count()
    }

    /// A platform by id.
    pub fn platform(&self, id: PlatformId) -> Option<&MovingPlatform> {
        self.platforms.get(id.0 as usize)
    }

    /// Every platform with its id.
    pub fn platforms(&self) -> impl Iterator<Item = (PlatformId, &MovingPlatform)> {
        self.platforms
            .iter()
            .enumerate()
            .map(|(index, platform)| (PlatformId(index as u32), platform))
    }

    /// Ticks run since creation, excluding paused ones.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ─────────────────────────────────────────────────────────────────────
    // Simulation
    // ─────────────────────────────────────────────────────────────────────

    /// Stops [`tick`](Self::tick) from advancing anything.
    pub fn pause(&mut self) {
        if !self.paused {
            log::info!("Simulation paused");
        }
        self.paused = true;
    }

    /// Lets [`tick`](Self::tick) advance again.
    pub fn resume(&mut self) {
        if self.paused {
            log::info!("Simulation resumed");
        }
        self.paused = false;
    }

    /// Whether the simulation is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Moves one actor directly, bypassing its motor.
    ///
    /// Returns the displacement actually applied.
    pub fn move_actor(
        &mut self,
        id: ActorId,
        velocity: Vec2,
        standing_on_platform: bool,
    ) -> Result<Vec2, SetupError> {
        let actor = self
            .actors
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(SetupError::UnknownActor(id.0))?;

        let moved = actor
            .controller
            .move_by(&self.collision, velocity, standing_on_platform);
        sync_collider(&mut self.collision, actor.collider, actor.bounds());
        Ok(moved)
    }

    /// Advances the world by `dt` seconds.
    ///
    /// Actors with a motor read their input from `inputs` (missing entries
    /// mean no input). Actors without one only move when carried or pushed;
    /// they still get a zero move so their contacts stay current.
    pub fn tick(&mut self, dt: f32, inputs: &HashMap<ActorId, MotorInput>) {
        if self.paused {
            return;
        }

        // 1. Platforms, with the actors they carry.
        for platform in &mut self.platforms {
            let velocity = platform.controller.calculate_platform_movement(dt);
            platform
                .controller
                .calculate_passenger_movement(&self.collision, velocity);

            move_passengers(
                &mut self.actors,
                &mut self.collision,
                platform.controller.passengers(true),
            );

            platform.controller.translate(velocity);
            sync_collider(
                &mut self.collision,
                platform.collider,
                platform.controller.bounds(),
            );

            move_passengers(
                &mut self.actors,
                &mut self.collision,
                platform.controller.passengers(false),
            );
        }

        // 2. Actors.
        for (index, slot) in self.actors.iter_mut().enumerate() {
            let Some(actor) = slot.as_mut() else {
                continue;
            };
            match actor.motor.as_mut() {
                Some(motor) => {
                    let input = inputs
                        .get(&ActorId(index as u32))
                        .copied()
                        .unwrap_or_default();
                    motor.update(&mut actor.controller, &self.collision, input, dt);
                }
                None => {
                    actor.controller.move_by(&self.collision, Vec2::ZERO, false);
                }
            }
            sync_collider(&mut self.collision, actor.collider, actor.bounds());
        }

        self.tick_count += 1;
    }
}

fn move_passengers<'a>(
    actors: &mut [Option<Actor>],
    collision: &mut CollisionWorld,
    passengers: impl Iterator<Item = &'a PassengerMovement>,
) {
    for passenger in passengers {
        let Some(actor) = actors
            .get_mut(passenger.actor.0 as usize)
            .and_then(Option::as_mut)
        else {
            log::warn!(
                "Skipping passenger movement for missing actor {:?}",
                passenger.actor
            );
            continue;
        };

        let moved = actor.controller.move_by(
            &*collision,
            passenger.velocity,
            passenger.standing_on_platform,
        );
        log::trace!(
            "Platform moved '{}' by ({}, {})",
            actor.name,
            moved.x,
            moved.y
        );
        sync_collider(collision, actor.collider, actor.bounds());
    }
}

fn sync_collider(collision: &mut CollisionWorld, collider: ColliderHandle, bounds: Aabb) {
    if let Err(err) = collision.set_collider_position(collider, bounds.center()) {
        log::warn!("Could not sync collider {:?}: {}", collider, err);
    }
}
