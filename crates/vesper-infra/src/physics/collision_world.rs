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

//! Collision world built on the dynamic AABB tree.

use vesper_core::math::{Aabb, Vec2};
use vesper_core::physics::raycast::ray_shape;
use vesper_core::physics::{
    ActorId, ColliderHandle, ColliderShape, DynamicTree, LayerMask, RaycastHit, SpatialQuery,
};
use vesper_core::SetupError;

#[derive(Debug, Clone)]
struct ColliderEntry {
    shape: ColliderShape,
    position: Vec2,
    layer: LayerMask,
    owner: Option<ActorId>,
    proxy: i32,
}

impl ColliderEntry {
    fn aabb(&self) -> Aabb {
        self.shape.aabb_at(self.position)
    }
}

/// Owns every collider in a scene and answers ray queries against them.
///
/// Static geometry and actor colliders share one broad phase. Handles are
/// never reused, so a stale handle can only miss, never alias.
#[derive(Debug, Default)]
pub struct CollisionWorld {
    colliders: Vec<Option<ColliderEntry>>,
    tree: DynamicTree<ColliderHandle>,
}

impl CollisionWorld {
    /// Creates an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a collider that belongs to no actor.
    pub fn add_static(
        &mut self,
        shape: ColliderShape,
        position: Vec2,
        layer: u32,
    ) -> Result<ColliderHandle, SetupError> {
        self.insert(shape, position, layer, None)
    }

    /// Adds a box collider covering `bounds`, tagged with its owning actor.
    pub fn add_body_collider(
        &mut self,
        owner: ActorId,
        bounds: Aabb,
        layer: u32,
    ) -> Result<ColliderHandle, SetupError> {
        self.insert(ColliderShape::cuboid(bounds.size()), bounds.center(), layer, Some(owner))
    }

    fn insert(
        &mut self,
        shape: ColliderShape,
        position: Vec2,
        layer: u32,
        owner: Option<ActorId>,
    ) -> Result<ColliderHandle, SetupError> {
        shape.validate()?;
        if !position.is_finite() {
            return Err(SetupError::NonFinite { field: "position" });
        }
        if layer >= 32 {
            return Err(SetupError::InvalidLayer(layer));
        }

        let handle = ColliderHandle(self.colliders.len() as u64);
        let proxy = self.tree.insert(shape.aabb_at(position), handle);
        self.colliders.push(Some(ColliderEntry {
            shape,
            position,
            layer: LayerMask::layer(layer),
            owner,
            proxy,
        }));

        log::debug!(
            "Registered collider {:?} on layer {} (owner: {:?})",
            handle,
            layer,
            owner
        );
        Ok(handle)
    }

    fn entry(&self, handle: ColliderHandle) -> Option<&ColliderEntry> {
        self.colliders.get(handle.0 as usize)?.as_ref()
    }

    /// Moves a collider and refreshes its broad-phase proxy.
    pub fn set_collider_position(
        &mut self,
        handle: ColliderHandle,
        position: Vec2,
    ) -> Result<(), SetupError> {
        let entry = self
            .colliders
            .get_mut(handle.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(SetupError::UnknownCollider(handle.0))?;

        let displacement = position - entry.position;
        entry.position = position;
        let aabb = entry.aabb();
        let proxy = entry.proxy;
        self.tree.update(proxy, aabb, displacement, false);
        Ok(())
    }

    /// Removes a collider. Returns `false` if the handle was unknown.
    pub fn remove(&mut self, handle: ColliderHandle) -> bool {
        let Some(entry) = self
            .colliders
            .get_mut(handle.0 as usize)
            .and_then(Option::take)
        else {
            return false;
        };
        self.tree.remove(entry.proxy);
        log::debug!("Removed collider {:?}", handle);
        true
    }

    /// The actor owning a collider, if any.
    pub fn owner(&self, handle: ColliderHandle) -> Option<ActorId> {
        self.entry(handle)?.owner
    }

    /// Current position of a collider.
    pub fn collider_position(&self, handle: ColliderHandle) -> Option<Vec2> {
        self.entry(handle).map(|entry| entry.position)
    }

    /// Exact bounds of a collider.
    pub fn collider_aabb(&self, handle: ColliderHandle) -> Option<Aabb> {
        self.entry(handle).map(ColliderEntry::aabb)
    }

    /// Number of live colliders.
    pub fn collider_count(&self) -> usize {
        self.tree.len()
    }

    /// Colliders on `mask` whose bounds overlap `aabb`, in handle order.
    pub fn overlapping(&self, aabb: &Aabb, mask: LayerMask) -> Vec<ColliderHandle> {
        let mut found = Vec::new();
        self.tree.query(aabb, |&handle| {
            if let Some(entry) = self.entry(handle) {
                if entry.layer.intersects(mask) && entry.aabb().intersects_aabb(aabb) {
                    found.push(handle);
                }
            }
            true
        });
        found.sort();
        found
    }
}

impl SpatialQuery for CollisionWorld {
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RaycastHit> {
        let direction = direction.normalize();
        if direction == Vec2::ZERO || max_distance < 0.0 || max_distance.is_nan() {
            return None;
        }

        let mut nearest: Option<RaycastHit> = None;
        self.tree
            .ray_cast(origin, direction, max_distance, |&handle, best| {
                let entry = self.entry(handle)?;
                if !entry.layer.intersects(mask) {
                    return None;
                }
                let (distance, normal) =
                    ray_shape(&entry.shape, entry.position, origin, direction, best)?;
                if nearest.is_some_and(|hit| hit.distance <= distance) {
                    return None;
                }
                nearest = Some(RaycastHit {
                    distance,
                    point: origin + direction * distance,
                    normal,
                    collider: handle,
                });
                Some(distance)
            });
        nearest
    }

    fn collider_owner(&self, collider: ColliderHandle) -> Option<ActorId> {
        self.owner(collider)
    }
}
