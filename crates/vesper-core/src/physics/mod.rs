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

//! # Physics Abstractions
//!
//! Contracts between the raycast controllers and whatever answers their ray
//! queries. Controllers only ever see [`SpatialQuery`] and [`Body`]; the
//! concrete collision world lives in `vesper-infra`.

use serde::{Deserialize, Serialize};
use std::ops::BitOr;

use crate::error::SetupError;
use crate::math::{Aabb, Vec2};

pub mod dynamic_tree;
pub mod raycast;

pub use self::dynamic_tree::DynamicTree;

/// Opaque handle to a collider registered in a spatial world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderHandle(pub u64);

/// Opaque handle to an actor (anything driven by a controller).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// A 32-bit set of collision layers.
///
/// Colliders live on exactly one layer; queries filter with a mask that may
/// name several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Matches nothing.
    pub const NONE: Self = Self(0);
    /// Matches every layer.
    pub const ALL: Self = Self(u32::MAX);

    /// Mask containing the single layer `index` (0..32). Out of range indices yield [`LayerMask::NONE`].
    #[inline]
    pub const fn layer(index: u32) -> Self {
        if index < 32 {
            Self(1 << index)
        } else {
            Self::NONE
        }
    }

    /// Returns `true` if the two masks share at least one layer.
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns `true` if every layer in `other` is also in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for LayerMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A half-line with a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Where the ray starts.
    pub origin: Vec2,
    /// Unit direction.
    pub direction: Vec2,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    pub fn new(origin: Vec2, direction: Vec2) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point at parameter `t` along the ray.
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec2 {
        self.origin + self.direction * t
    }
}

/// The nearest surface found by a ray query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
    /// World-space hit point.
    pub point: Vec2,
    /// Unit surface normal at the hit point.
    pub normal: Vec2,
    /// The collider that was hit.
    pub collider: ColliderHandle,
}

/// Supported collider shapes, expressed relative to the collider's position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Axis-aligned box with half-extents.
    Cuboid {
        /// Half the width and height.
        half_extents: Vec2,
    },
    /// Convex polygon; vertices in either winding order.
    Polygon {
        /// Local vertex positions.
        vertices: Vec<Vec2>,
    },
}

impl ColliderShape {
    /// Axis-aligned box of `size` centered on the collider position.
    pub fn cuboid(size: Vec2) -> Self {
        Self::Cuboid {
            half_extents: size.abs() * 0.5,
        }
    }

    /// Convex polygon. Clockwise input is rewound counter-clockwise.
    pub fn polygon(vertices: Vec<Vec2>) -> Result<Self, SetupError> {
        let vertices = raycast::make_ccw(vertices)?;
        Ok(Self::Polygon { vertices })
    }

    /// Bounds of the shape when its origin sits at `position`.
    pub fn aabb_at(&self, position: Vec2) -> Aabb {
        match self {
            Self::Cuboid { half_extents } => Aabb::from_center_half_extents(position, *half_extents),
            Self::Polygon { vertices } => Aabb::from_points(vertices)
                .map(|local| local.translated(position))
                .unwrap_or_else(|| Aabb::from_min_max(position, position)),
        }
    }

    /// Checks that the shape encloses some area.
    pub fn validate(&self) -> Result<(), SetupError> {
        match self {
            Self::Cuboid { half_extents } => {
                if !half_extents.is_finite() || half_extents.x <= 0.0 || half_extents.y <= 0.0 {
                    return Err(SetupError::DegenerateCollider {
                        width: half_extents.x * 2.0,
                        height: half_extents.y * 2.0,
                    });
                }
                Ok(())
            }
            Self::Polygon { vertices } => raycast::make_ccw(vertices.clone()).map(|_| ()),
        }
    }
}

/// A collision-queryable world.
///
/// Implementations must be usable read-only for the duration of a movement
/// step; ray casts never suspend.
pub trait SpatialQuery {
    /// Casts a ray and returns the nearest hit among colliders whose layer
    /// intersects `mask`, up to `max_distance` (which may be infinite).
    ///
    /// A ray that starts inside a collider hits it at distance `0.0`.
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RaycastHit>;

    /// The actor a collider belongs to, if any. Static geometry has none.
    fn collider_owner(&self, _collider: ColliderHandle) -> Option<ActorId> {
        None
    }
}

/// Anything with a world position and axis-aligned bounds that a controller can move.
pub trait Body {
    /// Current world position.
    fn position(&self) -> Vec2;

    /// Moves the body to `position`.
    fn set_position(&mut self, position: Vec2);

    /// Current world-space bounds of the body's collider.
    fn bounds(&self) -> Aabb;

    /// Moves the body by `delta`.
    fn translate(&mut self, delta: Vec2) {
        let position = self.position();
        self.set_position(position + delta);
    }
}
