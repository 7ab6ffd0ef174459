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

//! Defines the error raised when a simulation object is built from bad input.
//!
//! Per-step movement never fails; everything that can go wrong is caught
//! here, before the first tick.

use thiserror::Error;

/// A fatal misconfiguration detected while building controllers, colliders or
/// platforms.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    /// A collider or actor box has a non-positive extent on some axis.
    #[error("degenerate collider size {width}x{height}: both extents must be positive")]
    DegenerateCollider {
        /// Requested width.
        width: f32,
        /// Requested height.
        height: f32,
    },
    /// A polygon has fewer than three vertices or no area.
    #[error("degenerate polygon with {vertex_count} vertices: need a convex shape with area")]
    DegeneratePolygon {
        /// Number of vertices supplied.
        vertex_count: usize,
    },
    /// A polygon is not convex.
    #[error("polygon is not convex")]
    ConcavePolygon,
    /// A numeric field is NaN or infinite.
    #[error("field '{field}' must be finite")]
    NonFinite {
        /// The offending field name.
        field: &'static str,
    },
    /// A numeric field that must be zero or positive was negative.
    #[error("field '{field}' must not be negative (got {value})")]
    Negative {
        /// The offending field name.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// The platform easing amount is outside `[0, 2]`.
    #[error("ease amount {0} is outside [0, 2]")]
    EaseOutOfRange(f32),
    /// The skin width is non-positive or too large for the collider.
    #[error("invalid skin width {skin_width} for a collider of size {width}x{height}")]
    InvalidSkinWidth {
        /// Requested skin width.
        skin_width: f32,
        /// Collider width.
        width: f32,
        /// Collider height.
        height: f32,
    },
    /// The spacing between rays must be strictly positive.
    #[error("distance between rays must be positive (got {0})")]
    InvalidRaySpacing(f32),
    /// The maximum slope angle must lie in `(0, 90)` degrees.
    #[error("max slope angle {0} must lie strictly between 0 and 90 degrees")]
    InvalidSlopeAngle(f32),
    /// A collision layer index is outside `0..32`.
    #[error("collision layer {0} is out of range (0..32)")]
    InvalidLayer(u32),
    /// An actor's collision mask includes the layer its own collider lives on.
    #[error("actor on layer {0} would collide with itself: remove the layer from its collision mask")]
    SelfCollidingActor(u32),
    /// A platform's passenger mask includes the layer its own collider lives on.
    #[error("platform on layer {0} would find itself as a passenger: remove the layer from its passenger mask")]
    SelfCarryingPlatform(u32),
    /// A referenced actor does not exist.
    #[error("unknown actor {0}")]
    UnknownActor(u32),
    /// A referenced collider does not exist.
    #[error("unknown collider {0}")]
    UnknownCollider(u64),
}

/// Returns [`SetupError::NonFinite`] unless `value` is finite.
pub fn ensure_finite(field: &'static str, value: f32) -> Result<(), SetupError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SetupError::NonFinite { field })
    }
}

/// Returns an error unless `value` is finite and not negative.
pub fn ensure_non_negative(field: &'static str, value: f32) -> Result<(), SetupError> {
    ensure_finite(field, value)?;
    if value < 0.0 {
        return Err(SetupError::Negative { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_helpers() {
        assert!(ensure_finite("speed", 1.0).is_ok());
        assert_eq!(
            ensure_finite("speed", f32::NAN),
            Err(SetupError::NonFinite { field: "speed" })
        );
        assert!(ensure_non_negative("wait_time", 0.0).is_ok());
        assert!(matches!(
            ensure_non_negative("wait_time", -1.0),
            Err(SetupError::Negative { field: "wait_time", .. })
        ));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let err = SetupError::DegenerateCollider {
            width: 0.0,
            height: 1.0,
        };
        assert!(err.to_string().contains("0x1"));
        assert_eq!(
            SetupError::EaseOutOfRange(3.0).to_string(),
            "ease amount 3 is outside [0, 2]"
        );
    }
}
