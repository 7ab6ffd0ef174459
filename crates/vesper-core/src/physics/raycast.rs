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

//! Narrow-phase ray tests against individual collider shapes.

use crate::error::SetupError;
use crate::math::{Vec2, EPSILON};

use super::ColliderShape;

/// Twice the signed area of a polygon. Positive for counter-clockwise winding.
pub fn signed_area_doubled(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    (0..n)
        .map(|i| {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum()
}

/// Validates a convex polygon and returns it in counter-clockwise order.
pub fn make_ccw(mut vertices: Vec<Vec2>) -> Result<Vec<Vec2>, SetupError> {
    if vertices.iter().any(|v| !v.is_finite()) {
        return Err(SetupError::NonFinite { field: "vertices" });
    }
    let area = signed_area_doubled(&vertices);
    if vertices.len() < 3 || area.abs() < EPSILON {
        return Err(SetupError::DegeneratePolygon {
            vertex_count: vertices.len(),
        });
    }
    if area < 0.0 {
        log::debug!("Rewinding clockwise polygon with {} vertices", vertices.len());
        vertices.reverse();
    }

    let n = vertices.len();
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let c = vertices[(i + 2) % n];
        let e1 = b - a;
        let e2 = c - b;
        if e1.x * e2.y - e1.y * e2.x < -EPSILON {
            return Err(SetupError::ConcavePolygon);
        }
    }
    Ok(vertices)
}

/// Ray against an axis-aligned box centered on `center`.
#[inline]
pub fn ray_cuboid(
    center: Vec2,
    half_extents: Vec2,
    origin: Vec2,
    direction: Vec2,
    max_distance: f32,
) -> Option<(f32, Vec2)> {
    crate::math::Aabb::from_center_half_extents(center, half_extents).ray_intersection(
        origin,
        direction,
        max_distance,
    )
}

/// Ray against a convex counter-clockwise polygon offset by `position`
/// (Cyrus-Beck clipping).
///
/// Returns the entry distance and the outward normal of the entered edge. A
/// ray starting inside reports distance `0.0` with normal `-direction`.
pub fn ray_polygon(
    position: Vec2,
    vertices: &[Vec2],
    origin: Vec2,
    direction: Vec2,
    max_distance: f32,
) -> Option<(f32, Vec2)> {
    let n = vertices.len();
    if n < 3 {
        return None;
    }

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = max_distance;
    let mut normal = Vec2::ZERO;

    for i in 0..n {
        let a = vertices[i] + position;
        let b = vertices[(i + 1) % n] + position;
        let edge_normal = (b - a).perp_cw().normalize();

        let numerator = edge_normal.dot(a - origin);
        let denominator = edge_normal.dot(direction);

        if denominator.abs() < f32::EPSILON {
            // Parallel and on the outer side of this edge.
            if numerator < 0.0 {
                return None;
            }
            continue;
        }

        let t = numerator / denominator;
        if denominator < 0.0 {
            if t > t_enter {
                t_enter = t;
                normal = edge_normal;
            }
        } else {
            t_exit = t_exit.min(t);
        }

        if t_enter > t_exit {
            return None;
        }
    }

    if t_exit < 0.0 {
        return None;
    }
    if t_enter < 0.0 {
        return Some((0.0, -direction));
    }
    Some((t_enter, normal))
}

/// Dispatches a ray test on `shape` placed at `position`.
pub fn ray_shape(
    shape: &ColliderShape,
    position: Vec2,
    origin: Vec2,
    direction: Vec2,
    max_distance: f32,
) -> Option<(f32, Vec2)> {
    match shape {
        ColliderShape::Cuboid { half_extents } => {
            ray_cuboid(position, *half_extents, origin, direction, max_distance)
        }
        ColliderShape::Polygon { vertices } => {
            ray_polygon(position, vertices, origin, direction, max_distance)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp() -> Vec<Vec2> {
        vec![Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0), Vec2::new(0.0, 2.0)]
    }

    #[test]
    fn test_make_ccw_rejects_bad_polygons() {
        assert!(matches!(
            make_ccw(vec![Vec2::ZERO, Vec2::X]),
            Err(SetupError::DegeneratePolygon { vertex_count: 2 })
        ));
        assert!(matches!(
            make_ccw(vec![Vec2::ZERO, Vec2::X, Vec2::new(2.0, 0.0)]),
            Err(SetupError::DegeneratePolygon { .. })
        ));
        let arrow = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(1.0, 0.5),
            Vec2::new(1.0, 2.0),
        ];
        assert_eq!(make_ccw(arrow), Err(SetupError::ConcavePolygon));
    }

    #[test]
    fn test_make_ccw_reverses_clockwise_input() {
        let mut cw = ramp();
        cw.reverse();
        let ccw = make_ccw(cw).unwrap();
        assert!(signed_area_doubled(&ccw) > 0.0);
    }

    #[test]
    fn test_ray_polygon_hits_slope() {
        let (distance, normal) =
            ray_polygon(Vec2::ZERO, &ramp(), Vec2::new(0.5, 5.0), -Vec2::Y, 10.0).unwrap();
        assert_relative_eq!(distance, 3.5, epsilon = 1e-5);
        assert_relative_eq!(normal.x, std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-5);
        assert_relative_eq!(normal.y, std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-5);
    }

    #[test]
    fn test_ray_polygon_hits_vertical_side() {
        let (distance, normal) =
            ray_polygon(Vec2::new(3.0, 0.0), &ramp(), Vec2::new(1.0, 0.5), Vec2::X, 10.0).unwrap();
        assert_relative_eq!(distance, 2.0, epsilon = 1e-5);
        assert_relative_eq!(normal.x, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_ray_polygon_miss_and_range() {
        assert!(ray_polygon(Vec2::ZERO, &ramp(), Vec2::new(3.0, 5.0), -Vec2::Y, 10.0).is_none());
        assert!(ray_polygon(Vec2::ZERO, &ramp(), Vec2::new(0.5, 5.0), -Vec2::Y, 3.0).is_none());
    }

    #[test]
    fn test_ray_polygon_from_inside() {
        let (distance, normal) =
            ray_polygon(Vec2::ZERO, &ramp(), Vec2::new(0.2, 0.2), Vec2::X, 10.0).unwrap();
        assert_eq!(distance, 0.0);
        assert_eq!(normal, -Vec2::X);
    }

    #[test]
    fn test_ray_shape_dispatch() {
        let cube = ColliderShape::cuboid(Vec2::new(2.0, 2.0));
        let (distance, normal) =
            ray_shape(&cube, Vec2::ZERO, Vec2::new(0.0, 3.0), -Vec2::Y, 5.0).unwrap();
        assert_relative_eq!(distance, 2.0);
        assert_eq!(normal, Vec2::Y);
    }
}
