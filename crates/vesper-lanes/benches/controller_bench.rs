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

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use vesper_core::math::Vec2;
use vesper_core::physics::{ActorId, Body, ColliderShape};
use vesper_data::components::BoxBody;
use vesper_data::config::{ControllerConfig, PlatformConfig, ACTOR_LAYER, GROUND_LAYER};
use vesper_infra::CollisionWorld;
use vesper_lanes::{Controller2D, PlatformController2D};

fn build_level() -> CollisionWorld {
    let mut world = CollisionWorld::new();
    world
        .add_static(
            ColliderShape::cuboid(Vec2::new(1000.0, 1.0)),
            Vec2::new(0.0, -0.5),
            GROUND_LAYER,
        )
        .unwrap();

    // A staircase of boxes and ramps to give the broad phase some work.
    for i in 0..200 {
        let x = i as f32 * 5.0 - 500.0;
        world
            .add_static(
                ColliderShape::cuboid(Vec2::new(2.0, 1.0)),
                Vec2::new(x, 3.0 + (i % 7) as f32),
                GROUND_LAYER,
            )
            .unwrap();
        let ramp = ColliderShape::polygon(vec![
            Vec2::ZERO,
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 1.0),
        ])
        .unwrap();
        world
            .add_static(ramp, Vec2::new(x + 2.5, 0.0), GROUND_LAYER)
            .unwrap();
    }
    world
}

fn bench_controller(c: &mut Criterion) {
    let world = build_level();
    let mut group = c.benchmark_group("Controller2D");

    group.bench_function("walk and fall", |b| {
        let mut controller = Controller2D::new(
            BoxBody::new(Vec2::new(0.0, 2.0), Vec2::new(1.0, 2.0)),
            ControllerConfig::default(),
        )
        .unwrap();
        let mut direction = 1.0;
        b.iter(|| {
            let moved = controller.move_by(&world, Vec2::new(0.2 * direction, -0.3), false);
            if controller.collisions().left || controller.collisions().right {
                direction = -direction;
            }
            if controller.body().position().x.abs() > 400.0 {
                direction = -controller.body().position().x.signum();
            }
            black_box(moved);
        });
    });

    group.bench_function("rest", |b| {
        let mut controller = Controller2D::new(
            BoxBody::new(Vec2::new(-1.0, 1.0), Vec2::new(1.0, 2.0)),
            ControllerConfig::default(),
        )
        .unwrap();
        b.iter(|| black_box(controller.move_by(&world, Vec2::ZERO, false)));
    });

    group.finish();
}

fn bench_platform_scan(c: &mut Criterion) {
    let mut world = build_level();
    for i in 0..8 {
        let center = Vec2::new(-3.5 + i as f32, 1.25);
        world
            .add_body_collider(
                ActorId(i),
                vesper_core::math::Aabb::from_center_half_extents(center, Vec2::new(0.5, 1.0)),
                ACTOR_LAYER,
            )
            .unwrap();
    }
    let mut platform = PlatformController2D::new(
        BoxBody::new(Vec2::ZERO, Vec2::new(8.0, 0.5)),
        &PlatformConfig::default(),
    )
    .unwrap();

    c.bench_function("PlatformController2D passenger scan", |b| {
        b.iter(|| {
            platform.calculate_passenger_movement(&world, Vec2::new(0.05, 0.0));
            black_box(platform.passenger_movement().len());
        });
    });
}

criterion_group!(benches, bench_controller, bench_platform_scan);
criterion_main!(benches);
