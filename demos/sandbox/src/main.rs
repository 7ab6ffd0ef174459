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

// Vesper sandbox
// Runs a scene headlessly with a scripted player and logs contact state.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use vesper_sdk::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "sandbox", about = "Run a Vesper scene with a scripted player")]
struct Args {
    /// Scene file (.json or .ron).
    #[arg(long, default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/scenes/level.json"))]
    scene: PathBuf,

    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Fixed timestep in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Name of the actor that receives the scripted input.
    #[arg(long, default_value = "player")]
    player: String,
}

/// Input timeline: run right over the ramp, hop a few times, then come back.
fn scripted_input(time: f32, previous_time: f32) -> MotorInput {
    let horizontal = match time {
        t if t < 4.0 => 1.0,
        t if t < 5.0 => 0.0,
        t if t < 8.0 => -1.0,
        _ => 0.0,
    };
    let jump_at = [1.0, 2.5, 6.0, 6.2];
    let jump_pressed = jump_at
        .iter()
        .any(|&at| previous_time < at && time >= at);

    MotorInput {
        horizontal,
        jump_pressed,
    }
}

fn describe(collisions: &CollisionInfo) -> String {
    let mut flags = Vec::new();
    for (set, name) in [
        (collisions.below, "below"),
        (collisions.above, "above"),
        (collisions.left, "left"),
        (collisions.right, "right"),
        (collisions.climbing_slope, "climbing"),
        (collisions.descending_slope, "descending"),
        (collisions.sliding_down_max_slope, "sliding"),
    ] {
        if set {
            flags.push(name);
        }
    }
    if flags.is_empty() {
        "airborne".to_string()
    } else {
        format!("{} (slope {:.1})", flags.join(", "), collisions.slope_angle)
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if !(args.dt > 0.0 && args.dt.is_finite()) {
        bail!("timestep must be positive, got {}", args.dt);
    }

    let mut world = GameWorld::load(&args.scene)?;
    let player = world
        .actors()
        .find(|(_, actor)| actor.name() == args.player)
        .map(|(id, _)| id)
        .with_context(|| format!("scene has no actor named '{}'", args.player))?;

    let mut inputs = HashMap::new();
    let mut time = 0.0;

    for tick in 0..args.ticks {
        let next_time = time + args.dt;
        inputs.insert(player, scripted_input(next_time, time));
        world.tick(args.dt, &inputs);
        time = next_time;

        for (id, actor) in world.actors() {
            let position = actor.position();
            log::debug!(
                "[{tick:>4}] {} ({:?}) at ({:.3}, {:.3}): {}",
                actor.name(),
                id,
                position.x,
                position.y,
                describe(actor.collisions())
            );
        }

        if tick % 60 == 0 {
            if let Some(actor) = world.actor(player) {
                let position = actor.position();
                log::info!(
                    "t = {:.2}s  {} at ({:.2}, {:.2}): {}",
                    time,
                    actor.name(),
                    position.x,
                    position.y,
                    describe(actor.collisions())
                );
            }
        }
    }

    for (_, platform) in world.platforms() {
        let position = platform.position();
        log::info!(
            "Platform '{}' finished at ({:.2}, {:.2})",
            platform.name(),
            position.x,
            position.y
        );
    }
    log::info!("Simulated {} tick(s)", world.tick_count());
    Ok(())
}
