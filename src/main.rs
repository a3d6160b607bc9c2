//! Strider - headless movement demo.
//!
//! Spawns a character in the test arena and drives it through a scripted
//! sequence of inputs, logging what the movement solver did once per
//! second of simulated time.
//!
//! Usage: `strider [character-config.json]`

use anyhow::Context;
use strider_game::input::{ActionInput, MoveKeys};
use strider_game::{CharacterConfig, Level, PlayerInput, Simulation, SimulationConfig};

/// One scripted stretch of input.
struct Phase {
    name: &'static str,
    seconds: f32,
    input: PlayerInput,
}

fn script() -> Vec<Phase> {
    let forward = MoveKeys {
        forward: true,
        ..Default::default()
    };

    vec![
        Phase {
            name: "walk",
            seconds: 2.0,
            input: PlayerInput {
                movement: forward,
                actions: ActionInput {
                    walk: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        },
        Phase {
            name: "run over the step",
            seconds: 2.0,
            input: PlayerInput {
                movement: forward,
                ..Default::default()
            },
        },
        Phase {
            name: "sprint",
            seconds: 1.0,
            input: PlayerInput {
                movement: forward,
                actions: ActionInput {
                    sprint: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        },
        Phase {
            name: "crouch",
            seconds: 1.0,
            input: PlayerInput {
                movement: forward,
                actions: ActionInput {
                    crouch: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        },
        Phase {
            name: "jump",
            seconds: 1.0,
            input: PlayerInput {
                actions: ActionInput {
                    jump: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        },
        Phase {
            name: "turn",
            seconds: 1.0,
            input: PlayerInput {
                mouse_delta: (20.0, 0.0),
                movement: forward,
                ..Default::default()
            },
        },
        Phase {
            name: "idle",
            seconds: 1.0,
            input: PlayerInput::default(),
        },
    ]
}

fn load_config() -> anyhow::Result<CharacterConfig> {
    match std::env::args().nth(1) {
        Some(path) => CharacterConfig::load(&path)
            .with_context(|| format!("loading character config from {path}")),
        None => Ok(CharacterConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = SimulationConfig {
        character: load_config()?,
        ..Default::default()
    };
    let mut sim = Simulation::new(config, Level::test_arena());
    let id = sim.add_character("demo").context("spawning demo character")?;

    let tick_rate = sim.config.tick_rate.max(1);
    log::info!("running {} at {tick_rate} Hz", sim.level.name);

    for phase in script() {
        log::info!("phase: {}", phase.name);
        let ticks = (phase.seconds * tick_rate as f32).round() as u32;

        for tick in 1..=ticks {
            let input = PlayerInput {
                frame: sim.frame as u32,
                ..phase.input.clone()
            };
            sim.tick(std::slice::from_ref(&input))?;

            if tick % tick_rate == 0 || tick == ticks {
                let Some(character) = sim.get_character(id) else {
                    anyhow::bail!("demo character {id} disappeared");
                };
                let snapshot = character.snapshot();
                log::info!(
                    "frame {:>4} pos {:.2} grounded {} slope {:.1} module {} speed {:.2} stance {:?}",
                    sim.frame,
                    character.position(),
                    snapshot.grounded,
                    snapshot.slope_angle,
                    snapshot.module.unwrap_or("-"),
                    snapshot.speed,
                    snapshot.locomotion,
                );
            }
        }
    }

    Ok(())
}
