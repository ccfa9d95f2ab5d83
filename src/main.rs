use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::info;

use rusted_physics::engine::physics::{BroadPhaseMode, DebugLines, Shape};
use rusted_physics::{BodyBuilder, CollisionLayer, GameLoop, PhysicsWorld, WorldConfig};

const DEFAULT_STEPS: u64 = 600;

/// Simulated frame length fed to the fixed-step driver
const FRAME_TIME: Duration = Duration::from_micros(33_333);

/// Steps between status lines
const REPORT_INTERVAL: u64 = 120;

#[derive(Debug, Clone, Copy)]
enum Scene {
    Pile,
    Bounce,
    Slide,
}

impl Scene {
    fn parse(name: &str) -> Result<Self> {
        match name {
            "pile" => Ok(Scene::Pile),
            "bounce" => Ok(Scene::Bounce),
            "slide" => Ok(Scene::Slide),
            other => bail!("Unknown scene '{}' (expected pile, bounce or slide)", other),
        }
    }

    fn config(self) -> WorldConfig {
        match self {
            Scene::Pile => WorldConfig {
                broad_phase: BroadPhaseMode::Grid { cell_size: 2.0 },
                ..WorldConfig::default()
            },
            _ => WorldConfig::default(),
        }
    }

    fn populate(self, world: &mut PhysicsWorld) {
        // shared floor, top face at y = 0
        world.add_body(
            BodyBuilder::new_static()
                .position(0.0, -1.0)
                .box_shape(30.0, 1.0)
                .friction(0.8)
                .build(),
        );

        match self {
            Scene::Pile => {
                for row in 0..8 {
                    for col in 0..6 {
                        let x = col as f32 * 1.2 - 3.0 + (row % 2) as f32 * 0.3;
                        let y = 1.0 + row as f32 * 1.3;
                        let shape = if (row + col) % 2 == 0 {
                            Shape::circle(0.5)
                        } else {
                            Shape::cuboid(0.5, 0.5)
                        };
                        world.add_body(
                            BodyBuilder::new_dynamic()
                                .position(x, y)
                                .shape(shape)
                                .restitution(0.1)
                                .user_data((row * 6 + col) as u64)
                                .build(),
                        );
                    }
                }
            }
            Scene::Bounce => {
                for i in 0..5 {
                    world.add_body(
                        BodyBuilder::new_dynamic()
                            .position(i as f32 * 2.0 - 4.0, 6.0)
                            .circle(0.5)
                            .restitution(i as f32 * 0.25)
                            .layer(CollisionLayer::bit(0))
                            .user_data(i)
                            .build(),
                    );
                }
                // sensor band the balls fall through
                world.add_body(
                    BodyBuilder::new_static()
                        .position(0.0, 3.0)
                        .box_shape(6.0, 0.25)
                        .trigger(true)
                        .build(),
                );
            }
            Scene::Slide => {
                for (i, friction) in [0.0, 0.2, 0.5, 1.0].into_iter().enumerate() {
                    world.add_body(
                        BodyBuilder::new_dynamic()
                            .position(-10.0, 0.5 + i as f32 * 3.0)
                            .box_shape(0.5, 0.5)
                            .linvel(8.0, 0.0)
                            .friction(friction)
                            .lock_rotation()
                            .user_data(i as u64)
                            .build(),
                    );
                    // shelf for each box above the floor
                    if i > 0 {
                        world.add_body(
                            BodyBuilder::new_static()
                                .position(0.0, i as f32 * 3.0 - 0.25)
                                .box_shape(30.0, 0.25)
                                .friction(0.8)
                                .build(),
                        );
                    }
                }
            }
        }
    }
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut args = std::env::args().skip(1);
    let scene = Scene::parse(args.next().as_deref().unwrap_or("pile"))?;
    let steps = match args.next() {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("Invalid step count '{}'", raw))?,
        None => DEFAULT_STEPS,
    };

    info!("Starting scene {:?} for {} steps", scene, steps);

    let mut world = PhysicsWorld::try_with_config(scene.config())?;
    scene.populate(&mut world);

    let contacts = Rc::new(Cell::new(0u64));
    let counter = Rc::clone(&contacts);
    world.set_on_collision(move |_| counter.set(counter.get() + 1));
    world.set_on_trigger_enter(|a, b| info!("Trigger enter: {:?} / {:?}", a, b));
    world.set_on_trigger_exit(|a, b| info!("Trigger exit: {:?} / {:?}", a, b));

    let mut game_loop = GameLoop::try_with_timestep(world.timestep())?;
    while world.step_count() < steps {
        let updates = game_loop.advance(FRAME_TIME);
        for _ in 0..updates {
            if world.step_count() >= steps {
                break;
            }
            world.step(world.timestep());
            if world.step_count() % REPORT_INTERVAL == 0 {
                report(&world, contacts.get());
            }
        }
    }

    info!(
        "Finished {} steps ({:.2}s simulated), {} contacts resolved",
        world.step_count(),
        world.step_count() as f32 * world.timestep(),
        contacts.get()
    );
    report(&world, contacts.get());

    if log::log_enabled!(log::Level::Debug) {
        let mut lines = DebugLines::new();
        lines.set_enabled(true);
        lines.prepare(&world);
        log::debug!(
            "Debug geometry: {} lines, {} bytes of vertices",
            lines.line_count(),
            lines.vertex_bytes().len()
        );
    }

    Ok(())
}

fn report(world: &PhysicsWorld, contacts: u64) {
    info!(
        "step {}: {} bodies, {} contacts so far",
        world.step_count(),
        world.body_count(),
        contacts
    );
    for (handle, body) in world.bodies().filter(|(_, b)| b.is_dynamic()) {
        info!(
            "  #{} {:?}: pos ({:.3}, {:.3}) vel ({:.3}, {:.3})",
            body.user_data,
            handle,
            body.position.x,
            body.position.y,
            body.linear_velocity.x,
            body.linear_velocity.y
        );
    }
}
