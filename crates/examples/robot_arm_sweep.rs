//! Sweeps the world cursor around the constrained robot arm and reports how
//! close the arm gets to each point.

use glam::Vec3;
use promenad::prelude::*;

const SWEEP_POINTS: u32 = 12;
const STEPS_PER_POINT: u32 = 90;

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = SimConfig::default();
    let dt = config.step_time;
    let mut app = match App::new(Scenario::RobotArm, config) {
        Ok(app) => app,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    println!("=== Promenad robot arm sweep ===");
    for i in 0..SWEEP_POINTS {
        let angle = i as f32 / SWEEP_POINTS as f32 * std::f32::consts::TAU;
        let cursor = Vec3::new(2.5 * angle.cos(), 2.0 + 1.5 * angle.sin(), 0.0);
        if let Err(e) = app.move_world_cursor(cursor) {
            log::error!("{e}");
            break;
        }
        for _ in 0..STEPS_PER_POINT {
            if let Err(e) = app.update(dt) {
                log::error!("{e}");
                return;
            }
        }

        let population = app.population();
        let arm = population.limbs.ids()[0];
        let tip = population.limbs.tip_position(arm);
        log::info!(
            "cursor {cursor:.2} tip {tip:.2} miss {:.3}",
            tip.distance(cursor)
        );
    }
}
