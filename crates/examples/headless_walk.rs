//! Walks the single-actor scenario without a window and logs where the actor
//! and its feet are. Pass a JSON config path to override the defaults.
//!
//! ```text
//! RUST_LOG=debug cargo run --bin headless_walk -- my_config.json
//! ```

use promenad::prelude::*;

const SECONDS: u32 = 10;
// Frame time deliberately off the step time, so the accumulator has work.
const FRAME_TIME: f32 = 1.0 / 50.0;

fn run() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    let mut app = App::new(Scenario::SingleActor, config)?;
    let actor = app
        .primary_actor()
        .ok_or_else(|| PromenadError::InvalidConfiguration("scenario has no actor".into()))?;

    let frames_per_second = (1.0 / FRAME_TIME).round() as u32;
    for second in 1..=SECONDS {
        for _ in 0..frames_per_second {
            app.update(FRAME_TIME)?;
        }

        let population = app.population();
        let position = population.actors.location(actor).position;
        let feet: Vec<String> = population
            .legs
            .iter()
            .map(|(_, leg)| {
                let tip = population.limbs.tip_position(leg);
                let state = if population.limb_goals.has_limb_goal(leg) { "swing" } else { "stance" };
                format!("({:.2}, {:.2}) {state}", tip.x, tip.y)
            })
            .collect();
        log::info!(
            "t={second}s frame {} actor x={:.2} feet {}",
            app.frame_count(),
            position.x,
            feet.join(" / ")
        );
    }

    // Look back at the last second, then replay half of it
    app.toggle_pause();
    let rewound = app.step_backward(60);
    let x_then = app.population().actors.location(actor).position.x;
    log::info!("rewound {rewound} frames, actor was at x={x_then:.2}");
    app.step_forward(30)?;
    log::info!("replayed to frame {}", app.frame_count());

    // Turn left on resume
    app.toggle_pause();
    app.drive_actor(actor, 1.0, 1.0);
    for _ in 0..frames_per_second {
        app.update(FRAME_TIME)?;
    }
    let location = app.population().actors.location(actor);
    log::info!(
        "after turning: position {} heading {:.1} degrees",
        location.position,
        location.orientation_y.to_degrees()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    println!("=== Promenad headless walk ===");
    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
