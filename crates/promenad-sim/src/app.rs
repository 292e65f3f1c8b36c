use glam::Vec3;
use promenad_core::{ActorId, Result};
use promenad_terrain::Terrain;

use crate::config::SimConfig;
use crate::history::History;
use crate::population::Population;
use crate::scenario::Scenario;

/// Goal speed for limbs following the world cursor.
const CURSOR_GOAL_SPEED: f32 = 4.0;
const CURSOR_GOAL_ACCELERATION: f32 = 16.0;
/// Frames rewound per update while rewinding a running simulation.
const REWIND_FRAMES: u64 = 2;

/// The sandbox: a scenario's population played through a fixed step, with
/// every step kept in a history ring for pausing and rewinding.
#[derive(Debug)]
pub struct App {
    config: SimConfig,
    scenario: Scenario,
    terrain: Terrain,
    history: History,
    world_cursor: Vec3,
    paused: bool,
    buffered_time: f32,
}

impl App {
    pub fn new(scenario: Scenario, config: SimConfig) -> Result<Self> {
        Self::with_terrain(scenario, config, Terrain::default())
    }

    pub fn with_terrain(scenario: Scenario, config: SimConfig, terrain: Terrain) -> Result<Self> {
        config.validate()?;
        let population = scenario.build(&config, &terrain)?;
        let history = History::new(population, config.history_frames);
        log::info!("starting {scenario} with {} history frames", history.capacity());
        Ok(Self {
            config,
            scenario,
            terrain,
            history,
            world_cursor: Vec3::ZERO,
            paused: false,
            buffered_time: 0.0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn population(&self) -> &Population {
        self.history.current()
    }

    /// The frame the next step starts from. Edits land in the history.
    pub fn population_mut(&mut self) -> &mut Population {
        self.history.current_mut()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn frame_count(&self) -> u64 {
        self.history.frame_count()
    }

    pub fn buffered_time(&self) -> f32 {
        self.buffered_time
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Feed one frame of wall time. Returns the number of steps simulated.
    pub fn update(&mut self, dt: f32) -> Result<u32> {
        let dt = if dt > self.config.max_frame_time {
            log::warn!(
                "frame took {:.1} ms, clamping to {:.1} ms",
                dt * 1000.0,
                self.config.max_frame_time * 1000.0
            );
            self.config.max_frame_time
        } else {
            dt.max(0.0)
        };

        if self.paused {
            return Ok(0);
        }

        self.buffered_time += dt;
        let mut steps = 0;
        while self.buffered_time >= self.config.step_time {
            self.buffered_time -= self.config.step_time;
            self.step()?;
            steps += 1;
        }
        Ok(steps)
    }

    /// A failed step leaves the previous frame current.
    fn step(&mut self) -> Result<()> {
        let frame = self.history.commit_step();
        if let Err(err) = frame.update(self.config.step_time, &self.config, &self.terrain) {
            self.history.abandon_step();
            log::error!("step failed at frame {}: {err}", self.history.frame_count());
            return Err(err);
        }
        log::trace!("simulated frame {}", self.history.frame_count());
        Ok(())
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        log::info!(
            "{} at frame {}",
            if self.paused { "paused" } else { "resumed" },
            self.frame_count()
        );
        self.paused
    }

    /// While paused, move `frames` forward: recorded frames are replayed,
    /// frames past the newest one are simulated. Returns frames advanced.
    pub fn step_forward(&mut self, frames: u64) -> Result<u64> {
        if !self.paused {
            log::debug!("step_forward ignored while running");
            return Ok(0);
        }
        let replayed = self.history.replay(frames);
        for _ in replayed..frames {
            self.step()?;
        }
        log::info!("stepped forward to frame {}", self.frame_count());
        Ok(frames)
    }

    /// Move `frames` back, stopping at the oldest frame held. Returns frames
    /// actually rewound.
    pub fn step_backward(&mut self, frames: u64) -> u64 {
        let rewound = self.history.rewind(frames);
        log::info!("stepped back to frame {}", self.frame_count());
        rewound
    }

    /// Rewind a couple of frames in place of this update's steps, for a
    /// rewind control that is held down while the simulation runs.
    pub fn rewind_while_running(&mut self) -> u64 {
        self.buffered_time = 0.0;
        self.history.rewind(REWIND_FRAMES)
    }

    pub fn world_cursor(&self) -> Vec3 {
        self.world_cursor
    }

    /// Move the cursor; in cursor-following scenarios every limb gets a goal
    /// there.
    pub fn move_world_cursor(&mut self, position: Vec3) -> Result<()> {
        self.world_cursor = position;
        if self.scenario.follows_cursor() {
            self.push_cursor_goal()?;
        }
        Ok(())
    }

    /// Aim every limb at the world cursor.
    pub fn push_cursor_goal(&mut self) -> Result<()> {
        let cursor = self.world_cursor;
        let population = self.history.current_mut();
        for &limb in population.limbs.ids() {
            population.limb_goals.put_limb_goal(
                limb,
                cursor,
                CURSOR_GOAL_SPEED,
                CURSOR_GOAL_ACCELERATION,
            )?;
        }
        Ok(())
    }

    /// The actor driven by [`App::drive_actor`], if the scenario has one.
    pub fn primary_actor(&self) -> Option<ActorId> {
        self.population().actors.ids().first().copied()
    }

    /// Tank controls. `forward` and `turn` are in [-1, 1] and scale the
    /// configured walking and turning speeds.
    pub fn drive_actor(&mut self, actor: ActorId, forward: f32, turn: f32) {
        let speed = self.config.actor_walking_speed * forward.clamp(-1.0, 1.0);
        let rotation = self.config.actor_turn_speed * turn.clamp(-1.0, 1.0);
        let actors = &mut self.history.current_mut().actors;
        actors.walk_actor(actor, speed);
        actors.turn_actor(actor, rotation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_is_rejected() {
        let config = SimConfig {
            step_time: 0.0,
            ..SimConfig::default()
        };
        assert!(App::new(Scenario::LimbForest, config).is_err());
    }

    #[test]
    fn only_cursor_scenarios_follow_the_cursor() {
        let mut forest = App::new(Scenario::LimbForest, SimConfig::default()).unwrap();
        forest.move_world_cursor(Vec3::new(1.0, 2.0, 0.0)).unwrap();
        assert_eq!(forest.population().limb_goals.len(), 100);

        let mut walker = App::new(Scenario::SingleActor, SimConfig::default()).unwrap();
        walker.move_world_cursor(Vec3::new(1.0, 2.0, 0.0)).unwrap();
        assert!(walker.population().limb_goals.is_empty());
        assert_eq!(walker.world_cursor(), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn failed_step_keeps_the_previous_frame() {
        use promenad_animation::{LimbGoalTable, LIMB_ID_RANGE};
        use promenad_core::PromenadError;

        let mut app = App::new(Scenario::SingleActor, SimConfig::default()).unwrap();
        let actor = app.primary_actor().unwrap();
        // No room for the first step's goal
        app.population_mut().limb_goals = LimbGoalTable::with_capacity(0, LIMB_ID_RANGE);

        let dt = app.config().step_time;
        let mut failure = None;
        for _ in 0..60 {
            let frame = app.frame_count();
            let position = app.population().actors.location(actor).position;
            if let Err(err) = app.update(dt) {
                failure = Some(err);
                assert_eq!(app.frame_count(), frame);
                assert_eq!(app.history().newest_frame(), frame);
                assert_eq!(app.population().actors.location(actor).position, position);
                break;
            }
        }
        assert!(matches!(
            failure,
            Some(PromenadError::CapacityExceeded { table: "limb goal", .. })
        ));
    }

    #[test]
    fn driving_turns_and_walks_the_actor() {
        let mut app = App::new(Scenario::SingleActor, SimConfig::default()).unwrap();
        let actor = app.primary_actor().unwrap();
        app.drive_actor(actor, 1.0, 2.0);
        let movement = app.population().actors.movement(actor);
        assert_eq!(movement.velocity.length(), 0.5);
        assert_eq!(movement.rotation_y, SimConfig::default().actor_turn_speed);
    }
}
