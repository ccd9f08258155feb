//! Simulation Driver
//!
//! Owns the ECS world and the per-timestep schedule, and feeds every
//! measurement to a [`Recorder`].

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use crate::components::field::BacteriaField;
use crate::components::grid::TimeGrid;
use crate::components::worm::Worm;
use crate::config::{ConfigError, SimConfig};
use crate::output::{OutputError, Recorder};
use crate::setup::spawn_worms;
use crate::systems::{build_schedule, SimulationState, TickRecords, WormSettings};
use crate::SimRng;

/// Outcome of [`Simulation::run`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub steps_completed: u64,
    /// True when the stop flag ended the run early
    pub interrupted: bool,
    /// Bacteria drops made by all worms
    pub drops: u64,
    /// Mean field concentration at the end of the run
    pub mean_concentration: f64,
}

pub struct Simulation<R: Recorder> {
    world: World,
    schedule: Schedule,
    recorder: R,
    time: TimeGrid,
    next_step: u64,
    drops: u64,
    flushed: bool,
    verbose: bool,
}

impl<R: Recorder> Simulation<R> {
    /// Validate `config`, build the field and spawn the worms.
    ///
    /// All randomness comes from one generator seeded with
    /// `config.random_seed`.
    pub fn new(config: &SimConfig, recorder: R) -> Result<Self, ConfigError> {
        let settings = config.validate()?;
        let mut rng = SmallRng::seed_from_u64(settings.random_seed);

        let mut world = World::new();
        world.insert_resource(SimulationState {
            current_step: 0,
            total_steps: settings.time.steps(),
        });
        world.insert_resource(WormSettings(settings.worm));
        world.insert_resource(BacteriaField::new(
            settings.grid,
            settings.time.dt,
            &settings.bacteria,
        ));
        world.insert_resource(TickRecords::new());

        spawn_worms(
            &mut world,
            settings.num_worms,
            &settings.grid,
            settings.min_separation,
            &settings.worm,
            &mut rng,
        );
        world.insert_resource(SimRng(rng));

        info!(
            "Initialized {} worms on a {}x{} grid, {} timesteps (seed {})",
            settings.num_worms,
            settings.grid.size(),
            settings.grid.size(),
            settings.time.steps(),
            settings.random_seed
        );

        Ok(Self {
            world,
            schedule: build_schedule(),
            recorder,
            time: settings.time,
            next_step: 0,
            drops: 0,
            flushed: false,
            verbose: config.verbose,
        })
    }

    /// Run the next timestep. Returns false once the time grid is exhausted.
    pub fn step(&mut self) -> bool {
        if self.next_step >= self.time.steps() {
            return false;
        }
        let t = self.next_step;
        self.world.resource_mut::<SimulationState>().current_step = t;

        self.schedule.run(&mut self.world);

        let (records, drops) = {
            let mut tick_records = self.world.resource_mut::<TickRecords>();
            let drops = tick_records.drops;
            (tick_records.drain(), drops)
        };
        self.drops += drops;
        for record in &records {
            self.recorder.record_worm(record);
        }
        self.recorder
            .record_field(t, self.world.resource::<BacteriaField>());

        self.next_step += 1;
        true
    }

    /// Run until the time grid is exhausted or `stop` is raised.
    ///
    /// `stop` is checked before each timestep. The recorder is flushed on
    /// every exit path.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<RunSummary, OutputError> {
        let total = self.time.steps();
        let mut interrupted = false;

        while self.next_step < total {
            if stop.load(Ordering::SeqCst) {
                interrupted = true;
                warn!("Ending early at timestep {} of {}", self.next_step, total);
                break;
            }
            let t = self.next_step;
            self.step();
            if self.verbose {
                info!("Timestep {} / {} (t = {:.4})", t + 1, total, self.time.time_at(t));
            } else {
                debug!("Timestep {} / {}", t + 1, total);
            }
        }

        self.finish()?;

        let summary = RunSummary {
            steps_completed: self.next_step,
            interrupted,
            drops: self.drops,
            mean_concentration: self.field().mean(),
        };
        info!(
            "Run finished after {} timesteps ({} drops, mean concentration {:.6})",
            summary.steps_completed, summary.drops, summary.mean_concentration
        );
        Ok(summary)
    }

    /// Flush the recorder. Only the first call has any effect.
    pub fn finish(&mut self) -> Result<(), OutputError> {
        if self.flushed {
            return Ok(());
        }
        self.flushed = true;
        self.recorder.flush()
    }

    /// Current worms, in id order
    pub fn worms(&mut self) -> Vec<Worm> {
        let mut worms: Vec<Worm> = self
            .world
            .query::<&Worm>()
            .iter(&self.world)
            .cloned()
            .collect();
        worms.sort_by_key(|worm| worm.id);
        worms
    }

    pub fn field(&self) -> &BacteriaField {
        self.world.resource::<BacteriaField>()
    }

    pub fn time_grid(&self) -> &TimeGrid {
        &self.time
    }

    /// Timesteps run so far
    pub fn steps_completed(&self) -> u64 {
        self.next_step
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn into_recorder(self) -> R {
        self.recorder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Keeper;

    fn small_config() -> SimConfig {
        SimConfig {
            verbose: false,
            x_min: -1.0,
            x_max: 1.0,
            dx: 0.1,
            t_min: 0.0,
            t_max: 0.01,
            dt: 0.001,
            num_worms: 3,
            worm_min_separation: 2.0,
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_step_stops_at_end_of_time_grid() {
        let mut sim = Simulation::new(&small_config(), Keeper::in_memory(0)).unwrap();
        let mut steps = 0;
        while sim.step() {
            steps += 1;
        }
        assert_eq!(steps, 10);
        assert!(!sim.step());
        assert_eq!(sim.recorder().history().len(), 30);
    }

    #[test]
    fn test_records_follow_loop_order() {
        let mut sim = Simulation::new(&small_config(), Keeper::in_memory(0)).unwrap();
        sim.step();
        sim.step();
        let history = sim.recorder().history();
        assert_eq!(history.t, vec![0, 0, 0, 1, 1, 1]);
        assert_eq!(history.worm_i, vec![0, 1, 2, 0, 1, 2]);
        assert_eq!(history.timestep, vec![1, 1, 1, 2, 2, 2]);
    }

    #[test]
    fn test_run_reports_summary() {
        let stop = AtomicBool::new(false);
        let mut sim = Simulation::new(&small_config(), Keeper::in_memory(0)).unwrap();
        let summary = sim.run(&stop).unwrap();

        assert_eq!(summary.steps_completed, 10);
        assert!(!summary.interrupted);
        assert_eq!(summary.drops, 0);
        assert!(sim.recorder().is_flushed());
    }

    #[test]
    fn test_raised_flag_stops_before_first_step() {
        let stop = AtomicBool::new(true);
        let mut sim = Simulation::new(&small_config(), Keeper::in_memory(0)).unwrap();
        let summary = sim.run(&stop).unwrap();

        assert_eq!(summary.steps_completed, 0);
        assert!(summary.interrupted);
        assert!(sim.recorder().history().is_empty());
        assert!(sim.recorder().is_flushed());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SimConfig {
            dx: 0.0,
            ..small_config()
        };
        let result = Simulation::new(&config, Keeper::in_memory(0));
        assert!(matches!(result, Err(ConfigError::InvalidGrid(_))));
    }

    #[test]
    fn test_worms_are_sorted_by_id() {
        let mut sim = Simulation::new(&small_config(), Keeper::in_memory(0)).unwrap();
        let ids: Vec<u32> = sim.worms().iter().map(|w| w.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
