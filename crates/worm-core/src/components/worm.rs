//! Worm Components
//!
//! A worm alternates between running (near-straight motion with small
//! heading noise) and tumbling (turning in place). While bacteria are
//! enabled it also drops bacteria into the field at a fixed cadence.

use bevy_ecs::prelude::*;
use rand::Rng;
use rand_distr::{Distribution, Exp, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use worm_events::{StateCode, WormRecord};

use crate::config::{ConfigError, SimConfig};

use super::field::BacteriaField;

/// Identifier for a worm; also its position in the stepping order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WormId(pub u32);

/// The two motion states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionKind {
    Run,
    Tumble,
}

impl MotionKind {
    pub fn other(self) -> Self {
        match self {
            MotionKind::Run => MotionKind::Tumble,
            MotionKind::Tumble => MotionKind::Run,
        }
    }
}

impl From<MotionKind> for StateCode {
    fn from(kind: MotionKind) -> Self {
        match kind {
            MotionKind::Run => StateCode::Run,
            MotionKind::Tumble => StateCode::Tumble,
        }
    }
}

/// Current motion state with its timer and sampled duration (in steps).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionState {
    Run { timer: u32, duration: f64 },
    Tumble { timer: u32, duration: f64 },
}

/// Result of advancing a state timer by one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateTick {
    /// Still within the current state
    Continue(MotionState),
    /// The current state has lasted its duration; enter this kind next
    Elapsed(MotionKind),
}

impl MotionState {
    /// Fresh state of `kind` with a zeroed timer.
    pub fn enter(kind: MotionKind, duration: f64) -> Self {
        match kind {
            MotionKind::Run => MotionState::Run { timer: 0, duration },
            MotionKind::Tumble => MotionState::Tumble { timer: 0, duration },
        }
    }

    pub fn kind(&self) -> MotionKind {
        match self {
            MotionState::Run { .. } => MotionKind::Run,
            MotionState::Tumble { .. } => MotionKind::Tumble,
        }
    }

    pub fn timer(&self) -> u32 {
        match *self {
            MotionState::Run { timer, .. } | MotionState::Tumble { timer, .. } => timer,
        }
    }

    pub fn duration(&self) -> f64 {
        match *self {
            MotionState::Run { duration, .. } | MotionState::Tumble { duration, .. } => duration,
        }
    }

    /// Count one step. The state ends once its timer reaches its duration.
    pub fn tick(self) -> StateTick {
        let timer = self.timer() + 1;
        if f64::from(timer) >= self.duration() {
            return StateTick::Elapsed(self.kind().other());
        }
        StateTick::Continue(match self {
            MotionState::Run { duration, .. } => MotionState::Run { timer, duration },
            MotionState::Tumble { duration, .. } => MotionState::Tumble { timer, duration },
        })
    }
}

/// Drop cadence for worms that feed the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deposition {
    /// Worm timesteps between drops
    pub interval: u64,
    pub amount: f64,
}

/// Worm settings shared by every worm in a run.
#[derive(Debug, Clone, Copy)]
pub struct WormParams {
    pub step_size: f64,
    /// Heading noise added each running step
    pub turn_noise: Normal<f64>,
    pub run_duration: Exp<f64>,
    pub tumble_duration: Exp<f64>,
    /// False keeps every worm running forever
    pub run_tumble: bool,
    pub deposition: Option<Deposition>,
}

impl WormParams {
    pub fn new(
        step_size: f64,
        turn_noise: f64,
        mean_run_duration: f64,
        mean_tumble_duration: f64,
    ) -> Result<Self, ConfigError> {
        if !step_size.is_finite() || step_size < 0.0 {
            return Err(ConfigError::invalid(
                "worm_step_size",
                "must be a non-negative number",
            ));
        }
        if !turn_noise.is_finite() || turn_noise < 0.0 {
            return Err(ConfigError::invalid(
                "worm_turn_noise",
                "must be a non-negative number",
            ));
        }
        let turn_noise = Normal::new(0.0, turn_noise)
            .map_err(|e| ConfigError::invalid("worm_turn_noise", e.to_string()))?;
        Ok(Self {
            step_size,
            turn_noise,
            run_duration: exponential("worm_mean_run_duration", mean_run_duration)?,
            tumble_duration: exponential("worm_mean_tumble_duration", mean_tumble_duration)?,
            run_tumble: true,
            deposition: None,
        })
    }

    /// Disable the state machine; worms only ever run.
    pub fn always_running(mut self) -> Self {
        self.run_tumble = false;
        self
    }

    pub fn with_deposition(mut self, interval: u64, amount: f64) -> Self {
        self.deposition = Some(Deposition { interval, amount });
        self
    }

    pub fn from_config(config: &SimConfig) -> Result<Self, ConfigError> {
        let mut params = Self::new(
            config.worm_step_size,
            config.worm_turn_noise,
            config.worm_mean_run_duration,
            config.worm_mean_tumble_duration,
        )?;
        params.run_tumble = config.worm_run_tumble;

        if config.bacteria_enabled {
            if config.bacteria_drop_interval == 0 {
                return Err(ConfigError::invalid(
                    "bacteria_drop_interval",
                    "must be at least one timestep",
                ));
            }
            if !config.bacteria_amount.is_finite() {
                return Err(ConfigError::invalid("bacteria_amount", "must be finite"));
            }
            params = params.with_deposition(config.bacteria_drop_interval, config.bacteria_amount);
        }
        Ok(params)
    }
}

fn exponential(name: &'static str, mean: f64) -> Result<Exp<f64>, ConfigError> {
    if !mean.is_finite() || mean <= 0.0 {
        return Err(ConfigError::invalid(name, "mean duration must be positive"));
    }
    Exp::new(1.0 / mean).map_err(|e| ConfigError::invalid(name, e.to_string()))
}

/// Component: one worm.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Worm {
    pub id: WormId,
    pub x: f64,
    pub y: f64,
    /// Heading in radians, within [0, 2π)
    pub angle: f64,
    pub state: MotionState,
    /// Steps taken by this worm
    pub timestep: u64,
    pub next_drop_timestep: u64,
}

impl Worm {
    /// Create a running worm at `(x, y)`.
    ///
    /// Draws the initial heading, then the first run duration.
    pub fn spawn<R: Rng + ?Sized>(
        id: WormId,
        x: f64,
        y: f64,
        params: &WormParams,
        rng: &mut R,
    ) -> Self {
        let angle = rng.gen_range(0.0..TAU);
        let duration = params.run_duration.sample(rng);
        Self {
            id,
            x,
            y,
            angle,
            state: MotionState::enter(MotionKind::Run, duration),
            timestep: 0,
            next_drop_timestep: 0,
        }
    }

    pub fn kind(&self) -> MotionKind {
        self.state.kind()
    }

    /// Advance one timestep. Returns true if the worm dropped bacteria.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        params: &WormParams,
        field: &mut BacteriaField,
        rng: &mut R,
    ) -> bool {
        self.update_heading(params, rng);
        self.update_position(params, field);
        if params.run_tumble {
            self.update_state(params, rng);
        }
        let dropped = self.drop_bacteria(params, field);
        self.timestep += 1;
        dropped
    }

    fn update_heading<R: Rng + ?Sized>(&mut self, params: &WormParams, rng: &mut R) {
        self.angle = match self.kind() {
            MotionKind::Run => self.angle + params.turn_noise.sample(rng),
            MotionKind::Tumble => rng.gen_range(0.0..TAU),
        };
        self.angle = normalize_angle(self.angle);
    }

    /// Walls stop motion per axis; a blocked axis keeps its old coordinate.
    fn update_position(&mut self, params: &WormParams, field: &BacteriaField) {
        let (next_x, next_y) = match self.kind() {
            MotionKind::Run => (
                self.x + params.step_size * self.angle.cos(),
                self.y + params.step_size * self.angle.sin(),
            ),
            MotionKind::Tumble => (self.x, self.y),
        };

        let grid = field.grid();
        if grid.contains(next_x) {
            self.x = next_x;
        }
        if grid.contains(next_y) {
            self.y = next_y;
        }
    }

    fn update_state<R: Rng + ?Sized>(&mut self, params: &WormParams, rng: &mut R) {
        self.state = match self.state.tick() {
            StateTick::Continue(state) => state,
            StateTick::Elapsed(next) => {
                let duration = match next {
                    MotionKind::Run => params.run_duration.sample(rng),
                    MotionKind::Tumble => params.tumble_duration.sample(rng),
                };
                MotionState::enter(next, duration)
            }
        };
    }

    /// Missed drops are not made up: the schedule advances by one interval.
    fn drop_bacteria(&mut self, params: &WormParams, field: &mut BacteriaField) -> bool {
        let Some(deposition) = params.deposition else {
            return false;
        };
        if self.timestep < self.next_drop_timestep {
            return false;
        }
        field.deposit_at(self.x, self.y, deposition.amount);
        self.next_drop_timestep += deposition.interval;
        true
    }

    /// Measurement of this worm at loop step `t`.
    pub fn record(&self, t: u64) -> WormRecord {
        WormRecord {
            t,
            worm_i: self.id.0,
            x: self.x,
            y: self.y,
            state: self.kind().into(),
            angle: self.angle,
            timestep: self.timestep,
        }
    }
}

/// Wrap an angle into [0, 2π).
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::field::BacteriaParams;
    use crate::components::grid::Grid;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn arena() -> BacteriaField {
        BacteriaField::new(
            Grid::new(-1.0, 1.0, 0.1).unwrap(),
            0.001,
            &BacteriaParams::default(),
        )
    }

    fn params(noise: f64) -> WormParams {
        WormParams::new(0.1, noise, 3.0, 2.0).unwrap()
    }

    fn worm_at(x: f64, y: f64, angle: f64, state: MotionState) -> Worm {
        Worm {
            id: WormId(0),
            x,
            y,
            angle,
            state,
            timestep: 0,
            next_drop_timestep: 0,
        }
    }

    #[test]
    fn test_tick_counts_up_then_elapses() {
        let state = MotionState::enter(MotionKind::Run, 2.5);
        let StateTick::Continue(state) = state.tick() else {
            panic!("run ended too early");
        };
        assert_eq!(state.timer(), 1);
        let StateTick::Continue(state) = state.tick() else {
            panic!("run ended too early");
        };
        assert_eq!(state.tick(), StateTick::Elapsed(MotionKind::Tumble));

        let tumble = MotionState::enter(MotionKind::Tumble, 1.0);
        assert_eq!(tumble.tick(), StateTick::Elapsed(MotionKind::Run));
    }

    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert!((normalize_angle(-0.5) - (TAU - 0.5)).abs() < 1e-12);
        assert!((normalize_angle(TAU + 1.0) - 1.0).abs() < 1e-12);
        assert_eq!(normalize_angle(-1e-18), 0.0);
        assert!(normalize_angle(-1e-18) < TAU);
    }

    #[test]
    fn test_spawn_draws_heading_and_run_duration() {
        let mut rng = SmallRng::seed_from_u64(7);
        let worm = Worm::spawn(WormId(3), 0.2, -0.4, &params(0.2), &mut rng);

        assert_eq!(worm.id, WormId(3));
        assert_eq!((worm.x, worm.y), (0.2, -0.4));
        assert!((0.0..TAU).contains(&worm.angle));
        assert_eq!(worm.kind(), MotionKind::Run);
        assert_eq!(worm.state.timer(), 0);
        assert!(worm.state.duration() >= 0.0);
        assert_eq!(worm.timestep, 0);
    }

    #[test]
    fn test_straight_line_without_noise() {
        let mut field = arena();
        let mut rng = SmallRng::seed_from_u64(1);
        let p = params(0.0).always_running();
        let theta = 0.7;
        let mut worm = worm_at(-0.5, -0.5, theta, MotionState::enter(MotionKind::Run, 1.0));

        for k in 1..=8 {
            worm.step(&p, &mut field, &mut rng);
            let expected_x = -0.5 + k as f64 * 0.1 * theta.cos();
            let expected_y = -0.5 + k as f64 * 0.1 * theta.sin();
            assert!((worm.x - expected_x).abs() < 1e-9);
            assert!((worm.y - expected_y).abs() < 1e-9);
            assert_eq!(worm.kind(), MotionKind::Run);
        }
        assert_eq!(worm.timestep, 8);
    }

    #[test]
    fn test_wall_stops_only_blocked_axis() {
        let mut field = arena();
        let mut rng = SmallRng::seed_from_u64(1);
        let p = params(0.0).always_running();
        // Heading 45°: x would cross the wall, y is free
        let mut worm = worm_at(0.95, 0.0, TAU / 8.0, MotionState::enter(MotionKind::Run, 1.0));

        worm.step(&p, &mut field, &mut rng);
        assert_eq!(worm.x, 0.95);
        assert!((worm.y - 0.1 * (TAU / 8.0).sin()).abs() < 1e-12);
    }

    #[test]
    fn test_never_leaves_arena() {
        let mut field = arena();
        let mut rng = SmallRng::seed_from_u64(99);
        let p = WormParams::new(0.3, 1.0, 4.0, 1.0).unwrap();
        let mut worm = Worm::spawn(WormId(0), 0.0, 0.0, &p, &mut rng);

        for _ in 0..2000 {
            worm.step(&p, &mut field, &mut rng);
            assert!(worm.x > -1.0 && worm.x < 1.0);
            assert!(worm.y > -1.0 && worm.y < 1.0);
            assert!((0.0..TAU).contains(&worm.angle));
        }
    }

    #[test]
    fn test_tumble_holds_position() {
        let mut field = arena();
        let mut rng = SmallRng::seed_from_u64(5);
        let p = params(0.2);
        let mut worm = worm_at(0.3, 0.3, 1.0, MotionState::enter(MotionKind::Tumble, 100.0));

        for _ in 0..10 {
            worm.step(&p, &mut field, &mut rng);
            assert_eq!((worm.x, worm.y), (0.3, 0.3));
            assert_eq!(worm.kind(), MotionKind::Tumble);
        }
    }

    #[test]
    fn test_run_lasts_ceiling_of_duration() {
        let mut field = arena();
        let p = params(0.0);

        for seed in 0..20 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut worm = Worm::spawn(WormId(0), 0.0, 0.0, &p, &mut rng);
            let duration = worm.state.duration();

            let mut run_steps = 0;
            while worm.kind() == MotionKind::Run {
                worm.step(&p, &mut field, &mut rng);
                run_steps += 1;
            }
            let expected = (duration.ceil() as u32).max(1);
            assert_eq!(run_steps, expected, "seed {seed}, duration {duration}");
            assert_eq!(worm.state.timer(), 0);
        }
    }

    #[test]
    fn test_always_running_never_tumbles() {
        let mut field = arena();
        let mut rng = SmallRng::seed_from_u64(11);
        let p = params(0.2).always_running();
        let mut worm = Worm::spawn(WormId(0), 0.0, 0.0, &p, &mut rng);

        for _ in 0..200 {
            worm.step(&p, &mut field, &mut rng);
            assert_eq!(worm.kind(), MotionKind::Run);
        }
    }

    #[test]
    fn test_drops_follow_interval() {
        let mut field = arena();
        let mut rng = SmallRng::seed_from_u64(3);
        let p = params(0.0).always_running().with_deposition(5, 0.1);
        let mut worm = worm_at(0.0, 0.0, 0.0, MotionState::enter(MotionKind::Run, 1.0));

        let mut dropped_at = Vec::new();
        for _ in 0..12 {
            let local = worm.timestep;
            if worm.step(&p, &mut field, &mut rng) {
                dropped_at.push(local);
            }
        }
        assert_eq!(dropped_at, vec![0, 5, 10]);
        assert_eq!(worm.next_drop_timestep, 15);
        assert!(field.total() > 0.0);
    }

    #[test]
    fn test_no_drops_without_deposition() {
        let mut field = arena();
        let mut rng = SmallRng::seed_from_u64(3);
        let p = params(0.2);
        let mut worm = Worm::spawn(WormId(0), 0.0, 0.0, &p, &mut rng);

        for _ in 0..20 {
            assert!(!worm.step(&p, &mut field, &mut rng));
        }
        assert_eq!(field.total(), 0.0);
    }

    #[test]
    fn test_record_reports_state_code() {
        let worm = worm_at(0.1, 0.2, 0.3, MotionState::enter(MotionKind::Tumble, 1.0));
        let record = worm.record(9);
        assert_eq!(record.t, 9);
        assert_eq!(record.state, StateCode::Tumble);
        assert_eq!((record.x, record.y, record.angle), (0.1, 0.2, 0.3));
    }

    #[test]
    fn test_params_validation() {
        assert!(WormParams::new(0.1, -0.5, 3.0, 2.0).is_err());
        assert!(WormParams::new(0.1, f64::NAN, 3.0, 2.0).is_err());
        assert!(WormParams::new(0.1, 0.0, 3.0, 2.0).is_ok());
        assert!(WormParams::new(-0.1, 0.2, 3.0, 2.0).is_err());
        assert!(WormParams::new(0.1, 0.2, 0.0, 2.0).is_err());
        assert!(WormParams::new(0.1, 0.2, 3.0, f64::INFINITY).is_err());
    }
}
