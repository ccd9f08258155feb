//! Worm Foraging Simulation
//!
//! Runs one experiment: loads the config, prepares the experiment
//! directory, runs the loop and writes the measurements.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use worm_core::config::{SimConfig, DEFAULT_CONFIG_PATH};
use worm_core::output::open_keeper;
use worm_core::shutdown::install_interrupt_flag;
use worm_core::{RunSummary, SimError, Simulation};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "worm_sim")]
#[command(about = "Run/tumble worms feeding a reaction-diffusion bacteria field")]
struct Args {
    /// TOML config file (defaults to worm_sim.toml when it exists)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    random_seed: Option<u64>,

    #[arg(long)]
    num_worms: Option<u32>,

    /// End of the simulated time span
    #[arg(long)]
    t_max: Option<f64>,

    /// Parent directory for experiment output
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Only log warnings and errors; no per-timestep progress
    #[arg(long)]
    quiet: bool,

    /// Run without recording or writing measurements
    #[arg(long)]
    no_measurements: bool,
}

impl Args {
    fn apply_overrides(&self, config: &mut SimConfig) {
        if let Some(seed) = self.random_seed {
            config.random_seed = seed;
        }
        if let Some(num_worms) = self.num_worms {
            config.num_worms = num_worms;
        }
        if let Some(t_max) = self.t_max {
            config.t_max = t_max;
        }
        if let Some(base_dir) = &self.base_dir {
            config.base_dir = base_dir.clone();
        }
        if self.quiet {
            config.verbose = false;
        }
        if self.no_measurements {
            config.measurements_on = false;
        }
    }
}

fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Config file to load: the explicit one, else the default path if present
fn config_source(args: &Args) -> Option<PathBuf> {
    match &args.file {
        Some(path) => Some(path.clone()),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            default.exists().then(|| default.to_path_buf())
        }
    }
}

fn run(args: &Args) -> Result<RunSummary, SimError> {
    let source = config_source(args);
    let mut config = match &source {
        Some(path) => {
            info!("Loading config from {}", path.display());
            SimConfig::from_file(path)?
        }
        None => {
            info!("No config file, using defaults");
            SimConfig::default()
        }
    };
    args.apply_overrides(&mut config);
    config.validate()?;

    let keeper = open_keeper(&config, source.as_deref())?;

    let mut simulation = Simulation::new(&config, keeper)?;
    let stop = install_interrupt_flag();
    let summary = simulation.run(&stop)?;
    Ok(summary)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.quiet);

    match run(&args) {
        Ok(summary) => {
            if summary.interrupted {
                info!(
                    "Stopped early after {} timesteps; measurements saved",
                    summary.steps_completed
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_config_keys() {
        let args = Args::parse_from([
            "worm_sim",
            "--random-seed",
            "7",
            "--num-worms",
            "4",
            "--t-max",
            "0.5",
            "--base-dir",
            "runs",
            "--quiet",
            "--no-measurements",
        ]);
        let mut config = SimConfig::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.random_seed, 7);
        assert_eq!(config.num_worms, 4);
        assert_eq!(config.t_max, 0.5);
        assert_eq!(config.base_dir, PathBuf::from("runs"));
        assert!(!config.verbose);
        assert!(!config.measurements_on);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let args = Args::parse_from(["worm_sim"]);
        let mut config = SimConfig::default();
        args.apply_overrides(&mut config);
        assert_eq!(config, SimConfig::default());
    }
}
