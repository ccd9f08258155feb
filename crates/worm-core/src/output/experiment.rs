//! Experiment Directory
//!
//! Each run writes into `base_dir/N{num_worms}_seed{seed}`, next to a copy
//! of the config that produced it.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::SimConfig;

use super::OutputError;

/// Resolved config written alongside the measurements
pub const RESOLVED_CONFIG_FILE: &str = "config.toml";

/// Directory for a run with `num_worms` worms and the given seed
pub fn experiment_dir(base_dir: &Path, num_worms: u32, seed: u64) -> PathBuf {
    base_dir.join(format!("N{}_seed{}", num_worms, seed))
}

/// Create the experiment directory for `config` and record its settings.
///
/// When the run was started from a file, that file is copied in as
/// `{stem}.cfg`. The effective settings, overrides included, always land in
/// `config.toml`.
pub fn prepare_experiment_dir(
    config: &SimConfig,
    source: Option<&Path>,
) -> Result<PathBuf, OutputError> {
    let dir = experiment_dir(&config.base_dir, config.num_worms, config.random_seed);
    fs::create_dir_all(&dir)?;

    if let Some(source) = source {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "config".to_string());
        fs::copy(source, dir.join(format!("{}.cfg", stem)))?;
    }

    fs::write(dir.join(RESOLVED_CONFIG_FILE), config.to_toml()?)?;
    info!("Experiment directory: {}", dir.display());
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_experiment_dir_name() {
        let dir = experiment_dir(Path::new("runs"), 12, 7);
        assert_eq!(dir, PathBuf::from("runs/N12_seed7"));
    }

    #[test]
    fn test_prepare_writes_resolved_config() {
        let base = tempdir().unwrap();
        let config = SimConfig {
            base_dir: base.path().to_path_buf(),
            num_worms: 3,
            random_seed: 9,
            ..SimConfig::default()
        };

        let dir = prepare_experiment_dir(&config, None).unwrap();
        assert_eq!(dir, base.path().join("N3_seed9"));

        let written = fs::read_to_string(dir.join(RESOLVED_CONFIG_FILE)).unwrap();
        let parsed = SimConfig::from_str(&written).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_prepare_copies_source_config() {
        let base = tempdir().unwrap();
        let source = base.path().join("chemotaxis.toml");
        fs::write(&source, "num_worms = 2\n").unwrap();

        let config = SimConfig {
            base_dir: base.path().join("out"),
            num_worms: 2,
            ..SimConfig::default()
        };
        let dir = prepare_experiment_dir(&config, Some(&source)).unwrap();

        let copied = fs::read_to_string(dir.join("chemotaxis.cfg")).unwrap();
        assert_eq!(copied, "num_worms = 2\n");
    }

    #[test]
    fn test_prepare_is_idempotent() {
        let base = tempdir().unwrap();
        let config = SimConfig {
            base_dir: base.path().to_path_buf(),
            ..SimConfig::default()
        };
        let first = prepare_experiment_dir(&config, None).unwrap();
        let second = prepare_experiment_dir(&config, None).unwrap();
        assert_eq!(first, second);
    }
}
