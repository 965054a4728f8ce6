//! Run configuration.
//!
//! A run is described by its duration, a fixed number of equal time steps,
//! the output cadence and where snapshots go. Settings can be built in code
//! or loaded from TOML.
//!
//! # Example Config File
//!
//! ```toml
//! # shock_tube.toml
//! [run]
//! duration = 0.2
//! n_steps = 400
//! refresh_rate = 40
//! output_dir = "result/tube"
//! extension = "vtu"
//! ```
//!
//! The `[run]` header may be omitted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::io::SnapshotFormat;

/// Error type for run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid run configuration: {0}")]
    Invalid(String),

    #[error("failed to read config file {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Time stepping and output settings for one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Simulated time span.
    pub duration: f64,
    /// Number of equal time steps.
    pub n_steps: usize,
    /// Write a snapshot every `refresh_rate` steps (step 0 is always written).
    pub refresh_rate: usize,
    /// Directory receiving `<step>.<extension>` files.
    pub output_dir: PathBuf,
    /// Snapshot file extension, `vtk` or `vtu`.
    pub extension: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration: 1.0,
            n_steps: 100,
            refresh_rate: 10,
            output_dir: PathBuf::from("result"),
            extension: "vtk".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RootConfig {
    run: Option<RunConfig>,
    #[serde(flatten)]
    direct: Option<RunConfig>,
}

impl RunConfig {
    pub fn new(duration: f64, n_steps: usize, refresh_rate: usize) -> Self {
        Self {
            duration,
            n_steps,
            refresh_rate,
            ..Self::default()
        }
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the snapshot extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Fixed step size `duration / n_steps`.
    pub fn step_size(&self) -> f64 {
        self.duration / self.n_steps as f64
    }

    /// Snapshot format selected by `extension`.
    pub fn snapshot_format(&self) -> Result<SnapshotFormat, ConfigError> {
        SnapshotFormat::from_extension(&self.extension)
            .map_err(|_| ConfigError::Invalid(format!("unknown snapshot extension '{}'", self.extension)))
    }

    /// Path of the snapshot written after `step` steps.
    pub fn snapshot_path(&self, step: usize) -> PathBuf {
        let extension = self.extension.trim_start_matches('.');
        self.output_dir.join(format!("{}.{}", step, extension))
    }

    /// Whether a snapshot is due after `step` steps.
    pub fn is_output_step(&self, step: usize) -> bool {
        step % self.refresh_rate == 0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "duration must be positive, got {}",
                self.duration
            )));
        }
        if self.n_steps == 0 {
            return Err(ConfigError::Invalid("n_steps must be at least 1".to_string()));
        }
        if self.refresh_rate == 0 {
            return Err(ConfigError::Invalid("refresh_rate must be at least 1".to_string()));
        }
        self.snapshot_format()?;
        Ok(())
    }

    /// Parse from TOML text, with or without a `[run]` section.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        let root: RootConfig = toml::from_str(contents)?;
        Ok(root.run.or(root.direct).unwrap_or_default())
    }

    /// Load from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded run configuration from {}", path.display());
        Ok(config)
    }

    /// Save to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        let path = path.as_ref();
        std::fs::write(path, contents).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    #[test]
    fn test_step_size_and_paths() {
        let config = RunConfig::new(2.0, 400, 40).with_output_dir("out");
        assert_relative_eq!(config.step_size(), 0.005);
        assert_eq!(config.snapshot_path(40), PathBuf::from("out/40.vtk"));
        assert!(config.is_output_step(0));
        assert!(config.is_output_step(80));
        assert!(!config.is_output_step(81));
    }

    #[test]
    fn test_validate() {
        assert!(RunConfig::default().validate().is_ok());
        assert!(RunConfig::new(0.0, 10, 1).validate().is_err());
        assert!(RunConfig::new(1.0, 0, 1).validate().is_err());
        assert!(RunConfig::new(1.0, 10, 0).validate().is_err());
        assert!(RunConfig::new(1.0, 10, 1).with_extension("png").validate().is_err());
    }

    #[test]
    fn test_sectioned_toml() {
        let config = RunConfig::from_toml_str(
            r#"
[run]
duration = 0.2
n_steps = 400
refresh_rate = 40
output_dir = "result/tube"
extension = "vtu"
"#,
        )
        .unwrap();
        assert_eq!(config.n_steps, 400);
        assert_eq!(config.output_dir, PathBuf::from("result/tube"));
        assert_eq!(config.snapshot_format().unwrap(), SnapshotFormat::Vtu);
    }

    #[test]
    fn test_direct_toml_uses_defaults() {
        let config = RunConfig::from_toml_str("n_steps = 8\n").unwrap();
        assert_eq!(config.n_steps, 8);
        assert_eq!(config.refresh_rate, RunConfig::default().refresh_rate);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.toml");
        let config = RunConfig::new(0.5, 50, 5).with_extension("vtu");
        config.save(&path).unwrap();
        assert_eq!(RunConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let result = RunConfig::load("/nonexistent/run.toml");
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }

    #[test]
    fn test_load_malformed_file_names_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "n_steps = [\n").unwrap();

        let err = RunConfig::load(&path).unwrap_err();
        assert!(matches!(&err, ConfigError::ParseError { path: p, .. } if *p == path));
        let message = err.to_string();
        assert!(message.starts_with("failed to parse config file"));
        assert!(message.contains("broken.toml"));
    }
}
