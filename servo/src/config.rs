//! Servo loop configuration
//!
//! Every setting has the default of the rig, so an empty TOML document is a
//! valid configuration:
//! ```
//! use ferroservo_servo::ServoConfig;
//! let config = ServoConfig::from_toml("")?;
//! assert_eq!(config, ServoConfig::default());
//! # Ok::<(), ferroservo_servo::ConfigError>(())
//! ```
//! Settings are overridden per table:
//! ```
//! use ferroservo_servo::ServoConfig;
//! let config = ServoConfig::from_toml(
//!     r#"
//! fps = 20.0
//! [params]
//! alpha = 0.5
//! [trajectory]
//! shape = "circle"
//! "#,
//! )?;
//! assert_eq!(config.fps, 20.);
//! assert_eq!(config.params.alpha, 0.5);
//! # Ok::<(), ferroservo_servo::ConfigError>(())
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use ferroservo_clients::{
    BranchAndBound, CoilSelector, ExperimentKind, ModelParams, Separable, TrajectoryConfig,
};
use ferroservo_clients_io::{ActivationMask, CoilGeometry};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse the configuration")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize the configuration")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// 0/1 program solvers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolverKind {
    #[default]
    BranchAndBound,
    Separable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub kind: SolverKind,
    /// Branch and bound node budget
    pub max_nodes: usize,
    /// Branch and bound time limit `[ms]`
    pub deadline_ms: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            kind: SolverKind::default(),
            max_nodes: 1 << 16,
            deadline_ms: Some(20),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub kind: ExperimentKind,
    /// Number of complete sweeps before the experiment stops
    pub max_passes: Option<usize>,
}

/// Servo loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoConfig {
    /// Frame rate `[Hz]`
    pub fps: f64,
    pub coils: CoilGeometry,
    pub params: ModelParams,
    /// Tuning editor increment
    pub tuning_step: f64,
    pub solver: SolverConfig,
    pub trajectory: TrajectoryConfig,
    pub experiment: ExperimentConfig,
    /// One-coil override pattern
    pub one_coil: ActivationMask,
    /// Recordings directory, recording is disabled if not set
    pub record_dir: Option<PathBuf>,
    /// The loop completes after that many cycles
    pub max_cycles: Option<usize>,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            fps: 10.,
            coils: CoilGeometry::default(),
            params: ModelParams::default(),
            tuning_step: 0.005,
            solver: SolverConfig::default(),
            trajectory: TrajectoryConfig::default(),
            experiment: ExperimentConfig::default(),
            one_coil: ActivationMask::new(0b1000_0000),
            record_dir: None,
            max_cycles: None,
        }
    }
}

impl ServoConfig {
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()
    }
    /// Loads the configuration from a TOML file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(self.fps.recip())
    }
    /// Checks the settings consistency
    pub fn validate(self) -> Result<Self> {
        if !(self.fps.is_finite() && self.fps > 0.) {
            return Err(ConfigError::Invalid(format!(
                "the frame rate must be positive, found {}",
                self.fps
            )));
        }
        if !(self.trajectory.stepsize > 0.) {
            return Err(ConfigError::Invalid(format!(
                "the trajectory step size must be positive, found {}",
                self.trajectory.stepsize
            )));
        }
        if !(self.trajectory.arrival.tolerance > 0.) {
            return Err(ConfigError::Invalid(format!(
                "the position error tolerance must be positive, found {}",
                self.trajectory.arrival.tolerance
            )));
        }
        if self.params.mm2pix <= 0. {
            return Err(ConfigError::Invalid(format!(
                "mm2pix must be positive, found {}",
                self.params.mm2pix
            )));
        }
        if self.solver.max_nodes == 0 {
            return Err(ConfigError::Invalid(
                "the solver node budget must be positive".into(),
            ));
        }
        Ok(self)
    }
    /// Coil selector with the configured weights and solver
    pub fn selector(&self) -> CoilSelector {
        let selector = CoilSelector::new(self.coils.clone(), self.params);
        match self.solver.kind {
            SolverKind::Separable => selector.solver(Separable),
            SolverKind::BranchAndBound => {
                let solver = BranchAndBound::new().max_nodes(self.solver.max_nodes);
                match self.solver.deadline_ms {
                    Some(ms) => selector.solver(solver.deadline(Duration::from_millis(ms))),
                    None => selector.solver(solver),
                }
            }
        }
    }
}
