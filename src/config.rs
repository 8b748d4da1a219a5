//! Configuration parsing and validation for the collation pipeline.

use collate_core::MergerConfig;
use eyre::{Result, WrapErr, bail, ensure};
use serde::Deserialize;
use std::{fs, path::Path, time::Duration};

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Trajectories to collate, each with its expected sensors.
    pub trajectories: Vec<TrajectoryConfig>,

    /// Collation parameters.
    #[serde(default)]
    pub collation: CollationConfig,

    /// Synthetic replay parameters for the demo binary.
    pub replay: ReplayConfig,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.trajectories.is_empty(),
            "At least one trajectory is required"
        );

        let mut ids: Vec<i32> = self.trajectories.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        for window in ids.windows(2) {
            if window[0] == window[1] {
                bail!("Duplicate trajectory id: {}", window[0]);
            }
        }

        for trajectory in &self.trajectories {
            ensure!(
                !trajectory.sensors.is_empty(),
                "Trajectory {} has no sensors",
                trajectory.id
            );

            let mut names: Vec<&str> =
                trajectory.sensors.iter().map(|s| s.name.as_str()).collect();
            names.sort_unstable();
            for window in names.windows(2) {
                if window[0] == window[1] {
                    bail!(
                        "Duplicate sensor '{}' on trajectory {}",
                        window[0],
                        trajectory.id
                    );
                }
            }

            for sensor in &trajectory.sensors {
                ensure!(
                    !sensor.name.is_empty(),
                    "Sensor on trajectory {} has an empty name",
                    trajectory.id
                );
                ensure!(
                    !sensor.period.is_zero(),
                    "Sensor '{}' on trajectory {} has a zero period",
                    sensor.name,
                    trajectory.id
                );
            }
        }

        ensure!(
            !self.replay.duration.is_zero(),
            "replay.duration must be greater than zero"
        );

        Ok(())
    }

    /// Convert to collate-core merger settings.
    pub fn to_merger_config(&self) -> MergerConfig {
        MergerConfig {
            backlog_soft_cap: self.collation.backlog_soft_cap,
        }
    }
}

/// One trajectory and the sensors expected to feed it.
#[derive(Debug, Clone, Deserialize)]
pub struct TrajectoryConfig {
    /// Trajectory id; shared by all of its sensor queues.
    pub id: i32,

    /// Sensors expected to produce on this trajectory.
    pub sensors: Vec<SensorConfig>,
}

/// Configuration for one sensor stream.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorConfig {
    /// Sensor name; becomes the queue's sensor id.
    pub name: String,

    /// Sampling period of the synthetic stream.
    #[serde(with = "humantime_serde")]
    pub period: Duration,

    /// Modality of the generated payload.
    #[serde(default)]
    pub modality: Modality,

    /// Offset of the sensor's first sample into the session.
    #[serde(default, with = "humantime_serde")]
    pub start_offset: Duration,
}

/// Payload modality for synthetic generation.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    #[default]
    Imu,
    Odometry,
    PointCloud,
    Fix,
}

/// Collation parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct CollationConfig {
    /// Backlog length past which a stalled merger names its blocker.
    #[serde(default = "default_backlog_soft_cap")]
    pub backlog_soft_cap: usize,
}

impl Default for CollationConfig {
    fn default() -> Self {
        Self {
            backlog_soft_cap: default_backlog_soft_cap(),
        }
    }
}

fn default_backlog_soft_cap() -> usize {
    500
}

/// Synthetic replay parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayConfig {
    /// Length of the generated session.
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}
