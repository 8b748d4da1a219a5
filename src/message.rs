//! Concrete sensor message types fed through the collator.

use collate_core::Timestamped;
use std::time::Duration;

/// One observation from a single sensor.
#[derive(Debug, Clone)]
pub struct SensorMessage {
    /// Name of the producing sensor; matches the queue's sensor id.
    pub sensor_id: String,

    /// Acquisition time.
    pub time: Duration,

    /// Modality-specific payload.
    pub payload: Payload,
}

impl SensorMessage {
    pub fn new(sensor_id: impl Into<String>, time: Duration, payload: Payload) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            time,
            payload,
        }
    }
}

impl Timestamped for SensorMessage {
    fn timestamp(&self) -> Duration {
        self.time
    }
}

/// Sensor payloads understood by the pipeline.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Inertial readings.
    Imu {
        linear_acceleration: [f64; 3],
        angular_velocity: [f64; 3],
    },

    /// Relative pose estimate.
    Odometry { translation: [f64; 3], yaw: f64 },

    /// A batch of range returns.
    PointCloud { points: Vec<[f32; 3]> },

    /// Global position fix.
    Fix {
        latitude: f64,
        longitude: f64,
        altitude: f64,
    },
}

impl Payload {
    /// Short modality label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Imu { .. } => "imu",
            Payload::Odometry { .. } => "odometry",
            Payload::PointCloud { .. } => "point_cloud",
            Payload::Fix { .. } => "fix",
        }
    }
}
