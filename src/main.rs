//! Collation pipeline entry point.
//!
//! Replays a synthetic multi-sensor session described by a YAML
//! configuration file through the trajectory collator and logs every
//! collated observation.

use collate::{
    Collator, Config, Payload, SensorMessage,
    config::Modality,
};
use eyre::{Result, bail};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let Some(config_file) = std::env::args().nth(1) else {
        bail!("Usage: collate <config.yaml>");
    };

    info!(config_file = %config_file, "Loading configuration");
    let config = Config::load(&config_file)?;

    info!(
        num_trajectories = config.trajectories.len(),
        replay_duration = ?config.replay.duration,
        "Configuration loaded"
    );

    replay(&config)
}

/// Feed the generated session through a collator, logging dispatch order.
fn replay(config: &Config) -> Result<()> {
    let collated = Arc::new(Mutex::new(0u64));

    let mut collator = Collator::with_config(config.to_merger_config());
    for trajectory in &config.trajectories {
        let sensors: Vec<String> = trajectory.sensors.iter().map(|s| s.name.clone()).collect();
        let trajectory_id = trajectory.id;
        let collated = Arc::clone(&collated);

        collator.add_trajectory(
            trajectory_id,
            sensors,
            Box::new(move |sensor_id: &str, msg: SensorMessage| {
                *collated.lock().unwrap() += 1;
                info!(
                    trajectory_id,
                    sensor = sensor_id,
                    time = ?msg.time,
                    payload = msg.payload.kind(),
                    "Collated observation"
                );
            }),
        );
    }

    let arrivals = generate_session(config);
    info!(num_messages = arrivals.len(), "Replaying session");

    for (trajectory_id, msg) in arrivals {
        let sensor_id = msg.sensor_id.clone();
        collator.add_sensor_data(trajectory_id, &sensor_id, msg);
    }

    collator.flush();

    info!(collated = *collated.lock().unwrap(), "Replay finished");
    Ok(())
}

/// Generate the session's messages in ingress order.
///
/// Each sensor stream is monotonic in time; ingress interleaves the streams
/// with a fixed per-sensor delivery latency, so arrival is out of global
/// time order. Undoing that interleaving is the collator's job.
fn generate_session(config: &Config) -> Vec<(i32, SensorMessage)> {
    let mut arrivals: Vec<(Duration, i32, SensorMessage)> = Vec::new();

    for trajectory in &config.trajectories {
        for (index, sensor) in trajectory.sensors.iter().enumerate() {
            let latency = Duration::from_millis(7) * index as u32;

            let mut time = sensor.start_offset;
            while time <= config.replay.duration {
                let msg =
                    SensorMessage::new(&sensor.name, time, synth_payload(sensor.modality, time));
                arrivals.push((time + latency, trajectory.id, msg));
                time += sensor.period;
            }
        }
    }

    arrivals.sort_by(|a, b| {
        (a.0, a.1, &a.2.sensor_id, a.2.time).cmp(&(b.0, b.1, &b.2.sensor_id, b.2.time))
    });

    arrivals
        .into_iter()
        .map(|(_, trajectory_id, msg)| (trajectory_id, msg))
        .collect()
}

fn synth_payload(modality: Modality, time: Duration) -> Payload {
    let t = time.as_secs_f64();

    match modality {
        Modality::Imu => Payload::Imu {
            linear_acceleration: [t.sin() * 0.2, t.cos() * 0.2, 9.81],
            angular_velocity: [0.0, 0.0, (t * 0.5).sin() * 0.1],
        },
        Modality::Odometry => Payload::Odometry {
            translation: [t * 1.5, (t * 0.3).sin(), 0.0],
            yaw: (t * 0.3).cos() * 0.05,
        },
        Modality::PointCloud => Payload::PointCloud {
            points: (0..8)
                .map(|i| {
                    let angle = i as f64 * std::f64::consts::FRAC_PI_4;
                    [(angle.cos() * 4.0) as f32, (angle.sin() * 4.0) as f32, 0.1]
                })
                .collect(),
        },
        Modality::Fix => Payload::Fix {
            latitude: 48.0 + t * 1e-5,
            longitude: 11.0 + t * 1e-5,
            altitude: 520.0,
        },
    }
}
