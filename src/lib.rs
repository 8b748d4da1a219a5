//! Multi-sensor stream collation pipeline.
//!
//! This crate wires the [`collate_core`] merger into a small ingest
//! pipeline: a YAML-configured set of trajectories, each carrying several
//! sensor streams, collated into per-trajectory handlers that receive
//! observations in globally non-decreasing time order.
//!
//! The `collate` binary replays a synthetic multi-sensor session described
//! by the configuration file and logs the collated output; see
//! `config/example.yaml`.

pub mod collator;
pub mod config;
pub mod message;

pub use collator::{Collator, TrajectoryHandler};
pub use config::Config;
pub use message::{Payload, SensorMessage};
