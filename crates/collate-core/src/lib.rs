//! This library collates multiple independent, monotonically timestamped
//! input streams into one globally time-ordered output, invoking a
//! per-stream sink for every delivered item.
//!
//! Streams are keyed by [`QueueKey`], a `(trajectory_id, sensor_id)` pair.
//! Streams of one trajectory share a common start time: the merger drops
//! warm-up items that predate the moment all of the trajectory's sensors
//! have data, so downstream consumers see every sensor producing from a
//! common epoch.
//!
//! # Usage
//!
//! ```rust
//! use collate_core::{OrderedMultiQueue, QueueKey, Timestamped};
//! use std::time::Duration;
//!
//! // Define your item type
//! #[derive(Debug)]
//! struct Sample(Duration);
//!
//! impl Timestamped for Sample {
//!     fn timestamp(&self) -> Duration {
//!         self.0
//!     }
//! }
//!
//! let imu = QueueKey::new(0, "imu");
//! let lidar = QueueKey::new(0, "lidar");
//!
//! let mut merger = OrderedMultiQueue::new();
//! merger.add_queue(
//!     imu.clone(),
//!     Box::new(|sample: Sample| println!("imu @ {:?}", sample.timestamp())),
//! );
//! merger.add_queue(
//!     lidar.clone(),
//!     Box::new(|sample: Sample| println!("lidar @ {:?}", sample.timestamp())),
//! );
//!
//! // Sinks fire in global timestamp order as soon as it is provably safe.
//! merger.add(&imu, Sample(Duration::from_millis(10)));
//! merger.add(&imu, Sample(Duration::from_millis(30)));
//! merger.add(&lidar, Sample(Duration::from_millis(20)));
//!
//! // Finishing the streams drains whatever is still pending.
//! merger.flush();
//! ```

mod ingest;
mod multi_queue;
pub mod queue;
mod types;

pub use ingest::collate;
pub use multi_queue::{MergerConfig, OrderedMultiQueue};
pub use types::{Callback, QueueKey, Timestamped};
