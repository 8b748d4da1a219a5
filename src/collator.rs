//! Trajectory-level wrapper over the ordered multi-queue.
//!
//! The collator registers all expected sensors of a trajectory at once and
//! routes every dispatched item of that trajectory into a single handler,
//! tagged with the producing sensor id.

use collate_core::{MergerConfig, OrderedMultiQueue, QueueKey, Timestamped};
use indexmap::IndexMap;
use std::sync::{Arc, Mutex};

/// Handler invoked with every collated item of one trajectory, together
/// with the id of the sensor that produced it.
pub type TrajectoryHandler<T> = Box<dyn FnMut(&str, T) + Send>;

/// Merges the sensor streams of any number of trajectories, delivering each
/// trajectory's items to its handler in globally non-decreasing time order.
pub struct Collator<T>
where
    T: Timestamped,
{
    queue: OrderedMultiQueue<T>,
    queue_keys: IndexMap<i32, Vec<QueueKey>>,
}

impl<T> Collator<T>
where
    T: Timestamped + 'static,
{
    pub fn new() -> Self {
        Self::with_config(MergerConfig::default())
    }

    pub fn with_config(config: MergerConfig) -> Self {
        Self {
            queue: OrderedMultiQueue::with_config(config),
            queue_keys: IndexMap::new(),
        }
    }

    /// Register one queue per expected sensor, all feeding `handler`.
    ///
    /// Panics if the trajectory is already registered.
    pub fn add_trajectory<I, S>(
        &mut self,
        trajectory_id: i32,
        expected_sensor_ids: I,
        handler: TrajectoryHandler<T>,
    ) where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        assert!(
            !self.queue_keys.contains_key(&trajectory_id),
            "trajectory {trajectory_id} is already registered",
        );

        let handler = Arc::new(Mutex::new(handler));
        let keys = self.queue_keys.entry(trajectory_id).or_default();

        for sensor_id in expected_sensor_ids {
            let key = QueueKey::new(trajectory_id, sensor_id);
            let sensor = key.sensor_id.clone();
            let handler = Arc::clone(&handler);

            self.queue.add_queue(
                key.clone(),
                Box::new(move |item: T| {
                    let mut handler = handler.lock().expect("trajectory handler poisoned");
                    (*handler)(&sensor, item);
                }),
            );
            keys.push(key);
        }
    }

    /// Declare that none of the trajectory's sensors will produce again.
    ///
    /// Panics on an unknown trajectory.
    pub fn finish_trajectory(&mut self, trajectory_id: i32) {
        let keys = self
            .queue_keys
            .get(&trajectory_id)
            .unwrap_or_else(|| panic!("unknown trajectory {trajectory_id}"));

        for key in keys {
            self.queue.mark_queue_finished(key);
        }
    }

    /// Feed one observation into the trajectory's queue for `sensor_id`.
    ///
    /// Observations for sensors that were not registered are dropped with a
    /// rate-limited warning.
    pub fn add_sensor_data(&mut self, trajectory_id: i32, sensor_id: &str, item: T) {
        let key = QueueKey::new(trajectory_id, sensor_id);
        self.queue.add(&key, item);
    }

    /// Finish every registered queue, draining whatever is deliverable.
    pub fn flush(&mut self) {
        self.queue.flush();
    }

    /// Trajectory of the stream that most recently stalled dispatch, or
    /// `None` once every queue has drained.
    pub fn blocking_trajectory(&self) -> Option<i32> {
        if self.queue.is_empty() {
            return None;
        }
        Some(self.queue.blocker().trajectory_id)
    }
}

impl<T> Default for Collator<T>
where
    T: Timestamped + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
