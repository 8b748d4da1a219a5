use std::{fmt, time::Duration};

/// Identifies one input stream: a trajectory paired with a sensor name.
///
/// The derived `Ord` is lexicographic over `(trajectory_id, sensor_id)`.
/// This fixes the scan order of the queue collection, and with it the
/// tie-breaking between queues whose heads carry equal timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueueKey {
    pub trajectory_id: i32,
    pub sensor_id: String,
}

impl QueueKey {
    pub fn new(trajectory_id: i32, sensor_id: impl Into<String>) -> Self {
        Self {
            trajectory_id,
            sensor_id: sensor_id.into(),
        }
    }
}

impl fmt::Display for QueueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.trajectory_id, self.sensor_id)
    }
}

/// Extracts the timestamp from an item passed to the merger.
///
/// Timestamps are totally ordered and equality is allowed; the merger
/// treats items as opaque otherwise.
pub trait Timestamped: Send {
    fn timestamp(&self) -> Duration;
}

/// Sink bound to one queue, invoked with exclusive ownership of each
/// dispatched item.
pub type Callback<T> = Box<dyn FnMut(T) + Send>;
