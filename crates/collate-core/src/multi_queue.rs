use crate::{
    queue::Queue,
    types::{Callback, QueueKey, Timestamped},
};
use indexmap::IndexMap;
use std::{collections::BTreeMap, time::Duration};
use tracing::{info, warn};

/// Unknown-key drops are logged on the first and then every 1000th occurrence.
const IGNORED_WARN_PERIOD: u64 = 1000;

/// Stalls with an oversized backlog are logged on the first and then every
/// 60th occurrence.
const BLOCKED_WARN_PERIOD: u64 = 60;

/// Tuning knobs for [`OrderedMultiQueue`].
#[derive(Debug, Clone)]
pub struct MergerConfig {
    /// Backlog length past which a stalled merger starts naming its blocker.
    /// Diagnostic only; queues grow without bound either way.
    pub backlog_soft_cap: usize,
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            backlog_soft_cap: 500,
        }
    }
}

struct QueueRecord<T>
where
    T: Timestamped,
{
    queue: Queue<T>,
    callback: Callback<T>,
    finished: bool,
}

/// Collates multiple independent, monotonically timestamped input streams
/// into a single globally time-ordered sequence of sink invocations.
///
/// Each registered queue owns a FIFO of pending items and a sink callback.
/// Every mutating call drives the dispatch engine, which keeps emitting the
/// globally oldest head item until it can no longer prove that doing so is
/// safe, then returns to the caller. The merger is single-threaded and not
/// internally synchronized; sinks run synchronously on the calling thread.
///
/// Misuse (registering a key twice, finishing an unknown or already
/// finished queue, pushing backwards in time, dropping the merger with an
/// unfinished queue) is a programmer error and panics.
pub struct OrderedMultiQueue<T>
where
    T: Timestamped,
{
    queues: BTreeMap<QueueKey, QueueRecord<T>>,
    last_dispatched: Duration,
    blocker: QueueKey,
    common_start_times: IndexMap<i32, Duration>,
    config: MergerConfig,
    ignored_items: u64,
    blocked_stalls: u64,
}

impl<T> OrderedMultiQueue<T>
where
    T: Timestamped,
{
    pub fn new() -> Self {
        Self::with_config(MergerConfig::default())
    }

    pub fn with_config(config: MergerConfig) -> Self {
        Self {
            queues: BTreeMap::new(),
            last_dispatched: Duration::ZERO,
            blocker: QueueKey::default(),
            common_start_times: IndexMap::new(),
            config,
            ignored_items: 0,
            blocked_stalls: 0,
        }
    }

    /// Register a fresh queue with its sink. Panics if `key` is already
    /// registered.
    pub fn add_queue(&mut self, key: QueueKey, callback: Callback<T>) {
        if self.queues.contains_key(&key) {
            panic!("queue '{key}' is already registered");
        }
        self.queues.insert(
            key,
            QueueRecord {
                queue: Queue::new(),
                callback,
                finished: false,
            },
        );
    }

    /// Declare that no further items will be pushed to `key`, then drive
    /// dispatch. Panics on an unknown or already-finished key.
    pub fn mark_queue_finished(&mut self, key: &QueueKey) {
        let record = self
            .queues
            .get_mut(key)
            .unwrap_or_else(|| panic!("did not find queue '{key}'"));
        assert!(!record.finished, "queue '{key}' is already finished");
        record.finished = true;

        self.dispatch();
    }

    /// Push one item onto `key` and drive dispatch.
    ///
    /// Items for unregistered keys are dropped with a rate-limited warning;
    /// this is the one soft failure of the API.
    pub fn add(&mut self, key: &QueueKey, item: T) {
        let Some(record) = self.queues.get_mut(key) else {
            self.ignored_items += 1;
            if self.ignored_items % IGNORED_WARN_PERIOD == 1 {
                warn!(queue = %key, "ignored item for unregistered queue");
            }
            return;
        };

        record.queue.push(item);

        self.dispatch();
    }

    /// Mark every currently unfinished queue as finished, draining whatever
    /// can still be delivered.
    pub fn flush(&mut self) {
        let unfinished: Vec<QueueKey> = self
            .queues
            .iter()
            .filter(|(_, record)| !record.finished)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &unfinished {
            self.mark_queue_finished(key);
        }
    }

    /// The key that most recently prevented dispatch from making progress.
    ///
    /// Panics when no queues are registered. The value is meaningless until
    /// the first stall has been reported.
    pub fn blocker(&self) -> &QueueKey {
        assert!(!self.queues.is_empty(), "blocker queried without queues");
        &self.blocker
    }

    /// True when every registered queue has been finished, drained, and
    /// erased.
    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    /// Emit items in global timestamp order until progress stalls.
    ///
    /// Each iteration scans the queues in key order for the oldest head,
    /// then either emits it, drops it (pre-common-start warm-up), or
    /// records the blocker and returns.
    fn dispatch(&mut self) {
        loop {
            let mut candidate: Option<(QueueKey, Duration)> = None;

            let keys: Vec<QueueKey> = self.queues.keys().cloned().collect();
            for key in keys {
                let record = &self.queues[&key];

                let Some(head) = record.queue.peek() else {
                    if record.finished {
                        // Finished and drained; drop the record.
                        self.queues.remove(&key);
                        continue;
                    }
                    // A live queue has no data, so nothing anywhere may be
                    // emitted yet.
                    self.cannot_make_progress(key);
                    return;
                };

                let head_time = head.timestamp();
                assert!(
                    self.last_dispatched <= head_time,
                    "item at {:?} on queue '{}' is behind the last dispatched time {:?}",
                    head_time,
                    key,
                    self.last_dispatched,
                );

                // Strict comparison keeps the first queue in key order on ties.
                let is_older = match &candidate {
                    Some((_, best)) => head_time < *best,
                    None => true,
                };
                if is_older {
                    candidate = Some((key, head_time));
                }
            }

            let Some((key, time)) = candidate else {
                assert!(self.queues.is_empty(), "no candidate despite live queues");
                return;
            };

            let common_start = self.common_start_time(key.trajectory_id);
            let record = &self.queues[&key];

            if time >= common_start {
                // Past the trajectory's epoch, emit directly.
                self.emit(&key, time);
            } else if record.queue.len() < 2 {
                if !record.finished {
                    // Too early to tell whether this item is warm-up noise
                    // or the queue's first delivery.
                    self.cannot_make_progress(key);
                    return;
                }
                // No successor will ever arrive; deliver what is left.
                self.emit(&key, time);
            } else {
                // Probe the successor: if it is already past the epoch, the
                // head is this queue's first delivery; otherwise the head
                // predates the epoch and is discarded.
                let record = self
                    .queues
                    .get_mut(&key)
                    .expect("candidate queue is registered");
                let item = record.queue.pop().expect("candidate queue has a head");
                let successor = record
                    .queue
                    .peek()
                    .expect("probed queue holds a successor")
                    .timestamp();
                if successor > common_start {
                    (record.callback)(item);
                    self.last_dispatched = time;
                }
            }
        }
    }

    fn emit(&mut self, key: &QueueKey, time: Duration) {
        self.last_dispatched = time;
        let record = self
            .queues
            .get_mut(key)
            .expect("dispatch target is registered");
        let item = record.queue.pop().expect("dispatch target has a head");
        (record.callback)(item);
    }

    /// The trajectory's common start time: the maximum over the head
    /// timestamps of its queues, fixed the first time dispatch touches the
    /// trajectory. Queues registered afterwards do not move the epoch.
    fn common_start_time(&mut self, trajectory_id: i32) -> Duration {
        if let Some(&common_start) = self.common_start_times.get(&trajectory_id) {
            return common_start;
        }

        let common_start = self
            .queues
            .iter()
            .filter(|(key, _)| key.trajectory_id == trajectory_id)
            .filter_map(|(_, record)| record.queue.peek())
            .map(Timestamped::timestamp)
            .max()
            .unwrap_or(Duration::ZERO);
        self.common_start_times.insert(trajectory_id, common_start);

        info!(
            trajectory_id,
            common_start_time = ?common_start,
            "all sensor data for the trajectory is available from here on"
        );

        common_start
    }

    fn cannot_make_progress(&mut self, key: QueueKey) {
        self.blocker = key;

        for record in self.queues.values() {
            if record.queue.len() > self.config.backlog_soft_cap {
                self.blocked_stalls += 1;
                if self.blocked_stalls % BLOCKED_WARN_PERIOD == 1 {
                    warn!(
                        blocker = %self.blocker,
                        backlog = record.queue.len(),
                        "queue waiting for data"
                    );
                }
                return;
            }
        }
    }
}

impl<T> Default for OrderedMultiQueue<T>
where
    T: Timestamped,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for OrderedMultiQueue<T>
where
    T: Timestamped,
{
    /// Every queue must be finished before teardown. Skipped while already
    /// panicking so the original failure stays visible.
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        for (key, record) in &self.queues {
            assert!(record.finished, "queue '{key}' was never finished");
        }
    }
}
