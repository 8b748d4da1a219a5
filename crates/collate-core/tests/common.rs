use collate_core::{Callback, OrderedMultiQueue, QueueKey, Timestamped};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestMessage {
    pub timestamp: Duration,
    pub data: String,
}

impl TestMessage {
    pub fn new(timestamp_ms: u64, data: &str) -> Self {
        Self {
            timestamp: Duration::from_millis(timestamp_ms),
            data: data.to_string(),
        }
    }
}

impl Timestamped for TestMessage {
    fn timestamp(&self) -> Duration {
        self.timestamp
    }
}

pub fn create_message(timestamp_ms: u64) -> TestMessage {
    TestMessage::new(timestamp_ms, &format!("msg_{}", timestamp_ms))
}

#[allow(dead_code)]
pub fn ms(timestamp_ms: u64) -> Duration {
    Duration::from_millis(timestamp_ms)
}

/// Shared record of every delivery, in dispatch order.
pub type DeliveryLog = Arc<Mutex<Vec<(QueueKey, Duration)>>>;

pub fn delivery_log() -> DeliveryLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Sink that appends `(key, timestamp)` to the log.
pub fn recording_sink(log: &DeliveryLog, key: &QueueKey) -> Callback<TestMessage> {
    let log = Arc::clone(log);
    let key = key.clone();
    Box::new(move |msg: TestMessage| log.lock().unwrap().push((key.clone(), msg.timestamp())))
}

/// Build a merger with one recording queue per key.
pub fn merger_with_queues(
    keys: &[QueueKey],
    log: &DeliveryLog,
) -> OrderedMultiQueue<TestMessage> {
    let mut merger = OrderedMultiQueue::new();
    for key in keys {
        merger.add_queue(key.clone(), recording_sink(log, key));
    }
    merger
}

#[allow(dead_code)]
pub fn deliveries(log: &DeliveryLog) -> Vec<(QueueKey, Duration)> {
    log.lock().unwrap().clone()
}

#[allow(dead_code)]
pub fn delivered_times(log: &DeliveryLog) -> Vec<Duration> {
    log.lock().unwrap().iter().map(|(_, ts)| *ts).collect()
}

/// Assert that the delivered timestamps are globally non-decreasing.
#[allow(dead_code)]
pub fn assert_monotone(log: &DeliveryLog) {
    let log = log.lock().unwrap();
    for window in log.windows(2) {
        assert!(
            window[0].1 <= window[1].1,
            "deliveries out of order: {:?} before {:?}",
            window[0],
            window[1],
        );
    }
}

/// Assert that, per queue, deliveries preserve push order.
#[allow(dead_code)]
pub fn assert_per_queue_order(log: &DeliveryLog, key: &QueueKey, expected_ms: &[u64]) {
    let log = log.lock().unwrap();
    let times: Vec<Duration> = log
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, ts)| *ts)
        .collect();
    let expected: Vec<Duration> = expected_ms.iter().map(|&t| ms(t)).collect();
    assert_eq!(times, expected, "unexpected deliveries for queue '{key}'");
}
