use collate_core::{OrderedMultiQueue, QueueKey, Timestamped, collate};
use futures::{stream, stream::StreamExt};
use std::time::Duration;

// Define your item type
#[derive(Debug, Clone)]
struct MyMessage(Duration);

impl Timestamped for MyMessage {
    fn timestamp(&self) -> Duration {
        self.0
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let imu_seq = &[998, 2003, 3002];
    let odom_seq = &[1001, 1999, 3000];

    macro_rules! make_stream {
        ($seq:expr) => {{ stream::iter($seq.iter().map(|&ts| MyMessage(Duration::from_millis(ts)))) }};
    }

    let imu = QueueKey::new(0, "imu");
    let odom = QueueKey::new(0, "odometry");

    // Join two sensor streams into one, where each item is identified by
    // its queue key.
    let imu_key = imu.clone();
    let odom_key = odom.clone();
    let join_stream = stream::select(
        make_stream!(imu_seq).map(move |msg| (imu_key.clone(), msg)),
        make_stream!(odom_seq).map(move |msg| (odom_key.clone(), msg)),
    )
    .map(eyre::Ok);

    // Register a sink per sensor, then drain the joined stream through the
    // merger; sinks fire in global timestamp order.
    let mut merger = OrderedMultiQueue::new();
    merger.add_queue(
        imu,
        Box::new(|msg: MyMessage| println!("imu      @ {:?}", msg.timestamp())),
    );
    merger.add_queue(
        odom,
        Box::new(|msg: MyMessage| println!("odometry @ {:?}", msg.timestamp())),
    );

    let _merger = collate(merger, join_stream).await?;

    Ok(())
}
