use crate::{
    multi_queue::OrderedMultiQueue,
    types::{QueueKey, Timestamped},
};
use eyre::Result;
use futures::{Stream, StreamExt};

/// Drain a stream of keyed items into `merger`, then flush it.
///
/// Items are forwarded one at a time, so sinks fire in global timestamp
/// order while the stream is still being consumed. When the stream ends the
/// remaining queues are flushed and the merger is handed back for
/// inspection or teardown.
///
/// An error on the input stream aborts the drain and propagates; the
/// merger is flushed first so teardown stays clean.
pub async fn collate<T, S>(
    mut merger: OrderedMultiQueue<T>,
    mut stream: S,
) -> Result<OrderedMultiQueue<T>>
where
    T: Timestamped,
    S: Stream<Item = Result<(QueueKey, T)>> + Unpin,
{
    while let Some(next) = stream.next().await {
        match next {
            Ok((key, item)) => merger.add(&key, item),
            Err(err) => {
                merger.flush();
                return Err(err);
            }
        }
    }

    merger.flush();
    Ok(merger)
}
