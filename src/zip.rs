//! Synchronized multi-source fan-in.

use std::sync::Arc;

use futures::future::join_all;

use crate::error::QueueError;
use crate::marker::Packet;
use crate::queue::QueueNode;

/// Pulls one value from each of several queues per round, in lock-step.
///
/// Each round issues the fetches against all sources concurrently; the row is
/// emitted only once every source has answered. The combined stream ends
/// permanently at the first stop marker from any source; values already
/// fetched from the other sources in that round are acknowledged and
/// discarded, not reinserted. Producers feeding a zip are responsible for
/// emitting comparable numbers of data items; the zip does not buffer or
/// reorder.
pub struct SynchronizedZip<T> {
    sources: Vec<Arc<QueueNode<T>>>,
    done: bool,
}

impl<T> SynchronizedZip<T> {
    pub fn new(sources: Vec<Arc<QueueNode<T>>>) -> Self {
        Self {
            sources,
            done: false,
        }
    }

    /// Next row of values, one per source in source order, or `None` once
    /// any source signals a stop.
    pub async fn next(&mut self) -> Result<Option<Vec<T>>, QueueError> {
        if self.done || self.sources.is_empty() {
            return Ok(None);
        }

        let packets = join_all(self.sources.iter().map(|source| source.get())).await;

        let mut row = Vec::with_capacity(packets.len());
        let mut stopped = false;
        for (packet, source) in packets.into_iter().zip(&self.sources) {
            source.acknowledge()?;
            match packet {
                Packet::Data(value) => row.push(value),
                Packet::Stop(_) => stopped = true,
            }
        }

        if stopped {
            self.done = true;
            return Ok(None);
        }
        Ok(Some(row))
    }
}
