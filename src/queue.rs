//! Flow-accounted channel between processing nodes.
//!
//! A [`QueueNode`] wraps one ordered, capacity-bounded channel of
//! [`Packet`]s and tracks three monotonic counters: `received` (puts
//! accepted), `delivered` (gets returned) and `processed` (completions
//! acknowledged), with the invariant `received >= delivered >= processed`.
//! Termination is communicated in-band via stop markers; there is no close
//! call.

use std::future::Future;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use snafu::ensure;
use tokio::sync::{mpsc, Mutex};

use crate::bucket::{Bucket, BucketIter, ItemIter};
use crate::error::{ExcessAcknowledgeSnafu, QueueError};
use crate::marker::{Packet, StopMarker};

/// Default channel capacity when a blueprint or caller does not specify one.
pub const DEFAULT_CAPACITY: usize = 64;

/// An async-safe, ordered channel carrying data and in-band stop markers,
/// shared by one logical producer side and one logical consumer side.
///
/// Multiple logical writers are supported only through properly nested
/// [`produce`](QueueNode::produce) scopes; the `context_depth` counter is the
/// sole serialization mechanism, and it assumes (rather than enforces) that
/// nested entries and exits do not run concurrently on the same queue.
pub struct QueueNode<T> {
    tx: mpsc::Sender<Packet<T>>,
    rx: Mutex<mpsc::Receiver<Packet<T>>>,
    received: AtomicU64,
    delivered: AtomicU64,
    processed: AtomicU64,
    context_depth: AtomicI64,
}

impl<T> QueueNode<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            tx,
            rx: Mutex::new(rx),
            received: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            processed: AtomicU64::new(0),
            context_depth: AtomicI64::new(-1),
        }
    }

    /// Enqueue a packet, suspending until buffer capacity is available.
    ///
    /// `received` is incremented after capacity is granted but before the
    /// packet becomes visible to the consumer, so a put that is still
    /// suspended on a full buffer is not counted, and a delivered packet is
    /// always already counted.
    pub async fn send(&self, packet: Packet<T>) {
        // Both endpoints live inside this node, so the channel cannot close
        // while the node is alive.
        let permit = self
            .tx
            .reserve()
            .await
            .expect("receiver is owned by this node");
        self.received.fetch_add(1, Ordering::SeqCst);
        permit.send(packet);
    }

    /// Enqueue a data value.
    pub async fn put(&self, value: T) {
        self.send(Packet::Data(value)).await;
    }

    /// Enqueue a stop marker.
    pub async fn put_stop(&self, marker: StopMarker) {
        self.send(Packet::Stop(marker)).await;
    }

    /// Dequeue the next packet, suspending until one is available.
    ///
    /// The caller must match on the result: markers arrive through the same
    /// call as data.
    pub async fn get(&self) -> Packet<T> {
        let packet = self
            .rx
            .lock()
            .await
            .recv()
            .await
            .expect("sender is owned by this node");
        self.delivered.fetch_add(1, Ordering::SeqCst);
        packet
    }

    /// Acknowledge completion of one formerly delivered packet.
    pub fn acknowledge(&self) -> Result<(), QueueError> {
        let delivered = self.delivered.load(Ordering::SeqCst);
        let processed = self.processed.load(Ordering::SeqCst);
        ensure!(
            processed < delivered,
            ExcessAcknowledgeSnafu {
                delivered,
                processed
            }
        );
        self.processed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Packets enqueued but not yet delivered.
    pub fn waiting(&self) -> u64 {
        self.received.load(Ordering::SeqCst) - self.delivered.load(Ordering::SeqCst)
    }

    /// Packets delivered but not yet acknowledged.
    pub fn in_flight(&self) -> u64 {
        self.delivered.load(Ordering::SeqCst) - self.processed.load(Ordering::SeqCst)
    }

    /// Packets acknowledged as complete.
    pub fn completed(&self) -> u64 {
        self.processed.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> u64 {
        self.received.load(Ordering::SeqCst)
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::SeqCst)
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::SeqCst)
    }

    /// Current scoped-production depth (-1 when no scope is open).
    pub fn context_depth(&self) -> i64 {
        self.context_depth.load(Ordering::SeqCst)
    }

    /// Flat iteration: a lazy, finite sequence of data values ending at the
    /// first stop marker.
    ///
    /// The terminating marker is acknowledged and not yielded. The iterator
    /// ends permanently; a later `items()` call continues from the channel's
    /// current position (the channel has no rewind).
    pub fn items(&self) -> ItemIter<'_, T> {
        ItemIter::new(self)
    }

    /// Nested iteration over groups framed by markers up to `depth` levels.
    ///
    /// `buckets(0)` degenerates to plain flat-item iteration. See
    /// [`crate::bucket`] for the decoding protocol.
    pub fn buckets(&self, depth: u32) -> Bucket<'_, T> {
        if depth == 0 {
            Bucket::Items(self.items())
        } else {
            Bucket::Buckets(BucketIter::new(self, depth))
        }
    }

    /// Scoped production: run `body` with this queue as the put target, then
    /// emit the matching end-of-group marker on exit, success or error.
    ///
    /// The marker's level is the context depth captured at entry, so nested
    /// scopes emit markers of decreasing level as they unwind: the innermost
    /// exit emits the highest level first and the outermost exit emits
    /// level 0 last. This is exactly the ordering the bucket protocol
    /// decodes.
    pub async fn produce<'a, F, Fut, R, E>(&'a self, body: F) -> Result<R, E>
    where
        F: FnOnce(&'a QueueNode<T>) -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        let level = (self.context_depth.fetch_add(1, Ordering::SeqCst) + 1) as u32;
        let result = body(self).await;
        self.put_stop(StopMarker::new(level)).await;
        self.context_depth.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl<T> Default for QueueNode<T> {
    fn default() -> Self {
        Self::new()
    }
}
