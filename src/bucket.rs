//! Recursive decoding of marker-framed streams into nested group iterators.
//!
//! A channel carrying markers up to level `depth` decodes into a lazy tree of
//! sub-iterators, one per nesting level. There is exactly one physical cursor
//! on the channel, so sub-iterators cannot run concurrently: a parent hands
//! its already-fetched lookahead packet to exactly one live child at a time,
//! and the child borrows the parent mutably until it is drained. An iterator
//! at `(depth, level)` is exhausted by the first marker whose level equals
//! `depth - level`; markers emitted by unwinding producer scopes arrive in
//! decreasing level order, terminating the innermost iterator first and each
//! enclosing iterator in turn.

use crate::error::QueueError;
use crate::marker::Packet;
use crate::queue::QueueNode;

/// One group at one nesting level: either nested sub-groups or flat items.
pub enum Bucket<'q, T> {
    Items(ItemIter<'q, T>),
    Buckets(BucketIter<'q, T>),
}

impl<'q, T> Bucket<'q, T> {
    /// The flat item iterator, or `None` for a nested group.
    pub fn into_items(self) -> Option<ItemIter<'q, T>> {
        match self {
            Bucket::Items(items) => Some(items),
            Bucket::Buckets(_) => None,
        }
    }

    /// The nested group iterator, or `None` for a flat group.
    pub fn into_buckets(self) -> Option<BucketIter<'q, T>> {
        match self {
            Bucket::Buckets(buckets) => Some(buckets),
            Bucket::Items(_) => None,
        }
    }
}

/// Flat iteration over data values, ending at the first stop marker of any
/// level.
///
/// Every yielded value is acknowledged on the queue before the next fetch;
/// the terminating marker is acknowledged immediately.
pub struct ItemIter<'q, T> {
    queue: &'q QueueNode<T>,
    lookahead: Option<Packet<T>>,
    pending_ack: bool,
    done: bool,
}

impl<'q, T> ItemIter<'q, T> {
    pub(crate) fn new(queue: &'q QueueNode<T>) -> Self {
        Self {
            queue,
            lookahead: None,
            pending_ack: false,
            done: false,
        }
    }

    pub(crate) fn with_lookahead(queue: &'q QueueNode<T>, packet: Packet<T>) -> Self {
        Self {
            queue,
            lookahead: Some(packet),
            pending_ack: false,
            done: false,
        }
    }

    /// Next data value, or `None` once the group ends. The end is permanent
    /// for this cursor.
    pub async fn next(&mut self) -> Result<Option<T>, QueueError> {
        if self.done {
            return Ok(None);
        }
        if self.pending_ack {
            self.queue.acknowledge()?;
            self.pending_ack = false;
        }
        let packet = match self.lookahead.take() {
            Some(packet) => packet,
            None => self.queue.get().await,
        };
        match packet {
            Packet::Data(value) => {
                self.pending_ack = true;
                Ok(Some(value))
            }
            Packet::Stop(_) => {
                self.queue.acknowledge()?;
                self.done = true;
                Ok(None)
            }
        }
    }

    /// Drain the remaining items into a vector.
    pub async fn collect(&mut self) -> Result<Vec<T>, QueueError> {
        let mut values = Vec::new();
        while let Some(value) = self.next().await? {
            values.push(value);
        }
        Ok(values)
    }
}

/// Iterator over the groups at one nesting level of a marker-framed stream.
pub struct BucketIter<'q, T> {
    queue: &'q QueueNode<T>,
    depth: u32,
    level: u32,
    lookahead: Option<Packet<T>>,
    done: bool,
}

impl<'q, T> BucketIter<'q, T> {
    pub(crate) fn new(queue: &'q QueueNode<T>, depth: u32) -> Self {
        Self {
            queue,
            depth,
            level: depth,
            lookahead: None,
            done: false,
        }
    }

    /// Nesting level this iterator decodes (counts down from `depth` to 1).
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Next group, or `None` once this level's terminating marker arrives.
    ///
    /// The returned group borrows this iterator mutably: it must be drained
    /// (and dropped) before the next sibling is requested. A group that ends
    /// immediately, with a marker directly following the one that opened this
    /// level, yields zero items rather than an error.
    pub async fn next(&mut self) -> Result<Option<Bucket<'_, T>>, QueueError> {
        if self.done {
            return Ok(None);
        }
        let packet = match self.lookahead.take() {
            Some(packet) => packet,
            None => self.queue.get().await,
        };
        if let Packet::Stop(marker) = &packet {
            if marker.level() == self.depth - self.level {
                self.queue.acknowledge()?;
                self.done = true;
                return Ok(None);
            }
        }
        Ok(Some(if self.level == 1 {
            Bucket::Items(ItemIter::with_lookahead(self.queue, packet))
        } else {
            Bucket::Buckets(BucketIter {
                queue: self.queue,
                depth: self.depth,
                level: self.level - 1,
                lookahead: Some(packet),
                done: false,
            })
        }))
    }
}
