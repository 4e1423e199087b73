//! In-band stream-segmentation markers.
//!
//! A marker is an ordinary channel payload: it travels through a queue in
//! FIFO order with the data surrounding it, and consumers recognise it by
//! matching on [`Packet::Stop`], not by any out-of-band signal. This is what
//! lets a flat stream carry nested group boundaries with no framing protocol.

use std::collections::BTreeMap;

/// End-of-group sentinel.
///
/// A level-0 marker ends the entire stream; a level-L marker (L > 0) ends the
/// L-th enclosing group. The optional `domain` map carries auxiliary
/// key/value context and participates in equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopMarker {
    level: u32,
    domain: Option<BTreeMap<String, String>>,
}

impl StopMarker {
    /// Marker ending the group at the given nesting level.
    pub fn new(level: u32) -> Self {
        Self {
            level,
            domain: None,
        }
    }

    /// Marker ending the entire stream.
    pub fn stream_end() -> Self {
        Self::new(0)
    }

    /// Attach an auxiliary domain map to this marker.
    pub fn with_domain(mut self, domain: BTreeMap<String, String>) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn domain(&self) -> Option<&BTreeMap<String, String>> {
        self.domain.as_ref()
    }
}

/// A channel element: either a data value or an end-of-group marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet<T> {
    Data(T),
    Stop(StopMarker),
}

impl<T> Packet<T> {
    pub fn is_stop(&self) -> bool {
        matches!(self, Packet::Stop(_))
    }

    /// The data value, or `None` for a marker.
    pub fn into_data(self) -> Option<T> {
        match self {
            Packet::Data(value) => Some(value),
            Packet::Stop(_) => None,
        }
    }
}
