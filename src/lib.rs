//! raceway: a marker-framed async dataflow engine.
//!
//! Processing nodes communicate exclusively through typed, ordered channels
//! ([`QueueNode`]) whose payloads carry in-band end-of-group markers. A flat
//! sequence of values travelling over a single channel can therefore
//! represent an arbitrarily nested stream of groups-of-groups, with no
//! out-of-band length or framing information, decoded lazily by the bucket
//! protocol.
//!
//! - `marker` - in-band stream-segmentation markers
//! - `queue` - flow-accounted channel with scoped, marker-emitting production
//! - `bucket` - recursive decoding of nested groups
//! - `zip` - synchronized multi-source fan-in
//! - `topology` - node contract and pipeline orchestration
//! - `config` - YAML blueprint loading and the node-type registry
//! - `nodes` - bundled leaf adapter nodes
//! - `signal` - signal handling for graceful shutdown
//! - `tracing` - tracing initialization

pub mod bucket;
pub mod config;
pub mod error;
pub mod marker;
pub mod nodes;
pub mod queue;
pub mod signal;
pub mod topology;
pub mod tracing;
pub mod zip;

// Re-export commonly used items
pub use bucket::{Bucket, BucketIter, ItemIter};
pub use config::{Blueprint, NodeContext, NodeRegistry, Payload, PipelineSpec};
pub use error::{ConfigError, NodeError, PipelineError, QueueError};
pub use marker::{Packet, StopMarker};
pub use queue::{QueueNode, DEFAULT_CAPACITY};
pub use signal::shutdown_signal;
pub use topology::{Node, Pipeline, RunningPipeline};
pub use zip::SynchronizedZip;

pub use crate::tracing::init_tracing;
