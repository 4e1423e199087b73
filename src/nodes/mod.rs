//! Bundled leaf adapter nodes.
//!
//! These are the replaceable edges of a pipeline: they read and write the
//! outside world and speak to the rest of the graph only through queues. None
//! of the core invariants live here.

mod jsonl;
mod static_pusher;

pub use jsonl::{JsonLinesReader, JsonLinesWriter};
pub use static_pusher::StaticPusher;
