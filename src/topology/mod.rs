//! Node contract and pipeline orchestration.

mod node;
mod pipeline;

pub use node::Node;
pub use pipeline::{Pipeline, RunningPipeline};
