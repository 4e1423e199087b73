//! The node capability contract.

use async_trait::async_trait;

use crate::error::NodeError;

/// A pipeline member: anything with a zero-argument async `run` entry point.
///
/// Construction arguments are opaque to the orchestrator. A node's only
/// observable effects are through the queues it was built with; any error it
/// returns is pipeline-fatal.
#[async_trait]
pub trait Node: Send + Sync {
    /// Execute this node to completion.
    async fn run(&self) -> Result<(), NodeError>;

    /// Human-readable name for logs and error reports.
    fn name(&self) -> &str {
        "node"
    }
}
