//! Pipeline orchestration: run heterogeneous nodes concurrently and complete
//! when all of them have completed.

use std::collections::HashMap;
use std::sync::Arc;

use snafu::OptionExt;
use tokio::task::{AbortHandle, JoinHandle, JoinSet};
use tracing::{error, info};

use crate::error::{NodeError, PipelineError, UnknownChannelSnafu};
use crate::queue::QueueNode;
use crate::topology::node::Node;

/// An ordered collection of nodes plus an optional name and an optional
/// mapping of externally exposed queues ("interface").
///
/// A pipeline is never partially torn down: it either has not started, is
/// running, or has fully completed or failed.
pub struct Pipeline<T> {
    name: Option<String>,
    nodes: Vec<Arc<dyn Node>>,
    interface: HashMap<String, Arc<QueueNode<T>>>,
}

impl<T> Pipeline<T> {
    pub fn new(
        name: Option<String>,
        nodes: Vec<Arc<dyn Node>>,
        interface: HashMap<String, Arc<QueueNode<T>>>,
    ) -> Self {
        Self {
            name,
            nodes,
            interface,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Look up an interface queue by its exposed name.
    ///
    /// External callers drive these as primary producers or consumers: the
    /// pipeline's own `run()` does not inject input on its own, so the
    /// external side must put initial data and close its scope with a stop
    /// marker.
    pub fn channel(&self, name: &str) -> Result<Arc<QueueNode<T>>, PipelineError> {
        self.interface
            .get(name)
            .cloned()
            .context(UnknownChannelSnafu { name })
    }
}

impl<T: Send + 'static> Pipeline<T> {
    /// Run every node concurrently; complete only when all have completed.
    ///
    /// Failure policy: there is no proactive cancellation. Siblings of a
    /// failed node keep running until they finish on their own (they may
    /// remain blocked on queue operations if their peer terminated early),
    /// and the first observed failure is surfaced once all tasks have
    /// settled. Use [`RunningPipeline::abort`] for a hard stop.
    pub async fn run(&self) -> Result<(), PipelineError> {
        let mut tasks: JoinSet<(String, Result<(), NodeError>)> = JoinSet::new();
        for node in &self.nodes {
            let node = Arc::clone(node);
            tasks.spawn(async move {
                let name = node.name().to_string();
                let result = node.run().await;
                (name, result)
            });
        }
        info!(
            pipeline = self.name.as_deref().unwrap_or("unnamed"),
            nodes = self.nodes.len(),
            "Spawned node tasks"
        );

        let mut first_failure = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((node, Ok(()))) => {
                    info!(node = %node, "Node completed");
                }
                Ok((node, Err(e))) => {
                    error!(node = %node, error = %e, "Node failed");
                    if first_failure.is_none() {
                        first_failure = Some(PipelineError::NodeFailed { node, source: e });
                    }
                }
                Err(e) => {
                    error!(error = %e, "Node task panicked");
                    if first_failure.is_none() {
                        first_failure = Some(PipelineError::TaskJoin { source: e });
                    }
                }
            }
        }

        match first_failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Spawn `run()` in the background and return a handle exposing the
    /// interface queues for external production and consumption.
    pub fn start(self: Arc<Self>) -> RunningPipeline<T> {
        let pipeline = Arc::clone(&self);
        let handle = tokio::spawn(async move { pipeline.run().await });
        RunningPipeline {
            pipeline: self,
            handle,
        }
    }
}

/// Handle to a pipeline whose `run()` is executing in the background.
pub struct RunningPipeline<T> {
    pipeline: Arc<Pipeline<T>>,
    handle: JoinHandle<Result<(), PipelineError>>,
}

impl<T: Send + 'static> RunningPipeline<T> {
    /// Look up an interface queue by its exposed name.
    pub fn channel(&self, name: &str) -> Result<Arc<QueueNode<T>>, PipelineError> {
        self.pipeline.channel(name)
    }

    /// Wait for the background run to complete and surface its result.
    pub async fn wait(self) -> Result<(), PipelineError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(PipelineError::TaskJoin { source: e }),
        }
    }

    /// Hard-stop the background run. Queue contents are left as-is.
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Detached handle for aborting the run after `wait()` has consumed this
    /// value, e.g. from a shutdown branch racing against completion.
    pub fn abort_handle(&self) -> AbortHandle {
        self.handle.abort_handle()
    }
}
