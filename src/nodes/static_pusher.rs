//! Fixed-data source node.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::{NodeContext, Payload};
use crate::error::{ConfigError, NodeError};
use crate::queue::QueueNode;
use crate::topology::Node;

/// Pushes a fixed list of values into its target queue inside one producer
/// scope, then ends the stream.
pub struct StaticPusher {
    name: String,
    data: Vec<Payload>,
    target: Arc<QueueNode<Payload>>,
}

impl StaticPusher {
    pub fn new(
        name: impl Into<String>,
        data: Vec<Payload>,
        target: Arc<QueueNode<Payload>>,
    ) -> Self {
        Self {
            name: name.into(),
            data,
            target,
        }
    }

    /// Registry constructor. Channels: `target`. Params: `data` (list).
    pub fn from_blueprint(context: &NodeContext<'_>) -> Result<Arc<dyn Node>, ConfigError> {
        #[derive(Deserialize)]
        struct Params {
            #[serde(default)]
            data: Vec<Payload>,
        }

        let params: Params = context.params()?;
        Ok(Arc::new(Self::new(
            context.name(),
            params.data,
            context.channel("target")?,
        )))
    }
}

#[async_trait]
impl Node for StaticPusher {
    async fn run(&self) -> Result<(), NodeError> {
        self.target
            .produce(|target| async move {
                for value in self.data.iter().cloned() {
                    target.put(value).await;
                }
                Ok(())
            })
            .await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
