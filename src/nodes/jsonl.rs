//! JSON Lines file adapters.

use std::sync::Arc;

use async_trait::async_trait;
use snafu::ResultExt;
use tokio::fs;
use tracing::debug;

use crate::config::{NodeContext, Payload};
use crate::error::{ConfigError, IoSnafu, JsonSnafu, NodeError, QueueSnafu};
use crate::queue::QueueNode;
use crate::topology::Node;

fn path_string(value: &Payload) -> Result<String, NodeError> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| NodeError::Failed {
            message: format!("expected a path string, got: {value}"),
        })
}

/// Reads JSON Lines files and pushes one value per record.
///
/// File paths arrive on the `paths` queue. The whole output stream runs in
/// one producer scope, with a nested scope per file, so every file decodes as
/// one level-1 bucket on the target.
pub struct JsonLinesReader {
    name: String,
    paths: Arc<QueueNode<Payload>>,
    target: Arc<QueueNode<Payload>>,
}

impl JsonLinesReader {
    pub fn new(
        name: impl Into<String>,
        paths: Arc<QueueNode<Payload>>,
        target: Arc<QueueNode<Payload>>,
    ) -> Self {
        Self {
            name: name.into(),
            paths,
            target,
        }
    }

    /// Registry constructor. Channels: `paths`, `target`.
    pub fn from_blueprint(context: &NodeContext<'_>) -> Result<Arc<dyn Node>, ConfigError> {
        Ok(Arc::new(Self::new(
            context.name(),
            context.channel("paths")?,
            context.channel("target")?,
        )))
    }
}

#[async_trait]
impl Node for JsonLinesReader {
    async fn run(&self) -> Result<(), NodeError> {
        self.target
            .produce(|target| async move {
                let mut paths = self.paths.items();
                while let Some(path_value) = paths.next().await.context(QueueSnafu)? {
                    let path = path_string(&path_value)?;
                    let contents = fs::read_to_string(&path)
                        .await
                        .context(IoSnafu { path: path.as_str() })?;

                    let file = path.as_str();
                    target
                        .produce(|bucket| async move {
                            for line in contents.lines() {
                                if line.trim().is_empty() {
                                    continue;
                                }
                                let value: Payload =
                                    serde_json::from_str(line).context(JsonSnafu { path: file })?;
                                bucket.put(value).await;
                            }
                            Ok(())
                        })
                        .await?;
                    debug!(node = %self.name, path = %path, "Read file");
                }
                Ok(())
            })
            .await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Writes one JSON line per item of each group from its source queue.
///
/// For every path taken from the `paths` queue, the next run of items on the
/// source queue (up to its stop marker) is written to that file.
pub struct JsonLinesWriter {
    name: String,
    paths: Arc<QueueNode<Payload>>,
    source: Arc<QueueNode<Payload>>,
}

impl JsonLinesWriter {
    pub fn new(
        name: impl Into<String>,
        paths: Arc<QueueNode<Payload>>,
        source: Arc<QueueNode<Payload>>,
    ) -> Self {
        Self {
            name: name.into(),
            paths,
            source,
        }
    }

    /// Registry constructor. Channels: `paths`, `source`.
    pub fn from_blueprint(context: &NodeContext<'_>) -> Result<Arc<dyn Node>, ConfigError> {
        Ok(Arc::new(Self::new(
            context.name(),
            context.channel("paths")?,
            context.channel("source")?,
        )))
    }
}

#[async_trait]
impl Node for JsonLinesWriter {
    async fn run(&self) -> Result<(), NodeError> {
        let mut paths = self.paths.items();
        while let Some(path_value) = paths.next().await.context(QueueSnafu)? {
            let path = path_string(&path_value)?;

            let mut lines = String::new();
            let mut items = self.source.items();
            while let Some(value) = items.next().await.context(QueueSnafu)? {
                let line =
                    serde_json::to_string(&value).context(JsonSnafu { path: path.as_str() })?;
                lines.push_str(&line);
                lines.push('\n');
            }

            fs::write(&path, lines)
                .await
                .context(IoSnafu { path: path.as_str() })?;
            debug!(node = %self.name, path = %path, "Wrote group");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
