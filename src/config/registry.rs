//! Explicit node-type registry and pipeline assembly.
//!
//! The registry is an ordinary value owned by the process entry point, not
//! ambient global state: whoever loads blueprints decides which node kinds
//! exist.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use snafu::{OptionExt, ResultExt};
use tracing::debug;

use crate::config::Blueprint;
use crate::error::{
    ConfigError, InvalidParamsSnafu, MissingChannelSnafu, UnknownExposedQueueSnafu,
    UnknownKindSnafu, UnknownQueueSnafu,
};
use crate::nodes::{JsonLinesReader, JsonLinesWriter, StaticPusher};
use crate::queue::QueueNode;
use crate::topology::{Node, Pipeline};

/// Dynamic payload type carried by blueprint-built pipelines.
pub type Payload = serde_json::Value;

/// Everything a constructor needs to build one node: its instance name, its
/// params block, and its resolved channels.
pub struct NodeContext<'a> {
    name: &'a str,
    params: &'a serde_yaml::Value,
    channels: HashMap<String, Arc<QueueNode<Payload>>>,
}

impl NodeContext<'_> {
    pub fn name(&self) -> &str {
        self.name
    }

    /// Resolve a required channel parameter.
    pub fn channel(&self, param: &str) -> Result<Arc<QueueNode<Payload>>, ConfigError> {
        self.channels
            .get(param)
            .cloned()
            .context(MissingChannelSnafu {
                node: self.name,
                channel: param,
            })
    }

    /// Deserialize the node's params block. An omitted block reads as an
    /// empty mapping so that kinds with all-default params need none.
    pub fn params<P: DeserializeOwned>(&self) -> Result<P, ConfigError> {
        let params = if self.params.is_null() {
            serde_yaml::Value::Mapping(serde_yaml::Mapping::new())
        } else {
            self.params.clone()
        };
        serde_yaml::from_value(params).context(InvalidParamsSnafu { node: self.name })
    }
}

/// Constructor for one node kind.
pub type NodeConstructor =
    Box<dyn Fn(&NodeContext<'_>) -> Result<Arc<dyn Node>, ConfigError> + Send + Sync>;

/// Maps blueprint `kind` tags to node constructors.
pub struct NodeRegistry {
    constructors: HashMap<String, NodeConstructor>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registry pre-loaded with the bundled leaf nodes.
    pub fn with_builtin_nodes() -> Self {
        let mut registry = Self::new();
        registry.register("static_pusher", StaticPusher::from_blueprint);
        registry.register("jsonl_reader", JsonLinesReader::from_blueprint);
        registry.register("jsonl_writer", JsonLinesWriter::from_blueprint);
        registry
    }

    pub fn register<F>(&mut self, kind: impl Into<String>, constructor: F)
    where
        F: Fn(&NodeContext<'_>) -> Result<Arc<dyn Node>, ConfigError> + Send + Sync + 'static,
    {
        self.constructors.insert(kind.into(), Box::new(constructor));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Materialize a pipeline from a parsed blueprint: create its queues,
    /// construct its nodes in declaration order, and wire the exposed
    /// interface.
    pub fn build(&self, blueprint: &Blueprint) -> Result<Pipeline<Payload>, ConfigError> {
        let spec = &blueprint.pipeline;

        let mut queues: HashMap<String, Arc<QueueNode<Payload>>> = HashMap::new();
        for (queue_name, queue_spec) in &spec.queues {
            queues.insert(
                queue_name.clone(),
                Arc::new(QueueNode::with_capacity(queue_spec.capacity)),
            );
        }

        let mut nodes: Vec<Arc<dyn Node>> = Vec::with_capacity(spec.nodes.len());
        for node_spec in &spec.nodes {
            let name = node_spec
                .name
                .clone()
                .unwrap_or_else(|| node_spec.kind.clone());
            let constructor =
                self.constructors
                    .get(&node_spec.kind)
                    .context(UnknownKindSnafu {
                        kind: node_spec.kind.as_str(),
                    })?;

            let mut channels = HashMap::new();
            for (param, queue_name) in &node_spec.channels {
                let queue = queues.get(queue_name).context(UnknownQueueSnafu {
                    node: name.as_str(),
                    queue: queue_name.as_str(),
                })?;
                channels.insert(param.clone(), Arc::clone(queue));
            }

            let context = NodeContext {
                name: &name,
                params: &node_spec.params,
                channels,
            };
            nodes.push(constructor(&context)?);
            debug!(node = %name, kind = %node_spec.kind, "Constructed node");
        }

        let mut interface = HashMap::new();
        for (external, queue_name) in &spec.expose {
            let queue = queues.get(queue_name).context(UnknownExposedQueueSnafu {
                name: external.as_str(),
                queue: queue_name.as_str(),
            })?;
            interface.insert(external.clone(), Arc::clone(queue));
        }

        Ok(Pipeline::new(spec.name.clone(), nodes, interface))
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blueprint(yaml: &str) -> Blueprint {
        Blueprint::parse(yaml).unwrap()
    }

    #[test]
    fn builtin_kinds_are_registered() {
        let registry = NodeRegistry::with_builtin_nodes();
        assert!(registry.contains("static_pusher"));
        assert!(registry.contains("jsonl_reader"));
        assert!(registry.contains("jsonl_writer"));
        assert!(!registry.contains("ftp_uploader"));
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let registry = NodeRegistry::new();
        let result = registry.build(&blueprint(
            r#"
pipeline:
  queues:
    q: {}
  nodes:
    - kind: mystery
"#,
        ));
        assert!(matches!(result, Err(ConfigError::UnknownKind { kind }) if kind == "mystery"));
    }

    #[test]
    fn undeclared_queue_reference_is_an_error() {
        let registry = NodeRegistry::with_builtin_nodes();
        let result = registry.build(&blueprint(
            r#"
pipeline:
  nodes:
    - kind: static_pusher
      channels:
        target: missing
"#,
        ));
        assert!(matches!(
            result,
            Err(ConfigError::UnknownQueue { queue, .. }) if queue == "missing"
        ));
    }

    #[test]
    fn missing_required_channel_is_an_error() {
        let registry = NodeRegistry::with_builtin_nodes();
        let result = registry.build(&blueprint(
            r#"
pipeline:
  nodes:
    - kind: static_pusher
"#,
        ));
        assert!(matches!(
            result,
            Err(ConfigError::MissingChannel { channel, .. }) if channel == "target"
        ));
    }

    #[test]
    fn undeclared_exposed_queue_is_an_error() {
        let registry = NodeRegistry::with_builtin_nodes();
        let result = registry.build(&blueprint(
            r#"
pipeline:
  expose:
    output: missing
"#,
        ));
        assert!(matches!(
            result,
            Err(ConfigError::UnknownExposedQueue { queue, .. }) if queue == "missing"
        ));
    }

    #[tokio::test]
    async fn built_pipeline_runs() {
        let registry = NodeRegistry::with_builtin_nodes();
        let pipeline = registry
            .build(&blueprint(
                r#"
pipeline:
  name: statics
  queues:
    rows: {}
  nodes:
    - kind: static_pusher
      params:
        data: [1, "two", {"three": 3}]
      channels:
        target: rows
  expose:
    output: rows
"#,
            ))
            .unwrap();

        assert_eq!(pipeline.name(), Some("statics"));
        assert_eq!(pipeline.node_count(), 1);

        let running = Arc::new(pipeline).start();
        let output = running.channel("output").unwrap();
        let values = output.items().collect().await.unwrap();
        assert_eq!(
            values,
            vec![
                serde_json::json!(1),
                serde_json::json!("two"),
                serde_json::json!({"three": 3}),
            ]
        );
        running.wait().await.unwrap();
    }
}
