//! Declarative blueprint loading.
//!
//! The engine does not interpret any file format beyond this module: a
//! blueprint is plain YAML describing one pipeline (its queues, its nodes,
//! and the queues it exposes), and the [`NodeRegistry`] maps each node `kind`
//! tag to a constructor. Building a blueprint yields a ready
//! [`Pipeline`](crate::topology::Pipeline) over dynamic [`Payload`] values.

mod registry;

pub use registry::{NodeConstructor, NodeContext, NodeRegistry, Payload};

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use snafu::ResultExt;

use crate::error::{ConfigError, ReadFileSnafu, YamlParseSnafu};
use crate::queue::DEFAULT_CAPACITY;

/// A parsed blueprint document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Blueprint {
    pub pipeline: PipelineSpec,
}

/// Declarative description of one pipeline.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineSpec {
    #[serde(default)]
    pub name: Option<String>,

    /// Queues by name, created before any node.
    #[serde(default)]
    pub queues: IndexMap<String, QueueSpec>,

    /// Nodes in declaration order.
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,

    /// External name -> queue name exposure map.
    #[serde(default)]
    pub expose: IndexMap<String, String>,
}

/// Declarative description of one queue.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueSpec {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for QueueSpec {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

/// Declarative description of one node.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    /// Registry tag selecting the constructor.
    pub kind: String,

    /// Instance name for logs; defaults to the kind.
    #[serde(default)]
    pub name: Option<String>,

    /// Free-form parameters interpreted by the constructor.
    #[serde(default)]
    pub params: serde_yaml::Value,

    /// Channel parameter name -> declared queue name.
    #[serde(default)]
    pub channels: IndexMap<String, String>,
}

impl Blueprint {
    /// Parse a blueprint from YAML text.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(contents).context(YamlParseSnafu)
    }

    /// Read and parse a blueprint file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).context(ReadFileSnafu)?;
        Self::parse(&contents)
    }
}
