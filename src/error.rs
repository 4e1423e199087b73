//! Error types for queue protocol misuse, node execution, pipeline
//! orchestration, and blueprint loading.

use snafu::prelude::*;

// ============ Queue Errors ============

/// Local protocol-usage faults on a queue. Reported immediately, never
/// retried.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum QueueError {
    /// More completions acknowledged than values delivered.
    #[snafu(display(
        "acknowledged more completions than deliveries (delivered: {delivered}, processed: {processed})"
    ))]
    ExcessAcknowledge { delivered: u64, processed: u64 },
}

// ============ Node Errors ============

/// Failures raised inside a node's `run()`. Any of these is pipeline-fatal.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum NodeError {
    /// Queue protocol violation inside a node.
    #[snafu(display("queue protocol error: {source}"))]
    Queue { source: QueueError },

    /// IO failure in a file adapter.
    #[snafu(display("io error on '{path}': {source}"))]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Malformed or unwritable JSON record.
    #[snafu(display("JSON error in '{path}': {source}"))]
    Json {
        path: String,
        source: serde_json::Error,
    },

    /// Free-form failure from a node implementation.
    #[snafu(display("node failed: {message}"))]
    Failed { message: String },
}

// ============ Pipeline Errors ============

/// Errors surfaced by the pipeline orchestrator.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PipelineError {
    /// A node's `run()` returned an error.
    #[snafu(display("node '{node}' failed: {source}"))]
    NodeFailed { node: String, source: NodeError },

    /// A node task panicked or was aborted before completing.
    #[snafu(display("node task did not complete: {source}"))]
    TaskJoin { source: tokio::task::JoinError },

    /// Lookup of an interface channel by an unexposed name.
    #[snafu(display("no interface channel named '{name}'"))]
    UnknownChannel { name: String },
}

// ============ Config Errors ============

/// Errors raised while loading a blueprint or assembling a pipeline from it.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// Failed to read a blueprint file.
    #[snafu(display("failed to read blueprint file: {source}"))]
    ReadFile { source: std::io::Error },

    /// Failed to parse blueprint YAML.
    #[snafu(display("failed to parse YAML: {source}"))]
    YamlParse { source: serde_yaml::Error },

    /// Node kind with no registered constructor.
    #[snafu(display("unknown node kind '{kind}'"))]
    UnknownKind { kind: String },

    /// Node channel wired to a queue the blueprint never declares.
    #[snafu(display("node '{node}' references undeclared queue '{queue}'"))]
    UnknownQueue { node: String, queue: String },

    /// Exposed interface name pointing at an undeclared queue.
    #[snafu(display("exposed name '{name}' references undeclared queue '{queue}'"))]
    UnknownExposedQueue { name: String, queue: String },

    /// Node constructed without a channel its kind requires.
    #[snafu(display("node '{node}' is missing required channel '{channel}'"))]
    MissingChannel { node: String, channel: String },

    /// Node params that do not deserialize into the kind's parameter type.
    #[snafu(display("invalid params for node '{node}': {source}"))]
    InvalidParams {
        node: String,
        source: serde_yaml::Error,
    },
}
