// SPDX-License-Identifier: MIT

//! Typed error handling for stageflow-rs
//!
//! Three layers: `PipelineError` for sequence construction and execution,
//! `ToolError` for tool calls, and `StageflowError` wrapping both together
//! with the I/O, parsing and HTTP failures of the outer surfaces.

use thiserror::Error;

/// Top-level error type for stageflow-rs
#[derive(Debug, Error)]
pub enum StageflowError {
    /// Sequence compilation or execution failed
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A tool rejected its arguments or failed
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Tool not registered
    #[error("Tool '{name}' not found")]
    ToolNotFound { name: String },

    /// Configuration errors (bad env vars, invalid addresses)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Non-success response from a remote API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP transport errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Malformed base URLs
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

/// Errors raised while building or running a sequence
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage (or the input check in front of the first stage) found a
    /// field missing or of the wrong type
    #[error("Invalid input to stage '{stage}': field '{field}' {reason}")]
    InvalidInput {
        stage: String,
        field: String,
        reason: String,
    },

    /// The sequence definition itself is malformed
    #[error("Compilation error: {0}")]
    Compilation(#[from] CompilationError),
}

/// Structural problems detected by `SequenceBuilder::compile`
#[derive(Debug, Error, PartialEq)]
pub enum CompilationError {
    #[error("Sequence has no nodes")]
    Empty,

    #[error("No entry point set")]
    MissingEntryPoint,

    #[error("Node '{0}' is not registered")]
    NodeNotFound(String),

    #[error("Node '{0}' was added more than once")]
    DuplicateNode(String),

    /// Linear sequences allow a single outgoing edge per node
    #[error("Node '{0}' has more than one outgoing edge")]
    Branching(String),

    #[error("Cycle detected through: {0:?}")]
    Cycle(Vec<String>),

    #[error("Node '{0}' is not reachable from the entry point")]
    Unreachable(String),

    /// Stage name in a sequence file that the catalog does not know
    #[error("Unknown stage: {0}")]
    UnknownStage(String),
}

/// Errors returned by `Tool::execute`
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(#[from] serde_json::Error),

    #[error("{kind} '{name}' not found")]
    NotFound { kind: String, name: String },

    #[error("Tool failed: {0}")]
    Failed(String),
}

impl StageflowError {
    /// Create an API error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a tool not found error
    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::ToolNotFound { name: name.into() }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl PipelineError {
    pub fn invalid_input(
        stage: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            stage: stage.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl ToolError {
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

pub type Result<T, E = StageflowError> = std::result::Result<T, E>;
