use thiserror::Error;

/// Faults raised while dispatching a named operation. The gateway turns every
/// one of them into an error-flagged envelope.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize result: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected failure: {0}")]
    Unexpected(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
