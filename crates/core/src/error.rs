//! Error types shared across the assistant crates

use thiserror::Error;

/// Result alias used by the capability traits
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by external collaborators (reasoning provider, knowledge system)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Reasoning provider error: {0}")]
    Provider(String),

    #[error("Reasoning provider unreachable: {0}")]
    ProviderUnreachable(String),

    #[error("Knowledge system error: {0}")]
    Knowledge(String),

    #[error("Timeout after {0} ms")]
    Timeout(u64),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),
}

impl Error {
    /// Network-level failures (the collaborator could not be reached in time)
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            Error::ProviderUnreachable(_)
                | Error::Timeout(_)
                | Error::Tool(ToolError::Unreachable(_))
                | Error::Tool(ToolError::Timeout { .. })
        )
    }
}

/// Tool-level error taxonomy
///
/// Every variant is recoverable: tools convert these into user-facing
/// messages at their boundary, and the router turns them into a fallback.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unreachable: {0}")]
    Unreachable(String),

    #[error("Tool '{tool}' timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },

    #[error("No rate available for {from} → {to}")]
    NoRateAvailable { from: String, to: String },

    #[error("Tool already registered: {0}")]
    DuplicateName(String),
}

impl ToolError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn timeout(tool: impl Into<String>, secs: u64) -> Self {
        Self::Timeout {
            tool: tool.into(),
            secs,
        }
    }
}

/// Rejected calculator input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculatorError {
    #[error("Invalid value for {param}: {message}")]
    InvalidInput { param: &'static str, message: String },
}

impl CalculatorError {
    pub(crate) fn invalid(param: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            param,
            message: message.into(),
        }
    }
}

impl From<CalculatorError> for ToolError {
    fn from(err: CalculatorError) -> Self {
        ToolError::InvalidInput(err.to_string())
    }
}
