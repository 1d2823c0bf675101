//! Error types for tool dispatch

use std::fmt;

#[derive(Debug)]
pub enum ToolError {
    /// No tool registered under this name
    UnknownTool(String),
    /// The tool declares parameters but none were supplied
    MissingParameter(String),
    /// An argument was not a string, number or boolean
    InvalidArgument { tool: String, field: String },
    /// The trading-data API failed
    Upstream(uex_api::UpstreamError),
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTool(name) => write!(f, "Function {} is not defined.", name),
            Self::MissingParameter(name) => {
                write!(f, "At least one parameter is required for function {}.", name)
            }
            Self::InvalidArgument { tool, field } => write!(
                f,
                "Argument {} for function {} must be a string, number or boolean.",
                field, tool
            ),
            Self::Upstream(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ToolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Upstream(e) => Some(e),
            _ => None,
        }
    }
}

impl From<uex_api::UpstreamError> for ToolError {
    fn from(e: uex_api::UpstreamError) -> Self {
        Self::Upstream(e)
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;
