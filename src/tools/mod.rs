//! Tool System - cluster inspection capabilities for agents
//!
//! Information Hiding:
//! - Command lines and binaries hidden behind the `Tool` trait
//! - Argument schemas declared in metadata, checked before dispatch
//! - Failures surface as text in `ToolResult`, never as router errors

pub mod cluster;
pub mod executor;
pub mod macros;
pub mod registry;
pub mod shell;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Tool parameter schema definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub param_type: String,
    pub description: String,
    pub required: bool,
}

/// Tool metadata - describes what the tool does and how to use it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

impl fmt::Display for ToolMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.description)
    }
}

/// Result of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error.into()),
        }
    }

    /// Failed run that still produced output worth showing
    pub fn failure_with_output(output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
            error: Some(error.into()),
        }
    }

    /// Text handed back to the agent. Raw output wins; the error only fills an empty output.
    pub fn observation(&self) -> String {
        if !self.output.is_empty() || self.success {
            return self.output.clone();
        }
        self.error
            .clone()
            .unwrap_or_else(|| "Tool produced no output".to_string())
    }
}

/// Tool trait - All tools must implement this
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get tool metadata (name, description, parameters)
    fn metadata(&self) -> ToolMetadata;

    /// Execute the tool with given arguments
    async fn execute(&self, args: Value) -> Result<ToolResult>;

    /// Validate arguments before execution (optional)
    fn validate(&self, _args: &Value) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_prefers_output() {
        let result = ToolResult::failure_with_output("partial", "exit status 1");
        assert_eq!(result.observation(), "partial");
    }

    #[test]
    fn test_observation_falls_back_to_error() {
        let result = ToolResult::failure("timed out after 2000ms");
        assert_eq!(result.observation(), "timed out after 2000ms");
    }

    #[test]
    fn test_empty_success_is_empty_observation() {
        assert_eq!(ToolResult::success("").observation(), "");
    }
}
