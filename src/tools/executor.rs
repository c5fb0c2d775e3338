//! Tool Executor
//!
//! Information Hiding:
//! - Argument validation ordering hidden
//! - Call timing and size accounting hidden
//! - Cancellation race hidden
//!
//! Tool calls are never retried: a failed or timed-out call is reported once.

use super::{Tool, ToolResult};
use crate::core::CancellationToken;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Metadata about one tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallMetadata {
    pub tool_name: String,
    pub input_size: usize,
    pub output_size: usize,
    pub duration_ms: u64,
    pub success: bool,
}

/// Outcome of a dispatched call
#[derive(Debug, Clone)]
pub enum ToolOutcome {
    Completed {
        result: ToolResult,
        metadata: ToolCallMetadata,
    },
    Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct ToolExecutor;

impl ToolExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Validate, then execute once, racing the call against `cancel`
    pub async fn execute(
        &self,
        tool: Arc<dyn Tool>,
        args: Value,
        cancel: &CancellationToken,
    ) -> ToolOutcome {
        let tool_name = tool.metadata().name;
        let input_size = serde_json::to_string(&args).map(|s| s.len()).unwrap_or(0);
        let start = Instant::now();

        let result = match tool.validate(&args) {
            Err(e) => {
                tracing::warn!("[ToolExecutor] Rejected arguments for '{}': {}", tool_name, e);
                ToolResult::failure(format!("Invalid arguments for '{}': {}", tool_name, e))
            }
            Ok(()) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::info!("[ToolExecutor] '{}' cancelled", tool_name);
                        return ToolOutcome::Cancelled;
                    }
                    outcome = tool.execute(args) => match outcome {
                        Ok(result) => result,
                        Err(e) => {
                            tracing::error!("[ToolExecutor] '{}' failed: {}", tool_name, e);
                            ToolResult::failure(format!("Tool execution failed: {}", e))
                        }
                    },
                }
            }
        };

        let metadata = ToolCallMetadata {
            tool_name,
            input_size,
            output_size: result.output.len(),
            duration_ms: start.elapsed().as_millis() as u64,
            success: result.success,
        };

        tracing::debug!(
            "[ToolExecutor] '{}' finished in {}ms (success: {})",
            metadata.tool_name,
            metadata.duration_ms,
            metadata.success
        );

        ToolOutcome::Completed { result, metadata }
    }
}
