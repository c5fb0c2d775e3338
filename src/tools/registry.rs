//! Tool Registry
//!
//! Information Hiding:
//! - Tool storage and lookup implementation hidden
//! - Schema checks run before any tool sees its arguments
//! - Dispatch is by declared name only

use super::executor::{ToolExecutor, ToolOutcome};
use super::{Tool, ToolMetadata};
use crate::core::CancellationToken;
use anyhow::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Name-keyed registry of the tools an agent may call
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
    executor: ToolExecutor,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
            executor: ToolExecutor::new(),
        }
    }

    /// Register a new tool
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.metadata().name;
        tracing::info!("Registering tool: {}", name);
        self.tools.insert(name, tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Check if a tool exists
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get all tool names, sorted
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Get all tool metadata
    pub fn list_tools(&self) -> Vec<ToolMetadata> {
        self.tools.values().map(|tool| tool.metadata()).collect()
    }

    /// Get tool metadata as formatted string for LLM prompts
    pub fn tools_description(&self) -> String {
        if self.tools.is_empty() {
            return "(none)".to_string();
        }

        let mut descriptions = Vec::new();
        for tool in self.tools.values() {
            let metadata = tool.metadata();
            let params = if metadata.parameters.is_empty() {
                "  (no parameters)".to_string()
            } else {
                metadata
                    .parameters
                    .iter()
                    .map(|p| {
                        let required = if p.required { "required" } else { "optional" };
                        format!(
                            "  - {} ({}): {} [{}]",
                            p.name, p.param_type, p.description, required
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            };

            descriptions.push(format!(
                "Tool: {}\nDescription: {}\nParameters:\n{}",
                metadata.name, metadata.description, params
            ));
        }
        descriptions.join("\n\n")
    }

    /// Look up `name`, check `args` against its declared parameters, then run it
    pub async fn dispatch(
        &self,
        name: &str,
        args: Value,
        cancel: &CancellationToken,
    ) -> Result<ToolOutcome> {
        let tool = self
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Tool '{}' not found", name))?;

        check_arguments(&tool.metadata(), &args)?;

        Ok(self.executor.execute(tool, args, cancel).await)
    }
}

/// Required parameters must be present; declared string parameters must be strings
fn check_arguments(metadata: &ToolMetadata, args: &Value) -> Result<()> {
    let object = match args {
        Value::Object(map) => map.clone(),
        Value::Null => serde_json::Map::new(),
        other => {
            return Err(anyhow::anyhow!(
                "Arguments for '{}' must be a JSON object, got {}",
                metadata.name,
                other
            ))
        }
    };

    for param in &metadata.parameters {
        match object.get(&param.name) {
            None | Some(Value::Null) if param.required => {
                return Err(anyhow::anyhow!(
                    "Missing required parameter '{}' for tool '{}'",
                    param.name,
                    metadata.name
                ));
            }
            Some(value) if param.param_type == "string" && !value.is_string() && !value.is_null() => {
                return Err(anyhow::anyhow!(
                    "Parameter '{}' for tool '{}' must be a string",
                    param.name,
                    metadata.name
                ));
            }
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ToolParameter, ToolResult};
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn metadata(&self) -> ToolMetadata {
            ToolMetadata {
                name: "echo".to_string(),
                description: "Echo the text argument".to_string(),
                parameters: vec![ToolParameter {
                    name: "text".to_string(),
                    param_type: "string".to_string(),
                    description: "Text to echo".to_string(),
                    required: true,
                }],
            }
        }

        async fn execute(&self, args: Value) -> Result<ToolResult> {
            Ok(ToolResult::success(args["text"].as_str().unwrap_or_default()))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        registry
    }

    #[test]
    fn test_registry_register_and_get() {
        let registry = registry();

        assert!(registry.has_tool("echo"));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.tool_names(), vec!["echo".to_string()]);
    }

    #[test]
    fn test_tools_description() {
        let description = registry().tools_description();

        assert!(description.contains("Tool: echo"));
        assert!(description.contains("Description:"));
        assert!(description.contains("text (string): Text to echo [required]"));
        assert_eq!(ToolRegistry::new().tools_description(), "(none)");
    }

    #[tokio::test]
    async fn test_dispatch_by_name() {
        let outcome = registry()
            .dispatch("echo", json!({"text": "hi"}), &CancellationToken::new())
            .await
            .unwrap();

        match outcome {
            ToolOutcome::Completed { result, .. } => assert_eq!(result.output, "hi"),
            ToolOutcome::Cancelled => panic!("unexpected cancellation"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let err = registry()
            .dispatch("rm_everything", json!({}), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_dispatch_checks_schema() {
        let registry = registry();
        let cancel = CancellationToken::new();

        let missing = registry.dispatch("echo", json!({}), &cancel).await;
        assert!(missing.unwrap_err().to_string().contains("Missing required"));

        let wrong_type = registry.dispatch("echo", json!({"text": 5}), &cancel).await;
        assert!(wrong_type.unwrap_err().to_string().contains("must be a string"));

        let not_object = registry.dispatch("echo", json!(["x"]), &cancel).await;
        assert!(not_object.is_err());
    }
}
