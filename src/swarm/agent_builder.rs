//! Agent Builder - fluent construction of assistant agents
//!
//! Information Hiding:
//! - Hides tool registration and Arc wrapping
//! - Fills default description and prompt from the agent name
//! - Exposes fluent builder interface

use super::assistant_agent::{AssistantAgent, HandoffTarget};
use crate::core::CompletionClient;
use crate::tools::registry::ToolRegistry;
use crate::tools::Tool;
use std::sync::Arc;

const DEFAULT_MAX_TOOL_ITERATIONS: usize = 5;

/// Builder for [`AssistantAgent`]
///
/// # Example
/// ```ignore
/// let agent = AgentBuilder::new("retrieval_agent")
///     .description("Reads live cluster state")
///     .system_prompt("You collect information from the cluster")
///     .handoff("routing_agent")
///     .tools(cluster_tools(&settings.tools))
///     .build(client);
/// ```
pub struct AgentBuilder {
    name: String,
    description: Option<String>,
    system_prompt: Option<String>,
    handoffs: Vec<HandoffTarget>,
    tools: Vec<Arc<dyn Tool>>,
    max_tool_iterations: usize,
}

impl AgentBuilder {
    /// Create a new agent builder with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            system_prompt: None,
            handoffs: Vec::new(),
            tools: Vec::new(),
            max_tool_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
        }
    }

    /// Set the agent's description
    ///
    /// Other agents see it when deciding whether to hand off here.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the agent's system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Declare a handoff target; repeated names are ignored
    pub fn handoff(self, target: impl Into<String>) -> Self {
        self.push_handoff(target.into(), None)
    }

    /// Declare a handoff target with a hint shown in the agent's prompt
    pub fn handoff_with_description(
        self,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.push_handoff(target.into(), Some(description.into()))
    }

    fn push_handoff(mut self, name: String, description: Option<String>) -> Self {
        if !self.handoffs.iter().any(|h| h.name == name) {
            self.handoffs.push(HandoffTarget { name, description });
        }
        self
    }

    /// Add a tool to the agent
    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    /// Add multiple pre-wrapped tools at once
    pub fn tools(mut self, tools: Vec<Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Cap on think/act iterations within one turn (minimum 1)
    pub fn max_tool_iterations(mut self, max: usize) -> Self {
        self.max_tool_iterations = max;
        self
    }

    /// Get the agent name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of tools registered
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn build(self, client: Arc<dyn CompletionClient>) -> AssistantAgent {
        let description = self
            .description
            .unwrap_or_else(|| format!("Assistant agent: {}", self.name));

        let system_prompt = self.system_prompt.unwrap_or_else(|| {
            format!(
                "You are an agent named {}. Use your available tools to complete tasks.",
                self.name
            )
        });

        let mut registry = ToolRegistry::new();
        for tool in self.tools {
            registry.register(tool);
        }

        AssistantAgent::new(
            self.name,
            description,
            system_prompt,
            self.handoffs,
            registry,
            client,
            self.max_tool_iterations,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ChatMessage;
    use crate::swarm::agent::Agent;
    use crate::tools::{ToolMetadata, ToolResult};
    use async_trait::async_trait;
    use serde_json::Value;

    struct DummyTool;

    #[async_trait]
    impl Tool for DummyTool {
        fn metadata(&self) -> ToolMetadata {
            ToolMetadata {
                name: "dummy".to_string(),
                description: "A dummy tool".to_string(),
                parameters: vec![],
            }
        }

        async fn execute(&self, _args: Value) -> anyhow::Result<ToolResult> {
            Ok(ToolResult::success("dummy"))
        }
    }

    struct SilentClient;

    #[async_trait]
    impl CompletionClient for SilentClient {
        async fn complete(&self, _messages: Vec<ChatMessage>) -> anyhow::Result<String> {
            Ok(String::new())
        }
    }

    #[test]
    fn test_agent_builder_basic() {
        let builder = AgentBuilder::new("test_agent")
            .description("Test agent")
            .system_prompt("Test prompt")
            .handoff("other_agent")
            .tool(DummyTool);

        assert_eq!(builder.name(), "test_agent");
        assert_eq!(builder.tool_count(), 1);

        let agent = builder.build(Arc::new(SilentClient));
        assert_eq!(agent.name(), "test_agent");
        assert_eq!(agent.description(), "Test agent");
        assert_eq!(agent.system_prompt(), "Test prompt");
        assert_eq!(agent.handoffs(), ["other_agent".to_string()]);
        assert!(agent.tools().has_tool("dummy"));
    }

    #[test]
    fn test_agent_builder_defaults() {
        let agent = AgentBuilder::new("test_agent").build(Arc::new(SilentClient));

        assert!(agent.description().contains("test_agent"));
        assert!(agent.system_prompt().contains("test_agent"));
        assert!(agent.handoffs().is_empty());
        assert!(agent.tools().is_empty());
    }

    #[test]
    fn test_duplicate_handoffs_collapse() {
        let agent = AgentBuilder::new("routing_agent")
            .handoff("retrieval_agent")
            .handoff_with_description("retrieval_agent", "reads the cluster")
            .handoff("knowledge_agent")
            .build(Arc::new(SilentClient));

        assert_eq!(agent.handoffs().len(), 2);
        assert!(agent.can_hand_off_to("knowledge_agent"));
        assert!(agent.can_hand_off_to("user"));
        assert!(!agent.can_hand_off_to("billing_agent"));
    }
}
