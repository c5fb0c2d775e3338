//! Assistant Agent - LLM-backed swarm participant
//!
//! Information Hiding:
//! - Prompt layout and JSON decision format hidden from the router
//! - Inner think/act loop over tools hidden; the router only sees the
//!   turn's final text or handoff
//! - Tool dispatch goes through the agent's own registry by name

use super::agent::Agent;
use super::messages::{Message, USER};
use crate::core::{CancellationToken, ChatMessage, CompletionClient};
use crate::tools::executor::{ToolCallMetadata, ToolOutcome};
use crate::tools::registry::ToolRegistry;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Declared handoff target with an optional description for the prompt
#[derive(Debug, Clone)]
pub struct HandoffTarget {
    pub name: String,
    pub description: Option<String>,
}

/// Decision structure returned by the agent's LLM
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct AgentDecision {
    #[serde(default)]
    thought: String,
    #[serde(default)]
    action: Option<AgentAction>,
    #[serde(default)]
    handoff: Option<HandoffDecision>,
    #[serde(default, deserialize_with = "deserialize_final_answer")]
    final_answer: Option<String>,
}

/// Custom deserializer that accepts either a string or JSON value
fn deserialize_final_answer<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let value: Option<Value> = Option::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Ok(Some(
            serde_json::to_string_pretty(&other).map_err(Error::custom)?,
        )),
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct AgentAction {
    tool: String,
    #[serde(default)]
    input: Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct HandoffDecision {
    target: String,
    #[serde(default)]
    message: String,
}

pub struct AssistantAgent {
    name: String,
    description: String,
    system_prompt: String,
    handoffs: Vec<String>,
    handoff_targets: Vec<HandoffTarget>,
    tools: ToolRegistry,
    client: Arc<dyn CompletionClient>,
    max_tool_iterations: usize,
}

impl std::fmt::Debug for AssistantAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantAgent")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("handoffs", &self.handoffs)
            .field("tools", &self.tools.tool_names())
            .field("max_tool_iterations", &self.max_tool_iterations)
            .finish()
    }
}

impl AssistantAgent {
    pub(crate) fn new(
        name: String,
        description: String,
        system_prompt: String,
        handoff_targets: Vec<HandoffTarget>,
        tools: ToolRegistry,
        client: Arc<dyn CompletionClient>,
        max_tool_iterations: usize,
    ) -> Self {
        let handoffs = handoff_targets.iter().map(|t| t.name.clone()).collect();
        Self {
            name,
            description,
            system_prompt,
            handoffs,
            handoff_targets,
            tools,
            client,
            max_tool_iterations: max_tool_iterations.max(1),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    fn handoff_section(&self) -> String {
        if self.handoff_targets.is_empty() {
            return "(none)".to_string();
        }

        self.handoff_targets
            .iter()
            .map(|target| match (&target.description, target.name.as_str()) {
                (Some(desc), _) => format!("- {}: {}", target.name, desc),
                (None, USER) => format!(
                    "- {}: the person asking the question; hand off when you need their input",
                    USER
                ),
                (None, _) => format!("- {}", target.name),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn full_system_prompt(&self) -> String {
        format!(
            "{}\n\n\
             You are '{}', one agent in a team. Messages from others are prefixed with [sender].\n\n\
             Available Tools:\n{}\n\n\
             You may hand the conversation off to:\n{}\n\n\
             You MUST respond in this EXACT JSON format:\n\
             {{\n  \
               \"thought\": \"your reasoning about what to do next\",\n  \
               \"action\": {{\"tool\": \"tool_name\", \"input\": {{\"param\": \"value\"}}}},\n  \
               \"handoff\": null,\n  \
               \"final_answer\": null\n\
             }}\n\n\
             Set exactly ONE of:\n\
             - \"action\" to call a tool; you will receive its output as an observation\n\
             - \"handoff\" as {{\"target\": \"agent_name\", \"message\": \"what they should know\"}} to pass control\n\
             - \"final_answer\" to reply to the team and end your turn\n\n\
             Always respond with valid JSON only. No extra text.",
            self.system_prompt,
            self.name,
            self.tools.tools_description(),
            self.handoff_section(),
        )
    }

    /// Own messages become assistant turns; everything else is a tagged user turn
    fn render_history(&self, history: &[Message]) -> Vec<ChatMessage> {
        history
            .iter()
            .map(|message| match message {
                Message::Text { source, content } if *source == self.name => {
                    ChatMessage::assistant(content.clone())
                }
                Message::Handoff {
                    source,
                    target,
                    content,
                } if *source == self.name => {
                    ChatMessage::assistant(format!("[handoff to {}] {}", target, content))
                }
                Message::Text { source, content } => {
                    ChatMessage::user(format!("[{}] {}", source, content))
                }
                Message::Handoff {
                    source,
                    target,
                    content,
                } => ChatMessage::user(format!("[{} -> {}] {}", source, target, content)),
            })
            .collect()
    }

    /// Think step - Ask LLM to reason about next action
    async fn think(&self, conversation: &[ChatMessage]) -> Result<AgentDecision> {
        let response = self.client.complete(conversation.to_vec()).await?;
        Ok(self.parse_decision(response))
    }

    fn parse_decision(&self, response: String) -> AgentDecision {
        if let Ok(decision) = serde_json::from_str::<AgentDecision>(&response) {
            return decision;
        }

        tracing::debug!(
            "[{}] Response not pure JSON, attempting extraction",
            self.name
        );

        if let (Some(start), Some(end)) = (response.find('{'), response.rfind('}')) {
            if start < end {
                if let Ok(decision) = serde_json::from_str::<AgentDecision>(&response[start..=end])
                {
                    return decision;
                }
            }
        }

        tracing::warn!(
            "[{}] Could not extract valid JSON, treating response as final answer",
            self.name
        );
        AgentDecision {
            final_answer: Some(response),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Agent for AssistantAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn handoffs(&self) -> &[String] {
        &self.handoffs
    }

    async fn on_messages(
        &self,
        history: &[Message],
        cancel: &CancellationToken,
    ) -> Result<Vec<Message>> {
        let mut conversation = vec![ChatMessage::system(self.full_system_prompt())];
        conversation.extend(self.render_history(history));

        let mut tool_calls: Vec<ToolCallMetadata> = Vec::new();
        let mut last_observation: Option<String> = None;

        for iteration in 0..self.max_tool_iterations {
            tracing::debug!(
                "[{}] Iteration {}/{}",
                self.name,
                iteration + 1,
                self.max_tool_iterations
            );

            let decision = self.think(&conversation).await?;
            if !decision.thought.is_empty() {
                tracing::debug!("[{}] Thought: {}", self.name, decision.thought);
            }

            if let Some(handoff) = decision.handoff {
                if self.can_hand_off_to(&handoff.target) {
                    tracing::info!(
                        "[{}] Handing off to '{}' after {} tool call(s)",
                        self.name,
                        handoff.target,
                        tool_calls.len()
                    );
                    return Ok(vec![Message::handoff(
                        self.name.clone(),
                        handoff.target,
                        handoff.message,
                    )]);
                }

                tracing::warn!(
                    "[{}] Model chose undeclared handoff target '{}'",
                    self.name,
                    handoff.target
                );
                conversation.push(ChatMessage::user(format!(
                    "'{}' is not a valid handoff target. Choose one of: {}",
                    handoff.target,
                    self.handoffs.join(", ")
                )));
                continue;
            }

            if let Some(action) = decision.action {
                tracing::info!("[{}] Executing tool: {}", self.name, action.tool);

                conversation.push(ChatMessage::assistant(
                    serde_json::to_string(&AgentAction {
                        tool: action.tool.clone(),
                        input: action.input.clone(),
                    })
                    .unwrap_or_else(|_| format!("Action: {}", action.tool)),
                ));

                let observation = match self
                    .tools
                    .dispatch(&action.tool, action.input, cancel)
                    .await
                {
                    Ok(ToolOutcome::Completed { result, metadata }) => {
                        tool_calls.push(metadata);
                        result.observation()
                    }
                    Ok(ToolOutcome::Cancelled) => {
                        return Err(anyhow::anyhow!("turn cancelled during '{}'", action.tool));
                    }
                    Err(e) => format!("Error: {}", e),
                };

                tracing::debug!("[{}] Tool observation: {}", self.name, observation);

                conversation.push(ChatMessage::user(format!(
                    "Observation: {}\n\nIf this answers the request, give a final_answer or hand off. \
                     Otherwise choose the next action.",
                    observation
                )));
                last_observation = Some(observation);
                continue;
            }

            if let Some(answer) = decision.final_answer {
                return Ok(vec![Message::text(self.name.clone(), answer)]);
            }

            if !decision.thought.is_empty() {
                return Ok(vec![Message::text(self.name.clone(), decision.thought)]);
            }

            conversation.push(ChatMessage::user(
                "Your reply set no action, handoff or final_answer. Respond with exactly one of them.",
            ));
        }

        tracing::warn!(
            "[{}] Tool iteration limit ({}) reached",
            self.name,
            self.max_tool_iterations
        );

        let summary = match last_observation {
            Some(observation) => format!(
                "I reached my tool-call limit. Last result:\n{}",
                observation
            ),
            None => "I reached my tool-call limit without a result.".to_string(),
        };
        Ok(vec![Message::text(self.name.clone(), summary)])
    }
}
