use super::messages::{Message, USER};
use crate::core::CancellationToken;
use anyhow::Result;
use async_trait::async_trait;

/// A swarm participant
///
/// The router only looks at what an agent emits: plain text, or a handoff
/// naming the next active agent. How the agent decides, and which tools it
/// calls while deciding, stays inside `on_messages`.
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Agents this one may hand control to. [`USER`] is always allowed.
    fn handoffs(&self) -> &[String];

    /// Take one turn over the full history. Every returned message must be
    /// attributed to `self.name()`; a handoff ends the turn.
    async fn on_messages(
        &self,
        history: &[Message],
        cancel: &CancellationToken,
    ) -> Result<Vec<Message>>;

    fn can_hand_off_to(&self, target: &str) -> bool {
        target == USER || self.handoffs().iter().any(|h| h == target)
    }
}
