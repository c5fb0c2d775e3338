//! Swarm router - handoff-driven turn taking
//!
//! Information Hiding:
//! - Run state (history, active agent, pause point) owned here only
//! - Handoff validation and termination precedence hidden from agents
//! - Exposes run / resume / reset
//!
//! Turn rules:
//! - The task enters the history as a message from [`USER`]; the entry agent
//!   takes the first turn.
//! - A plain message leaves the turn with the agent that emitted it.
//! - A handoff to a roster agent makes that agent active; a handoff to
//!   [`USER`] pauses the run until [`Swarm::resume`].
//! - Termination is evaluated after every appended message and wins over any
//!   handoff carried by the same message.

use super::agent::Agent;
use super::error::{SwarmError, SwarmResult};
use super::messages::{Message, RunStatus, StopReason, TaskResult, USER};
use super::termination::{Termination, TerminationCondition};
use crate::core::CancellationToken;
use std::collections::HashMap;
use std::sync::Arc;

/// One conversational exchange; survives pauses for user input
#[derive(Debug, Clone)]
struct Run {
    history: Vec<Message>,
    active: String,
    status: RunStatus,
}

pub struct Swarm {
    agents: HashMap<String, Arc<dyn Agent>>,
    order: Vec<String>,
    entry: String,
    termination: Termination,
    run: Option<Run>,
}

impl std::fmt::Debug for Swarm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Swarm")
            .field("agents", &self.order)
            .field("entry", &self.entry)
            .field("termination_conditions", &self.termination.len())
            .field("run", &self.run)
            .finish()
    }
}

/// Builder for a validated roster
pub struct SwarmBuilder {
    agents: Vec<Arc<dyn Agent>>,
    entry: Option<String>,
    termination: Termination,
}

impl SwarmBuilder {
    pub fn new() -> Self {
        Self {
            agents: Vec::new(),
            entry: None,
            termination: Termination::never(),
        }
    }

    pub fn agent<A: Agent + 'static>(mut self, agent: A) -> Self {
        self.agents.push(Arc::new(agent));
        self
    }

    pub fn agent_arc(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.push(agent);
        self
    }

    /// Entry agent; defaults to the first agent added
    pub fn entry(mut self, name: impl Into<String>) -> Self {
        self.entry = Some(name.into());
        self
    }

    pub fn termination(mut self, termination: impl Into<Termination>) -> Self {
        self.termination = termination.into();
        self
    }

    /// Check the roster: unique names, no agent called "user", every declared
    /// handoff target present, entry agent present.
    pub fn build(self) -> SwarmResult<Swarm> {
        if self.agents.is_empty() {
            return Err(SwarmError::Config("swarm has no agents".to_string()));
        }

        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in self.agents {
            let name = agent.name().to_string();
            if name.is_empty() {
                return Err(SwarmError::Config("agent name cannot be empty".to_string()));
            }
            if name == USER {
                return Err(SwarmError::Config(format!(
                    "'{}' is reserved for the human participant",
                    USER
                )));
            }
            if agents.insert(name.clone(), agent).is_some() {
                return Err(SwarmError::Config(format!("duplicate agent name '{}'", name)));
            }
            order.push(name);
        }

        for name in &order {
            let agent = &agents[name];
            for target in agent.handoffs() {
                if target != USER && !agents.contains_key(target) {
                    return Err(SwarmError::Config(format!(
                        "agent '{}' declares handoff to unknown agent '{}'",
                        name, target
                    )));
                }
            }
        }

        let entry = match self.entry {
            Some(entry) if agents.contains_key(&entry) => entry,
            Some(entry) => {
                return Err(SwarmError::Config(format!(
                    "entry agent '{}' is not in the roster",
                    entry
                )))
            }
            None => order[0].clone(),
        };

        Ok(Swarm {
            agents,
            order,
            entry,
            termination: self.termination,
            run: None,
        })
    }
}

impl Default for SwarmBuilder {
    fn default() -> Self {
        Self::new()
    }
}

enum TurnOutcome {
    Continue,
    Stopped(StopReason),
}

impl Swarm {
    pub fn builder() -> SwarmBuilder {
        SwarmBuilder::new()
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Agent names in roster order
    pub fn agent_names(&self) -> &[String] {
        &self.order
    }

    /// Cumulative history of the current run, empty when no run exists
    pub fn history(&self) -> &[Message] {
        self.run.as_ref().map(|r| r.history.as_slice()).unwrap_or(&[])
    }

    pub fn status(&self) -> Option<&RunStatus> {
        self.run.as_ref().map(|r| &r.status)
    }

    pub fn active_agent(&self) -> Option<&str> {
        self.run.as_ref().map(|r| r.active.as_str())
    }

    pub fn awaiting_user(&self) -> bool {
        matches!(self.status(), Some(RunStatus::AwaitingUser { .. }))
    }

    /// Drop the current run
    pub fn reset(&mut self) {
        self.run = None;
    }

    /// Start a new run with `task`, replacing any previous run
    pub async fn run(&mut self, task: impl Into<String>) -> SwarmResult<TaskResult> {
        self.run_with_cancel(task, &CancellationToken::new()).await
    }

    pub async fn run_with_cancel(
        &mut self,
        task: impl Into<String>,
        cancel: &CancellationToken,
    ) -> SwarmResult<TaskResult> {
        let task = task.into();
        tracing::info!("[Swarm] Starting run at '{}': {}", self.entry, task);

        self.run = Some(Run {
            history: Vec::new(),
            active: self.entry.clone(),
            status: RunStatus::Running,
        });

        self.drive(Message::text(USER, task), cancel).await
    }

    /// Continue a run paused on a handoff to the user
    pub async fn resume(&mut self, reply: impl Into<String>) -> SwarmResult<TaskResult> {
        self.resume_with_cancel(reply, &CancellationToken::new())
            .await
    }

    pub async fn resume_with_cancel(
        &mut self,
        reply: impl Into<String>,
        cancel: &CancellationToken,
    ) -> SwarmResult<TaskResult> {
        let run = self.run.as_mut().ok_or(SwarmError::NotAwaitingUser)?;
        let target = match &run.status {
            RunStatus::AwaitingUser { from } => from.clone(),
            _ => return Err(SwarmError::NotAwaitingUser),
        };

        tracing::info!("[Swarm] Resuming run, control returns to '{}'", target);
        run.active = target.clone();
        run.status = RunStatus::Running;

        self.drive(Message::handoff(USER, target, reply), cancel)
            .await
    }

    /// Append `opening`, then take turns until something stops the run
    async fn drive(
        &mut self,
        opening: Message,
        cancel: &CancellationToken,
    ) -> SwarmResult<TaskResult> {
        let start = self.history().len();

        let run = self
            .run
            .as_mut()
            .ok_or_else(|| SwarmError::Config("no run in progress".to_string()))?;

        // A cancelled token never lets the opening message into the history
        let mut outcome = if cancel.is_cancelled() {
            run.stop(StopReason::Cancelled)
        } else {
            run.record(opening, &self.termination)
        };

        let stop_reason = loop {
            if let TurnOutcome::Stopped(reason) = outcome {
                break reason;
            }

            outcome = match self.take_turn(cancel).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    if let Some(run) = self.run.as_mut() {
                        run.status = RunStatus::Failed(e.to_string());
                    }
                    tracing::error!("[Swarm] Run failed: {}", e);
                    return Err(e);
                }
            };
        };

        let history = self.history();
        Ok(TaskResult {
            messages: history[start..].to_vec(),
            history_len: history.len(),
            stop_reason,
        })
    }

    /// One agent turn: invoke, validate, append message by message
    async fn take_turn(&mut self, cancel: &CancellationToken) -> SwarmResult<TurnOutcome> {
        let run = self
            .run
            .as_mut()
            .ok_or_else(|| SwarmError::Config("no run in progress".to_string()))?;

        if cancel.is_cancelled() {
            return Ok(run.stop(StopReason::Cancelled));
        }

        let agent = self
            .agents
            .get(&run.active)
            .cloned()
            .ok_or_else(|| SwarmError::Config(format!("unknown active agent '{}'", run.active)))?;
        let name = agent.name().to_string();
        let history = run.history.clone();

        tracing::debug!("[Swarm] '{}' takes turn {}", name, history.len());

        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            output = agent.on_messages(&history, cancel) => Some(output),
        };

        let messages = match output {
            None => {
                tracing::info!("[Swarm] Turn of '{}' cancelled", name);
                return Ok(run.stop(StopReason::Cancelled));
            }
            Some(Err(_)) if cancel.is_cancelled() => return Ok(run.stop(StopReason::Cancelled)),
            Some(Err(e)) => {
                return Err(SwarmError::Agent {
                    agent: name,
                    message: format!("{:#}", e),
                })
            }
            Some(Ok(messages)) => messages,
        };

        if messages.is_empty() {
            return Err(SwarmError::EmptyTurn(name));
        }

        let count = messages.len();
        for (position, message) in messages.into_iter().enumerate() {
            if message.source() != name {
                return Err(SwarmError::SourceMismatch {
                    active: name,
                    emitted_by: message.source().to_string(),
                });
            }

            let handoff_target = message.handoff_target().map(str::to_string);
            if let Some(target) = &handoff_target {
                let known = target == USER || self.agents.contains_key(target);
                if !known || !agent.can_hand_off_to(target) {
                    return Err(SwarmError::InvalidHandoff {
                        from: name,
                        target: target.clone(),
                        allowed: agent.handoffs().to_vec(),
                    });
                }
            }

            if let TurnOutcome::Stopped(reason) = run.record(message, &self.termination) {
                return Ok(TurnOutcome::Stopped(reason));
            }

            if handoff_target.is_some() {
                if position + 1 < count {
                    tracing::warn!(
                        "[Swarm] Dropping {} message(s) '{}' emitted after its handoff",
                        count - position - 1,
                        name
                    );
                }
                break;
            }
        }

        Ok(TurnOutcome::Continue)
    }
}

impl Run {
    /// Push one message, then apply termination and handoff rules in that order
    fn record(&mut self, message: Message, termination: &Termination) -> TurnOutcome {
        tracing::debug!("[Swarm] {}", message);
        let handoff = match &message {
            Message::Handoff { source, target, .. } => Some((source.clone(), target.clone())),
            Message::Text { .. } => None,
        };
        self.history.push(message);

        if let Some(reason) = termination.check(&self.history) {
            return self.stop(reason);
        }

        match handoff {
            Some((from, target)) if target == USER => {
                self.stop(StopReason::Handoff { from, target })
            }
            Some((from, target)) => {
                if from != USER {
                    tracing::info!("[Swarm] Handoff '{}' -> '{}'", from, target);
                }
                self.active = target;
                TurnOutcome::Continue
            }
            None => TurnOutcome::Continue,
        }
    }

    fn stop(&mut self, reason: StopReason) -> TurnOutcome {
        self.status = match &reason {
            StopReason::Handoff { from, target } if target == USER => {
                tracing::info!("[Swarm] Waiting for user input requested by '{}'", from);
                RunStatus::AwaitingUser { from: from.clone() }
            }
            other => {
                tracing::info!(
                    "[Swarm] Run finished after {} messages: {}",
                    self.history.len(),
                    other
                );
                RunStatus::Finished(other.clone())
            }
        };
        TurnOutcome::Stopped(reason)
    }
}
