use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved participant name for the human on the other side of the run
pub const USER: &str = "user";

/// One entry in a run's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    Text {
        source: String,
        content: String,
    },
    /// Transfers control from `source` to `target`
    Handoff {
        source: String,
        target: String,
        content: String,
    },
}

impl Message {
    pub fn text(source: impl Into<String>, content: impl Into<String>) -> Self {
        Message::Text {
            source: source.into(),
            content: content.into(),
        }
    }

    pub fn handoff(
        source: impl Into<String>,
        target: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Message::Handoff {
            source: source.into(),
            target: target.into(),
            content: content.into(),
        }
    }

    pub fn source(&self) -> &str {
        match self {
            Message::Text { source, .. } | Message::Handoff { source, .. } => source,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Message::Text { content, .. } | Message::Handoff { content, .. } => content,
        }
    }

    pub fn handoff_target(&self) -> Option<&str> {
        match self {
            Message::Handoff { target, .. } => Some(target),
            Message::Text { .. } => None,
        }
    }

    pub fn is_handoff_to(&self, name: &str) -> bool {
        self.handoff_target() == Some(name)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Text { source, content } => write!(f, "[{}] {}", source, content),
            Message::Handoff {
                source,
                target,
                content,
            } => write!(f, "[{} -> {}] {}", source, target, content),
        }
    }
}

/// Why a run stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    TextMention { marker: String },
    MaxMessages { limit: usize },
    /// Control passed to a non-agent target. Resumable when `target` is [`USER`].
    Handoff { from: String, target: String },
    Cancelled,
}

impl StopReason {
    pub fn awaits_user(&self) -> bool {
        matches!(self, StopReason::Handoff { target, .. } if target == USER)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::TextMention { marker } => write!(f, "text '{}' mentioned", marker),
            StopReason::MaxMessages { limit } => write!(f, "maximum of {} messages reached", limit),
            StopReason::Handoff { from, target } => {
                write!(f, "'{}' handed off to '{}'", from, target)
            }
            StopReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    /// Paused on a handoff to the user; `from` gets control back on resume
    AwaitingUser { from: String },
    Finished(StopReason),
    Failed(String),
}

/// Outcome of one `run` or `resume` call
#[derive(Debug, Clone)]
pub struct TaskResult {
    /// Messages appended during this call, in order
    pub messages: Vec<Message>,
    pub stop_reason: StopReason,
    /// Length of the cumulative history after this call
    pub history_len: usize,
}

impl TaskResult {
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn awaits_user(&self) -> bool {
        self.stop_reason.awaits_user()
    }
}
