//! Termination conditions
//!
//! Each condition is a pure predicate over the full history. The router
//! evaluates the composite after every appended message; the first
//! condition that fires supplies the stop reason.
//!
//! ```ignore
//! let termination = TextMentionTermination::new("TERMINATE")
//!     | MaxMessageTermination::new(25)
//!     | HandoffTermination::new(USER);
//! ```

use super::messages::{Message, StopReason};
use std::ops::BitOr;
use std::sync::Arc;

pub trait TerminationCondition: Send + Sync {
    fn check(&self, history: &[Message]) -> Option<StopReason>;
}

/// Fires when the most recent message mentions `marker`
#[derive(Debug, Clone)]
pub struct TextMentionTermination {
    marker: String,
}

impl TextMentionTermination {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl TerminationCondition for TextMentionTermination {
    fn check(&self, history: &[Message]) -> Option<StopReason> {
        let last = history.last()?;
        if !self.marker.is_empty() && last.content().contains(&self.marker) {
            Some(StopReason::TextMention {
                marker: self.marker.clone(),
            })
        } else {
            None
        }
    }
}

/// Fires once the history holds `max_messages` entries
#[derive(Debug, Clone)]
pub struct MaxMessageTermination {
    max_messages: usize,
}

impl MaxMessageTermination {
    pub fn new(max_messages: usize) -> Self {
        Self { max_messages }
    }
}

impl TerminationCondition for MaxMessageTermination {
    fn check(&self, history: &[Message]) -> Option<StopReason> {
        (history.len() >= self.max_messages).then(|| StopReason::MaxMessages {
            limit: self.max_messages,
        })
    }
}

/// Fires when the most recent message hands off to `target`
#[derive(Debug, Clone)]
pub struct HandoffTermination {
    target: String,
}

impl HandoffTermination {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl TerminationCondition for HandoffTermination {
    fn check(&self, history: &[Message]) -> Option<StopReason> {
        match history.last()? {
            Message::Handoff { source, target, .. } if *target == self.target => {
                Some(StopReason::Handoff {
                    from: source.clone(),
                    target: target.clone(),
                })
            }
            _ => None,
        }
    }
}

/// Logical OR over conditions, checked in insertion order
#[derive(Clone, Default)]
pub struct Termination {
    conditions: Vec<Arc<dyn TerminationCondition>>,
}

impl Termination {
    /// A termination that never fires on its own
    pub fn never() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl TerminationCondition for Termination {
    fn check(&self, history: &[Message]) -> Option<StopReason> {
        self.conditions
            .iter()
            .find_map(|condition| condition.check(history))
    }
}

impl<R: Into<Termination>> BitOr<R> for Termination {
    type Output = Termination;

    fn bitor(mut self, rhs: R) -> Termination {
        self.conditions.extend(rhs.into().conditions);
        self
    }
}

macro_rules! composable_condition {
    ($($condition:ty),* $(,)?) => {
        $(
            impl From<$condition> for Termination {
                fn from(condition: $condition) -> Self {
                    Termination {
                        conditions: vec![Arc::new(condition)],
                    }
                }
            }

            impl<R: Into<Termination>> BitOr<R> for $condition {
                type Output = Termination;

                fn bitor(self, rhs: R) -> Termination {
                    Termination::from(self) | rhs
                }
            }
        )*
    };
}

composable_condition!(
    TextMentionTermination,
    MaxMessageTermination,
    HandoffTermination,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swarm::messages::USER;

    fn plain(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| Message::text("agent", format!("message {}", i)))
            .collect()
    }

    #[test]
    fn test_text_mention_checks_latest_message_only() {
        let condition = TextMentionTermination::new("TERMINATE");
        let mut history = vec![Message::text("agent", "done. TERMINATE")];
        assert_eq!(
            condition.check(&history),
            Some(StopReason::TextMention {
                marker: "TERMINATE".to_string()
            })
        );

        history.push(Message::text("agent", "carry on"));
        assert_eq!(condition.check(&history), None);
    }

    #[test]
    fn test_text_mention_sees_handoff_content() {
        let condition = TextMentionTermination::new("TERMINATE");
        let history = vec![Message::handoff("a", "b", "TERMINATE")];
        assert!(condition.check(&history).is_some());
    }

    #[test]
    fn test_max_messages_fires_at_ceiling() {
        let condition = MaxMessageTermination::new(3);
        assert_eq!(condition.check(&plain(2)), None);
        assert_eq!(
            condition.check(&plain(3)),
            Some(StopReason::MaxMessages { limit: 3 })
        );
    }

    #[test]
    fn test_handoff_termination_matches_target() {
        let condition = HandoffTermination::new(USER);
        let to_user = vec![Message::handoff("routing_agent", USER, "which cluster?")];
        let to_agent = vec![Message::handoff("routing_agent", "retrieval_agent", "")];

        assert_eq!(
            condition.check(&to_user),
            Some(StopReason::Handoff {
                from: "routing_agent".to_string(),
                target: USER.to_string()
            })
        );
        assert_eq!(condition.check(&to_agent), None);
        assert_eq!(condition.check(&[]), None);
    }

    #[test]
    fn test_or_composition_first_match_wins() {
        let termination = TextMentionTermination::new("TERMINATE")
            | MaxMessageTermination::new(25)
            | HandoffTermination::new(USER);
        assert_eq!(termination.len(), 3);

        let history = vec![Message::handoff("routing_agent", USER, "TERMINATE")];
        assert!(matches!(
            termination.check(&history),
            Some(StopReason::TextMention { .. })
        ));

        let history = vec![Message::handoff("routing_agent", USER, "need input")];
        assert!(matches!(
            termination.check(&history),
            Some(StopReason::Handoff { .. })
        ));
    }

    #[test]
    fn test_never_does_not_fire() {
        assert_eq!(Termination::never().check(&plain(1000)), None);
    }
}
