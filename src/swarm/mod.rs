//! Swarm - agents passing control by handoff
//!
//! Information Hiding:
//! - Turn-taking and termination live in the router
//! - Agents see only the shared history and emit messages
//! - Tool use stays inside each agent's turn

pub mod agent;
pub mod agent_builder;
pub mod assistant_agent;
pub mod error;
pub mod messages;
pub mod router;
pub mod termination;

pub use agent::Agent;
pub use agent_builder::AgentBuilder;
pub use assistant_agent::{AssistantAgent, HandoffTarget};
pub use error::{SwarmError, SwarmResult};
pub use messages::{Message, RunStatus, StopReason, TaskResult, USER};
pub use router::{Swarm, SwarmBuilder};
pub use termination::{
    HandoffTermination, MaxMessageTermination, Termination, TerminationCondition,
    TextMentionTermination,
};
