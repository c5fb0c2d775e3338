//! Kubeswarm - a handoff-driven agent team for OpenShift/Kubernetes questions
//!
//! Agents take turns over a shared history. Control passes only through
//! explicit handoffs, and the run stops on a termination marker, a message
//! ceiling, or a handoff to the user (which pauses until the user replies).
//! Cluster access goes through `oc` and `kube-health` wrapped as tools.

pub mod cli;
pub mod config;
pub mod core;
pub mod swarm;
pub mod team;
pub mod tools;
pub mod utils;

pub use config::Settings;
pub use crate::core::{CancellationToken, ChatMessage, CompletionClient, LLMClient};
pub use swarm::{
    Agent, AgentBuilder, AssistantAgent, Message, RunStatus, StopReason, Swarm, SwarmBuilder,
    SwarmError, SwarmResult, TaskResult, USER,
};
pub use team::cluster_swarm;
