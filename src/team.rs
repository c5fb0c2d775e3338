//! Cluster team - the preconfigured routing / retrieval / knowledge roster
//!
//! Information Hiding:
//! - Agent prompts and handoff wiring hidden behind `cluster_swarm`
//! - Tool assignment to agents encapsulated here
//!
//! Implementation Note:
//! - Thin layer over AgentBuilder and SwarmBuilder

use crate::config::Settings;
use crate::core::CompletionClient;
use crate::swarm::{
    AgentBuilder, AssistantAgent, HandoffTermination, MaxMessageTermination, Swarm, SwarmResult,
    TextMentionTermination, USER,
};
use crate::tools::cluster::cluster_tools;
use std::sync::Arc;

pub const ROUTING_AGENT: &str = "routing_agent";
pub const RETRIEVAL_AGENT: &str = "retrieval_agent";
pub const KNOWLEDGE_AGENT: &str = "knowledge_agent";

const RETRIEVAL_DESCRIPTION: &str =
    "This agent is used for retrieving data from OpenShift and Kubernetes clusters.";

const KNOWLEDGE_DESCRIPTION: &str = "An agent used for answering general knowledge, how-to, \
     documentation, and other similar questions about OpenShift and Kubernetes";

/// Create the entry agent that only decides who handles a question
pub fn create_routing_agent(settings: &Settings, client: Arc<dyn CompletionClient>) -> AssistantAgent {
    AgentBuilder::new(ROUTING_AGENT)
        .description("Chooses which agent should handle each question and summarises the result.")
        .system_prompt(format!(
            "You are an agent-picking agent whose only job is to choose \
             which agent to pass questions to.\n\n\
             The {retrieval} is in charge of getting information from an openshift or \
             kubernetes cluster.\n\
             The {knowledge} is in charge of answering knowledge-based questions like \
             how-to, documentation, and related questions.\n\n\
             If the question is ambiguous, hand off to the {user} to ask for clarification.\n\n\
             After all tasks are complete, summarize the findings and end with \"{marker}\".",
            retrieval = RETRIEVAL_AGENT,
            knowledge = KNOWLEDGE_AGENT,
            user = USER,
            marker = settings.swarm.termination_marker,
        ))
        .handoff_with_description(RETRIEVAL_AGENT, RETRIEVAL_DESCRIPTION)
        .handoff_with_description(KNOWLEDGE_AGENT, KNOWLEDGE_DESCRIPTION)
        .handoff(USER)
        .max_tool_iterations(settings.agent.max_tool_iterations)
        .build(client)
}

/// Create the agent that reads live cluster state through `oc` and `kube-health`
pub fn create_retrieval_agent(
    settings: &Settings,
    client: Arc<dyn CompletionClient>,
) -> AssistantAgent {
    AgentBuilder::new(RETRIEVAL_AGENT)
        .description(RETRIEVAL_DESCRIPTION)
        .system_prompt(format!(
            "You are a Kubernetes and OpenShift assistant. You should only answer questions \
             related to OpenShift and Kubernetes. You can retrieve information from Kubernetes \
             and OpenShift environments using your tools.\n\n\
             When the transaction is complete, handoff to the {} to finalize.",
            ROUTING_AGENT
        ))
        .handoff(ROUTING_AGENT)
        .tools(cluster_tools(&settings.tools))
        .max_tool_iterations(settings.agent.max_tool_iterations)
        .build(client)
}

/// Create the agent for how-to and documentation questions
pub fn create_knowledge_agent(
    settings: &Settings,
    client: Arc<dyn CompletionClient>,
) -> AssistantAgent {
    AgentBuilder::new(KNOWLEDGE_AGENT)
        .description(KNOWLEDGE_DESCRIPTION)
        .system_prompt(format!(
            "You are a Kubernetes and OpenShift assistant. You should only answer questions \
             related to OpenShift and Kubernetes. You are supposed to answer general knowledge, \
             how-to, documentation, and other similar questions about OpenShift and Kubernetes.\n\n\
             When the transaction is complete, handoff to the {} to finalize.",
            ROUTING_AGENT
        ))
        .handoff(ROUTING_AGENT)
        .max_tool_iterations(settings.agent.max_tool_iterations)
        .build(client)
}

/// Assemble the three-agent swarm, entering at the routing agent
///
/// The run stops on the termination marker, at `swarm.max_messages`, or when
/// an agent hands off to the user.
pub fn cluster_swarm(settings: &Settings, client: Arc<dyn CompletionClient>) -> SwarmResult<Swarm> {
    let termination = TextMentionTermination::new(settings.swarm.termination_marker.clone())
        | MaxMessageTermination::new(settings.swarm.max_messages)
        | HandoffTermination::new(USER);

    Swarm::builder()
        .agent(create_routing_agent(settings, client.clone()))
        .agent(create_retrieval_agent(settings, client.clone()))
        .agent(create_knowledge_agent(settings, client))
        .entry(ROUTING_AGENT)
        .termination(termination)
        .build()
}
