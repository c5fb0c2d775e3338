use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kubeswarm")]
#[command(author, version, about = "Ask an agent team about your OpenShift/Kubernetes cluster", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask the agent team a question and follow the conversation
    Ask {
        question: String,

        /// Stop after this many messages (overrides swarm.max_messages)
        #[arg(short, long)]
        max_messages: Option<usize>,
    },

    /// List the cluster tools available to the retrieval agent
    Tools,

    /// Run one cluster tool directly
    Call {
        tool: String,

        /// Tool argument as key=value; repeatable
        #[arg(short, long = "arg", value_name = "KEY=VALUE")]
        args: Vec<String>,
    },
}

/// Turn `key=value` pairs into a JSON argument object
pub fn parse_tool_args(pairs: &[String]) -> anyhow::Result<serde_json::Value> {
    let mut args = serde_json::Map::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("argument '{}' is not in key=value form", pair))?;
        if key.is_empty() {
            anyhow::bail!("argument '{}' has an empty key", pair);
        }
        args.insert(key.to_string(), serde_json::Value::String(value.to_string()));
    }
    Ok(serde_json::Value::Object(args))
}
