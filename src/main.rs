use anyhow::{Context, Result};
use clap::Parser;
use kubeswarm::cli::{parse_tool_args, Cli, Commands};
use kubeswarm::core::llm::ResponseFormat;
use kubeswarm::tools::cluster::cluster_tools;
use kubeswarm::tools::executor::ToolOutcome;
use kubeswarm::tools::registry::ToolRegistry;
use kubeswarm::{utils, CancellationToken, LLMClient, Settings, StopReason, TaskResult};
use std::sync::Arc;
use std::io::BufRead;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::new().context("failed to load settings")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ask {
            question,
            max_messages,
        } => handle_ask(settings, question, max_messages).await,
        Commands::Tools => handle_tools(&settings),
        Commands::Call { tool, args } => handle_call(&settings, tool, args).await,
    }
}

async fn handle_ask(
    mut settings: Settings,
    question: String,
    max_messages: Option<usize>,
) -> Result<()> {
    if let Some(max) = max_messages {
        settings.swarm.max_messages = max;
    }

    let api_key = Settings::api_key()?;
    let client = LLMClient::new(api_key, settings.clone())
        .with_response_format(ResponseFormat::JsonObject);
    let mut swarm = kubeswarm::cluster_swarm(&settings, Arc::new(client))?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling run");
            on_interrupt.cancel();
        }
    });

    utils::print_header("----START----");
    let mut result = swarm.run_with_cancel(question, &cancel).await?;
    print_result(&result);

    let mut replies = spawn_line_reader();

    while result.awaits_user() {
        utils::print_prompt("User: ");
        let reply = tokio::select! {
            _ = cancel.cancelled() => {
                println!();
                utils::print_stop(&StopReason::Cancelled, result.history_len);
                break;
            }
            reply = replies.recv() => reply,
        };

        let Some(reply) = reply else {
            utils::print_info("Input closed, leaving the run paused");
            break;
        };

        result = swarm.resume_with_cancel(reply.trim(), &cancel).await?;
        print_result(&result);
    }

    Ok(())
}

/// Stdin lines from a dedicated thread, so a pending read never holds up
/// cancellation or runtime shutdown
fn spawn_line_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn print_result(result: &TaskResult) {
    for message in &result.messages {
        utils::print_message(message);
    }
    utils::print_stop(&result.stop_reason, result.history_len);
}

fn cluster_registry(settings: &Settings) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for tool in cluster_tools(&settings.tools) {
        registry.register(tool);
    }
    registry
}

fn handle_tools(settings: &Settings) -> Result<()> {
    utils::print_header("Cluster tools");
    for metadata in cluster_registry(settings).list_tools() {
        println!();
        utils::print_tool(&metadata);
    }
    Ok(())
}

async fn handle_call(settings: &Settings, tool: String, args: Vec<String>) -> Result<()> {
    let args = parse_tool_args(&args)?;

    match cluster_registry(settings)
        .dispatch(&tool, args, &CancellationToken::new())
        .await?
    {
        ToolOutcome::Completed { result, metadata } => {
            tracing::debug!(
                "{} finished in {}ms ({} bytes)",
                metadata.tool_name,
                metadata.duration_ms,
                metadata.output_size
            );
            if result.success {
                println!("{}", result.observation());
            } else {
                if !result.output.is_empty() {
                    println!("{}", result.output);
                }
                utils::print_error(result.error.as_deref().unwrap_or("tool failed"));
            }
        }
        ToolOutcome::Cancelled => utils::print_error("tool call cancelled"),
    }

    Ok(())
}
