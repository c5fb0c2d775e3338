use crate::swarm::{Message, StopReason, USER};
use crate::tools::ToolMetadata;
use colored::*;
use std::io::Write;

pub fn print_header(text: &str) {
    println!("\n{}", text.bright_cyan().bold());
    println!("{}", "=".repeat(text.len()).bright_cyan());
}

pub fn print_success(text: &str) {
    println!("{}", text.green());
}

pub fn print_error(text: &str) {
    eprintln!("{}", text.red().bold());
}

pub fn print_info(text: &str) {
    println!("{}", text.blue());
}

pub fn print_prompt(text: &str) {
    print!("{}", text.yellow().bold());
    let _ = std::io::stdout().flush();
}

/// One line header per message, content below it
pub fn print_message(message: &Message) {
    let header = match message {
        Message::Text { source, .. } => format!("---------- {} ----------", source),
        Message::Handoff { source, target, .. } => {
            format!("---------- {} -> {} ----------", source, target)
        }
    };

    if message.source() == USER {
        println!("{}", header.yellow().bold());
    } else if message.handoff_target().is_some() {
        println!("{}", header.magenta().bold());
    } else {
        println!("{}", header.bright_cyan().bold());
    }

    if !message.content().is_empty() {
        println!("{}", message.content());
    }
}

pub fn print_stop(reason: &StopReason, history_len: usize) {
    let line = format!("[{} messages] {}", history_len, reason);
    match reason {
        StopReason::TextMention { .. } => print_success(&line),
        StopReason::Cancelled | StopReason::MaxMessages { .. } => println!("{}", line.yellow()),
        StopReason::Handoff { .. } => print_info(&line),
    }
}

pub fn print_tool(metadata: &ToolMetadata) {
    println!("{}", metadata.name.green().bold());
    println!("  {}", metadata.description);
    for param in &metadata.parameters {
        let required = if param.required { "required" } else { "optional" };
        println!(
            "  - {} ({}, {}): {}",
            param.name.bold(),
            param.param_type,
            required,
            param.description
        );
    }
}
