pub mod commands;

pub use commands::{parse_tool_args, Cli, Commands};
