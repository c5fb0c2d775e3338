mod settings;

pub use settings::{
    AgentConfig, LLMConfig, LoggingConfig, Settings, SwarmConfig, ToolsConfig,
};
