use anyhow::Result;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub llm: LLMConfig,
    pub swarm: SwarmConfig,
    pub agent: AgentConfig,
    pub tools: ToolsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Azure OpenAI resource endpoint, e.g. `https://my-resource.openai.azure.com`
    pub endpoint: String,
    pub deployment: String,
    pub model: String,
    pub api_version: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwarmConfig {
    pub max_messages: usize,
    pub termination_marker: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub max_tool_iterations: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Directory holding the cluster binaries. Empty means resolve through `PATH`.
    pub binary_dir: String,
    pub oc_binary: String,
    pub kube_health_binary: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ToolsConfig {
    /// Resolve a binary name against `binary_dir`
    pub fn binary_path(&self, binary: &str) -> PathBuf {
        if self.binary_dir.is_empty() {
            PathBuf::from(binary)
        } else {
            PathBuf::from(&self.binary_dir).join(binary)
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm: LLMConfig {
                endpoint: String::new(),
                deployment: String::new(),
                model: "gpt-4o".to_string(),
                api_version: "2024-06-01".to_string(),
                max_tokens: 2048,
                temperature: 0.0,
            },
            swarm: SwarmConfig {
                max_messages: 25,
                termination_marker: "TERMINATE".to_string(),
            },
            agent: AgentConfig {
                max_tool_iterations: 5,
            },
            tools: ToolsConfig {
                binary_dir: String::new(),
                oc_binary: "oc".to_string(),
                kube_health_binary: "kube-health".to_string(),
                timeout_ms: 2000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Settings {
    /// Layered load: defaults, then `config/<CONFIG_ENV>`, then `APP__*` variables,
    /// then the `AZURE_*` variables for the completion endpoint.
    pub fn new() -> Result<Self, ConfigError> {
        let config_env = env::var("CONFIG_ENV").unwrap_or_else(|_| "default".to_string());

        let defaults = Config::try_from(&Settings::default())?;

        let config = Config::builder()
            .add_source(defaults)
            .add_source(File::with_name(&format!("config/{}", config_env)).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;
        settings.apply_azure_env();
        Ok(settings)
    }

    fn apply_azure_env(&mut self) {
        let overrides = [
            ("AZURE_ENDPOINT", &mut self.llm.endpoint),
            ("AZURE_DEPLOYMENT", &mut self.llm.deployment),
            ("AZURE_MODEL", &mut self.llm.model),
            ("AZURE_API_VERSION", &mut self.llm.api_version),
        ];

        for (var, field) in overrides {
            if let Ok(value) = env::var(var) {
                if !value.is_empty() {
                    *field = value;
                }
            }
        }
    }

    pub fn api_key() -> Result<String> {
        env::var("AZURE_API_KEY")
            .map_err(|_| anyhow::anyhow!("AZURE_API_KEY environment variable not set"))
    }
}
