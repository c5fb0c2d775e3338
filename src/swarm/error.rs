use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwarmError {
    #[error("invalid swarm configuration: {0}")]
    Config(String),

    #[error("agent '{from}' cannot hand off to '{target}' (allowed: {allowed:?})")]
    InvalidHandoff {
        from: String,
        target: String,
        allowed: Vec<String>,
    },

    #[error("active agent '{active}' emitted a message attributed to '{emitted_by}'")]
    SourceMismatch { active: String, emitted_by: String },

    #[error("agent '{0}' finished its turn without emitting a message")]
    EmptyTurn(String),

    #[error("agent '{agent}' failed: {message}")]
    Agent { agent: String, message: String },

    #[error("no run is waiting for user input")]
    NotAwaitingUser,
}

pub type SwarmResult<T> = Result<T, SwarmError>;
