pub mod cancel;
pub mod llm;

pub use cancel::CancellationToken;
pub use llm::{ChatMessage, CompletionClient, LLMClient};
