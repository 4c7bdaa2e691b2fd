//! 客户端层
//!
//! 持有与外部生成服务的连接和密钥，只暴露"生成一段文本"的能力。

pub mod backend;
pub mod credential_pool;
pub mod gemini;
pub mod generative_client;
pub mod openai_compat;
pub mod rotation;

pub use backend::{looks_like_rate_limit, ProviderError, TextBackend};
pub use credential_pool::{CredentialPool, KeySelection, KeySlot};
pub use gemini::GeminiBackend;
pub use generative_client::{GenerativeTextClient, RetryPolicy, TextGenerator};
pub use openai_compat::OpenAiCompatibleBackend;
pub use rotation::{RateLimitStep, RateLimitTracker};
