use async_trait::async_trait;

use crate::models::GenerationRequest;

/// 生成服务返回的错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// 限流或配额耗尽，可以换密钥重试
    RateLimited(String),
    /// 其他错误，不重试
    Failed(String),
}

impl ProviderError {
    /// 根据错误文本判断是否为限流
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if looks_like_rate_limit(&message) {
            ProviderError::RateLimited(message)
        } else {
            ProviderError::Failed(message)
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ProviderError::RateLimited(m) | ProviderError::Failed(m) => m,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited(_))
    }
}

/// 错误文本中同时出现 "rate" 和 "limit"，或出现 "quota"
pub fn looks_like_rate_limit(message: &str) -> bool {
    let lower = message.to_lowercase();
    (lower.contains("rate") && lower.contains("limit")) || lower.contains("quota")
}

/// 具体的生成服务接口
///
/// 每次调用显式传入密钥，切换密钥不需要重建客户端。
/// 返回 `Ok(None)` 表示服务端没有给出任何候选结果。
#[async_trait]
pub trait TextBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(
        &self,
        model: &str,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<Option<String>, ProviderError>;
}
