//! 文本生成客户端
//!
//! 封装一个模型的生成接口，负责密钥轮换和限流重试：
//! - 遇到限流（HTTP 429 / 配额耗尽）时切换到下一个密钥并重试同一请求
//! - 所有密钥都连续被限流后等待冷却时间，再继续轮换
//! - 其他错误不重试，直接返回给调用方

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{error, info, info_span, warn, Instrument, Span};

use super::backend::{ProviderError, TextBackend};
use super::credential_pool::{CredentialPool, KeySelection};
use super::gemini::GeminiBackend;
use super::openai_compat::OpenAiCompatibleBackend;
use super::rotation::{RateLimitStep, RateLimitTracker};
use crate::config::{AiSettings, ProviderKind};
use crate::error::{AppError, AppResult, LlmError};
use crate::models::GenerationRequest;

/// 文本生成能力
///
/// 各处理阶段只依赖这个接口，测试时可以替换成桩实现。
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 执行一次文本生成，返回去掉首尾空白的文本
    async fn generate_text(&self, request: GenerationRequest) -> AppResult<String>;

    /// 释放资源
    async fn close(&self) {}
}

/// 限流重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 所有密钥都被限流后的等待时间
    pub cooldown: Duration,
    /// 单次调用允许的最大限流次数，None 表示无限重试
    pub max_rate_limit_retries: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(30),
            max_rate_limit_retries: None,
        }
    }
}

/// 文本生成客户端
pub struct GenerativeTextClient {
    model: String,
    backend: Arc<dyn TextBackend>,
    pool: Mutex<CredentialPool>,
    retry: RetryPolicy,
    span: Span,
}

impl GenerativeTextClient {
    /// 创建客户端
    ///
    /// 密钥为空时仍可创建，但每次调用都会返回 `ConfigError::NoCredential`。
    pub fn new<I, S>(
        model: impl Into<String>,
        backend: Arc<dyn TextBackend>,
        credentials: I,
        selection: KeySelection,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let model = model.into();
        let pool = CredentialPool::new(credentials, selection);
        if pool.is_empty() {
            warn!("⚠️ 未配置 API 密钥 (模型: {})", model);
        }
        let span = info_span!("generative_client", model = %model, backend = backend.name());
        info!(
            "已初始化文本生成客户端: {} ({}，{} 个密钥)",
            model,
            backend.name(),
            pool.len()
        );
        Self {
            model,
            backend,
            pool: Mutex::new(pool),
            retry: RetryPolicy::default(),
            span,
        }
    }

    /// 按设置创建客户端
    pub fn from_settings(settings: &AiSettings, model: &str) -> Self {
        let backend: Arc<dyn TextBackend> = match settings.provider {
            ProviderKind::Gemini => Arc::new(GeminiBackend::new(
                settings.api_base.as_deref(),
                settings.request_timeout(),
            )),
            ProviderKind::OpenaiCompatible => {
                Arc::new(OpenAiCompatibleBackend::new(settings.api_base.as_deref()))
            }
        };
        Self::new(model, backend, settings.credentials(), settings.key_selection).with_retry_policy(
            RetryPolicy {
                cooldown: settings.cooldown(),
                max_rate_limit_retries: settings.retry.max_rate_limit_retries,
            },
        )
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// 指定日志上下文
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// 当前使用的密钥位置
    pub async fn current_key_index(&self) -> Option<usize> {
        self.pool.lock().await.current().map(|(slot, _)| slot.index)
    }

    pub async fn credential_count(&self) -> usize {
        self.pool.lock().await.len()
    }

    /// 整体替换密钥池，并重新选择初始位置
    pub async fn replace_credentials<I, S>(&self, credentials: I, selection: KeySelection)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut pool = self.pool.lock().await;
        pool.replace(credentials, selection);
        info!(parent: &self.span, "已替换密钥池: {} 个密钥", pool.len());
    }

    async fn generate_with_rotation(&self, request: GenerationRequest) -> AppResult<String> {
        let mut tracker = RateLimitTracker::default();

        loop {
            let (slot, credential, pool_size) = {
                let pool = self.pool.lock().await;
                let (slot, key) = pool
                    .current()
                    .ok_or_else(|| AppError::no_credential(&self.model))?;
                (slot, key.to_string(), pool.len())
            };

            match self.backend.generate(&self.model, &credential, &request).await {
                Ok(Some(text)) => return Ok(text.trim().to_string()),
                Ok(None) => {
                    warn!("⚠️ API 响应中没有有效结果 (模型: {})", self.model);
                    return Ok(String::new());
                }
                Err(ProviderError::RateLimited(message)) => {
                    let (next, replaced) = {
                        let mut pool = self.pool.lock().await;
                        (pool.advance_from(slot), pool.epoch() != slot.epoch)
                    };
                    if replaced {
                        // 限流发生在旧密钥池上，直接用新池的当前密钥重试
                        info!("密钥池已被替换，使用新密钥重试: {}", message);
                        continue;
                    }

                    let step = tracker.record(pool_size);
                    warn!(
                        key_index = slot.index,
                        next_key_index = next,
                        "达到速率限制，切换 API 密钥后重试: {}",
                        message
                    );

                    if tracker.exceeded(self.retry.max_rate_limit_retries) {
                        error!("❌ 限流重试次数超过上限: {}", tracker.total());
                        return Err(LlmError::RateLimitExhausted {
                            model: self.model.clone(),
                            attempts: tracker.total(),
                        }
                        .into());
                    }

                    if step == RateLimitStep::Cooldown {
                        warn!(
                            "所有 API 密钥都达到速率限制，等待 {} 秒",
                            self.retry.cooldown.as_secs()
                        );
                        tokio::time::sleep(self.retry.cooldown).await;
                    }
                }
                Err(ProviderError::Failed(message)) => {
                    error!("❌ 文本生成失败: {}", message);
                    return Err(AppError::llm_provider_failed(&self.model, message));
                }
            }
        }
    }
}

#[async_trait]
impl TextGenerator for GenerativeTextClient {
    async fn generate_text(&self, request: GenerationRequest) -> AppResult<String> {
        self.generate_with_rotation(request)
            .instrument(self.span.clone())
            .await
    }

    async fn close(&self) {
        info!(parent: &self.span, "{} 无需特殊的关闭处理", self.backend.name());
    }
}
