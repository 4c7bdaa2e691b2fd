//! Google Gemini 原生 REST 接口
//!
//! `POST {base}/models/{model}:generateContent`，密钥放在 `x-goog-api-key` 头中。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::backend::{looks_like_rate_limit, ProviderError, TextBackend};
use crate::models::GenerationRequest;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiBackend {
    http: reqwest::Client,
    api_base: String,
}

impl GeminiBackend {
    pub fn new(api_base: Option<&str>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("⚠️ HTTP 客户端创建失败，改用默认设置（不设超时）: {}", e);
                reqwest::Client::new()
            });
        Self {
            http,
            api_base: api_base
                .unwrap_or(GEMINI_API_BASE)
                .trim_end_matches('/')
                .to_string(),
        }
    }

    fn headers(credential: &str) -> Result<HeaderMap, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(credential)
            .map_err(|e| ProviderError::Failed(format!("密钥包含非法字符: {}", e)))?;
        headers.insert("x-goog-api-key", key);
        Ok(headers)
    }
}

#[async_trait]
impl TextBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(
        &self,
        model: &str,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<Option<String>, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.api_base, model);
        debug!(model, prompt_chars = request.prompt().chars().count(), "Gemini generateContent 请求");

        let response = self
            .http
            .post(&url)
            .headers(Self::headers(credential)?)
            .json(&GenerateContentRequest::from_request(request))
            .send()
            .await
            .map_err(|e| ProviderError::from_message(format!("请求发送失败: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_http_error(status, &body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Failed(format!("响应解析失败: {}", e)))?;

        Ok(parsed.first_text())
    }
}

/// 根据 HTTP 状态码和错误体区分限流与其他错误
pub fn classify_http_error(status: StatusCode, body: &str) -> ProviderError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error)
        .ok();
    let message = match &detail {
        Some(d) => format!("Gemini API 错误 ({}): {} {}", status, d.status, d.message),
        None => format!("Gemini API 错误 ({}): {}", status, body),
    };

    let exhausted = detail
        .as_ref()
        .is_some_and(|d| d.status == "RESOURCE_EXHAUSTED");
    if status == StatusCode::TOO_MANY_REQUESTS || exhausted || looks_like_rate_limit(&message) {
        ProviderError::RateLimited(message)
    } else {
        ProviderError::Failed(message)
    }
}

// ========== 请求 / 响应结构 ==========

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn from_request(request: &GenerationRequest) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(request.prompt().to_string()),
                }],
            }],
            system_instruction: request.system().map(|s| Content {
                role: None,
                parts: vec![Part {
                    text: Some(s.to_string()),
                }],
            }),
            generation_config: GenerationConfig {
                max_output_tokens: request.max_output_tokens(),
                temperature: request.sampling_temperature(),
                top_p: request.nucleus_top_p(),
                top_k: request.sampling_top_k(),
                candidate_count: 1,
                thinking_config: request.thinking().map(|budget| ThinkingConfig {
                    thinking_budget: budget,
                }),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    candidate_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// 第一个候选的全部文本；没有候选或候选没有文本（如被安全策略拦截）时返回 None
    fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}
