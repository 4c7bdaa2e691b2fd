//! 兼容 OpenAI 的生成接口
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 适用于 LM Studio 等本地服务或自建网关
//! - 不支持 top_k 和思考预算，这两个参数会被忽略

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use super::backend::{ProviderError, TextBackend};
use crate::models::GenerationRequest;

pub const LMSTUDIO_API_BASE: &str = "http://localhost:1234/v1";

pub struct OpenAiCompatibleBackend {
    api_base: String,
}

impl OpenAiCompatibleBackend {
    pub fn new(api_base: Option<&str>) -> Self {
        Self {
            api_base: api_base.unwrap_or(LMSTUDIO_API_BASE).to_string(),
        }
    }

    /// 按密钥创建客户端
    fn client_for(&self, credential: &str) -> Client<OpenAIConfig> {
        let openai_config = OpenAIConfig::new()
            .with_api_key(credential)
            .with_api_base(&self.api_base);
        Client::with_config(openai_config)
    }

    fn build_messages(
        request: &GenerationRequest,
    ) -> Result<Vec<ChatCompletionRequestMessage>, ProviderError> {
        let mut messages = Vec::new();

        // 添加系统消息（如果提供）
        if let Some(sys_msg) = request.system() {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| ProviderError::Failed(format!("系统消息构建失败: {}", e)))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt())
            .build()
            .map_err(|e| ProviderError::Failed(format!("用户消息构建失败: {}", e)))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        Ok(messages)
    }
}

#[async_trait]
impl TextBackend for OpenAiCompatibleBackend {
    fn name(&self) -> &str {
        "openai_compatible"
    }

    async fn generate(
        &self,
        model: &str,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<Option<String>, ProviderError> {
        debug!("调用兼容 OpenAI 的接口，模型: {}", model);

        let messages = Self::build_messages(request)?;

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .temperature(request.sampling_temperature())
            .top_p(request.nucleus_top_p())
            .max_tokens(request.max_output_tokens())
            .build()
            .map_err(|e| ProviderError::Failed(format!("请求构建失败: {}", e)))?;

        let response = self
            .client_for(credential)
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| {
                warn!("LLM API 调用失败: {}", e);
                ProviderError::from_message(e.to_string())
            })?;

        debug!("LLM API 调用成功");

        Ok(response
            .choices
            .first()
            .map(|choice| choice.message.content.clone().unwrap_or_default()))
    }
}
