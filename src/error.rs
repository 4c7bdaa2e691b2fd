use std::fmt;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 处理阶段错误
    #[error("阶段错误: {0}")]
    Stage(#[from] StageError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 没有可用的 API 密钥
    #[error("未配置 API 密钥 (模型: {model})")]
    NoCredential { model: String },
    /// 配置值非法
    #[error("配置项 {key} 非法: {message}")]
    InvalidValue { key: String, message: String },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 接口调用失败（非限流错误，不重试）
    #[error("LLM API调用失败 (模型: {model}): {message}")]
    Provider { model: String, message: String },
    /// 限流重试次数超过上限
    #[error("LLM API 持续限流，已重试 {attempts} 次 (模型: {model})")]
    RateLimitExhausted { model: String, attempts: u32 },
}

/// 处理阶段错误
#[derive(Debug, Error)]
pub enum StageError {
    /// 输入为空，无法处理
    #[error("{stage} 输入为空")]
    EmptyInput { stage: Stage },
}

/// 文章处理流程中的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Summarize,
    Classify,
    Keywords,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Summarize => "summarize",
            Stage::Classify => "classify",
            Stage::Keywords => "keywords",
        };
        f.write_str(name)
    }
}

/// 单个阶段的失败结果
///
/// 由编排层捕获，并按阶段写入对应的默认值，不会中断其他阶段。
#[derive(Debug, Error)]
#[error("阶段 {stage} 失败: {source}")]
pub struct StageFailure {
    pub stage: Stage,
    #[source]
    pub source: AppError,
}

impl StageFailure {
    pub fn new(stage: Stage, source: impl Into<AppError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

/// 阶段结果类型
pub type StageResult<T> = Result<T, StageFailure>;

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建没有密钥的配置错误
    pub fn no_credential(model: impl Into<String>) -> Self {
        AppError::Config(ConfigError::NoCredential {
            model: model.into(),
        })
    }

    /// 创建LLM API调用错误
    pub fn llm_provider_failed(model: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Llm(LlmError::Provider {
            model: model.into(),
            message: message.into(),
        })
    }

    /// 创建配置值非法错误
    pub fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Config(ConfigError::InvalidValue {
            key: key.into(),
            message: message.into(),
        })
    }

    /// 是否为缺少密钥的配置错误
    pub fn is_no_credential(&self) -> bool {
        matches!(self, AppError::Config(ConfigError::NoCredential { .. }))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
