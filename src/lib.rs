//! # RSS AI Pipeline
//!
//! 对订阅源文章进行摘要、标题翻译、分类和关键词提取的处理管线
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 持有密钥和外部连接，只暴露"生成一段文本"的能力
//! - `GenerativeTextClient` - 密钥轮换、限流冷却
//! - `GeminiBackend` / `OpenAiCompatibleBackend` - 具体的生成接口
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 每个阶段只处理一篇文章，失败直接返回
//! - `Summarizer` - 摘要和标题翻译
//! - `Classifier` - 分类
//! - `KeywordExtractor` - 存储用 / 检索用关键词
//! - `QuestionAnswerer` - 基于文章的问答
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/ai_processor` - 单篇文章处理器，负责阶段兜底和配置重载
//! - `orchestrator/batch_processor` - 批量处理器，负责并发和超时
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::{GenerativeTextClient, KeySelection, TextGenerator};
pub use config::{AiSettings, Config};
pub use error::{AppError, AppResult};
pub use models::{Article, ArticleJob, FeedInfo, GenerationRequest};
pub use orchestrator::{process_batch, AiProcessor, BatchOptions, BatchReport};
