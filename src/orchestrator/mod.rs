//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责流程调度和失败兜底，不拼提示词，也不直接调用生成接口。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量文章处理器
//! - 控制并发数量（Semaphore）
//! - 可选的单篇超时
//! - 输出全局统计信息
//!
//! ### `ai_processor` - 单篇文章处理器
//! - 摘要 → 分类 → 关键词 依次执行
//! - 每个阶段失败时写入兜底值
//! - 最外层捕获意外错误，写入 `ai_error`
//! - 重新加载配置时整体替换客户端和各阶段
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<ArticleJob>)
//!     ↓
//! ai_processor (处理单篇 Article)
//!     ↓
//! services (能力层：summarizer / classifier / keywords / qa)
//!     ↓
//! clients (密钥轮换、限流重试、生成接口)
//! ```

pub mod ai_processor;
pub mod batch_processor;

// 重新导出主要类型
pub use ai_processor::{AiProcessor, ClientFactory};
pub use batch_processor::{process_batch, BatchOptions, BatchReport};
