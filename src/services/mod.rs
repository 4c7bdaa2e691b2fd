//! 业务能力层
//!
//! 每个阶段只持有一个 `TextGenerator`，负责拼提示词和解析回答，
//! 失败直接返回，由编排层决定兜底值。

pub mod classifier;
pub mod keyword_extractor;
pub mod question_answerer;
pub mod summarizer;

pub use classifier::{Classifier, DEFAULT_CATEGORIES};
pub use keyword_extractor::KeywordExtractor;
pub use question_answerer::{QuestionAnswerer, ANSWER_FALLBACK};
pub use summarizer::{SummaryStyle, Summarizer};
