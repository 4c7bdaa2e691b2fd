//! 摘要服务 - 业务能力层
//!
//! 只负责"摘要 / 标题翻译"能力，失败直接返回给调用方

use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use crate::clients::TextGenerator;
use crate::config::DEFAULT_SUMMARIZER_SYSTEM;
use crate::error::AppResult;
use crate::models::GenerationRequest;
use crate::utils::text::truncate_with_ellipsis;

/// 摘要风格
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStyle {
    /// 标题翻译
    Title,
    Short,
    Normal,
    Long,
}

impl SummaryStyle {
    /// 解析风格标签，未知标签（订阅源自定义）按 `Normal` 处理
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "title" => SummaryStyle::Title,
            "short" => SummaryStyle::Short,
            "long" => SummaryStyle::Long,
            _ => SummaryStyle::Normal,
        }
    }

    fn max_tokens(&self) -> u32 {
        match self {
            SummaryStyle::Title => 256,
            SummaryStyle::Short => 512,
            SummaryStyle::Normal => 1000,
            SummaryStyle::Long => 2000,
        }
    }

    fn prompt(&self, text: &str) -> String {
        match self {
            SummaryStyle::Title => format!("次のタイトルを日本語に翻訳してください。\n\n{}\n\n翻訳:", text),
            SummaryStyle::Short => format!(
                "次の文章を日本語で2〜3文、100文字以内で要約してください。\n\n{}\n\n要約:",
                text
            ),
            SummaryStyle::Long => format!(
                "次の文章を日本語で詳細に500文字以内で要約してください。読みやすいように適度に改行してください。\n\n{}\n\n要約:",
                text
            ),
            SummaryStyle::Normal => format!(
                "次の文章を日本語で200文字以内で要約してください。読みやすいように適度に改行してください。\n\n{}\n\n要約:",
                text
            ),
        }
    }
}

/// 摘要服务
pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
    system_instruction: String,
}

impl Summarizer {
    pub fn new(generator: Arc<dyn TextGenerator>, system_instruction: Option<&str>) -> Self {
        let system_instruction = system_instruction
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SUMMARIZER_SYSTEM)
            .to_string();
        Self {
            generator,
            system_instruction,
        }
    }

    /// 生成摘要（`style` 为 `title` 时翻译标题）
    ///
    /// # 参数
    /// - `text`: 原文
    /// - `max_length`: 结果的最大字符数，超出时截断并加 `...`
    /// - `style`: 风格标签
    pub async fn summarize(&self, text: &str, max_length: usize, style: &str) -> AppResult<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let style = SummaryStyle::parse(style);
        debug!("生成摘要: 风格 {:?}，原文 {} 字符", style, text.chars().count());

        let request = GenerationRequest::new(style.prompt(text))
            .max_tokens(style.max_tokens())
            .temperature(0.3)
            .system_instruction(self.system_instruction.as_str());

        let raw = self.generator.generate_text(request).await?;
        let cleaned = strip_answer_prefix(&raw);

        Ok(truncate_with_ellipsis(&cleaned, max_length))
    }
}

/// 去掉模型回显的 "要約:" / "翻訳:" 等前缀
fn strip_answer_prefix(text: &str) -> String {
    let trimmed = text.trim();
    if let Ok(re) = Regex::new(r"^(要約結果|要約|翻訳結果|翻訳)\s*[:：]\s*") {
        return re.replace(trimmed, "").trim().to_string();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::error::AppError;

    struct EchoGenerator {
        reply: String,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    impl EchoGenerator {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate_text(&self, request: GenerationRequest) -> AppResult<String> {
            self.seen.lock().unwrap().push(request);
            Ok(self.reply.clone())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate_text(&self, _request: GenerationRequest) -> AppResult<String> {
            Err(AppError::llm_provider_failed("m", "api error"))
        }
    }

    #[test]
    fn test_style_parse() {
        assert_eq!(SummaryStyle::parse("title"), SummaryStyle::Title);
        assert_eq!(SummaryStyle::parse("SHORT"), SummaryStyle::Short);
        assert_eq!(SummaryStyle::parse("long"), SummaryStyle::Long);
        assert_eq!(SummaryStyle::parse("normal"), SummaryStyle::Normal);
        assert_eq!(SummaryStyle::parse("podcast"), SummaryStyle::Normal);
    }

    #[test]
    fn test_strip_prefix() {
        assert_eq!(strip_answer_prefix("要約: 本文"), "本文");
        assert_eq!(strip_answer_prefix("翻訳結果：タイトル"), "タイトル");
        assert_eq!(strip_answer_prefix("そのまま"), "そのまま");
    }

    #[tokio::test]
    async fn test_summarize_success() {
        let generator = EchoGenerator::new("要約: これはテストの要約です");
        let summarizer = Summarizer::new(generator.clone(), None);

        let summary = summarizer.summarize("dummy text", 50, "normal").await.unwrap();
        assert_eq!(summary, "これはテストの要約です");

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].prompt().contains("200文字以内"));
        assert!(seen[0].prompt().contains("dummy text"));
        assert_eq!(seen[0].system(), Some(DEFAULT_SUMMARIZER_SYSTEM));
        assert_eq!(seen[0].max_output_tokens(), 1000);
    }

    #[tokio::test]
    async fn test_title_style_uses_translation_prompt() {
        let generator = EchoGenerator::new("翻訳: 新しいモデル");
        let summarizer = Summarizer::new(generator.clone(), Some("custom system"));

        let title = summarizer.summarize("New model", 4000, "title").await.unwrap();
        assert_eq!(title, "新しいモデル");

        let seen = generator.seen.lock().unwrap();
        assert!(seen[0].prompt().starts_with("次のタイトルを日本語に翻訳してください。"));
        assert_eq!(seen[0].system(), Some("custom system"));
        assert_eq!(seen[0].max_output_tokens(), 256);
    }

    #[tokio::test]
    async fn test_summary_truncated_to_max_length() {
        let generator = EchoGenerator::new("あいうえおかきくけこ");
        let summarizer = Summarizer::new(generator, None);
        let summary = summarizer.summarize("text", 8, "short").await.unwrap();
        assert_eq!(summary, "あいうえお...");
    }

    #[tokio::test]
    async fn test_empty_text_skips_model() {
        let generator = EchoGenerator::new("unused");
        let summarizer = Summarizer::new(generator.clone(), None);
        assert_eq!(summarizer.summarize("   ", 100, "normal").await.unwrap(), "");
        assert!(generator.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summarize_failure_propagates() {
        let summarizer = Summarizer::new(Arc::new(FailingGenerator), None);
        let result = summarizer.summarize("dummy text", 50, "normal").await;
        assert!(result.is_err());
    }
}
