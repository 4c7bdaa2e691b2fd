//! 单篇文章处理器 - 编排层
//!
//! ## 职责
//!
//! 按固定顺序执行 摘要 → 分类 → 关键词 三个阶段：
//!
//! - 每个阶段单独失败，失败时写入该阶段的兜底值，不影响其他阶段
//! - 最外层捕获 panic，把消息写入 `ai_error`，调用方总能拿到一篇完整的文章
//! - 客户端和各阶段组成一个只读快照，重新加载配置时整体替换
//!
//! ## 并发
//!
//! 快照放在 `RwLock<Arc<_>>` 中，处理文章时只克隆一次 `Arc`，
//! 正在处理的文章继续使用开始时的快照。

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::RwLock;
use tracing::{error, info, info_span, warn, Instrument, Span};

use crate::clients::{GenerativeTextClient, TextGenerator};
use crate::config::AiSettings;
use crate::error::{AppResult, Stage, StageFailure, StageResult};
use crate::models::{Article, FeedInfo, FALLBACK_CATEGORY};
use crate::services::{Classifier, KeywordExtractor, QuestionAnswerer, Summarizer};
use crate::utils::truncate_text;

/// 按设置和模型名创建生成客户端
pub type ClientFactory = Arc<dyn Fn(&AiSettings, &str) -> Arc<dyn TextGenerator> + Send + Sync>;

/// 某一版配置下的客户端和全部阶段
struct Pipeline {
    settings: AiSettings,
    client: Arc<dyn TextGenerator>,
    qa_client: Arc<dyn TextGenerator>,
    summarizer: Summarizer,
    classifier: Classifier,
    keyword_extractor: KeywordExtractor,
    answerer: QuestionAnswerer,
}

impl Pipeline {
    fn build(settings: AiSettings, factory: &ClientFactory) -> Self {
        let client = factory(&settings, &settings.ai_model);
        let qa_client = factory(&settings, settings.qa_model());

        let prompts = &settings.prompts;
        let summarizer = Summarizer::new(client.clone(), Some(prompts.summarizer_system.as_str()));
        let classifier =
            Classifier::new(client.clone(), Some(prompts.classifier_template.as_str()));
        let keyword_extractor = KeywordExtractor::new(client.clone());
        let answerer = QuestionAnswerer::new(qa_client.clone(), settings.thinking_budget);

        Self {
            settings,
            client,
            qa_client,
            summarizer,
            classifier,
            keyword_extractor,
            answerer,
        }
    }

    async fn close(&self) {
        self.client.close().await;
        self.qa_client.close().await;
    }

    /// 依次执行各阶段，阶段失败在这里消化
    async fn run_stages(&self, article: &mut Article, feed: &FeedInfo) {
        if self.settings.summarize {
            match self
                .summarize_stage(article, feed)
                .instrument(info_span!("summarize"))
                .await
            {
                Ok((summary, translated_title)) => {
                    article.summary = Some(summary);
                    if !translated_title.is_empty() {
                        article.title = translated_title;
                    }
                    article.summarized = Some(true);
                }
                Err(failure) => {
                    warn!("⚠️ {}", failure);
                    article.summarized = Some(false);
                }
            }
        }

        if self.settings.classify {
            match self
                .classify_stage(article)
                .instrument(info_span!("classify"))
                .await
            {
                Ok(category) => {
                    article.category = Some(category);
                    article.classified = Some(true);
                }
                Err(failure) => {
                    warn!("⚠️ {}，使用默认分类 {}", failure, FALLBACK_CATEGORY);
                    article.category = Some(FALLBACK_CATEGORY.to_string());
                    article.classified = Some(false);
                }
            }
        }

        match self
            .keyword_stage(article)
            .instrument(info_span!("keywords"))
            .await
        {
            Ok(keywords) if !keywords.is_empty() => article.keywords = Some(keywords),
            Ok(_) => {}
            Err(failure) => error!("❌ {}", failure),
        }
    }

    /// 摘要和标题翻译都成功后才一起返回
    async fn summarize_stage(
        &self,
        article: &Article,
        feed: &FeedInfo,
    ) -> StageResult<(String, String)> {
        let summary = self
            .summarizer
            .summarize(&article.content, self.settings.summary_length, feed.summary_style())
            .await
            .map_err(|e| StageFailure::new(Stage::Summarize, e))?;

        let translated_title = self
            .summarizer
            .summarize(&article.title, self.settings.summary_length, "title")
            .await
            .map_err(|e| StageFailure::new(Stage::Summarize, e))?;

        Ok((summary, translated_title))
    }

    async fn classify_stage(&self, article: &Article) -> StageResult<String> {
        self.classifier
            .classify(&article.title, &article.content, &self.settings.category_names())
            .await
            .map_err(|e| StageFailure::new(Stage::Classify, e))
    }

    async fn keyword_stage(&self, article: &Article) -> StageResult<String> {
        self.keyword_extractor
            .extract_keywords(article)
            .await
            .map_err(|e| StageFailure::new(Stage::Keywords, e))
    }
}

/// AI 处理器
pub struct AiProcessor {
    pipeline: RwLock<Arc<Pipeline>>,
    factory: ClientFactory,
    span: Span,
}

impl AiProcessor {
    /// 按设置创建处理器，客户端使用真实的生成接口
    pub fn new(settings: AiSettings) -> AppResult<Self> {
        let factory: ClientFactory = Arc::new(|settings: &AiSettings, model: &str| {
            let client = GenerativeTextClient::from_settings(settings, model)
                .with_span(info_span!("llm_client", model = %model));
            Arc::new(client) as Arc<dyn TextGenerator>
        });
        Self::with_client_factory(settings, factory)
    }

    /// 使用自定义的客户端工厂创建处理器
    pub fn with_client_factory(settings: AiSettings, factory: ClientFactory) -> AppResult<Self> {
        settings.validate()?;
        if settings.credentials().is_empty() {
            warn!("⚠️ 未配置 API 密钥，生成调用将会失败 (模型: {})", settings.ai_model);
        }

        let pipeline = Pipeline::build(settings, &factory);
        Ok(Self {
            pipeline: RwLock::new(Arc::new(pipeline)),
            factory,
            span: info_span!("ai_processor"),
        })
    }

    /// 指定日志上下文
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// 当前生效的设置
    pub async fn settings(&self) -> AiSettings {
        self.snapshot().await.settings.clone()
    }

    async fn snapshot(&self) -> Arc<Pipeline> {
        self.pipeline.read().await.clone()
    }

    /// 处理一篇文章
    ///
    /// 不修改传入的文章，总是返回一篇处理后的文章，不会返回错误。
    pub async fn process_article(&self, article: &Article, feed: &FeedInfo) -> Article {
        let pipeline = self.snapshot().await;
        let mut processed = article.clone();
        let span = info_span!(
            parent: &self.span,
            "process_article",
            title = %truncate_text(&article.title, 30)
        );

        let outcome = AssertUnwindSafe(pipeline.run_stages(&mut processed, feed))
            .catch_unwind()
            .instrument(span.clone())
            .await;

        match outcome {
            Ok(()) => {
                processed.ai_processed = true;
                processed.ai_error = None;
                info!(parent: &span, "✓ 文章处理完成");
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(parent: &span, "❌ 文章处理过程中发生意外错误: {}", message);
                processed.ai_processed = false;
                processed.ai_error = Some(message);
            }
        }

        processed
    }

    /// 重新加载设置
    ///
    /// 关闭旧客户端，按新设置创建客户端和各阶段，然后整体替换快照。
    pub async fn reload_from_config(&self, settings: AiSettings) -> AppResult<()> {
        settings.validate()?;

        let mut current = self.pipeline.write().await;
        current.close().await;

        let pipeline = Pipeline::build(settings, &self.factory);
        info!(
            parent: &self.span,
            "🔄 已重新加载 AI 设置: 模型 {}，问答模型 {}",
            pipeline.settings.ai_model,
            pipeline.settings.qa_model()
        );
        *current = Arc::new(pipeline);
        Ok(())
    }

    /// 参考原文章和相关文章回答问题，失败时返回固定文案
    pub async fn answer_question(
        &self,
        original: &Article,
        related: &[Article],
        question: &str,
    ) -> String {
        let pipeline = self.snapshot().await;
        pipeline
            .answerer
            .answer_question(original, related, question)
            .instrument(info_span!(parent: &self.span, "answer_question"))
            .await
    }

    /// 生成检索相关文章用的关键词，失败时返回空列表
    pub async fn generate_search_keywords(&self, article: &Article, question: &str) -> Vec<String> {
        let pipeline = self.snapshot().await;
        let span = info_span!(parent: &self.span, "search_keywords");
        match pipeline
            .keyword_extractor
            .generate_search_keywords(article, question)
            .instrument(span.clone())
            .await
        {
            Ok(keywords) => keywords,
            Err(e) => {
                error!(parent: &span, "❌ 检索关键词生成失败: {}", e);
                Vec::new()
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "未知错误".to_string()
    }
}
