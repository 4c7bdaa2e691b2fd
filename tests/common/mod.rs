#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rss_ai_pipeline::error::{AppError, AppResult};
use rss_ai_pipeline::orchestrator::ClientFactory;
use rss_ai_pipeline::{AiSettings, GenerationRequest, TextGenerator};

/// 根据提示词判断调用来自哪个阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Title,
    Summary,
    Classify,
    Keywords,
    SearchKeywords,
    Answer,
}

impl StageKind {
    pub fn of(prompt: &str) -> Self {
        if prompt.starts_with("次のタイトル") {
            StageKind::Title
        } else if prompt.starts_with("You are a data indexer.") {
            StageKind::Keywords
        } else if prompt.starts_with("You are a search query expert.") {
            StageKind::SearchKeywords
        } else if prompt.starts_with("You are an expert news commentator.") {
            StageKind::Answer
        } else if prompt.contains("要約") {
            StageKind::Summary
        } else {
            StageKind::Classify
        }
    }
}

#[derive(Debug, Clone)]
pub enum Behavior {
    Reply(String),
    Fail(String),
    /// 等待一段时间后回答
    Slow(Duration, String),
}

/// 按阶段返回预设结果的生成器
pub struct StubGenerator {
    behaviors: HashMap<StageKind, Behavior>,
    calls: Mutex<Vec<StageKind>>,
}

impl StubGenerator {
    /// 所有阶段都成功的默认回答
    pub fn happy() -> Self {
        let mut behaviors = HashMap::new();
        behaviors.insert(StageKind::Title, Behavior::Reply("翻訳: 翻訳済みタイトル".to_string()));
        behaviors.insert(StageKind::Summary, Behavior::Reply("要約済み".to_string()));
        behaviors.insert(StageKind::Classify, Behavior::Reply("Technology".to_string()));
        behaviors.insert(StageKind::Keywords, Behavior::Reply("rust, tokio, async".to_string()));
        behaviors.insert(StageKind::SearchKeywords, Behavior::Reply("mars, rover".to_string()));
        behaviors.insert(StageKind::Answer, Behavior::Reply("回答です。".to_string()));
        Self {
            behaviors,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, stage: StageKind, behavior: Behavior) -> Self {
        self.behaviors.insert(stage, behavior);
        self
    }

    pub fn failing(self, stage: StageKind) -> Self {
        self.with(stage, Behavior::Fail(format!("{:?} failed", stage)))
    }

    pub fn calls(&self) -> Vec<StageKind> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate_text(&self, request: GenerationRequest) -> AppResult<String> {
        let stage = StageKind::of(request.prompt());
        self.calls.lock().unwrap().push(stage);

        match self.behaviors.get(&stage) {
            Some(Behavior::Reply(text)) => Ok(text.clone()),
            Some(Behavior::Fail(message)) => {
                Err(AppError::llm_provider_failed("stub", message.as_str()))
            }
            Some(Behavior::Slow(delay, text)) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
            None => Err(AppError::Other(format!("no behavior for {:?}", stage))),
        }
    }
}

/// 始终返回同一个生成器的工厂
pub fn factory_for(generator: Arc<StubGenerator>) -> ClientFactory {
    Arc::new(move |_settings: &AiSettings, _model: &str| {
        generator.clone() as Arc<dyn TextGenerator>
    })
}

/// 开启摘要和分类的测试设置
pub fn test_settings() -> AiSettings {
    AiSettings {
        api_keys: vec!["key-1".to_string(), "key-2".to_string()],
        summarize: true,
        classify: true,
        ..Default::default()
    }
}
