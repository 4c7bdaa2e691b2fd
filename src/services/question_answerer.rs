//! 问答服务 - 业务能力层
//!
//! 参考原文章和相关文章回答用户问题，失败时返回固定文案，不向上抛错。

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{error, info};

use crate::clients::TextGenerator;
use crate::models::{Article, GenerationRequest};

/// 生成失败时返回给用户的文案
pub const ANSWER_FALLBACK: &str = "回答を生成できませんでした。";

const MAX_RELATED_ARTICLES: usize = 15;
const RELATED_EXCERPT_CHARS: usize = 600;

pub struct QuestionAnswerer {
    generator: Arc<dyn TextGenerator>,
    thinking_budget: Option<u32>,
}

impl QuestionAnswerer {
    pub fn new(generator: Arc<dyn TextGenerator>, thinking_budget: Option<u32>) -> Self {
        Self {
            generator,
            thinking_budget,
        }
    }

    pub async fn answer_question(
        &self,
        original: &Article,
        related: &[Article],
        question: &str,
    ) -> String {
        let prompt = build_prompt(original, related, question);
        let request = GenerationRequest::new(prompt)
            .max_tokens(1000)
            .temperature(0.3)
            .thinking_budget(self.thinking_budget);

        match self.generator.generate_text(request).await {
            Ok(answer) => {
                info!("问答完成: 参考相关文章 {} 篇", related.len().min(MAX_RELATED_ARTICLES));
                answer
            }
            Err(e) => {
                error!("回答生成失败: {}", e);
                ANSWER_FALLBACK.to_string()
            }
        }
    }
}

fn build_prompt(original: &Article, related: &[Article], question: &str) -> String {
    let mut prompt = format!(
        "You are an expert news commentator. Based on the following articles, please answer the user's question in Japanese.\n\n\
         **Main Article:**\nTitle: {}\nContent: {}\n\n**Related Articles:**\n",
        original.title, original.content
    );

    for (i, article) in related.iter().take(MAX_RELATED_ARTICLES).enumerate() {
        let excerpt: String = article.content.chars().take(RELATED_EXCERPT_CHARS).collect();
        let _ = writeln!(
            prompt,
            "{}. Title: {}\n   Content: {}...",
            i + 1,
            article.title,
            excerpt
        );
    }

    let _ = write!(prompt, "\n**User's Question:**\n{}\n\n**Answer (in Japanese):**", question);
    prompt
}
