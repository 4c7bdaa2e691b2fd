//! 分类服务 - 业务能力层
//!
//! 根据模板让模型从给定分类中选出一个，并把回答归一化为分类名。

use std::sync::Arc;

use regex::{Captures, Regex};
use tracing::debug;

use crate::clients::TextGenerator;
use crate::config::DEFAULT_CLASSIFIER_TEMPLATE;
use crate::error::{AppResult, Stage, StageError};
use crate::models::GenerationRequest;

/// 未配置分类时使用的内置分类
pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "technology",
    "business",
    "politics",
    "entertainment",
    "sports",
    "science",
    "health",
    "other",
];

const CONTENT_EXCERPT_CHARS: usize = 500;

pub struct Classifier {
    generator: Arc<dyn TextGenerator>,
    template: String,
}

impl Classifier {
    pub fn new(generator: Arc<dyn TextGenerator>, template: Option<&str>) -> Self {
        let template = template
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(DEFAULT_CLASSIFIER_TEMPLATE)
            .to_string();
        Self { generator, template }
    }

    /// 对文章分类
    ///
    /// 标题和正文都为空时返回 `StageError::EmptyInput`。
    /// 模型回答无法匹配任何分类时，原样返回归一化后的回答。
    pub async fn classify(
        &self,
        title: &str,
        content: &str,
        categories: &[String],
    ) -> AppResult<String> {
        if title.trim().is_empty() && content.trim().is_empty() {
            return Err(StageError::EmptyInput {
                stage: Stage::Classify,
            }
            .into());
        }

        let categories: Vec<String> = if categories.is_empty() {
            DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
        } else {
            categories.to_vec()
        };

        let prompt = self.render_prompt(title, content, &categories);
        let request = GenerationRequest::new(prompt).max_tokens(50).temperature(0.1);

        let answer = self.generator.generate_text(request).await?;
        let category = normalize_category(&answer, &categories);
        debug!("分类结果: {} (模型回答: {})", category, answer.trim());

        Ok(category)
    }

    fn render_prompt(&self, title: &str, content: &str, categories: &[String]) -> String {
        let excerpt: String = content.chars().take(CONTENT_EXCERPT_CHARS).collect();
        let article_text = format!("{}\n\n{}...", title, excerpt);

        let category_list = categories.join(", ");

        // 一次替换所有占位符，文章内容里出现的 `{title}` 等字样保持原样
        match Regex::new(r"\{(categories|content|title)\}") {
            Ok(placeholder) => placeholder
                .replace_all(&self.template, |caps: &Captures| match &caps[1] {
                    "categories" => category_list.clone(),
                    "content" => article_text.clone(),
                    _ => title.to_string(),
                })
                .into_owned(),
            Err(_) => self.template.clone(),
        }
    }
}

/// 把模型回答映射到分类名
///
/// 完全一致优先，其次是回答中包含的第一个分类名。
fn normalize_category(answer: &str, categories: &[String]) -> String {
    let normalized = answer
        .trim_matches(|c: char| {
            c.is_whitespace() || c.is_ascii_punctuation() || "。、．，「」".contains(c)
        })
        .to_lowercase();

    if let Some(exact) = categories.iter().find(|c| c.to_lowercase() == normalized) {
        return exact.clone();
    }
    if let Some(contained) = categories
        .iter()
        .find(|c| normalized.contains(&c.to_lowercase()))
    {
        return contained.clone();
    }
    normalized
}
