//! 关键词服务 - 业务能力层
//!
//! - 存储用关键词：整篇文章 5-7 个英文关键词，逗号分隔的原始字符串
//! - 检索用关键词：结合用户问题生成最多 5 个英文关键词

use std::sync::Arc;

use tracing::debug;

use crate::clients::TextGenerator;
use crate::error::AppResult;
use crate::models::{Article, GenerationRequest};

const MAX_SEARCH_KEYWORDS: usize = 5;

pub struct KeywordExtractor {
    generator: Arc<dyn TextGenerator>,
}

impl KeywordExtractor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// 提取存储用关键词
    pub async fn extract_keywords(&self, article: &Article) -> AppResult<String> {
        let prompt = format!(
            "You are a data indexer. Analyze the following article and extract the 5-7 most important and representative keywords in English. \
             The keywords should be suitable for later searching. Output them as a single, comma-separated string.\n\n\
             Title: {}\n\nContent:\n{}\n\nKeywords:",
            article.title, article.content
        );
        let request = GenerationRequest::new(prompt).max_tokens(50).temperature(0.3);

        let keywords = self.generator.generate_text(request).await?;
        Ok(keywords.trim().to_string())
    }

    /// 生成检索相关文章用的关键词
    pub async fn generate_search_keywords(
        &self,
        article: &Article,
        question: &str,
    ) -> AppResult<Vec<String>> {
        let prompt = format!(
            "You are a search query expert. Extract up to 5 important English keywords from the user's question and the original article to find related information.\n\n\
             Title: {}\n\nContent:\n{}\n\nQuestion: {}\n\nKeywords:",
            article.title, article.content, question
        );
        let request = GenerationRequest::new(prompt).max_tokens(30).temperature(0.3);

        let text = self.generator.generate_text(request).await?;
        let keywords = split_keywords(&text);
        debug!("检索关键词: {:?}", keywords);
        Ok(keywords)
    }
}

fn split_keywords(text: &str) -> Vec<String> {
    text.split([',', '，', '、'])
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .take(MAX_SEARCH_KEYWORDS)
        .map(str::to_string)
        .collect()
}
