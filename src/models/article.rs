use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// 分类失败时使用的兜底分类
pub const FALLBACK_CATEGORY: &str = "other";

/// 文章记录
///
/// 由订阅源采集方创建，只在 AI 处理流程中被修改。
/// 采集方附带的其他字段（链接、发布时间等）保存在 `extra` 中原样透传。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarized: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classified: Option<bool>,
    /// 英文检索关键词，逗号分隔
    #[serde(default, alias = "keywords_en", skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default)]
    pub ai_processed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_error: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Article {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }
}

/// 订阅源信息（只读）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedInfo {
    /// 摘要风格：`normal` / `title` / `short` / `long` 或订阅源自定义
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_type: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl FeedInfo {
    pub fn with_summary_type(summary_type: impl Into<String>) -> Self {
        Self {
            summary_type: Some(summary_type.into()),
            ..Default::default()
        }
    }

    /// 实际使用的摘要风格，未设置时为 `normal`
    pub fn summary_style(&self) -> &str {
        self.summary_type
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("normal")
    }
}

/// 一次处理任务：文章 + 所属订阅源
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleJob {
    pub article: Article,
    #[serde(default)]
    pub feed: FeedInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_article_keeps_unknown_fields() {
        let raw = json!({
            "title": "Hello",
            "content": "World",
            "link": "https://example.com/a",
            "published": "2025-01-01"
        });
        let article: Article = serde_json::from_value(raw).unwrap();
        assert_eq!(article.title, "Hello");
        assert_eq!(article.extra.get("link"), Some(&json!("https://example.com/a")));
        assert!(!article.ai_processed);

        let back = serde_json::to_value(&article).unwrap();
        assert_eq!(back["link"], json!("https://example.com/a"));
        assert!(back.get("summary").is_none());
        assert_eq!(back["ai_processed"], json!(false));
    }

    #[test]
    fn test_article_accepts_legacy_keywords_field() {
        let article: Article =
            serde_json::from_value(json!({"title": "t", "keywords_en": "ai, chips"})).unwrap();
        assert_eq!(article.keywords.as_deref(), Some("ai, chips"));
    }

    #[test]
    fn test_feed_summary_style_defaults_to_normal() {
        assert_eq!(FeedInfo::default().summary_style(), "normal");
        assert_eq!(FeedInfo::with_summary_type("").summary_style(), "normal");
        assert_eq!(FeedInfo::with_summary_type("short").summary_style(), "short");
    }

    #[test]
    fn test_job_feed_is_optional() {
        let job: ArticleJob =
            serde_json::from_value(json!({"article": {"title": "x", "content": "y"}})).unwrap();
        assert_eq!(job.feed, FeedInfo::default());
    }
}
