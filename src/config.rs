use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clients::KeySelection;
use crate::error::{AppError, AppResult, ConfigError};

/// 程序运行配置（来自环境变量）
#[derive(Clone, Debug)]
pub struct Config {
    /// AI 设置文件路径（TOML）
    pub settings_path: String,
    /// 待处理文章的 JSON 文件
    pub input_path: String,
    /// 处理结果输出文件
    pub output_path: String,
    /// 同时处理的文章数量
    pub max_concurrent_articles: usize,
    /// 单篇文章的处理超时（秒），0 表示不限制
    pub article_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings_path: "config.toml".to_string(),
            input_path: "articles.json".to_string(),
            output_path: "processed_articles.json".to_string(),
            max_concurrent_articles: 4,
            article_timeout_secs: 0,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            settings_path: std::env::var("AI_SETTINGS_PATH").unwrap_or(default.settings_path),
            input_path: std::env::var("ARTICLES_INPUT").unwrap_or(default.input_path),
            output_path: std::env::var("ARTICLES_OUTPUT").unwrap_or(default.output_path),
            max_concurrent_articles: std::env::var("MAX_CONCURRENT_ARTICLES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_concurrent_articles),
            article_timeout_secs: std::env::var("ARTICLE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.article_timeout_secs),
        }
    }

    /// 单篇文章超时，未配置时返回 None
    pub fn article_timeout(&self) -> Option<Duration> {
        (self.article_timeout_secs > 0).then(|| Duration::from_secs(self.article_timeout_secs))
    }
}

/// 生成服务提供方
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Google Gemini（原生 REST 接口）
    #[default]
    Gemini,
    /// 兼容 OpenAI 的接口（LM Studio 等本地服务）
    OpenaiCompatible,
}

/// 文章分类
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    #[serde(default, alias = "jp_name")]
    pub display_name: String,
    #[serde(default, alias = "emoji")]
    pub icon: String,
}

impl CategoryConfig {
    fn new(name: &str, display_name: &str, icon: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            icon: icon.to_string(),
        }
    }
}

/// 提示词模板
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    /// 摘要阶段的系统指令
    pub summarizer_system: String,
    /// 分类模板，支持 `{categories}` / `{content}` / `{title}` 占位符
    pub classifier_template: String,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            summarizer_system: DEFAULT_SUMMARIZER_SYSTEM.to_string(),
            classifier_template: DEFAULT_CLASSIFIER_TEMPLATE.to_string(),
        }
    }
}

pub const DEFAULT_SUMMARIZER_SYSTEM: &str = "あなたは日本語編集者です。要点を抽出し、日本語のみで短くまとめます。長文は読みやすいように適度に改行してください。";

pub const DEFAULT_CLASSIFIER_TEMPLATE: &str = "次の記事のジャンルを以下のカテゴリから最も適切なもの一つだけ選んでください:{categories}\n\n記事:\n{content}\n\n出力は選んだカテゴリ名のみを英語で一語だけ返してください。余計な説明や句読点、改行は不要です。";

/// 限流重试策略
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// 所有密钥都被限流后的等待时间（秒）
    pub cooldown_secs: u64,
    /// 单次调用允许的最大限流重试次数，不设置则无限重试
    pub max_rate_limit_retries: Option<u32>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            cooldown_secs: 30,
            max_rate_limit_retries: None,
        }
    }
}

/// AI 处理设置
///
/// 对应外部配置存储中与 AI 处理相关的部分，可整体替换后调用
/// `AiProcessor::reload_from_config` 生效。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub provider: ProviderKind,
    /// 接口地址，不设置时使用提供方默认地址
    pub api_base: Option<String>,
    /// 单个密钥（旧格式），会排在密钥列表最前面
    #[serde(alias = "gemini_api_key")]
    pub api_key: String,
    #[serde(alias = "gemini_api_keys")]
    pub api_keys: Vec<String>,
    pub key_selection: KeySelection,
    pub ai_model: String,
    /// 问答使用的模型，不设置时与 `ai_model` 相同
    pub qa_model: Option<String>,
    pub thinking_budget: Option<u32>,
    pub summarize: bool,
    pub classify: bool,
    pub summary_length: usize,
    pub categories: Vec<CategoryConfig>,
    pub prompts: PromptSettings,
    pub retry: RetrySettings,
    pub request_timeout_secs: u64,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            api_base: None,
            api_key: String::new(),
            api_keys: Vec::new(),
            key_selection: KeySelection::DayParity,
            ai_model: "gemini-2.0-flash".to_string(),
            qa_model: None,
            thinking_budget: None,
            summarize: true,
            classify: false,
            summary_length: 4000,
            categories: default_categories(),
            prompts: PromptSettings::default(),
            retry: RetrySettings::default(),
            request_timeout_secs: 120,
        }
    }
}

impl AiSettings {
    /// 从 TOML 文本解析
    pub fn from_toml_str(text: &str, origin: &str) -> AppResult<Self> {
        let settings: AiSettings = toml::from_str(text).map_err(|source| ConfigError::ParseFailed {
            path: origin.to_string(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// 从 TOML 文件加载
    pub async fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::ReadFailed {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.ai_model.trim().is_empty() {
            return Err(AppError::invalid_config("ai_model", "模型名称不能为空"));
        }
        if self.summary_length < 4 {
            return Err(AppError::invalid_config(
                "summary_length",
                format!("至少为 4，当前为 {}", self.summary_length),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::invalid_config("request_timeout_secs", "必须大于 0"));
        }
        Ok(())
    }

    /// 问答模型
    pub fn qa_model(&self) -> &str {
        self.qa_model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.ai_model)
    }

    /// 全部密钥，旧格式的单个密钥在前（去重由密钥池负责）
    pub fn credentials(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.api_keys.len() + 1);
        if !self.api_key.is_empty() {
            keys.push(self.api_key.clone());
        }
        keys.extend(self.api_keys.iter().cloned());
        keys
    }

    /// 合并额外的密钥（例如来自环境变量）
    pub fn merge_credentials(&mut self, extra: impl IntoIterator<Item = String>) {
        for key in extra {
            if !key.is_empty() && key != self.api_key && !self.api_keys.contains(&key) {
                self.api_keys.push(key);
            }
        }
    }

    pub fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.retry.cooldown_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 从环境变量读取 Gemini 密钥
///
/// 优先 `GEMINI_API_1` / `GEMINI_API_2`，其次逗号分隔的 `GEMINI_API_KEYS`，
/// 最后是单个 `GEMINI_API_KEY`。
pub fn credentials_from_env() -> Vec<String> {
    let numbered: Vec<String> = ["GEMINI_API_1", "GEMINI_API_2"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .filter(|v| !v.is_empty())
        .collect();
    if !numbered.is_empty() {
        return numbered;
    }
    if let Ok(list) = std::env::var("GEMINI_API_KEYS") {
        return list
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
    }
    std::env::var("GEMINI_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
        .into_iter()
        .collect()
}

fn default_categories() -> Vec<CategoryConfig> {
    vec![
        CategoryConfig::new("technology", "テクノロジー", "🖥️"),
        CategoryConfig::new("business", "ビジネス", "💼"),
        CategoryConfig::new("science", "科学", "🔬"),
        CategoryConfig::new("health", "健康", "🏥"),
        CategoryConfig::new("entertainment", "エンタメ", "🎬"),
        CategoryConfig::new("sports", "スポーツ", "⚽"),
        CategoryConfig::new("politics", "政治", "🏛️"),
        CategoryConfig::new("other", "その他", "📌"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_product() {
        let settings = AiSettings::default();
        assert_eq!(settings.ai_model, "gemini-2.0-flash");
        assert_eq!(settings.qa_model(), "gemini-2.0-flash");
        assert!(settings.summarize);
        assert!(!settings.classify);
        assert_eq!(settings.summary_length, 4000);
        assert_eq!(settings.retry.cooldown_secs, 30);
        assert_eq!(settings.retry.max_rate_limit_retries, None);
        assert_eq!(settings.categories.last().map(|c| c.name.as_str()), Some("other"));
    }

    #[test]
    fn test_parse_toml_with_legacy_aliases() {
        let text = r#"
ai_model = "gemini-2.5-flash"
qa_model = "gemini-2.5-pro"
gemini_api_key = "k0"
gemini_api_keys = ["k1", "k0", "k2"]
key_selection = "first"
classify = true
thinking_budget = 512

[[categories]]
name = "technology"
jp_name = "テクノロジー"
emoji = "🖥️"

[retry]
cooldown_secs = 5
max_rate_limit_retries = 12
"#;
        let settings = AiSettings::from_toml_str(text, "inline").unwrap();
        assert_eq!(settings.qa_model(), "gemini-2.5-pro");
        assert_eq!(settings.key_selection, KeySelection::First);
        assert!(settings.classify);
        assert_eq!(settings.thinking_budget, Some(512));
        assert_eq!(settings.categories[0].display_name, "テクノロジー");
        assert_eq!(settings.categories[0].icon, "🖥️");
        assert_eq!(settings.cooldown(), Duration::from_secs(5));
        assert_eq!(settings.retry.max_rate_limit_retries, Some(12));
        // 旧格式的单个密钥排在最前面
        assert_eq!(settings.credentials(), vec!["k0", "k1", "k0", "k2"]);
        // 未出现的字段保持默认
        assert!(settings.summarize);
        assert_eq!(settings.prompts, PromptSettings::default());
    }

    #[test]
    fn test_parse_invalid_toml_reports_origin() {
        let err = AiSettings::from_toml_str("ai_model = [", "broken.toml").unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let err = AiSettings::from_toml_str("ai_model = \"  \"", "inline").unwrap_err();
        assert!(err.to_string().contains("ai_model"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let err = AiSettings::from_toml_str("summary_length = 2", "inline").unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::InvalidValue { ref key, .. }) if key == "summary_length"
        ));

        let err = AiSettings::from_toml_str("request_timeout_secs = 0", "inline").unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::InvalidValue { ref key, .. })
                if key == "request_timeout_secs"
        ));
    }

    #[test]
    fn test_merge_credentials_skips_duplicates() {
        let mut settings = AiSettings {
            api_key: "a".to_string(),
            api_keys: vec!["b".to_string()],
            ..Default::default()
        };
        settings.merge_credentials(vec![
            "a".to_string(),
            "c".to_string(),
            String::new(),
            "b".to_string(),
        ]);
        assert_eq!(settings.credentials(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_article_timeout() {
        let mut config = Config::default();
        assert_eq!(config.article_timeout(), None);
        config.article_timeout_secs = 90;
        assert_eq!(config.article_timeout(), Some(Duration::from_secs(90)));
    }
}
