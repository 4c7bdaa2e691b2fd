use crate::models::article::{Article, ArticleJob};
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 JSON 文件加载待处理的文章任务
///
/// 文件内容为任务数组，每个任务包含 `article` 和可选的 `feed`。
pub async fn load_article_jobs(json_file_path: &Path) -> Result<Vec<ArticleJob>> {
    let content = fs::read_to_string(json_file_path)
        .await
        .with_context(|| format!("无法读取JSON文件: {}", json_file_path.display()))?;

    let jobs: Vec<ArticleJob> = serde_json::from_str(&content)
        .with_context(|| format!("无法解析JSON文件: {}", json_file_path.display()))?;

    tracing::info!(
        "成功加载 {} 篇文章: {}",
        jobs.len(),
        json_file_path.file_name().unwrap_or_default().to_string_lossy()
    );

    Ok(jobs)
}

/// 将处理后的文章写入 JSON 文件
pub async fn save_articles(json_file_path: &Path, articles: &[Article]) -> Result<()> {
    let content = serde_json::to_string_pretty(articles).context("无法序列化处理结果")?;

    fs::write(json_file_path, content)
        .await
        .with_context(|| format!("无法写入JSON文件: {}", json_file_path.display()))?;

    tracing::info!("已写入 {} 篇文章: {}", articles.len(), json_file_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_then_load_jobs_file() {
        let dir = std::env::temp_dir()
            .join(format!("rss_ai_pipeline_loader_{}", std::process::id()));
        fs::create_dir_all(&dir).await.unwrap();

        let input = dir.join("jobs.json");
        fs::write(
            &input,
            r#"[{"article": {"title": "A", "content": "B", "link": "u"}, "feed": {"summary_type": "short"}},
                {"article": {"title": "C", "content": "D"}}]"#,
        )
        .await
        .unwrap();

        let jobs = load_article_jobs(&input).await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].feed.summary_style(), "short");
        assert_eq!(jobs[1].feed.summary_style(), "normal");

        let output = dir.join("out.json");
        let articles: Vec<Article> = jobs.into_iter().map(|j| j.article).collect();
        save_articles(&output, &articles).await.unwrap();
        let written = fs::read_to_string(&output).await.unwrap();
        assert!(written.contains("\"link\": \"u\""));

        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_missing_file_fails_with_path() {
        let err = load_article_jobs(Path::new("/definitely/not/here.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
