use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rss_ai_pipeline::config::credentials_from_env;
use rss_ai_pipeline::models::{load_article_jobs, save_articles};
use rss_ai_pipeline::utils::logging;
use rss_ai_pipeline::{process_batch, AiProcessor, AiSettings, BatchOptions, Config};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    let mut settings = if Path::new(&config.settings_path).exists() {
        AiSettings::load(&config.settings_path)
            .await
            .with_context(|| format!("加载 AI 设置失败: {}", config.settings_path))?
    } else {
        warn!("⚠️ 未找到设置文件 {}，使用默认设置", config.settings_path);
        AiSettings::default()
    };
    settings.merge_credentials(credentials_from_env());

    logging::log_startup(
        &settings.ai_model,
        settings.qa_model(),
        settings.credentials().len(),
        config.max_concurrent_articles,
    );

    let processor = Arc::new(AiProcessor::new(settings).context("创建 AI 处理器失败")?);

    let jobs = load_article_jobs(Path::new(&config.input_path)).await?;
    if jobs.is_empty() {
        warn!("⚠️ 没有找到待处理的文章，程序结束");
        return Ok(());
    }

    let options = BatchOptions {
        max_concurrent: config.max_concurrent_articles,
        timeout: config.article_timeout(),
    };
    let report = process_batch(processor, jobs, options).await;

    if !report.timed_out.is_empty() {
        info!("超时的文章: {:?}", report.timed_out);
    }

    save_articles(Path::new(&config.output_path), &report.articles).await?;
    logging::log_saved(&config.output_path, report.articles.len());

    Ok(())
}
