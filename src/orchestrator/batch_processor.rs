//! 批量文章处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **并发控制**：使用 Semaphore 限制同时处理的文章数
//! 2. **超时控制**：可选的单篇超时，超时的文章不产出结果
//! 3. **顺序保持**：结果按输入顺序返回
//! 4. **全局统计**：汇总成功、阶段失败和超时数量
//!
//! 单篇文章的细节全部委托给 `AiProcessor`。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{error, warn};

use crate::models::{Article, ArticleJob};
use crate::orchestrator::ai_processor::AiProcessor;
use crate::utils::logging::{log_articles_loaded, log_batch_complete, print_final_stats};

/// 批量处理选项
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// 同时处理的文章数量（限制在 1 到 `Semaphore::MAX_PERMITS` 之间）
    pub max_concurrent: usize,
    /// 单篇文章超时，None 表示不限制
    pub timeout: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            timeout: None,
        }
    }
}

/// 批量处理结果
#[derive(Debug, Default)]
pub struct BatchReport {
    /// 处理完成的文章，按输入顺序排列
    pub articles: Vec<Article>,
    /// 超时或任务异常、没有产出结果的文章标题
    pub timed_out: Vec<String>,
}

impl BatchReport {
    /// 完整跑完流程的文章数
    pub fn processed_count(&self) -> usize {
        self.articles.iter().filter(|a| a.ai_processed).count()
    }

    /// 流程中出现意外错误的文章数
    pub fn failed_count(&self) -> usize {
        self.articles.iter().filter(|a| !a.ai_processed).count()
    }
}

/// 批量处理文章
pub async fn process_batch(
    processor: Arc<AiProcessor>,
    jobs: Vec<ArticleJob>,
    options: BatchOptions,
) -> BatchReport {
    let total = jobs.len();
    let max_concurrent = options.max_concurrent.clamp(1, Semaphore::MAX_PERMITS);
    log_articles_loaded(total, max_concurrent);

    let semaphore = Arc::new(Semaphore::new(max_concurrent));
    let mut handles = Vec::with_capacity(total);

    for (idx, job) in jobs.into_iter().enumerate() {
        let article_index = idx + 1;
        let title = job.article.title.clone();
        let processor = processor.clone();
        let semaphore = semaphore.clone();

        let handle = tokio::spawn(async move {
            // 信号量不会被关闭，获取失败时直接处理
            let _permit = semaphore.acquire_owned().await.ok();
            let work = processor.process_article(&job.article, &job.feed);
            match options.timeout {
                Some(limit) => match tokio::time::timeout(limit, work).await {
                    Ok(article) => Some(article),
                    Err(_) => {
                        warn!("[文章 {}] ⏱️ 处理超时 ({} 秒)", article_index, limit.as_secs());
                        None
                    }
                },
                None => Some(work.await),
            }
        });
        handles.push((title, handle));
    }

    let mut report = BatchReport::default();
    for (title, handle) in handles {
        match handle.await {
            Ok(Some(article)) => report.articles.push(article),
            Ok(None) => report.timed_out.push(title),
            Err(e) => {
                error!("[文章 {}] 任务执行失败: {}", title, e);
                report.timed_out.push(title);
            }
        }
    }

    log_batch_complete(report.processed_count(), total);
    print_final_stats(
        report.processed_count(),
        report.failed_count(),
        report.timed_out.len(),
        total,
    );

    report
}
