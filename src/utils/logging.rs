/// 日志工具模块
///
/// 初始化 tracing 订阅器，并提供批量处理的日志输出辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 日志级别由 `RUST_LOG` 控制，默认 `info`。重复调用不会报错。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `model`: 主模型
/// - `qa_model`: 问答模型
/// - `credential_count`: 密钥数量
/// - `max_concurrent`: 最大并发数
pub fn log_startup(model: &str, qa_model: &str, credential_count: usize, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - AI 文章处理模式");
    info!("🤖 模型: {} / 问答模型: {}", model, qa_model);
    info!("🔑 密钥数量: {}", credential_count);
    info!("📊 最大并发数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录文章加载信息
pub fn log_articles_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 篇待处理的文章", total);
    info!("📋 最多同时处理 {} 篇", max_concurrent);
}

/// 记录批次完成信息
///
/// # 参数
/// - `success`: 完整处理的数量
/// - `total`: 文章总数
pub fn log_batch_complete(success: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 批次完成: 成功 {}/{}", success, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(success: usize, failed: usize, timed_out: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 意外错误: {}", failed);
    info!("⏱️ 超时: {}", timed_out);
    info!("{}", "=".repeat(60));
}

/// 记录结果保存位置
pub fn log_saved(output_path: &str, count: usize) {
    info!("💾 已保存 {} 篇文章至: {}", count, output_path);
}
