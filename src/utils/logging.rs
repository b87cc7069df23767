use anyhow::Result;
/// 日志工具模块
///
/// 订阅器初始化和批量运行时的日志辅助函数
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 订阅器
///
/// 优先使用 `RUST_LOG`；未设置时默认 `info`，`verbose` 为 true 时为 `debug`。
/// 重复调用不会 panic（测试里会多次调用）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "dekiemtra=debug,info" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\nNhật ký tạo đề - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 追加一行到日志文件，每行带时间
///
/// 文件不存在时创建。
pub fn append_log_line(log_file_path: &str, line: &str) -> Result<()> {
    debug!("写入日志文件: {}", log_file_path);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%H:%M:%S"),
        line
    )?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(plan_folder: &str, models: &[String]) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量出卷模式");
    info!("📁 计划目录: {}", plan_folder);
    info!("🤖 模型优先级: {}", models.join(" → "));
    info!("{}", "=".repeat(60));
}

/// 记录单份计划开始
pub fn log_plan_start(plan_index: usize, total: usize, name: &str, questions: usize) {
    info!("\n{}", "─".repeat(60));
    info!(
        "📄 [{}/{}] {} ({} câu)",
        plan_index, total, name, questions
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `total`: 总数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(success: usize, failed: usize, total: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
