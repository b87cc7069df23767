use anyhow::Result;
use dekiemtra::utils::logging;
use dekiemtra::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let stats = App::initialize(config).await?.run().await?;
    if stats.failed > 0 {
        tracing::warn!("{} 份计划未完全成功", stats.failed);
    }

    Ok(())
}
