// ==========================================
// 教会社区管理 - HTTP 服务主入口
// ==========================================
// 配置: 环境变量（见 config::env_keys）
// ==========================================

use std::sync::Arc;

use anyhow::Context;
use iglesia_grupos::app::{build_router, AppState};
use iglesia_grupos::config::AppConfig;
use iglesia_grupos::{i18n, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 小组分配服务", iglesia_grupos::APP_NAME);
    tracing::info!("系统版本: {}", iglesia_grupos::VERSION);
    tracing::info!("==================================================");

    let config = AppConfig::from_env();
    i18n::set_locale(&config.locale);
    tracing::info!("使用数据库: {}", config.db_path);

    let state = AppState::new(config.db_path.clone())
        .map_err(anyhow::Error::msg)
        .context("无法初始化AppState")?
        .with_request_timeout(config.request_timeout);

    let router = build_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("无法监听 {}", config.bind_addr))?;
    tracing::info!("监听地址: {}", config.bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP 服务异常退出")?;

    tracing::info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("无法监听退出信号: {}", e);
    }
}
