use std::future::IntoFuture;

use affinity_card::{
    build_router, config::AppConfig, shutdown::ShutdownManager, startup::run_startup_checks,
};

#[tokio::main]
async fn main() {
    // 日志级别来自配置，因此先加载配置（加载失败时按 info 级别报告错误）
    let config_result = AppConfig::init_global();
    let level = match &config_result {
        Ok(()) => AppConfig::global().logging.level.clone(),
        Err(_) => "info".to_string(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("affinity_card={level},tower_http=info").into()),
        )
        .init();

    if let Err(e) = config_result {
        tracing::error!("Config init failed: {}", e);
        std::process::exit(1);
    }
    let config = AppConfig::global();

    // 创建优雅退出管理器
    let shutdown_manager = ShutdownManager::new();
    if let Err(e) = shutdown_manager.start_signal_handler().await {
        tracing::error!("信号处理器启动失败: {}", e);
        std::process::exit(1);
    }

    let state = match run_startup_checks(config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Startup checks failed: {}", e);
            std::process::exit(1);
        }
    };
    let app = build_router(state);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!("Server: http://{}", addr);
    tracing::info!("Affinity: http://{}/api/affinity?y1=30&y2=70&y3=95", addr);
    tracing::info!(
        "Render parallelism: {}, max canvas width: {}",
        config.render.effective_parallelism(),
        config.render.max_canvas_width
    );

    let shutdown_timeout = config.shutdown.timeout_duration();
    let signal_manager = shutdown_manager.clone();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let reason = signal_manager.wait_for_shutdown().await;
            tracing::info!("接收到退出信号: {:?}，开始优雅关闭HTTP服务器...", reason);
        })
        .into_future();

    // 进行中的请求最多等待 timeout_secs
    let drain_deadline = async move {
        shutdown_manager.wait_for_shutdown().await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("服务器运行错误: {}", e);
                std::process::exit(1);
            }
            tracing::info!("服务器已优雅关闭");
        }
        _ = drain_deadline => {
            tracing::warn!(
                "优雅退出超时（{}秒），强制退出",
                config.shutdown.timeout_secs
            );
        }
    }
}
