//! 认证与授权网关主入口

use authgate::{
    auth::jwt::JwtService,
    auth::resolver::CredentialResolver,
    config::AppConfig,
    db,
    handlers::health,
    middleware::AppState,
    repository::{AccessRepository, SessionRepository},
    routes, seed,
    services::{AccessControlService, AccountService},
    telemetry,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("authgate {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("未知参数: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境）
    // 按优先级加载：.env.local > .env.development > .env
    // 生产环境应该直接设置环境变量，不依赖 .env 文件
    if let Ok(path) = std::env::var("GATE_ENV") {
        dotenv::from_filename(format!(".env.{}", path)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::from_filename(".env.development").ok();
        dotenv::dotenv().ok();
    }

    // 设置应用启动时间
    health::set_start_time();

    // 1. 加载配置（配置错误在启动期即失败，不进入请求处理）
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Authgate starting...");

    // 3. 数据库连接池 + 迁移 + 种子数据
    let db_pool = db::create_pool(&config.database).await?;
    db::run_migrations(&db_pool).await?;
    seed::seed_if_empty(&db_pool).await?;

    tracing::info!("Database initialized");

    // 4. 构建应用状态
    let jwt = Arc::new(JwtService::from_config(&config)?);

    let account_service = Arc::new(AccountService::new(
        db_pool.clone(),
        jwt.clone(),
        Arc::new(config.clone()),
    ));

    let access = Arc::new(AccessControlService::new(AccessRepository::new(
        db_pool.clone(),
    )));

    let resolver = Arc::new(CredentialResolver::new(
        SessionRepository::new(db_pool.clone()),
        jwt.clone(),
        config.security.cookie_name.clone(),
    ));

    let app_state = Arc::new(AppState {
        config: config.clone(),
        db: db_pool,
        account_service,
        access,
        resolver,
    });

    // 5. 构建路由
    let app = routes::create_router(app_state);

    // 6. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        "Server listening"
    );

    // 7. 优雅关闭
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.graceful_shutdown_timeout_secs))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }

    // 超时后强制关闭
    tokio::time::sleep(tokio::time::Duration::from_secs(timeout_secs)).await;
    tracing::warn!("Graceful shutdown timeout reached, forcing exit");
}

/// 打印帮助信息
fn print_help() {
    println!("authgate {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: authgate [选项]");
    println!();
    println!("选项:");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!();
    println!("环境变量:");
    println!("  所有配置通过环境变量完成（前缀 GATE_）");
}
