use std::sync::Arc;

use naas_backend::config::{Config, DrillConfig};
use naas_backend::logging::{init_tracing, LogOptions};
use naas_backend::services::llm_provider::LLMProvider;
use naas_backend::{build_drill_service, create_app};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = init_tracing(&LogOptions::from_env(&config.log_level));

    let drill_config = DrillConfig::from_env();
    let llm = LLMProvider::from_env();
    if !llm.is_available() {
        tracing::warn!("LLM_API_KEY is not set; word generation and grading will fail");
    }
    tracing::info!(
        model = llm.model(),
        min_active_unlearned = drill_config.min_active_unlearned,
        mastery_threshold = drill_config.mastery_threshold,
        schemes_dir = %drill_config.schemes_dir.display(),
        "drill service configured"
    );

    let drill = Arc::new(build_drill_service(&drill_config, llm));
    let app = create_app(drill);

    let addr = config.bind_addr();
    tracing::info!(%addr, "naas-backend listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "bind listener failed");
            std::process::exit(1);
        }
    };

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
