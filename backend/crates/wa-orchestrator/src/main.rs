use actix_web::{middleware::DefaultHeaders, web, App, HttpServer};
use tracing::{error, info};

mod config;
mod handlers;
mod logging;
mod middleware;
mod routes;
mod state;

use config::OrchestratorConfig;
use middleware::{ErrorHandler, RequestId};
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match OrchestratorConfig::from_env() {
        Ok(config) => {
            if let Err(e) = config.validate() {
                eprintln!("Configuration validation failed: {}", e);
                std::process::exit(1);
            }
            config
        }
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init_logging(&config) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    logging::events::app_starting(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    info!(
        "Starting wa-orchestrator v{} on {}",
        env!("CARGO_PKG_VERSION"),
        config.server_address()
    );

    let app_state = AppState::new(config.clone());

    let cors_config = config.cors.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(RequestId)
            .wrap(ErrorHandler)
            .wrap(middleware::setup_cors(&cors_config))
            .wrap(middleware::logging_middleware())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
                    .add(("X-XSS-Protection", "1; mode=block"))
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin")),
            )
            .configure(routes::configure_routes)
    });

    let server = if let Some(workers) = config.server.workers {
        info!("Setting worker threads to: {}", workers);
        server.workers(workers)
    } else {
        server
    };

    let server = server.bind(&config.server_address())?;
    let server_handle = server.handle();

    let server_task = tokio::spawn(server.run());

    logging::events::app_ready(&config.server_address());

    shutdown_signal().await;

    logging::events::app_stopping(Some("shutdown signal received"));

    server_handle.stop(true).await;

    match server_task.await {
        Ok(Ok(())) => info!("Server shut down successfully"),
        Ok(Err(e)) => error!("Server error during shutdown: {}", e),
        Err(e) => error!("Failed to shut down server task: {}", e),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn main_module_compiles() {
        assert_eq!(env!("CARGO_PKG_NAME"), "wa-orchestrator");
    }

    #[tokio::test]
    async fn config_loading_succeeds_with_required_vars() {
        env::set_var("WA_BACKEND_G_URL", "http://g.local:9001");
        env::set_var("WA_BACKEND_B_URL", "http://b.local:9002");

        let config = OrchestratorConfig::from_env();
        assert!(config.is_ok());
        assert!(config.unwrap().validate().is_ok());

        env::remove_var("WA_BACKEND_G_URL");
        env::remove_var("WA_BACKEND_B_URL");
    }

    #[tokio::test]
    async fn graceful_shutdown_compiles() {
        tokio::select! {
            _ = tokio::time::sleep(tokio::time::Duration::from_millis(1)) => {},
            _ = shutdown_signal() => {},
        }
    }
}
