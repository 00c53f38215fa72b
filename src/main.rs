//! CORS Proxy Gateway
//!
//! A forwarding HTTP gateway built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                CORS GATEWAY                   │
//!                    │                                               │
//!   Client Request   │  ┌──────────┐   ┌───────────┐   ┌─────────┐ │
//!   ─────────────────┼─▶│rate limit│──▶│  target   │──▶│  relay  │─┼──▶ Target
//!                    │  │(fixed    │   │ validator │   │ engine  │ │    Server
//!                    │  │ window)  │   │(anti-SSRF)│   │         │ │
//!                    │  └──────────┘   └───────────┘   └────┬────┘ │
//!                    │                                      │      │
//!   Client Response  │  ┌─────────────────────────┐         │      │
//!   ◀────────────────┼──│ header rewrite (CORS +  │◀────────┘      │
//!                    │  │ X-Proxied-By), streamed │                │
//!                    │  └─────────────────────────┘                │
//!                    │                                               │
//!                    │  config · logging · metrics · lifecycle       │
//!                    └──────────────────────────────────────────────┘
//! ```

use tokio::net::TcpListener;

use cors_gateway::{config, observability, HttpServer, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env is optional; a missing file is not an error.
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    let _log_guard = observability::logging::init(&config.observability);

    // Last-resort diagnostics: anything that escapes request handling is
    // logged instead of disappearing with the default stderr hook.
    std::panic::set_hook(Box::new(|info| {
        tracing::error!(panic = %info, "Uncaught exception");
    }));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        allowed_origins = ?config.cors.allowed_origins,
        rate_limit_window_secs = config.rate_limit.window_secs,
        rate_limit_max_requests = config.rate_limit.max_requests,
        relay_timeout_secs = config.relay.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "CORS Proxy Server is running"
    );

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
