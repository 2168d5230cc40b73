//! Signal Gateway Binary
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin signal-gateway
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `OB_SERVER_ADDR`: Vehicle backend address, `host:port` or URI
//! - `DEFAULT_VEHICLE`: Vehicle identity used for every request
//! - `GATEWAY_PORT`: HTTP listen port
//!
//! ## Optional
//! - `GATEWAY_UNARY_TIMEOUT_MS`: Deadline for single-reading calls (default: 2000)
//! - `GATEWAY_SHUTDOWN_TIMEOUT_SECS`: Graceful shutdown window (default: 5)
//! - `GATEWAY_RELAY_CAPACITY`: Readings buffered per stream (default: 1)
//! - `OTEL_ENABLED`: Export spans over OTLP (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4317>)
//! - `OTEL_SERVICE_NAME`: Service name (default: signal-gateway)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use signal_gateway::infrastructure::telemetry;
use signal_gateway::{
    AppState, BackendStatus, GatewayConfig, GatewayServer, GrpcVehicleSignals, HealthState,
    RelayConfig, StreamSessions, build_router, init_metrics,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_dotenv();

    let _telemetry_guard = telemetry::init();

    tracing::info!("Starting Signal Gateway");

    if let Err(e) = init_metrics() {
        tracing::warn!(error = %e, "Prometheus recorder not installed");
    }

    let config = GatewayConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
    })?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    // One lazily connected channel shared by the fuel and lighting clients.
    let backend_status = Arc::new(BackendStatus::new());
    let signals = GrpcVehicleSignals::connect_lazy(
        &config.backend.endpoint,
        config.backend.unary_timeout,
        Arc::clone(&backend_status),
    )?;

    let sessions = Arc::new(StreamSessions::new(shutdown_token.clone()));
    let app_state = AppState::new(
        Arc::new(signals),
        config.default_vehicle.clone(),
        RelayConfig {
            capacity: config.server.relay_capacity,
        },
        Arc::clone(&sessions),
    );
    let health_state = HealthState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        backend_status,
        sessions,
    );

    let server = GatewayServer::bind(
        config.server.port,
        build_router(app_state, health_state),
        shutdown_token.clone(),
        config.server.shutdown_timeout,
    )
    .await?;

    let mut server_handle = tokio::spawn(server.run());

    tracing::info!("Signal gateway ready");

    tokio::select! {
        () = await_shutdown() => {}
        result = &mut server_handle => {
            // Server exited without a shutdown signal.
            result??;
            return Ok(());
        }
    }

    shutdown_token.cancel();
    tracing::info!(
        timeout_secs = config.server.shutdown_timeout.as_secs(),
        "Graceful shutdown started"
    );
    server_handle.await??;

    tracing::info!("Signal gateway stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &GatewayConfig) {
    tracing::info!(
        backend = %config.backend.endpoint,
        vehicle_id = %config.default_vehicle,
        port = config.server.port,
        "Configuration loaded"
    );
    tracing::debug!(
        unary_timeout_ms =
            u64::try_from(config.backend.unary_timeout.as_millis()).unwrap_or(u64::MAX),
        shutdown_timeout_secs = config.server.shutdown_timeout.as_secs(),
        relay_capacity = config.server.relay_capacity,
        "Gateway tuning"
    );
}

/// Load .env file from the current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
