use face_verify::app_state::AppState;
use face_verify::config::AppConfig;
use face_verify::routes;
use face_verify::services::face::{FaceComparator, OnnxFaceComparator};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing face-verify server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    metrics::describe_counter!(
        "face_verifications_total",
        "Verification requests by outcome"
    );
    metrics::describe_histogram!(
        "face_verification_seconds",
        "Time to decode and compare one image pair"
    );

    // Models load lazily on the first request; report what we can see now.
    let comparator = OnnxFaceComparator::new(config.onnx_settings());
    let availability = comparator.availability();
    if availability.available {
        tracing::info!(
            model = comparator.model_name(),
            detector_backend = comparator.detector_backend(),
            model_dir = %config.face_model_dir.display(),
            "face models found"
        );
    } else {
        tracing::warn!(
            reason = availability.reason.as_deref().unwrap_or("unknown"),
            "face models unavailable; /verify will answer 503 until they are installed"
        );
    }

    if config.face_preload {
        tracing::info!("Preloading face models");
        if let Err(e) = comparator.warm_up() {
            tracing::error!(error = %e, "face model preload failed; will retry on first request");
        }
    }

    let state = AppState::new(comparator);
    let app = routes::app(state, prometheus_handle, &config);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
