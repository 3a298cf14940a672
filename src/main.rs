use std::sync::Arc;

use seizure_alert::api::router::create_router;
use seizure_alert::config::{AppConfig, TransportKind};
use seizure_alert::inference::load_service;
use seizure_alert::services::{AlertDispatcher, PredictionLog};
use seizure_alert::{db, metrics, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    seizure_alert::install_crypto_provider();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    // --- Artifacts (required before serving) ---
    let classifier = match load_service(&config.scaler_path, &config.model_path) {
        Ok(service) => service,
        Err(e) => {
            tracing::error!(
                error = %e,
                scaler = %config.scaler_path.display(),
                model = %config.model_path.display(),
                "Error loading model or scaler"
            );
            return Err(anyhow::anyhow!("startup failure: {e}"));
        }
    };

    match classifier.self_check() {
        Some(Ok(predictions)) => {
            tracing::info!(?predictions, "Reference prediction (normal input)");
        }
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Reference prediction failed");
        }
        None => {
            tracing::debug!(
                features = classifier.expected_features(),
                "Skipping reference prediction for non-4-feature model"
            );
        }
    }

    // --- Alerting ---
    let dispatcher = AlertDispatcher::from_config(&config);
    if config.alert_transport == TransportKind::Sms && !config.has_twilio_auth() {
        tracing::warn!("Twilio credentials incomplete; emergency alerts will return 500");
    }
    tracing::info!(transport = %dispatcher.kind(), "Alert dispatcher ready");

    // --- Prediction log (optional) ---
    let prediction_log = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to prediction log database...");
            match db::init_pool(url).await {
                Ok(pool) => {
                    tracing::info!("Prediction log connected");
                    Some(PredictionLog::new(pool))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Prediction log unavailable; continuing without it");
                    None
                }
            }
        }
        None => {
            tracing::info!("DATABASE_URL not set; prediction log disabled");
            None
        }
    };

    let metrics_handle = metrics::init_metrics();

    let state = AppState {
        config,
        classifier: Arc::new(classifier),
        dispatcher: Arc::new(dispatcher),
        prediction_log,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seizure_alert=info,tower_http=info".into()),
        )
        .with(fmt::layer())
        .init();
}
