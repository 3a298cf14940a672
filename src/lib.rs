pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod inference;
pub mod metrics;
pub mod models;
pub mod services;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::inference::ClassificationService;
use crate::services::{AlertDispatcher, PredictionLog};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub classifier: Arc<ClassificationService>,
    pub dispatcher: Arc<AlertDispatcher>,
    pub prediction_log: Option<PredictionLog>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}

/// Pin rustls to the ring backend. The SMTP, HTTP and database clients each
/// pull in rustls, and more than one compiled-in provider leaves no default.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}
