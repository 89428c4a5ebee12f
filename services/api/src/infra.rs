use churn_intake::config::PredictionConfig;
use churn_intake::error::AppError;
use churn_intake::intake::HttpPredictionTransport;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn build_transport(
    config: &PredictionConfig,
) -> Result<Arc<HttpPredictionTransport>, AppError> {
    let transport = HttpPredictionTransport::new(config.clone())?;
    debug!(base_url = %config.base_url, timeout = ?config.timeout, "prediction transport ready");
    Ok(Arc::new(transport))
}
