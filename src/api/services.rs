use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::error;

use super::{error::ApiError, models::CountResponse, state::AppState};

/// Record one event (GET on the configured route)
///
/// Runs the prune/store/sync/count sequence under the configured request
/// deadline and answers `{"count": n}`. A persistence failure maps to 500,
/// an elapsed deadline to 503.
pub async fn record_timestamp(
    State(state): State<AppState>,
) -> Result<Json<CountResponse>, ApiError> {
    let deadline = state.config.server.request_timeout.as_duration();

    let count = match tokio::time::timeout(deadline, state.service.record_timestamp()).await {
        Ok(Ok(count)) => count,
        Ok(Err(e)) => {
            error!(error = %e, "Error recording timestamp");
            return Err(e.into());
        }
        Err(_) => {
            state.service.metrics().event_failed();
            error!(?deadline, "Timed out recording timestamp");
            return Err(ApiError::Timeout(deadline));
        }
    };

    Ok(Json(CountResponse { count }))
}

/// Liveness check (GET /health); never touches the store
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
