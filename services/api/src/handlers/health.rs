use axum::extract::State;
use axum::http::StatusCode;

use foodgram_core::health::check_database;

use crate::state::AppState;

/// Handler for `GET /readyz`: ready once the store answers.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    check_database(&state.db).await
}
