use axum::Json;
use axum::extract::rejection::JsonRejection;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub mod follow;
pub mod health;
pub mod ingredient;
pub mod recipe;
pub mod recipe_list;
pub mod shopping_list;
pub mod tag;
pub mod user;

/// Unwrap a JSON body, answering malformed payloads with a JSON `MISSING_DATA` error.
pub(crate) fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected request body");
            Err(ApiError::MissingData)
        }
    }
}

/// Parse an optional raw query string with `serde_qs`; absent means all defaults.
pub(crate) fn parse_query<T: DeserializeOwned + Default>(raw: Option<&str>) -> Result<T, ApiError> {
    Ok(raw
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|_| ApiError::InvalidQuery)?
        .unwrap_or_default())
}

/// `1|true` and `0|false`; anything else is rejected.
pub(crate) fn parse_flag(value: Option<&str>) -> Result<bool, ApiError> {
    match value {
        None | Some("0") | Some("false") => Ok(false),
        Some("1") | Some("true") => Ok(true),
        Some(_) => Err(ApiError::InvalidQuery),
    }
}
