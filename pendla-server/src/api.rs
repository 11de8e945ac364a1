//! The single search endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pendla_core::{Engine, Error, Journey, RaptorError, SearchRequest};
use serde::Serialize;
use tracing::error;

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

pub(crate) enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(detail) => (StatusCode::UNPROCESSABLE_ENTITY, detail),
            ApiError::Internal(detail) => {
                error!("search failed: {detail}");
                (StatusCode::INTERNAL_SERVER_ERROR, detail)
            }
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

/// `POST /search`: validate the request, hand it to the engine's search
/// queue and block (off the async runtime) for the result.
pub(crate) async fn search(
    State(engine): State<Arc<Engine>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<Journey>>, ApiError> {
    validate(&request)?;
    let result = tokio::task::spawn_blocking(move || engine.search(request))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    match result {
        Ok(journeys) => Ok(Json(journeys)),
        Err(Error::Search(RaptorError::InvalidTime)) => {
            Err(ApiError::BadRequest("wrong departure_time".to_string()))
        }
        Err(e) => Err(ApiError::Internal(e.to_string())),
    }
}

fn validate(request: &SearchRequest) -> Result<(), ApiError> {
    let bad = |detail: &str| ApiError::BadRequest(detail.to_string());
    let (origin_lat, origin_lon) = request.origin;
    let (dest_lat, dest_lon) = request.destination;

    if origin_lat.abs() > 90.0 || dest_lat.abs() > 90.0 {
        return Err(bad("wrong latitudes"));
    }
    if origin_lon.abs() > 180.0 || dest_lon.abs() > 180.0 {
        return Err(bad("wrong longitudes"));
    }
    if let Some(t) = &request.departure_time {
        if pendla_core::time::str_to_seconds(t).is_err() {
            return Err(bad("wrong departure_time format"));
        }
    }
    Ok(())
}
