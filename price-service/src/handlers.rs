use axum::{extract::State, response::Json};
use axum_extra::extract::{Query, QueryRejection};
use common::models::{ErrorBody, PricePayload, ServerErrorBody, UpstreamErrorBody};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::outcome::PriceOutcome;
use crate::service::PriceService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PriceService>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health check")
    )
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "price-service" }))
}

#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    #[serde(default)]
    pub listing: Vec<String>,
}

impl PriceQuery {
    /// The listing id, if exactly one was given
    pub fn single_listing(&self) -> Option<&str> {
        match self.listing.as_slice() {
            [listing] => Some(listing.as_str()),
            _ => None,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/airbnb-price",
    params(
        ("listing" = String, Query, description = "Listing id (okanhomes2 or okanhomes3)")
    ),
    responses(
        (status = 200, description = "Nightly and weekend price, or null prices with a note when none was detected", body = PricePayload),
        (status = 400, description = "Missing or unknown listing", body = ErrorBody),
        (status = 502, description = "Listing page returned a non-success status", body = UpstreamErrorBody),
        (status = 500, description = "Unexpected failure", body = ServerErrorBody)
    ),
    tag = "price"
)]
pub async fn get_price(
    State(state): State<AppState>,
    query: Result<Query<PriceQuery>, QueryRejection>,
) -> PriceOutcome {
    let listing = match query {
        Ok(Query(params)) => {
            info!(listing = ?params.listing, "Price request received");
            params.single_listing().map(str::to_owned)
        }
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable price query");
            None
        }
    };

    // Runs detached so a dropped client connection does not abort the fetch
    // or the cache write.
    let service = state.service.clone();
    let lookup =
        tokio::spawn(async move { service.get_price(listing.as_deref()).await });

    match lookup.await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "Price lookup task failed");
            PriceOutcome::ServerError {
                detail: e.to_string(),
            }
        }
    }
}
