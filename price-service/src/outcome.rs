use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use common::errors::AppError;
use common::models::{
    DegradedPayload, ErrorBody, PricePayload, ServerErrorBody, UpstreamErrorBody,
};

/// Every way a price request can end, mapped to one HTTP status and body
#[derive(Debug, Clone, PartialEq)]
pub enum PriceOutcome {
    InvalidInput { message: String },
    UpstreamFailure { status: u16 },
    Degraded(DegradedPayload),
    /// `edge_max_age` is the `s-maxage` advertised to intermediary caches
    Success { payload: PricePayload, edge_max_age: u64 },
    ServerError { detail: String },
}

impl PriceOutcome {
    pub fn status(&self) -> StatusCode {
        match self {
            PriceOutcome::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            PriceOutcome::UpstreamFailure { .. } => StatusCode::BAD_GATEWAY,
            PriceOutcome::Degraded(_) | PriceOutcome::Success { .. } => StatusCode::OK,
            PriceOutcome::ServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for PriceOutcome {
    fn from(err: AppError) -> Self {
        match err {
            AppError::ValidationError(message) => PriceOutcome::InvalidInput { message },
            AppError::HttpError { status, .. } => PriceOutcome::UpstreamFailure { status },
            other => PriceOutcome::ServerError {
                detail: other.to_string(),
            },
        }
    }
}

impl IntoResponse for PriceOutcome {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            PriceOutcome::InvalidInput { message } => {
                (status, Json(ErrorBody { error: message })).into_response()
            }
            PriceOutcome::UpstreamFailure { status: upstream } => (
                status,
                Json(UpstreamErrorBody {
                    error: "Failed to fetch Airbnb page".to_string(),
                    status: upstream,
                }),
            )
                .into_response(),
            PriceOutcome::Degraded(payload) => (status, Json(payload)).into_response(),
            PriceOutcome::Success {
                payload,
                edge_max_age,
            } => (
                status,
                [(
                    header::CACHE_CONTROL,
                    format!("public, max-age=0, s-maxage={}", edge_max_age),
                )],
                Json(payload),
            )
                .into_response(),
            PriceOutcome::ServerError { detail } => (
                status,
                Json(ServerErrorBody {
                    error: "Server error".to_string(),
                    detail,
                }),
            )
                .into_response(),
        }
    }
}
