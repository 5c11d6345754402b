use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::errors::AppError;

/// Listings the service is allowed to price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ListingId {
    Okanhomes2,
    Okanhomes3,
}

impl ListingId {
    pub const ALL: [ListingId; 2] = [ListingId::Okanhomes2, ListingId::Okanhomes3];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListingId::Okanhomes2 => "okanhomes2",
            ListingId::Okanhomes3 => "okanhomes3",
        }
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ListingId::ALL
            .into_iter()
            .find(|listing| listing.as_str() == s)
            .ok_or_else(invalid_listing)
    }
}

/// Error returned for a missing or unknown listing id
pub fn invalid_listing() -> AppError {
    let allowed: Vec<&str> = ListingId::ALL.iter().map(ListingId::as_str).collect();
    AppError::validation(format!("Invalid listing. Use listing={}", allowed.join("|")))
}

/// Currencies a price token can be quoted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Try,
    Eur,
    Usd,
}

/// Price data for a listing, as served and cached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricePayload {
    pub listing: ListingId,
    pub currency: Currency,
    pub base_price: f64,
    pub weekend_price: Option<f64>,
    /// ISO-8601 generation time
    pub last_updated: String,
    pub source: String,
}

/// Response when the page was fetched but no nightly price was found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DegradedPayload {
    pub listing: ListingId,
    pub currency: Currency,
    pub base_price: Option<f64>,
    pub weekend_price: Option<f64>,
    pub note: String,
}

/// Client error body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Upstream failure body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpstreamErrorBody {
    pub error: String,
    pub status: u16,
}

/// Unexpected failure body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServerErrorBody {
    pub error: String,
    pub detail: String,
}
