use chrono::SecondsFormat;
use common::errors::AppError;
use common::http_client::HttpClient;
use common::models::{DegradedPayload, ListingId, PricePayload, invalid_listing};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::cache::PriceCache;
use crate::clock::Clock;
use crate::extractor;
use crate::listing::ListingDirectory;
use crate::outcome::PriceOutcome;

pub const PRICE_SOURCE: &str = "airbnb";
const LAYOUT_CHANGED_NOTE: &str = "Price not detected. Airbnb layout may have changed.";

pub struct PriceService {
    http_client: HttpClient,
    cache: Arc<dyn PriceCache>,
    clock: Arc<dyn Clock>,
    listings: ListingDirectory,
    edge_max_age: u64,
}

impl PriceService {
    pub fn new(
        http_client: HttpClient,
        cache: Arc<dyn PriceCache>,
        clock: Arc<dyn Clock>,
        listings: ListingDirectory,
        edge_max_age: u64,
    ) -> Self {
        Self {
            http_client,
            cache,
            clock,
            listings,
            edge_max_age,
        }
    }

    /// Resolve the current price for `listing`. Failures are folded into the
    /// returned outcome.
    #[instrument(skip(self))]
    pub async fn get_price(&self, listing: Option<&str>) -> PriceOutcome {
        match self.try_get_price(listing).await {
            Ok(outcome) => outcome,
            Err(e) => {
                match &e {
                    AppError::ValidationError(_) => warn!(error = %e, "Rejected price request"),
                    AppError::HttpError { status, .. } => {
                        warn!(status, error = %e, "Listing page fetch failed")
                    }
                    _ => error!(error = %e, "Price lookup failed"),
                }
                PriceOutcome::from(e)
            }
        }
    }

    async fn try_get_price(&self, listing: Option<&str>) -> Result<PriceOutcome, AppError> {
        let listing: ListingId = listing.ok_or_else(invalid_listing)?.parse()?;
        let url = self
            .listings
            .url_for(listing)
            .ok_or_else(|| AppError::validation("Listing URL not found"))?;

        let requested_at = self.clock.now();
        if let Some(payload) = self.cache.get_fresh(listing, requested_at).await {
            info!(listing = %listing, "Cache hit");
            return Ok(self.success(payload));
        }

        info!(listing = %listing, url = %url, "Cache miss, fetching listing page");
        let html = self.http_client.get_text(url).await?;
        let extraction = extractor::extract_prices(&html);

        let Some(base_price) = extraction.base_price else {
            warn!(listing = %listing, "No nightly price found on listing page");
            return Ok(PriceOutcome::Degraded(DegradedPayload {
                listing,
                currency: extraction.currency,
                base_price: None,
                weekend_price: None,
                note: LAYOUT_CHANGED_NOTE.to_string(),
            }));
        };

        let payload = PricePayload {
            listing,
            currency: extraction.currency,
            base_price,
            weekend_price: extraction.weekend_price,
            last_updated: self
                .clock
                .now()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            source: PRICE_SOURCE.to_string(),
        };

        self.cache.set(listing, requested_at, payload.clone()).await;
        info!(
            listing = %listing,
            base_price,
            weekend_price = ?extraction.weekend_price,
            "Stored listing price"
        );

        Ok(self.success(payload))
    }

    fn success(&self, payload: PricePayload) -> PriceOutcome {
        PriceOutcome::Success {
            payload,
            edge_max_age: self.edge_max_age,
        }
    }
}
