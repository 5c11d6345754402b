use common::models::ListingId;
use std::collections::HashMap;

pub const DEFAULT_LISTING_BASE_URL: &str = "https://www.airbnb.com/h";

/// Static lookup of listing ids to their public page URLs
pub struct ListingDirectory {
    urls: HashMap<ListingId, String>,
}

impl ListingDirectory {
    pub fn with_base_url(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let urls = ListingId::ALL
            .into_iter()
            .map(|listing| (listing, format!("{}/{}", base_url, listing)))
            .collect();

        Self { urls }
    }

    pub fn url_for(&self, listing: ListingId) -> Option<&str> {
        self.urls.get(&listing).map(String::as_str)
    }
}

impl Default for ListingDirectory {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_LISTING_BASE_URL)
    }
}
