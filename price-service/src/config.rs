use common::http_client::{DEFAULT_ACCEPT_LANGUAGE, DEFAULT_USER_AGENT};
use common::tracing::LogFormat;
use std::env;

use crate::listing::DEFAULT_LISTING_BASE_URL;

const TWELVE_HOURS_SECONDS: u64 = 12 * 60 * 60;

pub struct Config {
    pub port: u16,
    pub listing_base_url: String,
    pub cache_ttl_seconds: u64,
    pub edge_cache_max_age_seconds: u64,
    pub user_agent: String,
    pub accept_language: String,
    pub fetch_timeout_seconds: Option<u64>,
    pub fetch_max_retries: u32,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(3004),
            listing_base_url: lookup("LISTING_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LISTING_BASE_URL.to_string()),
            cache_ttl_seconds: lookup("CACHE_TTL_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(TWELVE_HOURS_SECONDS),
            edge_cache_max_age_seconds: lookup("EDGE_CACHE_MAX_AGE_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(TWELVE_HOURS_SECONDS),
            user_agent: lookup("FETCH_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            accept_language: lookup("FETCH_ACCEPT_LANGUAGE")
                .unwrap_or_else(|| DEFAULT_ACCEPT_LANGUAGE.to_string()),
            fetch_timeout_seconds: lookup("FETCH_TIMEOUT_SECONDS").and_then(|s| s.parse().ok()),
            fetch_max_retries: lookup("FETCH_MAX_RETRIES")
                .and_then(|r| r.parse().ok())
                .unwrap_or(0),
            log_format: lookup("LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or_default(),
        }
    }
}
