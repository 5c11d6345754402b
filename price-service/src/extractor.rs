//! Heuristic price extraction from listing page text.
//!
//! Everything here is pure: the page text goes in, a [`PriceExtraction`]
//! comes out. Missing prices are `None`, never errors.

use common::models::Currency;
use regex::Regex;
use std::sync::LazyLock;

/// Characters of context kept on each side of a per-night phrase
const NIGHTLY_CONTEXT_RADIUS: usize = 120;
/// Characters of context kept on each side of a weekend phrase
const WEEKEND_CONTEXT_RADIUS: usize = 160;
/// Tokens scanned when no per-night phrase yields a price
const FALLBACK_TOKEN_LIMIT: usize = 10;
/// Weekend amounts closer than this to the base price are dropped
const SAME_PRICE_EPSILON: f64 = 1e-6;

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static RE_PRICE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:TRY|TL|₺|EUR|€|USD|\$)\s?[0-9., ]+").unwrap());

// Token scanning is case-insensitive but marker detection is not, so a
// lowercase hit inside a word ("Entry 2", "amateur 5") leaves letters behind
// and does not parse.
static RE_CURRENCY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TRY|TL|₺|EUR|€|USD|\$").unwrap());
static RE_EURO_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"EUR|€").unwrap());
static RE_DOLLAR_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"USD|\$").unwrap());

static RE_DOT_GROUPING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,3}(?:\.[0-9]{3})+$").unwrap());
static RE_COMMA_GROUPING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,3}(?:,[0-9]{3})+$").unwrap());
static RE_LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)").unwrap());

static RE_PER_NIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)gece(?:lik)?|per night|nightly|gece başı").unwrap());
// Substring hints: "fri" and "sat" also cover Friday/Saturday (and Fridge).
static RE_WEEKEND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)hafta sonu|weekend|fri|sat|cuma|cumartesi").unwrap());

/// A single price token resolved to a currency and an amount
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractedPrice {
    pub currency: Currency,
    pub amount: f64,
}

/// Prices found on a listing page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceExtraction {
    pub currency: Currency,
    pub base_price: Option<f64>,
    pub weekend_price: Option<f64>,
}

/// Extract the nightly and weekend prices from raw page HTML.
pub fn extract_prices(raw_html: &str) -> PriceExtraction {
    let text = RE_WHITESPACE.replace_all(raw_html, " ");

    let base = context_window(&text, &RE_PER_NIGHT, NIGHTLY_CONTEXT_RADIUS)
        .and_then(first_positive_price)
        .or_else(|| first_positive_price_in(price_tokens(&text).take(FALLBACK_TOKEN_LIMIT)));

    let mut weekend = context_window(&text, &RE_WEEKEND, WEEKEND_CONTEXT_RADIUS)
        .and_then(first_positive_price);

    if let (Some(base), Some(found)) = (base, weekend)
        && (found.amount - base.amount).abs() < SAME_PRICE_EPSILON
    {
        weekend = None;
    }

    let currency = base
        .or(weekend)
        .map(|price| price.currency)
        .unwrap_or_default();

    PriceExtraction {
        currency,
        base_price: base.map(|price| price.amount),
        weekend_price: weekend.map(|price| price.amount),
    }
}

/// Currency-prefixed numeric tokens in document order.
pub fn price_tokens(text: &str) -> impl Iterator<Item = &str> {
    RE_PRICE_TOKEN.find_iter(text).map(|m| m.as_str())
}

/// Parse a raw token such as `₺1.200` or `€85,50`.
///
/// Returns `None` when no number is left once the currency marker is
/// stripped.
pub fn parse_price(raw: &str) -> Option<ExtractedPrice> {
    let currency = if RE_EURO_MARKER.is_match(raw) {
        Currency::Eur
    } else if RE_DOLLAR_MARKER.is_match(raw) {
        Currency::Usd
    } else {
        Currency::Try
    };

    let digits: String = RE_CURRENCY_MARKER
        .replace_all(raw, "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let normalized = normalize_separators(&digits);

    let amount = RE_LEADING_NUMBER
        .find(&normalized)?
        .as_str()
        .parse::<f64>()
        .ok()?;

    Some(ExtractedPrice { currency, amount })
}

/// Rewrite decimal and thousands separators into a plain `1234.56` form.
fn normalize_separators(number: &str) -> String {
    let has_comma = number.contains(',');
    let has_dot = number.contains('.');

    match (has_comma, has_dot) {
        (true, true) => number.replace('.', "").replacen(',', ".", 1),
        (true, false) if RE_COMMA_GROUPING.is_match(number) => number.replace(',', ""),
        (true, false) => number.replacen(',', ".", 1),
        (false, true) if RE_DOT_GROUPING.is_match(number) => number.replace('.', ""),
        _ => number.to_string(),
    }
}

/// Slice of `text` matched by `.{0,radius}PHRASE.{0,radius}` at its
/// leftmost position.
///
/// The window starts `radius` characters before the first phrase. With a
/// greedy prefix the phrase it centres on is the *last* occurrence starting
/// within `radius` characters of that start, so the right edge is measured
/// from that one.
fn context_window<'a>(text: &'a str, phrase: &Regex, radius: usize) -> Option<&'a str> {
    let first = phrase.find(text)?;
    let start = chars_back(text, first.start(), radius);
    let latest_anchor_start = chars_forward(text, start, radius);

    let mut anchor = first;
    loop {
        let next_char = chars_forward(text, anchor.start(), 1);
        match phrase.find_at(text, next_char) {
            Some(next) if next.start() <= latest_anchor_start => anchor = next,
            _ => break,
        }
    }

    let end = chars_forward(text, anchor.end(), radius);
    Some(&text[start..end])
}

/// Byte offset `count` characters before `from`, clamped to the start.
fn chars_back(text: &str, from: usize, count: usize) -> usize {
    text[..from]
        .char_indices()
        .rev()
        .take(count)
        .last()
        .map_or(from, |(index, _)| index)
}

/// Byte offset `count` characters after `from`, clamped to the end.
fn chars_forward(text: &str, from: usize, count: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(count)
        .map_or(text.len(), |(index, _)| from + index)
}

fn first_positive_price(window: &str) -> Option<ExtractedPrice> {
    first_positive_price_in(price_tokens(window))
}

fn first_positive_price_in<'a>(tokens: impl Iterator<Item = &'a str>) -> Option<ExtractedPrice> {
    tokens
        .filter_map(parse_price)
        .find(|price| price.amount > 0.0)
}
