//! Exchange-rate provider
//!
//! Rates are quoted against the base currency (`1 BASE = rate[X] X`), fetched
//! from an HTTP source and cached in-process. When the source is down the
//! last good table is served, or a built-in table when nothing was ever
//! fetched.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Currencies the site can display
pub const SUPPORTED_CURRENCIES: [&str; 8] = ["THB", "USD", "EUR", "GBP", "CNY", "JPY", "AUD", "SGD"];

/// Approximate THB-based rates used when the source was never reachable
const FALLBACK_THB_RATES: [(&str, f64); 8] = [
    ("THB", 1.0),
    ("USD", 0.028),
    ("EUR", 0.026),
    ("GBP", 0.022),
    ("CNY", 0.2),
    ("JPY", 4.2),
    ("AUD", 0.043),
    ("SGD", 0.037),
];

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest amount accepted for conversion
pub const MAX_CONVERT_AMOUNT: f64 = 1e12;

#[derive(Debug, thiserror::Error)]
pub enum CurrencyError {
    #[error("unsupported currency: {0}")]
    Unsupported(String),
    #[error("no rate for {0}")]
    MissingRate(String),
    #[error("rate source request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rate source returned no usable rates")]
    EmptyResponse,
    #[error("amount out of range: {0}")]
    OutOfRange(f64),
}

impl From<CurrencyError> for shared::error::AppError {
    fn from(e: CurrencyError) -> Self {
        use shared::error::{AppError, ErrorCode};
        match e {
            CurrencyError::Unsupported(code) => {
                AppError::new(ErrorCode::CurrencyUnsupported).with_detail("currency", code)
            }
            CurrencyError::OutOfRange(amount) => {
                AppError::validation(format!("amount must not exceed {MAX_CONVERT_AMOUNT}"))
                    .with_detail("amount", amount)
            }
            other => {
                tracing::warn!(error = %other, "Currency conversion unavailable");
                AppError::new(ErrorCode::ExchangeRateUnavailable)
            }
        }
    }
}

/// Rate table as served to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTable {
    pub base: String,
    pub rates: HashMap<String, f64>,
    /// Unix millis when the table was fetched (0 for the built-in table)
    pub fetched_at: i64,
    /// True when the table is past its TTL or is the built-in fallback
    pub stale: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversion {
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub result: f64,
}

/// Response shape of the rate source
#[derive(Deserialize)]
struct RateSourceResponse {
    rates: HashMap<String, f64>,
}

struct CachedRates {
    table: RateTable,
    loaded_at: Instant,
}

#[derive(Clone)]
pub struct CurrencyService {
    http: reqwest::Client,
    api_url: String,
    base: String,
    ttl: Duration,
    cache: Arc<RwLock<Option<CachedRates>>>,
}

impl CurrencyService {
    pub fn new(api_url: impl Into<String>, base: impl Into<String>, ttl_secs: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_url: api_url.into(),
            base: base.into().to_ascii_uppercase(),
            ttl: Duration::from_secs(ttl_secs),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Current rate table: fresh cache, else refetch, else stale cache, else fallback.
    pub async fn rates(&self) -> RateTable {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref()
                && cached.loaded_at.elapsed() < self.ttl
            {
                return cached.table.clone();
            }
        }

        match self.fetch().await {
            Ok(table) => {
                let mut cache = self.cache.write().await;
                *cache = Some(CachedRates {
                    table: table.clone(),
                    loaded_at: Instant::now(),
                });
                tracing::info!(base = %table.base, count = table.rates.len(), "Exchange rates refreshed");
                table
            }
            Err(e) => {
                let cache = self.cache.read().await;
                if let Some(cached) = cache.as_ref() {
                    tracing::warn!(error = %e, "Exchange rate refresh failed, serving stale rates");
                    let mut table = cached.table.clone();
                    table.stale = true;
                    table
                } else {
                    tracing::warn!(error = %e, "Exchange rate source unavailable, serving fallback rates");
                    self.fallback()
                }
            }
        }
    }

    /// Convert `amount` between two supported currencies, rounded to 2 dp.
    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<Conversion, CurrencyError> {
        let from = normalize_code(from)?;
        let to = normalize_code(to)?;
        if from == to {
            return Ok(Conversion {
                amount,
                rate: 1.0,
                result: round_money(to_decimal(amount).ok_or(CurrencyError::OutOfRange(amount))?),
                from,
                to,
            });
        }
        let table = self.rates().await;
        convert_with(&table, amount, &from, &to)
    }

    async fn fetch(&self) -> Result<RateTable, CurrencyError> {
        let response: RateSourceResponse = self
            .http
            .get(&self.api_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut rates: HashMap<String, f64> = response
            .rates
            .into_iter()
            .map(|(code, rate)| (code.to_ascii_uppercase(), rate))
            .filter(|(code, rate)| {
                SUPPORTED_CURRENCIES.contains(&code.as_str()) && rate.is_finite() && *rate > 0.0
            })
            .collect();
        if rates.is_empty() {
            return Err(CurrencyError::EmptyResponse);
        }
        rates.insert(self.base.clone(), 1.0);

        Ok(RateTable {
            base: self.base.clone(),
            rates,
            fetched_at: shared::util::now_millis(),
            stale: false,
        })
    }

    /// Built-in table re-based onto the configured base currency
    fn fallback(&self) -> RateTable {
        let thb: HashMap<&str, f64> = FALLBACK_THB_RATES.into_iter().collect();
        let base_per_thb = thb.get(self.base.as_str()).copied().unwrap_or(1.0);
        let rates = thb
            .iter()
            .map(|(code, rate)| (code.to_string(), rate / base_per_thb))
            .collect();
        RateTable {
            base: self.base.clone(),
            rates,
            fetched_at: 0,
            stale: true,
        }
    }
}

fn normalize_code(code: &str) -> Result<String, CurrencyError> {
    let upper = code.trim().to_ascii_uppercase();
    if SUPPORTED_CURRENCIES.contains(&upper.as_str()) {
        Ok(upper)
    } else {
        Err(CurrencyError::Unsupported(code.to_string()))
    }
}

#[inline]
fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value)
}

#[inline]
fn round_money(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// `amount / rate[from] * rate[to]`
fn convert_with(table: &RateTable, amount: f64, from: &str, to: &str) -> Result<Conversion, CurrencyError> {
    let rate_of = |code: &str| {
        table
            .rates
            .get(code)
            .copied()
            .filter(|r| *r > 0.0)
            .and_then(to_decimal)
            .filter(|r| !r.is_zero())
            .ok_or_else(|| CurrencyError::MissingRate(code.to_string()))
    };
    let from_rate = rate_of(from)?;
    let to_rate = rate_of(to)?;
    let out_of_range = || CurrencyError::OutOfRange(amount);
    let rate = to_rate.checked_div(from_rate).ok_or_else(out_of_range)?;
    let result = to_decimal(amount)
        .and_then(|a| a.checked_div(from_rate))
        .and_then(|a| a.checked_mul(to_rate))
        .ok_or_else(out_of_range)?;

    Ok(Conversion {
        amount,
        from: from.to_string(),
        to: to.to_string(),
        rate: rate.round_dp(6).to_f64().unwrap_or_default(),
        result: round_money(result),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn table(rates: &[(&str, f64)]) -> RateTable {
        RateTable {
            base: "THB".into(),
            rates: rates.iter().map(|(c, r)| (c.to_string(), *r)).collect(),
            fetched_at: 0,
            stale: false,
        }
    }

    #[test]
    fn test_convert_with_rates() {
        let t = table(&[("THB", 1.0), ("USD", 0.028), ("EUR", 0.025)]);
        let c = convert_with(&t, 1000.0, "THB", "USD").unwrap();
        assert_eq!(c.result, 28.0);

        let c = convert_with(&t, 28.0, "USD", "THB").unwrap();
        assert_eq!(c.result, 1000.0);

        // 100 / 0.028 * 0.025 = 89.2857...
        let c = convert_with(&t, 100.0, "USD", "EUR").unwrap();
        assert_eq!(c.result, 89.29);
    }

    #[test]
    fn test_convert_missing_rate() {
        let t = table(&[("THB", 1.0)]);
        assert!(matches!(
            convert_with(&t, 1.0, "THB", "JPY"),
            Err(CurrencyError::MissingRate(code)) if code == "JPY"
        ));
    }

    #[test]
    fn test_convert_huge_amount_is_rejected() {
        let t = table(&[("THB", 1.0), ("USD", 0.028)]);
        // Beyond Decimal's range
        assert!(matches!(
            convert_with(&t, 1e30, "THB", "USD"),
            Err(CurrencyError::OutOfRange(_))
        ));
        // Representable, but dividing by a small rate overflows
        assert!(matches!(
            convert_with(&t, 7e28, "USD", "THB"),
            Err(CurrencyError::OutOfRange(_))
        ));

        let err = shared::error::AppError::from(CurrencyError::OutOfRange(1e30));
        assert_eq!(err.code, shared::error::ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_same_currency_huge_amount_is_rejected() {
        let service = CurrencyService::new("http://127.0.0.1:9/unused", "THB", 3600);
        assert!(matches!(
            service.convert(1e30, "THB", "THB").await,
            Err(CurrencyError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" usd ").unwrap(), "USD");
        assert!(matches!(normalize_code("XAU"), Err(CurrencyError::Unsupported(_))));
    }

    #[tokio::test]
    async fn test_same_currency_is_identity() {
        let service = CurrencyService::new("http://127.0.0.1:9/unused", "THB", 3600);
        let c = service.convert(1234.567, "thb", "THB").await.unwrap();
        assert_eq!(c.result, 1234.57);
        assert_eq!(c.rate, 1.0);
    }

    #[tokio::test]
    async fn test_fetch_and_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest/THB"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": "success",
                "rates": { "THB": 1.0, "USD": 0.03, "EUR": 0.025, "XAU": 0.00001 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = CurrencyService::new(format!("{}/latest/THB", server.uri()), "THB", 3600);
        let first = service.rates().await;
        assert!(!first.stale);
        assert_eq!(first.rates.get("USD"), Some(&0.03));
        assert!(!first.rates.contains_key("XAU"));

        // Served from cache; the mock's expect(1) verifies on drop
        let c = service.convert(1000.0, "THB", "USD").await.unwrap();
        assert_eq!(c.result, 30.0);
    }

    #[tokio::test]
    async fn test_fallback_when_source_down() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let service = CurrencyService::new(server.uri(), "THB", 3600);
        let table = service.rates().await;
        assert!(table.stale);
        assert_eq!(table.fetched_at, 0);
        assert_eq!(table.rates.get("USD"), Some(&0.028));
    }

    #[tokio::test]
    async fn test_stale_cache_served_on_refresh_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "rates": { "USD": 0.031 }
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        // Zero TTL forces a refetch on every call
        let service = CurrencyService::new(server.uri(), "THB", 0);
        let fresh = service.rates().await;
        assert!(!fresh.stale);

        let stale = service.rates().await;
        assert!(stale.stale);
        assert_eq!(stale.rates.get("USD"), Some(&0.031));
        assert!(stale.fetched_at > 0);
    }

    #[test]
    fn test_fallback_rebases() {
        let service = CurrencyService::new("http://127.0.0.1:9", "USD", 60);
        let table = service.fallback();
        assert_eq!(table.base, "USD");
        assert!((table.rates["USD"] - 1.0).abs() < 1e-12);
        assert!((table.rates["THB"] - 1.0 / 0.028).abs() < 1e-9);
    }
}
