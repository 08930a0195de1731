//! Ticker metadata (name, exchange, shares outstanding) from Yahoo Finance.

use crate::error::{DataError, Result};
use crate::model::Ticker;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

const QUOTE_URL: &str = "https://query2.finance.yahoo.com/v7/finance/quote";

/// Symbols requested per quote call.
const CHUNK_SIZE: usize = 50;

/// Registry metadata reported by the provider for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerProfile {
    /// Ticker symbol
    pub symbol: String,
    /// Long name, falling back to the short name
    pub name: Option<String>,
    /// Exchange code
    pub exchange: Option<String>,
    /// Shares outstanding
    pub shares_outstanding: Option<u64>,
}

impl TickerProfile {
    /// Convert into an active registry entry.
    pub fn into_ticker(self) -> Ticker {
        Ticker {
            symbol: self.symbol,
            company_name: self.name,
            exchange: self.exchange,
            active: true,
            shares_outstanding: self.shares_outstanding,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteEnvelope {
    quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Vec<QuoteResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResult {
    symbol: String,
    long_name: Option<String>,
    short_name: Option<String>,
    exchange: Option<String>,
    shares_outstanding: Option<f64>,
}

impl From<QuoteResult> for TickerProfile {
    fn from(quote: QuoteResult) -> Self {
        Self {
            symbol: quote.symbol,
            name: quote.long_name.or(quote.short_name),
            exchange: quote.exchange,
            shares_outstanding: quote
                .shares_outstanding
                .filter(|s| s.is_finite() && *s > 0.0)
                .map(|s| s.round() as u64),
        }
    }
}

/// Parse a Yahoo `v7/finance/quote` response body.
pub fn parse_quote_response(body: &str) -> Result<Vec<TickerProfile>> {
    let envelope: QuoteEnvelope = serde_json::from_str(body)?;
    Ok(envelope
        .quote_response
        .result
        .into_iter()
        .map(TickerProfile::from)
        .collect())
}

/// Yahoo Finance profile provider.
#[derive(Debug)]
pub struct YahooProfileProvider {
    client: reqwest::Client,
    rate_limit_delay: Duration,
}

impl YahooProfileProvider {
    /// Create a new provider with the default rate limit.
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(Duration::from_millis(250))
    }

    /// Create a new provider with custom rate limiting.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)")
            .build()?;

        Ok(Self {
            client,
            rate_limit_delay,
        })
    }

    /// Fetch profiles for the given symbols. Symbols the provider does not
    /// know are simply absent from the result.
    pub async fn fetch_profiles(&self, symbols: &[String]) -> Result<Vec<TickerProfile>> {
        if symbols.iter().any(|s| s.is_empty()) {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let mut profiles = Vec::with_capacity(symbols.len());

        for chunk in symbols.chunks(CHUNK_SIZE) {
            let response = self
                .client
                .get(QUOTE_URL)
                .query(&[("symbols", chunk.join(","))])
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(DataError::YahooApi(format!(
                    "quote request failed with status {}",
                    response.status()
                )));
            }

            let body = response.text().await?;
            let parsed = parse_quote_response(&body)?;
            debug!(requested = chunk.len(), received = parsed.len(), "fetched profiles");
            profiles.extend(parsed);

            sleep(self.rate_limit_delay).await;
        }

        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "quoteResponse": {
            "result": [
                {
                    "symbol": "AAPL",
                    "longName": "Apple Inc.",
                    "shortName": "Apple",
                    "exchange": "NMS",
                    "sharesOutstanding": 15204100096
                },
                {
                    "symbol": "XYZ",
                    "shortName": "XYZ Corp",
                    "exchange": "NYQ"
                }
            ],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_quote_response() {
        let profiles = parse_quote_response(SAMPLE).unwrap();
        assert_eq!(profiles.len(), 2);

        assert_eq!(profiles[0].symbol, "AAPL");
        assert_eq!(profiles[0].name.as_deref(), Some("Apple Inc."));
        assert_eq!(profiles[0].shares_outstanding, Some(15_204_100_096));

        // Short name fallback, unknown share count
        assert_eq!(profiles[1].name.as_deref(), Some("XYZ Corp"));
        assert_eq!(profiles[1].shares_outstanding, None);
    }

    #[test]
    fn test_profile_into_ticker() {
        let ticker = parse_quote_response(SAMPLE).unwrap().remove(0).into_ticker();
        assert!(ticker.active);
        assert_eq!(ticker.exchange.as_deref(), Some("NMS"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_quote_response("not json"),
            Err(DataError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_symbol_rejected() {
        let provider = YahooProfileProvider::new().unwrap();
        let result = provider.fetch_profiles(&[String::new()]).await;
        assert!(matches!(result, Err(DataError::InvalidSymbol(_))));
    }
}
