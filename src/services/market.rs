use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";
const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

// Price lookups sit on the trading path, so they get a tight bound rather
// than the relaxed one the generation gateway uses.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("market data request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("market data upstream error: {0}")]
    Upstream(String),

    #[error("no valid price for symbol {0}")]
    PriceUnavailable(String),
}

/// Anything that can resolve a fresh, positive price for a symbol. The
/// portfolio service trades against this seam so tests can pin prices.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn current_price(&self, symbol: &str) -> Result<f64, MarketError>;
}

#[derive(Clone)]
pub struct YahooClient {
    http: Client,
}

impl YahooClient {
    pub fn new() -> Self {
        let http = Client::builder()
            // Yahoo rejects requests without a browser-ish user agent.
            .user_agent("Mozilla/5.0")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build http client");

        Self { http }
    }

    /// Fetch quote snapshots for a batch of tickers. Symbols the upstream
    /// doesn't recognize are simply absent from the returned map; the whole
    /// call fails only when the request itself does.
    pub async fn get_quotes(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, StockQuote>, MarketError> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let joined = symbols.join(",");
        let res = self
            .http
            .get(QUOTE_URL)
            .query(&[("symbols", joined.as_str())])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(MarketError::Upstream(format!(
                "quote request failed: {status} {body}"
            )));
        }

        let envelope = res
            .json::<QuoteEnvelope>()
            .await
            .map_err(|e| MarketError::Upstream(format!("malformed quote response: {e}")))?;

        Ok(quotes_from(envelope))
    }

    /// Resolve a company name to its ticker (e.g. "Apple" -> "AAPL").
    pub async fn search_symbol(&self, query: &str) -> Result<Option<String>, MarketError> {
        let res = self
            .http
            .get(SEARCH_URL)
            .query(&[("q", query), ("quotesCount", "1"), ("newsCount", "0")])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(MarketError::Upstream(format!(
                "search request failed: {status} {body}"
            )));
        }

        let envelope = res
            .json::<SearchEnvelope>()
            .await
            .map_err(|e| MarketError::Upstream(format!("malformed search response: {e}")))?;

        Ok(envelope.quotes.into_iter().next().map(|q| q.symbol))
    }

    /// Daily candles for a symbol between two unix timestamps (seconds).
    pub async fn get_history(
        &self,
        symbol: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<Candle>, MarketError> {
        let url = format!("{CHART_URL}/{symbol}");
        let res = self
            .http
            .get(&url)
            .query(&[
                ("period1", start.to_string()),
                ("period2", end.to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(MarketError::Upstream(format!(
                "history request failed: {status} {body}"
            )));
        }

        let envelope = res
            .json::<ChartEnvelope>()
            .await
            .map_err(|e| MarketError::Upstream(format!("malformed chart response: {e}")))?;

        Ok(candles_from(envelope))
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for YahooClient {
    async fn current_price(&self, symbol: &str) -> Result<f64, MarketError> {
        let symbols = [symbol.to_string()];
        let quotes = self.get_quotes(&symbols).await?;
        match quotes.get(symbol) {
            Some(q) if q.current_price > 0.0 => Ok(q.current_price),
            _ => Err(MarketError::PriceUnavailable(symbol.to_string())),
        }
    }
}

fn quotes_from(envelope: QuoteEnvelope) -> HashMap<String, StockQuote> {
    let mut out = HashMap::new();
    for row in envelope.quote_response.result {
        let Some(price) = row.price else {
            // Best-effort listing: skip the symbol instead of failing the batch.
            tracing::warn!(symbol = %row.symbol, "quote row has no market price, skipping");
            continue;
        };

        out.insert(
            row.symbol,
            StockQuote {
                current_price: price,
                open_price: row.open.unwrap_or_default(),
                high_price: row.high.unwrap_or_default(),
                low_price: row.low.unwrap_or_default(),
                previous_close: row.previous_close.unwrap_or_default(),
                change_percent: row.change_percent.unwrap_or_default(),
            },
        );
    }
    out
}

fn candles_from(envelope: ChartEnvelope) -> Vec<Candle> {
    let Some(result) = envelope.chart.result.into_iter().next() else {
        return vec![];
    };
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return vec![];
    };

    let mut out = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(*ts, 0)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| ts.to_string());

        let (Some(open), Some(close), Some(high), Some(low)) = (
            value_at(&quote.open, i),
            value_at(&quote.close, i),
            value_at(&quote.high, i),
            value_at(&quote.low, i),
        ) else {
            // Market holidays come back as nulls.
            continue;
        };

        out.push(Candle {
            date,
            open,
            close,
            high,
            low,
            volume: quote
                .volume
                .get(i)
                .copied()
                .flatten()
                .unwrap_or_default(),
        });
    }
    out
}

fn value_at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    pub current_price: f64,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub previous_close: f64,
    pub change_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub date: String,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: i64,
}

#[derive(Debug, Deserialize)]
struct QuoteEnvelope {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteBody,
}

#[derive(Debug, Deserialize)]
struct QuoteBody {
    #[serde(default)]
    result: Vec<QuoteRow>,
}

#[derive(Debug, Deserialize)]
struct QuoteRow {
    symbol: String,

    #[serde(rename = "regularMarketPrice")]
    price: Option<f64>,

    #[serde(rename = "regularMarketOpen")]
    open: Option<f64>,

    #[serde(rename = "regularMarketDayHigh")]
    high: Option<f64>,

    #[serde(rename = "regularMarketDayLow")]
    low: Option<f64>,

    #[serde(rename = "regularMarketPreviousClose")]
    previous_close: Option<f64>,

    #[serde(rename = "regularMarketChangePercent")]
    change_percent: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Vec<ChartResult>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize, Default)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quote_response_and_skips_priceless_rows() {
        let body = r#"{
            "quoteResponse": {
                "result": [
                    {
                        "symbol": "AAPL",
                        "regularMarketPrice": 187.5,
                        "regularMarketOpen": 185.0,
                        "regularMarketDayHigh": 188.2,
                        "regularMarketDayLow": 184.7,
                        "regularMarketPreviousClose": 186.1,
                        "regularMarketChangePercent": 0.75
                    },
                    { "symbol": "BOGUS" }
                ],
                "error": null
            }
        }"#;

        let envelope: QuoteEnvelope = serde_json::from_str(body).unwrap();
        let quotes = quotes_from(envelope);

        assert_eq!(quotes.len(), 1);
        let aapl = &quotes["AAPL"];
        assert_eq!(aapl.current_price, 187.5);
        assert_eq!(aapl.previous_close, 186.1);
        assert!(!quotes.contains_key("BOGUS"));
    }

    #[test]
    fn parses_chart_response_dropping_null_days() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1714521600, 1714608000],
                    "indicators": {
                        "quote": [{
                            "open": [169.0, null],
                            "close": [170.3, null],
                            "high": [171.0, null],
                            "low": [168.5, null],
                            "volume": [50000000, null]
                        }]
                    }
                }]
            }
        }"#;

        let envelope: ChartEnvelope = serde_json::from_str(body).unwrap();
        let candles = candles_from(envelope);

        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].close, 170.3);
        assert_eq!(candles[0].volume, 50_000_000);
    }
}
