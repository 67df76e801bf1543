//! Yahoo Finance adapter over the public chart v8 and quoteSummary v10
//! endpoints.
//!
//! Chart payloads arrive column-major with explicit nulls, which is exactly
//! the [`RawTable`] shape; decoding keeps the nulls so the normalizer makes
//! the drop/keep decision in one place.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::http_client::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::provider::{FastQuote, MarketDataProvider, ProviderError};
use crate::retry::RetryConfig;
use crate::{Metadata, Period, RawTable, Symbol, UtcDateTime};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; tickerscope/0.1)";
const QUOTE_SUMMARY_MODULES: &str = "price,summaryDetail,defaultKeyStatistics,assetProfile";

/// Yahoo endpoint and transport policy.
#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub retry: RetryConfig,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://query1.finance.yahoo.com"),
            timeout_ms: 30_000,
            retry: RetryConfig::default(),
        }
    }
}

/// Yahoo Finance market-data provider.
#[derive(Clone)]
pub struct YahooProvider {
    config: YahooConfig,
    http: Arc<dyn HttpClient>,
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new(YahooConfig::default())
    }
}

impl YahooProvider {
    pub fn new(config: YahooConfig) -> Self {
        Self {
            config,
            http: Arc::new(ReqwestHttpClient::new()),
        }
    }

    /// Swap the transport, mainly for offline tests.
    pub fn with_http_client(config: YahooConfig, http: Arc<dyn HttpClient>) -> Self {
        Self { config, http }
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ProviderError> {
        let retry = &self.config.retry;
        let mut attempt = 0_u32;

        loop {
            let outcome = self.http.execute(request.clone()).await;
            let can_retry = retry.enabled && attempt < retry.max_retries;

            match outcome {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) if can_retry && retry.should_retry_status(response.status) => {
                    tokio::time::sleep(retry.delay_for_attempt(attempt)).await;
                    attempt += 1;
                }
                Ok(response) if response.status == 429 => {
                    return Err(ProviderError::rate_limited(format!(
                        "upstream returned status {}",
                        response.status
                    )));
                }
                Ok(response) => {
                    return Err(ProviderError::unavailable(format!(
                        "upstream returned status {}",
                        response.status
                    )));
                }
                Err(error) if can_retry && error.retryable() => {
                    tokio::time::sleep(retry.delay_for_attempt(attempt)).await;
                    attempt += 1;
                }
                Err(error) => return Err(ProviderError::unavailable(error.message().to_owned())),
            }
        }
    }

    fn chart_request(&self, symbol: &Symbol, range: &str, interval: &str) -> HttpRequest {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval={}&includePrePost=false",
            self.config.base_url,
            urlencoding::encode(symbol.as_str()),
            range,
            interval,
        );
        HttpRequest::get(url)
            .with_header("user-agent", USER_AGENT)
            .with_timeout_ms(self.config.timeout_ms)
    }

    async fn fetch_chart(
        &self,
        symbol: &Symbol,
        range: &str,
        interval: &str,
    ) -> Result<ChartResult, ProviderError> {
        let response = self.execute(self.chart_request(symbol, range, interval)).await?;
        let decoded: ChartResponse = serde_json::from_str(&response.body)
            .map_err(|error| ProviderError::decode(format!("chart payload: {error}")))?;

        if let Some(error) = decoded.chart.error {
            return Err(ProviderError::unavailable(format!(
                "{}: {}",
                error.code, error.description
            )));
        }

        decoded
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
            .ok_or_else(|| ProviderError::decode("chart response carries no result"))
    }
}

impl MarketDataProvider for YahooProvider {
    fn history<'a>(
        &'a self,
        symbol: &'a Symbol,
        period: Period,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<RawTable, ProviderError>> + Send + 'a>,
    > {
        Box::pin(async move {
            let result = self
                .fetch_chart(symbol, period.as_str(), period.native_interval())
                .await?;
            Ok(chart_to_table(result))
        })
    }

    fn info<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Metadata, ProviderError>> + Send + 'a>,
    > {
        Box::pin(async move {
            let url = format!(
                "{}/v10/finance/quoteSummary/{}?modules={}",
                self.config.base_url,
                urlencoding::encode(symbol.as_str()),
                QUOTE_SUMMARY_MODULES,
            );
            let request = HttpRequest::get(url)
                .with_header("user-agent", USER_AGENT)
                .with_timeout_ms(self.config.timeout_ms);

            let response = self.execute(request).await?;
            let decoded: Value = serde_json::from_str(&response.body)
                .map_err(|error| ProviderError::decode(format!("quoteSummary payload: {error}")))?;
            Ok(flatten_quote_summary(&decoded))
        })
    }

    fn fast_quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<FastQuote, ProviderError>> + Send + 'a>,
    > {
        Box::pin(async move {
            // Fine-grained probe: a one-day, one-minute chart carries both
            // the market price and the freshest intraday close.
            let result = self.fetch_chart(symbol, "1d", "1m").await?;

            let meta_price = result
                .meta
                .as_ref()
                .and_then(|meta| meta.regular_market_price)
                .filter(|price| price.is_finite() && *price > 0.0);
            let last_close = last_intraday_close(&result);

            let last_price = meta_price.or(last_close).ok_or_else(|| {
                ProviderError::decode("fast quote carries no usable price")
            })?;

            let as_of = result
                .meta
                .as_ref()
                .and_then(|meta| meta.regular_market_time)
                .and_then(|secs| UtcDateTime::from_unix_timestamp(secs).ok())
                .unwrap_or_else(UtcDateTime::now);

            Ok(FastQuote {
                symbol: symbol.clone(),
                last_price,
                as_of,
            })
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<Option<i64>>>,
    indicators: Option<ChartIndicators>,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    #[serde(rename = "regularMarketTime")]
    regular_market_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuoteBlock>,
}

#[derive(Debug, Deserialize, Default)]
struct ChartQuoteBlock {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

fn chart_to_table(result: ChartResult) -> RawTable {
    let index = result
        .timestamp
        .unwrap_or_default()
        .into_iter()
        .map(|secs| secs.and_then(|s| UtcDateTime::from_unix_timestamp(s).ok()))
        .collect();

    let quote = result
        .indicators
        .and_then(|indicators| indicators.quote.into_iter().next())
        .unwrap_or_default();

    let mut table = RawTable::empty().with_index(index);
    for (name, cells) in [
        ("open", quote.open),
        ("high", quote.high),
        ("low", quote.low),
        ("close", quote.close),
        ("volume", quote.volume),
    ] {
        if let Some(cells) = cells {
            table = table.with_numbers(name, cells);
        }
    }
    table
}

fn last_intraday_close(result: &ChartResult) -> Option<f64> {
    result
        .indicators
        .as_ref()
        .and_then(|indicators| indicators.quote.first())
        .and_then(|quote| quote.close.as_ref())
        .and_then(|closes| {
            closes
                .iter()
                .rev()
                .filter_map(|close| *close)
                .find(|close| close.is_finite() && *close > 0.0)
        })
}

/// Flatten a quoteSummary response into a flat metadata mapping.
///
/// Module payloads wrap numbers as `{"raw": ..., "fmt": ...}` objects; the
/// raw value is kept. Nested objects and arrays are skipped, scalars pass
/// through as-is.
fn flatten_quote_summary(payload: &Value) -> Metadata {
    let mut metadata = Metadata::new();

    let Some(modules) = payload
        .pointer("/quoteSummary/result/0")
        .and_then(Value::as_object)
    else {
        return metadata;
    };

    for module in modules.values() {
        let Some(fields) = module.as_object() else {
            continue;
        };
        for (key, value) in fields {
            let flattened = match value {
                Value::Object(object) => object.get("raw").cloned(),
                Value::Array(_) => None,
                Value::Null => None,
                scalar => Some(scalar.clone()),
            };
            if let Some(flattened) = flattened {
                metadata.insert(key.clone(), flattened);
            }
        }
    }

    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::HttpError;
    use crate::normalize::normalize;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    /// Replays canned responses in order; repeats the last one when drained.
    struct ScriptedHttpClient {
        responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
        requests: Mutex<Vec<String>>,
    }

    impl ScriptedHttpClient {
        fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn seen_urls(&self) -> Vec<String> {
            self.requests.lock().expect("lock").clone()
        }
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests.lock().expect("lock").push(request.url);
            let mut responses = self.responses.lock().expect("lock");
            let outcome = if responses.len() > 1 {
                responses.remove(0)
            } else {
                responses[0].clone()
            };
            Box::pin(async move { outcome })
        }
    }

    fn provider_with(responses: Vec<Result<HttpResponse, HttpError>>) -> (YahooProvider, Arc<ScriptedHttpClient>) {
        let http = Arc::new(ScriptedHttpClient::new(responses));
        let mut config = YahooConfig::default();
        config.retry.backoff = crate::retry::Backoff::Fixed {
            delay: std::time::Duration::from_millis(1),
        };
        let provider = YahooProvider::with_http_client(config, http.clone());
        (provider, http)
    }

    fn chart_body() -> String {
        serde_json::json!({
            "chart": {
                "result": [{
                    "meta": {"regularMarketPrice": 102.5, "regularMarketTime": 1_704_153_600},
                    "timestamp": [1_704_067_200, 1_704_153_600],
                    "indicators": {"quote": [{
                        "open": [100.0, 101.0],
                        "high": [101.0, 103.0],
                        "low": [99.0, 100.5],
                        "close": [100.5, 102.5],
                        "volume": [1_000.0, null]
                    }]}
                }],
                "error": null
            }
        })
        .to_string()
    }

    fn symbol(value: &str) -> Symbol {
        Symbol::parse(value).expect("symbol")
    }

    #[tokio::test]
    async fn history_decodes_chart_into_raw_table() {
        let (provider, http) = provider_with(vec![Ok(HttpResponse::ok_json(chart_body()))]);

        let table = provider
            .history(&symbol("AAPL"), Period::OneMonth)
            .await
            .expect("history");
        assert_eq!(table.row_count(), 2);

        let series = normalize(&table).expect("normalizes");
        assert_eq!(series.closes(), vec![100.5, 102.5]);
        assert_eq!(series.bars()[1].volume, None);

        let url = &http.seen_urls()[0];
        assert!(url.contains("/v8/finance/chart/AAPL"));
        assert!(url.contains("range=1mo"));
        assert!(url.contains("interval=1d"));
    }

    #[tokio::test]
    async fn history_surfaces_chart_error() {
        let body = serde_json::json!({
            "chart": {"result": null, "error": {"code": "Not Found", "description": "No data found"}}
        })
        .to_string();
        let (provider, _) = provider_with(vec![Ok(HttpResponse::ok_json(body))]);

        let err = provider
            .history(&symbol("ZZZZINVALD"), Period::OneYear)
            .await
            .expect_err("must fail");
        assert!(err.message().contains("No data found"));
    }

    #[tokio::test]
    async fn fast_quote_prefers_market_price() {
        let (provider, http) = provider_with(vec![Ok(HttpResponse::ok_json(chart_body()))]);

        let quote = provider.fast_quote(&symbol("AAPL")).await.expect("quote");
        assert_eq!(quote.last_price, 102.5);
        assert_eq!(quote.as_of.format_rfc3339(), "2024-01-02T00:00:00Z");

        let url = &http.seen_urls()[0];
        assert!(url.contains("range=1d"));
        assert!(url.contains("interval=1m"));
    }

    #[tokio::test]
    async fn fast_quote_falls_back_to_last_intraday_close() {
        let body = serde_json::json!({
            "chart": {
                "result": [{
                    "meta": {},
                    "timestamp": [1, 2, 3],
                    "indicators": {"quote": [{"close": [10.0, 11.0, null]}]}
                }],
                "error": null
            }
        })
        .to_string();
        let (provider, _) = provider_with(vec![Ok(HttpResponse::ok_json(body))]);

        let quote = provider.fast_quote(&symbol("AAPL")).await.expect("quote");
        assert_eq!(quote.last_price, 11.0);
    }

    #[tokio::test]
    async fn retries_transient_status_then_succeeds() {
        let (provider, http) = provider_with(vec![
            Ok(HttpResponse {
                status: 503,
                body: String::new(),
            }),
            Ok(HttpResponse::ok_json(chart_body())),
        ]);

        provider
            .history(&symbol("AAPL"), Period::OneYear)
            .await
            .expect("second attempt succeeds");
        assert_eq!(http.seen_urls().len(), 2);
    }

    #[tokio::test]
    async fn does_not_retry_hard_status() {
        let (provider, http) = provider_with(vec![Ok(HttpResponse {
            status: 404,
            body: String::new(),
        })]);

        let err = provider
            .history(&symbol("AAPL"), Period::OneYear)
            .await
            .expect_err("must fail");
        assert!(err.message().contains("404"));
        assert_eq!(http.seen_urls().len(), 1);
    }

    #[tokio::test]
    async fn info_flattens_raw_wrappers() {
        let body = serde_json::json!({
            "quoteSummary": {
                "result": [{
                    "summaryDetail": {
                        "marketCap": {"raw": 3.1e12, "fmt": "3.1T"},
                        "trailingPE": {"raw": 29.4, "fmt": "29.40"},
                        "beta": null
                    },
                    "assetProfile": {
                        "sector": "Technology",
                        "companyOfficers": []
                    }
                }],
                "error": null
            }
        })
        .to_string();
        let (provider, _) = provider_with(vec![Ok(HttpResponse::ok_json(body))]);

        let metadata = provider.info(&symbol("AAPL")).await.expect("info");
        assert_eq!(metadata["marketCap"], serde_json::json!(3.1e12));
        assert_eq!(metadata["trailingPE"], serde_json::json!(29.4));
        assert_eq!(metadata["sector"], serde_json::json!("Technology"));
        assert!(!metadata.contains_key("companyOfficers"));
        assert!(!metadata.contains_key("beta"));
    }
}
