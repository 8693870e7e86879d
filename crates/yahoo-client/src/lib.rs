use analysis_core::{AnalysisError, FundamentalsSnapshot, MarketDataProvider, NewsProvider, Period, PriceSeries};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub mod response;

pub use response::{is_invalid_crumb, parse_chart, parse_crumb, parse_quote_summary, parse_search_news};

const BASE_URL: &str = "https://query2.finance.yahoo.com";
/// Sets the session cookie the crumb is bound to
const COOKIE_URL: &str = "https://fc.yahoo.com";
const REFERER: &str = "https://finance.yahoo.com/";
const QUOTE_SUMMARY_MODULES: &str = "financialData,defaultKeyStatistics,summaryDetail,assetProfile,price";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const MAX_ATTEMPTS: u32 = 3;

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests: max_requests.max(1),
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            let oldest = match ts.front() {
                Some(&oldest) if ts.len() >= self.max_requests => oldest,
                _ => {
                    ts.push_back(now);
                    return;
                }
            };

            // wait until the oldest request leaves the window
            let sleep_dur = (oldest + self.window).saturating_duration_since(now) + Duration::from_millis(50);
            drop(ts);
            tracing::debug!("Rate limiter: waiting {:.1}s for Yahoo slot", sleep_dur.as_secs_f64());
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

/// Yahoo Finance chart, quoteSummary and search endpoints behind the provider traits.
///
/// quoteSummary needs a session cookie plus a matching `crumb` query parameter. The client
/// keeps cookies in its own jar, fetches the crumb on first use and shares it between clones.
#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    cookie_url: String,
    client: Client,
    rate_limiter: RateLimiter,
    crumb: Arc<Mutex<Option<String>>>,
}

/// Body of a successful response. Yahoo reports unknown symbols as 404 with a JSON error body
/// the parsers understand, so that status passes through too.
fn checked_body(status: StatusCode, body: String) -> Result<String, AnalysisError> {
    if !status.is_success() && status != StatusCode::NOT_FOUND {
        return Err(AnalysisError::Upstream(format!("HTTP {}: {}", status, body)));
    }
    Ok(body)
}

impl YahooClient {
    /// Client against the public host. `YAHOO_RATE_LIMIT` sets requests per minute (default 60),
    /// `YAHOO_BASE_URL` overrides the host and `YAHOO_COOKIE_URL` the session cookie endpoint.
    pub fn new() -> Self {
        let rate_limit: usize = std::env::var("YAHOO_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);
        let base_url = std::env::var("YAHOO_BASE_URL").unwrap_or_else(|_| BASE_URL.to_string());

        let client = Self::with_base_url(base_url, rate_limit);
        match std::env::var("YAHOO_COOKIE_URL") {
            Ok(url) => client.with_cookie_url(url),
            Err(_) => client,
        }
    }

    pub fn with_base_url(base_url: impl Into<String>, requests_per_minute: usize) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cookie_url: COOKIE_URL.to_string(),
            client,
            rate_limiter: RateLimiter::new(requests_per_minute, Duration::from_secs(60)),
            crumb: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_cookie_url(mut self, cookie_url: impl Into<String>) -> Self {
        self.cookie_url = cookie_url.into();
        self
    }

    /// Send a request with rate limiting and automatic 429 retry.
    async fn send_request(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, AnalysisError> {
        let request = builder.build().map_err(|e| AnalysisError::Upstream(e.to_string()))?;

        for attempt in 0..MAX_ATTEMPTS {
            self.rate_limiter.acquire().await;
            let req_clone = request
                .try_clone()
                .ok_or_else(|| AnalysisError::Upstream("Cannot clone request".to_string()))?;
            let response = self
                .client
                .execute(req_clone)
                .await
                .map_err(|e| AnalysisError::Upstream(e.to_string()))?;

            if response.status().as_u16() != 429 {
                return Ok(response);
            }

            let wait_secs = 5u64 * (attempt as u64 + 1);
            tracing::warn!("Yahoo 429 rate limited, waiting {}s before retry {}/{}", wait_secs, attempt + 1, MAX_ATTEMPTS);
            tokio::time::sleep(Duration::from_secs(wait_secs)).await;
        }

        Err(AnalysisError::Upstream(format!("Rate limited by Yahoo after {} retries", MAX_ATTEMPTS)))
    }

    /// GET a URL and return status and body, whatever the status
    async fn get_raw(&self, url: &str, query: &[(&str, String)]) -> Result<(StatusCode, String), AnalysisError> {
        let builder = self.client.get(url).header(header::REFERER, REFERER).query(query);
        let response = self.send_request(builder).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::Upstream(e.to_string()))?;
        Ok((status, body))
    }

    /// GET a URL and return the body of a successful response
    async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, AnalysisError> {
        let (status, body) = self.get_raw(url, query).await?;
        checked_body(status, body)
    }

    /// Cached session crumb. Handshakes when none is cached, or when the cached one is the
    /// crumb the caller just saw rejected; a crumb already replaced by another task is reused.
    async fn session_crumb(&self, rejected: Option<&str>) -> Result<String, AnalysisError> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_deref().filter(|c| Some(*c) != rejected) {
            return Ok(crumb.to_string());
        }
        *cached = None;

        // the cookie host answers with an error status but still sets the cookie
        let cookie_request = self.client.get(&self.cookie_url).header(header::REFERER, REFERER);
        if let Err(e) = self.send_request(cookie_request).await {
            tracing::warn!("Yahoo cookie request failed: {}", e);
        }

        let body = self
            .get_text(&format!("{}/v1/test/getcrumb", self.base_url), &[])
            .await?;
        let crumb = parse_crumb(&body)?;
        tracing::debug!("Obtained Yahoo session crumb");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    /// Daily bars for a symbol over the given range
    pub async fn get_chart(&self, symbol: &str, period: Period) -> Result<PriceSeries, AnalysisError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let body = self
            .get_text(&url, &[("range", period.as_str().to_string()), ("interval", "1d".to_string())])
            .await?;
        let series = parse_chart(symbol, &body)?;
        tracing::debug!("Fetched {} bars for {} ({})", series.len(), symbol, period);
        Ok(series)
    }

    /// Fundamentals from quoteSummary. A rejected crumb triggers one fresh handshake and retry.
    pub async fn get_quote_summary(&self, symbol: &str) -> Result<FundamentalsSnapshot, AnalysisError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, symbol);
        let mut rejected: Option<String> = None;

        loop {
            let crumb = self.session_crumb(rejected.as_deref()).await?;
            let query = [("modules", QUOTE_SUMMARY_MODULES.to_string()), ("crumb", crumb.clone())];
            let (status, body) = self.get_raw(&url, &query).await?;

            if rejected.is_none() && is_invalid_crumb(status.as_u16(), &body) {
                tracing::warn!("Yahoo rejected the session crumb for {}, refreshing", symbol);
                rejected = Some(crumb);
                continue;
            }

            return parse_quote_summary(symbol, &checked_body(status, body)?);
        }
    }

    /// Recent news titles mentioning the symbol
    pub async fn get_news_titles(&self, symbol: &str, limit: usize) -> Result<Vec<String>, AnalysisError> {
        let url = format!("{}/v1/finance/search", self.base_url);
        let body = self
            .get_text(
                &url,
                &[
                    ("q", symbol.to_string()),
                    ("newsCount", limit.to_string()),
                    ("quotesCount", "0".to_string()),
                ],
            )
            .await?;
        parse_search_news(&body, limit)
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn price_history(&self, symbol: &str, period: Period) -> Result<PriceSeries, AnalysisError> {
        self.get_chart(symbol, period).await
    }

    async fn fundamentals(&self, symbol: &str) -> Result<FundamentalsSnapshot, AnalysisError> {
        self.get_quote_summary(symbol).await
    }
}

#[async_trait]
impl NewsProvider for YahooClient {
    async fn headlines(&self, symbol: &str, limit: usize) -> Result<Vec<String>, AnalysisError> {
        self.get_news_titles(symbol, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_rate_limiter_admits_up_to_limit_without_waiting() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let started = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(limiter.timestamps.lock().await.len(), 3);
    }

    #[tokio::test]
    async fn test_rate_limiter_waits_for_window() {
        let limiter = RateLimiter::new(1, Duration::from_millis(200));
        let started = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[test]
    fn test_zero_limit_is_clamped() {
        let limiter = RateLimiter::new(0, Duration::from_secs(60));
        assert_eq!(limiter.max_requests, 1);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = YahooClient::with_base_url("http://localhost:8080/", 10);
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_upstream() {
        let client = YahooClient::with_base_url("http://127.0.0.1:9", 10);
        let err = client.get_chart("NVDA", Period::OneMonth).await.unwrap_err();
        assert!(err.is_upstream());
    }

    const INVALID_CRUMB: &str =
        r#"{"finance":{"result":null,"error":{"code":"Unauthorized","description":"Invalid Crumb"}}}"#;
    const SUMMARY: &str = r#"{"quoteSummary":{"result":[{"price":{"longName":"Apple Inc."}}],"error":null}}"#;

    /// Minimal HTTP/1.1 stand-in for Yahoo: getcrumb hands out `issued` in order (repeating the
    /// last), quoteSummary only accepts `accepted`. Returns the base URL and the getcrumb hit count.
    async fn serve_crumb_stub(issued: &'static [&'static str], accepted: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let crumb_hits = Arc::new(AtomicUsize::new(0));
        let hits = crumb_hits.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let hits = hits.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let mut read = 0;
                    while read < buf.len() {
                        let n = socket.read(&mut buf[read..]).await.unwrap_or(0);
                        read += n;
                        if n == 0 || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                    let request = String::from_utf8_lossy(&buf[..read]).to_string();
                    let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                    let (status, body) = if path.starts_with("/v1/test/getcrumb") {
                        let n = hits.fetch_add(1, Ordering::SeqCst);
                        ("200 OK", issued[n.min(issued.len() - 1)].to_string())
                    } else if path.starts_with("/v10/finance/quoteSummary") {
                        if path.contains(&format!("crumb={}", accepted)) {
                            ("200 OK", SUMMARY.to_string())
                        } else {
                            ("401 Unauthorized", INVALID_CRUMB.to_string())
                        }
                    } else {
                        ("404 Not Found", String::new())
                    };

                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nSet-Cookie: A3=session; Path=/\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (base, crumb_hits)
    }

    fn stub_client(base: &str) -> YahooClient {
        YahooClient::with_base_url(base, 600).with_cookie_url(format!("{}/cookie", base))
    }

    #[test]
    fn test_checked_body() {
        assert!(checked_body(StatusCode::OK, "{}".to_string()).is_ok());
        assert!(checked_body(StatusCode::NOT_FOUND, "{}".to_string()).is_ok());

        let err = checked_body(StatusCode::UNAUTHORIZED, INVALID_CRUMB.to_string()).unwrap_err();
        assert!(err.is_upstream());
        assert!(err.to_string().contains("Invalid Crumb"));
    }

    #[tokio::test]
    async fn test_quote_summary_refreshes_rejected_crumb() {
        let (base, crumb_hits) = serve_crumb_stub(&["expired", "fresh"], "fresh").await;
        let client = stub_client(&base);

        let f = client.get_quote_summary("AAPL").await.unwrap();
        assert_eq!(f.long_name.as_deref(), Some("Apple Inc."));
        assert_eq!(crumb_hits.load(Ordering::SeqCst), 2);

        // the refreshed crumb is cached and shared by clones
        client.clone().get_quote_summary("AAPL").await.unwrap();
        assert_eq!(crumb_hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_quote_summary_gives_up_after_one_refresh() {
        let (base, crumb_hits) = serve_crumb_stub(&["expired"], "fresh").await;
        let client = stub_client(&base);

        let err = client.get_quote_summary("AAPL").await.unwrap_err();
        assert!(err.is_upstream());
        assert!(err.to_string().contains("401"));
        assert_eq!(crumb_hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unusable_crumb_is_upstream() {
        let (base, _) = serve_crumb_stub(&["<html>blocked</html>"], "fresh").await;
        let err = stub_client(&base).get_quote_summary("AAPL").await.unwrap_err();
        assert!(err.to_string().contains("unusable crumb"));
    }
}
