//! HTTP client implementation and timing measurements


use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{header, Client, Method, Url};
use std::time::{Duration, Instant};
use tokio::time::timeout;

const USER_AGENT: &str = concat!("stream-readiness-tester/", env!("CARGO_PKG_VERSION"));

/// HTTP client trait for abstraction and testing
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request, timing it from dispatch to the end of the body
    async fn execute_request(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Fetch a reachability target with caching disabled
    async fn probe(&self, url: &str) -> Result<HttpResponse> {
        self.execute_request(HttpRequest::probe(url.to_string())).await
    }

    /// Upload `payload` to an echo endpoint with caching disabled
    async fn upload(&self, url: &str, payload: &[u8]) -> Result<HttpResponse> {
        self.execute_request(HttpRequest::upload(url.to_string(), payload.to_vec())).await
    }
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: Method,
    pub timeout: Option<Duration>,
    pub body: Option<Vec<u8>>,
    pub user_agent: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn new(url: String, method: Method) -> Self {
        Self {
            url,
            method,
            timeout: None,
            body: None,
            user_agent: Some(USER_AGENT.to_string()),
            headers: no_cache_headers(),
        }
    }

    /// GET request for latency sampling
    pub fn probe(url: String) -> Self {
        Self::new(url, Method::GET)
    }

    /// POST request carrying an opaque payload
    pub fn upload(url: String, payload: Vec<u8>) -> Self {
        Self::new(url, Method::POST)
            .with_header(header::CONTENT_TYPE.as_str().to_string(), "application/octet-stream".to_string())
            .with_body(payload)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: String, value: String) -> Self {
        self.headers.push((name, value));
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = Some(user_agent);
        self
    }

    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, Vec::len)
    }
}

fn no_cache_headers() -> Vec<(String, String)> {
    vec![
        (header::CACHE_CONTROL.as_str().to_string(), "no-store".to_string()),
        (header::PRAGMA.as_str().to_string(), "no-cache".to_string()),
    ]
}

/// HTTP response with timing information
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body_size: usize,
    /// Dispatch to end of body
    pub elapsed: Duration,
    pub final_url: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// reqwest-backed client used by the samplers
pub struct NetworkClient {
    client: Client,
    default_timeout: Option<Duration>,
}

impl NetworkClient {
    /// Client without a per-request deadline
    pub fn new() -> Result<Self> {
        Self::build(None)
    }

    /// Client that abandons any request running longer than `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Self::build(Some(timeout))
    }

    fn build(default_timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, default_timeout })
    }

    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout
    }
}

#[async_trait]
impl HttpClient for NetworkClient {
    async fn execute_request(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = Url::parse(&request.url)
            .map_err(|e| AppError::parse(format!("Invalid URL: {}", e)))?;

        let mut req_builder = self.client.request(request.method.clone(), url);

        for (name, value) in &request.headers {
            req_builder = req_builder.header(name, value);
        }

        if let Some(ref ua) = request.user_agent {
            req_builder = req_builder.header(header::USER_AGENT, ua);
        }

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let deadline = request.timeout.or(self.default_timeout);

        let start = Instant::now();
        let exchange = async {
            let response = req_builder.send().await?;
            let status_code = response.status().as_u16();
            let final_url = response.url().to_string();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status_code, final_url, body.len()))
        };

        let (status_code, final_url, body_size) = match deadline {
            Some(limit) => timeout(limit, exchange)
                .await
                .map_err(|_| AppError::timeout(format!("Request to {} exceeded {:?}", request.url, limit)))??,
            None => exchange.await?,
        };
        let elapsed = start.elapsed();

        Ok(HttpResponse {
            status_code,
            body_size,
            elapsed,
            final_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_request() {
        let request = HttpRequest::probe("https://example.com/favicon.ico".to_string());

        assert_eq!(request.method, Method::GET);
        assert!(request.body.is_none());
        assert!(request.timeout.is_none());
        assert!(request.headers.contains(&("cache-control".to_string(), "no-store".to_string())));
        assert!(request.headers.contains(&("pragma".to_string(), "no-cache".to_string())));
    }

    #[test]
    fn test_upload_request() {
        let request = HttpRequest::upload("https://example.com/post".to_string(), vec![0u8; 2048]);

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body_len(), 2048);
        assert!(request.headers.iter().any(|(k, v)| k == "content-type" && v == "application/octet-stream"));
    }

    #[test]
    fn test_request_builder_pattern() {
        let request = HttpRequest::probe("https://example.com".to_string())
            .with_timeout(Duration::from_secs(5))
            .with_header("Accept".to_string(), "*/*".to_string())
            .with_user_agent("test-agent".to_string());

        assert_eq!(request.timeout, Some(Duration::from_secs(5)));
        assert_eq!(request.headers.len(), 3);
        assert_eq!(request.user_agent, Some("test-agent".to_string()));
    }

    #[test]
    fn test_response_success_range() {
        let mut response = HttpResponse {
            status_code: 200,
            body_size: 0,
            elapsed: Duration::from_millis(10),
            final_url: "https://example.com".to_string(),
        };
        assert!(response.is_success());

        response.status_code = 204;
        assert!(response.is_success());

        response.status_code = 301;
        assert!(!response.is_success());

        response.status_code = 503;
        assert!(!response.is_success());
    }

    #[test]
    fn test_network_client_creation() {
        let client = NetworkClient::new().unwrap();
        assert_eq!(client.default_timeout(), None);

        let client = NetworkClient::with_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(client.default_timeout(), Some(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_invalid_url_is_parse_error() {
        let client = NetworkClient::new().unwrap();
        let error = client.probe("not-a-valid-url").await.unwrap_err();
        assert!(matches!(error, AppError::Parse(_)));
    }
}
