use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::config::{NetworkConfig, NetworkConfigError};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("Server returned {status} for {url}")]
    Status { status: u16, url: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("Invalid network configuration: {0}")]
    Config(#[from] NetworkConfigError),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Capability to retrieve the raw bytes behind a URL
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> ClientResult<Vec<u8>>;
}

/// Plain HTTP(S) fetcher with bounded timeouts
pub struct HttpClient {
    config: NetworkConfig,
    inner: Client,
}

impl HttpClient {
    pub fn new(config: NetworkConfig) -> ClientResult<Self> {
        config.validate()?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(u64::from(config.connect_timeout_seconds)))
            .timeout(Duration::from_secs(u64::from(config.request_timeout_seconds)))
            .user_agent(config.user_agent())
            .https_only(config.https_only)
            .build()?;

        Ok(Self { config, inner })
    }

    fn validate_request(&self, url: &str) -> ClientResult<Url> {
        let parsed = Url::parse(url)?;

        if !self.config.allows_scheme(parsed.scheme()) {
            return Err(ClientError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        if parsed.host_str().is_none() {
            return Err(ClientError::InvalidUrl("No host in URL".to_string()));
        }

        Ok(parsed)
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpClient {
    async fn fetch(&self, url: &str) -> ClientResult<Vec<u8>> {
        let parsed = self.validate_request(url)?;

        let response = self.inner.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        tracing::debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(https_only: bool) -> HttpClient {
        let config = NetworkConfig {
            https_only,
            ..Default::default()
        };
        HttpClient::new(config).unwrap()
    }

    #[test]
    fn test_validate_accepts_http_and_https() {
        let client = make_client(false);

        assert!(client.validate_request("https://registers.esma.europa.eu/solr").is_ok());
        assert!(client.validate_request("http://localhost:8080/index.xml").is_ok());
    }

    #[test]
    fn test_validate_rejects_invalid_url() {
        let client = make_client(false);

        assert!(matches!(
            client.validate_request("not-a-url"),
            Err(ClientError::UrlParse(_))
        ));
    }

    #[test]
    fn test_validate_rejects_file_scheme() {
        let client = make_client(false);

        assert!(matches!(
            client.validate_request("file:///etc/passwd"),
            Err(ClientError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_https_only_rejects_http() {
        let client = make_client(true);

        assert!(matches!(
            client.validate_request("http://example.com/a.zip"),
            Err(ClientError::UnsupportedScheme(_))
        ));
        assert!(client.validate_request("https://example.com/a.zip").is_ok());
    }

    #[test]
    fn test_zero_timeout_config_rejected() {
        let config = NetworkConfig {
            connect_timeout_seconds: 0,
            ..Default::default()
        };

        assert!(matches!(
            HttpClient::new(config),
            Err(ClientError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"<response/>".to_vec()))
            .mount(&server)
            .await;

        let client = make_client(false);
        let body = client
            .fetch(&format!("{}/index.xml", server.uri()))
            .await
            .unwrap();

        assert_eq!(body, b"<response/>");
    }

    #[tokio::test]
    async fn test_fetch_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.zip"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = make_client(false);
        let result = client
            .fetch(&format!("{}/missing.zip", server.uri()))
            .await;

        assert!(matches!(result, Err(ClientError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_http_error() {
        let client = make_client(false);

        let result = client.fetch("http://127.0.0.1:1/index.xml").await;

        assert!(matches!(result, Err(ClientError::Http(_))));
    }
}
