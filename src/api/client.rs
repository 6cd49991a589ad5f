//! DoubleCloud Client
//!
//! Main client for interacting with the DoubleCloud API, combining
//! authentication and HTTP functionality.

use super::auth::Credentials;
use super::error::{ApiError, Result};
use super::http::DcHttpClient;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.double.cloud";

/// Default interval between operation status checks
pub const DEFAULT_OPERATION_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// API service families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Network,
    ClickHouse,
    Kafka,
    Transfer,
}

impl Service {
    /// Path prefix of the service
    pub fn prefix(self) -> &'static str {
        match self {
            Service::Network => "network/v1",
            Service::ClickHouse => "clickhouse/v1",
            Service::Kafka => "kafka/v1",
            Service::Transfer => "transfer/v1",
        }
    }
}

/// Main DoubleCloud client
#[derive(Clone, Debug)]
pub struct DcClient {
    pub credentials: Credentials,
    pub http: DcHttpClient,
    pub endpoint: String,
    pub poll_interval: Duration,
}

impl DcClient {
    /// Create a new client against `endpoint`
    pub fn new(endpoint: &str, credentials: Credentials, http: DcHttpClient) -> Self {
        Self {
            credentials,
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            poll_interval: DEFAULT_OPERATION_POLL_INTERVAL,
        }
    }

    /// Override the operation poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Get the current access token
    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token().await
    }

    /// Run `call` with the current token; when the API rejects it, refresh the
    /// token once and try again
    async fn authorized<T, F, Fut>(&self, call: F) -> Result<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let token = self.get_token().await?;
        match call(token).await {
            Err(ApiError::Auth(message)) => {
                tracing::debug!("Access token rejected ({}), refreshing", message);
                let token = self.credentials.refresh_token().await?;
                call(token).await
            }
            other => other,
        }
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.authorized(|token| async move { self.http.get(url, &token).await })
            .await
    }

    /// Make a POST request
    pub async fn post<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.authorized(|token| async move { self.http.post(url, &token, body).await })
            .await
    }

    /// Make a PATCH request
    pub async fn patch<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.authorized(|token| async move { self.http.patch(url, &token, body).await })
            .await
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.authorized(|token| async move { self.http.delete(url, &token).await })
            .await
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// Build a service URL
    pub fn service_url(&self, service: Service, path: &str) -> String {
        format!("{}/{}/{}", self.endpoint, service.prefix(), path)
    }

    /// Build Network API URL
    pub fn network_url(&self, path: &str) -> String {
        self.service_url(Service::Network, path)
    }

    /// Build ClickHouse API URL
    pub fn clickhouse_url(&self, path: &str) -> String {
        self.service_url(Service::ClickHouse, path)
    }

    /// Build Kafka API URL
    pub fn kafka_url(&self, path: &str) -> String {
        self.service_url(Service::Kafka, path)
    }

    /// Build Transfer API URL
    pub fn transfer_url(&self, path: &str) -> String {
        self.service_url(Service::Transfer, path)
    }
}

/// Client with a static token, for unit tests
#[cfg(test)]
pub(crate) fn test_client(endpoint: &str) -> DcClient {
    DcClient::new(
        endpoint,
        Credentials::static_token("test-token"),
        DcHttpClient::new(DEFAULT_REQUEST_TIMEOUT).unwrap(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> DcClient {
        test_client(endpoint)
    }

    #[test]
    fn test_url_builders() {
        let c = client("https://api.double.cloud/");
        assert_eq!(c.network_url("networks/n1"), "https://api.double.cloud/network/v1/networks/n1");
        assert_eq!(c.clickhouse_url("clusters"), "https://api.double.cloud/clickhouse/v1/clusters");
        assert_eq!(c.kafka_url("clusters"), "https://api.double.cloud/kafka/v1/clusters");
        assert_eq!(
            c.transfer_url("transfers/t1:activate"),
            "https://api.double.cloud/transfer/v1/transfers/t1:activate"
        );
    }

    #[test]
    fn test_poll_interval_override() {
        let c = client(DEFAULT_ENDPOINT).with_poll_interval(Duration::from_millis(10));
        assert_eq!(c.poll_interval, Duration::from_millis(10));
    }
}
