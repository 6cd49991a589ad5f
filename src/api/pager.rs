//! Paginated listings
//!
//! A [`Pager`] is a lazy, restartable sequence over a list endpoint. Nothing is
//! fetched until the consumer asks for the next item; pages are requested one
//! at a time following `nextPageToken`.

use super::client::DcClient;
use super::error::{ApiError, Result};
use futures::{Stream, TryStreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::VecDeque;

/// Default page size requested from list endpoints
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Records that can be looked up by human-readable name
pub trait Named {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

/// Lazy pull-based listing
pub struct Pager<'a, T> {
    client: &'a DcClient,
    url: String,
    items_field: &'static str,
    params: Vec<(String, String)>,
    page_size: u32,
    buffer: VecDeque<T>,
    next_token: Option<String>,
    exhausted: bool,
}

impl<'a, T: DeserializeOwned> Pager<'a, T> {
    /// List `url`, reading records from the `items_field` array of each page
    pub fn new(client: &'a DcClient, url: String, items_field: &'static str) -> Self {
        Self {
            client,
            url,
            items_field,
            params: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            buffer: VecDeque::new(),
            next_token: None,
            exhausted: false,
        }
    }

    /// Add a query parameter sent with every page request
    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Start over from the first page
    pub fn restart(&mut self) {
        self.buffer.clear();
        self.next_token = None;
        self.exhausted = false;
    }

    /// Next record, fetching another page when the current one is used up
    pub async fn try_next(&mut self) -> Result<Option<T>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            if self.exhausted {
                return Ok(None);
            }
            self.fetch_page().await?;
        }
    }

    /// Turn the pager into a stream of records
    pub fn into_stream(self) -> impl Stream<Item = Result<T>> + 'a
    where
        T: 'a,
    {
        futures::stream::try_unfold(self, |mut pager| async move {
            Ok(pager.try_next().await?.map(|item| (item, pager)))
        })
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let url = self.page_url();
        let response: Value = self.client.get(&url).await?;

        let items = response
            .get(self.items_field)
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        for item in items {
            self.buffer.push_back(serde_json::from_value(item)?);
        }

        self.next_token = response
            .get("nextPageToken")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        self.exhausted = self.next_token.is_none();

        tracing::debug!(
            "Fetched page of {} ({} buffered, more: {})",
            self.items_field,
            self.buffer.len(),
            !self.exhausted
        );
        Ok(())
    }

    fn page_url(&self) -> String {
        let mut query_parts: Vec<String> = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect();
        query_parts.push(format!("pageSize={}", self.page_size));
        if let Some(token) = &self.next_token {
            query_parts.push(format!("pageToken={}", urlencoding::encode(token)));
        }
        format!("{}?{}", self.url, query_parts.join("&"))
    }
}

/// Scan a listing for the first record called `name` and return its id.
///
/// Names are not unique remotely; the first match in iteration order wins.
pub async fn find_id_by_name<T>(pager: Pager<'_, T>, name: &str) -> Result<String>
where
    T: Named + DeserializeOwned,
{
    let kind = pager.items_field;
    let stream = pager.into_stream();
    futures::pin_mut!(stream);

    while let Some(item) = stream.try_next().await? {
        if item.name() == name {
            tracing::debug!("Resolved {} {:?} to {}", kind, name, item.id());
            return Ok(item.id().to_string());
        }
    }

    Err(ApiError::NotFound(format!("no {} named {:?}", kind, name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::test_client;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn drain(pager: &mut Pager<'_, Value>) -> Vec<String> {
        let mut ids = Vec::new();
        while let Some(item) = pager.try_next().await.unwrap() {
            ids.push(item["id"].as_str().unwrap_or_default().to_string());
        }
        ids
    }

    #[test]
    fn test_page_url_encodes_params_and_token() {
        let client = test_client("https://api.double.cloud");
        let mut pager: Pager<'_, Value> = Pager::new(&client, client.network_url("networks"), "networks")
            .param("projectId", "p 1")
            .page_size(25);
        assert_eq!(
            pager.page_url(),
            "https://api.double.cloud/network/v1/networks?projectId=p%201&pageSize=25"
        );

        pager.next_token = Some("a b/c".to_string());
        assert_eq!(
            pager.page_url(),
            "https://api.double.cloud/network/v1/networks?projectId=p%201&pageSize=25&pageToken=a%20b%2Fc"
        );
    }

    #[tokio::test]
    async fn test_restart_begins_at_first_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/network/v1/networks"))
            .and(query_param("pageSize", "1"))
            .and(query_param_is_missing("pageToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "networks": [{"id": "n1"}],
                "nextPageToken": "page 2/2"
            })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/network/v1/networks"))
            .and(query_param("pageSize", "1"))
            .and(query_param("pageToken", "page 2/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "networks": [{"id": "n2"}],
                "nextPageToken": ""
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let mut pager: Pager<'_, Value> =
            Pager::new(&client, client.network_url("networks"), "networks").page_size(1);

        assert_eq!(drain(&mut pager).await, vec!["n1", "n2"]);
        assert!(pager.try_next().await.unwrap().is_none());

        pager.restart();
        assert_eq!(drain(&mut pager).await, vec!["n1", "n2"]);
    }

    #[tokio::test]
    async fn test_nothing_fetched_until_asked() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"networks": []})))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let _pager: Pager<'_, Value> = Pager::new(&client, client.network_url("networks"), "networks");
    }
}
