//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchIndexClient`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    cert::CertificateValidation,
    cluster::ClusterHealthParts,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    IndexParts, OpenSearch,
};
use serde_json::{Map, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::SearchError;
use crate::interfaces::{IndexAck, SearchIndexClient};

/// The index that production events are written to.
const PRODUCTION_INDEX: &str = "machine-production";

/// Connection settings for the OpenSearch backend.
#[derive(Debug, Clone)]
pub struct OpenSearchConfig {
    /// Backend hostname.
    pub host: String,
    /// Backend port.
    pub port: u16,
    /// Basic-auth username.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
}

impl OpenSearchConfig {
    fn endpoint(&self) -> Result<Url, SearchError> {
        let raw = format!("https://{}:{}", self.host, self.port);
        Url::parse(&raw).map_err(|e| {
            SearchError::connection(format!("Invalid OpenSearch endpoint {}: {}", raw, e))
        })
    }
}

/// OpenSearch client implementation.
///
/// Connects over TLS with basic-auth credentials and certificate validation
/// enabled, and writes each production event as a new document in the
/// `machine-production` index.
pub struct OpenSearchClient {
    client: OpenSearch,
    index: String,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client from the given connection settings.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchError)` - If transport setup fails
    pub fn new(config: &OpenSearchConfig) -> Result<Self, SearchError> {
        let endpoint = config.endpoint()?;

        let conn_pool = SingleNodeConnectionPool::new(endpoint.clone());
        let transport = TransportBuilder::new(conn_pool)
            .auth(Credentials::Basic(
                config.username.clone(),
                config.password.clone(),
            ))
            .cert_validation(CertificateValidation::Default)
            .disable_proxy()
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            endpoint = %endpoint,
            index = PRODUCTION_INDEX,
            "Created OpenSearch client"
        );

        Ok(Self {
            client,
            index: PRODUCTION_INDEX.to_string(),
        })
    }

    /// Extract the `result` field from an index response body.
    fn parse_ack(body: &Value) -> IndexAck {
        let result = body
            .get("result")
            .and_then(Value::as_str)
            .unwrap_or_default();
        IndexAck::new(result)
    }
}

#[async_trait]
impl SearchIndexClient for OpenSearchClient {
    /// Submit a document as a new entry in the production index.
    ///
    /// The backend assigns the document id. The acknowledgment carries the
    /// backend's `result` field so the caller can check for `"created"`.
    async fn index_document(&self, document: &Map<String, Value>) -> Result<IndexAck, SearchError> {
        let response = self
            .client
            .index(IndexParts::Index(&self.index))
            .body(document)
            .send()
            .await
            .map_err(|e| SearchError::index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index request failed");
            return Err(SearchError::index(format!(
                "Index request failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let ack = Self::parse_ack(&body);
        debug!(index = %self.index, result = %ack.result, "Indexed document");
        Ok(ack)
    }

    /// Check cluster health. Healthy means a green or yellow cluster status.
    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let status = body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown");

        debug!(status = %status, "OpenSearch cluster health");
        Ok(status == "green" || status == "yellow")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_ack_created() {
        let body = json!({"_index": "machine-production", "result": "created"});
        assert!(OpenSearchClient::parse_ack(&body).is_created());
    }

    #[test]
    fn test_parse_ack_updated() {
        let body = json!({"result": "updated"});
        let ack = OpenSearchClient::parse_ack(&body);
        assert!(!ack.is_created());
        assert_eq!(ack.result, "updated");
    }

    #[test]
    fn test_parse_ack_missing_result() {
        let body = json!({"_index": "machine-production"});
        let ack = OpenSearchClient::parse_ack(&body);
        assert!(!ack.is_created());
        assert_eq!(ack.result, "");
    }

    #[test]
    fn test_endpoint_from_config() {
        let config = OpenSearchConfig {
            host: "search.example.com".to_string(),
            port: 25060,
            username: "admin".to_string(),
            password: "secret".to_string(),
        };

        let endpoint = config.endpoint().unwrap();
        assert_eq!(endpoint.scheme(), "https");
        assert_eq!(endpoint.port(), Some(25060));
    }
}
