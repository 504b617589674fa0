//! HTTP catalog client.

use std::fmt::Debug;

use async_trait::async_trait;
use http::StatusCode;
use serde::de::DeserializeOwned;
use showcase_core::{
    ApiConfig, CatalogError, CatalogResult, Category, CategorySlug, Product, ProductId,
    ProductPage,
};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::endpoint::Endpoint;
use crate::normalize::{normalize_message, status_error};
use crate::timeout::TimeoutConfig;

/// Errors building a client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid catalog base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Read operations against the remote catalog.
///
/// Each call is a stateless read. `limit` and `skip` are passed through
/// as given. Failures are returned as typed errors only; surfacing them to
/// the user is the presentation layer's job.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /products?limit&skip`
    async fn list_products(&self, limit: u32, skip: u32) -> CatalogResult<ProductPage>;

    /// `GET /products/{id}`. Fails with [`CatalogError::NotFound`] for unknown ids.
    async fn get_product(&self, id: ProductId) -> CatalogResult<Product>;

    /// `GET /products/categories`
    async fn list_categories(&self) -> CatalogResult<Vec<Category>>;

    /// `GET /products/category/{slug}?limit&skip`
    async fn list_products_by_category(
        &self,
        slug: &CategorySlug,
        limit: u32,
        skip: u32,
    ) -> CatalogResult<ProductPage>;
}

/// [`CatalogApi`] over HTTP.
#[derive(Clone)]
pub struct HttpCatalogClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: TimeoutConfig,
}

impl Debug for HttpCatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCatalogClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpCatalogClient {
    /// Create a client for `base_url`.
    pub fn new(base_url: &str, timeout: TimeoutConfig) -> Result<Self, ClientError> {
        let invalid = |reason: String| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let base_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("URL cannot be a base".to_string()));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(timeout.connect)
            .timeout(timeout.total)
            .user_agent(concat!("showcase/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            timeout,
        })
    }

    /// Create a client from configuration.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        Self::new(&config.base_url, TimeoutConfig::from_total(config.timeout()))
    }

    /// Get the configured base URL.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn url_for(&self, endpoint: &Endpoint<'_>) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base URL can always take path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(endpoint.segments());
        }
        if let Some((limit, skip)) = endpoint.window() {
            url.query_pairs_mut()
                .append_pair("limit", &limit.to_string())
                .append_pair("skip", &skip.to_string());
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint<'_>) -> CatalogResult<T> {
        let url = self.url_for(&endpoint);
        debug!(endpoint = endpoint.name(), %url, "sending catalog request");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let err = status_error(status.as_u16(), &body);
            warn!(endpoint = endpoint.name(), status = status.as_u16(), error = %err, "catalog request failed");
            return Err(err);
        }

        serde_json::from_slice(&body).map_err(|e| CatalogError::Decode(e.to_string()))
    }

    fn transport_error(&self, err: reqwest::Error) -> CatalogError {
        if err.is_timeout() {
            warn!(timeout = ?self.timeout.total, "catalog request timed out");
            return CatalogError::Timeout(self.timeout.total);
        }
        let status = err.status().map(|s| s.as_u16());
        warn!(error = %err, "catalog transport error");
        CatalogError::transport(normalize_message(None, Some(err.to_string())), status)
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    #[instrument(skip(self))]
    async fn list_products(&self, limit: u32, skip: u32) -> CatalogResult<ProductPage> {
        self.get_json(Endpoint::ListProducts { limit, skip }).await
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: ProductId) -> CatalogResult<Product> {
        match self.get_json(Endpoint::GetProduct(id)).await {
            Err(CatalogError::Transport {
                status: Some(status),
                ..
            }) if status == StatusCode::NOT_FOUND.as_u16() => Err(CatalogError::NotFound(id)),
            other => other,
        }
    }

    #[instrument(skip(self))]
    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        self.get_json(Endpoint::ListCategories).await
    }

    #[instrument(skip(self))]
    async fn list_products_by_category(
        &self,
        slug: &CategorySlug,
        limit: u32,
        skip: u32,
    ) -> CatalogResult<ProductPage> {
        self.get_json(Endpoint::ListProductsByCategory { slug, limit, skip })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> HttpCatalogClient {
        HttpCatalogClient::new(&server.url(), TimeoutConfig::default()).unwrap()
    }

    fn window(limit: &str, skip: &str) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), limit.into()),
            Matcher::UrlEncoded("skip".into(), skip.into()),
        ])
    }

    #[tokio::test]
    async fn test_list_products_passes_window() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/products")
            .match_query(window("30", "60"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"products":[{"id":61,"title":"Lamp","category":"home-decoration","price":12.5}],
                    "total":194,"skip":60,"limit":30}"#,
            )
            .create_async()
            .await;

        let page = client_for(&server).list_products(30, 60).await.unwrap();
        assert_eq!(page.total, 194);
        assert_eq!(page.products[0].id, ProductId::new(61));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_zero_limit_is_passed_through() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/products")
            .match_query(window("0", "0"))
            .with_status(200)
            .with_body(r#"{"products":[],"total":194}"#)
            .create_async()
            .await;

        let page = client_for(&server).list_products(0, 0).await.unwrap();
        assert!(page.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/products/9999")
            .with_status(404)
            .with_body(r#"{"message":"Product with id '9999' not found"}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .get_product(ProductId::new(9999))
            .await
            .unwrap_err();
        assert_eq!(err, CatalogError::NotFound(ProductId::new(9999)));
    }

    #[tokio::test]
    async fn test_list_categories() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/products/categories")
            .with_status(200)
            .with_body(r#"[{"slug":"beauty","name":"Beauty","url":"u"}]"#)
            .create_async()
            .await;

        let categories = client_for(&server).list_categories().await.unwrap();
        assert_eq!(categories, vec![Category {
            slug: "beauty".into(),
            name: "Beauty".into(),
            url: "u".into(),
        }]);
    }

    #[tokio::test]
    async fn test_category_slug_is_path_segment() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/products/category/mens-shirts")
            .match_query(window("30", "0"))
            .with_status(200)
            .with_body(r#"{"products":[],"total":5}"#)
            .create_async()
            .await;

        let page = client_for(&server)
            .list_products_by_category(&CategorySlug::from("mens-shirts"), 30, 0)
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_message_is_normalized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/products/categories")
            .with_status(503)
            .with_body(r#"{"message":"Service temporarily unavailable"}"#)
            .create_async()
            .await;

        let err = client_for(&server).list_categories().await.unwrap_err();
        assert_eq!(err.to_string(), "Service temporarily unavailable");
        assert_eq!(err.status(), Some(503));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/products/1")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client_for(&server).get_product(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transient() {
        // Nothing listens on port 9 on the loopback interface.
        let client = HttpCatalogClient::new("http://127.0.0.1:9", TimeoutConfig::default()).unwrap();
        let err = client.list_categories().await.unwrap_err();
        assert!(err.is_transient());
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_base_url_with_path_prefix() {
        let client = HttpCatalogClient::new("http://localhost:8080/api/", TimeoutConfig::default()).unwrap();
        let url = client.url_for(&Endpoint::ListProducts { limit: 30, skip: 0 });
        assert_eq!(url.as_str(), "http://localhost:8080/api/products?limit=30&skip=0");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpCatalogClient::new("not a url", TimeoutConfig::default()),
            Err(ClientError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            HttpCatalogClient::new("mailto:ops@example.com", TimeoutConfig::default()),
            Err(ClientError::InvalidBaseUrl { .. })
        ));
    }
}
