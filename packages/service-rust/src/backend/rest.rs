//! JSON-over-HTTP backend client.
//!
//! Resource layout, relative to the configured base URL:
//!
//! | Resource                | Methods              |
//! |-------------------------|----------------------|
//! | `products`              | GET, POST            |
//! | `products/{id}`         | GET, PATCH, DELETE   |
//! | `sales`                 | GET, POST            |
//! | `sales/{id}`            | DELETE               |
//! | `settings`              | GET, PATCH, DELETE   |
//! | `archive`               | GET, POST            |
//! | `archive/{id}/restore`  | POST                 |
//! | `archive/{id}`          | DELETE               |
//!
//! Identifiers are percent-encoded as a single path segment, so an id can
//! never address a different resource. Ids that cannot be encoded that way
//! (empty, `.` or `..`) are reported as [`RemoteError::NotFound`] without a
//! request.
//!
//! Transport errors map to [`RemoteError::Unreachable`], 404 to
//! [`RemoteError::NotFound`], any other non-success status to
//! [`RemoteError::Rejected`], and undecodable bodies to [`RemoteError::Decode`].

use std::time::Duration;

use async_trait::async_trait;
use backoffice_core::{
    ArchiveRequest, ArchivedItem, NewProduct, NewSale, Product, ProductPatch, Sale,
    SettingsPatch, SettingsRecord,
};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{ArchiveBackend, ProductBackend, RemoteError, SalesBackend, SettingsBackend};

/// Longest rejection body kept in [`RemoteError::Rejected`].
const MAX_ERROR_BODY: usize = 512;

/// REST client for the live backend.
#[derive(Debug, Clone)]
pub struct RestBackend {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl RestBackend {
    /// Creates a client for `base_url` with a per-request timeout.
    ///
    /// When `api_key` is set it is sent both as an `apikey` header and as a
    /// bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Unreachable`] if the HTTP client cannot be built
    /// or `base_url` is not an absolute http(s) URL.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Unreachable {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Self::with_client(client, base_url, api_key)
    }

    /// Creates a backend around an already configured HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Unreachable`] if `base_url` is not an absolute
    /// http(s) URL.
    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        api_key: Option<String>,
    ) -> Result<Self, RemoteError> {
        let invalid = |reason: String| RemoteError::Unreachable {
            message: format!("invalid backend URL {base_url:?}: {reason}"),
        };
        let base_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", base_url.scheme())));
        }
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Resolves `segments` below the base URL, each encoded as one path segment.
    fn url(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(RemoteError::NotFound {
                resource: format!("{}/{bad:?}", segments[0]),
            });
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::Unreachable {
                message: format!("backend URL {} cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, RemoteError> {
        let builder = self.client.request(method, self.url(segments)?);
        Ok(match &self.api_key {
            Some(key) => builder.header("apikey", key).bearer_auth(key),
            None => builder,
        })
    }

    async fn send(
        &self,
        builder: RequestBuilder,
        path: &str,
    ) -> Result<reqwest::Response, RemoteError> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        debug!(path, status = status.as_u16(), "backend responded");

        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound {
                resource: path.to_string(),
            });
        }
        if !status.is_success() {
            let mut message = response.text().await.unwrap_or_default();
            if message.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !message.is_char_boundary(cut) {
                    cut -= 1;
                }
                message.truncate(cut);
            }
            return Err(RemoteError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        path: &str,
    ) -> Result<T, RemoteError> {
        self.send(builder, path)
            .await?
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode {
                message: e.to_string(),
            })
    }

    async fn empty(&self, builder: RequestBuilder, path: &str) -> Result<(), RemoteError> {
        self.send(builder, path).await.map(|_| ())
    }
}

fn transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_decode() {
        RemoteError::Decode {
            message: err.to_string(),
        }
    } else {
        RemoteError::Unreachable {
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl ProductBackend for RestBackend {
    async fn list_products(&self) -> Result<Vec<Product>, RemoteError> {
        self.json(self.request(Method::GET, &["products"])?, "products")
            .await
    }

    async fn get_product(&self, id: &str) -> Result<Product, RemoteError> {
        let req = self.request(Method::GET, &["products", id])?;
        self.json(req, &format!("products/{id}")).await
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product, RemoteError> {
        let req = self.request(Method::POST, &["products"])?.json(product);
        self.json(req, "products").await
    }

    async fn update_product(
        &self,
        id: &str,
        patch: &ProductPatch,
    ) -> Result<Product, RemoteError> {
        let req = self.request(Method::PATCH, &["products", id])?.json(patch);
        self.json(req, &format!("products/{id}")).await
    }

    async fn delete_product(&self, id: &str) -> Result<(), RemoteError> {
        let req = self.request(Method::DELETE, &["products", id])?;
        self.empty(req, &format!("products/{id}")).await
    }
}

#[async_trait]
impl SalesBackend for RestBackend {
    async fn list_sales(&self) -> Result<Vec<Sale>, RemoteError> {
        self.json(self.request(Method::GET, &["sales"])?, "sales").await
    }

    async fn create_sale(&self, sale: &NewSale) -> Result<Sale, RemoteError> {
        let req = self.request(Method::POST, &["sales"])?.json(sale);
        self.json(req, "sales").await
    }

    async fn delete_sale(&self, id: &str) -> Result<(), RemoteError> {
        let req = self.request(Method::DELETE, &["sales", id])?;
        self.empty(req, &format!("sales/{id}")).await
    }
}

#[async_trait]
impl SettingsBackend for RestBackend {
    async fn load_settings(&self) -> Result<SettingsRecord, RemoteError> {
        self.json(self.request(Method::GET, &["settings"])?, "settings")
            .await
    }

    async fn update_settings(
        &self,
        patch: &SettingsPatch,
    ) -> Result<SettingsRecord, RemoteError> {
        let req = self.request(Method::PATCH, &["settings"])?.json(patch);
        self.json(req, "settings").await
    }

    async fn reset_settings(&self) -> Result<SettingsRecord, RemoteError> {
        self.json(self.request(Method::DELETE, &["settings"])?, "settings")
            .await
    }
}

#[async_trait]
impl ArchiveBackend for RestBackend {
    async fn list_archived(&self) -> Result<Vec<ArchivedItem>, RemoteError> {
        self.json(self.request(Method::GET, &["archive"])?, "archive")
            .await
    }

    async fn archive_product(
        &self,
        request: &ArchiveRequest,
    ) -> Result<ArchivedItem, RemoteError> {
        let req = self.request(Method::POST, &["archive"])?.json(request);
        self.json(req, "archive").await
    }

    async fn restore_archived(&self, id: &str) -> Result<Product, RemoteError> {
        let req = self.request(Method::POST, &["archive", id, "restore"])?;
        self.json(req, &format!("archive/{id}/restore")).await
    }

    async fn purge_archived(&self, id: &str) -> Result<(), RemoteError> {
        let req = self.request(Method::DELETE, &["archive", id])?;
        self.empty(req, &format!("archive/{id}")).await
    }
}
