//! Item service client: CRUD over item resources plus health.

use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::{Dispatcher, RequestOptions};
use crate::error::{Result, ServiceError};
use crate::routing::ServiceKind;

/// Item service health payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemHealth {
    /// Reported status, "healthy" when up.
    pub status: String,
    /// Service name as reported by the backend.
    pub service: String,
    /// Server timestamp, epoch seconds.
    pub timestamp: f64,
}

/// An item resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Item identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Price; carried as a JSON float by the backend.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Category label.
    pub category: String,
    /// Creation timestamp as reported by the backend.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Payload for creating or updating an item.
#[derive(Debug, Clone, Serialize)]
pub struct NewItem {
    /// Display name.
    pub name: String,
    /// Optional free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Category label.
    pub category: String,
}

/// Deletion acknowledgement.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteResponse {
    /// Human-readable outcome.
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CategoriesResponse {
    categories: Vec<String>,
}

/// Typed client for the item service.
#[derive(Debug, Clone)]
pub struct ItemClient {
    dispatcher: Dispatcher,
}

impl ItemClient {
    /// Wrap a dispatcher.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Probe the item service health endpoint.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<ItemHealth> {
        let endpoint = "/health";
        let response = self.dispatcher.get(endpoint).await?;
        expect_success(&response, endpoint)?;
        decode(response, endpoint).await
    }

    /// List all items.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Item>> {
        let endpoint = "/api/items";
        let response = self.dispatcher.get(endpoint).await?;
        expect_success(&response, endpoint)?;

        let items: Vec<Item> = decode(response, endpoint).await?;
        debug!(count = items.len(), "listed items");
        Ok(items)
    }

    /// Fetch a single item by identifier.
    #[instrument(skip(self))]
    pub async fn get(&self, id: u64) -> Result<Item> {
        let endpoint = format!("/api/items/{id}");
        let response = self.dispatcher.get(&endpoint).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ServiceError::NotFound {
                service: ServiceKind::Items,
                endpoint,
            }
            .into());
        }
        expect_success(&response, &endpoint)?;
        decode(response, &endpoint).await
    }

    /// Create a new item.
    #[instrument(skip(self, item), fields(name = %item.name))]
    pub async fn create(&self, item: &NewItem) -> Result<Item> {
        let endpoint = "/api/items";
        let response = self
            .dispatcher
            .request(endpoint, RequestOptions::post().json(item)?)
            .await?;
        expect_success(&response, endpoint)?;

        let created: Item = decode(response, endpoint).await?;
        debug!(id = created.id, "created item");
        Ok(created)
    }

    /// Replace an existing item.
    #[instrument(skip(self, item), fields(name = %item.name))]
    pub async fn update(&self, id: u64, item: &NewItem) -> Result<Item> {
        let endpoint = format!("/api/items/{id}");
        let response = self
            .dispatcher
            .request(&endpoint, RequestOptions::put().json(item)?)
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ServiceError::NotFound {
                service: ServiceKind::Items,
                endpoint,
            }
            .into());
        }
        expect_success(&response, &endpoint)?;
        decode(response, &endpoint).await
    }

    /// Delete an item by identifier.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: u64) -> Result<DeleteResponse> {
        let endpoint = format!("/api/items/{id}");
        let response = self
            .dispatcher
            .request(&endpoint, RequestOptions::delete())
            .await?;
        expect_success(&response, &endpoint)?;
        decode(response, &endpoint).await
    }

    /// List the distinct item categories.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>> {
        let endpoint = "/api/categories";
        let response = self.dispatcher.get(endpoint).await?;
        expect_success(&response, endpoint)?;

        let parsed: CategoriesResponse = decode(response, endpoint).await?;
        Ok(parsed.categories)
    }
}

fn expect_success(response: &reqwest::Response, endpoint: &str) -> Result<()> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(ServiceError::UnexpectedStatus {
            service: ServiceKind::Items,
            status: response.status().as_u16(),
            endpoint: endpoint.to_string(),
        }
        .into())
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    endpoint: &str,
) -> Result<T> {
    response.json().await.map_err(|e| {
        ServiceError::Decode {
            service: ServiceKind::Items,
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}
