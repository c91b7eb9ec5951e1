//! HTTP client for the order service

use crate::{ClientConfig, ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{OrderSnapshot, SaveOrderRequest, TableNumber};
use std::sync::Arc;

/// Remote order service operations
///
/// Every call is a single attempt; failures are returned to the caller
/// as-is.
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// `GET /orders`
    async fn fetch_orders(&self) -> ClientResult<OrderSnapshot>;

    /// `POST /orders`
    async fn save_order(&self, table: TableNumber, orders: &[String]) -> ClientResult<()>;

    /// `DELETE /orders/{table_number}`
    async fn clear_order(&self, table: TableNumber) -> ClientResult<()>;
}

#[async_trait]
impl<T: OrderApi + ?Sized> OrderApi for Arc<T> {
    async fn fetch_orders(&self) -> ClientResult<OrderSnapshot> {
        (**self).fetch_orders().await
    }

    async fn save_order(&self, table: TableNumber, orders: &[String]) -> ClientResult<()> {
        (**self).save_order(table, orders).await
    }

    async fn clear_order(&self, table: TableNumber) -> ClientResult<()> {
        (**self).clear_order(table).await
    }
}

/// Network HTTP client for the order service
#[derive(Debug, Clone)]
pub struct NetworkOrderApi {
    client: Client,
    base_url: String,
}

impl NetworkOrderApi {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Reject non-success statuses, keeping the body for the error
    async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status { status, body })
    }

    /// Decode a JSON body; decode failures are response-format errors, not transport errors
    async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl OrderApi for NetworkOrderApi {
    async fn fetch_orders(&self) -> ClientResult<OrderSnapshot> {
        let response = self.client.get(self.url("orders")).send().await?;
        let response = Self::check_status(response).await?;
        Self::parse_json(response).await
    }

    async fn save_order(&self, table: TableNumber, orders: &[String]) -> ClientResult<()> {
        let body = SaveOrderRequest {
            table_number: table,
            orders: orders.to_vec(),
        };
        let response = self.client.post(self.url("orders")).json(&body).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn clear_order(&self, table: TableNumber) -> ClientResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("orders/{table}")))
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let api = NetworkOrderApi::new(&ClientConfig::new("http://localhost:8080/")).unwrap();
        assert_eq!(api.base_url(), "http://localhost:8080");
        assert_eq!(api.url("orders"), "http://localhost:8080/orders");
        assert_eq!(api.url("/orders/3"), "http://localhost:8080/orders/3");
    }
}
