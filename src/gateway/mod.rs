//! Client side of the bill store REST API.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::bill::Bill;
use crate::domain::types::BillId;
use crate::dto::api::BillPage;
use crate::repository::BillListQuery;

pub mod http;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("bill not found")]
    NotFound,

    #[error("bill store responded with status {0}")]
    Status(u16),

    #[error("request to bill store failed: {0}")]
    Transport(String),

    #[error("unexpected response from bill store: {0}")]
    Decode(String),

    #[error("invalid bill store url: {0}")]
    InvalidUrl(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Operations the bill desk performs against the bill store.
///
/// Each call is a single round trip; nothing is retried.
#[async_trait]
pub trait BillGateway: Send + Sync {
    async fn list_bills(&self, query: &BillListQuery) -> GatewayResult<BillPage>;
    async fn get_bill(&self, id: &BillId) -> GatewayResult<Bill>;
    async fn create_bill(&self, bill: &Bill) -> GatewayResult<Bill>;
    async fn update_bill(&self, id: &BillId, bill: &Bill) -> GatewayResult<Bill>;
    async fn delete_bill(&self, id: &BillId) -> GatewayResult<()>;
}
