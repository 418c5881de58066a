//! Mock gateway for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;

use crate::domain::bill::Bill;
use crate::domain::types::BillId;
use crate::dto::api::BillPage;
use crate::gateway::{BillGateway, GatewayResult};
use crate::repository::BillListQuery;

mock! {
    pub Gateway {}

    #[async_trait]
    impl BillGateway for Gateway {
        async fn list_bills(&self, query: &BillListQuery) -> GatewayResult<BillPage>;
        async fn get_bill(&self, id: &BillId) -> GatewayResult<Bill>;
        async fn create_bill(&self, bill: &Bill) -> GatewayResult<Bill>;
        async fn update_bill(&self, id: &BillId, bill: &Bill) -> GatewayResult<Bill>;
        async fn delete_bill(&self, id: &BillId) -> GatewayResult<()>;
    }
}
