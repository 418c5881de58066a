//! Mock repository for isolating services in tests.

use mockall::mock;

use crate::domain::bill::Bill;
use crate::domain::types::BillId;
use crate::repository::errors::RepositoryResult;
use crate::repository::{BillListQuery, BillReader, BillWriter};

mock! {
    pub Repository {}

    impl BillReader for Repository {
        fn get_bill_by_id(&self, id: &BillId) -> RepositoryResult<Option<Bill>>;
        fn list_bills(&self, query: &BillListQuery) -> RepositoryResult<(usize, Vec<Bill>)>;
    }

    impl BillWriter for Repository {
        fn create_bill(&self, bill: &Bill) -> RepositoryResult<Bill>;
        fn update_bill(&self, id: &BillId, bill: &Bill) -> RepositoryResult<Bill>;
        fn delete_bill(&self, id: &BillId) -> RepositoryResult<Bill>;
    }
}
