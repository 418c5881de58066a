use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::db::{DbConnection, DbPool};
use crate::domain::bill::Bill;
use crate::domain::types::{BillId, SearchField, TypeConstraintError};
use crate::repository::errors::RepositoryResult;

pub mod bill;
pub mod errors;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Number of rows skipped before this page, or `None` when it does not
    /// fit a SQL offset.
    pub fn offset(&self) -> Option<i64> {
        (self.page.max(1) - 1)
            .checked_mul(self.per_page)
            .and_then(|offset| i64::try_from(offset).ok())
    }

    /// Page size as a SQL limit, or `None` when it does not fit.
    pub fn limit(&self) -> Option<i64> {
        i64::try_from(self.per_page).ok()
    }
}

/// Filter on a single bill attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillFilter {
    pub field: SearchField,
    pub value: String,
}

impl BillFilter {
    /// Builds a filter from the search form; blank text means no filter and a
    /// missing field defaults to the customer name.
    pub fn from_search(field: Option<SearchField>, value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        Some(Self {
            field: field.unwrap_or_default(),
            value: value.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    BillNo,
    Name,
    Date,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::BillNo => "bill_no",
            SortField::Name => "name",
            SortField::Date => "date",
        }
    }
}

/// Sort order in the `_sort` notation of the store: a leading `-` means
/// descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillSort {
    pub field: SortField,
    pub descending: bool,
}

impl BillSort {
    /// Most recently created bills first.
    pub const fn newest_first() -> Self {
        Self {
            field: SortField::CreatedAt,
            descending: true,
        }
    }
}

impl Default for BillSort {
    fn default() -> Self {
        Self::newest_first()
    }
}

impl Display for BillSort {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.descending {
            f.write_str("-")?;
        }
        f.write_str(self.field.as_str())
    }
}

impl FromStr for BillSort {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (descending, name) = match s.trim().strip_prefix('-') {
            Some(name) => (true, name),
            None => (false, s.trim()),
        };
        let field = match name {
            "created_at" => SortField::CreatedAt,
            "updated_at" => SortField::UpdatedAt,
            "bill_no" => SortField::BillNo,
            "name" => SortField::Name,
            "date" => SortField::Date,
            other => return Err(TypeConstraintError::InvalidValue(other.to_string())),
        };
        Ok(Self { field, descending })
    }
}

/// Query over the bill collection, shared by the store and its HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BillListQuery {
    pub filter: Option<BillFilter>,
    pub sort: BillSort,
    pub pagination: Option<Pagination>,
}

impl BillListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Option<BillFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn sort(mut self, sort: BillSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination {
            page: page.max(1),
            per_page: per_page.max(1),
        });
        self
    }
}

pub trait BillReader {
    fn get_bill_by_id(&self, id: &BillId) -> RepositoryResult<Option<Bill>>;
    /// Returns the total number of matching bills and the requested page.
    fn list_bills(&self, query: &BillListQuery) -> RepositoryResult<(usize, Vec<Bill>)>;
}

pub trait BillWriter {
    fn create_bill(&self, bill: &Bill) -> RepositoryResult<Bill>;
    fn update_bill(&self, id: &BillId, bill: &Bill) -> RepositoryResult<Bill>;
    /// Removes the bill and returns it as it was stored.
    fn delete_bill(&self, id: &BillId) -> RepositoryResult<Bill>;
}

/// Diesel-backed implementation of the bill repository traits.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_notation_round_trips() {
        let sort: BillSort = "-created_at".parse().unwrap();
        assert_eq!(sort, BillSort::newest_first());
        assert_eq!(sort.to_string(), "-created_at");

        let sort: BillSort = "bill_no".parse().unwrap();
        assert!(!sort.descending);
        assert_eq!(sort.field, SortField::BillNo);
        assert!("-total".parse::<BillSort>().is_err());
    }

    #[test]
    fn blank_search_means_no_filter() {
        assert_eq!(BillFilter::from_search(Some(SearchField::Date), "  "), None);
        assert_eq!(
            BillFilter::from_search(None, " Ram "),
            Some(BillFilter {
                field: SearchField::Name,
                value: "Ram".into()
            })
        );
    }

    #[test]
    fn pagination_offsets() {
        let query = BillListQuery::new().paginate(3, 20);
        assert_eq!(query.pagination.unwrap().offset(), Some(40));
        let query = BillListQuery::new().paginate(0, 10);
        assert_eq!(query.pagination.unwrap().offset(), Some(0));
    }

    #[test]
    fn oversized_pagination_has_no_offset() {
        let pagination = BillListQuery::new()
            .paginate(usize::MAX, 100)
            .pagination
            .unwrap();
        assert_eq!(pagination.offset(), None);

        let pagination = BillListQuery::new()
            .paginate(1, usize::MAX)
            .pagination
            .unwrap();
        assert_eq!(pagination.offset(), Some(0));
        assert_eq!(pagination.limit(), None);
    }
}
