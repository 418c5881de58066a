//! Services behind the bill store REST API.

use std::collections::HashMap;

use crate::domain::bill::Bill;
use crate::domain::types::{BillId, SearchField};
use crate::dto::api::BillPage;
use crate::repository::{BillFilter, BillListQuery, BillReader, BillSort, BillWriter};
use crate::services::{ServiceError, ServiceResult};

/// Page size used when `_page` is given without `_per_page`.
pub const DEFAULT_PER_PAGE: usize = 10;
/// Largest `_per_page` the store serves in one response.
pub const MAX_PER_PAGE: usize = 1000;

/// Query parameters accepted by `GET /bills`.
#[derive(Debug, Default, PartialEq)]
pub struct StoreListParams {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    pub sort: BillSort,
    pub filter: Option<BillFilter>,
}

fn parse_number(params: &HashMap<String, String>, key: &str) -> ServiceResult<Option<usize>> {
    match params.get(key).map(|value| value.trim()) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ServiceError::Form(format!("{key} must be a positive number"))),
    }
}

impl StoreListParams {
    /// Reads `_page`, `_per_page`, `_sort` and at most one attribute filter.
    ///
    /// Attribute filters are tried in the order name, date, bill number; the
    /// first non-blank one wins.
    pub fn from_query(params: &HashMap<String, String>) -> ServiceResult<Self> {
        let sort = match params.get("_sort").map(|s| s.trim()) {
            None | Some("") => BillSort::default(),
            Some(sort) => sort.parse()?,
        };

        let filter = SearchField::ALL.into_iter().find_map(|field| {
            params
                .get(field.as_str())
                .and_then(|value| BillFilter::from_search(Some(field), value))
        });

        let per_page = parse_number(params, "_per_page")?;
        if per_page.is_some_and(|per_page| per_page > MAX_PER_PAGE) {
            return Err(ServiceError::Form(format!(
                "_per_page must not exceed {MAX_PER_PAGE}"
            )));
        }

        Ok(Self {
            page: parse_number(params, "_page")?,
            per_page,
            sort,
            filter,
        })
    }

    fn is_paged(&self) -> bool {
        self.page.is_some() || self.per_page.is_some()
    }
}

/// Response of `GET /bills`: a page envelope when paging was requested,
/// otherwise every matching bill.
#[derive(Debug)]
pub enum BillListing {
    Page(BillPage),
    All(Vec<Bill>),
}

pub fn list_bills<R>(repo: &R, params: StoreListParams) -> ServiceResult<BillListing>
where
    R: BillReader + ?Sized,
{
    let paged = params.is_paged();
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(DEFAULT_PER_PAGE).max(1);

    let mut query = BillListQuery::new().sort(params.sort).filter(params.filter);
    if paged {
        query = query.paginate(page, per_page);
        if query.pagination.and_then(|p| p.offset()).is_none() {
            return Err(ServiceError::Form("_page is out of range".into()));
        }
    }

    let (total, bills) = repo.list_bills(&query).map_err(|err| {
        log::error!("Failed to list bills: {err}");
        ServiceError::from(err)
    })?;

    if paged {
        Ok(BillListing::Page(BillPage::new(bills, total, page, per_page)))
    } else {
        Ok(BillListing::All(bills))
    }
}

fn parse_id(id: &str) -> ServiceResult<BillId> {
    BillId::new(id).map_err(|_| ServiceError::NotFound)
}

pub fn get_bill<R>(repo: &R, id: &str) -> ServiceResult<Bill>
where
    R: BillReader + ?Sized,
{
    let id = parse_id(id)?;
    repo.get_bill_by_id(&id)?.ok_or(ServiceError::NotFound)
}

/// Stores a new bill under the id it carries.
pub fn create_bill<R>(repo: &R, bill: Bill) -> ServiceResult<Bill>
where
    R: BillReader + BillWriter + ?Sized,
{
    if repo.get_bill_by_id(&bill.id)?.is_some() {
        return Err(ServiceError::Conflict(format!(
            "bill {} already exists",
            bill.id
        )));
    }

    let created = repo.create_bill(&bill)?;
    log::info!("Created bill {} ({})", created.id, created.bill_no);
    Ok(created)
}

/// Replaces the bill stored under `id`. The id in the path is authoritative.
pub fn update_bill<R>(repo: &R, id: &str, mut bill: Bill) -> ServiceResult<Bill>
where
    R: BillReader + BillWriter + ?Sized,
{
    let id = parse_id(id)?;
    if repo.get_bill_by_id(&id)?.is_none() {
        return Err(ServiceError::NotFound);
    }

    bill.id = id;
    let updated = repo.update_bill(&bill.id, &bill)?;
    log::info!("Updated bill {}", updated.id);
    Ok(updated)
}

pub fn delete_bill<R>(repo: &R, id: &str) -> ServiceResult<Bill>
where
    R: BillWriter + ?Sized,
{
    let id = parse_id(id)?;
    let deleted = repo.delete_bill(&id)?;
    log::info!("Deleted bill {}", deleted.id);
    Ok(deleted)
}
