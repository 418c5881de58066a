use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::bill::Bill;
use crate::domain::types::{BillId, SearchField};
use crate::models::bill::{Bill as DbBill, NewBill as DbNewBill, UpdateBill as DbUpdateBill};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{BillListQuery, BillReader, BillWriter, DieselRepository, SortField};

/// Escapes `LIKE` wildcards so the search text matches literally.
fn like_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn into_domain(bill: DbBill) -> RepositoryResult<Bill> {
    Bill::try_from(bill).map_err(RepositoryError::from)
}

impl BillReader for DieselRepository {
    fn get_bill_by_id(&self, id: &BillId) -> RepositoryResult<Option<Bill>> {
        use crate::schema::bills;

        let mut conn = self.conn()?;
        let bill = bills::table
            .find(id.as_str())
            .first::<DbBill>(&mut conn)
            .optional()?;

        bill.map(into_domain).transpose()
    }

    fn list_bills(&self, query: &BillListQuery) -> RepositoryResult<(usize, Vec<Bill>)> {
        use crate::schema::bills;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = bills::table.into_boxed::<Sqlite>();

            if let Some(filter) = &query.filter {
                let pattern = like_pattern(&filter.value);
                items = match filter.field {
                    SearchField::Name => items.filter(bills::name.like(pattern).escape('\\')),
                    SearchField::Date => items.filter(bills::date.like(pattern).escape('\\')),
                    SearchField::BillNo => items.filter(bills::bill_no.like(pattern).escape('\\')),
                };
            }
            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();
        items = match (query.sort.field, query.sort.descending) {
            (SortField::CreatedAt, false) => items.order(bills::created_at.asc()),
            (SortField::CreatedAt, true) => items.order(bills::created_at.desc()),
            (SortField::UpdatedAt, false) => items.order(bills::updated_at.asc()),
            (SortField::UpdatedAt, true) => items.order(bills::updated_at.desc()),
            (SortField::BillNo, false) => items.order(bills::bill_no.asc()),
            (SortField::BillNo, true) => items.order(bills::bill_no.desc()),
            (SortField::Name, false) => items.order(bills::name.asc()),
            (SortField::Name, true) => items.order(bills::name.desc()),
            (SortField::Date, false) => items.order(bills::date.asc()),
            (SortField::Date, true) => items.order(bills::date.desc()),
        };

        if let Some(pagination) = &query.pagination {
            let (Some(offset), Some(limit)) = (pagination.offset(), pagination.limit()) else {
                return Err(RepositoryError::ValidationError(
                    "page out of range".to_string(),
                ));
            };
            items = items.offset(offset).limit(limit);
        }

        let bills = items
            .load::<DbBill>(&mut conn)?
            .into_iter()
            .map(into_domain)
            .collect::<RepositoryResult<Vec<Bill>>>()?;

        Ok((total, bills))
    }
}

impl BillWriter for DieselRepository {
    fn create_bill(&self, bill: &Bill) -> RepositoryResult<Bill> {
        use crate::schema::bills;

        let mut conn = self.conn()?;
        let new_bill = DbNewBill::try_from(bill)?;

        let created = diesel::insert_into(bills::table)
            .values(&new_bill)
            .get_result::<DbBill>(&mut conn)?;

        into_domain(created)
    }

    fn update_bill(&self, id: &BillId, bill: &Bill) -> RepositoryResult<Bill> {
        use crate::schema::bills;

        let mut conn = self.conn()?;
        let changes = DbUpdateBill::try_from(bill)?;

        let updated = diesel::update(bills::table.find(id.as_str()))
            .set(&changes)
            .get_result::<DbBill>(&mut conn)?;

        into_domain(updated)
    }

    fn delete_bill(&self, id: &BillId) -> RepositoryResult<Bill> {
        use crate::schema::bills;

        let mut conn = self.conn()?;

        conn.transaction(|conn| {
            let existing = bills::table.find(id.as_str()).first::<DbBill>(conn)?;
            diesel::delete(bills::table.find(id.as_str())).execute(conn)?;
            Ok::<DbBill, diesel::result::Error>(existing)
        })
        .map_err(RepositoryError::from)
        .and_then(into_domain)
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Ram"), "%Ram%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
