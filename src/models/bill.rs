//! Diesel models for stored bills.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::bill::Bill as DomainBill;
use crate::domain::line_item::LineItem;
use crate::domain::types::{BillDate, BillId, BillNumber, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::bills)]
/// Diesel model for [`crate::domain::bill::Bill`].
pub struct Bill {
    pub id: String,
    pub bill_no: String,
    pub name: String,
    pub date: String,
    pub bill_data: String, // line items as JSON text
    pub total: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::bills)]
/// Insertable form of [`Bill`].
pub struct NewBill<'a> {
    pub id: &'a str,
    pub bill_no: &'a str,
    pub name: &'a str,
    pub date: String,
    pub bill_data: String,
    pub total: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::bills)]
/// Full replacement of a stored [`Bill`], excluding its id.
pub struct UpdateBill<'a> {
    pub bill_no: &'a str,
    pub name: &'a str,
    pub date: String,
    pub bill_data: String,
    pub total: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

fn encode_items(items: &[LineItem]) -> Result<String, TypeConstraintError> {
    serde_json::to_string(items).map_err(|e| TypeConstraintError::InvalidValue(e.to_string()))
}

fn encode_date(date: Option<BillDate>) -> String {
    date.map(|date| date.to_string()).unwrap_or_default()
}

fn decode_date(date: &str) -> Result<Option<BillDate>, TypeConstraintError> {
    if date.trim().is_empty() {
        return Ok(None);
    }
    BillDate::parse(date).map(Some)
}

impl TryFrom<Bill> for DomainBill {
    type Error = TypeConstraintError;

    fn try_from(bill: Bill) -> Result<Self, Self::Error> {
        let bill_data: Vec<LineItem> = serde_json::from_str(&bill.bill_data)
            .map_err(|e| TypeConstraintError::InvalidValue(format!("bill_data: {e}")))?;

        Ok(DomainBill {
            id: BillId::new(bill.id)?,
            bill_no: BillNumber::from(bill.bill_no),
            name: bill.name,
            date: decode_date(&bill.date)?,
            bill_data,
            total: bill.total,
            created_at: bill.created_at,
            updated_at: bill.updated_at,
        })
    }
}

impl<'a> TryFrom<&'a DomainBill> for NewBill<'a> {
    type Error = TypeConstraintError;

    fn try_from(bill: &'a DomainBill) -> Result<Self, Self::Error> {
        Ok(Self {
            id: bill.id.as_str(),
            bill_no: bill.bill_no.as_str(),
            name: bill.name.as_str(),
            date: encode_date(bill.date),
            bill_data: encode_items(&bill.bill_data)?,
            total: bill.total,
            created_at: bill.created_at,
            updated_at: bill.updated_at,
        })
    }
}

impl<'a> TryFrom<&'a DomainBill> for UpdateBill<'a> {
    type Error = TypeConstraintError;

    fn try_from(bill: &'a DomainBill) -> Result<Self, Self::Error> {
        Ok(Self {
            bill_no: bill.bill_no.as_str(),
            name: bill.name.as_str(),
            date: encode_date(bill.date),
            bill_data: encode_items(&bill.bill_data)?,
            total: bill.total,
            created_at: bill.created_at,
            updated_at: bill.updated_at,
        })
    }
}
