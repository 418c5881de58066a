use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::lenient;
use crate::domain::line_item::{LineItem, LineItemSet, recompute_total};
use crate::domain::types::{BillDate, BillId, BillNumber, NonEmptyString, TypeConstraintError};

/// Stored bill as exchanged with the bill store.
///
/// Decoding is lenient so that records written by other clients of the
/// store stay readable; see [`crate::domain::lenient`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Bill {
    pub id: BillId,
    pub bill_no: BillNumber,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub date: Option<BillDate>,
    #[serde(default)]
    pub bill_data: Vec<LineItem>,
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub total: i64,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub updated_at: NaiveDateTime,
}

impl Bill {
    /// Sum of the line item amounts; the stored `total` is not authoritative.
    pub fn computed_total(&self) -> i64 {
        recompute_total(&self.bill_data)
    }

    /// Rederives every item amount from its quantity and rate, then the total.
    pub fn rederive(&mut self) {
        let items = std::mem::take(&mut self.bill_data);
        self.bill_data = items.into_iter().map(LineItem::rederived).collect();
        self.total = self.computed_total();
    }
}

/// Target of the bill editor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EditTarget {
    New,
    Existing(BillId),
}

/// In-progress state of the add/edit form.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct BillDraft {
    /// `None` while creating a bill.
    pub id: Option<BillId>,
    pub bill_no: String,
    pub name: String,
    pub date: Option<BillDate>,
    /// Preserved from the stored bill on update.
    pub created_at: Option<NaiveDateTime>,
    pub items: LineItemSet,
}

impl BillDraft {
    /// Empty draft proposing `bill_no`.
    pub fn new(bill_no: BillNumber) -> Self {
        Self {
            id: None,
            bill_no: bill_no.into(),
            name: String::new(),
            date: None,
            created_at: None,
            items: LineItemSet::new(),
        }
    }

    pub fn target(&self) -> EditTarget {
        match &self.id {
            Some(id) => EditTarget::Existing(id.clone()),
            None => EditTarget::New,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Finalizes the draft into a bill stamped at `now`.
    ///
    /// New bills get a freshly generated id and `created_at = now`; existing
    /// bills keep both. The total is always rederived from the items.
    pub fn into_bill(self, now: NaiveDateTime) -> Result<Bill, TypeConstraintError> {
        let bill_no = BillNumber::new(self.bill_no)?;
        let name = NonEmptyString::new(self.name)?.into_inner();
        let date = self.date.ok_or(TypeConstraintError::InvalidDate)?;
        let id = self.id.unwrap_or_else(|| BillId::generate(now));
        let created_at = self.created_at.unwrap_or(now);
        let total = self.items.total();

        Ok(Bill {
            id,
            bill_no,
            name,
            date: Some(date),
            bill_data: self.items.into_items(),
            total,
            created_at,
            updated_at: now,
        })
    }
}

impl From<Bill> for BillDraft {
    fn from(bill: Bill) -> Self {
        Self {
            id: Some(bill.id),
            bill_no: bill.bill_no.into(),
            name: bill.name,
            date: bill.date,
            created_at: Some(bill.created_at),
            items: LineItemSet::from_items(bill.bill_data),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::line_item::LineItemField;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn draft_with_items() -> BillDraft {
        let mut draft = BillDraft::new(BillNumber::new("012").unwrap());
        draft.name = "Patel Traders".into();
        draft.date = Some(BillDate::parse("2024-05-01").unwrap());
        for (qty, rate) in [("2", "50"), ("1", "100"), ("3", "10")] {
            let id = draft.items.add_item().unwrap();
            draft.items.edit(id, LineItemField::Qty, qty);
            draft.items.edit(id, LineItemField::Rate, rate);
        }
        draft
    }

    #[test]
    fn new_draft_becomes_bill_with_fresh_id() {
        let bill = draft_with_items().into_bill(at(1)).unwrap();
        assert_eq!(bill.total, 230);
        assert_eq!(bill.bill_no.as_str(), "012");
        assert_eq!(bill.created_at, at(1));
        assert_eq!(bill.updated_at, at(1));
        assert_eq!(bill.bill_data.len(), 3);
    }

    #[test]
    fn existing_bill_keeps_id_and_creation_time() {
        let bill = draft_with_items().into_bill(at(1)).unwrap();
        let id = bill.id.clone();

        let mut draft = BillDraft::from(bill);
        let second = draft.items.items()[1].id;
        draft.items.remove_item(second);
        let updated = draft.into_bill(at(3)).unwrap();

        assert_eq!(updated.id, id);
        assert_eq!(updated.created_at, at(1));
        assert_eq!(updated.updated_at, at(3));
        assert_eq!(updated.total, 130);
    }

    #[test]
    fn draft_requires_name_and_date() {
        let mut draft = draft_with_items();
        draft.name = "   ".into();
        assert_eq!(
            draft.into_bill(at(1)),
            Err(TypeConstraintError::EmptyString)
        );

        let mut draft = draft_with_items();
        draft.date = None;
        assert_eq!(draft.into_bill(at(1)), Err(TypeConstraintError::InvalidDate));
    }

    #[test]
    fn stored_total_is_not_authoritative() {
        let mut bill = draft_with_items().into_bill(at(1)).unwrap();
        bill.total = 1;
        assert_eq!(bill.computed_total(), 230);
        assert_eq!(BillDraft::from(bill).items.total(), 230);
    }

    #[test]
    fn rederive_ignores_stored_amounts() {
        let mut bill = draft_with_items().into_bill(at(1)).unwrap();
        bill.bill_data[0].amount = 5;
        bill.total = 5;
        bill.rederive();
        assert_eq!(bill.bill_data[0].amount, 100);
        assert_eq!(bill.total, 230);
    }

    #[test]
    fn decodes_records_from_browser_clients() {
        let bill: Bill = serde_json::from_str(
            r#"{
                "id": "1717000000456",
                "bill_no": "NaN",
                "name": "",
                "date": "",
                "bill_data": [
                    {"id": 0, "particular": "Jar", "qty": "2", "rate": "", "ammount": null}
                ],
                "total": null,
                "created_at": "1717000000123",
                "updated_at": "1717000000500"
            }"#,
        )
        .unwrap();

        assert_eq!(bill.date, None);
        assert_eq!(bill.total, 0);
        assert_eq!(bill.bill_no.next().as_str(), "001");
        assert_eq!(
            bill.created_at,
            NaiveDate::from_ymd_opt(2024, 5, 29)
                .unwrap()
                .and_hms_milli_opt(16, 26, 40, 123)
                .unwrap()
        );

        let draft = BillDraft::from(bill);
        assert_eq!(draft.into_bill(at(2)), Err(TypeConstraintError::InvalidBillNumber));
    }
}
