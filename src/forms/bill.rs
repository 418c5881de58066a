use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Deserialize;
use validator::Validate;

use crate::domain::bill::BillDraft;
use crate::domain::line_item::{LineItem, LineItemSet};
use crate::domain::types::{BillDate, BillId};
use crate::forms::FormError;

/// What the editor submit button asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Recalculate,
    AddItem,
    RemoveItem(u32),
    Save,
}

impl FromStr for EditorAction {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "recalculate" => Ok(EditorAction::Recalculate),
            "add_item" => Ok(EditorAction::AddItem),
            "save" => Ok(EditorAction::Save),
            other => other
                .strip_prefix("remove_item:")
                .and_then(|id| id.parse().ok())
                .map(EditorAction::RemoveItem)
                .ok_or_else(|| FormError::InvalidAction(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
/// Complete state of the add/edit bill form.
///
/// Line items arrive as parallel repeated fields (`item_id`, `particular`,
/// `qty`, `rate`), one entry per row in display order.
pub struct SaveBillForm {
    /// Empty while creating a bill.
    #[serde(default)]
    pub id: String,
    #[validate(length(min = 1, max = 32))]
    pub bill_no: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub name: String,
    /// `yyyy-MM-dd` from the date input, or `dd/MM/yyyy`.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub next_item_id: u32,
    #[serde(default)]
    pub item_id: Vec<u32>,
    #[serde(default)]
    pub particular: Vec<String>,
    #[serde(default)]
    pub qty: Vec<String>,
    #[serde(default)]
    pub rate: Vec<String>,
    #[serde(default)]
    pub action: String,
}

impl SaveBillForm {
    /// Decodes an `application/x-www-form-urlencoded` body.
    pub fn from_bytes(body: &[u8]) -> Result<Self, FormError> {
        serde_html_form::from_bytes(body).map_err(|e| FormError::Malformed(e.to_string()))
    }

    pub fn action(&self) -> Result<EditorAction, FormError> {
        self.action.parse()
    }

    fn items(&self) -> Result<LineItemSet, FormError> {
        let rows = self.item_id.len();
        if self.particular.len() != rows || self.qty.len() != rows || self.rate.len() != rows {
            return Err(FormError::MismatchedItems);
        }
        if self.item_id.contains(&u32::MAX) {
            return Err(FormError::InvalidItemId);
        }

        let items = self
            .item_id
            .iter()
            .zip(&self.particular)
            .zip(&self.qty)
            .zip(&self.rate)
            .map(|(((id, particular), qty), rate)| {
                LineItem::restore(*id, particular.clone(), qty, rate.clone())
            })
            .collect();

        Ok(LineItemSet::restore(items, self.next_item_id))
    }

    /// Rebuilds the editor state, rederiving every amount and the total.
    pub fn to_draft(&self) -> Result<BillDraft, FormError> {
        let id = match self.id.trim() {
            "" => None,
            id => Some(BillId::new(id).map_err(|_| FormError::InvalidBillId)?),
        };
        let date = match self.date.trim() {
            "" => None,
            date => Some(BillDate::parse(date).map_err(|_| FormError::InvalidDate)?),
        };
        let created_at = match self.created_at.trim() {
            "" => None,
            at => Some(
                at.parse::<NaiveDateTime>()
                    .map_err(|_| FormError::InvalidTimestamp)?,
            ),
        };

        Ok(BillDraft {
            id,
            bill_no: self.bill_no.trim().to_string(),
            name: self.name.clone(),
            date,
            created_at,
            items: self.items()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_repeated_item_fields() {
        let body = b"id=&bill_no=004&name=Ravi&date=2024-06-01&next_item_id=3\
&item_id=0&particular=Jar&qty=2&rate=50\
&item_id=2&particular=Bottle&qty=3&rate=10&action=save";

        let form = SaveBillForm::from_bytes(body).unwrap();
        assert_eq!(form.action().unwrap(), EditorAction::Save);

        let draft = form.to_draft().unwrap();
        assert!(draft.is_new());
        assert_eq!(draft.items.total(), 130);
        assert_eq!(draft.items.next_id(), 3);
        assert_eq!(draft.date.unwrap().to_string(), "01/06/2024");
    }

    #[test]
    fn form_without_items_is_empty_draft() {
        let form = SaveBillForm::from_bytes(b"bill_no=001&name=&date=").unwrap();
        let draft = form.to_draft().unwrap();
        assert!(draft.items.is_empty());
        assert_eq!(draft.date, None);
        assert_eq!(form.action().unwrap(), EditorAction::Recalculate);
    }

    #[test]
    fn mismatched_columns_are_rejected() {
        let form = SaveBillForm {
            bill_no: "001".into(),
            item_id: vec![0, 1],
            particular: vec!["Jar".into()],
            qty: vec!["1".into(), "2".into()],
            rate: vec!["1".into(), "2".into()],
            ..SaveBillForm::default()
        };
        assert!(matches!(form.to_draft(), Err(FormError::MismatchedItems)));
    }

    #[test]
    fn largest_item_id_is_rejected() {
        let body = b"bill_no=001&next_item_id=4294967295\
&item_id=4294967295&particular=Jar&qty=1&rate=1";

        let form = SaveBillForm::from_bytes(body).unwrap();
        assert!(matches!(form.to_draft(), Err(FormError::InvalidItemId)));
    }

    #[test]
    fn editor_actions_parse() {
        assert_eq!(
            "remove_item:7".parse::<EditorAction>().unwrap(),
            EditorAction::RemoveItem(7)
        );
        assert_eq!(
            "add_item".parse::<EditorAction>().unwrap(),
            EditorAction::AddItem
        );
        assert!("remove_item:x".parse::<EditorAction>().is_err());
        assert!("print".parse::<EditorAction>().is_err());
    }

    #[test]
    fn bad_date_is_reported() {
        let form = SaveBillForm {
            bill_no: "001".into(),
            date: "2024-13-40".into(),
            ..SaveBillForm::default()
        };
        assert!(matches!(form.to_draft(), Err(FormError::InvalidDate)));
    }

    #[test]
    fn existing_bill_keeps_creation_time() {
        let form = SaveBillForm {
            id: "1717000000123".into(),
            bill_no: "009".into(),
            created_at: "2024-06-01T10:15:30.250".into(),
            ..SaveBillForm::default()
        };
        let draft = form.to_draft().unwrap();
        assert_eq!(draft.id.unwrap().as_str(), "1717000000123");
        assert!(draft.created_at.is_some());
    }

    #[test]
    fn bill_number_is_validated() {
        let form = SaveBillForm::default();
        assert!(form.validate().is_err());
    }
}
