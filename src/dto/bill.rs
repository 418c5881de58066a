//! DTOs shaped for the bill viewer and editor templates.

use serde::Serialize;

use crate::domain::bill::BillDraft;
use crate::domain::line_item::LineItem;

/// Round-trippable form of `created_at` carried in a hidden input.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Editor form state flattened for rendering.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BillEditorView {
    pub is_new: bool,
    pub id: String,
    pub bill_no: String,
    pub name: String,
    /// `yyyy-MM-dd` for the date input, empty when unset.
    pub date_input: String,
    pub created_at: String,
    pub next_item_id: u32,
    pub items: Vec<LineItem>,
    pub total: i64,
}

impl From<&BillDraft> for BillEditorView {
    fn from(draft: &BillDraft) -> Self {
        Self {
            is_new: draft.is_new(),
            id: draft
                .id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            bill_no: draft.bill_no.clone(),
            name: draft.name.clone(),
            date_input: draft
                .date
                .map(|date| date.to_input_value())
                .unwrap_or_default(),
            created_at: draft
                .created_at
                .map(|at| at.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default(),
            next_item_id: draft.items.next_id(),
            items: draft.items.items().to_vec(),
            total: draft.items.total(),
        }
    }
}
