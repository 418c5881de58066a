//! Modal state of the bill list page.

use serde::Serialize;

use crate::domain::bill::EditTarget;
use crate::domain::types::BillId;

/// Which modal, if any, is open over the bill list.
///
/// Exactly one mode is active at a time; every transition replaces the
/// previous mode.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "target", rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    None,
    Viewing(BillId),
    Editing(EditTarget),
    Deleting(BillId),
}

/// Value of the `edit` query parameter that opens the editor for a new bill.
pub const NEW_BILL_MARKER: &str = "new";

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl ViewMode {
    /// Decodes the mode from the `view`, `edit` and `delete` query parameters.
    ///
    /// If several are present the editor wins, then the viewer, then the
    /// delete confirmation. Blank values are ignored.
    pub fn from_params(view: Option<&str>, edit: Option<&str>, delete: Option<&str>) -> Self {
        if let Some(edit) = present(edit) {
            if edit == NEW_BILL_MARKER {
                return ViewMode::Editing(EditTarget::New);
            }
            if let Ok(id) = BillId::new(edit) {
                return ViewMode::Editing(EditTarget::Existing(id));
            }
        }
        if let Some(id) = present(view).and_then(|v| BillId::new(v).ok()) {
            return ViewMode::Viewing(id);
        }
        if let Some(id) = present(delete).and_then(|v| BillId::new(v).ok()) {
            return ViewMode::Deleting(id);
        }
        ViewMode::None
    }

    pub fn open_edit(&mut self, target: EditTarget) {
        *self = ViewMode::Editing(target);
    }

    pub fn close(&mut self) {
        *self = ViewMode::None;
    }

    /// Query string fragment that reopens this mode.
    pub fn to_query(&self) -> Option<(&'static str, String)> {
        match self {
            ViewMode::None => None,
            ViewMode::Viewing(id) => Some(("view", id.to_string())),
            ViewMode::Editing(EditTarget::New) => Some(("edit", NEW_BILL_MARKER.to_string())),
            ViewMode::Editing(EditTarget::Existing(id)) => Some(("edit", id.to_string())),
            ViewMode::Deleting(id) => Some(("delete", id.to_string())),
        }
    }
}
