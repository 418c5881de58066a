use serde::{Deserialize, Serialize};

use crate::domain::bill::Bill;
use crate::domain::types::{PerPage, SearchField};
use crate::domain::view::ViewMode;
use crate::dto::bill::BillEditorView;
use crate::pagination::Paginated;

/// Query parameters accepted by the bill list page.
#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    /// Attribute to search by; blank means "name".
    pub field: Option<String>,
    pub search: Option<String>,
    pub view: Option<String>,
    pub edit: Option<String>,
    pub delete: Option<String>,
}

impl IndexQuery {
    /// Same list position with every modal parameter dropped.
    pub fn without_modal(self) -> Self {
        Self {
            view: None,
            edit: None,
            delete: None,
            ..self
        }
    }
}

/// List settings echoed into every link of the page.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ListParams {
    pub per_page: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<SearchField>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub search: String,
}

impl ListParams {
    /// Normalizes the raw query: unknown page sizes fall back to the default,
    /// unknown search fields to none, and the search text is trimmed.
    pub fn from_index_query(query: &IndexQuery) -> Self {
        let field = query
            .field
            .as_deref()
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .and_then(|field| field.parse().ok());

        Self {
            per_page: PerPage::from_requested(query.per_page).get(),
            field,
            search: query.search.as_deref().unwrap_or_default().trim().to_string(),
        }
    }

    /// Encoded as a query string, without the leading `?`.
    pub fn to_query(&self) -> String {
        serde_html_form::to_string(self).unwrap_or_default()
    }
}

/// Content of the modal opened over the list.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Modal {
    View { bill: Bill },
    Edit { editor: BillEditorView },
    Delete { bill: Bill },
}

/// Data required to render the main index template.
pub struct IndexPageData {
    pub bills: Paginated<Bill>,
    pub list: ListParams,
    pub mode: ViewMode,
    pub modal: Option<Modal>,
    /// Set when the requested modal could not be loaded.
    pub modal_error: Option<String>,
}
