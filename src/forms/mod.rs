//! Form definitions backing the bill desk routes.

use thiserror::Error;
use validator::ValidationErrors;

pub mod bill;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("malformed form data: {0}")]
    Malformed(String),

    #[error("line item columns do not line up")]
    MismatchedItems,

    #[error("line item id out of range")]
    InvalidItemId,

    #[error("invalid date")]
    InvalidDate,

    #[error("invalid bill id")]
    InvalidBillId,

    #[error("invalid creation timestamp")]
    InvalidTimestamp,

    #[error("unknown editor action: {0}")]
    InvalidAction(String),
}
