use chrono::NaiveDateTime;
use validator::Validate;

use crate::domain::bill::{Bill, BillDraft, EditTarget};
use crate::domain::types::{BillId, BillNumber, TypeConstraintError};
use crate::forms::bill::{EditorAction, SaveBillForm};
use crate::gateway::BillGateway;
use crate::repository::{BillListQuery, BillSort};
use crate::services::{ServiceError, ServiceResult};

/// Proposes the number following the most recently created bill.
pub async fn suggest_bill_number<G>(gateway: &G) -> ServiceResult<BillNumber>
where
    G: BillGateway + ?Sized,
{
    let query = BillListQuery::new()
        .sort(BillSort::newest_first())
        .paginate(1, 1);

    let page = gateway.list_bills(&query).await.map_err(|err| {
        log::error!("Failed to fetch the latest bill: {err}");
        err
    })?;

    Ok(page
        .data
        .first()
        .map(|latest| latest.bill_no.next())
        .unwrap_or_else(BillNumber::first))
}

/// Fetches one bill including its line items. Item amounts and the total are
/// rederived from quantities and rates rather than taken from the store.
pub async fn load_bill<G>(gateway: &G, id: &BillId) -> ServiceResult<Bill>
where
    G: BillGateway + ?Sized,
{
    let mut bill = gateway.get_bill(id).await.map_err(|err| {
        log::error!("Failed to load bill {id}: {err}");
        ServiceError::from(err)
    })?;
    bill.rederive();
    Ok(bill)
}

/// Initial editor state for a new or an existing bill.
///
/// A failed number suggestion is not fatal: the draft falls back to the first
/// number so the user can still fill the form in.
pub async fn open_editor<G>(gateway: &G, target: &EditTarget) -> ServiceResult<BillDraft>
where
    G: BillGateway + ?Sized,
{
    match target {
        EditTarget::New => {
            let bill_no = suggest_bill_number(gateway)
                .await
                .unwrap_or_else(|_| BillNumber::first());
            Ok(BillDraft::new(bill_no))
        }
        EditTarget::Existing(id) => Ok(BillDraft::from(load_bill(gateway, id).await?)),
    }
}

/// Result of applying one editor submission.
#[derive(Debug)]
pub enum EditorStep {
    /// Keep editing; render the updated draft.
    Continue(BillDraft),
    /// The action was refused; render the draft with `message`.
    Rejected { draft: BillDraft, message: String },
    /// The user asked to save this draft.
    Submit(BillDraft),
}

/// Replays the posted editor state and applies the requested action.
pub fn apply_editor_form(form: &SaveBillForm) -> ServiceResult<EditorStep> {
    let action = form.action()?;
    let mut draft = form.to_draft()?;

    match action {
        EditorAction::Recalculate => Ok(EditorStep::Continue(draft)),
        EditorAction::AddItem => match draft.items.add_item() {
            Some(_) => Ok(EditorStep::Continue(draft)),
            None => {
                log::warn!("Line item ids exhausted; refusing to add an item");
                Ok(EditorStep::Rejected {
                    draft,
                    message: "No more items can be added to this bill.".into(),
                })
            }
        },
        EditorAction::RemoveItem(id) => {
            if !draft.items.remove_item(id) {
                log::warn!("Ignoring removal of unknown line item {id}");
            }
            Ok(EditorStep::Continue(draft))
        }
        EditorAction::Save => {
            if let Err(err) = form.validate() {
                log::error!("Failed to validate form: {err}");
                return Ok(EditorStep::Rejected {
                    draft,
                    message: "Please check the bill number and name.".into(),
                });
            }
            Ok(EditorStep::Submit(draft))
        }
    }
}

/// Outcome of [`save_bill`].
#[derive(Debug)]
pub struct SaveOutcome {
    pub bill: Bill,
    pub created: bool,
}

fn describe_invalid_draft(err: TypeConstraintError) -> ServiceError {
    match err {
        TypeConstraintError::EmptyString => ServiceError::Form("Customer name is required.".into()),
        TypeConstraintError::InvalidDate => ServiceError::Form("Bill date is required.".into()),
        TypeConstraintError::InvalidBillNumber => {
            ServiceError::Form("Bill number must start with a digit.".into())
        }
        other => other.into(),
    }
}

/// Creates or updates the bill described by `draft`, stamped at `now`.
pub async fn save_bill<G>(
    gateway: &G,
    draft: BillDraft,
    now: NaiveDateTime,
) -> ServiceResult<SaveOutcome>
where
    G: BillGateway + ?Sized,
{
    let created = draft.is_new();
    let bill = draft.into_bill(now).map_err(describe_invalid_draft)?;

    let stored = if created {
        gateway.create_bill(&bill).await
    } else {
        gateway.update_bill(&bill.id, &bill).await
    }
    .map_err(|err| {
        log::error!("Failed to save bill {}: {err}", bill.id);
        ServiceError::from(err)
    })?;

    Ok(SaveOutcome {
        bill: stored,
        created,
    })
}

/// Deletes the bill with `id`.
pub async fn delete_bill<G>(gateway: &G, id: &BillId) -> ServiceResult<()>
where
    G: BillGateway + ?Sized,
{
    gateway.delete_bill(id).await.map_err(|err| {
        log::error!("Failed to delete bill {id}: {err}");
        ServiceError::from(err)
    })
}
