use crate::domain::bill::BillDraft;
use crate::domain::view::ViewMode;
use crate::dto::bill::BillEditorView;
use crate::dto::main::{IndexPageData, IndexQuery, ListParams, Modal};
use crate::gateway::BillGateway;
use crate::pagination::{Pager, Paginated};
use crate::repository::{BillFilter, BillListQuery, BillSort};
use crate::services::bill::{load_bill, open_editor};
use crate::services::{ServiceError, ServiceResult};

/// Loads the bill list page together with the modal requested in the query.
///
/// When the requested page is past the end of the list, the last page is
/// shown instead.
pub async fn load_index_page<G>(gateway: &G, query: IndexQuery) -> ServiceResult<IndexPageData>
where
    G: BillGateway + ?Sized,
{
    let list = ListParams::from_index_query(&query);
    let list_query = BillListQuery::new()
        .sort(BillSort::newest_first())
        .filter(BillFilter::from_search(list.field, &list.search));

    let mut page = query.page.unwrap_or(1).max(1);
    let mut result = gateway
        .list_bills(&list_query.clone().paginate(page, list.per_page))
        .await
        .map_err(|err| {
            log::error!("Failed to list bills: {err}");
            err
        })?;

    let clamped = Pager::new(page, result.pages).clamped();
    if clamped != page {
        page = clamped;
        result = gateway
            .list_bills(&list_query.paginate(page, list.per_page))
            .await?;
    }

    let mut mode = ViewMode::from_params(
        query.view.as_deref(),
        query.edit.as_deref(),
        query.delete.as_deref(),
    );
    let (modal, modal_error) = match load_modal(gateway, &mode).await {
        Ok(modal) => (modal, None),
        Err(err) => {
            mode.close();
            (None, Some(describe_modal_error(&err)))
        }
    };

    Ok(IndexPageData {
        bills: Paginated::new(result.data, page, result.pages),
        list,
        mode,
        modal,
        modal_error,
    })
}

/// The list page with the editor reopened on `draft`, optionally showing
/// `error` above the form.
pub async fn load_editor_page<G>(
    gateway: &G,
    query: IndexQuery,
    draft: &BillDraft,
    error: Option<String>,
) -> ServiceResult<IndexPageData>
where
    G: BillGateway + ?Sized,
{
    let mut data = load_index_page(gateway, query.without_modal()).await?;
    data.mode.open_edit(draft.target());
    data.modal = Some(Modal::Edit {
        editor: BillEditorView::from(draft),
    });
    data.modal_error = error;
    Ok(data)
}

async fn load_modal<G>(gateway: &G, mode: &ViewMode) -> ServiceResult<Option<Modal>>
where
    G: BillGateway + ?Sized,
{
    let modal = match mode {
        ViewMode::None => return Ok(None),
        ViewMode::Viewing(id) => Modal::View {
            bill: load_bill(gateway, id).await?,
        },
        ViewMode::Deleting(id) => Modal::Delete {
            bill: load_bill(gateway, id).await?,
        },
        ViewMode::Editing(target) => Modal::Edit {
            editor: BillEditorView::from(&open_editor(gateway, target).await?),
        },
    };
    Ok(Some(modal))
}

fn describe_modal_error(err: &ServiceError) -> String {
    match err {
        ServiceError::NotFound => "Bill not found.".to_string(),
        _ => "Could not load the bill. Please try again.".to_string(),
    }
}
