use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Utc;
use tera::Tera;

use crate::domain::bill::BillDraft;
use crate::domain::types::BillId;
use crate::domain::view::ViewMode;
use crate::dto::main::{IndexQuery, ListParams};
use crate::forms::bill::SaveBillForm;
use crate::gateway::BillGateway;
use crate::models::config::{Letterhead, ServerConfig};
use crate::routes::main::insert_index_data;
use crate::routes::{base_context, index_url, redirect, render_template};
use crate::services::bill::{self as bill_service, EditorStep};
use crate::services::main as main_service;
use crate::services::ServiceError;

/// List page at the position described by `query`, reopening `mode`.
fn return_url(query: &IndexQuery, mode: &ViewMode) -> String {
    let mut parts = Vec::new();
    if let Some(page) = query.page.filter(|page| *page > 1) {
        parts.push(format!("page={page}"));
    }
    parts.push(ListParams::from_index_query(query).to_query());
    if let Some((key, value)) = mode.to_query() {
        parts.push(serde_html_form::to_string(vec![(key, value)]).unwrap_or_default());
    }
    index_url(&parts.join("&"))
}

async fn render_editor(
    gateway: &dyn BillGateway,
    tera: &Tera,
    letterhead: &Letterhead,
    flash_messages: &IncomingFlashMessages,
    query: IndexQuery,
    draft: &BillDraft,
    error: Option<String>,
) -> HttpResponse {
    match main_service::load_editor_page(gateway, query, draft, error).await {
        Ok(data) => {
            let mut context = base_context(flash_messages, "index");
            insert_index_data(&mut context, &data, letterhead);
            render_template(tera, "main/index.html", &context)
        }
        Err(err) => {
            log::error!("Failed to reopen the bill editor: {err}");
            HttpResponse::ServiceUnavailable().finish()
        }
    }
}

#[post("/bills/editor")]
pub async fn submit_editor(
    query: web::Query<IndexQuery>,
    gateway: web::Data<dyn BillGateway>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    body: web::Bytes,
) -> impl Responder {
    let query = query.into_inner();
    let letterhead = &server_config.letterhead;

    let step = SaveBillForm::from_bytes(&body)
        .map_err(ServiceError::from)
        .and_then(|form| bill_service::apply_editor_form(&form));

    let draft = match step {
        Ok(EditorStep::Continue(draft)) => {
            return render_editor(
                gateway.get_ref(),
                &tera,
                letterhead,
                &flash_messages,
                query,
                &draft,
                None,
            )
            .await;
        }
        Ok(EditorStep::Rejected { draft, message }) => {
            return render_editor(
                gateway.get_ref(),
                &tera,
                letterhead,
                &flash_messages,
                query,
                &draft,
                Some(message),
            )
            .await;
        }
        Ok(EditorStep::Submit(draft)) => draft,
        Err(err) => {
            log::error!("Failed to read the bill form: {err}");
            FlashMessage::error("Could not read the bill form.").send();
            return redirect(&return_url(&query, &ViewMode::None));
        }
    };

    let now = Utc::now().naive_utc();
    match bill_service::save_bill(gateway.get_ref(), draft.clone(), now).await {
        Ok(outcome) => {
            let message = if outcome.created {
                format!("Bill {} added.", outcome.bill.bill_no)
            } else {
                format!("Bill {} updated.", outcome.bill.bill_no)
            };
            FlashMessage::success(message).send();
            redirect(&return_url(&query, &ViewMode::None))
        }
        Err(ServiceError::Form(message)) => {
            render_editor(
                gateway.get_ref(),
                &tera,
                letterhead,
                &flash_messages,
                query,
                &draft,
                Some(message),
            )
            .await
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Bill not found.").send();
            redirect(&return_url(&query, &ViewMode::None))
        }
        Err(_) => {
            let message = "Could not save the bill. Please try again.".to_string();
            render_editor(
                gateway.get_ref(),
                &tera,
                letterhead,
                &flash_messages,
                query,
                &draft,
                Some(message),
            )
            .await
        }
    }
}

#[post("/bills/{bill_id}/delete")]
pub async fn delete_bill(
    bill_id: web::Path<String>,
    query: web::Query<IndexQuery>,
    gateway: web::Data<dyn BillGateway>,
) -> impl Responder {
    let query = query.into_inner();

    let Ok(id) = BillId::new(bill_id.into_inner()) else {
        FlashMessage::error("Bill not found.").send();
        return redirect(&return_url(&query, &ViewMode::None));
    };

    match bill_service::delete_bill(gateway.get_ref(), &id).await {
        Ok(()) => {
            FlashMessage::success("Bill deleted.").send();
            redirect(&return_url(&query, &ViewMode::None))
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Bill not found.").send();
            redirect(&return_url(&query, &ViewMode::None))
        }
        Err(_) => {
            FlashMessage::error("Could not delete the bill. Please try again.").send();
            redirect(&return_url(&query, &ViewMode::Deleting(id)))
        }
    }
}

#[get("/bills/{bill_id}/print")]
pub async fn print_bill(
    bill_id: web::Path<String>,
    gateway: web::Data<dyn BillGateway>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Ok(id) = BillId::new(bill_id.into_inner()) else {
        FlashMessage::error("Bill not found.").send();
        return redirect("/");
    };

    match bill_service::load_bill(gateway.get_ref(), &id).await {
        Ok(bill) => {
            let mut context = base_context(&flash_messages, "print");
            context.insert("bill", &bill);
            context.insert("letterhead", &server_config.letterhead);
            render_template(&tera, "bill/print.html", &context)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Bill not found.").send();
            redirect("/")
        }
        Err(_) => {
            FlashMessage::error("Could not load the bill. Please try again.").send();
            redirect("/")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_url_keeps_list_position() {
        let query = IndexQuery {
            page: Some(3),
            per_page: Some(20),
            search: Some("Shah".into()),
            ..IndexQuery::default()
        };

        assert_eq!(
            return_url(&query, &ViewMode::None),
            "/?page=3&per_page=20&search=Shah"
        );
        assert_eq!(
            return_url(&query, &ViewMode::Deleting(BillId::new("17").unwrap())),
            "/?page=3&per_page=20&search=Shah&delete=17"
        );
    }

    #[test]
    fn return_url_on_first_page() {
        assert_eq!(
            return_url(&IndexQuery::default(), &ViewMode::None),
            "/?per_page=10"
        );
    }
}
