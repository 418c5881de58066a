use actix_web::{Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::{Context, Tera};

use crate::domain::types::{PerPage, SearchField};
use crate::dto::main::{IndexPageData, IndexQuery};
use crate::gateway::BillGateway;
use crate::models::config::{Letterhead, ServerConfig};
use crate::routes::{base_context, render_template};
use crate::services::main as main_service;

/// Adds everything `main/index.html` needs for `data` to `context`.
pub fn insert_index_data(context: &mut Context, data: &IndexPageData, letterhead: &Letterhead) {
    let per_page_options = PerPage::ALL.map(PerPage::get);
    let search_fields = SearchField::ALL
        .iter()
        .map(|field| (field.as_str(), field.label()))
        .collect::<Vec<_>>();

    context.insert("letterhead", letterhead);
    context.insert("bills", &data.bills);
    context.insert("list", &data.list);
    context.insert("list_query", &data.list.to_query());
    context.insert("per_page_options", &per_page_options);
    context.insert("search_fields", &search_fields);
    context.insert("mode", &data.mode);
    context.insert("modal", &data.modal);
    context.insert("modal_error", &data.modal_error);
}

#[get("/")]
pub async fn show_index(
    query: web::Query<IndexQuery>,
    gateway: web::Data<dyn BillGateway>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut context = base_context(&flash_messages, "index");

    match main_service::load_index_page(gateway.get_ref(), query.into_inner()).await {
        Ok(data) => {
            insert_index_data(&mut context, &data, &server_config.letterhead);
            render_template(&tera, "main/index.html", &context)
        }
        Err(err) => {
            log::error!("Failed to load the bill list: {err}");
            context.insert("letterhead", &server_config.letterhead);
            context.insert("message", "The bill store is not reachable. Please try again.");
            let mut response = render_template(&tera, "main/unavailable.html", &context);
            if response.status().is_success() {
                *response.status_mut() = actix_web::http::StatusCode::SERVICE_UNAVAILABLE;
            }
            response
        }
    }
}
