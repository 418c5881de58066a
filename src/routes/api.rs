//! Bill store REST API.

use std::collections::HashMap;

use actix_web::{HttpResponse, Responder, delete, get, post, put, web};
use serde_json::json;

use crate::domain::bill::Bill;
use crate::repository::DieselRepository;
use crate::services::api::{self as api_service, BillListing, StoreListParams};
use crate::services::ServiceError;

fn error_response(err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::NotFound => HttpResponse::NotFound().json(json!({"error": "not found"})),
        ServiceError::Conflict(message) => HttpResponse::Conflict().json(json!({"error": message})),
        ServiceError::Form(message) | ServiceError::TypeConstraint(message) => {
            HttpResponse::BadRequest().json(json!({"error": message}))
        }
        err => {
            log::error!("Bill store request failed: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/bills")]
pub async fn list_bills(
    params: web::Query<HashMap<String, String>>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let params = match StoreListParams::from_query(&params) {
        Ok(params) => params,
        Err(err) => return error_response(err),
    };

    match api_service::list_bills(repo.get_ref(), params) {
        Ok(BillListing::Page(page)) => HttpResponse::Ok().json(page),
        Ok(BillListing::All(bills)) => HttpResponse::Ok().json(bills),
        Err(err) => error_response(err),
    }
}

#[get("/bills/{bill_id}")]
pub async fn get_bill(
    bill_id: web::Path<String>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match api_service::get_bill(repo.get_ref(), &bill_id) {
        Ok(bill) => HttpResponse::Ok().json(bill),
        Err(err) => error_response(err),
    }
}

#[post("/bills")]
pub async fn create_bill(
    web::Json(bill): web::Json<Bill>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match api_service::create_bill(repo.get_ref(), bill) {
        Ok(bill) => HttpResponse::Created().json(bill),
        Err(err) => error_response(err),
    }
}

#[put("/bills/{bill_id}")]
pub async fn update_bill(
    bill_id: web::Path<String>,
    web::Json(bill): web::Json<Bill>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match api_service::update_bill(repo.get_ref(), &bill_id, bill) {
        Ok(bill) => HttpResponse::Ok().json(bill),
        Err(err) => error_response(err),
    }
}

#[delete("/bills/{bill_id}")]
pub async fn delete_bill(
    bill_id: web::Path<String>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match api_service::delete_bill(repo.get_ref(), &bill_id) {
        Ok(bill) => HttpResponse::Ok().json(bill),
        Err(err) => error_response(err),
    }
}

/// Registers the bill collection at the root and again under `/api`.
pub fn configure_store(cfg: &mut web::ServiceConfig) {
    cfg.service(list_bills)
        .service(get_bill)
        .service(create_bill)
        .service(update_bill)
        .service(delete_bill)
        .service(
            web::scope("/api")
                .service(list_bills)
                .service(get_bill)
                .service(create_bill)
                .service(update_bill)
                .service(delete_bill),
        );
}
