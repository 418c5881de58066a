#[cfg(feature = "server")]
use std::sync::Arc;
#[cfg(feature = "server")]
use std::time::Duration;

#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_files::Files;
#[cfg(feature = "server")]
use actix_web::cookie::Key;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware, web};
#[cfg(feature = "server")]
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
#[cfg(feature = "server")]
use tera::Tera;

#[cfg(feature = "server")]
use crate::db::{establish_connection_pool, run_migrations};
#[cfg(feature = "server")]
use crate::gateway::BillGateway;
#[cfg(feature = "server")]
use crate::gateway::http::HttpBillGateway;
#[cfg(feature = "server")]
use crate::models::config::{ServerConfig, StoreConfig};
#[cfg(feature = "server")]
use crate::repository::DieselRepository;
#[cfg(feature = "server")]
use crate::routes::api::configure_store;
#[cfg(feature = "server")]
use crate::routes::bill::{delete_bill, print_bill, submit_editor};
#[cfg(feature = "server")]
use crate::routes::main::show_index;

#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "data")]
pub mod error_conversions;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod gateway;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod pagination;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "data")]
pub mod schema;
#[cfg(feature = "server")]
pub mod services;

/// Minimum length of the flash cookie signing secret.
#[cfg(feature = "server")]
pub const MIN_SECRET_LEN: usize = 64;

/// Builds and runs the bill desk web application.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    if server_config.secret.len() < MIN_SECRET_LEN {
        return Err(std::io::Error::other(format!(
            "secret must be at least {MIN_SECRET_LEN} bytes long"
        )));
    }

    let gateway: Arc<dyn BillGateway> = Arc::new(
        HttpBillGateway::new(
            &server_config.api_url,
            Duration::from_secs(server_config.request_timeout_secs),
        )
        .map_err(|e| {
            std::io::Error::other(format!("Failed to set up the bill store client: {e}"))
        })?,
    );

    let secret_key = Key::from(server_config.secret.as_bytes());
    let message_store = CookieMessageStore::builder(secret_key).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!(
        "Starting bill desk on {}:{} against {}",
        bind_address.0,
        bind_address.1,
        server_config.api_url
    );

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(show_index)
            .service(submit_editor)
            .service(delete_bill)
            .service(print_bill)
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::from(gateway.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}

/// Builds and runs the mock REST bill store.
#[cfg(feature = "server")]
pub async fn run_store(store_config: StoreConfig) -> std::io::Result<()> {
    let pool = establish_connection_pool(&store_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    run_migrations(&pool)
        .map_err(|e| std::io::Error::other(format!("Failed to run migrations: {e}")))?;

    let repo = DieselRepository::new(pool);

    let bind_address = (store_config.address.clone(), store_config.port);
    log::info!(
        "Starting bill store on {}:{} with {}",
        bind_address.0,
        bind_address.1,
        store_config.database_url
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .configure(configure_store)
            .app_data(web::Data::new(repo.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
