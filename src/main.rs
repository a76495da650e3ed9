use actix_web::middleware::{Logger, NormalizePath, from_fn};
use actix_web::{App, HttpServer};
use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod store;
mod utils;

#[cfg(test)]
mod test_support;

use auth::middleware::page_gate;
use config::Config;
use db::init_db;
use routes::AppState;
use store::Stores;
use tracing::{info, warn};
use utoipa_swagger_ui::SwaggerUi;
use crate::docs::ApiDoc;
use utoipa::OpenApi;

const EMAIL_WARMUP_BATCH: usize = 250;

/// Daily rolling log file; keep the guard alive for the life of the process.
fn init_tracing(config: &Config) -> WorkerGuard {
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    guard
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let _guard = init_tracing(&config);

    info!(addr = %config.server_addr, "Server starting...");

    let stores = if config.uses_memory_store() {
        warn!("DATABASE_URL is memory://, data will not survive a restart");
        Stores::memory()
    } else {
        Stores::mysql(init_db(&config.database_url).await?)
    };

    let state = AppState::new(config.clone(), stores)?;

    let users = state.stores.users.clone();
    let emails = state.emails.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = emails.warmup(users.as_ref(), EMAIL_WARMUP_BATCH).await {
            warn!(error = %e, "Failed to warm up email cache");
        }
    });

    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(from_fn(page_gate))
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .configure(|cfg| routes::configure(cfg, &state))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
