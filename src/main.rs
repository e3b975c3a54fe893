use std::str::FromStr;
use std::sync::Arc;

use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use hrm_ops::auth::password::hash_password;
use hrm_ops::config::{Config, StorageBackend};
use hrm_ops::db::init_db;
use hrm_ops::docs::ApiDoc;
use hrm_ops::model::role::Role;
use hrm_ops::repository::memory::MemoryStore;
use hrm_ops::state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::from_str(&config.log_level).unwrap_or(tracing::Level::DEBUG))
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(backend = ?config.storage, "Server starting...");

    let state = match config.storage {
        StorageBackend::MySql => {
            let url = config.database_url.as_deref().context("DATABASE_URL must be set")?;
            let pool = init_db(url, config.run_migrations).await?;
            AppState::mysql(pool, &config)
        }
        StorageBackend::Memory => {
            let store = Arc::new(MemoryStore::new());
            match &config.bootstrap_admin {
                Some((username, password)) => {
                    let hash = hash_password(password).map_err(|e| anyhow::anyhow!("hashing bootstrap password: {}", e))?;
                    store.add_user(username, &hash, Role::Admin.id(), None).await;
                    info!(username = %username, "Bootstrap admin seeded");
                }
                None => warn!("Memory backend without BOOTSTRAP_ADMIN_USER; nobody can log in"),
            }
            AppState::in_memory(store, &config)
        }
    };

    let server_addr = config.server_addr.clone();
    let state = Data::new(state);
    let config = Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard so JS/CSS assets resolve
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .configure(|cfg| hrm_ops::configure_app(cfg, state.clone(), config.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("binding {}", server_addr))?
    .run()
    .await?;

    Ok(())
}
