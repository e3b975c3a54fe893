pub mod agent;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod model;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;
pub mod utils;

use actix_web::web::{self, Data};

use crate::config::Config;
use crate::state::AppState;

/// Shared data plus every route; used by the server and the HTTP tests.
pub fn configure_app(cfg: &mut web::ServiceConfig, state: Data<AppState>, config: Data<Config>) {
    cfg.app_data(state).app_data(config.clone());
    routes::configure(cfg, &config);
}
