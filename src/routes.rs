use std::sync::Arc;

use actix_governor::{governor::middleware::NoOpMiddleware, Governor, GovernorConfigBuilder, PeerIpKeyExtractor};
use actix_web::{middleware::from_fn, web};

use crate::{
    api::{agent, holiday, inventory, ticket},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};

/// Per-peer limiter refilling one request every `60s / requests_per_min`,
/// with a burst of `requests_per_min`.
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes; registered before the protected scope sharing the prefix
    cfg.service(
        web::scope(&format!("{}/auth", config.api_prefix))
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter)
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter)
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/holidays")
                    .service(
                        web::resource("")
                            .route(web::get().to(holiday::list_holidays))
                            .route(web::post().to(holiday::create_holiday)),
                    )
                    // before /{id} so "check" is not parsed as an id
                    .service(web::resource("/check").route(web::get().to(holiday::check_holiday)))
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(holiday::get_holiday))
                            .route(web::put().to(holiday::update_holiday))
                            .route(web::delete().to(holiday::delete_holiday)),
                    ),
            )
            .service(
                web::scope("/tickets")
                    .service(
                        web::resource("")
                            .route(web::get().to(ticket::list_tickets))
                            .route(web::post().to(ticket::create_ticket)),
                    )
                    .service(web::resource("/summary").route(web::get().to(ticket::ticket_summary)))
                    .service(web::resource("/{id}").route(web::get().to(ticket::get_ticket))),
            )
            .service(
                web::scope("/inventory")
                    .service(web::resource("/items").route(web::get().to(inventory::list_items)))
                    .service(web::resource("/low-stock").route(web::get().to(inventory::low_stock)))
                    .service(web::resource("/reorders").route(web::post().to(inventory::create_reorder))),
            )
            .service(web::resource("/agent/command").route(web::post().to(agent::run_command))),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ returns new token pair, old refresh token revoked
