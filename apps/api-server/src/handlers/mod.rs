//! HTTP handlers and route configuration.

mod health;
mod posts;
mod trades;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/trades")
                    .route("", web::get().to(trades::list))
                    .route("/{trade_id}/close", web::post().to(trades::close)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::create))
                    .route("", web::get().to(posts::list))
                    // Must precede the catch-all {post_id} routes.
                    .route("/geo", web::get().to(posts::geo_search))
                    .route("/{post_id}", web::get().to(posts::get))
                    .route("/{post_id}", web::delete().to(posts::delete))
                    .route(
                        "/{post_id}/photos/{filename}",
                        web::put().to(posts::upload_photo),
                    ),
            ),
    );
}
