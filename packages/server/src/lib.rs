#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the SASV road-fatality toolkit.
//!
//! Serves province statistics, map layers, the data explorer, street-risk
//! predictions and incident registration as JSON under `/api`. All state
//! lives in one [`Session`], which memoizes the cleaned table and the
//! trained predictor across requests.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use sasv_session::Session;

/// Shared application state.
pub struct AppState {
    /// Dataset and predictor session.
    pub session: Arc<Session>,
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/provinces", web::get().to(handlers::provinces))
            .route(
                "/provinces/{name}/summary",
                web::get().to(handlers::province_summary),
            )
            .route("/comparison", web::get().to(handlers::comparison))
            .route("/markers", web::get().to(handlers::markers))
            .route("/heatmap", web::get().to(handlers::heatmap))
            .route("/distribution/{column}", web::get().to(handlers::distribution))
            .route("/explore", web::get().to(handlers::explore))
            .route("/predict/options", web::get().to(handlers::predict_options))
            .route("/predict", web::post().to(handlers::predict))
            .route(
                "/incidents/options",
                web::get().to(handlers::registration_options),
            )
            .route("/incidents", web::post().to(handlers::register)),
    );
}

/// Starts the SASV API server on the session's configured address.
///
/// The dataset is loaded once up front so a missing file is reported at
/// startup; the server still starts and answers 503 until it appears. This
/// is a regular async function; the caller provides the runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(session: Arc<Session>) -> std::io::Result<()> {
    let config = session.config();
    let bind_addr = config.bind_addr.clone();
    let port = config.port;

    log::info!("Loading dataset from {}...", config.data_path.display());
    match session.table() {
        Ok(table) => log::info!("Loaded {} records", table.len()),
        Err(e) => log::warn!("Dataset not available yet: {e}"),
    }

    let state = web::Data::new(AppState { session });

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
