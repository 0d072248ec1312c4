//! # Gym Tracker Backend
//!
//! Student records for a small gym: enrollment, daily check-ins, payments
//! with monthly due-date rollover, and the REST surface the front desk uses.
//!
//! Layers:
//! - `domain`: business rules and services
//! - `storage`: SQLite persistence behind the `StudentStorage` trait
//! - `io::rest`: axum handlers, DTO mapping and error rendering

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

pub use config::Config;

use domain::{StudentService, SystemClock};
use io::rest::student_apis;
use storage::DbConnection;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub student_service: StudentService<DbConnection>,
}

/// Open the database and wire up services
pub async fn initialize_backend(config: &Config) -> Result<AppState> {
    info!("Opening database at {}", config.database_url);
    let db = Arc::new(DbConnection::new(&config.database_url).await?);

    let student_service = StudentService::new(db, Arc::new(SystemClock));

    Ok(AppState { student_service })
}

/// Build the HTTP router
pub fn create_router(state: AppState, cors_origin: Option<&str>) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);
    let cors = match cors_origin {
        Some(origin) => cors.allow_origin(
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {origin}"))?,
        ),
        None => cors.allow_origin(Any),
    };

    let student_routes = Router::new()
        .route("/", get(student_apis::list_students))
        .route("/nuevo", post(student_apis::create_student))
        .route("/alumno/:dni", get(student_apis::get_student))
        .route("/actualizar/:dni", put(student_apis::update_student))
        .route("/agregar-pago/:dni", post(student_apis::add_payment))
        .route("/ingresa/:dni", get(student_apis::check_in).post(student_apis::check_in))
        .route("/baja/:dni", delete(student_apis::deactivate_student))
        .route("/eliminar/:dni", delete(student_apis::delete_student));

    Ok(Router::new()
        .route("/", get(student_apis::health))
        .nest("/api/students", student_routes)
        .layer(cors)
        .with_state(state))
}
