use axum::{
    Json, Router,
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use http::{Method, header};
use map_notes_core::wire::{ErrorBody, NOTES_PATH};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};

use crate::service::database::{Database, DatabaseError};

pub mod notes;

#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub list_limit: usize,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Storage(#[from] DatabaseError),

    #[error("Method not allowed.")]
    MethodNotAllowed,
}

impl ApiError {
    fn to_status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.to_status();
        let message = match &self {
            ApiError::Storage(err) => {
                tracing::error!("note storage failed: {err}");
                "Could not save note.".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody::new(message))).into_response()
    }
}

/// Every response carries permissive CORS headers.
pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// The notes API. The SPA fallback is attached by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            NOTES_PATH,
            get(notes::list)
                .post(notes::create)
                .options(notes::preflight)
                .fallback(notes::method_not_allowed),
        )
        .with_state(state)
}

pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let response = next.run(req).await;
    tracing::info!(%method, %path, status = %response.status(), "request");
    response
}

pub fn with_logging(router: Router) -> Router {
    router.layer(middleware::from_fn(log_request))
}
