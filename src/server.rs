//! HTTP front controller: mounts the dispatcher on axum behind the layers the
//! framework always applies (permissive CORS, gzip compression).

use crate::controller::ControllerRegistry;
use crate::error::AppError;
use crate::request::Request;
use crate::response::ApiResponse;
use crate::router::Router;
use axum::extract::State;
use axum::http::{header, Method};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

/// A router plus the controllers it dispatches to.
pub struct App {
    router: Router,
    registry: ControllerRegistry,
}

impl App {
    pub fn new(router: Router, registry: ControllerRegistry) -> Self {
        App { router, registry }
    }

    /// Build the axum service: every request falls through to the regex
    /// dispatcher.
    pub fn into_service(self) -> axum::Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
        axum::Router::new()
            .fallback(handle)
            .with_state(Arc::new(self))
            .layer(CompressionLayer::new())
            .layer(cors)
    }

    /// Bind and serve until the process is stopped.
    pub async fn serve(self, addr: &str) -> Result<(), AppError> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("listening on {}", listener.local_addr()?);
        axum::serve(listener, self.into_service()).await?;
        Ok(())
    }
}

async fn handle(State(app): State<Arc<App>>, req: axum::extract::Request) -> Response {
    let request = match Request::capture(req).await {
        Ok(r) => r,
        Err(e) => return e.into_response(),
    };
    match app.router.dispatch(&app.registry, request).await {
        Ok(resp) => resp.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Convenience for controllers that only need to confirm the API is up.
pub fn ok_message(message: &str) -> ApiResponse {
    ApiResponse::success(serde_json::json!({ "message": message }))
}
