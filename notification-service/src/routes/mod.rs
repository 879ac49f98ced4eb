use axum::{
    extract::Request,
    middleware,
    routing::{get, post},
    Router,
};
use log::{info, warn};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{health, notification_handlers::send_notification};
use crate::operation::NotificationFanoutOperation;
use basket_shared::auth::auth_middleware;
use basket_shared::config;
use basket_shared::error::Result;
use basket_shared::push::{sns::SnsPushDispatcher, PushDispatcher};

/// Creates a router backed by the SNS dispatcher
pub async fn create_router() -> Result<Router> {
    info!("Creating router with SNS push dispatcher");

    let dispatcher = Arc::new(SnsPushDispatcher::new().await?);

    let prefix = config::route_prefix();
    info!("Using API route prefix: '{}'", prefix);

    Ok(create_router_with_dispatcher(dispatcher, prefix))
}

/// Creates a router with a given dispatcher implementation
pub fn create_router_with_dispatcher<D>(dispatcher: Arc<D>, prefix: &str) -> Router
where
    D: PushDispatcher + ?Sized,
{
    let operation = Arc::new(NotificationFanoutOperation::new(dispatcher));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    async fn logging_middleware(
        req: Request,
        next: axum::middleware::Next,
    ) -> impl axum::response::IntoResponse {
        info!(
            "Router received request: method={}, uri={}",
            req.method(),
            req.uri()
        );
        next.run(req).await
    }

    let api_routes = Router::new()
        .route("/sendNotification", post(send_notification::<D>))
        .layer(middleware::from_fn(auth_middleware))
        .route("/health", get(health))
        .with_state(operation);

    let router = if prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(prefix, api_routes)
    };

    router
        .layer(cors)
        .layer(middleware::from_fn(logging_middleware))
        .fallback(|req: Request| async move {
            warn!("No route matched for: {} {}", req.method(), req.uri());
            (
                axum::http::StatusCode::NOT_FOUND,
                "The requested resource was not found".to_string(),
            )
        })
}
