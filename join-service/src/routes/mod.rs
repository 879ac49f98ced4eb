use axum::{
    extract::Request,
    middleware,
    routing::{get, post},
    Router,
};
use log::{info, warn};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{basket_handlers::get_basket_by_invitation_code, health};
use crate::operation::BasketJoinOperation;
use basket_shared::auth::auth_middleware;
use basket_shared::config;
use basket_shared::store::{dynamo::DynamoBasketStore, BasketStore};

/// Creates a router with the default store
pub async fn create_router() -> Router {
    info!("Creating router with DynamoDB basket store");

    let dynamo_store = Arc::new(DynamoBasketStore::new().await);

    let prefix = config::route_prefix();
    info!("Using API route prefix: '{}'", prefix);

    create_router_with_store(dynamo_store, prefix)
}

/// Creates a router with a given store implementation
pub fn create_router_with_store<S>(store: Arc<S>, prefix: &str) -> Router
where
    S: BasketStore + ?Sized,
{
    let operation = Arc::new(BasketJoinOperation::new(store));

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
        .route(
            "/getBasketByInvitationCode",
            post(get_basket_by_invitation_code::<S>),
        )
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
