use axum::Json;

use basket_shared::models::MessageResponse;

pub mod basket_handlers;

// GET /health
pub async fn health() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "ok".to_string(),
    })
}
