use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    Json,
};
use log::info;
use std::sync::Arc;

use basket_shared::{
    auth::AuthContext,
    callable::callable_data,
    error::Result,
    models::{CallableRequest, CallableResponse},
    push::PushDispatcher,
};

use crate::{
    models::{SendNotificationRequest, SendNotificationResponse},
    operation::NotificationFanoutOperation,
};

// POST /sendNotification - Broadcast one notification to the given device tokens
pub async fn send_notification<D: PushDispatcher + ?Sized>(
    State(operation): State<Arc<NotificationFanoutOperation<D>>>,
    Extension(auth): Extension<AuthContext>,
    payload: std::result::Result<Json<CallableRequest<SendNotificationRequest>>, JsonRejection>,
) -> Result<Json<CallableResponse<SendNotificationResponse>>> {
    let request = callable_data(&auth, payload)?;
    let tokens = request.user_tokens.unwrap_or_default();
    info!(
        "sendNotification: caller={:?}, tokens={}, channel={:?}",
        auth.caller_id(),
        tokens.len(),
        request.channel_id
    );

    let batch = operation
        .notify(
            &request.notification_title,
            &request.notification_body,
            tokens,
            &request.channel_id,
            auth.caller_id(),
        )
        .await?;

    Ok(Json(CallableResponse::new(batch.into())))
}
