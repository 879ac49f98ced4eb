use log::{error, info, warn};
use std::sync::Arc;

use basket_shared::{
    callable::UNAUTHENTICATED_MESSAGE,
    error::{Result, ServiceError},
    push::{BatchResponse, MulticastMessage, PushDispatcher, MAX_MULTICAST_TOKENS},
};

/// Broadcasts one notification to a list of device tokens in a single
/// dispatcher call. Failed tokens are counted, never retried.
pub struct NotificationFanoutOperation<D: PushDispatcher + ?Sized> {
    dispatcher: Arc<D>,
}

impl<D: PushDispatcher + ?Sized> NotificationFanoutOperation<D> {
    pub fn new(dispatcher: Arc<D>) -> Self {
        Self { dispatcher }
    }

    pub async fn notify(
        &self,
        title: &str,
        body: &str,
        tokens: Vec<String>,
        channel_id: &str,
        caller_id: Option<&str>,
    ) -> Result<BatchResponse> {
        let caller_id = caller_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ServiceError::unauthenticated(UNAUTHENTICATED_MESSAGE))?;

        if tokens.is_empty() {
            return Err(ServiceError::invalid_argument("No FCM tokens provided."));
        }
        if tokens.len() > MAX_MULTICAST_TOKENS {
            return Err(ServiceError::invalid_argument(format!(
                "At most {} FCM tokens can be sent in one request, got {}.",
                MAX_MULTICAST_TOKENS,
                tokens.len()
            )));
        }

        let token_count = tokens.len();
        let message = MulticastMessage::new(title, body, channel_id, tokens);

        let batch = self
            .dispatcher
            .send_multicast(&message)
            .await
            .map_err(|err| {
                error!("Push dispatch for caller {} failed: {}", caller_id, err);
                ServiceError::unknown(format!("Failed to send notifications: {}", err))
            })?;

        info!(
            "Caller {} sent notification to {} tokens: {} succeeded, {} failed",
            caller_id, token_count, batch.success_count, batch.failure_count
        );
        for failed in batch.responses.iter().filter(|r| !r.success) {
            warn!(
                "Token {} was not delivered: {}",
                failed.token,
                failed.error.as_deref().unwrap_or("no reason given")
            );
        }

        Ok(batch)
    }
}
