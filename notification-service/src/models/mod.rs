use serde::{Deserialize, Serialize};

use basket_shared::push::BatchResponse;

pub const NOTIFICATIONS_SENT_MESSAGE: &str = "Notifications sent.";

// Request DTOs
#[derive(Deserialize, Debug, Default)]
pub struct SendNotificationRequest {
    #[serde(rename = "notificationTitle", default)]
    pub notification_title: String,
    #[serde(rename = "notificationBody", default)]
    pub notification_body: String,
    #[serde(rename = "userTokens", default)]
    pub user_tokens: Option<Vec<String>>,
    #[serde(rename = "channelId", default)]
    pub channel_id: String,
}

// Response DTOs
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationResponse {
    pub success: bool,
    pub message: String,
    pub success_count: usize,
    pub failure_count: usize,
}

impl From<BatchResponse> for SendNotificationResponse {
    fn from(batch: BatchResponse) -> Self {
        Self {
            success: true,
            message: NOTIFICATIONS_SENT_MESSAGE.to_string(),
            success_count: batch.success_count,
            failure_count: batch.failure_count,
        }
    }
}
