use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;

pub mod sns;

/// Routing marker the mobile client uses to open the app on tap
pub const CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";

/// Most tokens a single multicast may address
pub const MAX_MULTICAST_TOKENS: usize = 500;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AndroidNotification {
    pub channel_id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AndroidConfig {
    pub notification: AndroidNotification,
}

/// The per-device part of a push, identical for every recipient
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PushPayload {
    pub notification: Notification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android: Option<AndroidConfig>,
    pub data: BTreeMap<String, String>,
}

/// One payload addressed to many device tokens
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MulticastMessage {
    #[serde(flatten)]
    pub payload: PushPayload,
    pub tokens: Vec<String>,
}

impl MulticastMessage {
    /// Builds a message carrying the fixed click action; an empty channel id
    /// leaves the Android channel to the platform default.
    pub fn new(title: &str, body: &str, channel_id: &str, tokens: Vec<String>) -> Self {
        let android = (!channel_id.is_empty()).then(|| AndroidConfig {
            notification: AndroidNotification {
                channel_id: channel_id.to_string(),
            },
        });

        Self {
            payload: PushPayload {
                notification: Notification {
                    title: title.to_string(),
                    body: body.to_string(),
                },
                android,
                data: BTreeMap::from([("click_action".to_string(), CLICK_ACTION.to_string())]),
            },
            tokens,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub token: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendResponse {
    pub fn delivered(token: impl Into<String>, message_id: Option<String>) -> Self {
        Self {
            token: token.into(),
            success: true,
            message_id,
            error: None,
        }
    }

    pub fn failed(token: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

/// Aggregate delivery accounting for one multicast
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub success_count: usize,
    pub failure_count: usize,
    pub responses: Vec<SendResponse>,
}

impl BatchResponse {
    pub fn from_responses(responses: Vec<SendResponse>) -> Self {
        let success_count = responses.iter().filter(|r| r.success).count();
        Self {
            success_count,
            failure_count: responses.len() - success_count,
            responses,
        }
    }
}

/// PushDispatcher trait defining the interface for push transports.
///
/// A returned error means the whole dispatch failed; per-token failures are
/// reported inside the [`BatchResponse`] instead.
#[async_trait]
pub trait PushDispatcher: Send + Sync + 'static {
    async fn send_multicast(&self, message: &MulticastMessage) -> Result<BatchResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_multicast_message_shape() {
        let message = MulticastMessage::new("Hi", "Body", "general", vec!["tok1".into()]);

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "notification": { "title": "Hi", "body": "Body" },
                "android": { "notification": { "channel_id": "general" } },
                "data": { "click_action": "FLUTTER_NOTIFICATION_CLICK" },
                "tokens": ["tok1"]
            })
        );
    }

    #[test]
    fn test_empty_channel_omits_android_block() {
        let message = MulticastMessage::new("Hi", "Body", "", vec!["tok1".into()]);

        let value = serde_json::to_value(&message).unwrap();
        assert!(value.get("android").is_none());
        assert_eq!(value["data"]["click_action"], CLICK_ACTION);
    }

    #[test]
    fn test_batch_response_counts() {
        let batch = BatchResponse::from_responses(vec![
            SendResponse::delivered("tok1", Some("m-1".into())),
            SendResponse::failed("tok2", "EndpointDisabled"),
            SendResponse::delivered("tok3", None),
        ]);

        assert_eq!(batch.success_count, 2);
        assert_eq!(batch.failure_count, 1);
        assert_eq!(batch.responses[1].error.as_deref(), Some("EndpointDisabled"));
    }
}
