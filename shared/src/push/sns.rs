use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sns::error::{DisplayErrorContext, SdkError};
use aws_sdk_sns::Client as SnsClient;
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinSet;

use super::{BatchResponse, MulticastMessage, PushDispatcher, PushPayload, SendResponse};
use crate::config;
use crate::error::{map_sns_error, Result, ServiceError};

/// Push dispatcher backed by an SNS platform application (FCM HTTP v1).
///
/// Each device token is registered as a platform endpoint and published to
/// directly. SNS deduplicates endpoints per token, so re-registering is cheap.
pub struct SnsPushDispatcher {
    client: SnsClient,
    platform_application_arn: Arc<str>,
}

impl SnsPushDispatcher {
    pub async fn new() -> Result<Self> {
        let platform_application_arn =
            config::required_env(config::SNS_PLATFORM_APPLICATION_ARN_VAR)?;

        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;

        Ok(Self::with_client(
            SnsClient::new(&config),
            platform_application_arn,
        ))
    }

    pub fn with_client(client: SnsClient, platform_application_arn: String) -> Self {
        Self {
            client,
            platform_application_arn: Arc::from(platform_application_arn),
        }
    }
}

enum TokenOutcome {
    Sent(SendResponse),
    TransportFailure(ServiceError),
}

/// SNS message body in `json` message structure, FCM v1 flavour
pub fn sns_message_body(payload: &PushPayload) -> Result<String> {
    let gcm = json!({ "fcmV1Message": { "message": payload } });
    let body = json!({
        "default": payload.notification.body,
        "GCM": serde_json::to_string(&gcm)?,
    });

    Ok(serde_json::to_string(&body)?)
}

// Dispatch and timeout errors mean SNS was never reached
fn is_transport_failure<E, R>(err: &SdkError<E, R>) -> bool {
    matches!(err, SdkError::DispatchFailure(_) | SdkError::TimeoutError(_))
}

async fn send_to_token(
    client: SnsClient,
    platform_application_arn: Arc<str>,
    message: Arc<str>,
    token: String,
) -> TokenOutcome {
    let endpoint = match client
        .create_platform_endpoint()
        .platform_application_arn(platform_application_arn.as_ref())
        .token(&token)
        .send()
        .await
    {
        Ok(output) => output,
        Err(err) if is_transport_failure(&err) => {
            return TokenOutcome::TransportFailure(map_sns_error("create_platform_endpoint", err))
        }
        Err(err) => {
            let reason = DisplayErrorContext(&err).to_string();
            log::warn!("Could not register push token: {}", reason);
            return TokenOutcome::Sent(SendResponse::failed(token, reason));
        }
    };

    let Some(endpoint_arn) = endpoint.endpoint_arn() else {
        return TokenOutcome::Sent(SendResponse::failed(token, "SNS returned no endpoint ARN"));
    };

    match client
        .publish()
        .target_arn(endpoint_arn)
        .message_structure("json")
        .message(message.as_ref())
        .send()
        .await
    {
        Ok(output) => TokenOutcome::Sent(SendResponse::delivered(
            token,
            output.message_id().map(str::to_string),
        )),
        Err(err) if is_transport_failure(&err) => {
            TokenOutcome::TransportFailure(map_sns_error("publish", err))
        }
        Err(err) => {
            let reason = DisplayErrorContext(&err).to_string();
            log::warn!("Publish to endpoint {} failed: {}", endpoint_arn, reason);
            TokenOutcome::Sent(SendResponse::failed(token, reason))
        }
    }
}

#[async_trait]
impl PushDispatcher for SnsPushDispatcher {
    async fn send_multicast(&self, message: &MulticastMessage) -> Result<BatchResponse> {
        let body: Arc<str> = Arc::from(sns_message_body(&message.payload)?);

        let mut tasks = JoinSet::new();
        for (index, token) in message.tokens.iter().cloned().enumerate() {
            let client = self.client.clone();
            let arn = Arc::clone(&self.platform_application_arn);
            let body = Arc::clone(&body);
            tasks.spawn(async move { (index, send_to_token(client, arn, body, token).await) });
        }

        let mut responses: Vec<Option<SendResponse>> = vec![None; message.tokens.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, outcome) = joined
                .map_err(|e| ServiceError::unknown(format!("Push task failed: {}", e)))?;

            match outcome {
                TokenOutcome::Sent(response) => responses[index] = Some(response),
                TokenOutcome::TransportFailure(err) => {
                    tasks.abort_all();
                    return Err(err);
                }
            }
        }

        Ok(BatchResponse::from_responses(
            responses.into_iter().flatten().collect(),
        ))
    }
}
