use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, ServiceError};
use crate::push::{BatchResponse, MulticastMessage, PushDispatcher, SendResponse};

/// Mock implementation of PushDispatcher for testing
///
/// Records every multicast it receives. Tokens listed as failing are reported
/// as per-token failures; error mode fails the whole dispatch.
pub struct MockPushDispatcher {
    sent: Mutex<Vec<MulticastMessage>>,
    failing_tokens: HashSet<String>,
    error_mode: bool,
}

impl MockPushDispatcher {
    /// Create a dispatcher that delivers to every token
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing_tokens: HashSet::new(),
            error_mode: false,
        }
    }

    /// Create a dispatcher that reports the given tokens as undeliverable
    pub fn with_failing_tokens(tokens: &[&str]) -> Self {
        Self {
            failing_tokens: tokens.iter().map(|t| t.to_string()).collect(),
            ..Self::new()
        }
    }

    /// Create a dispatcher whose every call fails at the transport level
    pub fn new_error() -> Self {
        Self {
            error_mode: true,
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent_messages(&self) -> Vec<MulticastMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for MockPushDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushDispatcher for MockPushDispatcher {
    async fn send_multicast(&self, message: &MulticastMessage) -> Result<BatchResponse> {
        self.sent.lock().unwrap().push(message.clone());

        if self.error_mode {
            return Err(ServiceError::unknown("Mock push transport unavailable"));
        }

        let responses = message
            .tokens
            .iter()
            .enumerate()
            .map(|(i, token)| {
                if self.failing_tokens.contains(token) {
                    SendResponse::failed(token.clone(), "registration-token-not-registered")
                } else {
                    SendResponse::delivered(token.clone(), Some(format!("mock-message-{}", i)))
                }
            })
            .collect();

        Ok(BatchResponse::from_responses(responses))
    }
}
