use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A shared basket that users join through its invitation code.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Basket {
    pub id: String,
    #[serde(rename = "invitationCode")]
    pub invitation_code: String,
    #[serde(rename = "memberIds", default)]
    pub member_ids: Vec<String>,
    #[serde(rename = "memberTokens", default)]
    pub member_tokens: Vec<String>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Basket {
    /// Creates an empty basket with a fresh id, for seeding a store
    pub fn new(invitation_code: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            invitation_code: invitation_code.into(),
            member_ids: Vec::new(),
            member_tokens: Vec::new(),
            updated_at: Some(now_str()),
        }
    }

    pub fn has_member(&self, member_id: &str) -> bool {
        self.member_ids.iter().any(|id| id == member_id)
    }
}

// Callable envelope: requests arrive as {"data": ...}, answers leave as {"result": ...}
#[derive(Deserialize, Debug)]
pub struct CallableRequest<T> {
    pub data: T,
}

#[derive(Serialize, Debug)]
pub struct CallableResponse<T> {
    pub result: T,
}

impl<T> CallableResponse<T> {
    pub fn new(result: T) -> Self {
        Self { result }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct CallableError {
    pub status: String,
    pub message: String,
}

// Response DTOs for general use across services
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: CallableError,
}

#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

// Helper function to get current timestamp as string
pub fn now_str() -> String {
    Utc::now().to_rfc3339()
}
