use serde::{Deserialize, Serialize};

use basket_shared::models::Basket;

use crate::operation::JoinedBasket;

// Request DTOs
#[derive(Deserialize, Debug, Default)]
pub struct GetBasketByInvitationCodeRequest {
    #[serde(rename = "invitationCode", default)]
    pub invitation_code: Option<String>,
    #[serde(rename = "memberToken", default)]
    pub member_token: Option<String>,
}

// Response DTOs
#[derive(Serialize, Debug)]
pub struct GetBasketByInvitationCodeResponse {
    #[serde(rename = "basketId")]
    pub basket_id: String,
    #[serde(rename = "basketData")]
    pub basket_data: Basket,
}

impl From<JoinedBasket> for GetBasketByInvitationCodeResponse {
    fn from(joined: JoinedBasket) -> Self {
        Self {
            basket_id: joined.basket_id,
            basket_data: joined.basket,
        }
    }
}
