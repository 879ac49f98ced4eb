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
    store::BasketStore,
};

use crate::{
    models::{GetBasketByInvitationCodeRequest, GetBasketByInvitationCodeResponse},
    operation::BasketJoinOperation,
};

// POST /getBasketByInvitationCode - Join the basket behind an invitation code
pub async fn get_basket_by_invitation_code<S: BasketStore + ?Sized>(
    State(operation): State<Arc<BasketJoinOperation<S>>>,
    Extension(auth): Extension<AuthContext>,
    payload: std::result::Result<
        Json<CallableRequest<GetBasketByInvitationCodeRequest>>,
        JsonRejection,
    >,
) -> Result<Json<CallableResponse<GetBasketByInvitationCodeResponse>>> {
    let request = callable_data(&auth, payload)?;
    info!(
        "getBasketByInvitationCode: caller={:?}, has_token={}",
        auth.caller_id(),
        request.member_token.is_some()
    );

    let joined = operation
        .join(
            request.invitation_code.as_deref().unwrap_or_default(),
            auth.caller_id(),
            request.member_token.as_deref(),
        )
        .await?;

    Ok(Json(CallableResponse::new(joined.into())))
}
