use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::auth::AuthContext;
use crate::error::ServiceError;
use crate::models::CallableRequest;

pub const UNAUTHENTICATED_MESSAGE: &str = "Request has to be authenticated.";

/// Maps a body that failed to parse. Anonymous callers learn about the missing
/// identity first, as they would with a well-formed body.
pub fn reject_body(auth: &AuthContext, rejection: JsonRejection) -> ServiceError {
    if auth.caller_id().is_none() {
        return ServiceError::unauthenticated(UNAUTHENTICATED_MESSAGE);
    }
    ServiceError::invalid_argument(format!("Invalid request body: {}", rejection.body_text()))
}

/// Unwraps the `{"data": ...}` envelope, turning extractor failures into typed errors
pub fn callable_data<T>(
    auth: &AuthContext,
    payload: Result<Json<CallableRequest<T>>, JsonRejection>,
) -> Result<T, ServiceError> {
    payload
        .map(|Json(request)| request.data)
        .map_err(|rejection| reject_body(auth, rejection))
}
