use axum::{extract::Request, middleware::Next, response::Response};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};

// Cognito JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(
        rename = "email_verified",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub email_verified: Option<bool>,
    pub iss: String,
    #[serde(
        rename = "cognito:username",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cognito_username: Option<String>,
    pub aud: String,
    #[serde(rename = "token_use", default, skip_serializing_if = "Option::is_none")]
    pub token_use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_time: Option<usize>,
    pub exp: usize,
    pub iat: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Verified caller identity attached to every request by [`auth_middleware`].
///
/// Requests without a usable token still get a context, just an anonymous one,
/// so each operation decides for itself how to reject them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    uid: Option<String>,
}

impl AuthContext {
    pub fn authenticated(uid: impl Into<String>) -> Self {
        let uid = uid.into();
        Self {
            uid: (!uid.is_empty()).then_some(uid),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn caller_id(&self) -> Option<&str> {
        self.uid.as_deref()
    }
}

// JWT decoder without verification - used since API Gateway already validated the token
pub fn decode_jwt_payload(token: &str) -> Result<Claims> {
    tracing::debug!("Decoding JWT payload");

    // Extract payload (second part of the JWT)
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        tracing::warn!("Invalid JWT format: expected 3 parts, got {}", parts.len());
        return Err(ServiceError::unauthenticated("Invalid JWT format"));
    }

    let payload_data = URL_SAFE_NO_PAD.decode(parts[1]).map_err(|err| {
        tracing::warn!("Failed to base64 decode JWT payload: {:?}", err);
        ServiceError::unauthenticated("Could not decode JWT payload")
    })?;

    match serde_json::from_slice::<Claims>(&payload_data) {
        Ok(claims) => {
            tracing::debug!("JWT claims parsed successfully: sub={}", claims.sub);
            Ok(claims)
        }
        Err(err) => {
            tracing::warn!("Failed to parse JWT claims: {:?}", err);
            Err(ServiceError::unauthenticated("Could not parse JWT claims"))
        }
    }
}

/// Resolves the caller identity from an `Authorization` header value
pub fn auth_context_from_header(header: Option<&http::HeaderValue>) -> AuthContext {
    let Some(header) = header else {
        tracing::debug!("No authorization header, treating caller as anonymous");
        return AuthContext::anonymous();
    };

    let Ok(bearer_token) = header.to_str() else {
        tracing::warn!("Authorization header is not valid ASCII");
        return AuthContext::anonymous();
    };

    let Some(token) = bearer_token.strip_prefix("Bearer ") else {
        tracing::warn!("Authorization header doesn't start with 'Bearer '");
        return AuthContext::anonymous();
    };

    match decode_jwt_payload(token) {
        Ok(claims) => AuthContext::authenticated(claims.sub),
        Err(_) => AuthContext::anonymous(),
    }
}

// Auth middleware for both services
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    tracing::info!(
        "Auth middleware: method={:?}, path={:?}",
        request.method(),
        request.uri().path()
    );

    let context = auth_context_from_header(request.headers().get(http::header::AUTHORIZATION));
    match context.caller_id() {
        Some(uid) => tracing::info!("Authenticated user ID: {}", uid),
        None => tracing::info!("Request carries no verified identity"),
    }

    request.extensions_mut().insert(context);

    let response = next.run(request).await;
    tracing::info!("Handler response status: {:?}", response.status());

    response
}

// Helper function to mint a Cognito-like JWT for tests
#[cfg(any(test, feature = "test_utils"))]
pub fn create_jwt_token(user_id: &str) -> String {
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time is before Unix epoch")
        .as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email_verified: Some(true),
        iss: "https://cognito-idp.eu-west-2.amazonaws.com/eu-west-2_TestPool".to_string(),
        cognito_username: Some(user_id.to_string()),
        aud: "basket-app-client".to_string(),
        token_use: Some("id".to_string()),
        auth_time: Some(now - 100),
        exp: now + 3600,
        iat: now - 100,
        jti: None,
        email: Some("test@example.com".to_string()),
    };

    // API Gateway checks the real signature, HS256 is enough for tests
    let secret = "test_secret_key_for_jwt_encoding_in_tests";
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to create JWT")
}

/// Helper function to create an authorization header with a bearer token for tests
#[cfg(any(test, feature = "test_utils"))]
pub fn create_auth_header(user_id: &str) -> (String, String) {
    let token = create_jwt_token(user_id);
    ("authorization".to_string(), format!("Bearer {}", token))
}

/// Helper function to create a test request, authenticated when `user_id` is given
#[cfg(any(test, feature = "test_utils"))]
pub fn create_test_request(
    method: &str,
    path: &str,
    user_id: Option<&str>,
    body: Option<serde_json::Value>,
) -> http::Request<axum::body::Body> {
    let mut builder = http::Request::builder().method(method).uri(path);

    if let Some(user_id) = user_id {
        let (auth_key, auth_value) = create_auth_header(user_id);
        builder = builder.header(auth_key, auth_value);
    }

    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }

    match body {
        Some(json_body) => builder
            .body(axum::body::Body::from(json_body.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    }
}
