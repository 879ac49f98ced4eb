use axum::body::to_bytes;
use axum::http::StatusCode;
use serde_json::Value;

/// Helper function to extract JSON from an Axum response
pub async fn response_to_json(response: axum::response::Response) -> Value {
    let body = response.into_body();
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Asserts the response is a callable error envelope with the given code,
/// returning the error message
pub async fn assert_callable_error(
    response: axum::response::Response,
    status: StatusCode,
    code: &str,
) -> String {
    assert_eq!(response.status(), status);
    let json = response_to_json(response).await;
    assert_eq!(json["error"]["status"], code, "unexpected error body: {}", json);
    json["error"]["message"].as_str().unwrap_or_default().to_string()
}
