use std::env;

use crate::error::{Result, ServiceError};

pub const BASKET_TABLE_VAR: &str = "BASKET_TABLE";
pub const BASKET_INVITATION_CODE_INDEX_VAR: &str = "BASKET_INVITATION_CODE_INDEX";
pub const SNS_PLATFORM_APPLICATION_ARN_VAR: &str = "SNS_PLATFORM_APPLICATION_ARN";
pub const REMOVE_BASE_PATH_VAR: &str = "REMOVE_BASE_PATH";

pub const DEFAULT_BASKET_TABLE: &str = "basket-table";
pub const DEFAULT_INVITATION_CODE_INDEX: &str = "invitationCode-index";
pub const DEFAULT_ROUTE_PREFIX: &str = "/Prod";

/// Reads an environment variable, falling back to `default` when unset or empty
pub fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Reads an environment variable that the service cannot start without
pub fn required_env(key: &str) -> Result<String> {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServiceError::unknown(format!("Environment variable {} is not set", key)))
}

pub fn basket_table_name() -> String {
    env_or(BASKET_TABLE_VAR, DEFAULT_BASKET_TABLE)
}

pub fn invitation_code_index_name() -> String {
    env_or(BASKET_INVITATION_CODE_INDEX_VAR, DEFAULT_INVITATION_CODE_INDEX)
}

/// API Gateway stage prefix for the routes.
///
/// REMOVE_BASE_PATH=true drops the `/Prod` prefix, which is what local runs and
/// custom domains with a base path mapping expect.
pub fn route_prefix() -> &'static str {
    let remove_base_path = env::var(REMOVE_BASE_PATH_VAR)
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false);

    if remove_base_path {
        ""
    } else {
        DEFAULT_ROUTE_PREFIX
    }
}
