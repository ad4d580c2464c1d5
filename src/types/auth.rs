//! Authentication types.
//!
//! The backend uses plain email/password login returning a bearer token.
//! The token lives in the injected session store for the lifetime of the
//! session; a 401 from any endpoint clears it.

use serde::{Deserialize, Serialize};

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Body of `POST /users` (signup).
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_without_user_id() {
        let response: LoginResponse = serde_json::from_str(r#"{"token": "abc"}"#).unwrap();
        assert_eq!(response.token, "abc");
        assert!(response.user_id.is_none());
    }

    #[test]
    fn test_login_response_with_user_id() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"token": "abc", "userId": "42"}"#).unwrap();
        assert_eq!(response.user_id.as_deref(), Some("42"));
    }
}
