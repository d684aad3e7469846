use serde::{Deserialize, Serialize};

use crate::users::dto::UserDto;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for requesting a password reset.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Request body for consuming a reset token.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserDto,
}

/// The reset token is returned in-band here. The caller is responsible for
/// out-of-band delivery; see DESIGN.md for why this is a demo shortcut.
#[derive(Debug, Serialize)]
pub struct ForgotPasswordResponse {
    pub message: String,
    pub token: String,
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_request_accepts_camel_case_password_field() {
        let body = r#"{"token":"abc","newPassword":"s3cret-pass"}"#;
        let parsed: ResetPasswordRequest = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.token, "abc");
        assert_eq!(parsed.new_password, "s3cret-pass");
    }

    #[test]
    fn forgot_password_response_carries_token() {
        let resp = ForgotPasswordResponse {
            message: "A password reset link has been created.".into(),
            token: "tok".into(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"token\":\"tok\""));
        assert!(json.contains("\"message\""));
    }
}
