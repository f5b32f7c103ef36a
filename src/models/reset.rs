use serde::{Deserialize, Serialize};

/// Body of `POST reset_password_code`.
#[derive(Debug, Clone, Serialize)]
pub struct ResetCodeRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResetCodeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Form posted by the reset-password page.
#[derive(Debug, Deserialize)]
pub struct ResetForm {
    #[serde(default)]
    pub email: String,
}

/// View-local state of the reset-password screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetRequestState {
    pub email: String,
    pub loading: bool,
    pub is_email_sent: bool,
}
