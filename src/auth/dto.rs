use serde::{Deserialize, Serialize};

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Login view state. `error` is set after a rejected attempt.
#[derive(Debug, Default, Serialize)]
pub struct LoginView {
    pub error: Option<&'static str>,
}
