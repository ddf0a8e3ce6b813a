use serde::{Deserialize, Serialize};

/// A user account in the hosted auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateAuthUser {
    pub email: String,
    pub password: String,
    pub email_confirm: bool,
}
