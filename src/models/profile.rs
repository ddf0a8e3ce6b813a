use serde::{Deserialize, Serialize};

/// Premium state attached to an app user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub is_premium: bool,
    /// ISO-8601 timestamp; absent for users who never purchased
    #[serde(default)]
    pub subscription_expiry: Option<String>,
}
