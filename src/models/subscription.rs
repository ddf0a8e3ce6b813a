use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    GracePeriod,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlanType {
    Monthly,
    Yearly,
}

impl PlanType {
    /// Derive the plan from the store's product identifier naming convention.
    ///
    /// Case-sensitive: `com.app.Yearly` is a monthly plan.
    pub fn from_product_id(product_id: &str) -> Self {
        if product_id.contains("yearly") || product_id.contains("annual") {
            PlanType::Yearly
        } else {
            PlanType::Monthly
        }
    }

    /// Billing period length used when the store does not report an expiry.
    pub fn period_days(&self) -> i64 {
        match self {
            PlanType::Monthly => 30,
            PlanType::Yearly => 365,
        }
    }
}

/// One row per store transaction chain, keyed by `original_transaction_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub original_transaction_id: String,
    pub status: SubscriptionStatus,
    pub plan_type: PlanType,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Input for creating or updating a subscription record.
#[derive(Debug, Clone)]
pub struct UpsertSubscription {
    pub user_id: String,
    pub original_transaction_id: String,
    pub status: SubscriptionStatus,
    pub plan_type: PlanType,
}
