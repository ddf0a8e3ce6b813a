use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, EnumString};

/// App Store server notification types (version 1 notifications).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    InitialBuy,
    DidRenew,
    DidFailToRenew,
    DidChangeRenewalPref,
    DidChangeRenewalStatus,
    Cancel,
    Expire,
    GracePeriodExpired,
    Refund,
    Revoke,
    PriceIncrease,
    RenewalExtended,
    RenewalExtension,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Sandbox,
    Production,
}

/// Body of a `POST /webhook/apple` delivery.
///
/// Only `notification_type` is required. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct AppleNotification {
    pub notification_type: NotificationType,
    #[serde(default)]
    pub unified_receipt: Option<UnifiedReceipt>,
    #[serde(default)]
    pub bid: Option<String>,
    #[serde(default)]
    pub bvrs: Option<String>,
    #[serde(default)]
    pub environment: Option<Environment>,
    #[serde(default)]
    pub auto_renew_status: Option<bool>,
    #[serde(default)]
    pub auto_renew_status_change_date: Option<String>,
    #[serde(default)]
    pub auto_renew_status_change_date_ms: Option<String>,
    #[serde(default)]
    pub auto_renew_status_change_date_pst: Option<String>,
    #[serde(default)]
    pub latest_expired_receipt_info: Option<Value>,
    #[serde(default)]
    pub latest_receipt: Option<String>,
    #[serde(default)]
    pub latest_receipt_info: Option<Vec<Value>>,
    #[serde(default)]
    pub pending_renewal_info: Option<Vec<Value>>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UnifiedReceipt {
    #[serde(default)]
    pub latest_receipt_info: Option<Vec<Value>>,
    #[serde(default)]
    pub latest_receipt: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
}

/// The fields of a receipt-info entry the webhook logs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReceiptInfo {
    pub original_transaction_id: Option<String>,
    pub product_id: Option<String>,
    pub expires_date_ms: Option<String>,
}

impl AppleNotification {
    /// First entry of `unified_receipt.latest_receipt_info`, if any.
    ///
    /// Entries are loosely typed on the wire; non-string fields read as absent.
    pub fn latest_receipt_info(&self) -> ReceiptInfo {
        let Some(entry) = self
            .unified_receipt
            .as_ref()
            .and_then(|r| r.latest_receipt_info.as_ref())
            .and_then(|list| list.first())
        else {
            return ReceiptInfo::default();
        };

        let field = |name: &str| entry.get(name).and_then(Value::as_str).map(String::from);
        ReceiptInfo {
            original_transaction_id: field("original_transaction_id"),
            product_id: field("product_id"),
            expires_date_ms: field("expires_date_ms"),
        }
    }
}
