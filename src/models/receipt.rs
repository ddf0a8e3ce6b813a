use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result, msg};

use super::PlanType;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyReceiptRequest {
    pub user_id: String,
    pub receipt_data: String,
    pub product_id: String,
}

impl VerifyReceiptRequest {
    /// Check field shapes before any side effect. Returns the parsed user id.
    ///
    /// Only the hyphenated 8-4-4-4-12 form is accepted for `userId`.
    pub fn validate(&self) -> Result<Uuid> {
        let user_id = parse_hyphenated(&self.user_id)
            .ok_or_else(|| AppError::BadRequest(msg::INVALID_USER_ID.into()))?;
        if self.receipt_data.is_empty() {
            return Err(AppError::BadRequest(msg::RECEIPT_DATA_REQUIRED.into()));
        }
        if self.product_id.is_empty() {
            return Err(AppError::BadRequest(msg::PRODUCT_ID_REQUIRED.into()));
        }
        Ok(user_id)
    }
}

fn parse_hyphenated(value: &str) -> Option<Uuid> {
    let hyphens_in_place = value.len() == 36
        && value
            .char_indices()
            .all(|(i, c)| matches!(i, 8 | 13 | 18 | 23) == (c == '-'));
    if !hyphens_in_place {
        return None;
    }
    Uuid::parse_str(value).ok()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyReceiptResponse {
    pub original_transaction_id: String,
    pub is_premium: bool,
    pub subscription_expiry: String,
    pub plan_type: PlanType,
}
