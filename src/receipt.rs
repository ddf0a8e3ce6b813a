//! Receipt validation.
//!
//! Validation sits behind [`ReceiptValidator`] so a real store client can
//! replace the mock without touching handlers.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;

use crate::error::Result;
use crate::models::PlanType;
use crate::util::days_after;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Outcome of validating one receipt.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub original_transaction_id: String,
    pub product_id: String,
    /// Expiry reported by the store, if it reported one
    pub expires_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait ReceiptValidator: Send + Sync {
    /// Validator name for logging (e.g. "mock-apple")
    fn name(&self) -> &'static str;

    async fn validate(&self, receipt_data: &str, product_id: &str) -> Result<ValidationResult>;
}

/// Stand-in for the App Store `verifyReceipt` call. Always succeeds.
#[derive(Debug, Clone)]
pub struct MockAppleValidator {
    delay: Duration,
    fixed_expiry_days: Option<i64>,
}

impl Default for MockAppleValidator {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

impl MockAppleValidator {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            fixed_expiry_days: None,
        }
    }

    /// Report an explicit expiry `days` after validation, overriding the
    /// plan-based default.
    pub fn with_fixed_expiry_days(mut self, days: i64) -> Self {
        self.fixed_expiry_days = Some(days);
        self
    }
}

#[async_trait]
impl ReceiptValidator for MockAppleValidator {
    fn name(&self) -> &'static str {
        "mock-apple"
    }

    async fn validate(&self, _receipt_data: &str, product_id: &str) -> Result<ValidationResult> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let now = Utc::now();
        Ok(ValidationResult {
            is_valid: true,
            original_transaction_id: mock_transaction_id(now),
            product_id: product_id.to_string(),
            expires_at: self.fixed_expiry_days.map(|days| days_after(now, days)),
        })
    }
}

/// `mock_<unix millis>_<6 random base36 chars>`
pub fn mock_transaction_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("mock_{}_{}", now.timestamp_millis(), suffix)
}

/// The store-reported expiry when present, else one billing period from `now`.
pub fn subscription_expiry(
    reported: Option<DateTime<Utc>>,
    plan: PlanType,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    reported.unwrap_or_else(|| days_after(now, plan.period_days()))
}
