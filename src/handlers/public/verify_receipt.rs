use axum::extract::State;
use chrono::Utc;

use crate::db::{AppState, queries};
use crate::envelope::Envelope;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::models::{
    PlanType, SubscriptionStatus, UpsertSubscription, VerifyReceiptRequest, VerifyReceiptResponse,
};
use crate::receipt::subscription_expiry;
use crate::util::to_iso;

/// `POST /api/verify-receipt`
///
/// Validates a purchase receipt, marks the user premium until the derived
/// expiry and records the subscription as active. The profile write and the
/// subscription write are not atomic.
pub async fn verify_receipt(
    State(state): State<AppState>,
    Json(request): Json<VerifyReceiptRequest>,
) -> Result<Envelope<VerifyReceiptResponse>> {
    let user_id = request.validate()?.to_string();

    tracing::info!(
        user_id = %user_id,
        product_id = %request.product_id,
        validator = state.validator.name(),
        "Verifying receipt"
    );

    let result = state
        .validator
        .validate(&request.receipt_data, &request.product_id)
        .await?;
    if !result.is_valid {
        tracing::warn!(user_id = %user_id, "Receipt rejected by validator");
        return Err(AppError::InvalidReceipt);
    }

    let plan_type = PlanType::from_product_id(&request.product_id);
    let expiry = subscription_expiry(result.expires_at, plan_type, Utc::now());

    queries::update_user_premium_status(&*state.db, &user_id, true, Some(expiry)).await?;
    queries::upsert_subscription(
        &*state.db,
        &UpsertSubscription {
            user_id: user_id.clone(),
            original_transaction_id: result.original_transaction_id.clone(),
            status: SubscriptionStatus::Active,
            plan_type,
        },
    )
    .await?;

    tracing::info!(
        user_id = %user_id,
        original_transaction_id = %result.original_transaction_id,
        plan_type = plan_type.as_ref(),
        "Receipt verified, premium granted"
    );

    Ok(Envelope::data(VerifyReceiptResponse {
        original_transaction_id: result.original_transaction_id,
        is_premium: true,
        subscription_expiry: to_iso(expiry),
        plan_type,
    }))
}
