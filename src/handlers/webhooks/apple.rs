//! App Store server notifications.
//!
//! Notifications carry no user id, so they are logged and acknowledged
//! without touching the store. [`crate::reconcile`] holds the state changes
//! they map to once a transaction can be traced back to a user.

use crate::envelope::Envelope;
use crate::error::Result;
use crate::extractors::Json;
use crate::models::{AppleNotification, NotificationType};

pub async fn handle_apple_webhook(
    Json(notification): Json<AppleNotification>,
) -> Result<Envelope<()>> {
    let notification_type = notification.notification_type;
    tracing::info!("Received Apple webhook: {}", notification_type.as_ref());

    let info = notification.latest_receipt_info();
    tracing::info!(
        notification_type = notification_type.as_ref(),
        original_transaction_id = info.original_transaction_id.as_deref(),
        product_id = info.product_id.as_deref(),
        expires_date_ms = info.expires_date_ms.as_deref(),
        environment = ?notification.environment,
        "Apple notification details"
    );

    tracing::info!("{}", describe(notification_type));

    Ok(Envelope::message("Webhook processed"))
}

/// Log line for each notification type.
pub fn describe(notification_type: NotificationType) -> &'static str {
    use NotificationType::*;

    match notification_type {
        InitialBuy => "Initial purchase detected",
        DidRenew => "Subscription renewed",
        DidFailToRenew => "Subscription renewal failed",
        Cancel => "Subscription cancelled",
        Expire => "Subscription expired",
        GracePeriodExpired => "Grace period expired",
        Refund => "Subscription refunded",
        Revoke => "Subscription revoked",
        DidChangeRenewalPref => "Renewal preference changed",
        DidChangeRenewalStatus => "Renewal status changed",
        PriceIncrease => "Price increase notification",
        RenewalExtended => "Renewal extended",
        RenewalExtension => "Renewal extension",
    }
}
