//! Maps App Store notifications to premium/subscription state.

use crate::db::{Database, queries};
use crate::error::Result;
use crate::models::{NotificationType, PlanType, SubscriptionStatus, UpsertSubscription};

/// Target state for a notification. `None` leaves that piece unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub premium: Option<bool>,
    pub status: Option<SubscriptionStatus>,
}

impl Transition {
    pub const LOG_ONLY: Transition = Transition {
        premium: None,
        status: None,
    };

    const fn to(premium: Option<bool>, status: SubscriptionStatus) -> Self {
        Transition {
            premium,
            status: Some(status),
        }
    }

    pub fn is_log_only(&self) -> bool {
        self.premium.is_none() && self.status.is_none()
    }
}

pub fn transition(notification_type: NotificationType) -> Transition {
    use NotificationType::*;

    match notification_type {
        InitialBuy | DidRenew | RenewalExtended | RenewalExtension => {
            Transition::to(Some(true), SubscriptionStatus::Active)
        }
        // Cancelled but still entitled until expiry
        Cancel | DidChangeRenewalStatus => Transition::to(None, SubscriptionStatus::GracePeriod),
        Expire | DidFailToRenew | GracePeriodExpired => {
            Transition::to(Some(false), SubscriptionStatus::Expired)
        }
        Refund | Revoke => Transition::to(Some(false), SubscriptionStatus::Expired),
        DidChangeRenewalPref | PriceIncrease => Transition::LOG_ONLY,
    }
}

/// Like [`transition`] for a raw type name; unrecognized names are log-only.
pub fn transition_for(name: &str) -> Transition {
    name.parse::<NotificationType>()
        .map(transition)
        .unwrap_or(Transition::LOG_ONLY)
}

/// Apply a notification to a known user.
///
/// The premium flag is written without touching the stored expiry. The
/// subscription row is only written when a transaction id is known, and
/// always as a monthly plan since the notification does not carry one.
pub async fn apply(
    db: &dyn Database,
    user_id: &str,
    notification_type: &str,
    original_transaction_id: Option<&str>,
) -> Result<Transition> {
    let target = transition_for(notification_type);
    if target.is_log_only() {
        tracing::info!("Unhandled notification type: {}", notification_type);
        return Ok(target);
    }

    if let Some(is_premium) = target.premium {
        queries::update_user_premium_status(db, user_id, is_premium, None).await?;
    }

    if let (Some(status), Some(original_transaction_id)) = (target.status, original_transaction_id)
    {
        queries::upsert_subscription(
            db,
            &UpsertSubscription {
                user_id: user_id.to_string(),
                original_transaction_id: original_transaction_id.to_string(),
                status,
                plan_type: PlanType::Monthly,
            },
        )
        .await?;
    }

    tracing::debug!(
        user_id,
        notification_type,
        ?target,
        "Applied subscription notification"
    );
    Ok(target)
}
