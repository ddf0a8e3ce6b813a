//! Typed operations over the generic [`Database`] trait.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::*;
use crate::util::to_iso;

use super::{Database, Filter, Row};

pub const PROFILES: &str = "profiles";
pub const SUBSCRIPTIONS: &str = "subscriptions";
pub const CATEGORIES: &str = "categories";
pub const CONTENTS: &str = "contents";
pub const FAVORITES: &str = "favorites";
pub const CHILD_PROFILES: &str = "child_profiles";

/// Placeholder id that never matches a real row; `neq` on it selects everything.
const NIL_ID: &str = "00000000-0000-0000-0000-000000000000";

fn to_row<T: Serialize>(value: &T) -> Result<Row> {
    match serde_json::to_value(value)? {
        Value::Object(row) => Ok(row),
        other => Err(AppError::Internal(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

fn from_row<T: DeserializeOwned>(row: Row) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

// ============ Profiles ============

/// Set the premium flag, and the expiry when one is given.
///
/// An absent expiry leaves the stored one untouched. Updating a user with no
/// profile row is not an error.
pub async fn update_user_premium_status(
    db: &dyn Database,
    user_id: &str,
    is_premium: bool,
    subscription_expiry: Option<DateTime<Utc>>,
) -> Result<()> {
    let mut patch = Row::new();
    patch.insert("is_premium".into(), Value::Bool(is_premium));
    if let Some(expiry) = subscription_expiry {
        patch.insert("subscription_expiry".into(), Value::String(to_iso(expiry)));
    }

    db.update(PROFILES, &[Filter::eq("id", user_id)], patch)
        .await
        .map_err(|e| e.context("Failed to update user premium status"))?;
    Ok(())
}

pub async fn get_profile(db: &dyn Database, user_id: &str) -> Result<Option<Profile>> {
    let rows = db.select(PROFILES, &[Filter::eq("id", user_id)]).await?;
    rows.into_iter().next().map(from_row).transpose()
}

// ============ Subscriptions ============

pub async fn get_subscription_by_transaction(
    db: &dyn Database,
    original_transaction_id: &str,
) -> Result<Option<Subscription>> {
    let rows = db
        .select(
            SUBSCRIPTIONS,
            &[Filter::eq("original_transaction_id", original_transaction_id)],
        )
        .await
        .map_err(|e| e.context("Failed to look up subscription"))?;
    rows.into_iter().next().map(from_row).transpose()
}

pub async fn list_subscriptions_for_user(
    db: &dyn Database,
    user_id: &str,
) -> Result<Vec<Subscription>> {
    db.select(SUBSCRIPTIONS, &[Filter::eq("user_id", user_id)])
        .await?
        .into_iter()
        .map(from_row)
        .collect()
}

/// Create the subscription for a transaction id, or update it in place.
///
/// The existence check and the write are separate calls, so two concurrent
/// upserts for a new transaction id can both insert.
pub async fn upsert_subscription(db: &dyn Database, input: &UpsertSubscription) -> Result<()> {
    // Existence only; the stored row is not decoded.
    let existing = db
        .select(
            SUBSCRIPTIONS,
            &[Filter::eq(
                "original_transaction_id",
                input.original_transaction_id.as_str(),
            )],
        )
        .await
        .map_err(|e| e.context("Failed to look up subscription"))?;

    if !existing.is_empty() {
        let mut patch = Row::new();
        patch.insert("status".into(), Value::String(input.status.as_ref().into()));
        patch.insert(
            "plan_type".into(),
            Value::String(input.plan_type.as_ref().into()),
        );
        patch.insert("updated_at".into(), Value::String(to_iso(Utc::now())));

        db.update(
            SUBSCRIPTIONS,
            &[Filter::eq(
                "original_transaction_id",
                input.original_transaction_id.as_str(),
            )],
            patch,
        )
        .await
        .map_err(|e| e.context("Failed to update subscription"))?;
    } else {
        let mut row = Row::new();
        row.insert("user_id".into(), Value::String(input.user_id.clone()));
        row.insert(
            "original_transaction_id".into(),
            Value::String(input.original_transaction_id.clone()),
        );
        row.insert("status".into(), Value::String(input.status.as_ref().into()));
        row.insert(
            "plan_type".into(),
            Value::String(input.plan_type.as_ref().into()),
        );

        db.insert(SUBSCRIPTIONS, vec![row])
            .await
            .map_err(|e| e.context("Failed to create subscription"))?;
    }

    Ok(())
}

// ============ Catalog ============

/// Delete every row of a table.
pub async fn clear_table(db: &dyn Database, table: &str) -> Result<usize> {
    db.delete(table, &[Filter::neq("id", NIL_ID)])
        .await
        .map_err(|e| e.context(&format!("Failed to clear {}", table)))
}

pub async fn create_category(db: &dyn Database, input: &NewCategory) -> Result<Category> {
    let inserted = db
        .insert(CATEGORIES, vec![to_row(input)?])
        .await
        .map_err(|e| e.context(&format!("Failed to insert category ({})", input.name)))?;
    let row = inserted
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Database(format!("Category {} was not returned", input.key)))?;
    from_row(row)
}

/// Insert content items in one request. Returns how many were stored.
pub async fn create_contents(db: &dyn Database, items: &[NewContent]) -> Result<usize> {
    let rows = items.iter().map(to_row).collect::<Result<Vec<_>>>()?;
    let inserted = db
        .insert(CONTENTS, rows)
        .await
        .map_err(|e| e.context("Failed to insert contents"))?;
    Ok(inserted.len())
}

/// Child profiles of a user that are not soft-deleted.
pub async fn list_active_child_profiles(
    db: &dyn Database,
    user_id: &str,
) -> Result<Vec<ChildProfile>> {
    db.select(
        CHILD_PROFILES,
        &[Filter::eq("user_id", user_id), Filter::is_null("deleted_at")],
    )
    .await?
    .into_iter()
    .map(from_row)
    .collect()
}

pub async fn create_child_profile(db: &dyn Database, input: &NewChildProfile) -> Result<()> {
    db.insert(CHILD_PROFILES, vec![to_row(input)?])
        .await
        .map_err(|e| e.context("Failed to create child profile"))?;
    Ok(())
}
