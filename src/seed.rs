//! Demo catalog seeding, run with `storekeeper --seed`.
//!
//! Wipes the catalog tables, inserts a small fixed catalog and makes sure a
//! demo login with one child profile exists. Safe to run repeatedly.

use serde_json::json;

use crate::db::{Database, queries};
use crate::error::{AppError, Result};
use crate::models::{
    Category, CategoryType, ContentType, CreateAuthUser, NewCategory, NewChildProfile, NewContent,
};

pub const DEMO_EMAIL: &str = "test@demo.com";
pub const DEMO_PASSWORD: &str = "password123";

const PLACEHOLDER_IMAGE: &str = "https://placehold.co/600x400";
const PLACEHOLDER_BACKGROUND: &str = "https://placehold.co/1200x800";

/// What a seed run produced.
#[derive(Debug, Clone)]
pub struct SeedSummary {
    pub categories: usize,
    pub contents: usize,
    pub user_id: String,
    /// Whether the demo user already existed and only had its password reset
    pub user_existed: bool,
    pub child_profile_created: bool,
}

pub async fn run(db: &dyn Database) -> Result<SeedSummary> {
    tracing::info!("Starting seed");

    tracing::info!("Clearing catalog tables");
    for table in [queries::FAVORITES, queries::CONTENTS, queries::CATEGORIES] {
        let removed = queries::clear_table(db, table).await?;
        tracing::debug!(table, removed, "Cleared table");
    }

    tracing::info!("Inserting categories");
    let mut categories = Vec::new();
    for input in demo_categories() {
        categories.push(queries::create_category(db, &input).await?);
    }

    tracing::info!("Inserting contents");
    let contents = queries::create_contents(db, &demo_contents(&categories)?).await?;

    tracing::info!("Ensuring demo user exists");
    let (user_id, user_existed) = ensure_demo_user(db).await?;

    let child_profile_created = if queries::list_active_child_profiles(db, &user_id)
        .await?
        .is_empty()
    {
        queries::create_child_profile(
            db,
            &NewChildProfile {
                user_id: user_id.clone(),
                name: "Test Çocuk".to_string(),
                avatar_type: "boy".to_string(),
                background_color: "bg-blue-100".to_string(),
                is_active: true,
            },
        )
        .await?;
        tracing::info!("Demo child profile created");
        true
    } else {
        tracing::info!("Demo child profile already exists");
        false
    };

    let summary = SeedSummary {
        categories: categories.len(),
        contents,
        user_id,
        user_existed,
        child_profile_created,
    };
    tracing::info!(
        categories = summary.categories,
        contents = summary.contents,
        user = DEMO_EMAIL,
        user_id = %summary.user_id,
        "Seed complete"
    );
    Ok(summary)
}

/// Reset the demo user's password, or create the user if missing.
async fn ensure_demo_user(db: &dyn Database) -> Result<(String, bool)> {
    let users = db
        .list_auth_users()
        .await
        .map_err(|e| e.context("Failed to list users"))?;

    if let Some(user) = users
        .into_iter()
        .find(|u| u.email.as_deref() == Some(DEMO_EMAIL))
    {
        tracing::warn!("Demo user already exists, resetting password");
        db.update_auth_user_password(&user.id, DEMO_PASSWORD)
            .await
            .map_err(|e| e.context("Failed to update user"))?;
        return Ok((user.id, true));
    }

    let user = db
        .create_auth_user(&CreateAuthUser {
            email: DEMO_EMAIL.to_string(),
            password: DEMO_PASSWORD.to_string(),
            email_confirm: true,
        })
        .await
        .map_err(|e| e.context("Failed to create user"))?;
    tracing::info!("Demo user created");
    Ok((user.id, false))
}

fn demo_categories() -> Vec<NewCategory> {
    let category = |category_type: CategoryType,
                    key: &str,
                    name: &str,
                    description: &str,
                    color: &str,
                    text_position: &str,
                    order: i32| {
        NewCategory {
            category_type,
            key: key.to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
            image_url: Some(PLACEHOLDER_IMAGE.to_string()),
            background_image_url: None,
            background_color: Some(color.to_string()),
            show_item_image: Some(true),
            text_position: Some(text_position.to_string()),
            text_orientation: Some("horizontal".to_string()),
            text_size: Some("medium".to_string()),
            display_order: Some(order),
        }
    };

    vec![
        category(
            CategoryType::Bedtime,
            "uyku-masallari",
            "Uyku Masalları",
            "Uyumadan önce dinlenecek güzel masallar",
            "bg-blue-400",
            "bottom",
            1,
        ),
        category(
            CategoryType::Card,
            "meslekler",
            "Meslekleri Tanıyalım",
            "Farklı meslekleri öğrenelim",
            "bg-green-400",
            "bottom",
            2,
        ),
        category(
            CategoryType::Play,
            "matematik",
            "Eğlenceli Matematik",
            "Matematik oyunları ve aktiviteler",
            "bg-purple-400",
            "center",
            3,
        ),
    ]
}

fn category_id(categories: &[Category], key: &str) -> Result<String> {
    categories
        .iter()
        .find(|c| c.key == key)
        .map(|c| c.id.clone())
        .ok_or_else(|| AppError::Database(format!("Category {} not found after insert", key)))
}

fn demo_contents(categories: &[Category]) -> Result<Vec<NewContent>> {
    let bedtime = category_id(categories, "uyku-masallari")?;
    let jobs = category_id(categories, "meslekler")?;
    let math = category_id(categories, "matematik")?;

    let item = |category_id: &str,
                content_type: ContentType,
                title: &str,
                slug: &str,
                order: i32| NewContent {
        category_id: category_id.to_string(),
        content_type,
        title: title.to_string(),
        slug: Some(slug.to_string()),
        image_url: Some(PLACEHOLDER_IMAGE.to_string()),
        background_image_url: None,
        audio_file_url: None,
        text_content: None,
        capture_text: None,
        display_order: Some(order),
        metadata: None,
    };

    let story = |title: &str, slug: &str, text: &str, order: i32, pages: u32, minutes: u32| NewContent {
        background_image_url: Some(PLACEHOLDER_BACKGROUND.to_string()),
        audio_file_url: Some(PLACEHOLDER_IMAGE.to_string()),
        text_content: Some(text.to_string()),
        capture_text: Some(title.to_string()),
        metadata: Some(json!({ "page_count": pages, "duration_minutes": minutes })),
        ..item(&bedtime, ContentType::Story, title, slug, order)
    };

    let job = |title: &str, slug: &str, text: &str, description: &str, order: i32| NewContent {
        text_content: Some(text.to_string()),
        capture_text: Some(title.to_string()),
        metadata: Some(json!({ "description": description })),
        ..item(&jobs, ContentType::Card, title, slug, order)
    };

    Ok(vec![
        story(
            "Ayıcık ve Yıldızlar",
            "ayicik-ve-yildizlar",
            "Bir varmış bir yokmuş, evvel zaman içinde...",
            1,
            10,
            5,
        ),
        story(
            "Büyülü Orman",
            "buyulu-orman",
            "Büyülü ormanda yaşayan sevimli hayvanların hikayesi...",
            2,
            12,
            6,
        ),
        job(
            "İtfaiyeci",
            "itfaiyeci",
            "İtfaiyeciler yangınları söndürür ve insanları kurtarır.",
            "İtfaiyecilerin ne yaptığını öğrenelim",
            1,
        ),
        job(
            "Doktor",
            "doktor",
            "Doktorlar hastaları iyileştirir ve sağlığımızı korur.",
            "Doktorların ne yaptığını öğrenelim",
            2,
        ),
        NewContent {
            metadata: Some(json!({
                "difficulty": "easy",
                "instructions": "Ekrandaki nesneleri sayın",
                "svg_id": "counting-template-1",
            })),
            ..item(
                &math,
                ContentType::GameCounting,
                "Sayıları Sayalım",
                "sayilari-sayalim",
                1,
            )
        },
    ])
}
