use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Card,
    Story,
    Play,
    Awareness,
    Bedtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    Story,
    Card,
    GameColoring,
    GameMatching,
    GameCounting,
    GameDrawing,
    GameFindShape,
    GameWhatHear,
    Awareness,
    Bedtime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCategory {
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    pub key: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_item_image: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_orientation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewContent {
    pub category_id: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewChildProfile {
    pub user_id: String,
    pub name: String,
    pub avatar_type: String,
    pub background_color: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChildProfile {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub deleted_at: Option<String>,
}
