use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Allowed blog publication states.
pub const VALID_BLOG_STATUSES: &[&str] = &["publish", "notPublished"];

/// A question/answer pair rendered in the blog FAQ section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// One entry of the append-only version history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    pub version: String,
    #[serde(with = "crate::models::time::datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Blog post document.
///
/// `categories` holds `BlogCategory` ids and must stay non-empty.
/// `parent_blog` points at another blog, forming a shallow series tree;
/// `child_order` ranks siblings under the same parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(rename = "blogURL")]
    pub blog_url: String,
    pub categories: Vec<ObjectId>,
    pub img: String,
    #[serde(with = "crate::models::time::datetime")]
    pub date: DateTime<Utc>,
    pub author: String,
    pub summary: String,
    #[serde(default)]
    pub table_of_contents: Vec<String>,
    pub main_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default)]
    pub explore_more_category: Vec<String>,
    #[serde(default)]
    pub faqs: Vec<Faq>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub university_category_for_suggestion: Option<String>,
    #[serde(default)]
    pub manual_category_suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_btn: Option<String>,
    #[serde(default)]
    pub is_form_hidden: bool,
    pub status: String,
    #[serde(default)]
    pub parent_blog: Option<ObjectId>,
    #[serde(default)]
    pub child_order: i32,
    pub version: String,
    #[serde(default)]
    pub version_history: Vec<VersionEntry>,
    #[serde(with = "crate::models::time::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::models::time::datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Blog category. `is_system_protected` pins built-in categories such as
/// "uncategorized": their slug cannot change and they cannot be deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogCategory {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_system_protected: bool,
    #[serde(with = "crate::models::time::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::models::time::datetime")]
    pub updated_at: DateTime<Utc>,
}

/// A deleted blog parked in the trash collection, keeping the original id
/// and a full copy of the document as it was at deletion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashedBlog {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub original_id: ObjectId,
    #[serde(with = "crate::models::time::datetime")]
    pub deleted_at: DateTime<Utc>,
    pub blog: Blog,
}

/// Parse the stored version and produce the next one ("1.0" -> "2.0").
/// Unparseable versions restart the sequence from 1.0.
pub fn next_version(current: &str) -> String {
    let parsed = current.parse::<f64>().unwrap_or(1.0);
    format!("{:.1}", parsed + 1.0)
}
