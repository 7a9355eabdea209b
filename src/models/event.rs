use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Event listing (fairs, webinars, open days).
///
/// Start/end are stored as separate date and time strings exactly as the
/// admin panel submits them; they are display fields, not instants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_image: Option<String>,
    #[serde(default)]
    pub image_gallery: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(
        rename = "joinURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub join_url: Option<String>,
    pub event_start_date: String,
    pub event_start_time: String,
    pub event_end_date: String,
    pub event_end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "eventURL")]
    pub event_url: String,
    #[serde(with = "crate::models::time::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::models::time::datetime")]
    pub updated_at: DateTime<Utc>,
}
