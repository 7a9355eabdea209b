use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::lead::{NoteEntry, StatusEntry};

/// Feedback captured from the live widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveFeedback {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    pub feedback: String,
    #[serde(default)]
    pub mark_as_read: bool,
    #[serde(default)]
    pub highlight: bool,
    #[serde(default)]
    pub notes: Vec<NoteEntry>,
    #[serde(default)]
    pub status: Vec<StatusEntry>,
    #[serde(with = "crate::models::time::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::models::time::datetime")]
    pub updated_at: DateTime<Utc>,
}
