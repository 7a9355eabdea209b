//! Lead-capture documents and the admin fields they share.
//!
//! Every lead type (enquiries, applications, expo registrations, live
//! feedback) carries the same admin surface: a markAsRead/highlight flag
//! pair plus append-only `notes` and `status` sub-lists.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One appended admin note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteEntry {
    pub note: String,
    #[serde(with = "crate::models::time::datetime")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// One appended status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: String,
    #[serde(with = "crate::models::time::datetime")]
    pub timestamp: DateTime<Utc>,
}

/// Admin mutation applied to a lead document: flag toggles plus at most
/// one note and one status entry to append.
#[derive(Debug, Clone, Default)]
pub struct AdminPatch {
    pub mark_as_read: Option<bool>,
    pub highlight: Option<bool>,
    pub note: Option<NoteEntry>,
    pub status: Option<StatusEntry>,
}

impl AdminPatch {
    pub fn is_empty(&self) -> bool {
        self.mark_as_read.is_none()
            && self.highlight.is_none()
            && self.note.is_none()
            && self.status.is_none()
    }
}

/// Contact-form enquiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub subject: String,
    pub email: String,
    pub message: String,
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
}

/// Study-abroad application submitted from the public form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_intake: Option<String>,
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
}
