use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

use crate::models::lead::{NoteEntry, StatusEntry};

/// One prior qualification from the academic-history step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AcademicRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
}

/// Extra labelled value captured by event-specific form variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdditionalInfoEntry {
    pub label: String,
    pub value: Bson,
}

/// Multi-step expo registration, the richest of the lead documents.
/// Event attribution fields (`event_id`, `event_source_name`,
/// `event_source_link`) tie a registration back to the fair it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpoRegistration {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub citizenship: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residence: Option<String>,
    #[serde(default)]
    pub study_destinations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_study_destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_study_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_study_level: Option<String>,
    #[serde(default)]
    pub academic_history: Vec<AcademicRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_test: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_score: Option<String>,
    #[serde(default)]
    pub no_english_cert: bool,
    #[serde(default = "default_work_experience")]
    pub work_experience: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_source_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_source_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
    #[serde(default)]
    pub additional_info: Vec<AdditionalInfoEntry>,
    #[serde(default)]
    pub consent_to_terms: bool,
    #[serde(default)]
    pub highlight: bool,
    #[serde(default)]
    pub mark_as_read: bool,
    #[serde(default)]
    pub notes: Vec<NoteEntry>,
    #[serde(default)]
    pub status: Vec<StatusEntry>,
    #[serde(with = "crate::models::time::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::models::time::datetime")]
    pub updated_at: DateTime<Utc>,
}

fn default_work_experience() -> String {
    "No".to_string()
}
