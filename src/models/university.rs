use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};

/// One row of the course/fee table on a university page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseAndFee {
    pub course: String,
    pub course_fee: String,
    pub course_duration: String,
}

/// Free-form labelled value shown in the "other information" block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtherInfo {
    pub label: String,
    pub value: Bson,
}

/// Call-to-action block configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_url: Option<String>,
    #[serde(default)]
    pub is_form_hidden: bool,
}

/// University profile document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct University {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub university_url: String,
    pub img: String,
    #[serde(default)]
    pub gallery: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub established: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking_and_achievement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_and_faculty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accommodation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub international_students: Option<String>,
    #[serde(default)]
    pub course_and_fees: Vec<CourseAndFee>,
    #[serde(default)]
    pub related_events_url: Vec<String>,
    #[serde(default)]
    pub related_blogs_url: Vec<String>,
    #[serde(rename = "hasPartnershipWithSGE", default)]
    pub has_partnership_with_sge: bool,
    #[serde(default)]
    pub others_info: Vec<OtherInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta: Option<Cta>,
    /// Catch-all bag for page sections that have no dedicated field yet.
    #[serde(default)]
    pub others: Document,
    #[serde(with = "crate::models::time::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::models::time::datetime")]
    pub updated_at: DateTime<Utc>,
}
