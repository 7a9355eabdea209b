//! Small site-wide documents: newsletter subscribers, welcome-modal
//! registrations and the singleton welcome-modal configuration.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Newsletter subscriber; `email` is unique within the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSubscriber {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    #[serde(with = "crate::models::time::datetime")]
    pub created_at: DateTime<Utc>,
}

/// Lead captured through the welcome-modal signup form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalRegistration {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interested_course: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(with = "crate::models::time::datetime")]
    pub created_at: DateTime<Utc>,
}

/// Singleton configuration for the landing-page welcome modal.
/// `expires_at` of null means the modal never expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeModal {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "largeImageURL")]
    pub large_image_url: String,
    #[serde(rename = "phoneImageURL")]
    pub phone_image_url: String,
    pub form_link: String,
    #[serde(default, with = "crate::models::time::datetime_option")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(with = "crate::models::time::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::models::time::datetime")]
    pub updated_at: DateTime<Utc>,
}
