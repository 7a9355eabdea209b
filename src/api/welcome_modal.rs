use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::db::welcome_modal_repository::WelcomeModalRepository;
use crate::error::AppError;
use crate::models::site::WelcomeModal;
use crate::models::time::parse_client_datetime;

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeModalRequest {
    #[serde(rename = "largeImageURL")]
    pub large_image_url: Option<String>,
    #[serde(rename = "phoneImageURL")]
    pub phone_image_url: Option<String>,
    pub form_link: Option<String>,
    /// Absent leaves the stored expiry untouched; explicit null clears
    /// it so the modal never expires.
    #[serde(default, deserialize_with = "double_option")]
    pub expires_at: Option<Option<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeModalResponse {
    pub message: String,
    pub data: WelcomeModal,
}

/// Core upsert logic for the singleton, separated from the HTTP layer
/// for testability.
pub async fn process_upsert_welcome_modal(
    welcome_modal: &dyn WelcomeModalRepository,
    request: WelcomeModalRequest,
) -> Result<WelcomeModal, AppError> {
    let large_image_url = request
        .large_image_url
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_string();
    let phone_image_url = request
        .phone_image_url
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_string();
    let form_link = request.form_link.as_deref().unwrap_or("").trim().to_string();
    if large_image_url.is_empty() || phone_image_url.is_empty() || form_link.is_empty() {
        return Err(AppError::BadRequest(
            "largeImageURL, phoneImageURL and formLink are required".into(),
        ));
    }

    let expires_at: Option<Option<DateTime<Utc>>> = match request.expires_at {
        None => None,
        Some(None) => Some(None),
        Some(Some(raw)) => {
            let parsed = parse_client_datetime(raw.trim()).ok_or_else(|| {
                AppError::BadRequest(format!("Invalid expiresAt datetime '{raw}'"))
            })?;
            Some(Some(parsed))
        }
    };

    welcome_modal
        .upsert(&large_image_url, &phone_image_url, &form_link, expires_at)
        .await
}

/// Axum handler for `GET /welcome-modal`. A missing singleton answers
/// 404 with `exist: false` rather than the plain error shape.
pub async fn get_welcome_modal_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
) -> Result<axum::response::Response, AppError> {
    let response = match state.welcome_modal_repo.get().await? {
        Some(modal) => (
            axum::http::StatusCode::OK,
            axum::Json(serde_json::json!({ "data": modal })),
        ),
        None => (
            axum::http::StatusCode::NOT_FOUND,
            axum::Json(serde_json::json!({
                "exist": false,
                "message": "Welcome Modal not found in the database",
            })),
        ),
    };
    Ok(response.into_response())
}

/// Axum handler for `PUT /welcome-modal`.
pub async fn upsert_welcome_modal_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::Json(request): axum::Json<WelcomeModalRequest>,
) -> Result<axum::Json<WelcomeModalResponse>, AppError> {
    let modal = process_upsert_welcome_modal(state.welcome_modal_repo.as_ref(), request).await?;
    Ok(axum::Json(WelcomeModalResponse {
        message: "Welcome Modal updated successfully".to_string(),
        data: modal,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    // -- Mock implementations --

    struct MockWelcomeModalRepo {
        modal: Mutex<Option<WelcomeModal>>,
    }

    impl MockWelcomeModalRepo {
        fn new() -> Self {
            Self {
                modal: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl WelcomeModalRepository for MockWelcomeModalRepo {
        async fn get(&self) -> Result<Option<WelcomeModal>, AppError> {
            Ok(self.modal.lock().unwrap().clone())
        }

        async fn upsert(
            &self,
            large_image_url: &str,
            phone_image_url: &str,
            form_link: &str,
            expires_at: Option<Option<DateTime<Utc>>>,
        ) -> Result<WelcomeModal, AppError> {
            let mut stored = self.modal.lock().unwrap();
            let now = Utc::now();
            let modal = match stored.take() {
                Some(mut modal) => {
                    modal.large_image_url = large_image_url.to_string();
                    modal.phone_image_url = phone_image_url.to_string();
                    modal.form_link = form_link.to_string();
                    if let Some(expires_at) = expires_at {
                        modal.expires_at = expires_at;
                    }
                    modal.updated_at = now;
                    modal
                }
                None => WelcomeModal {
                    id: Some(mongodb::bson::oid::ObjectId::new()),
                    large_image_url: large_image_url.to_string(),
                    phone_image_url: phone_image_url.to_string(),
                    form_link: form_link.to_string(),
                    expires_at: expires_at.flatten(),
                    created_at: now,
                    updated_at: now,
                },
            };
            *stored = Some(modal.clone());
            Ok(modal)
        }
    }

    fn make_request() -> WelcomeModalRequest {
        WelcomeModalRequest {
            large_image_url: Some("https://cdn.example.com/modal-large.jpg".to_string()),
            phone_image_url: Some("https://cdn.example.com/modal-phone.jpg".to_string()),
            form_link: Some("https://forms.example.com/welcome".to_string()),
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_requires_all_images_and_link() {
        let repo = MockWelcomeModalRepo::new();
        let mut request = make_request();
        request.form_link = Some("".to_string());

        let result = process_upsert_welcome_modal(&repo, request).await;
        match result.unwrap_err() {
            AppError::BadRequest(msg) => {
                assert_eq!(msg, "largeImageURL, phoneImageURL and formLink are required")
            }
            other => panic!("Expected BadRequest error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upsert_sets_and_clears_expiry() {
        let repo = MockWelcomeModalRepo::new();

        let mut request = make_request();
        request.expires_at = Some(Some("2026-01-01T00:00:00Z".to_string()));
        let modal = process_upsert_welcome_modal(&repo, request).await.unwrap();
        assert!(modal.expires_at.is_some());

        // Absent expiresAt leaves the stored value alone
        let modal = process_upsert_welcome_modal(&repo, make_request()).await.unwrap();
        assert!(modal.expires_at.is_some());

        // Explicit null clears it
        let mut request = make_request();
        request.expires_at = Some(None);
        let modal = process_upsert_welcome_modal(&repo, request).await.unwrap();
        assert!(modal.expires_at.is_none());
    }

    #[tokio::test]
    async fn test_upsert_rejects_bad_expiry() {
        let repo = MockWelcomeModalRepo::new();
        let mut request = make_request();
        request.expires_at = Some(Some("next tuesday".to_string()));

        let result = process_upsert_welcome_modal(&repo, request).await;
        match result.unwrap_err() {
            AppError::BadRequest(msg) => {
                assert_eq!(msg, "Invalid expiresAt datetime 'next tuesday'")
            }
            other => panic!("Expected BadRequest error, got: {:?}", other),
        }
    }

    #[test]
    fn test_expires_at_three_states_deserialize() {
        let absent: WelcomeModalRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(absent.expires_at, None);

        let null: WelcomeModalRequest =
            serde_json::from_str(r#"{"expiresAt": null}"#).unwrap();
        assert_eq!(null.expires_at, Some(None));

        let set: WelcomeModalRequest =
            serde_json::from_str(r#"{"expiresAt": "2026-01-01"}"#).unwrap();
        assert_eq!(set.expires_at, Some(Some("2026-01-01".to_string())));
    }
}
