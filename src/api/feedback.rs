use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::db::feedback_repository::FeedbackRepository;
use crate::error::AppError;
use crate::models::feedback::LiveFeedback;

use super::enquiries::AdminUpdateRequest;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateFeedbackRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub feedback: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedbackListResponse {
    pub total: usize,
    pub data: Vec<LiveFeedback>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedbackUpdateResponse {
    pub message: String,
    pub data: LiveFeedback,
}

/// Core feedback intake logic. All validation failures are collected
/// into one response rather than reported one at a time.
pub async fn process_create_feedback(
    feedback_repo: &dyn FeedbackRepository,
    request: CreateFeedbackRequest,
) -> Result<LiveFeedback, AppError> {
    let mut details = Vec::new();

    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    if let Some(name) = &name {
        if name.len() < 2 || name.len() > 200 {
            details.push("Name must be between 2 and 200 characters".to_string());
        }
    }

    let email = request.email.as_deref().unwrap_or("").trim().to_lowercase();
    if email.is_empty() {
        details.push("Email is required".to_string());
    }

    let feedback = request.feedback.as_deref().unwrap_or("").trim().to_string();
    if feedback.len() < 5 || feedback.len() > 5000 {
        details.push("Feedback must be between 5 and 5000 characters".to_string());
    }

    if !details.is_empty() {
        return Err(AppError::validation("Validation failed", details));
    }

    let now = Utc::now();
    feedback_repo
        .insert(LiveFeedback {
            id: None,
            name,
            email,
            feedback,
            mark_as_read: false,
            highlight: false,
            notes: vec![],
            status: vec![],
            created_at: now,
            updated_at: now,
        })
        .await
}

pub async fn process_update_feedback(
    feedback_repo: &dyn FeedbackRepository,
    id_raw: &str,
    request: AdminUpdateRequest,
) -> Result<LiveFeedback, AppError> {
    let id = ObjectId::parse_str(id_raw)
        .map_err(|_| AppError::BadRequest("Invalid feedback id".into()))?;

    feedback_repo
        .apply_admin_patch(id, &request.into_patch())
        .await?
        .ok_or_else(|| AppError::NotFound("Feedback not found".into()))
}

/// Axum handler for `POST /live-feedback`.
pub async fn create_feedback_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::Json(request): axum::Json<CreateFeedbackRequest>,
) -> Result<(axum::http::StatusCode, axum::Json<serde_json::Value>), AppError> {
    process_create_feedback(state.feedback_repo.as_ref(), request).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        axum::Json(serde_json::json!({
            "message": "Feedback submitted successfully",
        })),
    ))
}

/// Axum handler for `GET /live-feedback`.
pub async fn list_feedback_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
) -> Result<axum::Json<FeedbackListResponse>, AppError> {
    let data = state.feedback_repo.list_all().await?;
    Ok(axum::Json(FeedbackListResponse {
        total: data.len(),
        data,
    }))
}

/// Axum handler for `PATCH /live-feedback/{id}`.
pub async fn update_feedback_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(id): axum::extract::Path<String>,
    axum::Json(request): axum::Json<AdminUpdateRequest>,
) -> Result<axum::Json<FeedbackUpdateResponse>, AppError> {
    let feedback = process_update_feedback(state.feedback_repo.as_ref(), &id, request).await?;
    Ok(axum::Json(FeedbackUpdateResponse {
        message: "Feedback updated successfully".to_string(),
        data: feedback,
    }))
}
