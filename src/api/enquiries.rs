use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::db::enquiry_repository::EnquiryRepository;
use crate::error::AppError;
use crate::models::lead::{AdminPatch, Enquiry, NoteEntry, StatusEntry};
use crate::pagination::{ListParams, PageInfo, Paged};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateEnquiryRequest {
    pub subject: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateRequest {
    pub mark_as_read: Option<bool>,
    pub highlight: Option<bool>,
    pub note: Option<String>,
    pub status: Option<String>,
}

impl AdminUpdateRequest {
    /// Timestamp the note/status strings into appendable entries. Blank
    /// strings are treated as absent.
    pub fn into_patch(self) -> AdminPatch {
        let now = Utc::now();
        AdminPatch {
            mark_as_read: self.mark_as_read,
            highlight: self.highlight,
            note: self
                .note
                .filter(|note| !note.trim().is_empty())
                .map(|note| NoteEntry {
                    note,
                    timestamp: now,
                    author: None,
                }),
            status: self
                .status
                .filter(|status| !status.trim().is_empty())
                .map(|status| StatusEntry {
                    status,
                    timestamp: now,
                }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EnquiryUpdateResponse {
    pub message: String,
    pub data: Enquiry,
}

/// Core enquiry creation logic, separated from the HTTP layer for
/// testability.
pub async fn process_create_enquiry(
    enquiries: &dyn EnquiryRepository,
    request: CreateEnquiryRequest,
) -> Result<Enquiry, AppError> {
    let subject = request.subject.as_deref().unwrap_or("").trim().to_string();
    let email = request.email.as_deref().unwrap_or("").trim().to_string();
    let message = request.message.as_deref().unwrap_or("").trim().to_string();
    if subject.is_empty() || email.is_empty() || message.is_empty() {
        return Err(AppError::BadRequest(
            "Subject, email and message are required".into(),
        ));
    }

    enquiries
        .insert(Enquiry {
            id: None,
            subject,
            email,
            message,
            mark_as_read: false,
            highlight: false,
            notes: vec![],
            status: vec![],
            created_at: Utc::now(),
        })
        .await
}

pub async fn process_update_enquiry(
    enquiries: &dyn EnquiryRepository,
    id_raw: &str,
    request: AdminUpdateRequest,
) -> Result<Enquiry, AppError> {
    let id = ObjectId::parse_str(id_raw)
        .map_err(|_| AppError::BadRequest("Invalid enquiry id".into()))?;

    enquiries
        .apply_admin_patch(id, &request.into_patch())
        .await?
        .ok_or_else(|| AppError::NotFound("Enquiry not found".into()))
}

/// Axum handler for `POST /enquire`.
pub async fn create_enquiry_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::Json(request): axum::Json<CreateEnquiryRequest>,
) -> Result<(axum::http::StatusCode, axum::Json<serde_json::Value>), AppError> {
    process_create_enquiry(state.enquiry_repo.as_ref(), request).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        axum::Json(serde_json::json!({
            "message": "Enquire stored successfully",
        })),
    ))
}

/// Axum handler for `GET /enquiries`.
pub async fn list_enquiries_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Query(query): axum::extract::Query<crate::pagination::PageQuery>,
) -> Result<axum::Json<Paged<Enquiry>>, AppError> {
    let params = query.to_params();
    let total = state.enquiry_repo.count().await?;
    let items = state.enquiry_repo.list(&params).await?;

    Ok(axum::Json(Paged {
        items,
        page_info: PageInfo::build(&params, total),
    }))
}

/// Axum handler for `PATCH /enquiries/{id}`.
pub async fn update_enquiry_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(id): axum::extract::Path<String>,
    axum::Json(request): axum::Json<AdminUpdateRequest>,
) -> Result<axum::Json<EnquiryUpdateResponse>, AppError> {
    let enquiry = process_update_enquiry(state.enquiry_repo.as_ref(), &id, request).await?;
    Ok(axum::Json(EnquiryUpdateResponse {
        message: "Enquiry updated successfully".to_string(),
        data: enquiry,
    }))
}
