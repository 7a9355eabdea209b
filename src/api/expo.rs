use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::db::expo_repository::{ExpoFilter, ExpoRepository};
use crate::db::query::created_at_range;
use crate::error::AppError;
use crate::models::expo::{AcademicRecord, AdditionalInfoEntry, ExpoRegistration};
use crate::models::lead::{AdminPatch, NoteEntry, StatusEntry};
use crate::pagination::{PageInfo, PageQuery, Paged};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpoRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub country_code: Option<String>,
    pub phone_number: Option<String>,
    pub citizenship: Option<String>,
    pub residence: Option<String>,
    pub study_destinations: Option<Vec<String>>,
    pub other_study_destination: Option<String>,
    pub preferred_study_level: Option<String>,
    pub other_study_level: Option<String>,
    pub academic_history: Option<Vec<AcademicRecord>>,
    pub english_test: Option<String>,
    pub english_score: Option<String>,
    pub no_english_cert: Option<bool>,
    pub work_experience: Option<String>,
    pub work_details: Option<String>,
    pub event_source_link: Option<String>,
    pub event_id: Option<String>,
    pub event_source_name: Option<String>,
    pub referral_code: Option<String>,
    pub additional_info: Option<Vec<AdditionalInfoEntry>>,
    pub consent_to_terms: Option<bool>,
}

/// Filter query parameters shared by the listing and export endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpoFilterQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub event_id: Option<String>,
    pub event_source_link: Option<String>,
    pub referral_code: Option<String>,
    pub study_destination: Option<String>,
    pub highlight: Option<String>,
    pub mark_as_read: Option<String>,
}

fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

impl ExpoFilterQuery {
    pub fn to_filter(&self) -> Result<ExpoFilter, AppError> {
        Ok(ExpoFilter {
            created_range: created_at_range(self.from.as_deref(), self.to.as_deref())?,
            event_id: self.event_id.clone().filter(|v| !v.is_empty()),
            event_source_link: self.event_source_link.clone().filter(|v| !v.is_empty()),
            referral_code: self.referral_code.clone().filter(|v| !v.is_empty()),
            study_destination: self.study_destination.clone().filter(|v| !v.is_empty()),
            highlight: parse_flag(self.highlight.as_deref()),
            mark_as_read: parse_flag(self.mark_as_read.as_deref()),
        })
    }
}

/// Admin patch body. Unlike the other lead types, expo notes carry the
/// author's name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpoAdminUpdateRequest {
    pub mark_as_read: Option<bool>,
    pub highlight: Option<bool>,
    pub note: Option<String>,
    pub note_author: Option<String>,
    pub status: Option<String>,
}

impl ExpoAdminUpdateRequest {
    pub fn into_patch(self) -> AdminPatch {
        let now = Utc::now();
        let author = self.note_author.filter(|author| !author.trim().is_empty());
        AdminPatch {
            mark_as_read: self.mark_as_read,
            highlight: self.highlight,
            note: self
                .note
                .filter(|note| !note.trim().is_empty())
                .map(|note| NoteEntry {
                    note,
                    timestamp: now,
                    author,
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
pub struct ExpoMutationResponse {
    pub message: String,
    pub data: ExpoRegistration,
}

/// Core registration intake logic, separated from the HTTP layer for
/// testability.
pub async fn process_create_expo_registration(
    registrations: &dyn ExpoRepository,
    request: CreateExpoRequest,
) -> Result<ExpoRegistration, AppError> {
    let full_name = request.full_name.as_deref().unwrap_or("").trim().to_string();
    let email = request
        .email
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    let citizenship = request
        .citizenship
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_string();
    if full_name.is_empty() || email.is_empty() || citizenship.is_empty() {
        return Err(AppError::BadRequest(
            "Full name, email and citizenship are required".into(),
        ));
    }

    let now = Utc::now();
    registrations
        .insert(ExpoRegistration {
            id: None,
            full_name,
            email,
            country_code: request.country_code,
            phone_number: request.phone_number,
            citizenship,
            residence: request.residence,
            study_destinations: request.study_destinations.unwrap_or_default(),
            other_study_destination: request.other_study_destination,
            preferred_study_level: request.preferred_study_level,
            other_study_level: request.other_study_level,
            academic_history: request.academic_history.unwrap_or_default(),
            english_test: request.english_test,
            english_score: request.english_score,
            no_english_cert: request.no_english_cert.unwrap_or(false),
            work_experience: request.work_experience.unwrap_or_else(|| "No".to_string()),
            work_details: request.work_details,
            event_source_link: request.event_source_link,
            event_id: request.event_id,
            event_source_name: request.event_source_name,
            referral_code: request.referral_code,
            additional_info: request.additional_info.unwrap_or_default(),
            consent_to_terms: request.consent_to_terms.unwrap_or(false),
            highlight: false,
            mark_as_read: false,
            notes: vec![],
            status: vec![],
            created_at: now,
            updated_at: now,
        })
        .await
}

pub async fn process_update_expo_registration(
    registrations: &dyn ExpoRepository,
    id_raw: &str,
    request: ExpoAdminUpdateRequest,
) -> Result<ExpoRegistration, AppError> {
    let id = ObjectId::parse_str(id_raw)
        .map_err(|_| AppError::BadRequest("Invalid registration id".into()))?;

    registrations
        .apply_admin_patch(id, &request.into_patch())
        .await?
        .ok_or_else(|| AppError::NotFound("Expo registration not found".into()))
}

/// Axum handler for `POST /expoRegistration`.
pub async fn create_expo_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::Json(request): axum::Json<CreateExpoRequest>,
) -> Result<(axum::http::StatusCode, axum::Json<ExpoMutationResponse>), AppError> {
    let registration = process_create_expo_registration(state.expo_repo.as_ref(), request).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        axum::Json(ExpoMutationResponse {
            message: "Expo registration saved".to_string(),
            data: registration,
        }),
    ))
}

/// Axum handler for `GET /expoRegistration`.
pub async fn list_expo_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Query(filter_query): axum::extract::Query<ExpoFilterQuery>,
    axum::extract::Query(page_query): axum::extract::Query<PageQuery>,
) -> Result<axum::Json<Paged<ExpoRegistration>>, AppError> {
    let filter = filter_query.to_filter()?;
    let params = page_query.to_params();

    let total = state.expo_repo.count(&filter).await?;
    let items = state.expo_repo.list(&filter, &params).await?;

    Ok(axum::Json(Paged {
        items,
        page_info: PageInfo::build(&params, total),
    }))
}

/// Axum handler for `PATCH /expoRegistration/{id}`.
pub async fn update_expo_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(id): axum::extract::Path<String>,
    axum::Json(request): axum::Json<ExpoAdminUpdateRequest>,
) -> Result<axum::Json<ExpoMutationResponse>, AppError> {
    let registration = process_update_expo_registration(state.expo_repo.as_ref(), &id, request).await?;
    Ok(axum::Json(ExpoMutationResponse {
        message: "Expo registration updated successfully".to_string(),
        data: registration,
    }))
}
