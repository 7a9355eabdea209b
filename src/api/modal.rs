use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::modal_repository::ModalRepository;
use crate::db::query::created_at_range;
use crate::error::AppError;
use crate::models::site::ModalRegistration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalRegistrationRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub interested_course: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegistrationListQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModalRegistrationResponse {
    pub message: String,
    pub data: ModalRegistration,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrationsResponse {
    pub count: usize,
    pub registrations: Vec<ModalRegistration>,
}

/// Core modal-signup logic, separated from the HTTP layer for
/// testability.
pub async fn process_create_modal_registration(
    registrations: &dyn ModalRepository,
    request: ModalRegistrationRequest,
) -> Result<ModalRegistration, AppError> {
    let name = request.name.as_deref().unwrap_or("").trim().to_string();
    let phone = request.phone.as_deref().unwrap_or("").trim().to_string();
    let email = request.email.as_deref().unwrap_or("").trim().to_string();
    if name.is_empty() || phone.is_empty() || email.is_empty() {
        return Err(AppError::BadRequest("All fields are required".into()));
    }

    registrations
        .insert(ModalRegistration {
            id: None,
            name,
            phone,
            email,
            interested_course: request.interested_course,
            country: request.country,
            created_at: Utc::now(),
        })
        .await
}

/// Axum handler for `POST /modal-registration`.
pub async fn create_modal_registration_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::Json(request): axum::Json<ModalRegistrationRequest>,
) -> Result<(axum::http::StatusCode, axum::Json<ModalRegistrationResponse>), AppError> {
    let registration =
        process_create_modal_registration(state.modal_repo.as_ref(), request).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        axum::Json(ModalRegistrationResponse {
            message: "Registration successful".to_string(),
            data: registration,
        }),
    ))
}

/// Axum handler for `GET /modal-registration`.
pub async fn list_modal_registrations_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Query(query): axum::extract::Query<RegistrationListQuery>,
) -> Result<axum::Json<RegistrationsResponse>, AppError> {
    let range = created_at_range(query.from.as_deref(), query.to.as_deref())?;
    let registrations = state.modal_repo.list(range).await?;

    Ok(axum::Json(RegistrationsResponse {
        count: registrations.len(),
        registrations,
    }))
}
