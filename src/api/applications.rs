use std::sync::Arc;

use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::captcha::CaptchaVerifier;
use crate::db::application_repository::ApplicationRepository;
use crate::error::AppError;
use crate::mailer::{Mailer, OutgoingEmail};
use crate::models::lead::Application;
use crate::pagination::{PageInfo, PageQuery, Paged};

use super::enquiries::AdminUpdateRequest;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub study_destination: Option<String>,
    pub study_year: Option<String>,
    pub study_intake: Option<String>,
    pub recaptcha_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplicationUpdateResponse {
    pub message: String,
    pub data: Application,
}

/// Notification sent to the admin inbox for each new application.
fn notification_email(to: &str, application: &Application) -> OutgoingEmail {
    fn row(label: &str, value: Option<&str>) -> String {
        format!(
            "<tr><td><strong>{}</strong></td><td>{}</td></tr>",
            label,
            value.unwrap_or("-")
        )
    }

    let html = format!(
        "<h2>New Application Received</h2><table>{}{}{}{}{}{}</table>",
        row("Name", application.name.as_deref()),
        row("Email", Some(&application.email)),
        row("Phone Number", application.phone_number.as_deref()),
        row("Study Destination", application.study_destination.as_deref()),
        row("Study Year", application.study_year.as_deref()),
        row("Study Intake", application.study_intake.as_deref()),
    );

    OutgoingEmail {
        to: to.to_string(),
        subject: "New Application Received".to_string(),
        text: format!(
            "New application received from {}",
            application.name.as_deref().unwrap_or("Unknown")
        ),
        html,
    }
}

/// Core application intake logic. The captcha check blocks the response;
/// the notification email does not.
pub async fn process_create_application(
    applications: &dyn ApplicationRepository,
    captcha: &dyn CaptchaVerifier,
    mailer: Arc<dyn Mailer>,
    notify_email_to: Option<&str>,
    request: CreateApplicationRequest,
) -> Result<Application, AppError> {
    // 1. The captcha verdict gates everything else
    let token = request.recaptcha_token.as_deref().unwrap_or("");
    if !captcha.verify(token).await? {
        return Err(AppError::BadRequest("reCAPTCHA verification failed".into()));
    }

    // 2. Required fields
    let email = request.email.as_deref().unwrap_or("").trim().to_string();
    if email.is_empty() {
        return Err(AppError::BadRequest("Email is required".into()));
    }

    // 3. Store the application
    let application = applications
        .insert(Application {
            id: None,
            name: request.name,
            email,
            phone_number: request.phone_number,
            study_destination: request.study_destination,
            study_year: request.study_year,
            study_intake: request.study_intake,
            mark_as_read: false,
            highlight: false,
            notes: vec![],
            status: vec![],
            created_at: Utc::now(),
        })
        .await?;

    // 4. Notify without blocking the response
    if let Some(to) = notify_email_to {
        let email = notification_email(to, &application);
        tokio::spawn(async move {
            if let Err(e) = mailer.send(email).await {
                tracing::error!("Error sending email: {e}");
            }
        });
    }

    Ok(application)
}

pub async fn process_update_application(
    applications: &dyn ApplicationRepository,
    id_raw: &str,
    request: AdminUpdateRequest,
) -> Result<Application, AppError> {
    let id = ObjectId::parse_str(id_raw)
        .map_err(|_| AppError::BadRequest("Invalid application id".into()))?;

    applications
        .apply_admin_patch(id, &request.into_patch())
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".into()))
}

/// Axum handler for `POST /apply`.
pub async fn create_application_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::Json(request): axum::Json<CreateApplicationRequest>,
) -> Result<(axum::http::StatusCode, axum::Json<serde_json::Value>), AppError> {
    process_create_application(
        state.application_repo.as_ref(),
        state.captcha.as_ref(),
        state.mailer.clone(),
        state.notify_email_to.as_deref(),
        request,
    )
    .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        axum::Json(serde_json::json!({
            "message": "Apply created successfully",
        })),
    ))
}

/// Axum handler for `GET /applications`.
pub async fn list_applications_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Query(query): axum::extract::Query<PageQuery>,
) -> Result<axum::Json<Paged<Application>>, AppError> {
    let params = query.to_params();
    let total = state.application_repo.count().await?;
    let items = state.application_repo.list(&params).await?;

    Ok(axum::Json(Paged {
        items,
        page_info: PageInfo::build(&params, total),
    }))
}

/// Axum handler for `PATCH /applications/{id}`.
pub async fn update_application_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(id): axum::extract::Path<String>,
    axum::Json(request): axum::Json<AdminUpdateRequest>,
) -> Result<axum::Json<ApplicationUpdateResponse>, AppError> {
    let application =
        process_update_application(state.application_repo.as_ref(), &id, request).await?;
    Ok(axum::Json(ApplicationUpdateResponse {
        message: "Application updated successfully".to_string(),
        data: application,
    }))
}
