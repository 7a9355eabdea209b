use std::sync::LazyLock;

use axum::response::IntoResponse;
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::db::newsletter_repository::NewsletterRepository;
use crate::db::query::created_at_range;
use crate::error::AppError;
use crate::models::site::NewsletterSubscriber;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscribeRequest {
    pub email: Option<String>,
    /// Honeypot field. The signup form hides it, so only bots fill it.
    pub website: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubscriberListQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubscribersResponse {
    pub count: usize,
    pub subscribers: Vec<NewsletterSubscriber>,
}

/// What a subscribe request ended up doing.
pub enum SubscribeOutcome {
    Stored(NewsletterSubscriber),
    /// A bot filled the honeypot; answer as if it worked, store nothing.
    HoneypotTripped,
}

/// Core subscription logic, separated from the HTTP layer for
/// testability.
pub async fn process_subscribe(
    subscribers: &dyn NewsletterRepository,
    request: SubscribeRequest,
) -> Result<SubscribeOutcome, AppError> {
    // 1. Honeypot first: bots get the success message and nothing else
    if request
        .website
        .as_deref()
        .map_or(false, |v| !v.trim().is_empty())
    {
        return Ok(SubscribeOutcome::HoneypotTripped);
    }

    // 2. Minimal email shape check
    let email = request.email.as_deref().unwrap_or("").trim().to_lowercase();
    if !EMAIL_RE.is_match(&email) {
        return Err(AppError::BadRequest("A valid email is required".into()));
    }

    // 3. Duplicates are rejected, not upserted
    if subscribers.find_by_email(&email).await?.is_some() {
        return Err(AppError::BadRequest("Email is already subscribed".into()));
    }

    let subscriber = subscribers
        .insert(NewsletterSubscriber {
            id: None,
            email,
            created_at: Utc::now(),
        })
        .await?;
    Ok(SubscribeOutcome::Stored(subscriber))
}

/// Axum handler for `POST /newsletter`.
pub async fn subscribe_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::Json(request): axum::Json<SubscribeRequest>,
) -> Result<axum::response::Response, AppError> {
    let outcome = process_subscribe(state.newsletter_repo.as_ref(), request).await?;

    let body = axum::Json(serde_json::json!({
        "message": "Subscribed successfully",
    }));
    let response = match outcome {
        SubscribeOutcome::Stored(_) => (axum::http::StatusCode::CREATED, body),
        SubscribeOutcome::HoneypotTripped => (axum::http::StatusCode::OK, body),
    };
    Ok(response.into_response())
}

/// Axum handler for `GET /newsletter`.
pub async fn list_subscribers_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Query(query): axum::extract::Query<SubscriberListQuery>,
) -> Result<axum::Json<SubscribersResponse>, AppError> {
    let range = created_at_range(query.from.as_deref(), query.to.as_deref())?;
    let subscribers = state.newsletter_repo.list(range).await?;

    Ok(axum::Json(SubscribersResponse {
        count: subscribers.len(),
        subscribers,
    }))
}
