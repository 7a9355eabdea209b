use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::db::event_repository::EventRepository;
use crate::error::AppError;
use crate::models::event::Event;
use crate::slug::is_valid_slug;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub event_image: Option<String>,
    pub image_gallery: Option<Vec<String>>,
    pub description: Option<String>,
    pub place: Option<String>,
    pub is_online: Option<bool>,
    #[serde(rename = "joinURL")]
    pub join_url: Option<String>,
    pub event_start_date: Option<String>,
    pub event_start_time: Option<String>,
    pub event_end_date: Option<String>,
    pub event_end_time: Option<String>,
    pub organizer: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "eventURL")]
    pub event_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub event_image: Option<String>,
    pub image_gallery: Option<Vec<String>>,
    pub description: Option<String>,
    pub place: Option<String>,
    pub is_online: Option<bool>,
    #[serde(rename = "joinURL")]
    pub join_url: Option<String>,
    pub event_start_date: Option<String>,
    pub event_start_time: Option<String>,
    pub event_end_date: Option<String>,
    pub event_end_time: Option<String>,
    pub organizer: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "eventURL")]
    pub event_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventQuery {
    /// `append=true` adds submitted gallery images instead of replacing
    /// the gallery.
    pub append: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEventResponse {
    pub message: String,
    pub event: Event,
}

fn parse_event_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid event id".into()))
}

/// Core event creation logic, separated from the HTTP layer for
/// testability.
pub async fn process_create_event(
    events: &dyn EventRepository,
    request: CreateEventRequest,
) -> Result<Event, AppError> {
    // 1. Required fields; the URL is lowercased before validation
    let title = request.title.as_deref().unwrap_or("").trim().to_string();
    let event_url = request
        .event_url
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    if title.is_empty() || event_url.is_empty() {
        return Err(AppError::BadRequest("Title and event URL are required".into()));
    }

    let start_date = request.event_start_date.as_deref().unwrap_or("").trim().to_string();
    let start_time = request.event_start_time.as_deref().unwrap_or("").trim().to_string();
    let end_date = request.event_end_date.as_deref().unwrap_or("").trim().to_string();
    let end_time = request.event_end_time.as_deref().unwrap_or("").trim().to_string();
    if start_date.is_empty() || start_time.is_empty() || end_date.is_empty() || end_time.is_empty()
    {
        return Err(AppError::BadRequest(
            "Start and End date & time are required.".into(),
        ));
    }

    // 2. Slug format
    if !is_valid_slug(&event_url) {
        return Err(AppError::BadRequest(
            "Invalid event URL format. Use lowercase letters, numbers (0-9), and hyphens.".into(),
        ));
    }

    // 3. Slug uniqueness
    if events.find_by_url(&event_url).await?.is_some() {
        return Err(AppError::BadRequest("Event URL already exists".into()));
    }

    let now = Utc::now();
    events
        .insert(Event {
            id: None,
            title,
            event_image: request.event_image,
            image_gallery: request.image_gallery.unwrap_or_default(),
            description: request.description,
            place: request.place,
            is_online: request.is_online.unwrap_or(false),
            join_url: request.join_url,
            event_start_date: start_date,
            event_start_time: start_time,
            event_end_date: end_date,
            event_end_time: end_time,
            organizer: request.organizer,
            category: request.category,
            event_url,
            created_at: now,
            updated_at: now,
        })
        .await
}

/// Core event update logic. Gallery images are replaced by default and
/// appended when the caller asks for it.
pub async fn process_update_event(
    events: &dyn EventRepository,
    id_raw: &str,
    append_gallery: bool,
    request: UpdateEventRequest,
) -> Result<Event, AppError> {
    // 1. The event must exist
    let id = parse_event_id(id_raw)?;
    let mut event = events
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))?;

    // 2. Slug change needs the same format and uniqueness checks as create
    if let Some(new_url) = request.event_url.as_deref().map(str::trim) {
        let new_url = new_url.to_lowercase();
        if !new_url.is_empty() && new_url != event.event_url {
            if !is_valid_slug(&new_url) {
                return Err(AppError::BadRequest(
                    "Invalid event URL format. Use lowercase letters, numbers (0-9), and hyphens."
                        .into(),
                ));
            }
            if events.find_by_url(&new_url).await?.is_some() {
                return Err(AppError::BadRequest("Event URL already exists".into()));
            }
            event.event_url = new_url;
        }
    }

    // 3. Gallery: replace or append
    if let Some(images) = request.image_gallery {
        if append_gallery {
            event.image_gallery.extend(images);
        } else {
            event.image_gallery = images;
        }
    }

    // 4. Plain field changes
    if let Some(title) = request.title {
        event.title = title;
    }
    if let Some(event_image) = request.event_image {
        event.event_image = Some(event_image);
    }
    if let Some(description) = request.description {
        event.description = Some(description);
    }
    if let Some(place) = request.place {
        event.place = Some(place);
    }
    if let Some(is_online) = request.is_online {
        event.is_online = is_online;
    }
    if let Some(join_url) = request.join_url {
        event.join_url = Some(join_url);
    }
    if let Some(start_date) = request.event_start_date {
        event.event_start_date = start_date;
    }
    if let Some(start_time) = request.event_start_time {
        event.event_start_time = start_time;
    }
    if let Some(end_date) = request.event_end_date {
        event.event_end_date = end_date;
    }
    if let Some(end_time) = request.event_end_time {
        event.event_end_time = end_time;
    }
    if let Some(organizer) = request.organizer {
        event.organizer = Some(organizer);
    }
    if let Some(category) = request.category {
        event.category = Some(category);
    }
    event.updated_at = Utc::now();

    events.replace(id, &event).await?;
    Ok(event)
}

/// Axum handler for `POST /events`.
pub async fn create_event_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::Json(request): axum::Json<CreateEventRequest>,
) -> Result<(axum::http::StatusCode, axum::Json<CreateEventResponse>), AppError> {
    let event = process_create_event(state.event_repo.as_ref(), request).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        axum::Json(CreateEventResponse {
            message: "Event created successfully".to_string(),
            event,
        }),
    ))
}

/// Axum handler for `GET /events`.
pub async fn list_events_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
) -> Result<axum::Json<Vec<Event>>, AppError> {
    let events = state.event_repo.list_all().await?;
    Ok(axum::Json(events))
}

/// Axum handler for `GET /events/{id}`.
pub async fn get_event_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(id): axum::extract::Path<String>,
) -> Result<axum::Json<Event>, AppError> {
    let id = parse_event_id(&id)?;
    let event = state
        .event_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))?;
    Ok(axum::Json(event))
}

/// Axum handler for `GET /events/url/{eventURL}`.
pub async fn get_event_by_url_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(event_url): axum::extract::Path<String>,
) -> Result<axum::Json<Event>, AppError> {
    let event = state
        .event_repo
        .find_by_url(&event_url)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))?;
    Ok(axum::Json(event))
}

/// Axum handler for `GET /events/check-url/{eventURL}`. Always responds
/// 200; the body says whether the slug is taken.
pub async fn check_event_url_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(event_url): axum::extract::Path<String>,
) -> Result<axum::Json<serde_json::Value>, AppError> {
    let exists = state.event_repo.find_by_url(&event_url).await?.is_some();
    let message = if exists { "URL already taken" } else { "URL available" };
    Ok(axum::Json(serde_json::json!({
        "exists": exists,
        "message": message,
    })))
}

/// Axum handler for `PATCH /events/{id}`.
pub async fn update_event_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(id): axum::extract::Path<String>,
    axum::extract::Query(query): axum::extract::Query<UpdateEventQuery>,
    axum::Json(request): axum::Json<UpdateEventRequest>,
) -> Result<axum::Json<Event>, AppError> {
    let append_gallery = query.append.as_deref() == Some("true");
    let event =
        process_update_event(state.event_repo.as_ref(), &id, append_gallery, request).await?;
    Ok(axum::Json(event))
}

/// Axum handler for `DELETE /events/{id}`.
pub async fn delete_event_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(id): axum::extract::Path<String>,
) -> Result<axum::Json<serde_json::Value>, AppError> {
    let id = parse_event_id(&id)?;
    let deleted = state.event_repo.delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("Event not found".into()));
    }
    Ok(axum::Json(serde_json::json!({
        "message": "Event deleted successfully",
    })))
}
