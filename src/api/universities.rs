use axum::response::IntoResponse;
use chrono::Utc;
use mongodb::bson::Document;
use serde::{Deserialize, Serialize};

use crate::db::university_repository::UniversityRepository;
use crate::error::AppError;
use crate::models::university::{CourseAndFee, Cta, OtherInfo, University};
use crate::slug::is_valid_slug;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversityRequest {
    pub name: Option<String>,
    pub university_url: Option<String>,
    pub img: Option<String>,
    pub gallery: Option<Vec<String>>,
    pub videos: Option<Vec<String>>,
    pub country: Option<String>,
    pub overview: Option<String>,
    pub location: Option<String>,
    pub rank: Option<String>,
    pub established: Option<String>,
    pub history: Option<String>,
    pub ranking_and_achievement: Option<String>,
    pub services: Option<String>,
    pub department_and_faculty: Option<String>,
    pub accommodation: Option<String>,
    pub international_students: Option<String>,
    pub course_and_fees: Option<Vec<CourseAndFee>>,
    pub related_events_url: Option<Vec<String>>,
    pub related_blogs_url: Option<Vec<String>>,
    #[serde(rename = "hasPartnershipWithSGE")]
    pub has_partnership_with_sge: Option<bool>,
    pub others_info: Option<Vec<OtherInfo>>,
    pub cta: Option<Cta>,
    pub others: Option<Document>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UniversityMutationResponse {
    pub message: String,
    pub data: University,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UniversitiesResponse {
    pub count: usize,
    pub universities: Vec<University>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountriesResponse {
    pub count: usize,
    pub countries: Vec<String>,
}

fn validate_university_url(url: &str) -> Result<(), AppError> {
    if !is_valid_slug(url) {
        return Err(AppError::BadRequest(
            "Invalid university URL format. Use lowercase letters, numbers (0-9), and hyphens."
                .into(),
        ));
    }
    Ok(())
}

/// Core university creation logic, separated from the HTTP layer for
/// testability.
pub async fn process_create_university(
    universities: &dyn UniversityRepository,
    request: UniversityRequest,
) -> Result<University, AppError> {
    // 1. Required fields
    let name = request.name.as_deref().unwrap_or("").trim().to_string();
    let university_url = request
        .university_url
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_string();
    let img = request.img.as_deref().unwrap_or("").trim().to_string();
    let country = request.country.as_deref().unwrap_or("").trim().to_string();
    if name.is_empty() || university_url.is_empty() || img.is_empty() || country.is_empty() {
        return Err(AppError::BadRequest(
            "Required fields are missing (name, universityUrl, img, country)".into(),
        ));
    }

    // 2. Slug format
    validate_university_url(&university_url)?;

    // 3. Slug uniqueness
    if universities.find_by_url(&university_url).await?.is_some() {
        return Err(AppError::BadRequest("University URL already exists".into()));
    }

    let now = Utc::now();
    universities
        .insert(University {
            id: None,
            name,
            university_url,
            img,
            gallery: request.gallery.unwrap_or_default(),
            videos: request.videos.unwrap_or_default(),
            country,
            overview: request.overview,
            location: request.location,
            rank: request.rank,
            established: request.established,
            history: request.history,
            ranking_and_achievement: request.ranking_and_achievement,
            services: request.services,
            department_and_faculty: request.department_and_faculty,
            accommodation: request.accommodation,
            international_students: request.international_students,
            course_and_fees: request.course_and_fees.unwrap_or_default(),
            related_events_url: request.related_events_url.unwrap_or_default(),
            related_blogs_url: request.related_blogs_url.unwrap_or_default(),
            has_partnership_with_sge: request.has_partnership_with_sge.unwrap_or(false),
            others_info: request.others_info.unwrap_or_default(),
            cta: request.cta,
            others: request.others.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
        .await
}

/// Core university update logic. The profile is addressed by its URL
/// slug; a new slug in the body moves the profile to that slug.
pub async fn process_update_university(
    universities: &dyn UniversityRepository,
    university_url: &str,
    request: UniversityRequest,
) -> Result<University, AppError> {
    // 1. The profile must exist
    let mut university = universities
        .find_by_url(university_url)
        .await?
        .ok_or_else(|| AppError::NotFound("University not found".into()))?;
    let university_id = university
        .id
        .ok_or_else(|| AppError::Internal("stored university is missing its id".into()))?;

    // 2. Slug change needs the same format and uniqueness checks as create
    if let Some(new_url) = request.university_url.as_deref().map(str::trim) {
        if !new_url.is_empty() && new_url != university.university_url {
            validate_university_url(new_url)?;
            if universities.find_by_url(new_url).await?.is_some() {
                return Err(AppError::BadRequest("University URL already exists".into()));
            }
            university.university_url = new_url.to_string();
        }
    }

    // 3. Plain field changes
    if let Some(name) = request.name {
        let name = name.trim().to_string();
        if !name.is_empty() {
            university.name = name;
        }
    }
    if let Some(img) = request.img {
        university.img = img;
    }
    if let Some(gallery) = request.gallery {
        university.gallery = gallery;
    }
    if let Some(videos) = request.videos {
        university.videos = videos;
    }
    if let Some(country) = request.country {
        let country = country.trim().to_string();
        if !country.is_empty() {
            university.country = country;
        }
    }
    if let Some(overview) = request.overview {
        university.overview = Some(overview);
    }
    if let Some(location) = request.location {
        university.location = Some(location);
    }
    if let Some(rank) = request.rank {
        university.rank = Some(rank);
    }
    if let Some(established) = request.established {
        university.established = Some(established);
    }
    if let Some(history) = request.history {
        university.history = Some(history);
    }
    if let Some(ranking_and_achievement) = request.ranking_and_achievement {
        university.ranking_and_achievement = Some(ranking_and_achievement);
    }
    if let Some(services) = request.services {
        university.services = Some(services);
    }
    if let Some(department_and_faculty) = request.department_and_faculty {
        university.department_and_faculty = Some(department_and_faculty);
    }
    if let Some(accommodation) = request.accommodation {
        university.accommodation = Some(accommodation);
    }
    if let Some(international_students) = request.international_students {
        university.international_students = Some(international_students);
    }
    if let Some(course_and_fees) = request.course_and_fees {
        university.course_and_fees = course_and_fees;
    }
    if let Some(related_events_url) = request.related_events_url {
        university.related_events_url = related_events_url;
    }
    if let Some(related_blogs_url) = request.related_blogs_url {
        university.related_blogs_url = related_blogs_url;
    }
    if let Some(has_partnership_with_sge) = request.has_partnership_with_sge {
        university.has_partnership_with_sge = has_partnership_with_sge;
    }
    if let Some(others_info) = request.others_info {
        university.others_info = others_info;
    }
    if let Some(cta) = request.cta {
        university.cta = Some(cta);
    }
    if let Some(others) = request.others {
        university.others = others;
    }
    university.updated_at = Utc::now();

    universities.replace(university_id, &university).await?;
    Ok(university)
}

/// Axum handler for `POST /universities`.
pub async fn create_university_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::Json(request): axum::Json<UniversityRequest>,
) -> Result<(axum::http::StatusCode, axum::Json<UniversityMutationResponse>), AppError> {
    let university = process_create_university(state.university_repo.as_ref(), request).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        axum::Json(UniversityMutationResponse {
            message: "University created successfully".to_string(),
            data: university,
        }),
    ))
}

/// Axum handler for `GET /universities`.
pub async fn list_universities_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
) -> Result<axum::Json<UniversitiesResponse>, AppError> {
    let universities = state.university_repo.list_all().await?;
    Ok(axum::Json(UniversitiesResponse {
        count: universities.len(),
        universities,
    }))
}

/// Axum handler for `GET /universities/countries`.
pub async fn list_countries_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
) -> Result<axum::Json<CountriesResponse>, AppError> {
    let countries = state.university_repo.distinct_countries().await?;
    Ok(axum::Json(CountriesResponse {
        count: countries.len(),
        countries,
    }))
}

/// Axum handler for `GET /universities/country/{country}`.
pub async fn universities_by_country_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(country): axum::extract::Path<String>,
) -> Result<axum::Json<UniversitiesResponse>, AppError> {
    let universities = state.university_repo.list_by_country(&country).await?;
    Ok(axum::Json(UniversitiesResponse {
        count: universities.len(),
        universities,
    }))
}

/// Axum handler for `GET /universities/{universityUrl}`.
pub async fn get_university_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(university_url): axum::extract::Path<String>,
) -> Result<axum::Json<University>, AppError> {
    let university = state
        .university_repo
        .find_by_url(&university_url)
        .await?
        .ok_or_else(|| AppError::NotFound("University not found".into()))?;
    Ok(axum::Json(university))
}

/// Axum handler for `GET /universities/check-url/{universityUrl}`.
/// Responds 400 when the slug is taken, 200 when it is free.
pub async fn check_university_url_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(university_url): axum::extract::Path<String>,
) -> Result<axum::response::Response, AppError> {
    let taken = state
        .university_repo
        .find_by_url(&university_url)
        .await?
        .is_some();

    let response = if taken {
        (
            axum::http::StatusCode::BAD_REQUEST,
            axum::Json(serde_json::json!({
                "isUnique": false,
                "message": "University URL already exists",
            })),
        )
    } else {
        (
            axum::http::StatusCode::OK,
            axum::Json(serde_json::json!({
                "isUnique": true,
                "message": "University URL is available",
            })),
        )
    };
    Ok(response.into_response())
}

/// Axum handler for `PATCH /universities/{universityUrl}`.
pub async fn update_university_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(university_url): axum::extract::Path<String>,
    axum::Json(request): axum::Json<UniversityRequest>,
) -> Result<axum::Json<UniversityMutationResponse>, AppError> {
    let university =
        process_update_university(state.university_repo.as_ref(), &university_url, request).await?;
    Ok(axum::Json(UniversityMutationResponse {
        message: "University updated successfully".to_string(),
        data: university,
    }))
}

/// Axum handler for `DELETE /universities/{universityUrl}`.
pub async fn delete_university_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(university_url): axum::extract::Path<String>,
) -> Result<axum::Json<serde_json::Value>, AppError> {
    let deleted = state
        .university_repo
        .delete_by_url(&university_url)
        .await?
        .ok_or_else(|| AppError::NotFound("University not found".into()))?;
    Ok(axum::Json(serde_json::json!({
        "message": "University deleted successfully",
        "universityUrl": deleted.university_url,
    })))
}
