use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::db::blog_repository::BlogRepository;
use crate::db::category_repository::CategoryRepository;
use crate::error::AppError;
use crate::models::blog::BlogCategory;
use crate::slug::is_valid_slug;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryMutationResponse {
    pub message: String,
    pub data: BlogCategory,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub count: usize,
    pub categories: Vec<BlogCategory>,
}

fn parse_category_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid category id".into()))
}

/// Core category creation logic, separated from the HTTP layer for
/// testability.
pub async fn process_create_category(
    categories: &dyn CategoryRepository,
    request: CreateCategoryRequest,
) -> Result<BlogCategory, AppError> {
    // 1. Required fields
    let name = request.name.as_deref().unwrap_or("").trim().to_string();
    let slug = request.slug.as_deref().unwrap_or("").trim().to_string();
    if name.is_empty() || slug.is_empty() {
        return Err(AppError::BadRequest("Name and slug are required".into()));
    }

    // 2. Slug format
    if !is_valid_slug(&slug) {
        return Err(AppError::BadRequest(
            "Invalid category slug format. Use lowercase letters, numbers (0-9), and hyphens."
                .into(),
        ));
    }

    // 3. Slug uniqueness
    if categories.find_by_slug(&slug).await?.is_some() {
        return Err(AppError::BadRequest("Category slug already exists".into()));
    }

    let now = Utc::now();
    categories
        .insert(BlogCategory {
            id: None,
            name,
            slug,
            description: request.description,
            is_system_protected: false,
            created_at: now,
            updated_at: now,
        })
        .await
}

/// Core category update logic. Protected categories keep their slug.
pub async fn process_update_category(
    categories: &dyn CategoryRepository,
    id_raw: &str,
    request: UpdateCategoryRequest,
) -> Result<BlogCategory, AppError> {
    // 1. The category must exist
    let id = parse_category_id(id_raw)?;
    let category = categories
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

    // 2. Slug changes: blocked on protected categories, otherwise
    //    validated like create
    let new_slug = match request.slug.as_deref().map(str::trim) {
        Some(slug) if !slug.is_empty() && slug != category.slug => {
            if category.is_system_protected {
                return Err(AppError::BadRequest(
                    "This category is protected and its slug cannot be changed".into(),
                ));
            }
            if !is_valid_slug(slug) {
                return Err(AppError::BadRequest(
                    "Invalid category slug format. Use lowercase letters, numbers (0-9), and hyphens."
                        .into(),
                ));
            }
            if categories.find_by_slug(slug).await?.is_some() {
                return Err(AppError::BadRequest("Category slug already exists".into()));
            }
            Some(slug.to_string())
        }
        _ => None,
    };

    let new_name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    categories
        .update_fields(
            id,
            new_name.as_deref(),
            new_slug.as_deref(),
            request.description.as_deref(),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))
}

/// Core category deletion logic: protected and last-standing categories
/// stay, blogs that would end up category-less block the delete, and the
/// reference is pulled from every remaining blog.
pub async fn process_delete_category(
    categories: &dyn CategoryRepository,
    blogs: &dyn BlogRepository,
    id_raw: &str,
) -> Result<(), AppError> {
    // 1. The category must exist
    let id = parse_category_id(id_raw)?;
    let category = categories
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

    // 2. Protected categories cannot be deleted
    if category.is_system_protected {
        return Err(AppError::BadRequest(
            "This category is protected and cannot be deleted".into(),
        ));
    }

    // 3. The system must keep at least one category
    if categories.count().await? <= 1 {
        return Err(AppError::BadRequest(
            "At least one category must remain".into(),
        ));
    }

    // 4. Blogs whose only category this is block the delete
    let blockers = blogs.sole_category_blockers(id).await?;
    if !blockers.is_empty() {
        return Err(AppError::validation(
            "Category is the only category of some blogs and cannot be deleted",
            blockers.iter().map(|blog| blog.blog_url.clone()).collect(),
        ));
    }

    // 5. Pull the reference off every blog, then delete
    blogs.pull_category(id).await?;
    categories.delete(id).await?;

    Ok(())
}

/// Categories referenced by at least one blog.
pub async fn process_used_categories(
    categories: &dyn CategoryRepository,
    blogs: &dyn BlogRepository,
) -> Result<Vec<BlogCategory>, AppError> {
    let ids = blogs.used_category_ids().await?;
    let mut used = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(category) = categories.find_by_id(id).await? {
            used.push(category);
        }
    }
    used.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(used)
}

/// Axum handler for `POST /blogs/categories`.
pub async fn create_category_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::Json(request): axum::Json<CreateCategoryRequest>,
) -> Result<(axum::http::StatusCode, axum::Json<CategoryMutationResponse>), AppError> {
    let category = process_create_category(state.category_repo.as_ref(), request).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        axum::Json(CategoryMutationResponse {
            message: "Category created successfully".to_string(),
            data: category,
        }),
    ))
}

/// Axum handler for `GET /blogs/categories`.
pub async fn list_categories_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
) -> Result<axum::Json<CategoriesResponse>, AppError> {
    let categories = state.category_repo.list_all().await?;
    Ok(axum::Json(CategoriesResponse {
        count: categories.len(),
        categories,
    }))
}

/// Axum handler for `GET /blogs/categories/used`.
pub async fn used_categories_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
) -> Result<axum::Json<CategoriesResponse>, AppError> {
    let categories =
        process_used_categories(state.category_repo.as_ref(), state.blog_repo.as_ref()).await?;
    Ok(axum::Json(CategoriesResponse {
        count: categories.len(),
        categories,
    }))
}

/// Axum handler for `PATCH /blogs/categories/{id}`.
pub async fn update_category_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(id): axum::extract::Path<String>,
    axum::Json(request): axum::Json<UpdateCategoryRequest>,
) -> Result<axum::Json<CategoryMutationResponse>, AppError> {
    let category = process_update_category(state.category_repo.as_ref(), &id, request).await?;

    Ok(axum::Json(CategoryMutationResponse {
        message: "Category updated successfully".to_string(),
        data: category,
    }))
}

/// Axum handler for `DELETE /blogs/categories/{id}`.
pub async fn delete_category_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(id): axum::extract::Path<String>,
) -> Result<axum::Json<serde_json::Value>, AppError> {
    process_delete_category(state.category_repo.as_ref(), state.blog_repo.as_ref(), &id).await?;

    Ok(axum::Json(serde_json::json!({
        "message": "Category deleted successfully",
    })))
}
