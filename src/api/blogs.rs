use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize};

use crate::db::blog_repository::BlogRepository;
use crate::db::category_repository::CategoryRepository;
use crate::error::AppError;
use crate::models::blog::{next_version, Blog, TrashedBlog, VersionEntry, VALID_BLOG_STATUSES};
use crate::models::time::parse_client_datetime;
use crate::pagination::{ListParams, PageInfo, Paged};
use crate::slug::is_valid_slug;

/// Ancestor chains stop after this many hops, so a corrupted parent
/// cycle cannot hang a request.
const MAX_ANCESTOR_HOPS: usize = 10;

/// Category slugs arrive either as a single string or as a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// Normalize to a trimmed, de-duplicated list preserving order.
    fn into_vec(self) -> Vec<String> {
        let raw = match self {
            OneOrMany::One(slug) => vec![slug],
            OneOrMany::Many(slugs) => slugs,
        };
        let mut slugs = Vec::new();
        for slug in raw {
            let slug = slug.trim().to_string();
            if !slug.is_empty() && !slugs.contains(&slug) {
                slugs.push(slug);
            }
        }
        slugs
    }
}

/// Distinguishes "field absent" from "field explicitly null" so a PUT can
/// clear the parent reference.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogRequest {
    pub title: Option<String>,
    #[serde(rename = "blogURL")]
    pub blog_url: Option<String>,
    pub categories: Option<OneOrMany>,
    pub img: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub table_of_contents: Option<Vec<String>>,
    pub main_content: Option<String>,
    pub video: Option<String>,
    #[serde(default)]
    pub explore_more_category: Option<Vec<String>>,
    #[serde(default)]
    pub faqs: Option<Vec<crate::models::blog::Faq>>,
    pub university_category_for_suggestion: Option<String>,
    #[serde(default)]
    pub manual_category_suggestions: Option<Vec<String>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keyword: Option<String>,
    pub cta_url: Option<String>,
    pub cta_btn: Option<String>,
    pub is_form_hidden: Option<bool>,
    pub status: Option<String>,
    pub parent_blog: Option<String>,
    pub child_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    #[serde(rename = "blogURL")]
    pub blog_url: Option<String>,
    pub categories: Option<OneOrMany>,
    pub img: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub table_of_contents: Option<Vec<String>>,
    pub main_content: Option<String>,
    pub video: Option<String>,
    pub explore_more_category: Option<Vec<String>>,
    pub faqs: Option<Vec<crate::models::blog::Faq>>,
    pub university_category_for_suggestion: Option<String>,
    pub manual_category_suggestions: Option<Vec<String>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keyword: Option<String>,
    pub cta_url: Option<String>,
    pub cta_btn: Option<String>,
    pub is_form_hidden: Option<bool>,
    pub status: Option<String>,
    /// Absent leaves the parent untouched; explicit null detaches the
    /// blog from its series.
    #[serde(default, deserialize_with = "double_option")]
    pub parent_blog: Option<Option<String>>,
    pub child_order: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogListQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Slim reference to one blog in an ancestor chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AncestorRef {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(rename = "blogURL")]
    pub blog_url: String,
}

/// A blog together with its resolved ancestor chain, outermost ancestor
/// first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogDetail {
    pub blog: Blog,
    pub ancestors: Vec<AncestorRef>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBlogResponse {
    pub message: String,
    pub data: Blog,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateBlogResponse {
    pub message: String,
    #[serde(rename = "updatedBlog")]
    pub updated_blog: Blog,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteBlogResponse {
    pub message: String,
    #[serde(rename = "blogURL")]
    pub blog_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BlogCollectionResponse {
    pub count: usize,
    pub blogs: Vec<Blog>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrashResponse {
    pub count: usize,
    pub blogs: Vec<TrashedBlog>,
}

fn validate_status(status: &str) -> Result<(), AppError> {
    if VALID_BLOG_STATUSES.contains(&status) {
        return Ok(());
    }
    Err(AppError::BadRequest(format!(
        "Invalid status '{status}'. Expected: publish, notPublished"
    )))
}

/// Map category slugs to their ids, rejecting the request when any slug
/// is unknown.
async fn resolve_category_slugs(
    categories: &dyn CategoryRepository,
    slugs: &[String],
) -> Result<Vec<ObjectId>, AppError> {
    let found = categories.find_by_slugs(slugs).await?;
    let by_slug: std::collections::HashMap<&str, ObjectId> = found
        .iter()
        .filter_map(|category| category.id.map(|id| (category.slug.as_str(), id)))
        .collect();

    let missing: Vec<String> = slugs
        .iter()
        .filter(|slug| !by_slug.contains_key(slug.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(AppError::validation("Unknown category slugs", missing));
    }

    Ok(slugs.iter().map(|slug| by_slug[slug.as_str()]).collect())
}

async fn resolve_parent(
    blogs: &dyn BlogRepository,
    raw: &str,
) -> Result<ObjectId, AppError> {
    let parent_id = ObjectId::parse_str(raw.trim())
        .map_err(|_| AppError::BadRequest("Invalid parent blog id".into()))?;
    if blogs.find_by_id(parent_id).await?.is_none() {
        return Err(AppError::BadRequest("Parent blog not found".into()));
    }
    Ok(parent_id)
}

/// Walk the parent chain upward, prepending each ancestor. Stops at a
/// null parent, a missing document, a repeated id or the hop cap.
pub async fn resolve_ancestor_chain(
    blogs: &dyn BlogRepository,
    blog: &Blog,
) -> Result<Vec<AncestorRef>, AppError> {
    let mut chain: Vec<AncestorRef> = Vec::new();
    let mut visited: Vec<ObjectId> = blog.id.into_iter().collect();
    let mut current = blog.parent_blog;

    while let Some(parent_id) = current {
        if visited.contains(&parent_id) || chain.len() >= MAX_ANCESTOR_HOPS {
            break;
        }
        let Some(parent) = blogs.find_by_id(parent_id).await? else {
            break;
        };
        visited.push(parent_id);
        current = parent.parent_blog;
        chain.insert(
            0,
            AncestorRef {
                id: parent.id,
                title: parent.title,
                blog_url: parent.blog_url,
            },
        );
    }

    Ok(chain)
}

/// Core blog creation logic, separated from the HTTP layer for
/// testability.
pub async fn process_create_blog(
    blogs: &dyn BlogRepository,
    categories: &dyn CategoryRepository,
    request: CreateBlogRequest,
) -> Result<Blog, AppError> {
    // 1. Required fields
    let title = request.title.as_deref().unwrap_or("").trim().to_string();
    let blog_url = request.blog_url.as_deref().unwrap_or("").trim().to_string();
    let img = request.img.as_deref().unwrap_or("").trim().to_string();
    let author = request.author.as_deref().unwrap_or("").trim().to_string();
    let summary = request.summary.as_deref().unwrap_or("").trim().to_string();
    let main_content = request.main_content.clone().unwrap_or_default();
    let category_slugs = request.categories.clone().map(OneOrMany::into_vec).unwrap_or_default();

    if title.is_empty()
        || blog_url.is_empty()
        || img.is_empty()
        || author.is_empty()
        || summary.is_empty()
        || main_content.trim().is_empty()
        || category_slugs.is_empty()
    {
        return Err(AppError::BadRequest("Required fields are missing".into()));
    }

    // 2. Slug format
    if !is_valid_slug(&blog_url) {
        return Err(AppError::BadRequest(
            "Invalid blog URL format. Use lowercase letters, numbers (0-9), and hyphens.".into(),
        ));
    }

    // 3. Slug uniqueness
    if blogs.find_by_url(&blog_url).await?.is_some() {
        return Err(AppError::BadRequest("Blog URL already exists".into()));
    }

    // 4. Resolve category slugs to ids
    let category_ids = resolve_category_slugs(categories, &category_slugs).await?;

    // 5. Publication status
    let status = request.status.unwrap_or_else(|| "notPublished".to_string());
    validate_status(&status)?;

    // 6. Parent reference, when the blog joins a series
    let parent_blog = match request.parent_blog.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(resolve_parent(blogs, raw).await?),
        _ => None,
    };

    // 7. Publication date, defaulting to submission time
    let now = Utc::now();
    let date = match request.date.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_client_datetime(raw)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid date '{raw}'")))?,
        _ => now,
    };
    let blog = Blog {
        id: None,
        title,
        blog_url,
        categories: category_ids,
        img,
        date,
        author,
        summary,
        table_of_contents: request.table_of_contents.unwrap_or_default(),
        main_content,
        video: request.video,
        explore_more_category: request.explore_more_category.unwrap_or_default(),
        faqs: request.faqs.unwrap_or_default(),
        university_category_for_suggestion: request.university_category_for_suggestion,
        manual_category_suggestions: request.manual_category_suggestions.unwrap_or_default(),
        meta_title: request.meta_title,
        meta_description: request.meta_description,
        meta_keyword: request.meta_keyword,
        cta_url: request.cta_url,
        cta_btn: request.cta_btn,
        is_form_hidden: request.is_form_hidden.unwrap_or(false),
        status,
        parent_blog,
        child_order: request.child_order.unwrap_or(0),
        version: "1.0".to_string(),
        version_history: vec![VersionEntry {
            version: "1.0".to_string(),
            updated_at: now,
        }],
        created_at: now,
        updated_at: now,
    };

    blogs.insert(blog).await
}

/// Core blog update logic. Bumps the version, records the replaced
/// version in the history and refuses to overwrite a concurrent edit.
pub async fn process_update_blog(
    blogs: &dyn BlogRepository,
    categories: &dyn CategoryRepository,
    blog_url: &str,
    request: UpdateBlogRequest,
) -> Result<Blog, AppError> {
    // 1. The blog must exist
    let mut blog = blogs
        .find_by_url(blog_url)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog not found".into()))?;
    let blog_id = blog
        .id
        .ok_or_else(|| AppError::Internal("stored blog is missing its id".into()))?;

    // 2. Slug change needs the same format and uniqueness checks as create
    if let Some(new_url) = request.blog_url.as_deref().map(str::trim) {
        if !new_url.is_empty() && new_url != blog.blog_url {
            if !is_valid_slug(new_url) {
                return Err(AppError::BadRequest(
                    "Invalid blog URL format. Use lowercase letters, numbers (0-9), and hyphens."
                        .into(),
                ));
            }
            if blogs.find_by_url(new_url).await?.is_some() {
                return Err(AppError::BadRequest("Blog URL already exists".into()));
            }
            blog.blog_url = new_url.to_string();
        }
    }

    // 3. Category changes must still resolve, and must not empty the list
    if let Some(categories_raw) = request.categories {
        let slugs = categories_raw.into_vec();
        if slugs.is_empty() {
            return Err(AppError::BadRequest(
                "A blog must keep at least one category".into(),
            ));
        }
        blog.categories = resolve_category_slugs(categories, &slugs).await?;
    }

    // 4. Status change
    if let Some(status) = request.status {
        validate_status(&status)?;
        blog.status = status;
    }

    // 5. Parent change: absent keeps, null clears, id re-resolves
    match request.parent_blog {
        None => {}
        Some(None) => blog.parent_blog = None,
        Some(Some(raw)) => {
            let raw = raw.trim().to_string();
            if raw.is_empty() {
                blog.parent_blog = None;
            } else {
                let parent_id = resolve_parent(blogs, &raw).await?;
                if parent_id == blog_id {
                    return Err(AppError::BadRequest(
                        "A blog cannot be its own parent".into(),
                    ));
                }
                blog.parent_blog = Some(parent_id);
            }
        }
    }

    // 6. Publication date change
    if let Some(raw) = request.date.as_deref().map(str::trim) {
        if !raw.is_empty() {
            blog.date = parse_client_datetime(raw)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid date '{raw}'")))?;
        }
    }

    // 7. Plain field changes
    if let Some(title) = request.title {
        blog.title = title;
    }
    if let Some(img) = request.img {
        blog.img = img;
    }
    if let Some(author) = request.author {
        blog.author = author;
    }
    if let Some(summary) = request.summary {
        blog.summary = summary;
    }
    if let Some(table_of_contents) = request.table_of_contents {
        blog.table_of_contents = table_of_contents;
    }
    if let Some(main_content) = request.main_content {
        blog.main_content = main_content;
    }
    if let Some(video) = request.video {
        blog.video = Some(video);
    }
    if let Some(explore_more_category) = request.explore_more_category {
        blog.explore_more_category = explore_more_category;
    }
    if let Some(faqs) = request.faqs {
        blog.faqs = faqs;
    }
    if let Some(value) = request.university_category_for_suggestion {
        blog.university_category_for_suggestion = Some(value);
    }
    if let Some(suggestions) = request.manual_category_suggestions {
        blog.manual_category_suggestions = suggestions;
    }
    if let Some(meta_title) = request.meta_title {
        blog.meta_title = Some(meta_title);
    }
    if let Some(meta_description) = request.meta_description {
        blog.meta_description = Some(meta_description);
    }
    if let Some(meta_keyword) = request.meta_keyword {
        blog.meta_keyword = Some(meta_keyword);
    }
    if let Some(cta_url) = request.cta_url {
        blog.cta_url = Some(cta_url);
    }
    if let Some(cta_btn) = request.cta_btn {
        blog.cta_btn = Some(cta_btn);
    }
    if let Some(is_form_hidden) = request.is_form_hidden {
        blog.is_form_hidden = is_form_hidden;
    }
    if let Some(child_order) = request.child_order {
        blog.child_order = child_order;
    }

    // 8. Version bump: the replaced version goes into the history
    let replaced_version = blog.version.clone();
    let now = Utc::now();
    blog.version_history.push(VersionEntry {
        version: replaced_version.clone(),
        updated_at: now,
    });
    blog.version = next_version(&replaced_version);
    blog.updated_at = now;

    // 9. Guarded write: lose to a concurrent editor instead of clobbering
    let replaced = blogs
        .update_with_version_guard(blog_id, &replaced_version, &blog)
        .await?;
    if !replaced {
        return Err(AppError::Conflict(
            "Blog was modified by another request".into(),
        ));
    }

    Ok(blog)
}

/// Core blog deletion logic: refuse while children exist, then move the
/// document into the trash collection.
pub async fn process_delete_blog(
    blogs: &dyn BlogRepository,
    blog_url: &str,
) -> Result<String, AppError> {
    // 1. The blog must exist
    let blog = blogs
        .find_by_url(blog_url)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog not found".into()))?;
    let blog_id = blog
        .id
        .ok_or_else(|| AppError::Internal("stored blog is missing its id".into()))?;

    // 2. Children block deletion
    let children = blogs.children_of(blog_id).await?;
    if !children.is_empty() {
        return Err(AppError::validation(
            "Blog has child blogs and cannot be deleted",
            children.iter().map(|child| child.blog_url.clone()).collect(),
        ));
    }

    // 3. Copy into trash, then remove the original
    let deleted_url = blog.blog_url.clone();
    blogs
        .insert_trash(TrashedBlog {
            id: None,
            original_id: blog_id,
            deleted_at: Utc::now(),
            blog,
        })
        .await?;
    blogs.delete(blog_id).await?;

    Ok(deleted_url)
}

/// Paginated listing with each blog's ancestor chain resolved. The
/// optional category filter takes a slug, not an id.
pub async fn process_list_blogs(
    blogs: &dyn BlogRepository,
    categories: &dyn CategoryRepository,
    status: Option<&str>,
    category_slug: Option<&str>,
    params: &ListParams,
) -> Result<Paged<BlogDetail>, AppError> {
    if let Some(status) = status {
        validate_status(status)?;
    }

    let category_id = match category_slug {
        Some(slug) => {
            let category = categories
                .find_by_slug(slug)
                .await?
                .ok_or_else(|| AppError::NotFound("Category not found".into()))?;
            category.id
        }
        None => None,
    };

    let total = blogs.count(status, category_id).await?;
    let rows = blogs.list(status, category_id, params).await?;

    let mut items = Vec::with_capacity(rows.len());
    for blog in rows {
        let ancestors = resolve_ancestor_chain(blogs, &blog).await?;
        items.push(BlogDetail { blog, ancestors });
    }

    Ok(Paged {
        items,
        page_info: PageInfo::build(params, total),
    })
}

pub async fn process_get_blog(
    blogs: &dyn BlogRepository,
    blog_url: &str,
) -> Result<BlogDetail, AppError> {
    let blog = blogs
        .find_by_url(blog_url)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog not found".into()))?;
    let ancestors = resolve_ancestor_chain(blogs, &blog).await?;
    Ok(BlogDetail { blog, ancestors })
}

/// Axum handler for `POST /blogs`.
pub async fn create_blog_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::Json(request): axum::Json<CreateBlogRequest>,
) -> Result<(axum::http::StatusCode, axum::Json<CreateBlogResponse>), AppError> {
    let blog = process_create_blog(
        state.blog_repo.as_ref(),
        state.category_repo.as_ref(),
        request,
    )
    .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        axum::Json(CreateBlogResponse {
            message: "Blog created successfully".to_string(),
            data: blog,
        }),
    ))
}

/// Axum handler for `GET /blogs`.
pub async fn list_blogs_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Query(query): axum::extract::Query<BlogListQuery>,
) -> Result<axum::Json<Paged<BlogDetail>>, AppError> {
    let params = ListParams::parse(
        query.page.as_deref(),
        query.per_page.as_deref(),
        query.sort_by.as_deref(),
        query.sort_order.as_deref(),
    );

    let page = process_list_blogs(
        state.blog_repo.as_ref(),
        state.category_repo.as_ref(),
        query.status.as_deref(),
        query.category.as_deref(),
        &params,
    )
    .await?;
    Ok(axum::Json(page))
}

/// Axum handler for `GET /blogs/{blogURL}`.
pub async fn get_blog_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(blog_url): axum::extract::Path<String>,
) -> Result<axum::Json<BlogDetail>, AppError> {
    let detail = process_get_blog(state.blog_repo.as_ref(), &blog_url).await?;
    Ok(axum::Json(detail))
}

/// Axum handler for `PATCH /blogs/{blogURL}`.
pub async fn update_blog_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(blog_url): axum::extract::Path<String>,
    axum::Json(request): axum::Json<UpdateBlogRequest>,
) -> Result<axum::Json<UpdateBlogResponse>, AppError> {
    let updated = process_update_blog(
        state.blog_repo.as_ref(),
        state.category_repo.as_ref(),
        &blog_url,
        request,
    )
    .await?;

    Ok(axum::Json(UpdateBlogResponse {
        message: "Blog updated successfully".to_string(),
        updated_blog: updated,
    }))
}

/// Axum handler for `DELETE /blogs/{blogURL}`.
pub async fn delete_blog_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(blog_url): axum::extract::Path<String>,
) -> Result<axum::Json<DeleteBlogResponse>, AppError> {
    let deleted_url = process_delete_blog(state.blog_repo.as_ref(), &blog_url).await?;

    Ok(axum::Json(DeleteBlogResponse {
        message: "Blog moved to trash successfully".to_string(),
        blog_url: deleted_url,
    }))
}

/// Axum handler for `GET /blogs/check-url/{blogURL}`. Responds 400 on a
/// malformed or taken slug, 200 when it is free.
pub async fn check_blog_url_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(blog_url): axum::extract::Path<String>,
) -> Result<axum::response::Response, AppError> {
    use axum::response::IntoResponse;

    if !is_valid_slug(&blog_url) {
        return Err(AppError::BadRequest(
            "Invalid blog URL format. Use lowercase letters, numbers (0-9), and hyphens.".into(),
        ));
    }

    let taken = state.blog_repo.find_by_url(&blog_url).await?.is_some();
    let response = if taken {
        (
            axum::http::StatusCode::BAD_REQUEST,
            axum::Json(serde_json::json!({
                "isUnique": false,
                "message": "Blog URL already exists",
            })),
        )
    } else {
        (
            axum::http::StatusCode::OK,
            axum::Json(serde_json::json!({
                "isUnique": true,
                "message": "Blog URL is available",
            })),
        )
    };
    Ok(response.into_response())
}

/// Axum handler for `GET /blogs/latest/{limit}`.
pub async fn latest_blogs_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(limit): axum::extract::Path<String>,
) -> Result<axum::Json<BlogCollectionResponse>, AppError> {
    let limit = limit.parse::<i64>().unwrap_or(10).max(1);
    let blogs = state.blog_repo.latest(limit).await?;

    Ok(axum::Json(BlogCollectionResponse {
        count: blogs.len(),
        blogs,
    }))
}

/// Axum handler for `GET /blogs/category/{slug}`.
pub async fn blogs_by_category_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(slug): axum::extract::Path<String>,
) -> Result<axum::Json<BlogCollectionResponse>, AppError> {
    let category = state
        .category_repo
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;
    let category_id = category
        .id
        .ok_or_else(|| AppError::Internal("stored category is missing its id".into()))?;

    let blogs = state.blog_repo.list_by_category(category_id).await?;
    Ok(axum::Json(BlogCollectionResponse {
        count: blogs.len(),
        blogs,
    }))
}

/// Axum handler for `GET /blogs/trash`.
pub async fn trash_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
) -> Result<axum::Json<TrashResponse>, AppError> {
    let blogs = state.blog_repo.list_trash().await?;
    Ok(axum::Json(TrashResponse {
        count: blogs.len(),
        blogs,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::blog::BlogCategory;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    // -- Mock implementations --

    struct MockBlogRepo {
        blogs: Mutex<Vec<Blog>>,
        trash: Mutex<Vec<TrashedBlog>>,
        /// When set, the guarded update pretends another writer won.
        guard_conflicts: AtomicBool,
    }

    impl MockBlogRepo {
        fn new() -> Self {
            Self {
                blogs: Mutex::new(vec![]),
                trash: Mutex::new(vec![]),
                guard_conflicts: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl BlogRepository for MockBlogRepo {
        async fn insert(&self, mut blog: Blog) -> Result<Blog, AppError> {
            blog.id = Some(ObjectId::new());
            self.blogs.lock().unwrap().push(blog.clone());
            Ok(blog)
        }

        async fn find_by_url(&self, blog_url: &str) -> Result<Option<Blog>, AppError> {
            Ok(self
                .blogs
                .lock()
                .unwrap()
                .iter()
                .find(|b| b.blog_url == blog_url)
                .cloned())
        }

        async fn find_by_id(&self, id: ObjectId) -> Result<Option<Blog>, AppError> {
            Ok(self
                .blogs
                .lock()
                .unwrap()
                .iter()
                .find(|b| b.id == Some(id))
                .cloned())
        }

        async fn list(
            &self,
            status: Option<&str>,
            category: Option<ObjectId>,
            params: &ListParams,
        ) -> Result<Vec<Blog>, AppError> {
            let blogs: Vec<Blog> = self
                .blogs
                .lock()
                .unwrap()
                .iter()
                .filter(|b| status.map_or(true, |s| b.status == s))
                .filter(|b| category.map_or(true, |c| b.categories.contains(&c)))
                .cloned()
                .collect();
            let skip = params.skip() as usize;
            let limited = match params.limit() {
                Some(limit) => blogs.into_iter().skip(skip).take(limit as usize).collect(),
                None => blogs,
            };
            Ok(limited)
        }

        async fn count(
            &self,
            status: Option<&str>,
            category: Option<ObjectId>,
        ) -> Result<u64, AppError> {
            Ok(self
                .blogs
                .lock()
                .unwrap()
                .iter()
                .filter(|b| status.map_or(true, |s| b.status == s))
                .filter(|b| category.map_or(true, |c| b.categories.contains(&c)))
                .count() as u64)
        }

        async fn latest(&self, limit: i64) -> Result<Vec<Blog>, AppError> {
            let mut blogs = self.blogs.lock().unwrap().clone();
            blogs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            blogs.truncate(limit as usize);
            Ok(blogs)
        }

        async fn list_by_category(&self, category_id: ObjectId) -> Result<Vec<Blog>, AppError> {
            Ok(self
                .blogs
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.categories.contains(&category_id))
                .cloned()
                .collect())
        }

        async fn children_of(&self, parent_id: ObjectId) -> Result<Vec<Blog>, AppError> {
            Ok(self
                .blogs
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.parent_blog == Some(parent_id))
                .cloned()
                .collect())
        }

        async fn sole_category_blockers(
            &self,
            category_id: ObjectId,
        ) -> Result<Vec<Blog>, AppError> {
            Ok(self
                .blogs
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.categories == vec![category_id])
                .cloned()
                .collect())
        }

        async fn used_category_ids(&self) -> Result<Vec<ObjectId>, AppError> {
            let mut ids: Vec<ObjectId> = Vec::new();
            for blog in self.blogs.lock().unwrap().iter() {
                for id in &blog.categories {
                    if !ids.contains(id) {
                        ids.push(*id);
                    }
                }
            }
            Ok(ids)
        }

        async fn pull_category(&self, category_id: ObjectId) -> Result<u64, AppError> {
            let mut touched = 0;
            for blog in self.blogs.lock().unwrap().iter_mut() {
                let before = blog.categories.len();
                blog.categories.retain(|id| *id != category_id);
                if blog.categories.len() != before {
                    touched += 1;
                }
            }
            Ok(touched)
        }

        async fn update_with_version_guard(
            &self,
            id: ObjectId,
            expected_version: &str,
            blog: &Blog,
        ) -> Result<bool, AppError> {
            if self.guard_conflicts.load(Ordering::SeqCst) {
                return Ok(false);
            }
            let mut blogs = self.blogs.lock().unwrap();
            match blogs
                .iter_mut()
                .find(|b| b.id == Some(id) && b.version == expected_version)
            {
                Some(stored) => {
                    *stored = blog.clone();
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn insert_trash(&self, trashed: TrashedBlog) -> Result<(), AppError> {
            self.trash.lock().unwrap().push(trashed);
            Ok(())
        }

        async fn list_trash(&self) -> Result<Vec<TrashedBlog>, AppError> {
            Ok(self.trash.lock().unwrap().clone())
        }

        async fn delete(&self, id: ObjectId) -> Result<bool, AppError> {
            let mut blogs = self.blogs.lock().unwrap();
            let before = blogs.len();
            blogs.retain(|b| b.id != Some(id));
            Ok(blogs.len() != before)
        }
    }

    struct MockCategoryRepo {
        categories: Mutex<Vec<BlogCategory>>,
    }

    impl MockCategoryRepo {
        fn new() -> Self {
            Self {
                categories: Mutex::new(vec![]),
            }
        }

        fn seed(&self, slug: &str) -> ObjectId {
            let id = ObjectId::new();
            self.categories.lock().unwrap().push(BlogCategory {
                id: Some(id),
                name: slug.to_string(),
                slug: slug.to_string(),
                description: None,
                is_system_protected: false,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            });
            id
        }
    }

    #[async_trait]
    impl CategoryRepository for MockCategoryRepo {
        async fn insert(&self, mut category: BlogCategory) -> Result<BlogCategory, AppError> {
            category.id = Some(ObjectId::new());
            self.categories.lock().unwrap().push(category.clone());
            Ok(category)
        }

        async fn find_by_id(&self, id: ObjectId) -> Result<Option<BlogCategory>, AppError> {
            Ok(self
                .categories
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.id == Some(id))
                .cloned())
        }

        async fn find_by_slug(&self, slug: &str) -> Result<Option<BlogCategory>, AppError> {
            Ok(self
                .categories
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.slug == slug)
                .cloned())
        }

        async fn find_by_slugs(&self, slugs: &[String]) -> Result<Vec<BlogCategory>, AppError> {
            Ok(self
                .categories
                .lock()
                .unwrap()
                .iter()
                .filter(|c| slugs.contains(&c.slug))
                .cloned()
                .collect())
        }

        async fn list_all(&self) -> Result<Vec<BlogCategory>, AppError> {
            Ok(self.categories.lock().unwrap().clone())
        }

        async fn count(&self) -> Result<u64, AppError> {
            Ok(self.categories.lock().unwrap().len() as u64)
        }

        async fn update_fields(
            &self,
            id: ObjectId,
            name: Option<&str>,
            slug: Option<&str>,
            description: Option<&str>,
        ) -> Result<Option<BlogCategory>, AppError> {
            let mut categories = self.categories.lock().unwrap();
            let Some(category) = categories.iter_mut().find(|c| c.id == Some(id)) else {
                return Ok(None);
            };
            if let Some(name) = name {
                category.name = name.to_string();
            }
            if let Some(slug) = slug {
                category.slug = slug.to_string();
            }
            if let Some(description) = description {
                category.description = Some(description.to_string());
            }
            category.updated_at = Utc::now();
            Ok(Some(category.clone()))
        }

        async fn delete(&self, id: ObjectId) -> Result<bool, AppError> {
            let mut categories = self.categories.lock().unwrap();
            let before = categories.len();
            categories.retain(|c| c.id != Some(id));
            Ok(categories.len() != before)
        }
    }

    fn make_request(blog_url: &str, categories: &[&str]) -> CreateBlogRequest {
        CreateBlogRequest {
            title: Some("Studying in the UK".to_string()),
            blog_url: Some(blog_url.to_string()),
            categories: Some(OneOrMany::Many(
                categories.iter().map(|s| s.to_string()).collect(),
            )),
            img: Some("https://cdn.example.com/uk.jpg".to_string()),
            date: Some("2025-01-15".to_string()),
            author: Some("Editorial".to_string()),
            summary: Some("What to expect".to_string()),
            main_content: Some("<p>Everything about UK study.</p>".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_blog_success() {
        let blogs = MockBlogRepo::new();
        let categories = MockCategoryRepo::new();
        let scholarship_id = categories.seed("scholarships");

        let blog = process_create_blog(&blogs, &categories, make_request("uk-guide", &["scholarships"]))
            .await
            .unwrap();

        assert!(blog.id.is_some());
        assert_eq!(blog.version, "1.0");
        assert_eq!(blog.version_history.len(), 1);
        assert_eq!(blog.version_history[0].version, "1.0");
        assert_eq!(blog.categories, vec![scholarship_id]);
        assert_eq!(blog.status, "notPublished");
    }

    #[tokio::test]
    async fn test_create_blog_date_defaults_to_now() {
        let blogs = MockBlogRepo::new();
        let categories = MockCategoryRepo::new();
        categories.seed("scholarships");

        let mut request = make_request("uk-guide", &["scholarships"]);
        request.date = None;

        let blog = process_create_blog(&blogs, &categories, request).await.unwrap();
        assert_eq!(blog.date, blog.created_at);
    }

    #[tokio::test]
    async fn test_create_blog_missing_fields() {
        let blogs = MockBlogRepo::new();
        let categories = MockCategoryRepo::new();
        let mut request = make_request("uk-guide", &["scholarships"]);
        request.title = None;

        let result = process_create_blog(&blogs, &categories, request).await;
        match result.unwrap_err() {
            AppError::BadRequest(msg) => assert_eq!(msg, "Required fields are missing"),
            other => panic!("Expected BadRequest error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_blog_invalid_slug() {
        let blogs = MockBlogRepo::new();
        let categories = MockCategoryRepo::new();
        categories.seed("scholarships");

        let result =
            process_create_blog(&blogs, &categories, make_request("UK Guide!", &["scholarships"]))
                .await;
        match result.unwrap_err() {
            AppError::BadRequest(msg) => assert!(msg.contains("Invalid blog URL format")),
            other => panic!("Expected BadRequest error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_blog_duplicate_url() {
        let blogs = MockBlogRepo::new();
        let categories = MockCategoryRepo::new();
        categories.seed("scholarships");

        process_create_blog(&blogs, &categories, make_request("uk-guide", &["scholarships"]))
            .await
            .unwrap();
        let result =
            process_create_blog(&blogs, &categories, make_request("uk-guide", &["scholarships"]))
                .await;
        match result.unwrap_err() {
            AppError::BadRequest(msg) => assert_eq!(msg, "Blog URL already exists"),
            other => panic!("Expected BadRequest error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_blog_unknown_category_slugs() {
        let blogs = MockBlogRepo::new();
        let categories = MockCategoryRepo::new();
        categories.seed("scholarships");

        let result = process_create_blog(
            &blogs,
            &categories,
            make_request("uk-guide", &["scholarships", "visas", "housing"]),
        )
        .await;
        match result.unwrap_err() {
            AppError::Validation { message, details } => {
                assert_eq!(message, "Unknown category slugs");
                assert_eq!(details, vec!["visas".to_string(), "housing".to_string()]);
            }
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_blog_invalid_status() {
        let blogs = MockBlogRepo::new();
        let categories = MockCategoryRepo::new();
        categories.seed("scholarships");

        let mut request = make_request("uk-guide", &["scholarships"]);
        request.status = Some("draft".to_string());

        let result = process_create_blog(&blogs, &categories, request).await;
        match result.unwrap_err() {
            AppError::BadRequest(msg) => assert!(msg.contains("Invalid status 'draft'")),
            other => panic!("Expected BadRequest error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_appends_one_history_entry() {
        let blogs = MockBlogRepo::new();
        let categories = MockCategoryRepo::new();
        categories.seed("scholarships");

        process_create_blog(&blogs, &categories, make_request("uk-guide", &["scholarships"]))
            .await
            .unwrap();

        let updated = process_update_blog(
            &blogs,
            &categories,
            "uk-guide",
            UpdateBlogRequest {
                summary: Some("Refreshed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.version, "2.0");
        assert_eq!(updated.version_history.len(), 2);
        assert_eq!(updated.version_history[1].version, "1.0");
        assert_eq!(updated.summary, "Refreshed");

        let updated = process_update_blog(
            &blogs,
            &categories,
            "uk-guide",
            UpdateBlogRequest {
                title: Some("Second pass".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.version, "3.0");
        assert_eq!(updated.version_history.len(), 3);
        assert_eq!(updated.version_history[2].version, "2.0");
    }

    #[tokio::test]
    async fn test_update_conflict_when_version_moved() {
        let blogs = MockBlogRepo::new();
        let categories = MockCategoryRepo::new();
        categories.seed("scholarships");

        process_create_blog(&blogs, &categories, make_request("uk-guide", &["scholarships"]))
            .await
            .unwrap();
        blogs.guard_conflicts.store(true, Ordering::SeqCst);

        let result = process_update_blog(
            &blogs,
            &categories,
            "uk-guide",
            UpdateBlogRequest {
                summary: Some("Refreshed".to_string()),
                ..Default::default()
            },
        )
        .await;
        match result.unwrap_err() {
            AppError::Conflict(msg) => assert!(msg.contains("modified by another request")),
            other => panic!("Expected Conflict error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_clears_parent_with_null() {
        let blogs = MockBlogRepo::new();
        let categories = MockCategoryRepo::new();
        categories.seed("scholarships");

        let parent =
            process_create_blog(&blogs, &categories, make_request("series-root", &["scholarships"]))
                .await
                .unwrap();
        let mut child_request = make_request("series-part-1", &["scholarships"]);
        child_request.parent_blog = parent.id.map(|id| id.to_hex());
        let child = process_create_blog(&blogs, &categories, child_request)
            .await
            .unwrap();
        assert_eq!(child.parent_blog, parent.id);

        let detached = process_update_blog(
            &blogs,
            &categories,
            "series-part-1",
            UpdateBlogRequest {
                parent_blog: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(detached.parent_blog, None);
    }

    #[tokio::test]
    async fn test_delete_blocked_by_children() {
        let blogs = MockBlogRepo::new();
        let categories = MockCategoryRepo::new();
        categories.seed("scholarships");

        let parent =
            process_create_blog(&blogs, &categories, make_request("series-root", &["scholarships"]))
                .await
                .unwrap();
        let mut child_request = make_request("series-part-1", &["scholarships"]);
        child_request.parent_blog = parent.id.map(|id| id.to_hex());
        process_create_blog(&blogs, &categories, child_request)
            .await
            .unwrap();

        let result = process_delete_blog(&blogs, "series-root").await;
        match result.unwrap_err() {
            AppError::Validation { message, details } => {
                assert!(message.contains("child blogs"));
                assert_eq!(details, vec!["series-part-1".to_string()]);
            }
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_moves_blog_to_trash() {
        let blogs = MockBlogRepo::new();
        let categories = MockCategoryRepo::new();
        categories.seed("scholarships");

        let created =
            process_create_blog(&blogs, &categories, make_request("uk-guide", &["scholarships"]))
                .await
                .unwrap();

        let deleted_url = process_delete_blog(&blogs, "uk-guide").await.unwrap();
        assert_eq!(deleted_url, "uk-guide");
        assert!(blogs.blogs.lock().unwrap().is_empty());

        let trash = blogs.list_trash().await.unwrap();
        assert_eq!(trash.len(), 1);
        assert_eq!(trash[0].original_id, created.id.unwrap());
        assert_eq!(trash[0].blog.blog_url, "uk-guide");
    }

    #[tokio::test]
    async fn test_ancestor_chain_outermost_first() {
        let blogs = MockBlogRepo::new();
        let categories = MockCategoryRepo::new();
        categories.seed("scholarships");

        let root =
            process_create_blog(&blogs, &categories, make_request("series-root", &["scholarships"]))
                .await
                .unwrap();
        let mut mid_request = make_request("series-mid", &["scholarships"]);
        mid_request.parent_blog = root.id.map(|id| id.to_hex());
        let mid = process_create_blog(&blogs, &categories, mid_request)
            .await
            .unwrap();
        let mut leaf_request = make_request("series-leaf", &["scholarships"]);
        leaf_request.parent_blog = mid.id.map(|id| id.to_hex());
        let leaf = process_create_blog(&blogs, &categories, leaf_request)
            .await
            .unwrap();

        let chain = resolve_ancestor_chain(&blogs, &leaf).await.unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].blog_url, "series-root");
        assert_eq!(chain[1].blog_url, "series-mid");
    }

    #[tokio::test]
    async fn test_ancestor_chain_survives_cycle() {
        let blogs = MockBlogRepo::new();
        let a_id = ObjectId::new();
        let b_id = ObjectId::new();
        let now = Utc::now();
        let template = |id: ObjectId, url: &str, parent: ObjectId| Blog {
            id: Some(id),
            title: url.to_string(),
            blog_url: url.to_string(),
            categories: vec![ObjectId::new()],
            img: "img".to_string(),
            date: now,
            author: "a".to_string(),
            summary: "s".to_string(),
            table_of_contents: vec![],
            main_content: "c".to_string(),
            video: None,
            explore_more_category: vec![],
            faqs: vec![],
            university_category_for_suggestion: None,
            manual_category_suggestions: vec![],
            meta_title: None,
            meta_description: None,
            meta_keyword: None,
            cta_url: None,
            cta_btn: None,
            is_form_hidden: false,
            status: "publish".to_string(),
            parent_blog: Some(parent),
            child_order: 0,
            version: "1.0".to_string(),
            version_history: vec![],
            created_at: now,
            updated_at: now,
        };
        {
            let mut stored = blogs.blogs.lock().unwrap();
            stored.push(template(a_id, "cycle-a", b_id));
            stored.push(template(b_id, "cycle-b", a_id));
        }

        let a = blogs.find_by_id(a_id).await.unwrap().unwrap();
        let chain = resolve_ancestor_chain(&blogs, &a).await.unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].blog_url, "cycle-b");
    }

    #[tokio::test]
    async fn test_list_resolves_ancestors_per_item() {
        let blogs = MockBlogRepo::new();
        let categories = MockCategoryRepo::new();
        categories.seed("scholarships");

        let root =
            process_create_blog(&blogs, &categories, make_request("series-root", &["scholarships"]))
                .await
                .unwrap();
        let mut child_request = make_request("series-part-1", &["scholarships"]);
        child_request.parent_blog = root.id.map(|id| id.to_hex());
        process_create_blog(&blogs, &categories, child_request)
            .await
            .unwrap();

        let page = process_list_blogs(&blogs, &categories, None, None, &ListParams::default())
            .await
            .unwrap();
        assert_eq!(page.page_info.total, 2);
        let child = page
            .items
            .iter()
            .find(|d| d.blog.blog_url == "series-part-1")
            .unwrap();
        assert_eq!(child.ancestors.len(), 1);
        assert_eq!(child.ancestors[0].blog_url, "series-root");
    }

    #[tokio::test]
    async fn test_list_filters_by_category_slug() {
        let blogs = MockBlogRepo::new();
        let categories = MockCategoryRepo::new();
        categories.seed("scholarships");
        categories.seed("visas");

        process_create_blog(&blogs, &categories, make_request("visa-guide", &["visas"]))
            .await
            .unwrap();
        process_create_blog(
            &blogs,
            &categories,
            make_request("scholarship-guide", &["scholarships"]),
        )
        .await
        .unwrap();

        let page = process_list_blogs(
            &blogs,
            &categories,
            None,
            Some("visas"),
            &ListParams::default(),
        )
        .await
        .unwrap();
        assert_eq!(page.page_info.total, 1);
        assert_eq!(page.items[0].blog.blog_url, "visa-guide");

        let result = process_list_blogs(
            &blogs,
            &categories,
            None,
            Some("unknown"),
            &ListParams::default(),
        )
        .await;
        match result.unwrap_err() {
            AppError::NotFound(msg) => assert_eq!(msg, "Category not found"),
            other => panic!("Expected NotFound error, got: {:?}", other),
        }
    }
}
