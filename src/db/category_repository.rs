use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;

use crate::error::AppError;
use crate::models::blog::BlogCategory;

/// Repository trait for blog category operations.
///
/// This trait allows mocking the database layer in tests.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Insert a new category and return it with its assigned id.
    async fn insert(&self, category: BlogCategory) -> Result<BlogCategory, AppError>;

    /// Find a category by its id.
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<BlogCategory>, AppError>;

    /// Find a category by its slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<BlogCategory>, AppError>;

    /// Find every category whose slug appears in `slugs`.
    async fn find_by_slugs(&self, slugs: &[String]) -> Result<Vec<BlogCategory>, AppError>;

    /// List all categories, sorted by name.
    async fn list_all(&self) -> Result<Vec<BlogCategory>, AppError>;

    /// Total number of categories.
    async fn count(&self) -> Result<u64, AppError>;

    /// Apply the provided field changes and return the updated category,
    /// or `None` when no category has this id.
    async fn update_fields(
        &self,
        id: ObjectId,
        name: Option<&str>,
        slug: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<BlogCategory>, AppError>;

    /// Delete a category. Returns `false` when no category has this id.
    async fn delete(&self, id: ObjectId) -> Result<bool, AppError>;
}

/// MongoDB implementation of the CategoryRepository.
pub struct MongoCategoryRepository {
    collection: mongodb::Collection<BlogCategory>,
}

impl MongoCategoryRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("blog_categories"),
        }
    }
}

#[async_trait]
impl CategoryRepository for MongoCategoryRepository {
    async fn insert(&self, mut category: BlogCategory) -> Result<BlogCategory, AppError> {
        let result = self
            .collection
            .insert_one(&category)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        category.id = result.inserted_id.as_object_id();
        Ok(category)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<BlogCategory>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<BlogCategory>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! { "slug": slug })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_by_slugs(&self, slugs: &[String]) -> Result<Vec<BlogCategory>, AppError> {
        use mongodb::bson::doc;

        let mut cursor = self
            .collection
            .find(doc! { "slug": { "$in": slugs } })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut categories = Vec::new();
        use futures::TryStreamExt;
        while let Some(category) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            categories.push(category);
        }

        Ok(categories)
    }

    async fn list_all(&self) -> Result<Vec<BlogCategory>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder().sort(doc! { "name": 1 }).build();

        let mut cursor = self
            .collection
            .find(doc! {})
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut categories = Vec::new();
        use futures::TryStreamExt;
        while let Some(category) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            categories.push(category);
        }

        Ok(categories)
    }

    async fn count(&self) -> Result<u64, AppError> {
        use mongodb::bson::doc;

        self.collection
            .count_documents(doc! {})
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn update_fields(
        &self,
        id: ObjectId,
        name: Option<&str>,
        slug: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<BlogCategory>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        let mut set = doc! {
            "updatedAt": mongodb::bson::DateTime::from_chrono(Utc::now()),
        };
        if let Some(name) = name {
            set.insert("name", name);
        }
        if let Some(slug) = slug {
            set.insert("slug", slug);
        }
        if let Some(description) = description {
            set.insert("description", description);
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, AppError> {
        use mongodb::bson::doc;

        let result = self
            .collection
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.deleted_count > 0)
    }
}
