use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::db::query::{admin_patch_update, created_at_sort};
use crate::error::AppError;
use crate::models::lead::{AdminPatch, Application};
use crate::pagination::ListParams;

/// Repository trait for application operations.
///
/// This trait allows mocking the database layer in tests.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Insert a new application.
    async fn insert(&self, application: Application) -> Result<Application, AppError>;

    /// List applications honoring pagination.
    async fn list(&self, params: &ListParams) -> Result<Vec<Application>, AppError>;

    /// Total number of applications.
    async fn count(&self) -> Result<u64, AppError>;

    /// Apply admin flag/note/status changes and return the updated
    /// application, or `None` when no application has this id.
    async fn apply_admin_patch(
        &self,
        id: ObjectId,
        patch: &AdminPatch,
    ) -> Result<Option<Application>, AppError>;

    /// Every application, in collection order, for export.
    async fn list_all_for_export(&self) -> Result<Vec<Application>, AppError>;
}

/// MongoDB implementation of the ApplicationRepository.
pub struct MongoApplicationRepository {
    collection: mongodb::Collection<Application>,
}

impl MongoApplicationRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("applications"),
        }
    }
}

#[async_trait]
impl ApplicationRepository for MongoApplicationRepository {
    async fn insert(&self, mut application: Application) -> Result<Application, AppError> {
        let result = self
            .collection
            .insert_one(&application)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        application.id = result.inserted_id.as_object_id();
        Ok(application)
    }

    async fn list(&self, params: &ListParams) -> Result<Vec<Application>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let mut options = FindOptions::builder()
            .sort(created_at_sort(params.sort))
            .build();
        options.skip = Some(params.skip());
        options.limit = params.limit();

        let mut cursor = self
            .collection
            .find(doc! {})
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut applications = Vec::new();
        use futures::TryStreamExt;
        while let Some(application) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            applications.push(application);
        }

        Ok(applications)
    }

    async fn count(&self) -> Result<u64, AppError> {
        use mongodb::bson::doc;

        self.collection
            .count_documents(doc! {})
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn apply_admin_patch(
        &self,
        id: ObjectId,
        patch: &AdminPatch,
    ) -> Result<Option<Application>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        let Some(update) = admin_patch_update(patch) else {
            return self
                .collection
                .find_one(doc! { "_id": id })
                .await
                .map_err(|e| AppError::Database(e.to_string()));
        };

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(doc! { "_id": id }, update)
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_all_for_export(&self) -> Result<Vec<Application>, AppError> {
        use mongodb::bson::doc;

        let mut cursor = self
            .collection
            .find(doc! {})
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut applications = Vec::new();
        use futures::TryStreamExt;
        while let Some(application) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            applications.push(application);
        }

        Ok(applications)
    }
}
