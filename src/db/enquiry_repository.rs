use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::db::query::{admin_patch_update, created_at_sort};
use crate::error::AppError;
use crate::models::lead::{AdminPatch, Enquiry};
use crate::pagination::ListParams;

/// Repository trait for enquiry operations.
///
/// This trait allows mocking the database layer in tests.
#[async_trait]
pub trait EnquiryRepository: Send + Sync {
    /// Insert a new enquiry.
    async fn insert(&self, enquiry: Enquiry) -> Result<Enquiry, AppError>;

    /// List enquiries honoring pagination.
    async fn list(&self, params: &ListParams) -> Result<Vec<Enquiry>, AppError>;

    /// Total number of enquiries.
    async fn count(&self) -> Result<u64, AppError>;

    /// Apply admin flag/note/status changes and return the updated
    /// enquiry, or `None` when no enquiry has this id.
    async fn apply_admin_patch(
        &self,
        id: ObjectId,
        patch: &AdminPatch,
    ) -> Result<Option<Enquiry>, AppError>;

    /// Every enquiry, newest first, for export.
    async fn list_all_for_export(&self) -> Result<Vec<Enquiry>, AppError>;
}

/// MongoDB implementation of the EnquiryRepository.
pub struct MongoEnquiryRepository {
    collection: mongodb::Collection<Enquiry>,
}

impl MongoEnquiryRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("enquiries"),
        }
    }
}

#[async_trait]
impl EnquiryRepository for MongoEnquiryRepository {
    async fn insert(&self, mut enquiry: Enquiry) -> Result<Enquiry, AppError> {
        let result = self
            .collection
            .insert_one(&enquiry)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        enquiry.id = result.inserted_id.as_object_id();
        Ok(enquiry)
    }

    async fn list(&self, params: &ListParams) -> Result<Vec<Enquiry>, AppError> {
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

        let mut enquiries = Vec::new();
        use futures::TryStreamExt;
        while let Some(enquiry) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            enquiries.push(enquiry);
        }

        Ok(enquiries)
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
    ) -> Result<Option<Enquiry>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        // An empty patch is a no-op; just return the current document.
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

    async fn list_all_for_export(&self) -> Result<Vec<Enquiry>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();

        let mut cursor = self
            .collection
            .find(doc! {})
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut enquiries = Vec::new();
        use futures::TryStreamExt;
        while let Some(enquiry) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            enquiries.push(enquiry);
        }

        Ok(enquiries)
    }
}
