use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::db::query::admin_patch_update;
use crate::error::AppError;
use crate::models::feedback::LiveFeedback;
use crate::models::lead::AdminPatch;

/// Repository trait for live feedback operations.
///
/// This trait allows mocking the database layer in tests.
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Insert a new feedback entry.
    async fn insert(&self, feedback: LiveFeedback) -> Result<LiveFeedback, AppError>;

    /// List all feedback entries, newest first.
    async fn list_all(&self) -> Result<Vec<LiveFeedback>, AppError>;

    /// Apply admin flag/note/status changes and return the updated entry,
    /// or `None` when no entry has this id.
    async fn apply_admin_patch(
        &self,
        id: ObjectId,
        patch: &AdminPatch,
    ) -> Result<Option<LiveFeedback>, AppError>;
}

/// MongoDB implementation of the FeedbackRepository.
pub struct MongoFeedbackRepository {
    collection: mongodb::Collection<LiveFeedback>,
}

impl MongoFeedbackRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("live_feedback"),
        }
    }
}

#[async_trait]
impl FeedbackRepository for MongoFeedbackRepository {
    async fn insert(&self, mut feedback: LiveFeedback) -> Result<LiveFeedback, AppError> {
        let result = self
            .collection
            .insert_one(&feedback)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        feedback.id = result.inserted_id.as_object_id();
        Ok(feedback)
    }

    async fn list_all(&self) -> Result<Vec<LiveFeedback>, AppError> {
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

        let mut entries = Vec::new();
        use futures::TryStreamExt;
        while let Some(entry) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            entries.push(entry);
        }

        Ok(entries)
    }

    async fn apply_admin_patch(
        &self,
        id: ObjectId,
        patch: &AdminPatch,
    ) -> Result<Option<LiveFeedback>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        let Some(mut update) = admin_patch_update(patch) else {
            return self
                .collection
                .find_one(doc! { "_id": id })
                .await
                .map_err(|e| AppError::Database(e.to_string()));
        };

        let touched = mongodb::bson::DateTime::from_chrono(chrono::Utc::now());
        match update.get_document_mut("$set") {
            Ok(set) => {
                set.insert("updatedAt", touched);
            }
            Err(_) => {
                update.insert("$set", doc! { "updatedAt": touched });
            }
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(doc! { "_id": id }, update)
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
