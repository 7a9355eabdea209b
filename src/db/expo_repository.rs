use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::Document;

use crate::db::query::{admin_patch_update, created_at_sort};
use crate::error::AppError;
use crate::models::expo::ExpoRegistration;
use crate::models::lead::AdminPatch;
use crate::pagination::ListParams;

/// Admin-side filters over expo registrations. All fields are optional
/// and AND-combined.
#[derive(Debug, Clone, Default)]
pub struct ExpoFilter {
    pub created_range: Option<Document>,
    pub event_id: Option<String>,
    pub event_source_link: Option<String>,
    pub referral_code: Option<String>,
    pub study_destination: Option<String>,
    pub highlight: Option<bool>,
    pub mark_as_read: Option<bool>,
}

impl ExpoFilter {
    pub fn to_document(&self) -> Document {
        use mongodb::bson::doc;

        let mut filter = Document::new();
        if let Some(range) = &self.created_range {
            filter.insert("createdAt", range.clone());
        }
        if let Some(event_id) = &self.event_id {
            filter.insert("eventId", event_id);
        }
        if let Some(link) = &self.event_source_link {
            filter.insert("eventSourceLink", link);
        }
        if let Some(code) = &self.referral_code {
            filter.insert("referralCode", code);
        }
        if let Some(destination) = &self.study_destination {
            // Matches either the checkbox list or the free-text "other"
            // field (case-insensitive, whole value).
            let pattern = format!("^{}$", regex::escape(destination));
            filter.insert(
                "$or",
                vec![
                    doc! { "studyDestinations": destination },
                    doc! { "otherStudyDestination": { "$regex": pattern, "$options": "i" } },
                ],
            );
        }
        if let Some(highlight) = self.highlight {
            filter.insert("highlight", highlight);
        }
        if let Some(mark_as_read) = self.mark_as_read {
            filter.insert("markAsRead", mark_as_read);
        }
        filter
    }
}

/// Repository trait for expo registration operations.
///
/// This trait allows mocking the database layer in tests.
#[async_trait]
pub trait ExpoRepository: Send + Sync {
    /// Insert a new registration and return it with its assigned id.
    async fn insert(&self, registration: ExpoRegistration) -> Result<ExpoRegistration, AppError>;

    /// List registrations matching the filter, honoring pagination.
    async fn list(
        &self,
        filter: &ExpoFilter,
        params: &ListParams,
    ) -> Result<Vec<ExpoRegistration>, AppError>;

    /// Count registrations matching the filter.
    async fn count(&self, filter: &ExpoFilter) -> Result<u64, AppError>;

    /// Apply admin flag/note/status changes and return the updated
    /// registration, or `None` when no registration has this id.
    async fn apply_admin_patch(
        &self,
        id: ObjectId,
        patch: &AdminPatch,
    ) -> Result<Option<ExpoRegistration>, AppError>;

    /// Every registration matching the filter, newest first, for export.
    async fn find_filtered(&self, filter: &ExpoFilter) -> Result<Vec<ExpoRegistration>, AppError>;

    /// Mark the given registrations as read, skipping ones already read.
    /// Returns the number of registrations flipped.
    async fn mark_read(&self, ids: &[ObjectId]) -> Result<u64, AppError>;
}

/// MongoDB implementation of the ExpoRepository.
pub struct MongoExpoRepository {
    collection: mongodb::Collection<ExpoRegistration>,
}

impl MongoExpoRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("expo_registrations"),
        }
    }
}

#[async_trait]
impl ExpoRepository for MongoExpoRepository {
    async fn insert(&self, mut registration: ExpoRegistration) -> Result<ExpoRegistration, AppError> {
        let result = self
            .collection
            .insert_one(&registration)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        registration.id = result.inserted_id.as_object_id();
        Ok(registration)
    }

    async fn list(
        &self,
        filter: &ExpoFilter,
        params: &ListParams,
    ) -> Result<Vec<ExpoRegistration>, AppError> {
        use mongodb::options::FindOptions;

        let mut options = FindOptions::builder()
            .sort(created_at_sort(params.sort))
            .build();
        options.skip = Some(params.skip());
        options.limit = params.limit();

        let mut cursor = self
            .collection
            .find(filter.to_document())
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut registrations = Vec::new();
        use futures::TryStreamExt;
        while let Some(registration) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            registrations.push(registration);
        }

        Ok(registrations)
    }

    async fn count(&self, filter: &ExpoFilter) -> Result<u64, AppError> {
        self.collection
            .count_documents(filter.to_document())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn apply_admin_patch(
        &self,
        id: ObjectId,
        patch: &AdminPatch,
    ) -> Result<Option<ExpoRegistration>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        let Some(mut update) = admin_patch_update(patch) else {
            return self
                .collection
                .find_one(doc! { "_id": id })
                .await
                .map_err(|e| AppError::Database(e.to_string()));
        };

        // Registrations track their own modification time.
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

    async fn find_filtered(&self, filter: &ExpoFilter) -> Result<Vec<ExpoRegistration>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();

        let mut cursor = self
            .collection
            .find(filter.to_document())
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut registrations = Vec::new();
        use futures::TryStreamExt;
        while let Some(registration) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            registrations.push(registration);
        }

        Ok(registrations)
    }

    async fn mark_read(&self, ids: &[ObjectId]) -> Result<u64, AppError> {
        use mongodb::bson::doc;

        let result = self
            .collection
            .update_many(
                doc! { "_id": { "$in": ids }, "markAsRead": { "$ne": true } },
                doc! { "$set": { "markAsRead": true } },
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.modified_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_is_empty_document() {
        assert!(ExpoFilter::default().to_document().is_empty());
    }

    #[test]
    fn study_destination_matches_list_or_other_field() {
        let filter = ExpoFilter {
            study_destination: Some("New Zealand".into()),
            ..Default::default()
        };
        let doc = filter.to_document();
        let ors = doc.get_array("$or").unwrap();
        assert_eq!(ors.len(), 2);
        let other = ors[1].as_document().unwrap();
        let regex = other.get_document("otherStudyDestination").unwrap();
        assert_eq!(regex.get_str("$regex").unwrap(), "^New\\ Zealand$");
        assert_eq!(regex.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn flags_land_as_booleans() {
        let filter = ExpoFilter {
            highlight: Some(true),
            mark_as_read: Some(false),
            ..Default::default()
        };
        let doc = filter.to_document();
        assert_eq!(doc.get_bool("highlight").unwrap(), true);
        assert_eq!(doc.get_bool("markAsRead").unwrap(), false);
    }
}
