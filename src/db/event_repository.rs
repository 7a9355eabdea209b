use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::error::AppError;
use crate::models::event::Event;

/// Repository trait for event operations.
///
/// This trait allows mocking the database layer in tests.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Insert a new event and return it with its assigned id.
    async fn insert(&self, event: Event) -> Result<Event, AppError>;

    /// Find an event by its id.
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Event>, AppError>;

    /// Find an event by its URL slug.
    async fn find_by_url(&self, event_url: &str) -> Result<Option<Event>, AppError>;

    /// List all events.
    async fn list_all(&self) -> Result<Vec<Event>, AppError>;

    /// Replace an event document wholesale.
    async fn replace(&self, id: ObjectId, event: &Event) -> Result<(), AppError>;

    /// Delete an event. Returns `false` when no event has this id.
    async fn delete(&self, id: ObjectId) -> Result<bool, AppError>;
}

/// MongoDB implementation of the EventRepository.
pub struct MongoEventRepository {
    collection: mongodb::Collection<Event>,
}

impl MongoEventRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("events"),
        }
    }
}

#[async_trait]
impl EventRepository for MongoEventRepository {
    async fn insert(&self, mut event: Event) -> Result<Event, AppError> {
        let result = self
            .collection
            .insert_one(&event)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        event.id = result.inserted_id.as_object_id();
        Ok(event)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Event>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_by_url(&self, event_url: &str) -> Result<Option<Event>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! { "eventURL": event_url })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_all(&self) -> Result<Vec<Event>, AppError> {
        use mongodb::bson::doc;

        let mut cursor = self
            .collection
            .find(doc! {})
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut events = Vec::new();
        use futures::TryStreamExt;
        while let Some(event) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            events.push(event);
        }

        Ok(events)
    }

    async fn replace(&self, id: ObjectId, event: &Event) -> Result<(), AppError> {
        use mongodb::bson::doc;

        self.collection
            .replace_one(doc! { "_id": id }, event)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
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
