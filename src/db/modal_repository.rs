use async_trait::async_trait;
use mongodb::bson::Document;

use crate::error::AppError;
use crate::models::site::ModalRegistration;

/// Repository trait for welcome-modal registration operations.
///
/// This trait allows mocking the database layer in tests.
#[async_trait]
pub trait ModalRepository: Send + Sync {
    /// Insert a new registration and return it with its assigned id.
    async fn insert(&self, registration: ModalRegistration) -> Result<ModalRegistration, AppError>;

    /// List registrations, optionally restricted to a `createdAt` range.
    async fn list(
        &self,
        created_range: Option<Document>,
    ) -> Result<Vec<ModalRegistration>, AppError>;
}

/// MongoDB implementation of the ModalRepository.
pub struct MongoModalRepository {
    collection: mongodb::Collection<ModalRegistration>,
}

impl MongoModalRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("modal_registrations"),
        }
    }
}

#[async_trait]
impl ModalRepository for MongoModalRepository {
    async fn insert(
        &self,
        mut registration: ModalRegistration,
    ) -> Result<ModalRegistration, AppError> {
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
        created_range: Option<Document>,
    ) -> Result<Vec<ModalRegistration>, AppError> {
        use mongodb::bson::doc;

        let filter = match created_range {
            Some(range) => doc! { "createdAt": range },
            None => doc! {},
        };

        let mut cursor = self
            .collection
            .find(filter)
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
}
