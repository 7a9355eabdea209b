use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::site::WelcomeModal;

/// Repository trait for the welcome-modal singleton.
#[async_trait]
pub trait WelcomeModalRepository: Send + Sync {
    /// Get the welcome modal, if one has been configured.
    async fn get(&self) -> Result<Option<WelcomeModal>, AppError>;

    /// Create or replace the singleton's fields. `expires_at` is a
    /// three-state value: `None` leaves the stored expiry untouched,
    /// `Some(None)` clears it, `Some(Some(..))` sets it.
    async fn upsert(
        &self,
        large_image_url: &str,
        phone_image_url: &str,
        form_link: &str,
        expires_at: Option<Option<DateTime<Utc>>>,
    ) -> Result<WelcomeModal, AppError>;
}

/// MongoDB implementation of the WelcomeModalRepository.
pub struct MongoWelcomeModalRepository {
    collection: mongodb::Collection<WelcomeModal>,
}

impl MongoWelcomeModalRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("welcome_modal"),
        }
    }
}

#[async_trait]
impl WelcomeModalRepository for MongoWelcomeModalRepository {
    async fn get(&self) -> Result<Option<WelcomeModal>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! {})
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert(
        &self,
        large_image_url: &str,
        phone_image_url: &str,
        form_link: &str,
        expires_at: Option<Option<DateTime<Utc>>>,
    ) -> Result<WelcomeModal, AppError> {
        use mongodb::bson::{doc, Bson};
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        let now = mongodb::bson::DateTime::from_chrono(Utc::now());

        let mut set = doc! {
            "largeImageURL": large_image_url,
            "phoneImageURL": phone_image_url,
            "formLink": form_link,
            "updatedAt": now,
        };
        match expires_at {
            Some(Some(instant)) => {
                set.insert("expiresAt", mongodb::bson::DateTime::from_chrono(instant));
            }
            Some(None) => {
                set.insert("expiresAt", Bson::Null);
            }
            None => {}
        }

        let update = doc! {
            "$set": set,
            "$setOnInsert": { "createdAt": now },
        };

        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(doc! {}, update)
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::Database("welcome modal upsert returned no document".into()))
    }
}
