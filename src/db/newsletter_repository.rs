use async_trait::async_trait;
use mongodb::bson::Document;

use crate::error::AppError;
use crate::models::site::NewsletterSubscriber;

/// Repository trait for newsletter subscriber operations.
///
/// This trait allows mocking the database layer in tests.
#[async_trait]
pub trait NewsletterRepository: Send + Sync {
    /// Insert a new subscriber.
    async fn insert(&self, subscriber: NewsletterSubscriber)
        -> Result<NewsletterSubscriber, AppError>;

    /// Find a subscriber by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<NewsletterSubscriber>, AppError>;

    /// List subscribers, optionally restricted to a `createdAt` range,
    /// newest first.
    async fn list(
        &self,
        created_range: Option<Document>,
    ) -> Result<Vec<NewsletterSubscriber>, AppError>;
}

/// MongoDB implementation of the NewsletterRepository.
pub struct MongoNewsletterRepository {
    collection: mongodb::Collection<NewsletterSubscriber>,
}

impl MongoNewsletterRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("newsletter_subscribers"),
        }
    }
}

#[async_trait]
impl NewsletterRepository for MongoNewsletterRepository {
    async fn insert(
        &self,
        mut subscriber: NewsletterSubscriber,
    ) -> Result<NewsletterSubscriber, AppError> {
        let result = self
            .collection
            .insert_one(&subscriber)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        subscriber.id = result.inserted_id.as_object_id();
        Ok(subscriber)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<NewsletterSubscriber>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! { "email": email })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list(
        &self,
        created_range: Option<Document>,
    ) -> Result<Vec<NewsletterSubscriber>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let filter = match created_range {
            Some(range) => doc! { "createdAt": range },
            None => doc! {},
        };

        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();

        let mut cursor = self
            .collection
            .find(filter)
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut subscribers = Vec::new();
        use futures::TryStreamExt;
        while let Some(subscriber) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            subscribers.push(subscriber);
        }

        Ok(subscribers)
    }
}
