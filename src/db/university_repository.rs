use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::error::AppError;
use crate::models::university::University;

/// Repository trait for university profile operations.
///
/// This trait allows mocking the database layer in tests.
#[async_trait]
pub trait UniversityRepository: Send + Sync {
    /// Insert a new university and return it with its assigned id.
    async fn insert(&self, university: University) -> Result<University, AppError>;

    /// Find a university by its URL slug.
    async fn find_by_url(&self, university_url: &str) -> Result<Option<University>, AppError>;

    /// List all universities, sorted by name.
    async fn list_all(&self) -> Result<Vec<University>, AppError>;

    /// List universities in the given country, sorted by name.
    async fn list_by_country(&self, country: &str) -> Result<Vec<University>, AppError>;

    /// Distinct countries with at least one university, sorted.
    async fn distinct_countries(&self) -> Result<Vec<String>, AppError>;

    /// Replace a university document wholesale.
    async fn replace(&self, id: ObjectId, university: &University) -> Result<(), AppError>;

    /// Delete a university by its URL slug, returning the deleted document.
    async fn delete_by_url(&self, university_url: &str) -> Result<Option<University>, AppError>;
}

/// MongoDB implementation of the UniversityRepository.
pub struct MongoUniversityRepository {
    collection: mongodb::Collection<University>,
}

impl MongoUniversityRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("universities"),
        }
    }
}

#[async_trait]
impl UniversityRepository for MongoUniversityRepository {
    async fn insert(&self, mut university: University) -> Result<University, AppError> {
        let result = self
            .collection
            .insert_one(&university)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        university.id = result.inserted_id.as_object_id();
        Ok(university)
    }

    async fn find_by_url(&self, university_url: &str) -> Result<Option<University>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! { "universityUrl": university_url })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_all(&self) -> Result<Vec<University>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder().sort(doc! { "name": 1 }).build();

        let mut cursor = self
            .collection
            .find(doc! {})
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut universities = Vec::new();
        use futures::TryStreamExt;
        while let Some(university) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            universities.push(university);
        }

        Ok(universities)
    }

    async fn list_by_country(&self, country: &str) -> Result<Vec<University>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder().sort(doc! { "name": 1 }).build();

        let mut cursor = self
            .collection
            .find(doc! { "country": country })
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut universities = Vec::new();
        use futures::TryStreamExt;
        while let Some(university) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            universities.push(university);
        }

        Ok(universities)
    }

    async fn distinct_countries(&self) -> Result<Vec<String>, AppError> {
        use mongodb::bson::doc;

        let values = self
            .collection
            .distinct("country", doc! {})
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut countries: Vec<String> = values
            .iter()
            .filter_map(|value| value.as_str().map(str::to_string))
            .collect();
        countries.sort();

        Ok(countries)
    }

    async fn replace(&self, id: ObjectId, university: &University) -> Result<(), AppError> {
        use mongodb::bson::doc;

        self.collection
            .replace_one(doc! { "_id": id }, university)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete_by_url(&self, university_url: &str) -> Result<Option<University>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one_and_delete(doc! { "universityUrl": university_url })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
