use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::db::query::created_at_sort;
use crate::error::AppError;
use crate::models::blog::{Blog, TrashedBlog};
use crate::pagination::ListParams;

/// Repository trait for blog operations, including the trash collection
/// deleted blogs are parked in.
///
/// This trait allows mocking the database layer in tests.
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// Insert a new blog and return it with its assigned id.
    async fn insert(&self, blog: Blog) -> Result<Blog, AppError>;

    /// Find a blog by its URL slug.
    async fn find_by_url(&self, blog_url: &str) -> Result<Option<Blog>, AppError>;

    /// Find a blog by its id.
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Blog>, AppError>;

    /// List blogs, optionally filtered by status and category, honoring
    /// pagination.
    async fn list(
        &self,
        status: Option<&str>,
        category: Option<ObjectId>,
        params: &ListParams,
    ) -> Result<Vec<Blog>, AppError>;

    /// Count blogs under the same filters as `list`.
    async fn count(&self, status: Option<&str>, category: Option<ObjectId>)
        -> Result<u64, AppError>;

    /// The most recently created blogs, newest first.
    async fn latest(&self, limit: i64) -> Result<Vec<Blog>, AppError>;

    /// Blogs assigned to the given category, newest first.
    async fn list_by_category(&self, category_id: ObjectId) -> Result<Vec<Blog>, AppError>;

    /// Direct children of the given blog, in series order.
    async fn children_of(&self, parent_id: ObjectId) -> Result<Vec<Blog>, AppError>;

    /// Blogs for which the given category is their only category. These
    /// block the category's deletion.
    async fn sole_category_blockers(&self, category_id: ObjectId) -> Result<Vec<Blog>, AppError>;

    /// Distinct category ids referenced by at least one blog.
    async fn used_category_ids(&self) -> Result<Vec<ObjectId>, AppError>;

    /// Remove the given category from every blog's category list. Returns
    /// the number of blogs touched.
    async fn pull_category(&self, category_id: ObjectId) -> Result<u64, AppError>;

    /// Replace a blog only if its stored version still matches
    /// `expected_version`. Returns `false` when another writer got there
    /// first (or the blog is gone).
    async fn update_with_version_guard(
        &self,
        id: ObjectId,
        expected_version: &str,
        blog: &Blog,
    ) -> Result<bool, AppError>;

    /// Park a deleted blog in the trash collection.
    async fn insert_trash(&self, trashed: TrashedBlog) -> Result<(), AppError>;

    /// List trashed blogs, most recently deleted first.
    async fn list_trash(&self) -> Result<Vec<TrashedBlog>, AppError>;

    /// Delete a blog. Returns `false` when no blog has this id.
    async fn delete(&self, id: ObjectId) -> Result<bool, AppError>;
}

/// MongoDB implementation of the BlogRepository.
pub struct MongoBlogRepository {
    collection: mongodb::Collection<Blog>,
    trash: mongodb::Collection<TrashedBlog>,
}

impl MongoBlogRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("blogs"),
            trash: db.collection("blog_trash"),
        }
    }
}

#[async_trait]
impl BlogRepository for MongoBlogRepository {
    async fn insert(&self, mut blog: Blog) -> Result<Blog, AppError> {
        let result = self
            .collection
            .insert_one(&blog)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        blog.id = result.inserted_id.as_object_id();
        Ok(blog)
    }

    async fn find_by_url(&self, blog_url: &str) -> Result<Option<Blog>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! { "blogURL": blog_url })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Blog>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list(
        &self,
        status: Option<&str>,
        category: Option<ObjectId>,
        params: &ListParams,
    ) -> Result<Vec<Blog>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let mut filter = doc! {};
        if let Some(status) = status {
            filter.insert("status", status);
        }
        if let Some(category) = category {
            filter.insert("categories", category);
        }

        let mut options = FindOptions::builder()
            .sort(created_at_sort(params.sort))
            .build();
        options.skip = Some(params.skip());
        options.limit = params.limit();

        let mut cursor = self
            .collection
            .find(filter)
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut blogs = Vec::new();
        use futures::TryStreamExt;
        while let Some(blog) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            blogs.push(blog);
        }

        Ok(blogs)
    }

    async fn count(
        &self,
        status: Option<&str>,
        category: Option<ObjectId>,
    ) -> Result<u64, AppError> {
        use mongodb::bson::doc;

        let mut filter = doc! {};
        if let Some(status) = status {
            filter.insert("status", status);
        }
        if let Some(category) = category {
            filter.insert("categories", category);
        }

        self.collection
            .count_documents(filter)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn latest(&self, limit: i64) -> Result<Vec<Blog>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let mut options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();
        options.limit = Some(limit);

        let mut cursor = self
            .collection
            .find(doc! {})
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut blogs = Vec::new();
        use futures::TryStreamExt;
        while let Some(blog) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            blogs.push(blog);
        }

        Ok(blogs)
    }

    async fn list_by_category(&self, category_id: ObjectId) -> Result<Vec<Blog>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();

        let mut cursor = self
            .collection
            .find(doc! { "categories": category_id })
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut blogs = Vec::new();
        use futures::TryStreamExt;
        while let Some(blog) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            blogs.push(blog);
        }

        Ok(blogs)
    }

    async fn children_of(&self, parent_id: ObjectId) -> Result<Vec<Blog>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(doc! { "childOrder": 1, "createdAt": 1 })
            .build();

        let mut cursor = self
            .collection
            .find(doc! { "parentBlog": parent_id })
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut blogs = Vec::new();
        use futures::TryStreamExt;
        while let Some(blog) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            blogs.push(blog);
        }

        Ok(blogs)
    }

    async fn sole_category_blockers(&self, category_id: ObjectId) -> Result<Vec<Blog>, AppError> {
        use mongodb::bson::doc;

        // Exact array match: the category list is [category_id] and
        // nothing else.
        let mut cursor = self
            .collection
            .find(doc! { "categories": [category_id] })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut blogs = Vec::new();
        use futures::TryStreamExt;
        while let Some(blog) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            blogs.push(blog);
        }

        Ok(blogs)
    }

    async fn used_category_ids(&self) -> Result<Vec<ObjectId>, AppError> {
        use mongodb::bson::doc;

        let values = self
            .collection
            .distinct("categories", doc! {})
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(values
            .iter()
            .filter_map(|value| value.as_object_id())
            .collect())
    }

    async fn pull_category(&self, category_id: ObjectId) -> Result<u64, AppError> {
        use mongodb::bson::doc;

        let result = self
            .collection
            .update_many(
                doc! { "categories": category_id },
                doc! { "$pull": { "categories": category_id } },
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.modified_count)
    }

    async fn update_with_version_guard(
        &self,
        id: ObjectId,
        expected_version: &str,
        blog: &Blog,
    ) -> Result<bool, AppError> {
        use mongodb::bson::doc;

        let filter = doc! { "_id": id, "version": expected_version };

        let result = self
            .collection
            .replace_one(filter, blog)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.matched_count > 0)
    }

    async fn insert_trash(&self, trashed: TrashedBlog) -> Result<(), AppError> {
        self.trash
            .insert_one(&trashed)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn list_trash(&self) -> Result<Vec<TrashedBlog>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(doc! { "deletedAt": -1 })
            .build();

        let mut cursor = self
            .trash
            .find(doc! {})
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut trashed = Vec::new();
        use futures::TryStreamExt;
        while let Some(entry) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            trashed.push(entry);
        }

        Ok(trashed)
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
