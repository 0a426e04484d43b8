//! Persistence for products.
//!
//! Handlers only see [`ProductStore`]. [`MongoProductStore`] is what the
//! service runs with; [`InMemoryProductStore`] keeps the same contract in a
//! vector and backs the HTTP tests.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson},
    Collection,
};
use thiserror::Error;
use tokio::sync::RwLock;

use super::models::{ProductFields, ProductRecord};

/// Name of the collection holding products.
pub const PRODUCTS_COLLECTION: &str = "products";

/// Shared handle stored in the router state.
pub type SharedProductStore = Arc<dyn ProductStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),

    #[error("store returned a non-ObjectId identifier: {0}")]
    UnexpectedId(Bson),
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a new product; the store assigns its identifier.
    async fn insert(&self, fields: ProductFields) -> Result<ProductRecord, StoreError>;

    async fn find(&self, id: ObjectId) -> Result<Option<ProductRecord>, StoreError>;

    /// Every product in the store's natural order.
    async fn list(&self) -> Result<Vec<ProductRecord>, StoreError>;

    /// Replace the four mutable fields. Returns how many records matched.
    async fn update(&self, id: ObjectId, fields: ProductFields) -> Result<u64, StoreError>;

    /// Returns how many records were removed.
    async fn delete(&self, id: ObjectId) -> Result<u64, StoreError>;
}

/// [`ProductStore`] over a MongoDB collection.
#[derive(Clone, Debug)]
pub struct MongoProductStore {
    collection: Collection<ProductRecord>,
}

impl MongoProductStore {
    pub fn new(database: &catalog_db::Database) -> Self {
        Self {
            collection: database.collection(PRODUCTS_COLLECTION),
        }
    }
}

#[async_trait]
impl ProductStore for MongoProductStore {
    async fn insert(&self, fields: ProductFields) -> Result<ProductRecord, StoreError> {
        let result = self
            .collection
            .clone_with_type::<ProductFields>()
            .insert_one(&fields)
            .await?;

        match result.inserted_id {
            Bson::ObjectId(id) => Ok(ProductRecord::new(id, fields)),
            other => Err(StoreError::UnexpectedId(other)),
        }
    }

    async fn find(&self, id: ObjectId) -> Result<Option<ProductRecord>, StoreError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn list(&self) -> Result<Vec<ProductRecord>, StoreError> {
        let cursor = self.collection.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update(&self, id: ObjectId, fields: ProductFields) -> Result<u64, StoreError> {
        let update = doc! {
            "$set": {
                "image": fields.image,
                "title": fields.title,
                "description": fields.description,
                "price": fields.price,
            }
        };
        let result = self
            .collection
            .update_one(doc! { "_id": id }, update)
            .await?;
        Ok(result.matched_count)
    }

    async fn delete(&self, id: ObjectId) -> Result<u64, StoreError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count)
    }
}

/// Insertion-ordered [`ProductStore`] held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    records: RwLock<Vec<ProductRecord>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, fields: ProductFields) -> Result<ProductRecord, StoreError> {
        let record = ProductRecord::new(ObjectId::new(), fields);
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn find(&self, id: ObjectId) -> Result<Option<ProductRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|record| record.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<ProductRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn update(&self, id: ObjectId, fields: ProductFields) -> Result<u64, StoreError> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|record| record.id == id) {
            Some(record) => {
                record.replace_fields(fields);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: ObjectId) -> Result<u64, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|record| record.id != id);
        Ok((before - records.len()) as u64)
    }
}
