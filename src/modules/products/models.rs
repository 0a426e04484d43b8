use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Product as stored in the `products` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Identifier assigned by the store on insert
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: i64,
}

impl ProductRecord {
    pub fn new(id: ObjectId, fields: ProductFields) -> Self {
        Self {
            id,
            image: fields.image,
            title: fields.title,
            description: fields.description,
            price: fields.price,
        }
    }

    /// Overwrite every mutable field, leaving the identifier alone.
    pub fn replace_fields(&mut self, fields: ProductFields) {
        self.image = fields.image;
        self.title = fields.title;
        self.description = fields.description;
        self.price = fields.price;
    }
}

/// Request body for create and update.
///
/// Absent keys decode to empty strings and zero, and unknown keys such as
/// `id` are ignored, so an update always replaces all four fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductFields {
    /// Image URL or path
    pub image: String,
    pub title: String,
    pub description: String,
    /// Price in the smallest unit the client uses; may be zero or negative
    pub price: i64,
}

/// Product as rendered in API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Hex encoded identifier
    pub id: String,
    pub image: String,
    pub title: String,
    pub description: String,
    pub price: i64,
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Self {
            id: record.id.to_hex(),
            image: record.image,
            title: record.title,
            description: record.description,
            price: record.price,
        }
    }
}
