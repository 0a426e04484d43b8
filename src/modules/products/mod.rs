pub mod handlers;
pub mod models;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use catalog_kernel::{InitCtx, Module};
use serde_json::json;

use store::SharedProductStore;

/// Product CRUD endpoints over an injected [`store::ProductStore`].
pub struct ProductsModule {
    store: SharedProductStore,
}

impl ProductsModule {
    pub fn new(store: SharedProductStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for ProductsModule {
    fn name(&self) -> &'static str {
        "products"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            collection = store::PRODUCTS_COLLECTION,
            "products module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        handlers::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "products module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "products module stopped");
        Ok(())
    }
}

fn json_response(description: &str, schema: serde_json::Value) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": { "schema": schema }
        }
    })
}

fn error_response(description: &str) -> serde_json::Value {
    json_response(
        description,
        json!({ "$ref": "#/components/schemas/ErrorResponse" }),
    )
}

fn envelope(data: serde_json::Value) -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "data": data,
            "message": { "type": "string" },
            "status": { "type": "integer" }
        },
        "required": ["message", "status"]
    })
}

fn openapi_fragment() -> serde_json::Value {
    let product = json!({ "$ref": "#/components/schemas/Product" });
    let id_param = json!({
        "name": "id",
        "in": "path",
        "required": true,
        "description": "Hex encoded product identifier",
        "schema": { "type": "string", "pattern": "^[0-9a-fA-F]{24}$" }
    });
    let body = json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ProductFields" }
            }
        }
    });

    json!({
        "paths": {
            "/product": {
                "post": {
                    "summary": "Create a product",
                    "tags": ["Products"],
                    "requestBody": body.clone(),
                    "responses": {
                        "201": json_response("Product created", envelope(product.clone())),
                        "400": error_response("Malformed request body"),
                        "500": error_response("Storage failure")
                    }
                }
            },
            "/products": {
                "get": {
                    "summary": "List products",
                    "tags": ["Products"],
                    "responses": {
                        "200": json_response(
                            "Every product, possibly none",
                            envelope(json!({ "type": "array", "items": product.clone() }))
                        ),
                        "500": error_response("Storage failure")
                    }
                }
            },
            "/product/{id}": {
                "get": {
                    "summary": "Get a product",
                    "tags": ["Products"],
                    "parameters": [id_param.clone()],
                    "responses": {
                        "200": json_response("Product found", envelope(product.clone())),
                        "400": error_response("Malformed identifier"),
                        "404": error_response("Product not found"),
                        "500": error_response("Storage failure")
                    }
                },
                "patch": {
                    "summary": "Replace a product's fields",
                    "tags": ["Products"],
                    "parameters": [id_param.clone()],
                    "requestBody": body,
                    "responses": {
                        "200": json_response("Product after the update", envelope(product)),
                        "400": error_response("Malformed identifier or body"),
                        "404": error_response("Product not found"),
                        "500": error_response("Storage failure")
                    }
                },
                "delete": {
                    "summary": "Delete a product",
                    "tags": ["Products"],
                    "parameters": [id_param],
                    "responses": {
                        "200": json_response("Product deleted", envelope(json!({ "type": "null" }))),
                        "400": error_response("Malformed identifier"),
                        "404": error_response("Product not found"),
                        "500": error_response("Storage failure")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Product": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "description": "Hex encoded identifier" },
                        "image": { "type": "string" },
                        "title": { "type": "string" },
                        "description": { "type": "string" },
                        "price": { "type": "integer", "format": "int64" }
                    },
                    "required": ["id", "image", "title", "description", "price"]
                },
                "ProductFields": {
                    "type": "object",
                    "description": "Missing fields are stored as empty strings or zero",
                    "properties": {
                        "image": { "type": "string" },
                        "title": { "type": "string" },
                        "description": { "type": "string" },
                        "price": { "type": "integer", "format": "int64" }
                    }
                }
            }
        }
    })
}

/// Create the products module around `store`
pub fn create_module(store: SharedProductStore) -> Arc<dyn Module> {
    Arc::new(ProductsModule::new(store))
}
