use axum::{
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    routing::{get, post},
    Router,
};
use catalog_http::{ApiResponse, AppError, JsonBody};
use mongodb::bson::oid::ObjectId;

use super::{
    models::{Product, ProductFields},
    store::SharedProductStore,
};

const NOT_FOUND: &str = "Product not found";

/// `{id}` path segment parsed as a hex `ObjectId`.
///
/// Rejects before the handler runs, so a malformed id never reaches the store.
#[derive(Debug, Clone, Copy)]
pub struct ProductId(pub ObjectId);

impl<S> FromRequestParts<S> for ProductId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                AppError::bad_request("Invalid product ID", Some(rejection.body_text()))
            })?;

        ObjectId::parse_str(&raw)
            .map(ProductId)
            .map_err(|err| AppError::bad_request("Invalid product ID", Some(err.to_string())))
    }
}

pub fn router(store: SharedProductStore) -> Router {
    Router::new()
        .route("/products", get(list_products))
        .route("/product", post(create_product))
        .route(
            "/product/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .with_state(store)
}

pub async fn create_product(
    State(store): State<SharedProductStore>,
    JsonBody(fields): JsonBody<ProductFields>,
) -> Result<ApiResponse<Product>, AppError> {
    tracing::debug!(?fields, "create product request");

    let record = store
        .insert(fields)
        .await
        .map_err(|err| AppError::internal("Failed to create product", err))?;

    tracing::info!(id = %record.id, "product created");
    Ok(ApiResponse::created(record.into(), "Product created successfully"))
}

pub async fn get_product(
    State(store): State<SharedProductStore>,
    ProductId(id): ProductId,
) -> Result<ApiResponse<Product>, AppError> {
    let record = store
        .find(id)
        .await
        .map_err(|err| AppError::internal("Failed to retrieve product", err))?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    Ok(ApiResponse::ok(record.into(), "Product retrieved successfully"))
}

pub async fn list_products(
    State(store): State<SharedProductStore>,
) -> Result<ApiResponse<Vec<Product>>, AppError> {
    let records = store
        .list()
        .await
        .map_err(|err| AppError::internal("Failed to retrieve products", err))?;

    let products = records.into_iter().map(Product::from).collect();
    Ok(ApiResponse::ok(products, "Products retrieved successfully"))
}

pub async fn update_product(
    State(store): State<SharedProductStore>,
    ProductId(id): ProductId,
    JsonBody(fields): JsonBody<ProductFields>,
) -> Result<ApiResponse<Product>, AppError> {
    tracing::debug!(%id, ?fields, "update product request");

    store
        .update(id, fields)
        .await
        .map_err(|err| AppError::internal("Failed to update product", err))?;

    // Read back so the response shows what is stored now
    let record = store
        .find(id)
        .await
        .map_err(|err| AppError::internal("Failed to retrieve product", err))?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    Ok(ApiResponse::ok(record.into(), "Product updated successfully"))
}

pub async fn delete_product(
    State(store): State<SharedProductStore>,
    ProductId(id): ProductId,
) -> Result<ApiResponse<()>, AppError> {
    let deleted = store
        .delete(id)
        .await
        .map_err(|err| AppError::internal("Failed to delete product", err))?;

    if deleted == 0 {
        return Err(AppError::not_found(NOT_FOUND));
    }

    tracing::info!(%id, "product deleted");
    Ok(ApiResponse::message(StatusCode::OK, "Product deleted successfully"))
}
