//! Router builder for the catalog HTTP server

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use catalog_kernel::ModuleRegistry;

use crate::{response::ApiResponse, MakeRequestUuidV7};

/// Prefix every module's routes are mounted under
pub const API_PREFIX: &str = "/api/v1";

/// Builder for constructing the main HTTP router.
///
/// `Router::layer` only wraps routes that already exist, so add routes and
/// modules before the middleware.
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Merge every module's router and mount the result under [`API_PREFIX`].
    ///
    /// Every response from a module route is labelled `application/json`,
    /// including the envelope sent for an unsupported method.
    pub fn mount_modules(mut self, registry: &ModuleRegistry) -> Self {
        if registry.module_count() == 0 {
            return self;
        }

        let mut api = Router::new();
        for module in registry.modules() {
            tracing::info!(
                module = module.name(),
                "mounting module routes under {}",
                API_PREFIX
            );
            api = api.merge(module.routes());
        }

        // Must follow the merge: it only reaches routes that already exist
        let api = api
            .method_not_allowed_fallback(method_not_allowed)
            .layer(SetResponseHeaderLayer::overriding(
                CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            ));
        self.router = self.router.nest(API_PREFIX, api);
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Generate an `x-request-id` when the client sent none and echo it back
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        self
    }

    /// Add timeout middleware when a limit is configured
    pub fn with_timeout(mut self, timeout_ms: Option<u64>) -> Self {
        if let Some(timeout_ms) = timeout_ms {
            self.router = self
                .router
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_millis(timeout_ms),
                ));
        }
        self
    }

    /// Serve an OpenAPI document assembled from every module's fragment
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let openapi_spec = merged_openapi(registry);

        // Round-trip through utoipa so a malformed fragment shows up at startup
        let validated = serde_json::from_value::<utoipa::openapi::OpenApi>(openapi_spec.clone());
        if let Err(err) = validated {
            tracing::warn!(error = %err, "merged OpenAPI document does not validate");
        }

        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { axum::Json(openapi_spec.clone()) }),
        );

        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn method_not_allowed() -> ApiResponse<()> {
    ApiResponse::failure(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", None)
}

fn merged_openapi(registry: &ModuleRegistry) -> serde_json::Value {
    let mut openapi_spec = serde_json::json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Catalog API",
            "version": "1.0.0",
            "description": "Product catalog CRUD API"
        },
        "paths": {},
        "components": {
            "schemas": {}
        }
    });

    // Shared envelope returned by every failing request
    openapi_spec["components"]["schemas"]["ErrorResponse"] = serde_json::json!({
        "type": "object",
        "properties": {
            "error": { "type": "string" },
            "message": { "type": "string" },
            "status": { "type": "integer" }
        },
        "required": ["message", "status"]
    });

    openapi_spec["paths"]["/"] = serde_json::json!({
        "get": {
            "summary": "Liveness check",
            "responses": {
                "200": {
                    "description": "Server is running",
                    "content": {
                        "text/plain": {
                            "schema": { "type": "string" }
                        }
                    }
                }
            }
        }
    });

    for module in registry.modules() {
        let Some(module_spec) = module.openapi() else {
            continue;
        };

        if let Some(paths) = module_spec.get("paths").and_then(|p| p.as_object()) {
            for (path, path_item) in paths {
                let prefixed_path = format!("{}{}", API_PREFIX, path);
                openapi_spec["paths"][prefixed_path] = path_item.clone();
            }
        }

        if let Some(schemas) = module_spec
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(|s| s.as_object())
        {
            for (schema_name, schema_def) in schemas {
                openapi_spec["components"]["schemas"][schema_name] = schema_def.clone();
            }
        }
    }

    openapi_spec
}
