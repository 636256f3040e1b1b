use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::middleware::bearer_auth_middleware;
use crate::state::AppState;

/// Build the full HTTP router.
///
/// Every resource route is served both at the root and under `/api`.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Resource routes
        .merge(resource_routes(state.clone()))
        .nest("/api", resource_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn resource_routes(state: AppState) -> Router<AppState> {
    // Same-path routes with different methods merge, so POST /customers stays
    // public while GET /customers sits behind the gate
    Router::new().merge(public_routes()).merge(protected_routes(state))
}

fn public_routes() -> Router<AppState> {
    use axum::routing::post;

    Router::new()
        .route("/register", post(public::register_post))
        .route("/login", post(public::login_post))
        .route("/customers", post(public::customer_create))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{customers, orders};

    Router::new()
        // Session
        .route("/profile", get(protected::session_profile))
        .route("/logout", get(protected::session_logout))
        // Customers
        .route("/customers", get(customers::customer_index))
        .route(
            "/customers/:id",
            get(customers::customer_show)
                .put(customers::customer_update)
                .delete(customers::customer_destroy),
        )
        .route("/customers/:id/orders", get(customers::customer_with_orders))
        // Orders
        .route("/orders", get(orders::order_index).post(orders::order_store))
        .route(
            "/orders/:id",
            get(orders::order_show)
                .put(orders::order_update)
                .delete(orders::order_destroy),
        )
        .route_layer(middleware::from_fn_with_state(state, bearer_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Order Desk API",
            "version": version,
            "description": "Customer and order management backend with bearer-token auth",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "POST /register, POST /login (public); GET /profile, GET /logout (protected)",
                "customers": "POST /customers (public); GET /customers, GET|PUT|DELETE /customers/:id, GET /customers/:id/orders (protected)",
                "orders": "GET|POST /orders, GET|PUT|DELETE /orders/:id (protected)",
                "api": "every route above is also served under /api",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.stores.health.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
