use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{config, SecurityConfig};
use crate::contacts::{self, ContactStore};
use crate::request::REQUESTED_WITH_HEADER;

/// Full application router: service endpoints plus the contact views
pub fn app(store: ContactStore) -> Router {
    let config = config();

    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(store.clone())
        .merge(contacts::routes(store));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUESTED_WITH_HEADER)])
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "forms-ajaxified",
            "version": version,
            "description": "AJAX-aware form and delete views",
            "endpoints": {
                "contacts": "/contacts/ (GET, JSON list)",
                "contact": "/contacts/:id/ (GET, JSON)",
                "create": "/contacts/new/ (GET form, POST submit)",
                "edit": "/contacts/:id/edit/ (GET form, POST submit)",
                "delete": "/contacts/:id/delete/ (POST)",
            },
            "parameters": ["skip_form", "trigger_element", "form_valid_redirect"],
        }
    }))
}

async fn health(State(store): State<ContactStore>) -> Json<Value> {
    let now = chrono::Utc::now();

    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": now,
            "contacts": store.len().await
        }
    }))
}
