use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{any, get},
    Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

use super::store::ContactStore;
use super::views::{ContactCreateView, ContactDeleteView, ContactUpdateView};
use crate::error::ViewError;
use crate::views::{delete_view, form_view};

pub fn routes(store: ContactStore) -> Router {
    let read = Router::new()
        .route("/contacts/", get(list))
        .route("/contacts/:id/", get(detail))
        .with_state(store.clone());

    // The view components answer 405 themselves, so they take every method
    let create = Router::new()
        .route("/contacts/new/", any(form_view::<ContactCreateView>))
        .with_state(Arc::new(ContactCreateView::new(store.clone())));

    let update = Router::new()
        .route("/contacts/:id/edit/", any(form_view::<ContactUpdateView>))
        .with_state(Arc::new(ContactUpdateView::new(store.clone())));

    let delete = Router::new()
        .route("/contacts/:id/delete/", any(delete_view::<ContactDeleteView>))
        .with_state(Arc::new(ContactDeleteView::new(store)));

    read.merge(create).merge(update).merge(delete)
}

/// GET /contacts/ - all contacts
async fn list(State(store): State<ContactStore>) -> Json<Value> {
    let contacts = store.list().await;
    Json(json!({ "success": true, "data": contacts }))
}

/// GET /contacts/:id/ - one contact
async fn detail(State(store): State<ContactStore>, Path(id): Path<Uuid>) -> Result<Json<Value>, ViewError> {
    let contact = store.get(id).await?;
    Ok(Json(json!({ "success": true, "data": contact })))
}
