// views/mod.rs - AJAX-aware view components
//
// Host views describe what they can do through the capability traits below;
// the components in `delete` and `form` wrap a host for the length of one
// request and decide between a JSON envelope and the host's own behavior.

pub mod delete;
pub mod form;

pub use delete::{delete_view, AjaxDeleteView, DeleteHost, DeleteOutcome};
pub use form::{form_view, AjaxFormView, FormHost};

use async_trait::async_trait;

use crate::error::ViewError;
use crate::request::AjaxRequest;

/// Resolve the single record a request addresses (by id, slug, ...)
#[async_trait]
pub trait ObjectLookup: Send + Sync {
    type Object: Send + Sync;

    async fn get_object(&self, request: &AjaxRequest) -> Result<Self::Object, ViewError>;
}
