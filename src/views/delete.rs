use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::Method,
    response::{IntoResponse, Response},
};

use super::ObjectLookup;
use crate::error::ViewError;
use crate::request::AjaxRequest;
use crate::response::AjaxResponse;

const ALLOWED_METHODS: &[&str] = &["POST"];

/// A host that can look a record up and delete it
#[async_trait]
pub trait DeleteHost: ObjectLookup {
    async fn delete_object(&self, object: Self::Object) -> Result<(), ViewError>;
}

/// Result of a delete attempt. Every failure is kept, whatever its kind, and
/// reported to the caller as a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Failed(ViewError),
}

impl From<DeleteOutcome> for AjaxResponse {
    fn from(outcome: DeleteOutcome) -> Self {
        match outcome {
            DeleteOutcome::Deleted => AjaxResponse::Deleted,
            DeleteOutcome::Failed(err) => AjaxResponse::DeleteFailed(err.to_string()),
        }
    }
}

/// Turns any `DeleteHost` into a one-shot delete endpoint answering JSON
pub struct AjaxDeleteView<'a, H> {
    host: &'a H,
}

impl<'a, H: DeleteHost> AjaxDeleteView<'a, H> {
    pub fn new(host: &'a H) -> Self {
        Self { host }
    }

    pub async fn dispatch(&self, request: &AjaxRequest) -> Result<Response, ViewError> {
        if *request.method() == Method::POST {
            Ok(self.post(request).await.into_response())
        } else {
            Err(ViewError::method_not_allowed(request.method(), ALLOWED_METHODS))
        }
    }

    /// Look the record up and delete it. Always answers 200; failures travel
    /// in the envelope.
    pub async fn post(&self, request: &AjaxRequest) -> AjaxResponse {
        let outcome = self.delete(request).await;
        if let DeleteOutcome::Failed(err) = &outcome {
            tracing::debug!("Delete failed for {:?}: {}", request.kwargs(), err);
        }
        outcome.into()
    }

    pub async fn delete(&self, request: &AjaxRequest) -> DeleteOutcome {
        let object = match self.host.get_object(request).await {
            Ok(object) => object,
            Err(err) => return DeleteOutcome::Failed(err),
        };
        match self.host.delete_object(object).await {
            Ok(()) => DeleteOutcome::Deleted,
            Err(err) => DeleteOutcome::Failed(err),
        }
    }
}

/// Axum handler serving a `DeleteHost` registered as router state
pub async fn delete_view<H>(State(host): State<Arc<H>>, request: AjaxRequest) -> Response
where
    H: DeleteHost + 'static,
{
    AjaxDeleteView::new(host.as_ref())
        .dispatch(&request)
        .await
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubHost;
    use axum::http::StatusCode;
    use serde_json::json;

    fn delete_request(id: &str) -> AjaxRequest {
        AjaxRequest::new(Method::POST).ajax().with_kwarg("id", id)
    }

    #[tokio::test]
    async fn deletes_and_reports_success() {
        let host = StubHost::with_records(&["1", "2"]);
        let view = AjaxDeleteView::new(&host);

        let response = view.post(&delete_request("1")).await;

        assert_eq!(response.to_json(), json!({"success": 1}));
        assert_eq!(host.record_ids().await, vec!["2".to_string()]);
    }

    #[tokio::test]
    async fn lookup_failure_becomes_error_envelope() {
        let host = StubHost::with_records(&["1"]);
        let view = AjaxDeleteView::new(&host);

        let response = view.post(&delete_request("404")).await;

        assert_eq!(response.to_json(), json!({"error": "No record found matching the query"}));
        assert_eq!(host.record_ids().await, vec!["1".to_string()]);
    }

    #[tokio::test]
    async fn delete_failure_becomes_error_envelope() {
        let host = StubHost::with_records(&["1"]);
        host.protect("1").await;
        let view = AjaxDeleteView::new(&host);

        let outcome = view.delete(&delete_request("1")).await;

        assert_eq!(
            outcome,
            DeleteOutcome::Failed(ViewError::conflict("Cannot delete protected record 1"))
        );
        assert_eq!(host.record_ids().await, vec!["1".to_string()]);
    }

    #[tokio::test]
    async fn failure_still_answers_ok() {
        let host = StubHost::with_records(&[]);
        let response = AjaxDeleteView::new(&host)
            .dispatch(&delete_request("1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn only_post_is_routed() {
        let host = StubHost::with_records(&["1"]);
        let request = AjaxRequest::new(Method::GET).with_kwarg("id", "1");

        let err = AjaxDeleteView::new(&host).dispatch(&request).await.unwrap_err();

        assert_eq!(err.status_code(), 405);
        assert_eq!(host.record_ids().await, vec!["1".to_string()]);
    }
}
