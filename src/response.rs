use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Map, Value};

use crate::error::ViewError;
use crate::forms::{field_dom_id, FieldErrors};

/// JSON envelopes answered to AJAX callers. Always sent with status 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AjaxResponse {
    /// `{"success": 1}`
    Deleted,
    /// `{"error": "<message>"}`
    DeleteFailed(String),
    /// `{"success": 1, "submit": 1, "trigger_element": ..}`; the form was saved
    Submitted { trigger_element: Option<String> },
    /// `{"success": 1, "trigger_element": ..}`
    Accepted { trigger_element: Option<String> },
    /// `{"success": 0, "trigger_element": .., "errors": {..}}`
    Invalid {
        trigger_element: Option<String>,
        errors: Map<String, Value>,
    },
}

impl AjaxResponse {
    /// Build the `Invalid` envelope, keying each field's rendered error list by
    /// the DOM id of its widget.
    pub fn invalid(trigger_element: Option<String>, prefix: Option<&str>, field_errors: &FieldErrors) -> Self {
        let errors = field_errors
            .iter()
            .map(|(name, list)| (field_dom_id(prefix, name), Value::String(list.as_ul())))
            .collect();
        AjaxResponse::Invalid {
            trigger_element,
            errors,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            AjaxResponse::Deleted => json!({ "success": 1 }),
            AjaxResponse::DeleteFailed(message) => json!({ "error": message }),
            AjaxResponse::Submitted { trigger_element } => json!({
                "success": 1,
                "submit": 1,
                "trigger_element": trigger_element
            }),
            AjaxResponse::Accepted { trigger_element } => json!({
                "success": 1,
                "trigger_element": trigger_element
            }),
            AjaxResponse::Invalid {
                trigger_element,
                errors,
            } => json!({
                "success": 0,
                "trigger_element": trigger_element,
                "errors": errors
            }),
        }
    }
}

impl IntoResponse for AjaxResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.to_json())).into_response()
    }
}

/// 302 Found pointing at `location`
pub fn found(location: &str) -> Result<Response, ViewError> {
    let value = HeaderValue::from_str(location).map_err(|_| {
        ViewError::internal(format!("Cannot redirect to invalid location {:?}", location))
    })?;
    Ok((StatusCode::FOUND, [(header::LOCATION, value)]).into_response())
}
