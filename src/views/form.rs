use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::Method,
    response::{IntoResponse, Response},
};

use super::ObjectLookup;
use crate::error::ViewError;
use crate::forms::Form;
use crate::request::{is_truthy, AjaxRequest};
use crate::response::{found, AjaxResponse};

/// Truthy value bypasses the form and redirects to the success URL
pub const SKIP_FORM: &str = "skip_form";
/// Widget that triggered an AJAX validation round
pub const TRIGGER_ELEMENT: &str = "trigger_element";
/// Forces the host's redirect after a successful save, even for AJAX calls
pub const FORM_VALID_REDIRECT: &str = "form_valid_redirect";

/// Trigger values that mean "the whole form was submitted"
pub const NO_TRIGGER: &str = "nothing";
pub const UNDEFINED_TRIGGER: &str = "undefined";

const ALLOWED_METHODS: &[&str] = &["GET", "HEAD", "POST", "PUT"];

/// Capabilities a form-handling view provides to `AjaxFormView`.
///
/// The provided methods are the host's native behavior (render, redirect);
/// the component falls back to them whenever it does not answer JSON.
#[async_trait]
pub trait FormHost: Send + Sync {
    type Object: Send + Sync;
    type Form: Form<Saved = Self::Object>;

    /// Build the form, bound to submitted data on POST/PUT
    async fn get_form(&self, request: &AjaxRequest) -> Result<Self::Form, ViewError>;

    async fn success_url(
        &self,
        request: &AjaxRequest,
        object: Option<&Self::Object>,
    ) -> Result<String, ViewError>;

    /// Render the form page (with errors when the form was validated)
    async fn render_form(&self, request: &AjaxRequest, form: &Self::Form) -> Result<Response, ViewError>;

    /// Object lookup, for views that edit an existing record
    fn lookup(&self) -> Option<&dyn ObjectLookup<Object = Self::Object>> {
        None
    }

    async fn get(&self, request: &AjaxRequest) -> Result<Response, ViewError> {
        let form = self.get_form(request).await?;
        self.render_form(request, &form).await
    }

    async fn form_invalid_default(&self, request: &AjaxRequest, form: &Self::Form) -> Result<Response, ViewError> {
        self.render_form(request, form).await
    }

    async fn form_valid_default(&self, request: &AjaxRequest, object: &Self::Object) -> Result<Response, ViewError> {
        let url = self.success_url(request, Some(object)).await?;
        found(&url)
    }
}

/// Wraps a `FormHost` for one request and answers AJAX calls with JSON
pub struct AjaxFormView<'a, H> {
    host: &'a H,
}

impl<'a, H: FormHost> AjaxFormView<'a, H> {
    pub fn new(host: &'a H) -> Self {
        Self { host }
    }

    pub async fn dispatch(&self, request: &AjaxRequest) -> Result<Response, ViewError> {
        if request.flag(SKIP_FORM) {
            return self.skip_form(request).await;
        }

        let method = request.method();
        if *method == Method::GET || *method == Method::HEAD {
            self.host.get(request).await
        } else if *method == Method::POST || *method == Method::PUT {
            self.post(request).await
        } else {
            Err(ViewError::method_not_allowed(method, ALLOWED_METHODS))
        }
    }

    async fn skip_form(&self, request: &AjaxRequest) -> Result<Response, ViewError> {
        let object = match self.host.lookup() {
            Some(lookup) => Some(lookup.get_object(request).await?),
            None => None,
        };
        let url = self.host.success_url(request, object.as_ref()).await?;
        tracing::debug!("skip_form set, redirecting to {}", url);
        found(&url)
    }

    pub async fn post(&self, request: &AjaxRequest) -> Result<Response, ViewError> {
        let mut form = self.host.get_form(request).await?;
        if !form.is_valid() {
            return self.form_invalid(request, &form).await;
        }

        if !request.is_ajax() {
            return self.form_valid(request, &mut form, None).await;
        }

        let trigger_element = trigger_element(request);
        if submits_form(trigger_element.as_deref()) {
            // The JSON envelope replaces whatever the success hook answered.
            self.form_valid(request, &mut form, None).await?;
            Ok(AjaxResponse::Submitted { trigger_element }.into_response())
        } else {
            tracing::debug!("Validated for trigger {:?}, not saving", trigger_element);
            Ok(AjaxResponse::Accepted { trigger_element }.into_response())
        }
    }

    pub async fn form_invalid(&self, request: &AjaxRequest, form: &H::Form) -> Result<Response, ViewError> {
        if request.is_ajax() {
            let response = AjaxResponse::invalid(trigger_element(request), form.prefix(), form.errors());
            return Ok(response.into_response());
        }
        self.host.form_invalid_default(request, form).await
    }

    /// Save the form, then answer JSON to AJAX callers unless a redirect was
    /// asked for. `Some(_)` overrides any `form_valid_redirect` in the request.
    pub async fn form_valid(
        &self,
        request: &AjaxRequest,
        form: &mut H::Form,
        form_valid_redirect: Option<bool>,
    ) -> Result<Response, ViewError> {
        let object = form.save().await?;
        let redirect = resolve_redirect(request, form_valid_redirect);
        tracing::debug!("Form saved (ajax: {}, redirect: {})", request.is_ajax(), redirect);

        if request.is_ajax() && !redirect {
            return Ok(AjaxResponse::Accepted {
                trigger_element: trigger_element(request),
            }
            .into_response());
        }
        self.host.form_valid_default(request, &object).await
    }
}

fn trigger_element(request: &AjaxRequest) -> Option<String> {
    request.param(TRIGGER_ELEMENT).map(str::to_string)
}

/// Only an absent, empty, `nothing` or `undefined` trigger commits the save
fn submits_form(trigger_element: Option<&str>) -> bool {
    let trigger = trigger_element.filter(|t| !t.is_empty()).unwrap_or(NO_TRIGGER);
    trigger == NO_TRIGGER || trigger == UNDEFINED_TRIGGER
}

fn resolve_redirect(request: &AjaxRequest, explicit: Option<bool>) -> bool {
    match explicit {
        Some(redirect) => redirect,
        None => is_truthy(request.param(FORM_VALID_REDIRECT)),
    }
}

/// Axum handler serving a `FormHost` registered as router state
pub async fn form_view<H>(State(host): State<Arc<H>>, request: AjaxRequest) -> Response
where
    H: FormHost + 'static,
{
    AjaxFormView::new(host.as_ref())
        .dispatch(&request)
        .await
        .into_response()
}
