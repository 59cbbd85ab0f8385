use std::collections::HashMap;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{header, request::Parts, Method},
};
use http_body_util::LengthLimitError;

use crate::config::config;
use crate::error::ViewError;

/// Header set by XMLHttpRequest-based front-ends
pub const REQUESTED_WITH_HEADER: &str = "x-requested-with";
pub const XML_HTTP_REQUEST: &str = "XMLHttpRequest";

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Multi-valued urlencoded data (query string or submitted form body).
///
/// `get` returns the last value submitted for a key, so `?a=1&a=2` reads as `"2"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDict {
    pairs: Vec<(String, String)>,
}

impl QueryDict {
    pub fn parse(input: &[u8]) -> Self {
        url::form_urlencoded::parse(input).into_owned().collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_list(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<(String, String)> for QueryDict {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

/// A submitted value counts as set when it is present and non-empty.
pub fn is_truthy(value: Option<&str>) -> bool {
    matches!(value, Some(v) if !v.is_empty())
}

/// Everything a view needs from one inbound request.
///
/// Extracted by axum from the method, the `X-Requested-With` header, the query
/// string, a form-urlencoded body and the matched path parameters. Lives for a
/// single request; views never keep it around.
#[derive(Debug, Clone)]
pub struct AjaxRequest {
    method: Method,
    is_ajax: bool,
    post: QueryDict,
    query: QueryDict,
    kwargs: HashMap<String, String>,
}

impl AjaxRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            is_ajax: false,
            post: QueryDict::default(),
            query: QueryDict::default(),
            kwargs: HashMap::new(),
        }
    }

    /// Mark the request as sent by XMLHttpRequest
    pub fn ajax(mut self) -> Self {
        self.is_ajax = true;
        self
    }

    pub fn with_post(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.post.append(key, value);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.append(key, value);
        self
    }

    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn is_ajax(&self) -> bool {
        self.is_ajax
    }

    /// Submitted body data
    pub fn post_data(&self) -> &QueryDict {
        &self.post
    }

    /// Query string data
    pub fn query_data(&self) -> &QueryDict {
        &self.query
    }

    /// Routing keyword arguments (matched path parameters)
    pub fn kwargs(&self) -> &HashMap<String, String> {
        &self.kwargs
    }

    pub fn kwarg(&self, name: &str) -> Option<&str> {
        self.kwargs.get(name).map(String::as_str)
    }

    /// Body value for `key`, falling back to the query string.
    ///
    /// A key present in the body shadows the query string even when empty.
    pub fn param(&self, key: &str) -> Option<&str> {
        if self.post.contains_key(key) {
            self.post.get(key)
        } else {
            self.query.get(key)
        }
    }

    pub fn flag(&self, key: &str) -> bool {
        is_truthy(self.param(key))
    }

    fn has_form_body(parts: &Parts) -> bool {
        let accepts_body = matches!(parts.method, Method::POST | Method::PUT | Method::PATCH);
        let is_form = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with(FORM_URLENCODED))
            .unwrap_or(false);
        accepts_body && is_form
    }
}

#[async_trait]
impl<S> FromRequest<S> for AjaxRequest
where
    S: Send + Sync,
{
    type Rejection = ViewError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        let kwargs = match Path::<HashMap<String, String>>::from_request_parts(&mut parts, state).await {
            Ok(Path(params)) => params,
            Err(_) => HashMap::new(),
        };

        let is_ajax = parts
            .headers
            .get(REQUESTED_WITH_HEADER)
            .map(|v| v.as_bytes() == XML_HTTP_REQUEST.as_bytes())
            .unwrap_or(false);

        let query = parts
            .uri
            .query()
            .map(|q| QueryDict::parse(q.as_bytes()))
            .unwrap_or_default();

        let post = if Self::has_form_body(&parts) {
            let limit = config().api.max_request_size_bytes;
            let declared = parts
                .headers
                .get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<usize>().ok());
            if matches!(declared, Some(len) if len > limit) {
                tracing::warn!("Rejected form body of {:?} bytes (limit {})", declared, limit);
                return Err(ViewError::PayloadTooLarge { limit });
            }

            let bytes: Bytes = axum::body::to_bytes(body, limit).await.map_err(|e| {
                if exceeds_limit(&e) {
                    tracing::warn!("Rejected streamed form body over {} bytes", limit);
                    return ViewError::PayloadTooLarge { limit };
                }
                tracing::warn!("Failed to read form body: {}", e);
                ViewError::bad_request(format!("Unable to read request body: {}", e))
            })?;
            QueryDict::parse(&bytes)
        } else {
            QueryDict::default()
        };

        Ok(Self {
            method: parts.method,
            is_ajax,
            post,
            query,
            kwargs,
        })
    }
}

/// Bodies without a Content-Length are only caught while reading
fn exceeds_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
