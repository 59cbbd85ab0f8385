use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::response::{Html, IntoResponse, Response};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::ViewError;
use crate::forms::{prefixed_name, FieldErrors, Form};
use crate::request::AjaxRequest;
use crate::views::{DeleteHost, FormHost, ObjectLookup};

/// Record type handled by the stub host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubRecord {
    pub id: String,
}

impl StubRecord {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

#[derive(Default)]
struct Counters {
    forms_built: AtomicUsize,
    saves: AtomicUsize,
    renders: AtomicUsize,
}

/// In-memory host implementing every view capability, counting how often the
/// components call into it
pub struct StubHost {
    records: Arc<RwLock<Vec<String>>>,
    protected: RwLock<HashSet<String>>,
    counters: Arc<Counters>,
    prefix: Option<String>,
    with_lookup: bool,
}

impl StubHost {
    /// Host without object lookup (a "create" view)
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            protected: RwLock::new(HashSet::new()),
            counters: Arc::new(Counters::default()),
            prefix: Some("profile".to_string()),
            with_lookup: false,
        }
    }

    /// Host with object lookup by the `id` kwarg (an "update"/"delete" view)
    pub fn with_records(ids: &[&str]) -> Self {
        let host = Self::new();
        Self {
            records: Arc::new(RwLock::new(ids.iter().map(|id| id.to_string()).collect())),
            with_lookup: true,
            ..host
        }
    }

    pub fn without_prefix(mut self) -> Self {
        self.prefix = None;
        self
    }

    pub async fn protect(&self, id: &str) {
        self.protected.write().await.insert(id.to_string());
    }

    pub async fn record_ids(&self) -> Vec<String> {
        self.records.read().await.clone()
    }

    pub fn forms_built(&self) -> usize {
        self.counters.forms_built.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.counters.saves.load(Ordering::SeqCst)
    }

    pub fn renders(&self) -> usize {
        self.counters.renders.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectLookup for StubHost {
    type Object = StubRecord;

    async fn get_object(&self, request: &AjaxRequest) -> Result<StubRecord, ViewError> {
        let id = request
            .kwarg("id")
            .ok_or_else(|| ViewError::bad_request("Missing id"))?;
        let records = self.records.read().await;
        records
            .iter()
            .find(|r| r.as_str() == id)
            .map(|r| StubRecord::new(r))
            .ok_or_else(|| ViewError::not_found("No record found matching the query"))
    }
}

#[async_trait]
impl DeleteHost for StubHost {
    async fn delete_object(&self, object: StubRecord) -> Result<(), ViewError> {
        if self.protected.read().await.contains(&object.id) {
            return Err(ViewError::conflict(format!("Cannot delete protected record {}", object.id)));
        }
        self.records.write().await.retain(|id| *id != object.id);
        Ok(())
    }
}

/// Two required fields, `name` and `email`
pub struct StubForm {
    prefix: Option<String>,
    name: Option<String>,
    email: Option<String>,
    errors: FieldErrors,
    validated: Option<bool>,
    records: Arc<RwLock<Vec<String>>>,
    counters: Arc<Counters>,
}

#[async_trait]
impl Form for StubForm {
    type Saved = StubRecord;

    fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    fn is_valid(&mut self) -> bool {
        if let Some(valid) = self.validated {
            return valid;
        }
        self.errors.clear();
        if self.name.as_deref().unwrap_or("").is_empty() {
            self.errors.add("name", "This field is required.");
        }
        if self.email.as_deref().unwrap_or("").is_empty() {
            self.errors.add("email", "This field is required.");
        }
        let valid = self.errors.is_empty();
        self.validated = Some(valid);
        valid
    }

    fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    async fn save(&mut self) -> Result<StubRecord, ViewError> {
        let name = self.name.clone().unwrap_or_default();
        self.records.write().await.push(name.clone());
        self.counters.saves.fetch_add(1, Ordering::SeqCst);
        Ok(StubRecord::new(&name))
    }
}

#[async_trait]
impl FormHost for StubHost {
    type Object = StubRecord;
    type Form = StubForm;

    async fn get_form(&self, request: &AjaxRequest) -> Result<StubForm, ViewError> {
        self.counters.forms_built.fetch_add(1, Ordering::SeqCst);
        let prefix = self.prefix.as_deref();
        let field = |name: &str| {
            request
                .post_data()
                .get(&prefixed_name(prefix, name))
                .map(str::to_string)
        };
        Ok(StubForm {
            prefix: self.prefix.clone(),
            name: field("name"),
            email: field("email"),
            errors: FieldErrors::new(),
            validated: None,
            records: Arc::clone(&self.records),
            counters: Arc::clone(&self.counters),
        })
    }

    async fn success_url(&self, _request: &AjaxRequest, object: Option<&StubRecord>) -> Result<String, ViewError> {
        Ok(match object {
            Some(record) => format!("/records/{}/", record.id),
            None => "/records/".to_string(),
        })
    }

    async fn render_form(&self, _request: &AjaxRequest, form: &StubForm) -> Result<Response, ViewError> {
        self.counters.renders.fetch_add(1, Ordering::SeqCst);
        Ok(Html(format!("<form>{} error(s)</form>", form.errors().len())).into_response())
    }

    fn lookup(&self) -> Option<&dyn ObjectLookup<Object = StubRecord>> {
        if self.with_lookup {
            Some(self)
        } else {
            None
        }
    }
}

/// Read a JSON response body
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    serde_json::from_slice(&bytes).expect("json body")
}
