use async_trait::async_trait;
use axum::{
    http::Method,
    response::{Html, IntoResponse, Response},
};
use uuid::Uuid;

use super::form::{ContactForm, CONTACT_FIELDS, CONTACT_PREFIX};
use super::model::Contact;
use super::store::{ContactStore, CONTACT_NOT_FOUND};
use crate::error::ViewError;
use crate::forms::{escape_html, field_dom_id, prefixed_name, Form};
use crate::request::AjaxRequest;
use crate::views::{DeleteHost, FormHost, ObjectLookup};

pub const CONTACT_LIST_URL: &str = "/contacts/";

/// Resolve the contact named by the `id` routing argument
async fn lookup_contact(store: &ContactStore, request: &AjaxRequest) -> Result<Contact, ViewError> {
    let raw = request
        .kwarg("id")
        .ok_or_else(|| ViewError::internal("Contact view must be called with an `id` routing argument"))?;
    let id = Uuid::parse_str(raw).map_err(|_| ViewError::not_found(CONTACT_NOT_FOUND))?;
    store.get(id).await
}

fn form_from_request(store: &ContactStore, request: &AjaxRequest, instance: Option<Contact>) -> ContactForm {
    let method = request.method();
    if *method == Method::POST || *method == Method::PUT {
        ContactForm::bound(store.clone(), instance, request.post_data().clone())
    } else {
        ContactForm::unbound(store.clone(), instance)
    }
}

fn success_url_for(object: Option<&Contact>) -> String {
    object
        .map(Contact::absolute_url)
        .unwrap_or_else(|| CONTACT_LIST_URL.to_string())
}

/// Minimal HTML page for the contact form
fn render_contact_page(title: &str, action: &str, form: &ContactForm) -> Response {
    let mut fields = String::new();
    for (name, label) in CONTACT_FIELDS {
        let id = field_dom_id(Some(CONTACT_PREFIX), name);
        let errors = form.errors().get(name).map(|e| e.as_ul()).unwrap_or_default();
        fields.push_str(&format!(
            "<p><label for=\"{id}\">{label}</label> \
             <input type=\"text\" name=\"{input}\" id=\"{id}\" value=\"{value}\">{errors}</p>\n",
            id = id,
            label = label,
            input = prefixed_name(Some(CONTACT_PREFIX), name),
            value = escape_html(&form.value(name)),
            errors = errors,
        ));
    }

    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{title}</title></head>\n<body>\n<h1>{title}</h1>\n\
         <form method=\"post\" action=\"{action}\" data-ajax-form>\n{fields}\
         <input type=\"hidden\" name=\"trigger_element\" value=\"nothing\">\n\
         <button type=\"submit\">Save</button>\n</form>\n</body>\n</html>\n",
        title = escape_html(title),
        action = escape_html(action),
        fields = fields,
    ))
    .into_response()
}

/// `/contacts/new/`
#[derive(Debug, Clone)]
pub struct ContactCreateView {
    store: ContactStore,
}

impl ContactCreateView {
    pub fn new(store: ContactStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl FormHost for ContactCreateView {
    type Object = Contact;
    type Form = ContactForm;

    async fn get_form(&self, request: &AjaxRequest) -> Result<ContactForm, ViewError> {
        Ok(form_from_request(&self.store, request, None))
    }

    async fn success_url(&self, _request: &AjaxRequest, object: Option<&Contact>) -> Result<String, ViewError> {
        Ok(success_url_for(object))
    }

    async fn render_form(&self, _request: &AjaxRequest, form: &ContactForm) -> Result<Response, ViewError> {
        Ok(render_contact_page("New contact", "/contacts/new/", form))
    }
}

/// `/contacts/:id/edit/`
#[derive(Debug, Clone)]
pub struct ContactUpdateView {
    store: ContactStore,
}

impl ContactUpdateView {
    pub fn new(store: ContactStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ObjectLookup for ContactUpdateView {
    type Object = Contact;

    async fn get_object(&self, request: &AjaxRequest) -> Result<Contact, ViewError> {
        lookup_contact(&self.store, request).await
    }
}

#[async_trait]
impl FormHost for ContactUpdateView {
    type Object = Contact;
    type Form = ContactForm;

    async fn get_form(&self, request: &AjaxRequest) -> Result<ContactForm, ViewError> {
        let contact = lookup_contact(&self.store, request).await?;
        Ok(form_from_request(&self.store, request, Some(contact)))
    }

    async fn success_url(&self, _request: &AjaxRequest, object: Option<&Contact>) -> Result<String, ViewError> {
        Ok(success_url_for(object))
    }

    async fn render_form(&self, _request: &AjaxRequest, form: &ContactForm) -> Result<Response, ViewError> {
        let (title, action) = match form.instance() {
            Some(contact) => (format!("Edit {}", contact.name), format!("/contacts/{}/edit/", contact.id)),
            None => ("Edit contact".to_string(), CONTACT_LIST_URL.to_string()),
        };
        Ok(render_contact_page(&title, &action, form))
    }

    fn lookup(&self) -> Option<&dyn ObjectLookup<Object = Contact>> {
        Some(self)
    }
}

/// `/contacts/:id/delete/`
#[derive(Debug, Clone)]
pub struct ContactDeleteView {
    store: ContactStore,
}

impl ContactDeleteView {
    pub fn new(store: ContactStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ObjectLookup for ContactDeleteView {
    type Object = Contact;

    async fn get_object(&self, request: &AjaxRequest) -> Result<Contact, ViewError> {
        lookup_contact(&self.store, request).await
    }
}

#[async_trait]
impl DeleteHost for ContactDeleteView {
    async fn delete_object(&self, object: Contact) -> Result<(), ViewError> {
        self.store.delete(object.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::model::ContactInput;
    use crate::testing::body_json;
    use crate::views::{AjaxDeleteView, AjaxFormView};
    use axum::http::{header, StatusCode};
    use serde_json::json;

    async fn seeded() -> (ContactStore, Contact) {
        let store = ContactStore::new();
        let contact = store
            .create(ContactInput {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                phone: None,
            })
            .await;
        (store, contact)
    }

    #[tokio::test]
    async fn update_view_skip_form_redirects_to_contact() {
        let (store, contact) = seeded().await;
        let view = ContactUpdateView::new(store);
        let request = AjaxRequest::new(Method::POST)
            .with_kwarg("id", contact.id.to_string())
            .with_post("skip_form", "1");

        let response = AjaxFormView::new(&view).dispatch(&request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
            contact.absolute_url()
        );
    }

    #[tokio::test]
    async fn update_view_saves_ajax_submission() {
        let (store, contact) = seeded().await;
        let view = ContactUpdateView::new(store.clone());
        let request = AjaxRequest::new(Method::POST)
            .ajax()
            .with_kwarg("id", contact.id.to_string())
            .with_post("contact-name", "Ada King")
            .with_post("contact-email", "ada@example.com");

        let body = body_json(AjaxFormView::new(&view).dispatch(&request).await.unwrap()).await;

        assert_eq!(body, json!({"success": 1, "submit": 1, "trigger_element": null}));
        assert_eq!(store.get(contact.id).await.unwrap().name, "Ada King");
    }

    #[tokio::test]
    async fn create_view_renders_errors_for_browsers() {
        let view = ContactCreateView::new(ContactStore::new());
        let request = AjaxRequest::new(Method::POST).with_post("contact-name", "<Ada>");

        let response = AjaxFormView::new(&view).dispatch(&request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("value=\"&lt;Ada&gt;\""));
        assert!(html.contains("<ul class=\"errorlist\"><li>This field is required.</li></ul>"));
    }

    #[tokio::test]
    async fn delete_view_reports_bad_ids_as_errors() {
        let (store, _) = seeded().await;
        let view = ContactDeleteView::new(store.clone());
        let request = AjaxRequest::new(Method::POST).with_kwarg("id", "not-a-uuid");

        let response = AjaxDeleteView::new(&view).post(&request).await;

        assert_eq!(response.to_json(), json!({"error": CONTACT_NOT_FOUND}));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn delete_view_refuses_locked_contacts() {
        let (store, contact) = seeded().await;
        store.set_locked(contact.id, true).await.unwrap();
        let view = ContactDeleteView::new(store.clone());
        let request = AjaxRequest::new(Method::POST).with_kwarg("id", contact.id.to_string());

        let response = AjaxDeleteView::new(&view).post(&request).await;

        assert_eq!(
            response.to_json(),
            json!({"error": "Cannot delete contact 'Ada': it is locked"})
        );
        assert_eq!(store.len().await, 1);
    }
}
