use async_trait::async_trait;

use super::model::{Contact, ContactInput};
use super::store::ContactStore;
use crate::error::ViewError;
use crate::forms::{prefixed_name, FieldErrors, Form};
use crate::request::QueryDict;

pub const CONTACT_PREFIX: &str = "contact";
pub const NAME_MAX_LENGTH: usize = 100;

const REQUIRED: &str = "This field is required.";
const INVALID_EMAIL: &str = "Enter a valid email address.";
const INVALID_PHONE: &str = "Enter a valid phone number.";

/// (field name, label) in rendering and validation order
pub const CONTACT_FIELDS: &[(&str, &str)] = &[("name", "Name"), ("email", "Email"), ("phone", "Phone")];

/// Create/edit form for a contact, submitted under the `contact-` prefix
pub struct ContactForm {
    store: ContactStore,
    instance: Option<Contact>,
    data: Option<QueryDict>,
    errors: FieldErrors,
    cleaned: Option<ContactInput>,
    validated: Option<bool>,
}

impl ContactForm {
    /// Form showing `instance` (or blank), not bound to any submission
    pub fn unbound(store: ContactStore, instance: Option<Contact>) -> Self {
        Self {
            store,
            instance,
            data: None,
            errors: FieldErrors::new(),
            cleaned: None,
            validated: None,
        }
    }

    pub fn bound(store: ContactStore, instance: Option<Contact>, data: QueryDict) -> Self {
        Self {
            data: Some(data),
            ..Self::unbound(store, instance)
        }
    }

    pub fn is_bound(&self) -> bool {
        self.data.is_some()
    }

    pub fn instance(&self) -> Option<&Contact> {
        self.instance.as_ref()
    }

    /// Current value of a field for display: submitted data when bound,
    /// otherwise the edited instance
    pub fn value(&self, field: &str) -> String {
        if let Some(data) = &self.data {
            return data
                .get(&prefixed_name(Some(CONTACT_PREFIX), field))
                .unwrap_or("")
                .to_string();
        }
        match (&self.instance, field) {
            (Some(c), "name") => c.name.clone(),
            (Some(c), "email") => c.email.clone(),
            (Some(c), "phone") => c.phone.clone().unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn clean(&mut self) -> Option<ContactInput> {
        let name = self.value("name").trim().to_string();
        let email = self.value("email").trim().to_string();
        let phone = self.value("phone").trim().to_string();

        if name.is_empty() {
            self.errors.add("name", REQUIRED);
        } else {
            let length = name.chars().count();
            if length > NAME_MAX_LENGTH {
                self.errors.add(
                    "name",
                    format!(
                        "Ensure this value has at most {} characters (it has {}).",
                        NAME_MAX_LENGTH, length
                    ),
                );
            }
        }

        if email.is_empty() {
            self.errors.add("email", REQUIRED);
        } else if !is_valid_email(&email) {
            self.errors.add("email", INVALID_EMAIL);
        }

        if !phone.is_empty() && !is_valid_phone(&phone) {
            self.errors.add("phone", INVALID_PHONE);
        }

        if !self.errors.is_empty() {
            return None;
        }
        Some(ContactInput {
            name,
            email: email.to_lowercase(),
            phone: (!phone.is_empty()).then_some(phone),
        })
    }
}

#[async_trait]
impl Form for ContactForm {
    type Saved = Contact;

    fn prefix(&self) -> Option<&str> {
        Some(CONTACT_PREFIX)
    }

    fn is_valid(&mut self) -> bool {
        if let Some(valid) = self.validated {
            return valid;
        }
        // Unbound forms are never valid and carry no errors
        if !self.is_bound() {
            return false;
        }
        self.errors.clear();
        self.cleaned = self.clean();
        let valid = self.cleaned.is_some();
        self.validated = Some(valid);
        valid
    }

    fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    async fn save(&mut self) -> Result<Contact, ViewError> {
        let input = self.cleaned.clone().ok_or_else(|| {
            ViewError::internal("The contact could not be saved because the data didn't validate.")
        })?;

        let contact = match &self.instance {
            Some(existing) => self.store.update(existing.id, input).await?,
            None => self.store.create(input).await,
        };
        self.instance = Some(contact.clone());
        Ok(contact)
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}

fn is_valid_phone(phone: &str) -> bool {
    phone.chars().any(|c| c.is_ascii_digit())
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || c == ' ' || c == '+' || c == '-')
}
