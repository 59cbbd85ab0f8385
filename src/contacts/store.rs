use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{Contact, ContactInput};
use crate::error::ViewError;

pub const CONTACT_NOT_FOUND: &str = "No contact found matching the query";

/// Rows keyed by id, plus the ids in the order they were created
#[derive(Debug, Default)]
struct Rows {
    by_id: HashMap<Uuid, Contact>,
    order: Vec<Uuid>,
}

/// In-memory contact storage shared by all views. Each operation takes the
/// lock once, so a single create/update/delete is atomic.
#[derive(Debug, Clone, Default)]
pub struct ContactStore {
    rows: Arc<RwLock<Rows>>,
}

impl ContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contacts in creation order
    pub async fn list(&self) -> Vec<Contact> {
        let rows = self.rows.read().await;
        rows.order
            .iter()
            .filter_map(|id| rows.by_id.get(id))
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.by_id.is_empty()
    }

    pub async fn get(&self, id: Uuid) -> Result<Contact, ViewError> {
        self.rows
            .read()
            .await
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| ViewError::not_found(CONTACT_NOT_FOUND))
    }

    pub async fn create(&self, input: ContactInput) -> Contact {
        let contact = Contact::new(input);
        let mut rows = self.rows.write().await;
        rows.order.push(contact.id);
        rows.by_id.insert(contact.id, contact.clone());
        tracing::debug!("Created contact {} ({})", contact.id, contact.email);
        contact
    }

    pub async fn update(&self, id: Uuid, input: ContactInput) -> Result<Contact, ViewError> {
        let mut rows = self.rows.write().await;
        let contact = rows
            .by_id
            .get_mut(&id)
            .ok_or_else(|| ViewError::not_found(CONTACT_NOT_FOUND))?;
        contact.apply(input);
        tracing::debug!("Updated contact {}", id);
        Ok(contact.clone())
    }

    pub async fn set_locked(&self, id: Uuid, locked: bool) -> Result<(), ViewError> {
        let mut rows = self.rows.write().await;
        let contact = rows
            .by_id
            .get_mut(&id)
            .ok_or_else(|| ViewError::not_found(CONTACT_NOT_FOUND))?;
        contact.locked = locked;
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ViewError> {
        let mut rows = self.rows.write().await;
        match rows.by_id.get(&id) {
            None => Err(ViewError::not_found(CONTACT_NOT_FOUND)),
            Some(contact) if contact.locked => Err(ViewError::conflict(format!(
                "Cannot delete contact '{}': it is locked",
                contact.name
            ))),
            Some(_) => {
                rows.by_id.remove(&id);
                rows.order.retain(|row| *row != id);
                tracing::debug!("Deleted contact {}", id);
                Ok(())
            }
        }
    }

    /// Sample rows for the development server. The first one created is
    /// locked so the error envelope can be tried out.
    pub async fn seed_demo(&self) {
        let samples = [
            ("Ada Lovelace", "ada@example.com", Some("+44 20 7946 0018")),
            ("Grace Hopper", "grace@example.com", None),
            ("Alan Turing", "alan@example.com", Some("+44 161 496 0000")),
        ];
        let mut created = Vec::with_capacity(samples.len());
        for (name, email, phone) in samples {
            let contact = self
                .create(ContactInput {
                    name: name.to_string(),
                    email: email.to_string(),
                    phone: phone.map(str::to_string),
                })
                .await;
            created.push(contact.id);
        }

        if let Some(first) = created.first() {
            if let Err(e) = self.set_locked(*first, true).await {
                tracing::warn!("Failed to lock demo contact {}: {}", first, e);
            }
        }
        tracing::info!("Seeded {} demo contacts", self.len().await);
    }
}
