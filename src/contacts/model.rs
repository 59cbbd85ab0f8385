use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Locked contacts refuse deletion
    pub locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    pub fn new(input: ContactInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            locked: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, input: ContactInput) {
        self.name = input.name;
        self.email = input.email;
        self.phone = input.phone;
        self.updated_at = Utc::now();
    }

    pub fn absolute_url(&self) -> String {
        format!("/contacts/{}/", self.id)
    }
}

/// Cleaned form data for creating or updating a contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}
