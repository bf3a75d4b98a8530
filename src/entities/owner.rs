//! Owner entity

use crate::{impl_entity, impl_reflect};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person or company owning listed properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Owner {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            phone: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

impl_reflect!(Owner, "owner",
    fields {
        id: Uuid,
        name: String,
        email: String,
        phone: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    }
);

impl_entity!(Owner, "owner", "owners");

/// Create/update body for an owner
#[derive(Debug, Clone, Deserialize)]
pub struct OwnerPayload {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl crate::core::entity::EntityPayload for Owner {
    type Payload = OwnerPayload;

    fn create_from(payload: OwnerPayload) -> Self {
        let mut owner = Owner::new(payload.name, payload.email);
        owner.phone = payload.phone;
        owner
    }

    fn update_from(&mut self, payload: OwnerPayload) {
        self.name = payload.name;
        self.email = payload.email;
        self.phone = payload.phone;
    }
}
