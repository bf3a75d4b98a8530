//! Property listing entity

use super::owner::Owner;
use crate::core::Repository;
use crate::storage::RepositoryRelation;
use crate::{impl_entity, impl_reflect};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A listed property
///
/// `owner` is the eager-loaded relation behind `owner_id`; it is `None` when
/// the owner was not included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub price: f64,
    pub bedrooms: i64,
    pub is_available: bool,
    pub listed_at: DateTime<Utc>,
    pub owner_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Property {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        city: impl Into<String>,
        price: f64,
        bedrooms: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            address: address.into(),
            city: city.into(),
            price,
            bedrooms,
            is_available: true,
            listed_at: now,
            owner_id: None,
            owner: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn with_owner(mut self, owner: Owner) -> Self {
        self.owner_id = Some(owner.id);
        self.owner = Some(owner);
        self
    }

    pub fn listed_at(mut self, listed_at: DateTime<Utc>) -> Self {
        self.listed_at = listed_at;
        self
    }

    /// Loader filling `owner` from `owner_id` through the owners repository
    pub fn owner_relation(
        owners: impl Repository<Owner> + 'static,
    ) -> RepositoryRelation<Property, Owner> {
        RepositoryRelation::<Property, Owner>::new(
            "owner",
            owners,
            |property| property.owner_id,
            |property, owner| property.owner = owner,
        )
    }
}

impl_reflect!(Property, "property",
    fields {
        id: Uuid,
        name: String,
        address: String,
        city: String,
        price: f64,
        bedrooms: i64,
        is_available: bool,
        listed_at: DateTime<Utc>,
        owner_id: Option<Uuid>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    },
    relations {
        owner: Owner,
    }
);

impl_entity!(Property, "property", "properties");

/// Create/update body for a property
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyPayload {
    pub name: String,
    pub address: String,
    pub city: String,
    pub price: f64,
    pub bedrooms: i64,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
}

fn default_available() -> bool {
    true
}

impl crate::core::entity::EntityPayload for Property {
    type Payload = PropertyPayload;

    fn create_from(payload: PropertyPayload) -> Self {
        let mut property = Property::new(
            payload.name,
            payload.address,
            payload.city,
            payload.price,
            payload.bedrooms,
        );
        property.is_available = payload.is_available;
        property.owner_id = payload.owner_id;
        property
    }

    fn update_from(&mut self, payload: PropertyPayload) {
        self.name = payload.name;
        self.address = payload.address;
        self.city = payload.city;
        self.price = payload.price;
        self.bedrooms = payload.bedrooms;
        self.is_available = payload.is_available;
        if self.owner_id != payload.owner_id {
            self.owner = None;
        }
        self.owner_id = payload.owner_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::EntityPayload;
    use crate::core::field::FieldValue;
    use crate::core::reflect::Reflect;

    #[test]
    fn test_schema_has_owner_relation() {
        let schema = Property::schema();
        assert_eq!(schema.type_name(), "property");
        let owner = schema.field("owner").unwrap();
        assert!(owner.is_relation());
    }

    #[test]
    fn test_relation_access() {
        let owner = Owner::new("Ada", "ada@example.com");
        let property = Property::new("Parkview", "1 Elm St", "Springfield", 1.0, 1)
            .with_owner(owner.clone());

        let related = property.relation("owner").unwrap();
        assert_eq!(
            related.field_value("email"),
            Some(FieldValue::String("ada@example.com".into()))
        );
        assert_eq!(
            property.field_value("owner_id"),
            Some(FieldValue::Uuid(owner.id))
        );
    }

    #[test]
    fn test_serde_skips_missing_owner() {
        let property = Property::new("Parkview", "1 Elm St", "Springfield", 1.0, 1);
        let json = serde_json::to_value(&property).unwrap();
        assert!(json.get("owner").is_none());
        let back: Property = serde_json::from_value(json).unwrap();
        assert_eq!(back, property);
    }

    #[test]
    fn test_update_from_payload_drops_stale_owner() {
        let mut property = Property::new("Parkview", "1 Elm St", "Springfield", 1.0, 1)
            .with_owner(Owner::new("Ada", "ada@example.com"));
        property.update_from(PropertyPayload {
            name: "Parkview".into(),
            address: "1 Elm St".into(),
            city: "Springfield".into(),
            price: 2.0,
            bedrooms: 1,
            is_available: false,
            owner_id: None,
        });
        assert!(property.owner.is_none());
        assert_eq!(property.price, 2.0);
        assert!(!property.is_available);
    }
}
