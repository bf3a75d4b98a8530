//! Explicit field metadata for entity types
//!
//! Every queryable entity publishes an [`EntitySchema`]: the list of its
//! scalar fields with their declared [`FieldType`], and the relations that can
//! be traversed to reach another entity's schema. Field access at runtime goes
//! through [`Reflect::field_value`] and [`Reflect::relation`], so the filter
//! engine never needs runtime type information beyond this table.
//!
//! Schemas are normally generated with [`impl_reflect!`](crate::impl_reflect).

use crate::core::field::{FieldType, FieldValue};

/// What a named field holds
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A scalar value of the given type
    Scalar(FieldType),

    /// A reference to another entity, described by its schema
    Relation(fn() -> &'static EntitySchema),
}

/// One entry of an entity's field table
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDef {
    pub const fn scalar(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            kind: FieldKind::Scalar(field_type),
        }
    }

    pub const fn relation(name: &'static str, schema: fn() -> &'static EntitySchema) -> Self {
        Self {
            name,
            kind: FieldKind::Relation(schema),
        }
    }

    pub fn is_relation(&self) -> bool {
        matches!(self.kind, FieldKind::Relation(_))
    }
}

/// Field table of one entity type
#[derive(Debug)]
pub struct EntitySchema {
    type_name: &'static str,
    fields: Vec<FieldDef>,
}

impl EntitySchema {
    pub fn new(type_name: &'static str, fields: Vec<FieldDef>) -> Self {
        Self { type_name, fields }
    }

    /// Entity type name (e.g. "property")
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Find a field by a wire-level segment
    ///
    /// Matching ignores ASCII case and underscores, so `"CreatedAt"`,
    /// `"createdAt"` and `"created_at"` all name the same field.
    pub fn field(&self, segment: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|def| segment_matches(def.name, segment))
    }
}

pub(crate) fn segment_matches(declared: &str, requested: &str) -> bool {
    let normalize = |s: &str| {
        s.chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect::<Vec<_>>()
    };
    !requested.is_empty() && normalize(declared) == normalize(requested)
}

/// Runtime access to an entity's fields through its schema
///
/// `field_value` returns `None` for names absent from the schema and
/// [`FieldValue::Null`] for optional fields that are unset. `relation`
/// returns `None` when the related entity is not loaded.
pub trait Reflect: Send + Sync {
    /// The field table shared by every instance of this type
    fn schema() -> &'static EntitySchema
    where
        Self: Sized;

    /// Read a scalar field by its declared name
    fn field_value(&self, name: &str) -> Option<FieldValue>;

    /// Borrow a related entity by its declared relation name
    fn relation(&self, name: &str) -> Option<&dyn Reflect>;
}
