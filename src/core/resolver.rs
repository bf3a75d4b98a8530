//! Dotted field path resolution
//!
//! [`FieldPathResolver`] turns a wire path such as `"Owner.Name"` into a
//! [`FieldAccessor`] by walking the entity schemas one segment at a time.

use crate::core::error::QueryError;
use crate::core::field::{FieldType, FieldValue};
use crate::core::reflect::{EntitySchema, FieldKind, Reflect};
use std::fmt;

/// Typed accessor for a (possibly nested) scalar field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAccessor {
    path: Vec<&'static str>,
    field_type: FieldType,
}

impl FieldAccessor {
    /// Declared type of the leaf field
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Canonical dotted path using declared names (e.g. `owner.name`)
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    pub fn segments(&self) -> &[&'static str] {
        &self.path
    }

    /// Relation names traversed before the leaf field
    pub fn relations(&self) -> &[&'static str] {
        match self.path.split_last() {
            Some((_, relations)) => relations,
            None => &[],
        }
    }

    /// Read the field from an entity
    ///
    /// Returns `None` when a relation on the way is not loaded or when the
    /// field itself is null.
    pub fn read(&self, entity: &dyn Reflect) -> Option<FieldValue> {
        let (leaf, relations) = self.path.split_last()?;

        let mut current = entity;
        for relation in relations {
            current = current.relation(relation)?;
        }

        current.field_value(leaf).filter(|value| !value.is_null())
    }
}

impl fmt::Display for FieldAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Resolves dotted paths against entity schemas
pub struct FieldPathResolver;

impl FieldPathResolver {
    /// Resolve `path` against the schema of `T`
    pub fn resolve<T: Reflect>(path: &str) -> Result<FieldAccessor, QueryError> {
        Self::resolve_in(T::schema(), path)
    }

    /// Resolve `path` starting from an explicit schema
    ///
    /// Every segment but the last must name a relation; the last must name a
    /// scalar. The error names the type and the first segment that failed.
    pub fn resolve_in(
        root: &'static EntitySchema,
        path: &str,
    ) -> Result<FieldAccessor, QueryError> {
        let mut schema = root;
        let mut resolved = Vec::new();
        let mut segments = path.split('.').peekable();

        while let Some(segment) = segments.next() {
            let is_leaf = segments.peek().is_none();
            let def = schema
                .field(segment)
                .ok_or_else(|| QueryError::unknown_field(schema.type_name(), segment))?;
            resolved.push(def.name);

            match (def.kind, is_leaf) {
                (FieldKind::Scalar(field_type), true) => {
                    return Ok(FieldAccessor {
                        path: resolved,
                        field_type,
                    });
                }
                (FieldKind::Relation(next), false) => schema = next(),
                _ => return Err(QueryError::unknown_field(schema.type_name(), segment)),
            }
        }

        Err(QueryError::unknown_field(root.type_name(), path))
    }
}
