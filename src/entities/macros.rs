//! Macros for reducing boilerplate when defining entities
//!
//! These macros generate the field metadata table and the trait
//! implementations that every queryable entity needs.

/// Implement [`Reflect`](crate::core::reflect::Reflect) for a struct
///
/// Scalar fields are listed with their Rust type, which must implement
/// [`ScalarField`](crate::core::field::ScalarField). Relations are
/// `Option<Related>` fields where `Related` itself implements `Reflect`.
///
/// # Example
///
/// ```rust,ignore
/// impl_reflect!(Property, "property",
///     fields {
///         id: Uuid,
///         name: String,
///         price: f64,
///     },
///     relations {
///         owner: Owner,
///     }
/// );
/// ```
#[macro_export]
macro_rules! impl_reflect {
    (
        $type:ty,
        $type_name:expr,
        fields { $( $field:ident : $field_ty:ty ),* $(,)? }
        $( , relations { $( $rel:ident : $rel_ty:ty ),* $(,)? } )?
    ) => {
        impl $crate::core::reflect::Reflect for $type {
            fn schema() -> &'static $crate::core::reflect::EntitySchema {
                static SCHEMA: ::std::sync::OnceLock<$crate::core::reflect::EntitySchema> =
                    ::std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    $crate::core::reflect::EntitySchema::new(
                        $type_name,
                        vec![
                            $(
                                $crate::core::reflect::FieldDef::scalar(
                                    stringify!($field),
                                    <$field_ty as $crate::core::field::ScalarField>::FIELD_TYPE,
                                ),
                            )*
                            $($(
                                $crate::core::reflect::FieldDef::relation(
                                    stringify!($rel),
                                    <$rel_ty as $crate::core::reflect::Reflect>::schema,
                                ),
                            )*)?
                        ],
                    )
                })
            }

            fn field_value(&self, name: &str) -> Option<$crate::core::field::FieldValue> {
                $(
                    if name == stringify!($field) {
                        return Some($crate::core::field::ScalarField::to_field_value(&self.$field));
                    }
                )*
                None
            }

            fn relation(&self, name: &str) -> Option<&dyn $crate::core::reflect::Reflect> {
                $($(
                    if name == stringify!($rel) {
                        return self
                            .$rel
                            .as_ref()
                            .map(|related| related as &dyn $crate::core::reflect::Reflect);
                    }
                )*)?
                let _ = name;
                None
            }
        }
    };
}

/// Implement [`Entity`](crate::core::entity::Entity) for a struct carrying
/// the standard `id`, `created_at`, `updated_at` and `deleted_at` fields
#[macro_export]
macro_rules! impl_entity {
    ($type:ty, $type_name:expr, $plural:expr) => {
        impl $crate::core::entity::Entity for $type {
            fn type_name() -> &'static str {
                $type_name
            }

            fn resource_name() -> &'static str {
                $plural
            }

            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn created_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.created_at
            }

            fn updated_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.updated_at
            }

            fn deleted_at(&self) -> Option<::chrono::DateTime<::chrono::Utc>> {
                self.deleted_at
            }

            fn soft_delete(&mut self) {
                let now = ::chrono::Utc::now();
                self.deleted_at = Some(now);
                self.updated_at = now;
            }

            fn touch(&mut self) {
                self.updated_at = ::chrono::Utc::now();
            }
        }
    };
}
