//! Macros for reducing boilerplate when defining catalog records
//!
//! Every catalog record carries the same base fields (id, created_at,
//! updated_at) and the same `Entity` accessors; the macro generates
//! those. Field access and mutation (`field_value` / `set_field`) stay
//! hand-written per record since that is where the domain lives.

/// Implement the `Entity` trait plus a `touch()` helper for a record
/// struct with `id`, `created_at`, and `updated_at` fields
///
/// # Example
/// ```rust,ignore
/// impl_entity_base!(Product, "product", "products");
/// ```
#[macro_export]
macro_rules! impl_entity_base {
    ($type:ident, $singular:expr, $plural:expr) => {
        impl $crate::core::entity::Entity for $type {
            fn resource_name() -> &'static str {
                $plural
            }

            fn resource_name_singular() -> &'static str {
                $singular
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
        }

        impl $type {
            /// Update the updated_at timestamp to now
            pub fn touch(&mut self) {
                self.updated_at = ::chrono::Utc::now();
            }
        }
    };
}
