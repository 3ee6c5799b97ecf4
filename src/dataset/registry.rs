//! Dataset registry for managing descriptors and auto-generating routes

use axum::Router;
use std::collections::HashMap;

/// Trait that describes how to expose a dataset over HTTP
///
/// Each dataset (products, categories, blog posts, ...) implements this
/// trait to provide its list and form-action routes.
pub trait DatasetDescriptor: Send + Sync {
    /// The dataset key (singular, e.g., "product")
    fn dataset_key(&self) -> &str;

    /// The plural form used in URLs (e.g., "products")
    fn plural(&self) -> &str;

    /// Build the routes for this dataset
    ///
    /// Should return a Router with routes like:
    /// - GET /admin/{plural}
    /// - POST /admin/{plural}
    fn build_routes(&self) -> Router;
}

/// Registry for all datasets in the application
///
/// Collects dataset descriptors and generates one merged router with
/// every dataset's routes.
#[derive(Default)]
pub struct DatasetRegistry {
    descriptors: HashMap<String, Box<dyn DatasetDescriptor>>,
}

impl DatasetRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            descriptors: HashMap::new(),
        }
    }

    /// Register a dataset descriptor
    ///
    /// The dataset key is used as the registry key; registering the same
    /// key twice replaces the earlier descriptor.
    pub fn register(&mut self, descriptor: Box<dyn DatasetDescriptor>) {
        let key = descriptor.dataset_key().to_string();
        self.descriptors.insert(key, descriptor);
    }

    /// Build a router with all registered dataset routes
    pub fn build_routes(&self) -> Router {
        let mut router = Router::new();

        for descriptor in self.descriptors.values() {
            router = router.merge(descriptor.build_routes());
        }

        router
    }

    /// Get all registered dataset keys
    pub fn dataset_keys(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockDescriptor {
        key: String,
        plural: String,
    }

    impl MockDescriptor {
        fn new(key: &str, plural: &str) -> Self {
            Self {
                key: key.to_string(),
                plural: plural.to_string(),
            }
        }
    }

    impl DatasetDescriptor for MockDescriptor {
        fn dataset_key(&self) -> &str {
            &self.key
        }

        fn plural(&self) -> &str {
            &self.plural
        }

        fn build_routes(&self) -> Router {
            Router::new()
        }
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = DatasetRegistry::new();
        assert!(registry.dataset_keys().is_empty());
    }

    #[test]
    fn test_register_multiple_datasets() {
        let mut registry = DatasetRegistry::new();
        registry.register(Box::new(MockDescriptor::new("product", "products")));
        registry.register(Box::new(MockDescriptor::new("category", "categories")));
        assert_eq!(registry.dataset_keys().len(), 2);
    }

    #[test]
    fn test_register_duplicate_replaces() {
        let mut registry = DatasetRegistry::new();
        registry.register(Box::new(MockDescriptor::new("product", "products")));
        registry.register(Box::new(MockDescriptor::new("product", "wares")));
        assert_eq!(registry.dataset_keys().len(), 1);
    }

    #[test]
    fn test_build_routes_merges_without_panic() {
        let mut registry = DatasetRegistry::new();
        registry.register(Box::new(MockDescriptor::new("product", "products")));
        registry.register(Box::new(MockDescriptor::new("category", "categories")));
        let _router = registry.build_routes();
    }
}
