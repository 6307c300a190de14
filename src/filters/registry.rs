//! Filter registry for managing available filter types.

use crate::core::node::{Category, TransformNode};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

/// Factory function for creating filter instances.
pub type FilterFactory = Arc<dyn Fn() -> Box<dyn TransformNode> + Send + Sync>;

/// Description of a registered filter, taken from a sample instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterInfo {
    /// Stable identifier used by configuration files.
    pub id: String,
    /// Node name of a fresh instance.
    pub name: String,
    pub description: String,
    pub category: Category,
    /// Accepted input, as displayed.
    pub input: String,
    /// Produced output, as displayed.
    pub output: String,
}

/// Registry entry containing info and factory.
#[derive(Clone)]
pub struct RegistryEntry {
    /// Factory function to create instances.
    pub factory: FilterFactory,
    /// Cached info (avoids creating an instance just to describe it).
    pub info: FilterInfo,
}

/// Registry for all available filter types.
///
/// The registry maps stable filter ids to factories that create fresh nodes
/// with default parameters.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    /// Filters indexed by their unique ID.
    filters: IndexMap<String, RegistryEntry>,
}

impl FilterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with built-in filters.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::filters::builtin::register_all(&mut registry);
        registry
    }

    /// Register a filter type under `id`, replacing any previous entry.
    pub fn register<F>(&mut self, id: impl Into<String>, description: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn TransformNode> + Send + Sync + 'static,
    {
        // Create a temporary instance to describe it
        let instance = factory();
        let id = id.into();
        let info = FilterInfo {
            id: id.clone(),
            name: instance.name().to_string(),
            description: description.into(),
            category: instance.category(),
            input: instance.input_capability().to_string(),
            output: instance.output_capability().to_string(),
        };

        if self.filters.contains_key(&id) {
            log::warn!("Filter '{}' registered twice, keeping the latest", id);
        }
        self.filters.insert(
            id,
            RegistryEntry {
                factory: Arc::new(factory),
                info,
            },
        );
    }

    /// Create a new instance of a filter by ID.
    pub fn create(&self, id: &str) -> Option<Box<dyn TransformNode>> {
        self.filters.get(id).map(|entry| (entry.factory)())
    }

    /// Get info for a filter without creating an instance.
    pub fn info(&self, id: &str) -> Option<&FilterInfo> {
        self.filters.get(id).map(|entry| &entry.info)
    }

    /// Check if a filter is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.filters.contains_key(id)
    }

    /// Get all registered filter IDs.
    pub fn filter_ids(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(|s| s.as_str())
    }

    /// Get all registered filters.
    pub fn filters(&self) -> impl Iterator<Item = &FilterInfo> {
        self.filters.values().map(|entry| &entry.info)
    }

    /// Get filters by category.
    pub fn filters_by_category(&self, category: Category) -> Vec<&str> {
        self.filters
            .values()
            .filter(|entry| entry.info.category == category)
            .map(|entry| entry.info.id.as_str())
            .collect()
    }

    /// Search filters by id, name or description.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();

        self.filters
            .values()
            .filter(|entry| {
                let info = &entry.info;
                info.id.to_lowercase().contains(&query)
                    || info.name.to_lowercase().contains(&query)
                    || info.description.to_lowercase().contains(&query)
            })
            .map(|entry| entry.info.id.as_str())
            .collect()
    }

    /// Unregister a filter.
    pub fn unregister(&mut self, id: &str) -> bool {
        self.filters.shift_remove(id).is_some()
    }

    /// Get the total number of registered filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Get filters grouped by category, categories in display order and
    /// filters sorted by name.
    pub fn grouped_by_category(&self) -> IndexMap<Category, Vec<&FilterInfo>> {
        let mut grouped: IndexMap<Category, Vec<&FilterInfo>> = IndexMap::new();

        for &category in Category::all() {
            let mut infos: Vec<&FilterInfo> = self
                .filters
                .values()
                .map(|entry| &entry.info)
                .filter(|info| info.category == category)
                .collect();
            if infos.is_empty() {
                continue;
            }
            infos.sort_by(|a, b| a.name.cmp(&b.name));
            grouped.insert(category, infos);
        }

        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::node::Passthrough;
    use crate::core::types::Capability;

    fn registry() -> FilterRegistry {
        let mut registry = FilterRegistry::new();
        registry.register("passthrough_number", "Forward a number unchanged", || {
            Box::new(Passthrough::named("Number", Capability::of::<i64>()))
        });
        registry
    }

    #[test]
    fn test_register_and_create() {
        let registry = registry();

        assert!(registry.contains("passthrough_number"));
        let node = registry.create("passthrough_number").unwrap();
        assert_eq!(node.name(), "Number");
        assert!(registry.create("missing").is_none());
    }

    #[test]
    fn test_info_lookup() {
        let registry = registry();

        let info = registry.info("passthrough_number").unwrap();
        assert_eq!(info.category, Category::Input);
        assert_eq!(info.input, "i64");
        assert_eq!(info.output, "i64");
    }

    #[test]
    fn test_category_grouping() {
        let registry = registry();

        assert_eq!(registry.filters_by_category(Category::Input), ["passthrough_number"]);
        let grouped = registry.grouped_by_category();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[&Category::Input][0].name, "Number");
    }

    #[test]
    fn test_search() {
        let registry = registry();

        assert_eq!(registry.search("unchanged"), ["passthrough_number"]);
        assert!(registry.search("nonexistent").is_empty());
    }

    #[test]
    fn test_unregister() {
        let mut registry = registry();

        assert!(registry.unregister("passthrough_number"));
        assert!(!registry.contains("passthrough_number"));
        assert!(registry.is_empty());
    }
}
