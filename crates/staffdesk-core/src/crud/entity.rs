use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Where a resource lives and how it is named in messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    /// Collection path with trailing slash, e.g. `/companies/`
    pub endpoint: &'static str,
    /// Unpaged collection path, when the backend offers one
    pub all_endpoint: Option<&'static str>,
    pub entity_name: &'static str,
    pub entity_name_plural: &'static str,
    /// Field arrays consulted for a mutation error message, in priority order
    pub error_fields: &'static [&'static str],
}

impl Resource {
    /// `<endpoint><id>/`
    pub fn item_path(&self, id: i64) -> String {
        format!("{}{id}/", self.endpoint)
    }

    /// Entity name with its first letter uppercased.
    pub fn display_name(&self) -> String {
        let mut chars = self.entity_name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// A server-backed record the sync engine can manage.
pub trait Entity: Debug + DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Writable subset sent on create and update.
    type Draft: Debug + Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static;

    fn id(&self) -> i64;

    fn to_draft(&self) -> Self::Draft;

    fn resource() -> Resource;
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESOURCE: Resource = Resource {
        endpoint: "/departments/",
        all_endpoint: None,
        entity_name: "department",
        entity_name_plural: "departments",
        error_fields: &[],
    };

    #[test]
    fn test_item_path() {
        assert_eq!(RESOURCE.item_path(12), "/departments/12/");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(RESOURCE.display_name(), "Department");
    }
}
