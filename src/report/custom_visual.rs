//! Custom-visual registrations.
//!
//! A report learns about custom visuals from three places: the layout's
//! `publicCustomVisuals` list (marketplace visuals), its resource packages of
//! type 0 (visuals embedded in the container), and the `package.json`
//! manifests stored under `Report/CustomVisuals/`. Registrations are merged
//! by package id, first sighting wins the position, manifests win the details.

use crate::fragment::access::{first_str, str_at};
use crate::schema::{Family, ShapeTag, classify};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Resource package type holding an embedded custom visual.
pub const CUSTOM_VISUAL_PACKAGE: i64 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomVisualRegistration {
    /// Package identifier; equals the visual type token used by instances
    pub id: String,
    pub display_name: String,
    pub version: Option<String>,
    /// Package files are stored inside the container
    pub embedded: bool,
}

/// Registrations merged by id, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    items: Vec<CustomVisualRegistration>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or enrich a registration.
    pub fn register(&mut self, registration: CustomVisualRegistration) {
        match self.index.get(&registration.id) {
            Some(&at) => {
                let existing = &mut self.items[at];
                existing.embedded |= registration.embedded;
                if registration.version.is_some() {
                    existing.version = registration.version;
                }
                if registration.display_name != registration.id {
                    existing.display_name = registration.display_name;
                }
            },
            None => {
                self.index.insert(registration.id.clone(), self.items.len());
                self.items.push(registration);
            },
        }
    }

    /// Register a marketplace visual listed by id only.
    pub fn register_public(&mut self, id: &str) {
        self.register(CustomVisualRegistration {
            id: id.to_string(),
            display_name: id.to_string(),
            version: None,
            embedded: false,
        });
    }

    /// Register the visual described by a resource-package or manifest fragment.
    ///
    /// Returns the shape the fragment matched.
    pub fn register_fragment(&mut self, value: &Value) -> ShapeTag {
        let shape = classify(value, Family::CustomVisual);
        match shape {
            ShapeTag::ResourcePackage => {
                let package = &value["resourcePackage"];
                if package.get("type").and_then(Value::as_i64) == Some(CUSTOM_VISUAL_PACKAGE) {
                    if let Some(id) = str_at(package, "name") {
                        self.register(CustomVisualRegistration {
                            id: id.to_string(),
                            display_name: id.to_string(),
                            version: None,
                            embedded: true,
                        });
                    }
                }
            },
            ShapeTag::CustomVisualManifest => {
                let visual = &value["visual"];
                if let Some(id) = str_at(visual, "guid") {
                    self.register(CustomVisualRegistration {
                        id: id.to_string(),
                        display_name: first_str(visual, &["displayName", "name"])
                            .unwrap_or(id)
                            .to_string(),
                        version: str_at(visual, "version").map(str::to_string),
                        embedded: true,
                    });
                }
            },
            ShapeTag::PublicCustomVisual => {
                if let Some(id) = str_at(value, "name") {
                    self.register_public(id);
                }
            },
            _ => {},
        }
        shape
    }

    /// Package id to display name, for type resolution.
    pub fn display_names(&self) -> HashMap<String, String> {
        self.items
            .iter()
            .map(|r| (r.id.clone(), r.display_name.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<CustomVisualRegistration> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_by_id() {
        let mut registry = Registry::new();
        registry.register_public("gantt0123");
        registry.register_fragment(&json!({"resourcePackage": {"name": "gantt0123", "type": 0}}));
        registry.register_fragment(&json!({"visual": {
            "guid": "gantt0123", "displayName": "Gantt", "version": "2.1.0"
        }}));
        registry.register_public("bullet9");

        let items = registry.into_vec();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].display_name, "Gantt");
        assert_eq!(items[0].version.as_deref(), Some("2.1.0"));
        assert!(items[0].embedded);
        assert!(!items[1].embedded);
    }

    #[test]
    fn test_other_resource_packages_ignored() {
        let mut registry = Registry::new();
        let shape = registry.register_fragment(&json!({
            "resourcePackage": {"name": "RegisteredResources", "type": 1}
        }));
        assert_eq!(shape, ShapeTag::ResourcePackage);
        assert!(registry.is_empty());
        assert_eq!(registry.register_fragment(&json!([])), ShapeTag::Unrecognized);
    }
}
