//! Report-level resource declarations shared by both report formats.
//!
//! The legacy layout root and the folder-based `report.json` both declare
//! `publicCustomVisuals` and `resourcePackages`. Resource packages list files
//! that must exist in the container; missing ones are reported.

use super::custom_visual::{CUSTOM_VISUAL_PACKAGE, Registry};
use crate::common::{WarningKind, Warnings};
use crate::fragment::access::{array_at, str_at};
use crate::package::paths;
use serde_json::Value;
use std::collections::HashSet;

/// Resource package type holding registered resources (images, custom themes).
const REGISTERED_RESOURCES: i64 = 1;
/// Resource package type holding shared resources (base themes).
const SHARED_RESOURCES: i64 = 2;

/// Register the custom visuals declared at report level.
pub(crate) fn register_declared(root: &Value, registry: &mut Registry) {
    for visual in array_at(root, "publicCustomVisuals") {
        match visual {
            Value::String(id) => registry.register_public(id),
            other => {
                registry.register_fragment(other);
            },
        }
    }
    for package in array_at(root, "resourcePackages") {
        registry.register_fragment(package);
    }
}

/// Archive paths of the files listed by the resource packages, in declaration order.
pub(crate) fn resource_paths(root: &Value) -> Vec<String> {
    let mut out = Vec::new();
    for package in array_at(root, "resourcePackages") {
        let package = &package["resourcePackage"];
        let name = str_at(package, "name").unwrap_or_default();
        let kind = package.get("type").and_then(Value::as_i64);
        for item in array_at(package, "items") {
            let Some(path) = str_at(item, "path") else {
                continue;
            };
            let full = match kind {
                Some(CUSTOM_VISUAL_PACKAGE) => {
                    format!("{}{}/{}", paths::CUSTOM_VISUALS_PREFIX, name, path)
                },
                Some(REGISTERED_RESOURCES) => format!("{}{}", paths::REGISTERED_RESOURCES_PREFIX, path),
                Some(SHARED_RESOURCES) => format!("{}{}", paths::SHARED_RESOURCES_PREFIX, path),
                _ => continue,
            };
            out.push(full);
        }
    }
    out
}

/// Record an `EntryNotFound` warning for every declared resource missing from the archive.
pub(crate) fn check_resources(root: &Value, entry_names: &[String], entry: &str, warnings: &mut Warnings) {
    let present: HashSet<&str> = entry_names.iter().map(String::as_str).collect();
    for path in resource_paths(root) {
        if !present.contains(path.as_str()) {
            warnings.push(
                WarningKind::EntryNotFound,
                Some(entry),
                format!("resource '{}' is declared but not stored", path),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn root() -> Value {
        json!({
            "publicCustomVisuals": ["bullet9"],
            "resourcePackages": [
                {"resourcePackage": {"name": "gantt0123", "type": 0, "items": [
                    {"type": 5, "path": "gantt0123.pbiviz.json", "name": "gantt"}
                ]}},
                {"resourcePackage": {"name": "RegisteredResources", "type": 1, "items": [
                    {"type": 100, "path": "logo.png", "name": "logo.png"}
                ]}},
                {"resourcePackage": {"name": "SharedResources", "type": 2, "items": [
                    {"type": 202, "path": "BaseThemes/CY24SU02.json", "name": "CY24SU02"}
                ]}}
            ]
        })
    }

    #[test]
    fn test_resource_paths() {
        assert_eq!(
            resource_paths(&root()),
            [
                "Report/CustomVisuals/gantt0123/gantt0123.pbiviz.json",
                "Report/StaticResources/RegisteredResources/logo.png",
                "Report/StaticResources/SharedResources/BaseThemes/CY24SU02.json",
            ]
        );
    }

    #[test]
    fn test_check_resources() {
        let names = vec!["Report/StaticResources/RegisteredResources/logo.png".to_string()];
        let mut warnings = Warnings::new();
        check_resources(&root(), &names, "Report/Layout", &mut warnings);
        assert_eq!(warnings.count(WarningKind::EntryNotFound), 2);
    }

    #[test]
    fn test_register_declared() {
        let mut registry = Registry::new();
        register_declared(&root(), &mut registry);
        let ids: Vec<String> = registry.into_vec().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, ["bullet9", "gantt0123"]);
    }
}
