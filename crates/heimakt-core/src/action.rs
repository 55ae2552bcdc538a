//! The closed action catalog.
//!
//! Actions are resolved to [`ActionId`]s at configuration time so that
//! unknown action names are caught at the boundary (feedback intake,
//! catalog construction) instead of deep inside scoring or update logic.
//! The catalog never changes at runtime; its order is the deterministic
//! tie-break order for action selection.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("action catalog must contain at least one action")]
    Empty,
    #[error("duplicate action name: {0}")]
    Duplicate(String),
    #[error("action at index {0} has an empty name")]
    Unnamed(usize),
    #[error("unknown action: {0}")]
    UnknownAction(String),
}

/// Index of an action in its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub usize);

/// One member of the action catalog.
///
/// `complex` marks high-value actions that earn a larger success reward;
/// `critical` marks basic actions whose failure is penalized harder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSpec {
    pub name: String,
    #[serde(default)]
    pub complex: bool,
    #[serde(default)]
    pub critical: bool,
}

impl ActionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            complex: false,
            critical: false,
        }
    }

    #[must_use]
    pub fn complex(mut self) -> Self {
        self.complex = true;
        self
    }

    #[must_use]
    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }
}

/// Fixed, ordered set of named operations with a name → id index.
#[derive(Debug, Clone)]
pub struct ActionCatalog {
    specs: Vec<ActionSpec>,
    index: HashMap<String, ActionId>,
}

impl ActionCatalog {
    /// Build a catalog from an ordered list of specs.
    ///
    /// Rejects empty catalogs, empty names and duplicates.
    pub fn new(specs: Vec<ActionSpec>) -> Result<Self, CatalogError> {
        if specs.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut index = HashMap::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            if spec.name.is_empty() {
                return Err(CatalogError::Unnamed(i));
            }
            if index.insert(spec.name.clone(), ActionId(i)).is_some() {
                return Err(CatalogError::Duplicate(spec.name.clone()));
            }
        }
        Ok(Self { specs, index })
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn resolve(&self, name: &str) -> Option<ActionId> {
        self.index.get(name).copied()
    }

    /// Like [`resolve`](Self::resolve) but fails with [`CatalogError::UnknownAction`].
    pub fn require(&self, name: &str) -> Result<ActionId, CatalogError> {
        self.resolve(name)
            .ok_or_else(|| CatalogError::UnknownAction(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn spec(&self, id: ActionId) -> &ActionSpec {
        &self.specs[id.0]
    }

    pub fn name(&self, id: ActionId) -> &str {
        &self.specs[id.0].name
    }

    /// Specs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (ActionId, &ActionSpec)> {
        self.specs.iter().enumerate().map(|(i, s)| (ActionId(i), s))
    }

    /// Action names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|s| s.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ActionCatalog {
        ActionCatalog::new(vec![
            ActionSpec::new("take_screenshot").complex(),
            ActionSpec::new("mute_audio").critical(),
            ActionSpec::new("open_browser"),
        ])
        .expect("valid catalog")
    }

    #[test]
    fn resolves_members_in_order() {
        let catalog = sample();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.resolve("take_screenshot"), Some(ActionId(0)));
        assert_eq!(catalog.resolve("open_browser"), Some(ActionId(2)));
        assert!(catalog.resolve("reboot").is_none());
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, vec!["take_screenshot", "mute_audio", "open_browser"]);
    }

    #[test]
    fn rejects_empty_catalog() {
        assert!(matches!(
            ActionCatalog::new(vec![]),
            Err(CatalogError::Empty)
        ));
    }

    #[test]
    fn rejects_duplicates() {
        let err = ActionCatalog::new(vec![
            ActionSpec::new("mute_audio"),
            ActionSpec::new("mute_audio"),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::Duplicate(name) if name == "mute_audio"));
    }

    #[test]
    fn rejects_unnamed_actions() {
        let err = ActionCatalog::new(vec![ActionSpec::new("")]).unwrap_err();
        assert!(matches!(err, CatalogError::Unnamed(0)));
    }

    #[test]
    fn flags_survive_serde() {
        let spec = ActionSpec::new("take_screenshot").complex();
        let json = serde_json::to_string(&spec).expect("serialize");
        let back: ActionSpec = serde_json::from_str(&json).expect("deserialize");
        assert!(back.complex);
        assert!(!back.critical);

        // `complex`/`critical` default to false when absent.
        let minimal: ActionSpec =
            serde_json::from_str(r#"{"name":"open_browser"}"#).expect("deserialize");
        assert!(!minimal.complex);
    }
}
