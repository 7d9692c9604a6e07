//! Generator settings. Every field has a default, so an empty JSON object is a
//! complete configuration.

use std::path::Path;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::namespace::NamespaceRule;
use crate::path_de::{from_str_with_path, SnapshotError};

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap()
});

// `Ns.Type` or `Ns.Outer+Inner`
static METADATA_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*(\+[A-Za-z_][A-Za-z0-9_]*)*$").unwrap()
});

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("`{field}` must be an identifier, got {value:?}")]
    NotAnIdentifier { field: &'static str, value: String },
    #[error("`root_type` must be a fully qualified type name, got {0:?}")]
    BadRootType(String),
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] SnapshotError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Metadata name of the type whose subtree is enumerated.
    pub root_type: String,
    /// Required outer namespace segment for derived types.
    pub root_namespace: String,
    /// Required inner namespace segment for derived types.
    pub child_namespace: String,
    /// Namespace of the generated container.
    pub container_namespace: String,
    /// Class holding the generated table.
    pub container_class: String,
    /// Name the generated source is registered under.
    pub hint_name: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            root_type: "Experiments.Parent".to_string(),
            root_namespace: "Experiments".to_string(),
            child_namespace: "Child".to_string(),
            container_namespace: "Experiments".to_string(),
            container_class: "Stats".to_string(),
            hint_name: "GeneratedCode".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        let config: Self = from_str_with_path(&path.to_string_lossy(), &src)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !METADATA_NAME.is_match(&self.root_type) {
            return Err(ConfigError::BadRootType(self.root_type.clone()));
        }
        let identifiers = [
            ("root_namespace", &self.root_namespace),
            ("child_namespace", &self.child_namespace),
            ("container_class", &self.container_class),
            ("hint_name", &self.hint_name),
        ];
        for (field, value) in identifiers {
            if !IDENTIFIER.is_match(value) {
                return Err(ConfigError::NotAnIdentifier { field, value: value.clone() });
            }
        }
        if !self.container_namespace.split('.').all(|s| IDENTIFIER.is_match(s)) {
            return Err(ConfigError::NotAnIdentifier {
                field: "container_namespace",
                value: self.container_namespace.clone(),
            });
        }
        Ok(())
    }

    pub fn namespace_rule(&self) -> NamespaceRule {
        NamespaceRule::new(&self.root_namespace, &self.child_namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let config: GeneratorConfig = from_str_with_path("cfg.json", "{}").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_override() {
        let config: GeneratorConfig =
            from_str_with_path("cfg.json", r#"{"root_type": "Game.Entity", "child_namespace": "Entities"}"#).unwrap();
        assert_eq!(config.root_type, "Game.Entity");
        assert_eq!(config.namespace_rule(), NamespaceRule::new("Experiments", "Entities"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = from_str_with_path::<GeneratorConfig>("cfg.json", r#"{"root": "X"}"#).unwrap_err();
        assert!(err.to_string().contains("unknown field"), "{err}");
    }

    #[test]
    fn validation() {
        let mut config = GeneratorConfig::default();
        config.root_type = "Experiments.Outer+Inner".into();
        assert!(config.validate().is_ok());

        config.root_type = "Experiments..Parent".into();
        assert!(matches!(config.validate(), Err(ConfigError::BadRootType(_))));

        let mut config = GeneratorConfig::default();
        config.child_namespace = "Child.Sub".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotAnIdentifier { field: "child_namespace", .. })
        ));

        let mut config = GeneratorConfig::default();
        config.container_namespace = "Generated.Tables".into();
        assert!(config.validate().is_ok());
        config.container_namespace = "Generated.".into();
        assert!(config.validate().is_err());
    }
}
