//! Template records discovered in repositories

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::repository::NamespaceAndName;

/// Content of a `template.yml` / `template.yaml` file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    /// Human-readable template name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Any other top-level keys, passed through untouched
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl TemplateDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            properties: Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// A descriptor together with the repository it was found in
///
/// The owning repository is only settable at construction, so every record
/// handed out by the collector carries it.
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryTemplate {
    repository: NamespaceAndName,
    descriptor: TemplateDescriptor,
}

impl RepositoryTemplate {
    pub fn new(repository: NamespaceAndName, descriptor: TemplateDescriptor) -> Self {
        Self {
            repository,
            descriptor,
        }
    }

    /// Repository the descriptor was read from
    pub fn repository(&self) -> &NamespaceAndName {
        &self.repository
    }

    pub fn descriptor(&self) -> &TemplateDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}
