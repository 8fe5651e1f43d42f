use std::collections::BTreeMap;

use serde::Deserialize;

use super::Reference;

/// A user-supplied Terraform module pulled into the generated root module,
/// ordered after whatever resources its dependsOn list names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomResourcesSpec {
    /// Module source: local path, git URL, or registry address.
    pub source: String,
    /// Git ref or registry version, depending on the source form.
    pub version: Option<String>,
    pub description: Option<String>,
    /// Input variables handed to the module verbatim.
    pub variables: BTreeMap<String, serde_json::Value>,
    /// Names of declared resources this module must be ordered after.
    pub depends_on: Vec<Reference>,
}

impl CustomResourcesSpec {
    pub fn is_git_source(&self) -> bool {
        self.source.starts_with("git::")
            || self.source.starts_with("github.com/")
            || self.source.ends_with(".git")
    }

    pub fn is_registry_source(&self) -> bool {
        !self.is_git_source()
            && !self.source.starts_with('.')
            && !self.source.starts_with('/')
            && self.source.matches('/').count() == 2
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssociationSpec {
    pub agent_name: Reference,
    pub knowledge_base_name: Reference,
    pub description: Option<String>,
    pub state: Option<String>,
}
