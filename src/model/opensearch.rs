use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpenSearchServerlessSpec {
    pub collection_name: String,
    pub description: Option<String>,
    /// Defaults to VECTORSEARCH when unset.
    pub r#type: Option<String>,
    pub encryption_policy: Option<EncryptionPolicy>,
    pub network_policy: Option<NetworkPolicy>,
    pub access_policy: Option<AccessPolicy>,
    pub vector_index: Option<VectorIndexConfig>,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EncryptionPolicy {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Uses the AWS managed key when unset.
    pub kms_key_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkPolicy {
    pub name: Option<String>,
    pub description: Option<String>,
    pub access: Vec<NetworkAccess>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkAccess {
    #[serde(rename = "sourceVPCEs")]
    pub source_vpces: Vec<String>,
    pub source_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessPolicy {
    pub name: Option<String>,
    pub description: Option<String>,
    pub principals: Vec<String>,
    pub permissions: Vec<String>,
    pub auto_configure_for_bedrock: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VectorIndexConfig {
    pub name: String,
    pub field_mapping: FieldMapping,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldMapping {
    pub vector_field: String,
    pub text_field: String,
    pub metadata_field: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_collection_spec() {
        let yaml = r#"
collectionName: docs-collection
accessPolicy:
  principals:
    - arn:aws:iam::123:role/ingest
  autoConfigureForBedrock: true
vectorIndex:
  name: docs-index
  fieldMapping:
    vectorField: vector
    textField: text
    metadataField: metadata
"#;
        let spec: OpenSearchServerlessSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.collection_name, "docs-collection");
        assert!(spec.access_policy.unwrap().auto_configure_for_bedrock);
        assert_eq!(spec.vector_index.unwrap().field_mapping.vector_field, "vector");
    }
}
