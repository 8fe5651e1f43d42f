use std::collections::BTreeMap;

use serde::Deserialize;

use super::opensearch::FieldMapping;
use super::Reference;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KnowledgeBaseSpec {
    pub description: Option<String>,
    pub knowledge_base_configuration: Option<KnowledgeBaseConfiguration>,
    pub storage_configuration: Option<StorageConfiguration>,
    pub data_sources: Vec<DataSource>,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KnowledgeBaseConfiguration {
    pub r#type: String,
    pub vector_knowledge_base_configuration: Option<VectorKnowledgeBaseConfiguration>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VectorKnowledgeBaseConfiguration {
    pub embedding_model_arn: String,
    pub embedding_model_configuration: Option<EmbeddingModelConfiguration>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddingModelConfiguration {
    pub dimensions: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageConfiguration {
    pub r#type: String,
    pub open_search_serverless: Option<OpenSearchBinding>,
}

/// Vector store binding: either an existing collection ARN or the name of an
/// OpenSearchServerless resource declared in this project.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpenSearchBinding {
    pub collection_arn: Option<String>,
    pub collection_name: Reference,
    pub vector_index_name: String,
    pub field_mapping: FieldMapping,
}

impl OpenSearchBinding {
    pub fn collection_ref(&self) -> Reference {
        match &self.collection_arn {
            Some(arn) if !arn.is_empty() => Reference::External(arn.clone()),
            _ => self.collection_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataSource {
    pub name: String,
    pub r#type: String,
    pub s3_configuration: Option<S3Configuration>,
    pub chunking_configuration: Option<ChunkingConfiguration>,
    pub custom_transformation: Option<CustomTransformation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct S3Configuration {
    pub bucket_arn: String,
    pub inclusion_prefixes: Vec<String>,
    pub exclusion_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChunkingConfiguration {
    pub chunking_strategy: String,
    pub fixed_size_chunking_configuration: Option<FixedSizeChunking>,
    pub semantic_chunking_configuration: Option<SemanticChunking>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FixedSizeChunking {
    pub max_tokens: u32,
    pub overlap_percentage: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SemanticChunking {
    pub max_tokens: u32,
    pub buffer_size: u32,
    pub breakpoint_percentile_threshold: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomTransformation {
    pub transformation_lambda: Option<TransformationLambda>,
    pub intermediate_storage: Option<IntermediateStorage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransformationLambda {
    /// External function ARN, never resolved against the registry.
    pub lambda_arn: Option<String>,
    /// Reference to a Lambda resource declared in this project.
    pub lambda: Reference,
}

impl TransformationLambda {
    pub fn lambda_ref(&self) -> Reference {
        match &self.lambda_arn {
            Some(arn) if !arn.is_empty() => Reference::External(arn.clone()),
            _ => self.lambda.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntermediateStorage {
    pub s3_location: Option<S3Location>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct S3Location {
    pub uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_name_binds_to_declared_collection() {
        let yaml = r#"
type: OPENSEARCH_SERVERLESS
openSearchServerless:
  collectionName: docs-collection
  vectorIndexName: docs-index
  fieldMapping:
    vectorField: vector
    textField: text
    metadataField: metadata
"#;
        let storage: StorageConfiguration = serde_yaml::from_str(yaml).unwrap();
        let binding = storage.open_search_serverless.unwrap();
        assert_eq!(
            binding.collection_ref(),
            Reference::Named("docs-collection".to_string())
        );
    }

    #[test]
    fn collection_arn_is_external() {
        let binding = OpenSearchBinding {
            collection_arn: Some("arn:aws:aoss:us-east-1:123:collection/abc".into()),
            collection_name: Reference::Named("ignored".into()),
            ..Default::default()
        };
        assert_eq!(
            binding.collection_ref(),
            Reference::External("arn:aws:aoss:us-east-1:123:collection/abc".into())
        );
    }
}
