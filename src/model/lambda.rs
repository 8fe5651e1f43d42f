use std::collections::BTreeMap;

use serde::Deserialize;

use super::iam::StringOrList;
use super::Reference;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LambdaSpec {
    pub runtime: String,
    pub handler: String,
    pub code: CodeConfiguration,
    pub environment: BTreeMap<String, String>,
    pub timeout: Option<u32>,
    pub memory_size: Option<u32>,
    pub reserved_concurrency: Option<u32>,
    pub tags: BTreeMap<String, String>,
    pub vpc_config: Option<VpcConfig>,
    pub resource_policy: Option<LambdaResourcePolicy>,
    /// Reference to an IAMRole resource declared in this project.
    pub role: Reference,
    /// External role ARN, never resolved against the registry.
    pub role_arn: Option<String>,
    pub architectures: Vec<String>,
    pub layers: Vec<String>,
    pub publish: Option<bool>,
    pub tracing_config: Option<TracingConfig>,
}

impl LambdaSpec {
    pub fn role_ref(&self) -> Reference {
        match &self.role_arn {
            Some(arn) if !arn.is_empty() => Reference::External(arn.clone()),
            _ => self.role.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CodeConfiguration {
    pub source: Option<String>,
    pub zip_file: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_key: Option<String>,
    pub s3_object_version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VpcConfig {
    pub security_group_ids: Vec<String>,
    pub subnet_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LambdaResourcePolicy {
    /// When no declared agent references the function, still grant the
    /// Bedrock service invoke permission unless this is switched off.
    pub allow_bedrock_agents: bool,
    pub statements: Vec<ResourcePolicyStatement>,
}

impl Default for LambdaResourcePolicy {
    fn default() -> Self {
        Self {
            allow_bedrock_agents: true,
            statements: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourcePolicyStatement {
    pub sid: String,
    pub effect: String,
    pub principal: BTreeMap<String, StringOrList>,
    pub action: StringOrList,
    pub condition: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TracingConfig {
    pub mode: String,
}
