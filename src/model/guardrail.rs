use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuardrailSpec {
    pub description: Option<String>,
    pub content_policy_config: Option<ContentPolicyConfig>,
    pub sensitive_information_policy_config: Option<SensitiveInformationPolicyConfig>,
    pub contextual_grounding_policy_config: Option<ContextualGroundingPolicyConfig>,
    pub topic_policy_config: Option<TopicPolicyConfig>,
    pub word_policy_config: Option<WordPolicyConfig>,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentPolicyConfig {
    pub filters_config: Vec<ContentFilter>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentFilter {
    pub r#type: String,
    pub input_strength: String,
    pub output_strength: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SensitiveInformationPolicyConfig {
    pub pii_entities_config: Vec<PiiEntity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PiiEntity {
    pub r#type: String,
    pub action: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContextualGroundingPolicyConfig {
    pub filters_config: Vec<GroundingFilter>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroundingFilter {
    pub r#type: String,
    pub threshold: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TopicPolicyConfig {
    pub topics_config: Vec<TopicConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TopicConfig {
    pub name: String,
    pub definition: String,
    pub r#type: String,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WordPolicyConfig {
    pub words_config: Vec<WordConfig>,
    pub managed_word_lists_config: Vec<ManagedWordList>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WordConfig {
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManagedWordList {
    pub r#type: String,
}
