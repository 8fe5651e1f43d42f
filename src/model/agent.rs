use std::collections::BTreeMap;

use serde::Deserialize;

use super::action_group::{ActionGroupExecutor, ApiSchema, FunctionSchema};
use super::iam::ManagedPolicy;
use super::Reference;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentSpec {
    pub foundation_model: String,
    pub instruction: String,
    pub description: Option<String>,
    pub idle_session_ttl: Option<u32>,
    pub customer_encryption_key: Option<String>,
    pub tags: BTreeMap<String, String>,
    pub guardrail: Option<GuardrailAttachment>,
    pub action_groups: Vec<InlineActionGroup>,
    pub prompt_overrides: Vec<PromptOverride>,
    pub memory_configuration: Option<MemoryConfiguration>,
    pub iam_role: Option<IamRoleConfig>,
    pub prepare_agent: Option<bool>,
    pub skip_resource_in_use_check: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuardrailAttachment {
    pub name: Reference,
    pub version: Option<String>,
    pub mode: Option<String>,
}

/// An action group declared inline on the agent rather than as a standalone
/// ActionGroup resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InlineActionGroup {
    pub name: String,
    pub description: Option<String>,
    pub parent_action_group_signature: Option<String>,
    pub action_group_executor: Option<ActionGroupExecutor>,
    pub action_group_state: Option<String>,
    pub api_schema: Option<ApiSchema>,
    pub function_schema: Option<FunctionSchema>,
    pub skip_resource_in_use_check: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PromptOverride {
    pub prompt_type: String,
    /// External prompt ARN, never resolved against the registry.
    pub prompt_arn: Option<String>,
    /// Reference to a Prompt resource declared in this project.
    pub prompt: Reference,
    pub variant: Option<String>,
}

impl PromptOverride {
    pub fn prompt_ref(&self) -> Reference {
        match &self.prompt_arn {
            Some(arn) if !arn.is_empty() => Reference::External(arn.clone()),
            _ => self.prompt.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemoryConfiguration {
    pub enabled_memory_types: Vec<String>,
    pub storage_days: Option<u32>,
}

/// How the agent's execution role is sourced: an existing ARN, a declared
/// IAMRole resource, or (the default) a role generated on the agent's behalf.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IamRoleConfig {
    pub role_arn: Option<String>,
    pub role_name: Reference,
    pub auto_create: bool,
    pub additional_policies: Vec<ManagedPolicy>,
}

impl AgentSpec {
    /// True when no usable role was supplied and the generator must derive
    /// an execution role for this agent.
    pub fn needs_generated_role(&self) -> bool {
        match &self.iam_role {
            None => true,
            Some(cfg) => cfg.role_arn.is_none() && !cfg.role_name.is_set(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_agent_spec_with_references() {
        let yaml = r#"
foundationModel: anthropic.claude-3-sonnet
instruction: Help customers track orders.
guardrail:
  name: content-guardrail
  version: "1"
actionGroups:
  - name: order-actions
    actionGroupExecutor:
      lambda: order-lookup
promptOverrides:
  - promptType: ORCHESTRATION
    prompt: orchestration-prompt
"#;
        let spec: AgentSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.foundation_model, "anthropic.claude-3-sonnet");
        assert_eq!(
            spec.guardrail.as_ref().unwrap().name,
            Reference::Named("content-guardrail".to_string())
        );
        let executor = spec.action_groups[0].action_group_executor.as_ref().unwrap();
        assert_eq!(executor.lambda, Reference::Named("order-lookup".to_string()));
        assert_eq!(
            spec.prompt_overrides[0].prompt_ref(),
            Reference::Named("orchestration-prompt".to_string())
        );
        assert!(spec.needs_generated_role());
    }

    #[test]
    fn prompt_arn_wins_over_named_prompt() {
        let po = PromptOverride {
            prompt_type: "ORCHESTRATION".into(),
            prompt_arn: Some("arn:aws:bedrock:us-east-1:123:prompt/p1".into()),
            prompt: Reference::Named("ignored".into()),
            variant: None,
        };
        assert_eq!(
            po.prompt_ref(),
            Reference::External("arn:aws:bedrock:us-east-1:123:prompt/p1".into())
        );
    }

    #[test]
    fn explicit_role_arn_suppresses_generated_role() {
        let yaml = r#"
foundationModel: m
instruction: i
iamRole:
  roleArn: arn:aws:iam::123:role/custom
"#;
        let spec: AgentSpec = serde_yaml::from_str(yaml).unwrap();
        assert!(!spec.needs_generated_role());
    }
}
