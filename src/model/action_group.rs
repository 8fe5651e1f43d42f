use std::collections::BTreeMap;

use serde::Deserialize;

use super::Reference;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionGroupSpec {
    /// The agent this group attaches to. Required.
    pub agent_id: Reference,
    /// Defaults to DRAFT when unset.
    pub agent_version: Option<String>,
    pub description: Option<String>,
    pub parent_action_group_signature: Option<String>,
    pub action_group_executor: Option<ActionGroupExecutor>,
    pub action_group_state: Option<String>,
    pub api_schema: Option<ApiSchema>,
    pub function_schema: Option<FunctionSchema>,
    pub skip_resource_in_use_check: bool,
    pub tags: BTreeMap<String, String>,
    pub prepare_agent: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionGroupExecutor {
    /// Reference to a Lambda resource declared in this project.
    pub lambda: Reference,
    /// External function ARN, never resolved against the registry.
    pub lambda_arn: Option<String>,
    pub custom_control: Option<String>,
}

impl ActionGroupExecutor {
    pub fn lambda_ref(&self) -> Reference {
        match &self.lambda_arn {
            Some(arn) if !arn.is_empty() => Reference::External(arn.clone()),
            _ => self.lambda.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiSchema {
    pub s3: Option<S3ApiSchema>,
    pub payload: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct S3ApiSchema {
    pub s3_bucket_name: String,
    pub s3_object_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FunctionSchema {
    pub functions: Vec<FunctionDef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FunctionDef {
    pub name: String,
    pub description: Option<String>,
    pub parameters: BTreeMap<String, ParameterDef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParameterDef {
    pub description: Option<String>,
    pub required: bool,
    pub r#type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_arn_wins_over_named_lambda() {
        let executor = ActionGroupExecutor {
            lambda: Reference::Named("local-fn".into()),
            lambda_arn: Some("arn:aws:lambda:us-east-1:123:function:ext".into()),
            custom_control: None,
        };
        assert_eq!(
            executor.lambda_ref(),
            Reference::External("arn:aws:lambda:us-east-1:123:function:ext".into())
        );
    }

    #[test]
    fn named_lambda_when_no_arn() {
        let yaml = "lambda: order-lookup";
        let executor: ActionGroupExecutor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(executor.lambda_ref(), Reference::Named("order-lookup".into()));
    }
}
