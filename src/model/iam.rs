use std::collections::BTreeMap;

use serde::Deserialize;

/// YAML policy fragments accept either a single string or a list where AWS
/// does; normalize access through `values()`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    pub fn values(&self) -> Vec<&str> {
        match self {
            StringOrList::One(s) => vec![s.as_str()],
            StringOrList::Many(items) => items.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, StringOrList::One(_))
    }
}

impl Default for StringOrList {
    fn default() -> Self {
        StringOrList::Many(Vec::new())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IamRoleSpec {
    pub description: Option<String>,
    pub assume_role_policy: Option<PolicyDocument>,
    pub policies: Vec<ManagedPolicy>,
    pub inline_policies: Vec<InlinePolicy>,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManagedPolicy {
    pub policy_arn: String,
    pub policy_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InlinePolicy {
    pub name: String,
    pub policy: PolicyDocument,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

impl Default for PolicyDocument {
    fn default() -> Self {
        Self {
            version: "2012-10-17".to_string(),
            statement: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicyStatement {
    pub sid: Option<String>,
    pub effect: String,
    pub principal: BTreeMap<String, StringOrList>,
    pub action: StringOrList,
    pub resource: Option<StringOrList>,
    pub condition: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_accepts_string_or_list() {
        let one: PolicyStatement = serde_yaml::from_str("effect: Allow\naction: sts:AssumeRole").unwrap();
        assert_eq!(one.action.values(), vec!["sts:AssumeRole"]);

        let many: PolicyStatement =
            serde_yaml::from_str("effect: Allow\naction: [\"a:b\", \"c:d\"]").unwrap();
        assert_eq!(many.action.values(), vec!["a:b", "c:d"]);
    }

    #[test]
    fn policy_document_defaults_version() {
        let doc = PolicyDocument::default();
        assert_eq!(doc.version, "2012-10-17");
    }

    #[test]
    fn parses_role_spec() {
        let yaml = r#"
description: shared execution role
assumeRolePolicy:
  statement:
    - effect: Allow
      principal:
        Service: bedrock.amazonaws.com
      action: sts:AssumeRole
policies:
  - policyArn: arn:aws:iam::aws:policy/AmazonBedrockFullAccess
"#;
        let spec: IamRoleSpec = serde_yaml::from_str(yaml).unwrap();
        let assume = spec.assume_role_policy.unwrap();
        assert_eq!(assume.version, "2012-10-17");
        assert_eq!(
            assume.statement[0].principal["Service"].values(),
            vec!["bedrock.amazonaws.com"]
        );
    }
}
