use crate::error::Error;
use crate::hcl::{json_value, HclValue, HclWriter};
use crate::model::iam::{PolicyDocument, StringOrList};
use crate::model::{IamRoleConfig, IamRoleSpec, ResourceRecord};
use crate::resolve::sanitize_name;

use super::EmitCtx;

pub(crate) fn emit(
    w: &mut HclWriter,
    ctx: &EmitCtx<'_>,
    record: &ResourceRecord,
    spec: &IamRoleSpec,
) -> Result<(), Error> {
    let module_name = sanitize_name(record.name());

    w.open_block("module", &[&module_name]);
    w.attr_str("source", &ctx.module_source("iam-role"));
    w.attr_str("role_name", record.name());

    if let Some(description) = &spec.description {
        w.attr_str("description", description);
    }
    if let Some(assume) = &spec.assume_role_policy {
        w.attr("assume_role_policy", policy_document_value(assume));
    }

    if !spec.policies.is_empty() {
        let policies = spec
            .policies
            .iter()
            .map(|policy| {
                let mut entry: Vec<(String, HclValue)> =
                    vec![("policy_arn".to_string(), HclValue::string(&policy.policy_arn))];
                if let Some(name) = &policy.policy_name {
                    entry.push(("policy_name".to_string(), HclValue::string(name)));
                }
                HclValue::Object(entry)
            })
            .collect();
        w.attr("managed_policies", HclValue::List(policies));
    }

    if !spec.inline_policies.is_empty() {
        let policies = spec
            .inline_policies
            .iter()
            .map(|inline| {
                HclValue::Object(vec![
                    ("name".to_string(), HclValue::string(&inline.name)),
                    ("policy".to_string(), policy_document_value(&inline.policy)),
                ])
            })
            .collect();
        w.attr("inline_policies", HclValue::List(policies));
    }

    if !spec.tags.is_empty() {
        w.attr("tags", HclValue::string_map(&spec.tags));
    }

    w.close_block();
    w.blank();

    tracing::debug!(iam_role = record.name(), "generated IAM role module");
    Ok(())
}

/// The execution role the generator declares on an agent's behalf when the
/// agent did not bring its own: Bedrock trust policy, the managed Bedrock
/// policy plus any user additions, and an inline policy covering model
/// invocation, lambda execution, retrieval, and logs.
pub(crate) fn emit_generated_role(
    w: &mut HclWriter,
    ctx: &EmitCtx<'_>,
    agent_name: &str,
    iam: Option<&IamRoleConfig>,
) {
    let role_module = format!("{}_execution_role", sanitize_name(agent_name));

    w.open_block("module", &[&role_module]);
    w.attr_str("source", &ctx.module_source("iam-role"));
    w.attr_str("role_name", &format!("{agent_name}-execution-role"));
    w.attr_str(
        "description",
        &format!("Execution role generated for Bedrock agent {agent_name}"),
    );

    w.attr(
        "assume_role_policy",
        HclValue::Object(vec![
            ("version".to_string(), HclValue::string("2012-10-17")),
            (
                "statement".to_string(),
                HclValue::List(vec![HclValue::Object(vec![
                    ("effect".to_string(), HclValue::string("Allow")),
                    (
                        "principal".to_string(),
                        HclValue::Object(vec![(
                            "service".to_string(),
                            HclValue::string("bedrock.amazonaws.com"),
                        )]),
                    ),
                    ("action".to_string(), HclValue::string("sts:AssumeRole")),
                ])]),
            ),
        ]),
    );

    let mut managed = vec![HclValue::Object(vec![(
        "policy_arn".to_string(),
        HclValue::string("arn:aws:iam::aws:policy/AmazonBedrockFullAccess"),
    )])];
    if let Some(cfg) = iam {
        for policy in &cfg.additional_policies {
            if !policy.policy_arn.is_empty() {
                managed.push(HclValue::Object(vec![(
                    "policy_arn".to_string(),
                    HclValue::string(&policy.policy_arn),
                )]));
            }
        }
    }
    w.attr("managed_policies", HclValue::List(managed));

    let statements = vec![
        allow_statement(
            &["bedrock:InvokeModel", "bedrock:InvokeModelWithResponseStream"],
            "arn:aws:bedrock:*::foundation-model/*",
        ),
        allow_statement(&["lambda:InvokeFunction"], "arn:aws:lambda:*:*:function:*"),
        allow_statement(
            &["bedrock:Retrieve", "bedrock:RetrieveAndGenerate"],
            "arn:aws:bedrock:*:*:knowledge-base/*",
        ),
        allow_statement(
            &["logs:CreateLogGroup", "logs:CreateLogStream", "logs:PutLogEvents"],
            "arn:aws:logs:*:*:*",
        ),
    ];
    w.attr(
        "inline_policies",
        HclValue::List(vec![HclValue::Object(vec![
            ("name".to_string(), HclValue::string("BedrockAgentExecutionPolicy")),
            (
                "policy".to_string(),
                HclValue::Object(vec![
                    ("version".to_string(), HclValue::string("2012-10-17")),
                    ("statement".to_string(), HclValue::List(statements)),
                ]),
            ),
        ])]),
    );

    w.attr(
        "tags",
        HclValue::Object(vec![
            ("Agent".to_string(), HclValue::string(agent_name)),
            ("CreatedBy".to_string(), HclValue::string("basalt")),
            ("Purpose".to_string(), HclValue::string("BedrockAgentExecution")),
        ]),
    );

    w.close_block();
    w.blank();

    tracing::debug!(agent = agent_name, "generated execution role module");
}

fn allow_statement(actions: &[&str], resource: &str) -> HclValue {
    HclValue::Object(vec![
        ("effect".to_string(), HclValue::string("Allow")),
        ("action".to_string(), HclValue::string_list(actions)),
        ("resource".to_string(), HclValue::string(resource)),
    ])
}

pub(crate) fn policy_document_value(document: &PolicyDocument) -> HclValue {
    let statements = document
        .statement
        .iter()
        .map(|stmt| {
            let mut entry: Vec<(String, HclValue)> = Vec::new();
            if let Some(sid) = &stmt.sid {
                entry.push(("sid".to_string(), HclValue::string(sid)));
            }
            entry.push(("effect".to_string(), HclValue::string(&stmt.effect)));
            if !stmt.principal.is_empty() {
                let principal = stmt
                    .principal
                    .iter()
                    .map(|(kind, value)| (kind.clone(), string_or_list_value(value)))
                    .collect();
                entry.push(("principal".to_string(), HclValue::Object(principal)));
            }
            entry.push(("action".to_string(), HclValue::string_list(&stmt.action.values())));
            if let Some(resource) = &stmt.resource {
                entry.push(("resource".to_string(), HclValue::string_list(&resource.values())));
            }
            if let Some(condition) = &stmt.condition {
                entry.push(("condition".to_string(), json_value(condition)));
            }
            HclValue::Object(entry)
        })
        .collect();

    HclValue::Object(vec![
        ("version".to_string(), HclValue::string(&document.version)),
        ("statement".to_string(), HclValue::List(statements)),
    ])
}

fn string_or_list_value(value: &StringOrList) -> HclValue {
    if value.is_single() {
        HclValue::string(value.values()[0])
    } else {
        HclValue::string_list(&value.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::registry::Registry;

    #[test]
    fn generated_role_carries_bedrock_trust_and_policies() {
        let registry = Registry::new();
        let config = Config::default();
        let ctx = EmitCtx::new(&registry, &config);

        let mut w = HclWriter::new();
        emit_generated_role(&mut w, &ctx, "order-agent", None);
        let text = w.into_string();
        assert!(text.contains("module \"order_agent_execution_role\""));
        assert!(text.contains("role_name = \"order-agent-execution-role\""));
        assert!(text.contains("service = \"bedrock.amazonaws.com\""));
        assert!(text.contains("arn:aws:iam::aws:policy/AmazonBedrockFullAccess"));
        assert!(text.contains("BedrockAgentExecutionPolicy"));
    }

    #[test]
    fn additional_policies_are_appended() {
        let registry = Registry::new();
        let config = Config::default();
        let ctx = EmitCtx::new(&registry, &config);

        let iam = IamRoleConfig {
            additional_policies: vec![crate::model::ManagedPolicy {
                policy_arn: "arn:aws:iam::123:policy/team-extras".into(),
                policy_name: None,
            }],
            ..Default::default()
        };
        let mut w = HclWriter::new();
        emit_generated_role(&mut w, &ctx, "a1", Some(&iam));
        assert!(w.into_string().contains("arn:aws:iam::123:policy/team-extras"));
    }
}
