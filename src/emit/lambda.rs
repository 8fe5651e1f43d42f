use std::collections::BTreeSet;

use crate::error::Error;
use crate::hcl::{json_value, HclValue, HclWriter};
use crate::model::{LambdaSpec, Reference, ResourceKind, ResourceRecord, ResourceSpec};
use crate::registry::Registry;
use crate::resolve::sanitize_name;

use super::EmitCtx;

pub(crate) fn emit(
    w: &mut HclWriter,
    ctx: &EmitCtx<'_>,
    record: &ResourceRecord,
    spec: &LambdaSpec,
) -> Result<(), Error> {
    let module_name = sanitize_name(record.name());

    w.open_block("module", &[&module_name]);
    w.attr_str("source", &ctx.module_source("lambda-function"));
    w.attr_str("function_name", record.name());
    w.attr_str("runtime", &spec.runtime);
    w.attr_str("handler", &spec.handler);

    if let Some(description) = &record.metadata.description {
        w.attr_str("description", description);
    }

    let mut code: Vec<(String, HclValue)> = Vec::new();
    if let Some(source) = &spec.code.source {
        code.push(("source".to_string(), HclValue::string(source)));
    }
    if let Some(zip) = &spec.code.zip_file {
        code.push(("zip_file".to_string(), HclValue::string(zip)));
    }
    if let Some(bucket) = &spec.code.s3_bucket {
        code.push(("s3_bucket".to_string(), HclValue::string(bucket)));
    }
    if let Some(key) = &spec.code.s3_key {
        code.push(("s3_key".to_string(), HclValue::string(key)));
    }
    if let Some(version) = &spec.code.s3_object_version {
        code.push(("s3_object_version".to_string(), HclValue::string(version)));
    }
    w.attr("code", HclValue::Object(code));

    if !spec.environment.is_empty() {
        w.attr("environment_variables", HclValue::string_map(&spec.environment));
    }
    if let Some(timeout) = spec.timeout {
        w.attr_int("timeout", i64::from(timeout));
    }
    if let Some(memory) = spec.memory_size {
        w.attr_int("memory_size", i64::from(memory));
    }
    if let Some(concurrency) = spec.reserved_concurrency {
        w.attr_int("reserved_concurrency", i64::from(concurrency));
    }
    if !spec.architectures.is_empty() {
        w.attr("architectures", HclValue::string_list(&spec.architectures));
    }
    if !spec.layers.is_empty() {
        w.attr("layers", HclValue::string_list(&spec.layers));
    }
    if let Some(publish) = spec.publish {
        w.attr_bool("publish", publish);
    }
    if let Some(tracing_config) = &spec.tracing_config {
        w.attr(
            "tracing_config",
            HclValue::Object(vec![(
                "mode".to_string(),
                HclValue::string(&tracing_config.mode),
            )]),
        );
    }

    if let Some(vpc) = &spec.vpc_config {
        let mut entry: Vec<(String, HclValue)> = Vec::new();
        if !vpc.security_group_ids.is_empty() {
            entry.push((
                "security_group_ids".to_string(),
                HclValue::string_list(&vpc.security_group_ids),
            ));
        }
        if !vpc.subnet_ids.is_empty() {
            entry.push(("subnet_ids".to_string(), HclValue::string_list(&vpc.subnet_ids)));
        }
        if !entry.is_empty() {
            w.attr("vpc_config", HclValue::Object(entry));
        }
    }

    // Role: an explicit ARN or declared role suppresses the module-managed one.
    match spec.role_ref() {
        Reference::Unset => w.attr_bool("create_role", true),
        reference => {
            let arn = ctx
                .resolver
                .resolve(&reference, ResourceKind::IamRole, "role_arn")?;
            w.attr_str("role_arn", &arn);
        }
    }

    let statements = resource_policy_statements(ctx.registry, record.name(), spec);
    if !statements.is_empty() {
        w.attr("lambda_resource_policy_statements", HclValue::List(statements));
    }

    if !spec.tags.is_empty() {
        w.attr("tags", HclValue::string_map(&spec.tags));
    }

    w.close_block();
    w.blank();

    tracing::debug!(lambda = record.name(), "generated lambda module");
    Ok(())
}

/// Resource-based policy for the function: user-declared statements first,
/// then one invoke permission per agent that references the function, scoped
/// to that agent's ARN. When nothing references it, a plain Bedrock service
/// permission is added unless the spec switched that off.
fn resource_policy_statements(
    registry: &Registry,
    lambda_name: &str,
    spec: &LambdaSpec,
) -> Vec<HclValue> {
    let mut statements = Vec::new();

    if let Some(policy) = &spec.resource_policy {
        for stmt in &policy.statements {
            let mut entry: Vec<(String, HclValue)> = vec![
                ("sid".to_string(), HclValue::string(&stmt.sid)),
                ("effect".to_string(), HclValue::string(&stmt.effect)),
            ];
            if !stmt.principal.is_empty() {
                let principals = stmt
                    .principal
                    .iter()
                    .map(|(kind, identifiers)| {
                        HclValue::Object(vec![
                            ("type".to_string(), HclValue::string(kind)),
                            (
                                "identifiers".to_string(),
                                HclValue::string_list(&identifiers.values()),
                            ),
                        ])
                    })
                    .collect();
                entry.push(("principals".to_string(), HclValue::List(principals)));
            }
            entry.push(("actions".to_string(), HclValue::string_list(&stmt.action.values())));
            if let Some(condition) = &stmt.condition {
                entry.push(("condition".to_string(), json_value(condition)));
            }
            statements.push(HclValue::Object(entry));
        }
    }

    let agents = agents_referencing(registry, lambda_name);
    if agents.is_empty() {
        let allow_default = spec
            .resource_policy
            .as_ref()
            .map_or(true, |p| p.allow_bedrock_agents);
        if allow_default {
            statements.push(bedrock_invoke_statement("AllowBedrockAgentInvoke", None));
        }
    } else {
        for agent in &agents {
            let sanitized = sanitize_name(agent);
            statements.push(bedrock_invoke_statement(
                &format!("AllowBedrockAgent_{sanitized}"),
                Some(&format!("${{module.{sanitized}.agent_arn}}")),
            ));
        }
    }

    statements
}

fn bedrock_invoke_statement(sid: &str, source_arn: Option<&str>) -> HclValue {
    let mut entry: Vec<(String, HclValue)> = vec![
        ("sid".to_string(), HclValue::string(sid)),
        ("effect".to_string(), HclValue::string("Allow")),
        (
            "principals".to_string(),
            HclValue::List(vec![HclValue::Object(vec![
                ("type".to_string(), HclValue::string("Service")),
                (
                    "identifiers".to_string(),
                    HclValue::string_list(&["bedrock.amazonaws.com"]),
                ),
            ])]),
        ),
        (
            "actions".to_string(),
            HclValue::string_list(&["lambda:InvokeFunction"]),
        ),
    ];
    if let Some(arn) = source_arn {
        entry.push((
            "condition".to_string(),
            HclValue::Object(vec![(
                "StringEquals".to_string(),
                HclValue::Object(vec![("aws:SourceArn".to_string(), HclValue::string(arn))]),
            )]),
        ));
    }
    HclValue::Object(entry)
}

/// All agents whose inline executors or standalone action groups point at
/// this function, sorted for reproducible output.
fn agents_referencing(registry: &Registry, lambda_name: &str) -> Vec<String> {
    let mut agents = BTreeSet::new();

    for record in registry.list_by_kind(ResourceKind::Agent) {
        if let ResourceSpec::Agent(agent) = &record.spec {
            let references = agent.action_groups.iter().any(|group| {
                group
                    .action_group_executor
                    .as_ref()
                    .is_some_and(|ex| ex.lambda_ref().as_named() == Some(lambda_name))
            });
            if references {
                agents.insert(record.name().to_string());
            }
        }
    }

    for record in registry.list_by_kind(ResourceKind::ActionGroup) {
        if let ResourceSpec::ActionGroup(group) = &record.spec {
            let references = group
                .action_group_executor
                .as_ref()
                .is_some_and(|ex| ex.lambda_ref().as_named() == Some(lambda_name));
            if references {
                if let Some(agent) = group.agent_id.as_named() {
                    agents.insert(agent.to_string());
                }
            }
        }
    }

    agents.into_iter().collect()
}
