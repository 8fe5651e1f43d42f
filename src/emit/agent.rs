use crate::error::Error;
use crate::hcl::{HclValue, HclWriter};
use crate::model::agent::GuardrailAttachment;
use crate::model::{
    AgentSpec, IamRoleConfig, InlineActionGroup, Reference, ResourceKind, ResourceRecord,
};
use crate::resolve::sanitize_name;

use super::EmitCtx;

pub(crate) fn emit(
    w: &mut HclWriter,
    ctx: &EmitCtx<'_>,
    record: &ResourceRecord,
    spec: &AgentSpec,
) -> Result<(), Error> {
    let module_name = sanitize_name(record.name());

    w.open_block("module", &[&module_name]);
    w.attr_str("source", &ctx.module_source("bedrock-agent"));
    w.attr_str("name", record.name());
    w.attr_str("foundation_model", &spec.foundation_model);
    w.attr_str("instruction", &spec.instruction);
    w.attr_str(
        "agent_resource_role_arn",
        &execution_role_expr(ctx, record.name(), spec.iam_role.as_ref())?,
    );

    if let Some(description) = &spec.description {
        w.attr_str("description", description);
    }
    if let Some(ttl) = spec.idle_session_ttl {
        w.attr_int("idle_session_ttl", i64::from(ttl));
    }
    if let Some(key) = &spec.customer_encryption_key {
        w.attr_str("customer_encryption_key", key);
    }

    if let Some(guardrail) = &spec.guardrail {
        if guardrail.name.is_set() {
            w.attr("guardrail", guardrail_value(ctx, guardrail)?);
        }
    }

    if !spec.action_groups.is_empty() {
        let mut groups = Vec::with_capacity(spec.action_groups.len());
        for group in &spec.action_groups {
            groups.push(inline_action_group_value(ctx, group)?);
        }
        w.attr("action_groups", HclValue::List(groups));
    }

    if !spec.prompt_overrides.is_empty() {
        let mut overrides = Vec::with_capacity(spec.prompt_overrides.len());
        for po in &spec.prompt_overrides {
            let prompt_arn = match po.prompt_ref() {
                Reference::Unset => String::new(),
                reference => ctx.resolver.resolve(&reference, ResourceKind::Prompt, "prompt_arn")?,
            };
            let mut entry = vec![
                ("prompt_type".to_string(), HclValue::string(&po.prompt_type)),
                ("prompt_arn".to_string(), HclValue::string(prompt_arn)),
            ];
            entry.push((
                "variant".to_string(),
                HclValue::string(po.variant.clone().unwrap_or_default()),
            ));
            overrides.push(HclValue::Object(entry));
        }
        w.attr("prompt_overrides", HclValue::List(overrides));
    }

    if let Some(memory) = &spec.memory_configuration {
        let mut entry = Vec::new();
        if !memory.enabled_memory_types.is_empty() {
            entry.push((
                "enabled_memory_types".to_string(),
                HclValue::string_list(&memory.enabled_memory_types),
            ));
        }
        if let Some(days) = memory.storage_days {
            entry.push(("storage_days".to_string(), HclValue::Int(i64::from(days))));
        }
        w.attr("memory_configuration", HclValue::Object(entry));
    }

    if let Some(prepare) = spec.prepare_agent {
        w.attr_bool("prepare_agent", prepare);
    }
    if let Some(skip) = spec.skip_resource_in_use_check {
        w.attr_bool("skip_resource_in_use_check", skip);
    }

    if !spec.tags.is_empty() {
        w.attr("tags", HclValue::string_map(&spec.tags));
    }

    w.close_block();
    w.blank();

    tracing::debug!(agent = record.name(), "generated agent module");
    Ok(())
}

/// The expression the agent's `agent_resource_role_arn` attribute carries:
/// an explicit ARN, a declared IAMRole resource, or the execution role the
/// generator derives for this agent.
pub(crate) fn execution_role_expr(
    ctx: &EmitCtx<'_>,
    agent_name: &str,
    iam: Option<&IamRoleConfig>,
) -> Result<String, Error> {
    if let Some(cfg) = iam {
        if let Some(arn) = &cfg.role_arn {
            if !arn.is_empty() {
                return Ok(arn.clone());
            }
        }
        if cfg.role_name.is_set() {
            return ctx
                .resolver
                .resolve(&cfg.role_name, ResourceKind::IamRole, "role_arn");
        }
    }
    Ok(format!(
        "${{module.{}_execution_role.role_arn}}",
        sanitize_name(agent_name)
    ))
}

fn guardrail_value(
    ctx: &EmitCtx<'_>,
    guardrail: &GuardrailAttachment,
) -> Result<HclValue, Error> {
    let mut entry: Vec<(String, HclValue)> = Vec::new();

    match &guardrail.name {
        Reference::Named(name) => {
            entry.push(("name".to_string(), HclValue::string(name)));
            entry.push((
                "guardrail_id".to_string(),
                HclValue::string(ctx.resolver.resolve(
                    &guardrail.name,
                    ResourceKind::Guardrail,
                    "guardrail_id",
                )?),
            ));
            entry.push((
                "guardrail_version".to_string(),
                HclValue::string(ctx.resolver.resolve(
                    &guardrail.name,
                    ResourceKind::Guardrail,
                    "guardrail_version",
                )?),
            ));
        }
        Reference::External(value) => {
            entry.push(("name".to_string(), HclValue::string(value)));
        }
        Reference::Unset => {}
    }

    if let Some(version) = &guardrail.version {
        entry.push(("version".to_string(), HclValue::string(version)));
    }
    if let Some(mode) = &guardrail.mode {
        entry.push(("mode".to_string(), HclValue::string(mode)));
    }

    Ok(HclValue::Object(entry))
}

fn inline_action_group_value(
    ctx: &EmitCtx<'_>,
    group: &InlineActionGroup,
) -> Result<HclValue, Error> {
    let mut entry: Vec<(String, HclValue)> =
        vec![("name".to_string(), HclValue::string(&group.name))];

    if let Some(description) = &group.description {
        entry.push(("description".to_string(), HclValue::string(description)));
    }
    if let Some(signature) = &group.parent_action_group_signature {
        entry.push((
            "parent_action_group_signature".to_string(),
            HclValue::string(signature),
        ));
    }
    if let Some(state) = &group.action_group_state {
        entry.push(("action_group_state".to_string(), HclValue::string(state)));
    }
    if group.skip_resource_in_use_check {
        entry.push(("skip_resource_in_use_check".to_string(), HclValue::Bool(true)));
    }

    if let Some(executor) = &group.action_group_executor {
        let mut executor_entry: Vec<(String, HclValue)> = Vec::new();
        match executor.lambda_ref() {
            Reference::Unset => {}
            reference => {
                let arn =
                    ctx.resolver
                        .resolve(&reference, ResourceKind::Lambda, "lambda_function_arn")?;
                executor_entry.push(("lambda".to_string(), HclValue::string(arn)));
            }
        }
        if let Some(control) = &executor.custom_control {
            executor_entry.push(("custom_control".to_string(), HclValue::string(control)));
        }
        entry.push((
            "action_group_executor".to_string(),
            HclValue::Object(executor_entry),
        ));
    }

    if let Some(schema) = &group.api_schema {
        entry.push(("api_schema".to_string(), super::action_group::api_schema_value(schema)));
    }
    if let Some(schema) = &group.function_schema {
        entry.push((
            "function_schema".to_string(),
            super::action_group::function_schema_value(schema),
        ));
    }

    Ok(HclValue::Object(entry))
}
