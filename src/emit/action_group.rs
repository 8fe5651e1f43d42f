use crate::error::Error;
use crate::hcl::{HclValue, HclWriter};
use crate::model::{ApiSchema, ActionGroupSpec, FunctionSchema, Reference, ResourceKind, ResourceRecord};
use crate::resolve::sanitize_name;

use super::EmitCtx;

pub(crate) fn emit(
    w: &mut HclWriter,
    ctx: &EmitCtx<'_>,
    record: &ResourceRecord,
    spec: &ActionGroupSpec,
) -> Result<(), Error> {
    if !spec.agent_id.is_set() {
        return Err(Error::MissingField { field: "agentId" });
    }
    let executor = spec
        .action_group_executor
        .as_ref()
        .ok_or(Error::MissingField {
            field: "actionGroupExecutor",
        })?;

    let module_name = sanitize_name(record.name());
    w.open_block("module", &[&module_name]);
    w.attr_str("source", &ctx.module_source("bedrock-action-group"));
    w.attr_str("action_group_name", record.name());

    let agent_id = ctx
        .resolver
        .resolve(&spec.agent_id, ResourceKind::Agent, "agent_id")?;
    w.attr_str("agent_id", &agent_id);
    w.attr_str(
        "agent_version",
        spec.agent_version.as_deref().unwrap_or("DRAFT"),
    );

    if let Some(description) = &spec.description {
        w.attr_str("description", description);
    }
    if let Some(signature) = &spec.parent_action_group_signature {
        w.attr_str("parent_action_group_signature", signature);
    }
    if let Some(state) = &spec.action_group_state {
        w.attr_str("action_group_state", state);
    }
    if spec.skip_resource_in_use_check {
        w.attr_bool("skip_resource_in_use_check", true);
    }

    let mut executor_entry: Vec<(String, HclValue)> = Vec::new();
    match executor.lambda_ref() {
        Reference::Unset => {}
        reference => {
            let arn = ctx
                .resolver
                .resolve(&reference, ResourceKind::Lambda, "lambda_function_arn")?;
            executor_entry.push(("lambda".to_string(), HclValue::string(arn)));
        }
    }
    if let Some(control) = &executor.custom_control {
        executor_entry.push(("custom_control".to_string(), HclValue::string(control)));
    }
    if !executor_entry.is_empty() {
        w.attr("action_group_executor", HclValue::Object(executor_entry));
    }

    if let Some(schema) = &spec.api_schema {
        w.attr("api_schema", api_schema_value(schema));
    }
    if let Some(schema) = &spec.function_schema {
        w.attr("function_schema", function_schema_value(schema));
    }

    if let Some(prepare) = spec.prepare_agent {
        w.attr_bool("prepare_agent", prepare);
    }
    if !spec.tags.is_empty() {
        w.attr("tags", HclValue::string_map(&spec.tags));
    }

    w.close_block();
    w.blank();

    tracing::debug!(action_group = record.name(), "generated action group module");
    Ok(())
}

pub(crate) fn api_schema_value(schema: &ApiSchema) -> HclValue {
    let mut entry: Vec<(String, HclValue)> = Vec::new();
    if let Some(s3) = &schema.s3 {
        entry.push((
            "s3".to_string(),
            HclValue::Object(vec![
                ("s3_bucket_name".to_string(), HclValue::string(&s3.s3_bucket_name)),
                ("s3_object_key".to_string(), HclValue::string(&s3.s3_object_key)),
            ]),
        ));
    } else if let Some(payload) = &schema.payload {
        entry.push(("payload".to_string(), HclValue::string(payload)));
    }
    HclValue::Object(entry)
}

pub(crate) fn function_schema_value(schema: &FunctionSchema) -> HclValue {
    let functions = schema
        .functions
        .iter()
        .map(|function| {
            let mut entry: Vec<(String, HclValue)> =
                vec![("name".to_string(), HclValue::string(&function.name))];
            if let Some(description) = &function.description {
                entry.push(("description".to_string(), HclValue::string(description)));
            }
            if !function.parameters.is_empty() {
                let parameters = function
                    .parameters
                    .iter()
                    .map(|(name, parameter)| {
                        let mut fields: Vec<(String, HclValue)> = vec![
                            (
                                "type".to_string(),
                                HclValue::string(parameter.r#type.clone().unwrap_or_default()),
                            ),
                            ("required".to_string(), HclValue::Bool(parameter.required)),
                        ];
                        if let Some(description) = &parameter.description {
                            fields.push(("description".to_string(), HclValue::string(description)));
                        }
                        (name.clone(), HclValue::Object(fields))
                    })
                    .collect();
                entry.push(("parameters".to_string(), HclValue::Object(parameters)));
            }
            HclValue::Object(entry)
        })
        .collect();

    HclValue::Object(vec![("functions".to_string(), HclValue::List(functions))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::{ActionGroupExecutor, AgentSpec, LambdaSpec, Metadata, Origin, ResourceSpec};
    use crate::registry::Registry;

    fn add(registry: &Registry, spec: ResourceSpec, name: &str) {
        registry
            .add(ResourceRecord {
                metadata: Metadata {
                    name: name.to_string(),
                    ..Default::default()
                },
                spec,
                origin: Origin::default(),
            })
            .unwrap();
    }

    #[test]
    fn resolves_agent_and_lambda_references() {
        let registry = Registry::new();
        add(&registry, ResourceSpec::Agent(AgentSpec::default()), "a1");
        add(&registry, ResourceSpec::Lambda(LambdaSpec::default()), "L1");
        add(
            &registry,
            ResourceSpec::ActionGroup(ActionGroupSpec {
                agent_id: Reference::Named("a1".into()),
                action_group_executor: Some(ActionGroupExecutor {
                    lambda: Reference::Named("L1".into()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            "ag1",
        );

        let config = Config::default();
        let ctx = EmitCtx::new(&registry, &config);
        let record = registry.get(ResourceKind::ActionGroup, "ag1").unwrap();
        let spec = match &record.spec {
            ResourceSpec::ActionGroup(spec) => spec,
            _ => unreachable!(),
        };

        let mut w = HclWriter::new();
        emit(&mut w, &ctx, &record, spec).unwrap();
        let text = w.into_string();
        assert!(text.contains("agent_id = \"${module.a1.agent_id}\""));
        assert!(text.contains("lambda = \"${module.l1.lambda_function_arn}\""));
        assert!(text.contains("agent_version = \"DRAFT\""));
    }

    #[test]
    fn missing_executor_is_an_error() {
        let registry = Registry::new();
        add(&registry, ResourceSpec::Agent(AgentSpec::default()), "a1");
        let config = Config::default();
        let ctx = EmitCtx::new(&registry, &config);

        let record = ResourceRecord {
            metadata: Metadata {
                name: "ag1".into(),
                ..Default::default()
            },
            spec: ResourceSpec::ActionGroup(ActionGroupSpec {
                agent_id: Reference::Named("a1".into()),
                ..Default::default()
            }),
            origin: Origin::default(),
        };
        let spec = match &record.spec {
            ResourceSpec::ActionGroup(spec) => spec.clone(),
            _ => unreachable!(),
        };

        let mut w = HclWriter::new();
        let err = emit(&mut w, &ctx, &record, &spec).unwrap_err();
        assert!(matches!(err, Error::MissingField { field } if field == "actionGroupExecutor"));
    }

    #[test]
    fn external_lambda_arn_passes_through() {
        let registry = Registry::new();
        add(&registry, ResourceSpec::Agent(AgentSpec::default()), "a1");
        let config = Config::default();
        let ctx = EmitCtx::new(&registry, &config);

        let record = ResourceRecord {
            metadata: Metadata {
                name: "ag1".into(),
                ..Default::default()
            },
            spec: ResourceSpec::ActionGroup(ActionGroupSpec {
                agent_id: Reference::Named("a1".into()),
                action_group_executor: Some(ActionGroupExecutor {
                    lambda_arn: Some("arn:aws:lambda:us-east-1:123:function:ext".into()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            origin: Origin::default(),
        };
        let spec = match &record.spec {
            ResourceSpec::ActionGroup(spec) => spec.clone(),
            _ => unreachable!(),
        };

        let mut w = HclWriter::new();
        emit(&mut w, &ctx, &record, &spec).unwrap();
        assert!(w
            .into_string()
            .contains("lambda = \"arn:aws:lambda:us-east-1:123:function:ext\""));
    }
}
