use crate::error::Error;
use crate::hcl::{json_value, HclValue, HclWriter};
use crate::model::{CustomResourcesSpec, Reference, ResourceRecord};
use crate::resolve::sanitize_name;

use super::EmitCtx;

pub(crate) fn emit(
    w: &mut HclWriter,
    ctx: &EmitCtx<'_>,
    record: &ResourceRecord,
    spec: &CustomResourcesSpec,
) -> Result<(), Error> {
    if spec.source.is_empty() {
        return Err(Error::MissingField { field: "source" });
    }

    let module_name = sanitize_name(record.name());

    w.open_block("module", &[&module_name]);

    let mut source = spec.source.clone();
    if let Some(version) = &spec.version {
        if spec.is_git_source() {
            source.push_str("?ref=");
            source.push_str(version);
        }
    }
    w.attr_str("source", &source);
    if let Some(version) = &spec.version {
        if spec.is_registry_source() {
            w.attr_str("version", version);
        }
    }

    for (name, value) in &spec.variables {
        w.attr(name, json_value(value));
    }

    if !spec.depends_on.is_empty() {
        let mut deps = Vec::new();
        for dep in &spec.depends_on {
            match dep {
                Reference::Unset => {}
                // Raw expressions the user already wrote out.
                Reference::External(expr) => deps.push(HclValue::expr(expr.clone())),
                Reference::Named(name) => {
                    if ctx.registry.kind_of(name).is_none() {
                        return Err(Error::UnknownDependency {
                            owner: record.name().to_string(),
                            name: name.clone(),
                        });
                    }
                    deps.push(HclValue::expr(format!("module.{}", sanitize_name(name))));
                }
            }
        }
        if !deps.is_empty() {
            w.attr("depends_on", HclValue::List(deps));
        }
    }

    w.close_block();
    w.blank();

    tracing::debug!(custom_resources = record.name(), "generated custom module");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::{AgentSpec, Metadata, Origin, ResourceKind, ResourceSpec};
    use crate::registry::Registry;

    fn custom(source: &str, depends_on: Vec<Reference>) -> ResourceRecord {
        ResourceRecord {
            metadata: Metadata {
                name: "extras".into(),
                ..Default::default()
            },
            spec: ResourceSpec::CustomResources(CustomResourcesSpec {
                source: source.into(),
                version: Some("v3".into()),
                variables: [(
                    "vpc_id".to_string(),
                    serde_json::Value::String("vpc-123".into()),
                )]
                .into_iter()
                .collect(),
                depends_on,
                ..Default::default()
            }),
            origin: Origin::default(),
        }
    }

    #[test]
    fn git_source_gets_ref_and_depends_on_modules() {
        let registry = Registry::new();
        registry
            .add(ResourceRecord {
                metadata: Metadata {
                    name: "order-agent".into(),
                    ..Default::default()
                },
                spec: ResourceSpec::Agent(AgentSpec::default()),
                origin: Origin::default(),
            })
            .unwrap();

        let config = Config::default();
        let ctx = EmitCtx::new(&registry, &config);
        let record = custom(
            "git::https://example.com/extras",
            vec![Reference::Named("order-agent".into())],
        );
        let spec = match &record.spec {
            ResourceSpec::CustomResources(spec) => spec.clone(),
            _ => unreachable!(),
        };

        let mut w = HclWriter::new();
        emit(&mut w, &ctx, &record, &spec).unwrap();
        let text = w.into_string();
        assert!(text.contains("source = \"git::https://example.com/extras?ref=v3\""));
        assert!(text.contains("vpc_id = \"vpc-123\""));
        assert!(text.contains("depends_on = [module.order_agent]"));
    }

    #[test]
    fn undeclared_dependency_is_rejected() {
        let registry = Registry::new();
        let config = Config::default();
        let ctx = EmitCtx::new(&registry, &config);
        let record = custom("./modules/extras", vec![Reference::Named("ghost".into())]);
        let spec = match &record.spec {
            ResourceSpec::CustomResources(spec) => spec.clone(),
            _ => unreachable!(),
        };

        let mut w = HclWriter::new();
        let err = emit(&mut w, &ctx, &record, &spec).unwrap_err();
        assert!(matches!(err, Error::UnknownDependency { ref name, .. } if name == "ghost"));
    }

    #[test]
    fn registry_source_uses_version_attribute() {
        let registry = Registry::new();
        let config = Config::default();
        let ctx = EmitCtx::new(&registry, &config);
        let record = custom("terraform-aws-modules/vpc/aws", vec![]);
        let spec = match &record.spec {
            ResourceSpec::CustomResources(spec) => spec.clone(),
            _ => unreachable!(),
        };

        let mut w = HclWriter::new();
        emit(&mut w, &ctx, &record, &spec).unwrap();
        let text = w.into_string();
        assert!(text.contains("source = \"terraform-aws-modules/vpc/aws\""));
        assert!(text.contains("version = \"v3\""));
    }

    #[test]
    fn empty_source_is_rejected() {
        let registry = Registry::new();
        let config = Config::default();
        let ctx = EmitCtx::new(&registry, &config);
        let record = custom("", vec![]);
        let spec = match &record.spec {
            ResourceSpec::CustomResources(spec) => spec.clone(),
            _ => unreachable!(),
        };
        let mut w = HclWriter::new();
        let err = emit(&mut w, &ctx, &record, &spec).unwrap_err();
        assert!(matches!(err, Error::MissingField { field } if field == "source"));
    }
}
