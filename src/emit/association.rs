use crate::error::Error;
use crate::hcl::HclWriter;
use crate::model::{AssociationSpec, ResourceKind, ResourceRecord};
use crate::resolve::sanitize_name;

use super::EmitCtx;

pub(crate) fn emit(
    w: &mut HclWriter,
    ctx: &EmitCtx<'_>,
    record: &ResourceRecord,
    spec: &AssociationSpec,
) -> Result<(), Error> {
    if !spec.agent_name.is_set() {
        return Err(Error::MissingField { field: "agentName" });
    }
    if !spec.knowledge_base_name.is_set() {
        return Err(Error::MissingField {
            field: "knowledgeBaseName",
        });
    }

    let module_name = sanitize_name(record.name());

    w.open_block("module", &[&module_name]);
    w.attr_str(
        "source",
        &ctx.module_source("bedrock-agent-knowledge-base-association"),
    );
    w.attr_str("association_name", record.name());

    let agent_id = ctx
        .resolver
        .resolve(&spec.agent_name, ResourceKind::Agent, "agent_id")?;
    w.attr_str("agent_id", &agent_id);

    let knowledge_base_id = ctx.resolver.resolve(
        &spec.knowledge_base_name,
        ResourceKind::KnowledgeBase,
        "knowledge_base_id",
    )?;
    w.attr_str("knowledge_base_id", &knowledge_base_id);

    if let Some(description) = &spec.description {
        w.attr_str("description", description);
    }
    if let Some(state) = &spec.state {
        w.attr_str("state", state);
    }

    w.close_block();
    w.blank();

    tracing::debug!(association = record.name(), "generated agent knowledge base association module");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::{
        AgentSpec, KnowledgeBaseSpec, Metadata, Origin, Reference, ResourceSpec,
    };
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
    fn resolves_both_sides_of_the_association() {
        let registry = Registry::new();
        add(&registry, ResourceSpec::Agent(AgentSpec::default()), "a1");
        add(
            &registry,
            ResourceSpec::KnowledgeBase(KnowledgeBaseSpec::default()),
            "kb1",
        );
        add(
            &registry,
            ResourceSpec::Association(AssociationSpec {
                agent_name: Reference::Named("a1".into()),
                knowledge_base_name: Reference::Named("kb1".into()),
                ..Default::default()
            }),
            "assoc1",
        );

        let config = Config::default();
        let ctx = EmitCtx::new(&registry, &config);
        let record = registry
            .get(ResourceKind::AgentKnowledgeBaseAssociation, "assoc1")
            .unwrap();
        let spec = match &record.spec {
            ResourceSpec::Association(spec) => spec,
            _ => unreachable!(),
        };

        let mut w = HclWriter::new();
        emit(&mut w, &ctx, &record, spec).unwrap();
        let text = w.into_string();
        assert!(text.contains("agent_id = \"${module.a1.agent_id}\""));
        assert!(text.contains("knowledge_base_id = \"${module.kb1.knowledge_base_id}\""));
    }

    #[test]
    fn missing_knowledge_base_reference_is_rejected() {
        let registry = Registry::new();
        add(&registry, ResourceSpec::Agent(AgentSpec::default()), "a1");
        let config = Config::default();
        let ctx = EmitCtx::new(&registry, &config);

        let record = ResourceRecord {
            metadata: Metadata {
                name: "assoc1".into(),
                ..Default::default()
            },
            spec: ResourceSpec::Association(AssociationSpec {
                agent_name: Reference::Named("a1".into()),
                ..Default::default()
            }),
            origin: Origin::default(),
        };
        let spec = match &record.spec {
            ResourceSpec::Association(spec) => spec.clone(),
            _ => unreachable!(),
        };

        let mut w = HclWriter::new();
        let err = emit(&mut w, &ctx, &record, &spec).unwrap_err();
        assert!(matches!(err, Error::MissingField { field } if field == "knowledgeBaseName"));
    }
}
