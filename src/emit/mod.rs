use crate::config::Config;
use crate::error::Error;
use crate::hcl::HclWriter;
use crate::model::{ResourceRecord, ResourceSpec};
use crate::registry::Registry;
use crate::resolve::Resolver;

pub mod action_group;
pub mod agent;
pub mod association;
pub mod custom;
pub mod guardrail;
pub mod iam_role;
pub mod knowledge_base;
pub mod lambda;
pub mod opensearch;
pub mod prompt;

/// What every per-kind emitter gets to work with: read access to the
/// registry, the reference resolver over it, and the generation config.
pub struct EmitCtx<'a> {
    pub registry: &'a Registry,
    pub resolver: Resolver<'a>,
    pub config: &'a Config,
}

impl<'a> EmitCtx<'a> {
    pub fn new(registry: &'a Registry, config: &'a Config) -> Self {
        Self {
            registry,
            resolver: Resolver::new(registry),
            config,
        }
    }

    /// Terraform source address for one of our wrapped modules.
    pub(crate) fn module_source(&self, module: &str) -> String {
        let mut source = format!("{}//modules/{}", self.config.modules.registry, module);
        if let Some(version) = &self.config.modules.version {
            if !version.is_empty() {
                source.push_str("?ref=");
                source.push_str(version);
            }
        }
        source
    }
}

/// Hands one record to its kind's emitter; any failure comes back wrapped
/// with the resource identity so the caller can say which declaration broke
/// the run.
pub fn emit_resource(
    w: &mut HclWriter,
    ctx: &EmitCtx<'_>,
    record: &ResourceRecord,
) -> Result<(), Error> {
    let result = match &record.spec {
        ResourceSpec::Agent(spec) => agent::emit(w, ctx, record, spec),
        ResourceSpec::Lambda(spec) => lambda::emit(w, ctx, record, spec),
        ResourceSpec::ActionGroup(spec) => action_group::emit(w, ctx, record, spec),
        ResourceSpec::KnowledgeBase(spec) => knowledge_base::emit(w, ctx, record, spec),
        ResourceSpec::Guardrail(spec) => guardrail::emit(w, ctx, record, spec),
        ResourceSpec::Prompt(spec) => prompt::emit(w, ctx, record, spec),
        ResourceSpec::IamRole(spec) => iam_role::emit(w, ctx, record, spec),
        ResourceSpec::CustomResources(spec) => custom::emit(w, ctx, record, spec),
        ResourceSpec::OpenSearchServerless(spec) => opensearch::emit(w, ctx, record, spec),
        ResourceSpec::Association(spec) => association::emit(w, ctx, record, spec),
    };

    result.map_err(|source| Error::Emission {
        kind: record.kind(),
        name: record.name().to_string(),
        source: Box::new(source),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AgentSpec, Metadata, Origin, ResourceKind, Reference};
    use crate::model::agent::GuardrailAttachment;

    #[test]
    fn module_source_carries_registry_and_version() {
        let registry = Registry::new();
        let mut config = Config::default();
        config.modules.registry = "git::https://example.com/modules".into();
        config.modules.version = Some("v2.1.0".into());
        let ctx = EmitCtx::new(&registry, &config);
        assert_eq!(
            ctx.module_source("bedrock-agent"),
            "git::https://example.com/modules//modules/bedrock-agent?ref=v2.1.0"
        );

        config.modules.version = None;
        let ctx = EmitCtx::new(&registry, &config);
        assert_eq!(
            ctx.module_source("iam-role"),
            "git::https://example.com/modules//modules/iam-role"
        );
    }

    #[test]
    fn emitter_failures_carry_resource_identity() {
        let registry = Registry::new();
        let config = Config::default();
        let ctx = EmitCtx::new(&registry, &config);
        let record = ResourceRecord {
            metadata: Metadata {
                name: "order-agent".into(),
                ..Default::default()
            },
            spec: crate::model::ResourceSpec::Agent(AgentSpec {
                guardrail: Some(GuardrailAttachment {
                    name: Reference::Named("missing".into()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            origin: Origin::default(),
        };

        let mut w = HclWriter::new();
        let err = emit_resource(&mut w, &ctx, &record).unwrap_err();
        match err {
            Error::Emission { kind, name, source } => {
                assert_eq!(kind, ResourceKind::Agent);
                assert_eq!(name, "order-agent");
                assert!(matches!(*source, Error::DanglingReference { .. }));
            }
            other => panic!("expected Emission, got {other:?}"),
        }
    }
}
