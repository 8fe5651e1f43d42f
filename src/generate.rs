use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::emit::{self, EmitCtx};
use crate::error::Error;
use crate::graph::{build_kind_graph, topo_sort};
use crate::hcl::{HclValue, HclWriter};
use crate::model::{ResourceKind, ResourceSpec};
use crate::registry::Registry;
use crate::resolve::sanitize_name;

/// Cooperative cancellation for a caller that wants to abort between stages.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Drives one full generation pass over an ingested registry.
///
/// The pipeline is linear and fail-fast: graph, order, preamble, generated
/// execution roles, every kind in dependency order with instances sorted by
/// name, trailing outputs. The first error aborts the run and nothing is
/// handed back, so callers never commit a partial artifact.
pub struct Generator<'a> {
    registry: &'a Registry,
    config: &'a Config,
    cancel: CancelFlag,
}

impl<'a> Generator<'a> {
    pub fn new(registry: &'a Registry, config: &'a Config) -> Self {
        Self {
            registry,
            config,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn generate(&self) -> Result<String, Error> {
        tracing::info!("starting artifact generation");

        let graph = build_kind_graph(self.registry);
        let order = topo_sort(&graph)?;
        tracing::debug!(
            order = %order.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(" -> "),
            "computed emission order"
        );

        let ctx = EmitCtx::new(self.registry, self.config);
        let mut w = HclWriter::new();

        self.emit_preamble(&mut w);

        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.emit_generated_roles(&mut w, &ctx);

        for kind in order {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            for record in self.registry.list_by_kind(kind) {
                emit::emit_resource(&mut w, &ctx, &record)?;
            }
        }

        self.emit_outputs(&mut w);

        tracing::info!(
            resources = self.registry.total_count(),
            "artifact generation complete"
        );
        Ok(w.into_string())
    }

    fn emit_preamble(&self, w: &mut HclWriter) {
        w.open_block("terraform", &[]);
        w.open_block("required_providers", &[]);
        w.attr(
            "aws",
            HclValue::Object(vec![
                ("source".to_string(), HclValue::string("hashicorp/aws")),
                ("version".to_string(), HclValue::string("~> 5.0")),
            ]),
        );
        w.close_block();
        w.attr_str("required_version", ">= 1.0");
        w.close_block();
        w.blank();

        w.open_block("provider", &["aws"]);
        w.open_block("default_tags", &[]);
        w.attr(
            "tags",
            HclValue::Object(vec![
                ("Project".to_string(), HclValue::string(&self.config.project.name)),
                (
                    "Environment".to_string(),
                    HclValue::string(&self.config.project.environment),
                ),
                ("ManagedBy".to_string(), HclValue::string("basalt")),
            ]),
        );
        w.close_block();
        w.close_block();
        w.blank();

        w.open_block("variable", &["project_name"]);
        w.attr_str("description", "Name of the project");
        w.attr_expr("type", "string");
        w.attr_str("default", &self.config.project.name);
        w.close_block();
        w.blank();

        w.open_block("variable", &["environment"]);
        w.attr_str("description", "Environment name");
        w.attr_expr("type", "string");
        w.attr_str("default", &self.config.project.environment);
        w.close_block();
        w.blank();
    }

    /// Execution roles the system declares on behalf of agents that did not
    /// bring their own.
    fn emit_generated_roles(&self, w: &mut HclWriter, ctx: &EmitCtx<'_>) {
        for record in self.registry.list_by_kind(ResourceKind::Agent) {
            if let ResourceSpec::Agent(spec) = &record.spec {
                if spec.needs_generated_role() {
                    emit::iam_role::emit_generated_role(
                        w,
                        ctx,
                        record.name(),
                        spec.iam_role.as_ref(),
                    );
                }
            }
        }
    }

    fn emit_outputs(&self, w: &mut HclWriter) {
        for record in self.registry.list_by_kind(ResourceKind::Agent) {
            let sanitized = sanitize_name(record.name());

            w.open_block("output", &[&format!("{sanitized}_agent_id")]);
            w.attr_str("description", &format!("ID of the {} agent", record.name()));
            w.attr_expr("value", &format!("module.{sanitized}.agent_id"));
            w.close_block();
            w.blank();

            w.open_block("output", &[&format!("{sanitized}_agent_arn")]);
            w.attr_str("description", &format!("ARN of the {} agent", record.name()));
            w.attr_expr("value", &format!("module.{sanitized}.agent_arn"));
            w.close_block();
            w.blank();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::agent::GuardrailAttachment;
    use crate::model::{
        AgentSpec, GuardrailSpec, Metadata, Origin, Reference, ResourceRecord,
    };

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

    fn agent_with_guardrail(guardrail: &str) -> ResourceSpec {
        ResourceSpec::Agent(AgentSpec {
            foundation_model: "anthropic.claude-3-sonnet".into(),
            instruction: "help".into(),
            guardrail: Some(GuardrailAttachment {
                name: Reference::Named(guardrail.into()),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    #[test]
    fn guardrail_module_is_emitted_before_its_agent() {
        let registry = Registry::new();
        add(&registry, ResourceSpec::Guardrail(GuardrailSpec::default()), "g1");
        add(&registry, agent_with_guardrail("g1"), "a1");

        let config = Config::default();
        let artifact = Generator::new(&registry, &config).generate().unwrap();

        let guardrail_at = artifact.find("module \"g1\"").unwrap();
        let agent_at = artifact.find("module \"a1\" {").unwrap();
        assert!(guardrail_at < agent_at);

        assert!(artifact.contains("terraform {"));
        assert!(artifact.contains("provider \"aws\""));
        assert!(artifact.contains("module \"a1_execution_role\""));
        assert!(artifact.contains("output \"a1_agent_id\""));
        assert!(artifact.contains("output \"a1_agent_arn\""));
    }

    #[test]
    fn generation_is_byte_identical_across_runs() {
        let registry = Registry::new();
        add(&registry, ResourceSpec::Guardrail(GuardrailSpec::default()), "g1");
        add(&registry, agent_with_guardrail("g1"), "a1");

        let config = Config::default();
        let first = Generator::new(&registry, &config).generate().unwrap();
        let second = Generator::new(&registry, &config).generate().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn dangling_reference_aborts_with_resource_identity() {
        let registry = Registry::new();
        add(&registry, agent_with_guardrail("ghost"), "a1");

        let config = Config::default();
        let err = Generator::new(&registry, &config).generate().unwrap_err();
        match err {
            Error::Emission { kind, name, source } => {
                assert_eq!(kind, ResourceKind::Agent);
                assert_eq!(name, "a1");
                assert!(matches!(*source, Error::DanglingReference { ref name, .. }
                    if name == "ghost"));
            }
            other => panic!("expected Emission, got {other:?}"),
        }
    }

    #[test]
    fn cancellation_aborts_the_run() {
        let registry = Registry::new();
        add(&registry, ResourceSpec::Guardrail(GuardrailSpec::default()), "g1");

        let config = Config::default();
        let cancel = CancelFlag::new();
        cancel.cancel();
        let err = Generator::new(&registry, &config)
            .with_cancel(cancel)
            .generate()
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn instances_within_a_kind_are_sorted_by_name() {
        let registry = Registry::new();
        add(&registry, ResourceSpec::Guardrail(GuardrailSpec::default()), "zeta");
        add(&registry, ResourceSpec::Guardrail(GuardrailSpec::default()), "alpha");

        let config = Config::default();
        let artifact = Generator::new(&registry, &config).generate().unwrap();
        assert!(artifact.find("module \"alpha\"").unwrap() < artifact.find("module \"zeta\"").unwrap());
    }
}
