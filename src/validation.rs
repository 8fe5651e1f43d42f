use std::fmt;

use regex::Regex;

use crate::graph::{named_reference_sites, RefTarget};
use crate::model::ResourceKind;
use crate::registry::Registry;

const NAME_PATTERN: &str = r"^[a-z][a-z0-9-]*$";
const NAME_MAX_LEN: usize = 63;

/// One finding against a declared resource. Validation accumulates all of
/// them instead of stopping at the first, since findings on unrelated
/// resources are independent.
#[derive(Debug, Clone)]
pub struct Issue {
    pub kind: ResourceKind,
    pub name: String,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.name, self.message)
    }
}

pub fn validate(registry: &Registry) -> Vec<Issue> {
    let mut issues = check_references(registry);
    issues.extend(check_names(registry));
    issues
}

/// Every symbolic reference must point at a declared resource of the
/// expected kind; dependsOn names must be owned by some kind.
pub fn check_references(registry: &Registry) -> Vec<Issue> {
    let mut issues = Vec::new();

    for kind in ResourceKind::ALL {
        for record in registry.list_by_kind(kind) {
            for site in named_reference_sites(&record) {
                let message = match site.target {
                    RefTarget::Kind(expected) => {
                        if registry.exists(expected, &site.name) {
                            continue;
                        }
                        format!("references non-existent {} {}", expected, site.name)
                    }
                    RefTarget::AnyDeclared => {
                        if registry.kind_of(&site.name).is_some() {
                            continue;
                        }
                        format!("depends on {}, which is not declared", site.name)
                    }
                };
                issues.push(Issue {
                    kind,
                    name: record.name().to_string(),
                    message,
                });
            }
        }
    }

    issues
}

/// Resource names must be lowercase kebab-case and short enough to survive
/// the AWS name length limits after prefixing.
pub fn check_names(registry: &Registry) -> Vec<Issue> {
    let pattern = Regex::new(NAME_PATTERN).unwrap();
    let mut issues = Vec::new();

    for kind in ResourceKind::ALL {
        for record in registry.list_by_kind(kind) {
            let name = record.name();
            if !pattern.is_match(name) {
                issues.push(Issue {
                    kind,
                    name: name.to_string(),
                    message: format!("name must match {NAME_PATTERN}"),
                });
            }
            if name.len() > NAME_MAX_LEN {
                issues.push(Issue {
                    kind,
                    name: name.to_string(),
                    message: format!("name exceeds {NAME_MAX_LEN} characters"),
                });
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::agent::GuardrailAttachment;
    use crate::model::{
        AgentSpec, CustomResourcesSpec, GuardrailSpec, Metadata, Origin, Reference,
        ResourceRecord, ResourceSpec,
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

    #[test]
    fn dangling_guardrail_reference_is_reported() {
        let registry = Registry::new();
        add(
            &registry,
            ResourceSpec::Agent(AgentSpec {
                guardrail: Some(GuardrailAttachment {
                    name: Reference::Named("ghost".into()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            "a1",
        );

        let issues = check_references(&registry);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, ResourceKind::Agent);
        assert!(issues[0].message.contains("non-existent Guardrail ghost"));
    }

    #[test]
    fn satisfied_references_produce_no_issues() {
        let registry = Registry::new();
        add(&registry, ResourceSpec::Guardrail(GuardrailSpec::default()), "g1");
        add(
            &registry,
            ResourceSpec::Agent(AgentSpec {
                guardrail: Some(GuardrailAttachment {
                    name: Reference::Named("g1".into()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            "a1",
        );
        assert!(check_references(&registry).is_empty());
    }

    #[test]
    fn undeclared_depends_on_is_reported() {
        let registry = Registry::new();
        add(
            &registry,
            ResourceSpec::CustomResources(CustomResourcesSpec {
                source: "./modules/extras".into(),
                depends_on: vec![Reference::Named("ghost".into())],
                ..Default::default()
            }),
            "extras",
        );

        let issues = check_references(&registry);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("depends on ghost"));
    }

    #[test]
    fn bad_names_are_reported() {
        let registry = Registry::new();
        add(&registry, ResourceSpec::Agent(AgentSpec::default()), "Bad_Name");
        add(&registry, ResourceSpec::Agent(AgentSpec::default()), "good-name");

        let issues = check_names(&registry);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].name, "Bad_Name");
    }

    #[test]
    fn overlong_names_are_reported() {
        let registry = Registry::new();
        let long = format!("a{}", "b".repeat(70));
        add(&registry, ResourceSpec::Agent(AgentSpec::default()), &long);
        let issues = check_names(&registry);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("63"));
    }
}
