use std::collections::{BTreeMap, BTreeSet};

use crate::error::Error;
use crate::model::{Reference, ResourceKind, ResourceRecord, ResourceSpec};
use crate::registry::Registry;

/// dependent kind -> the kinds it must be emitted after.
pub type KindGraph = BTreeMap<ResourceKind, BTreeSet<ResourceKind>>;

/// What a symbolic reference site expects to find on the other end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefTarget {
    /// Must exist under this specific kind.
    Kind(ResourceKind),
    /// A bare name whose owning kind is whichever one declares it
    /// (CustomResources dependsOn entries).
    AnyDeclared,
}

#[derive(Debug, Clone)]
pub(crate) struct RefSite {
    pub target: RefTarget,
    pub name: String,
}

/// The rule table: every symbolic reference a record's fields can carry.
/// External literals and unset references never produce a site. Both the
/// graph builder and reference validation walk this one table so they cannot
/// drift apart.
pub(crate) fn named_reference_sites(record: &ResourceRecord) -> Vec<RefSite> {
    let mut sites = Vec::new();
    let mut push = |target: RefTarget, reference: &Reference| {
        if let Reference::Named(name) = reference {
            sites.push(RefSite {
                target,
                name: name.clone(),
            });
        }
    };

    match &record.spec {
        ResourceSpec::Agent(spec) => {
            if let Some(guardrail) = &spec.guardrail {
                push(RefTarget::Kind(ResourceKind::Guardrail), &guardrail.name);
            }
            if let Some(iam) = &spec.iam_role {
                push(RefTarget::Kind(ResourceKind::IamRole), &iam.role_name);
            }
            for po in &spec.prompt_overrides {
                push(RefTarget::Kind(ResourceKind::Prompt), &po.prompt_ref());
            }
            for group in &spec.action_groups {
                if let Some(executor) = &group.action_group_executor {
                    push(RefTarget::Kind(ResourceKind::Lambda), &executor.lambda_ref());
                }
            }
        }
        ResourceSpec::ActionGroup(spec) => {
            push(RefTarget::Kind(ResourceKind::Agent), &spec.agent_id);
            if let Some(executor) = &spec.action_group_executor {
                push(RefTarget::Kind(ResourceKind::Lambda), &executor.lambda_ref());
            }
        }
        ResourceSpec::KnowledgeBase(spec) => {
            if let Some(storage) = &spec.storage_configuration {
                if let Some(binding) = &storage.open_search_serverless {
                    push(
                        RefTarget::Kind(ResourceKind::OpenSearchServerless),
                        &binding.collection_ref(),
                    );
                }
            }
            for source in &spec.data_sources {
                if let Some(transform) = &source.custom_transformation {
                    if let Some(lambda) = &transform.transformation_lambda {
                        push(RefTarget::Kind(ResourceKind::Lambda), &lambda.lambda_ref());
                    }
                }
            }
        }
        ResourceSpec::Association(spec) => {
            push(RefTarget::Kind(ResourceKind::Agent), &spec.agent_name);
            push(
                RefTarget::Kind(ResourceKind::KnowledgeBase),
                &spec.knowledge_base_name,
            );
        }
        ResourceSpec::Lambda(spec) => {
            push(RefTarget::Kind(ResourceKind::IamRole), &spec.role_ref());
        }
        ResourceSpec::CustomResources(spec) => {
            for dep in &spec.depends_on {
                push(RefTarget::AnyDeclared, dep);
            }
        }
        ResourceSpec::Guardrail(_)
        | ResourceSpec::Prompt(_)
        | ResourceSpec::IamRole(_)
        | ResourceSpec::OpenSearchServerless(_) => {}
    }

    sites
}

/// Derives the kind-level dependency edge set from every record's reference
/// sites. Every kind is a node even with zero instances, so the total order
/// stays stable when optional kinds are absent. Self-edges are dropped:
/// kind-granularity ordering cannot express intra-kind order, and instances
/// within a kind are already emitted sorted by name.
pub fn build_kind_graph(registry: &Registry) -> KindGraph {
    let mut graph: KindGraph = ResourceKind::ALL
        .into_iter()
        .map(|kind| (kind, BTreeSet::new()))
        .collect();

    for kind in ResourceKind::ALL {
        for record in registry.list_by_kind(kind) {
            for site in named_reference_sites(&record) {
                let dep = match site.target {
                    RefTarget::Kind(dep) => Some(dep),
                    RefTarget::AnyDeclared => registry.kind_of(&site.name),
                };
                if let Some(dep) = dep {
                    if dep != kind {
                        graph.get_mut(&kind).unwrap().insert(dep);
                    }
                }
            }
        }
    }

    graph
}

/// Kahn's algorithm over the kind graph.
///
/// In-degree of a kind is its number of unmet dependencies; the ready set is
/// a BTreeSet so simultaneous candidates leave in rule-table order, never in
/// hash order. On a cycle the error carries the exact kinds that could not
/// be scheduled, which is stable for the same input.
pub fn topo_sort(graph: &KindGraph) -> Result<Vec<ResourceKind>, Error> {
    let mut indegree: BTreeMap<ResourceKind, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<ResourceKind, Vec<ResourceKind>> = BTreeMap::new();

    for (kind, deps) in graph {
        indegree.insert(*kind, deps.len());
        dependents.entry(*kind).or_default();
    }
    for (kind, deps) in graph {
        for dep in deps {
            dependents.entry(*dep).or_default().push(*kind);
        }
    }

    let mut ready: BTreeSet<ResourceKind> = indegree
        .iter()
        .filter(|(_, n)| **n == 0)
        .map(|(k, _)| *k)
        .collect();

    let mut order = Vec::with_capacity(graph.len());
    while let Some(kind) = ready.pop_first() {
        order.push(kind);
        for dependent in &dependents[&kind] {
            let n = indegree.get_mut(dependent).unwrap();
            *n -= 1;
            if *n == 0 {
                ready.insert(*dependent);
            }
        }
    }

    if order.len() != graph.len() {
        let stuck: Vec<ResourceKind> = indegree
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(k, _)| *k)
            .collect();
        return Err(Error::CyclicDependency { stuck });
    }

    Ok(order)
}
