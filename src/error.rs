use crate::model::ResourceKind;

/// Failures the generation core can produce. Everything bubbles to the
/// orchestrator unchanged; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("resource {name} of kind {kind} already exists")]
    DuplicateResource { kind: ResourceKind, name: String },

    #[error("resource {name} of kind {kind} not found in registry")]
    DanglingReference { kind: ResourceKind, name: String },

    #[error("circular dependency between kinds: {}", .stuck.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", "))]
    CyclicDependency { stuck: Vec<ResourceKind> },

    #[error("cannot resolve an unset reference (expected kind {kind})")]
    UnsetReference { kind: ResourceKind },

    #[error("{owner} depends on {name}, which is not declared in this project")]
    UnknownDependency { owner: String, name: String },

    #[error("missing required field {field}")]
    MissingField { field: &'static str },

    #[error("failed to generate {kind} {name}: {source}")]
    Emission {
        kind: ResourceKind,
        name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("generation cancelled")]
    Cancelled,
}
