use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

pub mod action_group;
pub mod agent;
pub mod custom;
pub mod guardrail;
pub mod iam;
pub mod knowledge_base;
pub mod lambda;
pub mod opensearch;
pub mod prompt;

pub use action_group::{
    ActionGroupExecutor, ActionGroupSpec, ApiSchema, FunctionDef, FunctionSchema, ParameterDef,
    S3ApiSchema,
};
pub use agent::{AgentSpec, IamRoleConfig, InlineActionGroup, MemoryConfiguration, PromptOverride};
pub use custom::{AssociationSpec, CustomResourcesSpec};
pub use guardrail::GuardrailSpec;
pub use iam::{
    IamRoleSpec, InlinePolicy, ManagedPolicy, PolicyDocument, PolicyStatement, StringOrList,
};
pub use knowledge_base::{
    ChunkingConfiguration, DataSource, KnowledgeBaseSpec, OpenSearchBinding, StorageConfiguration,
};
pub use lambda::{CodeConfiguration, LambdaSpec, ResourcePolicyStatement};
pub use opensearch::{FieldMapping, OpenSearchServerlessSpec};
pub use prompt::PromptSpec;

/// The closed set of resource kinds the generator understands.
///
/// Variant order doubles as the tie-break priority when several kinds are
/// simultaneously ready during topological sorting, so the emitted artifact
/// is byte-stable run over run. Adding a kind means touching this enum, the
/// rule table in `graph.rs`, and the emitter dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum ResourceKind {
    #[serde(rename = "IAMRole")]
    IamRole,
    CustomResources,
    Guardrail,
    Prompt,
    Lambda,
    OpenSearchServerless,
    KnowledgeBase,
    ActionGroup,
    AgentKnowledgeBaseAssociation,
    Agent,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 10] = [
        ResourceKind::IamRole,
        ResourceKind::CustomResources,
        ResourceKind::Guardrail,
        ResourceKind::Prompt,
        ResourceKind::Lambda,
        ResourceKind::OpenSearchServerless,
        ResourceKind::KnowledgeBase,
        ResourceKind::ActionGroup,
        ResourceKind::AgentKnowledgeBaseAssociation,
        ResourceKind::Agent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::IamRole => "IAMRole",
            ResourceKind::CustomResources => "CustomResources",
            ResourceKind::Guardrail => "Guardrail",
            ResourceKind::Prompt => "Prompt",
            ResourceKind::Lambda => "Lambda",
            ResourceKind::OpenSearchServerless => "OpenSearchServerless",
            ResourceKind::KnowledgeBase => "KnowledgeBase",
            ResourceKind::ActionGroup => "ActionGroup",
            ResourceKind::AgentKnowledgeBaseAssociation => "AgentKnowledgeBaseAssociation",
            ResourceKind::Agent => "Agent",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub name: String,
    pub description: Option<String>,
    pub labels: std::collections::BTreeMap<String, String>,
    pub annotations: std::collections::BTreeMap<String, String>,
}

/// A field value that points at another resource.
///
/// The three states are distinct on purpose: an unset reference carries no
/// dependency, a named reference must resolve against the registry, and an
/// external literal (a foreign ARN or id not managed by this run) is passed
/// through without ever being looked up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Reference {
    #[default]
    Unset,
    Named(String),
    External(String),
}

impl Reference {
    pub fn is_set(&self) -> bool {
        !matches!(self, Reference::Unset)
    }

    pub fn as_named(&self) -> Option<&str> {
        match self {
            Reference::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Reference {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Accepts both "resource-name" and { ref: "resource-name" }.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Object { r#ref: String },
            Plain(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Plain(s) if s.trim().is_empty() => Ok(Reference::Unset),
            Raw::Plain(s) => Ok(Reference::Named(s)),
            Raw::Object { r#ref } if r#ref.trim().is_empty() => Err(serde::de::Error::custom(
                "reference object must have a non-empty 'ref' field",
            )),
            Raw::Object { r#ref } => Ok(Reference::Named(r#ref)),
        }
    }
}

/// Where a record came from, for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Origin {
    pub file: PathBuf,
    pub doc: usize,
}

#[derive(Debug, Clone)]
pub enum ResourceSpec {
    Agent(AgentSpec),
    Lambda(LambdaSpec),
    ActionGroup(ActionGroupSpec),
    KnowledgeBase(KnowledgeBaseSpec),
    Guardrail(GuardrailSpec),
    Prompt(PromptSpec),
    IamRole(IamRoleSpec),
    CustomResources(CustomResourcesSpec),
    OpenSearchServerless(OpenSearchServerlessSpec),
    Association(AssociationSpec),
}

impl ResourceSpec {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceSpec::Agent(_) => ResourceKind::Agent,
            ResourceSpec::Lambda(_) => ResourceKind::Lambda,
            ResourceSpec::ActionGroup(_) => ResourceKind::ActionGroup,
            ResourceSpec::KnowledgeBase(_) => ResourceKind::KnowledgeBase,
            ResourceSpec::Guardrail(_) => ResourceKind::Guardrail,
            ResourceSpec::Prompt(_) => ResourceKind::Prompt,
            ResourceSpec::IamRole(_) => ResourceKind::IamRole,
            ResourceSpec::CustomResources(_) => ResourceKind::CustomResources,
            ResourceSpec::OpenSearchServerless(_) => ResourceKind::OpenSearchServerless,
            ResourceSpec::Association(_) => ResourceKind::AgentKnowledgeBaseAssociation,
        }
    }
}

/// One declared resource: immutable once ingested.
#[derive(Debug, Clone)]
pub struct ResourceRecord {
    pub metadata: Metadata,
    pub spec: ResourceSpec,
    pub origin: Origin,
}

impl ResourceRecord {
    pub fn kind(&self) -> ResourceKind {
        self.spec.kind()
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}
