use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::Value;

use crate::model::{Metadata, Origin, ResourceKind, ResourceRecord, ResourceSpec};
use crate::registry::Registry;

#[derive(Debug, Clone, Copy, Default)]
pub struct IngestSummary {
    pub files: usize,
    pub resources: usize,
}

/// Scan `root`, parse every YAML file, and insert all declared resources.
/// The first parse or duplicate-name error aborts ingestion; a half-built
/// registry never reaches generation.
pub fn ingest_dir(registry: &Registry, root: &Path) -> Result<IngestSummary> {
    let files = scan_yaml_files(root)?;
    let mut resources = 0usize;

    for file in &files {
        for record in parse_file(file)? {
            registry
                .add(record)
                .with_context(|| format!("while ingesting {}", file.display()))?;
            resources += 1;
        }
    }

    tracing::info!(files = files.len(), resources, "completed directory scan");
    Ok(IngestSummary {
        files: files.len(),
        resources,
    })
}

/// All *.yml / *.yaml files under `root`, sorted, hidden directories skipped.
pub fn scan_yaml_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();

    for pattern in ["**/*.yml", "**/*.yaml"] {
        let full = root.join(pattern);
        let pattern = full.to_string_lossy().into_owned();
        for entry in
            glob::glob(&pattern).with_context(|| format!("invalid scan pattern: {pattern}"))?
        {
            let path = entry?;
            let rel = path.strip_prefix(root).unwrap_or(&path);
            let hidden = rel.components().any(|c| {
                matches!(c, Component::Normal(part) if part.to_string_lossy().starts_with('.'))
            });
            if !hidden {
                out.push(path);
            }
        }
    }

    out.sort();
    out.dedup();
    Ok(out)
}

pub fn parse_file(path: &Path) -> Result<Vec<ResourceRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_content(&content, path)
}

/// Parse a (possibly multi-document) YAML string into records. Documents
/// that are empty or null are skipped; anything else must be a resource.
pub fn parse_content(content: &str, path: &Path) -> Result<Vec<ResourceRecord>> {
    let mut records = Vec::new();

    for (doc_index, doc) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let value = Value::deserialize(doc)
            .with_context(|| format!("{}: document {doc_index} is not valid YAML", path.display()))?;
        if value.is_null() {
            continue;
        }
        let record = parse_document(value, path, doc_index)
            .with_context(|| format!("{}: document {doc_index}", path.display()))?;
        records.push(record);
    }

    tracing::debug!(file = %path.display(), count = records.len(), "parsed resources from file");
    Ok(records)
}

fn parse_document(value: Value, path: &Path, doc_index: usize) -> Result<ResourceRecord> {
    let Some(kind_value) = value.get("kind") else {
        bail!("resource kind is required");
    };
    let kind: ResourceKind =
        serde_yaml::from_value(kind_value.clone()).context("unrecognized resource kind")?;

    let metadata: Metadata = serde_yaml::from_value(
        value.get("metadata").cloned().unwrap_or(Value::Null),
    )
    .context("resource metadata is required")?;
    if metadata.name.trim().is_empty() {
        bail!("metadata.name must not be empty");
    }

    let spec_value = value
        .get("spec")
        .cloned()
        .unwrap_or_else(|| Value::Mapping(Default::default()));

    let spec = match kind {
        ResourceKind::Agent => ResourceSpec::Agent(spec_of(spec_value, kind)?),
        ResourceKind::Lambda => ResourceSpec::Lambda(spec_of(spec_value, kind)?),
        ResourceKind::ActionGroup => ResourceSpec::ActionGroup(spec_of(spec_value, kind)?),
        ResourceKind::KnowledgeBase => ResourceSpec::KnowledgeBase(spec_of(spec_value, kind)?),
        ResourceKind::Guardrail => ResourceSpec::Guardrail(spec_of(spec_value, kind)?),
        ResourceKind::Prompt => ResourceSpec::Prompt(spec_of(spec_value, kind)?),
        ResourceKind::IamRole => ResourceSpec::IamRole(spec_of(spec_value, kind)?),
        ResourceKind::CustomResources => ResourceSpec::CustomResources(spec_of(spec_value, kind)?),
        ResourceKind::OpenSearchServerless => {
            ResourceSpec::OpenSearchServerless(spec_of(spec_value, kind)?)
        }
        ResourceKind::AgentKnowledgeBaseAssociation => {
            ResourceSpec::Association(spec_of(spec_value, kind)?)
        }
    };

    Ok(ResourceRecord {
        metadata,
        spec,
        origin: Origin {
            file: path.to_path_buf(),
            doc: doc_index,
        },
    })
}

fn spec_of<T: DeserializeOwned>(value: Value, kind: ResourceKind) -> Result<T> {
    serde_yaml::from_value(value).with_context(|| format!("failed to parse {kind} spec"))
}
