use crate::error::Error;
use crate::hcl::{HclValue, HclWriter};
use crate::model::{OpenSearchServerlessSpec, ResourceRecord};
use crate::resolve::sanitize_name;

use super::EmitCtx;

pub(crate) fn emit(
    w: &mut HclWriter,
    ctx: &EmitCtx<'_>,
    record: &ResourceRecord,
    spec: &OpenSearchServerlessSpec,
) -> Result<(), Error> {
    let module_name = sanitize_name(record.name());

    let collection_name = if spec.collection_name.is_empty() {
        record.name()
    } else {
        spec.collection_name.as_str()
    };

    w.open_block("module", &[&module_name]);
    w.attr_str("source", &ctx.module_source("opensearch-serverless"));
    w.attr_str("collection_name", collection_name);
    w.attr_str("type", spec.r#type.as_deref().unwrap_or("VECTORSEARCH"));

    if let Some(description) = &spec.description {
        w.attr_str("description", description);
    }

    if let Some(encryption) = &spec.encryption_policy {
        let mut entry: Vec<(String, HclValue)> = Vec::new();
        if let Some(name) = &encryption.name {
            entry.push(("name".to_string(), HclValue::string(name)));
        }
        if let Some(description) = &encryption.description {
            entry.push(("description".to_string(), HclValue::string(description)));
        }
        if let Some(kms) = &encryption.kms_key_id {
            entry.push(("kms_key_id".to_string(), HclValue::string(kms)));
        }
        w.attr("encryption_policy", HclValue::Object(entry));
    }

    if let Some(network) = &spec.network_policy {
        let mut entry: Vec<(String, HclValue)> = Vec::new();
        if let Some(name) = &network.name {
            entry.push(("name".to_string(), HclValue::string(name)));
        }
        if !network.access.is_empty() {
            let access = network
                .access
                .iter()
                .map(|rule| {
                    let mut fields: Vec<(String, HclValue)> = Vec::new();
                    if !rule.source_vpces.is_empty() {
                        fields.push((
                            "source_vpces".to_string(),
                            HclValue::string_list(&rule.source_vpces),
                        ));
                    }
                    fields.push((
                        "source_type".to_string(),
                        HclValue::string(rule.source_type.clone().unwrap_or_else(|| "public".into())),
                    ));
                    HclValue::Object(fields)
                })
                .collect();
            entry.push(("access".to_string(), HclValue::List(access)));
        }
        w.attr("network_policy", HclValue::Object(entry));
    }

    if let Some(access) = &spec.access_policy {
        let mut entry: Vec<(String, HclValue)> = Vec::new();
        if let Some(name) = &access.name {
            entry.push(("name".to_string(), HclValue::string(name)));
        }
        if !access.principals.is_empty() {
            entry.push(("principals".to_string(), HclValue::string_list(&access.principals)));
        }
        if !access.permissions.is_empty() {
            entry.push(("permissions".to_string(), HclValue::string_list(&access.permissions)));
        }
        if access.auto_configure_for_bedrock {
            entry.push(("auto_configure_for_bedrock".to_string(), HclValue::Bool(true)));
        }
        w.attr("access_policy", HclValue::Object(entry));
    }

    if let Some(index) = &spec.vector_index {
        w.attr(
            "vector_index",
            HclValue::Object(vec![
                ("name".to_string(), HclValue::string(&index.name)),
                (
                    "field_mapping".to_string(),
                    super::knowledge_base::field_mapping_value(&index.field_mapping),
                ),
            ]),
        );
    }

    if !spec.tags.is_empty() {
        w.attr("tags", HclValue::string_map(&spec.tags));
    }

    w.close_block();
    w.blank();

    tracing::debug!(collection = record.name(), "generated OpenSearch Serverless module");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::opensearch::{AccessPolicy, FieldMapping, VectorIndexConfig};
    use crate::model::{Metadata, Origin, ResourceKind, ResourceSpec};
    use crate::registry::Registry;

    #[test]
    fn collection_defaults_to_vectorsearch_and_record_name() {
        let registry = Registry::new();
        registry
            .add(ResourceRecord {
                metadata: Metadata {
                    name: "docs-collection".into(),
                    ..Default::default()
                },
                spec: ResourceSpec::OpenSearchServerless(OpenSearchServerlessSpec {
                    access_policy: Some(AccessPolicy {
                        auto_configure_for_bedrock: true,
                        ..Default::default()
                    }),
                    vector_index: Some(VectorIndexConfig {
                        name: "docs-index".into(),
                        field_mapping: FieldMapping {
                            vector_field: "vector".into(),
                            text_field: "text".into(),
                            metadata_field: "metadata".into(),
                        },
                    }),
                    ..Default::default()
                }),
                origin: Origin::default(),
            })
            .unwrap();

        let config = Config::default();
        let ctx = EmitCtx::new(&registry, &config);
        let record = registry
            .get(ResourceKind::OpenSearchServerless, "docs-collection")
            .unwrap();
        let spec = match &record.spec {
            ResourceSpec::OpenSearchServerless(spec) => spec,
            _ => unreachable!(),
        };

        let mut w = HclWriter::new();
        emit(&mut w, &ctx, &record, spec).unwrap();
        let text = w.into_string();
        assert!(text.contains("collection_name = \"docs-collection\""));
        assert!(text.contains("type = \"VECTORSEARCH\""));
        assert!(text.contains("auto_configure_for_bedrock = true"));
        assert!(text.contains("vector_field = \"vector\""));
    }
}
