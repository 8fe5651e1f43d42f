use crate::error::Error;
use crate::hcl::{HclValue, HclWriter};
use crate::model::knowledge_base::{ChunkingConfiguration, DataSource};
use crate::model::opensearch::FieldMapping;
use crate::model::{KnowledgeBaseSpec, Reference, ResourceKind, ResourceRecord};
use crate::resolve::sanitize_name;

use super::EmitCtx;

pub(crate) fn emit(
    w: &mut HclWriter,
    ctx: &EmitCtx<'_>,
    record: &ResourceRecord,
    spec: &KnowledgeBaseSpec,
) -> Result<(), Error> {
    let module_name = sanitize_name(record.name());

    w.open_block("module", &[&module_name]);
    w.attr_str("source", &ctx.module_source("bedrock-knowledge-base"));
    w.attr_str("knowledge_base_name", record.name());

    if let Some(description) = &spec.description {
        w.attr_str("description", description);
    }

    if let Some(kb_config) = &spec.knowledge_base_configuration {
        let mut entry: Vec<(String, HclValue)> =
            vec![("type".to_string(), HclValue::string(&kb_config.r#type))];
        if let Some(vector) = &kb_config.vector_knowledge_base_configuration {
            let mut vector_entry: Vec<(String, HclValue)> = vec![(
                "embedding_model_arn".to_string(),
                HclValue::string(&vector.embedding_model_arn),
            )];
            if let Some(model_config) = &vector.embedding_model_configuration {
                if let Some(dimensions) = model_config.dimensions {
                    vector_entry.push((
                        "embedding_model_configuration".to_string(),
                        HclValue::Object(vec![(
                            "dimensions".to_string(),
                            HclValue::Int(i64::from(dimensions)),
                        )]),
                    ));
                }
            }
            entry.push((
                "vector_knowledge_base_configuration".to_string(),
                HclValue::Object(vector_entry),
            ));
        }
        w.attr("knowledge_base_configuration", HclValue::Object(entry));
    }

    if let Some(storage) = &spec.storage_configuration {
        let mut entry: Vec<(String, HclValue)> =
            vec![("type".to_string(), HclValue::string(&storage.r#type))];
        if let Some(binding) = &storage.open_search_serverless {
            let mut os_entry: Vec<(String, HclValue)> = Vec::new();
            match binding.collection_ref() {
                Reference::Unset => {}
                reference => {
                    let arn = ctx.resolver.resolve(
                        &reference,
                        ResourceKind::OpenSearchServerless,
                        "collection_arn",
                    )?;
                    os_entry.push(("collection_arn".to_string(), HclValue::string(arn)));
                }
            }
            os_entry.push((
                "vector_index_name".to_string(),
                HclValue::string(&binding.vector_index_name),
            ));
            os_entry.push((
                "field_mapping".to_string(),
                field_mapping_value(&binding.field_mapping),
            ));
            entry.push((
                "opensearch_serverless_configuration".to_string(),
                HclValue::Object(os_entry),
            ));
        }
        w.attr("storage_configuration", HclValue::Object(entry));
    }

    if !spec.data_sources.is_empty() {
        let mut sources = Vec::with_capacity(spec.data_sources.len());
        for source in &spec.data_sources {
            sources.push(data_source_value(ctx, source)?);
        }
        w.attr("data_sources", HclValue::List(sources));
    }

    if !spec.tags.is_empty() {
        w.attr("tags", HclValue::string_map(&spec.tags));
    }

    w.close_block();
    w.blank();

    tracing::debug!(knowledge_base = record.name(), "generated knowledge base module");
    Ok(())
}

pub(crate) fn field_mapping_value(mapping: &FieldMapping) -> HclValue {
    HclValue::Object(vec![
        ("vector_field".to_string(), HclValue::string(&mapping.vector_field)),
        ("text_field".to_string(), HclValue::string(&mapping.text_field)),
        ("metadata_field".to_string(), HclValue::string(&mapping.metadata_field)),
    ])
}

fn data_source_value(ctx: &EmitCtx<'_>, source: &DataSource) -> Result<HclValue, Error> {
    let mut entry: Vec<(String, HclValue)> = vec![
        ("name".to_string(), HclValue::string(&source.name)),
        ("type".to_string(), HclValue::string(&source.r#type)),
    ];

    if let Some(s3) = &source.s3_configuration {
        let mut s3_entry: Vec<(String, HclValue)> =
            vec![("bucket_arn".to_string(), HclValue::string(&s3.bucket_arn))];
        if !s3.inclusion_prefixes.is_empty() {
            s3_entry.push((
                "inclusion_prefixes".to_string(),
                HclValue::string_list(&s3.inclusion_prefixes),
            ));
        }
        if !s3.exclusion_prefixes.is_empty() {
            s3_entry.push((
                "exclusion_prefixes".to_string(),
                HclValue::string_list(&s3.exclusion_prefixes),
            ));
        }
        entry.push(("s3_configuration".to_string(), HclValue::Object(s3_entry)));
    }

    if let Some(chunking) = &source.chunking_configuration {
        entry.push(("chunking_configuration".to_string(), chunking_value(chunking)));
    }

    if let Some(transform) = &source.custom_transformation {
        let mut transform_entry: Vec<(String, HclValue)> = Vec::new();
        if let Some(lambda) = &transform.transformation_lambda {
            match lambda.lambda_ref() {
                Reference::Unset => {}
                reference => {
                    let arn = ctx.resolver.resolve(
                        &reference,
                        ResourceKind::Lambda,
                        "lambda_function_arn",
                    )?;
                    transform_entry.push((
                        "transformation_lambda".to_string(),
                        HclValue::Object(vec![("lambda_arn".to_string(), HclValue::string(arn))]),
                    ));
                }
            }
        }
        if let Some(storage) = &transform.intermediate_storage {
            if let Some(location) = &storage.s3_location {
                transform_entry.push((
                    "intermediate_storage".to_string(),
                    HclValue::Object(vec![(
                        "s3_location".to_string(),
                        HclValue::Object(vec![("uri".to_string(), HclValue::string(&location.uri))]),
                    )]),
                ));
            }
        }
        entry.push(("custom_transformation".to_string(), HclValue::Object(transform_entry)));
    }

    Ok(HclValue::Object(entry))
}

fn chunking_value(chunking: &ChunkingConfiguration) -> HclValue {
    let mut entry: Vec<(String, HclValue)> = vec![(
        "chunking_strategy".to_string(),
        HclValue::string(&chunking.chunking_strategy),
    )];
    if let Some(fixed) = &chunking.fixed_size_chunking_configuration {
        entry.push((
            "fixed_size_chunking_configuration".to_string(),
            HclValue::Object(vec![
                ("max_tokens".to_string(), HclValue::Int(i64::from(fixed.max_tokens))),
                (
                    "overlap_percentage".to_string(),
                    HclValue::Int(i64::from(fixed.overlap_percentage)),
                ),
            ]),
        ));
    }
    if let Some(semantic) = &chunking.semantic_chunking_configuration {
        entry.push((
            "semantic_chunking_configuration".to_string(),
            HclValue::Object(vec![
                ("max_tokens".to_string(), HclValue::Int(i64::from(semantic.max_tokens))),
                ("buffer_size".to_string(), HclValue::Int(i64::from(semantic.buffer_size))),
                (
                    "breakpoint_percentile_threshold".to_string(),
                    HclValue::Int(i64::from(semantic.breakpoint_percentile_threshold)),
                ),
            ]),
        ));
    }
    HclValue::Object(entry)
}
