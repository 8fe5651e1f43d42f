use crate::error::Error;
use crate::hcl::{HclValue, HclWriter};
use crate::model::{GuardrailSpec, ResourceRecord};
use crate::resolve::sanitize_name;

use super::EmitCtx;

pub(crate) fn emit(
    w: &mut HclWriter,
    ctx: &EmitCtx<'_>,
    record: &ResourceRecord,
    spec: &GuardrailSpec,
) -> Result<(), Error> {
    let module_name = sanitize_name(record.name());

    w.open_block("module", &[&module_name]);
    w.attr_str("source", &ctx.module_source("bedrock-guardrail"));
    w.attr_str("guardrail_name", record.name());

    if let Some(description) = &spec.description {
        w.attr_str("description", description);
    }

    if let Some(content) = &spec.content_policy_config {
        let filters = content
            .filters_config
            .iter()
            .map(|filter| {
                HclValue::Object(vec![
                    ("type".to_string(), HclValue::string(&filter.r#type)),
                    ("input_strength".to_string(), HclValue::string(&filter.input_strength)),
                    ("output_strength".to_string(), HclValue::string(&filter.output_strength)),
                ])
            })
            .collect();
        w.attr(
            "content_policy_config",
            HclValue::Object(vec![("filters_config".to_string(), HclValue::List(filters))]),
        );
    }

    if let Some(sensitive) = &spec.sensitive_information_policy_config {
        let entities = sensitive
            .pii_entities_config
            .iter()
            .map(|entity| {
                HclValue::Object(vec![
                    ("type".to_string(), HclValue::string(&entity.r#type)),
                    ("action".to_string(), HclValue::string(&entity.action)),
                ])
            })
            .collect();
        w.attr(
            "sensitive_information_policy_config",
            HclValue::Object(vec![(
                "pii_entities_config".to_string(),
                HclValue::List(entities),
            )]),
        );
    }

    if let Some(grounding) = &spec.contextual_grounding_policy_config {
        let filters = grounding
            .filters_config
            .iter()
            .map(|filter| {
                HclValue::Object(vec![
                    ("type".to_string(), HclValue::string(&filter.r#type)),
                    ("threshold".to_string(), HclValue::Float(filter.threshold)),
                ])
            })
            .collect();
        w.attr(
            "contextual_grounding_policy_config",
            HclValue::Object(vec![("filters_config".to_string(), HclValue::List(filters))]),
        );
    }

    if let Some(topics) = &spec.topic_policy_config {
        let entries = topics
            .topics_config
            .iter()
            .map(|topic| {
                let mut entry: Vec<(String, HclValue)> = vec![
                    ("name".to_string(), HclValue::string(&topic.name)),
                    ("definition".to_string(), HclValue::string(&topic.definition)),
                    ("type".to_string(), HclValue::string(&topic.r#type)),
                ];
                if !topic.examples.is_empty() {
                    entry.push(("examples".to_string(), HclValue::string_list(&topic.examples)));
                }
                HclValue::Object(entry)
            })
            .collect();
        w.attr(
            "topic_policy_config",
            HclValue::Object(vec![("topics_config".to_string(), HclValue::List(entries))]),
        );
    }

    if let Some(words) = &spec.word_policy_config {
        let mut entry: Vec<(String, HclValue)> = Vec::new();
        if !words.words_config.is_empty() {
            let configured = words
                .words_config
                .iter()
                .map(|word| {
                    HclValue::Object(vec![("text".to_string(), HclValue::string(&word.text))])
                })
                .collect();
            entry.push(("words_config".to_string(), HclValue::List(configured)));
        }
        if !words.managed_word_lists_config.is_empty() {
            let managed = words
                .managed_word_lists_config
                .iter()
                .map(|list| {
                    HclValue::Object(vec![("type".to_string(), HclValue::string(&list.r#type))])
                })
                .collect();
            entry.push(("managed_word_lists_config".to_string(), HclValue::List(managed)));
        }
        if !entry.is_empty() {
            w.attr("word_policy_config", HclValue::Object(entry));
        }
    }

    if !spec.tags.is_empty() {
        w.attr("tags", HclValue::string_map(&spec.tags));
    }

    w.close_block();
    w.blank();

    tracing::debug!(guardrail = record.name(), "generated guardrail module");
    Ok(())
}
