use crate::error::Error;
use crate::hcl::{HclValue, HclWriter};
use crate::model::prompt::{InputVariable, PromptVariant};
use crate::model::{PromptSpec, ResourceRecord};
use crate::resolve::sanitize_name;

use super::EmitCtx;

pub(crate) fn emit(
    w: &mut HclWriter,
    ctx: &EmitCtx<'_>,
    record: &ResourceRecord,
    spec: &PromptSpec,
) -> Result<(), Error> {
    let module_name = sanitize_name(record.name());

    w.open_block("module", &[&module_name]);
    w.attr_str("source", &ctx.module_source("bedrock-prompt"));
    w.attr_str("prompt_name", record.name());

    if let Some(description) = &spec.description {
        w.attr_str("description", description);
    }
    if let Some(key) = &spec.customer_encryption_key_arn {
        w.attr_str("customer_encryption_key_arn", key);
    }
    if let Some(variant) = &spec.default_variant {
        w.attr_str("default_variant", variant);
    }

    if !spec.input_variables.is_empty() {
        w.attr("input_variables", input_variables_value(&spec.input_variables));
    }

    if !spec.variants.is_empty() {
        let variants = spec.variants.iter().map(variant_value).collect();
        w.attr("variants", HclValue::List(variants));
    }

    if !spec.tags.is_empty() {
        w.attr("tags", HclValue::string_map(&spec.tags));
    }

    w.close_block();
    w.blank();

    tracing::debug!(prompt = record.name(), "generated prompt module");
    Ok(())
}

fn input_variables_value(variables: &[InputVariable]) -> HclValue {
    HclValue::List(
        variables
            .iter()
            .map(|variable| {
                HclValue::Object(vec![("name".to_string(), HclValue::string(&variable.name))])
            })
            .collect(),
    )
}

fn variant_value(variant: &PromptVariant) -> HclValue {
    let mut entry: Vec<(String, HclValue)> = vec![
        ("name".to_string(), HclValue::string(&variant.name)),
        ("model_id".to_string(), HclValue::string(&variant.model_id)),
        ("template_type".to_string(), HclValue::string(&variant.template_type)),
    ];

    if let Some(template) = &variant.template_configuration {
        if let Some(text) = &template.text {
            let mut text_entry: Vec<(String, HclValue)> =
                vec![("text".to_string(), HclValue::string(&text.text))];
            if !text.input_variables.is_empty() {
                text_entry.push((
                    "input_variables".to_string(),
                    input_variables_value(&text.input_variables),
                ));
            }
            entry.push((
                "template_configuration".to_string(),
                HclValue::Object(vec![("text".to_string(), HclValue::Object(text_entry))]),
            ));
        }
    }

    if let Some(inference) = &variant.inference_configuration {
        if let Some(text) = &inference.text {
            let mut text_entry: Vec<(String, HclValue)> = Vec::new();
            if let Some(temperature) = text.temperature {
                text_entry.push(("temperature".to_string(), HclValue::Float(temperature)));
            }
            if let Some(top_p) = text.top_p {
                text_entry.push(("top_p".to_string(), HclValue::Float(top_p)));
            }
            if let Some(max_tokens) = text.max_tokens {
                text_entry.push(("max_tokens".to_string(), HclValue::Int(i64::from(max_tokens))));
            }
            if !text.stop_sequences.is_empty() {
                text_entry.push((
                    "stop_sequences".to_string(),
                    HclValue::string_list(&text.stop_sequences),
                ));
            }
            entry.push((
                "inference_configuration".to_string(),
                HclValue::Object(vec![("text".to_string(), HclValue::Object(text_entry))]),
            ));
        }
    }

    HclValue::Object(entry)
}
