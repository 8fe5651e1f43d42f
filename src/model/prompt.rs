use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PromptSpec {
    pub description: Option<String>,
    pub customer_encryption_key_arn: Option<String>,
    pub default_variant: Option<String>,
    pub input_variables: Vec<InputVariable>,
    pub variants: Vec<PromptVariant>,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputVariable {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PromptVariant {
    pub name: String,
    pub model_id: String,
    pub template_type: String,
    pub template_configuration: Option<TemplateConfiguration>,
    pub inference_configuration: Option<InferenceConfiguration>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TemplateConfiguration {
    pub text: Option<TextTemplate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextTemplate {
    pub text: String,
    pub input_variables: Vec<InputVariable>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InferenceConfiguration {
    pub text: Option<TextInference>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextInference {
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub max_tokens: Option<u32>,
    pub stop_sequences: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prompt_variants() {
        let yaml = r#"
defaultVariant: main
variants:
  - name: main
    modelId: anthropic.claude-3-haiku
    templateType: TEXT
    templateConfiguration:
      text:
        text: "Answer about {{topic}}."
        inputVariables:
          - name: topic
    inferenceConfiguration:
      text:
        temperature: 0.2
        maxTokens: 512
"#;
        let spec: PromptSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.default_variant.as_deref(), Some("main"));
        let variant = &spec.variants[0];
        assert_eq!(variant.template_type, "TEXT");
        let text = variant.template_configuration.as_ref().unwrap().text.as_ref().unwrap();
        assert_eq!(text.input_variables[0].name, "topic");
    }
}
