use std::collections::BTreeMap;

const INDENT: &str = "  ";

/// An attribute value, mirroring what the generated HCL can carry. Nested
/// objects and lists render multi-line; scalars stay inline.
#[derive(Debug, Clone, PartialEq)]
pub enum HclValue {
    String(String),
    /// Emitted verbatim, for traversals like `module.x.agent_id`.
    Expr(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<HclValue>),
    /// Entry order is preserved, so callers keep it deterministic.
    Object(Vec<(String, HclValue)>),
}

impl HclValue {
    pub fn string(value: impl Into<String>) -> Self {
        HclValue::String(value.into())
    }

    pub fn expr(value: impl Into<String>) -> Self {
        HclValue::Expr(value.into())
    }

    pub fn string_list<S: AsRef<str>>(values: &[S]) -> Self {
        HclValue::List(
            values
                .iter()
                .map(|v| HclValue::String(v.as_ref().to_string()))
                .collect(),
        )
    }

    pub fn string_map(map: &BTreeMap<String, String>) -> Self {
        HclValue::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), HclValue::String(v.clone())))
                .collect(),
        )
    }

    fn is_scalar(&self) -> bool {
        !matches!(self, HclValue::List(_) | HclValue::Object(_))
    }

    fn render(&self, depth: usize, out: &mut String) {
        match self {
            HclValue::String(s) => out.push_str(&quote(s)),
            HclValue::Expr(e) => out.push_str(e),
            HclValue::Int(n) => out.push_str(&n.to_string()),
            HclValue::Float(n) => out.push_str(&n.to_string()),
            HclValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            HclValue::List(items) => render_list(items, depth, out),
            HclValue::Object(entries) => render_object(entries, depth, out),
        }
    }
}

fn render_list(items: &[HclValue], depth: usize, out: &mut String) {
    if items.is_empty() {
        out.push_str("[]");
        return;
    }

    if items.iter().all(HclValue::is_scalar) {
        out.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            item.render(depth, out);
        }
        out.push(']');
        return;
    }

    out.push_str("[\n");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(",\n");
        }
        out.push_str(&INDENT.repeat(depth + 1));
        item.render(depth + 1, out);
    }
    out.push('\n');
    out.push_str(&INDENT.repeat(depth));
    out.push(']');
}

fn render_object(entries: &[(String, HclValue)], depth: usize, out: &mut String) {
    if entries.is_empty() {
        out.push_str("{}");
        return;
    }

    out.push_str("{\n");
    for (key, value) in entries {
        out.push_str(&INDENT.repeat(depth + 1));
        out.push_str(&object_key(key));
        out.push_str(" = ");
        value.render(depth + 1, out);
        out.push('\n');
    }
    out.push_str(&INDENT.repeat(depth));
    out.push('}');
}

/// Converts arbitrary YAML-sourced values (custom module variables, policy
/// conditions) into HCL. serde_json's map is sorted, so rendering stays
/// deterministic.
pub fn json_value(value: &serde_json::Value) -> HclValue {
    match value {
        serde_json::Value::Null => HclValue::Expr("null".to_string()),
        serde_json::Value::Bool(b) => HclValue::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                HclValue::Int(i)
            } else {
                HclValue::Float(n.as_f64().unwrap_or_default())
            }
        }
        serde_json::Value::String(s) => HclValue::String(s.clone()),
        serde_json::Value::Array(items) => HclValue::List(items.iter().map(json_value).collect()),
        serde_json::Value::Object(entries) => HclValue::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), json_value(v)))
                .collect(),
        ),
    }
}

/// Append-only writer for the generated artifact. Block depth drives
/// indentation; callers balance open/close themselves.
#[derive(Debug, Default)]
pub struct HclWriter {
    buf: String,
    depth: usize,
}

impl HclWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_string(self) -> String {
        self.buf
    }

    pub fn comment(&mut self, text: &str) {
        self.push_indent();
        self.buf.push_str("# ");
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    pub fn open_block(&mut self, keyword: &str, labels: &[&str]) {
        self.push_indent();
        self.buf.push_str(keyword);
        for label in labels {
            self.buf.push(' ');
            self.buf.push_str(&quote(label));
        }
        self.buf.push_str(" {\n");
        self.depth += 1;
    }

    pub fn close_block(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.push_indent();
        self.buf.push_str("}\n");
    }

    pub fn attr(&mut self, key: &str, value: HclValue) {
        self.push_indent();
        self.buf.push_str(key);
        self.buf.push_str(" = ");
        value.render(self.depth, &mut self.buf);
        self.buf.push('\n');
    }

    pub fn attr_str(&mut self, key: &str, value: &str) {
        self.attr(key, HclValue::string(value));
    }

    pub fn attr_expr(&mut self, key: &str, value: &str) {
        self.attr(key, HclValue::expr(value));
    }

    pub fn attr_int(&mut self, key: &str, value: i64) {
        self.attr(key, HclValue::Int(value));
    }

    pub fn attr_bool(&mut self, key: &str, value: bool) {
        self.attr(key, HclValue::Bool(value));
    }

    fn push_indent(&mut self) {
        self.buf.push_str(&INDENT.repeat(self.depth));
    }
}

/// Double-quoted HCL string. Interpolation sequences are left intact so
/// late-bound `${module...}` references survive embedding.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' | '"' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

fn object_key(key: &str) -> String {
    if is_bare_key(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

fn is_bare_key(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
