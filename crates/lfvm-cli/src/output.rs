//! Output formatting
//!
//! Every command reports through [`Output`]: key/value fields for `--json`
//! mode and plain text lines otherwise.

use serde_json::Value;
use std::collections::BTreeMap;

/// Output builder for formatted CLI output
pub struct Output {
    json_mode: bool,
    fields: BTreeMap<String, Value>,
    lines: Vec<String>,
}

impl Output {
    /// Create a new output builder
    pub fn new(json_mode: bool) -> Self {
        Self {
            json_mode,
            fields: BTreeMap::new(),
            lines: Vec::new(),
        }
    }

    /// Add a string field
    pub fn field(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    /// Add a u64 field
    pub fn field_u64(mut self, key: &str, value: u64) -> Self {
        self.fields.insert(key.to_string(), Value::Number(value.into()));
        self
    }

    /// Add a boolean field
    pub fn field_bool(mut self, key: &str, value: bool) -> Self {
        self.fields.insert(key.to_string(), Value::Bool(value));
        self
    }

    /// Add a byte string field, hex encoded with a `0x` prefix
    pub fn field_hex(self, key: &str, bytes: &[u8]) -> Self {
        let encoded = format!("0x{}", hex::encode(bytes));
        self.field(key, &encoded)
    }

    /// Add an arbitrary JSON value
    pub fn field_value(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Append a line of human-readable text
    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.lines.push(text.into());
        self
    }

    /// Print to stdout
    pub fn print(self) {
        println!("{}", self.render());
    }

    fn render(&self) -> String {
        if self.json_mode {
            serde_json::to_string_pretty(&self.fields).unwrap_or_default()
        } else {
            self.lines.join("\n")
        }
    }
}
