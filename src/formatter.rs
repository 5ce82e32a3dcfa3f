use crate::ast::{Document, Pair, Value};
use crate::error::EncodingError;
use std::collections::HashSet;

type Result<T> = std::result::Result<T, EncodingError>;

pub const DEFAULT_INDENT: usize = 3;
pub const DEFAULT_MAX_DEPTH: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Spaces per nesting level.
    pub indent_width: usize,
    /// Emit object keys in ascending order instead of insertion order.
    pub sort_keys: bool,
    /// Escape everything outside printable ASCII as `\uXXXX`.
    /// Off by default so output stays UTF-8, unlike Python's `json.dumps`.
    pub ensure_ascii: bool,
    pub max_depth: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_width: DEFAULT_INDENT,
            sort_keys: true,
            ensure_ascii: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

pub struct Formatter {
    depth: usize,
    options: FormatOptions,
}

impl Formatter {
    pub fn new(options: FormatOptions) -> Self {
        Self { depth: 0, options }
    }
    fn indent(&self) -> String {
        " ".repeat(self.options.indent_width).repeat(self.depth)
    }
    fn format_string(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 2);
        out.push('"');
        for ch in s.chars() {
            match ch {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '\u{8}' => out.push_str("\\b"),
                '\u{c}' => out.push_str("\\f"),
                c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
                c if self.options.ensure_ascii && !(' '..='~').contains(&c) => {
                    let mut units = [0u16; 2];
                    for unit in c.encode_utf16(&mut units) {
                        out.push_str(&format!("\\u{:04x}", unit));
                    }
                }
                c => out.push(c),
            }
        }
        out.push('"');
        out
    }
    fn format_float(&self, x: f64) -> Result<String> {
        if !x.is_finite() {
            return Err(EncodingError::NonFiniteNumber(x));
        }
        // `{:?}` keeps the `.0` of integral floats
        Ok(format!("{:?}", x))
    }
    fn check_depth(&self) -> Result<()> {
        if self.depth >= self.options.max_depth {
            return Err(EncodingError::DepthLimitExceeded {
                limit: self.options.max_depth,
            });
        }
        Ok(())
    }
    fn ordered<'a>(&self, pairs: &'a [Pair]) -> Result<Vec<&'a Pair>> {
        let mut seen = HashSet::with_capacity(pairs.len());
        for p in pairs {
            if !seen.insert(&p.key) {
                return Err(EncodingError::DuplicateKey(p.key.to_string()));
            }
        }
        let mut ordered: Vec<&Pair> = pairs.iter().collect();
        if self.options.sort_keys {
            ordered.sort_by(|a, b| a.key.cmp(&b.key));
        }
        Ok(ordered)
    }
    fn format_object(&mut self, pairs: &[Pair]) -> Result<String> {
        self.check_depth()?;
        if pairs.is_empty() {
            return Ok(String::from("{}"));
        }
        let ordered = self.ordered(pairs)?;
        let open_brace = '{';
        self.depth += 1;
        let inner = ordered
            .into_iter()
            .map(|p| -> Result<String> {
                let value = self.format(&p.value)?;
                Ok(format!(
                    "{}{}: {}",
                    self.indent(),
                    self.format_string(&p.key.0),
                    value
                ))
            })
            .collect::<Result<Vec<String>>>();
        self.depth -= 1;
        let inner = inner?.join(",\n");
        let close_brace = format!("{}}}", self.indent());
        Ok(format!("{}\n{}\n{}", open_brace, inner, close_brace))
    }
    fn format_array(&mut self, values: &[Value]) -> Result<String> {
        self.check_depth()?;
        if values.is_empty() {
            return Ok(String::from("[]"));
        }
        let open_bracket = '[';
        self.depth += 1;
        let inner = values
            .iter()
            .map(|v| -> Result<String> {
                let value = self.format(v)?;
                Ok(format!("{}{}", self.indent(), value))
            })
            .collect::<Result<Vec<String>>>();
        self.depth -= 1;
        let inner = inner?.join(",\n");
        let close_bracket = format!("{}]", self.indent());
        Ok(format!("{}\n{}\n{}", open_bracket, inner, close_bracket))
    }
    pub fn format(&mut self, v: &Value) -> Result<String> {
        match v {
            Value::Null => Ok(String::from("null")),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Integer(n) => Ok(n.to_string()),
            Value::Float(x) => self.format_float(*x),
            Value::String(s) => Ok(self.format_string(s)),
            Value::Object(pairs) => self.format_object(pairs),
            Value::Array(values) => self.format_array(values),
        }
    }
    pub fn format_document(&mut self, doc: &Document) -> Result<String> {
        self.format_object(doc.pairs())
    }
}
