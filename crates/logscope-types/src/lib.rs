//! Shared types for logscope
//!
//! This crate contains data structures used across multiple logscope crates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Rule Types
// ============================================================================

/// Operator names understood by the built-in rule set.
pub mod ops {
    pub const NOT: &str = "not";
    pub const OR: &str = "or";
    pub const AND: &str = "and";
    pub const CONTAINS: &str = "contains";
}

/// A serialized filter rule: an operator name plus an operator-specific operand.
///
/// Rules nest through the operand: `not` carries a single rule object, `or`
/// and `and` carry arrays of rule objects, `contains` carries a string. The
/// operand shape is only checked when the node is evaluated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Operator name, resolved against the rule registry at evaluation time
    #[serde(rename = "Op")]
    pub op: String,

    /// Operator-specific operand; absent operands decode as null
    #[serde(rename = "Data", default)]
    pub data: Value,
}

impl Rule {
    /// Create a rule from an operator name and a raw operand
    pub fn new(op: impl Into<String>, data: Value) -> Self {
        Self {
            op: op.into(),
            data,
        }
    }

    /// Match lines that contain `needle`
    pub fn contains(needle: impl Into<String>) -> Self {
        Self::new(ops::CONTAINS, Value::String(needle.into()))
    }

    /// Invert another rule
    pub fn not(rule: Rule) -> Self {
        Self::new(ops::NOT, rule.into())
    }

    /// Match when at least one of `rules` matches
    pub fn any(rules: Vec<Rule>) -> Self {
        Self::new(ops::OR, Value::Array(rules.into_iter().map(Value::from).collect()))
    }

    /// Match only when all of `rules` match
    pub fn all(rules: Vec<Rule>) -> Self {
        Self::new(ops::AND, Value::Array(rules.into_iter().map(Value::from).collect()))
    }
}

impl From<Rule> for Value {
    fn from(rule: Rule) -> Self {
        let mut obj = Map::new();
        obj.insert("Op".to_string(), Value::String(rule.op));
        obj.insert("Data".to_string(), rule.data);
        Value::Object(obj)
    }
}

// ============================================================================
// Log Record Types
// ============================================================================

/// Field holding the severity of a record
pub const LEVEL_FIELD: &str = "level";

/// Field holding the timestamp of a record
pub const TIME_FIELD: &str = "time";

/// Field holding the human-readable text of a record
pub const MESSAGE_FIELD: &str = "message";

/// A single decoded log record.
///
/// Structured lines keep every field of the decoded JSON object. Lines that
/// do not decode as a JSON object are wrapped as a record whose only field is
/// the raw line under `message`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogRecord {
    fields: Map<String, Value>,
}

impl LogRecord {
    /// Decode one log line, falling back to a raw-message record
    pub fn parse(line: &str) -> Self {
        match serde_json::from_str::<Map<String, Value>>(line) {
            Ok(fields) => Self { fields },
            Err(_) => Self::fallback(line),
        }
    }

    /// Wrap an unparseable line as `{"message": line}`
    pub fn fallback(line: &str) -> Self {
        let mut fields = Map::new();
        fields.insert(MESSAGE_FIELD.to_string(), Value::String(line.to_string()));
        Self { fields }
    }

    /// All fields of the record
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Look up a single field by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The severity field, when present and string-typed
    pub fn level(&self) -> Option<&str> {
        self.fields.get(LEVEL_FIELD).and_then(Value::as_str)
    }

    /// The timestamp field, when present; timestamps may be strings or numbers
    pub fn time(&self) -> Option<&Value> {
        self.fields.get(TIME_FIELD)
    }

    /// The message field, when present and string-typed
    pub fn message(&self) -> Option<&str> {
        self.fields.get(MESSAGE_FIELD).and_then(Value::as_str)
    }

    /// Fields other than level, time and message, sorted by name
    pub fn extra_fields(&self) -> Vec<(&str, &Value)> {
        let mut extra: Vec<(&str, &Value)> = self
            .fields
            .iter()
            .filter(|(name, _)| {
                !matches!(name.as_str(), LEVEL_FIELD | TIME_FIELD | MESSAGE_FIELD)
            })
            .map(|(name, value)| (name.as_str(), value))
            .collect();
        extra.sort_by_key(|(name, _)| *name);
        extra
    }
}
