use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use logscope_types::{Rule, ops};

/// Errors produced while evaluating a rule against a line
#[derive(Debug, Error)]
pub enum RuleError {
    /// The rule names an operator the registry does not know
    #[error("rule op {0:?} not found")]
    UnknownOp(String),

    /// The operand does not have the shape the operator requires
    #[error("rule {op}: operand is not {expected}")]
    BadOperand { op: String, expected: &'static str },

    /// A list operand element is not a rule object
    #[error("rule {op}: element {index} is not a rule")]
    BadElement { op: String, index: usize },

    /// A nested rule failed while a list operator was walking its elements
    #[error("rule {op}: element {index} failed")]
    Element {
        op: String,
        index: usize,
        #[source]
        source: Box<RuleError>,
    },
}

/// Evaluator for one rule operator.
///
/// Composite operators recurse through the registry they are handed, so a
/// custom operator can nest the built-in ones.
pub trait RuleOp: Send + Sync {
    fn eval(&self, registry: &RuleRegistry, data: &Value, line: &str) -> Result<bool, RuleError>;
}

impl<F> RuleOp for F
where
    F: Fn(&RuleRegistry, &Value, &str) -> Result<bool, RuleError> + Send + Sync,
{
    fn eval(&self, registry: &RuleRegistry, data: &Value, line: &str) -> Result<bool, RuleError> {
        self(registry, data, line)
    }
}

/// Table of named rule operators.
///
/// Built once at startup and then only read, so it can be shared freely
/// across request handlers.
pub struct RuleRegistry {
    ops: HashMap<String, Box<dyn RuleOp>>,
}

impl RuleRegistry {
    /// Create a registry with the built-in operators registered
    pub fn builtin() -> Self {
        let mut registry = Self {
            ops: HashMap::new(),
        };
        registry.register(ops::NOT, not_op);
        registry.register(ops::OR, or_op);
        registry.register(ops::AND, and_op);
        registry.register(ops::CONTAINS, contains_op);
        registry
    }

    /// Register an operator under a name, replacing any previous one
    pub fn register(&mut self, name: impl Into<String>, op: impl RuleOp + 'static) {
        self.ops.insert(name.into(), Box::new(op));
    }

    /// Evaluate a rule tree against a single line
    pub fn evaluate(&self, rule: &Rule, line: &str) -> Result<bool, RuleError> {
        self.run(&rule.op, &rule.data, line)
    }

    /// Evaluate a single node by operator name; composite operators recurse
    /// through this
    pub fn run(&self, op: &str, data: &Value, line: &str) -> Result<bool, RuleError> {
        let rule_op = self
            .ops
            .get(op)
            .ok_or_else(|| RuleError::UnknownOp(op.to_string()))?;
        rule_op.eval(self, data, line)
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.ops.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("RuleRegistry").field("ops", &names).finish()
    }
}

/// Borrow the operator name and operand out of a nested rule value.
///
/// Operands are only decoded at the node that needs them, so a malformed
/// branch goes unnoticed as long as evaluation never reaches it.
fn rule_parts(value: &Value) -> Option<(&str, &Value)> {
    static NULL_DATA: Value = Value::Null;
    let obj = value.as_object()?;
    let op = obj.get("Op")?.as_str()?;
    Some((op, obj.get("Data").unwrap_or(&NULL_DATA)))
}

/// Invert the nested rule carried in the operand
fn not_op(registry: &RuleRegistry, data: &Value, line: &str) -> Result<bool, RuleError> {
    let (op, operand) = rule_parts(data).ok_or_else(|| RuleError::BadOperand {
        op: ops::NOT.to_string(),
        expected: "a rule object",
    })?;
    Ok(!registry.run(op, operand, line)?)
}

/// True as soon as one element matches; an empty list never matches
fn or_op(registry: &RuleRegistry, data: &Value, line: &str) -> Result<bool, RuleError> {
    let items = data.as_array().ok_or_else(|| RuleError::BadOperand {
        op: ops::OR.to_string(),
        expected: "a list of rules",
    })?;
    for (index, item) in items.iter().enumerate() {
        let (op, operand) = rule_parts(item).ok_or_else(|| RuleError::BadElement {
            op: ops::OR.to_string(),
            index,
        })?;
        let matched = registry
            .run(op, operand, line)
            .map_err(|source| RuleError::Element {
                op: ops::OR.to_string(),
                index,
                source: Box::new(source),
            })?;
        if matched {
            return Ok(true);
        }
    }
    Ok(false)
}

/// False as soon as one element fails to match; an empty list always matches
fn and_op(registry: &RuleRegistry, data: &Value, line: &str) -> Result<bool, RuleError> {
    let items = data.as_array().ok_or_else(|| RuleError::BadOperand {
        op: ops::AND.to_string(),
        expected: "a list of rules",
    })?;
    for (index, item) in items.iter().enumerate() {
        let (op, operand) = rule_parts(item).ok_or_else(|| RuleError::BadElement {
            op: ops::AND.to_string(),
            index,
        })?;
        let matched = registry
            .run(op, operand, line)
            .map_err(|source| RuleError::Element {
                op: ops::AND.to_string(),
                index,
                source: Box::new(source),
            })?;
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

/// True when the line contains the operand as a case-sensitive substring
fn contains_op(_registry: &RuleRegistry, data: &Value, line: &str) -> Result<bool, RuleError> {
    let needle = data.as_str().ok_or_else(|| RuleError::BadOperand {
        op: ops::CONTAINS.to_string(),
        expected: "a string",
    })?;
    Ok(line.contains(needle))
}
