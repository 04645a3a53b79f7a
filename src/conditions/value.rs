use crate::hcl::{self, Expression};
use serde_json::{Map, Value};
use std::fmt;

/// A condition value as seen by the expansion engine.
///
/// Configuration expressions and state JSON are both converted into this one
/// shape so expansion never has to inspect either source format directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleValue {
    Null,
    Bool(bool),
    Number(String),
    String(String),
    /// Source text of a configuration expression that is not a literal.
    Expr(String),
    List(Vec<RuleValue>),
    Object(Vec<(String, RuleValue)>),
}

impl RuleValue {
    /// Values that carry no condition: `null`, `false`, `""` and `[]`.
    pub fn is_empty(&self) -> bool {
        match self {
            RuleValue::Null => true,
            RuleValue::Bool(b) => !b,
            RuleValue::String(s) => s.is_empty(),
            RuleValue::List(items) => items.is_empty(),
            RuleValue::Number(_) | RuleValue::Expr(_) | RuleValue::Object(_) => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RuleValue::Null)
    }

    pub fn empty_object() -> Self {
        RuleValue::Object(Vec::new())
    }

    pub fn from_expression(expr: &Expression) -> Self {
        match expr {
            Expression::Null => RuleValue::Null,
            Expression::Bool(b) => RuleValue::Bool(*b),
            Expression::Number(n) => RuleValue::Number(n.clone()),
            Expression::String(s) => RuleValue::String(s.clone()),
            Expression::Template(raw) | Expression::Raw(raw) => RuleValue::Expr(raw.clone()),
            Expression::Tuple(items) => {
                RuleValue::List(items.iter().map(RuleValue::from_expression).collect())
            }
            Expression::Object(items) => RuleValue::Object(
                items
                    .iter()
                    .map(|item| (item.key.clone(), RuleValue::from_expression(&item.value)))
                    .collect(),
            ),
        }
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => RuleValue::Null,
            Value::Bool(b) => RuleValue::Bool(*b),
            Value::Number(n) => RuleValue::Number(n.to_string()),
            Value::String(s) => RuleValue::String(s.clone()),
            Value::Array(items) => RuleValue::List(items.iter().map(RuleValue::from_json).collect()),
            Value::Object(map) => RuleValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), RuleValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            RuleValue::Null => Value::Null,
            RuleValue::Bool(b) => Value::Bool(*b),
            RuleValue::Number(n) => n
                .parse::<serde_json::Number>()
                .map(Value::Number)
                .unwrap_or_else(|_| Value::String(n.clone())),
            RuleValue::String(s) | RuleValue::Expr(s) => Value::String(s.clone()),
            RuleValue::List(items) => Value::Array(items.iter().map(RuleValue::to_json).collect()),
            RuleValue::Object(fields) => {
                let mut map = Map::with_capacity(fields.len());
                for (k, v) in fields {
                    map.insert(k.clone(), v.to_json());
                }
                Value::Object(map)
            }
        }
    }
}

/// Renders the value as inline HCL.
impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleValue::Null => write!(f, "null"),
            RuleValue::Bool(b) => write!(f, "{}", b),
            RuleValue::Number(n) => write!(f, "{}", n),
            RuleValue::String(s) => write!(f, "{}", hcl::quote(s)),
            RuleValue::Expr(raw) => write!(f, "{}", raw),
            RuleValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            RuleValue::Object(fields) if fields.is_empty() => write!(f, "{{}}"),
            RuleValue::Object(fields) => {
                write!(f, "{{ ")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} = {}", hcl::render_key(key), value)?;
                }
                write!(f, " }}")
            }
        }
    }
}
