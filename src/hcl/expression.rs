use std::fmt;

/// A configuration value expression.
///
/// Only literals are modelled structurally. Templates, heredocs, references,
/// function calls and operators are kept as the exact source text so they can
/// be written back untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Null,
    Bool(bool),
    /// Numbers keep their source spelling (`1`, `1.50`, `2e3`).
    Number(String),
    /// A quoted string with escapes already resolved.
    String(String),
    /// A quoted string containing interpolation, including its quotes.
    Template(String),
    Tuple(Vec<Expression>),
    Object(Vec<ObjectItem>),
    /// Anything the reader does not model, as written in the source.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectItem {
    pub key: String,
    pub value: Expression,
}

impl Expression {
    /// True when object syntax appears anywhere in this literal.
    pub fn contains_object(&self) -> bool {
        match self {
            Expression::Object(_) => true,
            Expression::Tuple(items) => items.iter().any(Expression::contains_object),
            _ => false,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Null => write!(f, "null"),
            Expression::Bool(b) => write!(f, "{}", b),
            Expression::Number(n) => write!(f, "{}", n),
            Expression::String(s) => write!(f, "{}", quote(s)),
            Expression::Template(raw) | Expression::Raw(raw) => write!(f, "{}", raw),
            Expression::Tuple(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Expression::Object(items) if items.is_empty() => write!(f, "{{}}"),
            Expression::Object(items) => {
                write!(f, "{{ ")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} = {}", render_key(&item.key), item.value)?;
                }
                write!(f, " }}")
            }
        }
    }
}

/// Renders a string as an HCL quoted literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Renders an object key bare when it is a valid identifier, quoted otherwise.
pub fn render_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}
