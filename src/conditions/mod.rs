//! The condition expansion engine shared by the configuration and state rewriters.
//!
//! A v4 condition element groups several rules in one object
//! (`{ email = ["a", "b"], everyone = true }`). In v5 every condition is a
//! singleton object holding exactly one rule type. [`expand`] performs that
//! one-to-many conversion for a single element and [`expand_list`] does it for
//! a whole `include`/`exclude`/`require` list, leaving elements that are
//! already in v5 shape alone.
//!
//! Rules whose value is a reference (`email = var.blocked`) cannot be
//! expanded ahead of time. They become [`DeferredCondition`]s, expressions
//! that build the same v5 objects when Terraform evaluates them.

mod table;
mod value;

pub use value::RuleValue;

use itertools::Itertools;
use serde::Serialize;
use std::fmt;
use table::{ProviderFold, RuleKind};

/// Where a rule came from, which decides its position in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleOrigin {
    /// Ordinal position in configuration source.
    Source(usize),
    /// A key of a state JSON object; ordered by name.
    Key,
}

/// One v4 attribute inside a grouped condition element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionRule {
    pub name: String,
    pub value: RuleValue,
    pub origin: RuleOrigin,
}

impl ConditionRule {
    pub fn new(name: impl Into<String>, value: RuleValue, origin: RuleOrigin) -> Self {
        Self {
            name: name.into(),
            value,
            origin,
        }
    }

    fn sort_key(&self) -> (RuleOrigin, &str) {
        (self.origin, self.name.as_str())
    }
}

/// One v5 condition: `{ <type_key> = <value> }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionObject {
    pub type_key: String,
    pub value: RuleValue,
}

impl ConditionObject {
    fn flag(type_key: &str) -> Self {
        Self {
            type_key: type_key.to_string(),
            value: RuleValue::empty_object(),
        }
    }

    fn nested(type_key: &str, fields: Vec<(String, RuleValue)>) -> Self {
        Self {
            type_key: type_key.to_string(),
            value: RuleValue::Object(fields),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert(self.type_key.clone(), self.value.to_json());
        serde_json::Value::Object(map)
    }
}

/// Renders the object as inline HCL, e.g. `{ email = { email = "a@example.com" } }`.
impl fmt::Display for ConditionObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ {} = {} }}",
            crate::hcl::render_key(&self.type_key),
            self.value
        )
    }
}

/// A condition whose values are only known at plan time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredCondition {
    /// `[for value in <source> : { <type_key> = { <nested_key> = value } }]`
    Each {
        type_key: String,
        nested_key: String,
        source: String,
    },
    /// `<source> ? [{ <type_key> = {} }] : []`
    When { type_key: String, source: String },
}

impl fmt::Display for DeferredCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeferredCondition::Each {
                type_key,
                nested_key,
                source,
            } => write!(
                f,
                "[for value in {} : {{ {} = {{ {} = value }} }}]",
                source,
                crate::hcl::render_key(type_key),
                crate::hcl::render_key(nested_key)
            ),
            DeferredCondition::When { type_key, source } => write!(
                f,
                "{} ? [{{ {} = {{}} }}] : []",
                source,
                crate::hcl::render_key(type_key)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The rule name is not in the catalogue; its value was carried verbatim.
    UnknownRule,
    /// The value has a shape that cannot be expanded and was skipped.
    Unparsable,
    /// Values beyond the first were dropped.
    Truncated { dropped: usize },
}

/// A partial-extraction finding. Processing always continues past these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// The attribute the rule was found in, e.g. `cloudflare_zero_trust_access_policy.allow.include`.
    pub location: String,
    pub rule: String,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(rule: &str, kind: DiagnosticKind) -> Self {
        Self {
            location: String::new(),
            rule: rule.to_string(),
            kind,
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.location.is_empty() {
            String::new()
        } else {
            format!("{}: ", self.location)
        };
        match &self.kind {
            DiagnosticKind::UnknownRule => {
                write!(f, "{}unknown condition '{}' kept as-is", prefix, self.rule)
            }
            DiagnosticKind::Unparsable => write!(
                f,
                "{}condition '{}' has a value that cannot be expanded; skipped",
                prefix, self.rule
            ),
            DiagnosticKind::Truncated { dropped } => write!(
                f,
                "{}condition '{}' keeps only its first value; {} dropped",
                prefix, self.rule, dropped
            ),
        }
    }
}

/// The result of expanding one grouped element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    pub objects: Vec<ConditionObject>,
    /// Rules whose values are references, in rule order.
    pub deferred: Vec<DeferredCondition>,
    pub diagnostics: Vec<Diagnostic>,
    /// How many of `objects` are unknown rules carried verbatim.
    pub carried: usize,
}

impl Expansion {
    /// Objects produced from rules the catalogue knows.
    pub fn converted(&self) -> usize {
        self.objects.len() - self.carried
    }
}

/// Expands one v4 element into v5 condition objects.
///
/// Rules from configuration are emitted in source order, rules from state in
/// alphabetical order of their names.
pub fn expand(rules: &[ConditionRule]) -> Expansion {
    let mut expansion = Expansion::default();
    for rule in rules.iter().sorted_by(|a, b| a.sort_key().cmp(&b.sort_key())) {
        expand_rule(rule, &mut expansion);
    }
    expansion
}

fn expand_rule(rule: &ConditionRule, out: &mut Expansion) {
    let Some(kind) = table::lookup(&rule.name) else {
        if !rule.value.is_empty() {
            out.objects.push(ConditionObject {
                type_key: rule.name.clone(),
                value: rule.value.clone(),
            });
            out.carried += 1;
            out.diagnostics
                .push(Diagnostic::new(&rule.name, DiagnosticKind::UnknownRule));
        }
        return;
    };

    let unparsable = |out: &mut Expansion| {
        out.diagnostics
            .push(Diagnostic::new(&rule.name, DiagnosticKind::Unparsable));
    };

    match kind {
        RuleKind::Flag { type_key } => match &rule.value {
            RuleValue::Bool(true) => out.objects.push(ConditionObject::flag(type_key)),
            value if value.is_empty() => {}
            RuleValue::Expr(source) if !is_string_expr(source) => {
                out.deferred.push(DeferredCondition::When {
                    type_key: type_key.to_string(),
                    source: source.clone(),
                });
            }
            _ => unparsable(out),
        },
        RuleKind::List {
            type_key,
            nested_key,
        } => {
            if let RuleValue::Expr(source) = &rule.value {
                if !is_string_expr(source) {
                    out.deferred.push(DeferredCondition::Each {
                        type_key: type_key.to_string(),
                        nested_key: nested_key.to_string(),
                        source: source.clone(),
                    });
                    return;
                }
            }
            let Some(values) = list_values(&rule.value) else {
                unparsable(out);
                return;
            };
            for value in values {
                if value.is_null() {
                    continue;
                }
                if !is_scalar(value) {
                    unparsable(out);
                    continue;
                }
                out.objects.push(ConditionObject::nested(
                    type_key,
                    vec![(nested_key.to_string(), value.clone())],
                ));
            }
        }
        RuleKind::Scalar { type_key } => match &rule.value {
            value if value.is_empty() => {}
            value if is_scalar(value) => out.objects.push(ConditionObject::nested(
                type_key,
                vec![(type_key.to_string(), value.clone())],
            )),
            _ => unparsable(out),
        },
        RuleKind::Provider {
            type_key,
            list_field,
            nested_field,
            fold,
        } => {
            let Some(blocks) = object_values(&rule.value) else {
                unparsable(out);
                return;
            };
            for fields in blocks {
                match fold_provider(fields, list_field, nested_field, fold) {
                    Some((objects, dropped)) => {
                        out.objects.extend(
                            objects
                                .into_iter()
                                .map(|fields| ConditionObject::nested(type_key, fields)),
                        );
                        if dropped > 0 {
                            out.diagnostics.push(Diagnostic::new(
                                &rule.name,
                                DiagnosticKind::Truncated { dropped },
                            ));
                        }
                    }
                    None => unparsable(out),
                }
            }
        }
        RuleKind::Passthrough { type_key } => {
            let Some(blocks) = object_values(&rule.value) else {
                unparsable(out);
                return;
            };
            for fields in blocks {
                out.objects
                    .push(ConditionObject::nested(type_key, fields.to_vec()));
            }
        }
    }
}

fn is_scalar(value: &RuleValue) -> bool {
    matches!(
        value,
        RuleValue::String(_) | RuleValue::Number(_) | RuleValue::Bool(_) | RuleValue::Expr(_)
    )
}

/// Quoted templates and heredocs, which always evaluate to one string.
fn is_string_expr(source: &str) -> bool {
    source.starts_with('"') || source.starts_with("<<")
}

/// The values of a list rule. A single scalar counts as a one-element list.
fn list_values(value: &RuleValue) -> Option<Vec<&RuleValue>> {
    match value {
        value if value.is_empty() => Some(Vec::new()),
        RuleValue::List(items) => Some(items.iter().collect()),
        RuleValue::String(_) | RuleValue::Number(_) => Some(vec![value]),
        RuleValue::Expr(source) if is_string_expr(source) => Some(vec![value]),
        _ => None,
    }
}

/// The objects of a block-valued rule: a single object or a list of objects.
fn object_values(value: &RuleValue) -> Option<Vec<&[(String, RuleValue)]>> {
    match value {
        value if value.is_empty() => Some(Vec::new()),
        RuleValue::Object(fields) => Some(vec![fields.as_slice()]),
        RuleValue::List(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| match item {
                RuleValue::Object(fields) => Some(fields.as_slice()),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

type Fields = Vec<(String, RuleValue)>;

/// Folds a provider block's list field into a scalar field. Returns the
/// resulting field sets and how many list values were dropped.
fn fold_provider(
    fields: &[(String, RuleValue)],
    list_field: &str,
    nested_field: &str,
    fold: ProviderFold,
) -> Option<(Vec<Fields>, usize)> {
    let values = match fields.iter().find(|(key, _)| key == list_field) {
        Some((_, value)) => list_values(value)?
            .into_iter()
            .filter(|v| !v.is_null())
            .collect::<Vec<_>>(),
        None => Vec::new(),
    };
    if values.iter().any(|v| !is_scalar(v)) {
        return None;
    }

    let build = |value: Option<&RuleValue>| -> Fields {
        fields
            .iter()
            .filter_map(|(key, v)| {
                if key == list_field {
                    value.map(|value| (nested_field.to_string(), value.clone()))
                } else if v.is_null() {
                    None
                } else {
                    Some((key.clone(), v.clone()))
                }
            })
            .collect()
    };

    if values.is_empty() {
        return Some((vec![build(None)], 0));
    }
    match fold {
        ProviderFold::FirstValue => Some((vec![build(values.first().copied())], values.len() - 1)),
        ProviderFold::EachValue => Some((values.into_iter().map(|v| build(Some(v))).collect(), 0)),
    }
}

/// One element of an `include`/`exclude`/`require` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionElement {
    /// An object element, broken into its rules.
    Grouped(Vec<ConditionRule>),
    /// Anything that is not an object literal.
    Opaque(RuleValue),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandedElement {
    Object(ConditionObject),
    /// Carried through unchanged.
    Opaque(RuleValue),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListExpansion {
    pub elements: Vec<ExpandedElement>,
    /// Plan-time conditions, appended after `elements`.
    pub deferred: Vec<DeferredCondition>,
    pub diagnostics: Vec<Diagnostic>,
    /// Objects and deferred conditions produced from v4 elements. Zero means
    /// the list needs no rewrite.
    pub produced: usize,
}

/// Expands every v4 element of a condition list, keeping element order.
/// Elements already in v5 shape and non-object elements pass through.
pub fn expand_list(elements: &[ConditionElement]) -> ListExpansion {
    let mut result = ListExpansion::default();
    for element in elements {
        match element {
            ConditionElement::Opaque(value) => {
                result.elements.push(ExpandedElement::Opaque(value.clone()));
            }
            ConditionElement::Grouped(rules) if is_v5_shaped(rules) => {
                let fields = rules
                    .iter()
                    .map(|rule| (rule.name.clone(), rule.value.clone()))
                    .collect();
                result
                    .elements
                    .push(ExpandedElement::Opaque(RuleValue::Object(fields)));
            }
            ConditionElement::Grouped(rules) => {
                let expansion = expand(rules);
                result.produced += expansion.converted() + expansion.deferred.len();
                result.deferred.extend(expansion.deferred);
                result.diagnostics.extend(expansion.diagnostics);
                result
                    .elements
                    .extend(expansion.objects.into_iter().map(ExpandedElement::Object));
            }
        }
    }
    result
}

/// An element is in v5 shape when exactly one rule carries a value, its name
/// is a v5 type key and its value is an object without list fields.
pub fn is_v5_shaped(rules: &[ConditionRule]) -> bool {
    let mut populated = rules.iter().filter(|rule| !rule.value.is_empty());
    let (Some(rule), None) = (populated.next(), populated.next()) else {
        return false;
    };
    if !table::is_v5_type_key(&rule.name) {
        return false;
    }
    match &rule.value {
        RuleValue::Object(fields) => !fields
            .iter()
            .any(|(_, value)| matches!(value, RuleValue::List(_))),
        _ => false,
    }
}
