use crate::conditions::{
    ConditionElement, ConditionRule, ExpandedElement, ListExpansion, RuleOrigin, RuleValue,
};
use crate::hcl::{Block, Body, Expression, Structure};
use itertools::Itertools;

/// Breaks an attribute value into condition elements. Returns `None` when the
/// value holds no object literal and so cannot be a v4 condition list.
pub(super) fn elements_from_expression(expr: &Expression) -> Option<Vec<ConditionElement>> {
    if !expr.contains_object() {
        return None;
    }
    match expr {
        Expression::Tuple(items) => Some(items.iter().map(element_from_expression).collect()),
        Expression::Object(_) => Some(vec![element_from_expression(expr)]),
        _ => None,
    }
}

fn element_from_expression(expr: &Expression) -> ConditionElement {
    match expr {
        Expression::Object(items) => ConditionElement::Grouped(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    ConditionRule::new(
                        item.key.clone(),
                        RuleValue::from_expression(&item.value),
                        RuleOrigin::Source(i),
                    )
                })
                .collect(),
        ),
        other => ConditionElement::Opaque(RuleValue::from_expression(other)),
    }
}

/// Treats each repeated `include { ... }` block as one grouped element.
pub(super) fn elements_from_blocks(blocks: &[&Block]) -> Vec<ConditionElement> {
    blocks
        .iter()
        .map(|block| ConditionElement::Grouped(rules_from_body(&block.body)))
        .collect()
}

fn rules_from_body(body: &Body) -> Vec<ConditionRule> {
    body.structures
        .iter()
        .enumerate()
        .map(|(i, structure)| match structure {
            Structure::Attribute(attr) => ConditionRule::new(
                attr.key.clone(),
                RuleValue::from_expression(&attr.value),
                RuleOrigin::Source(i),
            ),
            Structure::Block(block) => ConditionRule::new(
                block.ident.clone(),
                body_value(&block.body),
                RuleOrigin::Source(i),
            ),
        })
        .collect()
}

/// A nested block such as `azure { id = [...] }` read as an object value.
fn body_value(body: &Body) -> RuleValue {
    RuleValue::Object(
        body.structures
            .iter()
            .map(|structure| match structure {
                Structure::Attribute(attr) => {
                    (attr.key.clone(), RuleValue::from_expression(&attr.value))
                }
                Structure::Block(block) => (block.ident.clone(), body_value(&block.body)),
            })
            .collect(),
    )
}

/// Renders a list-of-objects literal whose closing bracket lines up with `indent`.
pub(super) fn render_list(elements: &[ExpandedElement], indent: &str, newline: &str) -> String {
    let items = elements
        .iter()
        .map(|element| match element {
            ExpandedElement::Object(object) => format!("{}  {}", indent, object),
            ExpandedElement::Opaque(value) => format!("{}  {}", indent, value),
        })
        .join(&format!(",{}", newline));
    format!("[{nl}{}{nl}{}]", items, indent, nl = newline)
}

/// Renders an expanded condition list. Plan-time conditions are joined to
/// the literal list with `concat(...)`.
pub(super) fn render_conditions(expansion: &ListExpansion, indent: &str, newline: &str) -> String {
    if expansion.deferred.is_empty() {
        return render_list(&expansion.elements, indent, newline);
    }

    let inner = format!("{}  ", indent);
    let mut parts = Vec::new();
    if !expansion.elements.is_empty() {
        parts.push(render_list(&expansion.elements, &inner, newline));
    }
    parts.extend(expansion.deferred.iter().map(ToString::to_string));
    if parts.len() == 1 {
        return parts.remove(0);
    }

    let parts = parts
        .iter()
        .map(|part| format!("{}{}", inner, part))
        .join(&format!(",{}", newline));
    format!("concat({nl}{}{nl}{})", parts, indent, nl = newline)
}
