//! Unit tests for the configuration reader, text edits and rule values.
mod common;
use cfmigrate::config::{TextEdit, apply_edits, merge_spans, removal_extent};
use cfmigrate::hcl::{self, Expression, ObjectItem, Span, Structure};
use cfmigrate::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_parse_skips_comments() {
    let src = "a = 1 # note\n/* block */ b = \"x\" // tail\n";
    let body = hcl::parse_body(src).unwrap();

    let keys: Vec<&str> = body.attributes().map(|attr| attr.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b"]);
    let b = body.get_attribute("b").unwrap();
    assert_eq!(b.value, Expression::String("x".to_string()));
    assert_eq!(b.span.slice(src), "b = \"x\"");
}

#[test]
fn test_parse_strings_and_templates() {
    let src = r#"plain    = "tab\there"
template = "${var.a}-b"
nested   = "${join(",", var.list)}"
"#;
    let body = hcl::parse_body(src).unwrap();
    let attr = |key: &str| body.get_attribute(key).unwrap();

    assert_eq!(attr("plain").value, Expression::String("tab\there".to_string()));
    assert_eq!(
        attr("template").value,
        Expression::Template("\"${var.a}-b\"".to_string())
    );
    let nested = attr("nested");
    assert!(matches!(&nested.value, Expression::Template(raw) if raw.contains("join(\",\"")));
    assert_eq!(nested.value_span.slice(src), r#""${join(",", var.list)}""#);
}

#[test]
fn test_parse_heredocs_and_numbers() {
    let src = "doc = <<EOT\nline { one }\nEOT\nn = 1.5e3\n";
    let body = hcl::parse_body(src).unwrap();

    let doc = &body.get_attribute("doc").unwrap().value;
    assert!(matches!(doc, Expression::Raw(raw) if raw.starts_with("<<EOT") && raw.contains("line { one }")));
    assert_eq!(
        body.get_attribute("n").unwrap().value,
        Expression::Number("1.5e3".to_string())
    );
}

#[test]
fn test_references_are_collected_everywhere() {
    let src = r#"resource "x" "y" {
  a = cloudflare_access_group.ops.id
  b = ["${cloudflare_access_policy.allow.id}"]
  c = data.cloudflare_access_group.other.id
  d = upper(local.name)
}
"#;
    let document = hcl::parse_document(src).unwrap();

    let found: Vec<(&str, &str, &str)> = document
        .references
        .iter()
        .map(|r| (r.root.as_str(), r.name.as_str(), r.span.slice(src)))
        .collect();
    assert_eq!(
        found,
        vec![
            ("cloudflare_access_group", "ops", "cloudflare_access_group"),
            ("cloudflare_access_policy", "allow", "cloudflare_access_policy"),
            ("data", "cloudflare_access_group", "data"),
            ("local", "name", "local"),
        ]
    );
}

#[test]
fn test_parse_blocks_and_attributes() {
    let src = r#"terraform {
  required_version = ">= 1.5"
}

resource "cloudflare_zero_trust_access_policy" "allow" {
  name    = "allow"
  enabled = true
  count   = -2
  tags    = ["a", "b"]
  meta    = { owner = "ops", "team-name": "sre" }
}
"#;
    let body = hcl::parse_body(src).unwrap();

    let blocks: Vec<_> = body.blocks().collect();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].ident, "terraform");
    assert!(blocks[0].resource_type().is_none());

    let policy = blocks[1];
    let label = policy.resource_type().unwrap();
    assert_eq!(label.value, "cloudflare_zero_trust_access_policy");
    assert_eq!(label.span.slice(src), "\"cloudflare_zero_trust_access_policy\"");
    assert_eq!(policy.resource_name(), Some("allow"));
    assert!(policy.span.slice(src).starts_with("resource"));
    assert!(policy.span.slice(src).ends_with('}'));

    let attr = policy.body.get_attribute("name").unwrap();
    assert_eq!(attr.value, Expression::String("allow".to_string()));
    assert_eq!(attr.span.slice(src), "name    = \"allow\"");
    assert_eq!(attr.value_span.slice(src), "\"allow\"");

    assert_eq!(
        policy.body.get_attribute("enabled").unwrap().value,
        Expression::Bool(true)
    );
    assert_eq!(
        policy.body.get_attribute("count").unwrap().value,
        Expression::Number("-2".to_string())
    );
    assert_eq!(
        policy.body.get_attribute("tags").unwrap().value,
        Expression::Tuple(vec![
            Expression::String("a".to_string()),
            Expression::String("b".to_string()),
        ])
    );
    assert_eq!(
        policy.body.get_attribute("meta").unwrap().value,
        Expression::Object(vec![
            ObjectItem {
                key: "owner".to_string(),
                value: Expression::String("ops".to_string()),
            },
            ObjectItem {
                key: "team-name".to_string(),
                value: Expression::String("sre".to_string()),
            },
        ])
    );
}

#[test]
fn test_parse_non_literals_as_raw_text() {
    let src = r#"locals {
  a = var.name
  b = upper(var.name)
  c = var.enabled ? ["x"] : []
  d = [for e in var.emails : { email = [e] }]
  e = [var.first, "second"]
  f = {
    for k, v in var.map : k => v
  }
}
"#;
    let body = hcl::parse_body(src).unwrap();
    let locals = body.get_blocks("locals").next().unwrap();
    let value = |key: &str| locals.body.get_attribute(key).unwrap().value.clone();

    assert_eq!(value("a"), Expression::Raw("var.name".to_string()));
    assert_eq!(value("b"), Expression::Raw("upper(var.name)".to_string()));
    assert_eq!(value("c"), Expression::Raw(r#"var.enabled ? ["x"] : []"#.to_string()));
    assert_eq!(
        value("d"),
        Expression::Raw("[for e in var.emails : { email = [e] }]".to_string())
    );
    assert_eq!(
        value("e"),
        Expression::Tuple(vec![
            Expression::Raw("var.first".to_string()),
            Expression::String("second".to_string()),
        ])
    );
    assert!(matches!(value("f"), Expression::Raw(raw) if raw.contains("k => v")));
    assert!(!value("d").contains_object());
}

#[test]
fn test_parse_nested_blocks_in_order() {
    let src = "resource \"t\" \"n\" {\n  include {\n    email = [\"a\"]\n  }\n  name = \"x\"\n  include {\n    everyone = true\n  }\n}\n";
    let body = hcl::parse_body(src).unwrap();
    let resource = body.blocks().next().unwrap();

    let idents: Vec<&str> = resource
        .body
        .structures
        .iter()
        .map(|structure| match structure {
            Structure::Attribute(attr) => attr.key.as_str(),
            Structure::Block(block) => block.ident.as_str(),
        })
        .collect();
    assert_eq!(idents, vec!["include", "name", "include"]);
    assert_eq!(resource.body.get_blocks("include").count(), 2);
}

#[test]
fn test_parse_errors_carry_positions() {
    let err = hcl::parse_body("resource \"a\" \"b\" {\n  = 1\n}\n").unwrap_err();
    assert!(matches!(err, ParseError::Syntax { line: 2, .. }));

    let err = hcl::parse_body("a = 1\n}\n").unwrap_err();
    assert!(matches!(err, ParseError::Syntax { line: 2, .. }));

    let err = hcl::parse_body("a = \"open").unwrap_err();
    assert!(matches!(err, ParseError::Syntax { line: 1, .. }));
}

#[test]
fn test_expression_display_and_quoting() {
    let expr = Expression::Object(vec![
        ObjectItem {
            key: "email".to_string(),
            value: Expression::String("a\"b@example.com".to_string()),
        },
        ObjectItem {
            key: "odd key".to_string(),
            value: Expression::Tuple(vec![Expression::Null, Expression::Bool(false)]),
        },
    ]);
    assert_eq!(
        expr.to_string(),
        r#"{ email = "a\"b@example.com", "odd key" = [null, false] }"#
    );
    assert_eq!(Expression::Object(Vec::new()).to_string(), "{}");
    assert_eq!(hcl::render_key("team-name"), "team-name");
    assert_eq!(hcl::render_key("1st"), "\"1st\"");
}

#[test]
fn test_apply_edits_back_to_front() {
    let src = "alpha beta gamma";
    let out = apply_edits(
        src,
        vec![
            TextEdit::replace(Span::new(11, 16), "GAMMA"),
            TextEdit::replace(Span::new(0, 5), "A"),
            TextEdit::delete(Span::new(5, 10)),
        ],
    );
    assert_eq!(out, "A GAMMA");
}

#[test]
fn test_apply_edits_drops_overlaps() {
    let out = apply_edits(
        "0123456789",
        vec![
            TextEdit::replace(Span::new(2, 6), "x"),
            TextEdit::replace(Span::new(4, 8), "y"),
        ],
    );
    assert_eq!(out, "01x6789");
}

#[test]
fn test_removal_extent_takes_one_blank_line() {
    let src = "a {\n}\n\nb {\n}\n\nc = 1\n";
    let b = src.find("b {").unwrap();
    let extent = removal_extent(src, Span::new(b, b + 5));
    assert_eq!(apply_edits(src, vec![TextEdit::delete(extent)]), "a {\n}\n\nc = 1\n");

    // With nothing blank above, the blank line below goes.
    let src = "a {\n}\nb {\n}\n\nc = 1\n";
    let b = src.find("b {").unwrap();
    let extent = removal_extent(src, Span::new(b, b + 5));
    assert_eq!(apply_edits(src, vec![TextEdit::delete(extent)]), "a {\n}\nc = 1\n");

    // Blocks sharing a line with other text keep their own span.
    let src = "x = 1 b {}\n";
    assert_eq!(removal_extent(src, Span::new(6, 10)), Span::new(6, 10));
}

#[test]
fn test_merge_spans_joins_touching_ranges() {
    assert_eq!(
        merge_spans(vec![Span::new(8, 12), Span::new(0, 4), Span::new(4, 6), Span::new(10, 14)]),
        vec![Span::new(0, 6), Span::new(8, 14)]
    );
}

#[test]
fn test_rule_value_emptiness() {
    assert!(RuleValue::Null.is_empty());
    assert!(RuleValue::Bool(false).is_empty());
    assert!(RuleValue::String(String::new()).is_empty());
    assert!(RuleValue::List(Vec::new()).is_empty());
    assert!(!RuleValue::empty_object().is_empty());
    assert!(!RuleValue::Bool(true).is_empty());
    assert!(!RuleValue::Number("0".to_string()).is_empty());
}

#[test]
fn test_rule_value_json_conversion() {
    let json = json!({ "email": ["a@example.com"], "count": 2, "ratio": 0.5, "on": true, "none": null });
    let value = RuleValue::from_json(&json);

    assert_eq!(
        value,
        RuleValue::Object(vec![
            (
                "email".to_string(),
                RuleValue::List(vec![RuleValue::String("a@example.com".to_string())])
            ),
            ("count".to_string(), RuleValue::Number("2".to_string())),
            ("ratio".to_string(), RuleValue::Number("0.5".to_string())),
            ("on".to_string(), RuleValue::Bool(true)),
            ("none".to_string(), RuleValue::Null),
        ])
    );
    assert_eq!(value.to_json(), json);
}

#[test]
fn test_rule_value_from_expression() {
    let expr = Expression::Tuple(vec![
        Expression::Template("\"${var.a}\"".to_string()),
        Expression::Number("1.50".to_string()),
    ]);
    let value = RuleValue::from_expression(&expr);

    assert_eq!(
        value,
        RuleValue::List(vec![
            RuleValue::Expr("\"${var.a}\"".to_string()),
            RuleValue::Number("1.50".to_string()),
        ])
    );
    assert_eq!(value.to_string(), "[\"${var.a}\", 1.50]");
}
