//! Tests for the condition expansion engine.
mod common;
use cfmigrate::conditions::{ExpandedElement, Expansion, is_v5_shaped};
use cfmigrate::prelude::*;
use pretty_assertions::assert_eq;

fn s(value: &str) -> RuleValue {
    RuleValue::String(value.to_string())
}

fn list(values: &[&str]) -> RuleValue {
    RuleValue::List(values.iter().map(|v| s(v)).collect())
}

fn object(fields: Vec<(&str, RuleValue)>) -> RuleValue {
    RuleValue::Object(
        fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

/// Rules in source order, as the configuration reader produces them.
fn source_rules(rules: Vec<(&str, RuleValue)>) -> Vec<ConditionRule> {
    rules
        .into_iter()
        .enumerate()
        .map(|(i, (name, value))| ConditionRule::new(name, value, RuleOrigin::Source(i)))
        .collect()
}

fn rendered(expansion: &Expansion) -> Vec<String> {
    expansion.objects.iter().map(ToString::to_string).collect()
}

#[test]
fn test_email_list_expands_one_object_per_value() {
    let expansion = expand(&source_rules(vec![(
        "email",
        list(&["a@example.com", "b@example.com"]),
    )]));

    assert_eq!(
        rendered(&expansion),
        vec![
            r#"{ email = { email = "a@example.com" } }"#,
            r#"{ email = { email = "b@example.com" } }"#,
        ]
    );
    assert!(expansion.diagnostics.is_empty());
    assert_eq!(expansion.converted(), 2);
}

#[test]
fn test_flags_expand_only_when_true() {
    let on = expand(&source_rules(vec![("everyone", RuleValue::Bool(true))]));
    assert_eq!(rendered(&on), vec!["{ everyone = {} }"]);

    let off = expand(&source_rules(vec![("everyone", RuleValue::Bool(false))]));
    assert!(off.objects.is_empty());
    assert!(off.diagnostics.is_empty());

    let null = expand(&source_rules(vec![("certificate", RuleValue::Null)]));
    assert!(null.objects.is_empty());

    let absent = expand(&[]);
    assert!(absent.objects.is_empty());
}

#[test]
fn test_source_order_is_preserved() {
    let expansion = expand(&source_rules(vec![
        ("everyone", RuleValue::Bool(true)),
        ("any_valid_service_token", RuleValue::Bool(true)),
        ("email", list(&["x@example.com"])),
    ]));

    assert_eq!(
        rendered(&expansion),
        vec![
            "{ everyone = {} }",
            "{ any_valid_service_token = {} }",
            r#"{ email = { email = "x@example.com" } }"#,
        ]
    );
}

#[test]
fn test_state_rules_are_ordered_by_name() {
    let rules = vec![
        ConditionRule::new("everyone", RuleValue::Bool(true), RuleOrigin::Key),
        ConditionRule::new("ip", list(&["10.0.0.0/8"]), RuleOrigin::Key),
        ConditionRule::new("email", list(&["x@example.com"]), RuleOrigin::Key),
    ];

    let expansion = expand(&rules);
    let keys: Vec<&str> = expansion
        .objects
        .iter()
        .map(|object| object.type_key.as_str())
        .collect();
    assert_eq!(keys, vec!["email", "everyone", "ip"]);
}

#[test]
fn test_list_rules_use_their_nested_keys() {
    let expansion = expand(&source_rules(vec![
        ("email_domain", list(&["example.com"])),
        ("service_token", list(&["tok-1"])),
        ("geo", list(&["US", "CA"])),
        ("common_names", list(&["a.example.com", "b.example.com"])),
    ]));

    assert_eq!(
        rendered(&expansion),
        vec![
            r#"{ email_domain = { domain = "example.com" } }"#,
            r#"{ service_token = { token_id = "tok-1" } }"#,
            r#"{ geo = { country_code = "US" } }"#,
            r#"{ geo = { country_code = "CA" } }"#,
            r#"{ common_name = { common_name = "a.example.com" } }"#,
            r#"{ common_name = { common_name = "b.example.com" } }"#,
        ]
    );
}

#[test]
fn test_single_scalar_counts_as_one_element_list() {
    let expansion = expand(&source_rules(vec![("ip", s("192.0.2.1/32"))]));
    assert_eq!(rendered(&expansion), vec![r#"{ ip = { ip = "192.0.2.1/32" } }"#]);
}

#[test]
fn test_null_list_items_are_skipped() {
    let expansion = expand(&source_rules(vec![(
        "email",
        RuleValue::List(vec![s("a@example.com"), RuleValue::Null]),
    )]));
    assert_eq!(expansion.objects.len(), 1);
    assert!(expansion.diagnostics.is_empty());
}

#[test]
fn test_scalar_rules_nest_under_their_own_name() {
    let expansion = expand(&source_rules(vec![
        ("common_name", s("device.example.com")),
        ("auth_method", s("mfa")),
    ]));
    assert_eq!(
        rendered(&expansion),
        vec![
            r#"{ common_name = { common_name = "device.example.com" } }"#,
            r#"{ auth_method = { auth_method = "mfa" } }"#,
        ]
    );
}

#[test]
fn test_azure_keeps_first_id_and_reports_truncation() {
    let expansion = expand(&source_rules(vec![(
        "azure",
        object(vec![
            ("id", list(&["group-a", "group-b", "group-c"])),
            ("identity_provider_id", s("idp-1")),
        ]),
    )]));

    assert_eq!(
        rendered(&expansion),
        vec![r#"{ azure_ad = { id = "group-a", identity_provider_id = "idp-1" } }"#]
    );
    assert_eq!(
        expansion.diagnostics,
        vec![Diagnostic::new("azure", DiagnosticKind::Truncated { dropped: 2 })]
    );
}

#[test]
fn test_github_emits_one_object_per_team() {
    let expansion = expand(&source_rules(vec![(
        "github",
        object(vec![
            ("name", s("my-org")),
            ("teams", list(&["ops", "sre"])),
            ("identity_provider_id", s("idp-gh")),
        ]),
    )]));

    assert_eq!(
        rendered(&expansion),
        vec![
            r#"{ github_organization = { name = "my-org", team = "ops", identity_provider_id = "idp-gh" } }"#,
            r#"{ github_organization = { name = "my-org", team = "sre", identity_provider_id = "idp-gh" } }"#,
        ]
    );
}

#[test]
fn test_gsuite_and_okta_emit_one_object_per_value() {
    let expansion = expand(&source_rules(vec![
        (
            "gsuite",
            object(vec![
                ("email", list(&["a@example.com", "b@example.com"])),
                ("identity_provider_id", s("idp-google")),
            ]),
        ),
        (
            "okta",
            object(vec![
                ("name", list(&["g1", "g2", "g3"])),
                ("identity_provider_id", s("idp-okta")),
            ]),
        ),
    ]));

    assert_eq!(
        rendered(&expansion),
        vec![
            r#"{ gsuite = { email = "a@example.com", identity_provider_id = "idp-google" } }"#,
            r#"{ gsuite = { email = "b@example.com", identity_provider_id = "idp-google" } }"#,
            r#"{ okta = { name = "g1", identity_provider_id = "idp-okta" } }"#,
            r#"{ okta = { name = "g2", identity_provider_id = "idp-okta" } }"#,
            r#"{ okta = { name = "g3", identity_provider_id = "idp-okta" } }"#,
        ]
    );
    assert!(expansion.diagnostics.is_empty());
}

#[test]
fn test_provider_without_values_keeps_metadata() {
    let expansion = expand(&source_rules(vec![(
        "okta",
        object(vec![
            ("name", RuleValue::List(Vec::new())),
            ("identity_provider_id", s("idp-okta")),
        ]),
    )]));

    assert_eq!(
        rendered(&expansion),
        vec![r#"{ okta = { identity_provider_id = "idp-okta" } }"#]
    );
}

#[test]
fn test_provider_drops_null_metadata() {
    let expansion = expand(&source_rules(vec![(
        "gsuite",
        object(vec![
            ("email", list(&["ops@example.com"])),
            ("identity_provider_id", RuleValue::Null),
        ]),
    )]));

    assert_eq!(
        rendered(&expansion),
        vec![r#"{ gsuite = { email = "ops@example.com" } }"#]
    );
}

#[test]
fn test_passthrough_rules_keep_their_fields() {
    let expansion = expand(&source_rules(vec![(
        "saml",
        RuleValue::List(vec![object(vec![
            ("attribute_name", s("group")),
            ("attribute_value", s("admins")),
            ("identity_provider_id", s("idp-saml")),
        ])]),
    )]));

    assert_eq!(
        rendered(&expansion),
        vec![
            r#"{ saml = { attribute_name = "group", attribute_value = "admins", identity_provider_id = "idp-saml" } }"#
        ]
    );
}

#[test]
fn test_unknown_rule_is_carried_with_diagnostic() {
    let expansion = expand(&source_rules(vec![("device_vendor", s("acme"))]));

    assert_eq!(rendered(&expansion), vec![r#"{ device_vendor = "acme" }"#]);
    assert_eq!(expansion.carried, 1);
    assert_eq!(expansion.converted(), 0);
    assert_eq!(expansion.diagnostics[0].kind, DiagnosticKind::UnknownRule);
}

#[test]
fn test_unparsable_value_is_skipped() {
    let expansion = expand(&source_rules(vec![
        ("email", object(vec![("address", s("a@example.com"))])),
        ("everyone", RuleValue::Bool(true)),
    ]));

    assert_eq!(rendered(&expansion), vec!["{ everyone = {} }"]);
    assert_eq!(
        expansion.diagnostics,
        vec![Diagnostic::new("email", DiagnosticKind::Unparsable)]
    );
}

#[test]
fn test_reference_values_are_deferred_to_plan_time() {
    let expansion = expand(&source_rules(vec![
        ("email", RuleValue::Expr("var.emails".to_string())),
        ("everyone", RuleValue::Expr("var.open".to_string())),
        ("geo", list(&["CN"])),
    ]));

    assert_eq!(rendered(&expansion), vec![r#"{ geo = { country_code = "CN" } }"#]);
    let deferred: Vec<String> = expansion.deferred.iter().map(ToString::to_string).collect();
    assert_eq!(
        deferred,
        vec![
            "[for value in var.emails : { email = { email = value } }]",
            "var.open ? [{ everyone = {} }] : []",
        ]
    );
    assert!(expansion.diagnostics.is_empty());

    let result = expand_list(&[ConditionElement::Grouped(source_rules(vec![(
        "ip",
        RuleValue::Expr("local.office_ranges".to_string()),
    )]))]);
    assert!(result.elements.is_empty());
    assert_eq!(
        result.deferred,
        vec![DeferredCondition::Each {
            type_key: "ip".to_string(),
            nested_key: "ip".to_string(),
            source: "local.office_ranges".to_string(),
        }]
    );
    assert_eq!(result.produced, 1);
}

#[test]
fn test_template_value_counts_as_one_element() {
    let expansion = expand(&source_rules(vec![(
        "email",
        RuleValue::Expr("\"${var.user}@example.com\"".to_string()),
    )]));

    assert_eq!(
        rendered(&expansion),
        vec![r#"{ email = { email = "${var.user}@example.com" } }"#]
    );
    assert!(expansion.deferred.is_empty());
}

#[test]
fn test_references_inside_lists_are_kept_as_written() {
    let expansion = expand(&source_rules(vec![(
        "group",
        RuleValue::List(vec![RuleValue::Expr(
            "cloudflare_zero_trust_access_group.ops.id".to_string(),
        )]),
    )]));

    assert_eq!(
        rendered(&expansion),
        vec!["{ group = { id = cloudflare_zero_trust_access_group.ops.id } }"]
    );
}

#[test]
fn test_expand_list_keeps_v5_elements_and_element_order() {
    let elements = vec![
        ConditionElement::Grouped(vec![ConditionRule::new(
            "email",
            object(vec![("email", s("kept@example.com"))]),
            RuleOrigin::Source(0),
        )]),
        ConditionElement::Grouped(source_rules(vec![(
            "email_domain",
            list(&["example.com"]),
        )])),
        ConditionElement::Opaque(RuleValue::Expr("local.extra_rule".to_string())),
    ];

    let result = expand_list(&elements);
    let rendered: Vec<String> = result
        .elements
        .iter()
        .map(|element| match element {
            ExpandedElement::Object(object) => object.to_string(),
            ExpandedElement::Opaque(value) => value.to_string(),
        })
        .collect();

    assert_eq!(
        rendered,
        vec![
            r#"{ email = { email = "kept@example.com" } }"#,
            r#"{ email_domain = { domain = "example.com" } }"#,
            "local.extra_rule",
        ]
    );
    assert_eq!(result.produced, 1);
}

#[test]
fn test_expand_list_of_v5_elements_produces_nothing() {
    let elements = vec![
        ConditionElement::Grouped(source_rules(vec![("everyone", RuleValue::empty_object())])),
        ConditionElement::Grouped(source_rules(vec![(
            "ip",
            object(vec![("ip", s("10.0.0.0/8"))]),
        )])),
    ];

    let result = expand_list(&elements);
    assert_eq!(result.produced, 0);
    assert_eq!(result.elements.len(), 2);
}

#[test]
fn test_is_v5_shaped() {
    assert!(is_v5_shaped(&source_rules(vec![(
        "email",
        object(vec![("email", s("a@example.com"))]),
    )])));
    // Empty siblings do not count.
    assert!(is_v5_shaped(&source_rules(vec![
        ("everyone", RuleValue::empty_object()),
        ("email", RuleValue::List(Vec::new())),
    ])));

    // A v4 list value.
    assert!(!is_v5_shaped(&source_rules(vec![(
        "email",
        list(&["a@example.com"]),
    )])));
    // Object with a list field.
    assert!(!is_v5_shaped(&source_rules(vec![(
        "gsuite",
        object(vec![("email", list(&["a@example.com"]))]),
    )])));
    // Two populated rules.
    assert!(!is_v5_shaped(&source_rules(vec![
        ("everyone", RuleValue::empty_object()),
        ("certificate", RuleValue::empty_object()),
    ])));
    // v4 provider name.
    assert!(!is_v5_shaped(&source_rules(vec![(
        "azure",
        object(vec![("id", s("group-a"))]),
    )])));
}

#[test]
fn test_diagnostic_display_includes_location() {
    let diagnostic = Diagnostic::new("azure", DiagnosticKind::Truncated { dropped: 1 })
        .at("cloudflare_zero_trust_access_policy.allow.include");
    assert_eq!(
        diagnostic.to_string(),
        "cloudflare_zero_trust_access_policy.allow.include: condition 'azure' keeps only its first value; 1 dropped"
    );
}
