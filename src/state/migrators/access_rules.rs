use super::{InstanceOutcome, ResourceMigrator, StateInstance};
use crate::conditions::{
    ConditionElement, ConditionRule, ExpandedElement, RuleOrigin, RuleValue, expand_list,
};
use crate::state::PathAccess;
use serde_json::{Number, Value};

const CONDITION_ATTRIBUTES: [&str; 3] = ["include", "exclude", "require"];

/// Rewrites the access-rule family: condition lists are expanded into v5
/// singleton objects, and the policy preset also fixes approval groups,
/// drops attributes v5 no longer has and fills in `session_duration`.
pub struct AccessRuleMigrator {
    resource_type: String,
    approval_groups: bool,
    removed: &'static [&'static str],
    session_duration: Option<&'static str>,
}

impl AccessRuleMigrator {
    pub fn policy() -> Self {
        Self {
            resource_type: "cloudflare_zero_trust_access_policy".to_string(),
            approval_groups: true,
            removed: &["zone_id", "application_id", "precedence", "connection_rules"],
            session_duration: Some("24h"),
        }
    }

    pub fn group() -> Self {
        Self {
            resource_type: "cloudflare_zero_trust_access_group".to_string(),
            approval_groups: false,
            removed: &[],
            session_duration: None,
        }
    }

    fn expand_conditions(&self, instance: &mut StateInstance<'_>, name: &str) -> bool {
        let path = format!("attributes.{}", name);
        let elements: Vec<ConditionElement> = match instance.value().get_path(&path) {
            Some(Value::Array(items)) => items.iter().map(element_from_json).collect(),
            _ => return false,
        };

        let expansion = expand_list(&elements);
        let location = format!("{}.{}", instance.address(), name);
        for diagnostic in expansion.diagnostics {
            instance.diagnose(diagnostic.at(location.clone()));
        }
        if expansion.produced == 0 {
            return false;
        }

        let items = expansion
            .elements
            .iter()
            .map(|element| match element {
                ExpandedElement::Object(object) => object.to_json(),
                ExpandedElement::Opaque(value) => value.to_json(),
            })
            .collect();
        log::debug!("Expanded {} in state", location);
        instance.value_mut().set_path(&path, Value::Array(items))
    }
}

impl ResourceMigrator for AccessRuleMigrator {
    fn resource_type(&self) -> &str {
        &self.resource_type
    }

    fn migrate(&self, instance: &mut StateInstance<'_>) -> InstanceOutcome {
        if !instance.value().is_object_at("attributes") {
            return InstanceOutcome::Unchanged;
        }
        let mut changed = false;

        if self.approval_groups {
            changed |= migrate_approval_groups(instance.value_mut());
        }

        for name in CONDITION_ATTRIBUTES {
            changed |= self.expand_conditions(instance, name);
        }

        for name in self.removed {
            changed |= instance
                .value_mut()
                .delete_path(&format!("attributes.{}", name))
                .is_some();
        }

        // Only a missing key gets the default; an explicit null stays null.
        if let Some(default) = self.session_duration {
            let state = instance.value_mut();
            if !state.exists("attributes.session_duration") {
                changed |= state.set_path(
                    "attributes.session_duration",
                    Value::String(default.to_string()),
                );
            }
        }

        InstanceOutcome::from_changed(changed)
    }
}

fn element_from_json(item: &Value) -> ConditionElement {
    match item {
        Value::Object(fields) => ConditionElement::Grouped(
            fields
                .iter()
                .map(|(key, value)| {
                    ConditionRule::new(key.clone(), RuleValue::from_json(value), RuleOrigin::Key)
                })
                .collect(),
        ),
        other => ConditionElement::Opaque(RuleValue::from_json(other)),
    }
}

fn migrate_approval_groups(state: &mut Value) -> bool {
    const OLD: &str = "attributes.approval_group";

    let groups = match state.get_path(OLD) {
        Some(Value::Array(groups)) => groups.clone(),
        _ => return false,
    };
    if groups.is_empty() {
        return state.delete_path(OLD).is_some();
    }

    let groups = groups.into_iter().map(coerce_approvals_needed).collect();
    state.rename_path(OLD, "approval_groups");
    state.set_path("attributes.approval_groups", Value::Array(groups))
}

/// v5 stores `approvals_needed` as a float.
fn coerce_approvals_needed(mut group: Value) -> Value {
    if let Some(fields) = group.as_object_mut() {
        let float = fields
            .get("approvals_needed")
            .and_then(Value::as_f64)
            .and_then(Number::from_f64);
        if let Some(number) = float {
            fields.insert("approvals_needed".to_string(), Value::Number(number));
        }
    }
    group
}
