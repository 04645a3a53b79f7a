//! Per-resource-type state rewriters and their registry.

mod access_rules;
mod load_balancer;
mod load_balancer_pool;
mod tiered_cache;

pub use access_rules::AccessRuleMigrator;
pub use load_balancer::LoadBalancerMigrator;
pub use load_balancer_pool::LoadBalancerPoolMigrator;
pub use tiered_cache::TieredCacheMigrator;

use super::PathAccess;
use crate::conditions::{Diagnostic, DiagnosticKind};
use ahash::AHashMap;
use serde::Serialize;
use serde_json::Value;

/// Defines the contract for rewriting the state instances of one resource type.
///
/// Implementations must be idempotent: running one over an instance it has
/// already rewritten reports [`InstanceOutcome::Unchanged`].
pub trait ResourceMigrator: Send + Sync {
    fn resource_type(&self) -> &str;
    fn migrate(&self, instance: &mut StateInstance<'_>) -> InstanceOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceOutcome {
    Unchanged,
    Rewritten,
    /// Left for the provider's own state upgrader.
    Deferred,
}

impl InstanceOutcome {
    pub fn from_changed(changed: bool) -> Self {
        if changed {
            InstanceOutcome::Rewritten
        } else {
            InstanceOutcome::Unchanged
        }
    }
}

/// One `resources[i].instances[j]` entry handed to a migrator.
pub struct StateInstance<'a> {
    resource_type: &'a str,
    address: &'a str,
    value: &'a mut Value,
    relabel: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> StateInstance<'a> {
    pub fn new(resource_type: &'a str, address: &'a str, value: &'a mut Value) -> Self {
        Self {
            resource_type,
            address,
            value,
            relabel: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn resource_type(&self) -> &str {
        self.resource_type
    }

    /// `<type>.<name>` of the owning resource.
    pub fn address(&self) -> &str {
        self.address
    }

    pub fn value(&self) -> &Value {
        self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        self.value
    }

    /// Asks the dispatcher to change the owning resource's type once all of
    /// its instances have been visited.
    pub fn relabel(&mut self, resource_type: impl Into<String>) {
        self.relabel = Some(resource_type.into());
    }

    pub fn diagnose(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Vec<Diagnostic>) {
        (self.relabel, self.diagnostics)
    }
}

/// Leaves instances untouched for the provider's state upgrader.
pub struct DeferredMigrator {
    resource_type: String,
}

impl DeferredMigrator {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
        }
    }
}

impl ResourceMigrator for DeferredMigrator {
    fn resource_type(&self) -> &str {
        &self.resource_type
    }

    fn migrate(&self, instance: &mut StateInstance<'_>) -> InstanceOutcome {
        log::debug!("Deferring {} to the provider upgrader", instance.address());
        InstanceOutcome::Deferred
    }
}

/// Replaces a list holding at most one object with that object; an empty
/// list is deleted. Extra elements are dropped with a diagnostic.
pub(crate) fn singletonize(instance: &mut StateInstance<'_>, path: &str) -> bool {
    let items = match instance.value().get_path(path) {
        Some(Value::Array(items)) => items.clone(),
        _ => return false,
    };
    let mut items = items.into_iter();
    match items.next() {
        None => {
            instance.value_mut().delete_path(path);
        }
        Some(first) => {
            let dropped = items.len();
            instance.value_mut().set_path(path, first);
            if dropped > 0 {
                let name = path.rsplit('.').next().unwrap_or(path);
                let diagnostic = Diagnostic::new(name, DiagnosticKind::Truncated { dropped })
                    .at(instance.address().to_string());
                instance.diagnose(diagnostic);
            }
        }
    }
    true
}

/// Master macro defining the built-in migrators: which are registered by
/// default and which can be looked up by name for type mappings.
macro_rules! define_resource_migrators {
    (
        default { $( ($name:literal, $ctor:expr) ),* $(,)? }
        optional { $( ($opt_name:literal, $opt_ctor:expr) ),* $(,)? }
    ) => {
        pub(crate) fn register_default_migrators(registry: &mut AHashMap<String, Box<dyn ResourceMigrator>>) {
            $( registry.insert($name.to_string(), Box::new($ctor)); )*
        }

        pub(crate) fn create_migrator_by_name(name: &str) -> Option<Box<dyn ResourceMigrator>> {
            match name {
                $( $name => Some(Box::new($ctor)), )*
                $( $opt_name => Some(Box::new($opt_ctor)), )*
                _ => None,
            }
        }
    };
}

define_resource_migrators! {
    default {
        ("cloudflare_load_balancer_pool", LoadBalancerPoolMigrator),
        ("cloudflare_load_balancer", LoadBalancerMigrator),
        ("cloudflare_tiered_cache", TieredCacheMigrator),
        ("cloudflare_zero_trust_access_policy", DeferredMigrator::new("cloudflare_zero_trust_access_policy")),
    }
    optional {
        ("cloudflare_zero_trust_access_group", AccessRuleMigrator::group()),
        ("access_policy_rules", AccessRuleMigrator::policy()),
    }
}
