use super::{InstanceOutcome, ResourceMigrator, StateInstance};
use crate::state::PathAccess;
use serde_json::Value;

const CACHE_TYPE: &str = "attributes.cache_type";

/// `cloudflare_tiered_cache`: `cache_type` becomes `value`, and the
/// `generic` variant moves to `cloudflare_argo_tiered_caching`.
pub struct TieredCacheMigrator;

impl ResourceMigrator for TieredCacheMigrator {
    fn resource_type(&self) -> &str {
        "cloudflare_tiered_cache"
    }

    fn migrate(&self, instance: &mut StateInstance<'_>) -> InstanceOutcome {
        let (value, relabel) = match instance.value().get_path(CACHE_TYPE).and_then(Value::as_str) {
            Some("generic") => ("on", true),
            Some("smart") => ("on", false),
            Some("off") => ("off", false),
            Some(other) => {
                log::debug!(
                    "Leaving {} with unknown cache_type '{}'",
                    instance.address(),
                    other
                );
                return InstanceOutcome::Unchanged;
            }
            None => return InstanceOutcome::Unchanged,
        };

        let state = instance.value_mut();
        state.rename_path(CACHE_TYPE, "value");
        state.set_path("attributes.value", Value::String(value.to_string()));
        if relabel {
            instance.relabel("cloudflare_argo_tiered_caching");
        }
        InstanceOutcome::Rewritten
    }
}
