use super::{InstanceOutcome, ResourceMigrator, StateInstance, singletonize};
use crate::state::PathAccess;
use serde_json::{Map, Value};

const RENAMES: [(&str, &str); 2] = [
    ("fallback_pool_id", "fallback_pool"),
    ("default_pool_ids", "default_pools"),
];

const SINGLE_OBJECT_ATTRIBUTES: [&str; 4] = [
    "adaptive_routing",
    "location_strategy",
    "random_steering",
    "session_affinity_attributes",
];

/// Map-shaped attributes and the key field of their v4 list entries.
const MAP_ATTRIBUTES: [(&str, &str); 3] = [
    ("country_pools", "country"),
    ("pop_pools", "pop"),
    ("region_pools", "region"),
];

/// `cloudflare_load_balancer`.
pub struct LoadBalancerMigrator;

impl ResourceMigrator for LoadBalancerMigrator {
    fn resource_type(&self) -> &str {
        "cloudflare_load_balancer"
    }

    fn migrate(&self, instance: &mut StateInstance<'_>) -> InstanceOutcome {
        let mut changed = false;

        for (old, new) in RENAMES {
            changed |= instance
                .value_mut()
                .rename_path(&format!("attributes.{}", old), new);
        }

        for name in SINGLE_OBJECT_ATTRIBUTES {
            changed |= singletonize(instance, &format!("attributes.{}", name));
        }

        for (name, key_field) in MAP_ATTRIBUTES {
            let path = format!("attributes.{}", name);
            let converted = match instance.value().get_path(&path) {
                Some(Value::Array(entries)) => pools_by_key(entries, key_field),
                _ => None,
            };
            if let Some(map) = converted {
                changed |= instance.value_mut().set_path(&path, Value::Object(map));
            }
        }

        InstanceOutcome::from_changed(changed)
    }
}

/// Converts `[{ "region": "WNAM", "pool_ids": [...] }]` into
/// `{ "WNAM": [...] }`. An empty list becomes `{}`. Returns `None` when an
/// entry does not have that shape.
fn pools_by_key(entries: &[Value], key_field: &str) -> Option<Map<String, Value>> {
    let mut map = Map::new();
    for entry in entries {
        let key = entry.get(key_field)?.as_str()?;
        let pools = entry.get("pool_ids")?;
        map.insert(key.to_string(), pools.clone());
    }
    Some(map)
}
