use super::{InstanceOutcome, ResourceMigrator, StateInstance, singletonize};
use crate::state::PathAccess;
use serde_json::{Value, json};

const SINGLE_OBJECT_ATTRIBUTES: [&str; 2] = ["load_shedding", "origin_steering"];

/// `cloudflare_load_balancer_pool`: nested blocks become single objects and
/// the origin `Host` header becomes `header = { host = [...] }`.
pub struct LoadBalancerPoolMigrator;

impl ResourceMigrator for LoadBalancerPoolMigrator {
    fn resource_type(&self) -> &str {
        "cloudflare_load_balancer_pool"
    }

    fn migrate(&self, instance: &mut StateInstance<'_>) -> InstanceOutcome {
        let mut changed = false;

        for name in SINGLE_OBJECT_ATTRIBUTES {
            changed |= singletonize(instance, &format!("attributes.{}", name));
        }

        let origins = match instance.value().get_path("attributes.origins") {
            Some(Value::Array(origins)) => origins.len(),
            _ => 0,
        };
        for i in 0..origins {
            changed |= migrate_origin_header(
                instance.value_mut(),
                &format!("attributes.origins.{}.header", i),
            );
        }

        changed |= instance
            .value_mut()
            .delete_path("identity_schema_version")
            .is_some();

        InstanceOutcome::from_changed(changed)
    }
}

enum HeaderShape {
    Empty,
    Host(Value),
    Other,
}

fn migrate_origin_header(instance: &mut Value, path: &str) -> bool {
    let shape = match instance.get_path(path) {
        Some(Value::Array(headers)) if headers.is_empty() => HeaderShape::Empty,
        Some(Value::Array(headers)) => host_values(&headers[0]),
        // Half-converted form: the list already unwrapped but not renamed.
        Some(header @ Value::Object(fields)) if !fields.contains_key("host") => host_values(header),
        _ => HeaderShape::Other,
    };

    match shape {
        HeaderShape::Empty => instance.delete_path(path).is_some(),
        HeaderShape::Host(values) => instance.set_path(path, json!({ "host": values })),
        HeaderShape::Other => false,
    }
}

fn host_values(header: &Value) -> HeaderShape {
    let is_host = header.get("header").and_then(Value::as_str) == Some("Host");
    match header.get("values") {
        Some(values) if is_host => HeaderShape::Host(values.clone()),
        _ => HeaderShape::Other,
    }
}
