//! Common test utilities for building configuration and state documents.
use cfmigrate::prelude::*;
use serde_json::{Value, json};

/// Wraps `body` in an access policy resource block named `allow`.
#[allow(dead_code)]
pub fn policy_config(body: &str) -> String {
    format!(
        "resource \"cloudflare_zero_trust_access_policy\" \"allow\" {{\n{}\n}}\n",
        body
    )
}

/// Runs the configuration rewriter, failing the test on a parse error.
#[allow(dead_code)]
pub fn migrate(src: &str) -> ConfigMigration {
    migrate_config(src).expect("configuration should parse")
}

/// Builds a state resource with a single instance.
#[allow(dead_code)]
pub fn resource(resource_type: &str, name: &str, attributes: Value) -> Value {
    json!({
        "mode": "managed",
        "type": resource_type,
        "name": name,
        "provider": "provider[\"registry.terraform.io/cloudflare/cloudflare\"]",
        "instances": [
            {
                "schema_version": 0,
                "attributes": attributes
            }
        ]
    })
}

/// Builds a state document around `resources`.
#[allow(dead_code)]
pub fn state_document(resources: Vec<Value>) -> Value {
    json!({
        "version": 4,
        "terraform_version": "1.9.5",
        "serial": 7,
        "lineage": "5d3b2c1e-0000-4000-8000-000000000000",
        "outputs": {},
        "resources": resources
    })
}

#[allow(dead_code)]
pub fn state_text(resources: Vec<Value>) -> String {
    serde_json::to_string_pretty(&state_document(resources)).expect("state serializes")
}

/// Migrates a state value with the given migrator and returns the new tree.
#[allow(dead_code)]
pub fn migrate_state_with(migrator: &Migrator, resources: Vec<Value>) -> (Value, MigrationReport) {
    let migration = migrator
        .migrate_state(&state_text(resources))
        .expect("state should migrate");
    let value = serde_json::from_str(&migration.output).expect("output is JSON");
    (value, migration.report)
}

/// Migrates with the default migrator.
#[allow(dead_code)]
pub fn migrate_state(resources: Vec<Value>) -> (Value, MigrationReport) {
    migrate_state_with(&Migrator::default(), resources)
}

/// The attributes of the first instance of the first resource.
#[allow(dead_code)]
pub fn first_attributes(state: &Value) -> &Value {
    &state["resources"][0]["instances"][0]["attributes"]
}
