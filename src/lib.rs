//! # cfmigrate - Cloudflare Terraform v4 to v5 Migration Engine
//!
//! **cfmigrate** rewrites Terraform configuration (`.tf`) and state
//! (`terraform.tfstate`) documents written against the v4 Cloudflare provider
//! schema into the shape the v5 provider expects. Both rewriters edit the
//! document in place: configuration edits replace only the byte ranges that
//! change, and state edits walk the JSON tree without reordering keys.
//!
//! ## Core Workflow
//!
//! 1.  **Configuration**: legacy resource types are renamed, then every
//!     `include`/`exclude`/`require` list of an access policy or group is
//!     expanded from grouped v4 conditions into v5 singleton condition objects.
//! 2.  **State**: every resource is dispatched to the migrator registered for its
//!     type. Migrators rename, singletonize and delete attributes, and may ask for
//!     the resource to be relabelled under a new type.
//! 3.  **Files**: [`migrator::Migrator`] ties both together, detects the document
//!     kind from the file extension and writes results back atomically.
//!
//! Every transform is idempotent: running it over its own output changes nothing.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cfmigrate::prelude::*;
//! use std::path::Path;
//!
//! # fn run_example() -> Result<()> {
//! let migrator = Migrator::builder()
//!     .expand_access_groups(true)
//!     .build();
//!
//! // Transform text directly...
//! let config = migrator.migrate_config(r#"
//! resource "cloudflare_access_policy" "allow" {
//!   include = [{ email = ["a@example.com", "b@example.com"] }]
//! }
//! "#)?;
//! println!("{}", config.output);
//!
//! // ...or migrate files on disk.
//! let outcome = migrator.migrate_file(Path::new("terraform.tfstate"), None, WriteMode::DryRun)?;
//! println!("{} changed: {}", outcome.path.display(), outcome.changed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Migrators
//!
//! State handling is open for extension. Implement
//! [`state::migrators::ResourceMigrator`] for a resource type and register it on
//! the builder, or route another type to a built-in migrator by name:
//!
//! ```rust,no_run
//! use cfmigrate::prelude::*;
//! use serde_json::Value;
//!
//! struct DropLegacyFlag;
//!
//! impl ResourceMigrator for DropLegacyFlag {
//!     fn resource_type(&self) -> &str {
//!         "cloudflare_zone_settings_override"
//!     }
//!
//!     fn migrate(&self, instance: &mut StateInstance<'_>) -> InstanceOutcome {
//!         let removed = instance.value_mut().delete_path("attributes.legacy_flag");
//!         InstanceOutcome::from_changed(removed.is_some())
//!     }
//! }
//!
//! let migrator = Migrator::builder()
//!     .with_migrator(Box::new(DropLegacyFlag))
//!     .with_type_mapping("cloudflare_zero_trust_access_policy", "access_policy_rules")
//!     .build();
//! # let _ = (migrator, Value::Null);
//! ```

pub mod conditions;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod hcl;
pub mod migrator;
pub mod prelude;
pub mod state;
