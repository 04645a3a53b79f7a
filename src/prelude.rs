//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the cfmigrate crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use cfmigrate::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let text = std::fs::read_to_string("terraform.tfstate")?;
//!
//! let migrator = Migrator::default();
//! let migration = migrator.migrate_state(&text)?;
//!
//! println!("Rewritten instances: {}", migration.report.rewritten);
//! # Ok(())
//! # }
//! ```

// File boundary and document-level entry points
pub use crate::migrator::{
    DocumentKind, DocumentReport, FileOutcome, Migrator, MigratorBuilder, StateMigration,
    WriteMode,
};
pub use crate::config::{ConfigMigration, ConfigReport, migrate_config};

// State dispatch
pub use crate::dispatcher::{Dispatcher, DispatcherBuilder, MigrationReport, Relabel};
pub use crate::state::migrators::{InstanceOutcome, ResourceMigrator, StateInstance};
pub use crate::state::{PathAccess, StateDocument};

// Condition expansion
pub use crate::conditions::{
    ConditionElement, ConditionObject, ConditionRule, DeferredCondition, Diagnostic,
    DiagnosticKind, RuleOrigin, RuleValue, expand, expand_list,
};

// Error types
pub use crate::error::{MigrateError, ParseError, StateError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
