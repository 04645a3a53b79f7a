use crate::conditions::Diagnostic;
use crate::state::StateDocument;
use crate::state::migrators::{
    InstanceOutcome, ResourceMigrator, StateInstance, create_migrator_by_name,
    register_default_migrators,
};
use ahash::AHashMap;
use serde::Serialize;
use serde_json::Value;

/// A resource whose type changed during migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relabel {
    pub address: String,
    pub from: String,
    pub to: String,
}

/// What happened to one state document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub resources: usize,
    pub rewritten: usize,
    pub deferred: usize,
    pub unchanged: usize,
    pub relabelled: Vec<Relabel>,
    pub diagnostics: Vec<Diagnostic>,
}

impl MigrationReport {
    pub fn changed(&self) -> bool {
        self.rewritten > 0 || !self.relabelled.is_empty()
    }

    fn record(&mut self, outcome: InstanceOutcome) {
        match outcome {
            InstanceOutcome::Unchanged => self.unchanged += 1,
            InstanceOutcome::Rewritten => self.rewritten += 1,
            InstanceOutcome::Deferred => self.deferred += 1,
        }
    }
}

/// Routes every state resource to the migrator registered for its type.
/// Types without a migrator are left alone.
pub struct Dispatcher {
    registry: AHashMap<String, Box<dyn ResourceMigrator>>,
}

pub struct DispatcherBuilder {
    registry: AHashMap<String, Box<dyn ResourceMigrator>>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        let mut registry: AHashMap<String, Box<dyn ResourceMigrator>> = AHashMap::new();
        register_default_migrators(&mut registry);
        Self { registry }
    }

    /// Routes `resource_type` to the built-in migrator named `migrator_name`.
    /// Unknown migrator names are ignored.
    pub fn with_type_mapping(mut self, resource_type: &str, migrator_name: &str) -> Self {
        match create_migrator_by_name(migrator_name) {
            Some(migrator) => {
                self.registry.insert(resource_type.to_string(), migrator);
            }
            None => log::warn!("No built-in migrator named '{}'", migrator_name),
        }
        self
    }

    /// Registers a migrator for its own resource type, replacing any existing one.
    pub fn with_migrator(mut self, migrator: Box<dyn ResourceMigrator>) -> Self {
        self.registry
            .insert(migrator.resource_type().to_string(), migrator);
        self
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            registry: self.registry,
        }
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        DispatcherBuilder::new().build()
    }
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub fn handles(&self, resource_type: &str) -> bool {
        self.registry.contains_key(resource_type)
    }

    /// Migrates every resource instance of the document in place.
    pub fn migrate(&self, document: &mut StateDocument) -> MigrationReport {
        let mut report = MigrationReport::default();

        for resource in document.resources_mut() {
            report.resources += 1;
            let resource_type = resource
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let name = resource
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let address = format!("{}.{}", resource_type, name);

            let instances = match resource.get("instances") {
                Some(Value::Array(instances)) => instances.len(),
                _ => 0,
            };
            let Some(migrator) = self.registry.get(&resource_type) else {
                report.unchanged += instances;
                continue;
            };

            let mut relabel = None;
            if let Some(Value::Array(instances)) = resource.get_mut("instances") {
                for value in instances.iter_mut() {
                    let mut instance = StateInstance::new(&resource_type, &address, value);
                    let outcome = migrator.migrate(&mut instance);
                    log::debug!("{} -> {:?}", address, outcome);
                    report.record(outcome);

                    let (wanted, diagnostics) = instance.into_parts();
                    relabel = wanted.or(relabel);
                    report.diagnostics.extend(diagnostics);
                }
            }

            if let Some(new_type) = relabel {
                if new_type != resource_type {
                    if let Some(fields) = resource.as_object_mut() {
                        fields.insert("type".to_string(), Value::String(new_type.clone()));
                    }
                    log::info!("Relabelled {} as {}", address, new_type);
                    report.relabelled.push(Relabel {
                        address,
                        from: resource_type,
                        to: new_type,
                    });
                }
            }
        }

        report
    }
}
