use crate::config::{self, ConfigMigration, ConfigReport};
use crate::dispatcher::{Dispatcher, DispatcherBuilder, MigrationReport};
use crate::error::{MigrateError, ParseError, StateError};
use crate::state::StateDocument;
use crate::state::migrators::{AccessRuleMigrator, ResourceMigrator};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Config,
    State,
}

impl DocumentKind {
    /// `.tf` is configuration; `.tfstate` and `.json` are state.
    pub fn detect(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "tf" => Some(DocumentKind::Config),
            "tfstate" | "json" => Some(DocumentKind::State),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    InPlace,
    /// Transform and report, but never touch the file.
    DryRun,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMigration {
    pub output: String,
    pub report: MigrationReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DocumentReport {
    Config(ConfigReport),
    State(MigrationReport),
}

/// The result of migrating one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub kind: DocumentKind,
    pub changed: bool,
    pub written: bool,
    pub report: DocumentReport,
}

/// Reads, transforms and writes back configuration and state documents.
pub struct Migrator {
    dispatcher: Dispatcher,
}

pub struct MigratorBuilder {
    dispatcher: DispatcherBuilder,
}

impl MigratorBuilder {
    pub fn new() -> Self {
        Self {
            dispatcher: DispatcherBuilder::new(),
        }
    }

    /// Also expands the condition lists of access groups in state.
    pub fn expand_access_groups(mut self, enabled: bool) -> Self {
        if enabled {
            self.dispatcher = self
                .dispatcher
                .with_migrator(Box::new(AccessRuleMigrator::group()));
        }
        self
    }

    pub fn with_type_mapping(mut self, resource_type: &str, migrator_name: &str) -> Self {
        self.dispatcher = self
            .dispatcher
            .with_type_mapping(resource_type, migrator_name);
        self
    }

    pub fn with_migrator(mut self, migrator: Box<dyn ResourceMigrator>) -> Self {
        self.dispatcher = self.dispatcher.with_migrator(migrator);
        self
    }

    pub fn build(self) -> Migrator {
        Migrator {
            dispatcher: self.dispatcher.build(),
        }
    }
}

impl Default for MigratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Migrator {
    fn default() -> Self {
        MigratorBuilder::new().build()
    }
}

impl Migrator {
    pub fn builder() -> MigratorBuilder {
        MigratorBuilder::new()
    }

    pub fn migrate_config(&self, src: &str) -> Result<ConfigMigration, ParseError> {
        config::migrate_config(src)
    }

    /// Migrates a state document. An unchanged document is returned exactly
    /// as it was read.
    pub fn migrate_state(&self, text: &str) -> Result<StateMigration, StateError> {
        let mut document = StateDocument::parse(text)?;
        let report = self.dispatcher.migrate(&mut document);
        let output = if report.changed() {
            document.to_pretty_string()?
        } else {
            text.to_string()
        };
        Ok(StateMigration { output, report })
    }

    /// Migrates one file. `kind` of `None` detects it from the extension.
    /// The file is rewritten only when its content changed and `mode` allows it.
    pub fn migrate_file(
        &self,
        path: &Path,
        kind: Option<DocumentKind>,
        mode: WriteMode,
    ) -> Result<FileOutcome, MigrateError> {
        let kind = kind
            .or_else(|| DocumentKind::detect(path))
            .ok_or_else(|| MigrateError::UnknownDocumentKind(path.to_path_buf()))?;
        let text = fs::read_to_string(path).map_err(|source| MigrateError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let (output, changed, report) = match kind {
            DocumentKind::Config => {
                let migration = self
                    .migrate_config(&text)
                    .map_err(|source| MigrateError::Config {
                        path: path.to_path_buf(),
                        source,
                    })?;
                let changed = migration.changed();
                (migration.output, changed, DocumentReport::Config(migration.report))
            }
            DocumentKind::State => {
                let migration = self
                    .migrate_state(&text)
                    .map_err(|source| MigrateError::State {
                        path: path.to_path_buf(),
                        source,
                    })?;
                let changed = migration.report.changed();
                (migration.output, changed, DocumentReport::State(migration.report))
            }
        };

        let written = changed && mode == WriteMode::InPlace;
        if written {
            write_atomically(path, &output).map_err(|source| MigrateError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            log::info!("Migrated {}", path.display());
        } else if changed {
            log::info!("Would migrate {}", path.display());
        } else {
            log::debug!("Nothing to migrate in {}", path.display());
        }

        Ok(FileOutcome {
            path: path.to_path_buf(),
            kind,
            changed,
            written,
            report,
        })
    }
}

/// Writes to a temporary sibling, syncs it, then renames it over `path`, so a
/// failed run never leaves a half-written file behind.
fn write_atomically(path: &Path, contents: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let temp_path = dir.join(format!(
        ".{}.cfmigrate.{}.tmp",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    let result = (|| {
        let mut file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&temp_path)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        if let Ok(metadata) = fs::metadata(path) {
            fs::set_permissions(&temp_path, metadata.permissions())?;
        }
        fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}
