//! JSON file persistence for project records.
//!
//! One `<name>.json` file per project under the store root. Saves go through a
//! temp file and a rename so a record is either the old or the new version.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::projects::types::Project;
use crate::store::errors::StoreError;
use crate::store::traits::ProjectStore;
use crate::store::validation::{validate_project_structure, validate_record_name};

const RECORD_EXTENSION: &str = "json";

/// Project store backed by a directory of JSON files.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Store records under `root`. The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store records in the configured projects directory.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.projects_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        validate_record_name(name)?;
        Ok(self
            .root
            .join(format!("{}.{}", name, RECORD_EXTENSION)))
    }

    /// Validate and serialize `project` into `temp_file`, creating the root if needed.
    fn write_temp_file(&self, project: &Project, temp_file: &Path) -> Result<(), StoreError> {
        validate_project_structure(project, &project.name)?;

        fs::create_dir_all(&self.root).map_err(|e| StoreError::WriteFailed {
            path: self.root.clone(),
            message: format!("Failed to create store directory: {}", e),
        })?;

        let json = serde_json::to_string_pretty(project).map_err(|e| {
            tracing::error!(
                event = "core.store.serialization_failed",
                project = %project.name,
                error = %e,
                "Failed to serialize project to JSON"
            );
            StoreError::WriteFailed {
                path: temp_file.to_path_buf(),
                message: format!("Failed to serialize project: {}", e),
            }
        })?;

        if let Err(e) = fs::write(temp_file, &json) {
            cleanup_temp_file(temp_file, &e);
            return Err(StoreError::WriteFailed {
                path: temp_file.to_path_buf(),
                message: e.to_string(),
            });
        }

        Ok(())
    }
}

fn cleanup_temp_file(temp_file: &Path, original_error: &std::io::Error) {
    if let Err(cleanup_err) = fs::remove_file(temp_file) {
        tracing::warn!(
            event = "core.store.temp_file_cleanup_failed",
            temp_file = %temp_file.display(),
            original_error = %original_error,
            cleanup_error = %cleanup_err,
            "Failed to clean up temp file after write error"
        );
    }
}

impl ProjectStore for JsonFileStore {
    fn create(&self, project: &Project) -> Result<(), StoreError> {
        let path = self.record_path(&project.name)?;
        // Per-process name so concurrent creators never share a temp file
        let temp_file = path.with_extension(format!("json.{}.tmp", std::process::id()));

        self.write_temp_file(project, &temp_file)?;

        // Unlike rename, linking never replaces an existing record
        let linked = fs::hard_link(&temp_file, &path);
        if let Err(e) = fs::remove_file(&temp_file) {
            tracing::warn!(
                event = "core.store.temp_file_cleanup_failed",
                temp_file = %temp_file.display(),
                cleanup_error = %e
            );
        }

        match linked {
            Ok(()) => {
                tracing::info!(
                    event = "core.store.create_completed",
                    project = %project.name,
                    path = %path.display()
                );
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                tracing::warn!(
                    event = "core.store.create_failed",
                    project = %project.name,
                    reason = "already_exists"
                );
                Err(StoreError::AlreadyExists {
                    name: project.name.clone(),
                })
            }
            Err(e) => Err(StoreError::WriteFailed {
                path,
                message: e.to_string(),
            }),
        }
    }

    fn save(&self, project: &Project) -> Result<(), StoreError> {
        let path = self.record_path(&project.name)?;
        let temp_file = path.with_extension("json.tmp");

        self.write_temp_file(project, &temp_file)?;

        if let Err(e) = fs::rename(&temp_file, &path) {
            cleanup_temp_file(&temp_file, &e);
            return Err(StoreError::WriteFailed {
                path,
                message: e.to_string(),
            });
        }

        tracing::info!(
            event = "core.store.save_completed",
            project = %project.name,
            path = %path.display()
        );

        Ok(())
    }

    fn load(&self, name: &str) -> Result<Project, StoreError> {
        let path = self.record_path(name)?;

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    name: name.to_string(),
                });
            }
            Err(e) => {
                tracing::error!(
                    event = "core.store.load_read_failed",
                    path = %path.display(),
                    error = %e
                );
                return Err(StoreError::ReadFailed { path, source: e });
            }
        };

        let project: Project = serde_json::from_str(&content).map_err(|e| {
            tracing::error!(
                event = "core.store.load_invalid_json",
                path = %path.display(),
                error = %e
            );
            StoreError::Corrupted {
                name: name.to_string(),
                message: e.to_string(),
            }
        })?;

        if let Err(e) = validate_project_structure(&project, name) {
            tracing::error!(
                event = "core.store.load_invalid_structure",
                path = %path.display(),
                error = %e
            );
            return Err(StoreError::Corrupted {
                name: name.to_string(),
                message: e.to_string(),
            });
        }

        Ok(project)
    }

    fn exists(&self, name: &str) -> bool {
        self.record_path(name)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.root).map_err(|e| StoreError::ReadFailed {
            path: self.root.clone(),
            source: e,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::ReadFailed {
                path: self.root.clone(),
                source: e,
            })?;
            let path = entry.path();

            // Only `<name>.json`; `<name>.json.tmp` has extension "tmp"
            if !path.is_file()
                || path.extension().and_then(|s| s.to_str()) != Some(RECORD_EXTENSION)
            {
                continue;
            }

            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    fn delete(&self, name: &str) -> Result<(), StoreError> {
        let path = self.record_path(name)?;

        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(
                    event = "core.store.delete_completed",
                    project = name,
                    path = %path.display()
                );
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(StoreError::WriteFailed {
                path,
                message: e.to_string(),
            }),
        }
    }
}
