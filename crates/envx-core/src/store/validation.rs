//! Structural checks applied to every project record on save and load.

use crate::projects::types::Project;
use crate::store::errors::StoreError;
use crate::validation::check_identifier;

fn invalid(field: String) -> StoreError {
    StoreError::InvalidStructure { field }
}

/// Reject names that can't be used as a record name.
pub(crate) fn validate_record_name(name: &str) -> Result<(), StoreError> {
    check_identifier(name).map_err(|reason| StoreError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

/// Check the aggregate's internal consistency.
///
/// `record_name` is the identifier the record is stored under.
pub(crate) fn validate_project_structure(
    project: &Project,
    record_name: &str,
) -> Result<(), StoreError> {
    if project.name != record_name {
        return Err(invalid(format!(
            "name '{}' does not match record '{}'",
            project.name, record_name
        )));
    }

    if !project.environments.contains_key(&project.default_env) {
        return Err(invalid(format!(
            "default environment '{}' does not exist",
            project.default_env
        )));
    }

    for (env_name, env) in &project.environments {
        if &env.name != env_name {
            return Err(invalid(format!(
                "environment '{}' is stored under '{}'",
                env.name, env_name
            )));
        }

        for (key, variable) in &env.variables {
            if &variable.key != key {
                return Err(invalid(format!(
                    "variable '{}' is stored under '{}' in environment '{}'",
                    variable.key, key, env_name
                )));
            }
        }
    }

    Ok(())
}
