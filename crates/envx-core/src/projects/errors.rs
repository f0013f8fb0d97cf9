use crate::errors::EnvxError;
use crate::store::StoreError;

/// Errors from profile operations.
///
/// The three `*NotFound` variants tell the caller which coordinate was
/// missing: the project, the environment inside it, or the key inside that.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Project '{project}' not found")]
    ProjectNotFound { project: String },

    #[error("Environment '{env}' not found in project '{project}'")]
    EnvironmentNotFound { project: String, env: String },

    #[error("Variable '{key}' not found in {project}/{env}")]
    VariableNotFound {
        project: String,
        env: String,
        key: String,
    },

    #[error("Project '{project}' already exists")]
    AlreadyExists { project: String },

    #[error("Project '{project}' was modified by another process, retry the command")]
    Conflict { project: String },

    #[error("Invalid {kind} name '{name}': {reason}")]
    InvalidName {
        kind: &'static str,
        name: String,
        reason: String,
    },

    #[error("Storage error: {source}")]
    Store {
        #[source]
        source: StoreError,
    },
}

impl ProfileError {
    /// True for any of the missing project / environment / variable cases.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ProfileError::ProjectNotFound { .. }
                | ProfileError::EnvironmentNotFound { .. }
                | ProfileError::VariableNotFound { .. }
        )
    }
}

impl From<StoreError> for ProfileError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { name } => ProfileError::ProjectNotFound { project: name },
            StoreError::AlreadyExists { name } => ProfileError::AlreadyExists { project: name },
            StoreError::InvalidName { name, reason } => ProfileError::InvalidName {
                kind: "project",
                name,
                reason,
            },
            other => ProfileError::Store { source: other },
        }
    }
}

impl EnvxError for ProfileError {
    fn error_code(&self) -> &'static str {
        match self {
            ProfileError::ProjectNotFound { .. } => "PROJECT_NOT_FOUND",
            ProfileError::EnvironmentNotFound { .. } => "ENVIRONMENT_NOT_FOUND",
            ProfileError::VariableNotFound { .. } => "VARIABLE_NOT_FOUND",
            ProfileError::AlreadyExists { .. } => "PROJECT_ALREADY_EXISTS",
            ProfileError::Conflict { .. } => "PROJECT_CONFLICT",
            ProfileError::InvalidName { .. } => "INVALID_NAME",
            ProfileError::Store { source } => source.error_code(),
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            ProfileError::ProjectNotFound { .. }
            | ProfileError::EnvironmentNotFound { .. }
            | ProfileError::VariableNotFound { .. }
            | ProfileError::AlreadyExists { .. }
            | ProfileError::Conflict { .. }
            | ProfileError::InvalidName { .. } => true,

            ProfileError::Store { source } => source.is_user_error(),
        }
    }
}
