//! envx-core: Core library for local-first environment variable management
//!
//! Projects hold named environments, environments hold key/value variables.
//! Each project is persisted as one JSON document under a per-user directory.
//!
//! # Main Entry Points
//!
//! - [`projects`] - Data model and the [`ProfileManager`] enforcing its rules
//! - [`store`] - Durable per-project records ([`ProjectStore`], [`JsonFileStore`])
//! - [`display`] - Secret masking for output
//! - [`config`] - Storage paths and user preferences

pub mod config;
pub mod display;
pub mod errors;
pub mod events;
pub mod logging;
pub mod projects;
pub mod store;
pub mod validation;

// Re-export commonly used types at crate root for convenience
pub use config::{Config, EnvxConfig};
pub use errors::{ConfigError, EnvxError, EnvxResult};
pub use projects::{Environment, ProfileError, ProfileManager, Project, Variable};
pub use store::{JsonFileStore, ProjectStore, StoreError};

pub use logging::init_logging;
