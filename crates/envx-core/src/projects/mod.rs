pub mod errors;
pub mod manager;
pub mod types;

pub use errors::ProfileError;
pub use manager::ProfileManager;
pub use types::{Environment, Project, Variable};
