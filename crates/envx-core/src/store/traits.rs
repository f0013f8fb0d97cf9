use super::errors::StoreError;
use crate::projects::types::Project;

/// Durable storage for project records.
///
/// Maps a project name to a whole [`Project`] aggregate and back. Implementations
/// know nothing about environments or variables beyond the record's shape.
///
/// # Semantics
///
/// - **create**: writes a new record, failing with `AlreadyExists` instead of
///   replacing one that is already there. The check and the write are one step.
/// - **save**: replaces the full record. Readers never observe a partial write.
/// - **load**: reads current state on every call (no caching).
/// - **exists**: never fails; an unusable name simply doesn't exist.
/// - **list**: empty when nothing is stored.
pub trait ProjectStore {
    fn create(&self, project: &Project) -> Result<(), StoreError>;
    fn save(&self, project: &Project) -> Result<(), StoreError>;
    fn load(&self, name: &str) -> Result<Project, StoreError>;
    fn exists(&self, name: &str) -> bool;
    fn list(&self) -> Result<Vec<String>, StoreError>;
    fn delete(&self, name: &str) -> Result<(), StoreError>;
}
