pub mod errors;
pub mod persistence;
pub mod traits;
pub(crate) mod validation;

pub use errors::StoreError;
pub use persistence::JsonFileStore;
pub use traits::ProjectStore;
