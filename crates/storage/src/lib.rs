pub mod appwrite;
pub mod error;
pub mod local;
pub mod object;

pub use appwrite::AppwriteStorage;
pub use error::StorageError;
pub use object::{ObjectStorage, StoredObject};
