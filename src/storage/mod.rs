mod filesystem;
mod memory;
mod store;

pub use filesystem::FilesystemStore;
pub use memory::MemoryStore;
pub use store::KeyValueStore;

/// Keys are used as file names by the filesystem backend, so they are kept
/// to a conservative character set.
pub fn validate_key(key: &str) -> Result<(), crate::error::StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(crate::error::StorageError::InvalidKey(key.to_string()))
    }
}
