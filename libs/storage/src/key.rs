use crate::{StorageError, StorageResult};

/// Reject keys that could escape the storage root.
///
/// A key must be non-empty, relative, and made of non-empty segments none of
/// which is `.` or `..`.
pub fn validate_key(key: &str) -> StorageResult<()> {
    let invalid = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if invalid {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// `prefix/name` with surplus slashes removed
pub fn join_key(prefix: &str, name: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), name.trim_start_matches('/'))
}
