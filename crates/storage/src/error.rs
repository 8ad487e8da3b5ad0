/// All errors that can be returned by a ProfileStore implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No profile row exists for the user. Reads return `Ok(None)` instead;
    /// this is raised by writes that require an existing profile.
    #[error("profile not found: {user_id}")]
    ProfileNotFound { user_id: String },

    /// A record with the same key already exists.
    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: &'static str, id: String },

    /// A timestamp field is not RFC 3339.
    #[error("invalid {field} timestamp '{value}': {message}")]
    InvalidTimestamp {
        field: &'static str,
        value: String,
        message: String,
    },

    /// Fixture data could not be loaded.
    #[error("invalid fixture: {0}")]
    InvalidFixture(String),

    /// A backend-specific storage error (DB connection, serialization, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}
