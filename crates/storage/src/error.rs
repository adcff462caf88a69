/// All errors that can be returned by a FormStore implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No form definition with the given id.
    #[error("form not found: {form_id}")]
    FormNotFound { form_id: String },

    /// No submission with the given id.
    #[error("submission not found: {submission_id}")]
    SubmissionNotFound { submission_id: String },

    /// A record could not be stored as given (e.g. a submission without a form id).
    #[error("invalid record: {message}")]
    InvalidRecord { message: String },

    /// A backend-specific storage error (connection, serialization, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}
