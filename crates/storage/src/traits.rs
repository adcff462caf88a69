use async_trait::async_trait;
use formrule_core::{FormDefinition, FormValues};

use crate::error::StorageError;
use crate::record::FormSubmission;

/// The storage trait for form definitions, in-progress values and
/// submissions.
///
/// ## Copy Semantics
///
/// Every read returns an owned copy and every write stores one. Mutating a
/// returned [`FormDefinition`] or [`FormValues`] never affects the store
/// until it is saved again.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` so a store can be shared
/// across async tasks behind an `Arc`.
#[async_trait]
pub trait FormStore: Send + Sync + 'static {
    // ── Form definitions ─────────────────────────────────────────────────────

    /// All stored forms, in insertion order.
    async fn list_forms(&self) -> Result<Vec<FormDefinition>, StorageError>;

    /// Returns `Err(StorageError::FormNotFound)` if no form has this id.
    async fn get_form(&self, form_id: &str) -> Result<FormDefinition, StorageError>;

    /// Store a form, replacing any form with the same id.
    ///
    /// A form with an empty id is assigned a fresh UUID. Returns the id the
    /// form was stored under.
    async fn save_form(&self, form: FormDefinition) -> Result<String, StorageError>;

    /// Delete a form. Deleting an unknown id is not an error.
    async fn delete_form(&self, form_id: &str) -> Result<(), StorageError>;

    // ── In-progress values ───────────────────────────────────────────────────

    async fn save_state(&self, form_id: &str, values: &FormValues) -> Result<(), StorageError>;

    /// `None` when no state was saved for the form.
    async fn load_state(&self, form_id: &str) -> Result<Option<FormValues>, StorageError>;

    async fn clear_state(&self, form_id: &str) -> Result<(), StorageError>;

    // ── Submissions ──────────────────────────────────────────────────────────

    /// Store a submission, assigning an id and a timestamp when missing.
    /// Returns the stored record.
    async fn add_submission(
        &self,
        submission: FormSubmission,
    ) -> Result<FormSubmission, StorageError>;

    /// Submissions in insertion order, optionally filtered by form id.
    async fn list_submissions(
        &self,
        form_id: Option<&str>,
    ) -> Result<Vec<FormSubmission>, StorageError>;

    /// Replace the submission with the same id.
    ///
    /// Returns `Err(StorageError::SubmissionNotFound)` if the id is unknown.
    async fn update_submission(&self, submission: FormSubmission) -> Result<(), StorageError>;
}
