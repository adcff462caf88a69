//! In-process `FormStore` backed by `tokio::sync::RwLock`.
//!
//! Nothing is persisted; dropping the store drops its contents.

use std::collections::HashMap;

use async_trait::async_trait;
use formrule_core::{FormDefinition, FormValues};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StorageError;
use crate::record::FormSubmission;
use crate::traits::FormStore;

#[derive(Debug, Default)]
pub struct MemoryFormStore {
    forms: RwLock<Vec<FormDefinition>>,
    states: RwLock<HashMap<String, FormValues>>,
    submissions: RwLock<Vec<FormSubmission>>,
}

impl MemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `forms`.
    pub fn with_forms(forms: Vec<FormDefinition>) -> Self {
        MemoryFormStore {
            forms: RwLock::new(forms),
            ..Self::default()
        }
    }
}

#[async_trait]
impl FormStore for MemoryFormStore {
    async fn list_forms(&self) -> Result<Vec<FormDefinition>, StorageError> {
        Ok(self.forms.read().await.clone())
    }

    async fn get_form(&self, form_id: &str) -> Result<FormDefinition, StorageError> {
        self.forms
            .read()
            .await
            .iter()
            .find(|f| f.id == form_id)
            .cloned()
            .ok_or_else(|| StorageError::FormNotFound {
                form_id: form_id.to_string(),
            })
    }

    async fn save_form(&self, mut form: FormDefinition) -> Result<String, StorageError> {
        if form.id.is_empty() {
            form.id = Uuid::new_v4().to_string();
        }
        let id = form.id.clone();
        let mut forms = self.forms.write().await;
        forms.retain(|f| f.id != id);
        forms.push(form);
        tracing::debug!(form = %id, "form saved");
        Ok(id)
    }

    async fn delete_form(&self, form_id: &str) -> Result<(), StorageError> {
        self.forms.write().await.retain(|f| f.id != form_id);
        Ok(())
    }

    async fn save_state(&self, form_id: &str, values: &FormValues) -> Result<(), StorageError> {
        self.states
            .write()
            .await
            .insert(form_id.to_string(), values.clone());
        Ok(())
    }

    async fn load_state(&self, form_id: &str) -> Result<Option<FormValues>, StorageError> {
        Ok(self.states.read().await.get(form_id).cloned())
    }

    async fn clear_state(&self, form_id: &str) -> Result<(), StorageError> {
        self.states.write().await.remove(form_id);
        Ok(())
    }

    async fn add_submission(
        &self,
        mut submission: FormSubmission,
    ) -> Result<FormSubmission, StorageError> {
        if submission.form_id.is_empty() {
            return Err(StorageError::InvalidRecord {
                message: "submission has no form id".to_string(),
            });
        }
        if submission.id.is_empty() {
            submission.id = Uuid::new_v4().to_string();
        }
        if submission.submitted_at.is_none() {
            submission.submitted_at = Some(OffsetDateTime::now_utc());
        }
        self.submissions.write().await.push(submission.clone());
        Ok(submission)
    }

    async fn list_submissions(
        &self,
        form_id: Option<&str>,
    ) -> Result<Vec<FormSubmission>, StorageError> {
        Ok(self
            .submissions
            .read()
            .await
            .iter()
            .filter(|s| form_id.map_or(true, |id| s.form_id == id))
            .cloned()
            .collect())
    }

    async fn update_submission(&self, submission: FormSubmission) -> Result<(), StorageError> {
        let mut submissions = self.submissions.write().await;
        let slot = submissions
            .iter_mut()
            .find(|s| s.id == submission.id)
            .ok_or_else(|| StorageError::SubmissionNotFound {
                submission_id: submission.id.clone(),
            })?;
        *slot = submission;
        Ok(())
    }
}
