use formrule_core::FormValues;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A completed form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    /// Empty until the store assigns one.
    #[serde(default)]
    pub id: String,
    pub form_id: String,
    pub values: FormValues,
    /// RFC 3339; filled in by the store when absent.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub submitted_at: Option<OffsetDateTime>,
}

impl FormSubmission {
    pub fn new(form_id: impl Into<String>, values: FormValues) -> Self {
        FormSubmission {
            id: String::new(),
            form_id: form_id.into(),
            values,
            submitted_at: None,
        }
    }
}
