//! Backend-agnostic checks for `FormStore` implementations.
//!
//! Pass [`run_conformance_suite`] a factory returning a fresh, empty store;
//! it is called once per case.
//!
//! ```ignore
//! let report = run_conformance_suite(|| async { open_test_store().await }).await;
//! assert_eq!(report.failed(), 0, "{report}");
//! ```

mod forms;
mod state;
mod submissions;

use std::fmt;
use std::future::Future;

use formrule_core::{FieldType, FormDefinition, FormField, FormValues};

use crate::FormStore;

/// One case, named `category/case`.
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub name: String,
    pub error: Option<String>,
}

impl CaseResult {
    fn new(name: &str, result: Result<(), String>) -> Self {
        CaseResult {
            name: name.to_string(),
            error: result.err(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<CaseResult>,
}

impl ConformanceReport {
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_some()).count()
    }
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in &self.results {
            if let Some(error) = &r.error {
                writeln!(f, "FAIL {}: {}", r.name, error)?;
            }
        }
        Ok(())
    }
}

pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: FormStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = forms::run_form_tests(&factory).await;
    results.extend(state::run_state_tests(&factory).await);
    results.extend(submissions::run_submission_tests(&factory).await);
    ConformanceReport { results }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn make_form(id: &str, name: &str) -> FormDefinition {
    let mut form = FormDefinition::new(id, name);
    form.fields.push(FormField::new("email", "Email", FieldType::Text));
    form
}

fn make_values(pairs: &[(&str, &str)]) -> FormValues {
    let mut values = FormValues::new();
    for (name, value) in pairs {
        values.set(*name, *value);
    }
    values
}

fn check<T>(result: Result<T, crate::StorageError>) -> Result<T, String> {
    result.map_err(|e| e.to_string())
}
