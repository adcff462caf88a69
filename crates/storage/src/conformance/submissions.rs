use std::future::Future;

use super::{check, make_values, CaseResult};
use crate::{FormStore, FormSubmission, StorageError};

pub(super) async fn run_submission_tests<S, F, Fut>(factory: &F) -> Vec<CaseResult>
where
    S: FormStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        CaseResult::new("submissions/add_assigns_id_and_timestamp", add_assigns_id_and_timestamp(factory).await),
        CaseResult::new("submissions/add_keeps_given_id", add_keeps_given_id(factory).await),
        CaseResult::new("submissions/list_filters_by_form", list_filters_by_form(factory).await),
        CaseResult::new("submissions/update_replaces_record", update_replaces_record(factory).await),
        CaseResult::new("submissions/update_unknown_is_not_found", update_unknown_is_not_found(factory).await),
    ]
}

// ── Test implementations ──────────────────────────────────────────────────────

async fn add_assigns_id_and_timestamp<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let stored = check(
        s.add_submission(FormSubmission::new("reg", make_values(&[("Email", "a")])))
            .await,
    )?;
    if stored.id.is_empty() {
        return Err("submission id not assigned".to_string());
    }
    if stored.submitted_at.is_none() {
        return Err("submission timestamp not assigned".to_string());
    }
    Ok(())
}

async fn add_keeps_given_id<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut submission = FormSubmission::new("reg", make_values(&[]));
    submission.id = "sub-1".to_string();
    let stored = check(s.add_submission(submission).await)?;
    if stored.id != "sub-1" {
        return Err(format!("expected id \"sub-1\", got \"{}\"", stored.id));
    }
    Ok(())
}

async fn list_filters_by_form<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for form_id in ["a", "b", "a"] {
        check(s.add_submission(FormSubmission::new(form_id, make_values(&[]))).await)?;
    }
    let all = check(s.list_submissions(None).await)?;
    let only_a = check(s.list_submissions(Some("a")).await)?;
    if all.len() != 3 {
        return Err(format!("expected 3 submissions, got {}", all.len()));
    }
    if only_a.len() != 2 || only_a.iter().any(|s| s.form_id != "a") {
        return Err(format!("filter by form returned {} records", only_a.len()));
    }
    Ok(())
}

async fn update_replaces_record<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut stored = check(
        s.add_submission(FormSubmission::new("reg", make_values(&[("Email", "old")])))
            .await,
    )?;
    stored.values = make_values(&[("Email", "new")]);
    check(s.update_submission(stored.clone()).await)?;

    let listed = check(s.list_submissions(Some("reg")).await)?;
    if listed != vec![stored] {
        return Err("update did not replace the stored submission".to_string());
    }
    Ok(())
}

async fn update_unknown_is_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut ghost = FormSubmission::new("reg", make_values(&[]));
    ghost.id = "ghost".to_string();
    match s.update_submission(ghost).await {
        Err(StorageError::SubmissionNotFound { submission_id }) if submission_id == "ghost" => {
            Ok(())
        }
        Err(e) => Err(format!("expected SubmissionNotFound, got {}", e)),
        Ok(()) => Err("expected SubmissionNotFound, got Ok".to_string()),
    }
}
