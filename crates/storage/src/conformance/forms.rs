use std::future::Future;

use super::{check, make_form, CaseResult};
use crate::{FormStore, StorageError};

pub(super) async fn run_form_tests<S, F, Fut>(factory: &F) -> Vec<CaseResult>
where
    S: FormStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        CaseResult::new("forms/saved_form_is_readable", saved_form_is_readable(factory).await),
        CaseResult::new("forms/empty_id_is_assigned", empty_id_is_assigned(factory).await),
        CaseResult::new("forms/save_replaces_same_id", save_replaces_same_id(factory).await),
        CaseResult::new("forms/get_unknown_is_form_not_found", get_unknown_is_form_not_found(factory).await),
        CaseResult::new("forms/delete_is_idempotent", delete_is_idempotent(factory).await),
    ]
}

// ── Test implementations ──────────────────────────────────────────────────────

async fn saved_form_is_readable<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let form = make_form("reg", "Registration");
    let id = check(s.save_form(form.clone()).await)?;
    if id != "reg" {
        return Err(format!("expected id \"reg\", got \"{}\"", id));
    }
    let stored = check(s.get_form("reg").await)?;
    if stored != form {
        return Err("stored form differs from saved form".to_string());
    }
    Ok(())
}

/// A form saved without an id gets a non-empty, unique one.
async fn empty_id_is_assigned<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let a = check(s.save_form(make_form("", "A")).await)?;
    let b = check(s.save_form(make_form("", "B")).await)?;
    if a.is_empty() || a == b {
        return Err(format!("expected distinct ids, got \"{}\" and \"{}\"", a, b));
    }
    let stored = check(s.get_form(&a).await)?;
    if stored.id != a || stored.name != "A" {
        return Err(format!("form stored under \"{}\" is {:?}", a, stored.name));
    }
    Ok(())
}

async fn save_replaces_same_id<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    check(s.save_form(make_form("x", "First")).await)?;
    check(s.save_form(make_form("x", "Second")).await)?;
    let forms = check(s.list_forms().await)?;
    if forms.len() != 1 || forms[0].name != "Second" {
        let names: Vec<&str> = forms.iter().map(|f| f.name.as_str()).collect();
        return Err(format!("expected [\"Second\"], got {:?}", names));
    }
    Ok(())
}

async fn get_unknown_is_form_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.get_form("missing").await {
        Err(StorageError::FormNotFound { form_id }) if form_id == "missing" => Ok(()),
        Err(e) => Err(format!("expected FormNotFound, got {}", e)),
        Ok(_) => Err("expected FormNotFound, got a form".to_string()),
    }
}

async fn delete_is_idempotent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    check(s.save_form(make_form("gone", "Gone")).await)?;
    check(s.delete_form("gone").await)?;
    check(s.delete_form("gone").await)?;
    if !check(s.list_forms().await)?.is_empty() {
        return Err("form still listed after delete".to_string());
    }
    Ok(())
}
