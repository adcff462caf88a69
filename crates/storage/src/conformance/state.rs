use std::future::Future;

use super::{check, make_values, CaseResult};
use crate::FormStore;

pub(super) async fn run_state_tests<S, F, Fut>(factory: &F) -> Vec<CaseResult>
where
    S: FormStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        CaseResult::new("state/load_without_save_is_none", load_without_save_is_none(factory).await),
        CaseResult::new("state/saved_state_is_a_copy", saved_state_is_a_copy(factory).await),
        CaseResult::new("state/clear_removes_state", clear_removes_state(factory).await),
        CaseResult::new("state/states_are_per_form", states_are_per_form(factory).await),
    ]
}

// ── Test implementations ──────────────────────────────────────────────────────

async fn load_without_save_is_none<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match check(s.load_state("nothing").await)? {
        None => Ok(()),
        Some(v) => Err(format!("expected no state, got {} values", v.len())),
    }
}

/// Mutating the caller's mapping after saving does not change the stored one.
async fn saved_state_is_a_copy<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut values = make_values(&[("Email", "a@example.com")]);
    check(s.save_state("reg", &values).await)?;
    values.set("Email", "changed@example.com");

    let loaded = check(s.load_state("reg").await)?.ok_or("state missing after save")?;
    if loaded != make_values(&[("Email", "a@example.com")]) {
        return Err(format!("stored state changed: {:?}", loaded));
    }
    Ok(())
}

async fn clear_removes_state<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    check(s.save_state("reg", &make_values(&[("Email", "x")])).await)?;
    check(s.clear_state("reg").await)?;
    if check(s.load_state("reg").await)?.is_some() {
        return Err("state still present after clear".to_string());
    }
    Ok(())
}

async fn states_are_per_form<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: FormStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    check(s.save_state("a", &make_values(&[("Email", "a")])).await)?;
    check(s.save_state("b", &make_values(&[("Email", "b")])).await)?;
    check(s.clear_state("a").await)?;
    if check(s.load_state("b").await)?.is_none() {
        return Err("clearing one form's state removed another's".to_string());
    }
    Ok(())
}
