//! The rule orchestrator.
//!
//! A pass visits the changed field (if any) first, then every field that
//! declares rules. Each field's rules run in descending priority; a rule
//! whose conditions hold applies its actions in order, a rule whose
//! conditions fail reverts its target to the baseline.
//!
//! [`RuleEngine`] holds no per-pass state: the visited set and the result
//! buffer live in a [`Pass`] owned by one `evaluate_form` call, so
//! independent sessions can share an engine.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::Arc;

use formrule_core::{FormDefinition, FormValues};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::action::{apply_action, revert_field};
use crate::group::evaluate_condition_groups;
use crate::loader::static_loader::StaticOptionLoader;
use crate::loader::OptionLoader;

/// A user-facing message produced during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub field_id: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl EvaluationResult {
    pub fn new(field_id: impl Into<String>, message: impl Into<String>) -> Self {
        EvaluationResult {
            field_id: field_id.into(),
            message: message.into(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

/// State of a single evaluation pass.
#[derive(Debug, Default)]
struct Pass {
    visited: HashSet<String>,
    results: Vec<EvaluationResult>,
}

impl Pass {
    fn record(&mut self, field_id: &str, message: impl Into<String>) {
        self.results.push(EvaluationResult::new(field_id, message));
    }
}

#[derive(Clone)]
pub struct RuleEngine {
    loader: Arc<dyn OptionLoader>,
}

impl RuleEngine {
    pub fn new(loader: Arc<dyn OptionLoader>) -> Self {
        RuleEngine { loader }
    }

    /// Engine whose option loads always fail with "not configured".
    pub fn offline() -> Self {
        Self::new(Arc::new(StaticOptionLoader::new()))
    }

    /// Engine backed by [`crate::loader::http::HttpOptionLoader`].
    #[cfg(feature = "http")]
    pub fn with_http(config: &crate::loader::LoaderConfig) -> Self {
        Self::new(Arc::new(crate::loader::http::HttpOptionLoader::new(config)))
    }

    pub fn loader(&self) -> &dyn OptionLoader {
        self.loader.as_ref()
    }

    /// Run one evaluation pass and return its results in production order.
    ///
    /// Never fails: unparseable conditions do not fire, unresolvable
    /// targets are skipped, and option-load failures become results.
    #[tracing::instrument(skip_all, fields(form = %form.id, changed = ?changed_field_id))]
    pub async fn evaluate_form(
        &self,
        form: &mut FormDefinition,
        values: &mut FormValues,
        changed_field_id: Option<&str>,
    ) -> Vec<EvaluationResult> {
        let mut pass = Pass::default();
        // Fields built in code carry no baseline yet; take it before any rule runs.
        form.capture_baselines();

        if let Some(changed) = changed_field_id {
            self.evaluate_field(form, values, changed, &mut pass).await;
        }

        // Fields added during the pass wait for the next one.
        let candidates: Vec<String> = form
            .fields
            .iter()
            .filter(|f| !f.rules.is_empty())
            .map(|f| f.id.clone())
            .collect();
        for field_id in &candidates {
            self.evaluate_field(form, values, field_id, &mut pass).await;
        }

        tracing::debug!(
            fields = pass.visited.len(),
            results = pass.results.len(),
            "evaluation pass complete"
        );
        pass.results
    }

    async fn evaluate_field(
        &self,
        form: &mut FormDefinition,
        values: &mut FormValues,
        field_id: &str,
        pass: &mut Pass,
    ) {
        if !pass.visited.insert(field_id.to_string()) {
            return;
        }
        let Some(field) = form.field(field_id) else {
            return;
        };

        let mut rules = field.rules.clone();
        rules.sort_by_key(|r| Reverse(r.priority));

        for rule in &rules {
            let target = rule.target(field_id).to_string();
            if form.field(&target).is_none() {
                tracing::debug!(rule = %rule.id, target = %target, "rule target not found; skipped");
                continue;
            }

            if !evaluate_condition_groups(&rule.condition_groups, form, values) {
                tracing::debug!(rule = %rule.id, target = %target, "conditions not met; reverting");
                revert_field(form, values, &target);
                continue;
            }

            tracing::debug!(rule = %rule.id, target = %target, priority = rule.priority, "rule fired");
            for action in &rule.actions {
                if let Err(e) =
                    apply_action(action, form, values, &target, rule, self.loader.as_ref()).await
                {
                    tracing::warn!(rule = %rule.id, field = %e.field_id(), error = %e, "action failed");
                    pass.record(e.field_id(), e.to_string());
                }
                if let Some(message) = action.message() {
                    pass.record(&target, message);
                }
            }
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::offline()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("loader", &self.loader.loader_id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formrule_core::Value;

    fn form(doc: serde_json::Value) -> FormDefinition {
        FormDefinition::from_value(doc).unwrap()
    }

    #[tokio::test]
    async fn changed_field_is_evaluated_once() {
        let mut f = form(serde_json::json!({
            "id": "f", "name": "F",
            "fields": [{
                "id": "a", "name": "A",
                "rules": [{"id": "r", "actions": [{"type": "hide", "message": "hidden"}]}]
            }]
        }));
        let mut v = FormValues::new();
        let results = RuleEngine::offline()
            .evaluate_form(&mut f, &mut v, Some("a"))
            .await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].field_id, "a");
        assert_eq!(results[0].message, "hidden");
    }

    #[tokio::test]
    async fn unknown_changed_field_is_harmless() {
        let mut f = form(serde_json::json!({"id": "f", "name": "F", "fields": []}));
        let mut v = FormValues::new();
        let results = RuleEngine::offline()
            .evaluate_form(&mut f, &mut v, Some("ghost"))
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn missing_target_skips_rule_without_revert() {
        let mut f = form(serde_json::json!({
            "id": "f", "name": "F",
            "fields": [{
                "id": "a", "name": "A",
                "rules": [{"id": "r", "targetFieldId": "ghost",
                           "actions": [{"type": "hide", "message": "never"}]}]
            }]
        }));
        let mut v = FormValues::new();
        let results = RuleEngine::offline().evaluate_form(&mut f, &mut v, None).await;
        assert!(results.is_empty());
        assert!(!f.field("a").unwrap().hidden);
    }

    #[tokio::test]
    async fn fields_added_during_a_pass_run_next_pass() {
        let mut f = form(serde_json::json!({
            "id": "f", "name": "F",
            "fields": [{
                "id": "a", "name": "A",
                "rules": [{"id": "r", "actions": [{
                    "type": "addField",
                    "value": {"id": "b", "name": "B",
                              "rules": [{"id": "rb", "actions": [{"type": "setValue", "value": "x"}]}]}
                }]}]
            }]
        }));
        let mut v = FormValues::new();
        let engine = RuleEngine::offline();
        engine.evaluate_form(&mut f, &mut v, None).await;
        assert!(f.field("b").is_some());
        assert_eq!(v.get("B"), None);

        engine.evaluate_form(&mut f, &mut v, None).await;
        assert_eq!(v.get("B"), Some(&Value::from("x")));
        assert_eq!(f.fields.len(), 2);
    }

    #[test]
    fn result_timestamp_serializes_as_rfc3339() {
        let result = EvaluationResult::new("a", "m");
        let json = serde_json::to_value(&result).unwrap();
        let stamp = json["timestamp"].as_str().unwrap();
        assert!(OffsetDateTime::parse(stamp, &time::format_description::well_known::Rfc3339).is_ok());
        assert_eq!(json["fieldId"], "a");
    }
}
