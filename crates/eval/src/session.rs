//! A single form being edited: the definition, its value mapping and the
//! messages of the last evaluation pass.
//!
//! `FormSession` takes `&mut self` for every pass, so passes over one form
//! are serialized by construction.

use formrule_core::{FormDefinition, FormValues, Value};

use crate::cascade::refresh_cascading_options;
use crate::engine::{EvaluationResult, RuleEngine};

#[derive(Debug)]
pub struct FormSession {
    engine: RuleEngine,
    form: FormDefinition,
    values: FormValues,
    results: Vec<EvaluationResult>,
}

impl FormSession {
    /// Start a session with every field at its default value.
    pub fn new(engine: RuleEngine, form: FormDefinition) -> Self {
        let values = form.default_values();
        Self::with_values(engine, form, values)
    }

    /// Start a session from previously saved values. Fields missing from
    /// `values` get their default.
    pub fn with_values(engine: RuleEngine, mut form: FormDefinition, mut values: FormValues) -> Self {
        form.capture_baselines();
        for field in &form.fields {
            if !values.contains(&field.name) {
                values.set(field.name.clone(), field.default_value.clone());
            }
        }
        FormSession {
            engine,
            form,
            values,
            results: Vec::new(),
        }
    }

    pub fn form(&self) -> &FormDefinition {
        &self.form
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Results of the most recent pass.
    pub fn results(&self) -> &[EvaluationResult] {
        &self.results
    }

    /// Record user input for `field_id` and re-evaluate with it as the
    /// changed field. Unknown ids still trigger a full pass.
    pub async fn set_value(
        &mut self,
        field_id: &str,
        value: impl Into<Value>,
    ) -> &[EvaluationResult] {
        if let Some(field) = self.form.field_mut(field_id) {
            self.values.set(field.name.clone(), value);
            field.system_controlled = false;
            field.system_set_reason = None;
            refresh_cascading_options(&mut self.form, &mut self.values, field_id);
        }
        self.run(Some(field_id)).await
    }

    /// Full pass with no changed field.
    pub async fn evaluate(&mut self) -> &[EvaluationResult] {
        self.run(None).await
    }

    pub fn into_parts(self) -> (FormDefinition, FormValues) {
        (self.form, self.values)
    }

    async fn run(&mut self, changed: Option<&str>) -> &[EvaluationResult] {
        self.results = self
            .engine
            .evaluate_form(&mut self.form, &mut self.values, changed)
            .await;
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> FormDefinition {
        FormDefinition::from_value(serde_json::json!({
            "id": "f", "name": "F",
            "fields": [
                {"id": "age", "name": "Age", "type": "Number"},
                {"id": "guardian", "name": "Guardian", "hidden": true,
                 "rules": [{
                    "id": "minor",
                    "description": "minors need a guardian",
                    "conditionGroups": [{"conditions": [
                        {"fieldId": "age", "operator": "<", "value": 18}
                    ]}],
                    "actions": [
                        {"type": "show"},
                        {"type": "setRequired", "value": true, "message": "Guardian required"}
                    ]
                 }]}
            ]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn set_value_drives_rules() {
        let mut session = FormSession::new(RuleEngine::offline(), form());
        let results = session.set_value("age", 12i64).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].message, "Guardian required");
        let guardian = session.form().field("guardian").unwrap();
        assert!(!guardian.hidden && guardian.required);

        let results = session.set_value("age", 30i64).await;
        assert!(results.is_empty());
        let guardian = session.form().field("guardian").unwrap();
        assert!(guardian.hidden && !guardian.required);
    }

    #[tokio::test]
    async fn user_input_clears_system_control() {
        let mut session = FormSession::new(RuleEngine::offline(), form());
        if let Some(field) = session.form.field_mut("age") {
            field.system_controlled = true;
        }
        session.set_value("age", 40i64).await;
        assert!(!session.form().field("age").unwrap().system_controlled);
        let (_, values) = session.into_parts();
        assert_eq!(values.get("Age"), Some(&Value::from(40i64)));
    }

    #[tokio::test]
    async fn saved_values_are_kept_and_gaps_defaulted() {
        let mut saved = FormValues::new();
        saved.set("Age", 5i64);
        let mut session = FormSession::with_values(RuleEngine::offline(), form(), saved);
        assert_eq!(session.values().get("Guardian"), Some(&Value::Null));
        session.evaluate().await;
        assert!(session.form().field("guardian").unwrap().required);
    }
}
