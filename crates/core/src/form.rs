//! Form definitions and fields.
//!
//! A [`FormDefinition`] is authored externally and handed to the engine as
//! an aggregate. Field order is display order. The engine mutates the
//! transient state of each [`FormField`] (hidden/readonly/required,
//! options, system-controlled markers, dynamic validations) in place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::rule::FieldRule;
use crate::value::Value;
use crate::values::FormValues;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldType {
    #[default]
    Text,
    Number,
    #[serde(alias = "Dropdown")]
    DropDown,
    Checkbox,
    Date,
    #[serde(alias = "CascadingDropdown")]
    CascadingDropDown,
}

impl FieldType {
    /// True for types whose value is chosen from an option list.
    pub fn has_options(self) -> bool {
        matches!(self, FieldType::DropDown | FieldType::CascadingDropDown)
    }
}

/// A selectable option of a dropdown-like field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub value: String,
    pub text: String,
}

impl OptionItem {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        OptionItem {
            value: value.into(),
            text: text.into(),
        }
    }
}

/// A validation entry appended at runtime by an `addValidation` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
}

/// Authoring-time state of a field, restored wholesale on revert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldBaseline {
    pub hidden: bool,
    pub readonly: bool,
    pub required: bool,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: String,
    /// Key into the value mapping; unique within a form.
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_pattern: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub default_value: Value,
    #[serde(default)]
    pub options: Vec<OptionItem>,
    /// Parent field of a cascading dropdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_field_id: Option<String>,
    /// Parent value -> options offered for that value.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cascading_options: BTreeMap<String, Vec<OptionItem>>,
    #[serde(default)]
    pub rules: Vec<FieldRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<FieldBaseline>,
    #[serde(default)]
    pub system_controlled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_set_reason: Option<String>,
    #[serde(default)]
    pub custom_validations: Vec<ValidationRule>,
}

impl FormField {
    pub fn new(id: impl Into<String>, name: impl Into<String>, field_type: FieldType) -> Self {
        FormField {
            id: id.into(),
            name: name.into(),
            label: String::new(),
            field_type,
            min_length: None,
            max_length: None,
            regex_pattern: None,
            required: false,
            hidden: false,
            readonly: false,
            default_value: Value::Null,
            options: Vec::new(),
            parent_field_id: None,
            cascading_options: BTreeMap::new(),
            rules: Vec::new(),
            baseline: None,
            system_controlled: false,
            system_set_reason: None,
            custom_validations: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: Vec<OptionItem>) -> Self {
        self.options = options;
        self
    }

    pub fn with_rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Record the baseline from the current flags and default value. A
    /// baseline, once captured, is never replaced.
    pub fn capture_baseline(&mut self) {
        if self.baseline.is_none() {
            self.baseline = Some(FieldBaseline {
                hidden: self.hidden,
                readonly: self.readonly,
                required: self.required,
                value: self.default_value.clone(),
            });
        }
    }

    /// Restore hidden/readonly/required from the baseline and clear the
    /// system-controlled markers. A field with no baseline is left as is.
    ///
    /// Returns the baseline value when the field's value had been set by a
    /// rule; the caller writes it back into the value mapping.
    pub fn revert_to_baseline(&mut self) -> Option<Value> {
        let baseline = self.baseline.as_ref()?;
        self.hidden = baseline.hidden;
        self.readonly = baseline.readonly;
        self.required = baseline.required;
        let restored = self.system_controlled.then(|| baseline.value.clone());
        self.system_controlled = false;
        self.system_set_reason = None;
        restored
    }

    /// True when `value` is one of the field's current option values.
    pub fn offers(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

/// An ordered collection of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FormField>,
}

impl FormDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        FormDefinition {
            id: id.into(),
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Parse a form definition document and capture field baselines.
    pub fn from_json(source: &str) -> Result<Self, ModelError> {
        let mut form: FormDefinition =
            serde_json::from_str(source).map_err(|e| ModelError::InvalidDefinition {
                message: e.to_string(),
            })?;
        form.capture_baselines();
        Ok(form)
    }

    /// Same as [`FormDefinition::from_json`] for an already-parsed document.
    pub fn from_value(doc: serde_json::Value) -> Result<Self, ModelError> {
        let mut form: FormDefinition =
            serde_json::from_value(doc).map_err(|e| ModelError::InvalidDefinition {
                message: e.to_string(),
            })?;
        form.capture_baselines();
        Ok(form)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Capture a baseline for every field that does not have one yet.
    pub fn capture_baselines(&mut self) {
        for field in &mut self.fields {
            field.capture_baseline();
        }
    }

    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_mut(&mut self, id: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Remove a field by id, returning it if it was present.
    pub fn remove_field(&mut self, id: &str) -> Option<FormField> {
        let index = self.fields.iter().position(|f| f.id == id)?;
        Some(self.fields.remove(index))
    }

    /// Append a field. Returns `false` (and leaves the form unchanged) when a
    /// field with the same id already exists.
    pub fn add_field(&mut self, mut field: FormField) -> bool {
        if self.field(&field.id).is_some() {
            return false;
        }
        field.capture_baseline();
        self.fields.push(field);
        true
    }

    /// Value mapping seeded with each field's default value.
    pub fn default_values(&self) -> FormValues {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.default_value.clone()))
            .collect()
    }
}
