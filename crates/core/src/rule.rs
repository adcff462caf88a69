//! Rule declarations: condition groups, conditions, actions and the
//! dynamic data-source descriptor used by `loadOptions`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A prioritized binding of condition groups to a sequence of actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRule {
    #[serde(default)]
    pub id: String,
    /// Field the actions apply to. Empty means the field declaring the rule.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target_field_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub condition_groups: Vec<ConditionGroup>,
    #[serde(default)]
    pub actions: Vec<FieldAction>,
    /// Higher evaluates first; ties keep declaration order.
    #[serde(default)]
    pub priority: i32,
}

impl FieldRule {
    /// Resolve the id of the field this rule acts on.
    pub fn target<'a>(&'a self, owner_id: &'a str) -> &'a str {
        if self.target_field_id.is_empty() {
            owner_id
        } else {
            &self.target_field_id
        }
    }
}

/// Conditions combined with AND (`require_all`) or OR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionGroup {
    #[serde(default = "default_require_all")]
    pub require_all: bool,
    #[serde(default)]
    pub conditions: Vec<FieldCondition>,
}

fn default_require_all() -> bool {
    true
}

/// A comparison of one field's current value against a literal or against
/// another field's current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCondition {
    pub field_id: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_field_id: Option<String>,
}

impl FieldCondition {
    /// The field supplying the comparison value, if one is set. An empty id
    /// counts as unset.
    pub fn reference_field_id(&self) -> Option<&str> {
        self.value_field_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Comparison operators. Anything unrecognized is kept verbatim in `Other`
/// and never matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Contains,
    StartsWith,
    EndsWith,
    Other(String),
}

impl Operator {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "==" | "=" => Operator::Eq,
            "!=" | "<>" => Operator::Ne,
            ">" => Operator::Gt,
            "<" => Operator::Lt,
            ">=" => Operator::Ge,
            "<=" => Operator::Le,
            s if s.eq_ignore_ascii_case("contains") => Operator::Contains,
            s if s.eq_ignore_ascii_case("startsWith") => Operator::StartsWith,
            s if s.eq_ignore_ascii_case("endsWith") => Operator::EndsWith,
            _ => Operator::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Contains => "contains",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
            Operator::Other(raw) => raw,
        }
    }
}

impl From<String> for Operator {
    fn from(raw: String) -> Self {
        Operator::parse(&raw)
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state mutation applied when a rule fires.
///
/// `value` is kept as raw JSON; its meaning depends on `kind` (a field value
/// for `setValue`, a boolean for `setRequired`, a field definition for
/// `addField`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSourceConfig>,
}

impl FieldAction {
    pub fn new(kind: ActionKind) -> Self {
        FieldAction {
            kind,
            value: None,
            message: None,
            data_source: None,
        }
    }

    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The user-facing message, if one is set and non-empty.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }
}

/// Action type tags. Parsed case-insensitively; unknown tags are kept in
/// `Other` and applied as no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    Show,
    Hide,
    Enable,
    Disable,
    SetValue,
    SetRequired,
    LoadOptions,
    AddValidation,
    RemoveField,
    AddField,
    Other(String),
}

impl ActionKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "show" => ActionKind::Show,
            "hide" => ActionKind::Hide,
            "enable" => ActionKind::Enable,
            "disable" => ActionKind::Disable,
            "setvalue" => ActionKind::SetValue,
            "setrequired" => ActionKind::SetRequired,
            "loadoptions" => ActionKind::LoadOptions,
            "addvalidation" => ActionKind::AddValidation,
            "removefield" => ActionKind::RemoveField,
            "addfield" => ActionKind::AddField,
            _ => ActionKind::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::Show => "show",
            ActionKind::Hide => "hide",
            ActionKind::Enable => "enable",
            ActionKind::Disable => "disable",
            ActionKind::SetValue => "setValue",
            ActionKind::SetRequired => "setRequired",
            ActionKind::LoadOptions => "loadOptions",
            ActionKind::AddValidation => "addValidation",
            ActionKind::RemoveField => "removeField",
            ActionKind::AddField => "addField",
            ActionKind::Other(raw) => raw,
        }
    }
}

impl From<String> for ActionKind {
    fn from(raw: String) -> Self {
        ActionKind::parse(&raw)
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where `loadOptions` fetches its option list from.
///
/// `url` may contain `{name}` placeholders; `parameters` maps each
/// placeholder name to the field name whose current value is substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceConfig {
    pub url: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// Property of each returned object used as the option value.
    pub value_field: String,
    /// Property of each returned object used as the option display text.
    pub text_field: String,
}
