//! formrule-core: the form definition model.
//!
//! Provides the typed representation of forms, fields, rules and values
//! that the rule engine (`formrule-eval`) evaluates, plus authoring checks
//! and submission validation. No I/O and no async.
//!
//! # Public API
//!
//! - [`FormDefinition`], [`FormField`], [`FieldType`], [`OptionItem`] -- the form aggregate
//! - [`FieldRule`], [`ConditionGroup`], [`FieldCondition`], [`FieldAction`] -- rule declarations
//! - [`Value`], [`FormValues`] -- field values and the name -> value mapping
//! - [`check_definition`] -- authoring inconsistencies
//! - [`validate_values`] -- constraint violations of a submission

pub mod check;
pub mod error;
pub mod form;
pub mod rule;
pub mod validate;
pub mod value;
pub mod values;

pub use check::{check_definition, DefinitionIssue, IssueKind};
pub use error::{ConversionError, ModelError};
pub use form::{FieldBaseline, FieldType, FormDefinition, FormField, OptionItem, ValidationRule};
pub use rule::{
    ActionKind, ConditionGroup, DataSourceConfig, FieldAction, FieldCondition, FieldRule, Operator,
};
pub use validate::{validate_values, FieldViolation, ViolationKind};
pub use value::Value;
pub use values::FormValues;
