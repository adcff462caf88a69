//! formrule rule evaluation engine -- accepts a form definition + values,
//! fires and reverts field rules, reports user-facing messages.
//!
//! The engine consumes a [`formrule_core::FormDefinition`] and mutates its
//! field state in place. Option lists for `loadOptions` actions come from
//! an injected [`OptionLoader`].
//!
//! ```no_run
//! # async fn demo(mut form: formrule_core::FormDefinition) {
//! use formrule_eval::RuleEngine;
//!
//! let engine = RuleEngine::offline();
//! let mut values = form.default_values();
//! let results = engine.evaluate_form(&mut form, &mut values, None).await;
//! for r in results {
//!     println!("{}: {}", r.field_id, r.message);
//! }
//! # }
//! ```

pub mod action;
pub mod cascade;
pub mod condition;
pub mod engine;
pub mod group;
pub mod loader;
pub mod session;

pub use action::{apply_action, revert_field, ActionError};
pub use cascade::refresh_cascading_options;
pub use condition::evaluate_condition;
pub use engine::{EvaluationResult, RuleEngine};
pub use group::{evaluate_condition_groups, evaluate_group};
#[cfg(feature = "http")]
pub use loader::http::HttpOptionLoader;
pub use loader::static_loader::{StaticOptionLoader, StaticResponse};
pub use loader::{LoaderConfig, LoaderError, OptionLoader};
pub use session::FormSession;
