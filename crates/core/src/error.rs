/// Errors raised while loading a form definition or a value mapping.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The form definition document could not be deserialized.
    #[error("invalid form definition: {message}")]
    InvalidDefinition { message: String },

    /// The value mapping document could not be deserialized.
    #[error("invalid form values: {message}")]
    InvalidValues { message: String },
}

/// A value could not be converted to the representation a field type needs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("cannot convert {from} to {to}")]
    Unsupported {
        from: &'static str,
        to: &'static str,
    },

    #[error("invalid number: '{input}'")]
    InvalidNumber { input: String },

    #[error("invalid boolean: '{input}'")]
    InvalidBool { input: String },

    #[error("invalid date: '{input}'")]
    InvalidDate { input: String },
}
