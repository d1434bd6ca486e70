use thiserror::Error;

use crate::value::ValueKind;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BindError {
    #[error("field '{field}': {source}")]
    Field {
        field: String,
        #[source]
        source: Box<BindError>,
    },

    #[error("required field is missing")]
    MissingRequired,

    #[error("cannot convert {from} to {to}")]
    Coercion {
        from: ValueKind,
        to: &'static str,
    },

    #[error("value {value} must be between {min} and {max}")]
    OutOfRange { value: i64, min: i64, max: i64 },

    #[error("value '{value}' must be one of: {allowed}")]
    InvalidOption { value: String, allowed: String },
}

impl BindError {
    pub fn coercion(from: ValueKind, to: &'static str) -> Self {
        BindError::Coercion { from, to }
    }

    /// Qualifies the error with the name of the field it occurred in,
    /// forming a path-like chain as nested errors bubble up.
    pub fn for_field(self, field: &str) -> Self {
        BindError::Field {
            field: field.to_owned(),
            source: Box::new(self),
        }
    }
}
