use crate::primitive::ValueKind;

/// Boxed error returned by caller supplied conversion functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The payload type has no built-in text conversion and none was supplied.
    #[error("no text conversion available for `{type_name}`")]
    UnsupportedConversion { type_name: &'static str },

    /// The value is not a JSON primitive, or cannot be stored in the payload type.
    #[error("unsupported json value: {0}")]
    UnsupportedJsonValue(serde_json::Value),

    #[error("unable to parse {text:?} as {kind}")]
    Parse {
        text: String,
        kind: ValueKind,
        #[source]
        source: BoxError,
    },

    /// Raised by a caller supplied `parse_from_text` function.
    #[error(transparent)]
    Callback(BoxError),
}

impl Error {
    pub(crate) fn unsupported_conversion<T>() -> Self {
        Self::UnsupportedConversion {
            type_name: std::any::type_name::<T>(),
        }
    }
}
