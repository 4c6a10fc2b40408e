//! Error types for operation construction and response decoding.

/// An `Error` produced while constructing an operation string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructError {
    /// A record field name is empty or not a valid identifier.
    #[error("{name:?} is not a valid field name")]
    InvalidFieldName {
        /// The offending declared name.
        name: String,
    },

    /// A variable name is empty or not a valid identifier.
    #[error("{name:?} is not a valid variable name")]
    InvalidVariableName {
        /// The offending binding name.
        name: String,
    },

    /// A custom variable value could not be serialized to JSON.
    #[error("cannot serialize variable value: {0}")]
    Serialize(String),
}

/// An `Error` produced while decoding a response body into a shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The response body is not valid UTF-8.
    #[error("response body is not valid UTF-8")]
    InvalidUtf8,

    /// Input ended in the middle of a JSON value.
    #[error("unexpected end of JSON input")]
    UnexpectedEnd,

    /// Input ended while capturing a custom-scalar subtree.
    #[error("unexpected end of JSON input while capturing a scalar value")]
    UnexpectedEndOfScalar,

    /// A character that cannot appear at this point of a JSON document.
    #[error("invalid character {found:?} {context}")]
    InvalidCharacter {
        /// The offending character.
        found: char,
        /// Where in the grammar it was seen.
        context: &'static str,
    },

    /// Extra input after the first complete top-level value.
    #[error("invalid token '{0}' after top-level value")]
    TrailingToken(char),

    /// An object key that is not a string.
    #[error("unexpected non-key in JSON input")]
    NonStringKey,

    /// A JSON object key with no destination in any of the places currently
    /// being unmarshaled into.
    #[error("struct field for {key:?} doesn't exist in any of {places} places to unmarshal")]
    UnknownField {
        /// The JSON key.
        key: String,
        /// How many parallel destinations were candidates.
        places: usize,
    },

    /// A JSON value of the wrong kind for its destination.
    #[error("cannot unmarshal {found} into {expected} field {field:?}")]
    TypeMismatch {
        /// Declared name of the destination field.
        field: String,
        /// What the JSON held.
        found: &'static str,
        /// What the destination shape wanted.
        expected: &'static str,
    },
}
