//! Error type for reflective access.
//!
//! Names are rendered to text when the error is built so the error can
//! outlive the registry that produced it.

/// Why a reflective read, write, call or registration failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReflectError {
    #[error("instance is not valid")]
    InvalidInstance,

    #[error("value of type {found} is not an object")]
    NotAnObject { found: String },

    #[error("instance of '{found}' is not a '{expected}'")]
    NotASubclass { expected: String, found: String },

    #[error("unknown class '{0}'")]
    UnknownClass(String),

    #[error("'{class}' has no property '{property}'")]
    UnknownProperty { class: String, property: String },

    #[error("'{class}' has no method '{method}'")]
    UnknownMethod { class: String, method: String },

    #[error("cannot assign an invalid value to '{property}'")]
    InvalidValue { property: String },

    #[error("'{property}' holds {expected}, cannot assign {found}")]
    ValueType {
        property: String,
        expected: String,
        found: String,
    },

    #[error("'{method}' takes {expected} argument(s), {found} given")]
    ArgumentCount {
        method: String,
        expected: usize,
        found: usize,
    },

    #[error("argument {index} of '{method}' must be {expected}, found {found}")]
    ArgumentType {
        method: String,
        index: usize,
        expected: String,
        found: String,
    },

    #[error("'{method}' needs an instance")]
    MissingInstance { method: String },

    #[error("'{method}' cannot take its own instance as an argument")]
    InstanceAsArgument { method: String },

    #[error("accessor for '{member}' does not match the instance layout")]
    AccessFailed { member: String },

    #[error("'{method}' failed: {message}")]
    Call { method: String, message: String },

    #[error("class '{0}' has no constructor")]
    NotConstructible(String),

    #[error("type '{0}' is registered twice")]
    DuplicateType(String),

    #[error("super type '{super_type}' of '{class}' is not registered")]
    UnknownSuperType { class: String, super_type: String },

    #[error("inheritance cycle through '{0}'")]
    InheritanceCycle(String),
}
