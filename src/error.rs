//! Error types raised by the bridge.
//!
//! ```text
//! BridgeError - a script call into native code failed; raised as a Lua error
//! BindError   - populating the Lua state failed
//! ```

use thiserror::Error;

// ============================================================================
// Script Surface Errors
// ============================================================================

/// A script call into native code could not be completed.
///
/// Each of these aborts only the current script call and surfaces in Lua as
/// an error carrying this message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// Argument count does not match the declared parameters.
    #[error("wrong number of arguments calling '{member}': expected {expected}, got {actual}")]
    ArgumentCount {
        member: String,
        expected: usize,
        actual: usize,
    },

    /// A Lua value kind the marshaller cannot pass as an argument.
    #[error("don't know this lua type '{kind}', parameter {position} when calling '{member}'")]
    UnsupportedScriptValue {
        kind: &'static str,
        position: usize,
        member: String,
    },

    /// A number was passed for a parameter type with no scalar conversion.
    #[error("unrecognised parameter type '{type_name}', parameter {position} when calling '{member}'")]
    UnsupportedParameterType {
        type_name: String,
        position: usize,
        member: String,
    },

    /// A native instance of the wrong type was passed.
    #[error("{target} expects '{expected}', got '{actual}'")]
    TypeMismatch {
        target: String,
        expected: String,
        actual: String,
    },

    /// A native call failed; nothing can be returned.
    #[error("unable to send to Lua type '{type_name}'")]
    UnsendableValue { type_name: String },

    /// A native result of a kind with no Lua representation.
    #[error("unhandled type '{type_name}' being sent to Lua")]
    UnhandledNativeType { type_name: String },

    /// A method was invoked without a native instance to call it on.
    #[error("expected a userdatum when invoking native method '{member}'")]
    NotAUserdatum { member: String },

    /// A non-string key was used to index a native instance.
    #[error("expected a name of a native property or method when indexing native type '{type_name}', got '{kind}'")]
    NotAMemberName {
        type_name: String,
        kind: &'static str,
    },

    /// A property's declared type has no scalar conversion.
    #[error("cannot set '{property}' on '{type_name}', unrecognised native type '{value_type}'")]
    UnsupportedPropertyType {
        property: String,
        type_name: String,
        value_type: String,
    },

    /// A Lua value kind that cannot be written to a property.
    #[error("cannot set '{property}' on '{type_name}', unrecognised lua type '{kind}'")]
    UnsupportedPropertyValue {
        property: String,
        type_name: String,
        kind: &'static str,
    },

    /// Write to a property registered without a setter.
    #[error("cannot set '{property}' on '{type_name}', the property is read-only")]
    ReadOnlyProperty { property: String, type_name: String },

    /// `new` on a type registered without a default constructor.
    #[error("type '{type_name}' has no default constructor")]
    NoConstructor { type_name: String },

    /// The receiver is already borrowed by an outer native call.
    #[error("native instance is busy when calling '{member}'")]
    ReceiverBusy { member: String },

    /// The Lua state has no bridge bound to it.
    #[error("no native bridge is bound to this Lua state")]
    NotBound,
}

impl From<BridgeError> for mlua::Error {
    fn from(err: BridgeError) -> Self {
        mlua::Error::external(err)
    }
}

// ============================================================================
// Bind Errors
// ============================================================================

/// Failure while binding a registry into a Lua state.
#[derive(Debug, Error)]
pub enum BindError {
    /// The state already carries a bridge.
    #[error("a native bridge is already bound to this Lua state")]
    AlreadyBound,

    /// A Lua operation failed while populating globals.
    #[error("lua error while binding: {0}")]
    Lua(#[from] mlua::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_count_message_names_member() {
        let err = BridgeError::ArgumentCount {
            member: "length".into(),
            expected: 1,
            actual: 0,
        };
        assert_eq!(
            err.to_string(),
            "wrong number of arguments calling 'length': expected 1, got 0"
        );
    }

    #[test]
    fn unsendable_message() {
        let err = BridgeError::UnsendableValue {
            type_name: "int".into(),
        };
        assert_eq!(err.to_string(), "unable to send to Lua type 'int'");
    }

    #[test]
    fn bridge_error_into_lua_error() {
        let err: mlua::Error = BridgeError::NotBound.into();
        assert!(err.to_string().contains("no native bridge"));
    }
}
