//! Build/link errors.
//!
//! Every error is terminal: the input is an already-decoded snapshot, so there
//! is nothing to retry and no partial graph is handed out.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("duplicate file name: {path:?}")]
    DuplicateFile { path: String },

    #[error("no descriptor for generated file: {path}")]
    UnknownFileToGenerate { path: String },

    #[error("field {field}: no descriptor for enum {enum_name}")]
    UnresolvedEnum { field: String, enum_name: String },

    #[error("field {field}: no descriptor for type {message_name}")]
    UnresolvedMessage { field: String, message_name: String },

    #[error("extension {field}: no descriptor for extended type {extendee}")]
    UnresolvedExtendee { field: String, extendee: String },

    #[error(
        "method {method}: no descriptor for {} type {type_name}",
        direction(.is_input)
    )]
    UnresolvedMethodType {
        method: String,
        type_name: String,
        is_input: bool,
    },

    #[error("{name} is declared in both {first_file:?} and {second_file:?}")]
    DuplicateName {
        name: String,
        first_file: String,
        second_file: String,
    },

    #[error("invalid descriptor {name}: {reason}")]
    InvalidDescriptor { name: String, reason: String },
}

fn direction(is_input: &bool) -> &'static str {
    if *is_input {
        "input"
    } else {
        "output"
    }
}

impl GraphError {
    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        GraphError::InvalidDescriptor {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_both_sides_of_a_broken_reference() {
        let err = GraphError::UnresolvedMessage {
            field: "b.Foo.bar".to_string(),
            message_name: "a.Bar".to_string(),
        };
        assert_eq!(err.to_string(), "field b.Foo.bar: no descriptor for type a.Bar");

        let err = GraphError::UnresolvedMethodType {
            method: "svc.Api.Get".to_string(),
            type_name: "svc.Missing".to_string(),
            is_input: false,
        };
        assert_eq!(
            err.to_string(),
            "method svc.Api.Get: no descriptor for output type svc.Missing"
        );
    }
}
