use super::ValueType;
use crate::{ast::BinaryOperator, ast::UnaryOperator, SourceReference, SourceSpan};
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum RuntimeError {
    #[error("Cannot perform '{operator}' operation between {left_type} and {right_type}")]
    OperandTypes {
        operator: BinaryOperator,
        left_type: ValueType,
        right_type: ValueType,
        #[label("{} and {} were found here", .left_type.fmt_a(), .right_type.fmt_a())]
        operator_loc: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Operation '{operator}' cannot be applied to '{operand_type}'")]
    UnaryOperandType {
        operator: UnaryOperator,
        operand_type: ValueType,
        #[label("{} was found here", .operand_type.fmt_a())]
        operator_loc: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Condition must be a boolean, but found {}", .actual_type.fmt_a())]
    NotBoolean {
        actual_type: ValueType,
        #[label("This condition")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Undeclared variable '{name}'")]
    UndefinedVariable {
        name: String,
        #[label("found here")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Variable '{name}' is used before it is assigned a value")]
    UninitializedVariable {
        name: String,
        #[label("read here")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Re-declaration of variable '{name}'")]
    AlreadyDefinedVariable {
        name: String,
        #[label("'{name}' here is already a variable")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("No function matches the signature '{signature}'")]
    UndefinedFunction {
        signature: String,
        #[label("On this function call")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Left side of assignment must be a variable")]
    InvalidAssignmentTarget {
        #[label("Cannot assign to this expression")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Uncaught {exception_type}: {message}")]
    UncaughtException {
        exception_type: String,
        message: String,
        #[label("Raised by this call")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Invalid arguments for native function '{function}': {message}")]
    NativeArgument {
        function: String,
        message: String,
        #[label("On this function call")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Console I/O failed: {source}")]
    Io {
        source: std::io::Error,
        #[label("During this call")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
}
impl RuntimeError {
    pub fn source_span(&self) -> SourceSpan {
        match self {
            Self::OperandTypes { operator_loc, .. } | Self::UnaryOperandType { operator_loc, .. } => {
                *operator_loc
            }
            Self::NotBoolean { found_at, .. }
            | Self::UndefinedVariable { found_at, .. }
            | Self::UninitializedVariable { found_at, .. }
            | Self::AlreadyDefinedVariable { found_at, .. }
            | Self::UndefinedFunction { found_at, .. }
            | Self::InvalidAssignmentTarget { found_at, .. }
            | Self::UncaughtException { found_at, .. }
            | Self::NativeArgument { found_at, .. }
            | Self::Io { found_at, .. } => *found_at,
        }
    }
}
