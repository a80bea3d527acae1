use super::{NativeFunctionException, RuntimeError, RuntimeValue};
use crate::SourceSpan;

/// How a statement finished. Anything but `Normal` stops the enclosing block
/// and travels outward until a loop or function call consumes it.
#[derive(Debug, PartialEq)]
pub enum StatementResult {
    Normal,
    Return(RuntimeValue),
    Break,
    Continue,
}

/// Why execution stopped abnormally. Only `Exception` can be caught by a
/// `try`/`catch` statement.
#[derive(Debug)]
pub enum Fault {
    Runtime(RuntimeError),
    Exception {
        exception: NativeFunctionException,
        raised_at: SourceSpan,
    },
}
impl From<RuntimeError> for Fault {
    fn from(err: RuntimeError) -> Self {
        Fault::Runtime(err)
    }
}
