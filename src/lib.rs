pub mod ast;
mod parser;
mod scanner;
mod scopes;
mod source;
mod source_reference;
pub mod stdlib;
mod tree_walk_interpreter;
pub mod types;
mod validator;

pub use parser::{Expected, Parser, ParserError, ParserOpts};
pub use scanner::{Scanner, Token, TokenKind};
pub use source::{SourceOffset, SourceSpan};
pub use source_reference::SourceReference;
pub use stdlib::{Console, NativeRegistry, Streams};
pub use tree_walk_interpreter::{
    format_number, Interpreter, NativeContext, NativeError, NativeFunction,
    NativeFunctionException, RuntimeError, RuntimeValue, ValueType,
};
pub use validator::{ValidationError, Validator};
