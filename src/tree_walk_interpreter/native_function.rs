use super::{variable::VariableRef, RuntimeValue};
use itertools::Itertools;
use crate::{
    scopes::Scopes,
    stdlib::Console,
    types::{self, Type},
};
use std::{
    fmt::{Debug, Display},
    io,
    rc::Rc,
};
use thiserror::Error;

/// The one fault user code can catch. Raised only by native functions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{exception_type}: {message}")]
pub struct NativeFunctionException {
    pub exception_type: String,
    pub message: String,
}
impl NativeFunctionException {
    pub fn new(exception_type: &str, message: &str) -> Self {
        Self {
            exception_type: exception_type.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum NativeError {
    #[error(transparent)]
    Exception(#[from] NativeFunctionException),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{0}")]
    Argument(String),
}

pub type NativeImplementation = fn(&mut NativeContext) -> Result<RuntimeValue, NativeError>;

/// What a native routine sees while it runs: its own parameters, bound by
/// name in the call's frame, and the console.
pub struct NativeContext<'a> {
    scopes: &'a Scopes<VariableRef>,
    console: &'a mut dyn Console,
}

impl<'a> NativeContext<'a> {
    pub fn new(scopes: &'a Scopes<VariableRef>, console: &'a mut dyn Console) -> Self {
        Self { scopes, console }
    }
    pub fn value(&self, name: &str) -> Result<RuntimeValue, NativeError> {
        self.scopes
            .get(name)
            .and_then(|variable| variable.get())
            .ok_or_else(|| NativeError::Argument(format!("parameter '{}' is not bound", name)))
    }
    pub fn number(&self, name: &str) -> Result<f64, NativeError> {
        let value = self.value(name)?;
        let actual_type = value.type_of();
        value
            .into_number()
            .ok_or_else(|| mismatch(name, "a number", actual_type.fmt_a()))
    }
    pub fn string(&self, name: &str) -> Result<Rc<String>, NativeError> {
        let value = self.value(name)?;
        let actual_type = value.type_of();
        value
            .into_string()
            .ok_or_else(|| mismatch(name, "a string", actual_type.fmt_a()))
    }
    pub fn boolean(&self, name: &str) -> Result<bool, NativeError> {
        let value = self.value(name)?;
        let actual_type = value.type_of();
        value
            .into_boolean()
            .ok_or_else(|| mismatch(name, "a boolean", actual_type.fmt_a()))
    }
    pub fn console(&mut self) -> &mut dyn Console {
        &mut *self.console
    }
}

fn mismatch(name: &str, expected: &str, actual: &str) -> NativeError {
    NativeError::Argument(format!(
        "parameter '{}' should be {} but is {}",
        name, expected, actual
    ))
}

pub struct NativeFunction {
    pub name: &'static str,
    pub parameters: Vec<(&'static str, Type)>,
    pub return_type: Type,
    pub implementation: NativeImplementation,
}
impl NativeFunction {
    pub fn new(
        name: &'static str,
        parameters: &[(&'static str, Type)],
        return_type: Type,
        implementation: NativeImplementation,
    ) -> Self {
        Self {
            name,
            parameters: parameters.to_vec(),
            return_type,
            implementation,
        }
    }
    pub fn signature(&self) -> String {
        types::signature(self.name, self.parameters.iter().map(|(_, ty)| ty.name()))
    }
}
impl Display for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "fun {}({}): {} {{ <native code> }}",
            self.name,
            self.parameters
                .iter()
                .map(|(name, ty)| format!("{}: {}", name, ty.keyword()))
                .join(", "),
            self.return_type.keyword()
        )
    }
}
impl Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
