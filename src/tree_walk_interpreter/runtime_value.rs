use std::{
    fmt::{Debug, Display},
    rc::Rc,
};

/// A value with its static type erased. The validator has already proven
/// every operation type-correct, so the interpreter only dispatches on the
/// variant.
#[derive(PartialEq, Clone)]
pub enum RuntimeValue {
    String(Rc<String>),
    Number(f64),
    Boolean(bool),
    /// Result of a function that finished without returning a value.
    Void,
}

impl Debug for RuntimeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(string) => {
                f.write_str("\"")?;
                f.write_str(string.replace('\n', "\\n").replace('\"', "\\\"").as_str())?;
                f.write_str("\"")
            }
            other => Display::fmt(other, f),
        }
    }
}
impl Display for RuntimeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(string) => f.write_str(string),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Boolean(b) => match b {
                true => f.write_str("true"),
                false => f.write_str("false"),
            },
            Self::Void => f.write_str("void"),
        }
    }
}
impl From<f64> for RuntimeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}
impl From<bool> for RuntimeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}
impl From<String> for RuntimeValue {
    fn from(value: String) -> Self {
        Self::String(Rc::new(value))
    }
}
impl From<&str> for RuntimeValue {
    fn from(value: &str) -> Self {
        value.to_string().into()
    }
}

impl RuntimeValue {
    pub fn type_of(&self) -> ValueType {
        match self {
            RuntimeValue::String(_) => ValueType::String,
            RuntimeValue::Number(_) => ValueType::Number,
            RuntimeValue::Boolean(_) => ValueType::Boolean,
            RuntimeValue::Void => ValueType::Void,
        }
    }
    pub fn into_number(self) -> Option<f64> {
        match self {
            RuntimeValue::Number(value) => Some(value),
            _ => None,
        }
    }
    pub fn into_boolean(self) -> Option<bool> {
        match self {
            RuntimeValue::Boolean(value) => Some(value),
            _ => None,
        }
    }
    pub fn into_string(self) -> Option<Rc<String>> {
        match self {
            RuntimeValue::String(string) => Some(string),
            _ => None,
        }
    }
}

/// Formats a number the way the language prints it: integral values without
/// a fractional part, anything else in its shortest decimal form.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Also covers -0.
        "0".to_string()
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Void,
}

impl Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl ValueType {
    /// Same names as the static types, so that runtime signatures match the
    /// ones the validator built.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Void => "void",
        }
    }
    pub fn fmt_a(&self) -> &'static str {
        match self {
            ValueType::String => "a string",
            ValueType::Number => "a number",
            ValueType::Boolean => "a boolean",
            ValueType::Void => "void",
        }
    }
}
