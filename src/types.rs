use itertools::Itertools;
use std::fmt::Display;

/// The static types of the language. Two types are equal only when they are
/// the same variant; there is no subtyping and no implicit conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Number,
    String,
    Boolean,
    Void,
}

impl Type {
    /// Maps a type keyword as written in source (`num`, `str`, ...).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "num" => Some(Type::Number),
            "str" => Some(Type::String),
            "bool" => Some(Type::Boolean),
            "void" => Some(Type::Void),
            _ => None,
        }
    }
    pub fn keyword(&self) -> &'static str {
        match self {
            Type::Number => "num",
            Type::String => "str",
            Type::Boolean => "bool",
            Type::Void => "void",
        }
    }
    pub fn name(&self) -> &'static str {
        match self {
            Type::Number => "number",
            Type::String => "string",
            Type::Boolean => "boolean",
            Type::Void => "void",
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Builds the overload key of a function: its name, then for each parameter
/// an underscore and the lower-cased name of the parameter's type.
///
/// `signature("write", ["number"])` is `write_number`; a function without
/// parameters is keyed by its bare name.
pub fn signature<'a, I: IntoIterator<Item = &'a str>>(name: &str, type_names: I) -> String {
    let types = type_names.into_iter().map(str::to_lowercase).join("_");
    if types.is_empty() {
        name.to_string()
    } else {
        format!("{}_{}", name, types)
    }
}
