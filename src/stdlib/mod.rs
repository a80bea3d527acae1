//! Native functions available to every program, and the console they use.

mod console;
mod conversion;
mod string;

pub use console::{Console, Streams};

use crate::{
    tree_walk_interpreter::{NativeFunction, NativeImplementation},
    types::Type,
};
use std::rc::Rc;

pub const INDEX_OUT_OF_BOUNDS_EXCEPTION: &str = "INDEX_OUT_OF_BOUNDS_EXCEPTION";
pub const FORMAT_EXCEPTION: &str = "FORMAT_EXCEPTION";
pub const END_OF_INPUT_EXCEPTION: &str = "END_OF_INPUT_EXCEPTION";

/// The set of native functions a validator and interpreter are built with.
/// Each entry is keyed by its signature like a user function, so natives can
/// be overloaded by parameter type.
#[derive(Debug, Clone, Default)]
pub struct NativeRegistry {
    functions: Vec<Rc<NativeFunction>>,
}

impl NativeRegistry {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn standard() -> Self {
        use Type::*;

        let mut registry = Self::new();
        for value_type in [Number, String, Boolean] {
            registry.register("write", &[("value", value_type)], Void, console::write);
            registry.register("writeln", &[("value", value_type)], Void, console::writeln);
        }
        registry.register("writeln", &[], Void, console::newline);
        registry.register("readln", &[], String, console::readln);

        registry.register("str_length", &[("string", String)], Number, string::length);
        registry.register(
            "str_substr",
            &[("string", String), ("start", Number), ("end", Number)],
            String,
            string::substring,
        );
        registry.register(
            "str_substr",
            &[("string", String), ("start", Number)],
            String,
            string::substring_to_end,
        );
        registry.register(
            "str_replace",
            &[
                ("string", String),
                ("target", String),
                ("replacement", String),
            ],
            String,
            string::replace,
        );
        registry.register("str_trim", &[("string", String)], String, string::trim);
        registry.register(
            "str_contains",
            &[("string", String), ("search", String)],
            Boolean,
            string::contains,
        );
        registry.register(
            "str_startswith",
            &[("string", String), ("prefix", String)],
            Boolean,
            string::starts_with,
        );
        registry.register(
            "str_endswith",
            &[("string", String), ("suffix", String)],
            Boolean,
            string::ends_with,
        );

        registry.register("to_num", &[("string", String)], Number, conversion::to_number);
        registry.register(
            "to_str",
            &[("value", Number)],
            String,
            conversion::number_to_string,
        );
        registry.register(
            "to_str",
            &[("value", Boolean)],
            String,
            conversion::boolean_to_string,
        );
        registry.register("to_bool", &[("string", String)], Boolean, conversion::to_boolean);
        registry
    }
    /// Adds a native function. A later entry with the same signature replaces
    /// an earlier one when the registry is loaded.
    pub fn register(
        &mut self,
        name: &'static str,
        parameters: &[(&'static str, Type)],
        return_type: Type,
        implementation: NativeImplementation,
    ) {
        self.functions.push(Rc::new(NativeFunction::new(
            name,
            parameters,
            return_type,
            implementation,
        )));
    }
    pub fn iter(&self) -> impl Iterator<Item = &Rc<NativeFunction>> {
        self.functions.iter()
    }
}
