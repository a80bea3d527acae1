use super::RuntimeValue;
use crate::scopes::Binding;
use std::{cell::RefCell, rc::Rc};

/// A runtime variable. Frames hold shared handles, so an assignment made
/// through any frame is seen by every frame the variable was copied into.
#[derive(Debug)]
pub struct Variable {
    depth: usize,
    value: RefCell<Option<RuntimeValue>>,
}

pub type VariableRef = Rc<Variable>;

impl Variable {
    pub fn new(depth: usize, value: Option<RuntimeValue>) -> VariableRef {
        Rc::new(Self {
            depth,
            value: RefCell::new(value),
        })
    }
    /// `None` until the variable is first assigned.
    pub fn get(&self) -> Option<RuntimeValue> {
        self.value.borrow().clone()
    }
    pub fn set(&self, value: RuntimeValue) {
        *self.value.borrow_mut() = Some(value);
    }
}

impl Binding for VariableRef {
    fn depth(&self) -> usize {
        self.depth
    }
}
