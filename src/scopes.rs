use std::collections::HashMap;

use colored::Colorize;
use thiserror::Error;

/// Something that can live in a scope frame. The depth is the function depth
/// at which the binding was declared and decides whether a later declaration
/// of the same name shadows it or collides with it.
pub trait Binding: Clone {
    fn depth(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Function calls and the top level. Entering one increases the depth.
    Function,
    /// Bodies of `if`, `while`, `try`, `catch` and plain blocks.
    Block,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{name}' is already declared at depth {depth}")]
pub struct Redeclaration {
    pub name: String,
    pub depth: usize,
}

#[derive(Debug, Clone)]
struct Frame<B> {
    kind: FrameKind,
    bindings: HashMap<String, B>,
}

/// A stack of frames mapping names to bindings.
///
/// Pushing a frame copies every binding visible in the current top frame into
/// the new one, so a frame sees whatever was live where it was pushed. For a
/// function frame that is the call site, not the definition site. Whether
/// the copy shares state with the original is up to `B`: the interpreter
/// stores shared handles, the validator plain values.
#[derive(Debug, Clone)]
pub struct Scopes<B> {
    frames: Vec<Frame<B>>,
    depth: usize,
}

impl<B: Binding> Default for Scopes<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Binding> Scopes<B> {
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            depth: 0,
        }
    }
    pub fn depth(&self) -> usize {
        self.depth
    }
    #[cfg(test)]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
    pub fn push(&mut self, kind: FrameKind) {
        let bindings = self
            .frames
            .last()
            .map(|frame| frame.bindings.clone())
            .unwrap_or_default();
        if kind == FrameKind::Function {
            self.depth += 1;
        }
        self.frames.push(Frame { kind, bindings });
        if cfg!(feature = "debug_scopes") {
            eprintln!(
                "{} push {:?} frame (frames: {}, depth: {})",
                "[scope]".dimmed(),
                kind,
                self.frames.len(),
                self.depth
            );
        }
    }
    pub fn pop(&mut self) -> Option<FrameKind> {
        let frame = self.frames.pop()?;
        if frame.kind == FrameKind::Function {
            self.depth -= 1;
        }
        if cfg!(feature = "debug_scopes") {
            eprintln!(
                "{} pop {:?} frame (frames: {}, depth: {})",
                "[scope]".dimmed(),
                frame.kind,
                self.frames.len(),
                self.depth
            );
        }
        Some(frame.kind)
    }
    pub fn get(&self, name: &str) -> Option<&B> {
        self.frames
            .last()
            .and_then(|frame| frame.bindings.get(name))
    }
    /// True when `name` is bound at the current depth, i.e. declaring it
    /// again here would be a redeclaration rather than shadowing.
    pub fn is_declared_here(&self, name: &str) -> bool {
        self.get(name)
            .map_or(false, |binding| binding.depth() == self.depth)
    }
    pub fn declare(&mut self, name: &str, binding: B) -> Result<(), Redeclaration> {
        if self.is_declared_here(name) {
            return Err(Redeclaration {
                name: name.to_string(),
                depth: self.depth,
            });
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.bindings.insert(name.to_string(), binding);
        }
        Ok(())
    }
}
