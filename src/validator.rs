use std::collections::HashMap;

use colored::Colorize;
use miette::Diagnostic;
use thiserror::Error;

use crate::{
    ast::*,
    scopes::{Binding, FrameKind, Scopes},
    stdlib::NativeRegistry,
    types::{self, Type},
    SourceReference, SourceSpan,
};

#[derive(Error, Diagnostic, Debug)]
pub enum ValidationError {
    #[error("Re-declaration of variable '{name}'")]
    Redeclaration {
        name: String,
        #[label("'{name}' is already declared in this scope")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Variables cannot have 'void' type")]
    VoidVariable {
        #[label("Declared here")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Parameters cannot have 'void' type")]
    VoidParameter {
        #[label("Declared here")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Undeclared variable '{name}'")]
    UndeclaredVariable {
        name: String,
        #[label("Used here")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Operation '{operator}' cannot be applied to '{operand_type}'")]
    UnaryOperandType {
        operator: UnaryOperator,
        operand_type: Type,
        #[label("This operator")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Cannot perform '{operator}' operation between {left_type} and {right_type}")]
    BinaryOperandTypes {
        operator: BinaryOperator,
        left_type: Type,
        right_type: Type,
        #[label("This operator")]
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
    #[error("Cannot assign value of type '{value_type}' to variable of type '{variable_type}'")]
    AssignmentType {
        value_type: Type,
        variable_type: Type,
        #[label("This is {value_type}")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("The condition of an 'if' statement must be a boolean expression")]
    IfCondition {
        #[label("This is {actual_type}")]
        found_at: SourceSpan,
        actual_type: Type,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("The condition of a 'while' loop must be a boolean expression")]
    WhileCondition {
        #[label("This is {actual_type}")]
        found_at: SourceSpan,
        actual_type: Type,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Must return a value of type '{expected_type}'")]
    ReturnType {
        expected_type: Type,
        actual_type: Type,
        #[label("This returns {actual_type}")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Cannot return from outside a function")]
    ReturnOutsideFunction {
        #[label("Return found here")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("'{keyword}' can only be used inside a 'while' loop")]
    LoopControlOutsideLoop {
        keyword: &'static str,
        #[label("Found here")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Function re-declaration: '{name}'")]
    FunctionRedeclaration {
        name: String,
        #[label("'{signature}' is already defined")]
        found_at: SourceSpan,
        signature: String,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("No function matches the signature '{signature}'")]
    UndefinedFunction {
        signature: String,
        #[label("Called here")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Catch parameter '{name}' must have 'str' type")]
    CatchParameterType {
        name: String,
        #[label("Declared as {actual_type}")]
        found_at: SourceSpan,
        actual_type: Type,
        #[source_code]
        source_code: SourceReference,
    },
}
impl ValidationError {
    pub fn source_span(&self) -> SourceSpan {
        match self {
            Self::Redeclaration { found_at, .. }
            | Self::VoidVariable { found_at, .. }
            | Self::VoidParameter { found_at, .. }
            | Self::UndeclaredVariable { found_at, .. }
            | Self::UnaryOperandType { found_at, .. }
            | Self::BinaryOperandTypes { found_at, .. }
            | Self::InvalidAssignmentTarget { found_at, .. }
            | Self::AssignmentType { found_at, .. }
            | Self::IfCondition { found_at, .. }
            | Self::WhileCondition { found_at, .. }
            | Self::ReturnType { found_at, .. }
            | Self::ReturnOutsideFunction { found_at, .. }
            | Self::LoopControlOutsideLoop { found_at, .. }
            | Self::FunctionRedeclaration { found_at, .. }
            | Self::UndefinedFunction { found_at, .. }
            | Self::CatchParameterType { found_at, .. } => *found_at,
        }
    }
}

#[derive(Debug, Clone)]
struct VariableType {
    ty: Type,
    depth: usize,
}
impl Binding for VariableType {
    fn depth(&self) -> usize {
        self.depth
    }
}

/// The construct a `return`, `break` or `continue` is nested in.
#[derive(Debug, Clone, Copy)]
enum Context {
    Function(Type),
    While,
}

struct Ctx {
    source_code: SourceReference,
}

/// Static checker run between parsing and execution. Stops at the first
/// error. Keeps its scopes and function table between calls to
/// [`Validator::validate`], so a clone taken beforehand can be used to roll
/// back a rejected program.
#[derive(Debug, Clone)]
pub struct Validator {
    scopes: Scopes<VariableType>,
    functions: HashMap<String, Type>,
    contexts: Vec<Context>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    pub fn new() -> Self {
        Self::with_natives(&NativeRegistry::standard())
    }
    pub fn with_natives(natives: &NativeRegistry) -> Self {
        let mut scopes = Scopes::new();
        scopes.push(FrameKind::Function);
        Self {
            scopes,
            functions: natives
                .iter()
                .map(|native| (native.signature(), native.return_type))
                .collect(),
            contexts: Vec::new(),
        }
    }
    pub fn validate(&mut self, program: &Program) -> Result<(), ValidationError> {
        let ctx = Ctx {
            source_code: program.source_reference.clone(),
        };
        for stmt in program.statements.iter() {
            self.validate_stmt(stmt, &ctx)?;
        }
        Ok(())
    }

    fn validate_stmt(&mut self, stmt: &Stmt, ctx: &Ctx) -> Result<(), ValidationError> {
        match stmt {
            Stmt::Expr(stmt) => {
                self.type_of(&stmt.expression, ctx)?;
            }
            Stmt::Block(stmt) => {
                self.with_frame(FrameKind::Block, |this| this.validate_block(&stmt.body, ctx))?
            }
            Stmt::Var(decl) => self.validate_var_decl(decl, ctx)?,
            Stmt::Fun(decl) => self.validate_fun_decl(decl, ctx)?,
            Stmt::Return(stmt) => {
                let expected_type = self
                    .contexts
                    .iter()
                    .rev()
                    .find_map(|context| match context {
                        Context::Function(return_type) => Some(*return_type),
                        Context::While => None,
                    })
                    .ok_or_else(|| ValidationError::ReturnOutsideFunction {
                        found_at: stmt.source_span(),
                        source_code: ctx.source_code.clone(),
                    })?;
                let actual_type = match &stmt.expression {
                    Some(expression) => self.type_of(expression, ctx)?,
                    None => Type::Void,
                };
                if actual_type != expected_type {
                    return Err(ValidationError::ReturnType {
                        expected_type,
                        actual_type,
                        found_at: stmt.source_span(),
                        source_code: ctx.source_code.clone(),
                    });
                }
            }
            Stmt::If(stmt) => {
                let actual_type = self.type_of(&stmt.condition, ctx)?;
                if actual_type != Type::Boolean {
                    return Err(ValidationError::IfCondition {
                        found_at: stmt.condition.source_span(),
                        actual_type,
                        source_code: ctx.source_code.clone(),
                    });
                }
                self.with_frame(FrameKind::Block, |this| {
                    this.validate_stmt(&stmt.then_branch, ctx)
                })?;
                if let Some(else_branch) = &stmt.else_branch {
                    self.with_frame(FrameKind::Block, |this| this.validate_stmt(else_branch, ctx))?;
                }
            }
            Stmt::While(stmt) => {
                let actual_type = self.type_of(&stmt.condition, ctx)?;
                if actual_type != Type::Boolean {
                    return Err(ValidationError::WhileCondition {
                        found_at: stmt.condition.source_span(),
                        actual_type,
                        source_code: ctx.source_code.clone(),
                    });
                }
                self.with_context(Context::While, |this| {
                    this.with_frame(FrameKind::Block, |this| this.validate_stmt(&stmt.body, ctx))
                })?;
            }
            Stmt::Break(keyword) => self.validate_loop_control("break", keyword, ctx)?,
            Stmt::Continue(keyword) => self.validate_loop_control("continue", keyword, ctx)?,
            Stmt::TryCatch(stmt) => {
                self.with_frame(FrameKind::Block, |this| {
                    this.validate_block(&stmt.try_block.body, ctx)
                })?;
                self.with_frame(FrameKind::Block, |this| {
                    for parameter in [&stmt.error_type, &stmt.error_message] {
                        if *parameter.ty != Type::String {
                            return Err(ValidationError::CatchParameterType {
                                name: parameter.name.name.clone(),
                                found_at: parameter.source_span(),
                                actual_type: *parameter.ty,
                                source_code: ctx.source_code.clone(),
                            });
                        }
                        this.declare(&parameter.name, Type::String, parameter.source_span(), ctx)?;
                    }
                    this.validate_block(&stmt.catch_block.body, ctx)
                })?;
            }
        }
        Ok(())
    }
    fn validate_block(&mut self, body: &[Stmt], ctx: &Ctx) -> Result<(), ValidationError> {
        for stmt in body {
            self.validate_stmt(stmt, ctx)?;
        }
        Ok(())
    }
    fn validate_var_decl(&mut self, decl: &VarDecl, ctx: &Ctx) -> Result<(), ValidationError> {
        if *decl.ty == Type::Void {
            return Err(ValidationError::VoidVariable {
                found_at: decl.source_span(),
                source_code: ctx.source_code.clone(),
            });
        }
        if self.scopes.is_declared_here(&decl.identifier.name) {
            return Err(ValidationError::Redeclaration {
                name: decl.identifier.name.clone(),
                found_at: decl.source_span(),
                source_code: ctx.source_code.clone(),
            });
        }
        if let Some(initializer) = &decl.initializer {
            let value_type = self.type_of(initializer, ctx)?;
            if value_type != *decl.ty {
                return Err(ValidationError::AssignmentType {
                    value_type,
                    variable_type: *decl.ty,
                    found_at: initializer.source_span(),
                    source_code: ctx.source_code.clone(),
                });
            }
        }
        self.declare(&decl.identifier, *decl.ty, decl.source_span(), ctx)
    }
    fn validate_fun_decl(&mut self, decl: &FunDecl, ctx: &Ctx) -> Result<(), ValidationError> {
        let fun = &decl.fun;
        if let Some(parameter) = fun.parameters.iter().find(|p| *p.ty == Type::Void) {
            return Err(ValidationError::VoidParameter {
                found_at: parameter.source_span(),
                source_code: ctx.source_code.clone(),
            });
        }

        let signature = fun.signature();
        if self.functions.contains_key(&signature) {
            return Err(ValidationError::FunctionRedeclaration {
                name: fun.name.name.clone(),
                found_at: fun.name.source_span(),
                signature,
                source_code: ctx.source_code.clone(),
            });
        }
        if cfg!(feature = "debug") {
            eprintln!(
                "{} {} : {}",
                "[define]".dimmed(),
                signature,
                fun.return_type.inner()
            );
        }
        self.functions.insert(signature, *fun.return_type);

        self.with_frame(FrameKind::Function, |this| {
            for parameter in fun.parameters.iter() {
                this.declare(&parameter.name, *parameter.ty, parameter.source_span(), ctx)?;
            }
            this.with_context(Context::Function(*fun.return_type), |this| {
                this.validate_block(&fun.body.body, ctx)
            })
        })
    }
    fn validate_loop_control(
        &self,
        keyword: &'static str,
        stmt: &WithSpan<()>,
        ctx: &Ctx,
    ) -> Result<(), ValidationError> {
        match self.contexts.last() {
            Some(Context::While) => Ok(()),
            _ => Err(ValidationError::LoopControlOutsideLoop {
                keyword,
                found_at: stmt.source_span(),
                source_code: ctx.source_code.clone(),
            }),
        }
    }

    fn type_of(&mut self, expr: &Expr, ctx: &Ctx) -> Result<Type, ValidationError> {
        match expr {
            Expr::Number(_) => Ok(Type::Number),
            Expr::String(_) => Ok(Type::String),
            Expr::Boolean(_) => Ok(Type::Boolean),
            Expr::Identifier(identifier) => self.type_of_variable(identifier, ctx),
            Expr::Unary(UnaryExpr { operator, operand }) => {
                let operand_type = self.type_of(operand, ctx)?;
                let expected_type = match operator.inner() {
                    UnaryOperator::Plus | UnaryOperator::Minus => Type::Number,
                    UnaryOperator::Not => Type::Boolean,
                };
                if operand_type == expected_type {
                    Ok(expected_type)
                } else {
                    Err(ValidationError::UnaryOperandType {
                        operator: *operator.inner(),
                        operand_type,
                        found_at: operator.source_span(),
                        source_code: ctx.source_code.clone(),
                    })
                }
            }
            Expr::Binary(expr) if *expr.operator == BinaryOperator::Assign => {
                self.type_of_assignment(expr, ctx)
            }
            Expr::Binary(BinaryExpr {
                left,
                right,
                operator,
            }) => {
                let left_type = self.type_of(left, ctx)?;
                let right_type = self.type_of(right, ctx)?;
                binary_result_type(*operator.inner(), left_type, right_type).ok_or_else(|| {
                    ValidationError::BinaryOperandTypes {
                        operator: *operator.inner(),
                        left_type,
                        right_type,
                        found_at: operator.source_span(),
                        source_code: ctx.source_code.clone(),
                    }
                })
            }
            Expr::Call(call) => {
                let argument_types = call
                    .arguments
                    .iter()
                    .map(|argument| self.type_of(argument, ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                let signature =
                    types::signature(&call.callee.name, argument_types.iter().map(Type::name));
                self.functions.get(&signature).copied().ok_or_else(|| {
                    ValidationError::UndefinedFunction {
                        signature,
                        found_at: call.source_span(),
                        source_code: ctx.source_code.clone(),
                    }
                })
            }
        }
    }
    fn type_of_variable(&self, identifier: &Identifier, ctx: &Ctx) -> Result<Type, ValidationError> {
        self.scopes
            .get(&identifier.name)
            .map(|variable| variable.ty)
            .ok_or_else(|| ValidationError::UndeclaredVariable {
                name: identifier.name.clone(),
                found_at: identifier.source_span(),
                source_code: ctx.source_code.clone(),
            })
    }
    fn type_of_assignment(&mut self, expr: &BinaryExpr, ctx: &Ctx) -> Result<Type, ValidationError> {
        let identifier = match expr.left.as_ref() {
            Expr::Identifier(identifier) => identifier,
            target => {
                return Err(ValidationError::InvalidAssignmentTarget {
                    found_at: target.source_span(),
                    source_code: ctx.source_code.clone(),
                })
            }
        };
        let variable_type = self.type_of_variable(identifier, ctx)?;
        let value_type = self.type_of(&expr.right, ctx)?;
        if value_type == variable_type {
            Ok(variable_type)
        } else {
            Err(ValidationError::AssignmentType {
                value_type,
                variable_type,
                found_at: expr.operator.source_span(),
                source_code: ctx.source_code.clone(),
            })
        }
    }

    fn declare(
        &mut self,
        identifier: &Identifier,
        ty: Type,
        declaration_span: SourceSpan,
        ctx: &Ctx,
    ) -> Result<(), ValidationError> {
        let depth = self.scopes.depth();
        self.scopes
            .declare(&identifier.name, VariableType { ty, depth })
            .map_err(|_| ValidationError::Redeclaration {
                name: identifier.name.clone(),
                found_at: declaration_span,
                source_code: ctx.source_code.clone(),
            })
    }
    fn with_frame<T, F: FnOnce(&mut Self) -> T>(&mut self, kind: FrameKind, run: F) -> T {
        self.scopes.push(kind);
        let result = run(self);
        self.scopes.pop();
        result
    }
    fn with_context<T, F: FnOnce(&mut Self) -> T>(&mut self, context: Context, run: F) -> T {
        self.contexts.push(context);
        let result = run(self);
        self.contexts.pop();
        result
    }
}

/// Result type of a non-assignment binary operator, or `None` when the
/// operand types are not accepted. The interpreter applies the same table to
/// runtime values.
pub fn binary_result_type(operator: BinaryOperator, left: Type, right: Type) -> Option<Type> {
    use BinaryOperator::*;
    use Type::*;
    match (operator, left, right) {
        (Plus, Number, Number) => Some(Number),
        (Plus, String, _) | (Plus, _, String) => Some(String),
        (Minus | Multiply | Divide | Modulo, Number, Number) => Some(Number),
        (GreaterThan | GreaterThanOrEqualTo | LessThan | LessThanOrEqualTo, Number, Number) => {
            Some(Boolean)
        }
        (EqualTo | NotEqualTo, left, right) if left == right && left != Void => Some(Boolean),
        (LogicalAnd | LogicalOr, Boolean, Boolean) => Some(Boolean),
        _ => None,
    }
}
