mod completion;
mod error;
mod native_function;
mod runtime_value;
mod variable;

use crate::{
    ast::*,
    scopes::{FrameKind, Scopes},
    source::SourceSpan,
    stdlib::{Console, NativeRegistry},
    types, SourceReference,
};
use colored::Colorize;
use completion::{Fault, StatementResult};
pub use error::RuntimeError;
pub use native_function::{
    NativeContext, NativeError, NativeFunction, NativeFunctionException, NativeImplementation,
};
pub use runtime_value::*;
use std::{collections::HashMap, rc::Rc};
pub(crate) use variable::{Variable, VariableRef};

#[derive(Debug, Clone)]
struct Ctx {
    source_code: SourceReference,
}

#[derive(Debug, Clone)]
enum Callable {
    User(Rc<Fun>),
    Native(Rc<NativeFunction>),
}

/// Walks a validated program and runs it. Console reads and writes go
/// through `C`. Variables and functions persist across calls to
/// [`Interpreter::execute`], which is what the REPL relies on.
pub struct Interpreter<'a, C: Console> {
    scopes: Scopes<VariableRef>,
    functions: HashMap<String, Callable>,
    console: &'a mut C,
}

impl<'a, C: Console> Interpreter<'a, C> {
    pub fn new(console: &'a mut C) -> Self {
        Self::with_natives(console, &NativeRegistry::standard())
    }
    pub fn with_natives(console: &'a mut C, natives: &NativeRegistry) -> Self {
        let mut scopes = Scopes::new();
        scopes.push(FrameKind::Function);
        Self {
            scopes,
            functions: natives
                .iter()
                .map(|native| (native.signature(), Callable::Native(native.clone())))
                .collect(),
            console,
        }
    }
    pub fn execute(&mut self, program: &Program) -> Result<(), RuntimeError> {
        let ctx = Ctx {
            source_code: program.source_reference.clone(),
        };
        if cfg!(feature = "debug") {
            eprint!("{}\n{}", "[program]".dimmed(), program);
        }
        for stmt in program.statements.iter() {
            match self.exec_stmt(stmt, &ctx) {
                Ok(_) => {}
                Err(Fault::Runtime(err)) => return Err(err),
                Err(Fault::Exception {
                    exception,
                    raised_at,
                }) => {
                    return Err(RuntimeError::UncaughtException {
                        exception_type: exception.exception_type,
                        message: exception.message,
                        found_at: raised_at,
                        source_code: ctx.source_code,
                    })
                }
            }
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &Stmt, ctx: &Ctx) -> Result<StatementResult, Fault> {
        match stmt {
            Stmt::Expr(stmt) => {
                self.eval_expr(&stmt.expression, ctx)?;
                Ok(StatementResult::Normal)
            }
            Stmt::Block(stmt) => {
                self.with_frame(FrameKind::Block, |this| this.exec_block(&stmt.body, ctx))
            }
            Stmt::Var(decl) => {
                let initial_value = decl
                    .initializer
                    .as_ref()
                    .map(|expr| self.eval_expr(expr, ctx))
                    .transpose()?;
                self.declare(&decl.identifier, initial_value, ctx)?;
                Ok(StatementResult::Normal)
            }
            Stmt::Fun(decl) => {
                let signature = decl.fun.signature();
                if cfg!(feature = "debug") {
                    eprintln!("{} {}", "[define]".dimmed(), signature);
                }
                self.functions
                    .insert(signature, Callable::User(decl.fun.clone()));
                Ok(StatementResult::Normal)
            }
            Stmt::Return(stmt) => {
                let value = match &stmt.expression {
                    Some(expression) => self.eval_expr(expression, ctx)?,
                    None => RuntimeValue::Void,
                };
                Ok(StatementResult::Return(value))
            }
            Stmt::If(stmt) => {
                if self.eval_condition(&stmt.condition, ctx)? {
                    self.with_frame(FrameKind::Block, |this| {
                        this.exec_stmt(&stmt.then_branch, ctx)
                    })
                } else if let Some(else_branch) = &stmt.else_branch {
                    self.with_frame(FrameKind::Block, |this| this.exec_stmt(else_branch, ctx))
                } else {
                    Ok(StatementResult::Normal)
                }
            }
            Stmt::While(stmt) => {
                while self.eval_condition(&stmt.condition, ctx)? {
                    match self.with_frame(FrameKind::Block, |this| this.exec_stmt(&stmt.body, ctx))? {
                        StatementResult::Break => break,
                        StatementResult::Return(value) => {
                            return Ok(StatementResult::Return(value))
                        }
                        StatementResult::Normal | StatementResult::Continue => {}
                    }
                }
                Ok(StatementResult::Normal)
            }
            Stmt::Break(_) => Ok(StatementResult::Break),
            Stmt::Continue(_) => Ok(StatementResult::Continue),
            Stmt::TryCatch(stmt) => self.exec_try_catch(stmt, ctx),
        }
    }
    fn exec_block(&mut self, body: &[Stmt], ctx: &Ctx) -> Result<StatementResult, Fault> {
        for stmt in body {
            match self.exec_stmt(stmt, ctx)? {
                StatementResult::Normal => {}
                abrupt => return Ok(abrupt),
            }
        }
        Ok(StatementResult::Normal)
    }
    /// Runs the try block; if a native exception escapes it, runs the catch
    /// block with the exception bound. Exceptions escaping the catch block
    /// propagate.
    fn exec_try_catch(
        &mut self,
        stmt: &TryCatchStmt,
        ctx: &Ctx,
    ) -> Result<StatementResult, Fault> {
        let outcome = self.with_frame(FrameKind::Block, |this| {
            this.exec_block(&stmt.try_block.body, ctx)
        });
        match outcome {
            Err(Fault::Exception { exception, .. }) => {
                if cfg!(feature = "debug") {
                    eprintln!("{} {}", "[catch]".dimmed(), exception);
                }
                self.with_frame(FrameKind::Block, |this| {
                    this.declare(
                        &stmt.error_type.name,
                        Some(exception.exception_type.into()),
                        ctx,
                    )?;
                    this.declare(&stmt.error_message.name, Some(exception.message.into()), ctx)?;
                    this.exec_block(&stmt.catch_block.body, ctx)
                })
            }
            other => other,
        }
    }

    fn eval_expr(&mut self, expr: &Expr, ctx: &Ctx) -> Result<RuntimeValue, Fault> {
        match expr {
            Expr::Number(literal) => Ok((*literal.inner()).into()),
            Expr::String(literal) => Ok(literal.inner().clone().into()),
            Expr::Boolean(literal) => Ok((*literal.inner()).into()),
            Expr::Identifier(identifier) => self.eval_variable(identifier, ctx),
            Expr::Unary(UnaryExpr { operator, operand }) => {
                let operand_val = self.eval_expr(operand, ctx)?;
                let result: Option<RuntimeValue> = match (operator.inner(), &operand_val) {
                    (UnaryOperator::Plus, RuntimeValue::Number(n)) => Some((*n).into()),
                    (UnaryOperator::Minus, RuntimeValue::Number(n)) => Some((-*n).into()),
                    (UnaryOperator::Not, RuntimeValue::Boolean(b)) => Some((!*b).into()),
                    _ => None,
                };
                result.ok_or_else(|| {
                    Fault::Runtime(RuntimeError::UnaryOperandType {
                        operator: *operator.inner(),
                        operand_type: operand_val.type_of(),
                        operator_loc: operator.source_span(),
                        source_code: ctx.source_code.clone(),
                    })
                })
            }
            Expr::Binary(expr) => match expr.operator.inner() {
                BinaryOperator::Assign => self.eval_assignment(expr, ctx),
                BinaryOperator::LogicalAnd | BinaryOperator::LogicalOr => {
                    self.eval_logical(expr, ctx)
                }
                operator => {
                    let left_val = self.eval_expr(&expr.left, ctx)?;
                    let right_val = self.eval_expr(&expr.right, ctx)?;
                    let left_type = left_val.type_of();
                    let right_type = right_val.type_of();
                    binary_operation(*operator, left_val, right_val).ok_or_else(|| {
                        Fault::Runtime(RuntimeError::OperandTypes {
                            operator: *operator,
                            left_type,
                            right_type,
                            operator_loc: expr.operator.source_span(),
                            source_code: ctx.source_code.clone(),
                        })
                    })
                }
            },
            Expr::Call(call) => self.eval_call(call, ctx),
        }
    }
    fn eval_logical(&mut self, expr: &BinaryExpr, ctx: &Ctx) -> Result<RuntimeValue, Fault> {
        let short_circuit_on = *expr.operator == BinaryOperator::LogicalOr;
        let left_val = self.eval_expr(&expr.left, ctx)?;
        if left_val == RuntimeValue::Boolean(short_circuit_on) {
            return Ok(left_val);
        }
        let right_val = self.eval_expr(&expr.right, ctx)?;
        match (&left_val, &right_val) {
            (RuntimeValue::Boolean(_), RuntimeValue::Boolean(_)) => Ok(right_val),
            _ => Err(Fault::Runtime(RuntimeError::OperandTypes {
                operator: *expr.operator,
                left_type: left_val.type_of(),
                right_type: right_val.type_of(),
                operator_loc: expr.operator.source_span(),
                source_code: ctx.source_code.clone(),
            })),
        }
    }
    fn eval_assignment(&mut self, expr: &BinaryExpr, ctx: &Ctx) -> Result<RuntimeValue, Fault> {
        let identifier = match expr.left.as_ref() {
            Expr::Identifier(identifier) => identifier,
            target => {
                return Err(Fault::Runtime(RuntimeError::InvalidAssignmentTarget {
                    found_at: target.source_span(),
                    source_code: ctx.source_code.clone(),
                }))
            }
        };
        let value = self.eval_expr(&expr.right, ctx)?;
        self.lookup(identifier, ctx)?.set(value.clone());
        Ok(value)
    }
    fn eval_variable(&self, identifier: &Identifier, ctx: &Ctx) -> Result<RuntimeValue, Fault> {
        self.lookup(identifier, ctx)?.get().ok_or_else(|| {
            Fault::Runtime(RuntimeError::UninitializedVariable {
                name: identifier.name.clone(),
                found_at: identifier.source_span(),
                source_code: ctx.source_code.clone(),
            })
        })
    }
    fn eval_condition(&mut self, condition: &Expr, ctx: &Ctx) -> Result<bool, Fault> {
        match self.eval_expr(condition, ctx)? {
            RuntimeValue::Boolean(value) => Ok(value),
            other => Err(Fault::Runtime(RuntimeError::NotBoolean {
                actual_type: other.type_of(),
                found_at: condition.source_span(),
                source_code: ctx.source_code.clone(),
            })),
        }
    }
    fn eval_call(&mut self, call: &CallExpr, ctx: &Ctx) -> Result<RuntimeValue, Fault> {
        let argument_vals = call
            .arguments
            .iter()
            .map(|arg| self.eval_expr(arg, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        let signature = types::signature(
            &call.callee.name,
            argument_vals.iter().map(|value| value.type_of().name()),
        );
        let callable = self.functions.get(&signature).cloned().ok_or_else(|| {
            RuntimeError::UndefinedFunction {
                signature: signature.clone(),
                found_at: call.source_span(),
                source_code: ctx.source_code.clone(),
            }
        })?;
        if cfg!(feature = "debug") {
            eprintln!(
                "{} {}({:?}) at depth {}",
                "[call]".dimmed(),
                signature,
                argument_vals,
                self.scopes.depth() + 1
            );
        }

        match callable {
            Callable::User(fun) => self.call_function(&fun, argument_vals, ctx),
            Callable::Native(native) => {
                self.call_native(&native, argument_vals, call.source_span(), ctx)
            }
        }
    }
    fn call_function(
        &mut self,
        fun: &Fun,
        argument_vals: Vec<RuntimeValue>,
        ctx: &Ctx,
    ) -> Result<RuntimeValue, Fault> {
        self.with_frame(FrameKind::Function, |this| {
            for (parameter, value) in fun.parameters.iter().zip(argument_vals) {
                this.declare(&parameter.name, Some(value), ctx)?;
            }
            match this.exec_block(&fun.body.body, ctx)? {
                StatementResult::Return(value) => Ok(value),
                _ => Ok(RuntimeValue::Void),
            }
        })
    }
    fn call_native(
        &mut self,
        native: &NativeFunction,
        argument_vals: Vec<RuntimeValue>,
        call_span: SourceSpan,
        ctx: &Ctx,
    ) -> Result<RuntimeValue, Fault> {
        self.with_frame(FrameKind::Function, |this| {
            let depth = this.scopes.depth();
            for ((name, _), value) in native.parameters.iter().zip(argument_vals) {
                this.scopes
                    .declare(name, Variable::new(depth, Some(value)))
                    .map_err(|_| RuntimeError::AlreadyDefinedVariable {
                        name: name.to_string(),
                        found_at: call_span,
                        source_code: ctx.source_code.clone(),
                    })?;
            }
            let mut context = NativeContext::new(&this.scopes, &mut *this.console);
            (native.implementation)(&mut context).map_err(|err| match err {
                NativeError::Exception(exception) => Fault::Exception {
                    exception,
                    raised_at: call_span,
                },
                NativeError::Io(source) => Fault::Runtime(RuntimeError::Io {
                    source,
                    found_at: call_span,
                    source_code: ctx.source_code.clone(),
                }),
                NativeError::Argument(message) => Fault::Runtime(RuntimeError::NativeArgument {
                    function: native.name.to_string(),
                    message,
                    found_at: call_span,
                    source_code: ctx.source_code.clone(),
                }),
            })
        })
    }

    fn lookup(&self, identifier: &Identifier, ctx: &Ctx) -> Result<VariableRef, RuntimeError> {
        self.scopes
            .get(&identifier.name)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: identifier.name.clone(),
                found_at: identifier.source_span(),
                source_code: ctx.source_code.clone(),
            })
    }
    fn declare(
        &mut self,
        identifier: &Identifier,
        value: Option<RuntimeValue>,
        ctx: &Ctx,
    ) -> Result<(), RuntimeError> {
        let variable = Variable::new(self.scopes.depth(), value);
        self.scopes
            .declare(&identifier.name, variable)
            .map_err(|_| RuntimeError::AlreadyDefinedVariable {
                name: identifier.name.clone(),
                found_at: identifier.source_span(),
                source_code: ctx.source_code.clone(),
            })
    }
    fn with_frame<T, F: FnOnce(&mut Self) -> T>(&mut self, kind: FrameKind, run: F) -> T {
        self.scopes.push(kind);
        let result = run(self);
        self.scopes.pop();
        result
    }
}

/// Applies a non-assignment, non-logical binary operator, mirroring the
/// validator's operator table. `None` when the operands are not accepted.
fn binary_operation(
    operator: BinaryOperator,
    left: RuntimeValue,
    right: RuntimeValue,
) -> Option<RuntimeValue> {
    use BinaryOperator::*;
    use RuntimeValue::Number;
    Some(match (operator, left, right) {
        (Plus, Number(left), Number(right)) => (left + right).into(),
        (Plus, left @ RuntimeValue::String(_), right)
        | (Plus, left, right @ RuntimeValue::String(_)) => format!("{}{}", left, right).into(),
        (Minus, Number(left), Number(right)) => (left - right).into(),
        (Multiply, Number(left), Number(right)) => (left * right).into(),
        (Divide, Number(left), Number(right)) => (left / right).into(),
        (Modulo, Number(left), Number(right)) => (left % right).into(),
        (GreaterThan, Number(left), Number(right)) => (left > right).into(),
        (GreaterThanOrEqualTo, Number(left), Number(right)) => (left >= right).into(),
        (LessThan, Number(left), Number(right)) => (left < right).into(),
        (LessThanOrEqualTo, Number(left), Number(right)) => (left <= right).into(),
        (EqualTo | NotEqualTo, left, right)
            if left.type_of() == right.type_of() && left != RuntimeValue::Void =>
        {
            ((left == right) == (operator == EqualTo)).into()
        }
        _ => return None,
    })
}
