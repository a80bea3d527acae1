use std::{
    fmt::{Debug, Display},
    ops::Deref,
    rc::Rc,
};

use itertools::Itertools;

use crate::{
    source::SourceSpan,
    types::{self, Type},
    SourceReference,
};

#[derive(Debug, Clone)]
pub struct WithSpan<T> {
    inner: T,
    source_span: SourceSpan,
}

impl<T> WithSpan<T> {
    pub fn new(inner: T, source_span: SourceSpan) -> Self {
        Self { inner, source_span }
    }
    pub fn source_span(&self) -> SourceSpan {
        self.source_span
    }
    pub fn inner(&self) -> &T {
        &self.inner
    }
}
impl<T> Deref for WithSpan<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub trait AstNode {
    fn source_span(&self) -> SourceSpan;
}

#[derive(Debug)]
pub struct Program {
    pub statements: Vec<Stmt>,
    pub source_reference: SourceReference,
}
impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for stmt in self.statements.iter() {
            writeln!(f, "{}", stmt)?;
        }
        Ok(())
    }
}
impl AstNode for Program {
    fn source_span(&self) -> SourceSpan {
        match (self.statements.first(), self.statements.last()) {
            (Some(first), Some(last)) => first.source_span().to(last.source_span()),
            _ => 0.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Identifier {
    pub source_span: SourceSpan,
    pub name: String,
}
impl AstNode for Identifier {
    fn source_span(&self) -> SourceSpan {
        self.source_span
    }
}
impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// A name with its declared type, as written in parameter lists and catch
/// clauses: `name: type`.
#[derive(Debug)]
pub struct Parameter {
    pub name: Identifier,
    pub ty: WithSpan<Type>,
}
impl AstNode for Parameter {
    fn source_span(&self) -> SourceSpan {
        self.name.source_span().to(self.ty.source_span())
    }
}
impl Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.ty.keyword())
    }
}

#[derive(Debug)]
pub struct ExprStmt {
    pub expression: Expr,
    pub semicolon_span: SourceSpan,
}
impl Display for ExprStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.expression, f)
    }
}
impl AstNode for ExprStmt {
    fn source_span(&self) -> SourceSpan {
        self.expression.source_span().to(self.semicolon_span)
    }
}

#[derive(Debug)]
pub struct BlockStmt {
    pub body: Vec<Stmt>,
    pub open_span: SourceSpan,
    pub close_span: SourceSpan,
}
impl Display for BlockStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.body.is_empty() {
            f.write_str("(do)")
        } else {
            write!(f, "(do {})", self.body.iter().join(" "))
        }
    }
}
impl AstNode for BlockStmt {
    fn source_span(&self) -> SourceSpan {
        self.open_span.to(self.close_span)
    }
}

#[derive(Debug)]
pub struct VarDecl {
    pub var_span: SourceSpan,
    pub identifier: Identifier,
    pub ty: WithSpan<Type>,
    pub initializer: Option<Expr>,
    pub semicolon_span: SourceSpan,
}
impl AstNode for VarDecl {
    fn source_span(&self) -> SourceSpan {
        self.var_span.to(self.semicolon_span)
    }
}
impl Display for VarDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.initializer {
            Some(init) => write!(f, "(var {} {} {})", self.identifier, self.ty.keyword(), init),
            None => write!(f, "(var {} {})", self.identifier, self.ty.keyword()),
        }
    }
}

#[derive(Debug)]
pub struct Fun {
    pub name: Identifier,
    pub parameters: Vec<Parameter>,
    pub return_type: WithSpan<Type>,
    pub body: BlockStmt,
}
impl Fun {
    pub fn signature(&self) -> String {
        types::signature(
            &self.name.name,
            self.parameters.iter().map(|parameter| parameter.ty.name()),
        )
    }
}

#[derive(Debug)]
pub struct FunDecl {
    pub fun_span: SourceSpan,
    pub fun: Rc<Fun>,
}
impl AstNode for FunDecl {
    fn source_span(&self) -> SourceSpan {
        self.fun_span.to(self.fun.body.source_span())
    }
}
impl Display for FunDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(fun {} ({}) {} {})",
            self.fun.name,
            self.fun.parameters.iter().join(" "),
            self.fun.return_type.keyword(),
            self.fun.body
        )
    }
}

#[derive(Debug)]
pub struct ReturnStmt {
    pub return_span: SourceSpan,
    pub expression: Option<Expr>,
    pub semicolon_span: SourceSpan,
}
impl AstNode for ReturnStmt {
    fn source_span(&self) -> SourceSpan {
        self.return_span.to(self.semicolon_span)
    }
}
impl Display for ReturnStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.expression {
            Some(expression) => write!(f, "(return {})", expression),
            None => f.write_str("(return)"),
        }
    }
}

#[derive(Debug)]
pub struct IfStmt {
    pub if_span: SourceSpan,
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
}
impl AstNode for IfStmt {
    fn source_span(&self) -> SourceSpan {
        let last = self.else_branch.as_ref().unwrap_or(&self.then_branch);
        self.if_span.to(last.source_span())
    }
}
impl Display for IfStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.else_branch {
            Some(else_branch) => write!(
                f,
                "(if {} {} {})",
                self.condition, self.then_branch, else_branch
            ),
            None => write!(f, "(if {} {})", self.condition, self.then_branch),
        }
    }
}

#[derive(Debug)]
pub struct WhileStmt {
    pub while_span: SourceSpan,
    pub condition: Expr,
    pub body: Box<Stmt>,
}
impl AstNode for WhileStmt {
    fn source_span(&self) -> SourceSpan {
        self.while_span.to(self.body.source_span())
    }
}
impl Display for WhileStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(while {} {})", self.condition, self.body)
    }
}

#[derive(Debug)]
pub struct TryCatchStmt {
    pub try_span: SourceSpan,
    pub try_block: BlockStmt,
    pub error_type: Parameter,
    pub error_message: Parameter,
    pub catch_block: BlockStmt,
}
impl AstNode for TryCatchStmt {
    fn source_span(&self) -> SourceSpan {
        self.try_span.to(self.catch_block.source_span())
    }
}
impl Display for TryCatchStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(try {} (catch {} {}) {})",
            self.try_block, self.error_type, self.error_message, self.catch_block
        )
    }
}

#[derive(Debug)]
pub enum Stmt {
    Expr(ExprStmt),
    Block(BlockStmt),
    Var(VarDecl),
    Fun(FunDecl),
    Return(ReturnStmt),
    If(IfStmt),
    While(WhileStmt),
    Break(WithSpan<()>),
    Continue(WithSpan<()>),
    TryCatch(TryCatchStmt),
}
impl Display for Stmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Expr(stmt) => Display::fmt(stmt, f),
            Self::Block(stmt) => Display::fmt(stmt, f),
            Self::Var(stmt) => Display::fmt(stmt, f),
            Self::Fun(stmt) => Display::fmt(stmt, f),
            Self::Return(stmt) => Display::fmt(stmt, f),
            Self::If(stmt) => Display::fmt(stmt, f),
            Self::While(stmt) => Display::fmt(stmt, f),
            Self::Break(_) => f.write_str("(break)"),
            Self::Continue(_) => f.write_str("(continue)"),
            Self::TryCatch(stmt) => Display::fmt(stmt, f),
        }
    }
}
impl AstNode for Stmt {
    fn source_span(&self) -> SourceSpan {
        match self {
            Self::Expr(stmt) => stmt.source_span(),
            Self::Block(stmt) => stmt.source_span(),
            Self::Var(stmt) => stmt.source_span(),
            Self::Fun(stmt) => stmt.source_span(),
            Self::Return(stmt) => stmt.source_span(),
            Self::If(stmt) => stmt.source_span(),
            Self::While(stmt) => stmt.source_span(),
            Self::Break(stmt) => stmt.source_span(),
            Self::Continue(stmt) => stmt.source_span(),
            Self::TryCatch(stmt) => stmt.source_span(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Assign,
    LogicalAnd,
    LogicalOr,
    EqualTo,
    NotEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
}
impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Assign => "=",
            Self::LogicalAnd => "&&",
            Self::LogicalOr => "||",
            Self::EqualTo => "==",
            Self::NotEqualTo => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqualTo => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqualTo => "<=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
        })
    }
}

#[derive(Debug)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub operator: WithSpan<BinaryOperator>,
}
impl Display for BinaryExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.operator.inner, self.left, self.right)
    }
}
impl AstNode for BinaryExpr {
    fn source_span(&self) -> SourceSpan {
        self.left.source_span().to(self.right.source_span())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
    Not,
}
impl Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Not => "!",
        })
    }
}

#[derive(Debug)]
pub struct UnaryExpr {
    pub operator: WithSpan<UnaryOperator>,
    pub operand: Box<Expr>,
}
impl Display for UnaryExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {})", self.operator.inner, self.operand)
    }
}
impl AstNode for UnaryExpr {
    fn source_span(&self) -> SourceSpan {
        self.operator.source_span.to(self.operand.source_span())
    }
}

#[derive(Debug)]
pub struct CallExpr {
    pub callee: Identifier,
    pub arguments: Vec<Expr>,
    pub close_paren_span: SourceSpan,
}
impl Display for CallExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.arguments.is_empty() {
            write!(f, "(call {})", self.callee)
        } else {
            write!(f, "(call {} {})", self.callee, self.arguments.iter().join(" "))
        }
    }
}
impl AstNode for CallExpr {
    fn source_span(&self) -> SourceSpan {
        self.callee.source_span().to(self.close_paren_span)
    }
}

#[derive(Debug)]
pub enum Expr {
    Number(WithSpan<f64>),
    String(WithSpan<String>),
    Boolean(WithSpan<bool>),
    Identifier(Identifier),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Call(CallExpr),
}
impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(literal) => write!(f, "{}", literal.inner),
            Self::String(literal) => write!(f, "\"{}\"", literal.inner),
            Self::Boolean(literal) => write!(f, "{}", literal.inner),
            Self::Identifier(expr) => Display::fmt(expr, f),
            Self::Unary(expr) => Display::fmt(expr, f),
            Self::Binary(expr) => Display::fmt(expr, f),
            Self::Call(expr) => Display::fmt(expr, f),
        }
    }
}
impl AstNode for Expr {
    fn source_span(&self) -> SourceSpan {
        match self {
            Self::Number(literal) => literal.source_span(),
            Self::String(literal) => literal.source_span(),
            Self::Boolean(literal) => literal.source_span(),
            Self::Identifier(expr) => expr.source_span(),
            Self::Unary(expr) => expr.source_span(),
            Self::Binary(expr) => expr.source_span(),
            Self::Call(expr) => expr.source_span(),
        }
    }
}
