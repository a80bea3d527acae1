use itertools::Itertools;
use miette::Diagnostic;
use std::{fmt::Display, rc::Rc};
use thiserror::Error;

use crate::{
    ast::*,
    scanner::{Token, TokenKind},
    source::SourceSpan,
    types::Type,
    SourceReference,
};

/// What the parser was looking for when it gave up on a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    OneOf(Vec<&'static str>),
    Expression,
    Identifier,
    Type,
}
impl Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OneOf(lexemes) if lexemes.len() == 1 => write!(f, "'{}'", lexemes[0]),
            Self::OneOf(lexemes) => write!(
                f,
                "one of {}",
                lexemes.iter().map(|lexeme| format!("'{}'", lexeme)).join(", ")
            ),
            Self::Expression => f.write_str("an expression"),
            Self::Identifier => f.write_str("an identifier"),
            Self::Type => f.write_str("a type ('num', 'str', 'bool' or 'void')"),
        }
    }
}

#[derive(Error, Diagnostic, Debug)]
pub enum ParserError {
    #[error("Expected {expected}, found '{found}'")]
    UnexpectedToken {
        expected: Expected,
        found: String,
        #[label("Found '{found}' here")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Expected {expected}, but reached the end of input")]
    UnexpectedEndOfInput {
        expected: Expected,
        #[label("Input ends after this")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Invalid token '{found}'")]
    InvalidToken {
        found: String,
        #[label("Not a valid token")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
    #[error("Invalid number literal '{found}'")]
    InvalidNumber {
        found: String,
        #[label("Cannot be read as a number")]
        found_at: SourceSpan,
        #[source_code]
        source_code: SourceReference,
    },
}
impl ParserError {
    pub fn source_span(&self) -> SourceSpan {
        match self {
            Self::UnexpectedToken { found_at, .. }
            | Self::UnexpectedEndOfInput { found_at, .. }
            | Self::InvalidToken { found_at, .. }
            | Self::InvalidNumber { found_at, .. } => *found_at,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ParserOpts {
    is_repl: bool,
}
impl ParserOpts {
    /// Lets the last statement of the input omit its terminating `;`.
    pub fn for_repl(self) -> Self {
        Self { is_repl: true }
    }
}

const LOGICAL_OPERATORS: [(&str, BinaryOperator); 2] = [
    ("&&", BinaryOperator::LogicalAnd),
    ("||", BinaryOperator::LogicalOr),
];
const EQUALITY_OPERATORS: [(&str, BinaryOperator); 2] = [
    ("==", BinaryOperator::EqualTo),
    ("!=", BinaryOperator::NotEqualTo),
];
const RELATIONAL_OPERATORS: [(&str, BinaryOperator); 4] = [
    (">", BinaryOperator::GreaterThan),
    (">=", BinaryOperator::GreaterThanOrEqualTo),
    ("<", BinaryOperator::LessThan),
    ("<=", BinaryOperator::LessThanOrEqualTo),
];
const ADDITIVE_OPERATORS: [(&str, BinaryOperator); 2] = [
    ("+", BinaryOperator::Plus),
    ("-", BinaryOperator::Minus),
];
const MULTIPLICATIVE_OPERATORS: [(&str, BinaryOperator); 3] = [
    ("*", BinaryOperator::Multiply),
    ("/", BinaryOperator::Divide),
    ("%", BinaryOperator::Modulo),
];

pub struct Parser {
    opts: ParserOpts,
    tokens: Vec<Token>,
    current: usize,
    /// Blocks opened but not yet closed.
    block_depth: usize,
    source_reference: SourceReference,
    recovered_errors: Vec<ParserError>,
}

impl Parser {
    /// Parses a whole program. A syntax error in a top-level statement is
    /// recorded, the rest of that statement is skipped up to and including
    /// the next `;`, and parsing resumes from there. A syntax error inside a
    /// block is recorded and ends the parse.
    pub fn parse<Stream: IntoIterator<Item = Token>>(
        token_stream: Stream,
        source_reference: SourceReference,
        opts: ParserOpts,
    ) -> (Program, Vec<ParserError>) {
        let mut parser = Parser {
            opts,
            tokens: token_stream
                .into_iter()
                .filter(|token| token.kind != TokenKind::Comment)
                .collect(),
            current: 0,
            block_depth: 0,
            source_reference,
            recovered_errors: Vec::new(),
        };
        let program = parser.parse_program();
        (program, parser.recovered_errors)
    }
}

impl Parser {
    fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while self.peek().is_some() {
            match self.parse_stmt() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.recovered_errors.push(err);
                    if self.block_depth > 0 {
                        break;
                    }
                    self.synchronize();
                }
            }
        }
        Program {
            statements,
            source_reference: self.source_reference.clone(),
        }
    }
    fn parse_stmt(&mut self) -> Result<Stmt, ParserError> {
        if let Some(var_token) = self.consume(TokenKind::Keyword, "var") {
            return Ok(Stmt::Var(self.parse_var_decl(var_token.span())?));
        }
        if let Some(fun_token) = self.consume(TokenKind::Keyword, "fun") {
            return Ok(Stmt::Fun(self.parse_fun_decl(fun_token.span())?));
        }
        if let Some(return_token) = self.consume(TokenKind::Keyword, "return") {
            return Ok(Stmt::Return(self.parse_return_stmt(return_token.span())?));
        }
        if let Some(if_token) = self.consume(TokenKind::Keyword, "if") {
            return Ok(Stmt::If(self.parse_if_stmt(if_token.span())?));
        }
        if let Some(while_token) = self.consume(TokenKind::Keyword, "while") {
            return Ok(Stmt::While(self.parse_while_stmt(while_token.span())?));
        }
        if let Some(break_token) = self.consume(TokenKind::Keyword, "break") {
            let semicolon_span = self.consume_statement_end_semicolon()?;
            return Ok(Stmt::Break(WithSpan::new(
                (),
                break_token.span().to(semicolon_span),
            )));
        }
        if let Some(continue_token) = self.consume(TokenKind::Keyword, "continue") {
            let semicolon_span = self.consume_statement_end_semicolon()?;
            return Ok(Stmt::Continue(WithSpan::new(
                (),
                continue_token.span().to(semicolon_span),
            )));
        }
        if let Some(try_token) = self.consume(TokenKind::Keyword, "try") {
            return Ok(Stmt::TryCatch(self.parse_try_catch_stmt(try_token.span())?));
        }
        if self.check(TokenKind::Symbol, "{") {
            return Ok(Stmt::Block(self.parse_block()?));
        }

        let expression = self.parse_expr()?;
        let semicolon_span = self.consume_statement_end_semicolon()?;
        Ok(Stmt::Expr(ExprStmt {
            expression,
            semicolon_span,
        }))
    }
    fn parse_var_decl(&mut self, var_span: SourceSpan) -> Result<VarDecl, ParserError> {
        let identifier = self.parse_identifier()?;
        self.expect(TokenKind::Symbol, ":")?;
        let ty = self.parse_type()?;

        let initializer = match self.consume(TokenKind::Operator, "=") {
            Some(_) => Some(self.parse_expr()?),
            None => None,
        };

        let semicolon_span = self.consume_statement_end_semicolon()?;

        Ok(VarDecl {
            var_span,
            identifier,
            ty,
            initializer,
            semicolon_span,
        })
    }
    fn parse_fun_decl(&mut self, fun_span: SourceSpan) -> Result<FunDecl, ParserError> {
        let name = self.parse_identifier()?;
        self.expect(TokenKind::Symbol, "(")?;
        let mut parameters = Vec::new();
        if self.consume(TokenKind::Symbol, ")").is_none() {
            loop {
                parameters.push(self.parse_parameter()?);
                if self.consume(TokenKind::Symbol, ",").is_none() {
                    break;
                }
            }
            self.expect_one_of(TokenKind::Symbol, &[",", ")"])?;
        }
        self.expect(TokenKind::Symbol, ":")?;
        let return_type = self.parse_type()?;
        let body = self.parse_block()?;

        Ok(FunDecl {
            fun_span,
            fun: Rc::new(Fun {
                name,
                parameters,
                return_type,
                body,
            }),
        })
    }
    fn parse_return_stmt(&mut self, return_span: SourceSpan) -> Result<ReturnStmt, ParserError> {
        let expression = if self.check(TokenKind::Symbol, ";") || self.at_repl_end() {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let semicolon_span = self.consume_statement_end_semicolon()?;
        Ok(ReturnStmt {
            return_span,
            expression,
            semicolon_span,
        })
    }
    fn parse_if_stmt(&mut self, if_span: SourceSpan) -> Result<IfStmt, ParserError> {
        self.expect(TokenKind::Symbol, "(")?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::Symbol, ")")?;

        let then_branch = Box::new(self.parse_stmt()?);
        let else_branch = if self.consume(TokenKind::Keyword, "else").is_some() {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };

        Ok(IfStmt {
            if_span,
            condition,
            then_branch,
            else_branch,
        })
    }
    fn parse_while_stmt(&mut self, while_span: SourceSpan) -> Result<WhileStmt, ParserError> {
        self.expect(TokenKind::Symbol, "(")?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::Symbol, ")")?;
        let body = Box::new(self.parse_stmt()?);

        Ok(WhileStmt {
            while_span,
            condition,
            body,
        })
    }
    fn parse_try_catch_stmt(&mut self, try_span: SourceSpan) -> Result<TryCatchStmt, ParserError> {
        let try_block = self.parse_block()?;
        self.expect(TokenKind::Keyword, "catch")?;
        self.expect(TokenKind::Symbol, "(")?;
        let error_type = self.parse_parameter()?;
        self.expect(TokenKind::Symbol, ",")?;
        let error_message = self.parse_parameter()?;
        self.expect(TokenKind::Symbol, ")")?;
        let catch_block = self.parse_block()?;

        Ok(TryCatchStmt {
            try_span,
            try_block,
            error_type,
            error_message,
            catch_block,
        })
    }
    fn parse_block(&mut self) -> Result<BlockStmt, ParserError> {
        let open_span = self.expect(TokenKind::Symbol, "{")?.span();
        self.block_depth += 1;
        let mut body = Vec::new();
        loop {
            if let Some(close_token) = self.consume(TokenKind::Symbol, "}") {
                self.block_depth -= 1;
                return Ok(BlockStmt {
                    body,
                    open_span,
                    close_span: close_token.span(),
                });
            }
            if self.peek().is_none() {
                return Err(self.error_at_lookahead(Expected::OneOf(vec!["}"])));
            }
            body.push(self.parse_stmt()?);
        }
    }
    fn parse_parameter(&mut self) -> Result<Parameter, ParserError> {
        let name = self.parse_identifier()?;
        self.expect(TokenKind::Symbol, ":")?;
        let ty = self.parse_type()?;
        Ok(Parameter { name, ty })
    }
    fn parse_type(&mut self) -> Result<WithSpan<Type>, ParserError> {
        match self.consume_match(|token| match token.kind {
            TokenKind::Keyword => {
                Type::from_keyword(&token.lexeme).map(|ty| WithSpan::new(ty, token.span()))
            }
            _ => None,
        }) {
            Some(ty) => Ok(ty),
            None => Err(self.error_at_lookahead(Expected::Type)),
        }
    }
    fn parse_identifier(&mut self) -> Result<Identifier, ParserError> {
        match self.consume_match(|token| match token.kind {
            TokenKind::Identifier => Some(Identifier {
                name: token.lexeme.clone(),
                source_span: token.span(),
            }),
            _ => None,
        }) {
            Some(identifier) => Ok(identifier),
            None => Err(self.error_at_lookahead(Expected::Identifier)),
        }
    }
    fn consume_statement_end_semicolon(&mut self) -> Result<SourceSpan, ParserError> {
        if let Some(semicolon) = self.consume(TokenKind::Symbol, ";") {
            return Ok(semicolon.span());
        }
        if self.at_repl_end() {
            return Ok(self.last_span());
        }
        Err(self.error_at_lookahead(Expected::OneOf(vec![";"])))
    }

    fn parse_expr(&mut self) -> Result<Expr, ParserError> {
        self.parse_assignment_expr()
    }
    fn parse_assignment_expr(&mut self) -> Result<Expr, ParserError> {
        let target = self.parse_logical_expr()?;
        match self.consume(TokenKind::Operator, "=") {
            // The target is only checked to be a variable by later passes.
            Some(equals) => Ok(Expr::Binary(BinaryExpr {
                left: Box::new(target),
                right: Box::new(self.parse_assignment_expr()?),
                operator: WithSpan::new(BinaryOperator::Assign, equals.span()),
            })),
            None => Ok(target),
        }
    }
    fn parse_logical_expr(&mut self) -> Result<Expr, ParserError> {
        self.parse_binary_tier(&LOGICAL_OPERATORS, Self::parse_equality_expr)
    }
    fn parse_equality_expr(&mut self) -> Result<Expr, ParserError> {
        self.parse_binary_tier(&EQUALITY_OPERATORS, Self::parse_relational_expr)
    }
    fn parse_relational_expr(&mut self) -> Result<Expr, ParserError> {
        self.parse_binary_tier(&RELATIONAL_OPERATORS, Self::parse_additive_expr)
    }
    fn parse_additive_expr(&mut self) -> Result<Expr, ParserError> {
        self.parse_binary_tier(&ADDITIVE_OPERATORS, Self::parse_multiplicative_expr)
    }
    fn parse_multiplicative_expr(&mut self) -> Result<Expr, ParserError> {
        self.parse_binary_tier(&MULTIPLICATIVE_OPERATORS, Self::parse_unary_expr)
    }
    fn parse_binary_tier<F: Fn(&mut Self) -> Result<Expr, ParserError>>(
        &mut self,
        operators: &[(&str, BinaryOperator)],
        parse_operand: F,
    ) -> Result<Expr, ParserError> {
        let mut last_expr = parse_operand(self)?;

        while let Some(operator) = self.consume_match(|token| match token.kind {
            TokenKind::Operator => operators
                .iter()
                .find(|(lexeme, _)| *lexeme == token.lexeme)
                .map(|(_, operator)| WithSpan::new(*operator, token.span())),
            _ => None,
        }) {
            last_expr = Expr::Binary(BinaryExpr {
                left: Box::new(last_expr),
                right: Box::new(parse_operand(self)?),
                operator,
            });
        }

        Ok(last_expr)
    }
    fn parse_unary_expr(&mut self) -> Result<Expr, ParserError> {
        if let Some(operator) = self.consume_match(|token| match token.kind {
            TokenKind::Operator => match token.lexeme.as_str() {
                "+" => Some(WithSpan::new(UnaryOperator::Plus, token.span())),
                "-" => Some(WithSpan::new(UnaryOperator::Minus, token.span())),
                "!" => Some(WithSpan::new(UnaryOperator::Not, token.span())),
                _ => None,
            },
            _ => None,
        }) {
            Ok(Expr::Unary(UnaryExpr {
                operator,
                operand: Box::new(self.parse_unary_expr()?),
            }))
        } else {
            self.parse_primary_expr()
        }
    }
    fn parse_primary_expr(&mut self) -> Result<Expr, ParserError> {
        if self.consume(TokenKind::Symbol, "(").is_some() {
            let expr = self.parse_expr()?;
            self.expect(TokenKind::Symbol, ")")?;
            return Ok(expr);
        }

        let token = match self.peek() {
            Some(token) => token.clone(),
            None => return Err(self.error_at_lookahead(Expected::Expression)),
        };
        let span = token.span();
        let expr = match token.kind {
            TokenKind::Number => match token.lexeme.parse() {
                Ok(value) => Expr::Number(WithSpan::new(value, span)),
                Err(_) => {
                    return Err(ParserError::InvalidNumber {
                        found: token.lexeme,
                        found_at: span,
                        source_code: self.source_reference.clone(),
                    })
                }
            },
            TokenKind::String => {
                let value = token.lexeme[1..token.lexeme.len() - 1].to_string();
                Expr::String(WithSpan::new(value, span))
            }
            TokenKind::Boolean => Expr::Boolean(WithSpan::new(token.lexeme == "true", span)),
            TokenKind::Identifier => {
                self.advance();
                let callee = Identifier {
                    name: token.lexeme,
                    source_span: span,
                };
                return if self.consume(TokenKind::Symbol, "(").is_some() {
                    self.parse_call_arguments(callee)
                } else {
                    Ok(Expr::Identifier(callee))
                };
            }
            _ => return Err(self.error_at_lookahead(Expected::Expression)),
        };
        self.advance();
        Ok(expr)
    }
    fn parse_call_arguments(&mut self, callee: Identifier) -> Result<Expr, ParserError> {
        let mut arguments = Vec::new();
        let close_paren_span = match self.consume(TokenKind::Symbol, ")") {
            Some(close_paren) => close_paren.span(),
            None => {
                loop {
                    arguments.push(self.parse_expr()?);
                    if self.consume(TokenKind::Symbol, ",").is_none() {
                        break;
                    }
                }
                self.expect_one_of(TokenKind::Symbol, &[",", ")"])?.span()
            }
        };
        Ok(Expr::Call(CallExpr {
            callee,
            arguments,
            close_paren_span,
        }))
    }

    fn synchronize(&mut self) {
        while let Some(token) = self.advance() {
            if token.is(TokenKind::Symbol, ";") {
                break;
            }
        }
    }
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }
    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.current).cloned();
        if token.is_some() {
            self.current += 1;
        }
        token
    }
    fn at_repl_end(&self) -> bool {
        self.opts.is_repl && self.peek().is_none()
    }
    /// Span of the last real token; end-of-input errors point here.
    fn last_span(&self) -> SourceSpan {
        self.tokens
            .last()
            .map(Token::span)
            .unwrap_or_else(|| 0.into())
    }
    fn check(&self, kind: TokenKind, lexeme: &str) -> bool {
        self.peek().map_or(false, |token| token.is(kind, lexeme))
    }
    fn consume(&mut self, kind: TokenKind, lexeme: &str) -> Option<Token> {
        if self.check(kind, lexeme) {
            self.advance()
        } else {
            None
        }
    }
    fn consume_match<T, F: Fn(&Token) -> Option<T>>(&mut self, check: F) -> Option<T> {
        let value = self.peek().and_then(check)?;
        self.advance();
        Some(value)
    }
    fn expect(&mut self, kind: TokenKind, lexeme: &'static str) -> Result<Token, ParserError> {
        self.expect_one_of(kind, &[lexeme])
    }
    /// Consumes the next token if it is `kind` with one of `lexemes`; any
    /// other token is reported against the whole list.
    fn expect_one_of(
        &mut self,
        kind: TokenKind,
        lexemes: &[&'static str],
    ) -> Result<Token, ParserError> {
        match self.consume_match(|token| {
            (token.kind == kind && lexemes.contains(&token.lexeme.as_str())).then(|| token.clone())
        }) {
            Some(token) => Ok(token),
            None => Err(self.error_at_lookahead(Expected::OneOf(lexemes.to_vec()))),
        }
    }
    fn error_at_lookahead(&self, expected: Expected) -> ParserError {
        let source_code = self.source_reference.clone();
        match self.peek() {
            None => ParserError::UnexpectedEndOfInput {
                expected,
                found_at: self.last_span(),
                source_code,
            },
            Some(token) if token.kind == TokenKind::Invalid => ParserError::InvalidToken {
                found: token.lexeme.clone(),
                found_at: token.span(),
                source_code,
            },
            Some(token) => ParserError::UnexpectedToken {
                expected,
                found: token.lexeme.clone(),
                found_at: token.span(),
                source_code,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scanner;
    use pretty_assertions::assert_eq;

    fn parse_with(source: &str, opts: ParserOpts) -> (Program, Vec<ParserError>) {
        Parser::parse(
            Scanner::new(source),
            SourceReference::new("test".to_string(), source.to_string()),
            opts,
        )
    }

    fn parse_ok(source: &str) -> String {
        let (program, errors) = parse_with(source, ParserOpts::default());
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        program.to_string().trim_end().to_string()
    }

    fn parse_errors(source: &str) -> Vec<(String, usize, usize)> {
        let (_, errors) = parse_with(source, ParserOpts::default());
        errors
            .iter()
            .map(|error| {
                let span = error.source_span();
                (
                    error.to_string(),
                    span.start().byte_offset(),
                    span.len().byte_offset(),
                )
            })
            .collect()
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(parse_ok("1 + 2 * 3 - 4 % 5;"), "(- (+ 1 (* 2 3)) (% 4 5))");
        assert_eq!(parse_ok("(1 + 2) * 3;"), "(* (+ 1 2) 3)");
        assert_eq!(parse_ok("10 - 4 - 3;"), "(- (- 10 4) 3)");
    }

    #[test]
    fn comparison_and_logic_tiers() {
        assert_eq!(
            parse_ok("a < 1 == b >= 2 && c || d;"),
            "(|| (&& (== (< a 1) (>= b 2)) c) d)"
        );
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(parse_ok("a = b = 1 + 2;"), "(= a (= b (+ 1 2)))");
    }

    #[test]
    fn assignment_target_is_not_checked_syntactically() {
        assert_eq!(parse_ok("1 = 2;"), "(= 1 2)");
    }

    #[test]
    fn unary_operators_nest() {
        assert_eq!(parse_ok("-!+x;"), "(- (! (+ x)))");
    }

    #[test]
    fn calls() {
        assert_eq!(
            parse_ok(r#"f(1, "a", g());"#),
            r#"(call f 1 "a" (call g))"#
        );
    }

    #[test]
    fn string_literals_drop_their_quotes() {
        let (program, _) = parse_with(r#""hi there";"#, ParserOpts::default());
        match &program.statements[0] {
            Stmt::Expr(ExprStmt {
                expression: Expr::String(literal),
                ..
            }) => assert_eq!(literal.inner(), "hi there"),
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn declarations() {
        assert_eq!(
            parse_ok("var x: num = 1; var s: str;"),
            "(var x num 1)\n(var s str)"
        );
        assert_eq!(
            parse_ok("fun add(a: num, b: num): num { return a + b; }"),
            "(fun add (a num b num) num (do (return (+ a b))))"
        );
        assert_eq!(parse_ok("fun f(): void { return; }"), "(fun f () void (do (return)))");
    }

    #[test]
    fn control_flow() {
        assert_eq!(
            parse_ok("if (a) b; else { c; }"),
            "(if a b (do c))"
        );
        assert_eq!(
            parse_ok("while (true) { break; continue; }"),
            "(while true (do (break) (continue)))"
        );
        assert_eq!(
            parse_ok("try { f(); } catch (t: str, m: str) { }"),
            "(try (do (call f)) (catch t str m str) (do))"
        );
    }

    #[test]
    fn comments_are_ignored() {
        assert_eq!(parse_ok("1; // one\n/* two */ 2;"), "1\n2");
    }

    #[test]
    fn recovers_at_the_next_semicolon() {
        let (program, errors) =
            parse_with("var x: num = ; var y: num = 2; 1 +;", ParserOpts::default());
        assert_eq!(program.to_string(), "(var y num 2)\n");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn error_messages_name_what_was_expected() {
        assert_eq!(
            parse_errors("var x num;"),
            vec![("Expected ':', found 'num'".to_string(), 6, 3)]
        );
        assert_eq!(
            parse_errors("1 2;"),
            vec![("Expected ';', found '2'".to_string(), 2, 1)]
        );
        assert_eq!(
            parse_errors("f(1 2);"),
            vec![("Expected one of ',', ')', found '2'".to_string(), 4, 1)]
        );
        assert_eq!(
            parse_errors("var x: int;"),
            vec![(
                "Expected a type ('num', 'str', 'bool' or 'void'), found 'int'".to_string(),
                7,
                3
            )]
        );
    }

    #[test]
    fn end_of_input_points_at_last_token() {
        assert_eq!(
            parse_errors("var x: num = 12"),
            vec![(
                "Expected ';', but reached the end of input".to_string(),
                13,
                2
            )]
        );
    }

    #[test]
    fn invalid_tokens() {
        assert_eq!(
            parse_errors("1 # 2;"),
            vec![("Invalid token '#'".to_string(), 2, 1)]
        );
    }

    #[test]
    fn errors_inside_blocks_end_the_parse() {
        let (program, errors) =
            parse_with("{ var x: num = ; } var y: num = 1;", ParserOpts::default());
        assert!(program.statements.is_empty());
        assert_eq!(errors.len(), 1);

        let source = "var a: num = 1; fun f(): void { var x: num = ; writeln(1); } writeln(2);";
        let (program, errors) = parse_with(source, ParserOpts::default());
        assert_eq!(program.to_string(), "(var a num 1)\n");
        assert_eq!(
            parse_errors(source),
            vec![("Expected an expression, found ';'".to_string(), 45, 1)]
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn errors_in_unbraced_branches_still_recover() {
        let (program, errors) =
            parse_with("if (a) 1 +; writeln(2);", ParserOpts::default());
        assert_eq!(program.to_string(), "(call writeln 2)\n");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn repl_allows_a_missing_final_semicolon() {
        let (program, errors) = parse_with("1 + 2", ParserOpts::default().for_repl());
        assert!(errors.is_empty());
        assert_eq!(program.to_string(), "(+ 1 2)\n");

        let (_, errors) = parse_with("1 + 2", ParserOpts::default());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn spans_cover_whole_statements() {
        let (program, _) = parse_with("  var x: num = 1;", ParserOpts::default());
        let span = program.statements[0].source_span();
        assert_eq!((span.start().byte_offset(), span.len().byte_offset()), (2, 15));
    }
}
