//! Recursive-descent parser with a Pratt-style precedence ladder for
//! expressions. The parser owns the token stream and consumes tokens
//! lazily; on the first error it aborts the statement being parsed
//! rather than attempting recovery.

use crate::compiler::ast::*;
use crate::compiler::lexer::TokenStream;
use crate::compiler::tokens::{Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{position}: unexpected {found}; expected {expected}")]
pub struct ParseError {
    pub position: snek_core::Position,
    pub found: String,
    pub expected: String,
}

type Result<T> = std::result::Result<T, ParseError>;

pub struct Parser {
    tokens: TokenStream,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: TokenStream::new(tokens),
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.peek()
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.tokens.peek().kind
    }

    fn at(&self, kind: TokenKind) -> bool {
        *self.peek_kind() == kind
    }

    fn read(&mut self) -> Token {
        self.tokens.read()
    }

    fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        let tok = self.peek();
        ParseError {
            position: tok.position.clone(),
            found: tok.kind.to_string(),
            expected: expected.into(),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if *self.peek_kind() == kind {
            Ok(self.read())
        } else {
            Err(self.unexpected(kind.to_string()))
        }
    }

    fn accept(&mut self, kind: TokenKind) -> bool {
        if *self.peek_kind() == kind {
            self.read();
            true
        } else {
            false
        }
    }

    /// Skip any number of NewLine tokens (used between top-level statements
    /// and around block delimiters where blank lines are harmless).
    fn skip_newlines(&mut self) {
        while self.at(TokenKind::NewLine) {
            self.read();
        }
    }

    // ── Entry point ──

    pub fn parse_module(&mut self) -> Result<Module> {
        let mut statements = Vec::new();
        self.skip_newlines();
        while !self.at(TokenKind::Eof) {
            statements.push(self.parse_top_level_statement()?);
            self.skip_newlines();
        }
        Ok(Module { statements })
    }

    // ── Statements ──

    fn parse_top_level_statement(&mut self) -> Result<Statement> {
        if self.at(TokenKind::Import) {
            return self.parse_import();
        }
        if self.at(TokenKind::Export) {
            return self.parse_export();
        }
        self.parse_statement()
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        if self.at(TokenKind::Import) || self.at(TokenKind::Export) {
            let tok = self.peek();
            return Err(ParseError {
                position: tok.position.clone(),
                found: tok.kind.to_string(),
                expected: "statement (import/export only allowed at top level)".into(),
            });
        }
        match self.peek_kind() {
            TokenKind::Pass => {
                let position = self.read().position;
                self.expect(TokenKind::NewLine)?;
                Ok(Statement::Block { position, statements: vec![] })
            }
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Break | TokenKind::Continue | TokenKind::Return => self.parse_jump(),
            TokenKind::Let | TokenKind::Const => self.parse_var_decl(false),
            TokenKind::Type => self.parse_type_decl(false),
            _ => self.parse_simple_statement_line(),
        }
    }

    /// One or more semicolon-separated simple statements terminated by a
    /// newline; more than one is wrapped in a Block.
    fn parse_simple_statement_line(&mut self) -> Result<Statement> {
        let position = self.peek().position.clone();
        let mut statements = vec![self.parse_simple_statement()?];
        while self.accept(TokenKind::Semicolon) {
            if self.at(TokenKind::NewLine) || self.at(TokenKind::Eof) {
                break;
            }
            statements.push(self.parse_simple_statement()?);
        }
        if !self.at(TokenKind::Eof) {
            self.expect(TokenKind::NewLine)?;
        }
        if statements.len() == 1 {
            Ok(statements.into_iter().next().unwrap())
        } else {
            Ok(Statement::Block { position, statements })
        }
    }

    fn parse_simple_statement(&mut self) -> Result<Statement> {
        match self.peek_kind() {
            TokenKind::Break | TokenKind::Continue | TokenKind::Return => self.parse_jump_inline(),
            TokenKind::Let | TokenKind::Const => self.parse_var_decl_inline(false),
            TokenKind::Type => self.parse_type_decl_inline(false),
            TokenKind::Pass => {
                self.read();
                // An inline `pass` inside a `;`-joined line: represent as
                // an empty block so it is a legal no-op statement.
                Ok(Statement::Block {
                    position: self.peek().position.clone(),
                    statements: vec![],
                })
            }
            _ => {
                let position = self.peek().position.clone();
                let expr = self.parse_expression()?;
                Ok(Statement::Expression { position, expression: expr })
            }
        }
    }

    fn parse_jump(&mut self) -> Result<Statement> {
        let stmt = self.parse_jump_inline()?;
        if !self.at(TokenKind::Eof) {
            self.expect(TokenKind::NewLine)?;
        }
        Ok(stmt)
    }

    fn parse_jump_inline(&mut self) -> Result<Statement> {
        let tok = self.read();
        let position = tok.position.clone();
        let kind = match tok.kind {
            TokenKind::Break => JumpKind::Break,
            TokenKind::Continue => JumpKind::Continue,
            TokenKind::Return => JumpKind::Return,
            _ => unreachable!(),
        };
        let value = if kind == JumpKind::Return
            && !self.at(TokenKind::NewLine)
            && !self.at(TokenKind::Semicolon)
            && !self.at(TokenKind::Eof)
        {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Statement::Jump { position, kind, value })
    }

    fn parse_var_decl(&mut self, is_export: bool) -> Result<Statement> {
        let stmt = self.parse_var_decl_inline(is_export)?;
        if !self.at(TokenKind::Eof) {
            self.expect(TokenKind::NewLine)?;
        }
        Ok(stmt)
    }

    fn parse_var_decl_inline(&mut self, is_export: bool) -> Result<Statement> {
        let tok = self.read();
        let position = tok.position.clone();
        let is_read_only = tok.kind == TokenKind::Const;
        let variable = self.parse_assignment_target()?;
        let initializer = if self.accept(TokenKind::Assign) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Statement::DeclareVar {
            position,
            is_export,
            is_read_only,
            variable,
            initializer,
        })
    }

    fn parse_type_decl(&mut self, is_export: bool) -> Result<Statement> {
        let stmt = self.parse_type_decl_inline(is_export)?;
        if !self.at(TokenKind::Eof) {
            self.expect(TokenKind::NewLine)?;
        }
        Ok(stmt)
    }

    fn parse_type_decl_inline(&mut self, is_export: bool) -> Result<Statement> {
        let position = self.expect(TokenKind::Type)?.position;
        let name_tok = self.expect(TokenKind::Id)?;
        let name = name_tok.text.unwrap();
        self.expect(TokenKind::Assign)?;
        let value = self.parse_type()?;
        Ok(Statement::DeclareType { position, is_export, name, value })
    }

    fn parse_export(&mut self) -> Result<Statement> {
        self.expect(TokenKind::Export)?;
        match self.peek_kind() {
            TokenKind::Let | TokenKind::Const => self.parse_var_decl(true),
            TokenKind::Type => self.parse_type_decl(true),
            _ => Err(self.unexpected("'let', 'const', or 'type' after 'export'")),
        }
    }

    fn parse_if(&mut self) -> Result<Statement> {
        let position = self.expect(TokenKind::If)?.position;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Colon)?;
        let consequent = Box::new(self.parse_block()?);
        let alternate = if self.accept(TokenKind::Else) {
            if self.at(TokenKind::If) {
                Some(Box::new(self.parse_if()?))
            } else {
                self.expect(TokenKind::Colon)?;
                Some(Box::new(self.parse_block()?))
            }
        } else {
            None
        };
        Ok(Statement::If { position, condition, consequent, alternate })
    }

    fn parse_while(&mut self) -> Result<Statement> {
        let position = self.expect(TokenKind::While)?.position;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Colon)?;
        let body = Box::new(self.parse_block()?);
        Ok(Statement::While { position, condition, body })
    }

    /// A block is either a single inline simple-statement line, or a
    /// newline-Indent-statements-Dedent sequence.
    fn parse_block(&mut self) -> Result<Statement> {
        if self.accept(TokenKind::NewLine) {
            self.skip_newlines();
            let position = self.peek().position.clone();
            self.expect(TokenKind::Indent)?;
            let mut statements = Vec::new();
            self.skip_newlines();
            while !self.at(TokenKind::Dedent) {
                statements.push(self.parse_statement()?);
                self.skip_newlines();
            }
            self.expect(TokenKind::Dedent)?;
            Ok(Statement::Block { position, statements })
        } else {
            self.parse_simple_statement_line()
        }
    }

    fn parse_import(&mut self) -> Result<Statement> {
        let position = self.expect(TokenKind::Import)?.position;
        let mut specifiers = vec![self.parse_import_specifier()?];
        while self.accept(TokenKind::Comma) {
            if self.at(TokenKind::From) || self.at(TokenKind::NewLine) {
                break;
            }
            specifiers.push(self.parse_import_specifier()?);
        }
        let path = if self.accept(TokenKind::From) {
            let tok = self.expect(TokenKind::String)?;
            Some(tok.text.unwrap())
        } else {
            None
        };
        if !self.at(TokenKind::Eof) {
            self.expect(TokenKind::NewLine)?;
        }
        Ok(Statement::Import { position, specifiers, path })
    }

    fn parse_import_specifier(&mut self) -> Result<ImportSpecifier> {
        let position = self.peek().position.clone();
        if self.accept(TokenKind::Mul) {
            let alias = self.parse_optional_alias()?;
            Ok(ImportSpecifier::Star { position, alias })
        } else {
            let name = self.expect(TokenKind::Id)?.text.unwrap();
            let alias = self.parse_optional_alias()?;
            Ok(ImportSpecifier::Named { position, name, alias })
        }
    }

    fn parse_optional_alias(&mut self) -> Result<Option<String>> {
        if self.accept(TokenKind::As) {
            Ok(Some(self.expect(TokenKind::Id)?.text.unwrap()))
        } else {
            Ok(None)
        }
    }

    // ── Types ──

    fn parse_type(&mut self) -> Result<Type> {
        let mut left = self.parse_type_primary()?;
        if self.at(TokenKind::BitwiseOr) || self.at(TokenKind::BitwiseAnd) {
            let tag = if self.at(TokenKind::BitwiseOr) {
                MultipleTag::Union
            } else {
                MultipleTag::Intersection
            };
            let position = left.position().clone();
            let mut members = vec![left];
            let connective = self.read().kind;
            loop {
                members.push(self.parse_type_primary()?);
                if (connective == TokenKind::BitwiseOr && self.accept(TokenKind::BitwiseOr))
                    || (connective == TokenKind::BitwiseAnd && self.accept(TokenKind::BitwiseAnd))
                {
                    continue;
                }
                break;
            }
            left = Type::Multiple { position, tag, members };
        }
        Ok(left)
    }

    fn parse_type_primary(&mut self) -> Result<Type> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Null => {
                self.read();
                Ok(Type::Null { position: tok.position })
            }
            TokenKind::True => {
                self.read();
                Ok(Type::BooleanLiteral { position: tok.position, value: true })
            }
            TokenKind::False => {
                self.read();
                Ok(Type::BooleanLiteral { position: tok.position, value: false })
            }
            TokenKind::String => {
                self.read();
                Ok(Type::StringLiteral { position: tok.position, value: tok.text.unwrap() })
            }
            TokenKind::Id => {
                self.read();
                Ok(Type::Named { position: tok.position, name: tok.text.unwrap() })
            }
            TokenKind::LeftBracket => {
                self.read();
                let element = Box::new(self.parse_type()?);
                self.expect(TokenKind::RightBracket)?;
                Ok(Type::List { position: tok.position, element })
            }
            TokenKind::LeftBrace => {
                self.read();
                let mut fields = Vec::new();
                self.skip_newlines();
                while !self.at(TokenKind::RightBrace) {
                    let name = self.expect(TokenKind::Id)?.text.unwrap();
                    self.expect(TokenKind::Colon)?;
                    let field_type = self.parse_type()?;
                    fields.push((name, field_type));
                    self.skip_newlines();
                    if !self.accept(TokenKind::Comma) {
                        break;
                    }
                    self.skip_newlines();
                }
                self.skip_newlines();
                self.expect(TokenKind::RightBrace)?;
                Ok(Type::Record { position: tok.position, fields })
            }
            TokenKind::LeftParen => {
                self.read();
                let params = self.parse_parameter_list()?;
                self.expect(TokenKind::Arrow)?;
                let return_type = Box::new(self.parse_type()?);
                Ok(Type::Function { position: tok.position, params, return_type })
            }
            _ => Err(self.unexpected("a type")),
        }
    }

    fn parse_parameter_list(&mut self) -> Result<Vec<Parameter>> {
        let mut params = Vec::new();
        while !self.at(TokenKind::RightParen) {
            let position = self.peek().position.clone();
            let rest = self.accept(TokenKind::Spread);
            let name = self.expect(TokenKind::Id)?.text.unwrap();
            let type_annotation = if self.accept(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let default = if self.accept(TokenKind::Assign) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            params.push(Parameter { position, name, type_annotation, default, rest });
            if !self.accept(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightParen)?;
        Ok(params)
    }

    // ── Expressions ──

    pub fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expression> {
        let left = self.parse_ternary()?;
        let op = match self.peek_kind() {
            TokenKind::Assign => Some(AssignOp::Assign),
            TokenKind::AssignAdd => Some(AssignOp::Add),
            TokenKind::AssignSub => Some(AssignOp::Sub),
            TokenKind::AssignMul => Some(AssignOp::Mul),
            TokenKind::AssignDiv => Some(AssignOp::Div),
            TokenKind::AssignMod => Some(AssignOp::Mod),
            TokenKind::AssignBitwiseAnd => Some(AssignOp::BitwiseAnd),
            TokenKind::AssignBitwiseOr => Some(AssignOp::BitwiseOr),
            TokenKind::AssignBitwiseXor => Some(AssignOp::BitwiseXor),
            TokenKind::AssignLeftShift => Some(AssignOp::LeftShift),
            TokenKind::AssignRightShift => Some(AssignOp::RightShift),
            TokenKind::AssignLogicalAnd => Some(AssignOp::LogicalAnd),
            TokenKind::AssignLogicalOr => Some(AssignOp::LogicalOr),
            TokenKind::AssignQuestionQuestion => Some(AssignOp::QuestionQuestion),
            _ => None,
        };
        let Some(op) = op else { return Ok(left) };
        if !left.is_assignable() {
            return Err(ParseError {
                position: left.position().clone(),
                found: "expression".into(),
                expected: "an assignable target (identifier, property, subscript, or destructuring pattern)".into(),
            });
        }
        let position = self.read().position;
        let value = Box::new(self.parse_assignment()?);
        Ok(Expression::Assign { position, op, target: Box::new(left), value })
    }

    fn parse_ternary(&mut self) -> Result<Expression> {
        let condition = self.parse_logical_or()?;
        if self.accept(TokenKind::Question) {
            let position = condition.position().clone();
            let consequent = Box::new(self.parse_assignment()?);
            self.expect(TokenKind::Colon)?;
            let alternate = Box::new(self.parse_assignment()?);
            Ok(Expression::Ternary {
                position,
                condition: Box::new(condition),
                consequent,
                alternate,
            })
        } else {
            Ok(condition)
        }
    }

    fn parse_logical_or(&mut self) -> Result<Expression> {
        let mut left = self.parse_logical_and()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::LogicalOr => BinaryOp::LogicalOr,
                TokenKind::QuestionQuestion => BinaryOp::QuestionQuestion,
                _ => break,
            };
            let position = self.read().position;
            let right = self.parse_logical_and()?;
            left = Expression::Binary { position, op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<Expression> {
        let mut left = self.parse_bitwise_or()?;
        while self.at(TokenKind::LogicalAnd) {
            let position = self.read().position;
            let right = self.parse_bitwise_or()?;
            left = Expression::Binary {
                position,
                op: BinaryOp::LogicalAnd,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_bitwise_or(&mut self) -> Result<Expression> {
        let mut left = self.parse_bitwise_xor()?;
        while self.at(TokenKind::BitwiseOr) {
            let position = self.read().position;
            let right = self.parse_bitwise_xor()?;
            left = Expression::Binary {
                position,
                op: BinaryOp::BitwiseOr,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_bitwise_xor(&mut self) -> Result<Expression> {
        let mut left = self.parse_bitwise_and()?;
        while self.at(TokenKind::BitwiseXor) {
            let position = self.read().position;
            let right = self.parse_bitwise_and()?;
            left = Expression::Binary {
                position,
                op: BinaryOp::BitwiseXor,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_bitwise_and(&mut self) -> Result<Expression> {
        let mut left = self.parse_equality()?;
        while self.at(TokenKind::BitwiseAnd) {
            let position = self.read().position;
            let right = self.parse_equality()?;
            left = Expression::Binary {
                position,
                op: BinaryOp::BitwiseAnd,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expression> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Equal => BinaryOp::Equal,
                TokenKind::NotEqual => BinaryOp::NotEqual,
                _ => break,
            };
            let position = self.read().position;
            let right = self.parse_relational()?;
            left = Expression::Binary { position, op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expression> {
        let mut left = self.parse_shift()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::LessThan => BinaryOp::LessThan,
                TokenKind::GreaterThan => BinaryOp::GreaterThan,
                TokenKind::LessThanOrEqual => BinaryOp::LessThanOrEqual,
                TokenKind::GreaterThanOrEqual => BinaryOp::GreaterThanOrEqual,
                _ => break,
            };
            let position = self.read().position;
            let right = self.parse_shift()?;
            left = Expression::Binary { position, op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_shift(&mut self) -> Result<Expression> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::LeftShift => BinaryOp::LeftShift,
                TokenKind::RightShift => BinaryOp::RightShift,
                _ => break,
            };
            let position = self.read().position;
            let right = self.parse_additive()?;
            left = Expression::Binary { position, op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expression> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Add => BinaryOp::Add,
                TokenKind::Sub => BinaryOp::Sub,
                _ => break,
            };
            let position = self.read().position;
            let right = self.parse_multiplicative()?;
            left = Expression::Binary { position, op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Mul => BinaryOp::Mul,
                TokenKind::Div => BinaryOp::Div,
                TokenKind::Mod => BinaryOp::Mod,
                _ => break,
            };
            let position = self.read().position;
            let right = self.parse_unary()?;
            left = Expression::Binary { position, op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression> {
        let op = match self.peek_kind() {
            TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Add => Some(UnaryOp::Plus),
            TokenKind::Sub => Some(UnaryOp::Negate),
            TokenKind::BitwiseNot => Some(UnaryOp::BitwiseNot),
            _ => None,
        };
        if let Some(op) = op {
            let position = self.read().position;
            let operand = Box::new(self.parse_unary()?);
            return Ok(Expression::Unary { position, op, operand });
        }
        if self.at(TokenKind::Increment) || self.at(TokenKind::Decrement) {
            let is_inc = self.at(TokenKind::Increment);
            let position = self.read().position;
            let target = Box::new(self.parse_unary()?);
            if !target.is_assignable() {
                return Err(ParseError {
                    position: target.position().clone(),
                    found: "expression".into(),
                    expected: "an assignable target".into(),
                });
            }
            return Ok(if is_inc {
                Expression::Increment { position, pre: true, target }
            } else {
                Expression::Decrement { position, pre: true, target }
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expression> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    let position = self.read().position;
                    let name = self.expect(TokenKind::Id)?.text.unwrap();
                    expr = Expression::Property {
                        position,
                        conditional: false,
                        receiver: Box::new(expr),
                        name,
                    };
                }
                TokenKind::QuestionDot => {
                    let position = self.read().position;
                    if self.at(TokenKind::LeftParen) {
                        self.read();
                        let arguments = self.parse_arguments()?;
                        expr = Expression::Call {
                            position,
                            conditional: true,
                            callee: Box::new(expr),
                            arguments,
                        };
                    } else if self.at(TokenKind::LeftBracket) {
                        self.read();
                        let index = Box::new(self.parse_expression()?);
                        self.expect(TokenKind::RightBracket)?;
                        expr = Expression::Subscript {
                            position,
                            conditional: true,
                            receiver: Box::new(expr),
                            index,
                        };
                    } else {
                        let name = self.expect(TokenKind::Id)?.text.unwrap();
                        expr = Expression::Property {
                            position,
                            conditional: true,
                            receiver: Box::new(expr),
                            name,
                        };
                    }
                }
                TokenKind::LeftParen => {
                    let position = self.read().position;
                    let arguments = self.parse_arguments()?;
                    expr = Expression::Call {
                        position,
                        conditional: false,
                        callee: Box::new(expr),
                        arguments,
                    };
                }
                TokenKind::LeftBracket => {
                    let position = self.read().position;
                    let index = Box::new(self.parse_expression()?);
                    self.expect(TokenKind::RightBracket)?;
                    expr = Expression::Subscript {
                        position,
                        conditional: false,
                        receiver: Box::new(expr),
                        index,
                    };
                }
                TokenKind::Increment | TokenKind::Decrement if expr.is_assignable() => {
                    let is_inc = self.at(TokenKind::Increment);
                    let position = self.read().position;
                    expr = if is_inc {
                        Expression::Increment { position, pre: false, target: Box::new(expr) }
                    } else {
                        Expression::Decrement { position, pre: false, target: Box::new(expr) }
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_arguments(&mut self) -> Result<Vec<Element>> {
        let mut args = Vec::new();
        while !self.at(TokenKind::RightParen) {
            if self.accept(TokenKind::Spread) {
                args.push(Element::Spread(self.parse_expression()?));
            } else {
                args.push(Element::Value(self.parse_expression()?));
            }
            if !self.accept(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expression> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Null => {
                self.read();
                Ok(Expression::Null { position: tok.position })
            }
            TokenKind::True => {
                self.read();
                Ok(Expression::Boolean { position: tok.position, value: true })
            }
            TokenKind::False => {
                self.read();
                Ok(Expression::Boolean { position: tok.position, value: false })
            }
            TokenKind::Int => {
                self.read();
                let text = tok.text.unwrap();
                let value = text
                    .parse::<i64>()
                    .map_err(|_| ParseError {
                        position: tok.position.clone(),
                        found: text.clone(),
                        expected: "a valid integer literal".into(),
                    })?;
                Ok(Expression::Int { position: tok.position, value })
            }
            TokenKind::Float => {
                self.read();
                let text = tok.text.unwrap();
                let value = text.parse::<f64>().map_err(|_| ParseError {
                    position: tok.position.clone(),
                    found: text.clone(),
                    expected: "a valid float literal".into(),
                })?;
                Ok(Expression::Float { position: tok.position, value })
            }
            TokenKind::String => {
                self.read();
                Ok(Expression::String { position: tok.position, value: tok.text.unwrap() })
            }
            TokenKind::Id => self.parse_identifier_or_function(),
            TokenKind::Spread => {
                self.read();
                let value = Box::new(self.parse_ternary()?);
                Ok(Expression::Spread { position: tok.position, value })
            }
            TokenKind::LeftBracket => self.parse_list(),
            TokenKind::LeftBrace => self.parse_record(),
            TokenKind::LeftParen => self.parse_paren_or_function(),
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn parse_identifier_or_function(&mut self) -> Result<Expression> {
        let tok = self.read();
        let name = tok.text.unwrap();
        Ok(Expression::Id { position: tok.position, name })
    }

    fn parse_list(&mut self) -> Result<Expression> {
        let position = self.expect(TokenKind::LeftBracket)?.position;
        let mut elements = Vec::new();
        self.skip_newlines();
        while !self.at(TokenKind::RightBracket) {
            if self.accept(TokenKind::Spread) {
                elements.push(Element::Spread(self.parse_expression()?));
            } else {
                elements.push(Element::Value(self.parse_expression()?));
            }
            self.skip_newlines();
            if !self.accept(TokenKind::Comma) {
                break;
            }
            self.skip_newlines();
        }
        self.skip_newlines();
        self.expect(TokenKind::RightBracket)?;
        Ok(Expression::List { position, elements })
    }

    fn parse_record(&mut self) -> Result<Expression> {
        let position = self.expect(TokenKind::LeftBrace)?.position;
        let mut fields = Vec::new();
        self.skip_newlines();
        while !self.at(TokenKind::RightBrace) {
            fields.push(self.parse_field()?);
            self.skip_newlines();
            if !self.accept(TokenKind::Comma) {
                break;
            }
            self.skip_newlines();
        }
        self.skip_newlines();
        self.expect(TokenKind::RightBrace)?;
        Ok(Expression::Record { position, fields })
    }

    fn parse_field(&mut self) -> Result<Field> {
        let tok = self.peek().clone();
        if tok.kind == TokenKind::Spread {
            self.read();
            let value = self.parse_expression()?;
            return Ok(Field::Spread { position: tok.position, value });
        }
        if tok.kind == TokenKind::LeftBracket {
            self.read();
            let key = self.parse_expression()?;
            self.expect(TokenKind::RightBracket)?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_expression()?;
            return Ok(Field::Computed { position: tok.position, key, value });
        }
        let name = self.expect(TokenKind::Id)?.text.unwrap();
        if self.at(TokenKind::LeftParen) {
            self.read();
            let params = self.parse_parameter_list()?;
            let return_type = if self.accept(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            self.expect(TokenKind::Colon).ok();
            let body = Box::new(self.parse_function_body()?);
            return Ok(Field::Function { position: tok.position, name, params, return_type, body });
        }
        if self.accept(TokenKind::Colon) {
            let value = self.parse_expression()?;
            return Ok(Field::Named { position: tok.position, name, value });
        }
        Ok(Field::Shorthand { position: tok.position, name })
    }

    /// Decide between a parenthesized expression and a function literal by
    /// looking ahead for the patterns spec.md's function-literal detection
    /// names: `() :`, `() ->`, `() =>`, `(...x`, `(id :`, `(id ,`.
    fn parse_paren_or_function(&mut self) -> Result<Expression> {
        let position = self.peek().position.clone();
        if self.looks_like_function_literal() {
            return self.parse_function_literal(position);
        }
        self.expect(TokenKind::LeftParen)?;
        let inner = self.parse_expression()?;
        self.expect(TokenKind::RightParen)?;
        if self.at(TokenKind::Arrow) || self.at(TokenKind::FatArrow) || self.at(TokenKind::Colon) {
            // Retroactively a one-parameter function literal.
            let Expression::Id { position: p, name } = inner else {
                return Err(ParseError {
                    position: position.clone(),
                    found: "expression".into(),
                    expected: "a parameter name".into(),
                });
            };
            let param = Parameter { position: p, name, type_annotation: None, default: None, rest: false };
            return self.finish_function_literal(position, vec![param]);
        }
        Ok(inner)
    }

    fn looks_like_function_literal(&self) -> bool {
        debug_assert!(self.at(TokenKind::LeftParen));
        let first = self.tokens.peek_at(1);
        let second = self.tokens.peek_at(2);
        match &first.kind {
            TokenKind::RightParen => {
                matches!(second.kind, TokenKind::Colon | TokenKind::Arrow | TokenKind::FatArrow)
            }
            TokenKind::Spread => true,
            TokenKind::Id => matches!(second.kind, TokenKind::Colon | TokenKind::Comma),
            _ => false,
        }
    }

    fn parse_function_literal(&mut self, position: snek_core::Position) -> Result<Expression> {
        self.expect(TokenKind::LeftParen)?;
        let params = self.parse_parameter_list()?;
        self.finish_function_literal(position, params)
    }

    fn finish_function_literal(
        &mut self,
        position: snek_core::Position,
        params: Vec<Parameter>,
    ) -> Result<Expression> {
        let return_type = if self.accept(TokenKind::Colon) {
            let t = self.parse_type()?;
            Some(t)
        } else {
            None
        };
        let body = Box::new(self.parse_function_body()?);
        Ok(Expression::Function { position, params, return_type, body })
    }

    /// Either `=> expr` (sugar for a single-statement Return body) or
    /// `: block`.
    fn parse_function_body(&mut self) -> Result<Statement> {
        if self.accept(TokenKind::FatArrow) {
            let position = self.peek().position.clone();
            let value = self.parse_expression()?;
            return Ok(Statement::Jump { position, kind: JumpKind::Return, value: Some(value) });
        }
        self.expect(TokenKind::Colon)?;
        self.parse_block()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lexer::Lexer;

    fn parse(src: &str) -> Result<Module> {
        let tokens = Lexer::new(src, "<test>").tokenize().unwrap();
        Parser::new(tokens).parse_module()
    }

    #[test]
    fn arithmetic_precedence() {
        let module = parse("1 + 2 * 3\n").unwrap();
        assert_eq!(module.statements.len(), 1);
        let Statement::Expression { expression, .. } = &module.statements[0] else {
            panic!()
        };
        let Expression::Binary { op, right, .. } = expression else { panic!() };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(**right, Expression::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn ternary_and_assignment_right_assoc() {
        parse("let x = a ? b : c\n").unwrap();
    }

    #[test]
    fn function_literal_forms() {
        parse("let f = (n: Int): Int => n\n").unwrap();
        parse("let g = (): Int => 1\n").unwrap();
        parse("let h = (...xs) => xs\n").unwrap();
        parse("let i = x => x\n").unwrap();
    }

    #[test]
    fn if_while_blocks() {
        parse("if a:\n    1\nelse:\n    2\n").unwrap();
        parse("while a:\n    break\n").unwrap();
    }

    #[test]
    fn destructuring_patterns() {
        parse("let [a, ...rest] = xs\n").unwrap();
        parse("let { a, b: renamed, ...rest } = r\n").unwrap();
    }

    #[test]
    fn import_and_export() {
        parse("import * as m from \"lib\"\n").unwrap();
        parse("import a, b as c from \"lib\"\n").unwrap();
        parse("export let x = 1\n").unwrap();
    }

    #[test]
    fn import_inside_block_is_rejected() {
        let err = parse("if a:\n    import x from \"y\"\n").unwrap_err();
        assert!(err.expected.contains("import/export"));
    }

    #[test]
    fn conditional_chains() {
        parse("a?.b?.(1, 2)?.[0]\n").unwrap();
    }

    #[test]
    fn compound_assignment_requires_assignable_target() {
        let err = parse("1 += 2\n").unwrap_err();
        assert!(err.expected.contains("assignable"));
    }
}
