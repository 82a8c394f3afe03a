use crate::language::{
    ast::*,
    errors::{SyntaxError, SyntaxErrors},
    lexer::lex,
    span::Span,
    token::{Token, TokenKind},
    types::{Primitive, TypeExpr},
};
use std::ops::Range;

pub fn parse_module(source: &str) -> Result<Module, SyntaxErrors> {
    let tokens = match lex(source) {
        Ok(tokens) => tokens,
        Err(errors) => {
            let errs = errors
                .into_iter()
                .map(|err| SyntaxError::new(err.message, err.span))
                .collect();
            return Err(SyntaxErrors::new(errs));
        }
    };
    Parser::new(tokens).parse()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<SyntaxError>,
    last_span: Option<Range<usize>>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            last_span: None,
        }
    }

    fn parse(mut self) -> Result<Module, SyntaxErrors> {
        let mut statements = Vec::new();

        while !self.is_eof() {
            if self.matches(TokenKind::Semi) {
                continue;
            }
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(err) => {
                    self.report(err);
                    self.synchronize_statement();
                }
            }
        }

        if self.errors.is_empty() {
            Ok(Module { statements })
        } else {
            Err(SyntaxErrors::new(self.errors))
        }
    }

    fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::Var) => self.parse_var(),
            Some(TokenKind::Let) => self.parse_let(),
            Some(TokenKind::Const) => self.parse_const(),
            Some(TokenKind::Type) => self.parse_type_alias(),
            Some(TokenKind::Function) => self.parse_function_decl(),
            Some(TokenKind::If) => self.parse_if(),
            Some(TokenKind::While) => self.parse_while(),
            Some(TokenKind::Return) => self.parse_return(),
            _ => {
                let expr = self.parse_expression()?;
                self.consume_optional(TokenKind::Semi);
                Ok(Statement::Expr(ExprStmt { expr }))
            }
        }
    }

    fn parse_var(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.expect(TokenKind::Var)?.span.start;
        let (name, ty, value) = self.parse_declaration_tail()?;
        let end = self.last_span_end(start);
        Ok(Statement::Var(VarStmt {
            name,
            ty,
            value,
            span: Span::new(start, end),
        }))
    }

    fn parse_let(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.expect(TokenKind::Let)?.span.start;
        let (name, ty, value) = self.parse_declaration_tail()?;
        let end = self.last_span_end(start);
        Ok(Statement::Let(LetStmt {
            name,
            ty,
            value,
            span: Span::new(start, end),
        }))
    }

    fn parse_const(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.expect(TokenKind::Const)?.span.start;
        let (name, ty, value) = self.parse_declaration_tail()?;
        // The grammar supplies `undefined` when a const initializer is
        // elided; the checker still sees a value expression.
        let value = value.unwrap_or(Expr::Undefined(name.span));
        let end = self.last_span_end(start);
        Ok(Statement::Const(ConstStmt {
            name,
            ty,
            value,
            span: Span::new(start, end),
        }))
    }

    fn parse_declaration_tail(
        &mut self,
    ) -> Result<(Identifier, Option<TypeExpr>, Option<Expr>), SyntaxError> {
        let name = self.expect_identifier("Expected variable name")?;
        let ty = if self.matches(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let value = if self.matches(TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.consume_optional(TokenKind::Semi);
        Ok((name, ty, value))
    }

    fn parse_type_alias(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.expect(TokenKind::Type)?.span.start;
        let name = self.expect_identifier("Expected type alias name")?;
        self.expect(TokenKind::Eq)?;
        let ty = self.parse_type()?;
        self.consume_optional(TokenKind::Semi);
        let end = self.last_span_end(start);
        Ok(Statement::TypeAlias(TypeAliasStmt {
            name,
            ty,
            span: Span::new(start, end),
        }))
    }

    fn parse_function_decl(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.expect(TokenKind::Function)?.span.start;
        let name = self.expect_identifier("Expected function name")?;
        let params = self.parse_params()?;
        let ret = if self.matches(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let body = self.parse_block()?;
        let end = self.last_span_end(start);
        Ok(Statement::Function(FunctionDecl {
            name,
            params,
            ret,
            body,
            span: Span::new(start, end),
        }))
    }

    fn parse_if(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.expect(TokenKind::If)?.span.start;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let then_branch = self.parse_block()?;
        let else_branch = if self.matches(TokenKind::Else) {
            self.parse_block()?
        } else {
            Vec::new()
        };
        let end = self.last_span_end(start);
        Ok(Statement::If(IfStmt {
            cond,
            then_branch,
            else_branch,
            span: Span::new(start, end),
        }))
    }

    fn parse_while(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.expect(TokenKind::While)?.span.start;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;
        let end = self.last_span_end(start);
        Ok(Statement::While(WhileStmt {
            cond,
            body,
            span: Span::new(start, end),
        }))
    }

    fn parse_return(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.expect(TokenKind::Return)?.span.start;
        let value = self.parse_expression()?;
        self.consume_optional(TokenKind::Semi);
        let end = self.last_span_end(start);
        Ok(Statement::Return(ReturnStmt {
            value,
            span: Span::new(start, end),
        }))
    }

    fn parse_block(&mut self) -> Result<Vec<Statement>, SyntaxError> {
        self.expect(TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_eof() {
            if self.matches(TokenKind::Semi) {
                continue;
            }
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(err) => {
                    self.report(err);
                    self.synchronize_statement();
                }
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(statements)
    }

    fn parse_params(&mut self) -> Result<Vec<Param>, SyntaxError> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let name = self.expect_identifier("Expected parameter name")?;
                let ty = if self.matches(TokenKind::Colon) {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                let span = Span::new(name.span.start, self.last_span_end(name.span.start));
                params.push(Param { name, ty, span });
                if self.matches(TokenKind::Comma) {
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(params)
    }

    fn parse_type(&mut self) -> Result<TypeExpr, SyntaxError> {
        let first = self.parse_type_postfix()?;
        if !self.check(TokenKind::Pipe) {
            return Ok(first);
        }
        let mut members = vec![first];
        while self.matches(TokenKind::Pipe) {
            members.push(self.parse_type_postfix()?);
        }
        Ok(TypeExpr::Union(members))
    }

    fn parse_type_postfix(&mut self) -> Result<TypeExpr, SyntaxError> {
        let mut ty = self.parse_type_atom()?;
        while self.matches(TokenKind::LBracket) {
            self.expect(TokenKind::RBracket)?;
            ty = TypeExpr::Array(Box::new(ty));
        }
        Ok(ty)
    }

    fn parse_type_atom(&mut self) -> Result<TypeExpr, SyntaxError> {
        if self.matches(TokenKind::Undefined) {
            return Ok(TypeExpr::Prim(Primitive::Undefined));
        }
        if self.matches(TokenKind::LParen) {
            let ty = self.parse_type()?;
            self.expect(TokenKind::RParen)?;
            return Ok(ty);
        }
        if self.matches(TokenKind::LBrace) {
            let mut props = Vec::new();
            while !self.check(TokenKind::RBrace) && !self.is_eof() {
                let name = self.expect_identifier("Expected property name")?;
                self.expect(TokenKind::Colon)?;
                let ty = self.parse_type()?;
                props.push((name.name, ty));
                if self.matches(TokenKind::Comma) {
                    continue;
                }
                break;
            }
            self.expect(TokenKind::RBrace)?;
            return Ok(TypeExpr::Object(props));
        }
        if let Some(TokenKind::Identifier(_)) = self.peek_kind() {
            let ident = self.expect_identifier("Expected type")?;
            if let Some(prim) = Primitive::from_name(&ident.name) {
                return Ok(TypeExpr::Prim(prim));
            }
            return Ok(TypeExpr::Named(ident.name));
        }
        Err(self.error_here("Expected type"))
    }

    fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        let expr = self.parse_binary(0)?;
        if !self.check(TokenKind::Eq) {
            return Ok(expr);
        }
        self.advance();
        let value = self.parse_expression()?;
        let start = expr.span().start;
        let span = Span::new(start, value.span().end);
        match expr {
            Expr::Identifier(name) => Ok(Expr::Assign {
                name,
                value: Box::new(value),
                span,
            }),
            Expr::Index { target, index, .. } => Ok(Expr::IndexAssign {
                target,
                index,
                value: Box::new(value),
                span,
            }),
            Expr::Prop { target, name, .. } => Ok(Expr::PropAssign {
                target,
                name,
                value: Box::new(value),
                span,
            }),
            _ => Err(SyntaxError::new("Invalid assignment target", span)),
        }
    }

    fn parse_binary(&mut self, min_power: u8) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_unary()?;
        while let Some((op, power)) = self.current_binary_op() {
            if power < min_power {
                break;
            }
            self.advance();
            let right = self.parse_binary(power + 1)?;
            let span = Span::new(left.span().start, right.span().end);
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        let op = match self.peek_kind() {
            Some(TokenKind::Bang) => Some(UnaryOp::Not),
            Some(TokenKind::Minus) => Some(UnaryOp::Neg),
            _ => None,
        };
        if let Some(op) = op {
            let start = self.advance().span.start;
            let expr = self.parse_unary()?;
            let span = Span::new(start, expr.span().end);
            return Ok(Expr::Unary {
                op,
                expr: Box::new(expr),
                span,
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.matches(TokenKind::LParen) {
                let args = self.parse_args()?;
                let span = Span::new(expr.span().start, self.last_span_end(expr.span().start));
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    span,
                };
            } else if self.matches(TokenKind::LBracket) {
                let index = self.parse_expression()?;
                self.expect(TokenKind::RBracket)?;
                let span = Span::new(expr.span().start, self.last_span_end(expr.span().start));
                expr = Expr::Index {
                    target: Box::new(expr),
                    index: Box::new(index),
                    span,
                };
            } else if self.matches(TokenKind::Dot) {
                let name = self.expect_identifier("Expected property name after '.'")?;
                let span = Span::new(expr.span().start, name.span.end);
                expr = Expr::Prop {
                    target: Box::new(expr),
                    name,
                    span,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if self.matches(TokenKind::Comma) {
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::Number(value)) => {
                let span = self.advance().span;
                Ok(Expr::Number(value, span))
            }
            Some(TokenKind::True) => Ok(Expr::True(self.advance().span)),
            Some(TokenKind::False) => Ok(Expr::False(self.advance().span)),
            Some(TokenKind::Undefined) => Ok(Expr::Undefined(self.advance().span)),
            Some(TokenKind::This) => Ok(Expr::This(self.advance().span)),
            Some(TokenKind::Identifier(_)) => {
                let ident = self.expect_identifier("Expected expression")?;
                Ok(Expr::Identifier(ident))
            }
            Some(TokenKind::LParen) => {
                let start = self.advance().span.start;
                let mut list = vec![self.parse_expression()?];
                while self.matches(TokenKind::Comma) {
                    list.push(self.parse_expression()?);
                }
                let end = self.expect(TokenKind::RParen)?.span.end;
                Ok(Expr::List(list, Span::new(start, end)))
            }
            Some(TokenKind::LBrace) => self.parse_object_literal(),
            Some(TokenKind::New) => {
                let start = self.advance().span.start;
                let callee = self.parse_primary()?;
                let args = if self.matches(TokenKind::LParen) {
                    self.parse_args()?
                } else {
                    Vec::new()
                };
                let end = self.last_span_end(start);
                Ok(Expr::New {
                    callee: Box::new(callee),
                    args,
                    span: Span::new(start, end),
                })
            }
            Some(TokenKind::Function) => self.parse_function_expr(),
            _ => Err(self.error_here("Expected expression")),
        }
    }

    fn parse_object_literal(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.expect(TokenKind::LBrace)?.span.start;
        let mut props = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_eof() {
            let name = self.expect_identifier("Expected property name")?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_expression()?;
            let span = Span::new(name.span.start, value.span().end);
            props.push(ObjectProperty { name, value, span });
            if self.matches(TokenKind::Comma) {
                continue;
            }
            break;
        }
        let end = self.expect(TokenKind::RBrace)?.span.end;
        Ok(Expr::Object(props, Span::new(start, end)))
    }

    fn parse_function_expr(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.expect(TokenKind::Function)?.span.start;
        let name = if let Some(TokenKind::Identifier(_)) = self.peek_kind() {
            Some(self.expect_identifier("Expected function name")?)
        } else {
            None
        };
        let params = self.parse_params()?;
        let ret = if self.matches(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let body = self.parse_block()?;
        let end = self.last_span_end(start);
        Ok(Expr::Function(FunctionExpr {
            name,
            params,
            ret,
            body,
            span: Span::new(start, end),
        }))
    }

    fn current_binary_op(&self) -> Option<(BinaryOp, u8)> {
        match self.peek_kind() {
            Some(TokenKind::Plus) => Some((BinaryOp::Add, 10)),
            Some(TokenKind::Minus) => Some((BinaryOp::Sub, 10)),
            Some(TokenKind::Star) => Some((BinaryOp::Mul, 20)),
            Some(TokenKind::Slash) => Some((BinaryOp::Div, 20)),
            Some(TokenKind::Ampersand) => Some((BinaryOp::BitAnd, 8)),
            Some(TokenKind::Pipe) => Some((BinaryOp::BitOr, 6)),
            Some(TokenKind::AmpersandAmpersand) => Some((BinaryOp::And, 4)),
            Some(TokenKind::PipePipe) => Some((BinaryOp::Or, 3)),
            Some(TokenKind::EqEq) => Some((BinaryOp::Eq, 5)),
            Some(TokenKind::EqEqEq) => Some((BinaryOp::StrictEq, 5)),
            Some(TokenKind::BangEq) => Some((BinaryOp::NotEq, 5)),
            Some(TokenKind::BangEqEq) => Some((BinaryOp::StrictNotEq, 5)),
            Some(TokenKind::Lt) => Some((BinaryOp::Lt, 9)),
            Some(TokenKind::Gt) => Some((BinaryOp::Gt, 9)),
            _ => None,
        }
    }

    fn expect_identifier(&mut self, msg: &str) -> Result<Identifier, SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::Identifier(name)) => {
                let span = self.advance().span;
                Ok(Identifier { name, span })
            }
            _ => Err(self.error_here(msg)),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&Token, SyntaxError> {
        if self.check(kind.clone()) {
            Ok(self.advance())
        } else {
            Err(self.error_here(&format!("Expected {:?}", kind)))
        }
    }

    fn consume_optional(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        matches!(self.peek_kind(), Some(tk) if tk == kind)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind.clone())
    }

    fn advance(&mut self) -> &Token {
        let token = self
            .tokens
            .get(self.pos)
            .unwrap_or_else(|| self.tokens.last().unwrap());
        self.pos = (self.pos + 1).min(self.tokens.len());
        self.last_span = Some(token.span.start..token.span.end);
        token
    }

    fn is_eof(&self) -> bool {
        matches!(self.peek_kind(), Some(TokenKind::Eof) | None)
    }

    fn last_span_end(&self, fallback: usize) -> usize {
        self.last_span
            .as_ref()
            .map(|span| span.end)
            .or_else(|| {
                self.tokens
                    .get(self.pos.saturating_sub(1))
                    .map(|t| t.span.end)
            })
            .unwrap_or(fallback)
    }

    fn error_here(&self, message: &str) -> SyntaxError {
        let span = self
            .tokens
            .get(self.pos)
            .map(|t| t.span)
            .unwrap_or_else(|| {
                self.tokens
                    .last()
                    .map(|t| t.span)
                    .unwrap_or_else(|| Span::new(0, 0))
            });
        SyntaxError::new(message.to_string(), span)
    }

    fn report(&mut self, err: SyntaxError) {
        self.errors.push(err);
    }

    fn synchronize_statement(&mut self) {
        while !self.is_eof() {
            match self.peek_kind() {
                Some(TokenKind::Semi) => {
                    self.advance();
                    return;
                }
                Some(
                    TokenKind::Var
                    | TokenKind::Let
                    | TokenKind::Const
                    | TokenKind::Type
                    | TokenKind::Function
                    | TokenKind::If
                    | TokenKind::While
                    | TokenKind::Return
                    | TokenKind::RBrace,
                ) => {
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> Module {
        parse_module(source).expect("parse")
    }

    #[test]
    fn parses_let_with_annotation() {
        let module = parse_ok("let x: number = 1;");
        assert_eq!(module.statements.len(), 1);
        match &module.statements[0] {
            Statement::Let(stmt) => {
                assert_eq!(stmt.name.name, "x");
                assert_eq!(stmt.ty, Some(TypeExpr::Prim(Primitive::Number)));
                assert!(matches!(stmt.value, Some(Expr::Number(v, _)) if v == 1.0));
            }
            other => panic!("expected let, got {:?}", other),
        }
    }

    #[test]
    fn parses_union_and_array_types() {
        let module = parse_ok("type U = number | string[];");
        match &module.statements[0] {
            Statement::TypeAlias(alias) => {
                assert_eq!(alias.name.name, "U");
                assert_eq!(
                    alias.ty,
                    TypeExpr::Union(vec![
                        TypeExpr::Prim(Primitive::Number),
                        TypeExpr::Array(Box::new(TypeExpr::Prim(Primitive::String))),
                    ])
                );
            }
            other => panic!("expected type alias, got {:?}", other),
        }
    }

    #[test]
    fn parses_object_type() {
        let module = parse_ok("type P = { x: number, y: number };");
        match &module.statements[0] {
            Statement::TypeAlias(alias) => {
                assert_eq!(
                    alias.ty,
                    TypeExpr::Object(vec![
                        ("x".to_string(), TypeExpr::Prim(Primitive::Number)),
                        ("y".to_string(), TypeExpr::Prim(Primitive::Number)),
                    ])
                );
            }
            other => panic!("expected type alias, got {:?}", other),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let module = parse_ok("1 + 2 * 3;");
        match &module.statements[0] {
            Statement::Expr(stmt) => match &stmt.expr {
                Expr::Binary { op, right, .. } => {
                    assert_eq!(*op, BinaryOp::Add);
                    assert!(matches!(
                        right.as_ref(),
                        Expr::Binary {
                            op: BinaryOp::Mul,
                            ..
                        }
                    ));
                }
                other => panic!("expected binary, got {:?}", other),
            },
            other => panic!("expected expression, got {:?}", other),
        }
    }

    #[test]
    fn assignment_targets_are_classified() {
        let module = parse_ok("x = 1; a[0] = 2; o.p = 3;");
        assert!(matches!(
            &module.statements[0],
            Statement::Expr(ExprStmt {
                expr: Expr::Assign { .. }
            })
        ));
        assert!(matches!(
            &module.statements[1],
            Statement::Expr(ExprStmt {
                expr: Expr::IndexAssign { .. }
            })
        ));
        assert!(matches!(
            &module.statements[2],
            Statement::Expr(ExprStmt {
                expr: Expr::PropAssign { .. }
            })
        ));
    }

    #[test]
    fn parses_function_declaration_with_body() {
        let module = parse_ok("function add(a: number, b: number): number { return a + b; }");
        match &module.statements[0] {
            Statement::Function(decl) => {
                assert_eq!(decl.name.name, "add");
                assert_eq!(decl.params.len(), 2);
                assert_eq!(decl.ret, Some(TypeExpr::Prim(Primitive::Number)));
                assert_eq!(decl.body.len(), 1);
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn const_without_initializer_defaults_to_undefined() {
        let module = parse_ok("const c: number;");
        match &module.statements[0] {
            Statement::Const(stmt) => {
                assert!(matches!(stmt.value, Expr::Undefined(_)));
            }
            other => panic!("expected const, got {:?}", other),
        }
    }

    #[test]
    fn recovers_after_bad_statement() {
        let errors = parse_module("let = 1; let y = 2;").expect_err("should fail");
        assert_eq!(errors.errors.len(), 1);
    }
}
