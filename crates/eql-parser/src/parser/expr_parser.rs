//! Expression parsing using Pratt precedence climbing.
//!
//! Precedence, lowest first:
//! 1. `||`
//! 2. `&&`
//! 3. `==` `!=`
//! 4. `<` `<=` `>` `>=`
//! 5. `+` `-`
//! 6. `*` `/` `%`
//! 7. unary `-` `!`
//! 8. member access `.name` and calls `.name(args)`
//!
//! Every parse step also reports the height of the subtree it built. Chains
//! of binary operators and member accesses grow the tree in a loop rather
//! than through recursion, so their height is checked against the nesting
//! limit as it grows.

use eql_core::{Span, SyntaxError, SyntaxErrorKind};

use super::Parser;
use crate::ast::{BinaryOp, Literal, NodeId, UnaryOp};
use crate::lexer::TokenKind;

impl<'ast> Parser<'ast> {
    /// Parse an expression whose operators all bind tighter than `min_bp`.
    pub(crate) fn parse_expr(&mut self, min_bp: u8) -> Result<NodeId, SyntaxError> {
        Ok(self.parse_tree(min_bp)?.0)
    }

    /// Like [`parse_expr`](Self::parse_expr), also returning the tree height.
    fn parse_tree(&mut self, min_bp: u8) -> Result<(NodeId, usize), SyntaxError> {
        self.enter()?;
        let start = self.peek().span;
        let (mut lhs, mut height) = self.parse_prefix()?;

        loop {
            if self.eat(TokenKind::Dot).is_some() {
                (lhs, height) = self.parse_member_access(lhs, height, start)?;
                self.check_height(height)?;
                continue;
            }

            let Some(op) = BinaryOp::from_token(self.peek().kind) else {
                break;
            };
            let (left_bp, right_bp) = op.binding_power();
            if left_bp < min_bp {
                break;
            }
            self.advance();
            let (rhs, rhs_height) = self.parse_tree(right_bp)?;
            let binary = self.ast.create_binary(op, lhs, rhs);
            lhs = self.finish(binary, start);
            height = height.max(rhs_height) + 1;
            self.check_height(height)?;
        }

        self.leave();
        Ok((lhs, height))
    }

    /// `.name` or `.name(args)` following `target`; the dot is already consumed.
    fn parse_member_access(
        &mut self,
        target: NodeId,
        target_height: usize,
        start: Span,
    ) -> Result<(NodeId, usize), SyntaxError> {
        let name = self.expect_identifier()?;
        let (node, height) = if self.check(TokenKind::LeftParen) {
            let call = self.ast.create_method_call(Some(target), name.lexeme, []);
            let args_height = self.parse_arguments(call)?;
            (call, target_height.max(args_height) + 1)
        } else {
            (self.ast.create_property_ref(target, name.lexeme), target_height + 1)
        };
        Ok((self.finish(node, start), height))
    }

    fn parse_prefix(&mut self) -> Result<(NodeId, usize), SyntaxError> {
        let token = *self.peek();
        let start = token.span;

        match token.kind {
            TokenKind::IntLiteral => {
                self.advance();
                let value = parse_int(token.lexeme, token.span)?;
                Ok((self.literal(Literal::Int(value), start), 1))
            }
            // A minus directly before an integer literal is part of the
            // literal, which makes i64::MIN writable.
            TokenKind::Minus if self.peek_nth(1).kind == TokenKind::IntLiteral => {
                self.advance();
                let digits = self.advance();
                let span = self.span_from(start);
                let value = parse_int(&format!("-{}", digits.lexeme), span)?;
                Ok((self.literal(Literal::Int(value), span), 1))
            }
            TokenKind::FloatLiteral => {
                self.advance();
                let value = token.lexeme.parse::<f64>().map_err(|_| {
                    SyntaxError::new(
                        SyntaxErrorKind::InvalidLiteral,
                        token.span,
                        format!("invalid float literal {}", token.lexeme),
                    )
                })?;
                Ok((self.literal(Literal::Float(value), start), 1))
            }
            TokenKind::StringLiteral => {
                self.advance();
                Ok((self.literal(Literal::String(unescape(token.lexeme)), start), 1))
            }
            TokenKind::True => {
                self.advance();
                Ok((self.literal(Literal::Boolean(true), start), 1))
            }
            TokenKind::False => {
                self.advance();
                Ok((self.literal(Literal::Boolean(false), start), 1))
            }
            TokenKind::Null => {
                self.advance();
                Ok((self.literal(Literal::Null, start), 1))
            }
            TokenKind::Identifier => {
                self.advance();
                let (node, height) = if self.check(TokenKind::LeftParen) {
                    let call = self.ast.create_method_call(None, token.lexeme, []);
                    let args_height = self.parse_arguments(call)?;
                    (call, args_height + 1)
                } else {
                    (self.ast.create_var_ref(token.lexeme), 1)
                };
                Ok((self.finish(node, start), height))
            }
            TokenKind::New => {
                self.advance();
                let type_name = self.parse_type_name()?;
                self.expect(TokenKind::LeftParen)?;
                self.expect(TokenKind::RightParen)?;
                let node = self.ast.create_new(type_name.lexeme);
                Ok((self.finish(node, start), 1))
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_tree(0)?;
                self.expect(TokenKind::RightParen)?;
                Ok(inner)
            }
            TokenKind::Minus | TokenKind::Bang => {
                self.advance();
                let op = if token.kind == TokenKind::Minus { UnaryOp::Neg } else { UnaryOp::Not };
                let (operand, height) = self.parse_tree(UnaryOp::BINDING_POWER)?;
                let node = self.ast.create_unary(op, operand);
                Ok((self.finish(node, start), height + 1))
            }
            TokenKind::Eof => Err(SyntaxError::unexpected_eof(token.span, "expression")),
            _ => Err(SyntaxError::expected_expression(token.span, &token.describe())),
        }
    }

    /// `( expr (, expr)* )?` appended to `call`. Returns the tallest argument's height.
    fn parse_arguments(&mut self, call: NodeId) -> Result<usize, SyntaxError> {
        self.expect(TokenKind::LeftParen)?;
        let mut height = 0;
        if !self.check(TokenKind::RightParen) {
            loop {
                let (arg, arg_height) = self.parse_tree(0)?;
                self.ast.add_arg(call, arg);
                height = height.max(arg_height);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen)?;
        Ok(height)
    }

    fn literal(&mut self, literal: Literal, span: Span) -> NodeId {
        let id = self.ast.create_literal(literal);
        self.ast.set_span(id, span);
        id
    }
}

fn parse_int(text: &str, span: Span) -> Result<i64, SyntaxError> {
    text.parse::<i64>().map_err(|_| {
        SyntaxError::new(
            SyntaxErrorKind::InvalidLiteral,
            span,
            format!("integer literal {text} is out of range"),
        )
    })
}

/// Strip the quotes from a string lexeme and resolve its escapes.
///
/// The lexer has already rejected unknown escapes.
fn unescape(lexeme: &str) -> String {
    let body = lexeme
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(lexeme);
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
