//! Recursive-descent parser for EQL.
//!
//! The whole source is tokenized up front; the parser then walks the token
//! buffer and builds nodes directly into an [`Ast`]. Parsing stops at the
//! first syntax error and the partially built arena is dropped, so callers
//! either get a complete tree or none.

mod decl_parser;
mod expr_parser;
mod stmt_parser;

use bumpalo::Bump;
use bumpalo::collections::Vec as BumpVec;
use eql_core::{Span, SyntaxError, SyntaxErrorKind};
use tracing::debug;

use crate::ast::{Ast, NodeId};
use crate::lexer::{Lexer, Token, TokenKind};

/// Deepest block or expression nesting accepted. Expression trees count
/// their full height, so long operator chains are bounded too.
pub const MAX_NESTING: usize = 256;

/// The EQL parser.
///
/// The `'ast` lifetime is the arena holding token lexemes.
pub struct Parser<'ast> {
    tokens: BumpVec<'ast, Token<'ast>>,
    position: usize,
    depth: usize,
    pub(crate) ast: Ast,
}

impl<'ast> Parser<'ast> {
    /// Tokenize `source` into `arena`. Lexical errors surface here.
    pub fn new(source: &str, arena: &'ast Bump) -> Result<Self, SyntaxError> {
        let tokens = Lexer::new(source, arena).tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
            depth: 0,
            ast: Ast::new(),
        })
    }

    /// Parse a whole module named `name` and return its tree.
    ///
    /// Classes become module members; every other top-level statement is
    /// collected, in order, into the module's anonymous main function.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_module(mut self, name: &str) -> Result<Ast, SyntaxError> {
        let mut classes = Vec::new();
        let mut statements = Vec::new();

        while !self.is_eof() {
            if self.check(TokenKind::Class) {
                classes.push(self.parse_class()?);
            } else {
                statements.push(self.parse_statement()?);
            }
        }

        let main_function = match statements.first() {
            Some(&first) => {
                let span = self.ast.span(first);
                let body = self.ast.create_block(statements);
                self.ast.set_span(body, span);
                let function = self.ast.create_function("", "", [], Some(body));
                self.ast.set_span(function, span);
                Some(function)
            }
            None => None,
        };

        let module = self.ast.create_module(name, classes, main_function);
        self.ast.set_span(module, Span::new(1, 1, 0));
        self.ast.set_root(module);
        debug!(module = name, nodes = self.ast.len(), "parsed module");
        Ok(self.ast)
    }

    // ========================================================================
    // Token Navigation
    // ========================================================================

    /// Peek at the current token without consuming it.
    pub(crate) fn peek(&self) -> &Token<'ast> {
        self.peek_nth(0)
    }

    /// Peek ahead `n` tokens; clamps to the trailing EOF token.
    pub(crate) fn peek_nth(&self, n: usize) -> &Token<'ast> {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.position + n).min(last)]
    }

    /// Consume the current token. EOF is never consumed.
    pub(crate) fn advance(&mut self) -> Token<'ast> {
        let token = *self.peek();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consume a token of `kind` or fail with "expected X, found Y".
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token<'ast>, SyntaxError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.description()))
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<Token<'ast>, SyntaxError> {
        if self.check(TokenKind::Identifier) {
            return Ok(self.advance());
        }
        let token = *self.peek();
        if token.kind == TokenKind::Eof {
            return Err(SyntaxError::unexpected_eof(token.span, "identifier"));
        }
        Err(SyntaxError::expected_identifier(token.span, &token.describe()))
    }

    /// Error describing the current token as not being `expected`.
    pub(crate) fn unexpected(&self, expected: &str) -> SyntaxError {
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            SyntaxError::unexpected_eof(token.span, expected)
        } else {
            SyntaxError::expected_token(token.span, expected, &token.describe())
        }
    }

    /// Span from `start` up to the end of the previously consumed token.
    pub(crate) fn span_from(&self, start: Span) -> Span {
        match self.position.checked_sub(1).map(|i| self.tokens[i].span) {
            Some(end) if end >= start => start.merge(end),
            _ => start,
        }
    }

    pub(crate) fn finish(&mut self, id: NodeId, start: Span) -> NodeId {
        let span = self.span_from(start);
        self.ast.set_span(id, span);
        id
    }

    // ========================================================================
    // Nesting guard
    // ========================================================================

    pub(crate) fn enter(&mut self) -> Result<(), SyntaxError> {
        if self.depth >= MAX_NESTING {
            return Err(self.too_deep());
        }
        self.depth += 1;
        Ok(())
    }

    /// Fail when an expression of `height` levels at the current depth
    /// would exceed [`MAX_NESTING`].
    pub(crate) fn check_height(&self, height: usize) -> Result<(), SyntaxError> {
        if self.depth + height > MAX_NESTING {
            return Err(self.too_deep());
        }
        Ok(())
    }

    fn too_deep(&self) -> SyntaxError {
        SyntaxError::new(
            SyntaxErrorKind::NestingTooDeep,
            self.peek().span,
            format!("nesting exceeds {MAX_NESTING} levels"),
        )
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
