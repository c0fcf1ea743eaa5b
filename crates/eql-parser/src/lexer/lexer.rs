//! Main lexer implementation for EQL.
//!
//! The [`Lexer`] converts source text into [`Token`]s, dispatching on the first
//! character of each token. Lexemes are copied into the arena.

use bumpalo::Bump;
use bumpalo::collections::Vec as BumpVec;

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};
use eql_core::{LexError, Span};

/// Lexer for EQL source.
///
/// The `'src` lifetime is the source being lexed; `'ast` is the arena the
/// token lexemes are allocated in.
pub struct Lexer<'src, 'ast> {
    cursor: Cursor<'src>,
    arena: &'ast Bump,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
        }
    }

    /// Lex the whole input, stopping at the first error.
    ///
    /// On success the last token is always [`TokenKind::Eof`].
    pub fn tokenize(mut self) -> Result<BumpVec<'ast, Token<'ast>>, LexError> {
        let mut tokens = BumpVec::new_in(self.arena);
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Scan the next token.
    pub fn next_token(&mut self) -> Result<Token<'ast>, LexError> {
        self.skip_trivia()?;

        let start_line = self.cursor.line();
        let start_col = self.cursor.column();
        let start_offset = self.cursor.offset();

        let Some(c) = self.cursor.peek() else {
            return Ok(Token::new(
                TokenKind::Eof,
                "",
                Span::point(start_line, start_col),
            ));
        };

        match c {
            '"' => self.scan_string(start_line, start_col, start_offset),
            c if c.is_ascii_digit() => self.scan_number(start_line, start_col, start_offset),
            c if is_ident_start(c) => Ok(self.scan_identifier(start_line, start_col, start_offset)),
            _ => self.scan_operator(start_line, start_col, start_offset),
        }
    }

    // =========================================
    // Internal: whitespace and comments
    // =========================================

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            self.cursor.eat_while(|c| c.is_whitespace());
            match (self.cursor.peek(), self.cursor.peek_nth(1)) {
                (Some('/'), Some('/')) => {
                    self.cursor.eat_while(|c| c != '\n');
                }
                (Some('/'), Some('*')) => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let span = Span::new(self.cursor.line(), self.cursor.column(), 2);
        self.cursor.advance();
        self.cursor.advance();
        loop {
            match self.cursor.advance() {
                None => return Err(LexError::UnterminatedComment { span }),
                Some('*') if self.cursor.eat('/') => return Ok(()),
                Some(_) => {}
            }
        }
    }

    /// Create a token from the start position to the current position.
    fn make_token(&self, kind: TokenKind, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        let text = self.cursor.slice_from(start_offset);
        let span = Span::new(start_line, start_col, text.len() as u32);
        Token::new(kind, self.arena.alloc_str(text), span)
    }

    // =========================================
    // Scanning: strings
    // =========================================

    /// Scan a double-quoted string. Only `\" \\ \n \t` escapes are accepted.
    fn scan_string(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Result<Token<'ast>, LexError> {
        self.cursor.advance();
        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    let len = self.cursor.offset() - start_offset;
                    return Err(LexError::UnterminatedString {
                        span: Span::new(start_line, start_col, len),
                    });
                }
                Some('\\') => {
                    let escape_span = Span::new(self.cursor.line(), self.cursor.column(), 2);
                    self.cursor.advance();
                    match self.cursor.advance() {
                        Some('"' | '\\' | 'n' | 't') => {}
                        Some(ch) => return Err(LexError::InvalidEscape { ch, span: escape_span }),
                        None => {
                            return Err(LexError::UnterminatedString {
                                span: Span::new(start_line, start_col, self.cursor.offset() - start_offset),
                            });
                        }
                    }
                }
                Some('"') => {
                    self.cursor.advance();
                    return Ok(self.make_token(TokenKind::StringLiteral, start_line, start_col, start_offset));
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    // =========================================
    // Scanning: numbers
    // =========================================

    fn scan_number(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Result<Token<'ast>, LexError> {
        self.cursor.eat_while(|c| c.is_ascii_digit());
        let mut kind = TokenKind::IntLiteral;

        if self.cursor.peek() == Some('.') && self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
            kind = TokenKind::FloatLiteral;
        }

        if let Some('e' | 'E') = self.cursor.peek() {
            self.cursor.advance();
            if matches!(self.cursor.peek(), Some('+' | '-')) {
                self.cursor.advance();
            }
            if self.cursor.eat_while(|c| c.is_ascii_digit()).is_empty() {
                return Err(LexError::InvalidNumber {
                    span: Span::new(start_line, start_col, self.cursor.offset() - start_offset),
                    detail: "expected digits in exponent".to_string(),
                });
            }
            kind = TokenKind::FloatLiteral;
        }

        if self.cursor.check(is_ident_start) {
            return Err(LexError::InvalidNumber {
                span: Span::new(start_line, start_col, self.cursor.offset() - start_offset + 1),
                detail: "identifier directly after number".to_string(),
            });
        }

        Ok(self.make_token(kind, start_line, start_col, start_offset))
    }

    // =========================================
    // Scanning: identifiers and keywords
    // =========================================

    fn scan_identifier(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        let lexeme = self.cursor.eat_while(is_ident_continue);
        let kind = lookup_keyword(lexeme).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start_line, start_col, start_offset)
    }

    // =========================================
    // Scanning: operators and punctuation
    // =========================================

    fn scan_operator(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Result<Token<'ast>, LexError> {
        let Some(c) = self.cursor.advance() else {
            return Ok(self.make_token(TokenKind::Eof, start_line, start_col, start_offset));
        };

        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' if self.cursor.eat('=') => TokenKind::EqualEqual,
            '=' => TokenKind::Equal,
            '!' if self.cursor.eat('=') => TokenKind::BangEqual,
            '!' => TokenKind::Bang,
            '<' if self.cursor.eat('=') => TokenKind::LessEqual,
            '<' => TokenKind::Less,
            '>' if self.cursor.eat('=') => TokenKind::GreaterEqual,
            '>' => TokenKind::Greater,
            '&' if self.cursor.eat('&') => TokenKind::AmpAmp,
            '|' if self.cursor.eat('|') => TokenKind::PipePipe,
            ch => {
                return Err(LexError::UnexpectedChar {
                    ch,
                    span: Span::new(start_line, start_col, ch.len_utf8() as u32),
                });
            }
        };

        Ok(self.make_token(kind, start_line, start_col, start_offset))
    }
}
