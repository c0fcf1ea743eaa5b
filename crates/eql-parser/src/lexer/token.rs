//! Token types for the EQL lexer.

use eql_core::Span;
use std::fmt;

/// A token from query source.
///
/// The `'ast` lifetime refers to the arena holding the lexeme, so the source
/// string may be dropped once lexing is done.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    pub kind: TokenKind,
    pub lexeme: &'ast str,
    pub span: Span,
}

impl<'ast> Token<'ast> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }

    /// Text used for this token in "found ..." messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::Identifier => format!("identifier '{}'", self.lexeme),
            TokenKind::IntLiteral | TokenKind::FloatLiteral | TokenKind::StringLiteral => {
                format!("literal {}", self.lexeme)
            }
            _ => format!("'{}'", self.lexeme),
        }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

/// All token kinds in EQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals and identifiers
    // =========================================
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    Identifier,

    // =========================================
    // Keywords
    // =========================================
    Class,
    Public,
    Private,
    If,
    Else,
    While,
    Return,
    New,
    True,
    False,
    Null,

    // =========================================
    // Operators
    // =========================================
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Equal,
    EqualEqual,
    Bang,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    AmpAmp,
    PipePipe,

    // =========================================
    // Punctuation
    // =========================================
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Semicolon,
    Comma,
    Dot,

    Eof,
}

impl TokenKind {
    /// Human-readable description used in "expected ..." messages.
    pub fn description(self) -> &'static str {
        use TokenKind::*;
        match self {
            IntLiteral => "integer literal",
            FloatLiteral => "float literal",
            StringLiteral => "string literal",
            Identifier => "identifier",
            Class => "'class'",
            Public => "'public'",
            Private => "'private'",
            If => "'if'",
            Else => "'else'",
            While => "'while'",
            Return => "'return'",
            New => "'new'",
            True => "'true'",
            False => "'false'",
            Null => "'null'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Percent => "'%'",
            Equal => "'='",
            EqualEqual => "'=='",
            Bang => "'!'",
            BangEqual => "'!='",
            Less => "'<'",
            LessEqual => "'<='",
            Greater => "'>'",
            GreaterEqual => "'>='",
            AmpAmp => "'&&'",
            PipePipe => "'||'",
            LeftParen => "'('",
            RightParen => "')'",
            LeftBrace => "'{'",
            RightBrace => "'}'",
            Semicolon => "';'",
            Comma => "','",
            Dot => "'.'",
            Eof => "end of file",
        }
    }

    pub fn is_literal(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            IntLiteral | FloatLiteral | StringLiteral | True | False | Null
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Map an identifier lexeme to its keyword, if it is one.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    let kind = match ident {
        "class" => TokenKind::Class,
        "public" => TokenKind::Public,
        "private" => TokenKind::Private,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "return" => TokenKind::Return,
        "new" => TokenKind::New,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        _ => return None,
    };
    Some(kind)
}
