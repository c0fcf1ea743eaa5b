//! Unified error types for EQL.
//!
//! ## Error Hierarchy
//!
//! ```text
//! EqlError (top-level wrapper)
//! ├── SyntaxError            - Lexer and parser errors (with SyntaxErrorKind)
//! ├── CompileErrors          - Resolution errors, collected per pass
//! │   └── CompileError       - DuplicateDefinition / UnresolvedSymbol / UnknownType / type errors
//! ├── InternalCompilerError  - Code generation invariant violations
//! ├── ExecutionError         - Errors raised while running a compiled query
//! └── SerializationError     - Message protocol encode/decode errors
//! ```

use thiserror::Error;

use crate::Span;

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors that occur during tokenization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },

    #[error("unterminated string at {span}")]
    UnterminatedString { span: Span },

    #[error("unterminated comment at {span}")]
    UnterminatedComment { span: Span },

    #[error("invalid escape sequence '\\{ch}' at {span}")]
    InvalidEscape { ch: char, span: Span },

    #[error("invalid number at {span}: {detail}")]
    InvalidNumber { span: Span, detail: String },
}

impl LexError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. } => *span,
            LexError::UnterminatedString { span } => *span,
            LexError::UnterminatedComment { span } => *span,
            LexError::InvalidEscape { span, .. } => *span,
            LexError::InvalidNumber { span, .. } => *span,
        }
    }
}

// ============================================================================
// Syntax Errors
// ============================================================================

/// Categories of syntax errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxErrorKind {
    /// The lexer rejected the input.
    InvalidToken,
    /// A specific token was expected but not found.
    ExpectedToken,
    /// Unexpected end of file.
    UnexpectedEof,
    ExpectedExpression,
    ExpectedIdentifier,
    ExpectedType,
    ExpectedStatement,
    ExpectedClassMember,
    /// Left-hand side of `=` is not assignable.
    InvalidAssignmentTarget,
    /// A literal value could not be represented.
    InvalidLiteral,
    /// Blocks or expressions nested beyond the parser's limit.
    NestingTooDeep,
}

impl SyntaxErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyntaxErrorKind::InvalidToken => "invalid token",
            SyntaxErrorKind::ExpectedToken => "expected token",
            SyntaxErrorKind::UnexpectedEof => "unexpected end of file",
            SyntaxErrorKind::ExpectedExpression => "expected expression",
            SyntaxErrorKind::ExpectedIdentifier => "expected identifier",
            SyntaxErrorKind::ExpectedType => "expected type",
            SyntaxErrorKind::ExpectedStatement => "expected statement",
            SyntaxErrorKind::ExpectedClassMember => "expected class member",
            SyntaxErrorKind::InvalidAssignmentTarget => "invalid assignment target",
            SyntaxErrorKind::InvalidLiteral => "invalid literal",
            SyntaxErrorKind::NestingTooDeep => "nesting too deep",
        }
    }
}

impl std::fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A syntax error with location and an expected-vs-found message.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}: {message}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub span: Span,
    pub message: String,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Create an "expected X, found Y" error.
    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            SyntaxErrorKind::ExpectedToken,
            span,
            format!("expected {expected}, found {found}"),
        )
    }

    pub fn unexpected_eof(span: Span, expected: &str) -> Self {
        Self::new(
            SyntaxErrorKind::UnexpectedEof,
            span,
            format!("expected {expected}, found end of file"),
        )
    }

    pub fn expected_identifier(span: Span, found: &str) -> Self {
        Self::new(
            SyntaxErrorKind::ExpectedIdentifier,
            span,
            format!("expected identifier, found {found}"),
        )
    }

    pub fn expected_expression(span: Span, found: &str) -> Self {
        Self::new(
            SyntaxErrorKind::ExpectedExpression,
            span,
            format!("expected expression, found {found}"),
        )
    }

    pub fn expected_type(span: Span, found: &str) -> Self {
        Self::new(
            SyntaxErrorKind::ExpectedType,
            span,
            format!("expected type, found {found}"),
        )
    }

    /// Format the error with the offending source line and a caret.
    pub fn display_with_source(&self, source: &str) -> String {
        let mut output = format!("error at {}: {}\n", self.span, self.message);
        let line = self.span.line;
        if let Some(line_text) = source.lines().nth(line.saturating_sub(1) as usize) {
            output.push_str("    |\n");
            output.push_str(&format!("{line:>3} | {line_text}\n"));
            let indent = " ".repeat(self.span.col.saturating_sub(1) as usize);
            let pointer = "^".repeat(self.span.len.max(1) as usize);
            output.push_str(&format!("    | {indent}{pointer}\n"));
        }
        output
    }
}

impl From<LexError> for SyntaxError {
    fn from(err: LexError) -> Self {
        let span = err.span();
        SyntaxError::new(SyntaxErrorKind::InvalidToken, span, err.to_string())
    }
}

// ============================================================================
// Compile (resolution) Errors
// ============================================================================

/// What kind of declaration a duplicate or unresolved symbol refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Class,
    Property,
    Method,
    Parameter,
    Variable,
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SymbolKind::Class => "class",
            SymbolKind::Property => "property",
            SymbolKind::Method => "method",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Variable => "variable",
        };
        f.write_str(name)
    }
}

/// Broad category of a [`CompileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompileErrorCategory {
    DuplicateDefinition,
    UnresolvedSymbol,
    Type,
}

/// An error found while resolving symbols and types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("at {span}: duplicate {kind} '{name}' (first defined at {first})")]
    DuplicateDefinition {
        kind: SymbolKind,
        name: String,
        span: Span,
        first: Span,
    },

    #[error("at {span}: unresolved identifier '{name}'")]
    UnresolvedSymbol { name: String, span: Span },

    #[error("at {span}: unknown type '{name}'")]
    UnknownType { name: String, span: Span },

    #[error("at {span}: type '{owner}' has no {kind} named '{name}'")]
    UnknownMember {
        owner: String,
        kind: SymbolKind,
        name: String,
        span: Span,
    },

    #[error("at {span}: type mismatch in {context}: expected '{expected}', found '{actual}'")]
    TypeMismatch {
        context: String,
        expected: String,
        actual: String,
        span: Span,
    },

    #[error("at {span}: '{name}' expects {expected} argument(s), found {actual}")]
    ArgumentCount {
        name: String,
        expected: usize,
        actual: usize,
        span: Span,
    },

    #[error("at {span}: {message}")]
    InvalidOperation { message: String, span: Span },
}

impl CompileError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompileError::DuplicateDefinition { span, .. } => *span,
            CompileError::UnresolvedSymbol { span, .. } => *span,
            CompileError::UnknownType { span, .. } => *span,
            CompileError::UnknownMember { span, .. } => *span,
            CompileError::TypeMismatch { span, .. } => *span,
            CompileError::ArgumentCount { span, .. } => *span,
            CompileError::InvalidOperation { span, .. } => *span,
        }
    }

    pub fn category(&self) -> CompileErrorCategory {
        match self {
            CompileError::DuplicateDefinition { .. } => CompileErrorCategory::DuplicateDefinition,
            CompileError::UnresolvedSymbol { .. }
            | CompileError::UnknownType { .. }
            | CompileError::UnknownMember { .. } => CompileErrorCategory::UnresolvedSymbol,
            CompileError::TypeMismatch { .. }
            | CompileError::ArgumentCount { .. }
            | CompileError::InvalidOperation { .. } => CompileErrorCategory::Type,
        }
    }

    pub fn type_mismatch(
        context: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
        span: Span,
    ) -> Self {
        CompileError::TypeMismatch {
            context: context.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
            span,
        }
    }
}

/// Every error recorded by one resolution run, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompileErrors {
    errors: Vec<CompileError>,
}

impl CompileErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn push(&mut self, error: CompileError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = CompileError>) {
        self.errors.extend(errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompileError> {
        self.errors.iter()
    }

    pub fn first(&self) -> Option<&CompileError> {
        self.errors.first()
    }

    /// Sort by position; stable so errors at one position keep discovery order.
    pub fn sort(&mut self) {
        self.errors.sort_by_key(|e| e.span());
    }

    pub fn into_vec(self) -> Vec<CompileError> {
        self.errors
    }

    /// `Ok(())` when empty, otherwise the whole collection as the error.
    pub fn into_result(self) -> Result<(), CompileErrors> {
        if self.errors.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileErrors {}

impl From<CompileError> for CompileErrors {
    fn from(error: CompileError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IntoIterator for CompileErrors {
    type Item = CompileError;
    type IntoIter = std::vec::IntoIter<CompileError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a CompileErrors {
    type Item = &'a CompileError;
    type IntoIter = std::slice::Iter<'a, CompileError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

// ============================================================================
// Code Generation Errors
// ============================================================================

/// An invariant violated between resolution and code generation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("internal compiler error at {span}: {message}")]
pub struct InternalCompilerError {
    pub span: Span,
    pub message: String,
}

impl InternalCompilerError {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

// ============================================================================
// Execution Errors
// ============================================================================

/// Errors raised while executing a compiled query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    #[error("division by zero at line {line}")]
    DivisionByZero { line: u32 },

    #[error("null reference at line {line}")]
    NullReference { line: u32 },

    #[error("call depth exceeded the limit of {limit}")]
    CallDepthExceeded { limit: usize },

    #[error("invalid bytecode: {message}")]
    InvalidBytecode { message: String },

    #[error("type fault at line {line}: {message}")]
    TypeFault { line: u32, message: String },
}

// ============================================================================
// Serialization Errors
// ============================================================================

/// Errors at the message protocol boundary.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("unexpected end of input")]
    Truncated,

    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("failed to encode message: {0}")]
    Encode(String),

    #[error("unsupported message kind {0}")]
    UnknownKind(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Unified Error
// ============================================================================

/// Top-level error type for the whole pipeline.
#[derive(Debug, Error)]
pub enum EqlError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Compile(#[from] CompileErrors),

    #[error(transparent)]
    Internal(#[from] InternalCompilerError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EqlError {
    /// Source position, when the error has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            EqlError::Syntax(e) => Some(e.span),
            EqlError::Compile(e) => e.first().map(CompileError::span),
            EqlError::Internal(e) => Some(e.span),
            _ => None,
        }
    }
}
