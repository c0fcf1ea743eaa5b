//! Operator definitions for EQL expressions.
//!
//! Binding powers drive the Pratt expression parser.

use crate::lexer::TokenKind;
use std::fmt;

/// Binary operators, ordered from lowest to highest precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `||`
    Or,
    /// `&&`
    And,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl BinaryOp {
    /// Binding power as `(left_bp, right_bp)`; every operator is left-associative.
    pub fn binding_power(&self) -> (u8, u8) {
        use BinaryOp::*;
        match self {
            Or => (3, 4),
            And => (5, 6),
            Equal | NotEqual => (7, 8),
            Less | LessEqual | Greater | GreaterEqual => (9, 10),
            Add | Sub => (11, 12),
            Mul | Div | Mod => (13, 14),
        }
    }

    pub fn from_token(token: TokenKind) -> Option<Self> {
        use TokenKind::*;
        Some(match token {
            PipePipe => BinaryOp::Or,
            AmpAmp => BinaryOp::And,
            EqualEqual => BinaryOp::Equal,
            BangEqual => BinaryOp::NotEqual,
            Less => BinaryOp::Less,
            LessEqual => BinaryOp::LessEqual,
            Greater => BinaryOp::Greater,
            GreaterEqual => BinaryOp::GreaterEqual,
            Plus => BinaryOp::Add,
            Minus => BinaryOp::Sub,
            Star => BinaryOp::Mul,
            Slash => BinaryOp::Div,
            Percent => BinaryOp::Mod,
            _ => return None,
        })
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod)
    }

    /// Ordering comparisons; equality is separate.
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual
        )
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, BinaryOp::Equal | BinaryOp::NotEqual)
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn as_str(&self) -> &'static str {
        use BinaryOp::*;
        match self {
            Or => "||",
            And => "&&",
            Equal => "==",
            NotEqual => "!=",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `!`
    Not,
}

impl UnaryOp {
    /// Prefix operators bind tighter than every binary operator.
    pub const BINDING_POWER: u8 = 15;

    pub fn from_token(token: TokenKind) -> Option<Self> {
        match token {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        assert!(BinaryOp::Mul.binding_power().0 > BinaryOp::Add.binding_power().0);
        assert!(BinaryOp::Add.binding_power().0 > BinaryOp::Less.binding_power().0);
        assert!(BinaryOp::And.binding_power().0 > BinaryOp::Or.binding_power().0);
    }

    #[test]
    fn unary_binds_tightest() {
        assert!(UnaryOp::BINDING_POWER > BinaryOp::Mod.binding_power().1);
    }

    #[test]
    fn token_mapping() {
        assert_eq!(BinaryOp::from_token(TokenKind::Percent), Some(BinaryOp::Mod));
        assert_eq!(BinaryOp::from_token(TokenKind::Equal), None);
        assert_eq!(UnaryOp::from_token(TokenKind::Bang), Some(UnaryOp::Not));
        assert_eq!(BinaryOp::GreaterEqual.to_string(), ">=");
    }
}
