//! Token kinds produced by the scanner.

use ember_common::{Span, Spanned};

/// The closed set of token kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals and names
    Ident,
    TypeVar,
    IntLit,

    // Declaration keywords
    KwType,
    KwTrait,
    KwImpl,
    KwFor,
    KwFn,

    // Modifier keywords (the reserved attribute vocabulary)
    KwMut,
    KwGlobal,
    KwPub,
    KwPri,
    KwPro,
    KwConst,

    // Punctuation
    Eq,
    Pipe,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Lt,
    Gt,
    Comma,
    Star,
    Arrow,
    Colon,

    Newline,
    Eof,
    Error,
}

impl TokenKind {
    /// True for the modifier-keyword subset.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            TokenKind::KwMut
                | TokenKind::KwGlobal
                | TokenKind::KwPub
                | TokenKind::KwPri
                | TokenKind::KwPro
                | TokenKind::KwConst
        )
    }
}

/// A single token with its span; identifiers carry their text and
/// integer literals their value.
#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: Option<String>,
    pub int_value: Option<u64>,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token {
            kind,
            span,
            text: None,
            int_value: None,
        }
    }

    pub fn with_text(kind: TokenKind, span: Span, text: &str) -> Self {
        Token {
            kind,
            span,
            text: Some(text.to_string()),
            int_value: None,
        }
    }

    pub fn int(span: Span, value: u64) -> Self {
        Token {
            kind: TokenKind::IntLit,
            span,
            text: None,
            int_value: Some(value),
        }
    }

    /// Identifier or type-variable text; empty for other kinds.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

impl Spanned for Token {
    fn span(&self) -> Span {
        self.span
    }
}
