//! Lexer for the Ember language.
//!
//! Produces a flat token stream over a source string. The scanner is
//! newline-sensitive: top-level declarations end at a line break, so
//! `Newline` is a real token rather than trivia.

pub mod token;
pub use token::{Token, TokenKind};

use ember_common::Span;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

static KEYWORDS: Lazy<FxHashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut map = FxHashMap::default();
    map.insert("type", TokenKind::KwType);
    map.insert("trait", TokenKind::KwTrait);
    map.insert("impl", TokenKind::KwImpl);
    map.insert("for", TokenKind::KwFor);
    map.insert("fn", TokenKind::KwFn);
    map.insert("mut", TokenKind::KwMut);
    map.insert("global", TokenKind::KwGlobal);
    map.insert("pub", TokenKind::KwPub);
    map.insert("pri", TokenKind::KwPri);
    map.insert("pro", TokenKind::KwPro);
    map.insert("const", TokenKind::KwConst);
    map
});

/// Hand-rolled scanner over a byte slice.
pub struct Lexer<'src> {
    src: &'src str,
    bytes: &'src [u8],
    pos: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Lexer {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    /// Scan the whole input. The returned stream always ends with `Eof`.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut out = Vec::new();
        loop {
            let tok = self.next_token();
            let done = tok.kind == TokenKind::Eof;
            out.push(tok);
            if done {
                return out;
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_horizontal_ws_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') => {
                    self.pos += 1;
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => return,
            }
        }
    }

    fn next_token(&mut self) -> Token {
        self.skip_horizontal_ws_and_comments();

        let start = self.pos as u32;
        let b = match self.peek() {
            Some(b) => b,
            None => return Token::new(TokenKind::Eof, Span::at(start)),
        };

        match b {
            b'\n' => {
                // Collapse runs of blank lines into a single Newline token.
                while matches!(self.peek(), Some(b'\n') | Some(b' ') | Some(b'\t') | Some(b'\r')) {
                    self.pos += 1;
                }
                Token::new(TokenKind::Newline, Span::new(start, self.pos as u32))
            }
            b'\'' => {
                self.pos += 1;
                let ident_start = self.pos;
                self.eat_ident_continue();
                if self.pos == ident_start {
                    return Token::new(TokenKind::Error, Span::new(start, self.pos as u32));
                }
                // Type variable names keep their leading quote.
                let name = &self.src[start as usize..self.pos];
                Token::with_text(TokenKind::TypeVar, Span::new(start, self.pos as u32), name)
            }
            b'0'..=b'9' => {
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.pos += 1;
                }
                let text = &self.src[start as usize..self.pos];
                match text.parse::<u64>() {
                    Ok(val) => Token::int(Span::new(start, self.pos as u32), val),
                    Err(_) => Token::new(TokenKind::Error, Span::new(start, self.pos as u32)),
                }
            }
            b if b.is_ascii_alphabetic() || b == b'_' => {
                self.eat_ident_continue();
                let text = &self.src[start as usize..self.pos];
                match KEYWORDS.get(text) {
                    Some(&kind) => Token::new(kind, Span::new(start, self.pos as u32)),
                    None => {
                        Token::with_text(TokenKind::Ident, Span::new(start, self.pos as u32), text)
                    }
                }
            }
            b'-' if self.peek_at(1) == Some(b'>') => {
                self.pos += 2;
                Token::new(TokenKind::Arrow, Span::new(start, self.pos as u32))
            }
            _ => {
                self.bump();
                let kind = match b {
                    b'=' => TokenKind::Eq,
                    b'|' => TokenKind::Pipe,
                    b'(' => TokenKind::LParen,
                    b')' => TokenKind::RParen,
                    b'[' => TokenKind::LBracket,
                    b']' => TokenKind::RBracket,
                    b'<' => TokenKind::Lt,
                    b'>' => TokenKind::Gt,
                    b',' => TokenKind::Comma,
                    b'*' => TokenKind::Star,
                    b':' => TokenKind::Colon,
                    _ => TokenKind::Error,
                };
                Token::new(kind, Span::new(start, self.pos as u32))
            }
        }
    }

    fn eat_ident_continue(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }
}
