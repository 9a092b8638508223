//! Parser for the canonical type string grammar.
//!
//! Inverse of [`crate::display::format_type`]: for every closed type `t`,
//! `from_canonical_string(format_type(t)) == t`. Bare identifiers resolve
//! as primitives first, then declared data types, then type variables —
//! the grammar's `TypeVar ::= "'" Ident | Ident` ambiguity resolved in
//! favor of known names.

use crate::bind::bind_type_args;
use crate::display::bound_name;
use crate::intern::TypeInterner;
use crate::modifier::ModifierSet;
use crate::tag::Prim;
use crate::ty::TypeId;

/// Parse a canonical type string back to its interned type.
pub fn from_canonical_string(interner: &TypeInterner, input: &str) -> Result<TypeId, String> {
    let mut parser = CanonParser {
        interner,
        bytes: input.as_bytes(),
        pos: 0,
    };
    let ty = parser.parse_type()?;
    parser.skip_ws();
    if parser.pos != parser.bytes.len() {
        return Err(format!("trailing input at byte {}", parser.pos));
    }
    Ok(ty)
}

struct CanonParser<'a> {
    interner: &'a TypeInterner,
    bytes: &'a [u8],
    pos: usize,
}

impl CanonParser<'_> {
    fn parse_type(&mut self) -> Result<TypeId, String> {
        let mut mods = ModifierSet::empty();
        loop {
            self.skip_ws();
            let mark = self.pos;
            if let Some(word) = self.peek_word() {
                if let Some(flag) = ModifierSet::from_word(&word) {
                    mods |= flag;
                    continue;
                }
            }
            self.pos = mark;
            break;
        }

        let mut ty = self.parse_core()?;
        while self.eat(b'*') {
            ty = self.interner.ptr_to(ty);
        }
        Ok(self.interner.with_modifier_set(ty, mods))
    }

    fn parse_core(&mut self) -> Result<TypeId, String> {
        self.skip_ws();
        match self.peek() {
            Some(b'(') => self.parse_parenthesized(),
            Some(b'[') => self.parse_array(),
            Some(b'\'') => {
                self.pos += 1;
                let name = self.ident()?;
                Ok(self.interner.type_var(&format!("'{name}")))
            }
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => self.parse_named(),
            other => Err(format!("unexpected input: {other:?}")),
        }
    }

    fn parse_parenthesized(&mut self) -> Result<TypeId, String> {
        self.expect(b'(')?;
        self.skip_ws();

        let mut members = Vec::new();
        if !self.eat(b')') {
            loop {
                members.push(self.parse_type()?);
                self.skip_ws();
                if self.eat(b',') {
                    continue;
                }
                self.expect(b')')?;
                break;
            }
        }

        self.skip_ws();
        if self.eat_arrow() {
            let ret = self.parse_type()?;
            return Ok(self.interner.function(ret, members, false));
        }

        match members.len() {
            0 => Err("empty parentheses without a return arrow".to_string()),
            1 => Ok(members.remove(0)),
            _ => Ok(self.interner.tuple(members)),
        }
    }

    fn parse_array(&mut self) -> Result<TypeId, String> {
        self.expect(b'[')?;
        self.skip_ws();
        let mut len: u64 = 0;
        let digits_start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            len = len * 10 + u64::from(self.bytes[self.pos] - b'0');
            self.pos += 1;
        }
        if self.pos == digits_start {
            return Err("expected array length".to_string());
        }
        let elem = self.parse_type()?;
        self.skip_ws();
        self.expect(b']')?;
        let len = if len == 0 { None } else { Some(len) };
        Ok(self.interner.array_of(elem, len))
    }

    fn parse_named(&mut self) -> Result<TypeId, String> {
        let name = self.ident()?;
        self.skip_ws();

        if self.eat(b'<') {
            let mut args = Vec::new();
            loop {
                args.push(self.parse_type()?);
                self.skip_ws();
                if self.eat(b',') {
                    continue;
                }
                self.expect(b'>')?;
                break;
            }
            return Ok(data_ref(self.interner, &name, &args));
        }

        if let Some(prim) = Prim::from_name(&name) {
            return Ok(self.interner.primitive(prim));
        }
        if self.interner.lookup_data(&name).is_some() {
            return Ok(self.interner.data_by_name(&name));
        }
        // Unknown bare identifier: a quoteless type variable.
        Ok(self.interner.type_var(&name))
    }

    // =========================================================================
    // Lexical helpers
    // =========================================================================

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ') | Some(b'\t')) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, b: u8) -> bool {
        self.skip_ws();
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_arrow(&mut self) -> bool {
        self.skip_ws();
        if self.bytes[self.pos..].starts_with(b"->") {
            self.pos += 2;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, b: u8) -> Result<(), String> {
        if self.eat(b) {
            Ok(())
        } else {
            Err(format!("expected '{}' at byte {}", b as char, self.pos))
        }
    }

    fn ident(&mut self) -> Result<String, String> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(format!("expected identifier at byte {start}"));
        }
        Ok(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
    }

    fn peek_word(&mut self) -> Option<String> {
        let b = self.peek()?;
        if !(b.is_ascii_alphabetic() || b == b'_') {
            return None;
        }
        self.ident().ok()
    }
}

/// Resolve a named reference with arguments: instantiate through the
/// declaration when one is known, otherwise intern a stub under the full
/// bound name so the reference stays usable.
pub fn data_ref(interner: &TypeInterner, name: &str, args: &[TypeId]) -> TypeId {
    if let Some(did) = interner.lookup_data(name) {
        let has_generics = interner.with_data(did, |def| !def.generics.is_empty());
        if has_generics {
            return bind_type_args(interner, interner.data_type_id(did), args);
        }
    }
    interner.data_by_name(&bound_name(interner, name, args.iter().copied()))
}
