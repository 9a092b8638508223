//! The modifier layer: orthogonal qualifiers attached to a type without
//! changing the identity of the underlying type.

use bitflags::bitflags;
use ember_lexer::TokenKind;

bitflags! {
    /// A set of modifier tokens from the reserved attribute vocabulary.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ModifierSet: u8 {
        const MUT    = 1 << 0;
        const GLOBAL = 1 << 1;
        const PUB    = 1 << 2;
        const PRI    = 1 << 3;
        const PRO    = 1 << 4;
        const CONST  = 1 << 5;
    }
}

impl ModifierSet {
    /// Map a lexer token to its modifier bit, if it is a modifier keyword.
    pub fn from_token(kind: TokenKind) -> Option<ModifierSet> {
        match kind {
            TokenKind::KwMut => Some(ModifierSet::MUT),
            TokenKind::KwGlobal => Some(ModifierSet::GLOBAL),
            TokenKind::KwPub => Some(ModifierSet::PUB),
            TokenKind::KwPri => Some(ModifierSet::PRI),
            TokenKind::KwPro => Some(ModifierSet::PRO),
            TokenKind::KwConst => Some(ModifierSet::CONST),
            _ => None,
        }
    }

    /// Parse a single modifier word of the canonical grammar.
    pub fn from_word(word: &str) -> Option<ModifierSet> {
        match word {
            "mut" => Some(ModifierSet::MUT),
            "global" => Some(ModifierSet::GLOBAL),
            "pub" => Some(ModifierSet::PUB),
            "pri" => Some(ModifierSet::PRI),
            "pro" => Some(ModifierSet::PRO),
            "const" => Some(ModifierSet::CONST),
            _ => None,
        }
    }

    /// The canonical prefix for this set: each token followed by a single
    /// space, in bit order. Empty set prints nothing.
    pub fn prefix(self) -> String {
        let mut out = String::new();
        for (word, flag) in [
            ("mut", ModifierSet::MUT),
            ("global", ModifierSet::GLOBAL),
            ("pub", ModifierSet::PUB),
            ("pri", ModifierSet::PRI),
            ("pro", ModifierSet::PRO),
            ("const", ModifierSet::CONST),
        ] {
            if self.contains(flag) {
                out.push_str(word);
                out.push(' ');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_order_is_stable() {
        let set = ModifierSet::CONST | ModifierSet::MUT;
        assert_eq!(set.prefix(), "mut const ");
        assert_eq!(ModifierSet::empty().prefix(), "");
    }

    #[test]
    fn test_token_mapping() {
        assert_eq!(
            ModifierSet::from_token(TokenKind::KwMut),
            Some(ModifierSet::MUT)
        );
        assert_eq!(ModifierSet::from_token(TokenKind::Ident), None);
    }
}
