pub mod codec;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use codec::{
    candidates, decode, decode_text, encode, is_supported, supported_characters, translate,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MorseError {
    #[error("no Morse code for character {0:?}")]
    UnsupportedCharacter(char),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MorseSymbol {
    Dot,
    Dash,
}

impl MorseSymbol {
    pub fn as_char(self) -> char {
        match self {
            MorseSymbol::Dot => '.',
            MorseSymbol::Dash => '-',
        }
    }

    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '.' => Some(MorseSymbol::Dot),
            '-' => Some(MorseSymbol::Dash),
            _ => None,
        }
    }

    /// Length in dot units.
    pub fn units(self) -> u32 {
        match self {
            MorseSymbol::Dot => 1,
            MorseSymbol::Dash => 3,
        }
    }
}

/// One element of a rendered code string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MorseElement {
    Symbol(MorseSymbol),
    /// A bare space between letters.
    LetterGap,
    /// The `/` marker between words.
    WordGap,
}

/// A dot/dash string, optionally with letter spaces and `/` word markers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MorseCode(String);

impl MorseCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Elements in order. Characters that are neither symbols nor gaps are skipped.
    pub fn elements(&self) -> impl Iterator<Item = MorseElement> + '_ {
        self.0.chars().filter_map(|ch| match ch {
            ' ' => Some(MorseElement::LetterGap),
            '/' => Some(MorseElement::WordGap),
            other => MorseSymbol::from_char(other).map(MorseElement::Symbol),
        })
    }

    pub fn symbols(&self) -> impl Iterator<Item = MorseSymbol> + '_ {
        self.elements().filter_map(|el| match el {
            MorseElement::Symbol(sym) => Some(sym),
            _ => None,
        })
    }
}

impl fmt::Display for MorseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MorseCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elements_recognize_gaps() {
        let code = MorseCode::new(".- / -");
        let elements: Vec<MorseElement> = code.elements().collect();
        assert_eq!(
            elements,
            vec![
                MorseElement::Symbol(MorseSymbol::Dot),
                MorseElement::Symbol(MorseSymbol::Dash),
                MorseElement::LetterGap,
                MorseElement::WordGap,
                MorseElement::LetterGap,
                MorseElement::Symbol(MorseSymbol::Dash),
            ]
        );
    }

    #[test]
    fn symbols_skip_unknown_characters() {
        let code = MorseCode::new(".x-");
        assert_eq!(code.symbols().count(), 2);
    }

    #[test]
    fn dash_is_three_units() {
        assert_eq!(MorseSymbol::Dot.units(), 1);
        assert_eq!(MorseSymbol::Dash.units(), 3);
    }
}
