use crate::morse::{MorseCode, MorseError};

const TABLE: &[(char, &str)] = &[
    ('A', ".-"),
    ('B', "-..."),
    ('C', "-.-."),
    ('D', "-.."),
    ('E', "."),
    ('F', "..-."),
    ('G', "--."),
    ('H', "...."),
    ('I', ".."),
    ('J', ".---"),
    ('K', "-.-"),
    ('L', ".-.."),
    ('M', "--"),
    ('N', "-."),
    ('O', "---"),
    ('P', ".--."),
    ('Q', "--.-"),
    ('R', ".-."),
    ('S', "..."),
    ('T', "-"),
    ('U', "..-"),
    ('V', "...-"),
    ('W', ".--"),
    ('X', "-..-"),
    ('Y', "-.--"),
    ('Z', "--.."),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
    ('0', "-----"),
    (',', "--..--"),
    ('.', ".-.-.-"),
    ('?', "..--.."),
    ('/', "-..-."),
    ('-', "-....-"),
    ('(', "-.--."),
    (')', "-.--.-"),
];

fn lookup(ch: char) -> Option<&'static str> {
    let upper = ch.to_ascii_uppercase();
    TABLE
        .iter()
        .find(|(c, _)| *c == upper)
        .map(|(_, code)| *code)
}

pub fn encode(ch: char) -> Result<MorseCode, MorseError> {
    lookup(ch)
        .map(MorseCode::new)
        .ok_or(MorseError::UnsupportedCharacter(ch))
}

pub fn is_supported(ch: char) -> bool {
    lookup(ch).is_some()
}

pub fn supported_characters() -> impl Iterator<Item = char> {
    TABLE.iter().map(|(c, _)| *c)
}

pub fn decode(code: &str) -> Option<char> {
    TABLE.iter().find(|(_, c)| *c == code).map(|(ch, _)| *ch)
}

/// Characters whose code begins with `prefix`, in table order.
pub fn candidates(prefix: &str) -> Vec<char> {
    if prefix.is_empty() {
        return Vec::new();
    }
    TABLE
        .iter()
        .filter(|(_, code)| code.starts_with(prefix))
        .map(|(ch, _)| *ch)
        .collect()
}

/// Render free text. Letters are separated by a space and words by ` / `;
/// characters without a code are passed through as-is.
pub fn translate(text: &str) -> MorseCode {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|word| {
            word.chars()
                .map(|ch| match lookup(ch) {
                    Some(code) => code.to_string(),
                    None => ch.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();
    MorseCode::new(words.join(" / "))
}

/// Reverse of [`translate`]: letters separated by whitespace, words by `/`.
/// Groups that match no character come back as `?`.
pub fn decode_text(code: &str) -> String {
    code.split('/')
        .map(|word| {
            word.split_whitespace()
                .map(|group| decode(group).unwrap_or('?'))
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn every_supported_character_encodes_stably() {
        for ch in supported_characters() {
            let first = encode(ch).unwrap();
            assert!(!first.is_empty(), "{ch} has an empty code");
            assert_eq!(first, encode(ch).unwrap());
        }
    }

    #[test]
    fn codes_are_unique() {
        let mut seen = HashSet::new();
        for ch in supported_characters() {
            let code = encode(ch).unwrap();
            assert!(seen.insert(code.as_str().to_string()), "duplicate code for {ch}");
        }
    }

    #[test]
    fn lowercase_is_accepted() {
        assert_eq!(encode('a').unwrap().as_str(), ".-");
    }

    #[test]
    fn unsupported_character_is_a_lookup_failure() {
        assert_eq!(encode('#'), Err(MorseError::UnsupportedCharacter('#')));
        assert!(!is_supported('@'));
    }

    #[test]
    fn decode_reverses_encode() {
        assert_eq!(decode("-.-."), Some('C'));
        assert_eq!(decode("......."), None);
    }

    #[test]
    fn candidates_share_prefix() {
        let found = candidates(".-");
        assert!(found.contains(&'A'));
        assert!(found.contains(&'L'));
        assert!(!found.contains(&'E'));
        assert!(candidates("").is_empty());
    }

    #[test]
    fn translate_marks_words_and_passes_unknowns() {
        assert_eq!(translate("sos").as_str(), "... --- ...");
        assert_eq!(translate("A B").as_str(), ".- / -...");
        assert_eq!(translate("A#").as_str(), ".- #");
    }

    #[test]
    fn decode_text_reads_phrases() {
        assert_eq!(decode_text("... --- ... / .- -..."), "SOS AB");
        assert_eq!(decode_text(".- ........"), "A?");
        assert_eq!(decode_text(""), "");
    }
}
