//! # Script-Switch Codec
//!
//! The bit-packing loop embeds exactly one byte per character, which only
//! works for codepoints up to `0xFF`. Cyrillic text is therefore bracketed
//! with in-band markers and transliterated into a single-byte Latin
//! alphabet while a foreign run is open:
//!
//! - `@` opens a foreign run, `$` closes it
//! - `×` terminates the message
//!
//! Markers are placed at word boundaries: a word containing any non-ASCII
//! character is foreign, and the marker is emitted only when the run state
//! actually changes.

use log::warn;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::{Result, StegoError};

pub const FOREIGN_START: char = '@';
pub const FOREIGN_END: char = '$';
pub const TERMINATOR: char = '×';

const LATIN: &str = "abcdefghijklmnopqrstuvwxyzÆÇÈÉÊÌÍABCDEFGHIJKLMNOPQRSTUVWXYZÎÏÐÑÒÓÔ";
const CYRILLIC: &str = "абвгдеёжзийклмнопрстуфхцчшщъыьэюяАБВГДЕЁЖЗИЙКЛМНОПРСТУФХЦЧШЩЪЫЬЭЮЯ";

/// Which alphabet the current run of characters belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptState {
    #[default]
    Latin,
    Foreign,
}

/// Two-way mapping between the single-byte Latin alphabet and Cyrillic.
#[derive(Debug)]
pub struct TransliterationTable {
    latin_to_cyrillic: HashMap<char, char>,
    cyrillic_to_latin: HashMap<char, char>,
}

impl TransliterationTable {
    fn build(latin: &str, cyrillic: &str) -> Self {
        let mut latin_to_cyrillic = HashMap::new();
        let mut cyrillic_to_latin = HashMap::new();
        for (l, c) in latin.chars().zip(cyrillic.chars()) {
            latin_to_cyrillic.insert(l, c);
            cyrillic_to_latin.insert(c, l);
        }
        Self {
            latin_to_cyrillic,
            cyrillic_to_latin,
        }
    }

    /// Process-wide table, built on first use and never mutated.
    pub fn global() -> &'static TransliterationTable {
        static TABLE: OnceLock<TransliterationTable> = OnceLock::new();
        TABLE.get_or_init(|| TransliterationTable::build(LATIN, CYRILLIC))
    }

    /// Cyrillic → Latin, identity for anything outside the table.
    pub fn to_latin(&self, ch: char) -> char {
        self.cyrillic_to_latin.get(&ch).copied().unwrap_or(ch)
    }

    /// Latin → Cyrillic, identity for anything outside the table.
    pub fn to_cyrillic(&self, ch: char) -> char {
        self.latin_to_cyrillic.get(&ch).copied().unwrap_or(ch)
    }

    pub fn len(&self) -> usize {
        self.latin_to_cyrillic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latin_to_cyrillic.is_empty()
    }
}

/// A message with script markers inserted and the terminator appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMessage(String);

impl EncodedMessage {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in UTF-8 bytes, the quantity the capacity check is based on.
    pub fn byte_len(&self) -> usize {
        self.0.len()
    }

    /// Characters as they are packed into the carrier: markers kept,
    /// foreign runs transliterated to the single-byte alphabet.
    pub fn embedded_chars(&self) -> impl Iterator<Item = char> + '_ {
        let table = TransliterationTable::global();
        let mut state = ScriptState::Latin;
        self.0.chars().map(move |ch| {
            match ch {
                FOREIGN_START => state = ScriptState::Foreign,
                FOREIGN_END => state = ScriptState::Latin,
                _ => {}
            }
            match state {
                ScriptState::Foreign => table.to_latin(ch),
                ScriptState::Latin => ch,
            }
        })
    }

    /// Single bytes written into the carrier, one per embedded character.
    pub fn embedded_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.embedded_chars().map(|ch| {
            let code = u32::from(ch);
            if code > 0xFF {
                warn!(
                    "character {:?} does not fit in one byte, only its low byte is embedded",
                    ch
                );
            }
            (code & 0xFF) as u8
        })
    }
}

/// Rejects messages that contain a marker or the terminator as content.
///
/// Characters wider than one byte after transliteration are embedded as
/// their low byte only, so a character whose low byte equals a marker or the
/// terminator is rejected too.
///
/// # Errors
/// - [`StegoError::ReservedCharacter`] for a literal `@`, `$` or `×`
/// - [`StegoError::CollidingCharacter`] for a wide character that would embed
///   as one of them
pub fn check_reserved(message: &str) -> Result<()> {
    let table = TransliterationTable::global();
    for (index, ch) in message.chars().enumerate() {
        if matches!(ch, FOREIGN_START | FOREIGN_END | TERMINATOR) {
            return Err(StegoError::ReservedCharacter { ch, index });
        }
        let code = u32::from(table.to_latin(ch));
        if code > 0xFF {
            let byte = (code & 0xFF) as u8;
            if is_reserved_byte(byte) {
                return Err(StegoError::CollidingCharacter { ch, index, byte });
            }
        }
    }
    Ok(())
}

fn is_reserved_byte(byte: u8) -> bool {
    [FOREIGN_START, FOREIGN_END, TERMINATOR]
        .iter()
        .any(|&reserved| u32::from(reserved) == u32::from(byte))
}

/// Inserts script markers at word boundaries and appends the terminator.
///
/// Whitespace is normalized: words are rejoined with single spaces.
pub fn preprocess(message: &str) -> EncodedMessage {
    let mut state = ScriptState::Latin;
    let mut words = Vec::new();

    for word in message.split_whitespace() {
        let foreign = !word.is_ascii();
        let marker = match (state, foreign) {
            (ScriptState::Latin, true) => {
                state = ScriptState::Foreign;
                Some(FOREIGN_START)
            }
            (ScriptState::Foreign, false) => {
                state = ScriptState::Latin;
                Some(FOREIGN_END)
            }
            _ => None,
        };
        match marker {
            Some(m) => words.push(format!("{m}{word}")),
            None => words.push(word.to_string()),
        }
    }

    let mut encoded = words.join(" ");
    encoded.push(TERMINATOR);
    EncodedMessage(encoded)
}

/// What a [`ScriptDecoder`] did with a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Done,
}

/// Incremental inverse of the embedding transform.
///
/// Characters are fed one at a time as they are extracted; markers switch the
/// state and are dropped, the terminator ends the message.
#[derive(Debug, Default)]
pub struct ScriptDecoder {
    state: ScriptState,
    message: String,
}

impl ScriptDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ch: char) -> Step {
        match ch {
            TERMINATOR => return Step::Done,
            FOREIGN_START => self.state = ScriptState::Foreign,
            FOREIGN_END => self.state = ScriptState::Latin,
            _ => {
                let ch = match self.state {
                    ScriptState::Foreign => TransliterationTable::global().to_cyrillic(ch),
                    ScriptState::Latin => ch,
                };
                self.message.push(ch);
            }
        }
        Step::Continue
    }

    pub fn state(&self) -> ScriptState {
        self.state
    }

    pub fn into_message(self) -> String {
        self.message
    }
}

/// Strips markers and the terminator from `text`, reversing the
/// transliteration inside foreign runs. Stops at the first terminator.
pub fn postprocess(text: &str) -> String {
    let mut decoder = ScriptDecoder::new();
    for ch in text.chars() {
        if decoder.push(ch) == Step::Done {
            break;
        }
    }
    decoder.into_message()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_bijective() {
        let table = TransliterationTable::global();
        assert_eq!(table.len(), 66);
        for c in CYRILLIC.chars() {
            let l = table.to_latin(c);
            assert!(u32::from(l) <= 0xFF);
            assert_eq!(table.to_cyrillic(l), c);
        }
    }

    #[test]
    fn test_reserved_chars_outside_table() {
        let table = TransliterationTable::global();
        for ch in [FOREIGN_START, FOREIGN_END, TERMINATOR] {
            assert_eq!(table.to_latin(ch), ch);
            assert_eq!(table.to_cyrillic(ch), ch);
        }
    }

    #[test]
    fn test_preprocess_mixed() {
        assert_eq!(preprocess("cat кот").as_str(), "cat @кот×");
        assert_eq!(
            preprocess("hello I love OOP Я люблю ооп").as_str(),
            "hello I love OOP @Я люблю ооп×"
        );
        assert_eq!(
            preprocess("кот и cat и пёс").as_str(),
            "@кот и $cat @и пёс×"
        );
    }

    #[test]
    fn test_preprocess_ascii_only() {
        assert_eq!(preprocess("hi").as_str(), "hi×");
        assert_eq!(preprocess("  spaced   out ").as_str(), "spaced out×");
        assert_eq!(preprocess("").as_str(), "×");
    }

    #[test]
    fn test_embedded_chars_are_single_byte() {
        let encoded = preprocess("cat кот");
        let embedded: String = encoded.embedded_chars().collect();
        assert_eq!(embedded, "cat @lpt×");
        assert!(encoded.embedded_bytes().count() == embedded.chars().count());
    }

    #[test]
    fn test_postprocess_inverts_preprocess() {
        for m in ["cat кот", "Привет, мир! hello", "один два three four пять", "plain"] {
            assert_eq!(postprocess(preprocess(m).as_str()), m);
            let embedded: String = preprocess(m).embedded_chars().collect();
            assert_eq!(postprocess(&embedded), m);
        }
    }

    #[test]
    fn test_check_reserved() {
        assert!(check_reserved("plain text кот").is_ok());
        assert!(matches!(
            check_reserved("mail me@home"),
            Err(StegoError::ReservedCharacter { ch: '@', index: 7 })
        ));
        assert!(matches!(
            check_reserved("5×5"),
            Err(StegoError::ReservedCharacter { ch: '×', index: 1 })
        ));
    }

    #[test]
    fn test_check_colliding_wide_characters() {
        // U+05D7 embeds as 0xD7, the terminator
        assert!(matches!(
            check_reserved("шалом חי мир"),
            Err(StegoError::CollidingCharacter { ch: 'ח', index: 6, byte: 0xD7 })
        ));
        // U+0124 embeds as 0x24, the run-closing marker
        assert!(matches!(
            check_reserved("Ĥкот"),
            Err(StegoError::CollidingCharacter { ch: 'Ĥ', index: 0, byte: 0x24 })
        ));
        // U+0140 embeds as 0x40, the run-opening marker
        assert!(matches!(
            check_reserved("aŀb"),
            Err(StegoError::CollidingCharacter { ch: 'ŀ', index: 1, byte: 0x40 })
        ));
        // wide but harmless low byte: still accepted, degraded on decode
        assert!(check_reserved("цена €5").is_ok());
    }

    #[test]
    fn test_mixed_script_word_loses_ascii_letters() {
        let encoded = preprocess("OOPкот");
        assert_eq!(encoded.as_str(), "@OOPкот×");
        let embedded: String = encoded.embedded_chars().collect();
        assert_eq!(embedded, "@OOPlpt×");
        // the whole word is decoded as Cyrillic, so the Latin letters are remapped
        assert_eq!(postprocess(&embedded), "ННОкот");
    }

    #[test]
    fn test_unmapped_passes_through() {
        let embedded: String = preprocess("naïve").embedded_chars().collect();
        assert_eq!(embedded, "@naïve×");
    }
}
