//! Recovery phrases over the BIP39 word lists
//!
//! Bytes are streamed through an accumulator 8 bits in and 11 bits out,
//! independent of byte alignment. No BIP39 checksum word is involved.
//!
//! Two fixed profiles exist:
//! - 24 words <-> 33 bytes (network byte ++ 32-byte V1 core), English only
//! - 12 words <-> 17 bytes (V2 seed, trailing low nibble zero), English or
//!   Traditional Chinese

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const V1_PHRASE_WORDS: usize = 24;
pub const V1_PHRASE_BYTES: usize = 33;
pub const V2_PHRASE_WORDS: usize = 12;
pub const V2_PHRASE_BYTES: usize = 17;

const WORD_BITS: u32 = 11;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MnemonicError {
    #[error("invalid word: {0:?}")]
    InvalidWord(String),
    #[error("invalid word count: expected {expected}, got {actual}")]
    InvalidWordCount { expected: usize, actual: usize },
    #[error("invalid input length: expected {expected} bytes, got {actual}")]
    InvalidInputLength { expected: usize, actual: usize },
    #[error("phrase does not decode to a whole seed")]
    InvalidPhrase,
    #[error("language not supported: {0}")]
    LanguageNotSupported(Language),
    #[error("unknown language: {0}")]
    UnknownLanguage(String),
}

/// Dictionary a phrase is presented in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Language {
    #[default]
    English,
    TraditionalChinese,
}

impl Language {
    fn word_list(self) -> &'static [&'static str; 2048] {
        match self {
            Language::English => bip39::Language::English.word_list(),
            Language::TraditionalChinese => bip39::Language::TraditionalChinese.word_list(),
        }
    }

    fn index_of(self, word: &str) -> Option<u32> {
        self.word_list()
            .iter()
            .position(|candidate| *candidate == word)
            .map(|i| i as u32)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "en"),
            Language::TraditionalChinese => write!(f, "zh-tw"),
        }
    }
}

impl FromStr for Language {
    type Err = MnemonicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "en-us" | "english" => Ok(Language::English),
            "zh-tw" | "zh-hant" | "traditional-chinese" => Ok(Language::TraditionalChinese),
            other => Err(MnemonicError::UnknownLanguage(other.to_string())),
        }
    }
}

/// Split a space separated phrase into words
pub fn split_phrase(phrase: &str) -> Vec<&str> {
    phrase.split_whitespace().collect()
}

fn mask(bits: u32) -> u32 {
    (1 << bits) - 1
}

fn bytes_to_words(input: &[u8], language: Language) -> Vec<String> {
    let dict = language.word_list();
    let mut words = Vec::with_capacity(input.len() * 8 / WORD_BITS as usize);
    let mut accumulator: u32 = 0;
    let mut bits: u32 = 0;
    for byte in input {
        accumulator = (accumulator << 8) | *byte as u32;
        bits += 8;
        if bits >= WORD_BITS {
            bits -= WORD_BITS;
            let index = accumulator >> bits;
            accumulator &= mask(bits);
            words.push(dict[index as usize].to_string());
        }
    }
    words
}

/// Returns the emitted bytes along with the leftover bits and their count
fn words_to_bytes<S: AsRef<str>>(
    words: &[S],
    language: Language,
) -> Result<(Vec<u8>, u32, u32), MnemonicError> {
    let mut out = Vec::with_capacity(words.len() * WORD_BITS as usize / 8 + 1);
    let mut remainder: u32 = 0;
    let mut bits: u32 = 0;
    for word in words {
        let word = word.as_ref();
        let index = language
            .index_of(word)
            .ok_or_else(|| MnemonicError::InvalidWord(word.to_string()))?;
        remainder = (remainder << WORD_BITS) | index;
        bits += WORD_BITS;
        while bits >= 8 {
            out.push((remainder >> (bits - 8)) as u8);
            bits -= 8;
        }
        remainder &= mask(bits);
    }
    Ok((out, remainder, bits))
}

/// Encode 33 bytes (network byte ++ V1 core) as 24 English words
pub fn bytes_to_twenty_four_words(
    input: &[u8],
    language: Language,
) -> Result<Vec<String>, MnemonicError> {
    if language != Language::English {
        return Err(MnemonicError::LanguageNotSupported(language));
    }
    if input.len() != V1_PHRASE_BYTES {
        return Err(MnemonicError::InvalidInputLength {
            expected: V1_PHRASE_BYTES,
            actual: input.len(),
        });
    }
    Ok(bytes_to_words(input, language))
}

/// Decode 24 English words back into 33 bytes
pub fn twenty_four_words_to_bytes<S: AsRef<str>>(
    words: &[S],
    language: Language,
) -> Result<[u8; V1_PHRASE_BYTES], MnemonicError> {
    if language != Language::English {
        return Err(MnemonicError::LanguageNotSupported(language));
    }
    if words.len() != V1_PHRASE_WORDS {
        return Err(MnemonicError::InvalidWordCount {
            expected: V1_PHRASE_WORDS,
            actual: words.len(),
        });
    }
    let (bytes, _, bits) = words_to_bytes(words, language)?;
    if bits != 0 || bytes.len() != V1_PHRASE_BYTES {
        return Err(MnemonicError::InvalidPhrase);
    }
    let mut out = [0u8; V1_PHRASE_BYTES];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Encode a 17-byte V2 seed as 12 words; the trailing zero nibble is dropped
pub fn bytes_to_twelve_words(
    input: &[u8],
    language: Language,
) -> Result<Vec<String>, MnemonicError> {
    if input.len() != V2_PHRASE_BYTES {
        return Err(MnemonicError::InvalidInputLength {
            expected: V2_PHRASE_BYTES,
            actual: input.len(),
        });
    }
    Ok(bytes_to_words(input, language))
}

/// Decode 12 words into a 17-byte V2 seed
///
/// The phrase carries 132 bits: 16 whole bytes plus a final nibble, which
/// is justified into the high half of the last byte.
pub fn twelve_words_to_bytes<S: AsRef<str>>(
    words: &[S],
    language: Language,
) -> Result<[u8; V2_PHRASE_BYTES], MnemonicError> {
    if words.len() != V2_PHRASE_WORDS {
        return Err(MnemonicError::InvalidWordCount {
            expected: V2_PHRASE_WORDS,
            actual: words.len(),
        });
    }
    let (bytes, remainder, bits) = words_to_bytes(words, language)?;
    if bits != 4 || bytes.len() != V2_PHRASE_BYTES - 1 {
        return Err(MnemonicError::InvalidPhrase);
    }
    let mut out = [0u8; V2_PHRASE_BYTES];
    out[..V2_PHRASE_BYTES - 1].copy_from_slice(&bytes);
    out[V2_PHRASE_BYTES - 1] = (remainder << 4) as u8;
    Ok(out)
}
