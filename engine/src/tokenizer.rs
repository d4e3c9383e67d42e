use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)\b\w\w+\b").expect("valid regex");
}

/// How feature text is split into vocabulary terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerMode {
    /// Case-sensitive split on whitespace; punctuation stays attached.
    #[default]
    Whitespace,
    /// NFKC + lowercase, then runs of two or more word characters.
    Word,
}

pub fn tokenize(text: &str, mode: TokenizerMode) -> Vec<String> {
    match mode {
        TokenizerMode::Whitespace => text.split_whitespace().map(str::to_string).collect(),
        TokenizerMode::Word => {
            let normalized = text.nfkc().collect::<String>().to_lowercase();
            WORD.find_iter(&normalized).map(|m| m.as_str().to_string()).collect()
        }
    }
}
