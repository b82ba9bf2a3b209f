use crate::error::StoreResult;
use include_dir::{include_dir, Dir};
use serde::Deserialize;
use std::io;

static LANG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lang");

#[allow(dead_code)]
#[derive(Deserialize, Clone, Debug)]
struct WordList {
    name: String,
    size: u32,
    words: Vec<String>,
}

#[allow(dead_code)]
#[derive(Deserialize, Clone, Debug)]
struct QuoteList {
    name: String,
    quotes: Vec<String>,
}

/// Static corpus the engine draws target text from.
#[derive(Clone, Debug, PartialEq)]
pub struct WordBank {
    words: Vec<String>,
    quotes: Vec<String>,
}

impl WordBank {
    pub fn new(words: Vec<String>, quotes: Vec<String>) -> Self {
        Self { words, quotes }
    }

    /// The bundled english word list and quotes.
    pub fn english() -> Self {
        let words: WordList =
            read_embedded("english.json").expect("bundled english.json is valid");
        let quotes: QuoteList =
            read_embedded("quotes.json").expect("bundled quotes.json is valid");
        Self::new(words.words, quotes.quotes)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn quotes(&self) -> &[String] {
        &self.quotes
    }
}

impl Default for WordBank {
    fn default() -> Self {
        Self::english()
    }
}

fn read_embedded<T: for<'de> Deserialize<'de>>(file_name: &str) -> StoreResult<T> {
    let file = LANG_DIR.get_file(file_name).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{file_name} is not bundled"),
        )
    })?;
    let contents = file.contents_utf8().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{file_name} is not utf-8"),
        )
    })?;
    Ok(serde_json::from_str(contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn english_bank_loads() {
        let bank = WordBank::english();
        assert!(bank.words().len() >= 100);
        assert!(!bank.quotes().is_empty());
    }

    #[test]
    fn english_words_are_single_lowercase_tokens() {
        let bank = WordBank::english();
        for word in bank.words() {
            assert!(!word.is_empty());
            assert!(!word.contains(' '), "{word:?} contains a space");
        }
    }

    #[test]
    fn english_words_are_unique() {
        let bank = WordBank::english();
        let unique: HashSet<&String> = bank.words().iter().collect();
        assert_eq!(unique.len(), bank.words().len());
    }

    #[test]
    fn embedded_size_matches_word_count() {
        let list: WordList = read_embedded("english.json").unwrap();
        assert_eq!(list.size as usize, list.words.len());
    }

    #[test]
    fn missing_embedded_file_is_an_error() {
        let result: StoreResult<WordList> = read_embedded("klingon.json");
        assert!(result.is_err());
    }

    #[test]
    fn custom_bank_keeps_order() {
        let bank = WordBank::new(
            vec!["b".into(), "a".into()],
            vec!["Quote one.".into()],
        );
        assert_eq!(bank.words(), ["b".to_string(), "a".to_string()]);
        assert_eq!(bank.quotes().len(), 1);
    }
}
