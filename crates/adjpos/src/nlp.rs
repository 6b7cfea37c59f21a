//! Tagger interface and the lexicon-backed reference tagger and lemmatizer.

use std::collections::HashMap;
use std::sync::Arc;

use adjpos_lexicon::Lexicon;
use adjpos_morph::{LemmaError, Lemmatizer, Morphology};
use adjpos_types::{Pos, Tag, Token};
use thiserror::Error;

/// Splits text into tagged tokens.
///
/// Implementations are loaded once and shared read-only across a batch.
pub trait Tagger: Send + Sync {
    fn tag(&self, text: &str) -> Result<Vec<Token>, TagError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TagError {
    #[error("no tagger registered for language {0:?}")]
    NoTagger(String),
    #[error("tagger failed on {text:?}: {reason}")]
    Failed { text: String, reason: String },
}

/// Taggers keyed by speaker language.
#[derive(Clone, Default)]
pub struct TaggerRegistry {
    taggers: HashMap<String, Arc<dyn Tagger>>,
}

impl TaggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, language: &str, tagger: Arc<dyn Tagger>) {
        self.taggers.insert(language_key(language), tagger);
    }

    pub fn with(mut self, language: &str, tagger: Arc<dyn Tagger>) -> Self {
        self.register(language, tagger);
        self
    }

    pub fn get(&self, language: &str) -> Result<&dyn Tagger, TagError> {
        self.taggers
            .get(&language_key(language))
            .map(|tagger| tagger.as_ref())
            .ok_or_else(|| TagError::NoTagger(language.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.taggers.is_empty()
    }
}

fn language_key(language: &str) -> String {
    language.trim().to_ascii_lowercase()
}

const LEADING_PUNCT: &[char] = &['(', '«', '"', '[', '¿', '¡'];
const TRAILING_PUNCT: &[char] = &['.', ',', ';', ':', '!', '?', ')', '»', '"', ']', '…'];
const APOSTROPHES: &[char] = &['\'', '’'];

/// Dictionary tagger: each token takes the category of the first lexicon
/// reading of its lower-cased form.
pub struct LexiconTagger {
    lexicon: Arc<Lexicon>,
}

impl LexiconTagger {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    fn tag_word(&self, word: &str) -> Tag {
        if let Some(tag) = self.lexicon.first_tag(word) {
            return tag.clone();
        }
        if word.chars().all(|c| c.is_ascii_punctuation() || TRAILING_PUNCT.contains(&c)) {
            Tag::Punct
        } else {
            Tag::X
        }
    }
}

impl Tagger for LexiconTagger {
    fn tag(&self, text: &str) -> Result<Vec<Token>, TagError> {
        Ok(tokenize(text)
            .into_iter()
            .map(|word| Token::new(word, self.tag_word(word)))
            .collect())
    }
}

/// Whitespace tokenizer that splits off surrounding punctuation and French
/// elisions (`l'enfant` is `l'` + `enfant`). Transcription markers such as
/// `{`, `}` and `::` stay attached to their word.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    for chunk in text.split_whitespace() {
        let mut word = chunk;
        while let Some(c) = word.chars().next()
            && LEADING_PUNCT.contains(&c)
        {
            out.push(&word[..c.len_utf8()]);
            word = &word[c.len_utf8()..];
        }

        let mut trailing = Vec::new();
        while let Some(c) = word.chars().next_back()
            && TRAILING_PUNCT.contains(&c)
            && !word.starts_with("::")
        {
            let split = word.len() - c.len_utf8();
            trailing.push(&word[split..]);
            word = &word[..split];
        }

        while let Some(idx) = word.find(APOSTROPHES) {
            let apostrophe = word[idx..].chars().next().map_or(1, char::len_utf8);
            let end = idx + apostrophe;
            if end >= word.len() {
                break;
            }
            out.push(&word[..end]);
            word = &word[end..];
        }
        if !word.is_empty() {
            out.push(word);
        }
        out.extend(trailing.into_iter().rev());
    }
    out
}

/// Lexicon lookup first, then suffix rules checked against the lexicon,
/// then the lower-cased word itself.
pub struct LexiconLemmatizer {
    lexicon: Arc<Lexicon>,
    morphology: Morphology,
}

impl LexiconLemmatizer {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            lexicon,
            morphology: Morphology::french(),
        }
    }
}

impl Lemmatizer for LexiconLemmatizer {
    fn lemmatize(&self, word: &str, pos: Pos) -> Result<String, LemmaError> {
        let word = word.trim();
        if word.is_empty() {
            return Err(LemmaError::Empty);
        }
        if let Some(lemma) = self.lexicon.lemma_for(pos, word) {
            return Ok(lemma.to_string());
        }
        let exists = |pos, lemma: &str| self.lexicon.lemma_exists(pos, lemma);
        Ok(self
            .morphology
            .lemmas_for(pos, word, exists)
            .into_iter()
            .next()
            .map(|candidate| candidate.lemma)
            .unwrap_or_else(|| word.to_lowercase()))
    }
}
