use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

use adjpos_types::{Tag, Token};

use crate::corpus::CorpusError;
use crate::sentence::TaggedSentence;

/// Sorted, de-duplicated list of words kept in a plain text file, one per line.
///
/// Words are stored lower-cased and lookups ignore case, so a
/// sentence-initial "Noir" matches "noir".
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WordList {
    words: BTreeSet<String>,
}

impl WordList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::new();
        list.extend(words);
        list
    }

    /// Read a list; a missing file is an empty list.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::new()),
            Err(err) => return Err(CorpusError::io(path, err)),
        };
        let mut list = Self::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|err| CorpusError::io(path, err))?;
            list.insert(&line);
        }
        Ok(list)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CorpusError> {
        let path = path.as_ref();
        let file = fs::File::create(path).map_err(|err| CorpusError::io(path, err))?;
        let mut writer = BufWriter::new(file);
        for word in &self.words {
            writeln!(writer, "{word}").map_err(|err| CorpusError::io(path, err))?;
        }
        writer.flush().map_err(|err| CorpusError::io(path, err))
    }

    /// Insert a trimmed, lower-cased word; blank entries are ignored.
    pub fn insert(&mut self, word: &str) -> bool {
        let word = word.trim();
        if word.is_empty() {
            return false;
        }
        self.words.insert(word.to_lowercase())
    }

    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for word in words {
            self.insert(&word.into());
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.words.iter().map(String::as_str)
    }
}

/// Outcome of checking a sentence's adjectives against the word lists.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Classification {
    pub tokens: Vec<Token>,
    pub needs_review: bool,
    /// Adjectives turned into `BAD` because they were blacklisted.
    pub downgraded: usize,
}

/// Blacklisted adjectives become `BAD`; a sentence needs review when any
/// remaining adjective is on neither list.
pub fn classify(tokens: &[Token], whitelist: &WordList, blacklist: &WordList) -> Classification {
    let mut out = tokens.to_vec();
    let mut needs_review = false;
    let mut downgraded = 0;
    for token in out.iter_mut().filter(|t| t.is_adj()) {
        if blacklist.contains(&token.surface) {
            token.tag = Tag::Bad;
            downgraded += 1;
        } else if !whitelist.contains(&token.surface) {
            needs_review = true;
        }
    }
    Classification {
        tokens: out,
        needs_review,
        downgraded,
    }
}

/// Tokens after reviewer marks are applied, plus the words flagged for the
/// blacklist.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BadMarks {
    pub tokens: Vec<Token>,
    pub reported: Vec<String>,
}

/// Apply reviewer marks: `::word` means the tagger was wrong about `word`.
/// Bare `_` and `-` placeholders are also marked, but not reported.
pub fn find_bad(tokens: &[Token]) -> BadMarks {
    let mut reported = Vec::new();
    let tokens = tokens
        .iter()
        .map(|token| {
            if let Some(word) = token.surface.strip_prefix("::") {
                reported.push(word.to_string());
                Token::new(word, Tag::Bad)
            } else if token.surface == "_" || token.surface == "-" {
                Token::new(token.surface.clone(), Tag::Bad)
            } else {
                token.clone()
            }
        })
        .collect();
    BadMarks { tokens, reported }
}

/// Whitelist and blacklist candidates harvested from verified data.
#[derive(Clone, Debug, Default)]
pub struct WordLists {
    pub whitelist: WordList,
    pub blacklist: WordList,
}

/// Harvest list candidates from human-verified sentences.
///
/// Reviewer marks are applied to each sentence first. Adjectives still
/// grouped afterwards are whitelist candidates, marked words are blacklist
/// candidates, and a word that lands in both is kept out of either list.
pub fn build_word_lists<'a, I>(sentences: I) -> WordLists
where
    I: IntoIterator<Item = &'a mut TaggedSentence>,
{
    let mut good = BTreeSet::new();
    let mut bad = BTreeSet::new();
    for sentence in sentences {
        bad.extend(sentence.mark_bad().into_iter().map(|w| w.to_lowercase()));
        good.extend(sentence.adjective_surfaces());
    }

    WordLists {
        whitelist: WordList::from_words(good.difference(&bad).cloned()),
        blacklist: WordList::from_words(bad.difference(&good).cloned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use adjpos_types::{Sex, SpeakerFields, SpeakerProfile};

    fn tok(surface: &str, tag: Tag) -> Token {
        Token::new(surface, tag)
    }

    fn speaker() -> Arc<SpeakerProfile> {
        Arc::new(SpeakerProfile::new(SpeakerFields {
            id: "CHI".into(),
            role: "Target_Child".into(),
            name: "Léa".into(),
            sex: Sex::Female,
            age: None,
            language: "fra".into(),
        }))
    }

    #[test]
    fn blacklisted_adjectives_become_bad() {
        let white = WordList::from_words(["noir"]);
        let black = WordList::from_words(["trop"]);
        let result = classify(
            &[
                tok("chat", Tag::Noun),
                tok("noir", Tag::Adj),
                tok("trop", Tag::Adj),
            ],
            &white,
            &black,
        );
        assert!(!result.needs_review);
        assert_eq!(result.downgraded, 1);
        assert_eq!(result.tokens[2].tag, Tag::Bad);
    }

    #[test]
    fn capitalized_adjectives_match_lower_cased_lists() {
        let white = WordList::from_words(["noir"]);
        let black = WordList::from_words(["grand"]);
        let result = classify(
            &[tok("Noir", Tag::Adj), tok("Grand", Tag::Adj)],
            &white,
            &black,
        );
        assert!(!result.needs_review);
        assert_eq!(result.downgraded, 1);
        assert_eq!(result.tokens[0].tag, Tag::Adj);
        assert_eq!(result.tokens[1], tok("Grand", Tag::Bad));
    }

    #[test]
    fn unknown_adjective_needs_review() {
        let result = classify(
            &[tok("chat", Tag::Noun), tok("gris", Tag::Adj)],
            &WordList::from_words(["noir"]),
            &WordList::new(),
        );
        assert!(result.needs_review);
        assert_eq!(result.downgraded, 0);
    }

    #[test]
    fn sentence_without_adjectives_needs_no_review() {
        let result = classify(&[tok("chat", Tag::Noun)], &WordList::new(), &WordList::new());
        assert!(!result.needs_review);
    }

    #[test]
    fn reviewer_marks() {
        let marks = find_bad(&[
            tok("::petit", Tag::Adj),
            tok("_", Tag::Noun),
            tok("chat", Tag::Noun),
        ]);
        assert_eq!(marks.reported, vec!["petit".to_string()]);
        assert_eq!(marks.tokens[0], tok("petit", Tag::Bad));
        assert_eq!(marks.tokens[1].tag, Tag::Bad);
        assert_eq!(marks.tokens[2].tag, Tag::Noun);
    }

    #[test]
    fn contested_words_go_to_neither_list() {
        let mut sentences = vec![
            TaggedSentence::from_tokens(
                speaker(),
                "chat Noir",
                vec![tok("chat", Tag::Noun), tok("Noir", Tag::Adj)],
            ),
            TaggedSentence::from_tokens(
                speaker(),
                "maison ::noir ::bon",
                vec![
                    tok("maison", Tag::Noun),
                    tok("::noir", Tag::Adj),
                    tok("::bon", Tag::Adj),
                ],
            ),
        ];
        let lists = build_word_lists(&mut sentences);
        assert!(lists.whitelist.is_empty());
        assert_eq!(lists.blacklist.iter().collect::<Vec<_>>(), vec!["bon"]);
        assert!(!sentences[1].has_pair());
    }

    #[test]
    fn word_lists_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whitelist.txt");
        assert!(WordList::load(&path).unwrap().is_empty());

        let list = WordList::from_words(["rouge", " grand ", "", "Rouge", "beau"]);
        list.save(&path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "beau\ngrand\nrouge\n"
        );
        assert_eq!(WordList::load(&path).unwrap(), list);
    }
}
