//! Shared value types for adjective position analysis.
//!
//! Tokens come out of a part-of-speech tagger as `(surface, tag)` pairs and
//! are grouped around nouns into prenominal and postnominal [`Group`]s. Every
//! sentence is attributed to a [`SpeakerProfile`], whose [`Age`] drives the
//! age-band partitions used when counting.
//!
//! ```rust
//! use adjpos_types::{Age, Pos, Tag};
//!
//! let pos = Pos::from_char('a').unwrap();
//! assert_eq!(pos, Pos::Adj);
//! assert_eq!(Tag::parse("NOM"), Tag::Noun);
//! let age: Age = "P7Y6M".parse().unwrap();
//! assert!((age.decimal - 7.5).abs() < 1e-9);
//! ```

use std::fmt;

mod age;
mod speaker;

pub use age::{Age, AgeParseError};
pub use speaker::{ADULT_AGE, Sex, SpeakerFields, SpeakerProfile};

/// Part-of-speech hint handed to a lemmatizer (`n`, `v`, `a`, `r`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Pos {
    Noun,
    Verb,
    Adj,
    Adv,
}

impl Pos {
    /// Parse a lemmatizer POS character into an enum.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'n' => Some(Pos::Noun),
            'v' => Some(Pos::Verb),
            'a' | 's' => Some(Pos::Adj),
            'r' => Some(Pos::Adv),
            _ => None,
        }
    }

    /// Emit the POS character expected by lemmatizers.
    pub fn to_char(self) -> char {
        match self {
            Pos::Noun => 'n',
            Pos::Verb => 'v',
            Pos::Adj => 'a',
            Pos::Adv => 'r',
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pos::Noun => "noun",
            Pos::Verb => "verb",
            Pos::Adj => "adj",
            Pos::Adv => "adv",
        })
    }
}

/// Universal part-of-speech tag attached to a token, plus the `BAD` marker
/// used by sanitation and review.
///
/// Tags the parser does not know are kept verbatim in [`Tag::Other`].
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Tag {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
    Bad,
    Other(String),
}

impl Tag {
    /// Parse a tag as written by the tagger or a corpus file.
    ///
    /// ORFEO's `NOM` and `PCT` map onto `NOUN` and `PUNCT`. The mapping is
    /// one-way: saved data always carries the universal name, so a reloaded
    /// ORFEO sentence reads `NOUN` where the corpus said `NOM`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "ADJ" => Tag::Adj,
            "ADP" => Tag::Adp,
            "ADV" => Tag::Adv,
            "AUX" => Tag::Aux,
            "CCONJ" => Tag::Cconj,
            "DET" => Tag::Det,
            "INTJ" => Tag::Intj,
            "NOUN" | "NOM" => Tag::Noun,
            "NUM" => Tag::Num,
            "PART" => Tag::Part,
            "PRON" => Tag::Pron,
            "PROPN" => Tag::Propn,
            "PUNCT" | "PCT" => Tag::Punct,
            "SCONJ" => Tag::Sconj,
            "SYM" => Tag::Sym,
            "VERB" => Tag::Verb,
            "X" => Tag::X,
            "BAD" => Tag::Bad,
            other => Tag::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Tag::Adj => "ADJ",
            Tag::Adp => "ADP",
            Tag::Adv => "ADV",
            Tag::Aux => "AUX",
            Tag::Cconj => "CCONJ",
            Tag::Det => "DET",
            Tag::Intj => "INTJ",
            Tag::Noun => "NOUN",
            Tag::Num => "NUM",
            Tag::Part => "PART",
            Tag::Pron => "PRON",
            Tag::Propn => "PROPN",
            Tag::Punct => "PUNCT",
            Tag::Sconj => "SCONJ",
            Tag::Sym => "SYM",
            Tag::Verb => "VERB",
            Tag::X => "X",
            Tag::Bad => "BAD",
            Tag::Other(raw) => raw.as_str(),
        }
    }

    /// Lemmatizer hint for tags that carry one.
    pub fn pos(&self) -> Option<Pos> {
        match self {
            Tag::Noun => Some(Pos::Noun),
            Tag::Verb | Tag::Aux => Some(Pos::Verb),
            Tag::Adj => Some(Pos::Adj),
            Tag::Adv => Some(Pos::Adv),
            _ => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A surface form and the tag the tagger (or a repair pass) gave it.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Token {
    pub surface: String,
    pub tag: Tag,
}

impl Token {
    pub fn new(surface: impl Into<String>, tag: Tag) -> Self {
        Self {
            surface: surface.into(),
            tag,
        }
    }

    pub fn is_noun(&self) -> bool {
        self.tag == Tag::Noun
    }

    pub fn is_adj(&self) -> bool {
        self.tag == Tag::Adj
    }
}

/// Side of the noun an adjective run was found on.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Position {
    Prenominal,
    Postnominal,
}

impl Position {
    pub fn as_str(self) -> &'static str {
        match self {
            Position::Prenominal => "prenominal",
            Position::Postnominal => "postnominal",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An adjective surface and, once normalized, its lemma.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Adjective {
    pub surface: String,
    pub lemma: Option<String>,
}

impl Adjective {
    pub fn new(surface: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            lemma: None,
        }
    }

    pub fn with_lemma(surface: impl Into<String>, lemma: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            lemma: Some(lemma.into()),
        }
    }
}

/// A noun with the contiguous adjectives found on one side of it.
///
/// Adjectives are stored closest-to-noun first. A group always holds at
/// least one adjective; the constructors return `None` for empty runs.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Group {
    noun: String,
    noun_lemma: Option<String>,
    adjectives: Vec<Adjective>,
}

impl Group {
    /// Build an unnormalized group from raw adjective surfaces.
    pub fn new<I, S>(noun: impl Into<String>, adjectives: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let adjectives: Vec<Adjective> = adjectives.into_iter().map(Adjective::new).collect();
        Self::with_lemmas(noun, None, adjectives)
    }

    /// Build a group from already (possibly) normalized parts.
    pub fn with_lemmas(
        noun: impl Into<String>,
        noun_lemma: Option<String>,
        adjectives: Vec<Adjective>,
    ) -> Option<Self> {
        if adjectives.is_empty() {
            return None;
        }
        Some(Self {
            noun: noun.into(),
            noun_lemma,
            adjectives,
        })
    }

    pub fn noun(&self) -> &str {
        &self.noun
    }

    pub fn noun_lemma(&self) -> Option<&str> {
        self.noun_lemma.as_deref()
    }

    /// Adjectives closest-to-noun first.
    pub fn adjectives(&self) -> &[Adjective] {
        &self.adjectives
    }

    /// True once the noun and every adjective carry a lemma.
    pub fn is_normalized(&self) -> bool {
        self.noun_lemma.is_some() && self.adjectives.iter().all(|a| a.lemma.is_some())
    }

    /// Adjective lemmas, skipping adjectives that were never normalized.
    pub fn adjective_lemmas(&self) -> impl Iterator<Item = &str> + '_ {
        self.adjectives.iter().filter_map(|a| a.lemma.as_deref())
    }

    /// Adjectives in the order they were spoken.
    pub fn surface_order(&self, position: Position) -> Vec<&Adjective> {
        match position {
            Position::Prenominal => self.adjectives.iter().rev().collect(),
            Position::Postnominal => self.adjectives.iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pos_chars_round_trip() {
        for pos in [Pos::Noun, Pos::Verb, Pos::Adj, Pos::Adv] {
            assert_eq!(Pos::from_char(pos.to_char()), Some(pos));
        }
        assert_eq!(Pos::from_char('s'), Some(Pos::Adj));
        assert_eq!(Pos::from_char('x'), None);
    }

    #[test]
    fn unknown_tags_are_kept_verbatim() {
        assert_eq!(Tag::parse("ADJ"), Tag::Adj);
        assert_eq!(Tag::parse("PCT"), Tag::Punct);
        let odd = Tag::parse("SPACE");
        assert_eq!(odd, Tag::Other("SPACE".into()));
        assert_eq!(odd.as_str(), "SPACE");
        assert_eq!(Tag::Bad.to_string(), "BAD");
    }

    #[test]
    fn orfeo_aliases_are_saved_under_universal_names() {
        assert_eq!(Tag::parse("NOM").as_str(), "NOUN");
        assert_eq!(Tag::parse(" PCT ").as_str(), "PUNCT");
        assert_eq!(Tag::parse(Tag::parse("NOM").as_str()), Tag::Noun);
    }

    #[test]
    fn empty_runs_never_become_groups() {
        assert!(Group::new("chat", Vec::<String>::new()).is_none());
        let group = Group::new("chat", ["beau", "grand"]).unwrap();
        assert_eq!(group.noun(), "chat");
        assert!(!group.is_normalized());
        let spoken: Vec<&str> = group
            .surface_order(Position::Prenominal)
            .iter()
            .map(|a| a.surface.as_str())
            .collect();
        assert_eq!(spoken, vec!["grand", "beau"]);
    }

    #[test]
    fn normalized_groups_expose_lemmas() {
        let group = Group::with_lemmas(
            "chats",
            Some("chat".into()),
            vec![Adjective::with_lemma("noirs", "noir")],
        )
        .unwrap();
        assert!(group.is_normalized());
        assert_eq!(group.adjective_lemmas().collect::<Vec<_>>(), vec!["noir"]);
    }
}
