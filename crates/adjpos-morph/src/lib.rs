//! French morphological helpers for adjective/noun lemmatization.
//!
//! The crate provides three pieces:
//! 1. [`Lemmatizer`], the interface the analysis pipeline calls with a word
//!    and a [`Pos`] hint.
//! 2. [`LemmaOverrides`], a lookup table of irregular or mis-lemmatized forms
//!    consulted before any lemmatizer.
//! 3. [`Morphology`], suffix rules whose candidates are verified through a
//!    caller-provided lemma existence predicate, so the crate stays ignorant
//!    of any concrete lexicon layout.
//!
//! # Example
//! ```no_run
//! use adjpos_lexicon::Lexicon;
//! use adjpos_morph::Morphology;
//! use adjpos_types::Pos;
//!
//! # fn main() -> anyhow::Result<()> {
//! let lex = Lexicon::load("/path/to/lefff-ext.tsv")?;
//! let morph = Morphology::french();
//! let exists = |pos, lemma: &str| lex.lemma_exists(pos, lemma);
//!
//! for cand in morph.lemmas_for(Pos::Adj, "heureuses", exists) {
//!     println!("{:?}: {}", cand.source, cand.lemma);
//! }
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p adjpos-morph --example lookup -- <lexicon> [--demo|<word>]`.

use std::collections::HashSet;

use adjpos_types::Pos;
use thiserror::Error;

mod overrides;

pub use overrides::{LemmaOverrides, Override};

/// Maps a word plus a part-of-speech hint onto its lemma.
///
/// Implementations are loaded once and shared read-only across a batch.
pub trait Lemmatizer: Send + Sync {
    fn lemmatize(&self, word: &str, pos: Pos) -> Result<String, LemmaError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LemmaError {
    #[error("cannot lemmatize an empty word")]
    Empty,
    #[error("lemmatizer failed on {word:?} ({pos}): {reason}")]
    Failed {
        word: String,
        pos: Pos,
        reason: String,
    },
}

/// Where a candidate lemma originated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CandidateSource {
    Surface,
    Rule {
        suffix: &'static str,
        replacement: &'static str,
    },
}

/// A lemma candidate paired with its POS and provenance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LemmaCandidate {
    pub pos: Pos,
    pub lemma: String,
    pub source: CandidateSource,
}

/// Suffix-stripping rules parameterised by caller-provided existence checks.
pub struct Morphology {
    rules: fn(Pos) -> &'static [(&'static str, &'static str)],
}

impl Morphology {
    /// Rules for French inflection (gender and number).
    pub fn french() -> Self {
        Self { rules: french_rules }
    }

    /// Generate lemma candidates for a surface form, most specific first.
    pub fn lemmas_for<F>(&self, pos: Pos, surface: &str, lemma_exists: F) -> Vec<LemmaCandidate>
    where
        F: Fn(Pos, &str) -> bool,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut out = Vec::new();
        let norm_surface = normalize(surface);

        if lemma_exists(pos, &norm_surface) {
            push_unique(
                &mut out,
                &mut seen,
                LemmaCandidate {
                    pos,
                    lemma: norm_surface.clone(),
                    source: CandidateSource::Surface,
                },
            );
        }

        for &(suffix, replacement) in (self.rules)(pos) {
            if let Some(candidate) = apply_rule(&norm_surface, suffix, replacement)
                && lemma_exists(pos, &candidate)
            {
                push_unique(
                    &mut out,
                    &mut seen,
                    LemmaCandidate {
                        pos,
                        lemma: candidate,
                        source: CandidateSource::Rule {
                            suffix,
                            replacement,
                        },
                    },
                );
            }
        }

        out
    }
}

impl Default for Morphology {
    fn default() -> Self {
        Self::french()
    }
}

pub(crate) fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn push_unique(out: &mut Vec<LemmaCandidate>, seen: &mut HashSet<String>, candidate: LemmaCandidate) {
    if seen.insert(candidate.lemma.clone()) {
        out.push(candidate);
    }
}

fn apply_rule(surface: &str, suffix: &str, replacement: &str) -> Option<String> {
    let stem = surface.strip_suffix(suffix)?;
    if stem.is_empty() {
        return None;
    }
    Some(format!("{stem}{replacement}"))
}

fn french_rules(pos: Pos) -> &'static [(&'static str, &'static str)] {
    match pos {
        Pos::Adj => &[
            ("eaux", "eau"),
            ("aux", "al"),
            ("ales", "al"),
            ("ale", "al"),
            ("euses", "eux"),
            ("euse", "eux"),
            ("ives", "if"),
            ("ive", "if"),
            ("ères", "er"),
            ("ère", "er"),
            ("ettes", "et"),
            ("ette", "et"),
            ("ennes", "en"),
            ("enne", "en"),
            ("elles", "el"),
            ("elle", "el"),
            ("onnes", "on"),
            ("onne", "on"),
            ("sses", "s"),
            ("sse", "s"),
            ("es", ""),
            ("s", ""),
            ("e", ""),
            ("x", ""),
        ],
        Pos::Noun => &[("eaux", "eau"), ("aux", "al"), ("s", ""), ("x", "")],
        Pos::Verb => &[
            ("ées", "er"),
            ("ée", "er"),
            ("és", "er"),
            ("é", "er"),
            ("ies", "ir"),
            ("ie", "ir"),
            ("is", "ir"),
            ("i", "ir"),
        ],
        Pos::Adv => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_exists(targets: &[(&str, Pos)]) -> impl Fn(Pos, &str) -> bool {
        let set: HashSet<(Pos, String)> = targets
            .iter()
            .map(|(lemma, pos)| (*pos, normalize(lemma)))
            .collect();
        move |pos, lemma| set.contains(&(pos, normalize(lemma)))
    }

    #[test]
    fn strips_feminine_plural() {
        let morph = Morphology::french();
        let candidates =
            morph.lemmas_for(Pos::Adj, "heureuses", fake_exists(&[("heureux", Pos::Adj)]));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].lemma, "heureux");
        assert!(matches!(
            candidates[0].source,
            CandidateSource::Rule { suffix: "euses", .. }
        ));
    }

    #[test]
    fn surface_comes_first() {
        let morph = Morphology::french();
        let candidates = morph.lemmas_for(
            Pos::Adj,
            "Grande",
            fake_exists(&[("grande", Pos::Adj), ("grand", Pos::Adj)]),
        );
        assert_eq!(candidates.len(), 2);
        assert!(matches!(candidates[0].source, CandidateSource::Surface));
        assert_eq!(candidates[1].lemma, "grand");
    }

    #[test]
    fn unverified_candidates_are_dropped() {
        let morph = Morphology::french();
        assert!(morph.lemmas_for(Pos::Noun, "chevaux", fake_exists(&[])).is_empty());
        let candidates =
            morph.lemmas_for(Pos::Noun, "chevaux", fake_exists(&[("cheval", Pos::Noun)]));
        assert_eq!(candidates[0].lemma, "cheval");
    }

    #[test]
    fn whole_word_suffixes_do_not_apply() {
        assert_eq!(apply_rule("s", "s", ""), None);
        assert_eq!(apply_rule("noirs", "s", ""), Some("noir".into()));
    }
}
