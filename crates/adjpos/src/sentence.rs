use std::sync::Arc;

use adjpos_morph::LemmaError;
use adjpos_types::{Group, Position, SpeakerProfile, Tag, Token};

use crate::nlp::{TagError, Tagger};
use crate::normalize::LemmaNormalizer;
use crate::pairing::{Groups, SENTINEL_NOUNS, find_groups};
use crate::review::{WordList, classify, find_bad};
use crate::sanitize::{render_text, sanitize};

/// One utterance with its tags and the noun/adjective groups derived from them.
///
/// Tokens are only changed through methods that re-derive the groups at
/// once, so `has_pair` always reflects the current tokens.
#[derive(Clone, Debug, PartialEq)]
pub struct TaggedSentence {
    text: String,
    speaker: Arc<SpeakerProfile>,
    tokens: Vec<Token>,
    groups: Groups,
    needs_review: bool,
}

impl TaggedSentence {
    /// Build from tokens that came with the corpus.
    pub fn from_tokens(
        speaker: Arc<SpeakerProfile>,
        text: impl Into<String>,
        tokens: Vec<Token>,
    ) -> Self {
        let groups = find_groups(&tokens);
        Self {
            text: text.into().trim().to_string(),
            speaker,
            tokens,
            groups,
            needs_review: true,
        }
    }

    /// Tag raw text and build the sentence from the result.
    pub fn from_text(
        speaker: Arc<SpeakerProfile>,
        text: &str,
        tagger: &dyn Tagger,
    ) -> Result<Self, TagError> {
        let tokens = tagger.tag(text)?;
        Ok(Self::from_tokens(speaker, text, tokens))
    }

    /// Rebuild a persisted sentence, keeping its stored (possibly lemmatized)
    /// groups.
    pub fn restore(
        speaker: Arc<SpeakerProfile>,
        text: impl Into<String>,
        tokens: Vec<Token>,
        groups: Groups,
    ) -> Self {
        Self {
            text: text.into(),
            speaker,
            tokens,
            groups,
            needs_review: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn speaker(&self) -> &SpeakerProfile {
        &self.speaker
    }

    pub fn speaker_arc(&self) -> &Arc<SpeakerProfile> {
        &self.speaker
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn groups(&self) -> &Groups {
        &self.groups
    }

    pub fn prenominal(&self) -> &[Group] {
        &self.groups.prenominal
    }

    pub fn postnominal(&self) -> &[Group] {
        &self.groups.postnominal
    }

    pub fn has_pair(&self) -> bool {
        !self.groups.is_empty()
    }

    pub fn needs_review(&self) -> bool {
        self.needs_review
    }

    /// Re-run pairing on the current tokens, discarding any lemmas.
    pub fn regroup(&mut self) {
        self.groups = find_groups(&self.tokens);
    }

    /// Clean the tokens, rebuild the text and re-pair.
    pub fn sanitize(&mut self, nonwords: &WordList) {
        self.tokens = sanitize(&self.tokens, nonwords);
        self.text = render_text(&self.tokens);
        self.regroup();
    }

    /// Apply the word lists; returns how many adjectives were blacklisted.
    pub fn review(&mut self, whitelist: &WordList, blacklist: &WordList) -> usize {
        let result = classify(&self.tokens, whitelist, blacklist);
        self.tokens = result.tokens;
        self.needs_review = result.needs_review;
        self.regroup();
        result.downgraded
    }

    /// Apply reviewer `::` marks and return the marked words.
    pub fn mark_bad(&mut self) -> Vec<String> {
        let marks = find_bad(&self.tokens);
        self.tokens = marks.tokens;
        self.regroup();
        marks.reported
    }

    /// Attach lemmas to every group. On error the sentence is left unchanged.
    pub fn lemmatize(&mut self, normalizer: &LemmaNormalizer) -> Result<(), LemmaError> {
        let normalize = |groups: &[Group]| {
            groups
                .iter()
                .map(|g| normalizer.normalize_group(g))
                .collect::<Result<Vec<_>, _>>()
        };
        let prenominal = normalize(&self.groups.prenominal[..])?;
        let postnominal = normalize(&self.groups.postnominal[..])?;
        self.groups = Groups {
            prenominal,
            postnominal,
        };
        Ok(())
    }

    /// Lower-cased adjective surfaces across both positions.
    pub fn adjective_surfaces(&self) -> impl Iterator<Item = String> + '_ {
        self.all_groups()
            .flat_map(|g| g.adjectives())
            .map(|a| a.surface.to_lowercase())
    }

    /// Lower-cased adjective lemmas across both positions.
    pub fn adjective_lemmas(&self) -> impl Iterator<Item = String> + '_ {
        self.all_groups()
            .flat_map(|g| g.adjective_lemmas())
            .map(str::to_lowercase)
    }

    /// Lower-cased adjective lemmas found on one side of their nouns.
    pub fn lemmas_at(&self, position: Position) -> impl Iterator<Item = String> + '_ {
        self.groups
            .at(position)
            .iter()
            .flat_map(|g| g.adjective_lemmas())
            .map(str::to_lowercase)
    }

    /// Lower-cased noun lemmas, skipping the `<`/`>` placeholders.
    pub fn noun_lemmas(&self) -> impl Iterator<Item = String> + '_ {
        self.all_groups()
            .filter_map(|g| g.noun_lemma())
            .filter(|lemma| !SENTINEL_NOUNS.contains(lemma))
            .map(str::to_lowercase)
    }

    /// Number of spoken words: tokens that are neither punctuation nor `BAD`.
    pub fn word_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| !matches!(t.tag, Tag::Punct | Tag::Bad))
            .count()
    }

    fn all_groups(&self) -> impl Iterator<Item = &Group> + '_ {
        self.groups
            .prenominal
            .iter()
            .chain(self.groups.postnominal.iter())
    }
}
