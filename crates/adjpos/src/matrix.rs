//! Adjective/noun co-occurrence matrices, one per age/position partition.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use adjpos_types::Position;
use rayon::prelude::*;
use tracing::debug;

use crate::counts::{AgeBand, AgeSplit, positioned_groups};
use crate::pairing::SENTINEL_NOUNS;
use crate::sentence::TaggedSentence;

pub const DEFAULT_MIN_ADJECTIVE_COUNT: usize = 20;
pub const DEFAULT_MIN_NOUN_COUNT: usize = 5;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Partition {
    All,
    Older,
    Younger,
    OlderPre,
    OlderPost,
    YoungerPre,
    YoungerPost,
}

impl Partition {
    pub const EVERY: [Partition; 7] = [
        Partition::All,
        Partition::Older,
        Partition::Younger,
        Partition::OlderPre,
        Partition::OlderPost,
        Partition::YoungerPre,
        Partition::YoungerPost,
    ];

    /// Suffix used in report file names (`matrix-<name>.csv`).
    pub fn name(self) -> &'static str {
        match self {
            Partition::All => "all",
            Partition::Older => "older",
            Partition::Younger => "younger",
            Partition::OlderPre => "older-pre",
            Partition::OlderPost => "older-post",
            Partition::YoungerPre => "younger-pre",
            Partition::YoungerPost => "younger-post",
        }
    }

    pub fn includes(self, band: AgeBand, position: Position) -> bool {
        match self {
            Partition::All => true,
            Partition::Older => band == AgeBand::Older,
            Partition::Younger => band == AgeBand::Younger,
            Partition::OlderPre => band == AgeBand::Older && position == Position::Prenominal,
            Partition::OlderPost => band == AgeBand::Older && position == Position::Postnominal,
            Partition::YoungerPre => band == AgeBand::Younger && position == Position::Prenominal,
            Partition::YoungerPost => {
                band == AgeBand::Younger && position == Position::Postnominal
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatrixConfig {
    pub min_adjective_count: usize,
    pub min_noun_count: usize,
    pub split: AgeSplit,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            min_adjective_count: DEFAULT_MIN_ADJECTIVE_COUNT,
            min_noun_count: DEFAULT_MIN_NOUN_COUNT,
            split: AgeSplit::default(),
        }
    }
}

/// Adjective and noun lemmas frequent enough to get a row or column.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Vocabulary {
    adjectives: BTreeSet<String>,
    nouns: BTreeSet<String>,
}

impl Vocabulary {
    pub fn new<A, N>(adjectives: A, nouns: N) -> Self
    where
        A: IntoIterator<Item = String>,
        N: IntoIterator<Item = String>,
    {
        Self {
            adjectives: adjectives.into_iter().collect(),
            nouns: nouns
                .into_iter()
                .filter(|n| !SENTINEL_NOUNS.contains(&n.as_str()))
                .collect(),
        }
    }

    /// Keep adjectives seen at least `min_adjective_count` times and nouns
    /// heading at least `min_noun_count` groups.
    pub fn from_sentences<'a, I>(sentences: I, config: &MatrixConfig) -> Self
    where
        I: IntoIterator<Item = &'a TaggedSentence>,
    {
        let mut adjective_counts: HashMap<String, usize> = HashMap::new();
        let mut noun_counts: HashMap<String, usize> = HashMap::new();
        for sentence in sentences {
            for lemma in sentence.adjective_lemmas() {
                *adjective_counts.entry(lemma).or_default() += 1;
            }
            for lemma in sentence.noun_lemmas() {
                *noun_counts.entry(lemma).or_default() += 1;
            }
        }
        let keep = |counts: HashMap<String, usize>, min: usize| {
            counts
                .into_iter()
                .filter(move |(_, count)| *count >= min)
                .map(|(lemma, _)| lemma)
        };
        let vocabulary = Self::new(
            keep(adjective_counts, config.min_adjective_count),
            keep(noun_counts, config.min_noun_count),
        );
        debug!(
            adjectives = vocabulary.adjectives.len(),
            nouns = vocabulary.nouns.len(),
            "reduced matrix vocabulary"
        );
        vocabulary
    }

    pub fn adjectives(&self) -> impl Iterator<Item = &str> + '_ {
        self.adjectives.iter().map(String::as_str)
    }

    pub fn nouns(&self) -> impl Iterator<Item = &str> + '_ {
        self.nouns.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.adjectives.is_empty() || self.nouns.is_empty()
    }
}

/// Counts of adjective lemma next to noun lemma, zero-filled over a vocabulary.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CooccurrenceMatrix {
    cells: BTreeMap<String, BTreeMap<String, usize>>,
}

impl CooccurrenceMatrix {
    pub fn new(vocabulary: &Vocabulary) -> Self {
        let row: BTreeMap<String, usize> = vocabulary.nouns().map(|n| (n.to_string(), 0)).collect();
        Self {
            cells: vocabulary
                .adjectives()
                .map(|a| (a.to_string(), row.clone()))
                .collect(),
        }
    }

    /// Count one pair; pairs outside the vocabulary are ignored.
    pub fn increment(&mut self, adjective: &str, noun: &str) -> bool {
        match self.cells.get_mut(adjective).and_then(|row| row.get_mut(noun)) {
            Some(cell) => {
                *cell += 1;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, adjective: &str, noun: &str) -> usize {
        self.cells
            .get(adjective)
            .and_then(|row| row.get(noun))
            .copied()
            .unwrap_or(0)
    }

    /// Rows in adjective order; each row in noun order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, usize>)> + '_ {
        self.cells.iter().map(|(adj, row)| (adj.as_str(), row))
    }

    pub fn total(&self) -> usize {
        self.cells.values().flat_map(|row| row.values()).sum()
    }

    /// Add another matrix cell by cell.
    pub fn merge(&mut self, other: &CooccurrenceMatrix) {
        for (adjective, row) in &other.cells {
            let target = self.cells.entry(adjective.clone()).or_default();
            for (noun, count) in row {
                *target.entry(noun.clone()).or_default() += count;
            }
        }
    }
}

/// The seven partition matrices of one run, each built independently.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MatrixSet {
    matrices: BTreeMap<Partition, CooccurrenceMatrix>,
}

impl MatrixSet {
    pub fn new(vocabulary: &Vocabulary) -> Self {
        Self {
            matrices: Partition::EVERY
                .into_iter()
                .map(|p| (p, CooccurrenceMatrix::new(vocabulary)))
                .collect(),
        }
    }

    /// Count every (adjective, noun) lemma pair of a sentence.
    pub fn record(&mut self, sentence: &TaggedSentence, split: AgeSplit) {
        let band = split.band(sentence.speaker());
        for (position, group) in positioned_groups(sentence) {
            let Some(noun) = group.noun_lemma() else {
                continue;
            };
            let noun = noun.to_lowercase();
            for adjective in group.adjective_lemmas() {
                let adjective = adjective.to_lowercase();
                for (partition, matrix) in self.matrices.iter_mut() {
                    if partition.includes(band, position) {
                        matrix.increment(&adjective, &noun);
                    }
                }
            }
        }
    }

    pub fn get(&self, partition: Partition) -> &CooccurrenceMatrix {
        // Every partition is inserted at construction.
        &self.matrices[&partition]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Partition, &CooccurrenceMatrix)> + '_ {
        self.matrices.iter().map(|(p, m)| (*p, m))
    }

    pub fn merge(mut self, other: &MatrixSet) -> Self {
        for (partition, matrix) in &other.matrices {
            self.matrices
                .entry(*partition)
                .or_default()
                .merge(matrix);
        }
        self
    }
}

/// Reduce the vocabulary and count every partition over it.
pub fn build_matrices(sentences: &[TaggedSentence], config: &MatrixConfig) -> MatrixSet {
    let vocabulary = Vocabulary::from_sentences(sentences, config);
    count_matrices(sentences, &vocabulary, config.split)
}

/// Count one matrix set per file on the rayon pool, then sum them.
///
/// The vocabulary is reduced over all files first, so the result equals
/// [`build_matrices`] over the concatenated files.
pub fn build_matrices_parallel(files: &[Vec<TaggedSentence>], config: &MatrixConfig) -> MatrixSet {
    let vocabulary = Vocabulary::from_sentences(files.iter().flatten(), config);
    files
        .par_iter()
        .map(|sentences| count_matrices(sentences, &vocabulary, config.split))
        .reduce(|| MatrixSet::new(&vocabulary), |acc, part| acc.merge(&part))
}

fn count_matrices(
    sentences: &[TaggedSentence],
    vocabulary: &Vocabulary,
    split: AgeSplit,
) -> MatrixSet {
    let mut set = MatrixSet::new(vocabulary);
    for sentence in sentences {
        set.record(sentence, split);
    }
    set
}
