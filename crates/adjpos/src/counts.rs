use std::collections::{BTreeSet, HashMap};

use adjpos_types::{Group, Position, SpeakerProfile};

use crate::sentence::TaggedSentence;

/// Age in years separating older from younger speakers in every report.
pub const DEFAULT_AGE_THRESHOLD: f64 = 8.0;

pub const COLOR_LEMMAS: &[&str] = &[
    "vert", "bleu", "blanc", "jaune", "rose", "noir", "rouge", "orange", "violet", "gris",
];

/// Frequent adjectives of early child speech, counted by the `standards` report.
pub const STANDARD_LEMMAS: &[&str] = &[
    "petit", "grand", "autre", "gros", "beau", "gentil", "même", "cassé", "bon", "vrai",
    "méchant", "haut", "dur", "bas", "vilain", "dernier", "rouge", "jaune", "pareil", "chaud",
    "caché", "coquin", "ferme", "premier", "froid", "vert", "seul", "nul", "ouvert", "deuxième",
    "joli", "mauvais", "préféré", "lourd", "court", "sûr", "double", "prochain", "nouveau",
    "énorme", "long", "prêt", "vieux", "deux", "las", "minuscule", "mécanique", "malheureux",
    "pompier", "doux", "para", "animé", "en_bas", "bleu", "noir", "rose", "sale", "magique",
    "blanc", "orange", "châtain", "râpé", "violet", "carré", "gris", "clair", "foncé", "collant",
    "roux", "clefs", "rond", "sombre", "gauche", "brun", "propre", "fermé", "gras", "sage",
    "mouillé", "triste", "rigolo", "entier", "adulte", "bête", "malade", "collé", "arrière",
    "chéri", "fort", "plouf", "transporteurs", "dodu", "pointu", "couteau", "brillant",
];

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AgeBand {
    Older,
    Younger,
}

/// How speakers are divided into older and younger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AgeSplit {
    /// `decimal >= years` is older. Speakers without an age fall back to
    /// their adult flag.
    Threshold(f64),
}

impl AgeSplit {
    pub fn band(&self, speaker: &SpeakerProfile) -> AgeBand {
        let older = match (self, speaker.age()) {
            (AgeSplit::Threshold(years), Some(age)) => age.decimal >= *years,
            (AgeSplit::Threshold(_), None) => speaker.is_adult(),
        };
        if older {
            AgeBand::Older
        } else {
            AgeBand::Younger
        }
    }
}

impl Default for AgeSplit {
    fn default() -> Self {
        AgeSplit::Threshold(DEFAULT_AGE_THRESHOLD)
    }
}

/// Occurrences of one adjective lemma, by age band and position.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CountRecord {
    pub lemma: String,
    pub total: usize,
    pub older: usize,
    pub younger: usize,
    pub older_pre: usize,
    pub older_post: usize,
    pub younger_pre: usize,
    pub younger_post: usize,
}

impl CountRecord {
    pub fn new(lemma: impl Into<String>) -> Self {
        Self {
            lemma: lemma.into(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, band: AgeBand, position: Position) {
        self.total += 1;
        match (band, position) {
            (AgeBand::Older, Position::Prenominal) => {
                self.older += 1;
                self.older_pre += 1;
            }
            (AgeBand::Older, Position::Postnominal) => {
                self.older += 1;
                self.older_post += 1;
            }
            (AgeBand::Younger, Position::Prenominal) => {
                self.younger += 1;
                self.younger_pre += 1;
            }
            (AgeBand::Younger, Position::Postnominal) => {
                self.younger += 1;
                self.younger_post += 1;
            }
        }
    }

    pub fn prenominal(&self) -> usize {
        self.older_pre + self.younger_pre
    }

    pub fn postnominal(&self) -> usize {
        self.older_post + self.younger_post
    }
}

/// Lemma positions in the requested list, keyed case-insensitively.
fn lemma_index<S: AsRef<str>>(lemmas: &[S]) -> HashMap<String, Vec<usize>> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, lemma) in lemmas.iter().enumerate() {
        index
            .entry(lemma.as_ref().to_lowercase())
            .or_default()
            .push(idx);
    }
    index
}

/// Every group of a sentence with the side it was found on.
pub(crate) fn positioned_groups(
    sentence: &TaggedSentence,
) -> impl Iterator<Item = (Position, &Group)> + '_ {
    sentence
        .prenominal()
        .iter()
        .map(|g| (Position::Prenominal, g))
        .chain(
            sentence
                .postnominal()
                .iter()
                .map(|g| (Position::Postnominal, g)),
        )
}

/// Count each requested lemma, returned in the order requested.
pub fn count_lemmas<S: AsRef<str>>(
    sentences: &[TaggedSentence],
    lemmas: &[S],
    split: AgeSplit,
) -> Vec<CountRecord> {
    let index = lemma_index(lemmas);
    let mut records: Vec<CountRecord> = lemmas
        .iter()
        .map(|l| CountRecord::new(l.as_ref()))
        .collect();

    for sentence in sentences {
        let band = split.band(sentence.speaker());
        for (position, group) in positioned_groups(sentence) {
            for lemma in group.adjective_lemmas() {
                if let Some(slots) = index.get(&lemma.to_lowercase()) {
                    for &slot in slots {
                        records[slot].record(band, position);
                    }
                }
            }
        }
    }
    records
}

/// Sorted distinct adjective lemmas (lower-cased) across all sentences.
pub fn collect_lemmas(sentences: &[TaggedSentence]) -> Vec<String> {
    sentences
        .iter()
        .flat_map(|s| s.adjective_lemmas())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Month bins `[low, high)` from `start` in steps of `width`, the last
/// stopping at (and including) `ceiling`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BinSpec {
    pub start: u32,
    pub width: u32,
    pub ceiling: u32,
}

impl Default for BinSpec {
    fn default() -> Self {
        Self {
            start: 19,
            width: 6,
            ceiling: 48,
        }
    }
}

impl BinSpec {
    pub fn edges(&self) -> Vec<(u32, u32)> {
        let mut edges = Vec::new();
        if self.width == 0 {
            return edges;
        }
        let mut low = self.start;
        while low < self.ceiling {
            let high = low.saturating_add(self.width).min(self.ceiling);
            edges.push((low, high));
            low = high;
        }
        edges
    }

    fn contains(&self, low: u32, high: u32, months: f64) -> bool {
        let (low, high) = (f64::from(low), f64::from(high));
        if high >= f64::from(self.ceiling) {
            low <= months && months <= high
        } else {
            low <= months && months < high
        }
    }
}

/// Adjective and word totals for a slice of the corpus.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tally {
    /// Requested adjectives found in either position.
    pub total: usize,
    pub pre: usize,
    pub post: usize,
    pub sentences: usize,
    pub words: usize,
}

impl Tally {
    /// Words count over every sentence; adjectives only over sentences
    /// holding a pair.
    fn add(&mut self, sentence: &TaggedSentence, index: &HashMap<String, Vec<usize>>) {
        self.sentences += 1;
        self.words += sentence.word_count();
        if !sentence.has_pair() {
            return;
        }
        for (position, group) in positioned_groups(sentence) {
            let hits = group
                .adjective_lemmas()
                .filter(|lemma| index.contains_key(&lemma.to_lowercase()))
                .count();
            self.total += hits;
            match position {
                Position::Prenominal => self.pre += hits,
                Position::Postnominal => self.post += hits,
            }
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BinRecord {
    pub low: u32,
    pub high: u32,
    pub counts: Tally,
}

/// Tally the requested lemmas per age bin. Speakers without an age are
/// left out.
pub fn count_bins<S: AsRef<str>>(
    sentences: &[TaggedSentence],
    lemmas: &[S],
    spec: BinSpec,
) -> Vec<BinRecord> {
    let index = lemma_index(lemmas);
    let mut bins: Vec<BinRecord> = spec
        .edges()
        .into_iter()
        .map(|(low, high)| BinRecord {
            low,
            high,
            counts: Tally::default(),
        })
        .collect();

    for sentence in sentences {
        let Some(age) = sentence.speaker().age() else {
            continue;
        };
        let months = age.months();
        if let Some(bin) = bins
            .iter_mut()
            .find(|b| spec.contains(b.low, b.high, months))
        {
            bin.counts.add(sentence, &index);
        }
    }
    bins
}

/// Tally the requested lemmas over every sentence.
pub fn count_total<S: AsRef<str>>(sentences: &[TaggedSentence], lemmas: &[S]) -> Tally {
    let index = lemma_index(lemmas);
    let mut tally = Tally::default();
    for sentence in sentences {
        tally.add(sentence, &index);
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use adjpos_types::{Adjective, Age, Sex, SpeakerFields, Tag, Token};

    use crate::pairing::Groups;

    fn speaker(age: Option<Age>, role: &str) -> Arc<SpeakerProfile> {
        Arc::new(SpeakerProfile::new(SpeakerFields {
            id: "SPK".into(),
            role: role.into(),
            name: String::new(),
            sex: Sex::Unknown,
            age,
            language: "fra".into(),
        }))
    }

    fn group(noun: &str, adjectives: &[&str]) -> Group {
        Group::with_lemmas(
            noun,
            Some(noun.to_string()),
            adjectives
                .iter()
                .map(|a| Adjective::with_lemma(*a, *a))
                .collect(),
        )
        .unwrap()
    }

    fn sentence(speaker: Arc<SpeakerProfile>, pre: &[&str], post: &[&str]) -> TaggedSentence {
        let mut groups = Groups::default();
        if !pre.is_empty() {
            groups.prenominal.push(group("chat", pre));
        }
        if !post.is_empty() {
            groups.postnominal.push(group("chat", post));
        }
        TaggedSentence::restore(
            speaker,
            "chat",
            vec![Token::new("chat", Tag::Noun)],
            groups,
        )
    }

    #[test]
    fn age_split_falls_back_to_adult_flag() {
        let split = AgeSplit::default();
        assert_eq!(
            split.band(&speaker(Some(Age::from_decimal(8.0)), "Child")),
            AgeBand::Older
        );
        assert_eq!(
            split.band(&speaker(Some(Age::from_decimal(7.9)), "Mother")),
            AgeBand::Younger
        );
        assert_eq!(split.band(&speaker(None, "Mother")), AgeBand::Older);
        assert_eq!(split.band(&speaker(None, "Target_Child")), AgeBand::Younger);
    }

    #[test]
    fn counts_by_band_and_position_in_requested_order() {
        let child = speaker(Some(Age::parse("P3Y").unwrap()), "Target_Child");
        let adult = speaker(Some(Age::from_decimal(35.0)), "Mother");
        let sentences = vec![
            sentence(child.clone(), &["Petit"], &["rouge"]),
            sentence(adult, &["petit", "grand"], &[]),
            sentence(child, &[], &["rouge", "rouge"]),
        ];
        let records = count_lemmas(&sentences, &["rouge", "petit", "vert"], AgeSplit::default());
        assert_eq!(records[0].lemma, "rouge");
        assert_eq!(records[0].total, 3);
        assert_eq!(records[0].younger_post, 3);
        assert_eq!(records[1].total, 2);
        assert_eq!((records[1].older_pre, records[1].younger_pre), (1, 1));
        assert_eq!(records[1].prenominal(), 2);
        assert_eq!(records[2], CountRecord::new("vert"));

        assert_eq!(collect_lemmas(&sentences), vec!["grand", "petit", "rouge"]);
    }

    #[test]
    fn bin_edges_stop_at_the_ceiling() {
        assert_eq!(
            BinSpec::default().edges(),
            vec![(19, 25), (25, 31), (31, 37), (37, 43), (43, 48)]
        );
    }

    #[test]
    fn huge_bin_width_is_one_bin() {
        let spec = BinSpec {
            start: 19,
            width: u32::MAX,
            ceiling: 48,
        };
        assert_eq!(spec.edges(), vec![(19, 48)]);

        let spec = BinSpec {
            start: u32::MAX - 3,
            width: 2,
            ceiling: u32::MAX,
        };
        assert_eq!(
            spec.edges(),
            vec![(u32::MAX - 3, u32::MAX - 1), (u32::MAX - 1, u32::MAX)]
        );
    }

    #[test]
    fn bins_are_half_open_except_the_last() {
        let at = |months: u32| {
            let years = months / 12;
            let age = Age::from_components(years, months % 12, 0, 0, 0, 0);
            sentence(speaker(Some(age), "Target_Child"), &["petit"], &[])
        };
        let sentences = vec![at(18), at(19), at(24), at(25), at(48), at(49)];
        let mut with_unknown = sentences.clone();
        with_unknown.push(sentence(speaker(None, "Target_Child"), &["petit"], &[]));

        let bins = count_bins(&with_unknown, &["petit"], BinSpec::default());
        let totals: Vec<usize> = bins.iter().map(|b| b.counts.total).collect();
        assert_eq!(totals, vec![2, 1, 0, 0, 1]);
        assert_eq!(bins[0].counts.pre, 2);
        assert_eq!(bins[0].counts.sentences, 2);
        assert_eq!(bins[0].counts.words, 2);
    }

    #[test]
    fn unpaired_sentences_add_words_but_no_adjectives() {
        let child = speaker(Some(Age::from_components(2, 0, 0, 0, 0, 0)), "Target_Child");
        let unpaired = TaggedSentence::restore(
            child.clone(),
            "petit chat",
            vec![Token::new("petit", Tag::Adj), Token::new("chat", Tag::Noun)],
            Groups::default(),
        );
        let sentences = vec![sentence(child, &["petit"], &[]), unpaired];

        let bins = count_bins(&sentences, &["petit"], BinSpec::default());
        assert_eq!(bins[0].counts.total, 1);
        assert_eq!(bins[0].counts.sentences, 2);
        assert_eq!(bins[0].counts.words, 3);
    }

    #[test]
    fn total_tally_counts_every_sentence() {
        let adult = speaker(Some(Age::from_decimal(40.0)), "Mother");
        let sentences = vec![
            sentence(adult.clone(), &["grand"], &["noir"]),
            sentence(adult, &[], &[]),
        ];
        let tally = count_total(&sentences, &["grand", "noir"]);
        assert_eq!(
            tally,
            Tally {
                total: 2,
                pre: 1,
                post: 1,
                sentences: 2,
                words: 2,
            }
        );
    }
}
