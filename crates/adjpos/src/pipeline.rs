use std::fmt;
use std::path::Path;
use std::sync::Arc;

use adjpos_morph::LemmaError;
use adjpos_types::{SpeakerProfile, Token};
use thiserror::Error;
use tracing::{info, warn};

use crate::corpus::{CorpusEntry, CorpusError, SpeakerTable};
use crate::nlp::{TagError, TaggerRegistry};
use crate::normalize::LemmaNormalizer;
use crate::orfeo::{find_orfeo_files, read_orfeo, speaker_table_path};
use crate::review::WordList;
use crate::sentence::TaggedSentence;

/// One utterance from a corpus reader, tagged or not.
#[derive(Clone, Debug)]
pub struct Utterance {
    pub file: String,
    pub speaker: Arc<SpeakerProfile>,
    pub text: String,
    pub tokens: Option<Vec<Token>>,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Tag(#[from] TagError),
    #[error(transparent)]
    Lemma(#[from] LemmaError),
}

/// What happened to the sentences of one batch.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BatchStats {
    /// Sentences that came through.
    pub processed: usize,
    /// Sentences lost to tagger or lemmatizer failures.
    pub dropped: usize,
    /// Sentences left for human review.
    pub flagged: usize,
    /// Input files skipped entirely.
    pub failed_files: usize,
}

impl BatchStats {
    pub fn add(&mut self, other: BatchStats) {
        self.processed += other.processed;
        self.dropped += other.dropped;
        self.flagged += other.flagged;
        self.failed_files += other.failed_files;
    }
}

impl fmt::Display for BatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {}, dropped {}, flagged {}",
            self.processed, self.dropped, self.flagged
        )?;
        if self.failed_files > 0 {
            write!(f, ", failed files {}", self.failed_files)?;
        }
        Ok(())
    }
}

/// Sentences split by whether they still need a human look.
#[derive(Debug, Default)]
pub struct ReviewOutcome {
    pub verified: Vec<CorpusEntry>,
    pub unverified: Vec<CorpusEntry>,
    pub stats: BatchStats,
}

/// Tagging and lemmatization models shared across a batch.
#[derive(Clone)]
pub struct Pipeline {
    taggers: TaggerRegistry,
    normalizer: LemmaNormalizer,
}

impl Pipeline {
    pub fn new(taggers: TaggerRegistry, normalizer: LemmaNormalizer) -> Self {
        Self {
            taggers,
            normalizer,
        }
    }

    pub fn normalizer(&self) -> &LemmaNormalizer {
        &self.normalizer
    }

    /// Tag (when needed), pair and lemmatize one utterance.
    pub fn build(&self, utterance: Utterance) -> Result<TaggedSentence, PipelineError> {
        let mut sentence = match utterance.tokens {
            Some(tokens) => TaggedSentence::from_tokens(utterance.speaker, utterance.text, tokens),
            None => {
                let tagger = self.taggers.get(utterance.speaker.language())?;
                TaggedSentence::from_text(utterance.speaker, &utterance.text, tagger)?
            }
        };
        sentence.lemmatize(&self.normalizer)?;
        Ok(sentence)
    }

    /// Build every utterance, dropping (and logging) the ones that fail.
    pub fn analyze<I>(&self, utterances: I) -> (Vec<CorpusEntry>, BatchStats)
    where
        I: IntoIterator<Item = Utterance>,
    {
        let mut stats = BatchStats::default();
        let mut entries = Vec::new();
        for utterance in utterances {
            let file = utterance.file.clone();
            match self.build(utterance) {
                Ok(sentence) => {
                    stats.processed += 1;
                    entries.push(CorpusEntry::new(file, sentence));
                }
                Err(err) => {
                    stats.dropped += 1;
                    warn!("dropping sentence from {file}: {err}");
                }
            }
        }
        (entries, stats)
    }

    /// Recompute the lemmas of every group.
    pub fn lemmatize(&self, entries: Vec<CorpusEntry>) -> (Vec<CorpusEntry>, BatchStats) {
        let mut stats = BatchStats::default();
        let mut kept = Vec::with_capacity(entries.len());
        for mut entry in entries {
            match entry.sentence.lemmatize(&self.normalizer) {
                Ok(()) => {
                    stats.processed += 1;
                    kept.push(entry);
                }
                Err(err) => {
                    stats.dropped += 1;
                    warn!("dropping sentence from {}: {err}", entry.file);
                }
            }
        }
        (kept, stats)
    }

    /// Filter non-words and transcription debris, then lemmatize again.
    pub fn repair(
        &self,
        mut entries: Vec<CorpusEntry>,
        nonwords: &WordList,
    ) -> (Vec<CorpusEntry>, BatchStats) {
        for entry in &mut entries {
            entry.sentence.sanitize(nonwords);
        }
        self.lemmatize(entries)
    }

    /// Read every `.orfeo` file under `dir` with its speaker table.
    ///
    /// A file whose speakers cannot be resolved is skipped and counted; the
    /// other files still load.
    pub fn ingest(&self, dir: &Path) -> Result<(Vec<CorpusEntry>, BatchStats), CorpusError> {
        let mut entries = Vec::new();
        let mut total = BatchStats::default();
        for path in find_orfeo_files(dir)? {
            let sentences = SpeakerTable::load(speaker_table_path(&path))
                .and_then(|speakers| read_orfeo(&path, &speakers));
            let sentences = match sentences {
                Ok(sentences) => sentences,
                Err(err) => {
                    warn!("skipping {}: {err}", path.display());
                    total.failed_files += 1;
                    continue;
                }
            };
            let file = path.display().to_string();
            let batch = sentences
                .into_iter()
                .map(|sentence| CorpusEntry::new(file.clone(), sentence))
                .collect();
            let (kept, stats) = self.lemmatize(batch);
            info!("{file}: {stats}");
            total.add(stats);
            entries.extend(kept);
        }
        Ok((entries, total))
    }
}

/// Apply the word lists and clean each sentence, then split by review status.
pub fn review_entries(
    entries: Vec<CorpusEntry>,
    whitelist: &WordList,
    blacklist: &WordList,
    nonwords: &WordList,
) -> ReviewOutcome {
    let mut outcome = ReviewOutcome::default();
    for mut entry in entries {
        entry.sentence.review(whitelist, blacklist);
        entry.sentence.sanitize(nonwords);
        outcome.stats.processed += 1;
        if entry.sentence.needs_review() {
            outcome.stats.flagged += 1;
            outcome.unverified.push(entry);
        } else {
            outcome.verified.push(entry);
        }
    }
    outcome
}
