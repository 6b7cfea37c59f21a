//! Adjective position analysis for French speech corpora.
//!
//! Tagged utterances become [`TaggedSentence`]s whose nouns are paired with
//! the adjectives directly before and after them. Groups are lemmatized,
//! reviewed against word lists, and folded into per-lemma counts, age-bin
//! tallies and adjective/noun co-occurrence matrices.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use adjpos::{TaggedSentence, find_groups};
//! use adjpos_types::{Sex, SpeakerFields, SpeakerProfile, Tag, Token};
//!
//! let tokens = vec![
//!     Token::new("petit", Tag::Adj),
//!     Token::new("chat", Tag::Noun),
//!     Token::new("noir", Tag::Adj),
//! ];
//! let groups = find_groups(&tokens);
//! assert_eq!(groups.prenominal[0].noun(), "chat");
//!
//! let speaker = Arc::new(SpeakerProfile::new(SpeakerFields {
//!     id: "CHI".into(),
//!     role: "Target_Child".into(),
//!     name: "Léa".into(),
//!     sex: Sex::Female,
//!     age: None,
//!     language: "fra".into(),
//! }));
//! let sentence = TaggedSentence::from_tokens(speaker, "petit chat noir", tokens);
//! assert!(sentence.has_pair());
//! ```

pub mod corpus;
pub mod counts;
pub mod matrix;
pub mod nlp;
pub mod normalize;
pub mod orfeo;
pub mod pairing;
pub mod pipeline;
pub mod report;
pub mod review;
pub mod sanitize;
pub mod sentence;

pub use corpus::{CorpusEntry, CorpusError, SpeakerTable, merge_json, read_json, save_json};
pub use counts::{
    AgeBand, AgeSplit, BinRecord, BinSpec, COLOR_LEMMAS, CountRecord, STANDARD_LEMMAS, Tally,
    collect_lemmas, count_bins, count_lemmas, count_total,
};
pub use matrix::{
    CooccurrenceMatrix, MatrixConfig, MatrixSet, Partition, Vocabulary, build_matrices,
    build_matrices_parallel,
};
pub use nlp::{LexiconLemmatizer, LexiconTagger, TagError, Tagger, TaggerRegistry};
pub use normalize::LemmaNormalizer;
pub use orfeo::{find_orfeo_files, read_orfeo};
pub use pairing::{Groups, find_groups};
pub use pipeline::{
    BatchStats, Pipeline, PipelineError, ReviewOutcome, Utterance, review_entries,
};
pub use review::{WordList, build_word_lists, classify, find_bad};
pub use sanitize::sanitize;
pub use sentence::TaggedSentence;
