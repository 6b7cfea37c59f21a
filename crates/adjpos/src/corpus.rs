//! JSON persistence of analysed sentences and speaker tables.
//!
//! The file is an array of `{file, data}` records. `data` carries the
//! speaker, the sentence text, the tagged tokens as `[surface, tag]` pairs
//! and the two group lists:
//!
//! ```json
//! [{"file": "a.cha", "data": {
//!     "speaker": {"sid": "CHI", "role": "Target_Child", "name": "Léa",
//!                 "sex": "female", "adult": false, "lang": "fra",
//!                 "age": "P3Y2M0DT0H0M0S"},
//!     "sentence": "le chat noir",
//!     "pos": [["le", "DET"], ["chat", "NOUN"], ["noir", "ADJ"]],
//!     "postnominal": [{"noun": "chat",
//!                      "adjectives": [{"adjective": "noir", "lemma": "noir"}],
//!                      "lemma": "chat"}],
//!     "prenominal": []}}]
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use adjpos_types::{
    Adjective, Age, AgeParseError, Group, Sex, SpeakerFields, SpeakerProfile, Tag, Token,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::pairing::Groups;
use crate::sentence::TaggedSentence;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid age for speaker {speaker:?}: {source}")]
    Age {
        speaker: String,
        #[source]
        source: AgeParseError,
    },
    #[error("unknown speaker {speaker:?} in {}", file.display())]
    UnknownSpeaker { file: PathBuf, speaker: String },
    #[error("{}:{line}: {reason}", file.display())]
    Malformed {
        file: PathBuf,
        line: usize,
        reason: String,
    },
}

impl CorpusError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        CorpusError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        CorpusError::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A sentence and the transcript it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct CorpusEntry {
    pub file: String,
    pub sentence: TaggedSentence,
}

impl CorpusEntry {
    pub fn new(file: impl Into<String>, sentence: TaggedSentence) -> Self {
        Self {
            file: file.into(),
            sentence,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RecordDto {
    file: String,
    data: SentenceDto,
}

#[derive(Debug, Serialize, Deserialize)]
struct SentenceDto {
    speaker: SpeakerDto,
    sentence: String,
    #[serde(default)]
    pos: Vec<(String, String)>,
    #[serde(default)]
    postnominal: Vec<GroupDto>,
    #[serde(default)]
    prenominal: Vec<GroupDto>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct SpeakerDto {
    sid: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    sex: String,
    #[serde(default)]
    adult: Option<bool>,
    #[serde(default)]
    lang: String,
    #[serde(default)]
    age: Option<AgeDto>,
}

/// Ages are written as a duration when known, as plain years otherwise.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum AgeDto {
    Duration(String),
    Years(f64),
}

#[derive(Debug, Serialize, Deserialize)]
struct GroupDto {
    noun: String,
    adjectives: Vec<AdjectiveDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lemma: Option<String>,
}

/// Older files list adjectives as bare strings.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum AdjectiveDto {
    Full {
        adjective: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lemma: Option<String>,
    },
    Bare(String),
}

impl SpeakerDto {
    fn from_profile(speaker: &SpeakerProfile) -> Self {
        Self {
            sid: speaker.id().to_string(),
            role: speaker.role().to_string(),
            name: speaker.name().to_string(),
            sex: speaker.sex().as_str().to_string(),
            adult: Some(speaker.is_adult()),
            lang: speaker.language().to_string(),
            age: speaker.age().map(|age| match age.to_duration() {
                Some(duration) => AgeDto::Duration(duration),
                None => AgeDto::Years(age.decimal),
            }),
        }
    }

    fn into_profile(self) -> Result<SpeakerProfile, CorpusError> {
        let age = match self.age {
            Some(AgeDto::Duration(raw)) if raw.trim().is_empty() => None,
            Some(AgeDto::Duration(raw)) => Some(Age::parse(&raw).map_err(|source| {
                CorpusError::Age {
                    speaker: self.sid.clone(),
                    source,
                }
            })?),
            Some(AgeDto::Years(years)) => Some(Age::from_decimal(years)),
            None => None,
        };
        let fields = SpeakerFields {
            id: self.sid,
            role: self.role,
            name: self.name,
            sex: Sex::parse(&self.sex),
            age,
            language: self.lang,
        };
        Ok(match self.adult {
            Some(adult) => SpeakerProfile::with_classification(fields, adult),
            None => SpeakerProfile::new(fields),
        })
    }
}

impl GroupDto {
    fn from_group(group: &Group) -> Self {
        Self {
            noun: group.noun().to_string(),
            adjectives: group
                .adjectives()
                .iter()
                .map(|a| AdjectiveDto::Full {
                    adjective: a.surface.clone(),
                    lemma: a.lemma.clone(),
                })
                .collect(),
            lemma: group.noun_lemma().map(str::to_string),
        }
    }

    fn into_group(self) -> Option<Group> {
        let adjectives = self
            .adjectives
            .into_iter()
            .map(|a| match a {
                AdjectiveDto::Full { adjective, lemma } => Adjective {
                    surface: adjective,
                    lemma,
                },
                AdjectiveDto::Bare(surface) => Adjective::new(surface),
            })
            .collect();
        Group::with_lemmas(self.noun, self.lemma, adjectives)
    }
}

impl RecordDto {
    fn from_entry(entry: &CorpusEntry) -> Self {
        let sentence = &entry.sentence;
        Self {
            file: entry.file.clone(),
            data: SentenceDto {
                speaker: SpeakerDto::from_profile(sentence.speaker()),
                sentence: sentence.text().to_string(),
                pos: sentence
                    .tokens()
                    .iter()
                    .map(|t| (t.surface.clone(), t.tag.as_str().to_string()))
                    .collect(),
                postnominal: sentence
                    .postnominal()
                    .iter()
                    .map(GroupDto::from_group)
                    .collect(),
                prenominal: sentence
                    .prenominal()
                    .iter()
                    .map(GroupDto::from_group)
                    .collect(),
            },
        }
    }

    fn into_entry(
        self,
        speakers: &mut HashMap<String, Arc<SpeakerProfile>>,
    ) -> Result<CorpusEntry, CorpusError> {
        let data = self.data;
        let speaker = data.speaker.into_profile()?;
        // Consecutive records usually share a speaker; reuse the allocation.
        let speaker = match speakers.get(speaker.id()) {
            Some(known) if **known == speaker => Arc::clone(known),
            _ => {
                let speaker = Arc::new(speaker);
                speakers.insert(speaker.id().to_string(), Arc::clone(&speaker));
                speaker
            }
        };
        let tokens = data
            .pos
            .into_iter()
            .map(|(surface, tag)| Token::new(surface, Tag::parse(&tag)))
            .collect();
        let groups = Groups {
            prenominal: data
                .prenominal
                .into_iter()
                .filter_map(GroupDto::into_group)
                .collect(),
            postnominal: data
                .postnominal
                .into_iter()
                .filter_map(GroupDto::into_group)
                .collect(),
        };
        Ok(CorpusEntry::new(
            self.file,
            TaggedSentence::restore(speaker, data.sentence, tokens, groups),
        ))
    }
}

fn read_records(path: &Path) -> Result<Vec<RecordDto>, CorpusError> {
    let file = File::open(path).map_err(|err| CorpusError::io(path, err))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|err| CorpusError::json(path, err))
}

fn write_records(path: &Path, records: &[RecordDto]) -> Result<(), CorpusError> {
    let file = File::create(path).map_err(|err| CorpusError::io(path, err))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)
        .map_err(|err| CorpusError::json(path, err))?;
    writer.flush().map_err(|err| CorpusError::io(path, err))
}

/// Load a corpus file. Records a reviewer struck out with a leading `::`
/// are skipped.
pub fn read_json(path: impl AsRef<Path>) -> Result<Vec<CorpusEntry>, CorpusError> {
    let path = path.as_ref();
    let records = read_records(path)?;
    let total = records.len();
    let mut speakers = HashMap::new();
    let entries = records
        .into_iter()
        .filter(|r| !r.data.sentence.starts_with("::"))
        .map(|r| r.into_entry(&mut speakers))
        .collect::<Result<Vec<_>, _>>()?;
    if entries.len() < total {
        debug!(
            skipped = total - entries.len(),
            "dropped struck-out sentences from {}",
            path.display()
        );
    }
    Ok(entries)
}

/// Write every entry that has at least one group; returns how many were written.
pub fn save_json(path: impl AsRef<Path>, entries: &[CorpusEntry]) -> Result<usize, CorpusError> {
    let path = path.as_ref();
    let records: Vec<RecordDto> = entries
        .iter()
        .filter(|e| e.sentence.has_pair())
        .map(RecordDto::from_entry)
        .collect();
    write_records(path, &records)?;
    info!("saved {} sentences to {}", records.len(), path.display());
    Ok(records.len())
}

/// Append entries with groups to an existing file (created if missing);
/// returns how many were appended.
pub fn merge_json(path: impl AsRef<Path>, entries: &[CorpusEntry]) -> Result<usize, CorpusError> {
    let path = path.as_ref();
    if !path.exists() {
        return save_json(path, entries);
    }
    let mut records = read_records(path)?;
    let before = records.len();
    records.extend(
        entries
            .iter()
            .filter(|e| e.sentence.has_pair())
            .map(RecordDto::from_entry),
    );
    write_records(path, &records)?;
    let added = records.len() - before;
    info!("merged {} sentences into {}", added, path.display());
    Ok(added)
}

/// Speaker profiles of one transcript, keyed by speaker id.
#[derive(Clone, Debug, Default)]
pub struct SpeakerTable {
    speakers: HashMap<String, Arc<SpeakerProfile>>,
}

impl SpeakerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_profiles(profiles: impl IntoIterator<Item = SpeakerProfile>) -> Self {
        let mut table = Self::new();
        for profile in profiles {
            table.insert(profile);
        }
        table
    }

    /// Read a JSON array of speaker records.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| CorpusError::io(path, err))?;
        let records: Vec<SpeakerDto> = serde_json::from_reader(BufReader::new(file))
            .map_err(|err| CorpusError::json(path, err))?;
        let profiles = records
            .into_iter()
            .map(SpeakerDto::into_profile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_profiles(profiles))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CorpusError> {
        let path = path.as_ref();
        let mut records: Vec<SpeakerDto> = self
            .speakers
            .values()
            .map(|s| SpeakerDto::from_profile(s))
            .collect();
        records.sort_by(|a, b| a.sid.cmp(&b.sid));
        let file = File::create(path).map_err(|err| CorpusError::io(path, err))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &records)
            .map_err(|err| CorpusError::json(path, err))?;
        writer.flush().map_err(|err| CorpusError::io(path, err))
    }

    pub fn insert(&mut self, profile: SpeakerProfile) {
        self.speakers
            .insert(profile.id().to_string(), Arc::new(profile));
    }

    pub fn get(&self, id: &str) -> Option<&Arc<SpeakerProfile>> {
        self.speakers.get(id)
    }

    pub fn len(&self) -> usize {
        self.speakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }
}
