//! Reader for the tab-separated `.orfeo` token files of the CEFC corpus.
//!
//! Each token line is `index<TAB>surface<TAB>lemma<TAB>tag<TAB>...<TAB>speaker`.
//! A sentence block opens on the line whose index is `1` and closes at the
//! next blank line.

use std::fs;
use std::path::{Path, PathBuf};

use adjpos_types::{Tag, Token};
use tracing::debug;

use crate::corpus::{CorpusError, SpeakerTable};
use crate::sentence::TaggedSentence;

const SURFACE_COLUMN: usize = 1;
const TAG_COLUMN: usize = 3;

/// Every `*.orfeo` file below `dir`, sorted.
pub fn find_orfeo_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, CorpusError> {
    let mut found = Vec::new();
    walk(dir.as_ref(), &mut found)?;
    found.sort();
    Ok(found)
}

fn walk(dir: &Path, found: &mut Vec<PathBuf>) -> Result<(), CorpusError> {
    let entries = fs::read_dir(dir).map_err(|err| CorpusError::io(dir, err))?;
    for entry in entries {
        let path = entry.map_err(|err| CorpusError::io(dir, err))?.path();
        if path.is_dir() {
            walk(&path, found)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("orfeo"))
        {
            found.push(path);
        }
    }
    Ok(())
}

/// Speaker table stored next to a token file (`<stem>.speakers.json`).
pub fn speaker_table_path(orfeo: &Path) -> PathBuf {
    orfeo.with_extension("speakers.json")
}

struct Block {
    line: usize,
    speaker: String,
    tokens: Vec<Token>,
}

/// Parse every sentence block of a file.
///
/// The speaker of a block is the one named on its first line; an id missing
/// from `speakers` fails the whole file.
pub fn read_orfeo(
    path: impl AsRef<Path>,
    speakers: &SpeakerTable,
) -> Result<Vec<TaggedSentence>, CorpusError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|err| CorpusError::io(path, err))?;

    let mut blocks = Vec::new();
    let mut current: Option<Block> = None;
    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            blocks.extend(current.take());
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        let columns: Vec<&str> = line.split('\t').collect();
        let opens_block = columns[0].trim() == "1";
        if !opens_block && current.is_none() {
            continue;
        }
        if columns.len() <= TAG_COLUMN {
            return Err(CorpusError::Malformed {
                file: path.to_path_buf(),
                line: idx + 1,
                reason: format!("expected at least {} columns", TAG_COLUMN + 1),
            });
        }
        if opens_block {
            blocks.extend(current.take());
            current = Some(Block {
                line: idx + 1,
                speaker: columns[columns.len() - 1].trim().to_string(),
                tokens: Vec::new(),
            });
        }
        if let Some(block) = current.as_mut() {
            block.tokens.push(Token::new(
                columns[SURFACE_COLUMN],
                Tag::parse(columns[TAG_COLUMN]),
            ));
        }
    }
    blocks.extend(current.take());

    let mut sentences = Vec::with_capacity(blocks.len());
    for block in blocks {
        let speaker = speakers
            .get(&block.speaker)
            .ok_or_else(|| CorpusError::UnknownSpeaker {
                file: path.to_path_buf(),
                speaker: block.speaker.clone(),
            })?;
        let text = block
            .tokens
            .iter()
            .map(|t| t.surface.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        debug!(line = block.line, tokens = block.tokens.len(), "orfeo block");
        sentences.push(TaggedSentence::from_tokens(
            speaker.clone(),
            text,
            block.tokens,
        ));
    }
    Ok(sentences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use adjpos_types::{Age, Sex, SpeakerFields, SpeakerProfile};

    fn table() -> SpeakerTable {
        SpeakerTable::from_profiles([SpeakerProfile::new(SpeakerFields {
            id: "L1".into(),
            role: "Speaker".into(),
            name: "Paul".into(),
            sex: Sex::Male,
            age: Some(Age::from_decimal(42.0)),
            language: "fra".into(),
        })])
    }

    const SAMPLE: &str = "\
# header
1\tune\tun\tDET\t_\tL1
2\tmaison\tmaison\tNOM\t_\tL1
3\tblanche\tblanc\tADJ\t_\tL1
4\t.\t.\tPCT\t_\tL1

1\tbon\tbon\tADJ\t_\tL1
2\tà\tà\tADP\t_\tL2
";

    #[test]
    fn parses_blocks_and_maps_tags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.orfeo");
        fs::write(&path, SAMPLE).unwrap();

        let sentences = read_orfeo(&path, &table()).unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text(), "une maison blanche .");
        assert_eq!(sentences[0].tokens()[1].tag, Tag::Noun);
        assert_eq!(sentences[0].tokens()[3].tag, Tag::Punct);
        assert_eq!(sentences[0].postnominal()[0].noun(), "maison");
        assert_eq!(sentences[1].speaker().id(), "L1");
    }

    #[test]
    fn unknown_speaker_fails_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.orfeo");
        fs::write(&path, "1\tbon\tbon\tADJ\t_\tL9\n").unwrap();
        let err = read_orfeo(&path, &table()).unwrap_err();
        assert!(matches!(err, CorpusError::UnknownSpeaker { ref speaker, .. } if speaker == "L9"));
    }

    #[test]
    fn short_lines_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.orfeo");
        fs::write(&path, "1\tbon\n").unwrap();
        assert!(matches!(
            read_orfeo(&path, &table()),
            Err(CorpusError::Malformed { line: 1, .. })
        ));
    }

    #[test]
    fn finds_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/z.orfeo"), "").unwrap();
        fs::write(dir.path().join("a.ORFEO"), "").unwrap();
        fs::write(dir.path().join("a.speakers.json"), "[]").unwrap();
        let files = find_orfeo_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(
            speaker_table_path(&files[0]).file_name().unwrap(),
            "a.speakers.json"
        );
    }
}
