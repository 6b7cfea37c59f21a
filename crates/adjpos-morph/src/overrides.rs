use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

use crate::normalize;

/// Irregular or transcription-damaged adjective forms and what they mean.
const BUILTIN: &[(&str, &str, Option<&str>)] = &[
    ("tits", "petit", None),
    ("deux}{deux", "deux", Some("deux deux")),
    ("deu", "deux", Some("deux")),
    ("rouge}pour", "rouge", Some("rouge")),
    ("rase", "rad", None),
    ("des::petits", "petit", Some("petits")),
    ("roux", "rouge", None),
];

/// Replacement for a surface form: its lemma and, optionally, a corrected
/// surface to store in place of the transcribed one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Override {
    pub lemma: String,
    pub surface: Option<String>,
}

/// Surface-to-lemma table matched case-insensitively on the whole form.
#[derive(Clone, Debug, Default)]
pub struct LemmaOverrides {
    entries: HashMap<String, Override>,
}

impl LemmaOverrides {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The forms known to trip up the lemmatizer on child transcripts.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for &(surface, lemma, rewrite) in BUILTIN {
            table.insert(surface, lemma, rewrite.map(str::to_string));
        }
        table
    }

    /// Add entries from `surface<TAB>lemma[<TAB>rewritten surface]` lines.
    ///
    /// Later entries replace earlier ones; blank lines and `#` comments are skipped.
    pub fn extend_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("open override file {}", path.display()))?;
        let reader = BufReader::new(file);
        for (lineno, line) in reader.lines().enumerate() {
            let line =
                line.with_context(|| format!("read line {} in {}", lineno + 1, path.display()))?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split('\t');
            let (Some(surface), Some(lemma)) = (parts.next(), parts.next()) else {
                anyhow::bail!(
                    "{}:{} expected surface<TAB>lemma",
                    path.display(),
                    lineno + 1
                );
            };
            let rewrite = parts
                .next()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            self.insert(surface.trim(), lemma.trim(), rewrite);
        }
        Ok(())
    }

    pub fn insert(&mut self, surface: &str, lemma: &str, surface_rewrite: Option<String>) {
        self.entries.insert(
            normalize(surface),
            Override {
                lemma: lemma.to_string(),
                surface: surface_rewrite,
            },
        );
    }

    pub fn get(&self, surface: &str) -> Option<&Override> {
        self.entries.get(&normalize(surface))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
