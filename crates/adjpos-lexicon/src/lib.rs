//! Load a Lefff-style full-form lexicon with zero-copy lemma text.
//!
//! Each line of the lexicon is `form<TAB>category<TAB>lemma`, optionally
//! followed by more tab-separated columns (morphological features) which are
//! ignored. Lines that are blank or start with `#` are skipped. Categories
//! follow the Lefff conventions (`adj`, `nc`, `np`, `v`, `adv`, `det`,
//! `prep`, `pro`, `cln`, `coo`, `csu`, `poncts`, ...) and are mapped onto
//! universal [`Tag`]s.
//!
//! Callers choose between memory-mapped files or owned buffers at runtime via
//! [`LoadMode`]; lemma strings borrow from the loaded bytes.
//!
//! # Example
//! ```no_run
//! use adjpos_lexicon::{Lexicon, LoadMode};
//! use adjpos_types::Pos;
//!
//! # fn main() -> anyhow::Result<()> {
//! let lexicon = Lexicon::load_with_mode("/path/to/lefff-ext.tsv", LoadMode::Mmap)?;
//! assert_eq!(lexicon.lemma_for(Pos::Adj, "grandes"), Some("grand"));
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p adjpos-lexicon --example stats -- <lexicon>`.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use adjpos_types::{Pos, Tag};
use anyhow::{Context, Result};
use memmap2::Mmap;

/// Strategy for loading the lexicon file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the lexicon (fast, zero-copy).
    Mmap,
    /// Read the lexicon into an owned buffer (portable fallback).
    Owned,
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

#[derive(Clone, Copy)]
struct TextRef {
    start: usize,
    len: usize,
}

struct EntryData {
    tag: Tag,
    lemma: TextRef,
}

/// One reading of a form: its tag and lemma.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry<'a> {
    pub tag: &'a Tag,
    pub lemma: &'a str,
}

/// In-memory view of a full-form lexicon backed by mmap or an owned buffer.
pub struct Lexicon {
    buffer: Buffer,
    forms: HashMap<String, Vec<EntryData>>,
    lemmas: HashSet<(Pos, String)>,
    entry_count: usize,
}

impl Lexicon {
    /// Load a lexicon, memory-mapping the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_mode(path, LoadMode::Mmap)
    }

    /// Load a lexicon choosing between mmap and an owned buffer at runtime.
    pub fn load_with_mode(path: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("missing lexicon file: {}", path.display());
        }
        let buffer = load_file(path, mode)?;

        let mut forms: HashMap<String, Vec<EntryData>> = HashMap::new();
        let mut lemmas = HashSet::new();
        let mut entry_count = 0usize;
        let bytes = buffer.as_slice();
        for (lineno, raw_line) in bytes.split(|b| *b == b'\n').enumerate() {
            let line = strip_cr(raw_line);
            if line.is_empty() || line.first() == Some(&b'#') {
                continue;
            }
            let line_str = std::str::from_utf8(line)
                .with_context(|| format!("{}:{} is not utf-8", path.display(), lineno + 1))?;
            let mut columns = line_str.split('\t');
            let (Some(form), Some(category), Some(lemma)) =
                (columns.next(), columns.next(), columns.next())
            else {
                anyhow::bail!(
                    "{}:{} malformed lexicon line (expected form, category, lemma)",
                    path.display(),
                    lineno + 1
                );
            };
            let lemma = strip_lemma_suffix(lemma.trim());
            if form.trim().is_empty() || lemma.is_empty() {
                anyhow::bail!("{}:{} empty form or lemma", path.display(), lineno + 1);
            }

            let tag = category_tag(category);
            if let Some(pos) = tag.pos() {
                lemmas.insert((pos, normalize_form(lemma)));
            }
            forms
                .entry(normalize_form(form))
                .or_default()
                .push(EntryData {
                    tag,
                    lemma: text_ref_str(bytes, lemma),
                });
            entry_count += 1;
        }

        Ok(Self {
            buffer,
            forms,
            lemmas,
            entry_count,
        })
    }

    /// Every reading of a form, in file order.
    pub fn entries(&self, form: &str) -> Vec<Entry<'_>> {
        self.forms
            .get(&normalize_form(form))
            .map(|entries| {
                entries
                    .iter()
                    .map(|e| Entry {
                        tag: &e.tag,
                        lemma: self.text(e.lemma),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Tag of the first reading listed for a form.
    pub fn first_tag(&self, form: &str) -> Option<&Tag> {
        self.forms
            .get(&normalize_form(form))
            .and_then(|entries| entries.first())
            .map(|e| &e.tag)
    }

    /// Lemma of the first reading of `form` whose tag matches `pos`.
    pub fn lemma_for(&self, pos: Pos, form: &str) -> Option<&str> {
        self.forms
            .get(&normalize_form(form))?
            .iter()
            .find(|e| e.tag.pos() == Some(pos))
            .map(|e| self.text(e.lemma))
    }

    /// Check whether `lemma` is the lemma of any entry with the given POS.
    pub fn lemma_exists(&self, pos: Pos, lemma: &str) -> bool {
        self.lemmas.contains(&(pos, normalize_form(lemma)))
    }

    /// Number of distinct forms.
    pub fn form_count(&self) -> usize {
        self.forms.len()
    }

    /// Number of lines loaded.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Number of distinct `(pos, lemma)` pairs.
    pub fn lemma_count(&self) -> usize {
        self.lemmas.len()
    }

    fn text(&self, r: TextRef) -> &str {
        let bytes = self.buffer.as_slice();
        // Lines were validated as utf-8 while loading.
        std::str::from_utf8(&bytes[r.start..r.start + r.len]).unwrap_or_default()
    }
}

/// Map a Lefff category onto a universal tag.
pub fn category_tag(category: &str) -> Tag {
    match category.trim().to_ascii_lowercase().as_str() {
        "adj" => Tag::Adj,
        "nc" => Tag::Noun,
        "np" => Tag::Propn,
        "v" => Tag::Verb,
        "auxavoir" | "auxetre" => Tag::Aux,
        "adv" | "advneg" | "advm" | "advp" => Tag::Adv,
        "det" => Tag::Det,
        "prep" => Tag::Adp,
        "pro" | "prel" | "pri" | "cla" | "cld" | "clg" | "cll" | "cln" | "clr" | "ilimp" => {
            Tag::Pron
        }
        "coo" => Tag::Cconj,
        "csu" | "que" => Tag::Sconj,
        "pres" => Tag::Intj,
        "poncts" | "ponctw" | "parento" | "parentf" | "epsilon" => Tag::Punct,
        _ => Tag::X,
    }
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

fn text_ref_str(root: &[u8], token: &str) -> TextRef {
    let start = token.as_ptr() as usize - root.as_ptr() as usize;
    TextRef {
        start,
        len: token.len(),
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    if line.ends_with(b"\r") {
        &line[..line.len() - 1]
    } else {
        line
    }
}

/// Lefff disambiguates some lemmas with a `__suffix`; the suffix is dropped.
fn strip_lemma_suffix(lemma: &str) -> &str {
    match lemma.find("__") {
        Some(idx) if idx > 0 => &lemma[..idx],
        _ => lemma,
    }
}

fn normalize_form(text: &str) -> String {
    text.trim().to_lowercase()
}
