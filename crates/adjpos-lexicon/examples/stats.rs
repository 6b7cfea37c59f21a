use std::env;
use std::path::PathBuf;
use std::time::Instant;

use adjpos_lexicon::{Lexicon, LoadMode};
use anyhow::{Context, Result};

fn main() -> Result<()> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: cargo run -p adjpos-lexicon --example stats -- <path-to-lexicon>")?;

    let start = Instant::now();
    let lex = Lexicon::load_with_mode(&path, LoadMode::Mmap)
        .with_context(|| format!("loading lexicon from {}", path.display()))?;

    println!("Lexicon: {}", path.display());
    println!("Loaded in {} ms", start.elapsed().as_millis());
    println!("Entries: {}", lex.entry_count());
    println!("Distinct forms: {}", lex.form_count());
    println!("Distinct lemmas: {}", lex.lemma_count());

    Ok(())
}
