use std::env;
use std::path::PathBuf;

use adjpos_lexicon::{Lexicon, LoadMode};
use adjpos_morph::{LemmaOverrides, Morphology};
use adjpos_types::Pos;
use anyhow::{Context, Result, bail};

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let lexicon_path = args.next().map(PathBuf::from).context(
        "usage: cargo run -p adjpos-morph --example lookup -- <lexicon> [--demo | <word>]",
    )?;
    let next = args.next();
    if args.next().is_some() {
        bail!("too many arguments");
    }

    let words: Vec<String> = match next.as_deref() {
        Some("--demo") => vec![
            "petites".into(),
            "heureuses".into(),
            "chevaux".into(),
            "tits".into(),
            "grosse".into(),
        ],
        Some(word) => vec![word.to_string()],
        None => bail!(
            "usage: cargo run -p adjpos-morph --example lookup -- <lexicon> [--demo | <word>]"
        ),
    };

    let lex = Lexicon::load_with_mode(&lexicon_path, LoadMode::Mmap)
        .with_context(|| format!("loading lexicon from {}", lexicon_path.display()))?;
    let morph = Morphology::french();
    let overrides = LemmaOverrides::builtin();

    println!("Lexicon: {}", lexicon_path.display());

    for word in words {
        println!("\nSurface: {}", word);
        if let Some(found) = overrides.get(&word) {
            println!("  override -> {}", found.lemma);
        }
        for pos in [Pos::Noun, Pos::Verb, Pos::Adj, Pos::Adv] {
            let candidates = morph.lemmas_for(pos, &word, |p, lemma| lex.lemma_exists(p, lemma));
            if candidates.is_empty() {
                continue;
            }
            println!("  {:?}:", pos);
            for cand in candidates {
                println!("    {:<10} [{:?}]", cand.lemma, cand.source);
            }
        }
    }

    Ok(())
}
