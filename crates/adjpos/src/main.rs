use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use adjpos_lexicon::{Lexicon, LoadMode};
use adjpos_morph::LemmaOverrides;
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

use adjpos::counts::DEFAULT_AGE_THRESHOLD;
use adjpos::matrix::{DEFAULT_MIN_ADJECTIVE_COUNT, DEFAULT_MIN_NOUN_COUNT};
use adjpos::report::{bins_table, counts_table, matrix_table, standards_table, write_csv};
use adjpos::{
    AgeSplit, BinSpec, COLOR_LEMMAS, CorpusEntry, LemmaNormalizer, LexiconLemmatizer,
    LexiconTagger, MatrixConfig, Partition, Pipeline, STANDARD_LEMMAS, TaggedSentence,
    TaggerRegistry, WordList, build_matrices, build_matrices_parallel, build_word_lists,
    collect_lemmas, count_bins, count_lemmas, count_total, merge_json, read_json, review_entries,
    save_json,
};

const DEFAULT_BIN_START: u32 = 19;
const DEFAULT_BIN_WIDTH: u32 = 6;
const DEFAULT_BIN_CEILING: u32 = 48;
const LEXICON_LANGUAGES: &[&str] = &["fra", "fr"];

const WHITELIST_FILE: &str = "whitelist.txt";
const BLACKLIST_FILE: &str = "blacklist.txt";
const NONWORDS_FILE: &str = "non-words.txt";
const VERIFIED_FILE: &str = "verified-groups.json";
const UNVERIFIED_FILE: &str = "unverified-groups.json";

#[derive(Parser)]
#[command(name = "adjpos")]
#[command(about = "Prenominal/postnominal adjective analysis of French speech corpora")]
struct Cli {
    /// Directory reports and JSON files are written to.
    #[arg(long, short, global = true, env = "ADJPOS_OUTPUT", default_value = ".")]
    output: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Debug)]
struct LexiconArgs {
    /// Lefff-style full-form lexicon (`form<TAB>category<TAB>lemma`).
    #[arg(long, env = "ADJPOS_LEXICON")]
    lexicon: Option<PathBuf>,
    #[arg(long, env = "ADJPOS_LEXICON_MODE", default_value = "mmap", value_parser = parse_load_mode)]
    lexicon_mode: LoadMode,
    /// Extra lemma overrides (`surface<TAB>lemma[<TAB>surface]`).
    #[arg(long)]
    overrides: Option<PathBuf>,
}

#[derive(Args, Clone, Copy, Debug)]
struct AgeArgs {
    /// Age in years from which a speaker counts as older.
    #[arg(long, default_value_t = DEFAULT_AGE_THRESHOLD)]
    age_threshold: f64,
}

impl AgeArgs {
    fn split(self) -> AgeSplit {
        AgeSplit::Threshold(self.age_threshold)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Count the sentences in a corpus file.
    Count { input: PathBuf },
    /// Check adjectives against the word lists and split off what needs review.
    Review {
        input: PathBuf,
        #[arg(long)]
        whitelist: Option<PathBuf>,
        #[arg(long)]
        blacklist: Option<PathBuf>,
        #[arg(long)]
        nonwords: Option<PathBuf>,
    },
    /// Grow the word lists from human-verified data.
    Verify {
        input: PathBuf,
        #[arg(long)]
        whitelist: Option<PathBuf>,
        #[arg(long)]
        blacklist: Option<PathBuf>,
    },
    /// Remove non-words and transcription debris, then lemmatize again.
    Repair {
        input: PathBuf,
        #[arg(long)]
        nonwords: Option<PathBuf>,
        #[command(flatten)]
        lexicon: LexiconArgs,
    },
    /// Attach lemmas to every group.
    Lemmatize {
        input: PathBuf,
        #[command(flatten)]
        lexicon: LexiconArgs,
    },
    /// Per-lemma counts by age band and position.
    Counts {
        input: PathBuf,
        #[command(flatten)]
        lexicon: LexiconArgs,
        #[command(flatten)]
        age: AgeArgs,
    },
    /// Counts restricted to color adjectives.
    Colors {
        input: PathBuf,
        #[command(flatten)]
        lexicon: LexiconArgs,
        #[command(flatten)]
        age: AgeArgs,
    },
    /// Adjective/noun co-occurrence matrices for every partition.
    Matrix {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_MIN_ADJECTIVE_COUNT)]
        min_adjective_count: usize,
        #[arg(long, default_value_t = DEFAULT_MIN_NOUN_COUNT)]
        min_noun_count: usize,
        /// Count each input file on its own thread and merge.
        #[arg(long, default_value_t = false)]
        parallel: bool,
        #[command(flatten)]
        lexicon: LexiconArgs,
        #[command(flatten)]
        age: AgeArgs,
    },
    /// Adjective tallies per child age bin, plus an adult total.
    Bins {
        input: PathBuf,
        /// Adult corpus file for the comparison row.
        #[arg(long)]
        adult: Option<PathBuf>,
        /// Adjective lemmas to count, one per line.
        #[arg(long)]
        words: Option<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_BIN_START)]
        start: u32,
        #[arg(long, default_value_t = DEFAULT_BIN_WIDTH)]
        width: u32,
        #[arg(long, default_value_t = DEFAULT_BIN_CEILING)]
        ceiling: u32,
        #[command(flatten)]
        lexicon: LexiconArgs,
    },
    /// Prenominal/postnominal counts for a list of adjectives.
    Standards {
        input: PathBuf,
        #[arg(long)]
        words: Option<PathBuf>,
        #[command(flatten)]
        lexicon: LexiconArgs,
    },
    /// Read an ORFEO corpus directory into a corpus file.
    Ingest {
        dir: PathBuf,
        #[arg(long, default_value = "adult-data.json")]
        name: String,
        #[command(flatten)]
        lexicon: LexiconArgs,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let output = cli.output;

    match cli.command {
        Commands::Count { input } => {
            ensure_file(&input)?;
            let entries = read_json(&input)?;
            println!("There are {} sentences in this file.", entries.len());
        }
        Commands::Review {
            input,
            whitelist,
            blacklist,
            nonwords,
        } => {
            ensure_file(&input)?;
            ensure_dir(&output)?;
            let whitelist = WordList::load(whitelist.unwrap_or_else(|| output.join(WHITELIST_FILE)))?;
            let blacklist = WordList::load(blacklist.unwrap_or_else(|| output.join(BLACKLIST_FILE)))?;
            let nonwords = WordList::load(nonwords.unwrap_or_else(|| output.join(NONWORDS_FILE)))?;
            info!(
                whitelist = whitelist.len(),
                blacklist = blacklist.len(),
                nonwords = nonwords.len(),
                "word lists loaded"
            );

            let outcome = review_entries(read_json(&input)?, &whitelist, &blacklist, &nonwords);
            println!("Sentences left to verify:    {}.", outcome.unverified.len());
            println!("Sentences added as verified: {}.", outcome.verified.len());
            println!("{}", outcome.stats);
            save_json(output.join(UNVERIFIED_FILE), &outcome.unverified)?;
            merge_json(output.join(VERIFIED_FILE), &outcome.verified)?;
        }
        Commands::Verify {
            input,
            whitelist,
            blacklist,
        } => {
            ensure_file(&input)?;
            ensure_dir(&output)?;
            let whitelist_path = whitelist.unwrap_or_else(|| output.join(WHITELIST_FILE));
            let blacklist_path = blacklist.unwrap_or_else(|| output.join(BLACKLIST_FILE));
            let mut whitelist = WordList::load(&whitelist_path)?;
            let mut blacklist = WordList::load(&blacklist_path)?;

            let mut entries = read_json(&input)?;
            let found = build_word_lists(entries.iter_mut().map(|e| &mut e.sentence));
            println!(
                "Found {} whitelist and {} blacklist candidates.",
                found.whitelist.len(),
                found.blacklist.len()
            );
            whitelist.extend(found.whitelist.iter());
            blacklist.extend(found.blacklist.iter());
            whitelist.save(&whitelist_path)?;
            blacklist.save(&blacklist_path)?;
            merge_json(output.join(VERIFIED_FILE), &entries)?;
        }
        Commands::Repair {
            input,
            nonwords,
            lexicon,
        } => {
            ensure_file(&input)?;
            ensure_dir(&output)?;
            let nonwords = WordList::load(nonwords.unwrap_or_else(|| output.join(NONWORDS_FILE)))?;
            let pipeline = load_pipeline(&lexicon)?;
            let (entries, stats) = pipeline.repair(read_json(&input)?, &nonwords);
            println!("{stats}");
            save_json(output.join("repaired-data.json"), &entries)?;
        }
        Commands::Lemmatize { input, lexicon } => {
            ensure_file(&input)?;
            ensure_dir(&output)?;
            let pipeline = load_pipeline(&lexicon)?;
            let (entries, stats) = pipeline.lemmatize(read_json(&input)?);
            println!("{stats}");
            save_json(output.join("lem-data.json"), &entries)?;
        }
        Commands::Counts {
            input,
            lexicon,
            age,
        } => {
            ensure_file(&input)?;
            ensure_dir(&output)?;
            let pipeline = report_pipeline(&lexicon)?;
            let sentences = load_sentences(&input, pipeline.as_ref())?;
            let lemmas = collect_lemmas(&sentences);
            let records = count_lemmas(&sentences, &lemmas, age.split());
            write_csv(output.join("counts.csv"), &counts_table(&records))?;
        }
        Commands::Colors {
            input,
            lexicon,
            age,
        } => {
            ensure_file(&input)?;
            ensure_dir(&output)?;
            let pipeline = report_pipeline(&lexicon)?;
            let sentences = load_sentences(&input, pipeline.as_ref())?;
            let records: Vec<_> = count_lemmas(&sentences, COLOR_LEMMAS, age.split())
                .into_iter()
                .filter(|r| r.total > 0)
                .collect();
            write_csv(output.join("colors.csv"), &counts_table(&records))?;
        }
        Commands::Matrix {
            inputs,
            min_adjective_count,
            min_noun_count,
            parallel,
            lexicon,
            age,
        } => {
            for input in &inputs {
                ensure_file(input)?;
            }
            ensure_dir(&output)?;
            let pipeline = report_pipeline(&lexicon)?;
            let files = inputs
                .iter()
                .map(|input| load_sentences(input, pipeline.as_ref()))
                .collect::<Result<Vec<_>>>()?;
            let config = MatrixConfig {
                min_adjective_count,
                min_noun_count,
                split: age.split(),
            };

            let start = Instant::now();
            let set = if parallel {
                build_matrices_parallel(&files, &config)
            } else {
                let all: Vec<TaggedSentence> = files.into_iter().flatten().collect();
                build_matrices(&all, &config)
            };
            info!("matrices built in {} ms", start.elapsed().as_millis());

            for partition in Partition::EVERY {
                let path = output.join(format!("matrix-{}.csv", partition.name()));
                write_csv(path, &matrix_table(set.get(partition)))?;
            }
        }
        Commands::Bins {
            input,
            adult,
            words,
            start,
            width,
            ceiling,
            lexicon,
        } => {
            ensure_file(&input)?;
            if let Some(adult) = &adult {
                ensure_file(adult)?;
            }
            if width == 0 || start >= ceiling {
                bail!("bins need a positive width and a start below the ceiling");
            }
            ensure_dir(&output)?;
            let lemmas = load_lemma_list(words.as_deref())?;
            let spec = BinSpec {
                start,
                width,
                ceiling,
            };

            let pipeline = report_pipeline(&lexicon)?;
            let children = load_sentences(&input, pipeline.as_ref())?;
            let child_words: usize = children.iter().map(TaggedSentence::word_count).sum();
            println!("The total words in the child data is:  {child_words}");
            let bins = count_bins(&children, &lemmas, spec);
            for bin in &bins {
                println!(
                    "From age {} to {}:  {}.",
                    bin.low, bin.high, bin.counts.total
                );
            }

            let adult_tally = match &adult {
                Some(path) => {
                    let adults = load_sentences(path, pipeline.as_ref())?;
                    let tally = count_total(&adults, &lemmas);
                    println!("The total words in the adult data is:  {}", tally.words);
                    println!("The adult data has:  {}.", tally.total);
                    Some(tally)
                }
                None => None,
            };
            write_csv(
                output.join("bins.csv"),
                &bins_table(&bins, adult_tally.as_ref()),
            )?;
        }
        Commands::Standards {
            input,
            words,
            lexicon,
        } => {
            ensure_file(&input)?;
            ensure_dir(&output)?;
            let lemmas = load_lemma_list(words.as_deref())?;
            let pipeline = report_pipeline(&lexicon)?;
            let sentences = load_sentences(&input, pipeline.as_ref())?;
            let records = count_lemmas(&sentences, &lemmas, AgeSplit::default());
            write_csv(output.join("standards.csv"), &standards_table(&records))?;
        }
        Commands::Ingest { dir, name, lexicon } => {
            if !dir.is_dir() {
                bail!("corpus directory {} does not exist", dir.display());
            }
            ensure_dir(&output)?;
            let target = output_file(&output, &name)?;
            let pipeline = load_pipeline(&lexicon)?;
            let (entries, stats) = pipeline.ingest(&dir)?;
            println!("{stats}");
            save_json(target, &entries)?;
        }
    }

    Ok(())
}

fn ensure_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("input file {} not found or is not a file", path.display());
    }
    Ok(())
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        bail!("output path {} needs to be an existing directory", path.display());
    }
    Ok(())
}

/// A bare file name inside the output directory.
fn output_file(dir: &Path, name: &str) -> Result<PathBuf> {
    let mut components = Path::new(name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single || name.contains(['/', '\\']) {
        bail!("output name {name:?} must be a plain file name");
    }
    Ok(dir.join(name))
}

fn load_pipeline(args: &LexiconArgs) -> Result<Pipeline> {
    let Some(path) = &args.lexicon else {
        bail!("this command needs a lexicon: pass --lexicon or set ADJPOS_LEXICON");
    };
    let start = Instant::now();
    let lexicon = Arc::new(Lexicon::load_with_mode(path, args.lexicon_mode)?);
    info!(
        "lexicon {} loaded in {} ms ({} forms, mode {:?})",
        path.display(),
        start.elapsed().as_millis(),
        lexicon.form_count(),
        args.lexicon_mode
    );

    let mut overrides = LemmaOverrides::builtin();
    if let Some(extra) = &args.overrides {
        overrides.extend_from_file(extra)?;
        info!("{} lemma overrides", overrides.len());
    }

    let mut taggers = TaggerRegistry::new();
    let tagger = Arc::new(LexiconTagger::new(Arc::clone(&lexicon)));
    for language in LEXICON_LANGUAGES {
        taggers.register(language, tagger.clone());
    }
    let normalizer = LemmaNormalizer::new(overrides, Arc::new(LexiconLemmatizer::new(lexicon)));
    Ok(Pipeline::new(taggers, normalizer))
}

/// Pipeline for report commands: only built when a lexicon was given.
fn report_pipeline(args: &LexiconArgs) -> Result<Option<Pipeline>> {
    match args.lexicon {
        Some(_) => load_pipeline(args).map(Some),
        None => Ok(None),
    }
}

/// Read a corpus file for a report, re-lemmatizing when a pipeline is given.
fn load_sentences(input: &Path, pipeline: Option<&Pipeline>) -> Result<Vec<TaggedSentence>> {
    let mut entries: Vec<CorpusEntry> =
        read_json(input).with_context(|| format!("load {}", input.display()))?;
    if let Some(pipeline) = pipeline {
        let (lemmatized, stats) = pipeline.lemmatize(entries);
        println!("{}: {stats}", input.display());
        entries = lemmatized;
    } else {
        let pending = entries
            .iter()
            .filter(|e| {
                let groups = e.sentence.groups();
                !groups
                    .prenominal
                    .iter()
                    .chain(&groups.postnominal)
                    .all(|g| g.is_normalized())
            })
            .count();
        if pending > 0 {
            warn!(
                "{pending} sentences in {} have groups without lemmas; run `lemmatize` first or pass --lexicon",
                input.display()
            );
        }
    }
    Ok(entries.into_iter().map(|e| e.sentence).collect())
}

fn load_lemma_list(path: Option<&Path>) -> Result<Vec<String>> {
    match path {
        Some(path) => {
            ensure_file(path)?;
            let list = WordList::load(path)?;
            Ok(list.iter().map(str::to_lowercase).collect())
        }
        None => Ok(STANDARD_LEMMAS.iter().map(|l| l.to_string()).collect()),
    }
}

fn parse_load_mode(raw: &str) -> Result<LoadMode, String> {
    match raw.to_ascii_lowercase().as_str() {
        "mmap" => Ok(LoadMode::Mmap),
        "owned" => Ok(LoadMode::Owned),
        other => Err(format!("unknown load mode {other:?} (expected mmap or owned)")),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
