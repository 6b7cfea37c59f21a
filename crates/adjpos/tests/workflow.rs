use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use adjpos::report::{bins_table, counts_table, write_csv};
use adjpos::{
    AgeSplit, BinSpec, CorpusEntry, LemmaNormalizer, LexiconLemmatizer, LexiconTagger,
    MatrixConfig, Partition, Pipeline, SpeakerTable, TaggerRegistry, Utterance, WordList,
    build_matrices, build_matrices_parallel, count_bins, count_lemmas, merge_json, read_json,
    review_entries, save_json,
};
use adjpos_lexicon::Lexicon;
use adjpos_morph::LemmaOverrides;
use adjpos_types::{Age, Sex, SpeakerFields, SpeakerProfile};

const LEXICON: &[&str] = &[
    "le\tdet\tle",
    "la\tdet\tle",
    "un\tdet\tun",
    "une\tdet\tun",
    "chat\tnc\tchat",
    "chats\tnc\tchat",
    "maison\tnc\tmaison",
    "noir\tadj\tnoir",
    "noirs\tadj\tnoir",
    "grande\tadj\tgrand",
    "grand\tadj\tgrand",
    "petit\tadj\tpetit",
    "petits\tadj\tpetit",
    "bleue\tadj\tbleu",
    "dort\tv\tdormir",
];

fn write_lexicon(dir: &Path) -> Arc<Lexicon> {
    let path = dir.join("lexicon.tsv");
    let mut file = std::fs::File::create(&path).unwrap();
    for line in LEXICON {
        writeln!(file, "{line}").unwrap();
    }
    Arc::new(Lexicon::load(&path).unwrap())
}

fn pipeline(lexicon: Arc<Lexicon>) -> Pipeline {
    let tagger = Arc::new(LexiconTagger::new(Arc::clone(&lexicon)));
    Pipeline::new(
        TaggerRegistry::new().with("fra", tagger),
        LemmaNormalizer::new(
            LemmaOverrides::builtin(),
            Arc::new(LexiconLemmatizer::new(lexicon)),
        ),
    )
}

fn child(years: f64) -> Arc<SpeakerProfile> {
    Arc::new(SpeakerProfile::new(SpeakerFields {
        id: "CHI".into(),
        role: "Target_Child".into(),
        name: "Léa".into(),
        sex: Sex::Female,
        age: Some(Age::from_decimal(years)),
        language: "fra".into(),
    }))
}

fn utterance(speaker: &Arc<SpeakerProfile>, text: &str) -> Utterance {
    Utterance {
        file: "lea.cha".into(),
        speaker: Arc::clone(speaker),
        text: text.into(),
        tokens: None,
    }
}

fn analyzed(pipeline: &Pipeline) -> Vec<CorpusEntry> {
    let speaker = child(3.0);
    let (entries, stats) = pipeline.analyze([
        utterance(&speaker, "le chat noir dort."),
        utterance(&speaker, "les petits chats"),
        utterance(&speaker, "une maison bleue"),
        utterance(&speaker, "il dort"),
    ]);
    assert_eq!(stats.processed, 4);
    assert_eq!(stats.dropped, 0);
    entries
}

#[test]
fn analysed_sentences_survive_a_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let entries = analyzed(&pipeline(write_lexicon(dir.path())));
    let path = dir.path().join("data.json");

    assert_eq!(save_json(&path, &entries).unwrap(), 3);
    let reloaded = read_json(&path).unwrap();
    assert_eq!(reloaded.len(), 3);
    assert_eq!(reloaded[0].file, "lea.cha");
    assert_eq!(reloaded[0].sentence.text(), "le chat noir dort.");
    assert_eq!(reloaded[0].sentence.groups(), entries[0].sentence.groups());
    assert_eq!(
        reloaded[1].sentence.prenominal()[0].adjective_lemmas().collect::<Vec<_>>(),
        vec!["petit"]
    );
    assert_eq!(reloaded[1].sentence.prenominal()[0].noun_lemma(), Some("chat"));
    assert!(Arc::ptr_eq(
        reloaded[0].sentence.speaker_arc(),
        reloaded[2].sentence.speaker_arc()
    ));

    assert_eq!(merge_json(&path, &reloaded[..1]).unwrap(), 1);
    assert_eq!(read_json(&path).unwrap().len(), 4);
}

#[test]
fn review_then_counts() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(write_lexicon(dir.path()));
    let outcome = review_entries(
        analyzed(&pipeline),
        &WordList::from_words(["noir", "petits"]),
        &WordList::new(),
        &WordList::new(),
    );
    assert_eq!(outcome.verified.len(), 3);
    assert_eq!(outcome.unverified.len(), 1);
    assert_eq!(outcome.unverified[0].sentence.text(), "une maison bleue");

    // Review re-pairs the tokens, so lemmas are attached again afterwards.
    let (verified, stats) = pipeline.lemmatize(outcome.verified);
    assert_eq!(stats.processed, 3);
    let sentences: Vec<_> = verified.into_iter().map(|e| e.sentence).collect();
    let records = count_lemmas(&sentences, &["noir", "petit"], AgeSplit::default());
    assert_eq!(records[0].lemma, "noir");
    assert_eq!((records[0].younger_post, records[0].older), (1, 0));
    assert_eq!(records[1].younger_pre, 1);

    let csv = dir.path().join("counts.csv");
    assert!(write_csv(&csv, &counts_table(&records)).unwrap());
    let text = std::fs::read_to_string(&csv).unwrap();
    assert!(text.starts_with("Lemma,Full Count,Older,Younger,"));
    assert!(text.contains("noir,=1,=0,=1,=0,=0,=0,=1"));
}

#[test]
fn bins_and_matrices_from_one_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let sentences: Vec<_> = analyzed(&pipeline(write_lexicon(dir.path())))
        .into_iter()
        .map(|e| e.sentence)
        .collect();

    let bins = count_bins(&sentences, &["noir", "petit", "bleu"], BinSpec::default());
    let hit = bins.iter().find(|b| b.low == 31).unwrap();
    assert_eq!(hit.counts.total, 3);
    assert_eq!((hit.counts.pre, hit.counts.post), (1, 2));
    assert_eq!(bins_table(&bins, None).len(), 5);

    let config = MatrixConfig {
        min_adjective_count: 1,
        min_noun_count: 1,
        split: AgeSplit::default(),
    };
    let all = build_matrices(&sentences, &config);
    assert_eq!(all.get(Partition::All).get("noir", "chat"), 1);
    assert_eq!(all.get(Partition::YoungerPre).get("petit", "chat"), 1);
    assert_eq!(all.get(Partition::Older).total(), 0);

    let halves = vec![sentences[..2].to_vec(), sentences[2..].to_vec()];
    assert_eq!(build_matrices_parallel(&halves, &config), all);
}

#[test]
fn ingest_reads_orfeo_directories() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("cefc");
    std::fs::create_dir_all(corpus.join("nested")).unwrap();

    SpeakerTable::from_profiles([SpeakerProfile::new(SpeakerFields {
        id: "L1".into(),
        role: "Speaker".into(),
        name: "Paul".into(),
        sex: Sex::Male,
        age: Some(Age::from_decimal(40.0)),
        language: "fra".into(),
    })])
    .save(corpus.join("nested/a.speakers.json"))
    .unwrap();
    std::fs::write(
        corpus.join("nested/a.orfeo"),
        "1\tune\tun\tDET\t_\tL1\n2\tgrande\tgrand\tADJ\t_\tL1\n3\tmaison\tmaison\tNOM\t_\tL1\n\n",
    )
    .unwrap();
    // No speaker table next to this one.
    std::fs::write(corpus.join("b.orfeo"), "1\tchat\tchat\tNOM\t_\tL1\n").unwrap();

    let (entries, stats) = pipeline(write_lexicon(dir.path())).ingest(&corpus).unwrap();
    assert_eq!(stats.failed_files, 1);
    assert_eq!(stats.processed, 1);
    assert_eq!(entries.len(), 1);
    let group = &entries[0].sentence.prenominal()[0];
    assert_eq!(group.noun_lemma(), Some("maison"));
    assert_eq!(group.adjective_lemmas().collect::<Vec<_>>(), vec!["grand"]);
    assert!(entries[0].sentence.speaker().is_adult());
}
