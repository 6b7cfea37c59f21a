//! CSV reports for spreadsheet analysis.
//!
//! Numbers are written as `=<n>` formulas so spreadsheet tools keep them as
//! literal numbers instead of guessing a format.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::corpus::CorpusError;
use crate::counts::{BinRecord, CountRecord, Tally};
use crate::matrix::CooccurrenceMatrix;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Cell {
    Text(String),
    Number(usize),
}

impl Cell {
    fn render(&self) -> String {
        match self {
            Cell::Number(n) => format!("={n}"),
            Cell::Text(text) if text.contains([',', '"', '\n', '\r']) => {
                format!("\"{}\"", text.replace('"', "\"\""))
            }
            Cell::Text(text) => text.clone(),
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::Text(text.to_string())
    }
}

impl From<usize> for Cell {
    fn from(n: usize) -> Self {
        Cell::Number(n)
    }
}

/// A header and data rows.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CsvTable {
    header: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl CsvTable {
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let header: Vec<String> = self
            .header
            .iter()
            .map(|h| Cell::Text(h.clone()).render())
            .collect();
        writeln!(out, "{}", header.join(","))?;
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(Cell::render).collect();
            writeln!(out, "{}", cells.join(","))?;
        }
        Ok(())
    }
}

/// Write a table unless it has no data rows. Returns whether a file was written.
pub fn write_csv(path: impl AsRef<Path>, table: &CsvTable) -> Result<bool, CorpusError> {
    let path = path.as_ref();
    if table.is_empty() {
        info!("no data for {}, skipping", path.display());
        return Ok(false);
    }
    let file = File::create(path).map_err(|err| CorpusError::io(path, err))?;
    let mut writer = BufWriter::new(file);
    table
        .write_to(&mut writer)
        .and_then(|_| writer.flush())
        .map_err(|err| CorpusError::io(path, err))?;
    info!("saved {} rows to {}", table.len(), path.display());
    Ok(true)
}

pub fn counts_table(records: &[CountRecord]) -> CsvTable {
    let mut table = CsvTable::new([
        "Lemma",
        "Full Count",
        "Older",
        "Younger",
        "Older Prenominal",
        "Older Postnominal",
        "Younger Prenominal",
        "Younger Postnominal",
    ]);
    for r in records {
        table.push(vec![
            r.lemma.as_str().into(),
            r.total.into(),
            r.older.into(),
            r.younger.into(),
            r.older_pre.into(),
            r.older_post.into(),
            r.younger_pre.into(),
            r.younger_post.into(),
        ]);
    }
    table
}

pub fn standards_table(records: &[CountRecord]) -> CsvTable {
    let mut table = CsvTable::new(["adjective", "prenominal count", "postnominal count"]);
    for r in records {
        table.push(vec![
            r.lemma.as_str().into(),
            r.prenominal().into(),
            r.postnominal().into(),
        ]);
    }
    table
}

/// One row per adjective lemma, one column per noun lemma.
pub fn matrix_table(matrix: &CooccurrenceMatrix) -> CsvTable {
    let nouns: Vec<String> = matrix
        .rows()
        .next()
        .map(|(_, row)| row.keys().cloned().collect())
        .unwrap_or_default();
    let mut table = CsvTable::new(std::iter::once(String::new()).chain(nouns.iter().cloned()));
    for (adjective, row) in matrix.rows() {
        let mut cells = vec![Cell::from(adjective)];
        cells.extend(nouns.iter().map(|n| Cell::Number(row.get(n).copied().unwrap_or(0))));
        table.push(cells);
    }
    table
}

/// Child age bins, then (optionally) an adult total row.
pub fn bins_table(bins: &[BinRecord], adult: Option<&Tally>) -> CsvTable {
    let mut table = CsvTable::new([
        "Low (months)",
        "High (months)",
        "Adjectives",
        "Prenominal",
        "Postnominal",
        "Sentences",
        "Words",
    ]);
    for bin in bins {
        let mut row = vec![
            Cell::Number(bin.low as usize),
            Cell::Number(bin.high as usize),
        ];
        row.extend(tally_cells(&bin.counts));
        table.push(row);
    }
    if let Some(adult) = adult {
        let mut row = vec![Cell::from("adult"), Cell::from("")];
        row.extend(tally_cells(adult));
        table.push(row);
    }
    table
}

fn tally_cells(tally: &Tally) -> [Cell; 5] {
    [
        tally.total.into(),
        tally.pre.into(),
        tally.post.into(),
        tally.sentences.into(),
        tally.words.into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Vocabulary;

    fn render(table: &CsvTable) -> String {
        let mut out = Vec::new();
        table.write_to(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn numbers_are_formulas_and_text_is_quoted() {
        let mut table = CsvTable::new(["name", "n"]);
        table.push(vec!["a, b".into(), 3usize.into()]);
        table.push(vec!["say \"hi\"".into(), 0usize.into()]);
        assert_eq!(render(&table), "name,n\n\"a, b\",=3\n\"say \"\"hi\"\"\",=0\n");
    }

    #[test]
    fn empty_reports_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.csv");
        assert!(!write_csv(&path, &counts_table(&[])).unwrap());
        assert!(!path.exists());

        let mut record = CountRecord::new("petit");
        record.total = 1;
        assert!(write_csv(&path, &counts_table(&[record])).unwrap());
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.ends_with("petit,=1,=0,=0,=0,=0,=0,=0\n"));
    }

    #[test]
    fn matrix_rows_follow_lemma_order() {
        let vocabulary = Vocabulary::new(
            vec!["petit".into(), "grand".into()],
            vec!["chien".into(), "chat".into()],
        );
        let mut matrix = CooccurrenceMatrix::new(&vocabulary);
        matrix.increment("petit", "chat");
        assert_eq!(
            render(&matrix_table(&matrix)),
            ",chat,chien\ngrand,=0,=0\npetit,=1,=0\n"
        );
    }

    #[test]
    fn bins_end_with_the_adult_row() {
        let bins = vec![BinRecord {
            low: 19,
            high: 25,
            counts: Tally {
                total: 2,
                pre: 1,
                post: 1,
                sentences: 3,
                words: 9,
            },
        }];
        let adult = Tally::default();
        let text = render(&bins_table(&bins, Some(&adult)));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "=19,=25,=2,=1,=1,=3,=9");
        assert_eq!(lines[2], "adult,,=0,=0,=0,=0,=0");
    }
}
