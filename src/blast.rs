use anyhow::{bail, Context, Result};
use std::io::BufRead;
use std::path::Path;

use crate::io::open_input;

/// Number of columns in BLAST `-outfmt 6` output
pub const BLAST_COLUMNS: usize = 12;

/// One row of tabular BLAST output (`-outfmt 6`)
///
/// Coordinates are 1-based as BLAST writes them; `subject_start > subject_end`
/// means the hit lies on the reverse strand of the subject.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentRecord {
    pub query_id: String,
    pub subject_id: String,
    pub percent_identity: f64,
    pub alignment_length: u64,
    pub mismatch_count: u64,
    pub gap_open_count: u64,
    pub query_start: u64,
    pub query_end: u64,
    pub subject_start: u64,
    pub subject_end: u64,
    pub e_value: f64,
    pub bit_score: f64,
}

/// Parse a single numeric column, naming the column on failure
fn parse_field<T>(fields: &[&str], index: usize, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    fields[index]
        .trim()
        .parse()
        .with_context(|| format!("Invalid {name} '{}'", fields[index]))
}

impl AlignmentRecord {
    /// Parse one tab-separated line with exactly the twelve BLAST columns
    pub fn parse_line(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.trim_end_matches(['\n', '\r']).split('\t').collect();

        if fields.len() < BLAST_COLUMNS {
            bail!(
                "BLAST line has {} fields, expected {}",
                fields.len(),
                BLAST_COLUMNS
            );
        }

        Ok(AlignmentRecord {
            query_id: fields[0].to_string(),
            subject_id: fields[1].to_string(),
            percent_identity: parse_field(&fields, 2, "pident")?,
            alignment_length: parse_field(&fields, 3, "length")?,
            mismatch_count: parse_field(&fields, 4, "mismatch")?,
            gap_open_count: parse_field(&fields, 5, "gapopen")?,
            query_start: parse_field(&fields, 6, "qstart")?,
            query_end: parse_field(&fields, 7, "qend")?,
            subject_start: parse_field(&fields, 8, "sstart")?,
            subject_end: parse_field(&fields, 9, "send")?,
            e_value: parse_field(&fields, 10, "evalue")?,
            bit_score: parse_field(&fields, 11, "bitscore")?,
        })
    }
}

pub struct BlastReader<R: BufRead> {
    reader: R,
    line_number: usize,
}

impl<R: BufRead> BlastReader<R> {
    pub fn new(reader: R) -> Self {
        BlastReader {
            reader,
            line_number: 0,
        }
    }

    /// Read the next record, skipping blank lines
    pub fn read_record(&mut self) -> Result<Option<AlignmentRecord>> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .reader
                .read_line(&mut line)
                .with_context(|| format!("Failed to read line {}", self.line_number + 1))?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            if !line.trim().is_empty() {
                break;
            }
        }

        let record = AlignmentRecord::parse_line(&line)
            .with_context(|| format!("Malformed BLAST record at line {}", self.line_number))?;
        Ok(Some(record))
    }

    pub fn read_all(&mut self) -> Result<Vec<AlignmentRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }
}

/// Read a whole BLAST table from file (auto-detects bgzip compression)
pub fn read_blast_file<P: AsRef<Path>>(path: P) -> Result<Vec<AlignmentRecord>> {
    let path = path.as_ref();
    let mut reader = BlastReader::new(open_input(path)?);
    reader
        .read_all()
        .with_context(|| format!("Failed to read {}", path.display()))
}
