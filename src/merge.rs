/// Join of normalized hits with the organism mapping, and hit-length filtering
use anyhow::{anyhow, bail, Context, Result};
use std::io::BufRead;
use std::path::Path;

use crate::io::open_input;
use crate::normalize::EMPTY_STATUS;
use crate::organism_map::OrganismMap;
use crate::strand::Strand;

/// First six columns of the normalized table, as read back by the graph stage
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedRecord {
    pub subject_id: String,
    pub subject_start: i64,
    pub subject_end: i64,
    pub query_id: String,
    pub percent_identity_rounded: i64,
    pub strand: Strand,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub subject_id: String,
    pub query_id: String,
    pub organism: String,
    pub percent_identity_rounded: i64,
    pub hit_length: i64,
}

impl ReducedRecord {
    /// Parse a line with at least six tab-separated columns; extra columns are ignored
    pub fn parse_line(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.trim_end_matches(['\n', '\r']).split('\t').collect();
        if fields.len() < 6 {
            bail!("Normalized line has {} fields, expected at least 6", fields.len());
        }

        Ok(ReducedRecord {
            subject_id: fields[0].to_string(),
            subject_start: fields[1]
                .parse()
                .with_context(|| format!("Invalid sstart '{}'", fields[1]))?,
            subject_end: fields[2]
                .parse()
                .with_context(|| format!("Invalid send '{}'", fields[2]))?,
            query_id: fields[3].to_string(),
            percent_identity_rounded: fields[4]
                .parse()
                .with_context(|| format!("Invalid pident '{}'", fields[4]))?,
            strand: fields[5].parse().map_err(|e: String| anyhow!(e))?,
        })
    }
}

/// Read the normalization output; the `EMPTY` placeholder yields no records
pub fn parse_reduced<R: BufRead>(reader: R) -> Result<Vec<ReducedRecord>> {
    let mut records = Vec::new();
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }

    if lines.len() == 1 && lines[0].trim() == EMPTY_STATUS {
        return Ok(records);
    }

    for (i, line) in lines.iter().enumerate() {
        let record = ReducedRecord::parse_line(line)
            .with_context(|| format!("Malformed normalized record {}", i + 1))?;
        records.push(record);
    }
    Ok(records)
}

pub fn read_reduced_file<P: AsRef<Path>>(path: P) -> Result<Vec<ReducedRecord>> {
    let path = path.as_ref();
    let reader = open_input(path)?;
    parse_reduced(reader).with_context(|| format!("Failed to read {}", path.display()))
}

/// Inner join on query id; hits without a mapping entry are dropped
pub fn merge_records(records: &[ReducedRecord], organisms: &OrganismMap) -> Vec<MergedRecord> {
    records
        .iter()
        .filter_map(|r| {
            organisms.organism_for(&r.query_id).map(|organism| MergedRecord {
                subject_id: r.subject_id.clone(),
                query_id: r.query_id.clone(),
                organism: organism.to_string(),
                percent_identity_rounded: r.percent_identity_rounded,
                hit_length: r.subject_end - r.subject_start,
            })
        })
        .collect()
}

/// Inclusive hit-length window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthWindow {
    pub max: i64,
    pub min: i64,
}

impl LengthWindow {
    /// Returns `None` when `max < 1` or `max <= min`; such a window aborts
    /// the graph stage entirely.
    pub fn new(max: i64, min: i64) -> Option<Self> {
        if max >= 1 && max > min {
            Some(LengthWindow { max, min })
        } else {
            None
        }
    }

    pub fn contains(&self, length: i64) -> bool {
        self.min <= length && length <= self.max
    }
}

pub fn filter_by_length(records: Vec<MergedRecord>, window: LengthWindow) -> Vec<MergedRecord> {
    records
        .into_iter()
        .filter(|r| window.contains(r.hit_length))
        .collect()
}
