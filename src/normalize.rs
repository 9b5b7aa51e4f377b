/// Normalization of filtered BLAST hits into the canonical 8-column table
use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::blast::AlignmentRecord;
use crate::identifiers::IdentifierResolver;
use crate::identity::{filter_by_identity, round_identity};
use crate::strand::{canonical_coords, Strand};

/// Status token written on the normal path. It does not track the
/// identity threshold actually used.
pub const FILTERED_STATUS: &str = "filtered90";
/// Status token and placeholder content for zero-byte input
pub const EMPTY_STATUS: &str = "EMPTY";

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub subject_id: String,
    pub subject_start: u64,
    pub subject_end: u64,
    pub primary_identifier: String,
    pub percent_identity_rounded: i64,
    pub strand: Strand,
    pub secondary_identifier: String,
    /// Copy of the secondary identifier, kept as an extra join key
    pub tertiary_identifier: String,
}

impl NormalizedRecord {
    pub fn to_tsv_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.subject_id,
            self.subject_start,
            self.subject_end,
            self.primary_identifier,
            self.percent_identity_rounded,
            self.strand,
            self.secondary_identifier,
            self.tertiary_identifier,
        )
    }
}

/// Configuration for the normalization stage
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Sample/assembly identifier used in the output name
    pub id: String,
    /// Data type tag used in the output name
    pub dtype: String,
    /// Records must have identity strictly above this
    pub identity_threshold: f64,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStatus {
    Filtered,
    Empty,
}

impl OutputStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputStatus::Filtered => FILTERED_STATUS,
            OutputStatus::Empty => EMPTY_STATUS,
        }
    }
}

/// `{id}-{dtype}-{status}.tsv`
pub fn output_file_name(id: &str, dtype: &str, status: OutputStatus) -> String {
    format!("{id}-{dtype}-{}.tsv", status.as_str())
}

/// Filter, orient, resolve identifiers and sort a batch of BLAST hits
pub fn normalize_records(
    records: Vec<AlignmentRecord>,
    identity_threshold: f64,
    resolver: &IdentifierResolver,
) -> Vec<NormalizedRecord> {
    let total = records.len();
    let kept = filter_by_identity(records, identity_threshold);
    info!(
        "Kept {} of {} records with identity > {}",
        kept.len(),
        total,
        identity_threshold
    );

    let query_ids: Vec<&str> = kept.iter().map(|r| r.query_id.as_str()).collect();
    let resolution = resolver.resolve(&query_ids);
    info!("Resolved query identifiers with pattern '{}'", resolution.strategy);

    let mut normalized: Vec<NormalizedRecord> = kept
        .iter()
        .zip(resolution.ids)
        .map(|(record, ids)| {
            let strand = Strand::from_subject_coords(record.subject_start, record.subject_end);
            NormalizedRecord {
                subject_id: record.subject_id.clone(),
                subject_start: record.subject_start,
                subject_end: record.subject_end,
                primary_identifier: ids.primary,
                percent_identity_rounded: round_identity(record.percent_identity),
                strand,
                tertiary_identifier: ids.secondary.clone(),
                secondary_identifier: ids.secondary,
            }
        })
        .collect();

    // Swap after the output shape is assembled; strand stays as computed
    for record in &mut normalized {
        let (start, end) = canonical_coords(record.strand, record.subject_start, record.subject_end);
        record.subject_start = start;
        record.subject_end = end;
    }

    sort_records(&mut normalized);
    normalized
}

/// Stable sort by subject id, then canonical subject start
pub fn sort_records(records: &mut [NormalizedRecord]) {
    records.sort_by(|a, b| {
        a.subject_id
            .cmp(&b.subject_id)
            .then(a.subject_start.cmp(&b.subject_start))
    });
}

pub fn write_normalized<P: AsRef<Path>>(path: P, records: &[NormalizedRecord]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for record in records {
        writeln!(writer, "{}", record.to_tsv_line())?;
    }
    writer.flush()?;

    Ok(())
}

/// Single-column placeholder written instead of the 8-column table
pub fn write_empty_placeholder<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, format!("{EMPTY_STATUS}\n"))
        .with_context(|| format!("Failed to write {}", path.display()))
}
