/// Query id to organism mapping (two-column TSV, no header)
use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use std::io::BufRead;
use std::path::Path;

use crate::io::open_input;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRecord {
    pub query_id: String,
    pub organism: String,
}

/// Lookup table keyed by query id; a repeated key keeps the last organism
#[derive(Debug, Clone, Default)]
pub struct OrganismMap {
    entries: IndexMap<String, String>,
}

impl OrganismMap {
    pub fn from_records(records: impl IntoIterator<Item = MappingRecord>) -> Self {
        let mut entries = IndexMap::new();
        for record in records {
            entries.insert(record.query_id, record.organism);
        }
        OrganismMap { entries }
    }

    pub fn organism_for(&self, query_id: &str) -> Option<&str> {
        self.entries.get(query_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn parse_mapping<R: BufRead>(reader: R) -> Result<Vec<MappingRecord>> {
    let mut records = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.trim_end_matches('\r').split('\t');
        match (fields.next(), fields.next()) {
            (Some(query_id), Some(organism)) => records.push(MappingRecord {
                query_id: query_id.to_string(),
                organism: organism.to_string(),
            }),
            _ => bail!("Mapping line {} has fewer than 2 fields", i + 1),
        }
    }

    Ok(records)
}

pub fn read_mapping_file<P: AsRef<Path>>(path: P) -> Result<Vec<MappingRecord>> {
    let path = path.as_ref();
    let reader = open_input(path)?;
    parse_mapping(reader).with_context(|| format!("Failed to read mapping {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mapping() {
        let records = parse_mapping("Q1\tapis\nQ2\tbombus\n\n".as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].organism, "bombus");
    }

    #[test]
    fn test_missing_column_is_error() {
        assert!(parse_mapping("Q1\n".as_bytes()).is_err());
    }

    #[test]
    fn test_last_entry_wins() {
        let records = parse_mapping("Q1\tapis\nQ1\tvespa\n".as_bytes()).unwrap();
        let map = OrganismMap::from_records(records);
        assert_eq!(map.len(), 1);
        assert_eq!(map.organism_for("Q1"), Some("vespa"));
        assert_eq!(map.organism_for("Q2"), None);
    }
}
