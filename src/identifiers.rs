//! Query identifier resolution
//!
//! BLAST query names in these pipelines pack two identifiers into one string,
//! e.g. `GENE(ORGANISM)`, `ACC_TRANSCRIPT_` or `SPECIES_ACCESSION`. Resolution
//! runs an ordered list of extraction strategies over the whole batch and uses
//! the first one that matches anything; the last strategy is the fallback and
//! is always used when reached.
//!
//! After extraction, capture columns that failed on more than half of the
//! batch are discarded, the surviving columns are collapsed into a
//! (primary, secondary) pair, gaps are back-filled from the other side and
//! anything still missing becomes [`REGEX_FAIL`].

use anyhow::Result;
use log::{debug, info};
use regex::Regex;

/// Marker written when no identifier could be extracted for a field
pub const REGEX_FAIL: &str = "REGEXF";

/// Which output field a capture group feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Primary,
    Secondary,
}

#[derive(Debug, Clone)]
struct CaptureColumn {
    group: &'static str,
    slot: Slot,
    prefix: Option<&'static str>,
}

/// One regex-based way of splitting a composite query identifier
#[derive(Debug, Clone)]
pub struct ExtractionStrategy {
    name: &'static str,
    regex: Regex,
    columns: Vec<CaptureColumn>,
    /// The strategy is accepted if any of these groups matched on any record
    required: Vec<&'static str>,
}

/// Captured values, one column per capture group, one row per record
type CaptureTable = Vec<Vec<Option<String>>>;

impl ExtractionStrategy {
    /// `NAME(TAG)` or `NAME_TAG_`
    pub fn bracketed_or_underscored() -> Result<Self> {
        Ok(ExtractionStrategy {
            name: "bracketed-or-underscored",
            regex: Regex::new(
                r"(?P<name>\S+)\((?P<tag>\S+)\)|(?P<alt_name>\S+)_(?P<alt_tag>\S+)_",
            )?,
            columns: vec![
                CaptureColumn { group: "name", slot: Slot::Primary, prefix: None },
                CaptureColumn { group: "tag", slot: Slot::Secondary, prefix: None },
                CaptureColumn { group: "alt_name", slot: Slot::Primary, prefix: None },
                CaptureColumn { group: "alt_tag", slot: Slot::Secondary, prefix: None },
            ],
            required: vec!["name", "alt_tag"],
        })
    }

    /// Split at the first underscore; the tail is tagged with `ID:`
    pub fn underscore_split() -> Result<Self> {
        Ok(ExtractionStrategy {
            name: "underscore-split",
            regex: Regex::new(r"(?P<name>[^\s_]+)_(?P<tag>\S+)")?,
            columns: vec![
                CaptureColumn { group: "name", slot: Slot::Primary, prefix: None },
                CaptureColumn { group: "tag", slot: Slot::Secondary, prefix: Some("ID:") },
            ],
            required: Vec::new(),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn extract<S: AsRef<str>>(&self, query_ids: &[S]) -> CaptureTable {
        let mut table: CaptureTable = vec![Vec::with_capacity(query_ids.len()); self.columns.len()];

        for id in query_ids {
            let caps = self.regex.captures(id.as_ref());
            for (column, values) in self.columns.iter().zip(table.iter_mut()) {
                let value = caps
                    .as_ref()
                    .and_then(|c| c.name(column.group))
                    .map(|m| match column.prefix {
                        Some(prefix) => format!("{prefix}{}", m.as_str()),
                        None => m.as_str().to_string(),
                    });
                values.push(value);
            }
        }

        table
    }

    fn accepts(&self, table: &CaptureTable) -> bool {
        if self.required.is_empty() {
            return true;
        }
        self.columns
            .iter()
            .zip(table)
            .filter(|(column, _)| self.required.contains(&column.group))
            .any(|(_, values)| values.iter().any(Option::is_some))
    }
}

/// Resolved identifier pair for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIds {
    pub primary: String,
    pub secondary: String,
}

/// Output of a batch resolution
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Name of the strategy whose captures were used
    pub strategy: &'static str,
    /// Positionally aligned with the input
    pub ids: Vec<ResolvedIds>,
}

pub struct IdentifierResolver {
    strategies: Vec<ExtractionStrategy>,
}

impl IdentifierResolver {
    pub fn new(strategies: Vec<ExtractionStrategy>) -> Self {
        IdentifierResolver { strategies }
    }

    /// Bracketed/underscored first, underscore split as fallback
    pub fn standard() -> Result<Self> {
        Ok(Self::new(vec![
            ExtractionStrategy::bracketed_or_underscored()?,
            ExtractionStrategy::underscore_split()?,
        ]))
    }

    pub fn resolve<S: AsRef<str>>(&self, query_ids: &[S]) -> Resolution {
        let n = query_ids.len();

        let mut chosen: Option<(&ExtractionStrategy, CaptureTable)> = None;
        for (i, strategy) in self.strategies.iter().enumerate() {
            let table = strategy.extract(query_ids);
            debug!(
                "Strategy {}: unmatched per column {:?}",
                strategy.name(),
                missing_counts(&table)
            );
            let is_last = i + 1 == self.strategies.len();
            if strategy.accepts(&table) || is_last {
                if i > 0 {
                    info!("Using fallback identifier pattern '{}'", strategy.name());
                }
                chosen = Some((strategy, table));
                break;
            }
        }

        let Some((strategy, table)) = chosen else {
            return Resolution {
                strategy: "none",
                ids: vec![
                    ResolvedIds {
                        primary: REGEX_FAIL.to_string(),
                        secondary: REGEX_FAIL.to_string()
                    };
                    n
                ],
            };
        };

        // Sparse columns are discarded
        let surviving: Vec<(&CaptureColumn, &Vec<Option<String>>)> = strategy
            .columns
            .iter()
            .zip(&table)
            .filter(|(column, values)| {
                let missing = values.iter().filter(|v| v.is_none()).count();
                let keep = missing * 2 <= n;
                if !keep {
                    debug!("Dropping sparse capture '{}' ({missing}/{n} unmatched)", column.group);
                }
                keep
            })
            .collect();

        let slot_value = |row: usize, slot: Slot| -> Option<String> {
            surviving
                .iter()
                .filter(|(column, _)| column.slot == slot)
                .find_map(|(_, values)| values[row].clone())
        };

        let mut primary: Vec<Option<String>> = (0..n).map(|row| slot_value(row, Slot::Primary)).collect();
        let mut secondary: Vec<Option<String>> =
            (0..n).map(|row| slot_value(row, Slot::Secondary)).collect();

        back_fill(&mut primary, &mut secondary);

        let ids = primary
            .into_iter()
            .zip(secondary)
            .map(|(p, s)| ResolvedIds {
                primary: p.unwrap_or_else(|| REGEX_FAIL.to_string()),
                secondary: s.unwrap_or_else(|| REGEX_FAIL.to_string()),
            })
            .collect();

        Resolution {
            strategy: strategy.name(),
            ids,
        }
    }
}

fn missing_counts(table: &CaptureTable) -> Vec<usize> {
    table
        .iter()
        .map(|values| values.iter().filter(|v| v.is_none()).count())
        .collect()
}

/// Fill primary from secondary, then secondary from the (now filled) primary
fn back_fill(primary: &mut [Option<String>], secondary: &mut [Option<String>]) {
    for (p, s) in primary.iter_mut().zip(secondary.iter()) {
        if p.is_none() {
            *p = s.clone();
        }
    }
    for (s, p) in secondary.iter_mut().zip(primary.iter()) {
        if s.is_none() {
            *s = p.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pair(primary: &str, secondary: &str) -> ResolvedIds {
        ResolvedIds {
            primary: primary.to_string(),
            secondary: secondary.to_string(),
        }
    }

    fn resolve(ids: &[&str]) -> Resolution {
        IdentifierResolver::standard().unwrap().resolve(ids)
    }

    #[test]
    fn test_bracketed_form() {
        let res = resolve(&["Q1(ORG1)", "Q2(ORG2)"]);
        assert_eq!(res.strategy, "bracketed-or-underscored");
        assert_eq!(res.ids, vec![pair("Q1", "ORG1"), pair("Q2", "ORG2")]);
    }

    #[test]
    fn test_underscored_form_moves_into_primary_slots() {
        let res = resolve(&["ENSG_0001_", "gene_abc_def_"]);
        assert_eq!(res.strategy, "bracketed-or-underscored");
        assert_eq!(res.ids, vec![pair("ENSG", "0001"), pair("gene_abc", "def")]);
    }

    #[test]
    fn test_fallback_split_when_nothing_matches() {
        let res = resolve(&["apis_mellifera", "xyz_1", "plain"]);
        assert_eq!(res.strategy, ExtractionStrategy::underscore_split().unwrap().name());
        assert_eq!(
            res.ids,
            vec![pair("apis", "ID:mellifera"), pair("xyz", "ID:1"), pair(REGEX_FAIL, REGEX_FAIL)]
        );
    }

    #[test]
    fn test_fallback_not_used_when_any_record_matches() {
        // One bracketed hit is enough to keep the first strategy, even though
        // its columns end up too sparse to survive.
        let res = resolve(&["Q1(ORG1)", "a_b", "c_d", "e_f"]);
        assert_eq!(res.strategy, "bracketed-or-underscored");
        assert!(res.ids.iter().all(|ids| *ids == pair(REGEX_FAIL, REGEX_FAIL)));
    }

    #[test]
    fn test_minority_records_get_sentinel() {
        let res = resolve(&["Q1(ORG1)", "Q2(ORG2)", "gene_x_"]);
        assert_eq!(res.ids[2], pair(REGEX_FAIL, REGEX_FAIL));
        assert_eq!(res.ids[0], pair("Q1", "ORG1"));
    }

    #[test]
    fn test_even_split_keeps_both_forms() {
        let res = resolve(&["Q1(ORG1)", "gene_x_"]);
        assert_eq!(res.ids, vec![pair("Q1", "ORG1"), pair("gene", "x")]);
    }

    #[test]
    fn test_back_fill_is_two_pass() {
        let mut primary = vec![None, Some("a".to_string()), None];
        let mut secondary = vec![Some("b".to_string()), None, None];
        back_fill(&mut primary, &mut secondary);
        assert_eq!(primary, vec![Some("b".to_string()), Some("a".to_string()), None]);
        assert_eq!(secondary, vec![Some("b".to_string()), Some("a".to_string()), None]);
    }

    #[test]
    fn test_empty_batch() {
        assert!(resolve(&[] as &[&str]).ids.is_empty());
    }
}
