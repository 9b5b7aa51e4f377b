/// Stage drivers shared by the `filter_blast` and `network_graph` binaries
use anyhow::{Context, Result};
use log::{info, warn};
use rand::RngCore;
use std::path::{Path, PathBuf};

use crate::blast::read_blast_file;
use crate::identifiers::IdentifierResolver;
use crate::layout::LayoutEngine;
use crate::merge::{filter_by_length, merge_records, read_reduced_file, LengthWindow};
use crate::network::build_graph;
use crate::normalize::{
    normalize_records, output_file_name, write_empty_placeholder, write_normalized,
    NormalizeConfig, OutputStatus,
};
use crate::organism_map::{read_mapping_file, OrganismMap};
use crate::render::{ImageFormat, Renderer};
use crate::style::derive_style;

/// Run the normalization stage and return the path written
///
/// A zero-byte input skips parsing entirely and produces the `EMPTY`
/// placeholder file.
pub fn run_normalize(config: &NormalizeConfig, input: &Path) -> Result<PathBuf> {
    let size = std::fs::metadata(input)
        .with_context(|| format!("Failed to stat {}", input.display()))?
        .len();

    if size == 0 {
        info!("FILE SIZE: 0 - EMPTY FILE");
        let path = config
            .output_dir
            .join(output_file_name(&config.id, &config.dtype, OutputStatus::Empty));
        write_empty_placeholder(&path)?;
        info!("Saved placeholder {}", path.display());
        return Ok(path);
    }

    info!("FILE SIZE: {size} - RUNNING JOB");
    let records = read_blast_file(input)?;
    let resolver = IdentifierResolver::standard()?;
    let normalized = normalize_records(records, config.identity_threshold, &resolver);

    let path = config
        .output_dir
        .join(output_file_name(&config.id, &config.dtype, OutputStatus::Filtered));
    write_normalized(&path, &normalized)?;
    info!("Saved {} records to {}", normalized.len(), path.display());

    Ok(path)
}

/// Configuration for the graph stage
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Data type tag, upper-cased in the output name
    pub data_type: String,
    pub filter_max: i64,
    pub filter_min: i64,
    pub format: ImageFormat,
    pub output_dir: PathBuf,
    /// Prefix of the output name, see [`output_timestamp`]
    pub timestamp: String,
}

/// Local time as `W<week>@<dd>-<mm>-<yyyy>@<HHMMSS>`
pub fn output_timestamp() -> String {
    chrono::Local::now().format("W%W@%d-%m-%Y@%H%M%S").to_string()
}

/// `{timestamp}-filt{max}-{min}-{DATATYPE}.{ext}`
pub fn network_file_name(config: &NetworkConfig) -> String {
    format!(
        "{}-filt{}-{}-{}.{}",
        config.timestamp,
        config.filter_max,
        config.filter_min,
        config.data_type.to_uppercase(),
        config.format.extension()
    )
}

/// Run the graph stage
///
/// Returns `Ok(None)` without writing anything when the length window is
/// invalid (`filter_max < 1` or `filter_max <= filter_min`).
pub fn run_network<L, R>(
    config: &NetworkConfig,
    blast_out: &Path,
    id_mapping: &Path,
    layout: &L,
    renderer: &R,
    rng: &mut dyn RngCore,
) -> Result<Option<PathBuf>>
where
    L: LayoutEngine,
    R: Renderer,
{
    let hits = read_reduced_file(blast_out)?;
    let organisms = OrganismMap::from_records(read_mapping_file(id_mapping)?);
    let merged = merge_records(&hits, &organisms);
    info!(
        "Merged {} of {} hits with {} mapping entries",
        merged.len(),
        hits.len(),
        organisms.len()
    );

    let Some(window) = LengthWindow::new(config.filter_max, config.filter_min) else {
        warn!(
            "Invalid length window (max {}, min {}), no graph produced",
            config.filter_max, config.filter_min
        );
        return Ok(None);
    };

    let output = config.output_dir.join(network_file_name(config));
    info!("---- Checking input options ----");
    info!("Mapping File    : {}", id_mapping.display());
    info!("BLAST output    : {}", blast_out.display());
    info!("Data Type       : {}", config.data_type.to_uppercase());
    info!("Max filter      : {}", window.max);
    info!("Min filter      : {}", window.min);
    info!("Generating graph: {}", output.display());

    let filtered = filter_by_length(merged, window);
    let graph = build_graph(&filtered);
    info!(
        "Graph has {} nodes and {} edges from {} hits",
        graph.node_count(),
        graph.edge_count(),
        filtered.len()
    );

    let base_layout = layout.compute(&graph, rng);
    let style = derive_style(&graph, &filtered, &base_layout, rng);
    renderer.render(&graph, &style, &output)?;

    Ok(Some(output))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_file_name() {
        let config = NetworkConfig {
            data_type: "pep".to_string(),
            filter_max: 1_000_000,
            filter_min: 0,
            format: ImageFormat::Png,
            output_dir: PathBuf::from("."),
            timestamp: "W42@19-10-2026@101500".to_string(),
        };
        assert_eq!(
            network_file_name(&config),
            "W42@19-10-2026@101500-filt1000000-0-PEP.png"
        );
    }

    #[test]
    fn test_timestamp_shape() {
        let ts = output_timestamp();
        assert!(ts.starts_with('W'));
        assert_eq!(ts.matches('@').count(), 2);
    }
}
