/// Per-node labels, colors and jittered positions for rendering
use indexmap::{IndexMap, IndexSet};
use rand::Rng;

use crate::layout::{Layout, Point};
use crate::merge::MergedRecord;
use crate::network::{RelationshipGraph, ANCHOR_NODE};

pub const ANCHOR_COLOR: &str = "#F4651F";
/// Color for nodes without an explicit entry (query nodes)
pub const FALLBACK_COLOR: &str = "#C7980A";
pub const LABEL_OFFSET: Point = Point { x: 0.02, y: 0.02 };

#[derive(Debug, Clone)]
pub struct GraphStyle {
    /// Label per node; query nodes get an empty label
    pub labels: IndexMap<String, String>,
    /// Fill color per node, in graph node order
    pub colors: IndexMap<String, String>,
    pub positions: Layout,
    pub label_positions: Layout,
}

fn distinct<'a>(records: &'a [MergedRecord], field: impl Fn(&'a MergedRecord) -> &'a str) -> IndexSet<&'a str> {
    records.iter().map(field).collect()
}

pub fn node_labels(graph: &RelationshipGraph, records: &[MergedRecord]) -> IndexMap<String, String> {
    let queries = distinct(records, |r| r.query_id.as_str());
    graph
        .nodes()
        .map(|(name, _)| {
            let label = if queries.contains(name) { "" } else { name };
            (name.to_string(), label.to_string())
        })
        .collect()
}

/// Uniformly random 24-bit color as `#rrggbb`
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("#{:06x}", rng.gen_range(0..0x1000000u32))
}

/// Anchor gets a fixed color, every distinct organism then every distinct
/// subject draws its own, and remaining nodes fall back to [`FALLBACK_COLOR`]
pub fn node_colors<R: Rng + ?Sized>(
    graph: &RelationshipGraph,
    records: &[MergedRecord],
    rng: &mut R,
) -> IndexMap<String, String> {
    let mut explicit: IndexMap<&str, String> = IndexMap::new();
    explicit.insert(ANCHOR_NODE, ANCHOR_COLOR.to_string());

    let organisms = distinct(records, |r| r.organism.as_str());
    let subjects = distinct(records, |r| r.subject_id.as_str());
    for name in organisms.iter().chain(subjects.iter()) {
        explicit.insert(*name, random_color(rng));
    }

    graph
        .nodes()
        .map(|(name, _)| {
            let color = explicit
                .get(name)
                .cloned()
                .unwrap_or_else(|| FALLBACK_COLOR.to_string());
            (name.to_string(), color)
        })
        .collect()
}

/// Push subjects right and organisms left by a uniform [0, 1) draw each
///
/// Subject membership is checked first, so a name that is both a subject
/// and an organism is only moved right.
pub fn jitter_positions<R: Rng + ?Sized>(
    base: &Layout,
    records: &[MergedRecord],
    rng: &mut R,
) -> Layout {
    let subjects = distinct(records, |r| r.subject_id.as_str());
    let organisms = distinct(records, |r| r.organism.as_str());

    base.iter()
        .map(|(name, point)| {
            let moved = if subjects.contains(name.as_str()) {
                Point { x: point.x + rng.gen::<f64>(), y: point.y }
            } else if organisms.contains(name.as_str()) {
                Point { x: point.x - rng.gen::<f64>(), y: point.y }
            } else {
                *point
            };
            (name.clone(), moved)
        })
        .collect()
}

pub fn label_positions(positions: &Layout) -> Layout {
    positions
        .iter()
        .map(|(name, p)| {
            (
                name.clone(),
                Point { x: p.x + LABEL_OFFSET.x, y: p.y + LABEL_OFFSET.y },
            )
        })
        .collect()
}

pub fn derive_style<R: Rng + ?Sized>(
    graph: &RelationshipGraph,
    records: &[MergedRecord],
    base_layout: &Layout,
    rng: &mut R,
) -> GraphStyle {
    let labels = node_labels(graph, records);
    let colors = node_colors(graph, records, rng);
    let positions = jitter_positions(base_layout, records, rng);
    let label_positions = label_positions(&positions);
    GraphStyle {
        labels,
        colors,
        positions,
        label_positions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::build_graph;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rec(subject: &str, query: &str, organism: &str) -> MergedRecord {
        MergedRecord {
            subject_id: subject.to_string(),
            query_id: query.to_string(),
            organism: organism.to_string(),
            percent_identity_rounded: 99,
            hit_length: 100,
        }
    }

    fn records() -> Vec<MergedRecord> {
        vec![rec("S1", "Q1", "apis"), rec("S2", "Q2", "vespa")]
    }

    fn origin_layout(graph: &RelationshipGraph) -> Layout {
        graph
            .nodes()
            .map(|(name, _)| (name.to_string(), Point { x: 0.0, y: 0.0 }))
            .collect()
    }

    #[test]
    fn test_query_labels_suppressed() {
        let records = records();
        let graph = build_graph(&records);
        let labels = node_labels(&graph, &records);
        assert_eq!(labels["Q1"], "");
        assert_eq!(labels["S1"], "S1");
        assert_eq!(labels["apis"], "apis");
        assert_eq!(labels[ANCHOR_NODE], ANCHOR_NODE);
    }

    #[test]
    fn test_colors() {
        let records = records();
        let graph = build_graph(&records);
        let mut rng = StdRng::seed_from_u64(7);
        let colors = node_colors(&graph, &records, &mut rng);

        assert_eq!(colors.len(), graph.node_count());
        assert_eq!(colors[ANCHOR_NODE], ANCHOR_COLOR);
        assert_eq!(colors["Q1"], FALLBACK_COLOR);
        assert_eq!(colors["Q2"], FALLBACK_COLOR);
        for name in ["S1", "S2", "apis", "vespa"] {
            let color = &colors[name];
            assert_eq!(color.len(), 7);
            assert!(color.starts_with('#'));
            assert!(u32::from_str_radix(&color[1..], 16).is_ok());
        }
    }

    #[test]
    fn test_colors_reproducible_with_seed() {
        let records = records();
        let graph = build_graph(&records);
        let a = node_colors(&graph, &records, &mut StdRng::seed_from_u64(42));
        let b = node_colors(&graph, &records, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_jitter_directions() {
        let records = records();
        let graph = build_graph(&records);
        let base = origin_layout(&graph);
        let moved = jitter_positions(&base, &records, &mut StdRng::seed_from_u64(1));

        for name in ["S1", "S2"] {
            assert!(moved[name].x >= 0.0 && moved[name].x < 1.0);
            assert_eq!(moved[name].y, 0.0);
        }
        for name in ["apis", "vespa"] {
            assert!(moved[name].x <= 0.0 && moved[name].x > -1.0);
        }
        assert_eq!(moved["Q1"], Point { x: 0.0, y: 0.0 });
        assert_eq!(moved[ANCHOR_NODE], Point { x: 0.0, y: 0.0 });
    }

    #[test]
    fn test_subject_wins_over_organism() {
        let records = vec![rec("apis", "Q1", "apis")];
        let base: Layout = [("apis".to_string(), Point { x: 0.5, y: 0.0 })].into_iter().collect();
        let moved = jitter_positions(&base, &records, &mut StdRng::seed_from_u64(3));
        assert!(moved["apis"].x >= 0.5);
    }

    #[test]
    fn test_label_offset() {
        let base: Layout = [("S1".to_string(), Point { x: 1.0, y: -1.0 })].into_iter().collect();
        let labels = label_positions(&base);
        assert!((labels["S1"].x - 1.02).abs() < 1e-12);
        assert!((labels["S1"].y + 0.98).abs() < 1e-12);
    }
}
