//! Base 2D layout for the relationship graph
//!
//! The layout engine is a collaborator of the styling step: it only has to
//! return one coordinate per node. [`SpringLayout`] is a Fruchterman-Reingold
//! force-directed layout with random initial positions, rescaled so every
//! coordinate falls in [-1, 1].

use indexmap::IndexMap;
use rand::{Rng, RngCore};

use crate::network::RelationshipGraph;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Node name to position, in graph node order
pub type Layout = IndexMap<String, Point>;

pub trait LayoutEngine {
    fn compute(&self, graph: &RelationshipGraph, rng: &mut dyn RngCore) -> Layout;
}

#[derive(Debug, Clone)]
pub struct SpringLayout {
    pub iterations: usize,
    /// Stop early once the mean per-node displacement falls below this
    pub threshold: f64,
}

impl Default for SpringLayout {
    fn default() -> Self {
        SpringLayout {
            iterations: 50,
            threshold: 1e-4,
        }
    }
}

impl LayoutEngine for SpringLayout {
    fn compute(&self, graph: &RelationshipGraph, rng: &mut dyn RngCore) -> Layout {
        let n = graph.node_count();
        let names = graph.nodes().map(|(name, _)| name.to_string());

        if n == 0 {
            return Layout::new();
        }
        if n == 1 {
            return names.map(|name| (name, Point { x: 0.0, y: 0.0 })).collect();
        }

        let mut adjacent = vec![vec![false; n]; n];
        for (i, j) in graph.edge_indices() {
            adjacent[i][j] = true;
            adjacent[j][i] = true;
        }

        let mut pos: Vec<[f64; 2]> = (0..n).map(|_| [rng.gen::<f64>(), rng.gen::<f64>()]).collect();

        let k = (1.0 / n as f64).sqrt();
        let span = |axis: usize, pos: &[[f64; 2]]| {
            let (lo, hi) = pos
                .iter()
                .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p[axis]), hi.max(p[axis])));
            hi - lo
        };
        let mut temperature = span(0, &pos).max(span(1, &pos)) * 0.1;
        let cooling = temperature / (self.iterations as f64 + 1.0);

        for _ in 0..self.iterations {
            let mut displacement = vec![[0.0f64; 2]; n];

            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let dx = pos[i][0] - pos[j][0];
                    let dy = pos[i][1] - pos[j][1];
                    let distance = (dx * dx + dy * dy).sqrt().max(0.01);
                    let attraction = if adjacent[i][j] { distance / k } else { 0.0 };
                    let force = k * k / (distance * distance) - attraction;
                    displacement[i][0] += dx * force;
                    displacement[i][1] += dy * force;
                }
            }

            let mut moved = 0.0;
            for (p, d) in pos.iter_mut().zip(&displacement) {
                let mut length = (d[0] * d[0] + d[1] * d[1]).sqrt();
                if length < 0.01 {
                    length = 0.1;
                }
                let step = [d[0] * temperature / length, d[1] * temperature / length];
                p[0] += step[0];
                p[1] += step[1];
                moved += step[0] * step[0] + step[1] * step[1];
            }

            temperature -= cooling;
            if moved.sqrt() / (n as f64) < self.threshold {
                break;
            }
        }

        rescale(&mut pos);
        names
            .zip(pos)
            .map(|(name, p)| (name, Point { x: p[0], y: p[1] }))
            .collect()
    }
}

/// Center on the mean and scale so the largest coordinate magnitude is 1
fn rescale(pos: &mut [[f64; 2]]) {
    let n = pos.len() as f64;
    let mean = pos
        .iter()
        .fold([0.0, 0.0], |acc, p| [acc[0] + p[0] / n, acc[1] + p[1] / n]);

    let mut limit = 0.0f64;
    for p in pos.iter_mut() {
        p[0] -= mean[0];
        p[1] -= mean[1];
        limit = limit.max(p[0].abs()).max(p[1].abs());
    }

    if limit > 0.0 {
        for p in pos.iter_mut() {
            p[0] /= limit;
            p[1] /= limit;
        }
    }
}
