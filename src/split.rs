use tracing::instrument;

use crate::{
    graph::{CompleteGraph, WeightedEdge},
    util::{mean, mean_std},
    QuadId, Quads, SplitStrategy,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitParams {
    pub gamma: f32,
    pub sigma: f32,
    pub strategy: SplitStrategy,
}

impl Default for SplitParams {
    fn default() -> Self {
        Self {
            gamma: 0.5,
            sigma: 2.0,
            strategy: SplitStrategy::Components,
        }
    }
}

/// Spread of a region's minimum spanning tree.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TreeStats {
    pub sorted: Vec<f32>,
    pub mean: f32,
    pub std: f32,
    pub std_threshold: f32,
}

impl TreeStats {
    fn new(tree: &[WeightedEdge], font_size: f32) -> Self {
        let mut sorted = tree.iter().map(|edge| edge.weight).collect::<Vec<_>>();
        sorted.sort_by_key(|weight| float_ord::FloatOrd(*weight));
        let (mean, std) = mean_std(&sorted);
        Self {
            sorted,
            mean,
            std,
            std_threshold: (0.3 * font_size + 5.0).max(5.0),
        }
    }

    fn is_tight(&self, sigma: f32) -> bool {
        let shortest = self.sorted.first().copied().unwrap_or(0.0);
        shortest <= self.mean + self.std * sigma && self.std < self.std_threshold
    }
}

/// Splits one connected region into sub-regions whose members belong to the
/// same text block. The returned sets partition `region`; members keep their
/// relative order.
#[instrument(level = "trace", skip(quads, region), fields(len = region.len()))]
pub fn split_region(quads: Quads<'_>, region: &[QuadId], params: SplitParams) -> Vec<Vec<QuadId>> {
    match region {
        [] | [_] => vec![region.to_vec()],
        [a, b] => {
            let font_size = quads[*a].font_size.max(quads[*b].font_size);
            if quads.distance(*a, *b) < (1.0 + params.gamma) * font_size {
                vec![region.to_vec()]
            } else {
                vec![vec![*a], vec![*b]]
            }
        }
        _ => split_cluster(quads, region, params),
    }
}

fn split_cluster(quads: Quads<'_>, region: &[QuadId], params: SplitParams) -> Vec<Vec<QuadId>> {
    let graph = CompleteGraph::new(quads, region);
    let tree = graph.minimum_spanning_tree();
    let font_size = mean(region.iter().map(|id| quads[*id].font_size));
    let stats = TreeStats::new(&tree, font_size);
    if stats.is_tight(params.sigma) {
        return vec![region.to_vec()];
    }
    log::trace!(
        "Region of {} is loose (mean {}, std {}, threshold {})",
        region.len(),
        stats.mean,
        stats.std,
        stats.std_threshold
    );

    let parts = match params.strategy {
        SplitStrategy::Components => graph.connected_components(),
        SplitStrategy::PruneLongEdges => {
            let kept = prune_long_edges(&tree, &stats, params.sigma);
            graph.components_of(&kept)
        }
    };

    let mut regions = Vec::with_capacity(parts.len());
    for part in parts {
        if part.len() < region.len() {
            regions.extend(split_region(quads, &part, params));
        } else {
            // No progress; recursing would never terminate.
            regions.push(part);
        }
    }
    regions
}

/// Drops tree edges longer than `mean + sigma * std`, or the longest edge when
/// none is that long, so the remaining forest always has more than one tree.
fn prune_long_edges(tree: &[WeightedEdge], stats: &TreeStats, sigma: f32) -> Vec<WeightedEdge> {
    let cutoff = stats.mean + stats.std * sigma;
    let kept = tree
        .iter()
        .filter(|edge| edge.weight <= cutoff)
        .copied()
        .collect::<Vec<_>>();
    if kept.len() < tree.len() {
        return kept;
    }
    let longest = tree
        .iter()
        .enumerate()
        .max_by_key(|(_, edge)| float_ord::FloatOrd(edge.weight))
        .map(|(idx, _)| idx);
    tree.iter()
        .enumerate()
        .filter(|(idx, _)| Some(*idx) != longest)
        .map(|(_, edge)| *edge)
        .collect()
}
