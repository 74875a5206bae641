use float_ord::FloatOrd;
use tracing::instrument;

use crate::{QuadId, Quads};

/// Disjoint-set forest with path halving and union by rank.
pub(crate) struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Joins the sets of `x` and `y`. Returns `false` if they were already
    /// joined.
    pub fn union(&mut self, x: usize, y: usize) -> bool {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return false;
        }
        match self.rank[root_x].cmp(&self.rank[root_y]) {
            std::cmp::Ordering::Less => self.parent[root_x] = root_y,
            std::cmp::Ordering::Greater => self.parent[root_y] = root_x,
            std::cmp::Ordering::Equal => {
                self.parent[root_y] = root_x;
                self.rank[root_x] += 1;
            }
        }
        true
    }
}

/// Connected components over nodes `0..len`. Components come out in
/// discovery order (by their lowest node) with members ascending.
pub(crate) fn connected_components(
    len: usize,
    edges: impl IntoIterator<Item = (usize, usize)>,
) -> Vec<Vec<usize>> {
    let mut sets = UnionFind::new(len);
    for (u, v) in edges {
        sets.union(u, v);
    }
    let mut slot: Vec<Option<usize>> = vec![None; len];
    let mut components: Vec<Vec<usize>> = Vec::new();
    for node in 0..len {
        let root = sets.find(node);
        match slot[root] {
            Some(idx) => components[idx].push(node),
            None => {
                slot[root] = Some(components.len());
                components.push(vec![node]);
            }
        }
    }
    components
}

/// Undirected graph linking quadrilaterals whose centroids lie within a
/// multiple of the font size of each other.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityGraph {
    nodes: usize,
    edges: Vec<(QuadId, QuadId)>,
}

impl ProximityGraph {
    /// Each unordered pair is tested once, in input order, against the font
    /// size of its lower-indexed member only.
    #[instrument(level = "debug", skip(quads), fields(nodes = quads.len()))]
    pub fn build(quads: Quads<'_>, factor: f32) -> Self {
        let mut edges = Vec::new();
        for u in quads.ids() {
            for v in quads.ids().skip(u.0 + 1) {
                if quads.distance(u, v) < quads[u].font_size * factor {
                    edges.push((u, v));
                }
            }
        }
        log::debug!("Proximity graph has {} edges over {} nodes", edges.len(), quads.len());
        Self {
            nodes: quads.len(),
            edges,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes
    }

    pub fn edges(&self) -> &[(QuadId, QuadId)] {
        &self.edges
    }

    pub fn connected_components(&self) -> Vec<Vec<QuadId>> {
        connected_components(self.nodes, self.edges.iter().map(|(u, v)| (u.0, v.0)))
            .into_iter()
            .map(|component| component.into_iter().map(QuadId).collect())
            .collect()
    }
}

/// Edge between two positions of a [`CompleteGraph`]'s node list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WeightedEdge {
    pub u: usize,
    pub v: usize,
    pub weight: f32,
}

/// Every pair of a region's members, weighted by centroid distance.
pub(crate) struct CompleteGraph<'a> {
    nodes: &'a [QuadId],
    edges: Vec<WeightedEdge>,
}

impl<'a> CompleteGraph<'a> {
    pub fn new(quads: Quads<'_>, nodes: &'a [QuadId]) -> Self {
        let mut edges = Vec::with_capacity(nodes.len() * nodes.len().saturating_sub(1) / 2);
        for (u, a) in nodes.iter().enumerate() {
            for (v, b) in nodes.iter().enumerate().skip(u + 1) {
                edges.push(WeightedEdge {
                    u,
                    v,
                    weight: quads.distance(*a, *b),
                });
            }
        }
        Self { nodes, edges }
    }

    /// Kruskal's algorithm. Equal weights keep their pair order.
    pub fn minimum_spanning_tree(&self) -> Vec<WeightedEdge> {
        let mut sorted = self.edges.clone();
        sorted.sort_by_key(|edge| FloatOrd(edge.weight));
        let mut sets = UnionFind::new(self.nodes.len());
        let mut tree = Vec::with_capacity(self.nodes.len().saturating_sub(1));
        for edge in sorted {
            if sets.union(edge.u, edge.v) {
                tree.push(edge);
                if tree.len() + 1 == self.nodes.len() {
                    break;
                }
            }
        }
        tree
    }

    pub fn connected_components(&self) -> Vec<Vec<QuadId>> {
        self.components_of(&self.edges)
    }

    /// Components induced by a subset of this graph's edges.
    pub fn components_of(&self, edges: &[WeightedEdge]) -> Vec<Vec<QuadId>> {
        connected_components(self.nodes.len(), edges.iter().map(|edge| (edge.u, edge.v)))
            .into_iter()
            .map(|component| component.into_iter().map(|pos| self.nodes[pos]).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use geo::Coord;

    use super::*;
    use crate::Quadrilateral;

    fn quad_at(x: f32, y: f32, font_size: f32) -> Quadrilateral {
        let half = font_size / 2.0;
        Quadrilateral::new(
            [
                Coord { x: x - half, y: y - half },
                Coord { x: x + half, y: y - half },
                Coord { x: x + half, y: y + half },
                Coord { x: x - half, y: y + half },
            ],
            font_size,
        )
    }

    #[test]
    fn components_follow_discovery_order() {
        let components = connected_components(6, [(4, 1), (2, 5), (5, 0)]);
        assert_eq!(components, vec![vec![0, 2, 5], vec![1, 4], vec![3]]);
        assert!(connected_components(0, []).is_empty());
    }

    #[test]
    fn proximity_uses_lower_index_font_size() {
        // 20 apart: 10 * 1.3 = 13 fails, 20 * 1.3 = 26 would pass.
        let small_first = [quad_at(0.0, 0.0, 10.0), quad_at(20.0, 0.0, 20.0)];
        let graph = ProximityGraph::build(Quads::new(&small_first), 1.3);
        assert!(graph.edges().is_empty());
        assert_eq!(graph.connected_components().len(), 2);

        let large_first = [quad_at(0.0, 0.0, 20.0), quad_at(20.0, 0.0, 10.0)];
        let graph = ProximityGraph::build(Quads::new(&large_first), 1.3);
        assert_eq!(graph.edges(), &[(QuadId(0), QuadId(1))]);
        assert_eq!(
            graph.connected_components(),
            vec![vec![QuadId(0), QuadId(1)]]
        );
    }

    #[test]
    fn empty_input_builds_empty_graph() {
        let graph = ProximityGraph::build(Quads::new(&[]), 1.3);
        assert_eq!(graph.node_count(), 0);
        assert!(graph.connected_components().is_empty());
    }

    #[test]
    fn spanning_tree_keeps_shortest_links() {
        let quads = [
            quad_at(0.0, 0.0, 10.0),
            quad_at(3.0, 0.0, 10.0),
            quad_at(3.0, 4.0, 10.0),
            quad_at(100.0, 0.0, 10.0),
        ];
        let nodes = [QuadId(0), QuadId(1), QuadId(2), QuadId(3)];
        let graph = CompleteGraph::new(Quads::new(&quads), &nodes);
        let weights = graph
            .minimum_spanning_tree()
            .into_iter()
            .map(|edge| edge.weight)
            .collect::<Vec<_>>();
        assert_eq!(weights, vec![3.0, 4.0, 97.0]);
        assert_eq!(graph.connected_components(), vec![nodes.to_vec()]);
    }
}
