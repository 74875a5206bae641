use std::collections::VecDeque;

use tracing::instrument;

use crate::{
    aggregate::aggregate_region,
    graph::ProximityGraph,
    split::{split_region, SplitParams},
    QuadId, Quads, TextBlock,
};

/// Text blocks of one page. Splitting and aggregation run as blocks are
/// pulled, and every [`MergedBlocks::iter`] starts over from the first
/// component.
#[derive(Debug, Clone)]
pub struct MergedBlocks<'a> {
    quads: Quads<'a>,
    components: Vec<Vec<QuadId>>,
    params: SplitParams,
}

impl<'a> MergedBlocks<'a> {
    #[instrument(level = "debug", skip(quads), fields(len = quads.len()))]
    pub(crate) fn new(quads: Quads<'a>, proximity_factor: f32, params: SplitParams) -> Self {
        let components = ProximityGraph::build(quads, proximity_factor).connected_components();
        log::debug!(
            "{} quadrilaterals form {} connected components",
            quads.len(),
            components.len()
        );
        Self {
            quads,
            components,
            params,
        }
    }

    pub fn components(&self) -> &[Vec<QuadId>] {
        &self.components
    }

    pub fn regions(&self) -> impl Iterator<Item = Vec<QuadId>> + '_ {
        self.components
            .iter()
            .flat_map(|component| split_region(self.quads, component, self.params))
    }

    pub fn iter(&self) -> Blocks<'_> {
        Blocks {
            quads: self.quads,
            components: self.components.iter(),
            pending: VecDeque::new(),
            params: self.params,
        }
    }
}

impl<'m> IntoIterator for &'m MergedBlocks<'_> {
    type Item = TextBlock;
    type IntoIter = Blocks<'m>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct Blocks<'m> {
    quads: Quads<'m>,
    components: std::slice::Iter<'m, Vec<QuadId>>,
    pending: VecDeque<Vec<QuadId>>,
    params: SplitParams,
}

impl Iterator for Blocks<'_> {
    type Item = TextBlock;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(region) = self.pending.pop_front() {
                return Some(aggregate_region(self.quads, &region));
            }
            let component = self.components.next()?;
            self.pending
                .extend(split_region(self.quads, component, self.params));
        }
    }
}
