//! Groups detected text lines into text blocks for translation and typesetting.
//!
//! Lines close to each other (relative to their font size) are linked into a
//! proximity graph. Each connected component is then checked with statistics
//! over its minimum spanning tree and either kept whole or split, and every
//! final region becomes a [`TextBlock`] with its lines in reading order.

mod aggregate;
pub mod collab;
mod error;
pub mod graph;
mod merge;
mod order;
mod result;
pub mod split;
pub mod util;

pub use aggregate::{aggregate_region, sort_reading_order};
pub use collab::{translate_block, TextRecognizer, TranslatedLine, Translator};
pub use error::*;
pub use merge::{Blocks, MergedBlocks};
pub use order::{sort_page_order, PageOrder};
pub use result::*;
pub use split::{split_region, SplitParams};

use tracing::instrument;

/// How a component that fails the spread test is broken up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitStrategy {
    /// Re-derive the connected components of the complete distance graph.
    /// A complete graph is always connected, so such a component is kept
    /// whole.
    #[default]
    Components,
    /// Cut the unusually long edges of the minimum spanning tree and recurse on
    /// the pieces.
    PruneLongEdges,
}

pub struct MergerBuilder {
    options: MergeOptions,
}

impl MergerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines closer than `factor * font_size` are linked.
    pub fn proximity_factor(mut self, factor: f32) -> Self {
        self.options.proximity_factor = factor;
        self
    }

    /// Slack for two-line regions: they stay together when closer than
    /// `(1 + gamma) * font_size`.
    pub fn gamma(mut self, gamma: f32) -> Self {
        self.options.gamma = gamma;
        self
    }

    pub fn sigma(mut self, sigma: f32) -> Self {
        self.options.sigma = sigma;
        self
    }

    pub fn split_strategy(mut self, strategy: SplitStrategy) -> Self {
        self.options.split_strategy = strategy;
        self
    }

    pub fn options(mut self, options: MergeOptions) -> Self {
        self.options = options;
        self
    }

    #[instrument(skip(self))]
    pub fn build(self) -> Result<Merger> {
        self.options.validate()?;
        Ok(Merger {
            options: self.options,
        })
    }
}

impl Default for MergerBuilder {
    fn default() -> Self {
        Self {
            options: MergeOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeOptions {
    pub proximity_factor: f32,
    pub gamma: f32,
    pub sigma: f32,
    pub split_strategy: SplitStrategy,
}

impl MergeOptions {
    fn validate(&self) -> Result<()> {
        let check = |name: &'static str, value: f32, positive: bool| {
            let ok = value.is_finite() && if positive { value > 0.0 } else { value >= 0.0 };
            if ok {
                Ok(())
            } else {
                let bound = if positive { "positive" } else { "non-negative" };
                Err(MergeError::InvalidOption {
                    name,
                    reason: format!("{value} is not a finite {bound} number"),
                })
            }
        };
        check("proximity_factor", self.proximity_factor, true)?;
        check("gamma", self.gamma, false)?;
        check("sigma", self.sigma, false)
    }

    fn split_params(&self) -> SplitParams {
        SplitParams {
            gamma: self.gamma,
            sigma: self.sigma,
            strategy: self.split_strategy,
        }
    }
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            proximity_factor: 1.3,
            gamma: 0.5,
            sigma: 2.0,
            split_strategy: SplitStrategy::Components,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Merger {
    options: MergeOptions,
}

impl Merger {
    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// The page size is accepted but unused.
    #[instrument(skip(self, quads), fields(len = quads.len()))]
    pub fn merge<'a>(
        &self,
        quads: &'a [Quadrilateral],
        _width: u32,
        _height: u32,
    ) -> MergedBlocks<'a> {
        MergedBlocks::new(
            Quads::new(quads),
            self.options.proximity_factor,
            self.options.split_params(),
        )
    }

    /// Like [`Merger::merge`], but first rejects lines that are degenerate or
    /// carry out-of-range attributes.
    pub fn merge_checked<'a>(
        &self,
        quads: &'a [Quadrilateral],
        width: u32,
        height: u32,
    ) -> Result<MergedBlocks<'a>> {
        for (index, quad) in quads.iter().enumerate() {
            quad.validate(Some(index))?;
        }
        Ok(self.merge(quads, width, height))
    }
}

impl Default for Merger {
    fn default() -> Self {
        Self {
            options: MergeOptions::default(),
        }
    }
}

pub fn merge_text_regions(quads: &[Quadrilateral], width: u32, height: u32) -> MergedBlocks<'_> {
    Merger::default().merge(quads, width, height)
}
