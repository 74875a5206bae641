use float_ord::FloatOrd;
use geo::Coord;

use crate::TextBlock;

/// Page-level ordering applied to merged blocks after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageOrder {
    /// Keep the order the merger emitted.
    #[default]
    Emission,
    /// Manga order: rows top to bottom, right to left within a row.
    RightToLeft,
    /// Western order: higher blocks first, leftmost first among equals.
    TopToBottom,
}

/// Tops closer than this fraction of the mean block height share a row.
const ROW_TOLERANCE: f32 = 0.7;

fn bounds(block: &TextBlock) -> (Coord<f32>, Coord<f32>) {
    block
        .bounding_rect()
        .map(|rect| (rect.min(), rect.max()))
        .unwrap_or((Coord::zero(), Coord::zero()))
}

/// Sorts blocks by their combined bounding boxes.
pub fn sort_page_order(blocks: &mut [TextBlock], order: PageOrder) {
    match order {
        PageOrder::Emission => {}
        PageOrder::RightToLeft => sort_manga_rows(blocks),
        PageOrder::TopToBottom => blocks.sort_by_cached_key(|block| {
            let (min, _) = bounds(block);
            (FloatOrd(min.y), FloatOrd(min.x))
        }),
    }
}

/// Each block joins the first row whose anchor top lies within tolerance of
/// its own top, otherwise it starts a new row anchored at its top.
fn sort_manga_rows(blocks: &mut [TextBlock]) {
    if blocks.is_empty() {
        return;
    }
    let boxes = blocks.iter().map(bounds).collect::<Vec<_>>();
    let mean_height = boxes.iter().map(|(min, max)| max.y - min.y).sum::<f32>() / boxes.len() as f32;
    let tolerance = mean_height * ROW_TOLERANCE;

    let mut anchors: Vec<f32> = Vec::new();
    let rows = boxes
        .iter()
        .map(|(min, _)| {
            match anchors.iter().position(|anchor| (min.y - anchor).abs() < tolerance) {
                Some(row) => row,
                None => {
                    anchors.push(min.y);
                    anchors.len() - 1
                }
            }
        })
        .collect::<Vec<_>>();
    log::trace!("Grouped {} blocks into {} rows", blocks.len(), anchors.len());

    let keys = rows
        .iter()
        .zip(&boxes)
        .map(|(row, (min, _))| (FloatOrd(anchors[*row]), FloatOrd(-min.x)))
        .collect::<Vec<_>>();
    let mut order = (0..blocks.len()).collect::<Vec<_>>();
    order.sort_by_key(|idx| keys[*idx]);

    let sorted = order.iter().map(|idx| blocks[*idx].clone()).collect::<Vec<_>>();
    blocks.clone_from_slice(&sorted);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, QuadId};

    fn block(id: usize, x: f32, y: f32) -> TextBlock {
        TextBlock {
            members: vec![QuadId(id)],
            lines: vec![[
                Coord { x, y },
                Coord { x: x + 10.0, y },
                Coord { x: x + 10.0, y: y + 10.0 },
                Coord { x, y: y + 10.0 },
            ]],
            texts: vec![String::new()],
            direction: Direction::Horizontal,
            font_size: 10.0,
            angle: -90.0,
            prob: 1.0,
            fg_color: crate::BLACK,
            bg_color: crate::WHITE,
        }
    }

    fn ids(blocks: &[TextBlock]) -> Vec<usize> {
        blocks.iter().map(|block| block.members[0].0).collect()
    }

    #[test]
    fn page_orders() {
        let blocks = vec![block(0, 0.0, 0.0), block(1, 100.0, 50.0), block(2, 100.0, 0.0)];

        let mut emitted = blocks.clone();
        sort_page_order(&mut emitted, PageOrder::Emission);
        assert_eq!(ids(&emitted), vec![0, 1, 2]);

        // Blocks 0 and 2 share the top row; 2 is further right.
        let mut manga = blocks.clone();
        sort_page_order(&mut manga, PageOrder::RightToLeft);
        assert_eq!(ids(&manga), vec![2, 0, 1]);

        let mut western = blocks;
        sort_page_order(&mut western, PageOrder::TopToBottom);
        assert_eq!(ids(&western), vec![0, 2, 1]);
    }

    fn tall_block(id: usize, x: f32, y: f32, h: f32) -> TextBlock {
        let mut tall = block(id, x, y);
        tall.lines[0][2].y = y + h;
        tall.lines[0][3].y = y + h;
        tall
    }

    #[test]
    fn slightly_offset_tops_share_a_row() {
        // Mean height 40, tolerance 28: tops 20, 0 and 25 form one row, 100
        // another.
        let mut blocks = vec![
            tall_block(0, 0.0, 20.0, 40.0),
            tall_block(1, 300.0, 100.0, 40.0),
            tall_block(2, 200.0, 0.0, 40.0),
            tall_block(3, 100.0, 25.0, 40.0),
        ];
        sort_page_order(&mut blocks, PageOrder::RightToLeft);
        assert_eq!(ids(&blocks), vec![2, 3, 0, 1]);

        let mut empty: Vec<TextBlock> = Vec::new();
        sort_page_order(&mut empty, PageOrder::RightToLeft);
        assert!(empty.is_empty());
    }
}
