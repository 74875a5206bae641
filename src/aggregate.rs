use float_ord::FloatOrd;

use crate::{
    util::{mean, mean_color},
    Direction, QuadId, Quads, TextBlock,
};

/// Most frequent direction among `directions`. Ties go to the direction seen
/// first.
pub(crate) fn majority_direction(directions: impl IntoIterator<Item = Direction>) -> Direction {
    let mut counts: Vec<(Direction, usize)> = Vec::with_capacity(2);
    for direction in directions {
        match counts.iter_mut().find(|(seen, _)| *seen == direction) {
            Some((_, count)) => *count += 1,
            None => counts.push((direction, 1)),
        }
    }
    counts
        .into_iter()
        .fold(None, |best: Option<(Direction, usize)>, (direction, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((direction, count)),
        })
        .map(|(direction, _)| direction)
        .unwrap_or(Direction::Horizontal)
}

/// Orders lines for reading: top to bottom for horizontal text, right to left
/// for vertical text. Lines at the same position keep their order.
pub fn sort_reading_order(quads: Quads<'_>, members: &mut [QuadId], direction: Direction) {
    match direction {
        Direction::Horizontal => members.sort_by_key(|id| FloatOrd(quads[*id].centroid.y())),
        Direction::Vertical => members.sort_by_key(|id| FloatOrd(-quads[*id].centroid.x())),
    }
}

pub fn aggregate_region(quads: Quads<'_>, region: &[QuadId]) -> TextBlock {
    let slice = quads.as_slice();
    let members = move || region.iter().map(move |id| &slice[id.index()]);

    let fg_color = mean_color(members().map(|quad| &quad.fg_color));
    let bg_color = mean_color(members().map(|quad| &quad.bg_color));
    let direction = majority_direction(members().map(|quad| quad.angle.direction()));

    let mut order = region.to_vec();
    sort_reading_order(quads, &mut order, direction);

    let font_size = members()
        .map(|quad| quad.font_size)
        .min_by_key(|size| FloatOrd(*size))
        .unwrap_or(0.0);
    let angle = mean(members().map(|quad| quad.angle.radians())).to_degrees() - 90.0;
    let prob = mean(members().map(|quad| quad.prob));

    TextBlock {
        lines: order.iter().map(|id| quads[*id].pts).collect(),
        texts: order.iter().map(|id| quads[*id].text.clone()).collect(),
        members: order,
        direction,
        font_size,
        angle,
        prob,
        fg_color,
        bg_color,
    }
}
