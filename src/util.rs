use geo::{BoundingRect, Centroid, Coord, EuclideanDistance, EuclideanLength, Line, MultiPoint, Point, Rect};

use crate::{Quadrilateral, Rgb};

pub(crate) fn centroid_of(pts: &[Coord<f32>; 4]) -> Point<f32> {
    MultiPoint::from(pts.to_vec())
        .centroid()
        .unwrap_or_else(|| Point::from(pts[0]))
}

pub(crate) fn points_rect(points: impl IntoIterator<Item = Coord<f32>>) -> Option<Rect<f32>> {
    points
        .into_iter()
        .map(Point::from)
        .collect::<MultiPoint<f32>>()
        .bounding_rect()
}

/// Length of each edge, starting with the one from the first to the second
/// corner and wrapping around.
pub(crate) fn edge_lengths(pts: &[Coord<f32>; 4]) -> [f32; 4] {
    std::array::from_fn(|i| Line::new(pts[i], pts[(i + 1) % 4]).euclidean_length())
}

pub fn distance(a: &Quadrilateral, b: &Quadrilateral) -> f32 {
    a.centroid.euclidean_distance(&b.centroid)
}

/// Arithmetic mean, `0.0` for no values.
pub(crate) fn mean(values: impl IntoIterator<Item = f32>) -> f32 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0f64, 0usize), |(sum, count), value| {
            (sum + value as f64, count + 1)
        });
    if count == 0 {
        0.0
    } else {
        (sum / count as f64) as f32
    }
}

/// Population standard deviation.
pub(crate) fn mean_std(values: &[f32]) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mean = mean(values.iter().copied()) as f64;
    let variance = values
        .iter()
        .map(|value| (*value as f64 - mean).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    (mean as f32, variance.sqrt() as f32)
}

/// Per-channel mean, rounded half to even.
pub(crate) fn mean_color<'a>(colors: impl IntoIterator<Item = &'a Rgb> + Clone) -> Rgb {
    std::array::from_fn(|ch| {
        let channel = mean(colors.clone().into_iter().map(|color| color[ch] as f32));
        channel.round_ties_even().clamp(0.0, 255.0) as u8
    })
}
