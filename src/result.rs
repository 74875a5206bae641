use std::f32::consts::FRAC_PI_2;

use geo::{Coord, LineString, Point, Polygon, Rect};

use crate::{
    error::{MergeError, Result},
    util::{centroid_of, edge_lengths, points_rect},
};

pub type Rgb = [u8; 3];

pub const BLACK: Rgb = [0, 0, 0];
pub const WHITE: Rgb = [255, 255, 255];

/// Detector boxes shorter than this still get this font size.
pub const MIN_BOX_FONT_SIZE: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuadId(pub usize);

impl QuadId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Horizontal,
    Vertical,
}

/// Orientation of a text line, either as reported by a classifier or as a
/// measured angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextAngle {
    Class(Direction),
    Radians(f32),
}

impl TextAngle {
    /// Coarse direction. A measured angle counts as vertical when it is closer
    /// to the y axis than to the x axis.
    pub fn direction(self) -> Direction {
        match self {
            TextAngle::Class(direction) => direction,
            TextAngle::Radians(rad) if rad.sin().abs() > rad.cos().abs() => Direction::Vertical,
            TextAngle::Radians(_) => Direction::Horizontal,
        }
    }

    pub fn radians(self) -> f32 {
        match self {
            TextAngle::Class(Direction::Horizontal) => 0.0,
            TextAngle::Class(Direction::Vertical) => FRAC_PI_2,
            TextAngle::Radians(rad) => rad,
        }
    }
}

impl Default for TextAngle {
    fn default() -> Self {
        TextAngle::Class(Direction::Horizontal)
    }
}

/// A detected text line: its corner points plus the visual attributes the
/// merger aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct Quadrilateral {
    pub pts: [Coord<f32>; 4],
    pub font_size: f32,
    pub angle: TextAngle,
    pub centroid: Point<f32>,
    pub fg_color: Rgb,
    pub bg_color: Rgb,
    pub text: String,
    pub prob: f32,
}

impl Quadrilateral {
    /// Black on white, horizontal, confidence 1.
    pub fn new(pts: [Coord<f32>; 4], font_size: f32) -> Self {
        Self {
            centroid: centroid_of(&pts),
            pts,
            font_size,
            angle: TextAngle::default(),
            fg_color: BLACK,
            bg_color: WHITE,
            text: String::new(),
            prob: 1.0,
        }
    }

    /// Builds a quadrilateral from an axis-aligned detector box. Corners run
    /// clockwise from the top left and the box height is the font size,
    /// floored at [`MIN_BOX_FONT_SIZE`].
    pub fn from_rect(x: f32, y: f32, w: f32, h: f32) -> Result<Self> {
        if ![x, y, w, h].iter().all(|it| it.is_finite()) || w <= 0.0 || h <= 0.0 {
            return Err(MergeError::InvalidGeometry {
                index: None,
                reason: format!("box (x: {x}, y: {y}, w: {w}, h: {h}) has no area"),
            });
        }
        let pts = [
            Coord { x, y },
            Coord { x: x + w, y },
            Coord { x: x + w, y: y + h },
            Coord { x, y: y + h },
        ];
        let mut quad = Self::new(pts, h.max(MIN_BOX_FONT_SIZE));
        quad.centroid = Point::new(x + w / 2.0, y + h / 2.0);
        Ok(quad)
    }

    /// Builds a quadrilateral from a detection polygon such as a rotated
    /// rectangle. The shorter side becomes the font size and the direction of
    /// the longer side becomes the angle.
    pub fn from_polygon(polygon: &Polygon<f32>) -> Result<Self> {
        let mut corners = polygon.exterior().coords().copied().collect::<Vec<_>>();
        if corners.len() > 1 && corners.first() == corners.last() {
            corners.pop();
        }
        let pts: [Coord<f32>; 4] =
            corners
                .try_into()
                .map_err(|corners: Vec<_>| MergeError::InvalidGeometry {
                    index: None,
                    reason: format!("polygon has {} corners, expected 4", corners.len()),
                })?;
        let lengths = edge_lengths(&pts);
        let (long, short) = if lengths[0] >= lengths[1] {
            (0, lengths[1])
        } else {
            (1, lengths[0])
        };
        let delta = pts[long + 1] - pts[long];
        let mut quad = Self::new(pts, short);
        quad.angle = TextAngle::Radians(delta.y.atan2(delta.x));
        quad.validate(None)?;
        Ok(quad)
    }

    pub fn with_centroid(mut self, centroid: Point<f32>) -> Self {
        self.centroid = centroid;
        self
    }

    pub fn with_angle(mut self, angle: TextAngle) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_colors(mut self, fg_color: Rgb, bg_color: Rgb) -> Self {
        self.fg_color = fg_color;
        self.bg_color = bg_color;
        self
    }

    pub fn with_prob(mut self, prob: f32) -> Self {
        self.prob = prob;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn polygon(&self) -> Polygon<f32> {
        Polygon::new(LineString::from(self.pts.to_vec()), vec![])
    }

    pub fn bounding_rect(&self) -> Rect<f32> {
        // Four corners always produce a rect.
        points_rect(self.pts.iter().copied()).unwrap_or_else(|| Rect::new(self.pts[0], self.pts[0]))
    }

    pub fn validate(&self, index: Option<usize>) -> Result<()> {
        let invalid = |reason: String| Err(MergeError::InvalidGeometry { index, reason });

        let coords_finite = self
            .pts
            .iter()
            .chain(std::iter::once(&self.centroid.0))
            .all(|it| it.x.is_finite() && it.y.is_finite());
        if !coords_finite {
            return invalid("non-finite coordinate".into());
        }
        let rect = self.bounding_rect();
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return invalid(format!(
                "bounding box {}x{} has no area",
                rect.width(),
                rect.height()
            ));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return invalid(format!("font size {} is not positive", self.font_size));
        }
        if !(0.0..=1.0).contains(&self.prob) {
            return invalid(format!("confidence {} is outside [0, 1]", self.prob));
        }
        Ok(())
    }
}

/// A group of lines judged to form one logical text unit, such as a speech
/// bubble. Lines are stored in reading order.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub members: Vec<QuadId>,
    pub lines: Vec<[Coord<f32>; 4]>,
    pub texts: Vec<String>,
    pub direction: Direction,
    pub font_size: f32,
    /// Degrees.
    pub angle: f32,
    pub prob: f32,
    pub fg_color: Rgb,
    pub bg_color: Rgb,
}

impl TextBlock {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn bounding_rect(&self) -> Option<Rect<f32>> {
        points_rect(self.lines.iter().flatten().copied())
    }

    /// `(x, y, width, height)`
    pub fn combined_bbox(&self) -> Option<(f32, f32, f32, f32)> {
        self.bounding_rect()
            .map(|rect| (rect.min().x, rect.min().y, rect.width(), rect.height()))
    }

    pub fn line_rects(&self) -> impl Iterator<Item = Rect<f32>> + '_ {
        self.lines.iter().map(|line| {
            points_rect(line.iter().copied()).unwrap_or_else(|| Rect::new(line[0], line[0]))
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Quads<'a> {
    quads: &'a [Quadrilateral],
}

impl<'a> Quads<'a> {
    pub fn new(quads: &'a [Quadrilateral]) -> Self {
        Self { quads }
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = QuadId> {
        (0..self.quads.len()).map(QuadId)
    }

    pub fn get(&self, id: QuadId) -> Option<&'a Quadrilateral> {
        self.quads.get(id.0)
    }

    pub fn as_slice(&self) -> &'a [Quadrilateral] {
        self.quads
    }

    pub fn distance(&self, a: QuadId, b: QuadId) -> f32 {
        crate::util::distance(&self[a], &self[b])
    }
}

impl std::ops::Index<QuadId> for Quads<'_> {
    type Output = Quadrilateral;

    fn index(&self, id: QuadId) -> &Self::Output {
        &self.quads[id.0]
    }
}
