//! Contracts for the stages that run around the merger: text recognition on
//! each merged line and translation of the recognized text. Cropping, model
//! inference and network calls all live behind these traits.

use geo::Rect;
use tracing::instrument;

use crate::TextBlock;

pub trait TextRecognizer {
    type Error;

    fn extract_text(&self, region: Rect<f32>) -> Result<String, Self::Error>;
}

pub trait Translator {
    type Error;

    fn translate(&self, text: &str) -> Result<String, Self::Error>;
}

/// One translated line together with the region it came from, ready for
/// typesetting.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedLine {
    pub original: String,
    pub translated: String,
    pub rect: Rect<f32>,
}

fn has_area(rect: &Rect<f32>) -> bool {
    rect.width() > 0.0 && rect.height() > 0.0
}

impl TextBlock {
    /// Fills the text of every line from `recognizer`, in reading order.
    /// Lines whose bounding box has no area are skipped and keep their text.
    /// Returns how many lines were recognized.
    #[instrument(level = "debug", skip_all, fields(lines = self.len()))]
    pub fn recognize<R: TextRecognizer>(&mut self, recognizer: &R) -> Result<usize, R::Error> {
        let rects = self.line_rects().collect::<Vec<_>>();
        let mut recognized = 0;
        for (text, rect) in self.texts.iter_mut().zip(rects) {
            if !has_area(&rect) {
                log::warn!("Skipping line with empty bounding box {rect:?}");
                continue;
            }
            *text = recognizer.extract_text(rect)?;
            recognized += 1;
        }
        Ok(recognized)
    }
}

/// Translates each line of `block` that has a usable box and non-empty text.
#[instrument(level = "debug", skip_all, fields(lines = block.len()))]
pub fn translate_block<T: Translator>(
    block: &TextBlock,
    translator: &T,
) -> Result<Vec<TranslatedLine>, T::Error> {
    let mut lines = Vec::with_capacity(block.len());
    for (original, rect) in block.texts.iter().zip(block.line_rects()) {
        if !has_area(&rect) || original.trim().is_empty() {
            log::trace!("Nothing to translate for line at {rect:?}");
            continue;
        }
        lines.push(TranslatedLine {
            original: original.clone(),
            translated: translator.translate(original)?,
            rect,
        });
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use geo::Coord;

    use super::*;
    use crate::{Direction, QuadId};

    struct Labels(RefCell<usize>);

    impl TextRecognizer for Labels {
        type Error = std::convert::Infallible;

        fn extract_text(&self, region: Rect<f32>) -> Result<String, Self::Error> {
            *self.0.borrow_mut() += 1;
            Ok(format!("line@{}", region.min().y))
        }
    }

    struct Shout;

    impl Translator for Shout {
        type Error = String;

        fn translate(&self, text: &str) -> Result<String, Self::Error> {
            if text == "fail" {
                Err("refused".into())
            } else {
                Ok(text.to_uppercase())
            }
        }
    }

    fn rect_line(x: f32, y: f32, w: f32, h: f32) -> [Coord<f32>; 4] {
        [
            Coord { x, y },
            Coord { x: x + w, y },
            Coord { x: x + w, y: y + h },
            Coord { x, y: y + h },
        ]
    }

    fn block() -> TextBlock {
        TextBlock {
            members: vec![QuadId(0), QuadId(1), QuadId(2)],
            lines: vec![
                rect_line(0.0, 0.0, 40.0, 10.0),
                rect_line(0.0, 12.0, 40.0, 0.0),
                rect_line(0.0, 24.0, 40.0, 10.0),
            ],
            texts: vec![String::new(); 3],
            direction: Direction::Horizontal,
            font_size: 10.0,
            angle: -90.0,
            prob: 1.0,
            fg_color: crate::BLACK,
            bg_color: crate::WHITE,
        }
    }

    #[test]
    fn recognition_skips_flat_lines() {
        let mut block = block();
        let recognizer = Labels(RefCell::new(0));
        assert_eq!(block.recognize(&recognizer).unwrap(), 2);
        assert_eq!(*recognizer.0.borrow(), 2);
        assert_eq!(block.texts, vec!["line@0", "", "line@24"]);
    }

    #[test]
    fn translation_pairs_text_with_rects() {
        let mut block = block();
        block.texts = vec!["hello".into(), "skipped".into(), "  ".into()];
        let lines = translate_block(&block, &Shout).unwrap();
        assert_eq!(
            lines,
            vec![TranslatedLine {
                original: "hello".into(),
                translated: "HELLO".into(),
                rect: Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 40.0, y: 10.0 }),
            }]
        );

        block.texts[0] = "fail".into();
        assert_eq!(translate_block(&block, &Shout), Err("refused".to_string()));
    }
}
