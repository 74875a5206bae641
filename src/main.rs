use std::io::{BufRead, BufReader, Read};

use textline_merge::{sort_page_order, MergerBuilder, PageOrder, Quadrilateral, SplitStrategy};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Reads detector boxes as `x,y,w,h` lines from the file named on the command
/// line (or stdin) and prints the merged blocks in manga page order.
fn main() {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let input: Box<dyn Read> = match std::env::args().nth(1) {
        Some(path) => Box::new(std::fs::File::open(path).expect("Failed to open box list")),
        None => Box::new(std::io::stdin()),
    };

    let mut quads = Vec::new();
    for (line_no, line) in BufReader::new(input).lines().enumerate() {
        let line = line.expect("Failed to read box list");
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let values = line
            .split(',')
            .map(|it| it.trim().parse::<f32>())
            .collect::<Result<Vec<_>, _>>();
        match values.as_deref() {
            Ok(&[x, y, w, h]) => match Quadrilateral::from_rect(x, y, w, h) {
                Ok(quad) => quads.push(quad),
                Err(err) => log::warn!("Skipping line {}: {err}", line_no + 1),
            },
            _ => log::warn!("Skipping line {}: expected x,y,w,h", line_no + 1),
        }
    }

    let split_strategy = match std::env::var("SPLIT_STRATEGY").as_deref() {
        Ok("prune") => SplitStrategy::PruneLongEdges,
        _ => SplitStrategy::Components,
    };
    let merger = MergerBuilder::new()
        .split_strategy(split_strategy)
        .build()
        .expect("Failed to build merger");

    let mut blocks = merger.merge(&quads, 0, 0).iter().collect::<Vec<_>>();
    sort_page_order(&mut blocks, PageOrder::RightToLeft);
    for (i, block) in blocks.iter().enumerate() {
        let (x, y, w, h) = block.combined_bbox().unwrap_or_default();
        let members = block
            .members
            .iter()
            .map(|id| id.0.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "block {i}: x={x} y={y} w={w} h={h} font_size={} direction={:?} lines=[{members}]",
            block.font_size, block.direction
        );
    }
}
