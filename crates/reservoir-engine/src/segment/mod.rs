//! # Content Segmentation
//!
//! Splits one question's blocks into stem, options and answer/analysis.
//!
//! A zone cursor only moves forward (`Stem → Options → Analysis`). An option
//! line moves it to `Options`; an answer marker anywhere in a block moves it
//! to `Analysis`, slicing the block when the marker is not at its start.

use log::warn;

use crate::classify::Patterns;
use crate::document::{Block, TextBlock};

/// Where the segmenter is within a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Zone {
    #[default]
    Stem,
    Options,
    Analysis,
}

/// A question's blocks, by zone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmented {
    pub stem: Vec<Block>,
    pub options: Vec<Block>,
    pub analysis: Vec<Block>,
}

impl Segmented {
    /// Zones in output order.
    pub fn zones(&self) -> [&[Block]; 3] {
        [&self.stem, &self.options, &self.analysis]
    }
}

/// Incremental segmenter: push blocks in order, then finish.
pub struct ZoneBuilder<'p> {
    patterns: &'p Patterns,
    zone: Zone,
    out: Segmented,
}

impl<'p> ZoneBuilder<'p> {
    pub fn new(patterns: &'p Patterns) -> Self {
        Self {
            patterns,
            zone: Zone::Stem,
            out: Segmented::default(),
        }
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn push(&mut self, block: Block) {
        let text = block.text();

        if self.zone < Zone::Analysis && self.patterns.is_option(&text) {
            self.zone = Zone::Options;
        }

        let Some(offset) = self.patterns.answer_marker(&text) else {
            self.emit(self.zone, block);
            return;
        };

        let before = self.zone;
        self.zone = Zone::Analysis;

        if text[..offset].trim().is_empty() {
            self.emit(Zone::Analysis, block);
            return;
        }

        let sliced = match &block {
            Block::Text(tb) => Some(tb.slice(offset)),
            Block::Grid(_) => None,
        };
        match sliced {
            Some(Ok((head, tail))) => {
                self.emit(before, Block::Text(head));
                self.emit(Zone::Analysis, Block::Text(tail));
            }
            Some(Err(e)) => {
                warn!("Cannot split block at answer marker, keeping it whole: {e}");
                self.emit(Zone::Analysis, block);
            }
            None => {
                warn!("Answer marker inside a table; moving the whole table to the analysis");
                self.emit(Zone::Analysis, block);
            }
        }
    }

    /// Strips the leading question number from the first stem block and
    /// drops known noise lines.
    pub fn finish(mut self) -> Segmented {
        let patterns = self.patterns;
        if let Some(Block::Text(first)) = self.out.stem.first_mut()
            && let Some(prefix) = patterns.question_number(&first.text())
        {
            *first = first.without_leading(prefix.len);
        }

        for zone in [
            &mut self.out.stem,
            &mut self.out.options,
            &mut self.out.analysis,
        ] {
            zone.retain(|b| !is_noise_block(patterns, b));
        }
        self.out
    }

    fn emit(&mut self, zone: Zone, block: Block) {
        match zone {
            Zone::Stem => self.out.stem.push(block),
            Zone::Options => self.out.options.push(block),
            Zone::Analysis => self.out.analysis.push(block),
        }
    }
}

fn is_noise_block(patterns: &Patterns, block: &Block) -> bool {
    match block {
        Block::Text(tb) => !tb.has_images() && patterns.is_noise(&tb.text()),
        Block::Grid(_) => false,
    }
}

/// Segments a finished question span.
pub fn segment(blocks: Vec<Block>, patterns: &Patterns) -> Segmented {
    let mut builder = ZoneBuilder::new(patterns);
    for block in blocks {
        builder.push(block);
    }
    builder.finish()
}

/// Convenience for tests and callers holding plain text.
pub fn segment_lines(lines: &[&str], patterns: &Patterns) -> Segmented {
    segment(
        lines
            .iter()
            .map(|l| Block::Text(TextBlock::from_text(*l)))
            .collect(),
        patterns,
    )
}
