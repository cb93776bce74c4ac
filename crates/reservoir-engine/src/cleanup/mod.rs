//! # Answer Stripping
//!
//! Turns an answer-and-analysis paper into a questions-only paper, and
//! pulls the bare answer key out of one.
//!
//! Stripping walks paragraphs with a two-mode state machine. In keep mode
//! an answer keyword switches to delete mode, cutting its paragraph at the
//! keyword. In delete mode everything is dropped until the next question
//! number or section header, which is kept and re-examined in keep mode.
//! Question numbers use the strict [`Continuity`] bound so that numbers
//! inside an analysis do not end deletion early. Its ceiling only guards the
//! first question, so long papers keep numbering past it.

use std::sync::LazyLock;

use log::{debug, info};
use regex::Regex;

use crate::classify::{Continuity, Patterns};
use crate::document::{Block, GridBlock, Inline, TextBlock};
use crate::error::ExtractError;

mod answer_key;

pub use answer_key::answer_key;

static DELETE_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"【\s*答案\s*】|正确\s*答案|参考\s*答案|答案\s*[:：]")
        .expect("Invalid delete-start regex")
});

static DELETE_STOP_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\s*第[一二三四五]+部分",
        r"|^\s*(?:根据|阅读).*(?:材料|回答|短文|资料)",
        r"|^\s*[一二三四五六七八九十]+、",
        r"|^\s*[一二三四五六七八九十]+[、\.]\s*根据",
    ))
    .expect("Invalid delete-stop regex")
});

/// Lines starting with these are explanation steps or verdicts.
const FORCE_DELETE_PREFIXES: &[&str] = &[
    "因此，选择",
    "因此选择",
    "故本题选",
    "故正确答案",
    "第一步，",
    "第二步，",
    "第三步，",
    "第四步，",
    "A项：",
    "B项：",
    "C项：",
    "D项：",
    "A项 ",
    "B项 ",
];

/// Lines containing these anywhere are verdicts.
const STRONG_DELETE_PHRASES: &[&str] = &["故本题选", "故正确答案", "故本题正确答案"];

/// Removed from the document title.
const TITLE_WORD: &str = "解析";

/// Paragraph-level state machine.
struct Stripper {
    patterns: Patterns,
    continuity: Continuity,
    deleting: bool,
    last_num: u32,
}

impl Stripper {
    fn new(continuity: Continuity) -> Self {
        Self {
            patterns: Patterns::default(),
            continuity,
            deleting: false,
            last_num: 0,
        }
    }

    fn block(&mut self, block: Block) -> Block {
        match block {
            Block::Text(tb) => Block::Text(self.paragraph(tb)),
            Block::Grid(grid) => Block::Grid(self.grid(grid)),
        }
    }

    fn grid(&mut self, grid: GridBlock) -> GridBlock {
        let rows = grid
            .rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|mut cell| {
                        cell.blocks = std::mem::take(&mut cell.blocks)
                            .into_iter()
                            .map(|p| self.paragraph(p))
                            .collect();
                        cell
                    })
                    .collect()
            })
            .collect();
        GridBlock::new(rows)
    }

    fn paragraph(&mut self, tb: TextBlock) -> TextBlock {
        let text = tb.text();
        let trimmed = text.trim();

        if self.deleting {
            if !self.stops_deletion(trimmed) {
                return TextBlock::default();
            }
            self.deleting = false;
        }

        if let Some(m) = DELETE_START.find(&text) {
            self.deleting = true;
            if text[..m.start()].trim().is_empty() {
                return TextBlock::default();
            }
            return match tb.slice(m.start()) {
                Ok((keep, _)) => keep,
                Err(_) => TextBlock::from_text(text[..m.start()].trim()),
            };
        }

        if STRONG_DELETE_PHRASES.iter().any(|p| trimmed.contains(p))
            || FORCE_DELETE_PREFIXES.iter().any(|p| trimmed.starts_with(p))
        {
            return TextBlock::default();
        }

        if let Some(prefix) = self.patterns.question_number(trimmed)
            && self.continuity.accepts(self.last_num, prefix.number)
        {
            self.last_num = prefix.number;
        }
        tb
    }

    fn stops_deletion(&mut self, text: &str) -> bool {
        if let Some(prefix) = self.patterns.question_number(text)
            && self.continuity.accepts(self.last_num, prefix.number)
        {
            debug!("Deletion ends at question {}", prefix.number);
            self.last_num = prefix.number;
            return true;
        }
        DELETE_STOP_HEADER.is_match(text)
    }
}

/// Removes answers and analyses, keeping questions, options and headers.
pub fn strip_answers<I>(blocks: I, continuity: Continuity) -> Result<Vec<Block>, ExtractError>
where
    I: IntoIterator<Item = Result<Block, ExtractError>>,
{
    let mut stripper = Stripper::new(continuity);
    let mut out = Vec::new();
    let mut title_seen = false;

    for block in blocks {
        let mut block = block?;
        if !title_seen && let Block::Text(tb) = &block {
            title_seen = true;
            if tb.text().contains(TITLE_WORD) {
                block = Block::Text(without_title_word(tb));
            }
        }
        out.push(stripper.block(block));
    }

    let before = out.len();
    out.retain(|b| match b {
        Block::Text(tb) => tb.has_images() || !tb.text().trim().is_empty(),
        Block::Grid(_) => true,
    });
    info!(
        "Stripped answers: kept {} blocks, removed {} empty paragraphs",
        out.len(),
        before - out.len()
    );
    Ok(out)
}

/// Removes the title word from each text run; images stay where they are.
fn without_title_word(tb: &TextBlock) -> TextBlock {
    let inlines = tb
        .inlines
        .iter()
        .map(|inline| match inline {
            Inline::Text(s) => Inline::Text(s.replace(TITLE_WORD, "")),
            Inline::Image(_) => inline.clone(),
        })
        .collect();
    TextBlock::new(inlines)
}
