//! # Document Blocks
//!
//! The normalized, owned view of an exam document that the rest of the
//! pipeline consumes.
//!
//! A document is an ordered sequence of [`Block`]s:
//!
//! - **`Text`**: one paragraph-like run of inline text and embedded images
//! - **`Grid`**: one table; each cell holds its own sequence of text blocks
//!
//! Blocks are plain values. The segmenter never edits a block in place; when
//! a zone transition falls in the middle of a paragraph it calls
//! [`TextBlock::slice`], which returns two new blocks and leaves the original
//! untouched.
//!
//! ## Modules
//!
//! - **`docx`**: reads a word-processor package and streams its body as blocks

pub mod docx;

pub use docx::{BlockStream, DocxPackage};

/// Separator placed between cell texts when a grid is flattened.
pub const CELL_SEPARATOR: &str = " ";

/// A reference to an image embedded in the source package.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    /// Package relationship id (`rId7`) resolving to the image part.
    pub rel_id: String,
}

impl ImageRef {
    pub fn new(rel_id: impl Into<String>) -> Self {
        Self {
            rel_id: rel_id.into(),
        }
    }
}

/// One inline piece of a text block, in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Image(ImageRef),
}

/// A paragraph-like unit: text interleaved with embedded images.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBlock {
    pub inlines: Vec<Inline>,
}

/// Error returned when a text block cannot be cut at the requested offset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SliceError {
    #[error("slice offset {offset} is past the end of a {len}-byte block")]
    OutOfRange { offset: usize, len: usize },
    #[error("slice offset {0} is not on a character boundary")]
    NotCharBoundary(usize),
}

impl TextBlock {
    pub fn new(inlines: Vec<Inline>) -> Self {
        Self { inlines }
    }

    /// Builds a text-only block.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            inlines: vec![Inline::Text(text.into())],
        }
    }

    /// Concatenated text of all text inlines.
    pub fn text(&self) -> String {
        self.inlines
            .iter()
            .filter_map(|i| match i {
                Inline::Text(s) => Some(s.as_str()),
                Inline::Image(_) => None,
            })
            .collect()
    }

    /// Image references in reading order.
    pub fn images(&self) -> impl Iterator<Item = &ImageRef> {
        self.inlines.iter().filter_map(|i| match i {
            Inline::Image(r) => Some(r),
            Inline::Text(_) => None,
        })
    }

    pub fn has_images(&self) -> bool {
        self.images().next().is_some()
    }

    /// Cuts the block at a byte offset into [`TextBlock::text`].
    ///
    /// The head keeps every inline before the cut and the tail every inline
    /// after it, so each image ends up in exactly one half.
    pub fn slice(&self, offset: usize) -> Result<(TextBlock, TextBlock), SliceError> {
        let len: usize = self
            .inlines
            .iter()
            .map(|i| match i {
                Inline::Text(s) => s.len(),
                Inline::Image(_) => 0,
            })
            .sum();
        if offset > len {
            return Err(SliceError::OutOfRange { offset, len });
        }

        let mut head = Vec::new();
        let mut tail = Vec::new();
        let mut pos = 0usize;
        let mut cut = false;

        for inline in &self.inlines {
            if cut {
                tail.push(inline.clone());
                continue;
            }
            match inline {
                Inline::Image(_) => head.push(inline.clone()),
                Inline::Text(s) => {
                    let end = pos + s.len();
                    if offset < end || (offset == end && offset == len) {
                        let local = offset - pos;
                        if !s.is_char_boundary(local) {
                            return Err(SliceError::NotCharBoundary(offset));
                        }
                        let (a, b) = s.split_at(local);
                        if !a.is_empty() {
                            head.push(Inline::Text(a.to_string()));
                        }
                        if !b.is_empty() {
                            tail.push(Inline::Text(b.to_string()));
                        }
                        cut = true;
                    } else {
                        head.push(inline.clone());
                    }
                    pos = end;
                }
            }
        }

        Ok((TextBlock::new(head), TextBlock::new(tail)))
    }

    /// Drops the first `len` bytes of text, keeping every image.
    ///
    /// Used to remove a leading question number from the first stem block.
    pub fn without_leading(&self, len: usize) -> TextBlock {
        let mut remaining = len;
        let mut inlines = Vec::with_capacity(self.inlines.len());
        for inline in &self.inlines {
            match inline {
                Inline::Text(s) if remaining > 0 => {
                    if s.len() <= remaining {
                        remaining -= s.len();
                    } else {
                        let mut at = remaining;
                        while !s.is_char_boundary(at) {
                            at += 1;
                        }
                        remaining = 0;
                        inlines.push(Inline::Text(s[at..].to_string()));
                    }
                }
                other => inlines.push(other.clone()),
            }
        }
        TextBlock::new(inlines)
    }
}

/// One table cell: its paragraphs in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub blocks: Vec<TextBlock>,
}

impl Cell {
    pub fn new(blocks: Vec<TextBlock>) -> Self {
        Self { blocks }
    }

    /// Paragraph texts joined by newlines.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(TextBlock::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table: rows of cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridBlock {
    pub rows: Vec<Vec<Cell>>,
}

impl GridBlock {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// All cells, row by row.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flatten()
    }

    /// Trimmed cell texts joined by [`CELL_SEPARATOR`].
    pub fn text(&self) -> String {
        self.cells()
            .map(|c| c.text().trim().to_string())
            .collect::<Vec<_>>()
            .join(CELL_SEPARATOR)
    }
}

/// An ordered content unit of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Text(TextBlock),
    Grid(GridBlock),
}

impl Block {
    /// Convenience constructor for a text-only paragraph.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Text(TextBlock::from_text(text))
    }

    /// Flattened text used for classification.
    pub fn text(&self) -> String {
        match self {
            Block::Text(t) => t.text(),
            Block::Grid(g) => g.text(),
        }
    }

    pub fn as_text(&self) -> Option<&TextBlock> {
        match self {
            Block::Text(t) => Some(t),
            Block::Grid(_) => None,
        }
    }
}

impl From<TextBlock> for Block {
    fn from(value: TextBlock) -> Self {
        Block::Text(value)
    }
}

impl From<GridBlock> for Block {
    fn from(value: GridBlock) -> Self {
        Block::Grid(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn img(id: &str) -> Inline {
        Inline::Image(ImageRef::new(id))
    }

    fn txt(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn text_skips_images() {
        let block = TextBlock::new(vec![txt("A. "), img("rId1"), txt("图一")]);
        assert_eq!(block.text(), "A. 图一");
        assert_eq!(block.images().count(), 1);
    }

    #[test]
    fn slice_splits_inside_a_run() {
        let block = TextBlock::from_text("B. option text【答案】A");
        let at = block.text().find('【').unwrap();
        let (head, tail) = block.slice(at).unwrap();
        assert_eq!(head.text(), "B. option text");
        assert_eq!(tail.text(), "【答案】A");
    }

    #[test]
    fn slice_keeps_images_on_their_side() {
        let block = TextBlock::new(vec![
            txt("题干"),
            img("rId1"),
            txt("【解析】见图"),
            img("rId2"),
        ]);
        let (head, tail) = block.slice("题干".len()).unwrap();
        assert_eq!(head.images().map(|r| r.rel_id.as_str()).collect::<Vec<_>>(), ["rId1"]);
        assert_eq!(tail.images().map(|r| r.rel_id.as_str()).collect::<Vec<_>>(), ["rId2"]);
        assert_eq!(tail.text(), "【解析】见图");
    }

    #[test]
    fn slice_at_run_boundary() {
        let block = TextBlock::new(vec![txt("abc"), txt("def")]);
        let (head, tail) = block.slice(3).unwrap();
        assert_eq!(head.text(), "abc");
        assert_eq!(tail.text(), "def");
    }

    #[test]
    fn slice_rejects_bad_offsets() {
        let block = TextBlock::from_text("答案");
        assert_eq!(
            block.slice(1),
            Err(SliceError::NotCharBoundary(1))
        );
        assert!(matches!(
            block.slice(100),
            Err(SliceError::OutOfRange { .. })
        ));
    }

    #[test]
    fn without_leading_keeps_images() {
        let block = TextBlock::new(vec![txt("12."), img("rId3"), txt(" 如图所示")]);
        let stripped = block.without_leading(3);
        assert_eq!(stripped.text(), " 如图所示");
        assert!(stripped.has_images());
    }

    #[test]
    fn grid_text_joins_trimmed_cells() {
        let grid = GridBlock::new(vec![vec![
            Cell::new(vec![TextBlock::from_text(" 年份 ")]),
            Cell::new(vec![
                TextBlock::from_text("产量"),
                TextBlock::from_text("（万吨）"),
            ]),
        ]]);
        assert_eq!(grid.text(), "年份 产量\n（万吨）");
        assert_eq!(grid.cells().count(), 2);
    }
}
