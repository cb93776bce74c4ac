use std::fs;
use std::path::Path;

use crate::document::Block;
use crate::error::ExtractError;

/// Text paragraphs wrapped the way a block stream yields them
pub fn ok_blocks(lines: &[&str]) -> Vec<Result<Block, ExtractError>> {
    lines.iter().map(|l| Ok(Block::paragraph(*l))).collect()
}

/// Plain paragraphs
pub fn paragraphs(lines: &[&str]) -> Vec<Block> {
    lines.iter().map(|l| Block::paragraph(*l)).collect()
}

/// Count regular files below a directory, recursively
pub fn count_files(dir: &Path) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .map(|e| e.unwrap().path())
        .map(|p| if p.is_dir() { count_files(&p) } else { 1 })
        .sum()
}
