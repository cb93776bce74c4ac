use std::sync::LazyLock;

use regex::Regex;

use crate::document::Block;
use crate::error::ExtractError;

static ANSWER_LETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:【\s*答案\s*】|正确\s*答案|答案\s*[:：])\s*([A-D])")
        .expect("Invalid answer-letter regex")
});

/// Collects the answer letter of every block that states one, in order.
///
/// Only the first answer in a block counts.
pub fn answer_key<I>(blocks: I) -> Result<Vec<char>, ExtractError>
where
    I: IntoIterator<Item = Result<Block, ExtractError>>,
{
    let mut answers = Vec::new();
    for block in blocks {
        let text = block?.text();
        if let Some(letter) = answer_letter(text.trim()) {
            answers.push(letter);
        }
    }
    Ok(answers)
}

fn answer_letter(text: &str) -> Option<char> {
    if text.is_empty() {
        return None;
    }
    let caps = ANSWER_LETTER.captures(text)?;
    caps.get(1)?
        .as_str()
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::ok_blocks;
    use rstest::rstest;

    #[rstest]
    #[case("【答案】A", Some('A'))]
    #[case("【 答案 】 c", Some('C'))]
    #[case("正确答案是", None)]
    #[case("正确答案D", Some('D'))]
    #[case("答案：B。解析略", Some('B'))]
    #[case("答案E", None)]
    #[case("", None)]
    fn letters(#[case] text: &str, #[case] expected: Option<char>) {
        assert_eq!(answer_letter(text), expected);
    }

    #[test]
    fn collects_in_document_order() {
        let key = answer_key(ok_blocks(&[
            "1. 题一",
            "【答案】B",
            "2. 题二",
            "A. 甲",
            "【答案】d【解析】【答案】A",
            "",
        ]))
        .unwrap();
        assert_eq!(key, vec!['B', 'D']);
    }

    #[test]
    fn propagates_stream_errors() {
        let blocks = vec![
            Ok(Block::paragraph("【答案】A")),
            Err(ExtractError::UnsupportedNode("altChunk".to_string())),
        ];
        assert!(answer_key(blocks).is_err());
    }
}
