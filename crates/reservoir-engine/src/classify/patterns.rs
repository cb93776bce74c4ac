use std::sync::LazyLock;

use regex::Regex;

static QUESTION_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[\(（]?([0-9]+)[\)）]?[\.．、\s]").expect("Invalid question-start regex")
});

static SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\s*第[一二三四五六七八九十]+部分",
        r"|^\s*[一二三四五六七八九十]+、",
        r"|^\s*(?:根据|阅读).*(?:材料|回答|短文)",
    ))
    .expect("Invalid section-header regex")
});

static IGNORED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[\(（]共[0-9]+题[，,]\s*参考时限[0-9]+分钟[\)）]")
        .expect("Invalid ignored-line regex")
});

static OPTION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[\(（]?[A-DＡ-Ｄ][\)）]?[\.．、\s]").expect("Invalid option-line regex")
});

static ANSWER_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"【\s*答案\s*】|【\s*解析\s*】|【\s*拓展\s*】|【\s*来源\s*】",
        r"|正确\s*答案|参考\s*答案",
        r"|答案\s*[:：]|解析\s*[:：]",
    ))
    .expect("Invalid answer-marker regex")
});

/// Whole lines produced by a known upstream conversion glitch; dropped inside questions.
const NOISE_LINES: &[&str] = &["故", "故。", "故本题选", "故正确答案"];

/// Words in a header that mark it as the lead-in of a shared material.
const MATERIAL_WORDS: &[&str] = &["根据", "材料", "阅读"];

/// Header prefixes that introduce a material rather than name a subject.
const MATERIAL_LEADS: &[&str] = &["根据", "阅读"];

/// A question number found at the start of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberPrefix {
    pub number: u32,
    /// Byte length of the prefix including its separator.
    pub len: usize,
}

/// The line-level patterns the classifier and segmenter test block text against.
#[derive(Debug, Clone)]
pub struct Patterns {
    question_start: Regex,
    section_header: Regex,
    ignored_line: Regex,
    option_line: Regex,
    answer_marker: Regex,
}

impl Default for Patterns {
    fn default() -> Self {
        Self {
            question_start: QUESTION_START.clone(),
            section_header: SECTION_HEADER.clone(),
            ignored_line: IGNORED_LINE.clone(),
            option_line: OPTION_LINE.clone(),
            answer_marker: ANSWER_MARKER.clone(),
        }
    }
}

impl Patterns {
    pub fn is_header(&self, text: &str) -> bool {
        self.section_header.is_match(text)
    }

    /// A header that introduces a shared passage; its own markup seeds the material.
    pub fn is_material_header(&self, text: &str) -> bool {
        MATERIAL_WORDS.iter().any(|w| text.contains(w))
    }

    /// A header whose text is a reading lead-in, so it carries no subject.
    pub fn is_material_lead(&self, text: &str) -> bool {
        let text = text.trim_start();
        MATERIAL_LEADS.iter().any(|w| text.starts_with(w))
    }

    /// Leading question number, if the text starts like a question.
    ///
    /// Numbers too large for `u32` are treated as no match.
    pub fn question_number(&self, text: &str) -> Option<NumberPrefix> {
        let caps = self.question_start.captures(text)?;
        let number = caps.get(1)?.as_str().parse().ok()?;
        let len = caps.get(0)?.end();
        Some(NumberPrefix { number, len })
    }

    pub fn is_option(&self, text: &str) -> bool {
        self.option_line.is_match(text)
    }

    /// Byte offset of the first answer/analysis marker anywhere in the text.
    pub fn answer_marker(&self, text: &str) -> Option<usize> {
        self.answer_marker.find(text).map(|m| m.start())
    }

    pub fn is_ignored(&self, text: &str) -> bool {
        self.ignored_line.is_match(text)
    }

    pub fn is_noise(&self, text: &str) -> bool {
        NOISE_LINES.contains(&text.trim())
    }
}
