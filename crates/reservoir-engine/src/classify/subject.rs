use std::fmt;

use serde::{Deserialize, Serialize};

/// Subject category of a question, named after the exam section it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuestionType {
    #[default]
    Unknown,
    #[serde(rename = "常识")]
    CommonSense,
    #[serde(rename = "言语")]
    Verbal,
    #[serde(rename = "数量")]
    Quantitative,
    #[serde(rename = "资料")]
    DataAnalysis,
    #[serde(rename = "判断")]
    Judgment,
    #[serde(rename = "图形")]
    FigureReasoning,
    #[serde(rename = "定义")]
    DefinitionJudgment,
    #[serde(rename = "类比")]
    AnalogyReasoning,
    #[serde(rename = "逻辑")]
    LogicalJudgment,
}

impl QuestionType {
    pub fn label(&self) -> &'static str {
        match self {
            QuestionType::Unknown => "Unknown",
            QuestionType::CommonSense => "常识",
            QuestionType::Verbal => "言语",
            QuestionType::Quantitative => "数量",
            QuestionType::DataAnalysis => "资料",
            QuestionType::Judgment => "判断",
            QuestionType::FigureReasoning => "图形",
            QuestionType::DefinitionJudgment => "定义",
            QuestionType::AnalogyReasoning => "类比",
            QuestionType::LogicalJudgment => "逻辑",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One header rule: every keyword must appear in the header text.
#[derive(Debug, Clone, Copy)]
pub struct SubjectRule {
    pub keywords: &'static [&'static str],
    pub subject: QuestionType,
}

impl SubjectRule {
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().all(|k| text.contains(k))
    }
}

/// Evaluated top to bottom, first match wins. Sub-sections of judgment
/// reasoning come before the generic section names.
pub const SUBJECT_RULES: &[SubjectRule] = &[
    SubjectRule {
        keywords: &["图形", "推理"],
        subject: QuestionType::FigureReasoning,
    },
    SubjectRule {
        keywords: &["定义", "判断"],
        subject: QuestionType::DefinitionJudgment,
    },
    SubjectRule {
        keywords: &["类比", "推理"],
        subject: QuestionType::AnalogyReasoning,
    },
    SubjectRule {
        keywords: &["逻辑", "判断"],
        subject: QuestionType::LogicalJudgment,
    },
    SubjectRule {
        keywords: &["常识"],
        subject: QuestionType::CommonSense,
    },
    SubjectRule {
        keywords: &["言语"],
        subject: QuestionType::Verbal,
    },
    SubjectRule {
        keywords: &["数量"],
        subject: QuestionType::Quantitative,
    },
    SubjectRule {
        keywords: &["资料"],
        subject: QuestionType::DataAnalysis,
    },
    SubjectRule {
        keywords: &["判断"],
        subject: QuestionType::Judgment,
    },
];

/// The subject a header names, if any.
pub fn subject_for_header(rules: &[SubjectRule], text: &str) -> Option<QuestionType> {
    rules.iter().find(|r| r.matches(text)).map(|r| r.subject)
}
