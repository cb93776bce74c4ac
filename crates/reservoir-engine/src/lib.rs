pub mod classify;
pub mod cleanup;
pub mod document;
pub mod error;
pub mod extract;
pub mod render;
pub mod segment;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use classify::{CeilingScope, Continuity, QuestionType};
pub use cleanup::{answer_key, strip_answers};
pub use document::{Block, DocxPackage};
pub use error::ExtractError;
pub use extract::{ExtractRequest, Extractor, ExtractorSettings, QuestionRecord, TargetSet};
pub use render::{MediaError, MediaStore};
