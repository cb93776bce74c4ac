//! # Boundary Classification
//!
//! Partitions a block stream into questions, shared material and section
//! headers.
//!
//! Each block's flattened text is tested in priority order:
//!
//! 1. **Header**: part labels (`第四部分`), enumerated headings (`二、`) and
//!    reading lead-ins (`根据以下材料…`). Closes any open question, updates the
//!    subject and resets the material.
//! 2. **Question start**: a leading number that passes the [`Continuity`]
//!    test against the previous question number.
//! 3. **Continuation**: appended to the open question, or to the material
//!    when no question is open.
//!
//! Ambiguous numbering always resolves to continuation, so text is never
//! lost to a false split.

mod continuity;
mod patterns;
mod state;
mod subject;

pub use continuity::{CeilingScope, Continuity};
pub use patterns::{NumberPrefix, Patterns};
pub use state::{BlockClass, ClassifierState, QuestionSpan, Rules, SpanEvent, Spans, classify_blocks};
pub use subject::{QuestionType, SUBJECT_RULES, SubjectRule, subject_for_header};
