use std::collections::VecDeque;

use log::{debug, trace};

use crate::document::Block;
use crate::error::ExtractError;

use super::continuity::Continuity;
use super::patterns::{NumberPrefix, Patterns};
use super::subject::{QuestionType, SUBJECT_RULES, SubjectRule, subject_for_header};

/// Everything the classifier consults besides its own state.
#[derive(Debug, Clone)]
pub struct Rules {
    pub patterns: Patterns,
    pub continuity: Continuity,
    pub subjects: &'static [SubjectRule],
}

impl Default for Rules {
    fn default() -> Self {
        Self::with_continuity(Continuity::LIVE)
    }
}

impl Rules {
    pub fn with_continuity(continuity: Continuity) -> Self {
        Self {
            patterns: Patterns::default(),
            continuity,
            subjects: SUBJECT_RULES,
        }
    }
}

/// The blocks of one question, first block carrying its number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSpan {
    pub original_num: u32,
    pub subject: QuestionType,
    pub blocks: Vec<Block>,
}

/// Output of one classifier step, in the order it must be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanEvent {
    /// A section header was consumed. The current material is discarded;
    /// when `material_lead` is present the header block itself starts the
    /// next material.
    Section {
        subject: QuestionType,
        material_lead: Option<Block>,
    },
    /// A block outside any question, to be appended to the current material.
    Material(Block),
    /// A finished question.
    Question(QuestionSpan),
}

/// How a block's text relates to question boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockClass {
    Header,
    QuestionStart(NumberPrefix),
    Continuation,
}

/// Classifier state between two blocks.
///
/// [`ClassifierState::step`] consumes the state and returns its successor,
/// so the whole pass is a fold over the block stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifierState {
    subject: QuestionType,
    last_num: u32,
    current_num: u32,
    buffer: Vec<Block>,
}

impl ClassifierState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(&self) -> QuestionType {
        self.subject
    }

    /// Number of the open question, if any.
    pub fn open_question(&self) -> Option<u32> {
        (self.current_num > 0).then_some(self.current_num)
    }

    /// The number continuity is measured against.
    fn previous_num(&self) -> u32 {
        if self.current_num > 0 {
            self.current_num
        } else {
            self.last_num
        }
    }

    /// Classifies block text against the current state.
    ///
    /// Only paragraphs can open a question; see [`ClassifierState::step`].
    pub fn classify(&self, rules: &Rules, text: &str) -> BlockClass {
        if rules.patterns.is_header(text) {
            return BlockClass::Header;
        }
        if let Some(prefix) = rules.patterns.question_number(text) {
            if rules.continuity.accepts(self.previous_num(), prefix.number) {
                return BlockClass::QuestionStart(prefix);
            }
            trace!(
                "Rejected question number {} after {}",
                prefix.number,
                self.previous_num()
            );
        }
        BlockClass::Continuation
    }

    /// Feeds one block; returns the next state and the events it produced.
    pub fn step(mut self, rules: &Rules, block: Block) -> (Self, Vec<SpanEvent>) {
        let text = block.text();
        let mut events = Vec::new();

        let class = match self.classify(rules, &text) {
            BlockClass::QuestionStart(prefix) if matches!(block, Block::Grid(_)) => {
                trace!("Table numbered {} kept as content", prefix.number);
                BlockClass::Continuation
            }
            class => class,
        };

        match class {
            BlockClass::Header => {
                if let Some(span) = self.take_question() {
                    events.push(SpanEvent::Question(span));
                }
                self.buffer.clear();

                if !rules.patterns.is_material_lead(&text)
                    && let Some(subject) = subject_for_header(rules.subjects, &text)
                {
                    if subject != self.subject {
                        debug!("Section {:?} switches subject to {subject}", text.trim());
                    }
                    self.subject = subject;
                }
                if self.current_num > 0 {
                    self.last_num = self.current_num;
                }
                self.current_num = 0;

                let material_lead = rules.patterns.is_material_header(&text).then_some(block);
                events.push(SpanEvent::Section {
                    subject: self.subject,
                    material_lead,
                });
            }
            BlockClass::QuestionStart(prefix) => {
                if let Some(span) = self.take_question() {
                    events.push(SpanEvent::Question(span));
                } else {
                    events.extend(self.buffer.drain(..).map(SpanEvent::Material));
                }
                debug!("Question {} starts", prefix.number);
                self.current_num = prefix.number;
                self.buffer = vec![block];
            }
            BlockClass::Continuation => {
                if self.current_num > 0 {
                    let noise = matches!(block, Block::Text(_)) && rules.patterns.is_noise(&text);
                    if !noise {
                        self.buffer.push(block);
                    }
                } else if !rules.patterns.is_ignored(&text) {
                    events.push(SpanEvent::Material(block));
                }
            }
        }

        (self, events)
    }

    /// Closes the stream, returning the last open question.
    pub fn finish(mut self) -> Option<QuestionSpan> {
        self.take_question()
    }

    fn take_question(&mut self) -> Option<QuestionSpan> {
        if self.current_num == 0 || self.buffer.is_empty() {
            return None;
        }
        Some(QuestionSpan {
            original_num: self.current_num,
            subject: self.subject,
            blocks: std::mem::take(&mut self.buffer),
        })
    }
}

/// Lazy adapter running the classifier over a block stream.
///
/// Stops after the first stream error.
pub struct Spans<'r, I> {
    blocks: I,
    rules: &'r Rules,
    state: Option<ClassifierState>,
    pending: VecDeque<SpanEvent>,
}

impl<'r, I> Spans<'r, I>
where
    I: Iterator<Item = Result<Block, ExtractError>>,
{
    pub fn new(blocks: I, rules: &'r Rules) -> Self {
        Self {
            blocks,
            rules,
            state: Some(ClassifierState::new()),
            pending: VecDeque::new(),
        }
    }
}

impl<I> Iterator for Spans<'_, I>
where
    I: Iterator<Item = Result<Block, ExtractError>>,
{
    type Item = Result<SpanEvent, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            let state = self.state.take()?;
            match self.blocks.next() {
                Some(Ok(block)) => {
                    let (next, events) = state.step(self.rules, block);
                    self.state = Some(next);
                    self.pending.extend(events);
                }
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    if let Some(span) = state.finish() {
                        self.pending.push_back(SpanEvent::Question(span));
                    }
                }
            }
        }
    }
}

/// Runs the classifier over an in-memory block list.
pub fn classify_blocks(blocks: Vec<Block>, rules: &Rules) -> Vec<SpanEvent> {
    let mut events = Vec::new();
    let mut state = ClassifierState::new();
    for block in blocks {
        let (next, produced) = state.step(rules, block);
        state = next;
        events.extend(produced);
    }
    events.extend(state.finish().map(SpanEvent::Question));
    events
}
