//! # Question Extraction
//!
//! Drives the whole pipeline for one document: blocks are classified into
//! spans, each wanted question is segmented into zones, and every zone and
//! material passage is rendered to markup.
//!
//! Material is rendered lazily, the first time a wanted question needs it,
//! so a request for a few questions does not copy images belonging to
//! passages nobody asked for.

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::classify::{Continuity, QuestionSpan, QuestionType, Rules, SpanEvent, Spans};
use crate::document::{Block, DocxPackage};
use crate::error::ExtractError;
use crate::render::{Fragment, MediaSource, MediaStore, RenderOptions, Renderer, is_valid_staging_name};
use crate::segment::segment;

mod targets;

pub use targets::TargetSet;

/// One extracted question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Number as printed in the source document.
    pub original_num: u32,
    #[serde(rename = "type")]
    pub subject: QuestionType,
    /// Stem markup, without the leading number.
    pub content_html: String,
    pub options_html: String,
    pub answer_html: String,
    /// Images written for the stem, options and answer zones, in that order.
    pub images: Vec<String>,
    /// Markup of the shared passage this question belongs to, if any.
    pub material_content: Option<String>,
    /// Images written for the material passage.
    #[serde(default)]
    pub material_images: Vec<String>,
}

impl QuestionRecord {
    /// Every image the record references, material first.
    pub fn all_images(&self) -> impl Iterator<Item = &str> {
        self.material_images
            .iter()
            .chain(self.images.iter())
            .map(String::as_str)
    }
}

/// Long-lived extractor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorSettings {
    pub media_root: PathBuf,
    pub public_prefix: String,
    pub continuity: Continuity,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("media"),
            public_prefix: "/media".to_string(),
            continuity: Continuity::LIVE,
        }
    }
}

/// Per-call options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractRequest {
    /// Only these questions are returned; every block is still classified.
    pub targets: Option<TargetSet>,
    pub extract_images: bool,
    /// Subdirectory of the media root for this call's images.
    pub staging: Option<String>,
}

impl Default for ExtractRequest {
    fn default() -> Self {
        Self {
            targets: None,
            extract_images: true,
            staging: None,
        }
    }
}

impl ExtractRequest {
    /// Text-only pass: no image is read or written.
    pub fn scan_only() -> Self {
        Self {
            extract_images: false,
            ..Self::default()
        }
    }

    pub fn with_targets(mut self, targets: TargetSet) -> Self {
        self.targets = Some(targets);
        self
    }

    pub fn with_staging(mut self, staging: impl Into<String>) -> Self {
        self.staging = Some(staging.into());
        self
    }

    fn wants(&self, number: u32) -> bool {
        self.targets.as_ref().is_none_or(|t| t.contains(number))
    }
}

/// The material in scope: its blocks, rendered on first use.
#[derive(Default)]
struct MaterialScope {
    blocks: Vec<Block>,
    rendered: Option<Fragment>,
}

impl MaterialScope {
    fn fragment(&mut self, renderer: &Renderer, media: &mut dyn MediaSource) -> &Fragment {
        self.rendered
            .get_or_insert_with(|| renderer.render_all(&self.blocks, media))
    }
}

pub struct Extractor {
    settings: ExtractorSettings,
    rules: Rules,
}

impl Extractor {
    pub fn new(settings: ExtractorSettings) -> Self {
        let rules = Rules::with_continuity(settings.continuity);
        Self { settings, rules }
    }

    pub fn settings(&self) -> &ExtractorSettings {
        &self.settings
    }

    /// Extracts questions from a `.docx` file.
    pub fn extract_file(
        &self,
        path: impl AsRef<Path>,
        request: &ExtractRequest,
    ) -> Result<Vec<QuestionRecord>, ExtractError> {
        let path = path.as_ref();
        validate(request)?;
        info!("Extracting questions from {}", path.display());

        let mut package = DocxPackage::open(path)?;
        let (blocks, media) = package.blocks_with_media()?;
        self.extract_blocks(blocks, media, request)
    }

    /// Extracts questions from an already-normalized block stream.
    pub fn extract_blocks<I>(
        &self,
        blocks: I,
        media: &mut dyn MediaSource,
        request: &ExtractRequest,
    ) -> Result<Vec<QuestionRecord>, ExtractError>
    where
        I: IntoIterator<Item = Result<Block, ExtractError>>,
    {
        validate(request)?;
        let store = MediaStore::open(&self.settings.media_root)?;
        let renderer = Renderer::new(
            store,
            self.settings.public_prefix.clone(),
            RenderOptions {
                extract_images: request.extract_images,
                staging: request.staging.clone(),
            },
        );

        let mut material = MaterialScope::default();
        let mut records = Vec::new();

        for event in Spans::new(blocks.into_iter(), &self.rules) {
            match event? {
                SpanEvent::Section { material_lead, .. } => {
                    material = MaterialScope::default();
                    material.blocks.extend(material_lead);
                }
                SpanEvent::Material(block) => material.blocks.push(block),
                SpanEvent::Question(span) => {
                    if !request.wants(span.original_num) {
                        debug!("Skipping question {} (not requested)", span.original_num);
                        continue;
                    }
                    let passage = material.fragment(&renderer, media).clone();
                    records.push(self.build_record(span, passage, &renderer, media));
                }
            }
        }

        info!(
            "Extracted {} questions ({} images)",
            records.len(),
            records.iter().map(|r| r.all_images().count()).sum::<usize>()
        );
        Ok(records)
    }

    fn build_record(
        &self,
        span: QuestionSpan,
        material: Fragment,
        renderer: &Renderer,
        media: &mut dyn MediaSource,
    ) -> QuestionRecord {
        let zones = segment(span.blocks, &self.rules.patterns);
        let stem = renderer.render_all(&zones.stem, media);
        let options = renderer.render_all(&zones.options, media);
        let answer = renderer.render_all(&zones.analysis, media);

        let mut images = stem.images;
        images.extend(options.images);
        images.extend(answer.images);

        QuestionRecord {
            original_num: span.original_num,
            subject: span.subject,
            content_html: stem.html,
            options_html: options.html,
            answer_html: answer.html,
            images,
            material_content: (!material.html.is_empty()).then_some(material.html),
            material_images: material.images,
        }
    }
}

fn validate(request: &ExtractRequest) -> Result<(), ExtractError> {
    match &request.staging {
        Some(name) if !is_valid_staging_name(name) => {
            Err(ExtractError::InvalidStaging(name.clone()))
        }
        _ => Ok(()),
    }
}
