//! # Markup Rendering
//!
//! Turns blocks into small HTML fragments and copies the images they embed
//! into the media root.
//!
//! The image list returned with each [`Fragment`] is the manifest other
//! components use to move or delete files, so it is kept in lockstep with
//! the markup: an `<img>` tag is emitted if and only if its file was written
//! and its name pushed onto the list.

use std::collections::HashSet;

use log::warn;

use crate::document::{Block, GridBlock, ImageRef, TextBlock};

pub mod media;

pub use media::{
    EmbeddedImage, FALLBACK_EXTENSION, MediaError, MediaSource, MediaStore, MemoryMedia,
    is_valid_staging_name,
};

/// Rendered markup plus the filenames of the images it references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub html: String,
    pub images: Vec<String>,
}

impl Fragment {
    pub fn is_empty(&self) -> bool {
        self.html.is_empty() && self.images.is_empty()
    }

    pub fn append(&mut self, other: Fragment) {
        self.html.push_str(&other.html);
        self.images.extend(other.images);
    }
}

/// Per-call rendering switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// When false, no image bytes are read or written and no image tags are emitted.
    pub extract_images: bool,
    /// Subdirectory of the media root receiving this call's images.
    pub staging: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            extract_images: true,
            staging: None,
        }
    }
}

impl RenderOptions {
    pub fn scan_only() -> Self {
        Self {
            extract_images: false,
            staging: None,
        }
    }
}

pub struct Renderer {
    store: MediaStore,
    public_prefix: String,
    options: RenderOptions,
}

impl Renderer {
    pub fn new(store: MediaStore, public_prefix: impl Into<String>, options: RenderOptions) -> Self {
        let public_prefix = public_prefix.into().trim_end_matches('/').to_string();
        Self {
            store,
            public_prefix,
            options,
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Renders one block. A relationship id seen twice in the block is
    /// stored and tagged once.
    pub fn render(&self, block: &Block, media: &mut dyn MediaSource) -> Fragment {
        let mut seen = HashSet::new();
        match block {
            Block::Text(text) => self.render_text(text, media, &mut seen),
            Block::Grid(grid) => self.render_grid(grid, media, &mut seen),
        }
    }

    /// Renders blocks in order into one fragment.
    pub fn render_all<'b>(
        &self,
        blocks: impl IntoIterator<Item = &'b Block>,
        media: &mut dyn MediaSource,
    ) -> Fragment {
        let mut out = Fragment::default();
        for block in blocks {
            out.append(self.render(block, media));
        }
        out
    }

    fn render_text(
        &self,
        block: &TextBlock,
        media: &mut dyn MediaSource,
        seen: &mut HashSet<String>,
    ) -> Fragment {
        let mut out = Fragment::default();
        let text = block.text();
        let text = text.trim();
        if !text.is_empty() {
            out.html.push_str("<p>");
            out.html.push_str(&html_escape::encode_text(text));
            out.html.push_str("</p>");
        }
        self.render_images(block.images(), media, seen, &mut out);
        out
    }

    fn render_grid(
        &self,
        grid: &GridBlock,
        media: &mut dyn MediaSource,
        seen: &mut HashSet<String>,
    ) -> Fragment {
        let mut out = Fragment::default();
        out.html
            .push_str("<table border='1' cellspacing='0' cellpadding='5'>");
        for row in &grid.rows {
            out.html.push_str("<tr>");
            for cell in row {
                out.html.push_str("<td>");
                out.html
                    .push_str(&html_escape::encode_text(cell.text().trim()));
                out.html.push_str("</td>");
            }
            out.html.push_str("</tr>");
        }
        out.html.push_str("</table>");

        let images = grid
            .cells()
            .flat_map(|cell| cell.blocks.iter())
            .flat_map(TextBlock::images);
        self.render_images(images, media, seen, &mut out);
        out
    }

    fn render_images<'b>(
        &self,
        refs: impl Iterator<Item = &'b ImageRef>,
        media: &mut dyn MediaSource,
        seen: &mut HashSet<String>,
        out: &mut Fragment,
    ) {
        if !self.options.extract_images {
            return;
        }
        for image_ref in refs {
            if !seen.insert(image_ref.rel_id.clone()) {
                continue;
            }
            match self.store_image(image_ref, media) {
                Ok(name) => {
                    out.html.push_str(&self.image_tag(&name));
                    out.images.push(name);
                }
                Err(e) => warn!("Skipping image {}: {e}", image_ref.rel_id),
            }
        }
    }

    fn store_image(
        &self,
        image_ref: &ImageRef,
        media: &mut dyn MediaSource,
    ) -> Result<String, MediaError> {
        let image = media.fetch(&image_ref.rel_id)?;
        let relative = self.store.save(self.options.staging.as_deref(), &image)?;
        Ok(relative.file_name().unwrap_or(relative.as_str()).to_string())
    }

    fn image_tag(&self, name: &str) -> String {
        let src = match &self.options.staging {
            Some(staging) => format!("{}/{staging}/{name}", self.public_prefix),
            None => format!("{}/{name}", self.public_prefix),
        };
        format!(
            r#"<div class="img-container"><img src="{}" class="question-img" /></div>"#,
            html_escape::encode_double_quoted_attribute(&src)
        )
    }
}
