use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use relative_path::{RelativePath, RelativePathBuf};

/// Extension used when an image part carries none.
pub const FALLBACK_EXTENSION: &str = "png";

/// Per-image failure. Never fatal: the renderer skips the image and its tag.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("No relationship with id {0}")]
    UnknownRelationship(String),
    #[error("Relationship {rel_id} points outside the package: {target}")]
    External { rel_id: String, target: String },
    #[error("Cannot read image part {part}: {reason}")]
    Read { part: String, reason: String },
    #[error("Cannot write image {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Raw bytes of an embedded image plus the extension it should be stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub bytes: Vec<u8>,
    pub extension: String,
}

impl EmbeddedImage {
    /// Derives the stored extension from the part name (`media/image3.jpeg`).
    pub fn from_part_name(part_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            extension: extension_for(part_name),
        }
    }
}

fn extension_for(part_name: &str) -> String {
    let file = part_name.rsplit('/').next().unwrap_or(part_name);
    match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            if ext == "jpeg" { "jpg".to_string() } else { ext }
        }
        _ => FALLBACK_EXTENSION.to_string(),
    }
}

/// Where image bytes come from, keyed by package relationship id.
pub trait MediaSource {
    fn fetch(&mut self, rel_id: &str) -> Result<EmbeddedImage, MediaError>;
}

/// In-memory source, mostly for tests and callers that already hold the bytes.
#[derive(Debug, Default, Clone)]
pub struct MemoryMedia {
    images: HashMap<String, EmbeddedImage>,
}

impl MemoryMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, rel_id: impl Into<String>, image: EmbeddedImage) {
        self.images.insert(rel_id.into(), image);
    }
}

impl MediaSource for MemoryMedia {
    fn fetch(&mut self, rel_id: &str) -> Result<EmbeddedImage, MediaError> {
        self.images
            .get(rel_id)
            .cloned()
            .ok_or_else(|| MediaError::UnknownRelationship(rel_id.to_string()))
    }
}

/// Returns true if `name` is usable as a staging subdirectory: one plain
/// path component, no separators, no `.`/`..`.
pub fn is_valid_staging_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}

/// The on-disk media root that extracted images are written into.
///
/// Filenames are random v4 UUIDs, so independent callers can share a root
/// without coordination as long as each uses its own staging directory.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    /// Opens (creating if needed) a media root.
    pub fn open(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes an image under a fresh unique name.
    ///
    /// Returns the path relative to the media root, `[staging/]<uuid>.<ext>`.
    pub fn save(
        &self,
        staging: Option<&str>,
        image: &EmbeddedImage,
    ) -> Result<RelativePathBuf, MediaError> {
        let filename = format!("{}.{}", uuid::Uuid::new_v4().simple(), image.extension);
        let relative = match staging {
            Some(dir) => RelativePath::new(dir).join(&filename),
            None => RelativePathBuf::from(filename),
        };
        let absolute = relative.to_path(&self.root);

        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).map_err(|source| MediaError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&absolute, &image.bytes).map_err(|source| MediaError::Write {
            path: absolute.clone(),
            source,
        })?;

        Ok(relative)
    }
}
