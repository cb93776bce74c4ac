use std::path::PathBuf;

/// Fatal errors: the document cannot be read or its structure is not understood.
///
/// Anything softer than this (ambiguous numbering, a block that cannot be
/// split, an image that cannot be copied) is absorbed by the pipeline and
/// logged instead.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unreadable document package: {0}")]
    Package(#[from] zip::result::ZipError),
    #[error("Malformed document XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("Document package has no {0} part")]
    MissingPart(String),
    #[error("Unsupported document structure: <{0}>")]
    UnsupportedNode(String),
    #[error("Invalid staging directory name: {0:?}")]
    InvalidStaging(String),
    #[error("Invalid question list {input:?}: {reason}")]
    InvalidTargets { input: String, reason: String },
}
