//! Word-processor package reader.
//!
//! Opens an OOXML (`.docx`) package and exposes its body as a lazy stream of
//! [`Block`]s. Tables come out as a single [`GridBlock`]; their cell contents
//! are only reached through [`GridBlock::cells`].

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use roxmltree::{Document as XmlDoc, Node, NodeId};
use zip::ZipArchive;

use super::{Block, Cell, GridBlock, ImageRef, Inline, TextBlock};
use crate::error::ExtractError;
use crate::render::{EmbeddedImage, MediaError, MediaSource};

const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// Body children that carry no content and are passed over silently.
const SKIPPED_BODY_NODES: &[&str] = &[
    "sectPr",
    "bookmarkStart",
    "bookmarkEnd",
    "proofErr",
    "permStart",
    "permEnd",
    "commentRangeStart",
    "commentRangeEnd",
    "moveFromRangeStart",
    "moveFromRangeEnd",
    "moveToRangeStart",
    "moveToRangeEnd",
];

/// Inline wrappers whose runs are part of the paragraph text.
const TRANSPARENT_INLINE_NODES: &[&str] = &[
    "hyperlink",
    "ins",
    "moveTo",
    "smartTag",
    "fldSimple",
    "customXml",
    "sdt",
    "sdtContent",
];

#[derive(Debug, Clone)]
struct Relationship {
    target: String,
    external: bool,
}

/// An opened `.docx` package.
pub struct DocxPackage {
    path: PathBuf,
    body: String,
    media: PackageMedia,
}

/// Image access into an opened package; resolves relationship ids to parts.
pub struct PackageMedia {
    archive: ZipArchive<BufReader<File>>,
    relationships: HashMap<String, Relationship>,
}

impl DocxPackage {
    /// Opens a package and reads its main document part.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ExtractError::NotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;

        let main_part = main_part_name(&mut archive);
        let body = read_zip_text(&mut archive, &main_part)?
            .ok_or_else(|| ExtractError::MissingPart(main_part.clone()))?;
        let relationships = read_relationships(&mut archive, &main_part)?;

        Ok(Self {
            path: path.to_path_buf(),
            body,
            media: PackageMedia {
                archive,
                relationships,
            },
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A fresh block stream over the document body.
    pub fn blocks(&self) -> Result<BlockStream<'_>, ExtractError> {
        BlockStream::parse(&self.body)
    }

    /// A fresh block stream together with the package's image source.
    pub fn blocks_with_media(
        &mut self,
    ) -> Result<(BlockStream<'_>, &mut PackageMedia), ExtractError> {
        let stream = BlockStream::parse(&self.body)?;
        Ok((stream, &mut self.media))
    }
}

impl MediaSource for PackageMedia {
    fn fetch(&mut self, rel_id: &str) -> Result<EmbeddedImage, MediaError> {
        let rel = self
            .relationships
            .get(rel_id)
            .ok_or_else(|| MediaError::UnknownRelationship(rel_id.to_string()))?;
        if rel.external {
            return Err(MediaError::External {
                rel_id: rel_id.to_string(),
                target: rel.target.clone(),
            });
        }

        let part = rel.target.clone();
        let mut entry = self.archive.by_name(&part).map_err(|e| MediaError::Read {
            part: part.clone(),
            reason: e.to_string(),
        })?;
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).map_err(|e| MediaError::Read {
            part: part.clone(),
            reason: e.to_string(),
        })?;

        Ok(EmbeddedImage::from_part_name(&part, bytes))
    }
}

/// Lazy, single-pass stream of the top-level blocks of a document body.
///
/// Yields an error for any body node it does not understand; callers treat
/// that as fatal for the whole document.
pub struct BlockStream<'a> {
    doc: XmlDoc<'a>,
    nodes: Vec<NodeId>,
    pos: usize,
}

impl<'a> BlockStream<'a> {
    /// Parses a main document part (`w:document`).
    pub fn parse(xml: &'a str) -> Result<Self, ExtractError> {
        let doc = XmlDoc::parse(strip_bom(xml))?;
        let body = doc
            .root_element()
            .children()
            .find(|n| is_tag(n, "body"))
            .ok_or_else(|| ExtractError::MissingPart("w:body".to_string()))?;

        let mut nodes = Vec::new();
        collect_body_nodes(body, &mut nodes);

        Ok(Self { doc, nodes, pos: 0 })
    }
}

impl Iterator for BlockStream<'_> {
    type Item = Result<Block, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&id) = self.nodes.get(self.pos) {
            self.pos += 1;
            let node = self.doc.get_node(id)?;
            let name = node.tag_name().name();
            match name {
                "p" => return Some(Ok(Block::Text(read_paragraph(node)))),
                "tbl" => return Some(Ok(Block::Grid(read_table(node)))),
                _ if SKIPPED_BODY_NODES.contains(&name) => continue,
                _ => return Some(Err(ExtractError::UnsupportedNode(name.to_string()))),
            }
        }
        None
    }
}

fn collect_body_nodes(parent: Node, out: &mut Vec<NodeId>) {
    for child in parent.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "sdt" => {
                if let Some(content) = child.children().find(|n| is_tag(n, "sdtContent")) {
                    collect_body_nodes(content, out);
                }
            }
            "customXml" => collect_body_nodes(child, out),
            _ => out.push(child.id()),
        }
    }
}

fn read_paragraph(p: Node) -> TextBlock {
    let mut inlines = Vec::new();
    collect_inlines(p, &mut inlines);
    TextBlock::new(inlines)
}

fn collect_inlines(parent: Node, out: &mut Vec<Inline>) {
    for child in parent.children().filter(Node::is_element) {
        let name = child.tag_name().name();
        match name {
            "r" => collect_run(child, out),
            "oMath" | "oMathPara" => {
                for t in child.descendants().filter(|n| is_tag(n, "t")) {
                    push_text(out, t.text().unwrap_or_default());
                }
            }
            _ if TRANSPARENT_INLINE_NODES.contains(&name) => collect_inlines(child, out),
            _ => {}
        }
    }
}

fn collect_run(run: Node, out: &mut Vec<Inline>) {
    for child in run.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "t" => push_text(out, child.text().unwrap_or_default()),
            "tab" => push_text(out, "\t"),
            "br" | "cr" => push_text(out, "\n"),
            "noBreakHyphen" => push_text(out, "-"),
            "drawing" | "pict" | "object" | "AlternateContent" => collect_images(child, out),
            _ => {}
        }
    }
}

fn collect_images(node: Node, out: &mut Vec<Inline>) {
    for child in node.children().filter(Node::is_element) {
        match child.tag_name().name() {
            // Legacy rendering of the same picture as the `Choice` branch.
            "Fallback" => {}
            "blip" => {
                if let Some(id) = child.attribute((REL_NS, "embed")) {
                    out.push(Inline::Image(ImageRef::new(id)));
                }
            }
            "imagedata" => {
                if let Some(id) = child.attribute((REL_NS, "id")) {
                    out.push(Inline::Image(ImageRef::new(id)));
                }
            }
            _ => collect_images(child, out),
        }
    }
}

fn push_text(out: &mut Vec<Inline>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(Inline::Text(text.to_string()));
    }
}

fn read_table(tbl: Node) -> GridBlock {
    let mut rows = Vec::new();
    for tr in unwrapped_children(tbl, "tr") {
        let cells = unwrapped_children(tr, "tc")
            .into_iter()
            .map(|tc| {
                let mut blocks = Vec::new();
                read_cell_blocks(tc, &mut blocks);
                Cell::new(blocks)
            })
            .collect();
        rows.push(cells);
    }
    GridBlock::new(rows)
}

/// Nested tables are flattened into the enclosing cell's paragraphs.
fn read_cell_blocks(parent: Node, out: &mut Vec<TextBlock>) {
    for child in parent.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "p" => out.push(read_paragraph(child)),
            "tbl" => {
                for cell in read_table(child).cells() {
                    out.extend(cell.blocks.iter().cloned());
                }
            }
            "sdt" | "sdtContent" | "customXml" => read_cell_blocks(child, out),
            _ => {}
        }
    }
}

/// Children named `local`, looking through content-control wrappers.
fn unwrapped_children<'a, 'input>(parent: Node<'a, 'input>, local: &str) -> Vec<Node<'a, 'input>> {
    let mut found = Vec::new();
    for child in parent.children().filter(Node::is_element) {
        let name = child.tag_name().name();
        if name == local {
            found.push(child);
        } else if matches!(name, "sdt" | "sdtContent" | "customXml") {
            found.extend(unwrapped_children(child, local));
        }
    }
    found
}

fn is_tag(node: &Node, local: &str) -> bool {
    node.is_element() && node.tag_name().name() == local
}

fn strip_bom(s: &str) -> &str {
    const BOM: char = '\u{FEFF}';
    s.strip_prefix(BOM).unwrap_or(s)
}

fn read_zip_text<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, ExtractError> {
    let mut file = match archive.by_name(name) {
        Ok(f) => f,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut s = String::new();
    file.read_to_string(&mut s)?;
    Ok(Some(s))
}

/// Locates the main document part through the package relationships,
/// falling back to the conventional name.
fn main_part_name<R: Read + Seek>(archive: &mut ZipArchive<R>) -> String {
    let Ok(Some(xml)) = read_zip_text(archive, "_rels/.rels") else {
        return DEFAULT_MAIN_PART.to_string();
    };
    let Ok(doc) = XmlDoc::parse(strip_bom(&xml)) else {
        return DEFAULT_MAIN_PART.to_string();
    };
    doc.descendants()
        .filter(|n| is_tag(n, "Relationship"))
        .find(|n| n.attribute("Type") == Some(OFFICE_DOCUMENT_REL))
        .and_then(|n| n.attribute("Target"))
        .map(|t| resolve_target("", t))
        .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string())
}

fn read_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    main_part: &str,
) -> Result<HashMap<String, Relationship>, ExtractError> {
    let (dir, file) = main_part.rsplit_once('/').unwrap_or(("", main_part));
    let rels_name = if dir.is_empty() {
        format!("_rels/{file}.rels")
    } else {
        format!("{dir}/_rels/{file}.rels")
    };

    let Some(xml) = read_zip_text(archive, &rels_name)? else {
        return Ok(HashMap::new());
    };
    let doc = XmlDoc::parse(strip_bom(&xml))?;

    let mut map = HashMap::new();
    for rel in doc.descendants().filter(|n| is_tag(n, "Relationship")) {
        if let (Some(id), Some(target)) = (rel.attribute("Id"), rel.attribute("Target")) {
            let external = rel.attribute("TargetMode") == Some("External");
            let target = if external {
                target.to_string()
            } else {
                resolve_target(dir, target)
            };
            map.insert(id.to_string(), Relationship { target, external });
        }
    }
    Ok(map)
}

/// Resolves a relationship target against the directory of its source part.
fn resolve_target(base_dir: &str, target: &str) -> String {
    let mut parts: Vec<&str> = if target.starts_with('/') {
        Vec::new()
    } else {
        base_dir.split('/').filter(|s| !s.is_empty()).collect()
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}
