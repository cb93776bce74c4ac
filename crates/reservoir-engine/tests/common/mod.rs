// Shared by several integration test files; not every helper is used by each.
#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="png" ContentType="image/png"/>
<Default Extension="jpeg" ContentType="image/jpeg"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const IMAGE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// Tiny but real PNG header; content is never decoded.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

struct Relationship {
    id: String,
    target: String,
    external: bool,
}

/// Builds minimal `.docx` packages for tests.
#[derive(Default)]
pub struct DocxBuilder {
    body: String,
    relationships: Vec<Relationship>,
    media: Vec<(String, Vec<u8>)>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paragraph(mut self, text: &str) -> Self {
        self.body.push_str(&paragraph_xml(text, &[]));
        self
    }

    pub fn paragraphs(mut self, lines: &[&str]) -> Self {
        for line in lines {
            self.body.push_str(&paragraph_xml(line, &[]));
        }
        self
    }

    /// A paragraph followed by one embedded picture per `media/<name>` part.
    pub fn image_paragraph(mut self, text: &str, images: &[&str]) -> Self {
        let mut ids = Vec::new();
        for name in images {
            let id = format!("rIdImg{}", self.relationships.len() + 1);
            self.relationships.push(Relationship {
                id: id.clone(),
                target: format!("media/{name}"),
                external: false,
            });
            self.media.push((format!("word/media/{name}"), PNG_BYTES.to_vec()));
            ids.push(id);
        }
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
        self.body.push_str(&paragraph_xml(text, &ids));
        self
    }

    /// A paragraph whose picture links to a file outside the package.
    pub fn linked_image_paragraph(mut self, text: &str, url: &str) -> Self {
        let id = format!("rIdExt{}", self.relationships.len() + 1);
        self.relationships.push(Relationship {
            id: id.clone(),
            target: url.to_string(),
            external: true,
        });
        self.body.push_str(&paragraph_xml(text, &[&id]));
        self
    }

    pub fn table(mut self, rows: &[&[&str]]) -> Self {
        self.body.push_str("<w:tbl>");
        for row in rows {
            self.body.push_str("<w:tr>");
            for cell in *row {
                self.body.push_str("<w:tc>");
                self.body.push_str(&paragraph_xml(cell, &[]));
                self.body.push_str("</w:tc>");
            }
            self.body.push_str("</w:tr>");
        }
        self.body.push_str("</w:tbl>");
        self
    }

    /// Appends body XML verbatim.
    pub fn raw(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    pub fn write_to(self, path: &Path) -> PathBuf {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();

        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(PACKAGE_RELS.as_bytes()).unwrap();

        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(self.document_xml().as_bytes()).unwrap();

        zip.start_file("word/_rels/document.xml.rels", options).unwrap();
        zip.write_all(self.relationships_xml().as_bytes()).unwrap();

        for (name, bytes) in &self.media {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(bytes).unwrap();
        }

        zip.finish().unwrap();
        path.to_path_buf()
    }

    fn document_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">
<w:body>{}<w:sectPr/></w:body>
</w:document>"#,
            self.body
        )
    }

    fn relationships_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for rel in &self.relationships {
            let mode = if rel.external { r#" TargetMode="External""# } else { "" };
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{IMAGE_REL}" Target="{}"{mode}/>"#,
                rel.id,
                escape(&rel.target)
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }
}

fn paragraph_xml(text: &str, image_ids: &[&str]) -> String {
    let mut xml = String::from("<w:p>");
    if !text.is_empty() {
        xml.push_str(&format!(
            r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#,
            escape(text)
        ));
    }
    for id in image_ids {
        xml.push_str(&format!(
            r#"<w:r><w:drawing><wp:inline><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic><pic:blipFill><a:blip r:embed="{id}"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#
        ));
    }
    xml.push_str("</w:p>");
    xml
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Count regular files below a directory, recursively
pub fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .map(|e| e.unwrap().path())
        .map(|p| if p.is_dir() { count_files(&p) } else { 1 })
        .sum()
}

/// Markup with tags removed and all whitespace dropped.
pub fn visible_text(html: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag && !c.is_whitespace() => out.push(c),
            _ => {}
        }
    }
    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
