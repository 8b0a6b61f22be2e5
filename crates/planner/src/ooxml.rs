//! Shared plumbing for the Office Open XML writers: escaping and zip assembly.

use anyhow::{Context, Result};
use std::borrow::Cow;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

pub const RELS_CONTENT_TYPE: &str = "application/vnd.openxmlformats-package.relationships+xml";

pub const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

/// Escape text for element content and attribute values
pub fn escape(text: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(text)
}

/// A named file inside a zip container
pub struct Part {
    pub name: String,
    pub data: Vec<u8>,
}

impl Part {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Write parts into an in-memory, deflated zip archive, in order
pub fn zip_parts(parts: &[Part]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for part in parts {
        zip.start_file(part.name.as_str(), opts)
            .with_context(|| format!("failed to start zip entry {}", part.name))?;
        zip.write_all(&part.data)
            .with_context(|| format!("failed to write zip entry {}", part.name))?;
    }

    let cursor = zip.finish().context("failed to finalize zip archive")?;
    Ok(cursor.into_inner())
}

/// `[Content_Types].xml` with the rels/xml defaults plus the given overrides
pub fn content_types(overrides: &[(String, &str)]) -> String {
    let mut xml = String::from(XML_HEADER);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(&format!(
        r#"<Default Extension="rels" ContentType="{}"/>"#,
        RELS_CONTENT_TYPE
    ));
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    for (part_name, content_type) in overrides {
        xml.push_str(&format!(
            r#"<Override PartName="{}" ContentType="{}"/>"#,
            part_name, content_type
        ));
    }
    xml.push_str("</Types>");
    xml
}

/// A relationships part; each entry is (id, type, target)
pub fn relationships(rels: &[(String, &str, String)]) -> String {
    let mut xml = String::from(XML_HEADER);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, kind, target) in rels {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id, kind, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}
