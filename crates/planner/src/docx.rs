//! Minimal WordprocessingML (.docx) writer.
//!
//! Produces a package with only the main document part; formatting is
//! applied directly to runs so no styles part is needed.

use anyhow::{Context, Result};
use std::path::Path;

use crate::ooxml::{self, escape, Part};

const DOCUMENT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

const ACCENT: &str = "1F4E79";
const HEADER_FILL: &str = "D9E2F3";

/// Full text width of an A4 page with 1" margins, in twentieths of a point
const TEXT_WIDTH: usize = 9026;

#[derive(Debug, Default)]
pub struct DocxBuilder {
    body: String,
}

struct Run<'a> {
    text: &'a str,
    bold: bool,
    italic: bool,
    size: Option<u32>,
    color: Option<&'a str>,
}

impl<'a> Run<'a> {
    fn plain(text: &'a str) -> Self {
        Self {
            text,
            bold: false,
            italic: false,
            size: None,
            color: None,
        }
    }

    fn bold(text: &'a str) -> Self {
        Self {
            bold: true,
            ..Self::plain(text)
        }
    }

    fn to_xml(&self) -> String {
        let mut props = String::new();
        if self.bold {
            props.push_str("<w:b/>");
        }
        if self.italic {
            props.push_str("<w:i/>");
        }
        if let Some(color) = self.color {
            props.push_str(&format!(r#"<w:color w:val="{}"/>"#, color));
        }
        if let Some(size) = self.size {
            props.push_str(&format!(r#"<w:sz w:val="{}"/>"#, size));
        }
        let props = if props.is_empty() {
            props
        } else {
            format!("<w:rPr>{}</w:rPr>", props)
        };
        format!(
            r#"<w:r>{}<w:t xml:space="preserve">{}</w:t></w:r>"#,
            props,
            escape(self.text)
        )
    }
}

fn paragraph_xml(runs: &[Run<'_>], spacing_before: u32, centered: bool) -> String {
    let mut props = format!(r#"<w:spacing w:before="{}" w:after="120"/>"#, spacing_before);
    if centered {
        props.push_str(r#"<w:jc w:val="center"/>"#);
    }
    let runs: String = runs.iter().map(Run::to_xml).collect();
    format!("<w:p><w:pPr>{}</w:pPr>{}</w:p>", props, runs)
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Large centred document title
    pub fn title(&mut self, text: &str) -> &mut Self {
        let run = Run {
            size: Some(36),
            color: Some(ACCENT),
            ..Run::bold(text)
        };
        self.body.push_str(&paragraph_xml(&[run], 0, true));
        self
    }

    /// Centred italic line under the title
    pub fn subtitle(&mut self, text: &str) -> &mut Self {
        let run = Run {
            italic: true,
            size: Some(24),
            ..Run::plain(text)
        };
        self.body.push_str(&paragraph_xml(&[run], 0, true));
        self
    }

    /// Section heading; level 1 is the largest
    pub fn heading(&mut self, text: &str, level: u8) -> &mut Self {
        let size = match level {
            0 | 1 => 30,
            2 => 26,
            _ => 23,
        };
        let run = Run {
            size: Some(size),
            color: Some(ACCENT),
            ..Run::bold(text)
        };
        self.body.push_str(&paragraph_xml(&[run], 240, false));
        self
    }

    /// One paragraph per line of `text`; blank lines are dropped
    pub fn paragraph(&mut self, text: &str) -> &mut Self {
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            self.body
                .push_str(&paragraph_xml(&[Run::plain(line)], 0, false));
        }
        self
    }

    /// "Label: text" with a bold label
    pub fn labelled(&mut self, label: &str, text: &str) -> &mut Self {
        let label = format!("{}: ", label);
        self.body.push_str(&paragraph_xml(
            &[Run::bold(&label), Run::plain(text)],
            0,
            false,
        ));
        self
    }

    pub fn bullets<I, S>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for item in items {
            let text = format!("\u{2022} {}", item.as_ref().trim());
            self.body
                .push_str(&paragraph_xml(&[Run::plain(&text)], 0, false));
        }
        self
    }

    pub fn numbered<I, S>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (idx, item) in items.into_iter().enumerate() {
            let text = format!("{}. {}", idx + 1, item.as_ref().trim());
            self.body
                .push_str(&paragraph_xml(&[Run::plain(&text)], 0, false));
        }
        self
    }

    /// Empty lines for written answers
    pub fn answer_lines(&mut self, count: usize) -> &mut Self {
        let line = "_".repeat(70);
        for _ in 0..count {
            self.body
                .push_str(&paragraph_xml(&[Run::plain(&line)], 0, false));
        }
        self
    }

    /// Bordered table with a shaded header row and equal column widths
    pub fn table(&mut self, header: &[&str], rows: &[Vec<String>]) -> &mut Self {
        let columns = header.len().max(1);
        let width = TEXT_WIDTH / columns;

        let cell = |text: &str, header_row: bool| {
            let shade = if header_row {
                format!(r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#, HEADER_FILL)
            } else {
                String::new()
            };
            let run = if header_row {
                Run::bold(text)
            } else {
                Run::plain(text)
            };
            format!(
                r#"<w:tc><w:tcPr><w:tcW w:w="{}" w:type="dxa"/>{}</w:tcPr>{}</w:tc>"#,
                width,
                shade,
                paragraph_xml(&[run], 0, false)
            )
        };

        let mut xml = String::from("<w:tbl><w:tblPr>");
        xml.push_str(r#"<w:tblW w:w="0" w:type="auto"/><w:tblBorders>"#);
        for side in ["top", "left", "bottom", "right", "insideH", "insideV"] {
            xml.push_str(&format!(
                r#"<w:{} w:val="single" w:sz="4" w:space="0" w:color="808080"/>"#,
                side
            ));
        }
        xml.push_str("</w:tblBorders></w:tblPr><w:tblGrid>");
        for _ in 0..columns {
            xml.push_str(&format!(r#"<w:gridCol w:w="{}"/>"#, width));
        }
        xml.push_str("</w:tblGrid><w:tr>");
        for title in header {
            xml.push_str(&cell(title, true));
        }
        xml.push_str("</w:tr>");
        for row in rows {
            xml.push_str("<w:tr>");
            for idx in 0..columns {
                xml.push_str(&cell(row.get(idx).map(String::as_str).unwrap_or(""), false));
            }
            xml.push_str("</w:tr>");
        }
        xml.push_str("</w:tbl>");

        self.body.push_str(&xml);
        // Word expects a paragraph between a table and what follows it
        self.body.push_str("<w:p/>");
        self
    }

    pub fn page_break(&mut self) -> &mut Self {
        self.body
            .push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#);
        self
    }

    fn document_xml(&self) -> String {
        format!(
            concat!(
                "{}",
                r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
                "<w:body>{}",
                r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/>"#,
                r#"<w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/>"#,
                "</w:sectPr></w:body></w:document>"
            ),
            ooxml::XML_HEADER,
            self.body
        )
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let parts = [
            Part::new(
                "[Content_Types].xml",
                ooxml::content_types(&[("/word/document.xml".to_string(), DOCUMENT_CONTENT_TYPE)]),
            ),
            Part::new(
                "_rels/.rels",
                ooxml::relationships(&[(
                    "rId1".to_string(),
                    ooxml::REL_OFFICE_DOCUMENT,
                    "word/document.xml".to_string(),
                )]),
            ),
            Part::new("word/document.xml", self.document_xml()),
        ];
        ooxml::zip_parts(&parts)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write document {}", path.display()))
    }
}
