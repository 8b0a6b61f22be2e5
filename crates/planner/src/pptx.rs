//! Minimal PresentationML (.pptx) writer.
//!
//! One master, one blank layout and a theme; every slide draws its own
//! text boxes so no placeholders are involved.

use anyhow::{Context, Result};
use std::path::Path;

use crate::ooxml::{self, escape, Part};

const NS: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);

const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";

/// 16:9 slide size in EMU
const SLIDE_WIDTH: u64 = 12_192_000;
const SLIDE_HEIGHT: u64 = 6_858_000;

/// Bullets per slide before the rest moves to a continuation slide
pub const MAX_BULLETS: usize = 7;

/// Colour palette chosen by the request's `style` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideStyle {
    Modern,
    Classic,
    Vibrant,
}

struct Palette {
    background: &'static str,
    accent: &'static str,
    heading_text: &'static str,
    body_text: &'static str,
}

impl SlideStyle {
    /// Unknown or empty names fall back to `Modern`
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" => Self::Classic,
            "vibrant" | "colorful" | "colourful" => Self::Vibrant,
            _ => Self::Modern,
        }
    }

    fn palette(self) -> Palette {
        match self {
            Self::Modern => Palette {
                background: "FFFFFF",
                accent: "1F4E79",
                heading_text: "FFFFFF",
                body_text: "333333",
            },
            Self::Classic => Palette {
                background: "FDF6E3",
                accent: "7B3F00",
                heading_text: "FDF6E3",
                body_text: "3B2F2F",
            },
            Self::Vibrant => Palette {
                background: "FFFFFF",
                accent: "C2185B",
                heading_text: "FFFFFF",
                body_text: "00695C",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Slide {
    Title { title: String, subtitle: String },
    Bullets { title: String, bullets: Vec<String> },
}

#[derive(Debug)]
pub struct Deck {
    style: SlideStyle,
    slides: Vec<Slide>,
}

impl Deck {
    pub fn new(style: SlideStyle) -> Self {
        Self {
            style,
            slides: Vec::new(),
        }
    }

    pub fn title_slide(&mut self, title: &str, subtitle: &str) -> &mut Self {
        self.slides.push(Slide::Title {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
        });
        self
    }

    /// Bullet slide; long lists continue on "(cont.)" slides. Empty items are dropped,
    /// and a list with no items adds no slide.
    pub fn bullet_slide<I, S>(&mut self, title: &str, bullets: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let bullets: Vec<String> = bullets
            .into_iter()
            .map(|b| b.as_ref().trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();

        for (idx, chunk) in bullets.chunks(MAX_BULLETS).enumerate() {
            let title = if idx == 0 {
                title.to_string()
            } else {
                format!("{} (cont.)", title)
            };
            self.slides.push(Slide::Bullets {
                title,
                bullets: chunk.to_vec(),
            });
        }
        self
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let palette = self.style.palette();
        let count = self.slides.len();

        let mut overrides = vec![
            ("/ppt/presentation.xml".to_string(), CT_PRESENTATION),
            ("/ppt/slideMasters/slideMaster1.xml".to_string(), CT_SLIDE_MASTER),
            ("/ppt/slideLayouts/slideLayout1.xml".to_string(), CT_SLIDE_LAYOUT),
            ("/ppt/theme/theme1.xml".to_string(), CT_THEME),
        ];
        overrides.extend((1..=count).map(|n| (format!("/ppt/slides/slide{}.xml", n), CT_SLIDE)));

        let mut presentation_rels = vec![
            (
                "rId1".to_string(),
                REL_SLIDE_MASTER,
                "slideMasters/slideMaster1.xml".to_string(),
            ),
            ("rId2".to_string(), REL_THEME, "theme/theme1.xml".to_string()),
        ];
        presentation_rels.extend(
            (1..=count).map(|n| (format!("rId{}", n + 2), REL_SLIDE, format!("slides/slide{}.xml", n))),
        );

        let mut parts = vec![
            Part::new("[Content_Types].xml", ooxml::content_types(&overrides)),
            Part::new(
                "_rels/.rels",
                ooxml::relationships(&[(
                    "rId1".to_string(),
                    ooxml::REL_OFFICE_DOCUMENT,
                    "ppt/presentation.xml".to_string(),
                )]),
            ),
            Part::new("ppt/presentation.xml", presentation_xml(count)),
            Part::new(
                "ppt/_rels/presentation.xml.rels",
                ooxml::relationships(&presentation_rels),
            ),
            Part::new("ppt/slideMasters/slideMaster1.xml", master_xml(&palette)),
            Part::new(
                "ppt/slideMasters/_rels/slideMaster1.xml.rels",
                ooxml::relationships(&[
                    (
                        "rId1".to_string(),
                        REL_SLIDE_LAYOUT,
                        "../slideLayouts/slideLayout1.xml".to_string(),
                    ),
                    ("rId2".to_string(), REL_THEME, "../theme/theme1.xml".to_string()),
                ]),
            ),
            Part::new("ppt/slideLayouts/slideLayout1.xml", layout_xml()),
            Part::new(
                "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
                ooxml::relationships(&[(
                    "rId1".to_string(),
                    REL_SLIDE_MASTER,
                    "../slideMasters/slideMaster1.xml".to_string(),
                )]),
            ),
            Part::new("ppt/theme/theme1.xml", theme_xml(&palette)),
        ];

        let layout_rel = [(
            "rId1".to_string(),
            REL_SLIDE_LAYOUT,
            "../slideLayouts/slideLayout1.xml".to_string(),
        )];
        for (idx, slide) in self.slides.iter().enumerate() {
            let n = idx + 1;
            parts.push(Part::new(
                format!("ppt/slides/slide{}.xml", n),
                slide_xml(slide, &palette),
            ));
            parts.push(Part::new(
                format!("ppt/slides/_rels/slide{}.xml.rels", n),
                ooxml::relationships(&layout_rel),
            ));
        }

        ooxml::zip_parts(&parts)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write presentation {}", path.display()))
    }
}

fn presentation_xml(count: usize) -> String {
    let slide_ids: String = (1..=count)
        .map(|n| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, n + 2))
        .collect();
    let slide_list = if slide_ids.is_empty() {
        String::new()
    } else {
        format!("<p:sldIdLst>{}</p:sldIdLst>", slide_ids)
    };
    format!(
        r#"{}<p:presentation {}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>{}<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
        ooxml::XML_HEADER,
        NS,
        slide_list,
        SLIDE_WIDTH,
        SLIDE_HEIGHT
    )
}

const EMPTY_TREE_HEADER: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

fn master_xml(palette: &Palette) -> String {
    format!(
        concat!(
            "{}<p:sldMaster {}><p:cSld><p:bg><p:bgPr>",
            r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
            "<p:spTree>{}</p:spTree></p:cSld>",
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
            r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
            "</p:sldMaster>"
        ),
        ooxml::XML_HEADER,
        NS,
        palette.background,
        EMPTY_TREE_HEADER
    )
}

fn layout_xml() -> String {
    format!(
        r#"{}<p:sldLayout {} type="blank" preserve="1"><p:cSld name="Blank"><p:spTree>{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        ooxml::XML_HEADER,
        NS,
        EMPTY_TREE_HEADER
    )
}

fn theme_xml(palette: &Palette) -> String {
    let solid = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let line = format!(r#"<a:ln w="6350">{}</a:ln>"#, solid);
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";
    let srgb = |name: &str, val: &str| format!(r#"<a:{0}><a:srgbClr val="{1}"/></a:{0}>"#, name, val);

    let colors = [
        srgb("dk2", "44546A"),
        srgb("lt2", "E7E6E6"),
        srgb("accent1", palette.accent),
        srgb("accent2", "ED7D31"),
        srgb("accent3", "A5A5A5"),
        srgb("accent4", "FFC000"),
        srgb("accent5", "5B9BD5"),
        srgb("accent6", "70AD47"),
        srgb("hlink", "0563C1"),
        srgb("folHlink", "954F72"),
    ]
    .concat();

    format!(
        concat!(
            r#"{}<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Planner"><a:themeElements>"#,
            r#"<a:clrScheme name="Planner"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
            r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>{}</a:clrScheme>"#,
            r#"<a:fontScheme name="Planner">"#,
            r#"<a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
            r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
            r#"</a:fontScheme><a:fmtScheme name="Planner">"#,
            "<a:fillStyleLst>{}</a:fillStyleLst><a:lnStyleLst>{}</a:lnStyleLst>",
            "<a:effectStyleLst>{}</a:effectStyleLst><a:bgFillStyleLst>{}</a:bgFillStyleLst>",
            "</a:fmtScheme></a:themeElements></a:theme>"
        ),
        ooxml::XML_HEADER,
        colors,
        solid.repeat(3),
        line.repeat(3),
        effect.repeat(3),
        solid.repeat(3)
    )
}

struct TextBox<'a> {
    id: usize,
    name: &'a str,
    x: u64,
    y: u64,
    cx: u64,
    cy: u64,
    fill: Option<&'a str>,
}

/// A text paragraph inside a text box
struct Para<'a> {
    text: &'a str,
    size: u32,
    bold: bool,
    color: &'a str,
    centered: bool,
    bullet: bool,
}

fn para_xml(p: &Para<'_>) -> String {
    let mut props = String::new();
    if p.centered {
        props.push_str(r#" algn="ctr""#);
    }
    let ppr = if p.bullet {
        format!(
            r#"<a:pPr marL="342900" indent="-342900"{}><a:spcBef><a:spcPts val="600"/></a:spcBef><a:buFont typeface="Arial"/><a:buChar char="&#8226;"/></a:pPr>"#,
            props
        )
    } else {
        format!("<a:pPr{}/>", props)
    };
    format!(
        r#"<a:p>{}<a:r><a:rPr lang="en-US" sz="{}" b="{}" dirty="0"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:rPr><a:t>{}</a:t></a:r></a:p>"#,
        ppr,
        p.size,
        if p.bold { 1 } else { 0 },
        p.color,
        escape(p.text)
    )
}

fn text_box_xml(b: &TextBox<'_>, paragraphs: &[Para<'_>]) -> String {
    let fill = b
        .fill
        .map(|c| format!(r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, c))
        .unwrap_or_default();
    let body: String = paragraphs.iter().map(para_xml).collect();
    format!(
        concat!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#,
            r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>{}</p:spPr>"#,
            r#"<p:txBody><a:bodyPr wrap="square" lIns="228600" rIns="228600" anchor="ctr"><a:normAutofit/></a:bodyPr><a:lstStyle/>{}</p:txBody></p:sp>"#
        ),
        b.id, b.name, b.x, b.y, b.cx, b.cy, fill, body
    )
}

fn slide_xml(slide: &Slide, palette: &Palette) -> String {
    let margin = 609_600;
    let shapes = match slide {
        Slide::Title { title, subtitle } => {
            let band = TextBox {
                id: 2,
                name: "Title",
                x: 0,
                y: 2_057_400,
                cx: SLIDE_WIDTH,
                cy: 1_600_200,
                fill: Some(palette.accent),
            };
            let sub = TextBox {
                id: 3,
                name: "Subtitle",
                x: margin,
                y: 3_886_200,
                cx: SLIDE_WIDTH - 2 * margin,
                cy: 1_143_000,
                fill: None,
            };
            let mut xml = text_box_xml(
                &band,
                &[Para {
                    text: title,
                    size: 4000,
                    bold: true,
                    color: palette.heading_text,
                    centered: true,
                    bullet: false,
                }],
            );
            let sub_paras: Vec<Para<'_>> = subtitle
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(|line| Para {
                    text: line,
                    size: 2000,
                    bold: false,
                    color: palette.body_text,
                    centered: true,
                    bullet: false,
                })
                .collect();
            if !sub_paras.is_empty() {
                xml.push_str(&text_box_xml(&sub, &sub_paras));
            }
            xml
        }
        Slide::Bullets { title, bullets } => {
            let bar = TextBox {
                id: 2,
                name: "Title",
                x: 0,
                y: 0,
                cx: SLIDE_WIDTH,
                cy: 1_143_000,
                fill: Some(palette.accent),
            };
            let body = TextBox {
                id: 3,
                name: "Content",
                x: margin,
                y: 1_371_600,
                cx: SLIDE_WIDTH - 2 * margin,
                cy: SLIDE_HEIGHT - 1_371_600 - 457_200,
                fill: None,
            };
            let mut xml = text_box_xml(
                &bar,
                &[Para {
                    text: title,
                    size: 3200,
                    bold: true,
                    color: palette.heading_text,
                    centered: false,
                    bullet: false,
                }],
            );
            let paras: Vec<Para<'_>> = bullets
                .iter()
                .map(|b| Para {
                    text: b,
                    size: 2000,
                    bold: false,
                    color: palette.body_text,
                    centered: false,
                    bullet: true,
                })
                .collect();
            xml.push_str(&text_box_xml(&body, &paras));
            xml
        }
    };

    format!(
        concat!(
            "{}<p:sld {}><p:cSld><p:bg><p:bgPr>",
            r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
            "<p:spTree>{}{}</p:spTree></p:cSld>",
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"
        ),
        ooxml::XML_HEADER,
        NS,
        palette.background,
        EMPTY_TREE_HEADER,
        shapes
    )
}
