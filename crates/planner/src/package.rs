use anyhow::{Context, Result};
use serde_json::json;
use std::path::{Path, PathBuf};

use crate::ooxml::{self, Part};
use crate::types::{LessonRequest, PackageFiles};

pub const MANIFEST_ENTRY: &str = "manifest.json";
pub const PACKAGE_FORMAT: &str = "lesson-package-v1";

/// Longest slug kept from grade/subject/topic before the run id is appended
const MAX_SLUG_LEN: usize = 60;

/// File names of every artefact produced by one generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtefactNames {
    pub lesson_plan: String,
    pub worksheets: String,
    pub rubrics: String,
    pub question_bank: String,
    pub powerpoint: String,
    pub package: String,
}

impl ArtefactNames {
    pub fn new(request: &LessonRequest, run_id: &str) -> Self {
        let base = format!(
            "{}_{}",
            slug(&[
                request.grade.as_str(),
                request.subject.as_str(),
                request.topic.as_str(),
            ]),
            run_id
        );
        Self {
            lesson_plan: format!("{}_Lesson_Plan.docx", base),
            worksheets: format!("{}_Worksheets.docx", base),
            rubrics: format!("{}_Rubrics.docx", base),
            question_bank: format!("{}_Question_Bank.docx", base),
            powerpoint: format!("{}_Presentation.pptx", base),
            package: format!("{}_Package.zip", base),
        }
    }

    /// The five files bundled into the package, in bundle order
    pub fn documents(&self) -> [&str; 5] {
        [
            self.lesson_plan.as_str(),
            self.worksheets.as_str(),
            self.rubrics.as_str(),
            self.question_bank.as_str(),
            self.powerpoint.as_str(),
        ]
    }

    pub fn into_files(self) -> PackageFiles {
        PackageFiles {
            lesson_plan: self.lesson_plan,
            worksheets: self.worksheets,
            rubrics: self.rubrics,
            question_bank: self.question_bank,
            powerpoint: self.powerpoint,
            package: self.package,
        }
    }
}

/// File-name-safe join of the parts: ASCII alphanumerics kept, runs of
/// anything else collapsed to one underscore
pub fn slug(parts: &[&str]) -> String {
    let mut out = String::new();
    for part in parts {
        for c in part.chars() {
            if c.is_ascii_alphanumeric() {
                out.push(c);
            } else if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
        }
        if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    let mut out: String = out.trim_end_matches('_').chars().take(MAX_SLUG_LEN).collect();
    while out.ends_with('_') {
        out.pop();
    }
    if out.is_empty() {
        "Lesson".to_string()
    } else {
        out
    }
}

/// Bundle the generated documents in `dir` into the package zip, next to them
pub fn write_package(dir: &Path, names: &ArtefactNames, request: &LessonRequest) -> Result<PathBuf> {
    let manifest = json!({
        "format": PACKAGE_FORMAT,
        "app_version": env!("CARGO_PKG_VERSION"),
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "grade": request.grade,
        "subject": request.subject,
        "topic": request.topic,
        "date": request.date,
        "period": request.period,
        "files": names.documents(),
    });

    let mut parts = vec![Part::new(
        MANIFEST_ENTRY,
        serde_json::to_string_pretty(&manifest).context("failed to serialize manifest")?,
    )];
    for name in names.documents() {
        let path = dir.join(name);
        let data = std::fs::read(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        parts.push(Part::new(name, data));
    }

    let out_path = dir.join(&names.package);
    let bytes = ooxml::zip_parts(&parts)?;
    std::fs::write(&out_path, bytes)
        .with_context(|| format!("failed to write package {}", out_path.display()))?;
    Ok(out_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::sample_request;
    use std::fs::File;
    use std::io::Read;

    #[test]
    fn test_slug_collapses_separators() {
        assert_eq!(slug(&["Grade 7", "Science", "Photo-synthesis!"]), "Grade_7_Science_Photo_synthesis");
        assert_eq!(slug(&["  ", "Math"]), "Math");
        assert_eq!(slug(&["../../etc", "passwd"]), "etc_passwd");
    }

    #[test]
    fn test_slug_fallback_and_limit() {
        assert_eq!(slug(&["", "???"]), "Lesson");
        assert_eq!(slug(&["العلوم"]), "Lesson");
        let long = "x".repeat(200);
        assert_eq!(slug(&[long.as_str()]).len(), MAX_SLUG_LEN);
    }

    #[test]
    fn test_names_share_base_and_run_id() {
        let names = ArtefactNames::new(&sample_request(), "abcd1234");
        assert_eq!(names.lesson_plan, "Grade_7_Science_Photosynthesis_abcd1234_Lesson_Plan.docx");
        assert_eq!(names.package, "Grade_7_Science_Photosynthesis_abcd1234_Package.zip");
        assert!(names.documents().iter().all(|n| n.contains("_abcd1234_")));
        assert_eq!(names.clone().into_files().powerpoint, names.powerpoint);
    }

    #[test]
    fn test_write_package_bundles_documents_and_manifest() {
        let dir = tempfile::TempDir::new().unwrap();
        let names = ArtefactNames::new(&sample_request(), "feedbeef");
        for name in names.documents() {
            std::fs::write(dir.path().join(name), name.as_bytes()).unwrap();
        }

        let path = write_package(dir.path(), &names, &sample_request()).unwrap();
        assert_eq!(path, dir.path().join(&names.package));

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 6);

        let mut manifest = String::new();
        archive
            .by_name(MANIFEST_ENTRY)
            .unwrap()
            .read_to_string(&mut manifest)
            .unwrap();
        let manifest: serde_json::Value = serde_json::from_str(&manifest).unwrap();
        assert_eq!(manifest["format"], PACKAGE_FORMAT);
        assert_eq!(manifest["topic"], "Photosynthesis");
        assert_eq!(manifest["files"].as_array().unwrap().len(), 5);

        let mut rubric = String::new();
        archive
            .by_name(&names.rubrics)
            .unwrap()
            .read_to_string(&mut rubric)
            .unwrap();
        assert_eq!(rubric, names.rubrics);
    }

    #[test]
    fn test_write_package_fails_when_document_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let names = ArtefactNames::new(&sample_request(), "00000000");
        assert!(write_package(dir.path(), &names, &sample_request()).is_err());
    }
}
