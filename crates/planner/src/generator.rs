use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::ai::ContentSource;
use crate::documents;
use crate::package::{self, ArtefactNames};
use crate::types::{GenerateResponse, LessonContent, LessonRequest, PackageFiles};

/// URL prefix under which the output directory is served
pub const DOWNLOAD_PREFIX: &str = "/api/download";

/// Runs the full pipeline: content, documents, slides and the zip package
pub struct LessonPlanGenerator {
    source: ContentSource,
    output_dir: PathBuf,
}

impl LessonPlanGenerator {
    pub fn new(source: ContentSource, output_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&output_dir).with_context(|| {
            format!("Failed to create output directory {}", output_dir.display())
        })?;
        Ok(Self { source, output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Generate a package and describe the outcome as the API reports it
    pub async fn generate_complete_package(&self, request: &LessonRequest) -> GenerateResponse {
        match self.generate(request).await {
            Ok(files) => GenerateResponse::Success {
                download_url: format!("{}/{}", DOWNLOAD_PREFIX, files.package),
                files,
            },
            Err(e) => {
                error!(error = %format!("{:#}", e), topic = %request.topic, "Lesson plan generation failed");
                // Client sees the outer context only
                GenerateResponse::Error {
                    message: e.to_string(),
                }
            }
        }
    }

    pub async fn generate(&self, request: &LessonRequest) -> Result<PackageFiles> {
        request.validate()?;

        info!(step = 1, topic = %request.topic, "Generating lesson content");
        let content = self.source.lesson_content(request).await;

        let names = ArtefactNames::new(request, &run_id());
        let dir = self.output_dir.clone();
        let request = request.clone();
        let built = names.clone();
        tokio::task::spawn_blocking(move || build_artefacts(&dir, &built, &request, &content))
            .await
            .context("Document builder task failed")??;

        Ok(names.into_files())
    }
}

/// Short random id shared by every file of one run
fn run_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Steps 2-7: write the documents and the deck, then bundle them
pub fn build_artefacts(
    dir: &Path,
    names: &ArtefactNames,
    request: &LessonRequest,
    content: &LessonContent,
) -> Result<PathBuf> {
    info!(step = 2, "Creating lesson plan document");
    documents::lesson_plan(request, content)
        .save(&dir.join(&names.lesson_plan))
        .context("Failed to create the lesson plan")?;

    info!(step = 3, "Creating worksheets");
    documents::worksheets(request, content)
        .save(&dir.join(&names.worksheets))
        .context("Failed to create the worksheets")?;

    info!(step = 4, "Creating rubrics");
    documents::rubrics(request, content)
        .save(&dir.join(&names.rubrics))
        .context("Failed to create the rubrics")?;

    info!(step = 5, "Creating question bank");
    documents::question_bank(request, content)
        .save(&dir.join(&names.question_bank))
        .context("Failed to create the question bank")?;

    info!(step = 6, "Creating PowerPoint");
    documents::presentation(request, content)
        .save(&dir.join(&names.powerpoint))
        .context("Failed to create the PowerPoint")?;

    info!(step = 7, "Packaging files");
    let path =
        package::write_package(dir, names, request).context("Failed to package the files")?;
    info!(path = %path.display(), "Package ready");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::sample_request;
    use tempfile::TempDir;

    fn generator(dir: &TempDir) -> LessonPlanGenerator {
        LessonPlanGenerator::new(ContentSource::Templates, dir.path().join("output")).unwrap()
    }

    #[tokio::test]
    async fn test_generate_writes_every_artefact() {
        let dir = TempDir::new().unwrap();
        let generator = generator(&dir);

        let response = generator.generate_complete_package(&sample_request()).await;
        let (files, download_url) = match response {
            GenerateResponse::Success {
                files,
                download_url,
            } => (files, download_url),
            GenerateResponse::Error { message } => panic!("generation failed: {}", message),
        };

        assert_eq!(download_url, format!("/api/download/{}", files.package));
        for name in [
            &files.lesson_plan,
            &files.worksheets,
            &files.rubrics,
            &files.question_bank,
            &files.powerpoint,
            &files.package,
        ] {
            assert!(generator.output_dir().join(name).is_file(), "{} missing", name);
        }
        assert!(files.powerpoint.ends_with("_Presentation.pptx"));
    }

    #[tokio::test]
    async fn test_runs_do_not_overwrite_each_other() {
        let dir = TempDir::new().unwrap();
        let generator = generator(&dir);

        let first = generator.generate(&sample_request()).await.unwrap();
        let second = generator.generate(&sample_request()).await.unwrap();
        assert_ne!(first.package, second.package);
    }

    #[tokio::test]
    async fn test_invalid_request_reports_error() {
        let dir = TempDir::new().unwrap();
        let generator = generator(&dir);
        let mut request = sample_request();
        request.subject.clear();

        let response = generator.generate_complete_package(&request).await;
        assert_eq!(
            response,
            GenerateResponse::Error {
                message: "Please fill in all required fields: subject".to_string()
            }
        );
        assert_eq!(
            std::fs::read_dir(generator.output_dir()).unwrap().count(),
            0
        );
    }

    #[test]
    fn test_run_id_is_short_hex() {
        let id = run_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_build_fails_for_missing_directory() {
        let dir = TempDir::new().unwrap();
        let request = sample_request();
        let names = ArtefactNames::new(&request, "deadbeef");
        let content = crate::templates::lesson_content(&request);

        let err = build_artefacts(&dir.path().join("nope"), &names, &request, &content).unwrap_err();
        assert_eq!(err.to_string(), "Failed to create the lesson plan");
        assert!(format!("{:#}", err).contains("nope"));
    }
}
