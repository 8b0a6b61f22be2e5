//! HTTP client for the planner service.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::form::LessonForm;

const MONTH_VALUE_PATH: &str = "/api/get-month-value";
const GENERATE_PATH: &str = "/api/generate-lesson-plan";
const FALLBACK_FILE_NAME: &str = "lesson_package.zip";

/// Reply of `POST /api/get-month-value`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MonthValueReply {
    Value { value: String },
    Error { error: String },
}

/// Reply of `POST /api/generate-lesson-plan`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GenerateReply {
    Success { download_url: String },
    Error { message: String },
}

/// The planner endpoints the form talks to
#[async_trait]
pub trait PlannerApi: Send + Sync {
    async fn month_value(&self, date: &str) -> Result<MonthValueReply>;

    async fn generate(&self, form: &LessonForm) -> Result<GenerateReply>;

    /// Fetch `download_url` into `dir`, returning the saved path
    async fn download(&self, download_url: &str, dir: &Path) -> Result<PathBuf>;
}

pub struct HttpApi {
    client: Client,
    base_url: Url,
}

impl HttpApi {
    pub fn new(base_url: Url) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("submitter/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid planner path: {}", path))
    }
}

#[async_trait]
impl PlannerApi for HttpApi {
    async fn month_value(&self, date: &str) -> Result<MonthValueReply> {
        let url = self.endpoint(MONTH_VALUE_PATH)?;
        debug!(%url, date, "Requesting month value");

        self.client
            .post(url)
            .json(&json!({ "date": date }))
            .send()
            .await
            .context("Month value request failed")?
            .json()
            .await
            .context("Unexpected month value response")
    }

    async fn generate(&self, form: &LessonForm) -> Result<GenerateReply> {
        let url = self.endpoint(GENERATE_PATH)?;
        debug!(%url, topic = %form.topic, "Submitting lesson form");

        // Error replies carry a JSON body with a non-2xx status
        self.client
            .post(url)
            .json(form)
            .send()
            .await
            .context("Lesson plan request failed")?
            .json()
            .await
            .context("Unexpected lesson plan response")
    }

    async fn download(&self, download_url: &str, dir: &Path) -> Result<PathBuf> {
        let url = self.endpoint(download_url)?;
        let file_name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_FILE_NAME)
            .to_string();

        let bytes = self
            .client
            .get(url)
            .send()
            .await
            .context("Download request failed")?
            .error_for_status()
            .context("Download rejected by planner")?
            .bytes()
            .await
            .context("Failed to read download")?;

        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(file_name);
        std::fs::write(&path, &bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, routing::post, Json, Router};
    use serde_json::Value;

    async fn stub_planner() -> Url {
        let app = Router::new()
            .route(
                MONTH_VALUE_PATH,
                post(|Json(body): Json<Value>| async move {
                    if body["date"] == "2025-03-10" {
                        (StatusCode::OK, Json(json!({ "value": "Kindness" })))
                    } else {
                        (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid date" })))
                    }
                }),
            )
            .route(
                GENERATE_PATH,
                post(|Json(body): Json<Value>| async move {
                    if body["topic"] == "Photosynthesis" {
                        (
                            StatusCode::OK,
                            Json(json!({
                                "status": "success",
                                "files": { "package": "Lesson_abc_Package.zip" },
                                "download_url": "/api/download/Lesson_abc_Package.zip"
                            })),
                        )
                    } else {
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({ "status": "error", "message": "Generation failed" })),
                        )
                    }
                }),
            )
            .route(
                "/api/download/Lesson_abc_Package.zip",
                get(|| async { "zip bytes" }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        Url::parse(&format!("http://{}", addr)).unwrap()
    }

    fn form(topic: &str) -> LessonForm {
        LessonForm {
            date: "2025-03-10".to_string(),
            topic: topic.to_string(),
            ..LessonForm::default()
        }
    }

    #[test]
    fn test_generate_reply_ignores_extra_fields() {
        let reply: GenerateReply = serde_json::from_value(json!({
            "status": "success",
            "files": { "lesson_plan": "a.docx" },
            "download_url": "/api/download/a.zip"
        }))
        .unwrap();
        assert_eq!(
            reply,
            GenerateReply::Success {
                download_url: "/api/download/a.zip".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_month_value_replies() {
        let api = HttpApi::new(stub_planner().await).unwrap();

        assert_eq!(
            api.month_value("2025-03-10").await.unwrap(),
            MonthValueReply::Value {
                value: "Kindness".to_string()
            }
        );
        assert_eq!(
            api.month_value("later").await.unwrap(),
            MonthValueReply::Error {
                error: "Invalid date".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_generate_reads_error_bodies() {
        let api = HttpApi::new(stub_planner().await).unwrap();

        assert!(matches!(
            api.generate(&form("Photosynthesis")).await.unwrap(),
            GenerateReply::Success { .. }
        ));
        assert_eq!(
            api.generate(&form("Volcanoes")).await.unwrap(),
            GenerateReply::Error {
                message: "Generation failed".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_download_saves_package() {
        let api = HttpApi::new(stub_planner().await).unwrap();
        let dir = tempfile::TempDir::new().unwrap();

        let path = api
            .download("/api/download/Lesson_abc_Package.zip", &dir.path().join("out"))
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("out").join("Lesson_abc_Package.zip"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "zip bytes");

        assert!(api
            .download("/api/download/missing.zip", dir.path())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_unreachable_planner_is_an_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = HttpApi::new(Url::parse(&format!("http://{}", addr)).unwrap()).unwrap();
        assert!(api.month_value("2025-03-10").await.is_err());
    }
}
