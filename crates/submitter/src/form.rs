//! The lesson form and its submission state machine.
//!
//! Mirrors the browser page: a date change looks up the value of the month,
//! a submission is validated locally before one request is sent, and a
//! rotating progress message runs while the planner works.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::api::{GenerateReply, MonthValueReply, PlannerApi};

pub const REQUIRED_FIELDS: [&str; 6] = ["date", "semester", "grade", "subject", "topic", "period"];

pub const PROGRESS_MESSAGES: [&str; 7] = [
    "Generating lesson content...",
    "Writing the lesson plan...",
    "Creating differentiated worksheets...",
    "Building assessment rubrics...",
    "Assembling the question bank...",
    "Designing the PowerPoint...",
    "Packaging your files...",
];

pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(3);

const MONTH_VALUE_ALERT: &str = "Could not load the value of the month";

/// Everything the page form submits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LessonForm {
    pub date: String,
    pub semester: String,
    pub grade: String,
    pub subject: String,
    pub topic: String,
    pub period: String,
    pub value: String,
    pub standards: Vec<String>,
    pub digital_platform: String,
    pub gifted_talented: bool,
    pub style: String,
}

impl LessonForm {
    /// Required fields that are empty, in form order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let values = [
            &self.date,
            &self.semester,
            &self.grade,
            &self.subject,
            &self.topic,
            &self.period,
        ];
        REQUIRED_FIELDS
            .iter()
            .zip(values)
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Loading,
    Success { download_url: String },
    Error { message: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Please fill in all required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("{0}")]
    Rejected(String),

    #[error("Request failed: {0}")]
    Network(String),

    #[error("No lesson plan is ready to download")]
    NothingToDownload,
}

/// Rotates through [`PROGRESS_MESSAGES`] until dropped
pub struct ProgressTicker {
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    /// Start ticking; every tick bumps `ticks` and logs the current message
    pub fn start(interval: Duration, ticks: Arc<AtomicUsize>) -> Self {
        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            loop {
                timer.tick().await;
                let n = ticks.fetch_add(1, Ordering::Relaxed);
                info!("{}", PROGRESS_MESSAGES[n % PROGRESS_MESSAGES.len()]);
            }
        });
        Self { handle }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub struct FormController<A> {
    api: A,
    form: LessonForm,
    state: FormState,
    alerts: Vec<String>,
    progress_interval: Duration,
    ticks: Arc<AtomicUsize>,
}

impl<A: PlannerApi> FormController<A> {
    pub fn new(api: A) -> Self {
        Self::with_progress_interval(api, PROGRESS_INTERVAL)
    }

    pub fn with_progress_interval(api: A, progress_interval: Duration) -> Self {
        Self {
            api,
            form: LessonForm::default(),
            state: FormState::Idle,
            alerts: Vec::new(),
            progress_interval,
            ticks: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn form(&self) -> &LessonForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut LessonForm {
        &mut self.form
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Alerts raised so far, oldest first
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// Progress messages shown during the last submission
    pub fn progress_ticks(&self) -> usize {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Set the date and look up its value of the month
    pub async fn set_date(&mut self, date: &str) -> Result<(), FormError> {
        self.form.date = date.to_string();
        self.form.value.clear();
        if date.is_empty() {
            return Ok(());
        }

        let err = match self.api.month_value(date).await {
            Ok(MonthValueReply::Value { value }) => {
                self.form.value = value;
                return Ok(());
            }
            Ok(MonthValueReply::Error { error }) => {
                self.alert(error.clone());
                FormError::Rejected(error)
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), date, "Month value request failed");
                self.alert(MONTH_VALUE_ALERT.to_string());
                FormError::Network(format!("{:#}", e))
            }
        };
        Err(err)
    }

    /// Validate and send the form, returning the package download URL
    pub async fn submit(&mut self) -> Result<String, FormError> {
        let missing = self.form.missing_fields();
        if !missing.is_empty() {
            let err = FormError::MissingFields(missing);
            self.alert(err.to_string());
            self.state = FormState::Idle;
            return Err(err);
        }

        self.state = FormState::Loading;
        self.ticks.store(0, Ordering::Relaxed);
        let outcome = {
            let _ticker = ProgressTicker::start(self.progress_interval, Arc::clone(&self.ticks));
            self.api.generate(&self.form).await
        };

        match outcome {
            Ok(GenerateReply::Success { download_url }) => {
                info!(%download_url, "Lesson plan ready");
                self.state = FormState::Success {
                    download_url: download_url.clone(),
                };
                Ok(download_url)
            }
            Ok(GenerateReply::Error { message }) => Err(self.fail(FormError::Rejected(message))),
            Err(e) => Err(self.fail(FormError::Network(format!("{:#}", e)))),
        }
    }

    /// Save the ready package into `dir`
    pub async fn download(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        match &self.state {
            FormState::Success { download_url } => self.api.download(download_url, dir).await,
            _ => Err(FormError::NothingToDownload.into()),
        }
    }

    /// Back to an empty form
    pub fn reset(&mut self) {
        self.form = LessonForm::default();
        self.state = FormState::Idle;
        self.alerts.clear();
        self.ticks.store(0, Ordering::Relaxed);
    }

    fn fail(&mut self, err: FormError) -> FormError {
        warn!(error = %err, "Lesson plan submission failed");
        self.alert(format!("Error: {}", err));
        self.state = FormState::Error {
            message: err.to_string(),
        };
        err
    }

    fn alert(&mut self, message: String) {
        self.alerts.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Planner double that records calls and replays canned replies
    #[derive(Default)]
    struct FakePlanner {
        generate_reply: Mutex<Option<Result<GenerateReply>>>,
        delay: Duration,
        generate_calls: AtomicUsize,
        downloads: Mutex<Vec<String>>,
    }

    impl FakePlanner {
        fn replying(reply: Result<GenerateReply>) -> Self {
            Self {
                generate_reply: Mutex::new(Some(reply)),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl PlannerApi for FakePlanner {
        async fn month_value(&self, date: &str) -> Result<MonthValueReply> {
            match date {
                "2025-03-10" => Ok(MonthValueReply::Value {
                    value: "Kindness".to_string(),
                }),
                "offline" => Err(anyhow!("connection refused")),
                _ => Ok(MonthValueReply::Error {
                    error: format!("Invalid date '{}', expected YYYY-MM-DD", date),
                }),
            }
        }

        async fn generate(&self, _form: &LessonForm) -> Result<GenerateReply> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.generate_reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(anyhow!("no reply scripted")))
        }

        async fn download(&self, download_url: &str, dir: &Path) -> Result<PathBuf> {
            self.downloads.lock().unwrap().push(download_url.to_string());
            Ok(dir.join("package.zip"))
        }
    }

    fn filled_form() -> LessonForm {
        LessonForm {
            date: "2025-03-10".to_string(),
            semester: "2".to_string(),
            grade: "Grade 7".to_string(),
            subject: "Science".to_string(),
            topic: "Photosynthesis".to_string(),
            period: "1".to_string(),
            value: "Kindness".to_string(),
            standards: vec!["SCI.7.1".to_string()],
            digital_platform: "Microsoft Teams".to_string(),
            gifted_talented: true,
            style: "modern".to_string(),
        }
    }

    fn success() -> Result<GenerateReply> {
        Ok(GenerateReply::Success {
            download_url: "/api/download/Lesson_Package.zip".to_string(),
        })
    }

    fn controller(api: FakePlanner) -> FormController<FakePlanner> {
        let mut controller = FormController::with_progress_interval(api, Duration::from_millis(5));
        *controller.form_mut() = filled_form();
        controller
    }

    #[test]
    fn test_missing_fields_in_form_order() {
        let mut form = filled_form();
        form.topic = "  ".to_string();
        form.date.clear();
        form.value.clear();
        assert_eq!(form.missing_fields(), vec!["date", "topic"]);
        assert!(LessonForm::default().missing_fields().len() == REQUIRED_FIELDS.len());
    }

    #[test]
    fn test_form_serializes_as_page_payload() {
        let json = serde_json::to_value(filled_form()).unwrap();
        assert_eq!(json["gifted_talented"], true);
        assert_eq!(json["standards"][0], "SCI.7.1");
        let parsed: LessonForm = serde_json::from_str(r#"{"topic":"Fractions"}"#).unwrap();
        assert_eq!(parsed.topic, "Fractions");
        assert!(parsed.standards.is_empty());
    }

    #[tokio::test]
    async fn test_validation_blocks_submission_with_alert() {
        let mut controller = controller(FakePlanner::replying(success()));
        controller.form_mut().grade.clear();
        controller.form_mut().period.clear();

        let err = controller.submit().await.unwrap_err();
        assert_eq!(err, FormError::MissingFields(vec!["grade", "period"]));
        assert_eq!(
            controller.alerts(),
            ["Please fill in all required fields: grade, period"]
        );
        assert_eq!(controller.state(), &FormState::Idle);
        assert_eq!(controller.api.generate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_exposes_download_url() {
        let mut controller = controller(FakePlanner::replying(success()));

        let url = controller.submit().await.unwrap();
        assert_eq!(url, "/api/download/Lesson_Package.zip");
        assert_eq!(
            controller.state(),
            &FormState::Success {
                download_url: url.clone()
            }
        );
        assert!(controller.alerts().is_empty());

        let saved = controller.download(Path::new("/tmp/out")).await.unwrap();
        assert_eq!(saved, Path::new("/tmp/out/package.zip"));
        assert_eq!(*controller.api.downloads.lock().unwrap(), vec![url]);
    }

    #[tokio::test]
    async fn test_rejected_submission_keeps_form_editable() {
        let mut controller = controller(FakePlanner::replying(Ok(GenerateReply::Error {
            message: "AI service unavailable".to_string(),
        })));

        let err = controller.submit().await.unwrap_err();
        assert_eq!(err, FormError::Rejected("AI service unavailable".to_string()));
        assert_eq!(
            controller.state(),
            &FormState::Error {
                message: "AI service unavailable".to_string()
            }
        );
        assert_eq!(controller.alerts(), ["Error: AI service unavailable"]);
        assert_eq!(controller.form(), &filled_form());
        assert!(controller.download(Path::new("/tmp")).await.is_err());
    }

    #[tokio::test]
    async fn test_network_error_surfaces_message() {
        let mut controller = controller(FakePlanner::replying(Err(anyhow!("connection reset"))));

        let err = controller.submit().await.unwrap_err();
        assert_eq!(err, FormError::Network("connection reset".to_string()));
        assert_eq!(controller.alerts(), ["Error: Request failed: connection reset"]);
        assert!(matches!(controller.state(), FormState::Error { .. }));
        assert_eq!(controller.form(), &filled_form());
    }

    #[tokio::test]
    async fn test_validation_after_failed_submission_returns_to_idle() {
        let mut controller = controller(FakePlanner::replying(Err(anyhow!("down"))));
        assert!(controller.submit().await.is_err());
        assert!(matches!(controller.state(), FormState::Error { .. }));

        controller.form_mut().topic.clear();
        let err = controller.submit().await.unwrap_err();
        assert_eq!(err, FormError::MissingFields(vec!["topic"]));
        assert_eq!(controller.state(), &FormState::Idle);
        assert_eq!(
            controller.alerts().last().map(String::as_str),
            Some("Please fill in all required fields: topic")
        );
        assert_eq!(controller.api.generate_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resubmission_after_error() {
        let mut controller = controller(FakePlanner::replying(Err(anyhow!("timeout"))));
        assert!(controller.submit().await.is_err());

        *controller.api.generate_reply.lock().unwrap() = Some(success());
        assert!(controller.submit().await.is_ok());
        assert_eq!(controller.api.generate_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_progress_stops_when_request_finishes() {
        let api = FakePlanner {
            delay: Duration::from_millis(40),
            ..FakePlanner::replying(success())
        };
        let mut controller = controller(api);

        controller.submit().await.unwrap();
        let ticks = controller.progress_ticks();
        assert!(ticks >= 2, "only {} progress ticks", ticks);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(controller.progress_ticks(), ticks);
    }

    #[tokio::test]
    async fn test_progress_stops_when_request_fails() {
        let api = FakePlanner {
            delay: Duration::from_millis(40),
            ..FakePlanner::replying(Err(anyhow!("boom")))
        };
        let mut controller = controller(api);

        assert!(controller.submit().await.is_err());
        let ticks = controller.progress_ticks();
        assert!(ticks >= 1);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(controller.progress_ticks(), ticks);
    }

    #[tokio::test]
    async fn test_reset_after_success_clears_form_and_value() {
        let mut controller = controller(FakePlanner::replying(success()));
        controller.submit().await.unwrap();

        controller.reset();
        assert_eq!(controller.form(), &LessonForm::default());
        assert!(controller.form().value.is_empty());
        assert_eq!(controller.state(), &FormState::Idle);
        assert_eq!(controller.progress_ticks(), 0);
    }

    #[tokio::test]
    async fn test_set_date_fills_value() {
        let mut controller = FormController::new(FakePlanner::default());

        controller.set_date("2025-03-10").await.unwrap();
        assert_eq!(controller.form().date, "2025-03-10");
        assert_eq!(controller.form().value, "Kindness");
    }

    #[tokio::test]
    async fn test_set_date_errors_clear_value_and_alert() {
        let mut controller = FormController::new(FakePlanner::default());
        controller.set_date("2025-03-10").await.unwrap();

        let err = controller.set_date("10/03/2025").await.unwrap_err();
        assert!(matches!(err, FormError::Rejected(_)));
        assert!(controller.form().value.is_empty());

        let err = controller.set_date("offline").await.unwrap_err();
        assert_eq!(err, FormError::Network("connection refused".to_string()));
        assert_eq!(
            controller.alerts(),
            [
                "Invalid date '10/03/2025', expected YYYY-MM-DD",
                MONTH_VALUE_ALERT
            ]
        );
    }

    #[tokio::test]
    async fn test_clearing_date_skips_lookup() {
        let mut controller = FormController::new(FakePlanner::default());
        controller.form_mut().value = "Kindness".to_string();

        controller.set_date("").await.unwrap();
        assert!(controller.form().value.is_empty());
        assert!(controller.alerts().is_empty());
    }
}
