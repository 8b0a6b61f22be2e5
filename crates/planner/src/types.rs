use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Value used in prompts and documents when the form leaves `value` empty
pub const DEFAULT_VALUE: &str = "Respect/Care";

/// Required form fields, in the order the form shows them
pub const REQUIRED_FIELDS: &[&str] = &["date", "semester", "grade", "subject", "topic", "period"];

/// A lesson plan request as posted by the form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct LessonRequest {
    /// Lesson date in YYYY-MM-DD format
    pub date: String,
    pub semester: String,
    pub grade: String,
    pub subject: String,
    pub topic: String,
    /// Period within the unit ("1", "2" or "3")
    pub period: String,
    /// Value of the month, derived from the date
    pub value: String,
    /// Curriculum standard identifiers
    pub standards: Vec<String>,
    pub digital_platform: String,
    pub gifted_talented: bool,
    /// Presentation style name
    pub style: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Please fill in all required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

impl LessonRequest {
    /// Names of required fields that are empty after trimming
    pub fn missing_fields(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|name| self.field(name).map(str::trim).unwrap_or("").is_empty())
            .collect()
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(RequestError::MissingFields(missing))
        }
    }

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "date" => Some(&self.date),
            "semester" => Some(&self.semester),
            "grade" => Some(&self.grade),
            "subject" => Some(&self.subject),
            "topic" => Some(&self.topic),
            "period" => Some(&self.period),
            _ => None,
        }
    }

    /// The month value, falling back to the school default
    pub fn value_or_default(&self) -> &str {
        let value = self.value.trim();
        if value.is_empty() {
            DEFAULT_VALUE
        } else {
            value
        }
    }

    /// Standards joined for display, or "Not specified"
    pub fn standards_display(&self) -> String {
        let standards: Vec<&str> = self
            .standards
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if standards.is_empty() {
            "Not specified".to_string()
        } else {
            standards.join(", ")
        }
    }

    pub fn platform_display(&self) -> &str {
        let platform = self.digital_platform.trim();
        if platform.is_empty() {
            "Not specified"
        } else {
            platform
        }
    }

    /// Differentiation tiers this lesson covers
    pub fn tiers(&self) -> Vec<Tier> {
        Tier::ALL
            .iter()
            .copied()
            .filter(|t| *t != Tier::Gifted || self.gifted_talented)
            .collect()
    }
}

/// Differentiation levels used throughout the generated documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Assistance,
    Average,
    Upper,
    Gifted,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Assistance, Tier::Average, Tier::Upper, Tier::Gifted];

    pub fn label(self) -> &'static str {
        match self {
            Tier::Assistance => "Assistance",
            Tier::Average => "Average",
            Tier::Upper => "Upper",
            Tier::Gifted => "Gifted & Talented",
        }
    }

    /// Depth of Knowledge band targeted by the tier
    pub fn dok(self) -> &'static str {
        match self {
            Tier::Assistance => "DOK 1-2",
            Tier::Average => "DOK 2-3",
            Tier::Upper => "DOK 3-4",
            Tier::Gifted => "DOK 4",
        }
    }
}

/// One value per differentiation tier
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Tiers<T> {
    pub assistance: T,
    pub average: T,
    pub upper: T,
    pub gifted: T,
}

impl<T> Tiers<T> {
    pub fn get(&self, tier: Tier) -> &T {
        match tier {
            Tier::Assistance => &self.assistance,
            Tier::Average => &self.average,
            Tier::Upper => &self.upper,
            Tier::Gifted => &self.gifted,
        }
    }
}

/// Differentiated outcomes per tier
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Outcomes {
    #[serde(deserialize_with = "text_or_list")]
    pub assistance: String,
    #[serde(deserialize_with = "text_or_list")]
    pub average: String,
    #[serde(deserialize_with = "text_or_list")]
    pub upper: String,
    #[serde(deserialize_with = "text_or_list")]
    pub gifted: String,
}

impl Outcomes {
    pub fn get(&self, tier: Tier) -> &str {
        match tier {
            Tier::Assistance => &self.assistance,
            Tier::Average => &self.average,
            Tier::Upper => &self.upper,
            Tier::Gifted => &self.gifted,
        }
    }
}

/// A short activity with guiding questions (starter, plenary)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Activity {
    #[serde(deserialize_with = "text_or_list")]
    pub activity: String,
    #[serde(deserialize_with = "list_or_text")]
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Teaching {
    #[serde(deserialize_with = "text_or_list")]
    pub method: String,
    #[serde(deserialize_with = "list_or_text")]
    pub steps: Vec<String>,
}

/// A differentiated task with its Visual/Auditory/Kinesthetic notes
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Task {
    #[serde(deserialize_with = "text_or_list")]
    pub activity: String,
    #[serde(deserialize_with = "list_or_text")]
    pub questions: Vec<String>,
    #[serde(deserialize_with = "text_or_list")]
    pub vak: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MoralEducation {
    #[serde(deserialize_with = "text_or_list")]
    pub pillar: String,
    #[serde(deserialize_with = "text_or_list")]
    pub connection: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Steam {
    #[serde(deserialize_with = "text_or_list")]
    pub science: String,
    #[serde(deserialize_with = "text_or_list")]
    pub technology: String,
    #[serde(deserialize_with = "text_or_list")]
    pub engineering: String,
    #[serde(deserialize_with = "text_or_list")]
    pub art: String,
    #[serde(deserialize_with = "text_or_list")]
    pub math: String,
}

impl Steam {
    /// (discipline, connection) pairs in STEAM order
    pub fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("Science", &self.science),
            ("Technology", &self.technology),
            ("Engineering", &self.engineering),
            ("Art", &self.art),
            ("Math", &self.math),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdekIntegration {
    #[serde(deserialize_with = "text_or_list")]
    pub my_identity: String,
    pub moral_education: MoralEducation,
    pub steam: Steam,
    #[serde(deserialize_with = "text_or_list")]
    pub links_to_subjects: String,
    #[serde(deserialize_with = "text_or_list")]
    pub environment: String,
}

/// Generated lesson content, shaped like the JSON the model is asked for.
///
/// Every field tolerates absence so that partial model output still
/// produces documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LessonContent {
    #[serde(deserialize_with = "text_or_list")]
    pub objectives: String,
    pub differentiated_outcomes: Outcomes,
    #[serde(deserialize_with = "list_or_text")]
    pub vocabulary: Vec<String>,
    #[serde(deserialize_with = "list_or_text")]
    pub resources: Vec<String>,
    #[serde(deserialize_with = "list_or_text")]
    pub skills: Vec<String>,
    pub starter: Activity,
    pub teaching_component: Teaching,
    pub cooperative_tasks: Tiers<Task>,
    pub independent_tasks: Tiers<Task>,
    pub plenary: Activity,
    #[serde(deserialize_with = "text_or_list")]
    pub world_application: String,
    pub adek_integration: AdekIntegration,
}

impl LessonContent {
    /// Objectives split into individual lines
    pub fn objective_lines(&self) -> Vec<&str> {
        self.objectives
            .lines()
            .map(|l| l.trim().trim_start_matches(['-', '*', '•']).trim())
            .filter(|l| !l.is_empty())
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrList {
    Text(String),
    List(Vec<Value>),
    Other(Value),
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Accept a string, or a list of strings joined by newlines
fn text_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match TextOrList::deserialize(deserializer)? {
        TextOrList::Text(s) => s,
        TextOrList::List(items) => items
            .into_iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join("\n"),
        TextOrList::Other(v) => value_to_text(v),
    })
}

/// Accept a list of strings, or a single string split on newlines
fn list_or_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match TextOrList::deserialize(deserializer)? {
        TextOrList::Text(s) => s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect(),
        TextOrList::List(items) => items.into_iter().map(value_to_text).collect(),
        TextOrList::Other(Value::Null) => Vec::new(),
        TextOrList::Other(v) => vec![value_to_text(v)],
    })
}

/// Body of `POST /api/get-month-value`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthValueRequest {
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MonthValueResponse {
    Value { value: String },
    Error { error: String },
}

/// File names of one generated package
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageFiles {
    pub lesson_plan: String,
    pub worksheets: String,
    pub rubrics: String,
    pub question_bank: String,
    pub powerpoint: String,
    pub package: String,
}

/// Body returned by `POST /api/generate-lesson-plan`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GenerateResponse {
    Success {
        files: PackageFiles,
        download_url: String,
    },
    Error {
        message: String,
    },
}

/// Fully filled-in request shared by tests across modules
#[cfg(test)]
pub(crate) fn sample_request() -> LessonRequest {
    LessonRequest {
        date: "2025-03-10".to_string(),
        semester: "2".to_string(),
        grade: "Grade 7".to_string(),
        subject: "Science".to_string(),
        topic: "Photosynthesis".to_string(),
        period: "1".to_string(),
        value: "Tolerance".to_string(),
        standards: vec!["SCI.7.1".to_string(), "SCI.7.4".to_string()],
        digital_platform: "Microsoft Teams".to_string(),
        gifted_talented: false,
        style: "modern".to_string(),
    }
}
