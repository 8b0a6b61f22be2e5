use crate::types::LessonRequest;

const SYSTEM_PROMPT: &str = "You are an expert UAE curriculum designer at Al Adhwa Private School.
Generate detailed, pedagogically sound lesson plans that:
1. Follow UAE/ADEK curriculum standards
2. Include HOT (Higher Order Thinking) objectives
3. Provide DOK-level differentiated outcomes
4. Integrate UAE values authentically
5. Include specific, actionable activities
6. Provide clear assessment strategies
7. Connect to real-world applications in UAE context

Always output in valid JSON format with the structure requested.";

/// JSON skeleton the model must fill in. Mirrors `LessonContent`.
const CONTENT_SCHEMA: &str = r#"{
  "objectives": "3-4 HOT objectives using Bloom's Taxonomy verbs (analyze, evaluate, create, design). Format: 'Students will be able to [VERB] [specific content] through [method].'",
  "differentiated_outcomes": {
    "assistance": "DOK 1-2 outcomes for struggling learners - recall and basic skills",
    "average": "DOK 2-3 outcomes for average learners - application and analysis",
    "upper": "DOK 3-4 outcomes for advanced learners - evaluation and creation",
    "gifted": "DOK 4 outcomes for gifted learners - synthesis and innovation (if applicable)"
  },
  "vocabulary": ["8-10 subject-specific key terms"],
  "resources": ["5-7 specific resources needed"],
  "skills": ["Critical Thinking", "Problem Solving", "Collaboration", "Communication", "Digital Literacy"],
  "starter": {
    "activity": "5-minute engaging starter activity with specific instructions",
    "questions": ["3-4 specific guiding questions for the starter"]
  },
  "teaching_component": {
    "method": "Specific teaching methodology (10 minutes maximum)",
    "steps": ["Step 1", "Step 2", "Step 3", "Step 4", "Step 5"]
  },
  "cooperative_tasks": {
    "assistance": {"activity": "DOK 1-2 group activity", "questions": ["4-5 specific guiding questions"], "vak": "Visual/Auditory/Kinesthetic elements"},
    "average": {"activity": "DOK 2-3 group activity", "questions": ["4-5 specific guiding questions"], "vak": "Visual/Auditory/Kinesthetic elements"},
    "upper": {"activity": "DOK 3-4 group activity", "questions": ["4-5 specific guiding questions"], "vak": "Visual/Auditory/Kinesthetic elements"},
    "gifted": {"activity": "DOK 4 group activity", "questions": ["4-5 specific guiding questions"], "vak": "Visual/Auditory/Kinesthetic elements"}
  },
  "independent_tasks": {
    "assistance": {"activity": "DOK 1-2 independent task", "questions": ["4-5 specific guiding questions"], "vak": "Visual/Auditory/Kinesthetic elements"},
    "average": {"activity": "DOK 2-3 independent task", "questions": ["4-5 specific guiding questions"], "vak": "Visual/Auditory/Kinesthetic elements"},
    "upper": {"activity": "DOK 3-4 independent task", "questions": ["4-5 specific guiding questions"], "vak": "Visual/Auditory/Kinesthetic elements"},
    "gifted": {"activity": "DOK 4 independent task", "questions": ["4-5 specific guiding questions"], "vak": "Visual/Auditory/Kinesthetic elements"}
  },
  "plenary": {
    "activity": "5-minute plenary activity to consolidate learning",
    "questions": ["3-4 reflection questions"]
  },
  "world_application": "Specific real-world application, especially in UAE context. 2-3 paragraphs.",
  "adek_integration": {
    "my_identity": "Connection to UAE identity, culture, and national development (2-3 sentences)",
    "moral_education": {
      "pillar": "Character and Morality / Ethics and Values / Community and Civic Responsibility",
      "connection": "Specific connection to moral education (2-3 sentences)"
    },
    "steam": {
      "science": "Science connection",
      "technology": "Technology connection",
      "engineering": "Engineering connection",
      "art": "Art connection",
      "math": "Math connection"
    },
    "links_to_subjects": "Specific links to other subjects (Mathematics, English, ICT, etc.)",
    "environment": "Connection to sustainability and environmental awareness (2-3 sentences)"
  }
}"#;

pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

/// What a lesson in the given period of a unit should concentrate on
pub fn period_focus(period: &str) -> &'static str {
    match period.trim() {
        "1" => "foundational concepts and introduction",
        "2" => "development and application of concepts",
        "3" => "mastery and higher-order thinking",
        _ => "concept development",
    }
}

/// User message asking for the lesson content as JSON
pub fn lesson_prompt(request: &LessonRequest) -> String {
    format!(
        "Generate a complete, detailed lesson plan in JSON format for Al Adhwa Private School.

LESSON DETAILS:
- Grade: {grade}
- Subject: {subject}
- Topic: {topic}
- Period: {period}
- Date: {date}
- Semester: {semester}
- UAE Value: {value}
- Standards: {standards}
- Digital Platform: {platform}
- Gifted/Talented: {gifted}

REQUIRED JSON STRUCTURE:
{schema}

SPECIFIC REQUIREMENTS:
1. All activities must include SPECIFIC guiding questions (not generic)
2. Differentiation must be CLEAR and PRACTICAL
3. UAE context must be AUTHENTIC (not just mentioned)
4. Include REAL examples and specific instructions
5. Make content GRADE-APPROPRIATE for {grade}
6. For Period {period}, focus on: {focus}

Output ONLY valid JSON, no additional text.
",
        grade = request.grade,
        subject = request.subject,
        topic = request.topic,
        period = request.period,
        date = request.date,
        semester = request.semester,
        value = request.value_or_default(),
        standards = request.standards_display(),
        platform = request.platform_display(),
        gifted = if request.gifted_talented { "Yes" } else { "No" },
        schema = CONTENT_SCHEMA,
        focus = period_focus(&request.period),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{sample_request, LessonContent};

    #[test]
    fn test_period_focus() {
        assert_eq!(period_focus("1"), "foundational concepts and introduction");
        assert_eq!(period_focus("2"), "development and application of concepts");
        assert_eq!(period_focus(" 3 "), "mastery and higher-order thinking");
        assert_eq!(period_focus("7"), "concept development");
        assert_eq!(period_focus(""), "concept development");
    }

    #[test]
    fn test_prompt_includes_every_field() {
        let prompt = lesson_prompt(&sample_request());

        assert!(prompt.contains("- Grade: Grade 7"));
        assert!(prompt.contains("- Topic: Photosynthesis"));
        assert!(prompt.contains("- Date: 2025-03-10"));
        assert!(prompt.contains("- Semester: 2"));
        assert!(prompt.contains("- UAE Value: Tolerance"));
        assert!(prompt.contains("- Standards: SCI.7.1, SCI.7.4"));
        assert!(prompt.contains("- Digital Platform: Microsoft Teams"));
        assert!(prompt.contains("- Gifted/Talented: No"));
        assert!(prompt.contains("focus on: foundational concepts and introduction"));
    }

    #[test]
    fn test_prompt_defaults_for_empty_optionals() {
        let mut request = sample_request();
        request.value.clear();
        request.standards.clear();
        request.gifted_talented = true;

        let prompt = lesson_prompt(&request);
        assert!(prompt.contains("- UAE Value: Respect/Care"));
        assert!(prompt.contains("- Standards: Not specified"));
        assert!(prompt.contains("- Gifted/Talented: Yes"));
    }

    #[test]
    fn test_schema_parses_as_content() {
        let content: LessonContent = serde_json::from_str(CONTENT_SCHEMA).unwrap();
        assert_eq!(content.skills.len(), 5);
        assert_eq!(content.teaching_component.steps.len(), 5);
        assert!(!content.cooperative_tasks.gifted.vak.is_empty());
    }
}
