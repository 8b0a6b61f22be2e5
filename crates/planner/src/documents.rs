//! The lesson plan package documents, built from a request and its content.

use crate::docx::DocxBuilder;
use crate::pptx::{Deck, SlideStyle};
use crate::types::{LessonContent, LessonRequest, Task, Tier, Tiers};

/// Rubric levels, highest first
const RUBRIC_LEVELS: [&str; 4] = ["Exceeds (4)", "Meets (3)", "Approaching (2)", "Beginning (1)"];

fn header_line(r: &LessonRequest) -> String {
    format!("{} | {} | {}", r.grade, r.subject, r.topic)
}

pub fn lesson_plan(r: &LessonRequest, c: &LessonContent) -> DocxBuilder {
    let mut doc = DocxBuilder::new();
    doc.title("Lesson Plan").subtitle(&header_line(r));

    let yes_no = if r.gifted_talented { "Yes" } else { "No" };
    let details = [
        ("Date", r.date.as_str()),
        ("Semester", r.semester.as_str()),
        ("Grade", r.grade.as_str()),
        ("Subject", r.subject.as_str()),
        ("Topic", r.topic.as_str()),
        ("Period", r.period.as_str()),
        ("UAE Value", r.value_or_default()),
        ("Digital Platform", r.platform_display()),
        ("Gifted & Talented", yes_no),
    ];
    let mut rows: Vec<Vec<String>> = details
        .iter()
        .map(|(k, v)| vec![k.to_string(), v.to_string()])
        .collect();
    rows.push(vec!["Standards".to_string(), r.standards_display()]);
    doc.table(&["Field", "Details"], &rows);

    doc.heading("Learning Objectives", 1)
        .bullets(c.objective_lines());

    doc.heading("Differentiated Outcomes", 1);
    let outcome_rows: Vec<Vec<String>> = r
        .tiers()
        .into_iter()
        .map(|tier| {
            vec![
                tier.label().to_string(),
                tier.dok().to_string(),
                c.differentiated_outcomes.get(tier).to_string(),
            ]
        })
        .collect();
    doc.table(&["Level", "DOK", "Outcome"], &outcome_rows);

    doc.heading("Key Vocabulary", 1)
        .paragraph(&c.vocabulary.join(", "));
    doc.heading("Resources", 1).bullets(&c.resources);
    doc.heading("Skills", 1).bullets(&c.skills);

    doc.heading("Starter (5 minutes)", 1)
        .paragraph(&c.starter.activity)
        .bullets(&c.starter.questions);

    doc.heading("Teaching Component (10 minutes)", 1)
        .paragraph(&c.teaching_component.method)
        .numbered(&c.teaching_component.steps);

    doc.heading("Cooperative Tasks", 1);
    tier_tasks(&mut doc, r, &c.cooperative_tasks);
    doc.heading("Independent Tasks", 1);
    tier_tasks(&mut doc, r, &c.independent_tasks);

    doc.heading("Plenary (5 minutes)", 1)
        .paragraph(&c.plenary.activity)
        .bullets(&c.plenary.questions);

    doc.heading("Real-World Application", 1)
        .paragraph(&c.world_application);

    let adek = &c.adek_integration;
    doc.heading("ADEK Integration", 1)
        .labelled("My Identity", &adek.my_identity)
        .labelled("Moral Education Pillar", &adek.moral_education.pillar)
        .labelled("Moral Education Connection", &adek.moral_education.connection);
    let steam_rows: Vec<Vec<String>> = adek
        .steam
        .entries()
        .iter()
        .map(|(k, v)| vec![k.to_string(), v.to_string()])
        .collect();
    doc.heading("STEAM", 2)
        .table(&["Discipline", "Connection"], &steam_rows)
        .labelled("Links to Other Subjects", &adek.links_to_subjects)
        .labelled("Environment & Sustainability", &adek.environment);

    doc
}

fn tier_tasks(doc: &mut DocxBuilder, r: &LessonRequest, tasks: &Tiers<Task>) {
    for tier in r.tiers() {
        let task = tasks.get(tier);
        doc.heading(&format!("{} ({})", tier.label(), tier.dok()), 2)
            .paragraph(&task.activity)
            .bullets(&task.questions);
        if !task.vak.trim().is_empty() {
            doc.labelled("VAK", &task.vak);
        }
    }
}

/// One worksheet per tier, each on its own page
pub fn worksheets(r: &LessonRequest, c: &LessonContent) -> DocxBuilder {
    let mut doc = DocxBuilder::new();
    for (idx, tier) in r.tiers().into_iter().enumerate() {
        if idx > 0 {
            doc.page_break();
        }
        let task = c.independent_tasks.get(tier);
        doc.title(&format!("{} Worksheet", r.topic))
            .subtitle(&format!("{} | {} ({})", header_line(r), tier.label(), tier.dok()))
            .paragraph("Name: ______________________    Class: ________    Date: ____________");

        if tier == Tier::Assistance && !c.vocabulary.is_empty() {
            doc.heading("Word Bank", 2)
                .paragraph(&c.vocabulary.join("   |   "));
        }

        doc.heading("Task", 2).paragraph(&task.activity);
        doc.heading("Questions", 2);
        for (n, question) in task.questions.iter().enumerate() {
            doc.paragraph(&format!("{}. {}", n + 1, question))
                .answer_lines(3);
        }
        doc.heading("Reflection", 2)
            .paragraph(&format!(
                "How did today's work show the value of {}?",
                r.value_or_default()
            ))
            .answer_lines(2);
    }
    doc
}

fn rubric_row(criterion: &str) -> Vec<String> {
    vec![
        criterion.to_string(),
        "Demonstrates this independently and extends it to new contexts".to_string(),
        "Demonstrates this accurately with minimal support".to_string(),
        "Demonstrates parts of this with support".to_string(),
        "Beginning to demonstrate this with significant support".to_string(),
    ]
}

pub fn rubrics(r: &LessonRequest, c: &LessonContent) -> DocxBuilder {
    let mut header = vec!["Criterion"];
    header.extend(RUBRIC_LEVELS);

    let mut doc = DocxBuilder::new();
    doc.title("Assessment Rubrics").subtitle(&header_line(r));

    let objective_rows: Vec<Vec<String>> =
        c.objective_lines().into_iter().map(rubric_row).collect();
    doc.heading("Learning Objectives", 1)
        .table(&header, &objective_rows);

    let skill_rows: Vec<Vec<String>> = c.skills.iter().map(|s| rubric_row(s)).collect();
    doc.heading("Skills", 1).table(&header, &skill_rows);

    doc.heading("Cooperative Task Rubric", 1);
    let task_rows: Vec<Vec<String>> = r
        .tiers()
        .into_iter()
        .map(|tier| {
            let activity = &c.cooperative_tasks.get(tier).activity;
            rubric_row(&format!("{} ({}): {}", tier.label(), tier.dok(), activity))
        })
        .collect();
    doc.table(&header, &task_rows);

    doc
}

/// Questions grouped by source, de-duplicated in order of first appearance
pub fn question_bank(r: &LessonRequest, c: &LessonContent) -> DocxBuilder {
    let mut seen = std::collections::HashSet::new();
    let mut fresh = |questions: Vec<&String>| -> Vec<String> {
        questions
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty() && seen.insert(q.to_lowercase()))
            .collect()
    };

    let mut doc = DocxBuilder::new();
    doc.title("Question Bank").subtitle(&header_line(r));

    let starter = fresh(c.starter.questions.iter().collect());
    if !starter.is_empty() {
        doc.heading("Starter Questions", 1).numbered(&starter);
    }

    for tier in r.tiers() {
        let questions = fresh(
            c.cooperative_tasks
                .get(tier)
                .questions
                .iter()
                .chain(c.independent_tasks.get(tier).questions.iter())
                .collect(),
        );
        if !questions.is_empty() {
            doc.heading(&format!("{} ({})", tier.label(), tier.dok()), 1)
                .numbered(&questions);
        }
    }

    let vocabulary: Vec<String> = c
        .vocabulary
        .iter()
        .filter(|t| !t.trim().is_empty())
        .map(|t| format!("Define \"{}\" and use it in a sentence about {}.", t.trim(), r.topic))
        .collect();
    if !vocabulary.is_empty() {
        doc.heading("Vocabulary Check", 1).numbered(&vocabulary);
    }

    let plenary = fresh(c.plenary.questions.iter().collect());
    if !plenary.is_empty() {
        doc.heading("Reflection Questions", 1).numbered(&plenary);
    }

    doc
}

pub fn presentation(r: &LessonRequest, c: &LessonContent) -> Deck {
    let mut deck = Deck::new(SlideStyle::from_name(&r.style));
    deck.title_slide(
        &r.topic,
        &format!(
            "{} | {}\n{} | Period {}\nValue of the month: {}",
            r.grade,
            r.subject,
            r.date,
            r.period,
            r.value_or_default()
        ),
    );
    deck.bullet_slide("Learning Objectives", c.objective_lines())
        .bullet_slide("Key Vocabulary", &c.vocabulary);

    let mut starter = vec![c.starter.activity.clone()];
    starter.extend(c.starter.questions.iter().cloned());
    deck.bullet_slide("Starter", starter);

    let mut teaching = vec![c.teaching_component.method.clone()];
    teaching.extend(c.teaching_component.steps.iter().cloned());
    deck.bullet_slide("Let's Learn", teaching);

    for tier in r.tiers() {
        let task = c.cooperative_tasks.get(tier);
        let mut bullets = vec![task.activity.clone()];
        bullets.extend(task.questions.iter().cloned());
        deck.bullet_slide(&format!("Group Task: {}", tier.label()), bullets);
    }

    let independent: Vec<String> = r
        .tiers()
        .into_iter()
        .map(|tier| format!("{}: {}", tier.label(), c.independent_tasks.get(tier).activity))
        .collect();
    deck.bullet_slide("Independent Practice", independent)
        .bullet_slide("Real-World Connection", c.world_application.lines());

    let adek = &c.adek_integration;
    deck.bullet_slide(
        &format!("Our Value: {}", r.value_or_default()),
        [&adek.my_identity, &adek.moral_education.connection],
    );

    let mut plenary = vec![c.plenary.activity.clone()];
    plenary.extend(c.plenary.questions.iter().cloned());
    deck.bullet_slide("Plenary", plenary);

    deck
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::Slide;
    use crate::templates;
    use crate::types::sample_request;
    use std::io::{Cursor, Read};

    fn document_xml(doc: &DocxBuilder) -> String {
        let bytes = doc.to_bytes().unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn test_lesson_plan_has_all_sections() {
        let request = sample_request();
        let content = templates::lesson_content(&request);
        let xml = document_xml(&lesson_plan(&request, &content));

        for section in [
            "Learning Objectives",
            "Differentiated Outcomes",
            "Key Vocabulary",
            "Starter (5 minutes)",
            "Teaching Component (10 minutes)",
            "Cooperative Tasks",
            "Independent Tasks",
            "Plenary (5 minutes)",
            "Real-World Application",
            "ADEK Integration",
        ] {
            assert!(xml.contains(section), "missing section {}", section);
        }
        assert!(xml.contains("SCI.7.1, SCI.7.4"));
        assert!(!xml.contains("Gifted &amp; Talented (DOK 4)"));
    }

    #[test]
    fn test_gifted_sections_when_flagged() {
        let mut request = sample_request();
        request.gifted_talented = true;
        let content = templates::lesson_content(&request);
        let xml = document_xml(&lesson_plan(&request, &content));

        assert!(xml.contains("Gifted &amp; Talented (DOK 4)"));
    }

    #[test]
    fn test_one_worksheet_page_per_tier() {
        let request = sample_request();
        let content = templates::lesson_content(&request);
        let xml = document_xml(&worksheets(&request, &content));

        assert_eq!(xml.matches(r#"<w:br w:type="page"/>"#).count(), 2);
        assert!(xml.contains("Word Bank"));
    }

    #[test]
    fn test_question_bank_deduplicates() {
        let request = sample_request();
        let mut content = templates::lesson_content(&request);
        content.plenary.questions = content.starter.questions.clone();
        let xml = document_xml(&question_bank(&request, &content));

        assert!(xml.contains("Starter Questions"));
        assert!(!xml.contains("Reflection Questions"));
        assert!(xml.contains("Vocabulary Check"));
    }

    #[test]
    fn test_rubric_rows_per_objective() {
        let request = sample_request();
        let content = templates::lesson_content(&request);
        let xml = document_xml(&rubrics(&request, &content));

        assert!(xml.contains("Exceeds (4)"));
        // 4 objectives + 5 skills + 3 tiers, each row with five cells, plus three header rows
        assert_eq!(xml.matches("<w:tc>").count(), (4 + 5 + 3 + 3) * 5);
    }

    #[test]
    fn test_presentation_follows_lesson_flow() {
        let request = sample_request();
        let content = templates::lesson_content(&request);
        let deck = presentation(&request, &content);

        let titles: Vec<&str> = deck
            .slides()
            .iter()
            .map(|s| match s {
                Slide::Title { title, .. } => title.as_str(),
                Slide::Bullets { title, .. } => title.as_str(),
            })
            .collect();
        assert_eq!(titles[0], "Photosynthesis");
        assert_eq!(titles[1], "Learning Objectives");
        assert!(titles.contains(&"Group Task: Upper"));
        assert!(!titles.contains(&"Group Task: Gifted & Talented"));
        assert_eq!(*titles.last().unwrap(), "Plenary");
    }

    #[test]
    fn test_partial_content_still_renders() {
        let request = sample_request();
        let content = LessonContent::default();

        assert!(lesson_plan(&request, &content).to_bytes().is_ok());
        assert!(worksheets(&request, &content).to_bytes().is_ok());
        assert!(question_bank(&request, &content).to_bytes().is_ok());
        assert!(presentation(&request, &content).to_bytes().is_ok());
    }
}
