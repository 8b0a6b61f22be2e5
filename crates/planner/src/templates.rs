//! Fallback lesson content built from the request alone.
//!
//! Used when no API key is configured or the model reply cannot be parsed.

use crate::prompt::period_focus;
use crate::types::{
    Activity, AdekIntegration, LessonContent, LessonRequest, MoralEducation, Outcomes, Steam,
    Task, Teaching, Tier, Tiers,
};

pub fn lesson_content(request: &LessonRequest) -> LessonContent {
    LessonContent {
        objectives: objectives(request),
        differentiated_outcomes: outcomes(request),
        vocabulary: vocabulary(request),
        resources: resources(request),
        skills: [
            "Critical Thinking",
            "Problem Solving",
            "Collaboration",
            "Communication",
            "Digital Literacy",
        ]
        .map(String::from)
        .to_vec(),
        starter: starter(request),
        teaching_component: teaching(request),
        cooperative_tasks: tasks(request, TaskKind::Cooperative),
        independent_tasks: tasks(request, TaskKind::Independent),
        plenary: plenary(request),
        world_application: world_application(request),
        adek_integration: adek_integration(request),
    }
}

fn objectives(r: &LessonRequest) -> String {
    let topic = &r.topic;
    [
        format!("Students will be able to analyze the key ideas of {topic} through guided discussion and worked examples."),
        format!("Students will be able to evaluate different approaches to {topic} through collaborative group tasks."),
        format!("Students will be able to apply {topic} to real situations in the UAE through a short case study."),
        format!("Students will be able to create a product that demonstrates their understanding of {topic} through independent practice."),
    ]
    .join("\n")
}

fn outcomes(r: &LessonRequest) -> Outcomes {
    let topic = &r.topic;
    Outcomes {
        assistance: format!(
            "Identify and define the basic terms of {topic}; recall the main facts with support from visual prompts."
        ),
        average: format!(
            "Explain how the ideas of {topic} connect and apply them to familiar examples."
        ),
        upper: format!(
            "Analyze and compare cases involving {topic} and justify conclusions with evidence."
        ),
        gifted: if r.gifted_talented {
            format!(
                "Design an original solution or investigation that extends {topic} beyond the lesson."
            )
        } else {
            String::new()
        },
    }
}

fn vocabulary(r: &LessonRequest) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut terms: Vec<String> = r
        .topic
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 3)
        .map(|w| w.to_lowercase())
        .filter(|w| seen.insert(w.clone()))
        .collect();
    for generic in ["concept", "evidence", "analysis", "example", "conclusion"] {
        if terms.len() >= 8 {
            break;
        }
        if !terms.iter().any(|t| t == generic) {
            terms.push(generic.to_string());
        }
    }
    terms
}

fn resources(r: &LessonRequest) -> Vec<String> {
    let mut list = vec![
        format!("{} textbook, {} unit on {}", r.subject, r.grade, r.topic),
        "Interactive whiteboard and presentation slides".to_string(),
        "Differentiated worksheets".to_string(),
        "Mini whiteboards and markers".to_string(),
        "Exit ticket cards".to_string(),
    ];
    let platform = r.platform_display();
    if platform != "Not specified" {
        list.push(format!("{} for digital tasks", platform));
    }
    list
}

fn starter(r: &LessonRequest) -> Activity {
    Activity {
        activity: format!(
            "Show an image or short clip linked to {} and ask students to think-pair-share what they notice (5 minutes).",
            r.topic
        ),
        questions: vec![
            format!("What do you already know about {}?", r.topic),
            "What do you notice in the image?".to_string(),
            format!("Where might you see {} in everyday life in the UAE?", r.topic),
        ],
    }
}

fn teaching(r: &LessonRequest) -> Teaching {
    Teaching {
        method: format!(
            "Explicit instruction with modelling, focused on {} (10 minutes maximum).",
            period_focus(&r.period)
        ),
        steps: vec![
            "Share the learning objectives and success criteria".to_string(),
            format!("Introduce the key vocabulary of {}", r.topic),
            "Model a worked example while thinking aloud".to_string(),
            "Check understanding with quick questioning on mini whiteboards".to_string(),
            "Explain the differentiated group tasks".to_string(),
        ],
    }
}

#[derive(Clone, Copy)]
enum TaskKind {
    Cooperative,
    Independent,
}

fn tasks(r: &LessonRequest, kind: TaskKind) -> Tiers<Task> {
    let task = |tier: Tier| {
        if tier == Tier::Gifted && !r.gifted_talented {
            return Task::default();
        }
        task_for(r, kind, tier)
    };
    Tiers {
        assistance: task(Tier::Assistance),
        average: task(Tier::Average),
        upper: task(Tier::Upper),
        gifted: task(Tier::Gifted),
    }
}

fn task_for(r: &LessonRequest, kind: TaskKind, tier: Tier) -> Task {
    let topic = &r.topic;
    let (activity, questions, vak) = match (kind, tier) {
        (TaskKind::Cooperative, Tier::Assistance) => (
            format!("In pairs, match {topic} terms to their definitions using picture cards."),
            vec![
                format!("Which card shows the main idea of {topic}?"),
                "Can you find two words that go together?".to_string(),
                "What does this word mean in your own words?".to_string(),
                "Which picture helped you most?".to_string(),
            ],
            "Visual picture cards, peer talk, and sorting by hand",
        ),
        (TaskKind::Cooperative, Tier::Average) => (
            format!("In groups, build a concept map of {topic} and present one connection."),
            vec![
                format!("How are the parts of {topic} connected?"),
                "Which example best shows this idea?".to_string(),
                "What would change if one part were missing?".to_string(),
                "How can you explain the map to another group?".to_string(),
            ],
            "Concept map poster, group presentation, and moving between stations",
        ),
        (TaskKind::Cooperative, Tier::Upper) => (
            format!("In groups, analyze a UAE case study on {topic} and argue a position."),
            vec![
                "What evidence supports your position?".to_string(),
                "What is the strongest counter-argument?".to_string(),
                format!("How does this case change your view of {topic}?"),
                "What would you recommend and why?".to_string(),
            ],
            "Case study texts, structured debate, and role cards",
        ),
        (TaskKind::Cooperative, Tier::Gifted) => (
            format!("Design a group investigation that tests an open question about {topic}."),
            vec![
                "What question is worth investigating?".to_string(),
                "How will you collect reliable evidence?".to_string(),
                "How could your findings help your community?".to_string(),
                "What are the limits of your design?".to_string(),
            ],
            "Planning templates, pitch to the class, and prototype building",
        ),
        (TaskKind::Independent, Tier::Assistance) => (
            format!("Complete a guided worksheet on {topic} with sentence starters."),
            vec![
                format!("Write one fact about {topic}."),
                "Label the diagram using the word bank.".to_string(),
                "Choose the correct answer for each statement.".to_string(),
                "Draw a picture that shows the key idea.".to_string(),
            ],
            "Labelled diagrams, word bank read aloud, and cut-and-stick answers",
        ),
        (TaskKind::Independent, Tier::Average) => (
            format!("Solve practice problems on {topic} and explain each method."),
            vec![
                "Which method did you use and why?".to_string(),
                "Where did you check your answer?".to_string(),
                format!("Give a new example of {topic}."),
                "What was the hardest step?".to_string(),
            ],
            "Worked examples, self-explanation recording, and manipulatives",
        ),
        (TaskKind::Independent, Tier::Upper) => (
            format!("Write an evaluation comparing two approaches to {topic}."),
            vec![
                "Which approach is more effective and why?".to_string(),
                "What evidence from the lesson supports your claim?".to_string(),
                "What assumptions does each approach make?".to_string(),
                "How would you improve the weaker approach?".to_string(),
            ],
            "Comparison organiser, audio feedback, and annotated models",
        ),
        (TaskKind::Independent, Tier::Gifted) => (
            format!("Create an original product (model, infographic, or proposal) that extends {topic}."),
            vec![
                "Who is the audience for your product?".to_string(),
                "What new idea does it add to the lesson?".to_string(),
                "How will you judge its success?".to_string(),
                "What would the next version include?".to_string(),
            ],
            "Digital design tools, presentation to peers, and hands-on modelling",
        ),
    };
    Task {
        activity,
        questions,
        vak: vak.to_string(),
    }
}

fn plenary(r: &LessonRequest) -> Activity {
    Activity {
        activity: "Exit ticket: students answer three reflection questions and rate their confidence (5 minutes).".to_string(),
        questions: vec![
            format!("What is the most important thing you learned about {}?", r.topic),
            "What question do you still have?".to_string(),
            format!("How does today's lesson connect to the value of {}?", r.value_or_default()),
        ],
    }
}

fn world_application(r: &LessonRequest) -> String {
    format!(
        "{topic} appears in everyday life across the UAE, from the way our cities are planned to the work of local industries and research centres. Students connect the lesson to places they know.\n\nBy linking {topic} to national projects and careers, students see how {subject} supports the country's development and their own future choices.",
        topic = r.topic,
        subject = r.subject,
    )
}

fn adek_integration(r: &LessonRequest) -> AdekIntegration {
    let topic = &r.topic;
    AdekIntegration {
        my_identity: format!(
            "Students explore how {topic} relates to UAE heritage and national development, building pride in their identity."
        ),
        moral_education: MoralEducation {
            pillar: "Character and Morality".to_string(),
            connection: format!(
                "The lesson practises the value of {} through respectful collaboration and honest reflection.",
                r.value_or_default()
            ),
        },
        steam: Steam {
            science: format!("Investigate the evidence behind {topic}."),
            technology: format!("Use {} to research and present findings.", r.platform_display()),
            engineering: "Plan and improve a model or solution step by step.".to_string(),
            art: "Communicate ideas visually through diagrams and posters.".to_string(),
            math: "Use measurement, data, or patterns to support conclusions.".to_string(),
        },
        links_to_subjects: "Mathematics (data and patterns), English (academic vocabulary and presenting), ICT (digital research and presentation).".to_string(),
        environment: format!(
            "Students consider how {topic} connects to sustainability in the UAE and suggest one responsible action."
        ),
    }
}
