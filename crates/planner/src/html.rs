use maud::{html, Markup, PreEscaped, DOCTYPE};

const SEMESTERS: &[&str] = &["1", "2", "3"];
const GRADES: &[&str] = &[
    "KG1", "KG2", "Grade 1", "Grade 2", "Grade 3", "Grade 4", "Grade 5", "Grade 6", "Grade 7",
    "Grade 8", "Grade 9", "Grade 10", "Grade 11", "Grade 12",
];
const PERIODS: &[&str] = &["1", "2", "3"];
const PLATFORMS: &[&str] = &[
    "Microsoft Teams",
    "Google Classroom",
    "Alef Education",
    "Nearpod",
    "Kahoot",
];
const STYLES: &[(&str, &str)] = &[
    ("modern", "Modern"),
    ("classic", "Classic"),
    ("vibrant", "Vibrant"),
];

pub fn render_page() -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Lesson Plan Generator" }
                style { (PreEscaped(CSS)) }
            }
            body {
                div.container {
                    h1 { "Lesson Plan Generator" }
                    p.subtitle { "Al Adhwa Private School" }

                    form #"lesson-form" novalidate {
                        div.grid {
                            (field("date", "Date", html! {
                                input #date name="date" type="date";
                            }))
                            (field("semester", "Semester", select("semester", SEMESTERS)))
                            (field("grade", "Grade", select("grade", GRADES)))
                            (field("subject", "Subject", html! {
                                input #subject name="subject" type="text" placeholder="e.g. Science";
                            }))
                            (field("topic", "Topic", html! {
                                input #topic name="topic" type="text" placeholder="e.g. Photosynthesis";
                            }))
                            (field("period", "Period", select("period", PERIODS)))
                            (field("value", "Value of the Month", html! {
                                input #value name="value" type="text" readonly placeholder="Select a date";
                            }))
                            (field("digital_platform", "Digital Platform", select("digital_platform", PLATFORMS)))
                            (field("style", "Presentation Style", html! {
                                select #style name="style" {
                                    @for (value, label) in STYLES {
                                        option value=(value) { (label) }
                                    }
                                }
                            }))
                        }
                        (field("standards", "Standards (one per line)", html! {
                            textarea #standards name="standards" rows="3" {}
                        }))
                        label.checkbox {
                            input #"gifted_talented" name="gifted_talented" type="checkbox";
                            " Include Gifted & Talented tier"
                        }
                        button.primary type="submit" { "Generate Lesson Plan" }
                    }

                    div.panel #"loading-panel" hidden {
                        div.spinner {}
                        p #"loading-message" { "Preparing..." }
                    }

                    div.panel #"result-panel" hidden {
                        h2 { "Your lesson plan is ready" }
                        a.primary #"download-link" download { "Download Package" }
                        button.secondary #"reset-button" type="button" { "Create Another" }
                    }
                }
                script { (PreEscaped(JAVASCRIPT)) }
            }
        }
    }
}

fn field(id: &str, label: &str, control: Markup) -> Markup {
    html! {
        div.field {
            label for=(id) { (label) }
            (control)
        }
    }
}

fn select(id: &str, options: &[&str]) -> Markup {
    html! {
        select id=(id) name=(id) {
            option value="" { "Select..." }
            @for option in options {
                option value=(option) { (option) }
            }
        }
    }
}

const CSS: &str = r#"
* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: 'Inter', -apple-system, BlinkMacSystemFont, sans-serif;
    background: #f3f6fa;
    color: #1f2933;
    line-height: 1.5;
}

.container {
    max-width: 900px;
    margin: 0 auto;
    padding: 40px 24px 60px;
}

h1 {
    color: #1f4e79;
    font-size: 2.2em;
    font-weight: 800;
}

.subtitle {
    color: #52606d;
    margin-bottom: 32px;
}

form, .panel {
    background: #fff;
    border-radius: 12px;
    box-shadow: 0 2px 12px rgba(31, 78, 121, 0.08);
    padding: 28px;
}

.grid {
    display: grid;
    grid-template-columns: repeat(auto-fill, minmax(240px, 1fr));
    gap: 18px;
    margin-bottom: 18px;
}

.field label {
    display: block;
    font-weight: 600;
    font-size: 0.9em;
    margin-bottom: 6px;
}

input[type="text"], input[type="date"], select, textarea {
    width: 100%;
    padding: 10px 12px;
    border: 1px solid #cbd2d9;
    border-radius: 8px;
    font: inherit;
}

input[readonly] {
    background: #f0f4f8;
}

.checkbox {
    display: block;
    margin: 18px 0 24px;
}

.primary, .secondary {
    display: inline-block;
    padding: 12px 24px;
    border-radius: 8px;
    border: none;
    font: inherit;
    font-weight: 700;
    cursor: pointer;
    text-decoration: none;
}

.primary {
    background: #1f4e79;
    color: #fff;
}

.secondary {
    background: #e4e7eb;
    color: #1f2933;
    margin-left: 12px;
}

.panel {
    text-align: center;
}

.panel h2 {
    margin-bottom: 20px;
}

.spinner {
    width: 48px;
    height: 48px;
    margin: 0 auto 20px;
    border: 5px solid #d9e2f3;
    border-top-color: #1f4e79;
    border-radius: 50%;
    animation: spin 1s linear infinite;
}

@keyframes spin {
    to { transform: rotate(360deg); }
}
"#;

const JAVASCRIPT: &str = r#"
const PROGRESS_MESSAGES = [
    'Generating lesson content...',
    'Writing the lesson plan...',
    'Creating differentiated worksheets...',
    'Building assessment rubrics...',
    'Assembling the question bank...',
    'Designing the PowerPoint...',
    'Packaging your files...'
];
const PROGRESS_INTERVAL_MS = 3000;
const REQUIRED_FIELDS = ['date', 'semester', 'grade', 'subject', 'topic', 'period'];

const form = document.getElementById('lesson-form');
const dateInput = document.getElementById('date');
const valueInput = document.getElementById('value');
const loadingPanel = document.getElementById('loading-panel');
const loadingMessage = document.getElementById('loading-message');
const resultPanel = document.getElementById('result-panel');
const downloadLink = document.getElementById('download-link');
const resetButton = document.getElementById('reset-button');

function showPanel(panel) {
    form.hidden = panel !== form;
    loadingPanel.hidden = panel !== loadingPanel;
    resultPanel.hidden = panel !== resultPanel;
}

async function postJson(url, body) {
    const response = await fetch(url, {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(body)
    });
    return response.json();
}

// Fetch the value of the month whenever the date changes
dateInput.addEventListener('change', async () => {
    valueInput.value = '';
    if (!dateInput.value) return;
    try {
        const data = await postJson('/api/get-month-value', { date: dateInput.value });
        if (data.value) {
            valueInput.value = data.value;
        } else {
            alert(data.error || 'Could not load the value of the month');
        }
    } catch (err) {
        console.error('Month value request failed', err);
        alert('Could not load the value of the month');
    }
});

function collectPayload() {
    const get = id => document.getElementById(id).value.trim();
    return {
        date: get('date'),
        semester: get('semester'),
        grade: get('grade'),
        subject: get('subject'),
        topic: get('topic'),
        period: get('period'),
        value: get('value'),
        standards: get('standards').split(/[\n,]/).map(s => s.trim()).filter(Boolean),
        digital_platform: get('digital_platform'),
        gifted_talented: document.getElementById('gifted_talented').checked,
        style: get('style')
    };
}

form.addEventListener('submit', async event => {
    event.preventDefault();
    const payload = collectPayload();
    const missing = REQUIRED_FIELDS.filter(name => !payload[name]);
    if (missing.length > 0) {
        alert('Please fill in all required fields: ' + missing.join(', '));
        return;
    }

    showPanel(loadingPanel);
    let step = 0;
    loadingMessage.textContent = PROGRESS_MESSAGES[step];
    const timer = setInterval(() => {
        step = (step + 1) % PROGRESS_MESSAGES.length;
        loadingMessage.textContent = PROGRESS_MESSAGES[step];
    }, PROGRESS_INTERVAL_MS);

    try {
        const data = await postJson('/api/generate-lesson-plan', payload);
        clearInterval(timer);
        if (data.status === 'success') {
            downloadLink.href = data.download_url;
            showPanel(resultPanel);
        } else {
            showPanel(form);
            alert('Error: ' + (data.message || 'Lesson plan generation failed'));
        }
    } catch (err) {
        clearInterval(timer);
        console.error('Generation request failed', err);
        showPanel(form);
        alert('Error: ' + err.message);
    }
});

resetButton.addEventListener('click', () => {
    form.reset();
    valueInput.value = '';
    downloadLink.removeAttribute('href');
    showPanel(form);
});
"#;
