//! Server-rendered pages for the two-stage exam form.
//!
//! Every page is self-contained with the CSS inlined.

use examforge_core::model::ExamParams;

/// Escape a string for safe HTML insertion.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Values pre-filled into the stage 1 form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDefaults {
    pub num_questions: u32,
    pub marks_per_question: u32,
    pub total_time: u32,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            num_questions: 5,
            marks_per_question: 10,
            total_time: 60,
        }
    }
}

fn page(title: &str, body: &str) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>examforge | {}</title>\n", html_escape(title)));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");
    html.push_str("<header>\n<h1>Exam Question Generator and Evaluator</h1>\n");
    html.push_str("<p class=\"meta\">Generate unique exam questions, answer them, and get them graded.</p>\n");
    html.push_str("</header>\n");
    html.push_str(body);
    html.push_str("</body>\n</html>\n");
    html
}

/// Markdown-ish engine output, escaped and shown verbatim.
fn rendered_block(text: &str) -> String {
    format!("<pre class=\"rendered\">{}</pre>\n", html_escape(text))
}

fn stage_one_form(defaults: &FormDefaults) -> String {
    let mut form = String::new();
    form.push_str("<section>\n<h2>1. Generate questions</h2>\n");
    form.push_str("<form method=\"post\" action=\"/generate\">\n");
    form.push_str("<label>Subject <input type=\"text\" name=\"subject\" required></label>\n");
    form.push_str("<label>Topic <input type=\"text\" name=\"topic\" required></label>\n");
    form.push_str(&format!(
        "<label>Number of Questions <input type=\"number\" name=\"num_questions\" min=\"1\" value=\"{}\"></label>\n",
        defaults.num_questions
    ));
    form.push_str(&format!(
        "<label>Marks per Question <input type=\"number\" name=\"marks_per_question\" min=\"1\" value=\"{}\"></label>\n",
        defaults.marks_per_question
    ));
    form.push_str(&format!(
        "<label>Total Time (minutes) <input type=\"number\" name=\"total_time\" min=\"1\" value=\"{}\"></label>\n",
        defaults.total_time
    ));
    form.push_str("<label>Additional Comments <textarea name=\"comment\" rows=\"3\"></textarea></label>\n");
    form.push_str("<button type=\"submit\">Generate Questions</button>\n");
    form.push_str("</form>\n</section>\n");
    form
}

/// Stage 1: the exam parameters form.
pub fn index_page(defaults: &FormDefaults) -> String {
    page("new exam", &stage_one_form(defaults))
}

/// Stage 2: the generated questions and the answer form.
pub fn questions_page(params: &ExamParams, rendered: &str) -> String {
    let mut body = String::new();
    body.push_str("<section>\n<h2>Questions</h2>\n");
    body.push_str(&rendered_block(rendered));
    body.push_str("</section>\n");

    body.push_str("<section>\n<h2>2. Submit answers</h2>\n");
    body.push_str("<form method=\"post\" action=\"/evaluate\">\n");
    body.push_str(
        "<label>Your Answers <textarea name=\"answers\" rows=\"12\" \
         placeholder=\"Enter answers with question numbers, e.g., &#x27;1. [answer for question 1]&#x27;\"></textarea></label>\n",
    );
    body.push_str(&format!(
        "<label>Total Time (minutes) <input type=\"number\" name=\"total_time\" min=\"1\" value=\"{}\"></label>\n",
        params.total_time
    ));
    body.push_str("<button type=\"submit\">Evaluate Answers</button>\n");
    body.push_str("</form>\n</section>\n");

    page(&format!("{} - {}", params.subject, params.topic), &body)
}

/// The graded report, with a fresh stage 1 form underneath.
pub fn evaluation_page(rendered: &str) -> String {
    let mut body = String::new();
    body.push_str("<section>\n<h2>Evaluation</h2>\n");
    body.push_str(&rendered_block(rendered));
    body.push_str("</section>\n");
    body.push_str(&stage_one_form(&FormDefaults::default()));
    page("evaluation", &body)
}

pub fn error_page(status: u16, message: &str) -> String {
    let body = format!(
        "<section class=\"error\">\n<h2>Error {status}</h2>\n<p>{}</p>\n<p><a href=\"/\">Start over</a></p>\n</section>\n",
        html_escape(message)
    );
    page("error", &body)
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0 auto; padding: 2rem; max-width: 860px; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
form { display: grid; gap: 0.75rem; }
label { display: grid; gap: 0.25rem; font-weight: bold; }
input, textarea { font: inherit; padding: 0.5rem; border: 1px solid var(--border); border-radius: 6px; background: var(--bg); color: var(--fg); }
button { justify-self: start; padding: 0.5rem 1.25rem; cursor: pointer; }
pre.rendered { white-space: pre-wrap; padding: 1rem; background: var(--border); border-radius: 8px; }
.error { background: var(--fail); padding: 1rem; border-radius: 8px; }
"#;
