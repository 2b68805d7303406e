//! Server-rendered form page.
//!
//! Everything is one HTML document with inline CSS and JS. Form values and
//! delegation records pass through [`escape`]; the reply itself is rendered
//! from markdown by [`crate::markdown::render`].

use std::fmt::Write as _;

use greenteam::prelude::{Outcome, Route, Specialist, ToolCallRecord, default_prompt};
use greenteam::prompt::{DEFAULT_MONTHS, MODE_COORDINATOR, MODE_SPECIALIST};
use serde_json::{Map, Value};

use crate::form::Submission;
use crate::markdown;

/// Escape text for HTML element and attribute content.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// State of the form page.
#[derive(Debug, Clone)]
pub struct Page {
    /// Selected route.
    pub route: Route,
    /// Specialist shown in the selector.
    pub selected: Specialist,
    /// City field.
    pub city: String,
    /// Slider position.
    pub months: u8,
    /// Prompt text area.
    pub prompt: String,
    /// Whether an API key is configured.
    pub has_credential: bool,
    /// Missing-key banner text.
    pub credential_notice: String,
    /// Result of the last submission.
    pub outcome: Option<Outcome>,
    /// Error of the last submission.
    pub error: Option<String>,
}

impl Page {
    /// A fresh page for the given preselection.
    ///
    /// Unknown values fall back to the coordinator and the first specialist.
    #[must_use]
    pub fn new(mode: Option<&str>, specialist: Option<&str>) -> Self {
        let selected = specialist
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(Specialist::DataAnalysis);
        let route = match mode.map(str::trim) {
            Some(MODE_SPECIALIST) => Route::Specialist(selected),
            _ => Route::Coordinator,
        };

        Self {
            route,
            selected,
            city: String::new(),
            months: DEFAULT_MONTHS,
            prompt: default_prompt(&route).to_owned(),
            has_credential: true,
            credential_notice: String::new(),
            outcome: None,
            error: None,
        }
    }

    /// A page echoing what was submitted.
    #[must_use]
    pub fn from_submission(submission: &Submission) -> Self {
        let selected = submission
            .selected_specialist()
            .unwrap_or(Specialist::DataAnalysis);
        let route = if submission.wants_specialist() {
            Route::Specialist(selected)
        } else {
            Route::Coordinator
        };

        Self {
            route,
            selected,
            city: submission.city.clone(),
            months: submission.months().unwrap_or(DEFAULT_MONTHS),
            prompt: submission.prompt.clone(),
            ..Self::new(None, None)
        }
    }

    /// Show the missing-key banner with `notice` unless `has_credential`.
    #[must_use]
    pub fn credential(mut self, has_credential: bool, notice: impl Into<String>) -> Self {
        self.has_credential = has_credential;
        self.credential_notice = notice.into();
        self
    }

    /// Render the whole document.
    #[must_use]
    pub fn render(&self) -> String {
        let mut html = String::with_capacity(8 * 1024);
        html.push_str(HEAD);
        html.push_str("<main>\n<h1>Green Team</h1>\n");
        html.push_str(
            "<p class=\"subtitle\">Coordinator + specialists for urban sustainability questions.</p>\n",
        );

        if !self.has_credential {
            let _ = writeln!(
                html,
                "<div class=\"banner warning\">{}</div>",
                escape(&self.credential_notice)
            );
        }

        self.render_form(&mut html);

        if let Some(error) = &self.error {
            let _ = writeln!(
                html,
                "<div class=\"banner error\">Error: {}</div>",
                escape(error)
            );
        }
        if let Some(outcome) = &self.outcome {
            render_outcome(&mut html, outcome);
        }

        html.push_str("</main>\n");
        let _ = write!(html, "<script>\nconst DEFAULTS = {};\n{SCRIPT}</script>\n", defaults_json());
        html.push_str("</body>\n</html>\n");
        html
    }

    fn render_form(&self, html: &mut String) {
        html.push_str(
            "<form id=\"team-form\" method=\"post\" action=\"/run\" enctype=\"multipart/form-data\">\n",
        );

        html.push_str("<fieldset>\n<legend>Routing</legend>\n");
        for mode in [MODE_COORDINATOR, MODE_SPECIALIST] {
            let checked = if self.route.mode() == mode { " checked" } else { "" };
            let _ = writeln!(
                html,
                "<label class=\"inline\"><input type=\"radio\" name=\"mode\" value=\"{0}\"{checked}> {0}</label>",
                escape(mode)
            );
        }
        html.push_str("<label>Specialist\n<select id=\"specialist\" name=\"specialist\">\n");
        for sp in Specialist::ALL {
            let selected = if sp == self.selected { " selected" } else { "" };
            let _ = writeln!(
                html,
                "<option value=\"{0}\"{selected}>{0}</option>",
                escape(sp.display_name())
            );
        }
        html.push_str("</select>\n</label>\n</fieldset>\n");

        let _ = writeln!(
            html,
            "<label>City <input type=\"text\" name=\"city\" placeholder=\"e.g. Karachi\" value=\"{}\"></label>",
            escape(&self.city)
        );
        let _ = writeln!(
            html,
            "<label>Lookback window: <output id=\"months-out\">{0}</output> months\n\
             <input type=\"range\" id=\"months\" name=\"months\" min=\"1\" max=\"12\" value=\"{0}\"></label>",
            self.months
        );
        html.push_str(
            "<label>CSV data (optional) <input type=\"file\" name=\"csv\" accept=\".csv,text/csv\"></label>\n",
        );
        let _ = writeln!(
            html,
            "<label>Prompt\n<textarea id=\"prompt\" name=\"prompt\" rows=\"6\">{}</textarea></label>",
            escape(&self.prompt)
        );
        html.push_str(
            "<button type=\"submit\" id=\"submit\">Run</button> \
             <span id=\"busy\" class=\"busy\" hidden>Working on it&hellip;</span>\n</form>\n",
        );
    }
}

fn render_outcome(html: &mut String, outcome: &Outcome) {
    let reply = &outcome.reply;
    html.push_str("<section class=\"result\">\n<h2>Response</h2>\n");
    let _ = writeln!(
        html,
        "<p class=\"meta\">{} &middot; {} tokens</p>",
        escape(&reply.agent_name),
        reply.usage.total_tokens
    );
    let _ = writeln!(
        html,
        "<div class=\"reply\">\n{}</div>",
        markdown::render(reply.display_text())
    );

    if reply.show_tool_calls && !reply.tool_calls.is_empty() {
        html.push_str("<h3>Delegations</h3>\n<ul class=\"tools\">\n");
        for record in &reply.tool_calls {
            render_tool_call(html, record);
        }
        html.push_str("</ul>\n");
    }

    let _ = writeln!(
        html,
        "<details class=\"debug\"><summary>Debug context</summary><pre>{}</pre></details>",
        escape(&outcome.debug.to_json())
    );
    html.push_str("</section>\n");
}

fn render_tool_call(html: &mut String, record: &ToolCallRecord) {
    let task = record
        .arguments
        .get("task")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let status = if record.success { "ok" } else { "failed" };
    let _ = writeln!(
        html,
        "<li><code>{}</code> <span class=\"{status}\">{status}</span> {}\
         <details><summary>Result</summary><pre>{}</pre></details></li>",
        escape(&record.name),
        escape(task),
        escape(&record.result)
    );
}

/// Default prompts keyed by coordinator mode label and specialist name.
fn defaults_json() -> String {
    let mut map = Map::new();
    map.insert(
        MODE_COORDINATOR.to_owned(),
        Value::from(default_prompt(&Route::Coordinator)),
    );
    for sp in Specialist::ALL {
        map.insert(
            sp.display_name().to_owned(),
            Value::from(default_prompt(&Route::Specialist(sp))),
        );
    }
    Value::Object(map).to_string().replace('<', "\\u003c")
}

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Green Team</title>
<style>
body { font-family: system-ui, sans-serif; background: #f4f7f4; color: #1d2a1d; margin: 0; }
main { max-width: 860px; margin: 0 auto; padding: 24px; }
h1 { color: #2e7d32; margin-bottom: 4px; }
.subtitle { color: #5b6b5b; margin-top: 0; }
form { background: #fff; border: 1px solid #d6e2d6; border-radius: 8px; padding: 16px; }
fieldset { border: none; padding: 0; margin: 0 0 12px; }
label { display: block; margin: 10px 0; }
label.inline { display: inline-block; margin-right: 16px; }
input[type=text], select, textarea { width: 100%; box-sizing: border-box; padding: 6px; }
input[type=range] { width: 100%; }
button { background: #2e7d32; color: #fff; border: none; border-radius: 4px; padding: 8px 20px; cursor: pointer; }
button:disabled { opacity: 0.6; cursor: wait; }
.busy { color: #5b6b5b; margin-left: 8px; }
.banner { border-radius: 6px; padding: 10px 14px; margin: 12px 0; }
.warning { background: #fff4e5; border: 1px solid #f0b35b; }
.error { background: #fdecea; border: 1px solid #e57373; }
.result { background: #fff; border: 1px solid #d6e2d6; border-radius: 8px; padding: 16px; margin-top: 16px; }
.meta { color: #5b6b5b; font-size: 0.9em; }
pre { white-space: pre-wrap; word-wrap: break-word; }
.reply table { border-collapse: collapse; }
.reply th, .reply td { border: 1px solid #d6e2d6; padding: 4px 8px; }
.reply pre { background: #f4f7f4; padding: 8px; }
.tools li { margin-bottom: 8px; }
.ok { color: #2e7d32; }
.failed { color: #c62828; }
</style>
</head>
<body>
"#;

const SCRIPT: &str = r"const form = document.getElementById('team-form');
const prompt = document.getElementById('prompt');
const specialist = document.getElementById('specialist');
const months = document.getElementById('months');

function currentKey() {
  const mode = form.querySelector('input[name=mode]:checked').value;
  return mode === 'Team Coordinator' ? mode : specialist.value;
}

let edited = prompt.value !== DEFAULTS[currentKey()];
prompt.addEventListener('input', () => { edited = true; });

function swapDefault() {
  if (!edited) {
    prompt.value = DEFAULTS[currentKey()];
  }
}
form.querySelectorAll('input[name=mode]').forEach((el) => el.addEventListener('change', swapDefault));
specialist.addEventListener('change', swapDefault);

months.addEventListener('input', () => {
  document.getElementById('months-out').textContent = months.value;
});

form.addEventListener('submit', () => {
  document.getElementById('busy').hidden = false;
  document.getElementById('submit').disabled = true;
});
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn preselection_from_query() {
        let page = Page::new(Some("Single Specialist"), Some("News Analyst"));
        assert_eq!(page.route, Route::Specialist(Specialist::News));
        assert_eq!(page.prompt, default_prompt(&page.route));

        let page = Page::new(Some("Team Coordinator"), Some("News Analyst"));
        assert_eq!(page.route, Route::Coordinator);
        assert_eq!(page.selected, Specialist::News);

        let page = Page::new(Some("Single Specialist"), Some("nobody"));
        assert_eq!(page.route, Route::Specialist(Specialist::DataAnalysis));
    }

    #[test]
    fn fresh_page_has_no_result() {
        let html = Page::new(None, None).render();
        assert!(html.contains("value=\"Team Coordinator\" checked"));
        assert!(html.contains("value=\"12\""));
        assert!(html.contains(default_prompt(&Route::Coordinator)));
        assert!(!html.contains("class=\"result\""));
        assert!(!html.contains("class=\"banner"));
    }

    #[test]
    fn banner_when_key_is_missing() {
        let html = Page::new(None, None)
            .credential(false, "Missing GROQ_API_KEY. Add it to your .env and restart.")
            .render();
        assert!(html.contains("<div class=\"banner warning\">Missing GROQ_API_KEY."));
    }

    #[test]
    fn submitted_text_is_escaped() {
        let submission = Submission {
            mode: "Single Specialist".into(),
            specialist: Some("Policy Reviewer".into()),
            city: "<script>".into(),
            months: Some("3".into()),
            prompt: "a </textarea> b".into(),
            upload: None,
        };
        let mut page = Page::from_submission(&submission);
        page.error = Some("bad <input>".into());
        let html = page.render();

        assert!(html.contains("value=\"&lt;script&gt;\""));
        assert!(html.contains("a &lt;/textarea&gt; b</textarea>"));
        assert!(html.contains("Error: bad &lt;input&gt;"));
        assert!(html.contains("<option value=\"Policy Reviewer\" selected>"));
        assert!(html.contains("value=\"3\""));
    }

    #[test]
    fn defaults_cover_every_route() {
        let json: Value = serde_json::from_str(&defaults_json()).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 5);
        assert_eq!(json["HackerNews Scout"], default_prompt(&Route::Specialist(Specialist::HackerNewsScout)));
    }
}
