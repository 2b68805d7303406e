//! Markdown rendering for model replies.
//!
//! Agents are asked to answer in markdown. Replies are turned into HTML with
//! `pulldown-cmark`, but raw HTML in the reply is shown as text and link
//! targets are limited to web, mail and relative URLs.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};

/// Render a markdown reply as an HTML fragment.
#[must_use]
pub fn render(text: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let events = Parser::new_ext(text, options).map(neutralise);

    let mut out = String::with_capacity(text.len() + text.len() / 2);
    html::push_html(&mut out, events);
    out
}

fn neutralise(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

/// Keep relative URLs and `http`, `https` and `mailto` ones; anything else
/// becomes `#`.
fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let scheme_end = url.find(|c: char| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(i) if url[i..].starts_with(':') => {
            let scheme = url[..i].trim();
            if ["http", "https", "mailto"]
                .iter()
                .any(|s| scheme.eq_ignore_ascii_case(s))
            {
                url
            } else {
                CowStr::Borrowed("#")
            }
        }
        _ => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_common_markdown() {
        let html = render(
            "## Karachi\n\n**PM2.5** fell 12%.\n\n- BRT Red Line\n- Solar rooftops\n\n\
             [Source](https://example.org/report)",
        );
        assert!(html.contains("<h2>Karachi</h2>"));
        assert!(html.contains("<strong>PM2.5</strong> fell 12%."));
        assert!(html.contains("<li>BRT Red Line</li>"));
        assert!(html.contains("<a href=\"https://example.org/report\">Source</a>"));
    }

    #[test]
    fn tables_render() {
        let html = render("| city | pm25 |\n|---|---|\n| Lahore | 91 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>Lahore</td>"));
    }

    #[test]
    fn raw_html_is_shown_as_text() {
        let html = render("<b>Lahore</b> opened lines.\n\n<script>alert(1)</script>\n");
        assert!(html.contains("&lt;b&gt;Lahore&lt;/b&gt; opened lines."));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn unsafe_link_targets_are_dropped() {
        let html = render("[click](javascript:alert(1)) ![x](data:image/png;base64,AAAA)");
        assert!(!html.contains("javascript:"));
        assert!(!html.contains("data:"));
        assert!(html.contains("<a href=\"#\">click</a>"));
    }

    #[test]
    fn relative_and_mail_links_are_kept() {
        assert_eq!(&*safe_url("/agents?x=1".into()), "/agents?x=1");
        assert_eq!(&*safe_url("mailto:team@example.org".into()), "mailto:team@example.org");
        assert_eq!(&*safe_url("HTTPS://example.org".into()), "HTTPS://example.org");
        assert_eq!(&*safe_url("vbscript:msgbox".into()), "#");
    }
}
