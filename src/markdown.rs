use pulldown_cmark::{html, Event, Parser};

/// Renders a reply for display. Raw HTML in the reply is escaped, never
/// passed through.
pub fn to_html(text: &str) -> String {
    let parser = Parser::new(text).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Removes heading hashes, emphasis markers, inline code ticks and link
/// targets. Line breaks and list markers are kept.
pub fn strip(text: &str) -> String {
    text.lines()
        .map(strip_line)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn strip_line(line: &str) -> String {
    let indent_len = line.len() - line.trim_start().len();
    let (indent, body) = line.split_at(indent_len);

    let body = match body.trim_start_matches('#') {
        rest if rest.len() < body.len() && (rest.is_empty() || rest.starts_with(' ')) => rest.trim_start(),
        _ => body,
    };

    // A leading "* " is a list marker, not emphasis.
    let (marker, body) = match body.strip_prefix("* ") {
        Some(rest) => ("* ", rest),
        None => ("", body),
    };

    let body = strip_links(body);
    let body = body.replace("**", "").replace("__", "").replace('`', "");
    let body: String = body.chars().filter(|&c| c != '*').collect();

    format!("{}{}{}", indent, marker, body)
}

/// `[label](target)` becomes `label`; unbalanced brackets are left alone.
fn strip_links(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find("](") else { break };
        let after_label = &after_open[close + 2..];
        let Some(end) = after_label.find(')') else { break };

        out.push_str(&rest[..open]);
        out.push_str(&after_open[..close]);
        rest = &after_label[end + 1..];
    }

    out.push_str(rest);
    out
}
