//! Rendering of stored log messages for display.

use chrono::DateTime;
use serde_json::{Map, Value};

/// Maximum length of a message in the list view, ellipsis included.
pub const LIST_MESSAGE_LENGTH: usize = 130;

const ELLIPSIS: char = '…';

const ADMIN_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "address", "article", "aside", "b", "bdi", "bdo", "big", "blockquote",
    "br", "caption", "cite", "code", "col", "colgroup", "command", "dd", "del", "details", "dfn",
    "div", "dl", "dt", "em", "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hgroup", "hr", "i", "img", "ins", "kbd", "li", "mark", "menu", "meter", "nav", "ol",
    "output", "p", "pre", "progress", "q", "rp", "rt", "ruby", "s", "samp", "section", "small",
    "span", "strong", "sub", "summary", "sup", "table", "tbody", "td", "tfoot", "th", "thead",
    "time", "tr", "tt", "u", "ul", "var", "wbr",
];

const ALLOWED_PROTOCOLS: &[&str] = &[
    "ftp", "http", "https", "irc", "mailto", "news", "nntp", "rtsp", "sftp", "ssh", "tel",
    "telnet", "webcal",
];

const URL_ATTRIBUTES: &[&str] = &["href", "src", "cite", "action", "background", "longdesc"];

/// Renders a stored message: sanitize the template, then substitute
/// variables when the row carries any.
pub fn format_message(message: &str, variables: Option<&str>) -> String {
    let sanitized = filter_admin_html(message);
    match decode_variables(variables) {
        Some(variables) => substitute(&sanitized, &variables),
        None => sanitized,
    }
}

/// Decodes the serialized variables column. `NULL`, `null` and anything that
/// is not a JSON object all mean "no variables".
pub fn decode_variables(raw: Option<&str>) -> Option<Map<String, Value>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Single pass placeholder replacement. Longer keys win over their prefixes
/// and replaced text is never rescanned.
pub fn substitute(template: &str, variables: &Map<String, Value>) -> String {
    let mut replacements: Vec<(&str, String)> = variables
        .iter()
        .filter_map(|(key, value)| placeholder_value(key, value).map(|text| (key.as_str(), text)))
        .collect();
    if replacements.is_empty() {
        return template.to_string();
    }
    replacements.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    'scan: while !rest.is_empty() {
        for (key, value) in &replacements {
            if let Some(tail) = rest.strip_prefix(key) {
                out.push_str(value);
                rest = tail;
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            out.push(ch);
        }
        rest = chars.as_str();
    }
    out
}

fn placeholder_value(key: &str, value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    match key.chars().next()? {
        '@' => Some(escape_html(&text)),
        '%' => Some(format!(
            "<em class=\"placeholder\">{}</em>",
            escape_html(&text)
        )),
        ':' => Some(escape_html(&strip_dangerous_protocols(&text))),
        _ => None,
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

/// Removes leading `scheme:` prefixes until only an allowed scheme (or none)
/// remains.
pub fn strip_dangerous_protocols(uri: &str) -> String {
    let mut current = uri.to_string();
    loop {
        let before = current.clone();
        if let Some(colon) = current.find(':') {
            let scheme = &current[..colon];
            let is_scheme = !scheme.is_empty()
                && !scheme.contains(['/', '?', '#'])
                && scheme
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'));
            if is_scheme && !ALLOWED_PROTOCOLS.contains(&scheme.to_ascii_lowercase().as_str()) {
                current = current[colon + 1..].to_string();
            }
        }
        if current == before {
            return current;
        }
    }
}

/// Keeps only tags from the admin allow-list. Event handler attributes and
/// script URLs are dropped from the tags that survive; comments disappear.
pub fn filter_admin_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find(['<', '>']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with('>') {
            out.push_str("&gt;");
            rest = &tail[1..];
            continue;
        }
        if let Some(comment) = tail.strip_prefix("<!--") {
            rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
            continue;
        }
        let opens_tag = tail[1..]
            .chars()
            .next()
            .is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '/');
        if !opens_tag {
            out.push_str("&lt;");
            rest = &tail[1..];
            continue;
        }
        match tail[1..].find('>') {
            Some(end) => {
                if let Some(tag) = rebuild_tag(&tail[1..=end]) {
                    out.push_str(&tag);
                }
                rest = &tail[end + 2..];
            }
            None => {
                out.push_str("&lt;");
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn rebuild_tag(inner: &str) -> Option<String> {
    let inner = inner.trim();
    let (closing, body) = match inner.strip_prefix('/') {
        Some(body) => (true, body.trim_start()),
        None => (false, inner),
    };
    let name_len = body
        .find(|ch: char| !ch.is_ascii_alphanumeric())
        .unwrap_or(body.len());
    let name = body[..name_len].to_ascii_lowercase();
    if name.is_empty() || !ADMIN_TAGS.contains(&name.as_str()) {
        return None;
    }
    if closing {
        return Some(format!("</{name}>"));
    }

    let mut attrs = body[name_len..].trim();
    let self_closing = attrs.ends_with('/');
    if self_closing {
        attrs = attrs[..attrs.len() - 1].trim_end();
    }

    let mut tag = format!("<{name}");
    for (attr, value) in parse_attributes(attrs) {
        if attr.starts_with("on") || attr == "style" {
            continue;
        }
        match value {
            Some(value) => {
                let value = if URL_ATTRIBUTES.contains(&attr.as_str()) {
                    strip_dangerous_protocols(&value)
                } else {
                    value
                };
                tag.push_str(&format!(" {attr}=\"{}\"", escape_html(&value)));
            }
            None => tag.push_str(&format!(" {attr}")),
        }
    }
    if self_closing {
        tag.push_str(" /");
    }
    tag.push('>');
    Some(tag)
}

fn parse_attributes(input: &str) -> Vec<(String, Option<String>)> {
    let mut attrs = Vec::new();
    let mut rest = input.trim_start();
    while !rest.is_empty() {
        let name_len = rest
            .find(|ch: char| ch.is_whitespace() || ch == '=')
            .unwrap_or(rest.len());
        if name_len == 0 {
            // Stray `=` or similar; skip one char and resync.
            let mut chars = rest.chars();
            chars.next();
            rest = chars.as_str().trim_start();
            continue;
        }
        let name = rest[..name_len].to_ascii_lowercase();
        rest = rest[name_len..].trim_start();

        let Some(after_eq) = rest.strip_prefix('=') else {
            if name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-') {
                attrs.push((name, None));
            }
            continue;
        };
        let after_eq = after_eq.trim_start();
        let (value, remaining) = match after_eq.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &after_eq[1..];
                match body.find(quote) {
                    Some(end) => (&body[..end], &body[end + 1..]),
                    None => (body, ""),
                }
            }
            _ => {
                let end = after_eq
                    .find(char::is_whitespace)
                    .unwrap_or(after_eq.len());
                (&after_eq[..end], &after_eq[end..])
            }
        };
        if name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-') {
            attrs.push((name, Some(value.to_string())));
        }
        rest = remaining.trim_start();
    }
    attrs
}

/// Word-safe truncation to `max_chars` characters including the trailing
/// ellipsis. Shorter input is returned untouched.
pub fn truncate_words(text: &str, max_chars: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return text.to_string();
    }
    let budget = max_chars.saturating_sub(1);
    let cut = if budget > 1 {
        (1..=budget)
            .rev()
            .find(|&index| is_word_boundary(chars[index]))
            .unwrap_or(budget)
    } else {
        budget
    };
    let mut truncated: String = chars[..cut].iter().collect();
    let trimmed_len = truncated.trim_end_matches('.').len();
    truncated.truncate(trimmed_len);
    truncated.push(ELLIPSIS);
    truncated
}

fn is_word_boundary(ch: char) -> bool {
    ch.is_whitespace() || (ch.is_ascii_punctuation() && !matches!(ch, '\'' | '_' | '-'))
}

/// `MM/DD/YYYY - HH:MM`, in UTC. `None` for timestamps chrono cannot
/// represent.
pub fn format_short_date(timestamp: i64) -> Option<String> {
    DateTime::from_timestamp(timestamp, 0).map(|at| at.format("%m/%d/%Y - %H:%M").to_string())
}
