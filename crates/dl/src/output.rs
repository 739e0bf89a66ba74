use owo_colors::{OwoColorize, Stream};

/// Renders message markup as terminal text: tags dropped, the entities the
/// formatter emits decoded.
pub fn plain_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

/// Colors `label` by the row class of its severity.
pub fn paint_severity(class: &str, label: &str) -> String {
    let level = class.strip_prefix("dblog-").unwrap_or(class);
    match level {
        "emergency" | "alert" | "critical" => label
            .if_supports_color(Stream::Stdout, |text| text.bright_red())
            .to_string(),
        "error" => label
            .if_supports_color(Stream::Stdout, |text| text.red())
            .to_string(),
        "warning" => label
            .if_supports_color(Stream::Stdout, |text| text.yellow())
            .to_string(),
        "notice" => label
            .if_supports_color(Stream::Stdout, |text| text.cyan())
            .to_string(),
        "info" => label
            .if_supports_color(Stream::Stdout, |text| text.green())
            .to_string(),
        _ => label
            .if_supports_color(Stream::Stdout, |text| text.dimmed())
            .to_string(),
    }
}

pub fn dim(text: &str) -> String {
    text.if_supports_color(Stream::Stdout, |text| text.dimmed())
        .to_string()
}

/// Pads or cuts `value` to exactly `width` characters.
pub fn fit(value: &str, width: usize) -> String {
    let count = value.chars().count();
    if count > width {
        let kept: String = value.chars().take(width.saturating_sub(1)).collect();
        format!("{kept}…")
    } else {
        format!("{value}{}", " ".repeat(width - count))
    }
}

pub fn print_table_header(columns: &[(&str, usize)]) {
    let header = columns
        .iter()
        .map(|(name, width)| fit(name, *width))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", dim(&header));
}

pub fn print_field(label: &str, value: &str) {
    println!("{:<10} {value}", format!("{label}:"));
}
