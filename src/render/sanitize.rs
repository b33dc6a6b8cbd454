//! Preview markup sanitizer.
//!
//! A coarse allow-list filter, not an HTML parser: tags outside the
//! structural allow-list are dropped (their inner text may survive), kept
//! tags lose every attribute except `class`, and bare ampersands are escaped.
//! Filtering repeats until nothing changes, so fragments split around a
//! dropped tag cannot rejoin into a live one.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const ALLOWED_TAGS: &[&str] = &[
    "div", "p", "h1", "h2", "h3", "h4", "h5", "h6", "span", "br", "hr", "table", "tr", "td", "th",
    "tbody", "thead", "ul", "ol", "li",
];

const NAMED_ENTITIES: &[&str] = &["amp", "lt", "gt", "quot", "apos", "nbsp"];

static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?([a-zA-Z][a-zA-Z0-9]*)\b[^>]*>").expect("Invalid tag regex"));
static CLASS_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\sclass\s*=\s*"([a-zA-Z0-9_\- ]*)""#).expect("Invalid class attribute regex")
});

/// Sanitize preview markup. Never fails.
pub fn sanitize(html: &str) -> String {
    let mut filtered = filter_tags(html);
    // Kept tags come out in canonical form and dropped ones shrink the text,
    // so this reaches a fixpoint
    loop {
        let next = filter_tags(&filtered);
        if next == filtered {
            break;
        }
        filtered = next;
    }

    escape_bare_ampersands(&filtered)
}

fn filter_tags(html: &str) -> String {
    TAG.replace_all(html, |caps: &Captures| {
        let tag = &caps[0];
        let name = caps[1].to_ascii_lowercase();
        if !ALLOWED_TAGS.contains(&name.as_str()) {
            log::debug!("Sanitizer dropped <{}>", name);
            return String::new();
        }
        if tag.starts_with("</") {
            return format!("</{}>", name);
        }
        match CLASS_ATTR.captures(tag) {
            Some(class) => format!("<{} class=\"{}\">", name, &class[1]),
            None => format!("<{}>", name),
        }
    })
    .into_owned()
}

/// Escape `&` unless it starts a recognised character reference.
fn escape_bare_ampersands(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if is_reference(tail) {
            out.push('&');
        } else {
            out.push_str("&amp;");
        }
        rest = &tail[1..];
    }

    out.push_str(rest);
    out
}

fn is_reference(tail: &str) -> bool {
    let Some(end) = tail.find(';') else {
        return false;
    };
    let body = &tail[1..end];

    if let Some(num) = body.strip_prefix('#') {
        return match num.strip_prefix(|c: char| c == 'x' || c == 'X') {
            Some(hex) => !hex.is_empty() && hex.len() <= 6 && hex.chars().all(|c| c.is_ascii_hexdigit()),
            None => !num.is_empty() && num.len() <= 7 && num.chars().all(|c| c.is_ascii_digit()),
        };
    }

    NAMED_ENTITIES.contains(&body)
}

/// Escape text for inclusion in markup.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
