//! Free-text description cleanup

use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>]*>").unwrap());
static MD_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const HTML_ENTITIES: &[(&str, &str)] = &[
    ("&#x27;", "'"),
    ("&#039;", "'"),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&quot;", "\""),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&nbsp;", " "),
    ("&amp;", "&"),
];

const EMPHASIS_CHARS: &[char] = &['*', 'ـ', '~', '`'];

/// Footer delimiter some uploaders append before credits and links
const FOOTER_MARKER: &str = "___";

/// Turn a scraped description into single-line plain text.
///
/// `sanitize_description(sanitize_description(x)) == sanitize_description(x)`
/// holds for every input. Entities are decoded until none are left, so
/// double-escaped markup (`&amp;lt;b&amp;gt;`) ends up stripped like real tags.
pub fn sanitize_description(text: &str) -> String {
    // Later passes can expose matches for earlier ones (`&am<i></i>p;`), so
    // iterate to a fixpoint. Every pass is non-growing and only ever swaps
    // whitespace for a space, so this terminates.
    let mut current = sanitize_once(text);
    loop {
        let next = sanitize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn sanitize_once(text: &str) -> String {
    let mut out = text.to_string();

    for (entity, replacement) in HTML_ENTITIES {
        out = out.replace(entity, replacement);
    }

    out = TAG_RE.replace_all(&out, "").into_owned();
    out = MD_LINK_RE.replace_all(&out, "$1").into_owned();
    out.retain(|c| !EMPHASIS_CHARS.contains(&c));

    if let Some(pos) = out.find(FOOTER_MARKER) {
        out.truncate(pos);
    }

    WHITESPACE_RE.replace_all(&out, " ").trim().to_string()
}
