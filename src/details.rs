//! Title metadata scraped from a detail page
//!
//! Detail pages have no stable markup, so fields are located by the visible
//! label next to them ("Author", "Status", ...) rather than by class names.

use tracing::debug;

use crate::dom::{own_text, sibling_text, text_of, trailing_text, Document};
use crate::models::MangaDetails;
use crate::normalize::{parse_status, sanitize_description};

/// A labelled field and where its value goes
struct Label {
    keyword: &'static str,
    apply: fn(&mut MangaDetails, String),
}

const LABELS: &[Label] = &[
    Label {
        keyword: "author",
        apply: |details, value| details.author = value,
    },
    Label {
        keyword: "artist",
        apply: |details, value| details.artist = value,
    },
    Label {
        keyword: "status",
        apply: |details, value| details.status = parse_status(&value),
    },
];

const DESCRIPTION_SELECTORS: &[&str] = &[
    r#"meta[name="description"]"#,
    r#"meta[property="og:description"]"#,
];

/// Build a [`MangaDetails`] from a parsed detail page. Missing pieces stay
/// at their defaults.
pub fn extract_details(document: &Document) -> MangaDetails {
    let mut details = MangaDetails {
        description: extract_description(document),
        genres: extract_genres(document),
        ..Default::default()
    };

    for label in LABELS {
        match labeled_value(document, label.keyword) {
            Some(value) => (label.apply)(&mut details, value),
            None => debug!("no '{}' label on detail page", label.keyword),
        }
    }

    if details.artist.is_empty() {
        details.artist = details.author.clone();
    }

    details
}

fn extract_description(document: &Document) -> String {
    DESCRIPTION_SELECTORS
        .iter()
        .find_map(|selector| document.first_attr(selector, "content"))
        .map(|raw| sanitize_description(&raw))
        .unwrap_or_default()
}

/// Link texts of genre links, first occurrence order
fn extract_genres(document: &Document) -> Vec<String> {
    let mut genres: Vec<String> = Vec::new();
    for link in document.elements_with_attr_containing("href", "/genre/") {
        let name = text_of(link);
        if !name.is_empty() && !genres.contains(&name) {
            genres.push(name);
        }
    }
    genres
}

/// Value of a label, tried in order: text inside the label after a `:`,
/// bare text right after the label, the text of the next element.
fn labeled_value(document: &Document, keyword: &str) -> Option<String> {
    let label = document.find_by_text_containing(keyword)?;

    let inline = own_text(label)
        .split_once(':')
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_default();

    [inline, trailing_text(label), sibling_text(label)]
        .into_iter()
        .find(|value| !value.is_empty())
}
