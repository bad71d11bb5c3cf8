//! Parsed HTML document and the query primitives the extractors need
//!
//! Wraps `scraper::Html`. Parsing never fails: html5ever recovers from any
//! malformed markup, and an invalid selector simply matches nothing.

use scraper::{ElementRef, Html, Selector};

/// Elements whose text is never a visible label
const NON_LABEL_TAGS: &[&str] = &["script", "style", "noscript", "template", "head", "title"];

/// Longest own-text an element may have and still count as a label
const MAX_LABEL_LEN: usize = 40;

pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(raw: &str) -> Self {
        Self {
            html: Html::parse_document(raw),
        }
    }

    /// Elements matching a CSS selector, in document order
    pub fn select(&self, selector: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(selector) {
            Ok(sel) => self.html.select(&sel).collect(),
            Err(_) => vec![],
        }
    }

    pub fn elements_by_tag(&self, tag: &str) -> Vec<ElementRef<'_>> {
        self.select(tag)
    }

    /// Elements whose `attr` contains `needle` (`[attr*="needle"]`)
    pub fn elements_with_attr_containing(&self, attr: &str, needle: &str) -> Vec<ElementRef<'_>> {
        let needle = needle.replace('\\', "\\\\").replace('"', "\\\"");
        self.select(&format!(r#"[{}*="{}"]"#, attr, needle))
    }

    /// Value of `attr` on the first matching element that has it non-blank
    pub fn first_attr(&self, selector: &str, attr: &str) -> Option<String> {
        self.select(selector)
            .into_iter()
            .find_map(|el| attr_of(el, attr).map(str::trim).filter(|v| !v.is_empty()))
            .map(String::from)
    }

    /// First element, in document order, whose own text mentions `keyword`.
    ///
    /// Only direct text children count, so ancestors of the label (up to
    /// `<html>`) never match on their descendants' text. In `Label: value`
    /// text only the part before the `:` is the label; it must hold the
    /// keyword and stay short. Long runs of prose and non-rendered elements
    /// are skipped.
    pub fn find_by_text_containing(&self, keyword: &str) -> Option<ElementRef<'_>> {
        let keyword = keyword.to_lowercase();

        self.select("*").into_iter().find(|el| {
            if is_inside_non_label(*el) {
                return false;
            }
            let own = own_text(*el);
            let label = own.split_once(':').map_or(own.as_str(), |(label, _)| label);
            !label.trim().is_empty()
                && label.chars().count() <= MAX_LABEL_LEN
                && label.to_lowercase().contains(&keyword)
        })
    }
}

/// Attribute value, untouched
pub fn attr_of<'a>(el: ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value().attr(name)
}

/// All descendant text with whitespace collapsed
pub fn text_of(el: ElementRef<'_>) -> String {
    collapse(&el.text().collect::<String>())
}

/// Text of the element's direct text children only
pub fn own_text(el: ElementRef<'_>) -> String {
    let raw: String = el
        .children()
        .filter_map(|child| child.value().as_text().map(|t| t.to_string()))
        .collect();
    collapse(&raw)
}

/// The next element sibling, skipping text and comment nodes
pub fn next_sibling_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// Text of the structurally next element, empty when there is none
pub fn sibling_text(el: ElementRef<'_>) -> String {
    next_sibling_element(el).map(text_of).unwrap_or_default()
}

/// Text nodes directly after the element, up to the next sibling element.
///
/// Covers `<b>Author:</b> Jane Doe`, where the value is not wrapped in an
/// element of its own.
pub fn trailing_text(el: ElementRef<'_>) -> String {
    let raw: String = el
        .next_siblings()
        .take_while(|node| !node.value().is_element())
        .filter_map(|node| node.value().as_text().map(|t| t.to_string()))
        .collect();
    collapse(&raw)
}

fn is_inside_non_label(el: ElementRef<'_>) -> bool {
    if NON_LABEL_TAGS.contains(&el.value().name()) {
        return true;
    }
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| NON_LABEL_TAGS.contains(&a.value().name()))
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
